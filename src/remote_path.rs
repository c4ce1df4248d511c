//! Helpers for `/`-separated remote storage paths. The storage root is the
//! empty string; paths never carry a leading or trailing slash.

/// Trims whitespace and surrounding slashes so `" /a/b/ "` becomes `"a/b"`.
pub fn normalize(path: &str) -> String {
    path.trim().trim_matches('/').to_string()
}

pub fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

pub fn last_segment(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

pub fn depth(path: &str) -> usize {
    segments(path).count()
}

pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Segment-aware prefix check: `"a/bb"` is not under `"a/b"`. Everything is
/// a descendant of the root.
pub fn is_descendant_or_self(path: &str, ancestor: &str) -> bool {
    if ancestor.is_empty() {
        return true;
    }
    path == ancestor || path.strip_prefix(ancestor).is_some_and(|rest| rest.starts_with('/'))
}

/// Breadcrumb pairs `(segment, cumulative path)` in root-to-leaf order.
/// The root itself is implicit and not included.
pub fn ancestors(path: &str) -> Vec<(String, String)> {
    let mut crumbs = Vec::new();
    let mut current = String::new();
    for segment in segments(path) {
        current = join(&current, segment);
        crumbs.push((segment.to_string(), current.clone()));
    }
    crumbs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_slashes_and_whitespace() {
        assert_eq!(normalize(" /a/b/ "), "a/b");
        assert_eq!(normalize("a/b"), "a/b");
        assert_eq!(normalize("/"), "");
        assert_eq!(normalize("  "), "");
    }

    #[test]
    fn parent_of_nested_and_top_level() {
        assert_eq!(parent("a/b/c"), "a/b");
        assert_eq!(parent("a"), "");
        assert_eq!(parent(""), "");
    }

    #[test]
    fn join_with_root_parent() {
        assert_eq!(join("", "a"), "a");
        assert_eq!(join("a/b", "c"), "a/b/c");
    }

    #[test]
    fn join_parent_last_segment_round_trips() {
        for path in ["a", "a/b", "a/b/c", "photos/2024/trip"] {
            assert_eq!(join(parent(path), last_segment(path)), path);
        }
    }

    #[test]
    fn depth_counts_segments() {
        assert_eq!(depth(""), 0);
        assert_eq!(depth("a"), 1);
        assert_eq!(depth("a/b/c"), 3);
    }

    #[test]
    fn descendant_or_self_checks() {
        assert!(is_descendant_or_self("a/b/c", "a/b"));
        assert!(is_descendant_or_self("a/b", "a/b"));
        assert!(!is_descendant_or_self("a/bb", "a/b"));
        assert!(!is_descendant_or_self("a", "a/b"));
        assert!(is_descendant_or_self("anything", ""));
    }

    #[test]
    fn ancestors_accumulate_paths() {
        assert_eq!(
            ancestors("a/b/c"),
            vec![
                ("a".to_string(), "a".to_string()),
                ("b".to_string(), "a/b".to_string()),
                ("c".to_string(), "a/b/c".to_string()),
            ]
        );
        assert!(ancestors("").is_empty());
    }
}
