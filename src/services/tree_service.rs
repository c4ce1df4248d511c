use crate::error::AppError;
use crate::models::entry::{Entry, EntryKind};
use crate::models::folder_node::FolderNode;
use crate::remote_path;
use crate::services::remote_store::RemoteStore;

/// One option of a destination/parent selector: the folder path and a label
/// indented by tree depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorOption {
    pub path: String,
    pub label: String,
}

/// Nests a flat list of directory entries into a tree keyed by path segment;
/// the node for `"a/b/c"` ends up at `root.children["a"].children["b"]
/// .children["c"]`. Intermediate folders missing from the input are created
/// on the way down.
pub fn build_hierarchy(directories: &[Entry]) -> FolderNode {
    let mut root = FolderNode::default();
    for dir in directories {
        let mut node = &mut root;
        let mut prefix = String::new();
        for segment in remote_path::segments(&dir.path) {
            prefix = remote_path::join(&prefix, segment);
            let path = prefix.clone();
            node = node
                .children
                .entry(segment.to_string())
                .or_insert_with(|| FolderNode::new(&path, segment));
        }
    }
    root
}

/// Depth-first, name-lexicographic `(path, indented label)` pairs for
/// populating folder selectors. `exclude` skips one node (its subtree is
/// still visited); the upload-destination selector uses this because the
/// current folder is offered as a separate default entry.
pub fn flatten_for_selector(root: &FolderNode, exclude: Option<&str>) -> Vec<SelectorOption> {
    let mut options = Vec::new();
    flatten_children(root, 0, exclude, &mut options);
    options
}

fn flatten_children(
    node: &FolderNode,
    depth: usize,
    exclude: Option<&str>,
    options: &mut Vec<SelectorOption>,
) {
    for child in node.children.values() {
        if exclude != Some(child.path.as_str()) {
            options.push(SelectorOption {
                path: child.path.clone(),
                label: format!("{}{}", "\u{2013} ".repeat(depth), child.name),
            });
        }
        flatten_children(child, depth + 1, exclude, options);
    }
}

/// Assembles the full folder tree by walking the namespace depth-first, one
/// listing call per directory — O(number of directories) round trips. A
/// failing sub-listing loses only that branch; a failing root listing is an
/// error the caller surfaces.
pub async fn load_full_tree<S: RemoteStore>(store: &S) -> Result<FolderNode, AppError> {
    let mut directories = Vec::new();
    let mut stack = vec![String::new()];

    while let Some(path) = stack.pop() {
        let entries = match store.list(&path).await {
            Ok(entries) => entries,
            Err(err) if path.is_empty() => return Err(err),
            Err(err) => {
                tracing::warn!(path = %path, error = %err, "skipping unreadable folder branch");
                continue;
            }
        };

        let mut subdirs: Vec<Entry> = entries
            .into_iter()
            .filter(|entry| entry.kind == EntryKind::Directory)
            .collect();
        subdirs.sort_by(|a, b| a.name.cmp(&b.name));
        // Reversed push keeps the traversal depth-first in name order.
        for dir in subdirs.into_iter().rev() {
            stack.push(dir.path.clone());
            directories.push(dir);
        }
    }

    Ok(build_hierarchy(&directories))
}
