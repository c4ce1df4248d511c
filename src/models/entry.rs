use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One record of the remote listing API. Superseded wholesale on every
/// refetch; never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    /// Storage-relative path; the root is the empty string.
    #[serde(default)]
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(
        default,
        rename = "uploadDate",
        alias = "mtime",
        deserialize_with = "deserialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub upload_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, alias = "thumb", rename = "thumbnailUrl", skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

/// The server sends file timestamps as `mtime` float Unix seconds; older
/// clients also produced RFC3339 strings. Both parse to the same field.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Seconds(f64),
        Rfc3339(DateTime<Utc>),
    }

    Ok(match Option::<Wire>::deserialize(deserializer)? {
        None => None,
        Some(Wire::Rfc3339(datetime)) => Some(datetime),
        Some(Wire::Seconds(seconds)) => {
            DateTime::from_timestamp(seconds.trunc() as i64, (seconds.fract() * 1e9) as u32)
        }
    })
}

impl Entry {
    pub fn directory(path: &str) -> Self {
        Entry {
            name: crate::remote_path::last_segment(path).to_string(),
            path: path.to_string(),
            kind: EntryKind::Directory,
            size: None,
            upload_date: None,
            url: None,
            thumbnail_url: None,
        }
    }

    pub fn file(path: &str, size: u64) -> Self {
        Entry {
            name: crate::remote_path::last_segment(path).to_string(),
            path: path.to_string(),
            kind: EntryKind::File,
            size: Some(size),
            upload_date: None,
            url: Some(path.to_string()),
            thumbnail_url: None,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_directory_record() {
        let entry: Entry =
            serde_json::from_str(r#"{"name":"b","path":"a/b","type":"directory"}"#).unwrap();
        assert_eq!(entry.name, "b");
        assert_eq!(entry.path, "a/b");
        assert!(entry.is_directory());
        assert!(entry.size.is_none());
    }

    #[test]
    fn deserializes_file_record_with_thumb_alias() {
        let entry: Entry = serde_json::from_str(
            r#"{"name":"cat.jpg","path":"pets/cat.jpg","type":"file","size":1024,"url":"/images/pets/cat.jpg","thumb":"/images/pets/.thumbs/thumb_cat.jpg"}"#,
        )
        .unwrap();
        assert_eq!(entry.kind, EntryKind::File);
        assert_eq!(entry.size, Some(1024));
        assert_eq!(
            entry.thumbnail_url.as_deref(),
            Some("/images/pets/.thumbs/thumb_cat.jpg")
        );
    }

    #[test]
    fn mtime_float_seconds_parse_to_the_upload_date() {
        let entry: Entry = serde_json::from_str(
            r#"{"name":"cat.jpg","type":"file","size":1,"mtime":1724900000.5}"#,
        )
        .unwrap();
        let date = entry.upload_date.unwrap();
        assert_eq!(date.timestamp(), 1724900000);
        assert_eq!(date.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn rfc3339_upload_date_still_parses() {
        let entry: Entry = serde_json::from_str(
            r#"{"name":"cat.jpg","type":"file","size":1,"uploadDate":"2024-08-29T12:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(entry.upload_date.unwrap().timestamp(), 1724932800);
    }

    #[test]
    fn missing_path_defaults_to_empty() {
        let entry: Entry =
            serde_json::from_str(r#"{"name":"cat.jpg","type":"file","size":1}"#).unwrap();
        assert!(entry.path.is_empty());
    }
}
