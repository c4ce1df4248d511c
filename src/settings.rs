use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::entry::Entry;
use crate::services::upload_service::UploadStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    De,
    En,
}

impl Language {
    pub fn upload_status_label(self, status: &UploadStatus) -> &'static str {
        match (self, status) {
            (Language::De, UploadStatus::Ready) => "Bereit",
            (Language::De, UploadStatus::Uploading) => "Wird hochgeladen...",
            (Language::De, UploadStatus::Uploaded) => "Hochgeladen",
            (Language::De, UploadStatus::Failed(_)) => "Fehlgeschlagen",
            (Language::En, UploadStatus::Ready) => "Ready",
            (Language::En, UploadStatus::Uploading) => "Uploading...",
            (Language::En, UploadStatus::Uploaded) => "Uploaded",
            (Language::En, UploadStatus::Failed(_)) => "Failed",
        }
    }
}

/// Persisted client preferences. The public base URL, when set, replaces the
/// service origin in externally shareable links.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub language: Language,
    #[serde(default, rename = "publicBaseUrl", skip_serializing_if = "Option::is_none")]
    pub public_base_url: Option<String>,
}

impl Settings {
    pub fn config_path() -> Result<PathBuf, AppError> {
        let dirs = directories::ProjectDirs::from("", "", "heron")
            .ok_or_else(|| AppError::General("could not resolve config directory".to_string()))?;
        Ok(dirs.config_dir().join("settings.json"))
    }

    pub fn load() -> Result<Settings, AppError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Missing file means first run: defaults apply.
    pub fn load_from(path: &Path) -> Result<Settings, AppError> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self) -> Result<(), AppError> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Shareable link for a file entry: the configured public base URL when
    /// set, else the service origin, joined with the entry's storage URL.
    pub fn share_url(&self, service_origin: &str, entry: &Entry) -> Option<String> {
        let file_url = entry.url.as_deref()?;
        let base = self
            .public_base_url
            .as_deref()
            .unwrap_or(service_origin)
            .trim_end_matches('/');
        Some(format!("{base}/{}", file_url.trim_start_matches('/')))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            language: Language::En,
            public_base_url: Some("https://cdn.example.com/images".to_string()),
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings.language, Language::De);
        assert!(settings.public_base_url.is_none());
    }

    #[test]
    fn share_url_prefers_the_public_base() {
        let entry = Entry {
            url: Some("/images/pets/cat.jpg".to_string()),
            ..Entry::file("pets/cat.jpg", 1)
        };
        let plain = Settings::default();
        assert_eq!(
            plain.share_url("https://host/storage", &entry).unwrap(),
            "https://host/storage/images/pets/cat.jpg"
        );
        let branded = Settings {
            public_base_url: Some("https://cdn.example.com/".to_string()),
            ..Settings::default()
        };
        assert_eq!(
            branded.share_url("https://host/storage", &entry).unwrap(),
            "https://cdn.example.com/images/pets/cat.jpg"
        );
    }

    #[test]
    fn directories_have_no_share_url() {
        let settings = Settings::default();
        assert!(settings.share_url("https://host", &Entry::directory("a")).is_none());
    }

    #[test]
    fn status_labels_follow_the_language() {
        assert_eq!(
            Language::De.upload_status_label(&UploadStatus::Ready),
            "Bereit"
        );
        assert_eq!(
            Language::En.upload_status_label(&UploadStatus::Failed("x".to_string())),
            "Failed"
        );
    }
}
