pub mod controller;
pub mod error;
pub mod models;
pub mod remote_path;
pub mod services;
pub mod settings;

use controller::NamespaceController;
use error::AppError;
use services::remote_store::RemoteStore;
use services::upload_service::{BatchReport, SelectedFile, UploadEvent, UploadSession};
use settings::Settings;
use tokio::sync::mpsc::UnboundedSender;

/// Everything the frontends need, constructed once at startup and passed by
/// reference. There is no ambient global state.
pub struct AppContext<S> {
    pub controller: NamespaceController<S>,
    pub uploads: UploadSession,
    pub settings: Settings,
}

impl<S: RemoteStore> AppContext<S> {
    pub fn new(store: S, settings: Settings) -> Self {
        AppContext {
            controller: NamespaceController::new(store),
            uploads: UploadSession::default(),
            settings,
        }
    }

    /// Initial load: folder tree plus the root listing.
    pub async fn start(&self) -> Result<(), AppError> {
        self.controller.refresh().await
    }

    /// Replaces the pending upload batch and probes dimensions per file.
    pub fn select_files(&mut self, files: Vec<SelectedFile>) {
        self.uploads.select(files);
        self.uploads.probe_dimensions();
    }

    /// Runs the upload batch and, when at least one file made it, refreshes
    /// the tree and the current folder so the new files become visible.
    pub async fn upload_to(
        &mut self,
        destination: &str,
        progress: Option<&UnboundedSender<UploadEvent>>,
    ) -> Result<BatchReport, AppError> {
        let report = self
            .uploads
            .upload(self.controller.store(), destination, progress)
            .await?;
        if report.any_succeeded() {
            self.controller.refresh().await?;
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::remote_store::fake::FakeStore;

    fn jpeg(name: &str) -> SelectedFile {
        SelectedFile {
            name: name.to_string(),
            media_type: "image/jpeg".to_string(),
            bytes: vec![0xFF, 0xD8],
        }
    }

    #[tokio::test]
    async fn partial_upload_success_still_refreshes() {
        let store = FakeStore::default();
        store.fail_upload("bad.jpg");
        let mut app = AppContext::new(store, Settings::default());
        app.start().await.unwrap();
        app.select_files(vec![jpeg("good.jpg"), jpeg("bad.jpg")]);

        let before = app.controller.store().calls().len();
        let report = app.upload_to("photos", None).await.unwrap();

        assert_eq!(report, BatchReport { completed: 1, total: 2 });
        let calls = app.controller.store().calls();
        // Both uploads went out, then the refresh listed the tree and folder.
        assert!(calls[before..].iter().any(|c| c.starts_with("list")));
        assert!(app.uploads.is_empty());
    }

    #[tokio::test]
    async fn all_failed_upload_skips_the_refresh() {
        let store = FakeStore::default();
        store.fail_upload("bad.jpg");
        let mut app = AppContext::new(store, Settings::default());
        app.start().await.unwrap();
        app.select_files(vec![jpeg("bad.jpg")]);

        let before = app.controller.store().calls().len();
        let report = app.upload_to(".", None).await.unwrap();

        assert!(!report.any_succeeded());
        let calls = app.controller.store().calls();
        assert_eq!(calls[before..], ["upload bad.jpg -> .".to_string()]);
        assert!(!app.uploads.is_empty());
    }
}
