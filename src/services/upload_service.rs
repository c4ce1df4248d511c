use tokio::sync::mpsc::UnboundedSender;

use crate::error::AppError;
use crate::services::exif_probe::{self, ImageDimensions};
use crate::services::remote_store::RemoteStore;

/// The server treats `"."` as the storage root in upload requests; an empty
/// destination would be dropped from the form entirely.
pub const ROOT_FOLDER_SENTINEL: &str = ".";

#[derive(Debug, Clone, PartialEq)]
pub enum UploadStatus {
    Ready,
    Uploading,
    Uploaded,
    Failed(String),
}

/// A file selected or dropped by the user, held in memory until the batch
/// is submitted.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub struct PendingUpload {
    pub file: SelectedFile,
    pub status: UploadStatus,
    pub dimensions: Option<ImageDimensions>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    FileStarted { index: usize, name: String },
    FileFinished { index: usize, succeeded: bool, percent: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub completed: usize,
    pub total: usize,
}

impl BatchReport {
    pub fn any_succeeded(&self) -> bool {
        self.completed > 0
    }
}

/// The pending upload batch. Files go up strictly one at a time, in
/// selection order; a failed file is recorded and the loop continues.
#[derive(Default)]
pub struct UploadSession {
    pending: Vec<PendingUpload>,
}

impl UploadSession {
    /// Replaces the batch; every file starts out `Ready` with no metadata.
    pub fn select(&mut self, files: Vec<SelectedFile>) {
        self.pending = files
            .into_iter()
            .map(|file| PendingUpload {
                file,
                status: UploadStatus::Ready,
                dimensions: None,
            })
            .collect();
    }

    /// Runs the dimension probe over the batch in selection order. Failures
    /// leave `dimensions` empty; nothing here can fail the batch.
    pub fn probe_dimensions(&mut self) {
        for upload in &mut self.pending {
            upload.dimensions = exif_probe::probe(&upload.file.bytes, &upload.file.media_type);
        }
    }

    pub fn remove(&mut self, index: usize) {
        if index < self.pending.len() {
            self.pending.remove(index);
        }
    }

    pub fn pending(&self) -> &[PendingUpload] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn reset(&mut self) {
        self.pending.clear();
    }

    /// Picks the destination from the free-text override when present, else
    /// the selector value; the empty string (storage root) becomes the
    /// sentinel the server expects.
    pub fn resolve_destination(selected: &str, custom: Option<&str>) -> String {
        let choice = custom
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(selected)
            .trim();
        if choice.is_empty() {
            ROOT_FOLDER_SENTINEL.to_string()
        } else {
            choice.to_string()
        }
    }

    /// Submits the batch sequentially: the next file is not sent until the
    /// previous one has resolved. Statuses transition Ready -> Uploading ->
    /// Uploaded | Failed per file. On at least partial success the session
    /// resets; an all-failed batch stays pending for retry.
    pub async fn upload<S: RemoteStore>(
        &mut self,
        store: &S,
        destination: &str,
        progress: Option<&UnboundedSender<UploadEvent>>,
    ) -> Result<BatchReport, AppError> {
        if self.pending.is_empty() {
            return Err(AppError::Validation("no files selected".to_string()));
        }

        let total = self.pending.len();
        let mut completed = 0;

        for (index, upload) in self.pending.iter_mut().enumerate() {
            if let Some(progress) = progress {
                let _ = progress.send(UploadEvent::FileStarted {
                    index,
                    name: upload.file.name.clone(),
                });
            }
            upload.status = UploadStatus::Uploading;

            let result = store
                .upload(
                    &upload.file.name,
                    upload.file.bytes.clone(),
                    &upload.file.media_type,
                    Some(destination),
                )
                .await;

            let succeeded = match result {
                Ok(_) => {
                    upload.status = UploadStatus::Uploaded;
                    completed += 1;
                    true
                }
                Err(err) => {
                    tracing::warn!(file = %upload.file.name, error = %err, "upload failed");
                    upload.status = UploadStatus::Failed(err.to_string());
                    false
                }
            };

            if let Some(progress) = progress {
                let _ = progress.send(UploadEvent::FileFinished {
                    index,
                    succeeded,
                    percent: completed as f64 / total as f64 * 100.0,
                });
            }
        }

        let report = BatchReport { completed, total };
        if report.any_succeeded() {
            self.reset();
        }
        Ok(report)
    }
}
