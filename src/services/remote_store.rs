use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;
use crate::models::entry::Entry;
use crate::remote_path;

/// The JSON API of the storage service. Components are generic over this
/// trait so tests can run against an in-memory double.
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    async fn list(&self, path: &str) -> Result<Vec<Entry>, AppError>;
    async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        media_type: &str,
        folder: Option<&str>,
    ) -> Result<Value, AppError>;
    async fn rename_file(&self, path: &str, new_name: &str) -> Result<(), AppError>;
    async fn delete_file(&self, path: &str) -> Result<(), AppError>;
    async fn create_folder(&self, path: &str) -> Result<(), AppError>;
    async fn delete_folder(&self, path: &str) -> Result<(), AppError>;
    async fn rename_folder(&self, old_path: &str, new_path: &str) -> Result<(), AppError>;
}

pub struct HttpRemoteStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRemoteStore {
    /// `base_url` is the service prefix, e.g. `https://host/storage`.
    pub fn new(base_url: &str) -> Self {
        HttpRemoteStore {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Maps a response per the API convention: non-2xx with a JSON `{error}`
/// body carries the server message; non-JSON errors collapse to the status
/// code; a 2xx body that fails to parse is a malformed response. Mutation
/// endpoints may answer with a non-JSON body, accepted as the default value.
async fn decode<T>(response: reqwest::Response) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned + Default,
{
    let status = response.status();
    let is_json = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"));

    if !status.is_success() {
        if is_json {
            if let Ok(ErrorBody { error: Some(message) }) = response.json::<ErrorBody>().await {
                return Err(AppError::Api(message));
            }
        }
        return Err(AppError::Status(status.as_u16()));
    }

    if is_json {
        response
            .json::<T>()
            .await
            .map_err(|_| AppError::MalformedResponse(status.as_u16()))
    } else {
        Ok(T::default())
    }
}

impl RemoteStore for HttpRemoteStore {
    async fn list(&self, path: &str) -> Result<Vec<Entry>, AppError> {
        let response = self
            .client
            .get(self.endpoint("/api/list"))
            .query(&[("path", path)])
            .send()
            .await?;
        let mut entries: Vec<Entry> = decode(response).await?;
        // Older server variants omit `path` on file records.
        for entry in &mut entries {
            if entry.path.is_empty() {
                entry.path = remote_path::join(path, &entry.name);
            }
        }
        Ok(entries)
    }

    async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        media_type: &str,
        folder: Option<&str>,
    ) -> Result<Value, AppError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(media_type)?;
        let mut form = reqwest::multipart::Form::new().part("file", part);
        if let Some(folder) = folder {
            form = form.text("folder", folder.to_string());
        }
        let response = self
            .client
            .post(self.endpoint("/api/upload"))
            .multipart(form)
            .send()
            .await?;
        decode(response).await
    }

    async fn rename_file(&self, path: &str, new_name: &str) -> Result<(), AppError> {
        let response = self
            .client
            .post(self.endpoint("/api/file/rename"))
            .json(&serde_json::json!({ "path": path, "newName": new_name }))
            .send()
            .await?;
        decode::<Value>(response).await.map(|_| ())
    }

    async fn delete_file(&self, path: &str) -> Result<(), AppError> {
        let response = self
            .client
            .delete(self.endpoint("/api/file"))
            .json(&serde_json::json!({ "path": path }))
            .send()
            .await?;
        decode::<Value>(response).await.map(|_| ())
    }

    async fn create_folder(&self, path: &str) -> Result<(), AppError> {
        let response = self
            .client
            .post(self.endpoint("/api/folder"))
            .json(&serde_json::json!({ "path": path }))
            .send()
            .await?;
        decode::<Value>(response).await.map(|_| ())
    }

    async fn delete_folder(&self, path: &str) -> Result<(), AppError> {
        let response = self
            .client
            .delete(self.endpoint("/api/folder"))
            .json(&serde_json::json!({ "path": path }))
            .send()
            .await?;
        decode::<Value>(response).await.map(|_| ())
    }

    async fn rename_folder(&self, old_path: &str, new_path: &str) -> Result<(), AppError> {
        let response = self
            .client
            .post(self.endpoint("/api/folder/rename"))
            .json(&serde_json::json!({ "oldPath": old_path, "newPath": new_path }))
            .send()
            .await?;
        decode::<Value>(response).await.map(|_| ())
    }
}
