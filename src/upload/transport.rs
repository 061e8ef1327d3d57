/// Upload transport boundary
/// The widget only consumes lifecycle events; the placeholder transport
/// below never opens a connection.
use std::time::Duration;

use super::file::FileHandle;
use crate::error::UploadError;

/// Lifecycle notifications for one file
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    Uploading { file: FileHandle },
    Done { file: FileHandle, response: TransportResponse },
    Error { file: FileHandle, error: UploadError },
}

impl UploadEvent {
    pub fn file(&self) -> &FileHandle {
        match self {
            UploadEvent::Uploading { file }
            | UploadEvent::Done { file, .. }
            | UploadEvent::Error { file, .. } => file,
        }
    }
}

/// What the destination would have answered
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub destination: String,
    pub body: serde_json::Value,
}

/// Inert transport: waits, then acknowledges without sending anything
#[derive(Debug, Clone)]
pub struct PlaceholderTransport {
    destination: String,
    field_name: String,
    latency: Duration,
}

impl PlaceholderTransport {
    pub fn new(destination: impl Into<String>, field_name: impl Into<String>, latency: Duration) -> Self {
        Self {
            destination: destination.into(),
            field_name: field_name.into(),
            latency,
        }
    }

    pub async fn send(&self, file: &FileHandle) -> Result<TransportResponse, UploadError> {
        if self.destination.trim().is_empty() {
            return Err(UploadError::TransportError("no destination configured".to_string()));
        }

        log::info!("⬆️  Uploading {} to {}", file.name, self.destination);
        tokio::time::sleep(self.latency).await;

        Ok(TransportResponse {
            destination: self.destination.clone(),
            body: serde_json::json!({
                "field": self.field_name,
                "name": file.name,
                "type": file.mime,
                "size": file.size(),
            }),
        })
    }

    /// Run the transport and map the outcome to the terminal lifecycle event
    pub async fn upload(&self, file: FileHandle) -> UploadEvent {
        match self.send(&file).await {
            Ok(response) => UploadEvent::Done { file, response },
            Err(error) => UploadEvent::Error { file, error },
        }
    }
}
