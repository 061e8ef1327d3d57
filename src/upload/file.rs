/// A file picked by the user, held in memory for one upload cycle
use std::path::Path;
use std::sync::Arc;

use crate::error::UploadError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    /// Filename only (e.g., "me.jpg")
    pub name: String,
    /// Declared MIME type, empty when the picker could not tell
    pub mime: String,
    /// Full file contents, shared between clones
    pub bytes: Arc<[u8]>,
}

impl FileHandle {
    pub fn from_bytes(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes: Arc::from(bytes),
        }
    }

    /// Read a file from disk
    ///
    /// The MIME type is declared from the extension, the way a browser file
    /// picker reports it; the contents are not sniffed.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, UploadError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| UploadError::ReadError(format!("{}: {}", path.display(), e)))?;

        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let mime = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or_default()
            .to_string();

        log::debug!("Loaded {} ({} bytes, type {:?})", name, bytes.len(), mime);
        Ok(Self::from_bytes(name, mime, bytes))
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}
