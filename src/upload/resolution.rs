/// Pixel resolution reader
///
/// The file's bytes are exposed through a temporary URL, decoded as an image,
/// and the natural width/height read back. Decoding and URL handling are
/// capabilities so the validator can be exercised without real images.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task;

use super::file::FileHandle;
use crate::error::UploadError;

/// Natural pixel dimensions of a decoded image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageResolution {
    pub width: u32,
    pub height: u32,
}

/// Decodes raw bytes far enough to know the image dimensions
pub trait ImageDecoder: Send + Sync {
    fn natural_size(&self, bytes: &[u8]) -> Result<ImageResolution, UploadError>;
}

/// Hands out short-lived URLs that refer to a file's bytes
pub trait TemporaryUrlProvider: Send + Sync {
    fn create(&self, file: &FileHandle) -> String;
    fn resolve(&self, url: &str) -> Option<Arc<[u8]>>;
    fn revoke(&self, url: &str);
}

/// Decoder backed by the `image` crate
///
/// Only the header is parsed; the format is guessed from the content, not
/// from the declared MIME type.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateDecoder;

impl ImageDecoder for ImageCrateDecoder {
    fn natural_size(&self, bytes: &[u8]) -> Result<ImageResolution, UploadError> {
        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| UploadError::DecodeError(e.to_string()))?;

        if reader.format().is_none() {
            return Err(UploadError::DecodeError("unrecognized image format".to_string()));
        }

        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| UploadError::DecodeError(e.to_string()))?;

        Ok(ImageResolution { width, height })
    }
}

/// In-memory `blob:` URL table
#[derive(Debug, Default)]
pub struct BlobUrlRegistry {
    next_id: AtomicU64,
    entries: Mutex<HashMap<String, Arc<[u8]>>>,
}

impl BlobUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of URLs created and not yet revoked
    #[cfg(test)]
    pub fn live_count(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }
}

impl TemporaryUrlProvider for BlobUrlRegistry {
    fn create(&self, file: &FileHandle) -> String {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let url = format!("blob:avatar-uploader/{}", id);
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(url.clone(), Arc::clone(&file.bytes));
        }
        url
    }

    fn resolve(&self, url: &str) -> Option<Arc<[u8]>> {
        self.entries.lock().ok()?.get(url).cloned()
    }

    fn revoke(&self, url: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(url);
        }
    }
}

/// A temporary URL that is revoked when dropped
pub struct TemporaryUrl<'a> {
    provider: &'a dyn TemporaryUrlProvider,
    url: String,
}

impl<'a> TemporaryUrl<'a> {
    pub fn acquire(provider: &'a dyn TemporaryUrlProvider, file: &FileHandle) -> Self {
        let url = provider.create(file);
        Self { provider, url }
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl Drop for TemporaryUrl<'_> {
    fn drop(&mut self) {
        log::debug!("Revoking {}", self.url);
        self.provider.revoke(&self.url);
    }
}

/// Reads pixel dimensions of picked files
#[derive(Clone)]
pub struct ResolutionReader {
    decoder: Arc<dyn ImageDecoder>,
    urls: Arc<dyn TemporaryUrlProvider>,
}

impl Default for ResolutionReader {
    fn default() -> Self {
        Self::new(Arc::new(ImageCrateDecoder), Arc::new(BlobUrlRegistry::new()))
    }
}

impl ResolutionReader {
    pub fn new(decoder: Arc<dyn ImageDecoder>, urls: Arc<dyn TemporaryUrlProvider>) -> Self {
        Self { decoder, urls }
    }

    /// Decode the file as an image and return its natural size
    ///
    /// Fails with `DecodeError` when the bytes are not an image. No retry.
    pub async fn read(&self, file: &FileHandle) -> Result<ImageResolution, UploadError> {
        let url = TemporaryUrl::acquire(self.urls.as_ref(), file);
        let bytes = self
            .urls
            .resolve(url.as_str())
            .ok_or_else(|| UploadError::DecodeError(format!("{} is not available", url.as_str())))?;

        // Spawn blocking because decoding is CPU-bound
        let decoder = Arc::clone(&self.decoder);
        let resolution = task::spawn_blocking(move || decoder.natural_size(&bytes))
            .await
            .map_err(|e| UploadError::DecodeError(format!("Task join error: {}", e)))??;

        log::debug!("{} is {}x{}", file.name, resolution.width, resolution.height);
        Ok(resolution)
    }
}
