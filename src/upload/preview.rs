/// Local preview generation
/// Turns a picked file into a base64 data URL; nothing leaves the machine
use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};

use super::file::FileHandle;
use crate::error::UploadError;

const FALLBACK_MIME: &str = "application/octet-stream";

/// Reads the full contents of a file
pub trait FileReader: Send + Sync {
    fn read_all(&self, file: &FileHandle) -> Result<Vec<u8>, UploadError>;
}

/// Reader for files already held in memory
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryFileReader;

impl FileReader for MemoryFileReader {
    fn read_all(&self, file: &FileHandle) -> Result<Vec<u8>, UploadError> {
        Ok(file.bytes.to_vec())
    }
}

#[derive(Clone)]
pub struct PreviewEncoder {
    reader: Arc<dyn FileReader>,
}

impl Default for PreviewEncoder {
    fn default() -> Self {
        Self::new(Arc::new(MemoryFileReader))
    }
}

impl PreviewEncoder {
    pub fn new(reader: Arc<dyn FileReader>) -> Self {
        Self { reader }
    }

    /// Encode the whole file as `data:<mime>;base64,<payload>`
    ///
    /// Single shot: either the complete URL or a `ReadError`.
    pub async fn encode(&self, file: &FileHandle) -> Result<String, UploadError> {
        let reader = Arc::clone(&self.reader);
        let file = file.clone();
        tokio::task::spawn_blocking(move || -> Result<String, UploadError> {
            let bytes = reader.read_all(&file)?;
            Ok(to_data_url(&file.mime, &bytes))
        })
        .await
        .map_err(|e| UploadError::ReadError(format!("Task join error: {}", e)))?
    }
}

pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    let mime = if mime.is_empty() { FALLBACK_MIME } else { mime };
    format!("data:{};base64,{}", mime, general_purpose::STANDARD.encode(bytes))
}

/// Parse a base64 data URL back into its MIME type and bytes
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>), UploadError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| UploadError::ReadError("not a data URL".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| UploadError::ReadError("data URL has no payload".to_string()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| UploadError::ReadError("data URL is not base64".to_string()))?;

    let bytes = general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| UploadError::ReadError(e.to_string()))?;

    let mime = if mime.is_empty() { FALLBACK_MIME } else { mime };
    Ok((mime.to_string(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenReader;

    impl FileReader for BrokenReader {
        fn read_all(&self, _file: &FileHandle) -> Result<Vec<u8>, UploadError> {
            Err(UploadError::ReadError("disk on fire".to_string()))
        }
    }

    #[tokio::test]
    async fn test_encode_full_contents() {
        let file = FileHandle::from_bytes("a.jpg", "image/jpeg", b"hello".to_vec());
        let url = PreviewEncoder::default().encode(&file).await.unwrap();
        assert_eq!(url, "data:image/jpeg;base64,aGVsbG8=");
    }

    #[tokio::test]
    async fn test_encode_reports_read_error() {
        let file = FileHandle::from_bytes("a.jpg", "image/jpeg", b"hello".to_vec());
        let result = PreviewEncoder::new(Arc::new(BrokenReader)).encode(&file).await;
        assert_eq!(result, Err(UploadError::ReadError("disk on fire".to_string())));
    }

    #[test]
    fn test_unknown_type_falls_back() {
        assert_eq!(to_data_url("", &[0xff]), "data:application/octet-stream;base64,/w==");
    }

    #[test]
    fn test_decode_data_url() {
        let (mime, bytes) = decode_data_url("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, b"hello");

        assert!(decode_data_url("https://example.com/a.png").is_err());
        assert!(decode_data_url("data:image/png,hello").is_err());
        assert!(decode_data_url("data:image/png;base64,@@@").is_err());
    }
}
