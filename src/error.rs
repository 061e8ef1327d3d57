/// Error types shared by the upload pipeline
///
/// The `Display` text of every variant is what the user sees in the
/// notification toast, so each message names the specific failed check.
use thiserror::Error;

/// Everything that can stop a file from becoming the displayed avatar
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// Declared MIME type is not the accepted one
    #[error("You can only upload {} file!", type_label(.expected))]
    InvalidType { expected: String, found: String },

    /// File is not strictly smaller than the size limit
    #[error("Image must be smaller than {}!", size_label(.max))]
    TooLarge { size: u64, max: u64 },

    /// At least one pixel dimension is above its maximum
    #[error("Image resolution invalid max. {max_width}x{max_height}")]
    ResolutionExceeded {
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    },

    /// Bytes could not be decoded as an image
    #[error("Could not read image: {0}")]
    DecodeError(String),

    /// File contents could not be read
    #[error("Could not read file: {0}")]
    ReadError(String),

    /// Reported by the upload transport, opaque to the widget
    #[error("Upload failed: {0}")]
    TransportError(String),
}

/// "image/jpeg" -> "JPG", "image/png" -> "PNG"
fn type_label(mime: &str) -> String {
    match mime {
        "image/jpeg" => "JPG".to_string(),
        other => other
            .rsplit('/')
            .next()
            .unwrap_or(other)
            .to_uppercase(),
    }
}

fn size_label(bytes: &u64) -> String {
    const MIB: u64 = 1024 * 1024;
    let bytes = *bytes;
    if bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes % 1024 == 0 {
        format!("{}KB", bytes / 1024)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Errors raised while loading the uploader configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_checks() {
        let err = UploadError::InvalidType {
            expected: "image/jpeg".into(),
            found: "image/png".into(),
        };
        assert_eq!(err.to_string(), "You can only upload JPG file!");

        let err = UploadError::TooLarge { size: 3 * 1024 * 1024, max: 2 * 1024 * 1024 };
        assert_eq!(err.to_string(), "Image must be smaller than 2MB!");

        let err = UploadError::ResolutionExceeded {
            width: 1025,
            height: 768,
            max_width: 1024,
            max_height: 1024,
        };
        assert_eq!(err.to_string(), "Image resolution invalid max. 1024x1024");
    }

    #[test]
    fn test_other_type_labels() {
        let err = UploadError::InvalidType {
            expected: "image/png".into(),
            found: String::new(),
        };
        assert_eq!(err.to_string(), "You can only upload PNG file!");
        assert_eq!(size_label(&(512 * 1024)), "512KB");
        assert_eq!(size_label(&1000), "1000 bytes");
    }
}
