/// Pre-upload validation
///
/// Decides whether a picked file may be handed to the transport. Type and
/// size are checked synchronously and independently; the pixel resolution is
/// only read when both pass. Every failed check is notified once.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::file::FileHandle;
use super::resolution::{ImageResolution, ResolutionReader};
use crate::error::UploadError;
use crate::state::notifications::Notifier;

/// Limits a file must satisfy before upload
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ValidationRules {
    /// Exact MIME type accepted (e.g. "image/jpeg")
    pub accepted_type: String,
    /// Files must be strictly smaller than this many bytes
    pub max_bytes: u64,
    /// Inclusive pixel bounds
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            accepted_type: "image/jpeg".to_string(),
            max_bytes: 2 * 1024 * 1024,
            max_width: 1024,
            max_height: 1024,
        }
    }
}

impl ValidationRules {
    /// Synchronous type and size checks
    ///
    /// Both failures are returned when both fail.
    pub fn precheck(&self, file: &FileHandle) -> Vec<UploadError> {
        let mut errors = Vec::new();

        if file.mime != self.accepted_type {
            errors.push(UploadError::InvalidType {
                expected: self.accepted_type.clone(),
                found: file.mime.clone(),
            });
        }

        if file.size() >= self.max_bytes {
            errors.push(UploadError::TooLarge {
                size: file.size(),
                max: self.max_bytes,
            });
        }

        errors
    }

    pub fn check_resolution(&self, resolution: ImageResolution) -> Result<(), UploadError> {
        if resolution.width <= self.max_width && resolution.height <= self.max_height {
            Ok(())
        } else {
            Err(UploadError::ResolutionExceeded {
                width: resolution.width,
                height: resolution.height,
                max_width: self.max_width,
                max_height: self.max_height,
            })
        }
    }
}

/// Outcome of validating one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allowed(ImageResolution),
    Rejected(Vec<UploadError>),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed(_))
    }
}

#[derive(Clone)]
pub struct Validator {
    rules: ValidationRules,
    resolution: ResolutionReader,
    notifier: Arc<dyn Notifier>,
}

impl Validator {
    pub fn new(rules: ValidationRules, resolution: ResolutionReader, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            rules,
            resolution,
            notifier,
        }
    }

    pub async fn validate(&self, file: &FileHandle) -> Verdict {
        let errors = self.rules.precheck(file);
        if !errors.is_empty() {
            return self.reject(file, errors);
        }

        let resolution = match self.resolution.read(file).await {
            Ok(resolution) => resolution,
            Err(e) => return self.reject(file, vec![e]),
        };

        if let Err(e) = self.rules.check_resolution(resolution) {
            return self.reject(file, vec![e]);
        }

        log::info!(
            "✅ {} accepted ({} bytes, {}x{})",
            file.name,
            file.size(),
            resolution.width,
            resolution.height
        );
        Verdict::Allowed(resolution)
    }

    fn reject(&self, file: &FileHandle, errors: Vec<UploadError>) -> Verdict {
        for error in &errors {
            log::debug!("{} rejected: {:?}", file.name, error);
            self.notifier.notify(&error.to_string());
        }
        Verdict::Rejected(errors)
    }
}
