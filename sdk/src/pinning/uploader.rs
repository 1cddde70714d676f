use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use super::PinningService;
use crate::core::{SdkError, SdkResult, IMAGE_EXTENSIONS};

/// Content type for an accepted image file name
pub fn image_content_type(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, content_type)| *content_type)
}

/// Uploads token images to the pinning service
pub struct MediaUploader {
    pinning: Arc<dyn PinningService>,
    max_file_bytes: u64,
}

impl MediaUploader {
    pub fn new(pinning: Arc<dyn PinningService>, max_file_bytes: u64) -> Self {
        Self {
            pinning,
            max_file_bytes,
        }
    }

    pub fn with_max_file_bytes(mut self, max_file_bytes: u64) -> Self {
        self.max_file_bytes = max_file_bytes;
        self
    }

    /// Upload `bytes` named `file_name`; one request, no retry
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> SdkResult<String> {
        let content_type = image_content_type(file_name).ok_or_else(|| {
            SdkError::Upload(format!("{} is not a png, jpg or gif image", file_name))
        })?;
        if bytes.is_empty() {
            return Err(SdkError::Upload(format!("{} is empty", file_name)));
        }
        if bytes.len() as u64 > self.max_file_bytes {
            return Err(SdkError::Upload(format!(
                "{} is {} bytes, the limit is {}",
                file_name,
                bytes.len(),
                self.max_file_bytes
            )));
        }

        let size = bytes.len();
        match self.pinning.pin_file(file_name, content_type, bytes).await {
            Ok(url) => {
                info!(file_name, size, %url, "Image uploaded");
                Ok(url)
            }
            Err(e) => {
                warn!(file_name, error = %e, "Image upload failed");
                Err(match e {
                    SdkError::Upload(_) => e,
                    other => SdkError::Upload(other.to_string()),
                })
            }
        }
    }

    /// Read a local file and upload it
    pub async fn upload_path(&self, path: &Path) -> SdkResult<String> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| SdkError::Upload(format!("{} has no file name", path.display())))?
            .to_string();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| SdkError::Upload(format!("Failed to read {}: {}", path.display(), e)))?;
        self.upload(&file_name, bytes).await
    }
}
