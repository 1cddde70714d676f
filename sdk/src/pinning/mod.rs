//! Off-chain storage for token images and metadata documents

pub mod pinata;
pub mod publisher;
pub mod uploader;

use async_trait::async_trait;

use crate::core::SdkResult;

pub use pinata::PinataClient;
pub use publisher::MetadataPublisher;
pub use uploader::{image_content_type, MediaUploader};

/// Pinning collaborator: stores content and hands back a public URL
#[async_trait]
pub trait PinningService: Send + Sync {
    /// Pin raw bytes, returning the gateway URL
    async fn pin_file(&self, file_name: &str, content_type: &str, bytes: Vec<u8>)
        -> SdkResult<String>;

    /// Pin a JSON document, returning the gateway URL
    async fn pin_json(&self, document: &serde_json::Value) -> SdkResult<String>;
}
