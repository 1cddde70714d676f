use std::sync::Arc;

use tracing::{info, warn};

use super::PinningService;
use crate::core::{SdkError, SdkResult, TokenDraft};

/// Publishes the off-chain metadata document of a token
pub struct MetadataPublisher {
    pinning: Arc<dyn PinningService>,
}

impl MetadataPublisher {
    pub fn new(pinning: Arc<dyn PinningService>) -> Self {
        Self { pinning }
    }

    /// Pin `{ name, symbol, description, image }` and return its URI.
    ///
    /// Missing fields fail with a validation error before any request.
    pub async fn publish(&self, draft: &TokenDraft) -> SdkResult<String> {
        let document = draft.metadata_document()?;
        let json = serde_json::to_value(&document)?;

        match self.pinning.pin_json(&json).await {
            Ok(uri) => {
                info!(name = %document.name, symbol = %document.symbol, %uri, "Metadata published");
                Ok(uri)
            }
            Err(e) => {
                warn!(error = %e, "Metadata publish failed");
                Err(match e {
                    SdkError::Publish(_) => e,
                    other => SdkError::Publish(other.to_string()),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPinning;

    fn draft() -> TokenDraft {
        TokenDraft {
            name: "Test".to_string(),
            symbol: "TST".to_string(),
            decimals: "6".to_string(),
            amount: "100".to_string(),
            image: "https://gw/x.png".to_string(),
            description: "x".to_string(),
        }
    }

    #[tokio::test]
    async fn test_publishes_display_fields_only() {
        let pinning = Arc::new(MockPinning::new());
        let uri = MetadataPublisher::new(pinning.clone())
            .publish(&draft())
            .await
            .unwrap();
        assert_eq!(uri, "https://gateway.test/ipfs/json-1");

        let document = &pinning.documents()[0];
        assert_eq!(document["symbol"], "TST");
        assert_eq!(document["image"], "https://gw/x.png");
        assert!(document.get("amount").is_none());
    }

    #[tokio::test]
    async fn test_incomplete_draft_makes_no_call() {
        let pinning = Arc::new(MockPinning::new());
        let mut incomplete = draft();
        incomplete.description.clear();
        let err = MetadataPublisher::new(pinning.clone())
            .publish(&incomplete)
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Validation(_)));
        assert_eq!(pinning.json_calls(), 0);
    }

    #[tokio::test]
    async fn test_remote_failure_is_publish_error() {
        let pinning = Arc::new(MockPinning::new());
        pinning.fail_json(true);
        let err = MetadataPublisher::new(pinning).publish(&draft()).await.unwrap_err();
        assert!(matches!(err, SdkError::Publish(_)));
    }
}
