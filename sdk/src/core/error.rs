use solana_sdk::signature::Signature;
use thiserror::Error;

/// Broad class of a failure, used to pick the notification shown to the user
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Upload,
    Publish,
    Build,
    Wallet,
    Broadcast,
    Confirmation,
    Other,
}

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Image upload failed: {0}")]
    Upload(String),

    #[error("Metadata publish failed: {0}")]
    Publish(String),

    #[error("Transaction build failed: {0}")]
    Build(String),

    #[error("Invalid amount: {0}")]
    Amount(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Broadcast failed: {message}")]
    Broadcast {
        message: String,
        signature: Option<Signature>,
    },

    #[error("Confirmation failed for {signature}: {message}")]
    Confirmation { message: String, signature: Signature },

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Form submission failed: {0}")]
    Form(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("A submission is already in flight")]
    SubmissionInFlight,

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl SdkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SdkError::Validation(_) | SdkError::SubmissionInFlight | SdkError::InvalidState(_) => {
                ErrorKind::Validation
            }
            SdkError::Upload(_) => ErrorKind::Upload,
            SdkError::Publish(_) => ErrorKind::Publish,
            SdkError::Build(_) | SdkError::Amount(_) => ErrorKind::Build,
            SdkError::Wallet(_) => ErrorKind::Wallet,
            SdkError::Broadcast { .. } => ErrorKind::Broadcast,
            SdkError::Confirmation { .. } => ErrorKind::Confirmation,
            _ => ErrorKind::Other,
        }
    }

    /// Signature attached to the failure, if the transaction got that far
    pub fn signature(&self) -> Option<Signature> {
        match self {
            SdkError::Broadcast { signature, .. } => *signature,
            SdkError::Confirmation { signature, .. } => Some(*signature),
            _ => None,
        }
    }
}

impl From<solana_client::client_error::ClientError> for SdkError {
    fn from(err: solana_client::client_error::ClientError) -> Self {
        SdkError::Rpc(err.to_string())
    }
}

impl From<reqwest::Error> for SdkError {
    fn from(err: reqwest::Error) -> Self {
        SdkError::Rpc(err.to_string())
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(err: serde_json::Error) -> Self {
        SdkError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for SdkError {
    fn from(err: std::io::Error) -> Self {
        SdkError::Config(err.to_string())
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
