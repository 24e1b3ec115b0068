use thiserror::Error;

pub type PaymentResult<T> = std::result::Result<T, PaymentError>;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("provider rejected the request ({status}): {message}")]
    ProviderError { status: u16, message: String },
    #[error("signature header is malformed")]
    SignatureHeaderMalformed,
    #[error("signature does not match the payload")]
    SignatureMismatch,
    #[error("signature timestamp {timestamp} is outside the tolerance window")]
    SignatureExpired { timestamp: i64 },
    #[error("payload error: {0}")]
    PayloadError(#[from] serde_json::Error),
    #[error("checkout session `{session_id}` has invalid metadata: {reason}")]
    InvalidMetadata { session_id: String, reason: String },
    #[error("checkout session `{session_id}` references an unknown item {item_id}")]
    UnknownItem { session_id: String, item_id: uuid::Uuid },
    #[error("database error: {0}")]
    DatabaseError(#[from] crate::model::DatabaseError),
}

impl PaymentError {
    /// Errors caused by what the caller sent rather than by this server.
    pub fn is_rejected_payload(&self) -> bool {
        matches!(
            self,
            Self::SignatureHeaderMalformed
                | Self::SignatureMismatch
                | Self::SignatureExpired { .. }
                | Self::PayloadError(_)
                | Self::InvalidMetadata { .. }
                | Self::UnknownItem { .. }
        )
    }
}
