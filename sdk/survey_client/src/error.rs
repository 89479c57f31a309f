use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("rating {rating} is outside {min}..={max}")]
    RatingOutOfRange { rating: i64, min: u32, max: u32 },

    #[error("department {0} is not part of this survey")]
    InvalidDepartment(i64),

    #[error("transaction reverted with contract error {code}")]
    Reverted { code: u32 },

    #[error("viewer is not authorized to decrypt these aggregates")]
    DecryptRejected,

    #[error("decryption authorization expired or unknown")]
    AuthorizationExpired,

    #[error("malformed encrypted input: {0}")]
    MalformedInput(String),

    #[error("invalid client configuration: {0}")]
    Config(String),

    #[error("ledger gateway unavailable: {0}")]
    Gateway(String),
}

impl ClientError {
    /// Input-validation failures are raised before any encryption or
    /// network cost is incurred.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ClientError::RatingOutOfRange { .. } | ClientError::InvalidDepartment(_)
        )
    }
}
