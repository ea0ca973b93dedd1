use thiserror::Error;

/// Top-level failures while decoding an inbound notification.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Envelope contains no records")]
    EmptyEnvelope,

    #[error("Invalid alarm payload: {0}")]
    Payload(String),
}

/// Failures while turning an extracted literal into a number.
///
/// These never abort delivery; they are rendered into the message body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReasonError {
    #[error("exponent {0} is out of range")]
    ExponentOutOfRange(String),

    /// Unreachable for literals accepted by the scanner; kept so parsing never panics.
    #[error("invalid numeric literal: {0}")]
    InvalidLiteral(String),
}
