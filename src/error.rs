use thiserror::Error;

/// Failures at the content-gateway boundary.
///
/// `Malformed` never leaves the gateway: list/object-shaped responses that
/// fail validation degrade to empty or sentinel content so UI flows stay
/// usable. `Transport` and `NoContent` surface to components as retryable,
/// component-local error state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("generation service unavailable: {0}")]
    Transport(String),

    #[error("generation service returned no content")]
    NoContent,

    #[error("malformed generated content: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum ProgressError {
    #[error("progress database error: {0}")]
    Database(#[from] rusqlite::Error),
}
