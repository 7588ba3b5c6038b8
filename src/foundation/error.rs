/// Crate-wide result alias.
pub type WarpResult<T> = Result<T, WarpError>;

/// Errors surfaced by warp nodes, samplers and the lens-model registry.
///
/// Parameter problems are reported as [`WarpError::Validation`] at the moment the parameter is
/// set or the model is constructed, never later during tile computation.
#[derive(thiserror::Error, Debug)]
pub enum WarpError {
    /// A parameter, filter name, lens model id or format failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// A computation could not be carried out (missing channel, bad buffer size, ...).
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Configuration could not be parsed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WarpError {
    /// Build a [`WarpError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`WarpError::Evaluation`].
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`WarpError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for WarpError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
