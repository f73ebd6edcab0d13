/// Convenience result type used across moshpit.
pub type MoshResult<T> = Result<T, MoshError>;

/// Top-level error taxonomy.
///
/// Errors only surface at the edges (frame construction, chain loading, image IO).
/// The per-frame effect path degrades instead of failing; see [`crate::ChainDriver`].
#[derive(thiserror::Error, Debug)]
pub enum MoshError {
    /// Invalid user-provided data (dimensions, ids, thread counts).
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed chain documents or unknown effect kinds.
    #[error("config error: {0}")]
    Config(String),

    /// Pixel buffers that do not match their declared dimensions.
    #[error("frame error: {0}")]
    Frame(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MoshError {
    /// Build a [`MoshError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MoshError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`MoshError::Frame`] value.
    pub fn frame(msg: impl Into<String>) -> Self {
        Self::Frame(msg.into())
    }

    /// Build a [`MoshError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for MoshError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
