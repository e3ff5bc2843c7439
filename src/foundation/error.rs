/// Convenience result type used across brandwave.
pub type BrandwaveResult<T> = Result<T, BrandwaveError>;

/// Top-level error taxonomy used by engine APIs.
///
/// The first four variants are the failure classes a caller can observe when asking for a
/// logo: a malformed id, an id nothing answers to, a template that could not be compiled, and a
/// draw routine that failed while painting. Execution failures never escape the sandbox as
/// `Err`; they travel inside a fallback result instead.
#[derive(thiserror::Error, Debug)]
pub enum BrandwaveError {
    /// Template id failed the allow-listed format check.
    #[error("invalid template id: {0}")]
    InvalidId(String),

    /// A well-formed id that no static entry or template source answers to.
    #[error("template not found: {0}")]
    NotFound(String),

    /// The template source was found but could not be compiled into a template.
    #[error("template load failed for '{id}': {message}")]
    Load {
        /// Template id.
        id: String,
        /// Underlying diagnostic.
        message: String,
    },

    /// The draw routine failed while painting.
    #[error("template execution error in '{id}': {message}")]
    Execution {
        /// Template id.
        id: String,
        /// Underlying diagnostic.
        message: String,
    },

    /// Invalid user-provided data (descriptors, options, environment).
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BrandwaveError {
    /// Build a [`BrandwaveError::InvalidId`] value.
    pub fn invalid_id(id: impl Into<String>) -> Self {
        Self::InvalidId(id.into())
    }

    /// Build a [`BrandwaveError::NotFound`] value.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    /// Build a [`BrandwaveError::Load`] value.
    pub fn load(id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Load {
            id: id.into(),
            message: msg.into(),
        }
    }

    /// Build a [`BrandwaveError::Execution`] value.
    pub fn execution(id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Execution {
            id: id.into(),
            message: msg.into(),
        }
    }

    /// Build a [`BrandwaveError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`BrandwaveError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether this error came from resolving an id (as opposed to drawing).
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidId(_) | Self::NotFound(_) | Self::Load { .. }
        )
    }
}

impl From<serde_json::Error> for BrandwaveError {
    fn from(err: serde_json::Error) -> Self {
        Self::serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
