/// Convenience result type used across pixelboard.
pub type BoardResult<T> = Result<T, BoardError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Every variant is local to one engine instance; none of them is fatal to a hosting application.
#[derive(thiserror::Error, Debug)]
pub enum BoardError {
    /// Invalid caller-provided board, domain or option data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while fetching or decoding a single image.
    #[error("asset error: {0}")]
    Asset(String),

    /// A raster surface could not be created (zero-sized canvas, overflowing dimensions).
    #[error("surface error: {0}")]
    Surface(String),

    /// Errors while composing or emitting frames.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BoardError {
    /// Build a [`BoardError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`BoardError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`BoardError::Surface`] value.
    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }

    /// Build a [`BoardError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`BoardError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
