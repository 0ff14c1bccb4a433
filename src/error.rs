//! Error types for icon font generation.

use crate::format::FontFormat;

/// Result type for generation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can abort a generation call.
///
/// Every variant is terminal: nothing is retried and no partial output is
/// returned.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or invalid configuration, codepoint collisions, unsafe names.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// An icon's SVG markup could not be turned into an outline.
    #[error("Failed to parse icon '{name}': {reason}")]
    GlyphParse { name: String, reason: String },

    /// A font format could not be derived from the SVG font document.
    #[error("Failed to build {format} font: {reason}")]
    Transcoding { format: FontFormat, reason: String },
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }
}
