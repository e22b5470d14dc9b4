/// Error types for the glint library.
///
/// None of these reach callers of [`ColorSupport`](crate::ColorSupport):
/// the facade logs them and falls back to a definite answer.
#[derive(Debug, thiserror::Error)]
pub enum GlintError {
    /// A console mode query or update failed.
    #[error("console mode error: {0}")]
    Console(#[from] std::io::Error),

    /// The process has no console attached to the stream.
    #[error("console is detached")]
    ConsoleDetached,

    /// A `GLINT_DEBUG` entry had a value that could not be understood.
    #[error("invalid debug setting {key}={value:?}")]
    InvalidSetting { key: String, value: String },
}

/// Convenience Result type for glint operations.
pub type Result<T> = std::result::Result<T, GlintError>;
