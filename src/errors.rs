use thiserror::Error;

/// Main error type for the arbitrary-css crate
///
/// Building a stylesheet never fails; the variants cover installing it into a
/// document and the host layer (file discovery, configuration, reading and writing).
#[derive(Debug, Error)]
pub enum ArbitraryCssError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Pattern error: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Glob error: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTML rewriting error: {0}")]
    Rewrite(#[from] lol_html::errors::RewritingError),

    #[error("No files found matching the provided patterns")]
    NoFilesFound,

    #[error("Failed to read document {path}: {message}")]
    ReadError { path: String, message: String },

    #[error("Failed to write output to {path}: {message}")]
    OutputError { path: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Input error: {0}")]
    InputError(String),

    #[error("Security violation: {0}")]
    SecurityError(String),
}

pub type Result<T> = std::result::Result<T, ArbitraryCssError>;
