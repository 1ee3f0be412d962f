use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::errors::{ArbitraryCssError, Result};

/// Run configuration for the `inject` command
///
/// Only controls which documents are processed and where they are written.
/// The utility and breakpoint tables are compiled in and cannot be changed here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Glob patterns of documents to process
    pub content: Vec<String>,

    /// Glob patterns to skip
    pub exclude: Vec<String>,

    /// Directory to write styled documents to; documents are rewritten in place when unset
    pub out_dir: Option<PathBuf>,

    /// Input file restrictions
    pub security: SecurityConfig,
}

/// Size limit applied when neither the config file nor the command line sets one
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Security configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum file size in bytes, `None` for the 10MB default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<u64>,

    /// Allow symbolic links
    pub allow_symlinks: bool,

    /// Working directory for path traversal checks
    #[serde(skip)]
    pub working_directory: PathBuf,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_file_size: None,
            allow_symlinks: false,
            working_directory: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }
}

impl SecurityConfig {
    /// Effective size limit in bytes
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size.unwrap_or(DEFAULT_MAX_FILE_SIZE)
    }
}

impl RunConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ArbitraryCssError::ConfigError {
                message: format!("Failed to read config file {}: {}", path.display(), e),
            })?;

        serde_yaml::from_str(&content)
            .map_err(|e| ArbitraryCssError::ConfigError {
                message: format!("Failed to parse YAML config: {}", e),
            })
    }

    /// Load configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ArbitraryCssError::ConfigError {
                message: format!("Failed to read config file {}: {}", path.display(), e),
            })?;

        serde_json::from_str(&content)
            .map_err(|e| ArbitraryCssError::ConfigError {
                message: format!("Failed to parse JSON config: {}", e),
            })
    }

    /// Load configuration from a file (auto-detect format)
    pub fn from_file(path: &Path) -> Result<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(ArbitraryCssError::ConfigError {
                message: format!(
                    "Unsupported config file format: {}. Use .yaml, .yml, or .json",
                    path.display()
                ),
            }),
        }
    }

    /// Merge with another configuration; values from `other` win
    pub fn merge(mut self, other: Self) -> Self {
        for pattern in other.content {
            if !self.content.contains(&pattern) {
                self.content.push(pattern);
            }
        }
        for pattern in other.exclude {
            if !self.exclude.contains(&pattern) {
                self.exclude.push(pattern);
            }
        }

        if other.out_dir.is_some() {
            self.out_dir = other.out_dir;
        }

        if other.security.max_file_size.is_some() {
            self.security.max_file_size = other.security.max_file_size;
        }
        if other.security.allow_symlinks {
            self.security.allow_symlinks = true;
        }

        self
    }
}
