//! Error types for configuration loading

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a shader configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("Failed to read configuration file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration file is not valid JSON or doesn't match the schema
    #[error("Failed to parse configuration file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A shader declares the same define name twice
    #[error("Shader '{shader}' declares define '{define}' more than once")]
    DuplicateDefine { shader: String, define: String },

    /// A define's range is inverted (min > max)
    #[error("Shader '{shader}' define '{define}' has inverted range [{min}, {max}]")]
    InvalidDefineRange {
        shader: String,
        define: String,
        min: i32,
        max: i32,
    },
}
