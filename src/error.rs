// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types for css-techniques

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for css-techniques
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(String),

    #[error("DOM error: {0}")]
    Dom(String),

    #[error("Technique {code} failed: {message}")]
    Technique { code: String, message: String },
}

impl Error {
    /// Build a technique fault for the given technique code
    pub fn technique(code: &str, message: impl Into<String>) -> Self {
        Error::Technique {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Toml(err.to_string())
    }
}
