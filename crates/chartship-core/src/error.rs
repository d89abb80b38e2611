//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Chart not found: {path} does not contain a Chart.yaml")]
    ChartNotFound { path: String },

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("Invalid secret: {message}")]
    Secret { message: String },

    #[error("Invalid registry target: {message}")]
    InvalidTarget { message: String },

    #[error("Failed to clean up {path}: {message}")]
    Cleanup { path: String, message: String },

    #[error("Cannot read chart tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to parse configuration: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
