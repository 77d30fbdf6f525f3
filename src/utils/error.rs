// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum PatternError {
    #[error("Invalid pattern '{name}': {source}")]
    Compile {
        name: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Number out of range in '{0}'")]
    InvalidNumber(String),
}

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Layout dump is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Pattern library failed to build: {0}")]
    Pattern(#[from] PatternError),

    #[error("Layout input failed: {0}")]
    Layout(#[from] LayoutError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_error_display() {
        let err = ExtractError::InvalidNumber("99999999999".to_string());
        assert_eq!(err.to_string(), "Number out of range in '99999999999'");
    }

    #[test]
    fn test_app_error_from_storage() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AppError = StorageError::from(io_err).into();
        assert!(matches!(err, AppError::Storage(StorageError::IoError(_))));
    }
}
