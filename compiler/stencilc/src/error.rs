//! Driver-level errors.

use stencil_diagnostic::CompileError;
use thiserror::Error;

/// Failure outside the compile itself: reading input or writing JSON.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Compile(#[from] Box<CompileError>),
    #[error("failed to serialize the compiled template: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<CompileError> for DriverError {
    fn from(err: CompileError) -> Self {
        DriverError::Compile(Box::new(err))
    }
}

impl DriverError {
    /// Error reading `path`, with a message naming the cause.
    #[cold]
    pub fn read(path: &str, source: std::io::Error) -> Self {
        let message = match source.kind() {
            std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
            std::io::ErrorKind::PermissionDenied => format!("permission denied reading '{path}'"),
            std::io::ErrorKind::InvalidData => format!("'{path}' contains invalid UTF-8 data"),
            _ => format!("error reading '{path}': {source}"),
        };
        DriverError::Io { message, source }
    }
}
