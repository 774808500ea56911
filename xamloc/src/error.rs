//! All error types for the xamloc crate.
//!
//! These are returned from all fallible operations (scanning, rewriting,
//! resource serialization, etc.).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown format `{0}`")]
    UnknownFormat(String),

    #[error("markup error at line {line}, column {column}: {message}")]
    Markup {
        message: String,
        line: u32,
        column: u32,
    },

    #[error("rewrite error: {0}")]
    Rewrite(String),

    #[error("CSV parse error: {0}")]
    CsvParse(#[from] csv::Error),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("settings parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid resource: {0}")]
    InvalidResource(String),

    #[error("invalid resource key `{0}`")]
    KeyFormat(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates a new markup error at a source position.
    pub fn markup(message: impl Into<String>, line: u32, column: u32) -> Self {
        Error::Markup {
            message: message.into(),
            line,
            column,
        }
    }

    /// Creates a new validation error
    pub fn validation_error(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Creates a new internal invariant-violation error. These are the fatal
    /// errors of the batch pipeline and are never downgraded to a per-file
    /// failure.
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_markup_error_display() {
        let error = Error::markup("unterminated start tag", 4, 17);
        assert_eq!(
            error.to_string(),
            "markup error at line 4, column 17: unterminated start tag"
        );
    }

    #[test]
    fn test_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = Error::Io(io_error);
        assert!(error.to_string().contains("I/O error"));
    }

    #[test]
    fn test_key_format_error() {
        let error = Error::KeyFormat("no-colons-here".to_string());
        assert_eq!(
            error.to_string(),
            "invalid resource key `no-colons-here`"
        );
    }

    #[test]
    fn test_validation_error() {
        let error = Error::validation_error("Validation failed");
        assert_eq!(error.to_string(), "validation error: Validation failed");
    }

    #[test]
    fn test_error_display_not_empty() {
        let errors = vec![
            Error::UnknownFormat("test".to_string()),
            Error::InvalidResource("test".to_string()),
            Error::Rewrite("test".to_string()),
            Error::Validation("test".to_string()),
            Error::Internal("test".to_string()),
        ];

        for error in errors {
            let display = format!("{}", error);
            assert!(!display.is_empty());
            assert!(display.contains("test"));
        }
    }
}
