// ABOUTME: Error types with structured exit codes for CLI
// ABOUTME: Maps document-manager failures to specific exit codes for shell scripting

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {status} on {endpoint}: {message}")]
    Api {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Document conversion error: {0}")]
    Docx(#[from] zip::result::ZipError),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Editor error: {0}")]
    Editor(String),
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Auth(_) => 2,
            Error::Network(_) => 3,
            Error::Api { .. } => 4,
            Error::Parse(_) => 5,
            Error::Filesystem(_) => 6,
            Error::Export(_) => 7,
            Error::Clipboard(_) => 8,
            Error::Docx(_) => 9,
            Error::NotFound(_) => 10,
            Error::Editor(_) => 11,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(Error::Auth("test".into()).exit_code(), 2);
        assert_eq!(
            Error::Api {
                endpoint: "test".into(),
                status: 404,
                message: "not found".into()
            }
            .exit_code(),
            4
        );
        assert_eq!(Error::Export("empty".into()).exit_code(), 7);
        assert_eq!(Error::NotFound("42".into()).exit_code(), 10);
    }

    #[test]
    fn test_error_display() {
        let err = Error::Export("No content to download.".into());
        assert_eq!(err.to_string(), "Export error: No content to download.");
    }
}
