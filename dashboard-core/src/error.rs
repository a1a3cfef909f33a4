use std::path::PathBuf;
use thiserror::Error;

/// Why a snapshot could not be loaded.
///
/// `Status`, `Transport` and `Io` are network-class failures; `Parse` means the
/// document arrived but was not a valid snapshot.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to fetch snapshot ({status})")]
    Status { status: u16 },

    #[error("Failed to fetch snapshot: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to read snapshot file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse snapshot JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl LoadError {
    pub fn is_network(&self) -> bool {
        !self.is_parse()
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, LoadError::Parse(_))
    }

    /// HTTP status code, when the server answered with a non-success status.
    pub fn status(&self) -> Option<u16> {
        match self {
            LoadError::Status { status } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_is_network_class() {
        let err = LoadError::Status { status: 503 };
        assert!(err.is_network());
        assert!(!err.is_parse());
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.to_string(), "Failed to fetch snapshot (503)");
    }

    #[test]
    fn json_error_is_parse_class() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = LoadError::from(json_err);
        assert!(err.is_parse());
        assert_eq!(err.status(), None);
    }
}
