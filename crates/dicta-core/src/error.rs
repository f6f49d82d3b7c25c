use thiserror::Error;

/// Top-level error type for the dicta system.
///
/// Each variant wraps a subsystem-specific failure. Subsystem crates return
/// these directly so that the `?` operator works seamlessly across crate
/// boundaries.
///
/// Failure semantics worth knowing:
/// - `AudioLoad` is always recoverable: a session continues to the typing
///   phase without audio.
/// - `Submission` leaves a completed session intact; the caller may retry
///   with the same transcript.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DictaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Audio load error: {0}")]
    AudioLoad(String),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("Submission error: {0}")]
    Submission(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for DictaError {
    fn from(err: toml::de::Error) -> Self {
        DictaError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for DictaError {
    fn from(err: toml::ser::Error) -> Self {
        DictaError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for DictaError {
    fn from(err: serde_json::Error) -> Self {
        DictaError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for dicta operations.
pub type Result<T> = std::result::Result<T, DictaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DictaError::AudioLoad("decode failed".to_string());
        assert_eq!(err.to_string(), "Audio load error: decode failed");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DictaError = io_err.into();
        assert!(matches!(err, DictaError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let bad_toml = "invalid = [[[";
        let parsed: std::result::Result<toml::Value, _> = toml::from_str(bad_toml);
        let err: DictaError = parsed.unwrap_err().into();
        assert!(matches!(err, DictaError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let bad_json = "{ invalid json }";
        let parsed: std::result::Result<serde_json::Value, _> = serde_json::from_str(bad_json);
        let err: DictaError = parsed.unwrap_err().into();
        assert!(matches!(err, DictaError::Serialization(_)));
    }

    #[test]
    fn test_error_display_all_variants() {
        let cases: Vec<(DictaError, &str)> = vec![
            (
                DictaError::Config("bad key".to_string()),
                "Configuration error: bad key",
            ),
            (
                DictaError::AudioLoad("empty payload".to_string()),
                "Audio load error: empty payload",
            ),
            (
                DictaError::Playback("no device".to_string()),
                "Playback error: no device",
            ),
            (
                DictaError::Synthesis("voice unavailable".to_string()),
                "Synthesis error: voice unavailable",
            ),
            (
                DictaError::Submission("server rejected".to_string()),
                "Submission error: server rejected",
            ),
            (
                DictaError::Catalog("unknown passage".to_string()),
                "Catalog error: unknown passage",
            ),
            (
                DictaError::Session("not completed".to_string()),
                "Session error: not completed",
            ),
            (
                DictaError::Serialization("invalid json".to_string()),
                "Serialization error: invalid json",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let _value = io_result?;
            Ok("success".to_string())
        }

        assert_eq!(inner().unwrap(), "success");
    }
}
