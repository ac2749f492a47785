//! Error types for hce-ipa.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IpaError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Synthesizer errors
    #[error("Synthesizer not found: {command}")]
    SynthesizerNotFound { command: String },

    #[error("Synthesizer {command} timed out after {millis}ms")]
    SynthesizerTimeout { command: String, millis: u128 },

    #[error("Synthesizer failed: {message}")]
    SynthesizerFailed { message: String },

    // Resource errors
    #[error("Failed to parse {path}: {message}")]
    ResourceParse { path: String, message: String },

    #[error("Failed to persist {path}: {message}")]
    Persist { path: String, message: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IpaError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_file_not_found_display() {
        let error = IpaError::ConfigFileNotFound {
            path: "/path/to/config.toml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found at /path/to/config.toml"
        );
    }

    #[test]
    fn test_config_invalid_value_display() {
        let error = IpaError::ConfigInvalidValue {
            key: "learning.confidence_threshold".to_string(),
            message: "must be between 0.0 and 1.0".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration value for learning.confidence_threshold: must be between 0.0 and 1.0"
        );
    }

    #[test]
    fn test_synthesizer_timeout_display() {
        let error = IpaError::SynthesizerTimeout {
            command: "espeak-ng".to_string(),
            millis: 10000,
        };
        assert_eq!(
            error.to_string(),
            "Synthesizer espeak-ng timed out after 10000ms"
        );
    }

    #[test]
    fn test_synthesizer_not_found_display() {
        let error = IpaError::SynthesizerNotFound {
            command: "espeak-ng".to_string(),
        };
        assert_eq!(error.to_string(), "Synthesizer not found: espeak-ng");
    }

    #[test]
    fn test_resource_parse_display() {
        let error = IpaError::ResourceParse {
            path: "fallback.json".to_string(),
            message: "expected a JSON object".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse fallback.json: expected a JSON object"
        );
    }

    #[test]
    fn test_persist_display() {
        let error = IpaError::Persist {
            path: "/data/overrides.json".to_string(),
            message: "permission denied".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to persist /data/overrides.json: permission denied"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: IpaError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_error = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let error: IpaError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_from_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error: IpaError = json_error.into();
        assert!(error.to_string().starts_with("JSON error"));
    }

    #[test]
    fn test_error_source_chain_io() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let error: IpaError = io_error.into();

        let error_trait: &dyn std::error::Error = &error;
        assert!(error_trait.source().is_some());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<IpaError>();
        assert_sync::<IpaError>();
    }
}
