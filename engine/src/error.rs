use shared::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Configuration parse error: {source}")]
    ConfigParseError {
        #[from]
        source: serde_json::Error,
    },

    #[error("Model error: {source}")]
    ModelError {
        #[from]
        source: ModelError,
    },

    #[error("Chart session error: {0}")]
    SessionError(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_error_wraps_message() {
        let err: EngineError = ModelError::UnknownTimeframe("2h".to_string()).into();
        assert!(err.to_string().contains("Unknown timeframe: '2h'"));
    }

    #[test]
    fn test_json_error_maps_to_config_parse() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: EngineError = parse_err.into();
        assert!(matches!(err, EngineError::ConfigParseError { .. }));
        assert!(err.to_string().starts_with("Configuration parse error"));
    }
}
