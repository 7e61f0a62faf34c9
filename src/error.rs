use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors raised by the guard wrapped around external calls.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error("circuit open for {service}")]
    CircuitOpen { service: &'static str },

    #[error("{service} call timed out after {timeout_ms}ms")]
    Timeout {
        service: &'static str,
        timeout_ms: u64,
    },

    #[error("{service} failed after {attempts} attempts: {last_error}")]
    Exhausted {
        service: &'static str,
        attempts: u32,
        last_error: String,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("completion service error: {0}")]
    Completion(String),

    #[error("delivery error: {0}")]
    Delivery(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True when the error came from an external collaborator (completion
    /// service, messenger, network) rather than from local state.
    #[must_use]
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            Error::Guard(_) | Error::Http(_) | Error::Completion(_) | Error::Delivery(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_errors_are_external() {
        let err: Error = GuardError::CircuitOpen { service: "llm" }.into();
        assert!(err.is_external());
        assert_eq!(err.to_string(), "circuit open for llm");
    }

    #[test]
    fn store_errors_are_not_external() {
        assert!(!Error::Database("locked".into()).is_external());
        assert!(!Error::Parse("bad".into()).is_external());
    }

    #[test]
    fn config_error_display_names_field() {
        let err = ConfigError::InvalidValue {
            field: "p_min",
            reason: "must be below p_max".into(),
        };
        assert_eq!(err.to_string(), "invalid value for p_min: must be below p_max");
    }
}
