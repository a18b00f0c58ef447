use hql_core::HqlError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("Query error: {0}")]
    Query(#[from] HqlError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type RewriteResult<T> = Result<T, RewriteError>;

impl serde::Serialize for RewriteError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RewriteError::Config("HQL_REWRITE_COUNT must be a boolean".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: HQL_REWRITE_COUNT must be a boolean"
        );

        let err: RewriteError = HqlError::ParseError("unexpected token".to_string()).into();
        assert_eq!(err.to_string(), "Query error: Parse error: unexpected token");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: RewriteError = io.into();
        assert!(matches!(err, RewriteError::IoError(_)));
    }

    #[test]
    fn test_error_debug() {
        let err = RewriteError::Config("bad".to_string());
        let debug = format!("{:?}", err);
        assert!(debug.contains("Config"));
    }

    #[test]
    fn test_serializes_as_message() {
        let err = RewriteError::Config("bad".to_string());
        assert_eq!(
            serde_json::to_string(&err).unwrap(),
            "\"Configuration error: bad\""
        );
    }
}
