//! Error types for the search sources.

use nik_core::error::NikError;

/// Errors from knowledge and web-search sources.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("request failed: {0}")]
    Http(String),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("cache error: {0}")]
    Cache(String),
    #[error("invalid marker list: {0}")]
    InvalidMarker(String),
}

impl From<NikError> for SearchError {
    fn from(err: NikError) -> Self {
        SearchError::Cache(err.to_string())
    }
}

impl From<regex::Error> for SearchError {
    fn from(err: regex::Error) -> Self {
        SearchError::InvalidMarker(err.to_string())
    }
}

impl From<ureq::Error> for SearchError {
    fn from(err: ureq::Error) -> Self {
        SearchError::Http(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_error_display() {
        assert_eq!(
            SearchError::Http("timeout".to_string()).to_string(),
            "request failed: timeout"
        );
        assert_eq!(
            SearchError::Decode("missing field".to_string()).to_string(),
            "unexpected response: missing field"
        );
        assert_eq!(
            SearchError::Cache("locked".to_string()).to_string(),
            "cache error: locked"
        );
    }

    #[test]
    fn test_from_nik_error() {
        let err: SearchError = NikError::Storage("disk full".to_string()).into();
        assert!(matches!(err, SearchError::Cache(_)));
        assert!(err.to_string().contains("disk full"));
    }
}
