//! Error types for the conversational engine.

use nik_core::error::NikError;

/// Errors from the chat engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("model error: {0}")]
    Model(String),
    #[error("voice error: {0}")]
    Voice(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<NikError> for ChatError {
    fn from(err: NikError) -> Self {
        ChatError::Storage(err.to_string())
    }
}

impl From<regex::Error> for ChatError {
    fn from(err: regex::Error) -> Self {
        ChatError::InvalidPattern(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        assert_eq!(ChatError::EmptyMessage.to_string(), "message cannot be empty");
        assert_eq!(
            ChatError::MessageTooLong(2000).to_string(),
            "message exceeds maximum length of 2000 characters"
        );
        assert_eq!(
            ChatError::InvalidPattern("unclosed group".to_string()).to_string(),
            "invalid pattern: unclosed group"
        );
        assert_eq!(
            ChatError::Model("connection refused".to_string()).to_string(),
            "model error: connection refused"
        );
        assert_eq!(
            ChatError::Voice("no microphone".to_string()).to_string(),
            "voice error: no microphone"
        );
    }

    #[test]
    fn test_chat_error_from_nik_error() {
        let err: ChatError = NikError::Memory("locked".to_string()).into();
        assert!(matches!(err, ChatError::Storage(_)));
        assert!(err.to_string().contains("locked"));
    }

    #[test]
    fn test_chat_error_from_regex_error() {
        let err: ChatError = regex::Regex::new("(").unwrap_err().into();
        assert!(matches!(err, ChatError::InvalidPattern(_)));
    }
}
