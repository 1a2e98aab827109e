//! Error types for ZakatChain

use std::fmt;

use crate::Amount;

#[derive(Debug, Clone, PartialEq)]
pub enum ChainError {
    EmptyIdentifier,
    SelfTransfer,
    NonPositiveAmount,
    UnknownAccount(String),
    InsufficientFunds {
        account: String,
        available: Amount,
        required: Amount,
    },
    ChainIntegrityFailure(String),
    MiningFailure(String),
    DuplicateAccount(String),
    InvalidInput(String),
    ConfigError(String),
    IoError(String),
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChainError::EmptyIdentifier => write!(f, "Sender and receiver cannot be empty"),
            ChainError::SelfTransfer => write!(f, "Sender and receiver cannot be the same"),
            ChainError::NonPositiveAmount => write!(f, "Amount must be positive"),
            ChainError::UnknownAccount(name) => write!(f, "Account '{}' does not exist", name),
            ChainError::InsufficientFunds {
                account,
                available,
                required,
            } => write!(
                f,
                "Insufficient balance. {} has ${:.2} but needs ${:.2}",
                account, available, required
            ),
            ChainError::ChainIntegrityFailure(msg) => write!(f, "Chain integrity failure: {}", msg),
            ChainError::MiningFailure(msg) => write!(f, "Mining failed: {}", msg),
            ChainError::DuplicateAccount(name) => write!(f, "Account '{}' already exists", name),
            ChainError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            ChainError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            ChainError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::IoError(err.to_string())
    }
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::ConfigError(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_funds_message() {
        let err = ChainError::InsufficientFunds {
            account: "Alice".to_string(),
            available: 10.0,
            required: 51.25,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient balance. Alice has $10.00 but needs $51.25"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ChainError = io.into();
        assert!(matches!(err, ChainError::IoError(msg) if msg.contains("missing")));
    }
}
