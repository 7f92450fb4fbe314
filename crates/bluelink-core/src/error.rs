//! Error types for BlueLink core operations

use thiserror::Error;

/// Result type alias for BlueLink operations
pub type Result<T> = std::result::Result<T, BondError>;

/// Errors that can occur while evaluating bond snapshots
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BondError {
    // === Accrual Inputs ===
    /// Purchase happened after maturity
    #[error("Invalid bond terms: purchase at {purchase_ms} ms is after maturity at {maturity_ms} ms")]
    InvalidTerms { purchase_ms: i64, maturity_ms: i64 },

    /// Evaluation instant precedes the purchase
    #[error("Evaluation at {now_ms} ms precedes purchase at {purchase_ms} ms")]
    EvaluationBeforePurchase { now_ms: i64, purchase_ms: i64 },

    /// Intermediate value does not fit the accrual arithmetic
    #[error("Arithmetic overflow while computing {0}")]
    ArithmeticOverflow(&'static str),

    // === Amounts ===
    /// Amount string could not be parsed
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Amount must be greater than zero
    #[error("Amount must be greater than zero")]
    ZeroAmount,

    /// Purchase below the minimum ticket
    #[error("Amount {amount} MIST is below the minimum purchase of {min} MIST")]
    BelowMinimumPurchase { amount: u64, min: u64 },

    /// Purchase exceeds what is left in the offering
    #[error("Amount {amount} MIST exceeds the available {available} MIST")]
    ExceedsAvailable { amount: u64, available: u64 },

    /// Withdrawal exceeds raised funds
    #[error("Withdrawal of {amount} MIST exceeds the raised balance of {balance} MIST")]
    ExceedsRaisedBalance { amount: u64, balance: u64 },

    /// Offering is paused or closed
    #[error("Bond offering is not active: {0}")]
    OfferingInactive(String),

    // === Backend ===
    /// Envelope reported a failure
    #[error("API request failed: {0}")]
    Api(String),

    /// Session missing or expired
    #[error("Unauthorized")]
    Unauthorized,

    /// Transport failure talking to the backend
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // === General Errors ===
    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl BondError {
    /// Get the error code for reports
    pub fn code(&self) -> u32 {
        match self {
            Self::InvalidTerms { .. } => 1001,
            Self::EvaluationBeforePurchase { .. } => 1002,
            Self::ArithmeticOverflow(_) => 1003,
            Self::InvalidAmount(_) | Self::ZeroAmount => 2001,
            Self::BelowMinimumPurchase { .. } => 2002,
            Self::ExceedsAvailable { .. } => 2003,
            Self::ExceedsRaisedBalance { .. } => 2004,
            Self::OfferingInactive(_) => 2005,
            Self::Api(_) => 3001,
            Self::Unauthorized => 3002,
            Self::ConnectionFailed(_) => 3003,
            Self::SerializationError(_) => 3004,
            Self::InvalidInput(_) => 9999,
        }
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::ConnectionFailed(_))
    }
}

impl From<serde_json::Error> for BondError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = BondError::InvalidTerms {
            purchase_ms: 2,
            maturity_ms: 1,
        };
        assert_eq!(err.code(), 1001);

        assert_eq!(BondError::Unauthorized.code(), 3002);
        assert_eq!(BondError::InvalidInput("x".into()).code(), 9999);
    }

    #[test]
    fn test_error_display() {
        let err = BondError::EvaluationBeforePurchase {
            now_ms: 5,
            purchase_ms: 10,
        };

        let msg = format!("{}", err);
        assert!(msg.contains("precedes purchase"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(BondError::ConnectionFailed("reset".into()).is_recoverable());
        assert!(BondError::Unauthorized.is_recoverable());
        assert!(!BondError::ZeroAmount.is_recoverable());
    }

    #[test]
    fn test_from_serde_json() {
        let err: BondError = serde_json::from_str::<u64>("nope").unwrap_err().into();
        assert_eq!(err.code(), 3004);
    }
}
