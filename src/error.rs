use thiserror::Error;

/// Error types for the ledger client library.
///
/// Domain-rule violations are raised eagerly, before the violated
/// construct is persisted, and carry a message naming the field or
/// invariant involved.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// The account reference did not resolve to a live account.
    #[error("Account '{0}' not found")]
    AccountNotFound(String),

    /// A split group disagreed on the named field.
    #[error("'{0}' must be the same for all transactions in splits")]
    SplitFieldMismatch(&'static str),

    /// A split group with no transactions.
    #[error("Cannot create splits from an empty set of transactions")]
    EmptySplits,

    /// A rule action tried to write a value of the wrong kind.
    #[error("Cannot set field '{field}' to a {kind} value")]
    RuleValueMismatch {
        field: &'static str,
        kind: &'static str,
    },

    /// The declarative rule representation could not be decoded.
    #[error("Invalid rule value: {0}")]
    InvalidRuleValue(String),

    /// Error from encoding or decoding rule JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Type alias for Result with LedgerError
pub type Result<T> = std::result::Result<T, LedgerError>;
