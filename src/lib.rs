//! Client library for a personal-finance ledger backed by a relational
//! database through SeaORM.
//!
//! The ledger is made of accounts, payees, categories and transactions,
//! with three derived constructs on top: transfers (paired mirrored
//! transactions), splits (children grouped under a synthetic parent) and
//! declarative categorization rules. Balances are never stored; they are
//! recomputed from the live transaction rows by the `compute` crate.
//!
//! Every operation takes the unit of work explicitly (anything
//! implementing `sea_orm::ConnectionTrait`), so callers decide where the
//! commit boundary lies by passing a connection or an open database
//! transaction.

pub mod error;
pub mod queries;
pub mod rules;

mod tests;

pub use error::{LedgerError, Result};
pub use queries::accounts::{create_account, get_account, get_accounts, AccountRef};
pub use queries::categories::get_or_create_category;
pub use queries::payees::get_or_create_payee;
pub use queries::rules::{create_rule, get_ruleset};
pub use queries::transactions::{
    create_splits, create_transaction, create_transfer, get_transactions, TransactionQuery,
};
pub use rules::{
    Action, ActionOp, Condition, ConditionOp, ConditionsOp, Rule, RuleField, RuleSet, RuleStage,
    Value, ValueKind,
};
