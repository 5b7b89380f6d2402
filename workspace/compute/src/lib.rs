pub mod balance;
pub mod error;

pub use balance::{account_balance, category_balance, payee_balance};
pub use error::{ComputeError, Result};
