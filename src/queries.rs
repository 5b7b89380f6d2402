pub mod accounts;
pub mod categories;
pub mod payees;
pub mod rules;
pub mod transactions;
