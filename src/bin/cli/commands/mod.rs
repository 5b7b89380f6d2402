pub mod balances;
pub mod initdb;

pub use balances::print_balances;
pub use initdb::init_database;
