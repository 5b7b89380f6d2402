use std::fmt;

use chrono::Utc;
use model::entities::{account, transaction};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, instrument, trace};

use crate::error::{LedgerError, Result};
use crate::queries::payees::get_or_create_payee;

/// A way of pointing at an account: by id or by its unique name.
/// `&account::Model` converts into the id form.
#[derive(Debug, Clone, Copy)]
pub enum AccountRef<'a> {
    Id(i32),
    Name(&'a str),
}

impl From<i32> for AccountRef<'static> {
    fn from(id: i32) -> Self {
        AccountRef::Id(id)
    }
}

impl<'a> From<&'a str> for AccountRef<'a> {
    fn from(name: &'a str) -> Self {
        AccountRef::Name(name)
    }
}

impl<'a> From<&'a account::Model> for AccountRef<'a> {
    fn from(model: &'a account::Model) -> Self {
        AccountRef::Id(model.id)
    }
}

impl fmt::Display for AccountRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountRef::Id(id) => write!(f, "{}", id),
            AccountRef::Name(name) => f.write_str(name),
        }
    }
}

/// Creates an account. A nonzero starting balance is recorded as an
/// ordinary transaction flagged as the starting balance, so account
/// balances stay a pure sum over transactions.
#[instrument(skip(db))]
pub async fn create_account<C: ConnectionTrait>(
    db: &C,
    name: &str,
    starting_balance: Option<Decimal>,
) -> Result<account::Model> {
    trace!("Creating account '{}'", name);
    let account = account::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    if let Some(balance) = starting_balance {
        if !balance.is_zero() {
            let payee = get_or_create_payee(db, "Starting Balance").await?;
            transaction::ActiveModel {
                date: Set(Utc::now().date_naive()),
                account_id: Set(account.id),
                payee_id: Set(Some(payee.id)),
                amount: Set(balance),
                starting_balance_flag: Set(true),
                ..Default::default()
            }
            .insert(db)
            .await?;
            debug!("Recorded starting balance {} for account '{}'", balance, name);
        }
    }

    debug!("Created account {} ('{}')", account.id, account.name);
    Ok(account)
}

/// Lists non-deleted accounts, optionally filtered by a name substring.
#[instrument(skip(db))]
pub async fn get_accounts<C: ConnectionTrait>(
    db: &C,
    name: Option<&str>,
) -> Result<Vec<account::Model>> {
    let mut query = account::Entity::find()
        .filter(account::Column::Tombstone.eq(false))
        .order_by_asc(account::Column::Name);

    if let Some(name) = name {
        query = query.filter(account::Column::Name.contains(name));
    }

    let accounts = query.all(db).await?;
    debug!("Found {} accounts", accounts.len());
    Ok(accounts)
}

/// Resolves a reference to a non-deleted account. Unknown names, unknown
/// ids and tombstoned rows all fail with a descriptive error.
#[instrument(skip(db))]
pub async fn get_account<C: ConnectionTrait>(
    db: &C,
    account: AccountRef<'_>,
) -> Result<account::Model> {
    let found = match account {
        AccountRef::Id(id) => {
            account::Entity::find_by_id(id)
                .filter(account::Column::Tombstone.eq(false))
                .one(db)
                .await?
        }
        AccountRef::Name(name) => {
            account::Entity::find()
                .filter(account::Column::Name.eq(name))
                .filter(account::Column::Tombstone.eq(false))
                .one(db)
                .await?
        }
    };

    found.ok_or_else(|| LedgerError::AccountNotFound(account.to_string()))
}
