//! Derived balances.
//!
//! A balance is always recomputed from the live transaction rows: sum the
//! amounts of the non-deleted, non-parent transactions referencing the
//! entity. Nothing is cached and soft-deleting a transaction is enough for
//! every dependent balance to change on the next read. Split parents are
//! skipped so a split is not counted twice.

use model::entities::transaction;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter};
use tracing::{debug, instrument, trace};

use crate::error::Result;

async fn sum_amounts<C: ConnectionTrait>(db: &C, condition: Condition) -> Result<Decimal> {
    let transactions = transaction::Entity::find()
        .filter(condition)
        .filter(transaction::Column::Tombstone.eq(false))
        .filter(transaction::Column::IsParent.eq(false))
        .all(db)
        .await?;

    trace!("Summing {} live transactions", transactions.len());
    Ok(transactions.iter().map(|t| t.amount).sum())
}

/// Computes the balance of an account: the sum of its live transaction
/// amounts, including any starting-balance transaction.
#[instrument(skip(db), fields(account_id = account_id))]
pub async fn account_balance<C: ConnectionTrait>(db: &C, account_id: i32) -> Result<Decimal> {
    let balance = sum_amounts(
        db,
        Condition::all().add(transaction::Column::AccountId.eq(account_id)),
    )
    .await?;

    debug!("Account {} balance is {}", account_id, balance);
    Ok(balance)
}

/// Computes the total amount of the live transactions linked to a payee.
#[instrument(skip(db), fields(payee_id = payee_id))]
pub async fn payee_balance<C: ConnectionTrait>(db: &C, payee_id: i32) -> Result<Decimal> {
    let balance = sum_amounts(
        db,
        Condition::all().add(transaction::Column::PayeeId.eq(payee_id)),
    )
    .await?;

    debug!("Payee {} balance is {}", payee_id, balance);
    Ok(balance)
}

/// Computes the total amount of the live transactions linked to a category.
#[instrument(skip(db), fields(category_id = category_id))]
pub async fn category_balance<C: ConnectionTrait>(db: &C, category_id: i32) -> Result<Decimal> {
    let balance = sum_amounts(
        db,
        Condition::all().add(transaction::Column::CategoryId.eq(category_id)),
    )
    .await?;

    debug!("Category {} balance is {}", category_id, balance);
    Ok(balance)
}
