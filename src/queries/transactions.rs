use chrono::NaiveDate;
use model::entities::transaction;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, instrument};

use crate::error::{LedgerError, Result};
use crate::queries::accounts::{get_account, AccountRef};
use crate::queries::categories::get_or_create_category;
use crate::queries::payees::get_or_create_payee;

/// Filters for [`get_transactions`]. The default query returns the live,
/// non-parent transactions of the whole ledger.
#[derive(Debug, Clone, Default)]
pub struct TransactionQuery<'a> {
    /// Earliest date, inclusive.
    pub start_date: Option<NaiveDate>,
    /// Latest date, inclusive.
    pub end_date: Option<NaiveDate>,
    /// Substring to look for in the notes.
    pub notes: Option<&'a str>,
    /// Restrict to one account.
    pub account: Option<AccountRef<'a>>,
    /// Return the synthetic split parents instead of ordinary rows.
    pub is_parent: bool,
    /// Include soft-deleted rows.
    pub include_deleted: bool,
}

/// Creates a transaction on a resolvable, non-deleted account. Payee and
/// category are looked up or created by name when given.
#[instrument(skip(db, account), fields(date = %date, amount = %amount))]
pub async fn create_transaction<'a, C: ConnectionTrait>(
    db: &C,
    date: NaiveDate,
    account: impl Into<AccountRef<'a>>,
    payee: Option<&str>,
    notes: Option<&str>,
    category: Option<&str>,
    amount: Decimal,
) -> Result<transaction::Model> {
    let account = get_account(db, account.into()).await?;

    let payee_id = match payee {
        Some(name) => Some(get_or_create_payee(db, name).await?.id),
        None => None,
    };
    let category_id = match category {
        Some(name) => Some(get_or_create_category(db, name).await?.id),
        None => None,
    };

    let transaction = transaction::ActiveModel {
        date: Set(date),
        account_id: Set(account.id),
        payee_id: Set(payee_id),
        category_id: Set(category_id),
        notes: Set(notes.map(|n| n.to_string())),
        amount: Set(amount),
        ..Default::default()
    }
    .insert(db)
    .await?;

    debug!(
        "Created transaction {} of {} on account '{}'",
        transaction.id, amount, account.name
    );
    Ok(transaction)
}

/// Moves `amount` from one account to another: two mirrored transactions
/// are created (source −amount, destination +amount) and cross-linked
/// through their `transfer_id`.
#[instrument(skip(db, source, dest), fields(date = %date, amount = %amount))]
pub async fn create_transfer<'a, C: ConnectionTrait>(
    db: &C,
    date: NaiveDate,
    source: impl Into<AccountRef<'a>>,
    dest: impl Into<AccountRef<'a>>,
    amount: Decimal,
    notes: Option<&str>,
) -> Result<(transaction::Model, transaction::Model)> {
    let source = get_account(db, source.into()).await?;
    let dest = get_account(db, dest.into()).await?;

    let outgoing = transaction::ActiveModel {
        date: Set(date),
        account_id: Set(source.id),
        notes: Set(notes.map(|n| n.to_string())),
        amount: Set(-amount),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let incoming = transaction::ActiveModel {
        date: Set(date),
        account_id: Set(dest.id),
        notes: Set(notes.map(|n| n.to_string())),
        amount: Set(amount),
        transfer_id: Set(Some(outgoing.id)),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let mut outgoing: transaction::ActiveModel = outgoing.into();
    outgoing.transfer_id = Set(Some(incoming.id));
    let outgoing = outgoing.update(db).await?;

    debug!(
        "Transferred {} from '{}' to '{}'",
        amount, source.name, dest.name
    );
    Ok((outgoing, incoming))
}

/// Groups existing transactions under a new synthetic parent.
///
/// Every transaction must live on the same account and carry the same
/// date. The parent takes the sum of the group as its amount and the
/// children keep the order they were given in.
#[instrument(skip(db, transactions))]
pub async fn create_splits<C: ConnectionTrait>(
    db: &C,
    transactions: &[transaction::Model],
    notes: Option<&str>,
) -> Result<transaction::Model> {
    let first = transactions.first().ok_or(LedgerError::EmptySplits)?;
    if transactions.iter().any(|t| t.account_id != first.account_id) {
        return Err(LedgerError::SplitFieldMismatch("account"));
    }
    if transactions.iter().any(|t| t.date != first.date) {
        return Err(LedgerError::SplitFieldMismatch("date"));
    }

    let total: Decimal = transactions.iter().map(|t| t.amount).sum();
    let parent = transaction::ActiveModel {
        date: Set(first.date),
        account_id: Set(first.account_id),
        notes: Set(notes.map(|n| n.to_string())),
        amount: Set(total),
        is_parent: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await?;

    for (position, tx) in transactions.iter().enumerate() {
        let mut child: transaction::ActiveModel = tx.clone().into();
        child.parent_id = Set(Some(parent.id));
        child.sort_order = Set(position as i64);
        child.update(db).await?;
    }

    debug!(
        "Created split parent {} over {} transactions",
        parent.id,
        transactions.len()
    );
    Ok(parent)
}

/// Queries transactions, ordered by date then insertion.
#[instrument(skip(db))]
pub async fn get_transactions<C: ConnectionTrait>(
    db: &C,
    query: &TransactionQuery<'_>,
) -> Result<Vec<transaction::Model>> {
    let mut select = transaction::Entity::find()
        .filter(transaction::Column::IsParent.eq(query.is_parent))
        .order_by_asc(transaction::Column::Date)
        .order_by_asc(transaction::Column::Id);

    if !query.include_deleted {
        select = select.filter(transaction::Column::Tombstone.eq(false));
    }
    if let Some(start) = query.start_date {
        select = select.filter(transaction::Column::Date.gte(start));
    }
    if let Some(end) = query.end_date {
        select = select.filter(transaction::Column::Date.lte(end));
    }
    if let Some(notes) = query.notes {
        select = select.filter(transaction::Column::Notes.contains(notes));
    }
    if let Some(account) = query.account {
        let account = get_account(db, account).await?;
        select = select.filter(transaction::Column::AccountId.eq(account.id));
    }

    let transactions = select.all(db).await?;
    debug!("Found {} transactions", transactions.len());
    Ok(transactions)
}
