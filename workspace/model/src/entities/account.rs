use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, QueryOrder, Set};

use super::transaction;

/// A ledger account, like a bank account, credit card, or cash wallet.
/// The opening balance is not stored here; creating an account with a
/// nonzero opening balance inserts a starting-balance transaction instead.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    /// Closed accounts are kept for history but excluded from day-to-day use.
    #[sea_orm(default_value = "false")]
    pub closed: bool,
    /// Soft-delete marker. Deleted accounts keep their transactions.
    #[sea_orm(default_value = "false")]
    pub tombstone: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transaction,
}

impl Related<transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Gets the live transactions of this account: non-deleted rows,
    /// excluding synthetic split parents, ordered by date then insertion.
    pub async fn transactions<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> Result<Vec<transaction::Model>, DbErr> {
        transaction::Entity::find()
            .filter(transaction::Column::AccountId.eq(self.id))
            .filter(transaction::Column::Tombstone.eq(false))
            .filter(transaction::Column::IsParent.eq(false))
            .order_by_asc(transaction::Column::Date)
            .order_by_asc(transaction::Column::Id)
            .all(db)
            .await
    }

    /// Soft-deletes the account. Historical transactions are retained.
    pub async fn soft_delete<C: ConnectionTrait>(&self, db: &C) -> Result<(), DbErr> {
        let mut active: ActiveModel = self.clone().into();
        active.tombstone = Set(true);
        active.update(db).await?;
        Ok(())
    }
}
