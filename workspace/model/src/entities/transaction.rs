use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, QueryOrder, Set};

use super::{account, category, payee};

/// A single ledger entry. Positive amounts are inflows, negative outflows.
///
/// Three special shapes share this table:
/// - a starting-balance row (`starting_balance_flag`), inserted when an
///   account is opened with a nonzero balance;
/// - the two halves of a transfer, cross-linked through `transfer_id`;
/// - splits, where child rows point at a synthetic parent row
///   (`is_parent`) through `parent_id`. The parent is a grouping
///   construct: its amount is not required to stay equal to the sum of
///   its children.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub date: NaiveDate,
    pub account_id: i32,
    pub payee_id: Option<i32>,
    pub category_id: Option<i32>,
    pub notes: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub amount: Decimal,
    #[sea_orm(default_value = "false")]
    pub cleared: bool,
    /// Synthetic grouping row for splits.
    #[sea_orm(default_value = "false")]
    pub is_parent: bool,
    /// Set on split children; points at the synthetic parent row.
    pub parent_id: Option<i32>,
    /// Set on both halves of a transfer; points at the opposite half.
    pub transfer_id: Option<i32>,
    #[sea_orm(default_value = "false")]
    pub starting_balance_flag: bool,
    /// Preserves the caller-supplied order of split children.
    #[sea_orm(default_value = 0)]
    pub sort_order: i64,
    #[sea_orm(default_value = "false")]
    pub tombstone: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "account::Entity",
        from = "Column::AccountId",
        to = "account::Column::Id",
        on_delete = "Cascade"
    )]
    Account,
    #[sea_orm(
        belongs_to = "payee::Entity",
        from = "Column::PayeeId",
        to = "payee::Column::Id",
        on_delete = "SetNull"
    )]
    Payee,
    #[sea_orm(
        belongs_to = "category::Entity",
        from = "Column::CategoryId",
        to = "category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
    /// Self-reference from a split child to its synthetic parent.
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id",
        on_delete = "SetNull"
    )]
    Parent,
    /// Self-reference between the two halves of a transfer.
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::TransferId",
        to = "Column::Id",
        on_delete = "SetNull"
    )]
    Transfer,
}

impl Related<account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<payee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payee.def()
    }
}

impl Related<category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Gets the synthetic parent of a split child, if any.
    pub async fn parent<C: ConnectionTrait>(&self, db: &C) -> Result<Option<Model>, DbErr> {
        match self.parent_id {
            Some(parent_id) => Entity::find_by_id(parent_id).one(db).await,
            None => Ok(None),
        }
    }

    /// Gets the ordered split children of a synthetic parent.
    /// Empty for ordinary transactions.
    pub async fn splits<C: ConnectionTrait>(&self, db: &C) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::ParentId.eq(self.id))
            .order_by_asc(Column::SortOrder)
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    /// Gets the opposite half of a transfer, if this row is part of one.
    pub async fn transfer<C: ConnectionTrait>(&self, db: &C) -> Result<Option<Model>, DbErr> {
        match self.transfer_id {
            Some(transfer_id) => Entity::find_by_id(transfer_id).one(db).await,
            None => Ok(None),
        }
    }

    /// Soft-deletes the transaction. The row is kept for history and can
    /// still be found by queries that opt into deleted rows; derived
    /// balances stop counting it immediately.
    pub async fn soft_delete<C: ConnectionTrait>(&self, db: &C) -> Result<(), DbErr> {
        let mut active: ActiveModel = self.clone().into();
        active.tombstone = Set(true);
        active.update(db).await?;
        Ok(())
    }
}
