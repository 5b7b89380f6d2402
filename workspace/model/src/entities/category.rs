use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ConnectionTrait, QueryOrder, Set};

use super::transaction;

/// A spending category ("Rent", "Dining", ...). Looked up or created by name.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
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
    /// Gets the live transactions linked to this category.
    pub async fn transactions<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> Result<Vec<transaction::Model>, DbErr> {
        transaction::Entity::find()
            .filter(transaction::Column::CategoryId.eq(self.id))
            .filter(transaction::Column::Tombstone.eq(false))
            .filter(transaction::Column::IsParent.eq(false))
            .order_by_asc(transaction::Column::Date)
            .order_by_asc(transaction::Column::Id)
            .all(db)
            .await
    }

    /// Soft-deletes the category and detaches it from all its transactions.
    /// The transactions themselves are kept.
    pub async fn soft_delete<C: ConnectionTrait>(&self, db: &C) -> Result<(), DbErr> {
        transaction::Entity::update_many()
            .col_expr(
                transaction::Column::CategoryId,
                Expr::value(Option::<i32>::None),
            )
            .filter(transaction::Column::CategoryId.eq(self.id))
            .exec(db)
            .await?;

        let mut active: ActiveModel = self.clone().into();
        active.tombstone = Set(true);
        active.update(db).await?;
        Ok(())
    }
}
