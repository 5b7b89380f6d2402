use sea_orm::entity::prelude::*;

/// A persisted categorization rule. `conditions` and `actions` hold the
/// declarative JSON representation; the typed form lives in the client
/// library's rule engine, which round-trips through these columns.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "rules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Run stage: "pre", "post", or NULL for the default stage.
    pub stage: Option<String>,
    /// How condition verdicts combine: "and" or "or".
    pub conditions_op: String,
    #[sea_orm(column_type = "Text")]
    pub conditions: String,
    #[sea_orm(column_type = "Text")]
    pub actions: String,
    #[sea_orm(default_value = "false")]
    pub tombstone: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
