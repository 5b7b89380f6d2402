use model::entities::payee;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use tracing::{debug, instrument, trace};

use crate::error::Result;

/// Finds a payee by name, creating it if it does not exist yet.
#[instrument(skip(db))]
pub async fn get_or_create_payee<C: ConnectionTrait>(db: &C, name: &str) -> Result<payee::Model> {
    if let Some(existing) = payee::Entity::find()
        .filter(payee::Column::Name.eq(name))
        .filter(payee::Column::Tombstone.eq(false))
        .one(db)
        .await?
    {
        trace!("Payee '{}' already exists", name);
        return Ok(existing);
    }

    debug!("Creating payee '{}'", name);
    let payee = payee::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(payee)
}
