use model::entities::category;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use tracing::{debug, instrument, trace};

use crate::error::Result;

/// Finds a category by name, creating it if it does not exist yet.
#[instrument(skip(db))]
pub async fn get_or_create_category<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<category::Model> {
    if let Some(existing) = category::Entity::find()
        .filter(category::Column::Name.eq(name))
        .filter(category::Column::Tombstone.eq(false))
        .one(db)
        .await?
    {
        trace!("Category '{}' already exists", name);
        return Ok(existing);
    }

    debug!("Creating category '{}'", name);
    let category = category::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(category)
}
