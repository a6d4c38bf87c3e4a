//! Category business logic - the small lookup table behind the catalog filter.

use crate::{
    config::storefront::CategoryConfig,
    core::realtime::{ChangeEvent, ChangeFeed, Table},
    entities::{Category, category},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Retrieves all categories ordered alphabetically by name.
pub async fn get_all_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>> {
    Category::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a category by its exact name.
pub async fn get_category_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<category::Model>> {
    Category::find()
        .filter(category::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a category by ID.
pub async fn get_category_by_id(
    db: &DatabaseConnection,
    category_id: i64,
) -> Result<Option<category::Model>> {
    Category::find_by_id(category_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a category.
///
/// # Errors
/// Returns `Validation` if the name is blank or already taken.
pub async fn create_category(
    db: &DatabaseConnection,
    feed: &ChangeFeed,
    name: &str,
) -> Result<category::Model> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation {
            message: "Category name cannot be empty".to_string(),
        });
    }
    if get_category_by_name(db, name).await?.is_some() {
        return Err(Error::Validation {
            message: format!("Category '{name}' already exists"),
        });
    }

    let created = category::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    feed.publish(ChangeEvent::inserted(Table::Categories, created.id));
    Ok(created)
}

/// Creates every configured category that does not exist yet.
///
/// Returns how many categories were created.
pub async fn ensure_categories(
    db: &DatabaseConnection,
    feed: &ChangeFeed,
    configured: &[CategoryConfig],
) -> Result<usize> {
    let mut created = 0;
    for entry in configured {
        if entry.name.trim().is_empty() || get_category_by_name(db, &entry.name).await?.is_some() {
            continue;
        }
        create_category(db, feed, &entry.name).await?;
        created += 1;
    }
    if created > 0 {
        info!("Seeded {created} categories from configuration");
    }
    Ok(created)
}
