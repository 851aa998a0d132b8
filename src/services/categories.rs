use crate::{
    entities::{category, Category},
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Category service. Categories are list/create only; they never change once
/// created so products and sales can rely on their references.
#[derive(Clone)]
pub struct CategoryService {
    db: Arc<DatabaseConnection>,
}

impl CategoryService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// List all categories ordered by name
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<category::Model>, ServiceError> {
        Category::find()
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    /// Create a new category with a unique name
    #[instrument(skip(self))]
    pub async fn create_category(&self, name: String) -> Result<category::Model, ServiceError> {
        self.ensure_unique_name(&name).await?;

        let category = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            created_at: Set(Utc::now()),
        };

        let category = category.insert(&*self.db).await?;

        info!("Created category: {}", category.id);
        Ok(category)
    }

    async fn ensure_unique_name(&self, name: &str) -> Result<(), ServiceError> {
        let existing = Category::find()
            .filter(category::Column::Name.eq(name))
            .one(&*self.db)
            .await?;

        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "A category named {} already exists",
                name
            )));
        }

        Ok(())
    }
}
