use crate::{
    entities::{category, product, Category, Product},
    errors::ServiceError,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// A product together with its category, as returned by list/get operations.
pub type ProductWithCategory = (product::Model, Option<category::Model>);

/// Product catalog service: list/get/create/update/soft-delete
#[derive(Clone)]
pub struct ProductCatalogService {
    db: Arc<DatabaseConnection>,
}

impl ProductCatalogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// List products joined with their category, newest first.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: ProductListFilter,
    ) -> Result<Vec<ProductWithCategory>, ServiceError> {
        let mut query = Product::find().find_also_related(Category);

        if let Some(active) = filter.active {
            query = query.filter(product::Column::Active.eq(active));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(product::Column::CategoryId.eq(category_id));
        }

        query
            .order_by_desc(product::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    /// Get a product by ID, joined with its category
    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: Uuid) -> Result<ProductWithCategory, ServiceError> {
        Product::find_by_id(product_id)
            .find_also_related(Category)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
    }

    /// Create a new product
    #[instrument(skip(self))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<product::Model, ServiceError> {
        let now = Utc::now();

        let product = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name.clone()),
            description: Set(input.description.clone()),
            purchase_price: Set(input.purchase_price),
            sale_price: Set(input.sale_price),
            discount_percent: Set(input.discount_percent),
            discount_active: Set(input.discount_active),
            stock: Set(input.stock),
            image_url: Set(input.image_url.clone()),
            category_id: Set(input.category_id),
            active: Set(input.active),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let product = product.insert(&*self.db).await?;

        info!("Created product: {}", product.id);
        Ok(product)
    }

    /// Update an existing product. Only provided fields change.
    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> Result<product::Model, ServiceError> {
        let (product, _) = self.get_product(product_id).await?;
        let mut active: product::ActiveModel = product.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(purchase_price) = input.purchase_price {
            active.purchase_price = Set(purchase_price);
        }
        if let Some(sale_price) = input.sale_price {
            active.sale_price = Set(sale_price);
        }
        if let Some(discount_percent) = input.discount_percent {
            active.discount_percent = Set(discount_percent);
        }
        if let Some(discount_active) = input.discount_active {
            active.discount_active = Set(discount_active);
        }
        if let Some(stock) = input.stock {
            active.stock = Set(stock);
        }
        if let Some(image_url) = input.image_url {
            active.image_url = Set(Some(image_url));
        }
        if let Some(category_id) = input.category_id {
            active.category_id = Set(Some(category_id));
        }
        if let Some(is_active) = input.active {
            active.active = Set(is_active);
        }

        active.updated_at = Set(Utc::now());

        let product = active.update(&*self.db).await?;
        info!("Updated product: {}", product_id);
        Ok(product)
    }

    /// Soft-delete a product by flipping its active flag. The row stays in
    /// place so historical sales keep their reference.
    #[instrument(skip(self))]
    pub async fn deactivate_product(&self, product_id: Uuid) -> Result<product::Model, ServiceError> {
        let (product, _) = self.get_product(product_id).await?;
        let mut active: product::ActiveModel = product.into();
        active.active = Set(false);
        active.updated_at = Set(Utc::now());

        let product = active.update(&*self.db).await?;
        info!("Deactivated product: {}", product_id);
        Ok(product)
    }
}

/// Filters for the product listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductListFilter {
    pub active: Option<bool>,
    pub category_id: Option<Uuid>,
}

/// Input for creating a product
#[derive(Debug, Deserialize, Serialize)]
pub struct CreateProductInput {
    pub name: String,
    pub description: Option<String>,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub discount_percent: Decimal,
    pub discount_active: bool,
    pub stock: i32,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    pub active: bool,
}

/// Input for updating a product; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub purchase_price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    pub discount_percent: Option<Decimal>,
    pub discount_active: Option<bool>,
    pub stock: Option<i32>,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    pub active: Option<bool>,
}
