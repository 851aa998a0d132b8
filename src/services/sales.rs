use crate::{
    entities::{product, sale, Product, Sale},
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Sale registration and listing.
///
/// Registration is the one operation in the system that must be atomic: the
/// sale insert and the stock decrement happen in a single transaction so a
/// concurrent sale of the same product cannot oversell it.
#[derive(Clone)]
pub struct SaleService {
    db: Arc<DatabaseConnection>,
}

impl SaleService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Register a sale: validate stock, freeze the discounted unit price and
    /// margin, insert the sale row, and decrement the product's stock.
    #[instrument(skip(self))]
    pub async fn register_sale(
        &self,
        input: RegisterSaleInput,
    ) -> Result<(sale::Model, product::Model), ServiceError> {
        if input.quantity <= 0 {
            return Err(ServiceError::InvalidInput(
                "Quantity must be greater than zero".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let product = Product::find_by_id(input.product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", input.product_id))
            })?;

        if product.stock < input.quantity {
            return Err(ServiceError::InsufficientStock(format!(
                "available {}, requested {}",
                product.stock, input.quantity
            )));
        }

        let unit_price = product.effective_unit_price();
        let margin = (unit_price - product.purchase_price) * Decimal::from(input.quantity);

        let sale = sale::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product.id),
            quantity: Set(input.quantity),
            sale_price: Set(unit_price),
            purchase_price: Set(product.purchase_price),
            margin: Set(margin),
            customer_name: Set(input.customer_name.clone()),
            sold_at: Set(Utc::now()),
        };
        let sale = sale.insert(&txn).await?;

        let remaining = product.stock - input.quantity;
        let mut product_update: product::ActiveModel = product.into();
        product_update.stock = Set(remaining);
        let product = product_update.update(&txn).await?;

        txn.commit().await?;

        info!(
            sale_id = %sale.id,
            product_id = %product.id,
            quantity = sale.quantity,
            margin = %sale.margin,
            "Registered sale"
        );
        Ok((sale, product))
    }

    /// List sales newest-first, joined with a product summary, with optional
    /// product and date-range filters.
    #[instrument(skip(self))]
    pub async fn list_sales(
        &self,
        filter: SaleListFilter,
    ) -> Result<Vec<(sale::Model, Option<product::Model>)>, ServiceError> {
        let mut query = Sale::find().find_also_related(Product);

        if let Some(product_id) = filter.product_id {
            query = query.filter(sale::Column::ProductId.eq(product_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(sale::Column::SoldAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(sale::Column::SoldAt.lte(to));
        }

        query
            .order_by_desc(sale::Column::SoldAt)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }
}

/// Input for registering a sale
#[derive(Debug, Deserialize, Serialize)]
pub struct RegisterSaleInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub customer_name: Option<String>,
}

/// Filters for the sale listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleListFilter {
    pub product_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}
