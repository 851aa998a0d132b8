pub mod categories;
pub mod products;
pub mod sales;
pub mod uploads;

use crate::{
    config::AppConfig,
    errors::ServiceError,
    services::{
        catalog::ProductCatalogService, categories::CategoryService, sales::SaleService,
        stats::SalesStatsService, storage::ObjectStorageService,
    },
};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

/// Aggregated services shared by the HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<ProductCatalogService>,
    pub categories: Arc<CategoryService>,
    pub sales: Arc<SaleService>,
    pub stats: Arc<SalesStatsService>,
    pub storage: Option<Arc<ObjectStorageService>>,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, config: &AppConfig) -> Self {
        let storage = ObjectStorageService::from_config(config).map(Arc::new);
        if storage.is_none() {
            info!("Object storage not configured; image uploads are disabled");
        }

        Self {
            catalog: Arc::new(ProductCatalogService::new(db.clone())),
            categories: Arc::new(CategoryService::new(db.clone())),
            sales: Arc::new(SaleService::new(db.clone())),
            stats: Arc::new(SalesStatsService::new(db)),
            storage,
        }
    }
}

/// Validate request input
pub(crate) fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input
        .validate()
        .map_err(|e| ServiceError::ValidationError(format!("Validation failed: {}", e)))
}

pub(crate) fn normalize_string(value: String) -> String {
    value.trim().to_string()
}

pub(crate) fn normalize_optional_string(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .and_then(|v| if v.is_empty() { None } else { Some(v) })
}

pub(crate) fn ensure_decimal_non_negative(value: &Decimal, field: &str) -> Result<(), ServiceError> {
    if *value < Decimal::ZERO {
        Err(ServiceError::ValidationError(format!(
            "{field} cannot be negative"
        )))
    } else {
        Ok(())
    }
}

pub(crate) fn ensure_percent_in_range(value: &Decimal, field: &str) -> Result<(), ServiceError> {
    if *value < Decimal::ZERO || *value > Decimal::from(100) {
        Err(ServiceError::ValidationError(format!(
            "{field} must be between 0 and 100"
        )))
    } else {
        Ok(())
    }
}

pub(crate) fn ensure_i32_non_negative(value: i32, field: &str) -> Result<(), ServiceError> {
    if value < 0 {
        Err(ServiceError::ValidationError(format!(
            "{field} cannot be negative"
        )))
    } else {
        Ok(())
    }
}
