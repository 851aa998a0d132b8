use crate::{
    entities::{product, sale, Product, Sale},
    errors::ServiceError,
};
use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// Products with fewer units than this show up in the restock list.
pub const LOW_STOCK_THRESHOLD: i32 = 5;

const TOP_PRODUCTS_LIMIT: usize = 10;

/// Reporting window for sales statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    Day,
    Week,
    #[default]
    Month,
    Year,
}

impl StatsPeriod {
    /// Start of the reporting window relative to `now`. A day means "since
    /// midnight today"; week/month/year reach back a full calendar unit.
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            StatsPeriod::Day => now.date_naive().and_hms_opt(0, 0, 0).unwrap().and_utc(),
            StatsPeriod::Week => now - Duration::days(7),
            StatsPeriod::Month => now.checked_sub_months(Months::new(1)).unwrap(),
            StatsPeriod::Year => now.checked_sub_months(Months::new(12)).unwrap(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SalesSummary {
    pub total_sales: u64,
    pub total_margin: Decimal,
    pub average_margin: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductSalesTotals {
    pub product_id: Uuid,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub total_quantity: i64,
    pub total_margin: Decimal,
    pub sale_count: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DailySalesTotals {
    pub date: NaiveDate,
    pub sale_count: u64,
    pub total_margin: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LowStockProduct {
    pub id: Uuid,
    pub name: String,
    pub stock: i32,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SalesStatsReport {
    pub period: StatsPeriod,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub summary: SalesSummary,
    pub top_products: Vec<ProductSalesTotals>,
    pub sales_per_day: Vec<DailySalesTotals>,
    pub low_stock: Vec<LowStockProduct>,
}

/// Sales statistics aggregation: pure in-memory grouping over one query
/// result, no persistence side effects.
#[derive(Clone)]
pub struct SalesStatsService {
    db: Arc<DatabaseConnection>,
}

impl SalesStatsService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Aggregate sales within the period into dashboard statistics
    #[instrument(skip(self))]
    pub async fn sales_stats(&self, period: StatsPeriod) -> Result<SalesStatsReport, ServiceError> {
        let db = &*self.db;
        let now = Utc::now();
        let window_start = period.window_start(now);

        info!(?period, %window_start, "Generating sales statistics");

        let sales = Sale::find()
            .filter(sale::Column::SoldAt.gte(window_start))
            .all(db)
            .await?;

        let total_sales = sales.len() as u64;
        let total_margin: Decimal = sales.iter().map(|s| s.margin).sum();
        let average_margin = if total_sales > 0 {
            total_margin / Decimal::from(total_sales)
        } else {
            Decimal::ZERO
        };

        // Per-product totals, ranked by units sold
        let mut per_product: HashMap<Uuid, ProductSalesTotals> = HashMap::new();
        for s in &sales {
            let entry = per_product
                .entry(s.product_id)
                .or_insert_with(|| ProductSalesTotals {
                    product_id: s.product_id,
                    name: None,
                    image_url: None,
                    total_quantity: 0,
                    total_margin: Decimal::ZERO,
                    sale_count: 0,
                });
            entry.total_quantity += i64::from(s.quantity);
            entry.total_margin += s.margin;
            entry.sale_count += 1;
        }

        let mut top_products: Vec<ProductSalesTotals> = per_product.into_values().collect();
        top_products.sort_by(|a, b| b.total_quantity.cmp(&a.total_quantity));
        top_products.truncate(TOP_PRODUCTS_LIMIT);

        // Enrich the ranking with product names and images
        let product_ids: Vec<Uuid> = top_products.iter().map(|t| t.product_id).collect();
        if !product_ids.is_empty() {
            let products = Product::find()
                .filter(product::Column::Id.is_in(product_ids))
                .all(db)
                .await?;
            let by_id: HashMap<Uuid, &product::Model> =
                products.iter().map(|p| (p.id, p)).collect();

            for totals in &mut top_products {
                if let Some(p) = by_id.get(&totals.product_id) {
                    totals.name = Some(p.name.clone());
                    totals.image_url = p.image_url.clone();
                }
            }
        }

        // Per-day margin totals across the window, ascending by date
        let mut per_day: HashMap<NaiveDate, DailySalesTotals> = HashMap::new();
        for s in &sales {
            let date = s.sold_at.date_naive();
            let entry = per_day.entry(date).or_insert_with(|| DailySalesTotals {
                date,
                sale_count: 0,
                total_margin: Decimal::ZERO,
            });
            entry.sale_count += 1;
            entry.total_margin += s.margin;
        }
        let mut sales_per_day: Vec<DailySalesTotals> = per_day.into_values().collect();
        sales_per_day.sort_by(|a, b| a.date.cmp(&b.date));

        // Active products running low on stock, most urgent first
        let low_stock = Product::find()
            .filter(product::Column::Active.eq(true))
            .filter(product::Column::Stock.lt(LOW_STOCK_THRESHOLD))
            .order_by_asc(product::Column::Stock)
            .all(db)
            .await?
            .into_iter()
            .map(|p| LowStockProduct {
                id: p.id,
                name: p.name,
                stock: p.stock,
                image_url: p.image_url,
            })
            .collect();

        Ok(SalesStatsReport {
            period,
            window_start,
            window_end: now,
            summary: SalesSummary {
                total_sales,
                total_margin,
                average_margin,
            },
            top_products,
            sales_per_day,
            low_stock,
        })
    }
}
