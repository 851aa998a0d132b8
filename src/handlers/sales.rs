use crate::entities::{product, sale};
use crate::handlers::normalize_optional_string;
use crate::services::sales::{RegisterSaleInput, SaleListFilter};
use crate::services::stats::{SalesStatsReport, StatsPeriod};
use crate::{errors::ServiceError, ApiResponse, AppState};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Creates the router for sale endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sales).post(register_sale))
        .route("/stats", get(sales_stats))
}

/// Product summary embedded in sale responses
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
}

/// Sale as returned by the API
#[derive(Debug, Serialize, ToSchema)]
pub struct SaleResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Unit price actually charged (post-discount)
    pub sale_price: Decimal,
    /// Purchase price snapshot at sale time
    pub purchase_price: Decimal,
    pub margin: Decimal,
    pub customer_name: Option<String>,
    pub sold_at: DateTime<Utc>,
    pub product: Option<ProductSummary>,
}

impl SaleResponse {
    fn from_model(sale: sale::Model, product: Option<product::Model>) -> Self {
        Self {
            id: sale.id,
            product_id: sale.product_id,
            quantity: sale.quantity,
            sale_price: sale.sale_price,
            purchase_price: sale.purchase_price,
            margin: sale.margin,
            customer_name: sale.customer_name,
            sold_at: sale.sold_at,
            product: product.map(|p| ProductSummary {
                id: p.id,
                name: p.name,
                image_url: p.image_url,
            }),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SaleListQuery {
    /// Filter by product
    pub product_id: Option<Uuid>,
    /// Only sales at or after this instant
    pub from: Option<DateTime<Utc>>,
    /// Only sales at or before this instant
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterSaleRequest {
    /// Required; requests without it fail with a validation error
    pub product_id: Option<Uuid>,
    pub quantity: Option<i32>,
    pub customer_name: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct StatsQuery {
    /// Reporting window; defaults to month
    #[serde(default)]
    pub period: StatsPeriod,
}

/// List sales with optional product and date-range filters
#[utoipa::path(
    get,
    path = "/api/v1/sales",
    params(SaleListQuery),
    responses(
        (status = 200, description = "Matching sales, newest first", body = crate::ApiResponse<Vec<SaleResponse>>)
    ),
    tag = "Sales"
)]
pub async fn list_sales(
    State(state): State<AppState>,
    Query(params): Query<SaleListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let filter = SaleListFilter {
        product_id: params.product_id,
        from: params.from,
        to: params.to,
    };

    let sales = state.services.sales.list_sales(filter).await?;
    let sales: Vec<SaleResponse> = sales
        .into_iter()
        .map(|(sale, product)| SaleResponse::from_model(sale, product))
        .collect();

    Ok(Json(ApiResponse::success(sales)))
}

/// Register a sale, decrementing the product's stock
#[utoipa::path(
    post,
    path = "/api/v1/sales",
    request_body = RegisterSaleRequest,
    responses(
        (status = 201, description = "Sale registered", body = crate::ApiResponse<SaleResponse>),
        (status = 400, description = "Invalid quantity or insufficient stock", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Sales"
)]
pub async fn register_sale(
    State(state): State<AppState>,
    Json(payload): Json<RegisterSaleRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let (product_id, quantity) = match (payload.product_id, payload.quantity) {
        (Some(product_id), Some(quantity)) => (product_id, quantity),
        _ => {
            return Err(ServiceError::ValidationError(
                "Missing required fields: product_id, quantity".to_string(),
            ))
        }
    };

    let input = RegisterSaleInput {
        product_id,
        quantity,
        customer_name: normalize_optional_string(payload.customer_name),
    };

    let (sale, product) = state.services.sales.register_sale(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(SaleResponse::from_model(
            sale,
            Some(product),
        ))),
    ))
}

/// Aggregate sales statistics for the dashboard
#[utoipa::path(
    get,
    path = "/api/v1/sales/stats",
    params(StatsQuery),
    responses(
        (status = 200, description = "Sales statistics for the period", body = crate::ApiResponse<SalesStatsReport>),
        (status = 400, description = "Unknown period keyword", body = crate::errors::ErrorResponse)
    ),
    tag = "Sales"
)]
pub async fn sales_stats(
    State(state): State<AppState>,
    Query(params): Query<StatsQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let report = state.services.stats.sales_stats(params.period).await?;
    Ok(Json(ApiResponse::success(report)))
}
