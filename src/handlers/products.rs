use crate::entities::{category, product};
use crate::handlers::{
    ensure_decimal_non_negative, ensure_i32_non_negative, ensure_percent_in_range,
    normalize_optional_string, normalize_string, validate_input,
};
use crate::services::catalog::{CreateProductInput, ProductListFilter, UpdateProductInput};
use crate::{errors::ServiceError, ApiResponse, AppState};
use axum::{
    extract::{Path, Query, State},
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

/// Creates the router for product endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// Category summary embedded in product responses
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: String,
}

/// Product as returned by the API
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub discount_percent: Decimal,
    pub discount_active: bool,
    /// Unit price after applying an active discount
    pub effective_price: Decimal,
    pub stock: i32,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    pub category: Option<CategoryRef>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductResponse {
    pub(crate) fn from_model(product: product::Model, category: Option<category::Model>) -> Self {
        let effective_price = product.effective_unit_price();
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            purchase_price: product.purchase_price,
            sale_price: product.sale_price,
            discount_percent: product.discount_percent,
            discount_active: product.discount_active,
            effective_price,
            stock: product.stock,
            image_url: product.image_url,
            category_id: product.category_id,
            category: category.map(|c| CategoryRef {
                id: c.id,
                name: c.name,
            }),
            active: product.active,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ProductListQuery {
    /// Filter by the active flag
    pub active: Option<bool>,
    /// Filter by category
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, validator::Validate, ToSchema)]
pub struct CreateProductRequest {
    /// Required; requests without it fail with a validation error
    #[validate(length(max = 255, message = "Product name cannot exceed 255 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 2000, message = "Description cannot exceed 2000 characters"))]
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

#[derive(Debug, Default, Deserialize, validator::Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(max = 255, message = "Product name cannot exceed 255 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 2000, message = "Description cannot exceed 2000 characters"))]
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

/// List products with optional active/category filters
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ProductListQuery),
    responses(
        (status = 200, description = "Matching products, newest first", body = crate::ApiResponse<Vec<ProductResponse>>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let filter = ProductListFilter {
        active: params.active,
        category_id: params.category_id,
    };

    let products = state.services.catalog.list_products(filter).await?;
    let products: Vec<ProductResponse> = products
        .into_iter()
        .map(|(product, category)| ProductResponse::from_model(product, category))
        .collect();

    Ok(Json(ApiResponse::success(products)))
}

/// Fetch a single product
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "The product", body = crate::ApiResponse<ProductResponse>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let (product, category) = state.services.catalog.get_product(id).await?;
    Ok(Json(ApiResponse::success(ProductResponse::from_model(
        product, category,
    ))))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = crate::ApiResponse<ProductResponse>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;

    let (name, purchase_price, sale_price) =
        match (payload.name, payload.purchase_price, payload.sale_price) {
            (Some(name), Some(purchase), Some(sale)) => (name, purchase, sale),
            _ => {
                return Err(ServiceError::ValidationError(
                    "Missing required fields: name, purchase_price, sale_price".to_string(),
                ))
            }
        };

    let name = normalize_string(name);
    if name.is_empty() {
        return Err(ServiceError::ValidationError(
            "Product name cannot be blank".to_string(),
        ));
    }

    ensure_decimal_non_negative(&purchase_price, "purchase_price")?;
    ensure_decimal_non_negative(&sale_price, "sale_price")?;
    let discount_percent = payload.discount_percent.unwrap_or(Decimal::ZERO);
    ensure_percent_in_range(&discount_percent, "discount_percent")?;
    let stock = payload.stock.unwrap_or(0);
    ensure_i32_non_negative(stock, "stock")?;

    let input = CreateProductInput {
        name,
        description: normalize_optional_string(payload.description),
        purchase_price,
        sale_price,
        discount_percent,
        discount_active: payload.discount_active.unwrap_or(false),
        stock,
        image_url: normalize_optional_string(payload.image_url),
        category_id: payload.category_id,
        active: payload.active.unwrap_or(true),
    };

    let product = state.services.catalog.create_product(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(ProductResponse::from_model(
            product, None,
        ))),
    ))
}

/// Partially update a product
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated product", body = crate::ApiResponse<ProductResponse>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;

    let name = match payload.name {
        Some(name) => {
            let name = normalize_string(name);
            if name.is_empty() {
                return Err(ServiceError::ValidationError(
                    "Product name cannot be blank".to_string(),
                ));
            }
            Some(name)
        }
        None => None,
    };

    if let Some(value) = payload.purchase_price.as_ref() {
        ensure_decimal_non_negative(value, "purchase_price")?;
    }
    if let Some(value) = payload.sale_price.as_ref() {
        ensure_decimal_non_negative(value, "sale_price")?;
    }
    if let Some(value) = payload.discount_percent.as_ref() {
        ensure_percent_in_range(value, "discount_percent")?;
    }
    if let Some(value) = payload.stock {
        ensure_i32_non_negative(value, "stock")?;
    }

    let input = UpdateProductInput {
        name,
        description: normalize_optional_string(payload.description),
        purchase_price: payload.purchase_price,
        sale_price: payload.sale_price,
        discount_percent: payload.discount_percent,
        discount_active: payload.discount_active,
        stock: payload.stock,
        image_url: normalize_optional_string(payload.image_url),
        category_id: payload.category_id,
        active: payload.active,
    };

    let product = state.services.catalog.update_product(id, input).await?;
    Ok(Json(ApiResponse::success(ProductResponse::from_model(
        product, None,
    ))))
}

/// Soft-delete a product
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deactivated", body = crate::ApiResponse<ProductResponse>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.catalog.deactivate_product(id).await?;
    Ok(Json(ApiResponse::success(ProductResponse::from_model(
        product, None,
    ))))
}
