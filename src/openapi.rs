use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Nova API",
        version = "0.3.0",
        description = r#"
# Nova Storefront & Back-Office API

Catalog, categories, sales, and image storage for the Nova perfumery.

## Error Handling

Errors use a consistent response format with appropriate HTTP status codes:

```json
{
  "error": "Bad Request",
  "message": "Validation error: stock cannot be negative",
  "timestamp": "2025-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Categories", description = "Category endpoints"),
        (name = "Sales", description = "Sale registration and statistics endpoints"),
        (name = "Uploads", description = "Product image storage endpoints")
    ),
    paths(
        // Products
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,

        // Categories
        crate::handlers::categories::list_categories,
        crate::handlers::categories::create_category,

        // Sales
        crate::handlers::sales::list_sales,
        crate::handlers::sales::register_sale,
        crate::handlers::sales::sales_stats,

        // Uploads
        crate::handlers::uploads::upload_image,
        crate::handlers::uploads::delete_image,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,

            // Product types
            crate::handlers::products::ProductResponse,
            crate::handlers::products::CategoryRef,
            crate::handlers::products::CreateProductRequest,
            crate::handlers::products::UpdateProductRequest,

            // Category types
            crate::handlers::categories::CategoryResponse,
            crate::handlers::categories::CreateCategoryRequest,

            // Sale types
            crate::handlers::sales::SaleResponse,
            crate::handlers::sales::ProductSummary,
            crate::handlers::sales::RegisterSaleRequest,

            // Statistics types
            crate::services::stats::SalesStatsReport,
            crate::services::stats::SalesSummary,
            crate::services::stats::ProductSalesTotals,
            crate::services::stats::DailySalesTotals,
            crate::services::stats::LowStockProduct,
            crate::services::stats::StatsPeriod,

            // Upload types
            crate::services::storage::StoredObject,
            crate::handlers::uploads::DeletedObject,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

/// Swagger UI router serving the generated OpenAPI document
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
