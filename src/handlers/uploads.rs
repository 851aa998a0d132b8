use crate::services::storage::{
    generate_file_name, ObjectStorageService, StoredObject, ALLOWED_IMAGE_TYPES, MAX_UPLOAD_BYTES,
};
use crate::{errors::ServiceError, ApiResponse, AppState};
use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

/// Slack between the validated size cap and the raw body limit, so oversized
/// uploads get a proper validation message instead of a bare 413.
const BODY_LIMIT_SLACK: usize = 1024 * 1024;

/// Creates the router for image upload endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(upload_image).delete(delete_image))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + BODY_LIMIT_SLACK))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DeleteUploadQuery {
    /// Object name returned by the upload endpoint
    pub file_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedObject {
    pub file_name: String,
}

fn storage_backend(state: &AppState) -> Result<Arc<ObjectStorageService>, ServiceError> {
    state
        .services
        .storage
        .clone()
        .ok_or_else(|| ServiceError::InternalError("object storage is not configured".to_string()))
}

/// Upload a product image to object storage
#[utoipa::path(
    post,
    path = "/api/v1/upload",
    responses(
        (status = 201, description = "Image stored", body = crate::ApiResponse<StoredObject>),
        (status = 400, description = "Missing file, bad type, or too large", body = crate::errors::ErrorResponse)
    ),
    tag = "Uploads"
)]
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ServiceError> {
    let storage = storage_backend(&state)?;

    let mut file = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ServiceError::ValidationError(format!("Invalid multipart payload: {}", e))
    })? {
        if field.name() == Some("file") {
            let original_name = field.file_name().unwrap_or("upload").to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let data = field.bytes().await.map_err(|e| {
                ServiceError::ValidationError(format!("Failed to read file: {}", e))
            })?;
            file = Some((original_name, content_type, data));
            break;
        }
    }

    let (original_name, content_type, data) = file.ok_or_else(|| {
        ServiceError::ValidationError("No file provided; expected multipart field 'file'".to_string())
    })?;

    if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
        return Err(ServiceError::ValidationError(
            "Unsupported file type; only JPEG, PNG, WebP, and GIF images are allowed".to_string(),
        ));
    }

    if data.len() > MAX_UPLOAD_BYTES {
        return Err(ServiceError::ValidationError(
            "File too large; maximum size is 5MB".to_string(),
        ));
    }

    let file_name = generate_file_name(&original_name);
    let stored = storage.upload(&file_name, &content_type, data).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(stored))))
}

/// Delete a previously uploaded image
#[utoipa::path(
    delete,
    path = "/api/v1/upload",
    params(DeleteUploadQuery),
    responses(
        (status = 200, description = "Image deleted", body = crate::ApiResponse<DeletedObject>),
        (status = 400, description = "Missing file name", body = crate::errors::ErrorResponse)
    ),
    tag = "Uploads"
)]
pub async fn delete_image(
    State(state): State<AppState>,
    Query(params): Query<DeleteUploadQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let storage = storage_backend(&state)?;

    let file_name = params.file_name.trim().to_string();
    if file_name.is_empty() {
        return Err(ServiceError::ValidationError(
            "file_name query parameter is required".to_string(),
        ));
    }

    storage.delete(&file_name).await?;
    Ok(Json(ApiResponse::success(DeletedObject { file_name })))
}
