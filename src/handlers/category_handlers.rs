use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::handlers::ErrorResponse;
use crate::models::category::{Category, CategoryRequest};
use crate::services::category_service::{CategoryError, CategoryService};

/// Convert CategoryError to HTTP response
impl IntoResponse for CategoryError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            CategoryError::NotFound(_) => (StatusCode::NOT_FOUND, "category_not_found"),
            CategoryError::DatabaseError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
            }
        };

        let error_response = ErrorResponse::new(error_type, &self.to_string());
        (status, Json(error_response)).into_response()
    }
}

/// Collapse derive-level validation failures into a single 400 response
fn validation_error_response(validation_errors: &validator::ValidationErrors) -> Response {
    let error_message = validation_errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ");

    let error_response = ErrorResponse::new("validation_error", &error_message);
    (StatusCode::BAD_REQUEST, Json(error_response)).into_response()
}

/// Handler for creating a category
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category successfully created", body = Category),
        (status = 400, description = "Validation error (blank name)", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn create_category_handler(
    State(category_service): State<Arc<dyn CategoryService>>,
    Json(request): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>), Response> {
    // Validate request body
    if let Err(validation_errors) = request.validate() {
        return Err(validation_error_response(&validation_errors));
    }

    match category_service.create_category(request).await {
        Ok(category) => Ok((StatusCode::CREATED, Json(category))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for listing categories
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "List of categories", body = Vec<Category>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn list_categories_handler(
    State(category_service): State<Arc<dyn CategoryService>>,
) -> Result<Json<Vec<Category>>, Response> {
    match category_service.get_categories().await {
        Ok(categories) => Ok(Json(categories)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for renaming a category
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category successfully updated", body = Category),
        (status = 400, description = "Validation error (blank name)", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn update_category_handler(
    State(category_service): State<Arc<dyn CategoryService>>,
    axum::extract::Path(category_id): axum::extract::Path<Uuid>,
    Json(request): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>), Response> {
    // Validate request body
    if let Err(validation_errors) = request.validate() {
        return Err(validation_error_response(&validation_errors));
    }

    match category_service.update_category(category_id, request).await {
        Ok(category) => Ok((StatusCode::OK, Json(category))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for deleting a category
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 204, description = "Category successfully deleted"),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn delete_category_handler(
    State(category_service): State<Arc<dyn CategoryService>>,
    axum::extract::Path(category_id): axum::extract::Path<Uuid>,
) -> Result<StatusCode, Response> {
    match category_service.delete_category(category_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(e.into_response()),
    }
}
