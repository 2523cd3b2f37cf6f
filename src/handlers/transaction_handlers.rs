use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::handlers::ErrorResponse;
use crate::models::filters::TransactionFilter;
use crate::models::transaction::{Transaction, TransactionRequest};
use crate::services::transaction_service::{TransactionError, TransactionService};

/// Convert TransactionError to HTTP response
impl IntoResponse for TransactionError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            TransactionError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            TransactionError::NotFound(_) => (StatusCode::NOT_FOUND, "transaction_not_found"),
            TransactionError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            TransactionError::DatabaseError(_) => {
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

/// Handler for creating a transaction
///
/// Validates the payload and stores a new transaction. The status
/// defaults to NEW when the request omits it.
#[utoipa::path(
    post,
    path = "/api/transactions",
    request_body = TransactionRequest,
    responses(
        (status = 201, description = "Transaction successfully created", body = Transaction),
        (status = 400, description = "Validation error (blank fields, malformed amount, tax id or phone)", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "transactions"
)]
pub async fn create_transaction_handler(
    State(transaction_service): State<Arc<dyn TransactionService>>,
    Json(request): Json<TransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), Response> {
    // Validate request body
    if let Err(validation_errors) = request.validate() {
        return Err(validation_error_response(&validation_errors));
    }

    // Call transaction service to create the record
    match transaction_service.create_transaction(request).await {
        Ok(transaction) => Ok((StatusCode::CREATED, Json(transaction))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for fetching a single transaction
///
/// Returns the transaction with the given id, soft-deleted ones included.
#[utoipa::path(
    get,
    path = "/api/transactions/{id}",
    params(
        ("id" = Uuid, Path, description = "Transaction ID")
    ),
    responses(
        (status = 200, description = "Transaction found", body = Transaction),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "transactions"
)]
pub async fn get_transaction_handler(
    State(transaction_service): State<Arc<dyn TransactionService>>,
    axum::extract::Path(transaction_id): axum::extract::Path<Uuid>,
) -> Result<Json<Transaction>, Response> {
    match transaction_service.get_transaction(transaction_id).await {
        Ok(transaction) => Ok(Json(transaction)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for listing transactions
///
/// Retrieves all non-deleted transactions matching the query filters,
/// sorted by operation date ascending.
#[utoipa::path(
    get,
    path = "/api/transactions",
    params(TransactionFilter),
    responses(
        (status = 200, description = "List of matching transactions", body = Vec<Transaction>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "transactions"
)]
pub async fn search_transactions_handler(
    State(transaction_service): State<Arc<dyn TransactionService>>,
    Query(filter): Query<TransactionFilter>,
) -> Result<Json<Vec<Transaction>>, Response> {
    match transaction_service.search_transactions(filter).await {
        Ok(transactions) => Ok(Json(transactions)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for updating a transaction
///
/// Replaces all mutable fields of a transaction that is still in the
/// NEW status.
#[utoipa::path(
    put,
    path = "/api/transactions/{id}",
    params(
        ("id" = Uuid, Path, description = "Transaction ID")
    ),
    request_body = TransactionRequest,
    responses(
        (status = 200, description = "Transaction successfully updated", body = Transaction),
        (status = 400, description = "Validation error or status forbids updating", body = ErrorResponse),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 409, description = "Transaction was modified concurrently", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "transactions"
)]
pub async fn update_transaction_handler(
    State(transaction_service): State<Arc<dyn TransactionService>>,
    axum::extract::Path(transaction_id): axum::extract::Path<Uuid>,
    Json(request): Json<TransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), Response> {
    // Validate request body
    if let Err(validation_errors) = request.validate() {
        return Err(validation_error_response(&validation_errors));
    }

    // Call transaction service to update the record
    match transaction_service
        .update_transaction(transaction_id, request)
        .await
    {
        Ok(transaction) => Ok((StatusCode::OK, Json(transaction))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for deleting a transaction
///
/// Soft-deletes a transaction by flipping its status to DELETED.
#[utoipa::path(
    delete,
    path = "/api/transactions/{id}",
    params(
        ("id" = Uuid, Path, description = "Transaction ID")
    ),
    responses(
        (status = 204, description = "Transaction successfully deleted"),
        (status = 400, description = "Status forbids deleting", body = ErrorResponse),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "transactions"
)]
pub async fn delete_transaction_handler(
    State(transaction_service): State<Arc<dyn TransactionService>>,
    axum::extract::Path(transaction_id): axum::extract::Path<Uuid>,
) -> Result<StatusCode, Response> {
    match transaction_service.delete_transaction(transaction_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(e.into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::transaction::{PersonType, TransactionStatus, TransactionType};
    use crate::repositories::transaction_repository::InMemoryTransactionRepository;
    use crate::services::transaction_service::TransactionServiceImpl;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn make_service() -> Arc<dyn TransactionService> {
        Arc::new(TransactionServiceImpl::new(Arc::new(
            InMemoryTransactionRepository::new(),
        )))
    }

    fn valid_request() -> TransactionRequest {
        TransactionRequest {
            person_type: PersonType::Legal,
            operation_date: "2025-04-05T12:30:00".parse().unwrap(),
            transaction_type: TransactionType::Outcome,
            comment: Some("office rent".to_string()),
            amount: Decimal::from_str("150000.00").unwrap(),
            status: None,
            sender_bank: "Alpha".to_string(),
            account: "40702810900000005555".to_string(),
            receiver_bank: "Beta".to_string(),
            receiver_account: "40702810100000001111".to_string(),
            receiver_inn: Some("7707083893".to_string()),
            category: "rent".to_string(),
            receiver_phone: Some("+79161234567".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_transaction_handler_success() {
        let service = make_service();

        let result =
            create_transaction_handler(State(service), Json(valid_request())).await;

        assert!(result.is_ok());
        let (status, Json(transaction)) = result.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(transaction.status, TransactionStatus::New);
        assert_eq!(transaction.category, "rent");
    }

    #[tokio::test]
    async fn test_create_transaction_handler_rejects_blank_sender_bank() {
        let service = make_service();
        let request = TransactionRequest {
            sender_bank: "   ".to_string(),
            ..valid_request()
        };

        let result = create_transaction_handler(State(service), Json(request)).await;

        assert!(result.is_err());
        assert_eq!(result.unwrap_err().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_transaction_handler_rejects_bad_tax_id() {
        let service = make_service();
        let request = TransactionRequest {
            receiver_inn: Some("12345".to_string()),
            ..valid_request()
        };

        let result = create_transaction_handler(State(service), Json(request)).await;

        assert!(result.is_err());
        assert_eq!(result.unwrap_err().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_transaction_handler_roundtrip() {
        let service = make_service();
        let (_, Json(created)) =
            create_transaction_handler(State(service.clone()), Json(valid_request()))
                .await
                .unwrap();

        let result = get_transaction_handler(
            State(service),
            axum::extract::Path(created.id),
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(result.unwrap().0, created);
    }

    #[tokio::test]
    async fn test_get_transaction_handler_not_found() {
        let service = make_service();

        let result = get_transaction_handler(
            State(service),
            axum::extract::Path(Uuid::new_v4()),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(result.unwrap_err().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_search_transactions_handler_filters_by_category() {
        let service = make_service();
        create_transaction_handler(State(service.clone()), Json(valid_request()))
            .await
            .unwrap();
        create_transaction_handler(
            State(service.clone()),
            Json(TransactionRequest {
                category: "salary".to_string(),
                ..valid_request()
            }),
        )
        .await
        .unwrap();

        let filter = TransactionFilter {
            category: Some("rent".to_string()),
            ..TransactionFilter::default()
        };
        let result = search_transactions_handler(State(service), Query(filter)).await;

        assert!(result.is_ok());
        let transactions = result.unwrap().0;
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].category, "rent");
    }

    #[tokio::test]
    async fn test_update_transaction_handler_success() {
        let service = make_service();
        let (_, Json(created)) =
            create_transaction_handler(State(service.clone()), Json(valid_request()))
                .await
                .unwrap();

        let replacement = TransactionRequest {
            comment: Some("updated".to_string()),
            status: Some(TransactionStatus::Confirmed),
            ..valid_request()
        };
        let result = update_transaction_handler(
            State(service),
            axum::extract::Path(created.id),
            Json(replacement),
        )
        .await;

        assert!(result.is_ok());
        let (status, Json(updated)) = result.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated.comment.as_deref(), Some("updated"));
        assert_eq!(updated.status, TransactionStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_update_transaction_handler_rejects_confirmed_record() {
        let service = make_service();
        let (_, Json(created)) =
            create_transaction_handler(State(service.clone()), Json(valid_request()))
                .await
                .unwrap();

        // First update moves the record out of NEW
        update_transaction_handler(
            State(service.clone()),
            axum::extract::Path(created.id),
            Json(TransactionRequest {
                status: Some(TransactionStatus::Confirmed),
                ..valid_request()
            }),
        )
        .await
        .unwrap();

        // Second update must hit the lifecycle guard
        let result = update_transaction_handler(
            State(service),
            axum::extract::Path(created.id),
            Json(valid_request()),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(result.unwrap_err().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_transaction_handler_not_found() {
        let service = make_service();

        let result = update_transaction_handler(
            State(service),
            axum::extract::Path(Uuid::new_v4()),
            Json(valid_request()),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(result.unwrap_err().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_transaction_handler_idempotent() {
        let service = make_service();
        let (_, Json(created)) =
            create_transaction_handler(State(service.clone()), Json(valid_request()))
                .await
                .unwrap();

        let first = delete_transaction_handler(
            State(service.clone()),
            axum::extract::Path(created.id),
        )
        .await;
        assert_eq!(first.unwrap(), StatusCode::NO_CONTENT);

        // Re-deleting a DELETED record is a no-op, not an error
        let second = delete_transaction_handler(
            State(service.clone()),
            axum::extract::Path(created.id),
        )
        .await;
        assert_eq!(second.unwrap(), StatusCode::NO_CONTENT);

        let fetched = get_transaction_handler(State(service), axum::extract::Path(created.id))
            .await
            .unwrap();
        assert_eq!(fetched.0.status, TransactionStatus::Deleted);
    }

    #[tokio::test]
    async fn test_delete_transaction_handler_rejects_confirmed_record() {
        let service = make_service();
        let (_, Json(created)) =
            create_transaction_handler(State(service.clone()), Json(valid_request()))
                .await
                .unwrap();
        update_transaction_handler(
            State(service.clone()),
            axum::extract::Path(created.id),
            Json(TransactionRequest {
                status: Some(TransactionStatus::Confirmed),
                ..valid_request()
            }),
        )
        .await
        .unwrap();

        let result = delete_transaction_handler(
            State(service),
            axum::extract::Path(created.id),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(result.unwrap_err().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_transaction_error_into_response() {
        let error = TransactionError::Validation("cannot update CONFIRMED transaction".to_string());
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);

        let error = TransactionError::NotFound(Uuid::new_v4());
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);

        let error = TransactionError::Conflict(Uuid::new_v4());
        assert_eq!(error.into_response().status(), StatusCode::CONFLICT);

        let error = TransactionError::DatabaseError("connection refused".to_string());
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
