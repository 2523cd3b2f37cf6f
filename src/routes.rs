use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::category_handlers::{
    create_category_handler, delete_category_handler, list_categories_handler,
    update_category_handler,
};
use crate::handlers::report_handlers::{export_excel_handler, export_pdf_handler};
use crate::handlers::transaction_handlers::{
    create_transaction_handler, delete_transaction_handler, get_transaction_handler,
    search_transactions_handler, update_transaction_handler,
};
use crate::state::AppState;

/// Build the API router over the given state
pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Transaction routes
        .route(
            "/api/transactions",
            post(create_transaction_handler).get(search_transactions_handler),
        )
        .route(
            "/api/transactions/:id",
            get(get_transaction_handler)
                .put(update_transaction_handler)
                .delete(delete_transaction_handler),
        )
        // Category routes
        .route(
            "/api/categories",
            post(create_category_handler).get(list_categories_handler),
        )
        .route(
            "/api/categories/:id",
            put(update_category_handler).delete(delete_category_handler),
        )
        // Report export routes
        .route("/api/reports/transactions/pdf", get(export_pdf_handler))
        .route("/api/reports/transactions/excel", get(export_excel_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
