use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::handlers::ErrorResponse;
use crate::services::report_service::{ReportError, ReportService};
use crate::services::transaction_service::TransactionService;

/// Convert ReportError to HTTP response
impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ReportError::NoActiveTransactions => (StatusCode::NOT_FOUND, "no_transactions"),
            ReportError::Rendering(_) => (StatusCode::INTERNAL_SERVER_ERROR, "report_error"),
        };

        let error_response = ErrorResponse::new(error_type, &self.to_string());
        (status, Json(error_response)).into_response()
    }
}

/// Handler for exporting active transactions as a PDF file
///
/// Renders every non-deleted transaction into a downloadable PDF.
/// Returns 404 when there is nothing to report.
#[utoipa::path(
    get,
    path = "/api/reports/transactions/pdf",
    responses(
        (status = 200, description = "PDF report over all active transactions", content_type = "application/pdf", body = Vec<u8>),
        (status = 404, description = "No active transactions to report", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn export_pdf_handler(
    State(transaction_service): State<Arc<dyn TransactionService>>,
    State(report_service): State<Arc<dyn ReportService>>,
) -> Result<Response, Response> {
    let transactions = transaction_service
        .list_active()
        .await
        .map_err(|e| e.into_response())?;
    if transactions.is_empty() {
        return Err(ReportError::NoActiveTransactions.into_response());
    }

    let bytes = report_service
        .generate_pdf_report(&transactions)
        .map_err(|e| e.into_response())?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"transactions-report.pdf\"",
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Handler for exporting active transactions as an Excel file
///
/// Renders every non-deleted transaction into a downloadable XLSX
/// workbook. Returns 404 when there is nothing to report.
#[utoipa::path(
    get,
    path = "/api/reports/transactions/excel",
    responses(
        (status = 200, description = "XLSX report over all active transactions", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet", body = Vec<u8>),
        (status = 404, description = "No active transactions to report", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn export_excel_handler(
    State(transaction_service): State<Arc<dyn TransactionService>>,
    State(report_service): State<Arc<dyn ReportService>>,
) -> Result<Response, Response> {
    let transactions = transaction_service
        .list_active()
        .await
        .map_err(|e| e.into_response())?;
    if transactions.is_empty() {
        return Err(ReportError::NoActiveTransactions.into_response());
    }

    let bytes = report_service
        .generate_excel_report(&transactions)
        .map_err(|e| e.into_response())?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"transactions-report.xlsx\"",
            ),
        ],
        bytes,
    )
        .into_response())
}
