use axum::extract::FromRef;
use std::sync::Arc;

use crate::services::category_service::CategoryService;
use crate::services::report_service::ReportService;
use crate::services::transaction_service::TransactionService;

/// Shared application state; handlers pull the service they need out of
/// it via FromRef
#[derive(Clone, FromRef)]
pub struct AppState {
    pub transaction_service: Arc<dyn TransactionService>,
    pub category_service: Arc<dyn CategoryService>,
    pub report_service: Arc<dyn ReportService>,
}

impl AppState {
    pub fn new(
        transaction_service: Arc<dyn TransactionService>,
        category_service: Arc<dyn CategoryService>,
        report_service: Arc<dyn ReportService>,
    ) -> Self {
        AppState {
            transaction_service,
            category_service,
            report_service,
        }
    }
}
