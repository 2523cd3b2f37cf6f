pub mod category_service;
pub mod report_service;
pub mod transaction_service;

pub use category_service::{CategoryError, CategoryService, CategoryServiceImpl};
pub use report_service::{ReportError, ReportService, ReportServiceImpl};
pub use transaction_service::{TransactionError, TransactionService, TransactionServiceImpl};
