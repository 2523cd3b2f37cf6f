pub mod category_handlers;
pub mod report_handlers;
pub mod transaction_handlers;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error response structure shared by all handlers
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}
