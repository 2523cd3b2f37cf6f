use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::IntoParams;

use super::transaction::{TransactionStatus, TransactionType};

/// Search criteria for transactions. Every field is optional; an absent
/// field imposes no constraint. Provided criteria are combined with AND.
/// Soft-deleted records are excluded no matter what the filter says.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TransactionFilter {
    /// Exact sender bank name
    pub sender_bank: Option<String>,
    /// Exact receiver bank name
    pub receiver_bank: Option<String>,
    /// Exact category label
    pub category: Option<String>,
    pub transaction_type: Option<TransactionType>,
    pub status: Option<TransactionStatus>,
    /// Inclusive lower bound on operation date
    #[param(example = "2025-04-01T00:00:00")]
    pub date_from: Option<NaiveDateTime>,
    /// Inclusive upper bound on operation date
    #[param(example = "2025-04-30T23:59:59")]
    pub date_to: Option<NaiveDateTime>,
    /// Inclusive lower bound on amount
    pub amount_min: Option<Decimal>,
    /// Inclusive upper bound on amount
    pub amount_max: Option<Decimal>,
}
