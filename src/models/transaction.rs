use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::{validate_amount, validate_not_blank};

/// Kind of counterparty initiating the operation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersonType {
    Physical,
    Legal,
}

impl PersonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonType::Physical => "PHYSICAL",
            PersonType::Legal => "LEGAL",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "PHYSICAL" => Some(PersonType::Physical),
            "LEGAL" => Some(PersonType::Legal),
            _ => None,
        }
    }
}

/// Direction of the money movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Income,
    Outcome,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "INCOME",
            TransactionType::Outcome => "OUTCOME",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "INCOME" => Some(TransactionType::Income),
            "OUTCOME" => Some(TransactionType::Outcome),
            _ => None,
        }
    }
}

/// Lifecycle status of a transaction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    New,
    Confirmed,
    InProgress,
    Completed,
    Canceled,
    Deleted,
    Refund,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::New => "NEW",
            TransactionStatus::Confirmed => "CONFIRMED",
            TransactionStatus::InProgress => "IN_PROGRESS",
            TransactionStatus::Completed => "COMPLETED",
            TransactionStatus::Canceled => "CANCELED",
            TransactionStatus::Deleted => "DELETED",
            TransactionStatus::Refund => "REFUND",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "NEW" => Some(TransactionStatus::New),
            "CONFIRMED" => Some(TransactionStatus::Confirmed),
            "IN_PROGRESS" => Some(TransactionStatus::InProgress),
            "COMPLETED" => Some(TransactionStatus::Completed),
            "CANCELED" => Some(TransactionStatus::Canceled),
            "DELETED" => Some(TransactionStatus::Deleted),
            "REFUND" => Some(TransactionStatus::Refund),
            _ => None,
        }
    }

    /// Lifecycle table, update column: only NEW records may have their
    /// fields replaced.
    pub fn permits_update(&self) -> bool {
        matches!(self, TransactionStatus::New)
    }

    /// Lifecycle table, delete column: NEW records may be soft-deleted,
    /// and re-deleting a DELETED record is allowed (it stays DELETED).
    pub fn permits_delete(&self) -> bool {
        matches!(self, TransactionStatus::New | TransactionStatus::Deleted)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transaction entity representing a single financial movement
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub person_type: PersonType,
    pub operation_date: NaiveDateTime,
    pub transaction_type: TransactionType,
    pub comment: Option<String>,
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub sender_bank: String,
    pub account: String,
    pub receiver_bank: String,
    pub receiver_account: String,
    pub receiver_inn: Option<String>,
    pub category: String,
    pub receiver_phone: Option<String>,
}

/// Request payload for creating or replacing a transaction
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "personType": "LEGAL",
    "operationDate": "2025-04-05T12:30:00",
    "transactionType": "OUTCOME",
    "comment": "office rent, april",
    "amount": "150000.00",
    "senderBank": "Alpha",
    "account": "40702810900000005555",
    "receiverBank": "Beta",
    "receiverAccount": "40702810100000001111",
    "receiverInn": "7707083893",
    "category": "rent",
    "receiverPhone": "+79161234567"
}))]
pub struct TransactionRequest {
    pub person_type: PersonType,

    #[schema(example = "2025-04-05T12:30:00")]
    pub operation_date: NaiveDateTime,

    pub transaction_type: TransactionType,

    #[validate(length(max = 500, message = "comment must be at most 500 characters"))]
    pub comment: Option<String>,

    #[validate(custom(function = "validate_amount"))]
    #[schema(example = "150000.00")]
    pub amount: Decimal,

    /// Stored as given when present; NEW when omitted
    pub status: Option<TransactionStatus>,

    #[validate(custom(function = "validate_not_blank"))]
    pub sender_bank: String,

    #[validate(custom(function = "validate_not_blank"))]
    pub account: String,

    #[validate(custom(function = "validate_not_blank"))]
    pub receiver_bank: String,

    #[validate(custom(function = "validate_not_blank"))]
    pub receiver_account: String,

    /// Tax id of the receiver, 10 or 12 digits when present
    #[schema(example = "7707083893")]
    pub receiver_inn: Option<String>,

    #[validate(custom(function = "validate_not_blank"))]
    pub category: String,

    #[schema(example = "+79161234567")]
    pub receiver_phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVERY_STATUS: [TransactionStatus; 7] = [
        TransactionStatus::New,
        TransactionStatus::Confirmed,
        TransactionStatus::InProgress,
        TransactionStatus::Completed,
        TransactionStatus::Canceled,
        TransactionStatus::Deleted,
        TransactionStatus::Refund,
    ];

    #[test]
    fn test_only_new_permits_update() {
        for status in EVERY_STATUS {
            assert_eq!(
                status.permits_update(),
                status == TransactionStatus::New,
                "update permission wrong for {status}"
            );
        }
    }

    #[test]
    fn test_only_new_and_deleted_permit_delete() {
        for status in EVERY_STATUS {
            let expected = matches!(
                status,
                TransactionStatus::New | TransactionStatus::Deleted
            );
            assert_eq!(
                status.permits_delete(),
                expected,
                "delete permission wrong for {status}"
            );
        }
    }

    #[test]
    fn test_status_db_string_round_trip() {
        for status in EVERY_STATUS {
            assert_eq!(
                TransactionStatus::from_db_string(status.as_str()),
                Some(status)
            );
        }
        assert_eq!(TransactionStatus::from_db_string("ARCHIVED"), None);
    }

    #[test]
    fn test_enum_wire_names_are_uppercase() {
        assert_eq!(
            serde_json::to_string(&TransactionStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        assert_eq!(
            serde_json::to_string(&PersonType::Physical).unwrap(),
            "\"PHYSICAL\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionType::Outcome).unwrap(),
            "\"OUTCOME\""
        );
    }

    #[test]
    fn test_transaction_serializes_with_camel_case_fields() {
        let transaction = Transaction {
            id: Uuid::new_v4(),
            person_type: PersonType::Legal,
            operation_date: "2025-04-05T12:30:00".parse().unwrap(),
            transaction_type: TransactionType::Income,
            comment: None,
            amount: "100.50".parse().unwrap(),
            status: TransactionStatus::New,
            sender_bank: "Alpha".to_string(),
            account: "111".to_string(),
            receiver_bank: "Beta".to_string(),
            receiver_account: "222".to_string(),
            receiver_inn: None,
            category: "salary".to_string(),
            receiver_phone: None,
        };

        let value = serde_json::to_value(&transaction).unwrap();
        assert!(value.get("personType").is_some());
        assert!(value.get("operationDate").is_some());
        assert!(value.get("receiverAccount").is_some());
        assert_eq!(value["status"], "NEW");
    }
}
