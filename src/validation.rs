use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

use crate::models::TransactionRequest;

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\+7|8)\d{10}$").expect("phone pattern is valid"));

const MAX_INTEGER_DIGITS: usize = 15;
const MAX_FRACTIONAL_DIGITS: u32 = 5;

/// Receiver identifier rejections, in the order the checks run
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReceiverFieldError {
    #[error("tax id must contain 10 or 12 digits")]
    TaxIdLength,
    #[error("tax id must contain only digits")]
    TaxIdDigits,
    #[error("phone must be in +7XXXXXXXXXX or 8XXXXXXXXXX format")]
    PhoneFormat,
}

/// Checks the optional receiver identifiers of a transaction request.
/// Pure, no side effects. The order is fixed: tax id before phone, and
/// for the tax id, length before digit content, so a given bad input
/// always produces the same message.
pub fn validate_receiver_fields(request: &TransactionRequest) -> Result<(), ReceiverFieldError> {
    if let Some(inn) = request.receiver_inn.as_deref() {
        if inn.len() != 10 && inn.len() != 12 {
            return Err(ReceiverFieldError::TaxIdLength);
        }
        if !inn.chars().all(|c| c.is_ascii_digit()) {
            return Err(ReceiverFieldError::TaxIdDigits);
        }
    }
    if let Some(phone) = request.receiver_phone.as_deref() {
        if !PHONE_PATTERN.is_match(phone) {
            return Err(ReceiverFieldError::PhoneFormat);
        }
    }
    Ok(())
}

/// Validates that an amount is positive and fits 15 integer digits and
/// 5 fractional digits
pub fn validate_amount(amount: &rust_decimal::Decimal) -> Result<(), ValidationError> {
    if *amount <= rust_decimal::Decimal::ZERO {
        let mut error = ValidationError::new("invalid_amount");
        error.message = Some("amount must be greater than 0".into());
        return Err(error);
    }
    let integer_digits = amount
        .trunc()
        .abs()
        .to_string()
        .trim_start_matches('0')
        .len()
        .max(1);
    if integer_digits > MAX_INTEGER_DIGITS || amount.normalize().scale() > MAX_FRACTIONAL_DIGITS {
        let mut error = ValidationError::new("invalid_amount");
        error.message = Some(
            "amount must have at most 15 integer digits and 5 fractional digits".into(),
        );
        return Err(error);
    }
    Ok(())
}

/// Validates that a required text field is not empty or whitespace-only
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank_field");
        error.message = Some("field must not be blank".into());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PersonType, TransactionType};
    use rust_decimal::Decimal;

    fn request_with(inn: Option<&str>, phone: Option<&str>) -> TransactionRequest {
        TransactionRequest {
            person_type: PersonType::Physical,
            operation_date: "2025-04-05T12:30:00".parse().unwrap(),
            transaction_type: TransactionType::Income,
            comment: None,
            amount: Decimal::new(10000, 2),
            status: None,
            sender_bank: "Alpha".to_string(),
            account: "111".to_string(),
            receiver_bank: "Beta".to_string(),
            receiver_account: "222".to_string(),
            receiver_inn: inn.map(String::from),
            category: "salary".to_string(),
            receiver_phone: phone.map(String::from),
        }
    }

    #[test]
    fn test_absent_receiver_fields_pass() {
        assert_eq!(validate_receiver_fields(&request_with(None, None)), Ok(()));
    }

    #[test]
    fn test_valid_tax_ids_pass() {
        assert_eq!(
            validate_receiver_fields(&request_with(Some("7707083893"), None)),
            Ok(())
        );
        assert_eq!(
            validate_receiver_fields(&request_with(Some("770708389312"), None)),
            Ok(())
        );
    }

    #[test]
    fn test_tax_id_with_wrong_length_fails() {
        assert_eq!(
            validate_receiver_fields(&request_with(Some("123"), None)),
            Err(ReceiverFieldError::TaxIdLength)
        );
        assert_eq!(
            validate_receiver_fields(&request_with(Some("12345678901"), None)),
            Err(ReceiverFieldError::TaxIdLength)
        );
    }

    #[test]
    fn test_tax_id_length_is_checked_before_digits() {
        // 10 characters with one letter: the length check passes, so the
        // digit check must be the one that fires.
        assert_eq!(
            validate_receiver_fields(&request_with(Some("12345A7890"), None)),
            Err(ReceiverFieldError::TaxIdDigits)
        );
    }

    #[test]
    fn test_tax_id_is_checked_before_phone() {
        assert_eq!(
            validate_receiver_fields(&request_with(Some("123"), Some("bad-phone"))),
            Err(ReceiverFieldError::TaxIdLength)
        );
    }

    #[test]
    fn test_phone_formats() {
        assert_eq!(
            validate_receiver_fields(&request_with(None, Some("+79876543210"))),
            Ok(())
        );
        assert_eq!(
            validate_receiver_fields(&request_with(None, Some("81234567890"))),
            Ok(())
        );
        // 11 digits but neither a +7 nor an 8 prefix
        assert_eq!(
            validate_receiver_fields(&request_with(None, Some("71234567890"))),
            Err(ReceiverFieldError::PhoneFormat)
        );
        assert_eq!(
            validate_receiver_fields(&request_with(None, Some("+7912345678"))),
            Err(ReceiverFieldError::PhoneFormat)
        );
        assert_eq!(
            validate_receiver_fields(&request_with(None, Some("8123456789012"))),
            Err(ReceiverFieldError::PhoneFormat)
        );
    }

    #[test]
    fn test_error_messages_match_contract() {
        assert_eq!(
            ReceiverFieldError::TaxIdLength.to_string(),
            "tax id must contain 10 or 12 digits"
        );
        assert_eq!(
            ReceiverFieldError::TaxIdDigits.to_string(),
            "tax id must contain only digits"
        );
        assert_eq!(
            ReceiverFieldError::PhoneFormat.to_string(),
            "phone must be in +7XXXXXXXXXX or 8XXXXXXXXXX format"
        );
    }

    #[test]
    fn test_positive_amount_within_digit_limits_passes() {
        assert!(validate_amount(&Decimal::new(10050, 2)).is_ok());
        assert!(validate_amount(&"999999999999999.99999".parse().unwrap()).is_ok());
    }

    #[test]
    fn test_non_positive_amount_fails() {
        assert!(validate_amount(&Decimal::ZERO).is_err());
        assert!(validate_amount(&Decimal::new(-500, 2)).is_err());
    }

    #[test]
    fn test_amount_with_too_many_digits_fails() {
        assert!(validate_amount(&"1000000000000000".parse().unwrap()).is_err());
        assert!(validate_amount(&"1.000001".parse().unwrap()).is_err());
    }

    #[test]
    fn test_blank_detection() {
        assert!(validate_not_blank("Alpha").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   ").is_err());
    }
}
