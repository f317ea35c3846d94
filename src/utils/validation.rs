//! Validation utilities

use crate::types::{LedgerError, LedgerResult};
use bigdecimal::BigDecimal;

/// Validate a deposit/withdrawal/transfer amount
///
/// Amounts must be positive and carry at most two decimal places; balances
/// are kept in cents precision.
pub fn validate_amount(amount: &BigDecimal) -> LedgerResult<()> {
    if *amount <= BigDecimal::from(0) {
        return Err(LedgerError::InvalidAmount(
            "amount must be positive".to_string(),
        ));
    }

    if amount.normalized().fractional_digit_count() > 2 {
        return Err(LedgerError::InvalidAmount(
            "amount cannot be more precise than cents".to_string(),
        ));
    }

    Ok(())
}

/// Validate that an account identifier is well-formed
///
/// Identifiers are the `<type-prefix>_<token>` shape the factory generates:
/// non-empty, at most 50 characters, alphanumeric plus dashes and
/// underscores. Malformed ids are rejected before any store lookup.
pub fn validate_account_id(account_id: &str) -> LedgerResult<()> {
    if account_id.trim().is_empty() {
        return Err(LedgerError::Validation(
            "account id cannot be empty".to_string(),
        ));
    }

    if account_id.len() > 50 {
        return Err(LedgerError::Validation(
            "account id cannot exceed 50 characters".to_string(),
        ));
    }

    if !account_id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(LedgerError::Validation(
            "account id may only contain alphanumeric characters, dashes, and underscores"
                .to_string(),
        ));
    }

    Ok(())
}

/// Validate an optional transfer description
pub fn validate_description(description: &str) -> LedgerResult<()> {
    if description.len() > 500 {
        return Err(LedgerError::Validation(
            "description cannot exceed 500 characters".to_string(),
        ));
    }

    Ok(())
}
