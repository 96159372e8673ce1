//! Error types for the duty engine and the quotation model.

use crate::core::currency::CurrencyCode;
use crate::duty::inputs::DutyField;
use crate::quotation::charges::{ChargeField, ChargeLineId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors arising from exchange-rate resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FxError {
    #[error("no exchange rate available for {currency}")]
    RateNotFound { currency: CurrencyCode },
    #[error("exchange rate must be positive, got {rate} for {currency}")]
    InvalidRate { currency: CurrencyCode, rate: Decimal },
    #[error("converting {amount} {currency} into local currency overflows")]
    Overflow { currency: CurrencyCode, amount: Decimal },
}

/// Rejections raised by [`DutyEngine::compute`](crate::duty::engine::DutyEngine::compute).
///
/// Validation runs before any arithmetic, so an error never comes with a
/// partial breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DutyError {
    #[error("{field} must not be negative, got {value}")]
    Negative { field: DutyField, value: Decimal },
    #[error("exchange rate must be greater than zero, got {0}")]
    NonPositiveExchangeRate(Decimal),
    #[error("arithmetic overflow while computing {step}")]
    Overflow { step: &'static str },
    #[error(transparent)]
    Fx(#[from] FxError),
}

impl DutyError {
    /// The input field that failed validation, if the error is tied to one.
    pub fn field(&self) -> Option<DutyField> {
        match self {
            DutyError::Negative { field, .. } => Some(*field),
            DutyError::NonPositiveExchangeRate(_) => Some(DutyField::ExchangeRate),
            DutyError::Fx(_) => Some(DutyField::ExchangeRate),
            DutyError::Overflow { .. } => None,
        }
    }
}

/// Rejections raised by [`ChargeList`](crate::quotation::charges::ChargeList) edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChargeError {
    #[error("no charge line with id {0}")]
    NotFound(ChargeLineId),
    #[error("cannot remove the last remaining charge line")]
    LastLine,
    #[error("{field} must not be negative, got {value}")]
    Negative { field: ChargeField, value: Decimal },
    #[error("{field} of {value} would overflow the quotation total")]
    Overflow { field: ChargeField, value: Decimal },
}
