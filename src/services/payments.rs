//! Total/advance amount parsing and the advance-vs-total rules applied when an
//! order is created or edited.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{AmountField, OrderValidationError};

/// Fractional digits stored for every amount.
pub const AMOUNT_SCALE: u32 = 2;

/// Amounts are stored as DECIMAL(10, 2), so the integer part holds at most 8 digits.
const AMOUNT_LIMIT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

/// An amount as submitted: either already numeric, or text that may carry
/// thousands separators (`"1,800,000"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(Decimal),
    Text(String),
}

impl From<Decimal> for AmountInput {
    fn from(value: Decimal) -> Self {
        AmountInput::Number(value)
    }
}

impl From<&str> for AmountInput {
    fn from(value: &str) -> Self {
        AmountInput::Text(value.to_string())
    }
}

impl AmountInput {
    fn is_blank(&self) -> bool {
        matches!(self, AmountInput::Text(s) if s.trim().is_empty())
    }
}

/// Validated amounts for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaymentAmounts {
    pub total_amount: Decimal,
    pub advance_amount: Decimal,
}

impl PaymentAmounts {
    pub fn remaining_amount(&self) -> Decimal {
        remaining_amount(self.total_amount, self.advance_amount)
    }
}

/// Parses one amount field. Commas are dropped, then the value must be a
/// plain decimal with at most two fractional digits that fits the column.
pub fn parse_amount(field: AmountField, raw: &AmountInput) -> Result<Decimal, OrderValidationError> {
    let invalid = || OrderValidationError::InvalidAmount { field };

    let value = match raw {
        AmountInput::Number(value) => *value,
        AmountInput::Text(text) => {
            let cleaned = text.trim().replace(',', "");
            Decimal::from_str(&cleaned).map_err(|_| invalid())?
        }
    };

    let mut value = value.normalize();
    if value.scale() > AMOUNT_SCALE || value.abs() >= AMOUNT_LIMIT {
        return Err(invalid());
    }
    value.rescale(AMOUNT_SCALE);
    Ok(value)
}

/// Parses an optional field; missing or blank input yields `None`.
pub fn parse_optional_amount(
    field: AmountField,
    raw: Option<&AmountInput>,
) -> Result<Option<Decimal>, OrderValidationError> {
    match raw {
        None => Ok(None),
        Some(input) if input.is_blank() => Ok(None),
        Some(input) => parse_amount(field, input).map(Some),
    }
}

/// Validates the total/advance pair submitted on the order form.
///
/// The total is required and may not be negative. A missing or blank advance
/// is zero. A zero advance means "no partial payment recorded yet" and is
/// never compared against the total.
pub fn validate_payment(
    total: Option<&AmountInput>,
    advance: Option<&AmountInput>,
) -> Result<PaymentAmounts, OrderValidationError> {
    let total_amount = parse_optional_amount(AmountField::TotalAmount, total)?.ok_or(
        OrderValidationError::InvalidAmount {
            field: AmountField::TotalAmount,
        },
    )?;
    let advance_amount =
        parse_optional_amount(AmountField::AdvanceAmount, advance)?.unwrap_or(Decimal::ZERO);

    check_amounts(total_amount, advance_amount)?;

    Ok(PaymentAmounts {
        total_amount,
        advance_amount,
    })
}

/// Cross-field rules over already parsed amounts.
pub fn check_amounts(total: Decimal, advance: Decimal) -> Result<(), OrderValidationError> {
    if total.is_sign_negative() && !total.is_zero() {
        return Err(OrderValidationError::InvalidAmount {
            field: AmountField::TotalAmount,
        });
    }
    if advance < Decimal::ZERO {
        return Err(OrderValidationError::NegativeAdvance);
    }
    if advance > total && !advance.is_zero() {
        return Err(OrderValidationError::AdvanceExceedsTotal);
    }
    Ok(())
}

/// Balance still owed. A zero advance reports nothing owed: by convention such
/// orders are treated as settled, not as unpaid.
pub fn remaining_amount(total: Decimal, advance: Decimal) -> Decimal {
    if advance.is_zero() {
        return Decimal::ZERO;
    }
    (total - advance).max(Decimal::ZERO)
}
