//! Money helpers - conversion between user-entered prices and integer cents.
//!
//! All amounts in the store are `i64` cents. Floating point only appears at the
//! edge, where slash-command parameters arrive as `f64`.

use crate::errors::{Error, Result};

/// Converts a price entered by a user into cents, rounding to two fractional digits.
///
/// # Errors
/// Returns `InvalidAmount` if the value is negative, NaN or infinite.
pub fn to_cents(amount: f64) -> Result<i64> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    let cents = (amount * 100.0).round();
    // Bound check keeps the cast exact; anything above this is not a shop price.
    if cents > 1e15 {
        return Err(Error::InvalidAmount { amount });
    }
    #[allow(clippy::cast_possible_truncation)]
    Ok(cents as i64)
}

/// Formats cents as a plain decimal with a dot separator, e.g. `19.90`.
///
/// This is the representation used inside payment payloads.
#[must_use]
pub fn format_decimal(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Formats cents as Brazilian reais for display, e.g. `R$ 1.234,56`.
#[must_use]
pub fn format_brl(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let units = (abs / 100).to_string();

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, digit) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    format!("{sign}R$ {grouped},{:02}", abs % 100)
}

/// Multiplies a unit price by a quantity, failing on overflow.
pub fn line_total(unit_price_cents: i64, quantity: i64) -> Result<i64> {
    unit_price_cents
        .checked_mul(quantity)
        .ok_or_else(|| Error::Validation {
            message: format!("Total for {quantity} units overflows"),
        })
}

/// Adds up amounts, failing on overflow.
pub fn checked_sum(amounts: impl IntoIterator<Item = i64>) -> Result<i64> {
    amounts.into_iter().try_fold(0_i64, |acc, cents| {
        acc.checked_add(cents).ok_or_else(|| Error::Validation {
            message: "Order total overflows".to_string(),
        })
    })
}
