//! Phone, currency and date formatting shared by checkout and delivery.

use crate::error::VoucherError;
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

const MIN_PHONE_DIGITS: usize = 9;
const MAX_PHONE_DIGITS: usize = 15;

/// Normalises a phone number to international digits without `+`.
///
/// Local numbers (leading `0`, or a bare mobile number starting with `8`)
/// get `country_code` prepended. Anything else is kept as written.
pub fn normalize_phone(input: &str, country_code: &str) -> Result<String, VoucherError> {
    let trimmed = input.trim();
    let (international, rest) = match trimmed.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    if !rest
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '.' | '(' | ')'))
    {
        return Err(VoucherError::ValidationError(format!(
            "Invalid phone number: {input:?}"
        )));
    }

    let digits: String = rest.chars().filter(char::is_ascii_digit).collect();
    let normalized = if international || digits.starts_with(country_code) {
        digits
    } else if let Some(local) = digits.strip_prefix('0') {
        format!("{country_code}{local}")
    } else if digits.starts_with('8') {
        format!("{country_code}{digits}")
    } else {
        digits
    };

    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&normalized.len()) {
        return Err(VoucherError::ValidationError(format!(
            "Invalid phone number: {input:?}"
        )));
    }
    Ok(normalized)
}

/// `Rp 1.250.000`, or `Rp 99.500,50` when there are cents.
pub fn format_currency(amount: Decimal, symbol: &str) -> String {
    let rounded = amount
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    // fract() is below one, so scaling it cannot overflow.
    let cents = (rounded.fract() * Decimal::ONE_HUNDRED)
        .to_u32()
        .unwrap_or_default();
    let units = rounded.trunc();

    let digits = units.normalize().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if amount.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    if cents == 0 {
        format!("{sign}{symbol} {grouped}")
    } else {
        format!("{sign}{symbol} {grouped},{cents:02}")
    }
}

/// `19 October 2026`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}
