//! Conversion between human decimal amounts and token base units.

use alloy_primitives::{
    utils::{format_units, parse_units},
    U256,
};
use derive_more::derive::Display;

/// Decimals assumed for a token that does not report its own.
pub const DEFAULT_DECIMALS: u8 = 18;

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum UnitsError {
    #[display("not a decimal number")]
    Malformed,
    #[display("more than {_0} decimal places")]
    TooPrecise(u8),
    #[display("amount does not fit in 256 bits")]
    Overflow,
}

impl std::error::Error for UnitsError {}

struct DecimalParts<'a> {
    integer: &'a str,
    fraction: &'a str,
}

fn split_decimal(amount: &str) -> Option<DecimalParts<'_>> {
    let amount = amount.trim();
    let amount = amount.strip_prefix('+').unwrap_or(amount);
    let (integer, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    if integer.is_empty() && fraction.is_empty() {
        return None;
    }
    let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !digits_only(integer) || !digits_only(fraction) {
        return None;
    }
    Some(DecimalParts { integer, fraction })
}

/// True when `amount` is a well-formed decimal number greater than zero.
pub fn is_positive_amount(amount: &str) -> bool {
    split_decimal(amount).is_some_and(|parts| {
        parts
            .integer
            .bytes()
            .chain(parts.fraction.bytes())
            .any(|b| b != b'0')
    })
}

/// Scales a human amount (`"1.5"`) by `10^decimals` into base units.
pub fn to_base_units(amount: &str, decimals: u8) -> Result<U256, UnitsError> {
    let parts = split_decimal(amount).ok_or(UnitsError::Malformed)?;
    if parts.fraction.len() > decimals as usize {
        return Err(UnitsError::TooPrecise(decimals));
    }

    // parse_units scales with a wrapping multiplication, so bound the whole
    // part first.
    let whole = match parts.integer {
        "" => U256::ZERO,
        digits => U256::from_str_radix(digits, 10).map_err(|_| UnitsError::Overflow)?,
    };
    let scale = U256::from(10u8)
        .checked_pow(U256::from(decimals))
        .ok_or(UnitsError::Overflow)?;
    if whole.checked_mul(scale).is_none() {
        return Err(UnitsError::Overflow);
    }

    let normalized = match (parts.integer, parts.fraction) {
        ("", fraction) => format!("0.{fraction}"),
        (integer, "") => integer.to_string(),
        (integer, fraction) => format!("{integer}.{fraction}"),
    };
    parse_units(&normalized, decimals)
        .map(|parsed| parsed.get_absolute())
        .map_err(|_| UnitsError::Overflow)
}

/// Formats base units as a human amount, trimming trailing zeros.
pub fn from_base_units(value: U256, decimals: u8) -> String {
    let Ok(formatted) = format_units(value, decimals) else {
        return value.to_string();
    };
    match formatted.split_once('.') {
        Some((integer, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                integer.to_string()
            } else {
                format!("{integer}.{fraction}")
            }
        }
        None => formatted,
    }
}
