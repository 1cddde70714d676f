//! Integer-exact conversion between whole-token amounts and base units

use crate::core::{SdkError, SdkResult};

/// 10^decimals, failing when it does not fit a u128
pub fn pow10(decimals: u8) -> SdkResult<u128> {
    10u128
        .checked_pow(decimals as u32)
        .ok_or_else(|| SdkError::Amount(format!("10^{} overflows", decimals)))
}

/// Convert a decimal string in whole-token units into base units.
///
/// `"1000"` with 9 decimals is `1_000_000_000_000`. Fractional digits are
/// allowed as long as the result is still an integer number of base units;
/// anything that would need truncation, or exceeds `u64::MAX`, is an error.
pub fn to_base_units(amount: &str, decimals: u8) -> SdkResult<u64> {
    let raw = amount.trim();
    let (whole, frac) = match raw.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (raw, ""),
    };
    if (whole.is_empty() && frac.is_empty())
        || !whole.chars().all(|c| c.is_ascii_digit())
        || !frac.chars().all(|c| c.is_ascii_digit())
    {
        return Err(SdkError::Amount(format!("{:?} is not a non-negative number", amount)));
    }

    // Trailing zeros in the fraction carry no value
    let frac = frac.trim_end_matches('0');
    if frac.len() > decimals as usize {
        return Err(SdkError::Amount(format!(
            "{} has more than {} decimal places",
            raw, decimals
        )));
    }

    let overflow = || SdkError::Amount(format!("{} with {} decimals overflows u64", raw, decimals));

    let scale = pow10(decimals)?;
    let whole_value = parse_digits(whole).ok_or_else(overflow)?;
    let frac_value = parse_digits(frac).ok_or_else(overflow)?;
    let frac_scale = pow10(decimals - frac.len() as u8)?;

    let base = whole_value
        .checked_mul(scale)
        .and_then(|v| v.checked_add(frac_value.checked_mul(frac_scale)?))
        .ok_or_else(overflow)?;

    u64::try_from(base).map_err(|_| overflow())
}

/// Render base units as a whole-token decimal string without trailing zeros
pub fn from_base_units(base_units: u64, decimals: u8) -> String {
    if decimals == 0 {
        return base_units.to_string();
    }
    let digits = format!("{:0>width$}", base_units, width = decimals as usize + 1);
    let (whole, frac) = digits.split_at(digits.len() - decimals as usize);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, frac)
    }
}

fn parse_digits(digits: &str) -> Option<u128> {
    if digits.is_empty() {
        return Some(0);
    }
    digits.parse::<u128>().ok()
}
