//! Currency and rate units
//!
//! Amounts travel as integer MIST everywhere; SUI strings only exist at the
//! display and input edges. Conversions here are exact decimal operations,
//! never a round trip through `f64`.

use crate::error::{BondError, Result};
use crate::types::{BasisPoints, Mist};

/// One SUI in MIST
pub const MIST_PER_SUI: Mist = 1_000_000_000;

/// Fraction digits of one SUI
pub const SUI_DECIMALS: usize = 9;

/// 100% in basis points
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Render MIST as a SUI amount with thousands separators
///
/// Keeps at least 2 and at most 9 fraction digits, trimming trailing zeros.
pub fn format_sui(mist: Mist) -> String {
    let whole = mist / MIST_PER_SUI;
    let frac = mist % MIST_PER_SUI;

    let mut frac_digits = format!("{:09}", frac);
    while frac_digits.len() > 2 && frac_digits.ends_with('0') {
        frac_digits.pop();
    }

    format!("{}.{}", group_thousands(whole), frac_digits)
}

/// SUI value as a float, for display math only
pub fn mist_to_sui_f64(mist: Mist) -> f64 {
    mist as f64 / MIST_PER_SUI as f64
}

/// Parse a decimal SUI amount into MIST
///
/// Accepts `"1"`, `"0.5"`, `"1,234.000000001"`, `".25"`. Rejects signs, more
/// than 9 fraction digits and values that do not fit in `u64`.
pub fn parse_sui(input: &str) -> Result<Mist> {
    let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Err(BondError::InvalidAmount("empty amount".to_string()));
    }

    let (whole_str, frac_str) = match cleaned.split_once('.') {
        Some((w, f)) => (w, f),
        None => (cleaned.as_str(), ""),
    };

    if whole_str.is_empty() && frac_str.is_empty() {
        return Err(BondError::InvalidAmount(input.to_string()));
    }
    if !whole_str.chars().all(|c| c.is_ascii_digit())
        || !frac_str.chars().all(|c| c.is_ascii_digit())
    {
        return Err(BondError::InvalidAmount(input.to_string()));
    }
    if frac_str.len() > SUI_DECIMALS {
        return Err(BondError::InvalidAmount(format!(
            "{} has more than {} decimal places",
            input, SUI_DECIMALS
        )));
    }

    let whole: u64 = if whole_str.is_empty() {
        0
    } else {
        whole_str
            .parse()
            .map_err(|_| BondError::InvalidAmount(input.to_string()))?
    };
    let frac: u64 = if frac_str.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", frac_str, width = SUI_DECIMALS);
        padded
            .parse()
            .map_err(|_| BondError::InvalidAmount(input.to_string()))?
    };

    whole
        .checked_mul(MIST_PER_SUI)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(|| BondError::InvalidAmount(format!("{} is too large", input)))
}

/// Render a basis-point rate as a percentage, e.g. 500 -> `"5.00%"`
pub fn format_interest_rate(bps: BasisPoints) -> String {
    format!("{}.{:02}%", bps / 100, bps % 100)
}

/// Shorten a wallet address for display, e.g. `0x1234...abcd`
///
/// Addresses no longer than `start + end` characters are returned as is.
pub fn truncate_address(address: &str, start: usize, end: usize) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= start + end {
        return address.to_string();
    }
    let head: String = chars[..start].iter().collect();
    let tail: String = chars[chars.len() - end..].iter().collect();
    format!("{}...{}", head, tail)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
