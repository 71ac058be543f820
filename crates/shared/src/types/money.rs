//! Decimal money helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal` end to end; these helpers convert
//! loosely-typed inputs into decimals and decimals into display strings.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;

use crate::error::AppError;

/// Currency markers stripped from textual amounts before parsing.
const CURRENCY_MARKERS: [&str; 4] = ["₹", "INR", "Rs.", "Rs"];

/// Parses a loosely-typed amount into a `Decimal`.
///
/// Accepts JSON numbers (integer, fractional or scientific) and strings such
/// as `"1,23,456.78"`, `"₹ 500"`, `"Rs. 12.5"` or `"(250.00)"` (accounting
/// negative). The sign is preserved; callers decide how to treat negatives.
/// Returns `None` when the value cannot be read as a number.
#[must_use]
pub fn parse_amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_numeric_text(&n.to_string()),
        Value::String(s) => parse_amount_str(s),
        _ => None,
    }
}

fn parse_amount_str(raw: &str) -> Option<Decimal> {
    let mut text = raw.trim().to_string();
    let negative_parens = text.starts_with('(') && text.ends_with(')');
    if negative_parens {
        text = text[1..text.len() - 1].to_string();
    }
    for marker in CURRENCY_MARKERS {
        text = text.replace(marker, "");
    }
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let parsed = parse_numeric_text(&cleaned)?;
    Some(if negative_parens { -parsed } else { parsed })
}

fn parse_numeric_text(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// A running total left the range `Decimal` can represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("amount total exceeds the supported range")]
pub struct AmountOverflow;

impl From<AmountOverflow> for AppError {
    fn from(err: AmountOverflow) -> Self {
        Self::Unprocessable(err.to_string())
    }
}

/// Adds two amounts, failing instead of panicking on overflow.
///
/// ```
/// use cognitax_shared::types::{AmountOverflow, checked_add};
/// use rust_decimal::Decimal;
///
/// assert_eq!(checked_add(Decimal::ONE, Decimal::ONE), Ok(Decimal::TWO));
/// assert_eq!(checked_add(Decimal::MAX, Decimal::ONE), Err(AmountOverflow));
/// ```
pub fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal, AmountOverflow> {
    a.checked_add(b).ok_or(AmountOverflow)
}

/// Formats an amount as rupees with thousands separators and two decimals,
/// e.g. `₹1,234,567.50`.
#[must_use]
pub fn format_rupees(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}₹{grouped}.{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[rstest]
    #[case(json!(100000), dec!(100000))]
    #[case(json!(1234.5), dec!(1234.5))]
    #[case(json!("1,23,456.78"), dec!(123456.78))]
    #[case(json!("₹ 500"), dec!(500))]
    #[case(json!("Rs. 12.50"), dec!(12.50))]
    #[case(json!("INR 99"), dec!(99))]
    #[case(json!("(250.00)"), dec!(-250.00))]
    #[case(json!(-42), dec!(-42))]
    #[case(json!("1e3"), dec!(1000))]
    fn test_parse_amount_accepts(#[case] input: Value, #[case] expected: Decimal) {
        assert_eq!(parse_amount(&input), Some(expected));
    }

    #[rstest]
    #[case(json!(null))]
    #[case(json!(true))]
    #[case(json!(""))]
    #[case(json!("twelve"))]
    #[case(json!({"amount": 1}))]
    #[case(json!([1]))]
    fn test_parse_amount_rejects(#[case] input: Value) {
        assert_eq!(parse_amount(&input), None);
    }

    #[test]
    fn test_checked_add_reports_overflow() {
        let huge = parse_amount(&json!("70000000000000000000000000000")).unwrap();
        assert_eq!(checked_add(huge, huge), Err(AmountOverflow));
        assert_eq!(checked_add(huge, Decimal::ZERO), Ok(huge));
        assert_eq!(
            AppError::from(AmountOverflow).status_code(),
            422
        );
    }

    #[test]
    fn test_format_rupees() {
        assert_eq!(format_rupees(dec!(0)), "₹0.00");
        assert_eq!(format_rupees(dec!(999.5)), "₹999.50");
        assert_eq!(format_rupees(dec!(100000)), "₹100,000.00");
        assert_eq!(format_rupees(dec!(1234567.891)), "₹1,234,567.89");
        assert_eq!(format_rupees(dec!(-2500)), "-₹2,500.00");
    }
}
