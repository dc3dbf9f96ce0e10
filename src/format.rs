use rust_decimal::prelude::*;

/// A table cell handed to the formatter: either an amount or free text.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Amount(Decimal),
    Text(String),
}

impl From<Decimal> for CellValue {
    fn from(value: Decimal) -> Self {
        CellValue::Amount(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Amount(Decimal::from(value))
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Amount(Decimal::from(value))
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

/// Formats a value as rupiah: whole units, `.` between thousands, negatives
/// in parentheses. Text is returned unchanged, digits or not.
pub fn format_rupiah(value: impl Into<CellValue>) -> String {
    match value.into() {
        CellValue::Amount(amount) => format_amount(amount),
        CellValue::Text(text) => text,
    }
}

/// Formats an optional amount, rendering `None` as an empty cell.
pub fn format_optional(value: Option<Decimal>) -> String {
    value.map(format_amount).unwrap_or_default()
}

fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    let digits = rounded.abs().trunc().to_string();
    let grouped = group_thousands(&digits);

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("({grouped})")
    } else {
        grouped
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
