use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, de};
use validator::ValidationError;

/// Validates that an amount is not negative (zero is allowed)
pub fn validate_non_negative_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        let mut error = ValidationError::new("invalid_amount");
        error.message = Some("amount must be a non-negative number".into());
        return Err(error);
    }
    Ok(())
}

/// Validates that a text field has content once surrounding whitespace is removed
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("must not be empty".into());
        return Err(error);
    }
    Ok(())
}

/// Parses a decimal amount from text such as `"12.5"`, `"0"` or `"1e3"`
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Accepts an amount as a JSON number or a numeric string
pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    amount_from_json(&value).ok_or_else(|| de::Error::custom("amount must be a finite number"))
}

/// Same as [`deserialize_amount`] for optional fields; `null` counts as absent
pub fn deserialize_optional_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    amount_from_json(&value)
        .map(Some)
        .ok_or_else(|| de::Error::custom("amount must be a finite number"))
}

fn amount_from_json(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(n) => parse_amount(&n.to_string()),
        serde_json::Value::String(s) => parse_amount(s),
        _ => None,
    }
}

/// Distinguishes a missing field (`None`) from an explicit `null` (`Some(None)`)
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Parses a calendar day, keeping only the leading `YYYY-MM-DD` part of the input
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Like [`parse_day`] but blank input means "no day"
pub fn parse_optional_day(raw: Option<&str>) -> Result<Option<NaiveDate>, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_day(value)
            .map(Some)
            .ok_or_else(|| format!("'{}' is not a valid YYYY-MM-DD date", value)),
    }
}

/// Derives a category id: lower-cased, whitespace runs collapsed into single hyphens
pub fn category_slug(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}
