// Utility helpers

use rust_decimal::Decimal;

use crate::error::{AppError, Result};

/// Converts an integer amount in base units to display units (`raw / 10^decimals`).
///
/// The conversion is exact for every value in the u64 range.
pub fn scale_base_units(raw: &str, decimals: u32) -> Result<Decimal> {
    let value: u64 = raw
        .parse()
        .map_err(|_| AppError::Fetch(format!("Invalid base-unit amount: {:?}", raw)))?;
    Decimal::try_from_i128_with_scale(value as i128, decimals)
        .map_err(|e| AppError::Internal(format!("Unsupported decimals {}: {}", decimals, e)))
}

/// Reads an integer carried either as a JSON string (the Aptos convention) or a number.
pub fn json_integer_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) if n.is_u64() => Some(n.to_string()),
        _ => None,
    }
}
