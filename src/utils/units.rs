use alloy::primitives::utils::format_units;
use alloy::primitives::U256;

use crate::errors::{Result, SniperError};

/// BNB and most BEP-20 tokens use 18 decimals.
pub const NATIVE_DECIMALS: u8 = 18;

/// Whole units of a base-unit amount with the given number of decimals.
pub fn units_to_decimal(amount: U256, decimals: u8) -> Result<f64> {
    let formatted = format_units(amount, decimals)
        .map_err(|e| SniperError::ParseError(format!("Cannot format {} with {} decimals: {}", amount, decimals, e)))?;
    formatted.parse::<f64>()
        .map_err(|e| SniperError::ParseError(format!("Invalid decimal amount '{}': {}", formatted, e)))
}

/// Convert wei to BNB.
pub fn wei_to_native(wei: U256) -> Result<f64> {
    units_to_decimal(wei, NATIVE_DECIMALS)
}

/// Parse a decimal wei string (as quoted in node error text) straight into BNB.
pub fn parse_wei_to_native(raw: &str) -> Result<f64> {
    let wei = U256::from_str_radix(raw.trim(), 10)
        .map_err(|e| SniperError::ParseError(format!("Invalid wei amount '{}': {}", raw, e)))?;
    wei_to_native(wei)
}

/// Format a native amount for display, trimming trailing zeros.
pub fn format_native(amount: f64) -> String {
    let formatted = format!("{:.6}", amount);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
