// src/utils/mod.rs

use alloy::primitives::Address;
use std::str::FromStr;

use crate::errors::{Result, SniperError};

pub mod units;

pub use units::{format_native, parse_wei_to_native, units_to_decimal, wei_to_native, NATIVE_DECIMALS};

/// Parses a `0x`-prefixed 20-byte address (any case, checksum not enforced).
pub fn parse_address(address: &str) -> Result<Address> {
    let trimmed = address.trim();
    let body = match trimmed.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("0x") => &trimmed[2..],
        _ => return Err(SniperError::InvalidAddress(address.to_string())),
    };
    Address::from_str(body).map_err(|_| SniperError::InvalidAddress(address.to_string()))
}

pub fn is_valid_address(address: &str) -> bool {
    parse_address(address).is_ok()
}

/// Lower-case hex form of an address, the key for case-insensitive comparisons.
pub fn address_key(address: Address) -> String {
    format!("{:#x}", address).to_ascii_lowercase()
}

pub fn normalize_address(address: &str) -> Result<String> {
    parse_address(address).map(address_key)
}

/// `0x1234…abcd` for log lines and tables.
pub fn short_address(address: &str) -> String {
    if address.len() <= 12 {
        return address.to_string();
    }
    format!("{}…{}", &address[..6], &address[address.len() - 4..])
}
