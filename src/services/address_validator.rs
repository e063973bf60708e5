use regex::Regex;
use std::sync::OnceLock;

use crate::constants::{ADDRESS_HEX_LEN, ADDRESS_PREFIX};
use crate::error::{AppError, Result};
use crate::models::Address;

static ADDRESS_PATTERN: OnceLock<Regex> = OnceLock::new();

fn address_pattern() -> &'static Regex {
    ADDRESS_PATTERN.get_or_init(|| {
        let pattern = format!(
            "^{}[0-9a-fA-F]{{{}}}$",
            regex::escape(ADDRESS_PREFIX),
            ADDRESS_HEX_LEN
        );
        Regex::new(&pattern).expect("address pattern is a valid regex")
    })
}

/// Checks the `0x` + 64 hex format. No trimming, no network access.
pub fn is_valid(input: &str) -> bool {
    address_pattern().is_match(input)
}

pub fn parse_address(input: &str) -> Result<Address> {
    if is_valid(input) {
        Ok(Address::from_validated(input))
    } else {
        Err(AppError::InvalidAddressFormat)
    }
}
