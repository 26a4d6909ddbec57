//! Amounts in configuration files.
//!
//! TOML integers stop at `i64::MAX`, below ten ether in base units, so amounts
//! are also accepted as strings with an optional unit: `"10 ether"`,
//! `"250 gwei"`, `"1000"` or `"1000 wei"`.

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt;

use crate::types::{Amount, ETHER};

const GWEI: Amount = 1_000_000_000;

pub fn parse_amount(raw: &str) -> Result<Amount, String> {
    let trimmed = raw.trim();
    let (digits, unit) = match trimmed.split_once(char::is_whitespace) {
        Some((digits, unit)) => (digits, unit.trim()),
        None => (trimmed, "wei"),
    };
    let scale = match unit.to_ascii_lowercase().as_str() {
        "wei" => 1,
        "gwei" => GWEI,
        "ether" | "eth" => ETHER,
        other => return Err(format!("unknown amount unit '{}'", other)),
    };
    let value: Amount = digits
        .replace('_', "")
        .parse()
        .map_err(|_| format!("invalid amount '{}'", raw))?;
    value
        .checked_mul(scale)
        .ok_or_else(|| format!("amount '{}' overflows", raw))
}

pub fn format_amount(amount: Amount) -> String {
    if amount != 0 && amount % ETHER == 0 {
        format!("{} ether", amount / ETHER)
    } else if amount != 0 && amount % GWEI == 0 {
        format!("{} gwei", amount / GWEI)
    } else {
        amount.to_string()
    }
}

pub fn serialize<S: Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_amount(*amount))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
    deserializer.deserialize_any(AmountVisitor)
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative integer or a string such as \"10 ether\"")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(v as Amount)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Amount::try_from(v).map_err(|_| E::custom(format!("negative amount {}", v)))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Amount, E> {
        Ok(v)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        parse_amount(v).map_err(E::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_amount("10 ether").unwrap(), 10 * ETHER);
        assert_eq!(parse_amount("250 gwei").unwrap(), 250 * GWEI);
        assert_eq!(parse_amount("1_000").unwrap(), 1_000);
        assert!(parse_amount("3 furlongs").is_err());
        assert!(parse_amount("-1").is_err());
    }

    #[test]
    fn test_format_picks_largest_unit() {
        assert_eq!(format_amount(ETHER), "1 ether");
        assert_eq!(format_amount(3 * GWEI), "3 gwei");
        assert_eq!(format_amount(17), "17");
        assert_eq!(format_amount(0), "0");
    }
}
