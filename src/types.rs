//! Core value types shared by governance, consensus and insurance.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::SuretyError;

/// Monetary amount in base units (1 ether = 10^18).
pub type Amount = u128;

pub const ETHER: Amount = 1_000_000_000_000_000_000;

/// 20-byte participant identity as supplied by the identity registry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn new(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }

    /// Deterministic address for simulations and tests: the big-endian
    /// `seed` in the low bytes, `tag` in the first byte.
    pub fn derived(tag: u8, seed: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[0] = tag;
        bytes[12..].copy_from_slice(&seed.to_be_bytes());
        Address(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = SuretyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let decoded = hex::decode(raw)
            .map_err(|e| SuretyError::InvalidArgument(format!("address {}: {}", s, e)))?;
        let bytes: [u8; 20] = decoded.try_into().map_err(|_| {
            SuretyError::InvalidArgument(format!("address {} must be 20 bytes", s))
        })?;
        Ok(Address(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Flight status codes reported by oracles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FlightStatus {
    Unknown,
    OnTime,
    LateAirline,
    LateWeather,
    LateTechnical,
    LateOther,
}

impl FlightStatus {
    /// Statuses an oracle may report; `Unknown` is the pre-consensus state.
    pub const REPORTABLE: [FlightStatus; 5] = [
        FlightStatus::OnTime,
        FlightStatus::LateAirline,
        FlightStatus::LateWeather,
        FlightStatus::LateTechnical,
        FlightStatus::LateOther,
    ];

    pub fn code(self) -> u8 {
        match self {
            FlightStatus::Unknown => 0,
            FlightStatus::OnTime => 10,
            FlightStatus::LateAirline => 20,
            FlightStatus::LateWeather => 30,
            FlightStatus::LateTechnical => 40,
            FlightStatus::LateOther => 50,
        }
    }

    /// Whether this status entitles passengers to a payout.
    pub fn is_airline_fault(self) -> bool {
        self == FlightStatus::LateAirline
    }
}

impl TryFrom<u8> for FlightStatus {
    type Error = SuretyError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(FlightStatus::Unknown),
            10 => Ok(FlightStatus::OnTime),
            20 => Ok(FlightStatus::LateAirline),
            30 => Ok(FlightStatus::LateWeather),
            40 => Ok(FlightStatus::LateTechnical),
            50 => Ok(FlightStatus::LateOther),
            other => Err(SuretyError::InvalidArgument(format!(
                "unknown flight status code {}",
                other
            ))),
        }
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlightStatus::Unknown => "Unknown",
            FlightStatus::OnTime => "OnTime",
            FlightStatus::LateAirline => "LateAirline",
            FlightStatus::LateWeather => "LateWeather",
            FlightStatus::LateTechnical => "LateTechnical",
            FlightStatus::LateOther => "LateOther",
        };
        write!(f, "{} ({})", name, self.code())
    }
}

/// Identifies one status inquiry: (airline, flight code, departure timestamp).
///
/// Serialized as `airline/flight@timestamp` so it can key ordered maps in
/// the canonical state encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestKey {
    pub airline: Address,
    pub flight: String,
    pub timestamp: u64,
}

impl RequestKey {
    pub fn new(airline: Address, flight: impl Into<String>, timestamp: u64) -> Self {
        RequestKey {
            airline,
            flight: flight.into(),
            timestamp,
        }
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.airline, self.flight, self.timestamp)
    }
}

impl FromStr for RequestKey {
    type Err = SuretyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || SuretyError::InvalidArgument(format!("malformed request key {}", s));
        let (airline, rest) = s.split_once('/').ok_or_else(malformed)?;
        let (flight, timestamp) = rest.rsplit_once('@').ok_or_else(malformed)?;
        let timestamp = timestamp.parse::<u64>().map_err(|_| malformed())?;
        Ok(RequestKey::new(airline.parse()?, flight, timestamp))
    }
}

impl Serialize for RequestKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RequestKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_parse_and_display() {
        let addr = Address::derived(0xaa, 42);
        let text = addr.to_string();
        assert!(text.starts_with("0xaa"));
        assert_eq!(text.parse::<Address>().unwrap(), addr);
        assert!("0x1234".parse::<Address>().is_err());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(FlightStatus::LateAirline.code(), 20);
        assert_eq!(FlightStatus::try_from(40).unwrap(), FlightStatus::LateTechnical);
        assert!(FlightStatus::try_from(15).is_err());
        assert!(FlightStatus::LateAirline.is_airline_fault());
        assert!(!FlightStatus::LateWeather.is_airline_fault());
    }

    #[test]
    fn test_request_key_with_separators_in_flight() {
        let key = RequestKey::new(Address::derived(1, 1), "SV/12@65", 1_700_000_000);
        let parsed: RequestKey = key.to_string().parse().unwrap();
        assert_eq!(parsed, key);
    }
}
