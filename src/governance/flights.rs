use std::collections::BTreeMap;

use log::info;
use serde::Serialize;

use crate::errors::{SuretyError, SuretyResult};
use crate::governance::airline::AirlineGovernance;
use crate::governance::gate::OperationalGate;
use crate::types::{Address, FlightStatus, RequestKey};

#[derive(Debug, Clone, Serialize)]
pub struct Flight {
    pub key: RequestKey,
    pub registered_at: u64,
    /// Canonical status once consensus finalized it, `Unknown` before
    pub status: FlightStatus,
}

impl Flight {
    pub fn is_open_for_sale(&self) -> bool {
        self.status == FlightStatus::Unknown
    }
}

/// Thin registry of flights offered for insurance.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FlightRegistry {
    flights: BTreeMap<RequestKey, Flight>,
}

impl FlightRegistry {
    pub fn new() -> Self {
        FlightRegistry {
            flights: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    pub fn flight(&self, key: &RequestKey) -> Option<&Flight> {
        self.flights.get(key)
    }

    /// `finalized` is the canonical status consensus already holds for the
    /// key, if any; such a flight is stored closed for sale.
    pub fn register_flight(
        &mut self,
        gate: &OperationalGate,
        governance: &AirlineGovernance,
        flight: &str,
        timestamp: u64,
        caller: Address,
        now: u64,
        finalized: Option<FlightStatus>,
    ) -> SuretyResult<RequestKey> {
        gate.require_operational()?;
        if !governance.is_funded(&caller) {
            return Err(SuretyError::Unauthorized(format!(
                "{} is not a funded airline",
                caller
            )));
        }
        if flight.trim().is_empty() {
            return Err(SuretyError::InvalidArgument("flight code is empty".to_string()));
        }
        let key = RequestKey::new(caller, flight, timestamp);
        if self.flights.contains_key(&key) {
            return Err(SuretyError::AlreadyRegistered(format!("flight {}", key)));
        }
        let status = finalized.unwrap_or(FlightStatus::Unknown);
        if status == FlightStatus::Unknown {
            info!("Flight {} registered", key);
        } else {
            info!("Flight {} registered closed, status already {}", key, status);
        }
        self.flights.insert(
            key.clone(),
            Flight {
                key: key.clone(),
                registered_at: now,
                status,
            },
        );
        Ok(key)
    }

    /// Fails with `NotFound` for unknown flights and `FlightClosed` once a
    /// status has been finalized.
    pub fn require_open(&self, key: &RequestKey) -> SuretyResult<&Flight> {
        let flight = self
            .flights
            .get(key)
            .ok_or_else(|| SuretyError::NotFound(format!("flight {}", key)))?;
        if !flight.is_open_for_sale() {
            return Err(SuretyError::FlightClosed(key.to_string()));
        }
        Ok(flight)
    }

    /// Records the canonical status; unregistered keys are ignored because
    /// status requests do not require a registered flight.
    pub fn close(&mut self, key: &RequestKey, status: FlightStatus) {
        if let Some(flight) = self.flights.get_mut(key) {
            if flight.is_open_for_sale() {
                flight.status = status;
            }
        }
    }
}
