use serde::{Deserialize, Serialize};

use crate::types::{Address, Amount, FlightStatus};

/// Events produced by marketplace operations.
///
/// `OracleRequest` and `StatusFinalized` are consumed by external oracle
/// processes and by the insurance ledger; the rest are for observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SuretyEvent {
    OracleRequest {
        index: u8,
        airline: Address,
        flight: String,
        timestamp: u64,
    },
    StatusFinalized {
        airline: Address,
        flight: String,
        timestamp: u64,
        status: FlightStatus,
    },
    OperationalChanged {
        operational: bool,
    },
    AirlineFunded {
        airline: Address,
        amount: Amount,
    },
    AirlineVoted {
        candidate: Address,
        voter: Address,
        votes: usize,
    },
    AirlineRegistered {
        airline: Address,
        votes: usize,
    },
    FlightRegistered {
        airline: Address,
        flight: String,
        timestamp: u64,
    },
    OracleRegistered {
        oracle: Address,
        indexes: [u8; 3],
    },
    InsurancePurchased {
        passenger: Address,
        airline: Address,
        flight: String,
        timestamp: u64,
        premium: Amount,
    },
    PayoutCredited {
        passenger: Address,
        airline: Address,
        flight: String,
        timestamp: u64,
        amount: Amount,
    },
    PayoutWithdrawn {
        passenger: Address,
        amount: Amount,
    },
}

/// Discriminant used to filter subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    OracleRequest,
    StatusFinalized,
    OperationalChanged,
    AirlineFunded,
    AirlineVoted,
    AirlineRegistered,
    FlightRegistered,
    OracleRegistered,
    InsurancePurchased,
    PayoutCredited,
    PayoutWithdrawn,
}

impl SuretyEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SuretyEvent::OracleRequest { .. } => EventKind::OracleRequest,
            SuretyEvent::StatusFinalized { .. } => EventKind::StatusFinalized,
            SuretyEvent::OperationalChanged { .. } => EventKind::OperationalChanged,
            SuretyEvent::AirlineFunded { .. } => EventKind::AirlineFunded,
            SuretyEvent::AirlineVoted { .. } => EventKind::AirlineVoted,
            SuretyEvent::AirlineRegistered { .. } => EventKind::AirlineRegistered,
            SuretyEvent::FlightRegistered { .. } => EventKind::FlightRegistered,
            SuretyEvent::OracleRegistered { .. } => EventKind::OracleRegistered,
            SuretyEvent::InsurancePurchased { .. } => EventKind::InsurancePurchased,
            SuretyEvent::PayoutCredited { .. } => EventKind::PayoutCredited,
            SuretyEvent::PayoutWithdrawn { .. } => EventKind::PayoutWithdrawn,
        }
    }
}

/// An event together with its position in the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub offset: u64,
    pub event: SuretyEvent,
}

/// Events staged by one operation; committed to the log only if the
/// operation succeeds.
#[derive(Debug, Default)]
pub struct EventBuffer {
    events: Vec<SuretyEvent>,
}

impl EventBuffer {
    pub fn new() -> Self {
        EventBuffer { events: Vec::new() }
    }

    pub fn emit(&mut self, event: SuretyEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SuretyEvent> {
        self.events.iter()
    }

    pub fn into_events(self) -> Vec<SuretyEvent> {
        self.events
    }
}
