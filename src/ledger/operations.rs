//! Wire types of the ledger interface.
//!
//! Operations and queries are tagged by name with their arguments in a
//! separate object, e.g. `{"op": "register_airline", "args": {"candidate": "0x…"}}`,
//! so a client can address them by operation name plus JSON arguments.

use serde::{Deserialize, Serialize};

use crate::consensus::engine::{RequestPhase, ResponseOutcome};
use crate::consensus::INDEXES_PER_ORACLE;
use crate::errors::{SuretyError, SuretyResult};
use crate::governance::airline::{FundingOutcome, RegistrationInfo, RegistrationOutcome};
use crate::insurance::ledger::{CreditSummary, InsurancePolicy};
use crate::ledger::events::LoggedEvent;
use crate::types::{Address, Amount, FlightStatus, RequestKey};

/// Mutating marketplace operations. Funds travel as the attached value of
/// the submission, never as arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "args", rename_all = "snake_case")]
pub enum Operation {
    SetOperational {
        operational: bool,
    },
    /// Attached value is the deposit
    FundAirline {
        airline: Address,
    },
    RegisterAirline {
        candidate: Address,
    },
    RegisterFlight {
        flight: String,
        timestamp: u64,
    },
    /// Attached value is the registration fee; the caller is the oracle
    RegisterOracle,
    RequestStatus {
        airline: Address,
        flight: String,
        timestamp: u64,
    },
    SubmitResponse {
        index: u8,
        airline: Address,
        flight: String,
        timestamp: u64,
        /// Raw status code as reported by the oracle
        status: u8,
    },
    /// Attached value is the premium; the caller is the passenger
    PurchaseInsurance {
        airline: Address,
        flight: String,
        timestamp: u64,
    },
    WithdrawPayout {
        airline: Address,
        flight: String,
        timestamp: u64,
    },
    /// Re-drive `StatusFinalized` events from the log into the insurance ledger
    ReplayFinalized {
        from_offset: u64,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::SetOperational { .. } => "set_operational",
            Operation::FundAirline { .. } => "fund_airline",
            Operation::RegisterAirline { .. } => "register_airline",
            Operation::RegisterFlight { .. } => "register_flight",
            Operation::RegisterOracle => "register_oracle",
            Operation::RequestStatus { .. } => "request_status",
            Operation::SubmitResponse { .. } => "submit_response",
            Operation::PurchaseInsurance { .. } => "purchase_insurance",
            Operation::WithdrawPayout { .. } => "withdraw_payout",
            Operation::ReplayFinalized { .. } => "replay_finalized",
        }
    }

    /// Whether the operation consumes an attached value.
    pub fn is_payable(&self) -> bool {
        matches!(
            self,
            Operation::FundAirline { .. } | Operation::RegisterOracle | Operation::PurchaseInsurance { .. }
        )
    }

    /// Decode an operation from its name and JSON arguments.
    pub fn from_named(name: &str, args: serde_json::Value) -> SuretyResult<Self> {
        decode_named(name, args)
    }
}

/// Pure reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "args", rename_all = "snake_case")]
pub enum Query {
    IsOperational,
    IsAirline {
        airline: Address,
    },
    IsFunded {
        airline: Address,
    },
    RegistrationInfo {
        airline: Address,
    },
    IsFlightOpen {
        airline: Address,
        flight: String,
        timestamp: u64,
    },
    MyIndexes {
        oracle: Address,
    },
    CanonicalStatus {
        airline: Address,
        flight: String,
        timestamp: u64,
    },
    RequestState {
        airline: Address,
        flight: String,
        timestamp: u64,
    },
    Tally {
        index: u8,
        airline: Address,
        flight: String,
        timestamp: u64,
        status: u8,
    },
    Policy {
        passenger: Address,
        airline: Address,
        flight: String,
        timestamp: u64,
    },
    TotalPremium {
        airline: Address,
        flight: String,
        timestamp: u64,
    },
    TotalCredited {
        airline: Address,
        flight: String,
        timestamp: u64,
    },
    WithdrawnBalance {
        passenger: Address,
    },
    VaultBalance,
    Health,
}

impl Query {
    pub fn from_named(name: &str, args: serde_json::Value) -> SuretyResult<Self> {
        decode_named(name, args)
    }
}

fn decode_named<T: serde::de::DeserializeOwned>(name: &str, args: serde_json::Value) -> SuretyResult<T> {
    let mut envelope = serde_json::Map::new();
    envelope.insert("op".to_string(), serde_json::Value::String(name.to_string()));
    if !args.is_null() {
        envelope.insert("args".to_string(), args);
    }
    serde_json::from_value(serde_json::Value::Object(envelope))
        .map_err(|e| SuretyError::InvalidArgument(format!("{}: {}", name, e)))
}

/// Marketplace counters for health checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub operational: bool,
    pub airlines: usize,
    pub funded_airlines: usize,
    pub flights: usize,
    pub oracles: usize,
    pub open_requests: usize,
    pub finalized_requests: usize,
    pub policies: usize,
    pub vault_balance: Amount,
    pub log_length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum QueryResult {
    Bool(bool),
    Registration(RegistrationInfo),
    Indexes([u8; INDEXES_PER_ORACLE]),
    Status(Option<FlightStatus>),
    Phase(Option<RequestPhase>),
    Count(usize),
    Policy(Option<InsurancePolicy>),
    Amount(Amount),
    Health(HealthReport),
}

impl QueryResult {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            QueryResult::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_amount(&self) -> Option<Amount> {
        match self {
            QueryResult::Amount(amount) => Some(*amount),
            _ => None,
        }
    }
}

/// What a successful operation did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum OperationOutcome {
    OperationalSet { changed: bool },
    AirlineFunded(FundingOutcome),
    AirlineRegistration(RegistrationOutcome),
    FlightRegistered { key: RequestKey },
    OracleRegistered { indexes: [u8; INDEXES_PER_ORACLE] },
    StatusRequested { index: u8 },
    Response {
        outcome: ResponseOutcome,
        /// Credits applied because this response finalized the status
        credited: CreditSummary,
    },
    InsurancePurchased { premium: Amount },
    PayoutWithdrawn { amount: Amount },
    FinalizedReplayed { events: usize, credited: CreditSummary },
}

/// Result of a committed submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    /// Position of the submission in the global total order
    pub sequence: u64,
    pub operation: &'static str,
    pub outcome: OperationOutcome,
    /// Events committed by this submission, with their log offsets
    pub events: Vec<LoggedEvent>,
}
