//! The strongly-typed state store behind the ledger interface.
//!
//! `Marketplace` composes every component and routes operations to them.
//! It also carries the one cross-component wiring: a `StatusFinalized`
//! emitted by the consensus engine closes the flight and credits policies
//! inside the same operation.

use log::debug;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::presets::MarketplaceParams;
use crate::consensus::engine::{OracleConsensusEngine, ResponseOutcome};
use crate::consensus::oracle_registry::OracleRegistry;
use crate::consensus::randomness::RandomnessSource;
use crate::errors::{SuretyError, SuretyResult};
use crate::governance::airline::{AirlineGovernance, RegistrationOutcome};
use crate::governance::flights::FlightRegistry;
use crate::governance::gate::OperationalGate;
use crate::insurance::ledger::{CreditSummary, InsuranceLedger};
use crate::ledger::events::{EventBuffer, EventKind, SuretyEvent};
use crate::ledger::log::EventLog;
use crate::ledger::operations::{HealthReport, Operation, OperationOutcome, Query, QueryResult};
use crate::types::{Address, Amount, FlightStatus, RequestKey};

/// Inputs of one submission besides the operation itself
pub struct CallContext<'a> {
    pub caller: Address,
    pub value: Amount,
    /// Seconds since the Unix epoch
    pub now: u64,
    pub randomness: &'a mut dyn RandomnessSource,
    /// Committed history, read by `ReplayFinalized`
    pub history: &'a EventLog,
}

#[derive(Debug, Clone, Serialize)]
pub struct Marketplace {
    gate: OperationalGate,
    governance: AirlineGovernance,
    flights: FlightRegistry,
    oracles: OracleRegistry,
    consensus: OracleConsensusEngine,
    insurance: InsuranceLedger,
}

impl Marketplace {
    pub fn new(owner: Address, first_airline: Address, params: &MarketplaceParams) -> Self {
        Marketplace {
            gate: OperationalGate::new(owner),
            governance: AirlineGovernance::new(
                first_airline,
                params.bootstrap_threshold,
                params.funding_threshold,
            ),
            flights: FlightRegistry::new(),
            oracles: OracleRegistry::new(params.registration_fee, params.index_range),
            consensus: OracleConsensusEngine::new(params.index_range, params.min_responses),
            insurance: InsuranceLedger::new(params.purchase_cap, params.payout_multiplier),
        }
    }

    pub fn gate(&self) -> &OperationalGate {
        &self.gate
    }

    pub fn governance(&self) -> &AirlineGovernance {
        &self.governance
    }

    pub fn flights(&self) -> &FlightRegistry {
        &self.flights
    }

    pub fn oracles(&self) -> &OracleRegistry {
        &self.oracles
    }

    pub fn consensus(&self) -> &OracleConsensusEngine {
        &self.consensus
    }

    pub fn insurance(&self) -> &InsuranceLedger {
        &self.insurance
    }

    /// Runs one operation against this state.
    ///
    /// On error the state may be partially modified; callers apply
    /// operations to a staged copy and discard it on failure.
    pub fn apply(
        &mut self,
        operation: Operation,
        ctx: CallContext<'_>,
        events: &mut EventBuffer,
    ) -> SuretyResult<OperationOutcome> {
        if !matches!(operation, Operation::SetOperational { .. }) {
            self.gate.require_operational()?;
        }
        if ctx.value > 0 && !operation.is_payable() {
            return Err(SuretyError::InvalidArgument(format!(
                "{} does not accept value",
                operation.name()
            )));
        }
        let caller = ctx.caller;

        match operation {
            Operation::SetOperational { operational } => {
                let changed = self.gate.set_operational(operational, caller)?;
                if changed {
                    events.emit(SuretyEvent::OperationalChanged { operational });
                }
                Ok(OperationOutcome::OperationalSet { changed })
            }
            Operation::FundAirline { airline } => {
                let outcome = self
                    .governance
                    .fund_airline(&self.gate, airline, ctx.value, caller)?;
                self.insurance.vault_mut().deposit(airline, ctx.value)?;
                events.emit(SuretyEvent::AirlineFunded {
                    airline,
                    amount: ctx.value,
                });
                Ok(OperationOutcome::AirlineFunded(outcome))
            }
            Operation::RegisterAirline { candidate } => {
                let outcome = self
                    .governance
                    .register_airline(&self.gate, candidate, caller)?;
                match outcome {
                    RegistrationOutcome::Registered => {
                        events.emit(SuretyEvent::AirlineRegistered {
                            airline: candidate,
                            votes: 0,
                        });
                    }
                    RegistrationOutcome::VoteRecorded { votes, .. } => {
                        events.emit(SuretyEvent::AirlineVoted {
                            candidate,
                            voter: caller,
                            votes,
                        });
                    }
                    RegistrationOutcome::Admitted { votes } => {
                        events.emit(SuretyEvent::AirlineVoted {
                            candidate,
                            voter: caller,
                            votes,
                        });
                        events.emit(SuretyEvent::AirlineRegistered {
                            airline: candidate,
                            votes,
                        });
                    }
                    RegistrationOutcome::DuplicateVote { .. } => {}
                }
                Ok(OperationOutcome::AirlineRegistration(outcome))
            }
            Operation::RegisterFlight { flight, timestamp } => {
                let finalized = self
                    .consensus
                    .canonical_status(&RequestKey::new(caller, flight.clone(), timestamp));
                let key = self.flights.register_flight(
                    &self.gate,
                    &self.governance,
                    &flight,
                    timestamp,
                    caller,
                    ctx.now,
                    finalized,
                )?;
                events.emit(SuretyEvent::FlightRegistered {
                    airline: key.airline,
                    flight: key.flight.clone(),
                    timestamp: key.timestamp,
                });
                Ok(OperationOutcome::FlightRegistered { key })
            }
            Operation::RegisterOracle => {
                let indexes = self.oracles.register_oracle(
                    &self.gate,
                    caller,
                    ctx.value,
                    caller,
                    ctx.randomness,
                )?;
                self.insurance.vault_mut().deposit(caller, ctx.value)?;
                events.emit(SuretyEvent::OracleRegistered {
                    oracle: caller,
                    indexes,
                });
                Ok(OperationOutcome::OracleRegistered { indexes })
            }
            Operation::RequestStatus {
                airline,
                flight,
                timestamp,
            } => {
                let key = RequestKey::new(airline, flight, timestamp);
                let index =
                    self.consensus
                        .request_status(&self.gate, key, caller, ctx.randomness, events)?;
                Ok(OperationOutcome::StatusRequested { index })
            }
            Operation::SubmitResponse {
                index,
                airline,
                flight,
                timestamp,
                status,
            } => {
                let key = RequestKey::new(airline, flight, timestamp);
                let status = FlightStatus::try_from(status)?;
                let outcome = self.consensus.submit_response(
                    &self.gate,
                    &self.oracles,
                    index,
                    &key,
                    status,
                    caller,
                    events,
                )?;
                let credited = match outcome {
                    ResponseOutcome::Finalized { status } => self.settle(&key, status, events)?,
                    _ => CreditSummary::default(),
                };
                Ok(OperationOutcome::Response { outcome, credited })
            }
            Operation::PurchaseInsurance {
                airline,
                flight,
                timestamp,
            } => {
                let key = RequestKey::new(airline, flight, timestamp);
                if self.consensus.canonical_status(&key).is_some() {
                    return Err(SuretyError::FlightClosed(key.to_string()));
                }
                let premium = self.insurance.purchase_insurance(
                    &self.gate,
                    &self.flights,
                    &key,
                    ctx.value,
                    caller,
                    caller,
                    events,
                )?;
                Ok(OperationOutcome::InsurancePurchased { premium })
            }
            Operation::WithdrawPayout {
                airline,
                flight,
                timestamp,
            } => {
                let key = RequestKey::new(airline, flight, timestamp);
                let amount = self
                    .insurance
                    .withdraw_payout(&self.gate, caller, &key, caller, events)?;
                Ok(OperationOutcome::PayoutWithdrawn { amount })
            }
            Operation::ReplayFinalized { from_offset } => {
                self.replay_finalized(ctx.history, from_offset, events)
            }
        }
    }

    /// Consumer side of `StatusFinalized`: close the flight for sale and
    /// credit matching policies.
    fn settle(
        &mut self,
        key: &RequestKey,
        status: FlightStatus,
        events: &mut EventBuffer,
    ) -> SuretyResult<CreditSummary> {
        self.flights.close(key, status);
        self.insurance.on_status_finalized(&self.gate, key, status, events)
    }

    fn replay_finalized(
        &mut self,
        history: &EventLog,
        from_offset: u64,
        events: &mut EventBuffer,
    ) -> SuretyResult<OperationOutcome> {
        self.gate.require_operational()?;
        let mut replayed = 0;
        let mut credited = CreditSummary::default();
        for logged in history.read_from(from_offset, Some(EventKind::StatusFinalized)) {
            if let SuretyEvent::StatusFinalized {
                airline,
                flight,
                timestamp,
                status,
            } = logged.event
            {
                let key = RequestKey::new(airline, flight, timestamp);
                let summary = self.settle(&key, status, events)?;
                credited.policies += summary.policies;
                credited.total = credited
                    .total
                    .checked_add(summary.total)
                    .ok_or(SuretyError::Overflow("replay credits"))?;
                replayed += 1;
            }
        }
        debug!(
            "Replayed {} finalized statuses from offset {}, {} policies credited",
            replayed, from_offset, credited.policies
        );
        Ok(OperationOutcome::FinalizedReplayed {
            events: replayed,
            credited,
        })
    }

    pub fn query(&self, query: &Query, log_length: usize) -> SuretyResult<QueryResult> {
        let result = match query {
            Query::IsOperational => QueryResult::Bool(self.gate.is_operational()),
            Query::IsAirline { airline } => QueryResult::Bool(self.governance.is_airline(airline)),
            Query::IsFunded { airline } => QueryResult::Bool(self.governance.is_funded(airline)),
            Query::RegistrationInfo { airline } => {
                QueryResult::Registration(self.governance.registration_info(airline))
            }
            Query::IsFlightOpen {
                airline,
                flight,
                timestamp,
            } => {
                let key = RequestKey::new(*airline, flight.clone(), *timestamp);
                QueryResult::Bool(self.flights.require_open(&key).is_ok())
            }
            Query::MyIndexes { oracle } => QueryResult::Indexes(self.oracles.get_my_indexes(oracle)?),
            Query::CanonicalStatus {
                airline,
                flight,
                timestamp,
            } => {
                let key = RequestKey::new(*airline, flight.clone(), *timestamp);
                QueryResult::Status(self.consensus.canonical_status(&key))
            }
            Query::RequestState {
                airline,
                flight,
                timestamp,
            } => {
                let key = RequestKey::new(*airline, flight.clone(), *timestamp);
                QueryResult::Phase(self.consensus.request_state(&key))
            }
            Query::Tally {
                index,
                airline,
                flight,
                timestamp,
                status,
            } => {
                let key = RequestKey::new(*airline, flight.clone(), *timestamp);
                let status = FlightStatus::try_from(*status)?;
                QueryResult::Count(self.consensus.tally(*index, &key, status))
            }
            Query::Policy {
                passenger,
                airline,
                flight,
                timestamp,
            } => {
                let key = RequestKey::new(*airline, flight.clone(), *timestamp);
                QueryResult::Policy(self.insurance.policy(passenger, &key).cloned())
            }
            Query::TotalPremium {
                airline,
                flight,
                timestamp,
            } => {
                let key = RequestKey::new(*airline, flight.clone(), *timestamp);
                QueryResult::Amount(self.insurance.total_premium(&key)?)
            }
            Query::TotalCredited {
                airline,
                flight,
                timestamp,
            } => {
                let key = RequestKey::new(*airline, flight.clone(), *timestamp);
                QueryResult::Amount(self.insurance.total_credited(&key)?)
            }
            Query::WithdrawnBalance { passenger } => {
                QueryResult::Amount(self.insurance.vault().paid_to(passenger))
            }
            Query::VaultBalance => QueryResult::Amount(self.insurance.vault().balance()),
            Query::Health => QueryResult::Health(self.health(log_length)),
        };
        Ok(result)
    }

    pub fn health(&self, log_length: usize) -> HealthReport {
        HealthReport {
            operational: self.gate.is_operational(),
            airlines: self.governance.registered_count(),
            funded_airlines: self.governance.funded_count(),
            flights: self.flights.len(),
            oracles: self.oracles.len(),
            open_requests: self.consensus.open_count(),
            finalized_requests: self.consensus.finalized_count(),
            policies: self.insurance.policy_count(),
            vault_balance: self.insurance.vault().balance(),
            log_length,
        }
    }

    /// SHA-256 over the canonical JSON encoding of all stored state, hex encoded.
    ///
    /// Every map in the state is ordered, so equal states always hash equal.
    pub fn state_root(&self) -> SuretyResult<String> {
        let encoded = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&encoded)))
    }
}
