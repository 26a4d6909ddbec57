use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info};
use serde::Serialize;

use crate::errors::{SuretyError, SuretyResult};
use crate::governance::gate::OperationalGate;
use crate::types::{Address, Amount};

/// Admission state of an airline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AirlineStatus {
    /// Proposed, collecting votes
    Applied,
    /// Admitted, not yet funded
    Registered,
    /// Admitted and funded; may propose airlines and register flights
    Funded,
}

impl AirlineStatus {
    pub fn is_registered(self) -> bool {
        matches!(self, AirlineStatus::Registered | AirlineStatus::Funded)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Airline {
    pub address: Address,
    pub status: AirlineStatus,
    /// Distinct proposers that voted for admission
    pub votes: BTreeSet<Address>,
    /// Total deposited through funding calls
    pub funded_amount: Amount,
}

impl Airline {
    fn applied(address: Address) -> Self {
        Airline {
            address,
            status: AirlineStatus::Applied,
            votes: BTreeSet::new(),
            funded_amount: 0,
        }
    }
}

/// Vote progress of a candidate, as exposed to observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RegistrationInfo {
    pub total_votes: usize,
    pub success: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RegistrationOutcome {
    /// Admitted without a vote while below the bootstrap threshold
    Registered,
    /// Vote counted, quorum not yet reached
    VoteRecorded { votes: usize, required: usize },
    /// The proposer had already voted; nothing changed
    DuplicateVote { votes: usize },
    /// This vote reached the quorum and admitted the candidate
    Admitted { votes: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FundingOutcome {
    /// True when this call moved the airline to `Funded`
    pub newly_funded: bool,
    pub total_deposit: Amount,
}

/// Admission and funding of airlines.
///
/// Below `bootstrap_threshold` registered airlines a funded airline admits a
/// candidate directly; from then on admission needs votes from at least half
/// of the registered airlines.
#[derive(Debug, Clone, Serialize)]
pub struct AirlineGovernance {
    airlines: BTreeMap<Address, Airline>,
    registered_count: usize,
    bootstrap_threshold: usize,
    funding_threshold: Amount,
}

impl AirlineGovernance {
    /// `first_airline` starts registered, as the deployment-time airline.
    pub fn new(first_airline: Address, bootstrap_threshold: usize, funding_threshold: Amount) -> Self {
        let mut airlines = BTreeMap::new();
        airlines.insert(
            first_airline,
            Airline {
                status: AirlineStatus::Registered,
                ..Airline::applied(first_airline)
            },
        );
        AirlineGovernance {
            airlines,
            registered_count: 1,
            bootstrap_threshold,
            funding_threshold,
        }
    }

    pub fn registered_count(&self) -> usize {
        self.registered_count
    }

    pub fn funded_count(&self) -> usize {
        self.airlines
            .values()
            .filter(|a| a.status == AirlineStatus::Funded)
            .count()
    }

    pub fn airline(&self, address: &Address) -> Option<&Airline> {
        self.airlines.get(address)
    }

    pub fn is_airline(&self, address: &Address) -> bool {
        self.airlines
            .get(address)
            .map_or(false, |a| a.status.is_registered())
    }

    pub fn is_funded(&self, address: &Address) -> bool {
        self.airlines
            .get(address)
            .map_or(false, |a| a.status == AirlineStatus::Funded)
    }

    pub fn registration_info(&self, address: &Address) -> RegistrationInfo {
        self.airlines
            .get(address)
            .map(|a| RegistrationInfo {
                total_votes: a.votes.len(),
                success: a.status.is_registered(),
            })
            .unwrap_or_default()
    }

    /// Votes needed to admit a candidate at the current registered count.
    pub fn required_votes(&self) -> usize {
        (self.registered_count + 1) / 2
    }

    pub fn fund_airline(
        &mut self,
        gate: &OperationalGate,
        airline: Address,
        amount: Amount,
        caller: Address,
    ) -> SuretyResult<FundingOutcome> {
        gate.require_operational()?;
        if caller != airline {
            return Err(SuretyError::Unauthorized(format!(
                "{} cannot fund airline {}",
                caller, airline
            )));
        }
        if amount < self.funding_threshold {
            return Err(SuretyError::InsufficientFunds {
                required: self.funding_threshold,
                available: amount,
            });
        }
        let record = self
            .airlines
            .get_mut(&airline)
            .ok_or_else(|| SuretyError::NotFound(format!("airline {}", airline)))?;
        if !record.status.is_registered() {
            return Err(SuretyError::Unauthorized(format!(
                "airline {} is not registered",
                airline
            )));
        }
        let total_deposit = record
            .funded_amount
            .checked_add(amount)
            .ok_or(SuretyError::Overflow("airline funding"))?;

        let newly_funded = record.status != AirlineStatus::Funded;
        record.status = AirlineStatus::Funded;
        record.funded_amount = total_deposit;

        if newly_funded {
            info!("Airline {} funded with {}", airline, amount);
        } else {
            debug!("Airline {} topped up by {} (total {})", airline, amount, total_deposit);
        }
        Ok(FundingOutcome {
            newly_funded,
            total_deposit,
        })
    }

    pub fn register_airline(
        &mut self,
        gate: &OperationalGate,
        candidate: Address,
        proposer: Address,
    ) -> SuretyResult<RegistrationOutcome> {
        gate.require_operational()?;
        if !self.is_funded(&proposer) {
            return Err(SuretyError::Unauthorized(format!(
                "proposer {} is not a funded airline",
                proposer
            )));
        }
        if self.is_airline(&candidate) {
            return Err(SuretyError::AlreadyRegistered(format!("airline {}", candidate)));
        }

        if self.registered_count < self.bootstrap_threshold {
            let record = self
                .airlines
                .entry(candidate)
                .or_insert_with(|| Airline::applied(candidate));
            record.status = AirlineStatus::Registered;
            self.registered_count += 1;
            info!(
                "Airline {} registered by {} ({} registered)",
                candidate, proposer, self.registered_count
            );
            return Ok(RegistrationOutcome::Registered);
        }

        let required = self.required_votes();
        let record = self
            .airlines
            .entry(candidate)
            .or_insert_with(|| Airline::applied(candidate));
        if !record.votes.insert(proposer) {
            debug!("Duplicate vote from {} for {} ignored", proposer, candidate);
            return Ok(RegistrationOutcome::DuplicateVote {
                votes: record.votes.len(),
            });
        }

        let votes = record.votes.len();
        if 2 * votes >= self.registered_count {
            record.status = AirlineStatus::Registered;
            self.registered_count += 1;
            info!(
                "Airline {} admitted with {} votes ({} registered)",
                candidate, votes, self.registered_count
            );
            Ok(RegistrationOutcome::Admitted { votes })
        } else {
            debug!("Vote {}/{} recorded for {}", votes, required, candidate);
            Ok(RegistrationOutcome::VoteRecorded { votes, required })
        }
    }
}
