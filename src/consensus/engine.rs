//! Oracle consensus engine.
//!
//! Each status request moves through two phases, `Open` and `Finalized`.
//! A request is answered through tally buckets keyed by
//! `(dispatch index, status)`: every bucket is a set of oracle identities,
//! and the first bucket to hold `min_responses` identities fixes the
//! canonical status. Once finalized, a request never changes again;
//! further responses and re-requests are inert.
//!
//! The engine knows nothing about insurance. It only emits
//! `OracleRequest` and `StatusFinalized` events.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info, trace};
use serde::Serialize;

use crate::consensus::oracle_registry::OracleRegistry;
use crate::consensus::randomness::RandomnessSource;
use crate::errors::{SuretyError, SuretyResult};
use crate::governance::gate::OperationalGate;
use crate::ledger::events::{EventBuffer, SuretyEvent};
use crate::types::{Address, FlightStatus, RequestKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RequestPhase {
    Open,
    Finalized(FlightStatus),
}

/// Tally state of one request key
#[derive(Debug, Clone, Serialize)]
pub struct StatusRequest {
    pub key: RequestKey,
    pub phase: RequestPhase,
    /// Indexes drawn for this key; only their holders may answer
    pub dispatched: BTreeSet<u8>,
    /// index -> reported status -> reporting oracles
    pub tallies: BTreeMap<u8, BTreeMap<FlightStatus, BTreeSet<Address>>>,
    pub request_count: u64,
}

impl StatusRequest {
    fn open(key: RequestKey) -> Self {
        StatusRequest {
            key,
            phase: RequestPhase::Open,
            dispatched: BTreeSet::new(),
            tallies: BTreeMap::new(),
            request_count: 0,
        }
    }

    pub fn canonical_status(&self) -> Option<FlightStatus> {
        match self.phase {
            RequestPhase::Open => None,
            RequestPhase::Finalized(status) => Some(status),
        }
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self.phase, RequestPhase::Finalized(_))
    }

    pub fn bucket_size(&self, index: u8, status: FlightStatus) -> usize {
        self.tallies
            .get(&index)
            .and_then(|by_status| by_status.get(&status))
            .map_or(0, |reporters| reporters.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResponseOutcome {
    /// Counted toward its bucket
    Recorded { votes: usize },
    /// The oracle already reported this status for this index
    Duplicate { votes: usize },
    /// This response reached the quorum and fixed the canonical status
    Finalized { status: FlightStatus },
    /// The request was already finalized; nothing changed
    Inert { canonical: FlightStatus },
}

#[derive(Debug, Clone, Serialize)]
pub struct OracleConsensusEngine {
    requests: BTreeMap<RequestKey, StatusRequest>,
    index_range: u8,
    min_responses: usize,
}

impl OracleConsensusEngine {
    pub fn new(index_range: u8, min_responses: usize) -> Self {
        OracleConsensusEngine {
            requests: BTreeMap::new(),
            index_range,
            min_responses,
        }
    }

    pub fn request(&self, key: &RequestKey) -> Option<&StatusRequest> {
        self.requests.get(key)
    }

    pub fn canonical_status(&self, key: &RequestKey) -> Option<FlightStatus> {
        self.requests.get(key).and_then(|r| r.canonical_status())
    }

    /// `None` until the key has been requested at least once
    pub fn request_state(&self, key: &RequestKey) -> Option<RequestPhase> {
        self.requests.get(key).map(|r| r.phase)
    }

    pub fn tally(&self, index: u8, key: &RequestKey, status: FlightStatus) -> usize {
        self.requests
            .get(key)
            .map_or(0, |r| r.bucket_size(index, status))
    }

    pub fn open_count(&self) -> usize {
        self.requests.values().filter(|r| !r.is_finalized()).count()
    }

    pub fn finalized_count(&self) -> usize {
        self.requests.values().filter(|r| r.is_finalized()).count()
    }

    /// Draws a dispatch index and emits `OracleRequest`.
    ///
    /// Re-requesting a finalized key re-emits the event without touching the
    /// stored request.
    pub fn request_status(
        &mut self,
        gate: &OperationalGate,
        key: RequestKey,
        caller: Address,
        randomness: &mut dyn RandomnessSource,
        events: &mut EventBuffer,
    ) -> SuretyResult<u8> {
        gate.require_operational()?;
        if self.index_range == 0 {
            return Err(SuretyError::ConfigError("index range is empty".to_string()));
        }
        let index = randomness.next_below(self.index_range as u32) as u8;

        let request = self
            .requests
            .entry(key.clone())
            .or_insert_with(|| StatusRequest::open(key.clone()));
        if !request.is_finalized() {
            request.dispatched.insert(index);
            request.request_count += 1;
        }
        debug!("Status of {} requested by {} at index {}", key, caller, index);

        events.emit(SuretyEvent::OracleRequest {
            index,
            airline: key.airline,
            flight: key.flight,
            timestamp: key.timestamp,
        });
        Ok(index)
    }

    pub fn submit_response(
        &mut self,
        gate: &OperationalGate,
        registry: &OracleRegistry,
        index: u8,
        key: &RequestKey,
        status: FlightStatus,
        caller: Address,
        events: &mut EventBuffer,
    ) -> SuretyResult<ResponseOutcome> {
        gate.require_operational()?;
        if !registry.holds_index(&caller, index) {
            trace!("Oracle {} does not hold index {}", caller, index);
            return Err(SuretyError::InvalidIndex {
                index,
                oracle: caller,
            });
        }
        if status == FlightStatus::Unknown {
            return Err(SuretyError::InvalidArgument(
                "oracles cannot report an unknown status".to_string(),
            ));
        }

        let min_responses = self.min_responses;
        let request = self
            .requests
            .get_mut(key)
            .ok_or_else(|| SuretyError::NotFound(format!("status request {}", key)))?;

        if let RequestPhase::Finalized(canonical) = request.phase {
            trace!("Response from {} for finalized {} ignored", caller, key);
            return Ok(ResponseOutcome::Inert { canonical });
        }
        if !request.dispatched.contains(&index) {
            trace!("Index {} was not dispatched for {}", index, key);
            return Err(SuretyError::InvalidIndex {
                index,
                oracle: caller,
            });
        }

        let bucket = request
            .tallies
            .entry(index)
            .or_default()
            .entry(status)
            .or_default();
        if !bucket.insert(caller) {
            return Ok(ResponseOutcome::Duplicate {
                votes: bucket.len(),
            });
        }
        let votes = bucket.len();
        debug!(
            "Oracle {} reported {} for {} at index {} ({}/{})",
            caller, status, key, index, votes, min_responses
        );

        if votes < min_responses {
            return Ok(ResponseOutcome::Recorded { votes });
        }

        request.phase = RequestPhase::Finalized(status);
        info!("Status of {} finalized as {} with {} reports", key, status, votes);
        events.emit(SuretyEvent::StatusFinalized {
            airline: key.airline,
            flight: key.flight.clone(),
            timestamp: key.timestamp,
            status,
        });
        Ok(ResponseOutcome::Finalized { status })
    }
}
