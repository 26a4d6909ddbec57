use std::collections::BTreeMap;

use log::info;
use serde::Serialize;

use crate::consensus::randomness::{sample_distinct, RandomnessSource};
use crate::consensus::INDEXES_PER_ORACLE;
use crate::errors::{SuretyError, SuretyResult};
use crate::governance::gate::OperationalGate;
use crate::types::{Address, Amount};

/// A registered reporter and its fixed index set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OracleRecord {
    pub identity: Address,
    pub indexes: [u8; INDEXES_PER_ORACLE],
    pub fee_paid: Amount,
}

impl OracleRecord {
    pub fn has_index(&self, index: u8) -> bool {
        self.indexes.contains(&index)
    }
}

/// Registered oracles. Index sets are assigned once and never change.
#[derive(Debug, Clone, Serialize)]
pub struct OracleRegistry {
    oracles: BTreeMap<Address, OracleRecord>,
    registration_fee: Amount,
    index_range: u8,
}

impl OracleRegistry {
    pub fn new(registration_fee: Amount, index_range: u8) -> Self {
        OracleRegistry {
            oracles: BTreeMap::new(),
            registration_fee,
            index_range,
        }
    }

    pub fn len(&self) -> usize {
        self.oracles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oracles.is_empty()
    }

    pub fn oracle(&self, identity: &Address) -> Option<&OracleRecord> {
        self.oracles.get(identity)
    }

    pub fn is_registered(&self, identity: &Address) -> bool {
        self.oracles.contains_key(identity)
    }

    pub fn register_oracle(
        &mut self,
        gate: &OperationalGate,
        identity: Address,
        fee: Amount,
        caller: Address,
        randomness: &mut dyn RandomnessSource,
    ) -> SuretyResult<[u8; INDEXES_PER_ORACLE]> {
        gate.require_operational()?;
        if caller != identity {
            return Err(SuretyError::Unauthorized(format!(
                "{} cannot register oracle {}",
                caller, identity
            )));
        }
        if fee < self.registration_fee {
            return Err(SuretyError::InsufficientFunds {
                required: self.registration_fee,
                available: fee,
            });
        }
        if self.oracles.contains_key(&identity) {
            return Err(SuretyError::AlreadyRegistered(format!("oracle {}", identity)));
        }
        if (self.index_range as usize) < INDEXES_PER_ORACLE {
            return Err(SuretyError::ConfigError(format!(
                "index range {} is smaller than {}",
                self.index_range, INDEXES_PER_ORACLE
            )));
        }

        let sample = sample_distinct(randomness, self.index_range, INDEXES_PER_ORACLE);
        let mut indexes = [0u8; INDEXES_PER_ORACLE];
        indexes.copy_from_slice(&sample);

        info!("Oracle {} registered with indexes {:?}", identity, indexes);
        self.oracles.insert(
            identity,
            OracleRecord {
                identity,
                indexes,
                fee_paid: fee,
            },
        );
        Ok(indexes)
    }

    pub fn get_my_indexes(&self, identity: &Address) -> SuretyResult<[u8; INDEXES_PER_ORACLE]> {
        self.oracles
            .get(identity)
            .map(|record| record.indexes)
            .ok_or_else(|| SuretyError::NotFound(format!("oracle {}", identity)))
    }

    /// Unregistered identities hold no index.
    pub fn holds_index(&self, identity: &Address, index: u8) -> bool {
        self.oracles
            .get(identity)
            .map_or(false, |record| record.has_index(index))
    }
}
