use log::info;
use serde::Serialize;

use crate::errors::{SuretyError, SuretyResult};
use crate::types::Address;

/// Process-wide operational switch guarding every mutating operation.
#[derive(Debug, Clone, Serialize)]
pub struct OperationalGate {
    owner: Address,
    operational: bool,
}

impl OperationalGate {
    /// New gates start operational.
    pub fn new(owner: Address) -> Self {
        OperationalGate {
            owner,
            operational: true,
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn is_operational(&self) -> bool {
        self.operational
    }

    /// Returns whether the flag actually changed.
    pub fn set_operational(&mut self, flag: bool, caller: Address) -> SuretyResult<bool> {
        if caller != self.owner {
            return Err(SuretyError::Unauthorized(format!(
                "{} is not the contract owner",
                caller
            )));
        }
        let changed = self.operational != flag;
        if changed {
            info!("Operational status set to {} by {}", flag, caller);
        }
        self.operational = flag;
        Ok(changed)
    }

    /// Entry guard for mutating operations.
    pub fn require_operational(&self) -> SuretyResult<()> {
        if self.operational {
            Ok(())
        } else {
            Err(SuretyError::NotOperational)
        }
    }
}
