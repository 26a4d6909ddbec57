use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::config::loader::NodeConfig;
use crate::config::presets::MarketplaceParams;
use crate::consensus::randomness::{RandomnessSource, RngRandomness};
use crate::errors::SuretyResult;
use crate::ledger::events::{EventBuffer, EventKind, LoggedEvent};
use crate::ledger::interface::LedgerInterface;
use crate::ledger::log::EventLog;
use crate::ledger::marketplace::{CallContext, Marketplace};
use crate::ledger::operations::{HealthReport, Operation, Query, QueryResult, Receipt};
use crate::types::{Address, Amount};
use crate::utils::time::current_time;

struct LedgerState {
    marketplace: Marketplace,
    log: EventLog,
    sequence: u64,
    randomness: Box<dyn RandomnessSource>,
}

/// In-process ledger substrate.
///
/// One mutex orders every submission. Each submission runs against a
/// staged copy of the marketplace; the copy and its events replace the
/// committed state only when the operation succeeds.
pub struct LocalLedger {
    state: Mutex<LedgerState>,
}

impl LocalLedger {
    pub fn new(
        owner: Address,
        first_airline: Address,
        params: &MarketplaceParams,
        randomness: Box<dyn RandomnessSource>,
    ) -> Self {
        info!(
            "Starting local ledger ({} profile) owned by {}, first airline {}",
            params.profile, owner, first_airline
        );
        LocalLedger {
            state: Mutex::new(LedgerState {
                marketplace: Marketplace::new(owner, first_airline, params),
                log: EventLog::new(),
                sequence: 0,
                randomness,
            }),
        }
    }

    /// Ledger with a deterministic randomness stream
    pub fn seeded(owner: Address, first_airline: Address, params: &MarketplaceParams, seed: u64) -> Self {
        LocalLedger::new(
            owner,
            first_airline,
            params,
            Box::new(RngRandomness::seeded(seed)),
        )
    }

    pub fn from_config(config: &NodeConfig, owner: Address, first_airline: Address) -> Self {
        LocalLedger::seeded(owner, first_airline, &config.params, config.simulator.seed)
    }

    /// Copy of the committed state
    pub fn snapshot(&self) -> Marketplace {
        self.state.lock().marketplace.clone()
    }

    pub fn state_root(&self) -> SuretyResult<String> {
        self.state.lock().marketplace.state_root()
    }

    pub fn log_len(&self) -> usize {
        self.state.lock().log.len()
    }

    pub fn health(&self) -> HealthReport {
        let state = self.state.lock();
        state.marketplace.health(state.log.len())
    }

    pub fn replay_finalized(&self, caller: Address, from_offset: u64) -> SuretyResult<Receipt> {
        self.submit(Operation::ReplayFinalized { from_offset }, caller, 0)
    }
}

impl LedgerInterface for LocalLedger {
    fn submit(&self, operation: Operation, caller: Address, value: Amount) -> SuretyResult<Receipt> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let name = operation.name();

        // Full copy per submission: cost grows with total state.
        // TODO: journal undo entries per component instead of cloning.
        let mut staged = state.marketplace.clone();
        let mut events = EventBuffer::new();
        let ctx = CallContext {
            caller,
            value,
            now: current_time(),
            randomness: state.randomness.as_mut(),
            history: &state.log,
        };
        let outcome = match staged.apply(operation, ctx, &mut events) {
            Ok(outcome) => outcome,
            Err(err) => {
                if err.is_routine_skip() {
                    debug!("{} from {} skipped: {}", name, caller, err);
                } else {
                    warn!("{} from {} rejected: {}", name, caller, err);
                }
                return Err(err);
            }
        };

        state.marketplace = staged;
        let committed = state.log.append(events.into_events());
        let sequence = state.sequence;
        state.sequence += 1;
        debug!(
            "Committed {} #{} from {} with {} events",
            name,
            sequence,
            caller,
            committed.len()
        );
        Ok(Receipt {
            sequence,
            operation: name,
            outcome,
            events: committed,
        })
    }

    fn call(&self, query: &Query) -> SuretyResult<QueryResult> {
        let state = self.state.lock();
        state.marketplace.query(query, state.log.len())
    }

    fn subscribe(&self, kind: Option<EventKind>, from_offset: u64) -> SuretyResult<Vec<LoggedEvent>> {
        Ok(self.state.lock().log.read_from(from_offset, kind))
    }
}
