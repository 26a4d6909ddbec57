//! Off-chain oracle reporters.
//!
//! Each simulated oracle is an independent tokio task with its own
//! subscription to `OracleRequest` from genesis. Workers never coordinate:
//! for every request they see, they submit a report for each of their
//! indexes and let the consensus engine filter. An `InvalidIndex` rejection
//! is the normal outcome for untargeted oracles and is skipped quietly.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, trace, warn};
use rand_chacha::ChaCha20Rng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, Instant, MissedTickBehavior};

use crate::config::loader::SimulatorSettings;
use crate::consensus::randomness::{RandomnessSource, RngRandomness};
use crate::consensus::INDEXES_PER_ORACLE;
use crate::errors::{SuretyError, SuretyResult};
use crate::ledger::events::{EventKind, SuretyEvent};
use crate::ledger::interface::LedgerInterface;
use crate::ledger::log::Subscription;
use crate::ledger::operations::{Operation, OperationOutcome, Query, QueryResult};
use crate::types::{Address, Amount, FlightStatus, RequestKey};

/// Identity of the `n`-th simulated oracle
pub fn oracle_identity(n: u64) -> Address {
    Address::derived(0x0c, n)
}

/// What a simulated oracle reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Every report carries this status
    Fixed(FlightStatus),
    /// Uniform over the reportable statuses, drawn per request
    Random,
}

impl StatusPolicy {
    pub fn from_settings(settings: &SimulatorSettings) -> SuretyResult<Self> {
        match settings.fixed_status {
            None => Ok(StatusPolicy::Random),
            Some(code) => {
                let status = FlightStatus::try_from(code)?;
                if status == FlightStatus::Unknown {
                    return Err(SuretyError::ConfigError(
                        "simulated oracles cannot report an unknown status".to_string(),
                    ));
                }
                Ok(StatusPolicy::Fixed(status))
            }
        }
    }

    fn pick(&self, randomness: &mut dyn RandomnessSource) -> FlightStatus {
        match self {
            StatusPolicy::Fixed(status) => *status,
            StatusPolicy::Random => {
                let reportable = &FlightStatus::REPORTABLE;
                reportable[randomness.next_below(reportable.len() as u32) as usize]
            }
        }
    }
}

/// Per-worker counters returned at shutdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub oracle: Address,
    pub requests_seen: usize,
    /// Reports the ledger accepted, including inert ones
    pub submitted: usize,
    /// `InvalidIndex` rejections
    pub skipped: usize,
    pub failed: usize,
}

impl WorkerReport {
    fn new(oracle: Address) -> Self {
        WorkerReport {
            oracle,
            requests_seen: 0,
            submitted: 0,
            skipped: 0,
            failed: 0,
        }
    }
}

/// A registered set of simulated oracles ready to be spawned.
pub struct OracleSimulator<L> {
    ledger: Arc<L>,
    oracles: Vec<(Address, [u8; INDEXES_PER_ORACLE])>,
    policy: StatusPolicy,
    seed: u64,
    poll_interval: Duration,
}

impl<L: LedgerInterface + 'static> OracleSimulator<L> {
    /// Registers `settings.oracle_count` identities, each paying `fee`.
    pub fn register(ledger: Arc<L>, settings: &SimulatorSettings, fee: Amount) -> SuretyResult<Self> {
        let policy = StatusPolicy::from_settings(settings)?;
        let mut oracles = Vec::with_capacity(settings.oracle_count);
        for n in 0..settings.oracle_count as u64 {
            let identity = oracle_identity(n);
            let receipt = ledger.submit(Operation::RegisterOracle, identity, fee)?;
            if let OperationOutcome::OracleRegistered { indexes } = receipt.outcome {
                oracles.push((identity, indexes));
            }
        }
        info!(
            "Registered {} simulated oracles ({:?} reports)",
            oracles.len(),
            policy
        );
        Ok(OracleSimulator {
            ledger,
            oracles,
            policy,
            seed: settings.seed,
            poll_interval: Duration::from_millis(settings.poll_interval_ms.max(1)),
        })
    }

    pub fn oracles(&self) -> &[(Address, [u8; INDEXES_PER_ORACLE])] {
        &self.oracles
    }

    pub fn policy(&self) -> StatusPolicy {
        self.policy
    }

    /// Starts one task per oracle. Requires a running tokio runtime.
    pub fn spawn(&self) -> SimulatorHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let workers = self
            .oracles
            .iter()
            .enumerate()
            .map(|(n, (identity, indexes))| {
                let worker = OracleWorker {
                    ledger: Arc::clone(&self.ledger),
                    identity: *identity,
                    indexes: *indexes,
                    policy: self.policy,
                    randomness: RngRandomness::seeded(self.seed.wrapping_add(n as u64)),
                    subscription: Subscription::from_genesis(EventKind::OracleRequest),
                    report: WorkerReport::new(*identity),
                };
                tokio::spawn(worker.run(self.poll_interval, shutdown_rx.clone()))
            })
            .collect();
        SimulatorHandle {
            shutdown: shutdown_tx,
            workers,
        }
    }

    /// Polls the ledger until `key` has a canonical status or `timeout`
    /// elapses.
    pub async fn await_finalized(
        &self,
        key: &RequestKey,
        timeout: Duration,
    ) -> SuretyResult<Option<FlightStatus>> {
        let query = Query::CanonicalStatus {
            airline: key.airline,
            flight: key.flight.clone(),
            timestamp: key.timestamp,
        };
        let deadline = Instant::now() + timeout;
        loop {
            if let QueryResult::Status(Some(status)) = self.ledger.call(&query)? {
                return Ok(Some(status));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            sleep(self.poll_interval).await;
        }
    }
}

/// Running workers
pub struct SimulatorHandle {
    shutdown: watch::Sender<bool>,
    workers: Vec<JoinHandle<WorkerReport>>,
}

impl SimulatorHandle {
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Signals every worker to stop and collects their reports.
    pub async fn shutdown(self) -> Vec<WorkerReport> {
        // receivers only disappear once workers have exited
        let _ = self.shutdown.send(true);
        let mut reports = Vec::with_capacity(self.workers.len());
        for worker in self.workers {
            match worker.await {
                Ok(report) => reports.push(report),
                Err(err) => warn!("Oracle worker did not finish cleanly: {}", err),
            }
        }
        reports
    }
}

struct OracleWorker<L> {
    ledger: Arc<L>,
    identity: Address,
    indexes: [u8; INDEXES_PER_ORACLE],
    policy: StatusPolicy,
    randomness: RngRandomness<ChaCha20Rng>,
    subscription: Subscription,
    report: WorkerReport,
}

impl<L: LedgerInterface> OracleWorker<L> {
    async fn run(mut self, poll_interval: Duration, mut shutdown: watch::Receiver<bool>) -> WorkerReport {
        let mut ticker = interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        debug!("Oracle {} listening with indexes {:?}", self.identity, self.indexes);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => self.poll_once(),
            }
        }
        debug!("Oracle {} stopping: {:?}", self.identity, self.report);
        self.report
    }

    fn poll_once(&mut self) {
        let events = match self.subscription.poll(self.ledger.as_ref()) {
            Ok(events) => events,
            Err(err) => {
                warn!("Oracle {} could not read requests: {}", self.identity, err);
                return;
            }
        };
        for logged in events {
            if let SuretyEvent::OracleRequest {
                airline,
                flight,
                timestamp,
                ..
            } = logged.event
            {
                self.answer(RequestKey::new(airline, flight, timestamp));
            }
        }
    }

    fn answer(&mut self, key: RequestKey) {
        self.report.requests_seen += 1;
        let status = self.policy.pick(&mut self.randomness);
        for index in self.indexes {
            let operation = Operation::SubmitResponse {
                index,
                airline: key.airline,
                flight: key.flight.clone(),
                timestamp: key.timestamp,
                status: status.code(),
            };
            match self.ledger.submit(operation, self.identity, 0) {
                Ok(_) => {
                    trace!("Oracle {} reported {} for {} at {}", self.identity, status, key, index);
                    self.report.submitted += 1;
                }
                Err(err) if err.is_routine_skip() => {
                    self.report.skipped += 1;
                }
                Err(err) => {
                    warn!("Oracle {} report for {} failed: {}", self.identity, key, err);
                    self.report.failed += 1;
                }
            }
        }
    }
}
