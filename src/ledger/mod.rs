//! Ledger substrate: event log, wire types, the marketplace state store and
//! the in-process `LocalLedger`.

pub mod events;
pub mod interface;
pub mod local;
pub mod log;
pub mod marketplace;
pub mod operations;

pub use events::{EventBuffer, EventKind, LoggedEvent, SuretyEvent};
pub use interface::LedgerInterface;
pub use local::LocalLedger;
pub use self::log::{EventLog, Subscription};
pub use marketplace::{CallContext, Marketplace};
pub use operations::{HealthReport, Operation, OperationOutcome, Query, QueryResult, Receipt};

#[cfg(test)]
mod tests;
