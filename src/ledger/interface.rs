use crate::errors::SuretyResult;
use crate::ledger::events::{EventKind, LoggedEvent};
use crate::ledger::operations::{Operation, Query, QueryResult, Receipt};
use crate::types::{Address, Amount};

/// The execution substrate the marketplace runs on.
///
/// Implementations provide a single total order over submissions, execute
/// each one all-or-nothing, and keep a replayable event log.
pub trait LedgerInterface: Send + Sync {
    /// Execute a mutating operation atomically.
    fn submit(&self, operation: Operation, caller: Address, value: Amount) -> SuretyResult<Receipt>;

    /// Pure read.
    fn call(&self, query: &Query) -> SuretyResult<QueryResult>;

    /// Committed events from `from_offset` on, in log order.
    fn subscribe(&self, kind: Option<EventKind>, from_offset: u64) -> SuretyResult<Vec<LoggedEvent>>;

    /// `submit` addressed by operation name with JSON arguments.
    fn submit_named(
        &self,
        name: &str,
        args: serde_json::Value,
        caller: Address,
        value: Amount,
    ) -> SuretyResult<Receipt> {
        let operation = Operation::from_named(name, args)?;
        self.submit(operation, caller, value)
    }

    fn call_named(&self, name: &str, args: serde_json::Value) -> SuretyResult<QueryResult> {
        let query = Query::from_named(name, args)?;
        self.call(&query)
    }
}
