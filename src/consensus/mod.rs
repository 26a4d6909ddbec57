pub mod engine;
pub mod oracle_registry;
pub mod randomness;

/// Every oracle holds exactly this many distinct indexes.
pub const INDEXES_PER_ORACLE: usize = 3;

pub use engine::{OracleConsensusEngine, RequestPhase, ResponseOutcome, StatusRequest};
pub use oracle_registry::{OracleRecord, OracleRegistry};
pub use randomness::{sample_distinct, RandomnessSource, RngRandomness};

#[cfg(test)]
mod tests;
