//! Simulated off-chain oracle processes.

pub mod simulator;

pub use simulator::{oracle_identity, OracleSimulator, SimulatorHandle, StatusPolicy, WorkerReport};

#[cfg(test)]
mod tests;
