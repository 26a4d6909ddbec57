//! Escrowed flight insurance gated by the canonical flight status.

pub mod ledger;
pub mod vault;

pub use ledger::{CreditSummary, InsuranceLedger, InsurancePolicy};
pub use vault::Vault;
