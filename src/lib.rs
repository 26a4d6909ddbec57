pub mod config;
pub mod consensus;
pub mod errors;
pub mod governance;
pub mod insurance;
pub mod ledger;
pub mod oracles;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::{MarketplaceParams, NodeConfig, ParamsProfile};
pub use consensus::{OracleConsensusEngine, OracleRegistry, RandomnessSource, RngRandomness};
pub use errors::{SuretyError, SuretyResult};
pub use governance::{AirlineGovernance, FlightRegistry, OperationalGate};
pub use insurance::InsuranceLedger;
pub use ledger::{LedgerInterface, LocalLedger, Marketplace, Operation, Query, QueryResult, Receipt};
pub use oracles::{OracleSimulator, StatusPolicy};
pub use types::{Address, Amount, FlightStatus, RequestKey, ETHER};
