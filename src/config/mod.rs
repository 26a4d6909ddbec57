// Configuration module for FlightSurety
// Marketplace parameters, presets, file loading and validation

pub mod amount_serde;
pub mod loader;
pub mod presets;
pub mod validation;

pub use loader::{NodeConfig, SimulatorSettings, ENV_PREFIX};
pub use presets::{MarketplaceParams, ParamsProfile, PayoutMultiplier};
pub use validation::{ConfigValidationError, ConfigValidator, ValidationResult, ValidationRule};
