use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::presets::{MarketplaceParams, ParamsProfile};
use crate::config::validation::ConfigValidator;
use crate::errors::{SuretyError, SuretyResult};

/// Prefix of environment variables that override file settings, e.g.
/// `FLIGHTSURETY__PARAMS__MIN_RESPONSES=5`.
pub const ENV_PREFIX: &str = "FLIGHTSURETY";

/// Settings of the off-chain oracle simulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorSettings {
    /// Number of oracle identities registered at startup
    pub oracle_count: usize,

    /// Seed for index assignment, dispatch and random reports
    pub seed: u64,

    /// Status code every oracle reports; random when absent
    pub fixed_status: Option<u8>,

    /// How often a worker polls the event log, in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        SimulatorSettings {
            oracle_count: 20,
            seed: 7,
            fixed_status: None,
            poll_interval_ms: 25,
        }
    }
}

/// Complete node configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,

    pub params: MarketplaceParams,

    pub simulator: SimulatorSettings,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            log_level: "info".to_string(),
            params: MarketplaceParams::standard(),
            simulator: SimulatorSettings::default(),
        }
    }
}

impl NodeConfig {
    pub fn for_profile(profile: ParamsProfile) -> Self {
        NodeConfig {
            params: MarketplaceParams::for_profile(profile),
            ..NodeConfig::default()
        }
    }

    /// Load a TOML file layered with `FLIGHTSURETY__*` environment overrides,
    /// then validate the marketplace parameters.
    pub fn load(path: &Path) -> SuretyResult<Self> {
        info!("Loading configuration from {}", path.display());
        let settings = ::config::Config::builder()
            .add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Toml)
                    .required(true),
            )
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let config: NodeConfig = settings.try_deserialize()?;
        config.validated()
    }

    /// Parse a TOML document without environment overrides.
    pub fn from_toml_str(raw: &str) -> SuretyResult<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from_str(raw, ::config::FileFormat::Toml))
            .build()?;
        let config: NodeConfig = settings.try_deserialize()?;
        config.validated()
    }

    pub fn to_toml_string(&self) -> SuretyResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn validated(self) -> SuretyResult<Self> {
        let result = ConfigValidator::new().validate(&self.params);
        for warning in &result.warnings {
            warn!("Configuration warning: {}", warning);
        }
        if !result.is_valid {
            return Err(SuretyError::ConfigError(result.get_summary()));
        }
        Ok(self)
    }
}
