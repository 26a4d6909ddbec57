use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{SuretyError, SuretyResult};
use crate::types::{Amount, ETHER};

/// Named parameter sets available to deployments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamsProfile {
    /// Production-scale amounts denominated in ether
    Standard,
    /// Tiny amounts for local networks and tests
    Devnet,
    /// User-defined values
    Custom,
}

impl Default for ParamsProfile {
    fn default() -> Self {
        ParamsProfile::Standard
    }
}

impl fmt::Display for ParamsProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamsProfile::Standard => write!(f, "Standard"),
            ParamsProfile::Devnet => write!(f, "Devnet"),
            ParamsProfile::Custom => write!(f, "Custom"),
        }
    }
}

impl FromStr for ParamsProfile {
    type Err = SuretyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(ParamsProfile::Standard),
            "devnet" => Ok(ParamsProfile::Devnet),
            "custom" => Ok(ParamsProfile::Custom),
            other => Err(SuretyError::ConfigError(format!("unknown profile {}", other))),
        }
    }
}

/// Rational payout multiplier applied to the premium of a credited policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutMultiplier {
    pub numerator: u32,
    pub denominator: u32,
}

impl PayoutMultiplier {
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        PayoutMultiplier {
            numerator,
            denominator,
        }
    }

    /// `amount * numerator / denominator`, rounding down.
    pub fn apply(&self, amount: Amount) -> SuretyResult<Amount> {
        if self.denominator == 0 {
            return Err(SuretyError::ConfigError(
                "payout multiplier denominator is zero".to_string(),
            ));
        }
        amount
            .checked_mul(self.numerator as Amount)
            .map(|scaled| scaled / self.denominator as Amount)
            .ok_or(SuretyError::Overflow("payout multiplier"))
    }
}

impl fmt::Display for PayoutMultiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Economic and consensus parameters of a marketplace deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketplaceParams {
    /// The profile these values were derived from
    pub profile: ParamsProfile,

    /// Minimum deposit that marks an airline as funded
    #[serde(with = "crate::config::amount_serde")]
    pub funding_threshold: Amount,

    /// Fee an oracle pays to register
    #[serde(with = "crate::config::amount_serde")]
    pub registration_fee: Amount,

    /// Maximum cumulative premium per policy
    #[serde(with = "crate::config::amount_serde")]
    pub purchase_cap: Amount,

    /// Payout as a multiple of the premium
    pub payout_multiplier: PayoutMultiplier,

    /// Oracle indexes are drawn from `[0, index_range)`
    pub index_range: u8,

    /// Matching reports needed to finalize a status
    pub min_responses: usize,

    /// Registered-airline count below which admission needs no vote
    pub bootstrap_threshold: usize,
}

impl Default for MarketplaceParams {
    fn default() -> Self {
        MarketplaceParams::standard()
    }
}

impl MarketplaceParams {
    pub fn standard() -> Self {
        MarketplaceParams {
            profile: ParamsProfile::Standard,
            funding_threshold: 10 * ETHER,
            registration_fee: ETHER,
            purchase_cap: ETHER,
            payout_multiplier: PayoutMultiplier::new(3, 2),
            index_range: 10,
            min_responses: 3,
            bootstrap_threshold: 4,
        }
    }

    pub fn devnet() -> Self {
        MarketplaceParams {
            profile: ParamsProfile::Devnet,
            funding_threshold: 10,
            registration_fee: 1,
            purchase_cap: 1_000,
            ..MarketplaceParams::standard()
        }
    }

    pub fn for_profile(profile: ParamsProfile) -> Self {
        match profile {
            ParamsProfile::Standard => MarketplaceParams::standard(),
            ParamsProfile::Devnet => MarketplaceParams::devnet(),
            ParamsProfile::Custom => MarketplaceParams {
                profile: ParamsProfile::Custom,
                ..MarketplaceParams::standard()
            },
        }
    }
}
