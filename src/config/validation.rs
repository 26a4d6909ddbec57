use std::collections::HashMap;

use log::{debug, error};
use thiserror::Error;

use crate::config::presets::MarketplaceParams;
use crate::consensus::INDEXES_PER_ORACLE;

/// Error type for parameter validation issues
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Incompatible settings: {0}")]
    IncompatibleSettings(String),

    #[error("Value out of range: {0}")]
    ValueOutOfRange(String),
}

/// Result of configuration validation
#[derive(Debug)]
pub struct ValidationResult {
    /// Whether the validation passed
    pub is_valid: bool,

    /// List of errors found during validation
    pub errors: Vec<ConfigValidationError>,

    /// List of warnings (valid but not recommended)
    pub warnings: Vec<String>,

    /// Suggested fixes for validation issues
    pub suggested_fixes: HashMap<String, String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            suggested_fixes: HashMap::new(),
        }
    }

    pub fn add_error(&mut self, error: ConfigValidationError) {
        self.is_valid = false;
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    pub fn add_suggested_fix(&mut self, setting: &str, suggestion: String) {
        self.suggested_fixes.insert(setting.to_string(), suggestion);
    }

    /// Return a summary of validation issues
    pub fn get_summary(&self) -> String {
        if self.is_valid && self.warnings.is_empty() {
            return "Configuration is valid with no warnings.".to_string();
        }

        let mut result = String::new();

        if !self.is_valid {
            result.push_str(&format!("Configuration has {} errors:\n", self.errors.len()));
            for (i, error) in self.errors.iter().enumerate() {
                result.push_str(&format!("  {}. {}\n", i + 1, error));
            }
        } else {
            result.push_str("Configuration is valid but has warnings.\n");
        }

        if !self.warnings.is_empty() {
            result.push_str(&format!("\nWarnings ({}):\n", self.warnings.len()));
            for (i, warning) in self.warnings.iter().enumerate() {
                result.push_str(&format!("  {}. {}\n", i + 1, warning));
            }
        }

        if !self.suggested_fixes.is_empty() {
            result.push_str("\nSuggested fixes:\n");
            let mut fixes: Vec<_> = self.suggested_fixes.iter().collect();
            fixes.sort();
            for (setting, suggestion) in fixes {
                result.push_str(&format!("  - {}: {}\n", setting, suggestion));
            }
        }

        result
    }
}

/// Parameter validation rule
pub trait ValidationRule {
    fn name(&self) -> &str;

    fn validate(&self, params: &MarketplaceParams) -> Result<(), ConfigValidationError>;

    fn description(&self) -> &str;

    /// Suggest a fix for validation failures
    fn suggest_fix(&self, params: &MarketplaceParams) -> Option<HashMap<String, String>>;
}

/// Applies the registered rules to a parameter set
pub struct ConfigValidator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator {
    /// Create a new validator with the default rules
    pub fn new() -> Self {
        let mut validator = Self { rules: Vec::new() };

        validator.add_rule(Box::new(IndexSpaceRule));
        validator.add_rule(Box::new(QuorumRule));
        validator.add_rule(Box::new(PayoutMultiplierRule));
        validator.add_rule(Box::new(PositiveAmountsRule));

        validator
    }

    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Box<dyn ValidationRule>] {
        &self.rules
    }

    pub fn validate(&self, params: &MarketplaceParams) -> ValidationResult {
        let mut result = ValidationResult::new();

        for rule in &self.rules {
            match rule.validate(params) {
                Ok(()) => {
                    debug!("Validation rule '{}' passed", rule.name());
                }
                Err(err) => {
                    error!("Validation rule '{}' failed: {}", rule.name(), err);
                    result.add_error(err);

                    if let Some(fixes) = rule.suggest_fix(params) {
                        for (setting, suggestion) in fixes {
                            result.add_suggested_fix(&setting, suggestion);
                        }
                    }
                }
            }
        }

        if params.min_responses < 2 {
            result.add_warning(
                "A single oracle report can finalize a flight status.".to_string(),
            );
        }

        if params.payout_multiplier.numerator < params.payout_multiplier.denominator {
            result.add_warning("Payouts are smaller than the premium paid.".to_string());
        }

        result
    }
}

/// Every oracle must be able to hold its indexes without repetition
struct IndexSpaceRule;

impl ValidationRule for IndexSpaceRule {
    fn name(&self) -> &str {
        "IndexSpace"
    }

    fn validate(&self, params: &MarketplaceParams) -> Result<(), ConfigValidationError> {
        if (params.index_range as usize) < INDEXES_PER_ORACLE {
            return Err(ConfigValidationError::IncompatibleSettings(format!(
                "cannot draw {} distinct indexes from a range of {}",
                INDEXES_PER_ORACLE, params.index_range
            )));
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Validates that the index range can supply every oracle's distinct index set"
    }

    fn suggest_fix(&self, _params: &MarketplaceParams) -> Option<HashMap<String, String>> {
        let mut fixes = HashMap::new();
        fixes.insert(
            "index_range".to_string(),
            format!("Use an index range of at least {}", INDEXES_PER_ORACLE),
        );
        Some(fixes)
    }
}

/// Quorums must be reachable
struct QuorumRule;

impl ValidationRule for QuorumRule {
    fn name(&self) -> &str {
        "Quorum"
    }

    fn validate(&self, params: &MarketplaceParams) -> Result<(), ConfigValidationError> {
        if params.min_responses == 0 {
            return Err(ConfigValidationError::ValueOutOfRange(
                "min_responses must be at least 1".to_string(),
            ));
        }
        if params.bootstrap_threshold == 0 {
            return Err(ConfigValidationError::ValueOutOfRange(
                "bootstrap_threshold must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Validates oracle and airline quorum sizes"
    }

    fn suggest_fix(&self, _params: &MarketplaceParams) -> Option<HashMap<String, String>> {
        let mut fixes = HashMap::new();
        fixes.insert("min_responses".to_string(), "Use the default of 3".to_string());
        fixes.insert("bootstrap_threshold".to_string(), "Use the default of 4".to_string());
        Some(fixes)
    }
}

struct PayoutMultiplierRule;

impl ValidationRule for PayoutMultiplierRule {
    fn name(&self) -> &str {
        "PayoutMultiplier"
    }

    fn validate(&self, params: &MarketplaceParams) -> Result<(), ConfigValidationError> {
        let multiplier = params.payout_multiplier;
        if multiplier.denominator == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "payout_multiplier.denominator must not be zero".to_string(),
            ));
        }
        if multiplier.numerator == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "payout_multiplier.numerator must not be zero".to_string(),
            ));
        }
        if params.purchase_cap.checked_mul(multiplier.numerator as u128).is_none() {
            return Err(ConfigValidationError::ValueOutOfRange(
                "purchase_cap times payout multiplier overflows".to_string(),
            ));
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Validates that payouts are computable for every admissible premium"
    }

    fn suggest_fix(&self, _params: &MarketplaceParams) -> Option<HashMap<String, String>> {
        let mut fixes = HashMap::new();
        fixes.insert(
            "payout_multiplier".to_string(),
            "Use the default multiplier of 3/2".to_string(),
        );
        Some(fixes)
    }
}

struct PositiveAmountsRule;

impl ValidationRule for PositiveAmountsRule {
    fn name(&self) -> &str {
        "PositiveAmounts"
    }

    fn validate(&self, params: &MarketplaceParams) -> Result<(), ConfigValidationError> {
        if params.funding_threshold == 0 || params.registration_fee == 0 || params.purchase_cap == 0
        {
            return Err(ConfigValidationError::InvalidValue(
                "funding_threshold, registration_fee and purchase_cap must be positive"
                    .to_string(),
            ));
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Validates that all fee and cap amounts are positive"
    }

    fn suggest_fix(&self, _params: &MarketplaceParams) -> Option<HashMap<String, String>> {
        None
    }
}
