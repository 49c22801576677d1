//! # Billing Configuration
//!
//! Document layout, tax policy and locale settings for the billing core.
//!
//! ## Load Order (later overrides earlier)
//! 1. Default values
//! 2. TOML config file
//! 3. Environment variables (`GST_BILLING_*`)
//!
//! ## Configuration File Format
//! ```toml
//! [document]
//! currency_symbol = "₹"
//! min_table_rows = 8
//! default_branch_name = "Default Plant"
//! place_of_supply_fallback = "Internal"
//!
//! [tax]
//! allow_special_rate = true
//! reject_excess_discount = true
//!
//! [locale]
//! utc_offset_minutes = 330
//!
//! [sink]
//! output_dir = "./documents"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::format::RUPEE_SYMBOL;
use crate::types::{BillingError, BillingResult};

const MAX_TABLE_ROWS: usize = 50;
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

// =============================================================================
// Document Settings
// =============================================================================

/// Settings shared by the invoice and report layouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Glyph printed before every amount.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// The line-item table is padded with blank rows up to this count.
    #[serde(default = "default_min_table_rows")]
    pub min_table_rows: usize,

    /// Branch name snapshotted on invoices saved without a factory.
    #[serde(default = "default_branch_name")]
    pub default_branch_name: String,

    /// Printed when the factory location has no usable last segment.
    #[serde(default = "default_place_of_supply")]
    pub place_of_supply_fallback: String,
}

fn default_currency_symbol() -> String {
    RUPEE_SYMBOL.to_string()
}

fn default_min_table_rows() -> usize {
    8
}

fn default_branch_name() -> String {
    "Default Plant".to_string()
}

fn default_place_of_supply() -> String {
    "Internal".to_string()
}

impl Default for DocumentConfig {
    fn default() -> Self {
        DocumentConfig {
            currency_symbol: default_currency_symbol(),
            min_table_rows: default_min_table_rows(),
            default_branch_name: default_branch_name(),
            place_of_supply_fallback: default_place_of_supply(),
        }
    }
}

// =============================================================================
// Tax Policy
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxPolicy {
    /// Accept the 40% special slab.
    #[serde(default = "default_true")]
    pub allow_special_rate: bool,

    /// Reject invoices whose discount exceeds subtotal plus tax.
    /// When disabled the negative grand total is stored as computed.
    #[serde(default = "default_true")]
    pub reject_excess_discount: bool,
}

fn default_true() -> bool {
    true
}

impl Default for TaxPolicy {
    fn default() -> Self {
        TaxPolicy {
            allow_special_rate: true,
            reject_excess_discount: true,
        }
    }
}

// =============================================================================
// Locale / Sink
// =============================================================================

/// Fixed reference zone used to decide what "today" is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocaleConfig {
    /// Minutes east of UTC. Default: 330 (Indian Standard Time)
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,
}

fn default_utc_offset() -> i32 {
    330
}

impl Default for LocaleConfig {
    fn default() -> Self {
        LocaleConfig {
            utc_offset_minutes: default_utc_offset(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Directory that receives rendered documents.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./documents")
}

impl Default for SinkConfig {
    fn default() -> Self {
        SinkConfig {
            output_dir: default_output_dir(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete billing configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillingConfig {
    #[serde(default)]
    pub document: DocumentConfig,

    #[serde(default)]
    pub tax: TaxPolicy,

    #[serde(default)]
    pub locale: LocaleConfig,

    #[serde(default)]
    pub sink: SinkConfig,
}

impl BillingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    pub fn load(config_path: Option<&Path>) -> BillingResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path {
            if path.exists() {
                info!(?path, "Loading billing config from file");
                let contents = std::fs::read_to_string(path).map_err(|e| {
                    BillingError::Config(format!("Cannot read {}: {}", path.display(), e))
                })?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<&Path>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load billing config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn from_toml(contents: &str) -> BillingResult<Self> {
        toml::from_str(contents).map_err(|e| BillingError::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> BillingResult<String> {
        toml::to_string_pretty(self).map_err(|e| BillingError::Config(e.to_string()))
    }

    pub fn validate(&self) -> BillingResult<()> {
        if self.document.currency_symbol.trim().is_empty() {
            return Err(BillingError::Config(
                "currency_symbol must not be empty".into(),
            ));
        }

        if !(1..=MAX_TABLE_ROWS).contains(&self.document.min_table_rows) {
            return Err(BillingError::Config(format!(
                "min_table_rows must be between 1 and {}, got {}",
                MAX_TABLE_ROWS, self.document.min_table_rows
            )));
        }

        if self.locale.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(BillingError::Config(format!(
                "utc_offset_minutes must be within ±{}, got {}",
                MAX_UTC_OFFSET_MINUTES, self.locale.utc_offset_minutes
            )));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `GST_BILLING_*` overrides from any key lookup.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(symbol) = lookup("GST_BILLING_CURRENCY_SYMBOL") {
            debug!(symbol = %symbol, "Overriding currency symbol from environment");
            self.document.currency_symbol = symbol;
        }

        if let Some(rows) = lookup("GST_BILLING_MIN_TABLE_ROWS") {
            match rows.parse::<usize>() {
                Ok(n) => self.document.min_table_rows = n,
                Err(_) => warn!(value = %rows, "Ignoring non-numeric GST_BILLING_MIN_TABLE_ROWS"),
            }
        }

        if let Some(offset) = lookup("GST_BILLING_UTC_OFFSET_MINUTES") {
            match offset.parse::<i32>() {
                Ok(minutes) => {
                    debug!(minutes, "Overriding UTC offset from environment");
                    self.locale.utc_offset_minutes = minutes;
                }
                Err(_) => {
                    warn!(value = %offset, "Ignoring non-numeric GST_BILLING_UTC_OFFSET_MINUTES")
                }
            }
        }

        if let Some(dir) = lookup("GST_BILLING_OUTPUT_DIR") {
            self.sink.output_dir = PathBuf::from(dir);
        }
    }
}
