//! # Client Configuration
//!
//! Configuration for talking to the content backend and for the two
//! pricing flows.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TALLY_BACKEND_URL=https://cms.example.com                          │
//! │     TALLY_POS_TAX_RATE=8.25                                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/tally/tally.toml (Linux)                                 │
//! │     ~/Library/Application Support/com.tally.tally/tally.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     localhost backend, 400 ms debounce, 25 results                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # tally.toml
//! [backend]
//! url = "http://localhost:1337"
//! request_timeout_secs = 15
//!
//! [search]
//! debounce_ms = 400
//! page_size = 25
//!
//! [pricing.point_of_sale]
//! flat_discount_cents = 500   # $5.00 off every sale
//! tax_rate_bps = 1000         # 10%
//!
//! [pricing.invoice]
//! discount_rate_bps = 1000    # 10% of the subtotal
//! tax_rate_bps = 800          # 8%
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tally_core::validation::validate_rate_bps;
use tally_core::{
    DiscountRate, Money, PricingPolicy, TaxRate, DEFAULT_SEARCH_DEBOUNCE_MS,
    DEFAULT_SEARCH_PAGE_SIZE,
};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Backend Settings
// =============================================================================

/// Where the content backend lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Base URL; endpoint paths (`/api/...`) are joined onto it.
    #[serde(default = "default_backend_url")]
    pub url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_backend_url() -> String {
    "http://localhost:1337".to_string()
}

fn default_request_timeout() -> u64 {
    15
}

impl Default for BackendSettings {
    fn default() -> Self {
        BackendSettings {
            url: default_backend_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

// =============================================================================
// Search Settings
// =============================================================================

/// Product search box behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Quiescence window before a query is sent (milliseconds).
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Maximum number of candidates per query.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_debounce_ms() -> u64 {
    DEFAULT_SEARCH_DEBOUNCE_MS
}

fn default_page_size() -> u32 {
    DEFAULT_SEARCH_PAGE_SIZE
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            debounce_ms: default_debounce_ms(),
            page_size: default_page_size(),
        }
    }
}

// =============================================================================
// Pricing Settings
// =============================================================================

/// Point-of-sale screen: flat discount amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointOfSalePricing {
    #[serde(default = "default_pos_flat_discount")]
    pub flat_discount_cents: i64,

    #[serde(default = "default_pos_tax_rate")]
    pub tax_rate_bps: u32,
}

fn default_pos_flat_discount() -> i64 {
    500
}

fn default_pos_tax_rate() -> u32 {
    1000
}

impl Default for PointOfSalePricing {
    fn default() -> Self {
        PointOfSalePricing {
            flat_discount_cents: default_pos_flat_discount(),
            tax_rate_bps: default_pos_tax_rate(),
        }
    }
}

/// Invoice builder: discount as a rate of the subtotal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoicePricing {
    #[serde(default = "default_invoice_discount_rate")]
    pub discount_rate_bps: u32,

    #[serde(default = "default_invoice_tax_rate")]
    pub tax_rate_bps: u32,
}

fn default_invoice_discount_rate() -> u32 {
    1000
}

fn default_invoice_tax_rate() -> u32 {
    800
}

impl Default for InvoicePricing {
    fn default() -> Self {
        InvoicePricing {
            discount_rate_bps: default_invoice_discount_rate(),
            tax_rate_bps: default_invoice_tax_rate(),
        }
    }
}

/// Both pricing flows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingSettings {
    #[serde(default)]
    pub point_of_sale: PointOfSalePricing,

    #[serde(default)]
    pub invoice: InvoicePricing,
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub backend: BackendSettings,

    #[serde(default)]
    pub search: SearchSettings,

    #[serde(default)]
    pub pricing: PricingSettings,
}

impl ClientConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (tally.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Client config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        let url = self.base_url()?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ClientError::InvalidUrl(format!(
                "Backend URL must start with http:// or https://, got: {}",
                self.backend.url
            )));
        }

        if self.backend.request_timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.search.page_size == 0 {
            return Err(ClientError::InvalidConfig(
                "page_size must be greater than 0".into(),
            ));
        }

        if self.pricing.point_of_sale.flat_discount_cents < 0 {
            return Err(ClientError::InvalidConfig(
                "flat_discount_cents must not be negative".into(),
            ));
        }

        let rates = [
            ("point_of_sale.tax_rate_bps", self.pricing.point_of_sale.tax_rate_bps),
            ("invoice.discount_rate_bps", self.pricing.invoice.discount_rate_bps),
            ("invoice.tax_rate_bps", self.pricing.invoice.tax_rate_bps),
        ];
        for (field, bps) in rates {
            validate_rate_bps(field, bps)
                .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from a key lookup. Unparseable values are ignored
    /// with a warning.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("TALLY_BACKEND_URL") {
            debug!(url = %url, "Overriding backend URL from environment");
            self.backend.url = url;
        }

        if let Some(secs) = lookup("TALLY_REQUEST_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.backend.request_timeout_secs = s,
                Err(_) => warn!(value = %secs, "Invalid TALLY_REQUEST_TIMEOUT_SECS"),
            }
        }

        if let Some(ms) = lookup("TALLY_SEARCH_DEBOUNCE_MS") {
            match ms.parse::<u64>() {
                Ok(m) => self.search.debounce_ms = m,
                Err(_) => warn!(value = %ms, "Invalid TALLY_SEARCH_DEBOUNCE_MS"),
            }
        }

        if let Some(size) = lookup("TALLY_SEARCH_PAGE_SIZE") {
            match size.parse::<u32>() {
                Ok(s) => self.search.page_size = s,
                Err(_) => warn!(value = %size, "Invalid TALLY_SEARCH_PAGE_SIZE"),
            }
        }

        // Percentage, e.g. "8.25"
        if let Some(rate) = lookup("TALLY_POS_TAX_RATE") {
            match Decimal::from_str(rate.trim()).ok().and_then(TaxRate::from_percentage) {
                Some(r) => {
                    debug!(bps = r.bps(), "Overriding POS tax rate from environment");
                    self.pricing.point_of_sale.tax_rate_bps = r.bps();
                }
                None => warn!(value = %rate, "Invalid TALLY_POS_TAX_RATE"),
            }
        }

        // Amount, e.g. "5.00"
        if let Some(amount) = lookup("TALLY_POS_FLAT_DISCOUNT") {
            match amount.parse::<Money>() {
                Ok(m) => self.pricing.point_of_sale.flat_discount_cents = m.cents(),
                Err(_) => warn!(value = %amount, "Invalid TALLY_POS_FLAT_DISCOUNT"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tally", "tally")
            .map(|dirs| dirs.config_dir().join("tally.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Parsed backend base URL.
    pub fn base_url(&self) -> ClientResult<Url> {
        Ok(Url::parse(&self.backend.url)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.request_timeout_secs)
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }

    /// Pricing for the point-of-sale screen.
    pub fn point_of_sale_policy(&self) -> PricingPolicy {
        PricingPolicy::point_of_sale(
            Money::from_cents(self.pricing.point_of_sale.flat_discount_cents),
            TaxRate::from_bps(self.pricing.point_of_sale.tax_rate_bps),
        )
    }

    /// Pricing for the invoice builder.
    pub fn invoice_policy(&self) -> PricingPolicy {
        PricingPolicy::invoice(
            DiscountRate::from_bps(self.pricing.invoice.discount_rate_bps),
            TaxRate::from_bps(self.pricing.invoice.tax_rate_bps),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tally_core::Discount;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search.debounce_ms, 400);
        assert_eq!(config.search.page_size, 25);
        assert_eq!(
            config.point_of_sale_policy().discount,
            Discount::Flat(Money::from_cents(500))
        );
        assert_eq!(config.invoice_policy().tax_rate, TaxRate::from_bps(800));
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::default();

        config.backend.url = "ftp://cms.example.com".to_string();
        assert!(config.validate().is_err());

        config.backend.url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.backend.url = "https://cms.example.com".to_string();
        assert!(config.validate().is_ok());

        config.pricing.invoice.tax_rate_bps = 10_001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("TALLY_BACKEND_URL", "https://cms.example.com"),
            ("TALLY_POS_TAX_RATE", "8.25"),
            ("TALLY_POS_FLAT_DISCOUNT", "2.50"),
            ("TALLY_SEARCH_PAGE_SIZE", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = ClientConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.backend.url, "https://cms.example.com");
        assert_eq!(config.pricing.point_of_sale.tax_rate_bps, 825);
        assert_eq!(config.pricing.point_of_sale.flat_discount_cents, 250);
        // Invalid value ignored
        assert_eq!(config.search.page_size, 25);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [backend]
            url = "https://cms.example.com"

            [pricing.invoice]
            tax_rate_bps = 825
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.request_timeout_secs, 15);
        assert_eq!(config.pricing.invoice.tax_rate_bps, 825);
        assert_eq!(config.pricing.invoice.discount_rate_bps, 1000);
        assert_eq!(config.pricing.point_of_sale.flat_discount_cents, 500);
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&ClientConfig::default()).unwrap();
        assert!(toml_str.contains("[backend]"));
        assert!(toml_str.contains("[pricing.point_of_sale]"));
    }
}
