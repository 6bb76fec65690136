//! # Configuration State
//!
//! Storefront configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`TOPCARE_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no lock is needed.

use serde::{Deserialize, Serialize};
use topcare_core::money::Money;
use topcare_core::pricing::{PricingConfig, PricingEngine, PromoMode};
use topcare_core::TaxRate;

use crate::error::ConfigError;

/// Storefront configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Shown in the app header and on the order confirmation.
    pub store_name: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Shipping, tax, fee and promo settings.
    pub pricing: PricingConfig,
}

impl Default for ConfigState {
    /// ## Default Values
    /// - Store: "TopCare Fashion"
    /// - Currency: S$
    /// - Free shipping from $50.00, otherwise $4.99
    /// - Tax: 8%
    /// - No platform fee, snapshot promos
    fn default() -> Self {
        ConfigState {
            store_name: "TopCare Fashion".to_string(),
            currency_symbol: "S$".to_string(),
            pricing: PricingConfig::default(),
        }
    }
}

fn invalid(key: &str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_amount(key: &str, value: &str) -> Result<Money, ConfigError> {
    let amount = Money::parse(value).map_err(|e| invalid(key, value, e.to_string()))?;
    if amount.is_negative() {
        return Err(invalid(key, value, "must not be negative"));
    }
    Ok(amount)
}

fn parse_tax_percentage(key: &str, value: &str) -> Result<TaxRate, ConfigError> {
    let pct: f64 = value
        .trim()
        .trim_end_matches('%')
        .trim()
        .parse()
        .map_err(|_| invalid(key, value, "not a number"))?;
    if !(0.0..=100.0).contains(&pct) {
        return Err(invalid(key, value, "must be between 0 and 100"));
    }
    Ok(TaxRate::from_percentage(pct))
}

impl ConfigState {
    /// Creates a ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `TOPCARE_STORE_NAME`: Store name
    /// - `TOPCARE_CURRENCY_SYMBOL`: Display symbol (e.g. "S$")
    /// - `TOPCARE_FREE_SHIPPING_THRESHOLD`: Amount, e.g. "50.00"
    /// - `TOPCARE_FLAT_SHIPPING_FEE`: Amount, e.g. "4.99"
    /// - `TOPCARE_TAX_RATE`: Percentage, e.g. "8"
    /// - `TOPCARE_PLATFORM_FEE`: Amount, e.g. "0.30"
    /// - `TOPCARE_PROMO_MODE`: "snapshot" or "recompute"
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ConfigState::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ConfigState::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(store_name) = var("TOPCARE_STORE_NAME") {
            config.store_name = store_name.trim().to_string();
        }

        if let Some(symbol) = var("TOPCARE_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol.trim().to_string();
        }

        let pricing = &mut config.pricing;

        const THRESHOLD: &str = "TOPCARE_FREE_SHIPPING_THRESHOLD";
        if let Some(value) = var(THRESHOLD) {
            pricing.free_shipping_threshold = parse_amount(THRESHOLD, &value)?;
        }

        const SHIPPING: &str = "TOPCARE_FLAT_SHIPPING_FEE";
        if let Some(value) = var(SHIPPING) {
            pricing.flat_shipping_fee = parse_amount(SHIPPING, &value)?;
        }

        const TAX: &str = "TOPCARE_TAX_RATE";
        if let Some(value) = var(TAX) {
            pricing.tax_rate = parse_tax_percentage(TAX, &value)?;
        }

        const FEE: &str = "TOPCARE_PLATFORM_FEE";
        if let Some(value) = var(FEE) {
            pricing.platform_fee = parse_amount(FEE, &value)?;
        }

        const PROMO: &str = "TOPCARE_PROMO_MODE";
        if let Some(value) = var(PROMO) {
            pricing.promo_mode = value
                .parse::<PromoMode>()
                .map_err(|e| invalid(PROMO, &value, e.to_string()))?;
        }

        Ok(config)
    }

    /// The engine every cart and checkout calculation goes through.
    pub fn pricing_engine(&self) -> PricingEngine {
        PricingEngine::new(self.pricing.clone())
    }

    /// Formats an amount with the configured symbol, e.g. `S$12.34`.
    pub fn format_money(&self, amount: Money) -> String {
        amount.format_with_symbol(&self.currency_symbol)
    }
}
