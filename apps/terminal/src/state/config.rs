//! # Configuration State
//!
//! Startup configuration for the register.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Persisted company settings (`pos_settings`), once saved
//! 2. Environment variables (`TILL_*`)
//! 3. Defaults (this file)
//!
//! Read-only after startup. Settings the operator changes at runtime live
//! in the register's `CompanySettings`, not here.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use till_core::validation::validate_tax_rate_bps;
use till_core::{CompanySettings, TaxRate};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Store name (printed on receipts).
    pub store_name: String,

    /// Currency symbol for display, e.g. "S/".
    pub currency_symbol: String,

    /// Number of decimal places for currency.
    pub currency_decimals: u8,

    /// Tax label, e.g. "IGV".
    pub tax_name: String,

    /// Default tax rate in basis points, e.g. 1800 = 18%.
    pub default_tax_rate_bps: u32,

    /// Database file override. `None` uses the platform data directory.
    pub database_path: Option<PathBuf>,

    /// Seed the demo catalog when the database has none.
    pub seed_demo: bool,
}

impl Default for ConfigState {
    /// ## Default Values
    /// - Store: "Till Store"
    /// - Currency: S/ with 2 decimals
    /// - Tax: IGV 18%
    /// - Demo seeding: on
    fn default() -> Self {
        let settings = CompanySettings::default();
        ConfigState {
            store_name: settings.name,
            currency_symbol: settings.currency_symbol,
            currency_decimals: 2,
            tax_name: settings.tax_name,
            default_tax_rate_bps: settings.tax_rate.bps(),
            database_path: None,
            seed_demo: true,
        }
    }
}

impl ConfigState {
    /// Creates a ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `TILL_STORE_NAME`: store name
    /// - `TILL_CURRENCY_SYMBOL`: currency symbol
    /// - `TILL_TAX_NAME`: tax label
    /// - `TILL_TAX_RATE`: tax percentage (e.g., "18" or "16.5")
    /// - `TILL_DB_PATH`: SQLite file path
    /// - `TILL_SEED_DEMO`: "true"/"false"
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ConfigState::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ConfigState::default();

        if let Some(store_name) = lookup("TILL_STORE_NAME") {
            config.store_name = store_name;
        }

        if let Some(symbol) = lookup("TILL_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Some(tax_name) = lookup("TILL_TAX_NAME") {
            config.tax_name = tax_name;
        }

        if let Some(tax_rate_str) = lookup("TILL_TAX_RATE") {
            if let Ok(rate) = tax_rate_str.trim().parse::<f64>() {
                let bps = TaxRate::from_percentage(rate).bps();
                if rate >= 0.0 && validate_tax_rate_bps(bps).is_ok() {
                    config.default_tax_rate_bps = bps;
                }
            }
        }

        if let Some(path) = lookup("TILL_DB_PATH").filter(|p| !p.trim().is_empty()) {
            config.database_path = Some(PathBuf::from(path));
        }

        if let Some(seed) = lookup("TILL_SEED_DEMO") {
            config.seed_demo = matches!(
                seed.trim().to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        config
    }

    pub fn default_tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.default_tax_rate_bps)
    }

    /// Company settings used until the operator saves their own.
    pub fn default_settings(&self) -> CompanySettings {
        CompanySettings {
            name: self.store_name.clone(),
            currency_symbol: self.currency_symbol.clone(),
            tax_name: self.tax_name.clone(),
            tax_rate: self.default_tax_rate(),
            ..CompanySettings::default()
        }
    }

    /// Formats a cent amount with `symbol` and the configured decimals.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_with_symbol("S/", 123900), "S/ 1239.00");
    /// ```
    pub fn format_with_symbol(&self, symbol: &str, cents: i64) -> String {
        let divisor = 10_i64.pow(self.currency_decimals as u32);
        let whole = cents / divisor;
        let frac = (cents % divisor).abs();

        format!(
            "{}{} {}",
            if cents < 0 { "-" } else { "" },
            symbol,
            if self.currency_decimals > 0 {
                format!(
                    "{}.{:0width$}",
                    whole.abs(),
                    frac,
                    width = self.currency_decimals as usize
                )
            } else {
                whole.abs().to_string()
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_format_currency() {
        let config = ConfigState::default();
        assert_eq!(config.format_with_symbol("S/", 123900), "S/ 1239.00");
        assert_eq!(config.format_with_symbol("S/", 1), "S/ 0.01");
        assert_eq!(config.format_with_symbol("S/", 0), "S/ 0.00");
        assert_eq!(config.format_with_symbol("S/", -550), "-S/ 5.50");
    }

    #[test]
    fn test_defaults() {
        let config = ConfigState::from_lookup(lookup(&[]));
        assert_eq!(config, ConfigState::default());
        assert_eq!(config.default_tax_rate_bps, 1800);
        assert!(config.seed_demo);
        assert!(config.database_path.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let config = ConfigState::from_lookup(lookup(&[
            ("TILL_STORE_NAME", "Corner Shop"),
            ("TILL_CURRENCY_SYMBOL", "$"),
            ("TILL_TAX_NAME", "IVA"),
            ("TILL_TAX_RATE", "16.5"),
            ("TILL_DB_PATH", "/tmp/till.db"),
            ("TILL_SEED_DEMO", "false"),
        ]));

        assert_eq!(config.store_name, "Corner Shop");
        assert_eq!(config.default_tax_rate_bps, 1650);
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/till.db")));
        assert!(!config.seed_demo);

        let settings = config.default_settings();
        assert_eq!(settings.tax_name, "IVA");
        assert_eq!(settings.tax_rate, TaxRate::from_bps(1650));
        assert_eq!(settings.currency_symbol, "$");
    }

    #[test]
    fn test_bad_tax_rate_ignored() {
        let config = ConfigState::from_lookup(lookup(&[("TILL_TAX_RATE", "abc")]));
        assert_eq!(config.default_tax_rate_bps, 1800);

        let config = ConfigState::from_lookup(lookup(&[("TILL_TAX_RATE", "250")]));
        assert_eq!(config.default_tax_rate_bps, 1800);
    }
}
