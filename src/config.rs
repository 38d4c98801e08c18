//! Configuration
//!
//! Store settings are read from YAML; logging settings come from the command
//! line or environment.

use std::{fs, path::Path, str::FromStr};

use clap::Args;
use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    pricing::{MaterialRates, PricingEngine, PricingError},
    session::{Session, SessionError},
};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the config file
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown currency code
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// A decimal setting could not be parsed
    #[error("invalid decimal for {field}: {value}")]
    InvalidDecimal {
        /// Setting name
        field: &'static str,

        /// Raw value
        value: String,
    },

    /// Rates or fees were rejected by the pricing engine
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Session settings were rejected
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Per-gram rates and base fee, as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PricingConfig {
    /// PLA rate per gram
    pub pla_per_gram: String,

    /// PETG/ABS rate per gram
    pub non_pla_per_gram: String,

    /// Flat fee added to every quote
    pub base_fee: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            pla_per_gram: "0.05".to_string(),
            non_pla_per_gram: "0.08".to_string(),
            base_fee: "5.00".to_string(),
        }
    }
}

/// Storefront settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// ISO 4217 currency code
    pub currency: String,

    /// Quote rates
    pub pricing: PricingConfig,

    /// Price of imported models; defaults to the base fee
    pub import_price: Option<String>,

    /// Email address allowed into the admin console
    pub admin_email: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            pricing: PricingConfig::default(),
            import_price: None,
            admin_email: None,
        }
    }
}

impl StoreConfig {
    /// Load settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Parse settings from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the document is malformed.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_norway::from_str(contents)?)
    }

    /// Resolve the configured currency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCurrency`] for unrecognised codes.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        iso::find(self.currency.trim())
            .ok_or_else(|| ConfigError::UnknownCurrency(self.currency.clone()))
    }

    /// Build the pricing engine described by these settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the currency is unknown or any rate is malformed or negative.
    pub fn pricing_engine(&self) -> Result<PricingEngine, ConfigError> {
        let rates = MaterialRates {
            pla_per_gram: parse_decimal("pricing.pla_per_gram", &self.pricing.pla_per_gram)?,
            non_pla_per_gram: parse_decimal(
                "pricing.non_pla_per_gram",
                &self.pricing.non_pla_per_gram,
            )?,
        };

        let base_fee = parse_decimal("pricing.base_fee", &self.pricing.base_fee)?;

        Ok(PricingEngine::with_rates(rates, base_fee, self.currency()?)?)
    }

    /// Start a session configured by these settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the pricing settings or import price are invalid.
    pub fn session(&self) -> Result<Session, ConfigError> {
        let engine = self.pricing_engine()?;
        let mut session = Session::new(engine);

        if let Some(price) = &self.import_price {
            let amount = parse_decimal("import_price", price)?;

            session = session.with_import_price(Money::from_decimal(amount, engine.currency()))?;
        }

        if let Some(email) = &self.admin_email {
            session = session.with_admin_email(email.trim());
        }

        Ok(session)
    }
}

fn parse_decimal(field: &'static str, value: &str) -> Result<Decimal, ConfigError> {
    Decimal::from_str(value.trim()).map_err(|_err| ConfigError::InvalidDecimal {
        field,
        value: value.to_string(),
    })
}

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,
}
