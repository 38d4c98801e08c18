//! Pricing
//!
//! Converts a material and an estimated mass into a print quote. Quotes are
//! computed in exact decimals and rounded half-up to the currency's minor unit.

use rust_decimal::{Decimal, RoundingStrategy, prelude::FromPrimitive};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use thiserror::Error;

use crate::materials::MaterialKind;

/// Decimal places quotes are rounded to.
const QUOTE_DECIMAL_PLACES: u32 = 2;

/// Errors that can occur while computing a print quote.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Weight was negative, NaN or infinite, from either entry point.
    #[error("weight must be a finite, non-negative number of grams, got {0}")]
    InvalidWeight(String),

    /// Weight could not be represented as a decimal.
    #[error("weight {0} is out of range")]
    WeightOutOfRange(f64),

    /// A per-gram rate or the base fee was negative.
    #[error("{0} must not be negative")]
    NegativeRate(&'static str),

    /// Quote arithmetic overflowed.
    #[error("quote calculation overflowed")]
    Overflow,
}

/// Per-gram rates used by the engine.
///
/// Only PLA is priced separately; every other material shares one rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialRates {
    /// Rate applied to PLA, per gram.
    pub pla_per_gram: Decimal,

    /// Rate applied to PETG and ABS, per gram.
    pub non_pla_per_gram: Decimal,
}

impl MaterialRates {
    /// Rate for the given material.
    pub fn rate(&self, material: MaterialKind) -> Decimal {
        match material {
            MaterialKind::Pla => self.pla_per_gram,
            MaterialKind::Petg | MaterialKind::Abs => self.non_pla_per_gram,
        }
    }
}

impl Default for MaterialRates {
    fn default() -> Self {
        Self {
            pla_per_gram: Decimal::new(5, 2),
            non_pla_per_gram: Decimal::new(8, 2),
        }
    }
}

/// A priced print configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrintQuote {
    material: MaterialKind,
    material_rate: Decimal,
    base_fee: Money<'static, Currency>,
    weight_grams: Decimal,
    total: Money<'static, Currency>,
}

impl PrintQuote {
    /// Material the quote was computed for.
    pub fn material(&self) -> MaterialKind {
        self.material
    }

    /// Rate per gram that was applied.
    pub fn material_rate(&self) -> Decimal {
        self.material_rate
    }

    /// Flat handling fee included in the total.
    pub fn base_fee(&self) -> Money<'static, Currency> {
        self.base_fee
    }

    /// Estimated mass in grams.
    pub fn weight_grams(&self) -> Decimal {
        self.weight_grams
    }

    /// Quoted total, rounded to the minor unit.
    pub fn total(&self) -> Money<'static, Currency> {
        self.total
    }

    /// Currency of the quote.
    pub fn currency(&self) -> &'static Currency {
        self.total.currency()
    }
}

/// Print cost estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingEngine {
    rates: MaterialRates,
    base_fee: Decimal,
    currency: &'static Currency,
}

impl PricingEngine {
    /// Create an engine with the standard rates and base fee in the given currency.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            rates: MaterialRates::default(),
            base_fee: Decimal::new(500, 2),
            currency,
        }
    }

    /// Create an engine with custom rates and base fee.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::NegativeRate`] if any rate or the base fee is negative.
    pub fn with_rates(
        rates: MaterialRates,
        base_fee: Decimal,
        currency: &'static Currency,
    ) -> Result<Self, PricingError> {
        if rates.pla_per_gram < Decimal::ZERO {
            return Err(PricingError::NegativeRate("PLA rate"));
        }

        if rates.non_pla_per_gram < Decimal::ZERO {
            return Err(PricingError::NegativeRate("non-PLA rate"));
        }

        if base_fee < Decimal::ZERO {
            return Err(PricingError::NegativeRate("base fee"));
        }

        Ok(Self {
            rates,
            base_fee,
            currency,
        })
    }

    /// Rates used by this engine.
    pub fn rates(&self) -> &MaterialRates {
        &self.rates
    }

    /// Flat handling fee added to every quote.
    pub fn base_fee(&self) -> Money<'static, Currency> {
        Money::from_decimal(self.base_fee, self.currency)
    }

    /// Currency quotes are issued in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Quote a print of `weight_grams` grams in `material`.
    ///
    /// # Errors
    ///
    /// - [`PricingError::InvalidWeight`]: the weight is NaN, infinite or negative.
    /// - [`PricingError::WeightOutOfRange`]: the weight cannot be represented as a decimal.
    /// - [`PricingError::Overflow`]: the total overflowed.
    pub fn estimate(
        &self,
        material: MaterialKind,
        weight_grams: f64,
    ) -> Result<PrintQuote, PricingError> {
        if !weight_grams.is_finite() || weight_grams < 0.0 {
            return Err(PricingError::InvalidWeight(weight_grams.to_string()));
        }

        let weight =
            Decimal::from_f64(weight_grams).ok_or(PricingError::WeightOutOfRange(weight_grams))?;

        self.estimate_grams(material, weight)
    }

    /// Quote a print with an exact decimal weight.
    ///
    /// # Errors
    ///
    /// - [`PricingError::InvalidWeight`]: the weight is below zero.
    /// - [`PricingError::Overflow`]: the total overflowed.
    pub fn estimate_grams(
        &self,
        material: MaterialKind,
        weight_grams: Decimal,
    ) -> Result<PrintQuote, PricingError> {
        if weight_grams < Decimal::ZERO {
            return Err(PricingError::InvalidWeight(weight_grams.to_string()));
        }

        let rate = self.rates.rate(material);

        let total = weight_grams
            .checked_mul(rate)
            .and_then(|material_cost| material_cost.checked_add(self.base_fee))
            .ok_or(PricingError::Overflow)?
            .round_dp_with_strategy(QUOTE_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);

        Ok(PrintQuote {
            material,
            material_rate: rate,
            base_fee: self.base_fee(),
            weight_grams,
            total: Money::from_decimal(total, self.currency),
        })
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new(iso::USD)
    }
}
