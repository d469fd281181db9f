//! Pricing models, the closed-form evaluator and the dispatching entry points

use std::path::Path;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bezier::{self, CurveData};

/// Pricing shape for an edition collection. Monetary fields are minor units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PricingModel {
    /// `base_price + supply * increment`
    Linear {
        /// Price of the first edition
        base_price: u64,
        /// Added per edition issued
        increment: u64,
    },
    /// `base_price * (1 + growth_rate)^supply`
    Exponential {
        /// Price of the first edition
        base_price: u64,
        /// Per-edition growth ratio (0.02 = 2%)
        growth_rate: f64,
    },
    /// `base_price + scale * ln(supply + 1)`
    Logarithmic {
        /// Price of the first edition
        base_price: u64,
        /// Multiplier on the natural log
        scale: u64,
    },
    /// User-designed piecewise cubic curve
    Bezier {
        /// Curve definition
        curve: CurveData,
    },
}

impl PricingModel {
    /// Short lowercase name of the model
    pub fn name(&self) -> &'static str {
        match self {
            PricingModel::Linear { .. } => "linear",
            PricingModel::Exponential { .. } => "exponential",
            PricingModel::Logarithmic { .. } => "logarithmic",
            PricingModel::Bezier { .. } => "bezier",
        }
    }

    /// Price floor of the model. For a curve this is its `min_price`.
    pub fn base_price(&self) -> Decimal {
        match self {
            PricingModel::Linear { base_price, .. }
            | PricingModel::Exponential { base_price, .. }
            | PricingModel::Logarithmic { base_price, .. } => Decimal::from(*base_price),
            PricingModel::Bezier { curve } => Decimal::from(curve.min_price),
        }
    }
}

/// A pricing model bound to the size of its collection
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingConfig {
    /// Number of editions that can ever be issued
    pub max_supply: u64,
    /// Pricing shape
    pub model: PricingModel,
}

/// Errors raised while loading a pricing config
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read pricing config: {0}")]
    Io(#[from] std::io::Error),
    /// The contents are not a valid pricing config
    #[error("invalid pricing config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl PricingConfig {
    /// Parses a config from JSON. Unknown model types are rejected here.
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Reads and parses a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }
}

/// Errors from the integer-only pricing path
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// The price does not fit in a `u64`
    #[error("arithmetic overflow in price calculation")]
    ArithmeticOverflow,
}

/// Generic interface for something that prices editions by supply issued
pub trait PriceCurve {
    /// Returns the name/type of this pricing curve
    fn name(&self) -> &'static str;

    /// Returns the price (minor units) once `supply` editions have been issued
    fn price_at(&self, supply: u64) -> Decimal;

    /// Sums `price_at(start + i)` for `i` in `0..quantity`, one edition at a time
    fn total_cost(&self, start_supply: u64, quantity: u64) -> Decimal {
        let mut total = Decimal::ZERO;
        for i in 0..quantity {
            let price = self.price_at(start_supply.saturating_add(i));
            total = total.checked_add(price).unwrap_or(Decimal::MAX);
        }
        total
    }
}

impl PriceCurve for PricingConfig {
    fn name(&self) -> &'static str {
        self.model.name()
    }

    fn price_at(&self, supply: u64) -> Decimal {
        calculate_price(supply, self)
    }
}

fn saturating_from_f64(v: f64) -> Decimal {
    Decimal::from_f64(v).unwrap_or(if v > 0.0 { Decimal::MAX } else { Decimal::ZERO })
}

/// Closed-form price after `supply` editions, rounded down to a whole minor unit.
///
/// A curve model has no closed form; it falls back to its base price.
pub fn closed_form_price(supply: u64, model: &PricingModel) -> Decimal {
    match model {
        PricingModel::Linear { base_price, increment } => Decimal::from(*increment)
            .checked_mul(Decimal::from(supply))
            .and_then(|step| step.checked_add(Decimal::from(*base_price)))
            .unwrap_or(Decimal::MAX),
        PricingModel::Exponential { base_price, growth_rate } => {
            let v = *base_price as f64 * (1.0 + growth_rate).powf(supply as f64);
            saturating_from_f64(v).floor()
        }
        PricingModel::Logarithmic { base_price, scale } => {
            let bump = saturating_from_f64(*scale as f64 * (supply as f64 + 1.0).ln()).floor();
            Decimal::from(*base_price)
                .checked_add(bump)
                .unwrap_or(Decimal::MAX)
        }
        PricingModel::Bezier { .. } => {
            tracing::debug!(model = model.name(), "no closed form, using base price");
            model.base_price()
        }
    }
}

/// Integer-only linear price, `base_price + supply * increment`.
///
/// Unlike [`closed_form_price`] this reports overflow instead of saturating.
pub fn checked_linear_price(base_price: u64, increment: u64, supply: u64) -> Result<u64, PricingError> {
    supply
        .checked_mul(increment)
        .and_then(|step| step.checked_add(base_price))
        .ok_or(PricingError::ArithmeticOverflow)
}

/// Price after `supply` editions, dispatched on the model.
///
/// Always a whole minor unit. Curve prices are rounded the same way the price
/// table rounds them, so a quote is exactly what the ledger will accept.
pub fn calculate_price(supply: u64, config: &PricingConfig) -> Decimal {
    match &config.model {
        PricingModel::Bezier { curve } => {
            bezier::round_to_minor_unit(bezier::calculate_price(supply, config.max_supply, curve))
        }
        closed => closed_form_price(supply, closed),
    }
}

/// Cost of minting `quantity` editions starting at `start_supply`.
pub fn calculate_total_cost(start_supply: u64, quantity: u64, config: &PricingConfig) -> Decimal {
    config.total_cost(start_supply, quantity)
}

/// One point of a price chart
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    /// Editions issued
    pub supply: u64,
    /// Price in minor units
    pub price: Decimal,
}

/// Up to `count` evenly spaced `(supply, price)` points over `0..=max_supply`.
///
/// Intended for charts only; the stride is coarser than the price table.
pub fn generate_sample_points(config: &PricingConfig, count: usize) -> Vec<SamplePoint> {
    let max = config.max_supply as u128;
    let mut points: Vec<SamplePoint> = match count {
        0 => Vec::new(),
        1 => vec![SamplePoint { supply: 0, price: calculate_price(0, config) }],
        _ => {
            let last = (count - 1) as u128;
            (0..count as u128)
                .map(|i| {
                    let supply = (i * max / last) as u64;
                    SamplePoint { supply, price: calculate_price(supply, config) }
                })
                .collect()
        }
    };
    points.dedup_by_key(|p| p.supply);
    points
}
