#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(missing_docs)]
//! Library entry for edition mint pricing.
//!
//! Prices sequentially issued editions as a function of supply already issued,
//! using closed-form formulas or a user-designed piecewise cubic Bezier curve,
//! and flattens any of them into the integer price table an on-chain program
//! enforces at mint time.
//!
//! # Modules
//! - [`pricing`]: Pricing models, closed-form evaluator, dispatch
//! - [`bezier`]: Curve data and Newton-Raphson evaluation
//! - [`builder`]: Curve templates and continuity repair
//! - [`table`]: Bounded price tables for on-chain storage
//! - [`validate`]: Curve validation and table reports
//! - [`ledger`]: Mint-time enforcement model
//! - [`plot`]: Visualization (optional in binaries)

/// Pricing models and the closed-form evaluator
pub mod pricing;

/// Piecewise cubic Bezier curves and their evaluator
pub mod bezier;

/// Curve templates and segment continuity
pub mod builder;

/// Price table generation with explicit capacity policy
pub mod table;

/// Validation of curve definitions
pub mod validate;

/// Offline model of the mint-time enforcement program
pub mod ledger;

/// Visualization utilities for generating charts
pub mod plot;

pub use bezier::{evaluate as evaluate_bezier_curve, CurveData, Point, Segment};
pub use pricing::{
    calculate_price, calculate_total_cost, generate_sample_points, PriceCurve, PricingConfig,
    PricingModel, SamplePoint,
};
pub use table::generate_price_table;
pub use validate::{validate as validate_bezier_curve, ValidationResult};
