//! Structural checks on curve definitions and summaries of generated tables

use serde::{Deserialize, Serialize};

use crate::bezier::CurveData;

/// Outcome of validating a curve. Every problem found is listed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// `true` when `errors` is empty
    pub valid: bool,
    /// Human-readable problems, in discovery order
    pub errors: Vec<String>,
}

/// Optional stricter checks
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValidationMode {
    /// Reject curves whose control point y-values ever decrease, within a
    /// segment or from one segment's end to the next one's start
    pub require_monotonic: bool,
}

/// Validates `curve` with the default (non-monotonic) mode.
///
/// Continuity between segments is not checked here; see [`crate::builder::connect`].
pub fn validate(curve: &CurveData) -> ValidationResult {
    validate_with(curve, ValidationMode::default())
}

/// Validates `curve`, accumulating every violation instead of stopping at the first.
pub fn validate_with(curve: &CurveData, mode: ValidationMode) -> ValidationResult {
    let mut errors = Vec::new();

    if curve.segments.is_empty() {
        errors.push("curve must contain at least one segment".to_string());
    }
    if curve.min_price < 0 {
        errors.push(format!("minPrice must be >= 0 (got {})", curve.min_price));
    }
    if curve.max_price <= curve.min_price {
        errors.push(format!(
            "maxPrice must be greater than minPrice (got minPrice={}, maxPrice={})",
            curve.min_price, curve.max_price
        ));
    }

    for (i, segment) in curve.segments.iter().enumerate() {
        for (j, p) in segment.points().iter().enumerate() {
            // NaN fails the range check too
            if !(0.0..=1.0).contains(&p.x) {
                errors.push(format!("segment {i} point p{j}: x={} is outside [0, 1]", p.x));
            }
            if !(0.0..=1.0).contains(&p.y) {
                errors.push(format!("segment {i} point p{j}: y={} is outside [0, 1]", p.y));
            }
        }
        if mode.require_monotonic {
            let pts = segment.points();
            for j in 0..3 {
                if pts[j + 1].y < pts[j].y {
                    errors.push(format!(
                        "segment {i}: price decreases from p{j}.y={} to p{}.y={}",
                        pts[j].y,
                        j + 1,
                        pts[j + 1].y
                    ));
                }
            }
        }
    }

    if mode.require_monotonic {
        for (i, pair) in curve.segments.windows(2).enumerate() {
            if pair[1].p0.y < pair[0].p3.y {
                errors.push(format!(
                    "segments {i} and {}: price decreases from segment {i} p3.y={} to segment {} p0.y={}",
                    i + 1,
                    pair[0].p3.y,
                    i + 1,
                    pair[1].p0.y
                ));
            }
        }
    }

    ValidationResult {
        valid: errors.is_empty(),
        errors,
    }
}

/// Summary of a generated price table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    /// Number of entries
    pub entries: usize,
    /// Cheapest entry
    pub min_price: Option<u64>,
    /// Most expensive entry
    pub max_price: Option<u64>,
    /// Revenue from selling every edition
    pub total_revenue: u128,
    /// Whether prices never decrease
    pub monotone_ok: bool,
}

/// Summarises a flat price table
pub fn inspect_table(table: &[u64]) -> TableReport {
    let mut total_revenue = 0u128;
    let mut monotone_ok = true;
    let mut prev: Option<u64> = None;

    for &p in table {
        total_revenue += p as u128;
        if prev.is_some_and(|q| p < q) {
            monotone_ok = false;
        }
        prev = Some(p);
    }

    TableReport {
        entries: table.len(),
        min_price: table.iter().copied().min(),
        max_price: table.iter().copied().max(),
        total_revenue,
        monotone_ok,
    }
}
