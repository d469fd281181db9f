//! Piecewise cubic Bezier price curves
//!
//! A curve lives in normalized space: x is `supply / max_supply`, y is the
//! position between `min_price` and `max_price`. Each segment is a parametric
//! cubic `B(t) = (Bx(t), By(t))`, so pricing a supply point means inverting
//! `Bx` first and reading `By` at the recovered parameter.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Significant digits kept when mapping a normalized y back into minor units.
pub const PRICE_SIGNIFICANT_DIGITS: u32 = 20;

/// A control point in normalized curve space
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Normalized supply coordinate
    pub x: f64,
    /// Normalized price coordinate
    pub y: f64,
}

impl Point {
    /// Creates a point from its coordinates
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One cubic piece of a piecewise price curve.
///
/// `p0` and `p3` lie on the curve; `p1` and `p2` are tangent handles.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start point (interpolated)
    pub p0: Point,
    /// First tangent handle
    pub p1: Point,
    /// Second tangent handle
    pub p2: Point,
    /// End point (interpolated)
    pub p3: Point,
}

impl Segment {
    /// Creates a segment from its four control points
    pub const fn new(p0: Point, p1: Point, p2: Point, p3: Point) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Control points in order `p0..=p3`
    pub fn points(&self) -> [Point; 4] {
        [self.p0, self.p1, self.p2, self.p3]
    }

    /// Closed x-range spanned by the interpolated endpoints
    pub fn x_range(&self) -> (f64, f64) {
        (self.p0.x.min(self.p3.x), self.p0.x.max(self.p3.x))
    }

    /// Whether `x` falls inside [`Segment::x_range`]
    pub fn contains_x(&self, x: f64) -> bool {
        let (lo, hi) = self.x_range();
        lo <= x && x <= hi
    }

    /// Bx(t)
    pub fn x_at(&self, t: f64) -> f64 {
        cubic(self.p0.x, self.p1.x, self.p2.x, self.p3.x, t)
    }

    /// By(t)
    pub fn y_at(&self, t: f64) -> f64 {
        cubic(self.p0.y, self.p1.y, self.p2.y, self.p3.y, t)
    }

    /// Bx'(t)
    pub fn dx_dt(&self, t: f64) -> f64 {
        cubic_derivative(self.p0.x, self.p1.x, self.p2.x, self.p3.x, t)
    }
}

// B(t) = (1-t)³·a + 3(1-t)²t·b + 3(1-t)t²·c + t³·d
#[inline]
fn cubic(a: f64, b: f64, c: f64, d: f64, t: f64) -> f64 {
    let inv = 1.0 - t;
    let inv2 = inv * inv;
    let t2 = t * t;
    inv2 * inv * a + 3.0 * inv2 * t * b + 3.0 * inv * t2 * c + t2 * t * d
}

// B'(t) = 3(1-t)²(b-a) + 6(1-t)t(c-b) + 3t²(d-c)
#[inline]
fn cubic_derivative(a: f64, b: f64, c: f64, d: f64, t: f64) -> f64 {
    let inv = 1.0 - t;
    3.0 * inv * inv * (b - a) + 6.0 * inv * t * (c - b) + 3.0 * t * t * (d - c)
}

/// A normalized price curve together with the price bounds it maps onto.
///
/// Actual price is `min_price + y * (max_price - min_price)`, in minor units.
/// Bounds are signed so that an editor can hand over a broken curve and still
/// get every problem back from [`crate::validate::validate`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveData {
    /// Segments ordered by increasing x-range
    pub segments: Vec<Segment>,
    /// Price at normalized y = 0
    pub min_price: i64,
    /// Price at normalized y = 1
    pub max_price: i64,
}

impl CurveData {
    /// Segment whose x-range contains `x`, falling back to the last segment
    pub fn segment_for(&self, x: f64) -> Option<&Segment> {
        self.segments
            .iter()
            .find(|s| s.contains_x(x))
            .or_else(|| self.segments.last())
    }

    /// Width of the price band, `max_price - min_price`
    pub fn price_span(&self) -> Decimal {
        Decimal::from(self.max_price) - Decimal::from(self.min_price)
    }
}

/// Newton-Raphson settings used to invert `Bx(t)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NewtonConfig {
    /// Iteration cap
    pub max_iterations: u32,
    /// Stop once `|Bx(t) - x| < tolerance`
    pub tolerance: f64,
    /// Stop early when `|Bx'(t)|` drops below this
    pub min_derivative: f64,
    /// Starting parameter
    pub initial_t: f64,
}

impl NewtonConfig {
    /// 20 iterations from t = 0.5 with a 1e-4 tolerance
    pub const DEFAULT: Self = Self {
        max_iterations: 20,
        tolerance: 1e-4,
        min_derivative: 1e-4,
        initial_t: 0.5,
    };
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Outcome of inverting `Bx(t) = x` on one segment
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Inversion {
    /// Best parameter found
    pub t: f64,
    /// Whether the residual at `t` is within tolerance
    pub converged: bool,
    /// Newton steps taken
    pub iterations: u32,
}

/// Inverts `Bx(t) = target_x` with [`NewtonConfig::DEFAULT`].
pub fn invert_x(segment: &Segment, target_x: f64) -> Inversion {
    invert_x_with(segment, target_x, &NewtonConfig::DEFAULT)
}

/// Inverts `Bx(t) = target_x` by Newton-Raphson.
///
/// `t` is clamped back into [0, 1] after every step. A near-flat tangent stops
/// the iteration instead of dividing by it. Non-convergence is reported through
/// [`Inversion::converged`], never as an error: the lowest-residual `t` seen so
/// far is returned either way.
pub fn invert_x_with(segment: &Segment, target_x: f64, cfg: &NewtonConfig) -> Inversion {
    // Endpoints are exact roots; no iteration needed.
    if target_x == segment.p0.x {
        return Inversion { t: 0.0, converged: true, iterations: 0 };
    }
    if target_x == segment.p3.x {
        return Inversion { t: 1.0, converged: true, iterations: 0 };
    }

    let mut t = cfg.initial_t.clamp(0.0, 1.0);
    let mut best_t = t;
    let mut best_err = f64::INFINITY;

    for i in 0..cfg.max_iterations {
        let err = segment.x_at(t) - target_x;
        if err.abs() < best_err.abs() {
            best_t = t;
            best_err = err;
        }
        if err.abs() < cfg.tolerance {
            return Inversion { t, converged: true, iterations: i };
        }
        let slope = segment.dx_dt(t);
        if slope.abs() < cfg.min_derivative {
            tracing::trace!(t, slope, target_x, "flat tangent, stopping newton early");
            return Inversion { t: best_t, converged: false, iterations: i };
        }
        t = (t - err / slope).clamp(0.0, 1.0);
    }

    let err = segment.x_at(t) - target_x;
    if err.abs() < best_err.abs() {
        best_t = t;
        best_err = err;
    }
    let converged = best_err.abs() < cfg.tolerance;
    if !converged {
        tracing::trace!(best_t, residual = best_err, target_x, "newton hit iteration cap");
    }
    Inversion {
        t: best_t,
        converged,
        iterations: cfg.max_iterations,
    }
}

/// Normalized y of `curve` at `normalized_x`, along with the inversion report.
///
/// An empty curve evaluates to 0 with `converged == false`.
pub fn evaluate_detailed(curve: &CurveData, normalized_x: f64) -> (f64, Inversion) {
    let x = if normalized_x.is_nan() { 0.0 } else { normalized_x.clamp(0.0, 1.0) };
    match curve.segment_for(x) {
        Some(segment) => {
            let inv = invert_x(segment, x);
            (segment.y_at(inv.t), inv)
        }
        None => (
            0.0,
            Inversion {
                t: 0.0,
                converged: false,
                iterations: 0,
            },
        ),
    }
}

/// Normalized y of `curve` at `normalized_x` (clamped into [0, 1]).
pub fn evaluate(curve: &CurveData, normalized_x: f64) -> f64 {
    evaluate_detailed(curve, normalized_x).0
}

/// Rounds a price to a whole minor unit, midpoint away from zero.
///
/// Shared by quotes and the price table so both charge the same amount.
pub fn round_to_minor_unit(price: Decimal) -> Decimal {
    price.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Price in minor units after `current_supply` of `max_supply` editions.
///
/// The affine map into `[min_price, max_price]` runs in `Decimal` and is
/// truncated toward zero at [`PRICE_SIGNIFICANT_DIGITS`].
pub fn calculate_price(current_supply: u64, max_supply: u64, curve: &CurveData) -> Decimal {
    let x = if max_supply == 0 {
        0.0
    } else {
        current_supply as f64 / max_supply as f64
    };
    let y = Decimal::from_f64(evaluate(curve, x)).unwrap_or(Decimal::ZERO);
    let min = Decimal::from(curve.min_price);
    let price = y
        .checked_mul(curve.price_span())
        .and_then(|scaled| scaled.checked_add(min))
        .unwrap_or(min);
    price
        .round_sf_with_strategy(PRICE_SIGNIFICANT_DIGITS, RoundingStrategy::ToZero)
        .unwrap_or(price)
}
