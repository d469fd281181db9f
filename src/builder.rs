//! Curve templates and continuity repair

use serde::{Deserialize, Serialize};

use crate::bezier::{CurveData, Point, Segment};

/// Named shapes that have a Bezier template
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedCurve {
    /// Straight ramp
    Linear,
    /// Convex, slow start and steep finish
    Exponential,
    /// Concave, steep start and flat finish
    Logarithmic,
}

fn single(segment: Segment, min_price: i64, max_price: i64) -> CurveData {
    CurveData {
        segments: vec![segment],
        min_price,
        max_price,
    }
}

fn rebuilt(curve: &CurveData, segments: Vec<Segment>) -> CurveData {
    CurveData {
        segments,
        min_price: curve.min_price,
        max_price: curve.max_price,
    }
}

/// Single-segment S-curve `(0,0) → (0.2,0) → (0.8,1) → (1,1)`.
pub fn default_s_curve(min_price: i64, max_price: i64) -> CurveData {
    single(
        Segment::new(
            Point::new(0.0, 0.0),
            Point::new(0.2, 0.0),
            Point::new(0.8, 1.0),
            Point::new(1.0, 1.0),
        ),
        min_price,
        max_price,
    )
}

/// Hand-tuned single-segment template for a named shape.
///
/// These are visual analogues for editing. They are not fitted to the
/// closed-form formulas of the same name and do not price the same.
pub fn from_named_curve(kind: NamedCurve, min_price: i64, max_price: i64) -> CurveData {
    let (p1, p2) = match kind {
        NamedCurve::Linear => (Point::new(1.0 / 3.0, 1.0 / 3.0), Point::new(2.0 / 3.0, 2.0 / 3.0)),
        NamedCurve::Exponential => (Point::new(0.5, 0.05), Point::new(0.8, 0.3)),
        NamedCurve::Logarithmic => (Point::new(0.2, 0.7), Point::new(0.5, 0.95)),
    };
    single(
        Segment::new(Point::new(0.0, 0.0), p1, p2, Point::new(1.0, 1.0)),
        min_price,
        max_price,
    )
}

/// Forces `p0` of every segment after the first onto the previous `p3`.
///
/// Handles and end points are left alone, so the shape can change.
pub fn connect_segments(mut segments: Vec<Segment>) -> Vec<Segment> {
    for i in 1..segments.len() {
        segments[i].p0 = segments[i - 1].p3;
    }
    segments
}

/// Returns a copy of `curve` with continuous segments.
pub fn connect(curve: &CurveData) -> CurveData {
    rebuilt(curve, connect_segments(curve.segments.clone()))
}

/// Returns a copy of `curve` with `segment` inserted at `index`, reconnected.
///
/// `index` past the end appends.
pub fn insert_segment(curve: &CurveData, index: usize, segment: Segment) -> CurveData {
    let mut segments = curve.segments.clone();
    segments.insert(index.min(segments.len()), segment);
    rebuilt(curve, connect_segments(segments))
}

/// Returns a copy of `curve` without the segment at `index`, reconnected.
///
/// An out-of-range index leaves the segments unchanged apart from reconnection.
pub fn remove_segment(curve: &CurveData, index: usize) -> CurveData {
    let mut segments = curve.segments.clone();
    if index < segments.len() {
        segments.remove(index);
    }
    rebuilt(curve, connect_segments(segments))
}
