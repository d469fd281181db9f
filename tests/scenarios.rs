use approx::assert_relative_eq;
use mintcurve::bezier::{self, evaluate, evaluate_detailed, invert_x_with, CurveData, NewtonConfig, Point, Segment};
use mintcurve::builder::{connect, default_s_curve, from_named_curve, insert_segment, remove_segment, NamedCurve};
use mintcurve::ledger::{EditionLedger, MintError};
use mintcurve::pricing::{
    calculate_price, calculate_total_cost, checked_linear_price, closed_form_price, generate_sample_points,
    PriceCurve, PricingConfig, PricingError, PricingModel,
};
use mintcurve::table::{generate, generate_for_config, generate_price_table, TableError, TablePolicy};
use mintcurve::validate::{inspect_table, validate, validate_with, ValidationMode};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

const MIN: i64 = 100_000_000;
const MAX: i64 = 10_000_000_000;

fn two_segment_curve() -> CurveData {
    CurveData {
        segments: vec![
            Segment::new(
                Point::new(0.0, 0.0),
                Point::new(0.2, 0.1),
                Point::new(0.4, 0.3),
                Point::new(0.5, 0.5),
            ),
            Segment::new(
                Point::new(0.5, 0.5),
                Point::new(0.6, 0.7),
                Point::new(0.8, 0.9),
                Point::new(1.0, 1.0),
            ),
        ],
        min_price: MIN,
        max_price: MAX,
    }
}

#[test]
fn linear_scenario() {
    let config = PricingConfig {
        max_supply: 1000,
        model: PricingModel::Linear {
            base_price: 500_000_000,
            increment: 10_000_000,
        },
    };
    assert_eq!(calculate_price(0, &config), Decimal::from(500_000_000u64));
    assert_eq!(calculate_price(10, &config), Decimal::from(600_000_000u64));
    assert_eq!(
        config.total_cost(0, 3),
        Decimal::from(500_000_000u64 + 510_000_000 + 520_000_000)
    );
}

#[test]
fn exponential_scenario() {
    let model = PricingModel::Exponential {
        base_price: 800_000_000,
        growth_rate: 0.02,
    };
    assert_eq!(closed_form_price(0, &model), Decimal::from(800_000_000u64));

    let p50 = closed_form_price(50, &model).to_f64().unwrap();
    let exact = 800_000_000.0 * 1.02f64.powi(50);
    assert!((p50 - exact).abs() <= 1.0, "p50={p50} exact={exact}");
    assert!(p50 > 2_100_000_000.0 && p50 < 2_200_000_000.0);
    // rounded down, never up
    assert!(p50 <= exact);
}

#[test]
fn logarithmic_starts_at_base_price() {
    let model = PricingModel::Logarithmic {
        base_price: 1_000,
        scale: 1_000_000,
    };
    assert_eq!(closed_form_price(0, &model), Decimal::from(1_000u64));
    // 1e6 * ln(2) = 693147.18...
    assert_eq!(closed_form_price(1, &model), Decimal::from(1_000u64 + 693_147));
}

#[test]
fn curve_model_has_no_closed_form() {
    let model = PricingModel::Bezier {
        curve: default_s_curve(MIN, MAX),
    };
    assert_eq!(closed_form_price(42, &model), Decimal::from(MIN));
    assert_eq!(model.base_price(), Decimal::from(MIN));
}

#[test]
fn checked_linear_price_reports_overflow() {
    assert_eq!(checked_linear_price(5, 2, 10), Ok(25));
    assert_eq!(
        checked_linear_price(u64::MAX, 1, 1),
        Err(PricingError::ArithmeticOverflow)
    );
    assert_eq!(
        checked_linear_price(0, u64::MAX, 2),
        Err(PricingError::ArithmeticOverflow)
    );
}

#[test]
fn linear_table_overflow_is_an_error() {
    let config = PricingConfig {
        max_supply: 3,
        model: PricingModel::Linear {
            base_price: u64::MAX - 5,
            increment: 10,
        },
    };
    assert_eq!(
        generate_for_config(&config, &TablePolicy::default()),
        Err(TableError::Pricing(PricingError::ArithmeticOverflow))
    );

    let fits = PricingConfig {
        max_supply: 1,
        ..config
    };
    let table = generate_for_config(&fits, &TablePolicy::default()).unwrap();
    assert_eq!(table.into_flat(), vec![u64::MAX - 5]);
}

#[test]
fn s_curve_scenario() {
    let curve = default_s_curve(MIN, MAX);
    assert_eq!(evaluate(&curve, 0.0), 0.0);
    assert_eq!(evaluate(&curve, 1.0), 1.0);
    let mid = evaluate(&curve, 0.5);
    assert!(mid > 0.0 && mid < 1.0);
    assert_relative_eq!(mid, 0.5, epsilon = 1e-3);
    // slow start, fast finish
    assert!(evaluate(&curve, 0.1) < 0.1);
    assert!(evaluate(&curve, 0.9) > 0.9);
}

#[test]
fn curve_price_maps_into_bounds() {
    let curve = default_s_curve(MIN, MAX);
    assert_eq!(bezier::calculate_price(0, 100, &curve), Decimal::from(MIN));
    assert_eq!(bezier::calculate_price(100, 100, &curve), Decimal::from(MAX));
    let mid = bezier::calculate_price(50, 100, &curve);
    assert!(mid > Decimal::from(MIN) && mid < Decimal::from(MAX));
    // zero max supply is treated as the start of the curve
    assert_eq!(bezier::calculate_price(7, 0, &curve), Decimal::from(MIN));
}

#[test]
fn flat_tangent_stops_without_converging() {
    // x is constant, so Bx' is zero everywhere
    let seg = Segment::new(
        Point::new(0.4, 0.0),
        Point::new(0.4, 0.3),
        Point::new(0.4, 0.6),
        Point::new(0.4, 1.0),
    );
    let inv = invert_x_with(&seg, 0.7, &NewtonConfig::DEFAULT);
    assert!(!inv.converged);
    assert_eq!(inv.iterations, 0);
    assert_eq!(inv.t, 0.5);
}

#[test]
fn iteration_cap_is_configurable() {
    let curve = default_s_curve(MIN, MAX);
    let cfg = NewtonConfig {
        max_iterations: 1,
        ..NewtonConfig::DEFAULT
    };
    let inv = invert_x_with(&curve.segments[0], 0.05, &cfg);
    assert_eq!(inv.iterations, 1);
    assert!(!inv.converged);

    let (_, full) = evaluate_detailed(&curve, 0.05);
    assert!(full.converged);
}

#[test]
fn empty_curve_evaluates_to_zero() {
    let curve = CurveData {
        segments: vec![],
        min_price: MIN,
        max_price: MAX,
    };
    let (y, inv) = evaluate_detailed(&curve, 0.5);
    assert_eq!(y, 0.0);
    assert!(!inv.converged);
}

#[test]
fn gap_falls_back_to_last_segment() {
    let mut curve = two_segment_curve();
    curve.segments[1].p0 = Point::new(0.6, 0.5);
    // 0.55 sits in the gap between 0.5 and 0.6
    let seg = curve.segment_for(0.55).unwrap();
    assert_eq!(seg, &curve.segments[1]);
}

#[test]
fn two_segment_table_scenario() {
    let curve = two_segment_curve();
    let table = generate_price_table(&curve, 100).unwrap();
    assert_eq!(table.len(), 100);
    assert!(table.windows(2).all(|w| w[0] <= w[1]), "table decreased: {table:?}");
    assert_eq!(table[99], MAX as u64);

    let rep = inspect_table(&table);
    assert!(rep.monotone_ok);
    assert_eq!(rep.entries, 100);
    assert_eq!(rep.max_price, Some(MAX as u64));
}

#[test]
fn capacity_overflow_fails_explicitly() {
    let curve = two_segment_curve();
    assert_eq!(
        generate_price_table(&curve, 5000),
        Err(TableError::CapacityExceeded {
            requested: 5000,
            capacity: 1000
        })
    );
    assert_eq!(generate_price_table(&curve, 0), Err(TableError::ZeroSupply));
}

#[test]
fn chunked_tables_split_across_accounts() {
    let curve = two_segment_curve();
    let table = generate(&curve, 2500, &TablePolicy::chunked(1000)).unwrap();
    let sizes: Vec<usize> = table.chunks.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![1000, 1000, 500]);
    assert_eq!(table.len(), 2500);

    let flat: Vec<u64> = table.iter().collect();
    assert_eq!(table.get(1500), Some(flat[1500]));
    assert_eq!(table.get(2500), None);
}

#[test]
fn negative_prices_are_not_representable() {
    let curve = CurveData {
        segments: default_s_curve(0, 1).segments,
        min_price: -10,
        max_price: 10,
    };
    match generate_price_table(&curve, 10) {
        Err(TableError::PriceOutOfRange { supply, .. }) => assert_eq!(supply, 1),
        other => panic!("expected PriceOutOfRange, got {other:?}"),
    }
}

#[test]
fn decreasing_tables_are_legal() {
    let curve = CurveData {
        segments: vec![Segment::new(
            Point::new(0.0, 1.0),
            Point::new(0.3, 0.75),
            Point::new(0.7, 0.25),
            Point::new(1.0, 0.0),
        )],
        min_price: 0,
        max_price: 1_000_000,
    };
    let table = generate_price_table(&curve, 50).unwrap();
    assert_eq!(table[49], 0);
    assert!(!inspect_table(&table).monotone_ok);
    assert!(validate(&curve).valid);
    assert!(!validate_with(&curve, ValidationMode { require_monotonic: true }).valid);
}

#[test]
fn strict_mode_rejects_drops_between_segments() {
    // each segment rises on its own but the second starts below where the first ends
    let curve = CurveData {
        segments: vec![
            Segment::new(
                Point::new(0.0, 0.1),
                Point::new(0.2, 0.3),
                Point::new(0.4, 0.6),
                Point::new(0.5, 0.9),
            ),
            Segment::new(
                Point::new(0.5, 0.1),
                Point::new(0.6, 0.4),
                Point::new(0.8, 0.7),
                Point::new(1.0, 1.0),
            ),
        ],
        min_price: MIN,
        max_price: MAX,
    };
    assert!(validate(&curve).valid);

    let strict = validate_with(&curve, ValidationMode { require_monotonic: true });
    assert!(!strict.valid);
    assert_eq!(strict.errors.len(), 1, "{:?}", strict.errors);
    assert!(strict.errors[0].starts_with("segments 0 and 1:"), "{}", strict.errors[0]);

    let table = generate_price_table(&curve, 100).unwrap();
    assert!(!inspect_table(&table).monotone_ok);

    assert!(validate_with(&two_segment_curve(), ValidationMode { require_monotonic: true }).valid);
}

#[test]
fn closed_form_tables_start_at_base_price() {
    let config = PricingConfig {
        max_supply: 5,
        model: PricingModel::Linear {
            base_price: 100,
            increment: 10,
        },
    };
    let table = generate_for_config(&config, &TablePolicy::default()).unwrap();
    assert_eq!(table.into_flat(), vec![100, 110, 120, 130, 140]);
}

#[test]
fn named_templates_are_monotone_and_distinct() {
    let strict = ValidationMode {
        require_monotonic: true,
    };
    for kind in [NamedCurve::Linear, NamedCurve::Exponential, NamedCurve::Logarithmic] {
        let curve = from_named_curve(kind, MIN, MAX);
        let res = validate_with(&curve, strict);
        assert!(res.valid, "{kind:?}: {:?}", res.errors);
    }
    let lin = evaluate(&from_named_curve(NamedCurve::Linear, MIN, MAX), 0.5);
    let exp = evaluate(&from_named_curve(NamedCurve::Exponential, MIN, MAX), 0.5);
    let log = evaluate(&from_named_curve(NamedCurve::Logarithmic, MIN, MAX), 0.5);
    assert_relative_eq!(lin, 0.5, epsilon = 1e-3);
    assert!(exp < lin && lin < log);
}

#[test]
fn validator_reports_every_fault() {
    let empty = CurveData {
        segments: vec![],
        min_price: 0,
        max_price: 10,
    };
    let res = validate(&empty);
    assert!(!res.valid);
    assert!(res.errors.iter().any(|e| e.contains("at least one segment")));

    let inverted = default_s_curve(500, 100);
    let res = validate(&inverted);
    assert!(!res.valid);
    assert!(res.errors.iter().any(|e| e.contains("maxPrice")));

    let negative = default_s_curve(-1, 100);
    let res = validate(&negative);
    assert!(res.errors.iter().any(|e| e.contains("minPrice must be >= 0")));

    let mut out_of_range = two_segment_curve();
    out_of_range.segments[1].p2 = Point::new(1.5, -0.25);
    let res = validate(&out_of_range);
    assert!(!res.valid);
    assert!(res.errors.iter().any(|e| e.contains("segment 1 point p2: x=1.5")));
    assert!(res.errors.iter().any(|e| e.contains("segment 1 point p2: y=-0.25")));

    // several faults at once are all reported
    let mut everything = CurveData {
        segments: vec![],
        min_price: -5,
        max_price: -10,
    };
    assert_eq!(validate(&everything).errors.len(), 3);
    everything.segments.push(Segment::new(
        Point::new(f64::NAN, 0.0),
        Point::new(0.2, 0.0),
        Point::new(0.8, 1.0),
        Point::new(1.0, 1.0),
    ));
    assert_eq!(validate(&everything).errors.len(), 3);
}

#[test]
fn validation_ignores_discontinuity_until_connected() {
    let mut curve = two_segment_curve();
    curve.segments[1].p0 = Point::new(0.6, 0.2);
    assert!(validate(&curve).valid);

    let fixed = connect(&curve);
    assert_eq!(fixed.segments[1].p0, fixed.segments[0].p3);
    assert_eq!(fixed.segments[1].p1, curve.segments[1].p1);
    // input curve is unchanged
    assert_eq!(curve.segments[1].p0, Point::new(0.6, 0.2));
}

#[test]
fn editing_keeps_segments_connected() {
    let curve = two_segment_curve();
    let extra = Segment::new(
        Point::new(0.9, 0.9),
        Point::new(0.92, 0.95),
        Point::new(0.97, 0.99),
        Point::new(1.0, 1.0),
    );
    let grown = insert_segment(&curve, 99, extra);
    assert_eq!(grown.segments.len(), 3);
    assert_eq!(grown.segments[2].p0, grown.segments[1].p3);

    let shrunk = remove_segment(&grown, 0);
    assert_eq!(shrunk.segments.len(), 2);
    assert_eq!(shrunk.segments[1].p0, shrunk.segments[0].p3);
    assert_eq!(shrunk.min_price, MIN);
}

#[test]
fn curve_quotes_match_the_price_table() {
    let curve = default_s_curve(MIN, MAX);
    for max_supply in [7u64, 100] {
        let config = PricingConfig {
            max_supply,
            model: PricingModel::Bezier { curve: curve.clone() },
        };
        let table = generate_price_table(&curve, max_supply).unwrap();
        let table_sum: u64 = table.iter().sum();
        assert_eq!(
            calculate_total_cost(1, max_supply, &config),
            Decimal::from(table_sum),
            "max_supply={max_supply}"
        );
        for (edition, &entry) in table.iter().enumerate() {
            let quote = calculate_price(edition as u64 + 1, &config);
            assert!(quote.fract().is_zero(), "fractional quote {quote}");
            assert_eq!(quote, Decimal::from(entry));
        }
    }
}

#[test]
fn sample_points_cover_the_supply_range() {
    let config = PricingConfig {
        max_supply: 100,
        model: PricingModel::Bezier {
            curve: default_s_curve(MIN, MAX),
        },
    };
    let supplies: Vec<u64> = generate_sample_points(&config, 5).iter().map(|p| p.supply).collect();
    assert_eq!(supplies, vec![0, 25, 50, 75, 100]);
    assert!(generate_sample_points(&config, 0).is_empty());
    assert_eq!(generate_sample_points(&config, 1).len(), 1);

    let small = PricingConfig {
        max_supply: 10,
        ..config.clone()
    };
    assert_eq!(generate_sample_points(&small, 1000).len(), 11);

    let pts = generate_sample_points(&config, 3);
    assert_eq!(pts[0].price, Decimal::from(MIN));
    assert_eq!(pts[2].price, Decimal::from(MAX));
}

#[test]
fn config_json_round_trips_through_camel_case() {
    let raw = r#"{
        "maxSupply": 250,
        "model": { "type": "exponential", "basePrice": 800000000, "growthRate": 0.02 }
    }"#;
    let config = PricingConfig::from_json(raw).unwrap();
    assert_eq!(config.max_supply, 250);
    assert_eq!(
        config.model,
        PricingModel::Exponential {
            base_price: 800_000_000,
            growth_rate: 0.02
        }
    );

    let curve_raw = r#"{
        "maxSupply": 10,
        "model": { "type": "bezier", "curve": {
            "segments": [ { "p0": {"x":0,"y":0}, "p1": {"x":0.2,"y":0}, "p2": {"x":0.8,"y":1}, "p3": {"x":1,"y":1} } ],
            "minPrice": 1, "maxPrice": 100
        } }
    }"#;
    let config = PricingConfig::from_json(curve_raw).unwrap();
    assert_eq!(
        config.model,
        PricingModel::Bezier {
            curve: default_s_curve(1, 100)
        }
    );

    let unknown = r#"{ "maxSupply": 1, "model": { "type": "sigmoid", "basePrice": 1 } }"#;
    assert!(PricingConfig::from_json(unknown).is_err());
}

#[test]
fn ledger_enforces_exact_payment() {
    let mut ledger = EditionLedger::new(vec![100, 110, 120]);
    assert_eq!(ledger.quote(), Ok(100));
    assert_eq!(
        ledger.mint(99),
        Err(MintError::PaymentMismatch {
            edition: 0,
            expected: 100,
            offered: 99
        })
    );
    assert_eq!(ledger.current_supply(), 0);

    let receipt = ledger.mint(100).unwrap();
    assert_eq!((receipt.edition, receipt.price, receipt.total_volume), (0, 100, 100));
    ledger.mint(110).unwrap();
    ledger.mint(120).unwrap();
    assert_eq!(ledger.total_volume(), 330);
    assert_eq!(ledger.remaining(), 0);
    assert_eq!(ledger.quote(), Err(MintError::MaxSupplyReached(3)));
    assert_eq!(ledger.mint(130), Err(MintError::MaxSupplyReached(3)));
    assert_eq!(ledger.close(), Err(MintError::CurveNotEmpty(3)));
}

#[test]
fn ledger_follows_generated_table() {
    let curve = two_segment_curve();
    let table = generate(&curve, 20, &TablePolicy::default()).unwrap();
    let expected: Vec<u64> = table.iter().collect();
    let mut ledger = EditionLedger::from_table(table);
    assert_eq!(ledger.max_supply(), 20);
    for price in expected {
        assert_eq!(ledger.quote(), Ok(price));
        ledger.mint(price).unwrap();
    }
    assert!(EditionLedger::new(vec![1, 2]).close().is_ok());
}

#[test]
fn ledger_volume_overflow_is_an_error() {
    let mut ledger = EditionLedger::new(vec![u64::MAX, 1]);
    ledger.mint(u64::MAX).unwrap();
    assert_eq!(ledger.mint(1), Err(MintError::ArithmeticOverflow));
    assert_eq!(ledger.current_supply(), 1);
}
