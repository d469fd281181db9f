use mintcurve::builder::{default_s_curve, from_named_curve, NamedCurve};
use mintcurve::pricing::{
    calculate_price, calculate_total_cost, generate_sample_points, PriceCurve, PricingConfig,
    PricingModel,
};
use mintcurve::plot::{plot_price_vs_supply, plot_revenue_vs_supply};
use mintcurve::table::{generate_for_config, TablePolicy, ACCOUNT_CAPACITY};
use mintcurve::validate::{inspect_table, validate_with, ValidationMode};

use anyhow::{anyhow, Result};
use clap::Parser;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[derive(Parser, Debug)]
#[command(
    name = "mintcurve",
    version,
    about = "Edition mint pricing: quotes, schedules and on-chain price tables"
)]
struct Args {
    /// quote | schedule | table | validate
    #[arg(long, default_value = "schedule")]
    mode: String,

    /// JSON pricing config; overrides the inline curve options below
    #[arg(long)]
    config: Option<String>,

    /// linear | exponential | logarithmic | s-curve | bezier-linear | bezier-exponential | bezier-logarithmic
    #[arg(long, default_value = "linear")]
    curve_type: String,
    #[arg(long, default_value_t = 500_000_000)]
    base_price: u64,
    #[arg(long, default_value_t = 10_000_000)]
    increment: u64,
    #[arg(long, default_value_t = 0.02)]
    growth_rate: f64,
    #[arg(long, default_value_t = 100_000_000)]
    scale: u64,
    #[arg(long, default_value_t = 100_000_000)]
    min_price: i64,
    #[arg(long, default_value_t = 10_000_000_000)]
    max_price: i64,
    #[arg(long, default_value_t = 100)]
    max_supply: u64,

    /// Editions already issued (quote mode)
    #[arg(long, default_value_t = 0)]
    supply: u64,
    /// Editions to buy (quote mode)
    #[arg(long, default_value_t = 1)]
    quantity: u64,
    /// Chart sample count
    #[arg(long, default_value_t = 50)]
    samples: usize,

    /// Entries per storage account
    #[arg(long, default_value_t = ACCOUNT_CAPACITY)]
    capacity: usize,
    /// Split oversized tables across accounts instead of failing
    #[arg(long, action = clap::ArgAction::SetTrue)]
    chunk: bool,
    #[arg(long, action = clap::ArgAction::SetTrue)]
    require_monotonic: bool,

    #[arg(long, default_value = "out")]
    out_dir: String,
    #[arg(long = "no-draw", action = clap::ArgAction::SetFalse, default_value_t = true)]
    draw: bool,
    #[arg(long, action = clap::ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Serialize)]
struct Row {
    supply: u64,
    price: Decimal,
    revenue_cum: Decimal,
}

fn build_config(args: &Args) -> Result<PricingConfig> {
    if let Some(path) = &args.config {
        return Ok(PricingConfig::load(path)?);
    }
    let (lo, hi) = (args.min_price, args.max_price);
    let model = match args.curve_type.as_str() {
        "linear" => PricingModel::Linear {
            base_price: args.base_price,
            increment: args.increment,
        },
        "exponential" => PricingModel::Exponential {
            base_price: args.base_price,
            growth_rate: args.growth_rate,
        },
        "logarithmic" => PricingModel::Logarithmic {
            base_price: args.base_price,
            scale: args.scale,
        },
        "s-curve" => PricingModel::Bezier { curve: default_s_curve(lo, hi) },
        "bezier-linear" => PricingModel::Bezier { curve: from_named_curve(NamedCurve::Linear, lo, hi) },
        "bezier-exponential" => PricingModel::Bezier {
            curve: from_named_curve(NamedCurve::Exponential, lo, hi),
        },
        "bezier-logarithmic" => PricingModel::Bezier {
            curve: from_named_curve(NamedCurve::Logarithmic, lo, hi),
        },
        t => return Err(anyhow!("unknown curve type: {}", t)),
    };
    Ok(PricingConfig {
        max_supply: args.max_supply,
        model,
    })
}

fn validate_inputs(args: &Args, config: &PricingConfig) -> Result<()> {
    if config.max_supply < 1 {
        return Err(anyhow!("max_supply must be ≥ 1 (got {})", config.max_supply));
    }
    if args.capacity < 1 {
        return Err(anyhow!("capacity must be ≥ 1 (got {})", args.capacity));
    }
    if let PricingModel::Exponential { growth_rate, .. } = config.model {
        if !growth_rate.is_finite() || growth_rate <= -1.0 {
            return Err(anyhow!("growth_rate must be finite and > -1 (got {})", growth_rate));
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    validate_inputs(&args, &config)?;

    match args.mode.as_str() {
        "quote" => run_quote(&args, &config),
        "schedule" => run_schedule(&args, &config),
        "table" => run_table(&args, &config),
        "validate" => run_validate(&args, &config),
        m => Err(anyhow!("unknown mode: {}", m)),
    }
}

fn run_quote(args: &Args, config: &PricingConfig) -> Result<()> {
    let price = calculate_price(args.supply, config);
    let total = calculate_total_cost(args.supply, args.quantity, config);
    println!("price={} total={}", price, total);
    if args.verbose {
        println!(
            "[{}] supply={} quantity={} max_supply={}",
            config.name(),
            args.supply,
            args.quantity,
            config.max_supply
        );
        if args.supply.saturating_add(args.quantity) > config.max_supply {
            println!("  warning: purchase runs past max supply");
        }
    }
    Ok(())
}

fn run_schedule(args: &Args, config: &PricingConfig) -> Result<()> {
    create_dir_all(&args.out_dir)?;
    write_schedule_csv(&args.out_dir, config)?;

    let points = generate_sample_points(config, args.samples);
    if args.verbose {
        println!(
            "[{}] max_supply={} samples={} total_revenue={}",
            config.name(),
            config.max_supply,
            points.len(),
            config.total_cost(0, config.max_supply)
        );
        for p in points.iter().take(5) {
            println!("  supply={} price={}", p.supply, p.price);
        }
    }
    if args.draw {
        plot_price_vs_supply(&points, &format!("{}/price_vs_supply.png", &args.out_dir))?;
        plot_revenue_vs_supply(
            config,
            config.max_supply,
            &format!("{}/revenue_vs_supply.png", &args.out_dir),
        )?;
    }
    Ok(())
}

fn write_schedule_csv(out_dir: &str, config: &PricingConfig) -> Result<()> {
    let file_path = format!("{}/schedule.csv", out_dir);
    let mut file = File::create(&file_path)?;

    // Write metadata header
    writeln!(file, "# Edition Mint Schedule")?;
    writeln!(file, "# Model: {}", config.name())?;
    writeln!(file, "# Max supply: {}", config.max_supply)?;

    let mut wtr = csv::Writer::from_writer(file);
    let mut revenue_cum = Decimal::ZERO;
    for supply in 0..config.max_supply {
        let price = config.price_at(supply);
        revenue_cum = revenue_cum.checked_add(price).unwrap_or(Decimal::MAX);
        wtr.serialize(Row {
            supply,
            price,
            revenue_cum,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

fn run_table(args: &Args, config: &PricingConfig) -> Result<()> {
    warn_if_invalid(args, config);
    let policy = if args.chunk {
        TablePolicy::chunked(args.capacity)
    } else {
        TablePolicy {
            capacity: args.capacity,
            ..TablePolicy::default()
        }
    };
    let table = generate_for_config(config, &policy)?;

    create_dir_all(&args.out_dir)?;
    let file = File::create(format!("{}/price_table.json", &args.out_dir))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, &table)?;
    out.flush()?;

    if args.verbose {
        let flat: Vec<u64> = table.iter().collect();
        let rep = inspect_table(&flat);
        println!(
            "[{}] entries={} chunks={} min={:?} max={:?} revenue={} monotone={}",
            config.name(),
            rep.entries,
            table.chunks.len(),
            rep.min_price,
            rep.max_price,
            rep.total_revenue,
            rep.monotone_ok
        );
    }
    Ok(())
}

fn warn_if_invalid(args: &Args, config: &PricingConfig) {
    if let PricingModel::Bezier { curve } = &config.model {
        let mode = ValidationMode {
            require_monotonic: args.require_monotonic,
        };
        for e in validate_with(curve, mode).errors {
            tracing::warn!(error = %e, "curve validation");
        }
    }
}

fn run_validate(args: &Args, config: &PricingConfig) -> Result<()> {
    let PricingModel::Bezier { curve } = &config.model else {
        println!("{}: closed-form model, nothing to validate", config.name());
        return Ok(());
    };
    let mode = ValidationMode {
        require_monotonic: args.require_monotonic,
    };
    let result = validate_with(curve, mode);
    if result.valid {
        println!("valid");
        return Ok(());
    }
    for e in &result.errors {
        println!("error: {}", e);
    }
    Err(anyhow!("curve failed validation with {} error(s)", result.errors.len()))
}
