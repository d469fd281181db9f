//! Visualization utilities for generating charts

use crate::pricing::{PriceCurve, SamplePoint};
use anyhow::Result;
use plotters::prelude::*;
use rust_decimal::prelude::ToPrimitive;

/// Generates a price vs supply chart from sampled points
pub fn plot_price_vs_supply(points: &[SamplePoint], out_path: &str) -> Result<()> {
    let root = BitMapBackend::new(out_path, (1200, 700)).into_drawing_area();
    root.fill(&WHITE)?;
    let data: Vec<(f64, f64)> = points
        .iter()
        .map(|p| (p.supply as f64, p.price.to_f64().unwrap_or(0.0)))
        .collect();
    let x_max = data.last().map(|(x, _)| *x).unwrap_or(1.0).max(1.0);
    let y_max = data.iter().map(|(_, y)| *y).fold(0.0, f64::max).max(1e-12);
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption("Mint Price vs Supply", ("sans-serif", 28))
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..x_max, 0.0..(y_max * 1.05))?;
    chart.configure_mesh().draw()?;
    chart.draw_series(LineSeries::new(data, &BLACK))?;
    root.present()?;
    Ok(())
}

/// Generates a cumulative revenue chart over every edition up to `max_supply`
pub fn plot_revenue_vs_supply<C: PriceCurve>(c: &C, max_supply: u64, out_path: &str) -> Result<()> {
    let root = BitMapBackend::new(out_path, (1200, 700)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut revenue = 0.0_f64;
    let mut data: Vec<(f64, f64)> = Vec::with_capacity(max_supply as usize + 1);
    data.push((0.0, 0.0));
    for s in 0..max_supply {
        revenue += c.price_at(s).to_f64().unwrap_or(0.0);
        data.push(((s + 1) as f64, revenue));
    }
    let x_max = (max_supply as f64).max(1.0);
    let y_max = revenue.max(1e-12);
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(format!("Cumulative Revenue ({})", c.name()), ("sans-serif", 28))
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..x_max, 0.0..(y_max * 1.05))?;
    chart.configure_mesh().draw()?;
    chart.draw_series(LineSeries::new(data, &BLACK))?;
    root.present()?;
    Ok(())
}
