use anyhow::{anyhow, Result};
use migration_common::analysis::mean_squared_displacement;
use migration_common::{Ecm, PositionRecord};
use plotters::prelude::*;
use std::path::Path;

/// Mean squared displacement of the cells against the generation index.
pub fn msd_by_generation(generations: &[Ecm]) -> Vec<(f64, f64)> {
    let Some(first) = generations.first() else {
        return Vec::new();
    };
    let log: Vec<PositionRecord> = generations
        .iter()
        .enumerate()
        .flat_map(|(g, ecm)| ecm.cells.iter().map(move |cell| PositionRecord::of_cell(g as f64, cell)))
        .collect();
    mean_squared_displacement(&log, first.matrix.width)
}

/// Draws the MSD curve and its square root to a PNG.
pub fn plot_msd(path: &Path, msd: &[(f64, f64)]) -> Result<()> {
    let draw_err = |e: &dyn std::fmt::Display| anyhow!("Failed to draw MSD chart '{}': {}", path.display(), e);

    let t_max = msd.iter().map(|&(t, _)| t).fold(1.0_f64, f64::max);
    let y_max = msd.iter().map(|&(_, v)| v).fold(1.0_f64, f64::max);

    let root = BitMapBackend::new(path, (1200, 700)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| draw_err(&e))?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Mean squared displacement", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..t_max, 0.0..(y_max * 1.1))
        .map_err(|e| draw_err(&e))?;

    chart
        .configure_mesh()
        .x_desc("generation")
        .y_desc("MSD")
        .draw()
        .map_err(|e| draw_err(&e))?;

    chart
        .draw_series(LineSeries::new(msd.iter().copied(), &BLUE))
        .map_err(|e| draw_err(&e))?
        .label("MSD")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
    chart
        .draw_series(LineSeries::new(msd.iter().map(|&(t, v)| (t, v.sqrt())), &RED))
        .map_err(|e| draw_err(&e))?
        .label("RMSD")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| draw_err(&e))?;

    root.present().map_err(|e| draw_err(&e))?;
    Ok(())
}
