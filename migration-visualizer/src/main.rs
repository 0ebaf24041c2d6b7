use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Builder;
use image::RgbaImage;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use log::{info, warn, LevelFilter};
use migration_common::snapshot::read_generations;
use migration_common::Ecm;
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::time::Instant;

mod animation;
mod plot;
mod render;

use animation::encode_gif;
use plot::{msd_by_generation, plot_msd};
use render::{draw_frame, generate_color_palette, parse_color, FrameStyle};

/// Command-line arguments for the visualizer
#[derive(Parser, Debug)]
#[command(author, version, about = "Renders an ECM migration run as an animated GIF", long_about = None)]
struct Args {
    /// Input generation file path (.bin)
    #[arg(short, long)]
    input: PathBuf,

    /// Output GIF file path
    #[arg(short, long, default_value = "ecm_migration.gif")]
    output: PathBuf,

    /// Side of the square output frames in pixels
    #[arg(long, default_value_t = 2000)]
    width: u32,

    /// Multiplier applied to the drawn cell radius
    #[arg(long, default_value_t = 1.0)]
    scaling_factor: f64,

    /// Render every n-th generation
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    frequency: u64,

    /// Time each frame is shown, in milliseconds
    #[arg(long, default_value_t = 100)]
    frame_delay_ms: u32,

    /// GIF encoder speed, 1 (best quality) to 30 (fastest)
    #[arg(long, default_value_t = 10)]
    gif_speed: i32,

    /// Cell color - use "palette" for a distinct color per cell, or a specific color name
    /// (black, white, red, green, blue, yellow, cyan, magenta, grey)
    #[arg(long, default_value = "palette")]
    color: String,

    /// Seed of the per-cell color palette
    #[arg(long, default_value_t = 0)]
    palette_seed: u64,

    /// Fibre color name
    #[arg(long, default_value = "black")]
    fibre_color: String,

    /// Background color name
    #[arg(long, default_value = "white")]
    bg_color: String,

    /// Optional PNG path for a plot of the mean squared displacement
    #[arg(long)]
    msd_plot: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    run_with_args(args)
}

fn run_with_args(args: Args) -> Result<()> {
    Builder::from_default_env().filter(None, LevelFilter::Info).init();

    info!("Starting ECM migration visualizer...");
    info!("Input file: {}", args.input.display());
    info!("Output GIF: {}", args.output.display());

    // --- Read Generations ---
    let input_file = File::open(&args.input)
        .with_context(|| format!("Failed to open input file: {}", args.input.display()))?;
    let generations = read_generations(BufReader::new(input_file))
        .with_context(|| format!("Failed to read generations from {}", args.input.display()))?;
    info!("Found {} generations in the file", generations.len());

    let Some(first) = generations.first() else {
        warn!("Input file contains no generations. Exiting.");
        return Ok(());
    };
    info!(
        "Matrix width {:.1}, {} fibres, {} cells",
        first.matrix.width,
        first.fibres.len(),
        first.cells.len()
    );

    // --- Set up Colors ---
    let max_label = first.cells.iter().map(|c| c.label).max().unwrap_or(1) as usize;
    let cell_colors = if args.color.eq_ignore_ascii_case("palette") {
        info!("Using color palette mode for cell coloring");
        generate_color_palette(max_label.max(1), args.palette_seed)
    } else {
        let single_color = parse_color(&args.color);
        info!("Using single color for all cells: {:?}", single_color);
        vec![single_color]
    };
    let style = FrameStyle {
        canvas_width: args.width,
        scaling_factor: args.scaling_factor,
        background: parse_color(&args.bg_color),
        fibre_color: parse_color(&args.fibre_color),
        cell_colors,
    };

    // --- Render Frames ---
    let selected: Vec<&Ecm> = generations.iter().step_by(args.frequency as usize).collect();
    info!(
        "Rendering {} frames ({}x{} px, every {} generation(s))...",
        selected.len(),
        args.width,
        args.width,
        args.frequency
    );

    let progress_bar = ProgressBar::new(selected.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames ({percent}%) [{eta}]")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );

    let start_time = Instant::now();
    let frames: Vec<RgbaImage> = selected
        .par_iter()
        .progress_with(progress_bar.clone())
        .map(|ecm| draw_frame(ecm, &style))
        .collect();
    progress_bar.finish_with_message(format!("Rendered {} frames", frames.len()));
    info!("Rendered {} frames in {:.2}s", frames.len(), start_time.elapsed().as_secs_f64());

    // --- Encode GIF ---
    info!("Encoding GIF...");
    let output_file = File::create(&args.output)
        .with_context(|| format!("Failed to create output file: {}", args.output.display()))?;
    encode_gif(BufWriter::new(output_file), frames, args.frame_delay_ms, args.gif_speed)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!("GIF saved to {}", args.output.display());

    // --- MSD Plot ---
    if let Some(plot_path) = &args.msd_plot {
        let msd = msd_by_generation(&generations);
        plot_msd(plot_path, &msd)?;
        if let Some(&(g, value)) = msd.last() {
            info!("Final MSD at generation {}: {:.3} (RMSD {:.3})", g, value, value.sqrt());
        }
        info!("MSD plot saved to {}", plot_path.display());
    }

    info!("Visualization complete in {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(())
}
