use anyhow::{Context, Result};
use log::{info, warn};
use migration_common::analysis::mean_squared_displacement;
use migration_common::snapshot::write_generations;
use migration_common::{Ecm, OutputConfig, PositionRecord};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::simulation::SimulationRun;

/// Encodings available for the generation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationFormat {
    Bincode,
    Json,
    MessagePack,
}

impl GenerationFormat {
    /// Resolves the configured format name. Missing means bincode, which the
    /// visualizer reads; an unknown name falls back to bincode with a warning.
    pub fn from_config(format: Option<&str>) -> Self {
        match format {
            None | Some("bincode") => Self::Bincode,
            Some("json") => Self::Json,
            Some("messagepack") => Self::MessagePack,
            Some(other) => {
                warn!("Unknown output format: {}. Using bincode instead.", other);
                Self::Bincode
            }
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Bincode => "bin",
            Self::Json => "json",
            Self::MessagePack => "msgpack",
        }
    }
}

/// One row of the MSD table.
#[derive(Debug, Serialize)]
struct MsdRow {
    time: f64,
    msd: f64,
    rmsd: f64,
}

/// Writes the position log as CSV with a `time,label,x,y` header.
pub fn write_position_log<W: Write>(writer: W, log: &[PositionRecord]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in log {
        csv_writer.serialize(record).context("Failed to write position record")?;
    }
    csv_writer.flush().context("Failed to flush position log")?;
    Ok(())
}

/// Writes every generation in the requested encoding.
pub fn write_generation_file<W: Write>(mut writer: W, generations: &[Ecm], format: GenerationFormat) -> Result<()> {
    match format {
        GenerationFormat::Bincode => write_generations(writer, generations),
        GenerationFormat::Json => {
            serde_json::to_writer(&mut writer, generations).context("Error serializing generations to JSON")?;
            writer.flush().context("Failed to flush generation file")
        }
        GenerationFormat::MessagePack => {
            rmp_serde::encode::write(&mut writer, generations)
                .context("Error serializing generations to MessagePack")?;
            writer.flush().context("Failed to flush generation file")
        }
    }
}

/// Writes `(time, msd)` pairs as CSV with a `time,msd,rmsd` header.
pub fn write_msd<W: Write>(writer: W, msd: &[(f64, f64)]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for &(time, value) in msd {
        csv_writer
            .serialize(MsdRow { time, msd: value, rmsd: value.sqrt() })
            .context("Failed to write MSD row")?;
    }
    csv_writer.flush().context("Failed to flush MSD table")?;
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("Error creating output file '{}'", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Writes the outputs enabled in `output` next to `output.base_filename` and
/// returns the paths written.
pub fn save_outputs(output: &OutputConfig, run: &SimulationRun) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    let base = &output.base_filename;

    if output.save_positions {
        let path = PathBuf::from(format!("{}_positions.csv", base));
        write_position_log(create(&path)?, &run.position_log)
            .with_context(|| format!("Error writing position log to '{}'", path.display()))?;
        info!("Position log ({} rows) saved to {}", run.position_log.len(), path.display());
        written.push(path);
    } else {
        info!("Skipping position log as per config (save_positions is false).");
    }

    if output.save_generations {
        let format = GenerationFormat::from_config(output.format.as_deref());
        let path = PathBuf::from(format!("{}_generations.{}", base, format.extension()));
        write_generation_file(create(&path)?, &run.generations, format)
            .with_context(|| format!("Error writing generations to '{}'", path.display()))?;
        info!("{} generations saved to {} ({:?} format)", run.generations.len(), path.display(), format);
        written.push(path);
    } else {
        info!("Skipping generation file as per config (save_generations is false).");
    }

    if let (true, Some(initial)) = (output.save_msd, run.generations.first()) {
        let width = initial.matrix.width;
        let msd = mean_squared_displacement(&run.position_log, width);
        let path = PathBuf::from(format!("{}_msd.csv", base));
        write_msd(create(&path)?, &msd)
            .with_context(|| format!("Error writing MSD table to '{}'", path.display()))?;
        if let Some(&(time, value)) = msd.last() {
            info!("Final MSD at t = {:.2}: {:.3} (RMSD {:.3})", time, value, value.sqrt());
        }
        written.push(path);
    }

    Ok(written)
}
