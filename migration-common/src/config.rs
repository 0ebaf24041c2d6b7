use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ecm::MatrixProperties;
use crate::error::SimError;
use crate::sim_params::SimParams;

// Properties of the matrix itself
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct MatrixConfig {
    pub width: f64,
    pub stiffness: f64,
    pub cell_speed: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PopulationConfig {
    pub num_fibres: u32,
    pub num_cells: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TimingConfig {
    pub num_generations: u32,
    pub time_step: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct InitialConditions {
    pub seed: u64,
}

// Per-cell constants, identical for every cell of a run
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CellParamsConfig {
    #[serde(default = "default_cell_radius")]
    pub radius: f64,
    #[serde(default = "default_cell_height")]
    pub height: f64,
    #[serde(default = "default_integrin")]
    pub integrin: f64, // Percentage, 0-100
    #[serde(default = "default_viscosity")]
    pub viscosity: f64,
    /// Fraction of the width kept free of cells on every side at placement.
    #[serde(default = "default_placement_margin")]
    pub placement_margin: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct FibreParamsConfig {
    #[serde(default = "default_fibre_mean_length")]
    pub mean_length: f64,
    #[serde(default = "default_fibre_length_sd")]
    pub length_sd: f64,
    #[serde(default = "default_fibre_width")]
    pub width: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct InteractionConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_drag_noise_amplitude")]
    pub drag_noise_amplitude: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    pub base_filename: String,
    #[serde(default = "default_true")]
    pub save_positions: bool,
    #[serde(default = "default_true")]
    pub save_generations: bool,
    #[serde(default = "default_true")]
    pub save_msd: bool,
    pub format: Option<String>, // Generation file format: "bincode", "json", "messagepack"
}

/// Main simulation configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SimulationConfig {
    pub matrix: MatrixConfig,
    pub population: PopulationConfig,
    pub timing: TimingConfig,
    pub initial_conditions: InitialConditions,
    #[serde(default)]
    pub cell_params: CellParamsConfig,
    #[serde(default)]
    pub fibre_params: FibreParamsConfig,
    #[serde(default)]
    pub interaction: InteractionConfig,
    pub output: OutputConfig,
}

impl Default for CellParamsConfig {
    fn default() -> Self {
        CellParamsConfig {
            radius: default_cell_radius(),
            height: default_cell_height(),
            integrin: default_integrin(),
            viscosity: default_viscosity(),
            placement_margin: default_placement_margin(),
        }
    }
}

impl Default for FibreParamsConfig {
    fn default() -> Self {
        FibreParamsConfig {
            mean_length: default_fibre_mean_length(),
            length_sd: default_fibre_length_sd(),
            width: default_fibre_width(),
        }
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        InteractionConfig {
            threshold: default_threshold(),
            drag_noise_amplitude: default_drag_noise_amplitude(),
        }
    }
}

impl SimulationConfig {
    /// Loads and validates the simulation configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .with_context(|| format!("Failed to read config file '{}'", path_ref.display()))?;
        let config = Self::from_toml_str(&config_str)
            .with_context(|| format!("Invalid configuration in '{}'", path_ref.display()))?;

        Ok(config)
    }

    /// Parses and validates a configuration held in memory.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(config_str).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every value against its domain.
    pub fn validate(&self) -> Result<(), SimError> {
        let invalid = |msg: String| Err(SimError::InvalidParameter(msg));

        let m = &self.matrix;
        if !(m.width > 0.0 && m.width.is_finite()) {
            return invalid(format!("matrix width must be positive, got {}", m.width));
        }
        if !(0.0..=1.0).contains(&m.stiffness) {
            return invalid(format!("stiffness must lie in [0, 1], got {}", m.stiffness));
        }
        if !(m.cell_speed > 0.0 && m.cell_speed.is_finite()) {
            return invalid(format!("cell_speed must be positive, got {}", m.cell_speed));
        }
        if !(self.timing.time_step > 0.0 && self.timing.time_step.is_finite()) {
            return invalid(format!("time_step must be positive, got {}", self.timing.time_step));
        }

        let c = &self.cell_params;
        if c.radius <= 0.0 || c.height <= 0.0 || c.viscosity <= 0.0 {
            return invalid("cell radius, height and viscosity must be positive".into());
        }
        if !(0.0..=100.0).contains(&c.integrin) {
            return invalid(format!("integrin is a percentage in [0, 100], got {}", c.integrin));
        }
        if !(0.0..0.5).contains(&c.placement_margin) {
            return invalid(format!("placement_margin must lie in [0, 0.5), got {}", c.placement_margin));
        }
        // |factor| <= 1 keeps asin(factor * D / d) inside its domain for every geometry.
        let factor = alignment_factor(c.integrin, m.stiffness);
        if !(-1.0..=1.0).contains(&factor) {
            return invalid(format!(
                "integrin {} with stiffness {} gives alignment factor {:.3} outside [-1, 1]",
                c.integrin, m.stiffness, factor
            ));
        }

        let f = &self.fibre_params;
        if f.mean_length <= 0.0 || f.length_sd < 0.0 || f.width <= 0.0 {
            return invalid("fibre mean_length and width must be positive, length_sd non-negative".into());
        }

        let i = &self.interaction;
        if !(i.threshold > 0.0) {
            return invalid(format!("interaction threshold must be positive, got {}", i.threshold));
        }
        if !(i.drag_noise_amplitude >= 0.0) {
            return invalid(format!(
                "drag_noise_amplitude must be non-negative, got {}",
                i.drag_noise_amplitude
            ));
        }

        Ok(())
    }

    /// Converts the configuration into the parameters read on every generation.
    pub fn get_sim_params(&self) -> SimParams {
        SimParams {
            time_step: self.timing.time_step,
            num_generations: self.timing.num_generations,
            interaction_threshold: self.interaction.threshold,
            drag_noise_amplitude: self.interaction.drag_noise_amplitude,
        }
    }

    pub fn matrix_properties(&self) -> MatrixProperties {
        MatrixProperties {
            width: self.matrix.width,
            stiffness: self.matrix.stiffness,
            cell_speed: self.matrix.cell_speed,
        }
    }
}

/// Fraction of the fibre-to-cell angle that survives one reorientation:
/// `1 - 0.1 · integrin · (1 - stiffness)`, integrin as a percentage.
pub fn alignment_factor(integrin: f64, stiffness: f64) -> f64 {
    1.0 - 0.1 * integrin * (1.0 - stiffness)
}

fn default_cell_radius() -> f64 {
    15.0 // micrometres
}

fn default_cell_height() -> f64 {
    2.6 // micrometres
}

fn default_integrin() -> f64 {
    50.0 // percent
}

fn default_viscosity() -> f64 {
    100.0 // poise
}

fn default_placement_margin() -> f64 {
    0.125
}

fn default_fibre_mean_length() -> f64 {
    75.0 // micrometres
}

fn default_fibre_length_sd() -> f64 {
    5.0
}

fn default_fibre_width() -> f64 {
    0.2 // 200 nm
}

fn default_threshold() -> f64 {
    40.0
}

fn default_drag_noise_amplitude() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}
