use serde::{Deserialize, Serialize};

/// Run parameters derived from the configuration, read on every generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimParams {
    // Time
    pub time_step: f64,
    pub num_generations: u32,

    // Interaction
    pub interaction_threshold: f64, // Center-to-center reach of a cell
    pub drag_noise_amplitude: f64,  // Half-width of the drag noise interval
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            time_step: 1.0,
            num_generations: 1,
            interaction_threshold: 40.0,
            drag_noise_amplitude: 1.0,
        }
    }
}
