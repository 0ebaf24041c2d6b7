pub mod analysis;
pub mod config;
pub mod ecm;
pub mod error;
pub mod sim_params;
pub mod snapshot;
pub mod vecmath;

// Re-export key types for easier use by dependent crates
pub use config::{SimulationConfig, MatrixConfig, PopulationConfig, TimingConfig, InitialConditions, CellParamsConfig, FibreParamsConfig, InteractionConfig, OutputConfig, alignment_factor};
pub use ecm::{Cell, Ecm, Fibre, MatrixProperties, PositionRecord};
pub use error::SimError;
pub use sim_params::SimParams;
pub use vecmath::{OrderedPair, distance_to_line, homogeneous_line, line_through};
