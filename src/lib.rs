//! Cell migration through a fibrous extracellular matrix.
//!
//! Cells reorient nearby fibres, fibres steer cell polarity, and both advance
//! together one generation at a time on a periodic square domain.

pub mod cell;
pub mod fibre;
pub mod initialization;
pub mod output;
pub mod random;
pub mod simulation;
pub mod spatial;

pub use cell::update_cell;
pub use fibre::update_fibre;
pub use initialization::initialize;
pub use random::{RandomSource, SeededRandom};
pub use simulation::{advance_generation, simulate, MigrationSimulation, SimulationRun};
pub use spatial::{nearby_entities, nearest_cell};
