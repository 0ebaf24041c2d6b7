//! End-to-end tests of the generation engine through the public API.
//!
//! Covers:
//! - The reference fibre reorientation scenario
//! - Population checks at initialization and at the start of a run
//! - Reproducibility from a seed
//! - Domain and geometry invariants over whole runs

use approx::assert_relative_eq;
use ecm_migration::{initialize, simulate, update_cell, update_fibre, RandomSource, SeededRandom};
use migration_common::analysis::mean_squared_displacement;
use migration_common::{Cell, Ecm, Fibre, MatrixProperties, OrderedPair, SimError, SimParams, SimulationConfig};

/// Draws a fixed value from every stream.
struct ConstantRandom {
    uniform: f64,
    symmetric: f64,
    normal: f64,
}

impl RandomSource for ConstantRandom {
    fn uniform(&mut self) -> f64 {
        self.uniform
    }

    fn uniform_symmetric(&mut self) -> f64 {
        self.symmetric
    }

    fn standard_normal(&mut self) -> f64 {
        self.normal
    }
}

fn quiet() -> ConstantRandom {
    ConstantRandom { uniform: 0.0, symmetric: 0.0, normal: 0.0 }
}

fn config(num_fibres: u32, num_cells: u32, seed: u64) -> SimulationConfig {
    SimulationConfig::from_toml_str(&format!(
        r#"
        [matrix]
        width = 300.0
        stiffness = 0.95
        cell_speed = 1.0

        [population]
        num_fibres = {}
        num_cells = {}

        [timing]
        num_generations = 30
        time_step = 1.0

        [initial_conditions]
        seed = {}

        [output]
        base_filename = "integration"
        "#,
        num_fibres, num_cells, seed
    ))
    .expect("test configuration must parse")
}

fn seeded_run(seed: u64) -> ecm_migration::SimulationRun {
    let config = config(400, 10, seed);
    let mut rng = SeededRandom::new(seed);
    let initial = initialize(&config, &mut rng).unwrap();
    simulate(initial, config.timing.num_generations, &config.get_sim_params(), &mut rng).unwrap()
}

// ============================================================================
// Reference scenario
// ============================================================================

#[test]
fn test_reference_fibre_reorientation() {
    let mut fibre = Fibre::new(75.0, 0.2, OrderedPair::new(250.0, 250.0), OrderedPair::new(1.0, 0.0));
    let cell = Cell::new(1, 15.0, 2.6, 50.0, 100.0, OrderedPair::new(250.0, 260.0), OrderedPair::new(0.0, 1.0));

    update_fibre(&mut fibre, &cell, 0.95).unwrap();

    assert_relative_eq!(fibre.pivot.x, 287.5);
    assert_relative_eq!(fibre.pivot.y, 250.0);
    assert!(fibre.direction.is_finite());
    assert_relative_eq!(fibre.direction.magnitude(), 1.0, epsilon = 1e-12);
    // The free end swings toward the cell.
    assert!(fibre.direction.y > 0.0);
}

// ============================================================================
// Population checks
// ============================================================================

#[test]
fn test_initialize_rejects_empty_populations() {
    let mut rng = SeededRandom::new(0);
    let no_fibres = initialize(&config(0, 5, 0), &mut rng);
    assert!(matches!(no_fibres, Err(SimError::EmptyPopulation(_))));

    let no_cells = initialize(&config(100, 0, 0), &mut rng);
    assert!(matches!(no_cells, Err(SimError::EmptyPopulation(_))));
}

#[test]
fn test_simulate_rejects_empty_populations() {
    let matrix = MatrixProperties { width: 300.0, stiffness: 0.95, cell_speed: 1.0 };
    let empty = Ecm::new(matrix, Vec::new(), Vec::new());
    let result = simulate(empty, 5, &SimParams::default(), &mut quiet());
    assert!(matches!(result, Err(SimError::EmptyPopulation(_))));
}

// ============================================================================
// Reproducibility
// ============================================================================

#[test]
fn test_same_seed_gives_identical_runs() {
    let a = seeded_run(17);
    let b = seeded_run(17);
    assert_eq!(a.position_log, b.position_log);
    assert_eq!(a.generations, b.generations);
}

#[test]
fn test_different_seeds_diverge() {
    let a = seeded_run(17);
    let b = seeded_run(18);
    assert_ne!(a.position_log, b.position_log);
}

// ============================================================================
// Invariants over a run
// ============================================================================

#[test]
fn test_cells_stay_inside_the_domain() {
    let run = seeded_run(5);
    for record in &run.position_log {
        assert!((0.0..300.0).contains(&record.x), "x = {} escaped", record.x);
        assert!((0.0..300.0).contains(&record.y), "y = {} escaped", record.y);
    }
}

#[test]
fn test_fibre_geometry_is_conserved() {
    let run = seeded_run(11);
    let first = &run.generations[0];
    let last = run.generations.last().unwrap();

    assert_eq!(first.fibres.len(), last.fibres.len());
    for (before, after) in first.fibres.iter().zip(&last.fibres) {
        assert_eq!(before.length, after.length);
        assert_relative_eq!(after.direction.magnitude(), 1.0, epsilon = 1e-9);
    }
}

#[test]
fn test_labels_are_stable_across_generations() {
    let run = seeded_run(3);
    for generation in &run.generations {
        let labels: Vec<u32> = generation.cells.iter().map(|c| c.label).collect();
        assert_eq!(labels, (1..=10).collect::<Vec<_>>());
    }
}

#[test]
fn test_isolated_cell_keeps_its_polarity() {
    let matrix = MatrixProperties { width: 300.0, stiffness: 0.95, cell_speed: 1.0 };
    let fibres = vec![Fibre::new(75.0, 0.2, OrderedPair::new(10.0, 10.0), OrderedPair::new(0.0, 1.0))];
    let mut cell = Cell::new(1, 15.0, 2.6, 50.0, 100.0, OrderedPair::new(200.0, 200.0), OrderedPair::new(0.6, 0.8));

    let mut rng = ConstantRandom { uniform: 0.3, symmetric: 0.5, normal: 1.2 };
    update_cell(&mut cell, &fibres, &matrix, &SimParams::default(), &mut rng).unwrap();

    assert_eq!(cell.projection, OrderedPair::new(0.6, 0.8));
    assert!(cell.position.x > 200.0 && cell.position.y > 200.0);
}

#[test]
fn test_msd_starts_at_zero_and_is_non_negative() {
    let run = seeded_run(8);
    let msd = mean_squared_displacement(&run.position_log, 300.0);
    assert_eq!(msd.len(), 31);
    assert_eq!(msd[0], (0.0, 0.0));
    assert!(msd.iter().all(|&(_, value)| value >= 0.0));
    assert!(msd.last().unwrap().1 > 0.0);
}
