use log::debug;
use migration_common::ecm::ensure_population;
use migration_common::{Cell, Ecm, Fibre, OrderedPair, SimError, SimulationConfig};

use crate::random::RandomSource;

/// Builds the initial matrix described by `config`.
///
/// Fibres get a normally distributed length, a uniform position over the whole
/// domain and a random unit direction. Cells share the configured constants,
/// are placed uniformly inside an inset margin and get a random unit polarity
/// and a label counting from 1.
pub fn initialize<R: RandomSource>(config: &SimulationConfig, rng: &mut R) -> Result<Ecm, SimError> {
    ensure_population(
        config.population.num_fibres as usize,
        config.population.num_cells as usize,
    )?;
    config.validate()?;

    let matrix = config.matrix_properties();
    let fibres = initialize_fibres(config, rng)?;
    let cells = initialize_cells(config, rng);

    debug!(
        "Initialized matrix of width {} with {} fibres and {} cells",
        matrix.width,
        fibres.len(),
        cells.len()
    );
    Ok(Ecm::new(matrix, fibres, cells))
}

fn initialize_fibres<R: RandomSource>(config: &SimulationConfig, rng: &mut R) -> Result<Vec<Fibre>, SimError> {
    let width = config.matrix.width;
    let params = &config.fibre_params;

    (0..config.population.num_fibres)
        .map(|i| {
            let length = params.mean_length + params.length_sd * rng.standard_normal();
            if !(length > 0.0) {
                return Err(SimError::InvalidGeometry(format!(
                    "fibre {} drew non-positive length {}",
                    i, length
                )));
            }
            let position = OrderedPair::new(rng.uniform() * width, rng.uniform() * width);
            let direction = random_unit_vector(rng);
            Ok(Fibre::new(length, params.width, position, direction))
        })
        .collect()
}

fn initialize_cells<R: RandomSource>(config: &SimulationConfig, rng: &mut R) -> Vec<Cell> {
    let width = config.matrix.width;
    let params = &config.cell_params;
    let inset = width * params.placement_margin;
    let span = width * (1.0 - 2.0 * params.placement_margin);

    (1..=config.population.num_cells)
        .map(|label| {
            let position = OrderedPair::new(inset + rng.uniform() * span, inset + rng.uniform() * span);
            let projection = random_unit_vector(rng);
            Cell::new(
                label,
                params.radius,
                params.height,
                params.integrin,
                params.viscosity,
                position,
                projection,
            )
        })
        .collect()
}

/// Unit vector with `x` uniform in `[-1, 1)` and `y = ±sqrt(1 - x²)`, the sign
/// of `y` chosen with equal probability.
pub fn random_unit_vector<R: RandomSource>(rng: &mut R) -> OrderedPair {
    let x = rng.uniform_symmetric();
    let sign = if rng.uniform() < 0.5 { 1.0 } else { -1.0 };
    OrderedPair::new(x, sign * (1.0 - x * x).max(0.0).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;
    use approx::assert_relative_eq;

    fn test_config(num_fibres: u32, num_cells: u32) -> SimulationConfig {
        SimulationConfig::from_toml_str(&format!(
            r#"
            [matrix]
            width = 500.0
            stiffness = 0.95
            cell_speed = 1.0

            [population]
            num_fibres = {}
            num_cells = {}

            [timing]
            num_generations = 5
            time_step = 1.0

            [initial_conditions]
            seed = 1

            [output]
            base_filename = "test"
            "#,
            num_fibres, num_cells
        ))
        .unwrap()
    }

    #[test]
    fn zero_fibres_or_cells_is_fatal() {
        let mut rng = SeededRandom::new(1);
        assert!(matches!(
            initialize(&test_config(0, 4), &mut rng),
            Err(SimError::EmptyPopulation(_))
        ));
        assert!(matches!(
            initialize(&test_config(40, 0), &mut rng),
            Err(SimError::EmptyPopulation(_))
        ));
    }

    #[test]
    fn population_matches_configuration() {
        let mut rng = SeededRandom::new(9);
        let ecm = initialize(&test_config(300, 12), &mut rng).unwrap();
        assert_eq!(ecm.fibres.len(), 300);
        assert_eq!(ecm.cells.len(), 12);

        let labels: Vec<u32> = ecm.cells.iter().map(|c| c.label).collect();
        assert_eq!(labels, (1..=12).collect::<Vec<_>>());

        for fibre in &ecm.fibres {
            assert!((0.0..500.0).contains(&fibre.position.x));
            assert!((0.0..500.0).contains(&fibre.position.y));
            assert_relative_eq!(fibre.direction.magnitude(), 1.0, epsilon = 1e-12);
            assert!(fibre.length > 40.0 && fibre.length < 110.0);
            assert_relative_eq!(fibre.width, 0.2);
        }
        for cell in &ecm.cells {
            assert!((62.5..437.5).contains(&cell.position.x));
            assert!((62.5..437.5).contains(&cell.position.y));
            assert_relative_eq!(cell.projection.magnitude(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(cell.integrin, 50.0);
            assert_relative_eq!(cell.shape_factor, migration_common::ecm::shape_factor(15.0, 2.6));
        }
    }

    #[test]
    fn same_seed_same_matrix() {
        let config = test_config(50, 3);
        let a = initialize(&config, &mut SeededRandom::new(77)).unwrap();
        let b = initialize(&config, &mut SeededRandom::new(77)).unwrap();
        let c = initialize(&config, &mut SeededRandom::new(78)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
