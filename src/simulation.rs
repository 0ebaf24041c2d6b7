use log::{debug, info, trace};
use migration_common::{Ecm, PositionRecord, SimError, SimParams, SimulationConfig};
use rayon::prelude::*;
use std::time::Instant;

use crate::cell::update_cell;
use crate::fibre::update_fibre;
use crate::initialization::initialize;
use crate::random::{RandomSource, SeededRandom};
use crate::spatial::nearest_cell;

/// Seconds between progress reports while running.
const PROGRESS_INTERVAL_SECS: f64 = 5.0;

/// The outcome of a run: every generation in order, starting with the initial
/// state, and one position row per cell per generation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRun {
    pub generations: Vec<Ecm>,
    pub position_log: Vec<PositionRecord>,
}

impl SimulationRun {
    /// Starts a run at `t = 0` from `initial`.
    pub fn starting_from(initial: Ecm) -> Self {
        let mut run = Self {
            generations: Vec::new(),
            position_log: Vec::new(),
        };
        run.record(0.0, initial);
        run
    }

    /// The most recent generation.
    pub fn latest(&self) -> Option<&Ecm> {
        self.generations.last()
    }

    fn record(&mut self, time: f64, ecm: Ecm) {
        self.position_log
            .extend(ecm.cells.iter().map(|cell| PositionRecord::of_cell(time, cell)));
        self.generations.push(ecm);
    }
}

/// Produces the next generation from `previous`.
///
/// Every fibre of the copy is first rotated by its nearest cell when that
/// cell's center is within the interaction threshold. Fibre updates draw no
/// random numbers and only read cells, so they run in parallel. Cells then
/// update in order against the fibres as they now stand.
pub fn advance_generation<R: RandomSource>(
    previous: &Ecm,
    params: &SimParams,
    rng: &mut R,
) -> Result<Ecm, SimError> {
    let mut next = previous.clone();
    let matrix = next.matrix;
    let threshold = params.interaction_threshold;

    let cells = &next.cells;
    let rotated = next
        .fibres
        .par_iter_mut()
        .map(|fibre| match nearest_cell(fibre, cells) {
            Some(cell) if fibre.position.distance(cell.position) <= threshold => {
                update_fibre(fibre, cell, matrix.stiffness).map(|_| 1usize)
            }
            _ => Ok(0),
        })
        .try_reduce(|| 0, |a, b| Ok(a + b))?;

    for cell in next.cells.iter_mut() {
        update_cell(cell, &next.fibres, &matrix, params, rng)?;
    }

    debug!(
        "Generation advanced: {} of {} fibres rotated, {} cells moved",
        rotated,
        next.fibres.len(),
        next.cells.len()
    );
    Ok(next)
}

/// Runs `num_generations` generations from `initial`.
///
/// The result holds `num_generations + 1` states; generation `g` is logged at
/// time `g · time_step`.
pub fn simulate<R: RandomSource>(
    initial: Ecm,
    num_generations: u32,
    params: &SimParams,
    rng: &mut R,
) -> Result<SimulationRun, SimError> {
    initial.ensure_populated()?;

    let mut run = SimulationRun::starting_from(initial);
    for g in 1..=num_generations {
        let next = match run.latest() {
            Some(previous) => advance_generation(previous, params, rng)?,
            None => return Err(SimError::EmptyPopulation("run has no initial generation".into())),
        };
        run.record(g as f64 * params.time_step, next);
    }
    Ok(run)
}

/// Stateful driver for one seeded run built from a configuration.
pub struct MigrationSimulation {
    config: SimulationConfig,
    params: SimParams,
    rng: SeededRandom,
    run: SimulationRun,
    current_generation: u32,
}

impl MigrationSimulation {
    /// Seeds the random source from the configuration and builds generation 0.
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        let params = config.get_sim_params();
        let mut rng = SeededRandom::new(config.initial_conditions.seed);
        let initial = initialize(&config, &mut rng)?;

        info!(
            "Initialized ECM: width {}, stiffness {}, {} fibres, {} cells (seed {})",
            initial.matrix.width,
            initial.matrix.stiffness,
            initial.fibres.len(),
            initial.cells.len(),
            config.initial_conditions.seed
        );
        debug!("Simulation parameters: {:#?}", params);

        Ok(Self {
            config,
            params,
            rng,
            run: SimulationRun::starting_from(initial),
            current_generation: 0,
        })
    }

    /// Advances the run by one generation.
    pub fn step(&mut self) -> Result<(), SimError> {
        let next = match self.run.latest() {
            Some(previous) => advance_generation(previous, &self.params, &mut self.rng)?,
            None => return Err(SimError::EmptyPopulation("run has no initial generation".into())),
        };
        self.current_generation += 1;
        self.run.record(self.current_time(), next);
        Ok(())
    }

    /// Steps until the configured number of generations has been produced.
    pub fn run(&mut self) -> Result<(), SimError> {
        let total = self.params.num_generations;
        info!("Starting simulation loop for {} generations...", total);

        let start_time = Instant::now();
        let mut previous_report = start_time;
        while self.current_generation < total {
            let step_start = Instant::now();
            self.step()?;
            trace!(
                "Generation {} computed in {:.3} ms",
                self.current_generation,
                step_start.elapsed().as_secs_f64() * 1000.0
            );

            let now = Instant::now();
            if now.duration_since(previous_report).as_secs_f64() >= PROGRESS_INTERVAL_SECS
                || self.current_generation == total
            {
                info!(
                    "Generation {}/{} (t = {:.2}) | Elapsed: {:.2}s",
                    self.current_generation,
                    total,
                    self.current_time(),
                    now.duration_since(start_time).as_secs_f64()
                );
                previous_report = now;
            }
        }
        Ok(())
    }

    pub fn current_generation(&self) -> u32 {
        self.current_generation
    }

    /// Simulated time of the latest generation.
    pub fn current_time(&self) -> f64 {
        self.current_generation as f64 * self.params.time_step
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn generations(&self) -> &[Ecm] {
        &self.run.generations
    }

    pub fn position_log(&self) -> &[PositionRecord] {
        &self.run.position_log
    }

    /// Consumes the driver, handing back the accumulated run.
    pub fn into_run(self) -> SimulationRun {
        self.run
    }
}
