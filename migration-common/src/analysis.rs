//! Trajectory statistics over the flat position log.
//!
//! Positions in the log are wrapped into the toroidal domain, so a cell that
//! leaves through one edge reappears at the opposite one. Displacements are
//! measured on unwrapped trajectories: consecutive samples are joined through
//! the minimum image, which is exact as long as a cell moves less than half
//! the domain width per generation.

use std::collections::BTreeMap;

use crate::ecm::PositionRecord;
use crate::vecmath::OrderedPair;

/// `(time, position)` samples of one cell, in time order.
pub type Trajectory = Vec<(f64, OrderedPair)>;

/// Splits the flat log into one time-ordered trajectory per cell label.
pub fn trajectories_by_cell(log: &[PositionRecord]) -> BTreeMap<u32, Trajectory> {
    let mut by_cell: BTreeMap<u32, Trajectory> = BTreeMap::new();
    for record in log {
        by_cell.entry(record.label).or_default().push((record.time, record.position()));
    }
    for trajectory in by_cell.values_mut() {
        trajectory.sort_by(|a, b| a.0.total_cmp(&b.0));
    }
    by_cell
}

/// Removes the jumps introduced by wrapping positions into `[0, width)`.
pub fn unwrap_trajectory(trajectory: &[(f64, OrderedPair)], width: f64) -> Trajectory {
    let mut unwrapped = Vec::with_capacity(trajectory.len());
    let Some(&(t0, first)) = trajectory.first() else {
        return unwrapped;
    };
    unwrapped.push((t0, first));

    let mut current = first;
    for pair in trajectory.windows(2) {
        let (_, previous) = pair[0];
        let (t, next) = pair[1];
        let step = OrderedPair::new(
            minimum_image(next.x - previous.x, width),
            minimum_image(next.y - previous.y, width),
        );
        current = current.add(step);
        unwrapped.push((t, current));
    }
    unwrapped
}

fn minimum_image(delta: f64, width: f64) -> f64 {
    delta - width * (delta / width).round()
}

/// Mean squared displacement from the initial position, averaged over every
/// cell, for each time point of the log.
pub fn mean_squared_displacement(log: &[PositionRecord], width: f64) -> Vec<(f64, f64)> {
    let trajectories: Vec<Trajectory> = trajectories_by_cell(log)
        .values()
        .map(|t| unwrap_trajectory(t, width))
        .collect();

    // Keyed by the exact time bits so that all cells of one generation share a bucket.
    let mut sums: BTreeMap<u64, (f64, f64, usize)> = BTreeMap::new();
    for trajectory in &trajectories {
        let Some(&(_, origin)) = trajectory.first() else { continue };
        for &(t, p) in trajectory {
            let entry = sums.entry(t.to_bits()).or_insert((t, 0.0, 0));
            entry.1 += p.sub(origin).magnitude_squared();
            entry.2 += 1;
        }
    }

    let mut msd: Vec<(f64, f64)> = sums
        .into_values()
        .map(|(t, sum, n)| (t, sum / n as f64))
        .collect();
    msd.sort_by(|a, b| a.0.total_cmp(&b.0));
    msd
}
