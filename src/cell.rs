//! Polarity and motion of a single cell.
//!
//! A cell first averages the mechanical signal of every fibre within reach
//! into a candidate polarity, then commits to the axis of a single fibre
//! (contact guidance), and finally moves along its polarity under a drag
//! force with a small isotropic perturbation.

use log::{trace, warn};
use migration_common::{Cell, Fibre, MatrixProperties, OrderedPair, SimError, SimParams};
use std::f64::consts::{FRAC_PI_2, PI};

use crate::random::RandomSource;
use crate::spatial::nearby_entities;

/// Advances `cell` by one time step among the (already updated) `fibres`.
pub fn update_cell<R: RandomSource>(
    cell: &mut Cell,
    fibres: &[Fibre],
    matrix: &MatrixProperties,
    params: &SimParams,
    rng: &mut R,
) -> Result<(), SimError> {
    let nearby = nearby_entities(cell.position, params.interaction_threshold, fibres);

    if !nearby.is_empty() {
        let candidate = net_projection(cell, &nearby, rng);
        if let Some(fibre) = most_deviating_fibre(candidate, &nearby) {
            cell.projection = aligned_axis(fibre.direction, cell.projection)?;
            trace!(
                "Cell {} snapped to fibre axis ({:.4}, {:.4}) among {} nearby fibres",
                cell.label, cell.projection.x, cell.projection.y, nearby.len()
            );
        }
    }

    update_position(cell, matrix, params, rng)
}

/// Sum of the cell polarity projected onto each nearby fibre axis, normalized.
///
/// The axis is the fibre direction scaled by `s · (1 + N(0, 1))`, where `s`
/// orients it to agree with the current polarity. Every nearby fibre consumes
/// one normal draw. A sum that cannot be normalized (a zero noise factor
/// leaves a degenerate axis) falls back to the current polarity.
pub fn net_projection<R: RandomSource>(cell: &Cell, nearby: &[&Fibre], rng: &mut R) -> OrderedPair {
    let mut net = OrderedPair::zero();
    for fibre in nearby {
        let sign = if cell.projection.dot(fibre.direction) >= 0.0 { 1.0 } else { -1.0 };
        let noise = sign * (1.0 + rng.standard_normal());
        net = net.add(cell.projection.project(fibre.direction.scale(noise)));
    }

    match net.normalize() {
        Ok(candidate) => candidate,
        Err(_) => {
            warn!(
                "Cell {}: net fibre signal cancelled out, keeping current polarity",
                cell.label
            );
            cell.projection
        }
    }
}

/// Signed angle from `from` to `to`, folded into `[-π/2, π/2]` so that a
/// direction and its opposite count as the same axis.
pub fn find_angle_change(from: OrderedPair, to: OrderedPair) -> f64 {
    let angle = from.cross(to).atan2(from.dot(to));
    if angle > FRAC_PI_2 {
        angle - PI
    } else if angle < -FRAC_PI_2 {
        angle + PI
    } else {
        angle
    }
}

/// The fibre whose axis deviates most from `candidate`. Ties keep the first.
pub fn most_deviating_fibre<'a>(candidate: OrderedPair, nearby: &[&'a Fibre]) -> Option<&'a Fibre> {
    let mut best: Option<(&'a Fibre, f64)> = None;
    for &fibre in nearby {
        let change = find_angle_change(candidate, fibre.direction).abs();
        match best {
            Some((_, best_change)) if change <= best_change => {}
            _ => best = Some((fibre, change)),
        }
    }
    best.map(|(fibre, _)| fibre)
}

/// Unit vector along `axis`, flipped if needed so that it stays within 90° of
/// `current`.
pub fn aligned_axis(axis: OrderedPair, current: OrderedPair) -> Result<OrderedPair, SimError> {
    let unit = axis.normalize()?;
    Ok(if unit.dot(current) < 0.0 { unit.negate() } else { unit })
}

/// Drag force on the cell: `speed · shape_factor · viscosity · projection`
/// plus one noise scalar added to both components.
pub fn drag_force(cell: &Cell, cell_speed: f64, noise: f64) -> OrderedPair {
    let magnitude = cell_speed * cell.shape_factor * cell.viscosity;
    let drag = cell.projection.scale(magnitude);
    OrderedPair::new(drag.x + noise, drag.y + noise)
}

/// Moves the cell a distance `cell_speed · dt` along its normalized drag
/// force and wraps it back into the domain.
pub fn update_position<R: RandomSource>(
    cell: &mut Cell,
    matrix: &MatrixProperties,
    params: &SimParams,
    rng: &mut R,
) -> Result<(), SimError> {
    let noise = params.drag_noise_amplitude * rng.uniform_symmetric();
    let heading = drag_force(cell, matrix.cell_speed, noise).normalize()?;
    let moved = cell.position.add(heading.scale(matrix.cell_speed * params.time_step));

    cell.position = OrderedPair::new(wrap(moved.x, matrix.width), wrap(moved.y, matrix.width));
    if !cell.position.is_finite() {
        return Err(SimError::InvalidGeometry(format!(
            "cell {} moved to non-finite position {:?}",
            cell.label, cell.position
        )));
    }
    Ok(())
}

/// Wraps a coordinate into `[0, width)`.
pub fn wrap(value: f64, width: f64) -> f64 {
    let wrapped = value.rem_euclid(width);
    // rem_euclid of a tiny negative value rounds up to exactly `width`.
    if wrapped >= width {
        0.0
    } else {
        wrapped
    }
}
