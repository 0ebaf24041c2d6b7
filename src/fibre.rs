//! Reorientation of a fibre by the cell that governs it.
//!
//! The fibre rotates rigidly about its pivot, the endpoint farther from the
//! cell. With `D` the perpendicular distance from the cell to the fibre axis
//! and `d` the pivot-to-cell distance, the axis currently makes an angle
//! `θ = asin(D/d)` with the pivot-to-cell line. After the update that angle is
//! `asin(f·D/d)`, where `f` is the alignment factor of the cell/matrix pair,
//! so the fibre turns by `φ = θ − asin(f·D/d)` toward the cell.

use log::trace;
use migration_common::{alignment_factor, distance_to_line, homogeneous_line, Cell, Fibre, OrderedPair, SimError};

/// Selects the pivot of `fibre` with respect to `cell` and orients
/// `direction` so that `pivot + direction` points toward the fibre center.
///
/// The pivot is the endpoint farther from the cell center; when both are
/// equally far the `position + direction` end is chosen.
pub fn find_pivot(fibre: &mut Fibre, cell: &Cell) {
    let (endpoint1, endpoint2) = fibre.endpoints();
    let distance1 = cell.position.distance(endpoint1);
    let distance2 = cell.position.distance(endpoint2);
    if distance1 >= distance2 {
        fibre.pivot = endpoint1;
        fibre.direction = fibre.direction.negate();
    } else {
        fibre.pivot = endpoint2;
    }
}

/// Shortest distance from the cell center to the line through the fibre's
/// pivot and center.
pub fn perpendicular_distance(fibre: &Fibre, cell: &Cell) -> f64 {
    distance_to_line(cell.position, homogeneous_line(fibre.pivot, fibre.position))
}

/// `asin` that refuses arguments outside its domain instead of producing NaN.
fn checked_asin(value: f64, what: &str) -> Result<f64, SimError> {
    if (-1.0..=1.0).contains(&value) {
        Ok(value.asin())
    } else {
        Err(SimError::InvalidGeometry(format!("{} = {} is outside [-1, 1]", what, value)))
    }
}

/// Unsigned angle of rotation for a fibre whose axis makes angle `theta` with
/// the pivot-to-cell line.
pub fn compute_phi(theta: f64, ratio: f64, integrin: f64, stiffness: f64) -> Result<f64, SimError> {
    let factor = alignment_factor(integrin, stiffness);
    Ok(theta - checked_asin(factor * ratio, "alignment factor * D / d")?)
}

/// Rotation sign that swings the non-pivot end toward the cell: negative when
/// the cell lies clockwise of the pivot-to-center direction.
pub fn rotation_sign(pivot: OrderedPair, direction: OrderedPair, target: OrderedPair) -> f64 {
    if direction.cross(target.sub(pivot)) < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Rotates `fibre` about its pivot toward `cell`.
///
/// Matrix stiffness and the cell's integrin level set how much of the angle
/// between the fibre and the cell is closed in one step. Fibre length is
/// conserved exactly: the new center is re-derived from the pivot along the
/// rotated direction.
pub fn update_fibre(fibre: &mut Fibre, cell: &Cell, stiffness: f64) -> Result<(), SimError> {
    find_pivot(fibre, cell);

    let big_d = perpendicular_distance(fibre, cell);
    let d = fibre.pivot.distance(cell.position);
    let ratio = big_d / d;
    let theta = checked_asin(ratio, "D / d")?;

    let phi = compute_phi(theta, ratio, cell.integrin, stiffness)?
        * rotation_sign(fibre.pivot, fibre.direction, cell.position);

    fibre.direction = fibre.direction.rotate(phi);
    fibre.position = fibre
        .pivot
        .add(fibre.direction.scale(0.5 * fibre.length / fibre.direction.magnitude()));

    if !fibre.direction.is_finite() || !fibre.position.is_finite() {
        return Err(SimError::InvalidGeometry(format!(
            "fibre update produced position {:?} and direction {:?}",
            fibre.position, fibre.direction
        )));
    }

    trace!(
        "Fibre rotated by {:.5} rad about ({:.3}, {:.3}) toward cell {} (D = {:.3}, d = {:.3})",
        phi, fibre.pivot.x, fibre.pivot.y, cell.label, big_d, d
    );
    Ok(())
}
