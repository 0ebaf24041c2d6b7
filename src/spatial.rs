//! Neighbor queries over fibres and cells.
//!
//! Both queries are full linear scans. Populations stay in the hundreds to low
//! thousands, and the exact scan order and strict `<` comparison are part of
//! what makes a seeded run reproducible.

use migration_common::{distance_to_line, homogeneous_line, Cell, Fibre, OrderedPair};

/// An entity with a center in the matrix.
pub trait Located {
    fn center(&self) -> OrderedPair;
}

impl Located for Fibre {
    fn center(&self) -> OrderedPair {
        self.position
    }
}

impl Located for Cell {
    fn center(&self) -> OrderedPair {
        self.position
    }
}

/// Every candidate whose center lies strictly closer than `threshold` to
/// `center`, in input order.
pub fn nearby_entities<'a, T: Located>(
    center: OrderedPair,
    threshold: f64,
    candidates: &'a [T],
) -> Vec<&'a T> {
    candidates
        .iter()
        .filter(|candidate| center.distance(candidate.center()) < threshold)
        .collect()
}

/// Perpendicular distance from `point` to the infinite line along `fibre`.
pub fn distance_to_axis(fibre: &Fibre, point: OrderedPair) -> f64 {
    let (e1, e2) = fibre.endpoints();
    distance_to_line(point, homogeneous_line(e1, e2))
}

/// The cell with the smallest perpendicular distance to the fibre's axis.
///
/// This is the cell with the largest moment arm on the fibre, which is not
/// necessarily the closest one. Ties keep the earliest cell; `None` only for
/// an empty slice.
pub fn nearest_cell<'a>(fibre: &Fibre, cells: &'a [Cell]) -> Option<&'a Cell> {
    let mut best: Option<(&Cell, f64)> = None;
    for cell in cells {
        let d = distance_to_axis(fibre, cell.position);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((cell, d)),
        }
    }
    best.map(|(cell, _)| cell)
}
