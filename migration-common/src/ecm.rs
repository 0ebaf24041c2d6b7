use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::vecmath::OrderedPair;

/// Coefficient of the shape factor `c = 16.7 · sqrt(0.5 · r · h)`.
const SHAPE_FACTOR_COEFF: f64 = 16.7;

/// A rigid line-segment matrix fibre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fibre {
    pub length: f64,
    /// Cosmetic only; used when drawing.
    pub width: f64,
    /// Center of the fibre.
    pub position: OrderedPair,
    /// Orientation. Not kept at unit length: always normalize through its
    /// magnitude before deriving endpoints.
    pub direction: OrderedPair,
    /// Endpoint held fixed during the last reorientation.
    pub pivot: OrderedPair,
}

impl Fibre {
    pub fn new(length: f64, width: f64, position: OrderedPair, direction: OrderedPair) -> Self {
        Self { length, width, position, direction, pivot: position }
    }

    /// The two ends of the fibre, `position ± ½·length·direction/|direction|`.
    pub fn endpoints(&self) -> (OrderedPair, OrderedPair) {
        let half = self.direction.scale(0.5 * self.length / self.direction.magnitude());
        (self.position.add(half), self.position.sub(half))
    }
}

/// A migrating cell, treated as a point with a polarity vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Unique identifier, starting at 1.
    pub label: u32,
    pub radius: f64,
    pub height: f64,
    /// Integrin receptor density as a percentage (0-100).
    pub integrin: f64,
    pub shape_factor: f64,
    pub viscosity: f64,
    pub position: OrderedPair,
    /// Unit-length polarity.
    pub projection: OrderedPair,
}

impl Cell {
    pub fn new(
        label: u32,
        radius: f64,
        height: f64,
        integrin: f64,
        viscosity: f64,
        position: OrderedPair,
        projection: OrderedPair,
    ) -> Self {
        Self {
            label,
            radius,
            height,
            integrin,
            shape_factor: shape_factor(radius, height),
            viscosity,
            position,
            projection,
        }
    }
}

/// Drag shape factor of a cell with the given radius and height.
pub fn shape_factor(radius: f64, height: f64) -> f64 {
    SHAPE_FACTOR_COEFF * (0.5 * radius * height).sqrt()
}

/// Global properties of the matrix shared by every entity of one generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatrixProperties {
    /// Side of the square, toroidal domain.
    pub width: f64,
    /// Resistance of the matrix to realignment, in `[0, 1]`.
    pub stiffness: f64,
    /// Speed constant shared by all cells.
    pub cell_speed: f64,
}

/// One generation: the complete state of the matrix and its cells.
///
/// Every field is a plain value, so `clone()` is a deep copy that shares
/// nothing with its source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ecm {
    pub matrix: MatrixProperties,
    pub fibres: Vec<Fibre>,
    pub cells: Vec<Cell>,
}

impl Ecm {
    pub fn new(matrix: MatrixProperties, fibres: Vec<Fibre>, cells: Vec<Cell>) -> Self {
        Self { matrix, fibres, cells }
    }

    /// Rejects a matrix without fibres or without cells.
    pub fn ensure_populated(&self) -> Result<(), SimError> {
        ensure_population(self.fibres.len(), self.cells.len())
    }
}

pub fn ensure_population(num_fibres: usize, num_cells: usize) -> Result<(), SimError> {
    if num_fibres == 0 {
        return Err(SimError::EmptyPopulation("the matrix has no fibres".into()));
    }
    if num_cells == 0 {
        return Err(SimError::EmptyPopulation("the matrix has no cells".into()));
    }
    Ok(())
}

/// One row of the position log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub time: f64,
    pub label: u32,
    pub x: f64,
    pub y: f64,
}

impl PositionRecord {
    pub fn of_cell(time: f64, cell: &Cell) -> Self {
        Self { time, label: cell.label, x: cell.position.x, y: cell.position.y }
    }

    pub fn position(&self) -> OrderedPair {
        OrderedPair::new(self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_ecm() -> Ecm {
        Ecm::new(
            MatrixProperties { width: 500.0, stiffness: 0.5, cell_speed: 1.0 },
            vec![Fibre::new(75.0, 0.2, OrderedPair::new(10.0, 20.0), OrderedPair::new(0.0, 1.0))],
            vec![Cell::new(1, 15.0, 2.6, 50.0, 100.0, OrderedPair::new(5.0, 6.0), OrderedPair::new(1.0, 0.0))],
        )
    }

    #[test]
    fn shape_factor_follows_cell_geometry() {
        assert_relative_eq!(shape_factor(15.0, 2.6), 16.7 * 19.5_f64.sqrt(), epsilon = 1e-9);
        let cell = &sample_ecm().cells[0];
        assert_relative_eq!(cell.shape_factor, shape_factor(15.0, 2.6));
    }

    #[test]
    fn endpoints_are_symmetric_about_the_center() {
        let mut fibre = sample_ecm().fibres[0].clone();
        // Non-unit direction must not change the fibre length.
        fibre.direction = OrderedPair::new(0.0, 4.0);
        let (e1, e2) = fibre.endpoints();
        assert_relative_eq!(e1.y, 57.5);
        assert_relative_eq!(e2.y, -17.5);
        assert_relative_eq!(e1.distance(e2), 75.0);
    }

    #[test]
    fn clone_is_independent_of_source() {
        let source = sample_ecm();
        let mut copy = source.clone();

        copy.matrix.width = 1.0;
        copy.matrix.stiffness = 0.0;
        copy.matrix.cell_speed = 9.0;

        let f = &mut copy.fibres[0];
        f.length = 1.0;
        f.width = 9.0;
        f.position = OrderedPair::new(-1.0, -1.0);
        f.direction = OrderedPair::new(1.0, 0.0);
        f.pivot = OrderedPair::new(3.0, 3.0);

        let c = &mut copy.cells[0];
        c.label = 7;
        c.radius = 1.0;
        c.height = 1.0;
        c.integrin = 0.0;
        c.shape_factor = 0.0;
        c.viscosity = 0.0;
        c.position = OrderedPair::new(-1.0, -1.0);
        c.projection = OrderedPair::new(0.0, -1.0);

        assert_eq!(source, sample_ecm());
    }

    #[test]
    fn empty_populations_are_rejected() {
        let mut ecm = sample_ecm();
        ecm.cells.clear();
        assert!(matches!(ecm.ensure_populated(), Err(SimError::EmptyPopulation(_))));
        assert!(matches!(ensure_population(0, 3), Err(SimError::EmptyPopulation(_))));
        assert!(ensure_population(1, 1).is_ok());
    }
}
