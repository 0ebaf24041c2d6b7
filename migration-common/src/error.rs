use thiserror::Error;

/// Fatal conditions raised by the simulation core.
///
/// None of these are retried: each one aborts the current `initialize` or
/// `simulate` call and is returned to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// Degenerate geometry: an `asin` argument outside `[-1, 1]`, a
    /// zero-magnitude normalization, or a non-finite position/direction.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Zero cells or zero fibres supplied to `initialize` or `simulate`.
    #[error("empty population: {0}")]
    EmptyPopulation(String),

    /// A configuration value outside its domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
