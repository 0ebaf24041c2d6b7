use rand::prelude::*;
use rand_distr::StandardNormal;

/// Source of the random draws consumed by initialization and cell updates.
///
/// Passed explicitly so that a run is reproducible from its seed and tests can
/// script the exact sequence of draws.
pub trait RandomSource {
    /// Uniform draw in `[0, 1)`.
    fn uniform(&mut self) -> f64;
    /// Uniform draw in `[-1, 1)`.
    fn uniform_symmetric(&mut self) -> f64;
    /// Draw from the standard normal distribution.
    fn standard_normal(&mut self) -> f64;
}

/// Default source backed by a seeded `StdRng`.
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl RandomSource for SeededRandom {
    fn uniform(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    fn uniform_symmetric(&mut self) -> f64 {
        self.rng.random_range(-1.0..1.0)
    }

    fn standard_normal(&mut self) -> f64 {
        self.rng.sample(StandardNormal)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn uniform(&mut self) -> f64 {
        (**self).uniform()
    }

    fn uniform_symmetric(&mut self) -> f64 {
        (**self).uniform_symmetric()
    }

    fn standard_normal(&mut self) -> f64 {
        (**self).standard_normal()
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    use super::RandomSource;

    /// Replays fixed draws; each stream cycles independently.
    pub struct ScriptedRandom {
        uniform: Vec<f64>,
        symmetric: Vec<f64>,
        normal: Vec<f64>,
        cursor: [usize; 3],
    }

    impl ScriptedRandom {
        pub fn new(uniform: Vec<f64>, symmetric: Vec<f64>, normal: Vec<f64>) -> Self {
            Self { uniform, symmetric, normal, cursor: [0; 3] }
        }

        /// Every draw returns zero: no noise, no weight perturbation.
        pub fn quiet() -> Self {
            Self::new(vec![0.0], vec![0.0], vec![0.0])
        }

        /// Normal draws consumed so far.
        pub fn normal_draws(&self) -> usize {
            self.cursor[2]
        }

        fn next(values: &[f64], cursor: &mut usize) -> f64 {
            let v = values[*cursor % values.len()];
            *cursor += 1;
            v
        }
    }

    impl RandomSource for ScriptedRandom {
        fn uniform(&mut self) -> f64 {
            Self::next(&self.uniform, &mut self.cursor[0])
        }

        fn uniform_symmetric(&mut self) -> f64 {
            Self::next(&self.symmetric, &mut self.cursor[1])
        }

        fn standard_normal(&mut self) -> f64 {
            Self::next(&self.normal, &mut self.cursor[2])
        }
    }
}
