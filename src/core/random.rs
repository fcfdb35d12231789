//! Random variates for arrivals, processing times and due-date slack.
//!
//! The engine owns exactly one source and hands it out by `&mut` to whatever
//! needs to sample, so the draw order under a fixed seed is the event order.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Exp, Normal, Uniform};

use super::errors::SimError;

/// Sampling interface the engine draws through
pub trait VariateSource {
    /// Exponential sample with the given mean (rate = 1 / mean)
    fn exponential(&mut self, mean: f64) -> Result<f64, SimError>;

    /// Normal sample; callers clamp negative results themselves
    fn normal(&mut self, mean: f64, std_dev: f64) -> Result<f64, SimError>;

    /// Uniform sample on `[low, high)`; `low == high` returns `low`
    fn uniform(&mut self, low: f64, high: f64) -> Result<f64, SimError>;
}

/// Seeded `StdRng` stream backed by `rand_distr`
#[derive(Debug, Clone)]
pub struct RandomVariateSource {
    rng: StdRng,
    seed: u64,
}

impl RandomVariateSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl VariateSource for RandomVariateSource {
    fn exponential(&mut self, mean: f64) -> Result<f64, SimError> {
        if !(mean.is_finite() && mean > 0.0) {
            return Err(SimError::InvalidDistributionParameter(format!(
                "exponential mean must be positive and finite, got {}",
                mean
            )));
        }
        let dist = Exp::new(1.0 / mean)
            .map_err(|e| SimError::InvalidDistributionParameter(format!("{:?}", e)))?;
        Ok(dist.sample(&mut self.rng))
    }

    fn normal(&mut self, mean: f64, std_dev: f64) -> Result<f64, SimError> {
        if !(std_dev.is_finite() && std_dev >= 0.0) {
            return Err(SimError::InvalidDistributionParameter(format!(
                "normal std dev must be non-negative, got {}",
                std_dev
            )));
        }
        let dist = Normal::new(mean, std_dev).map_err(|e| {
            SimError::InvalidDistributionParameter(format!(
                "normal({}, {}): {:?}",
                mean, std_dev, e
            ))
        })?;
        Ok(dist.sample(&mut self.rng))
    }

    fn uniform(&mut self, low: f64, high: f64) -> Result<f64, SimError> {
        if !(low.is_finite() && high.is_finite()) || high < low {
            return Err(SimError::InvalidDistributionParameter(format!(
                "uniform bounds must be finite with low <= high, got [{}, {})",
                low, high
            )));
        }
        if high == low {
            return Ok(low);
        }
        Ok(Uniform::new(low, high).sample(&mut self.rng))
    }
}

/// Deterministic source returning expected values: the mean for exponential
/// and normal draws, the midpoint for uniform ones. Useful for hand-checkable
/// runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanValueSource;

impl VariateSource for MeanValueSource {
    fn exponential(&mut self, mean: f64) -> Result<f64, SimError> {
        if !(mean.is_finite() && mean > 0.0) {
            return Err(SimError::InvalidDistributionParameter(format!(
                "exponential mean must be positive and finite, got {}",
                mean
            )));
        }
        Ok(mean)
    }

    fn normal(&mut self, mean: f64, std_dev: f64) -> Result<f64, SimError> {
        if !(std_dev.is_finite() && std_dev >= 0.0) {
            return Err(SimError::InvalidDistributionParameter(format!(
                "normal std dev must be non-negative, got {}",
                std_dev
            )));
        }
        Ok(mean)
    }

    fn uniform(&mut self, low: f64, high: f64) -> Result<f64, SimError> {
        if !(low.is_finite() && high.is_finite()) || high < low {
            return Err(SimError::InvalidDistributionParameter(format!(
                "uniform bounds must be finite with low <= high, got [{}, {})",
                low, high
            )));
        }
        Ok((low + high) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_value_source() {
        let mut source = MeanValueSource;
        assert_eq!(source.exponential(4.0).unwrap(), 4.0);
        assert_eq!(source.normal(5.0, 2.0).unwrap(), 5.0);
        assert_eq!(source.uniform(5.0, 10.0).unwrap(), 7.5);
        assert!(source.exponential(0.0).is_err());
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = RandomVariateSource::new(42);
        let mut b = RandomVariateSource::new(42);
        assert_eq!(a.seed(), 42);
        for _ in 0..50 {
            assert_eq!(a.exponential(4.0).unwrap(), b.exponential(4.0).unwrap());
            assert_eq!(a.normal(5.0, 2.0).unwrap(), b.normal(5.0, 2.0).unwrap());
            assert_eq!(a.uniform(5.0, 10.0).unwrap(), b.uniform(5.0, 10.0).unwrap());
        }
    }

    #[test]
    fn test_exponential_mean_is_roughly_the_parameter() {
        let mut source = RandomVariateSource::new(7);
        let n = 20_000;
        let total: f64 = (0..n).map(|_| source.exponential(4.0).unwrap()).sum();
        let mean = total / n as f64;
        assert!((mean - 4.0).abs() < 0.2, "sample mean {} too far from 4", mean);
    }

    #[test]
    fn test_zero_std_dev_normal_is_the_mean() {
        let mut source = RandomVariateSource::new(1);
        assert_eq!(source.normal(5.0, 0.0).unwrap(), 5.0);
    }

    #[test]
    fn test_uniform_stays_in_bounds() {
        let mut source = RandomVariateSource::new(3);
        for _ in 0..1000 {
            let x = source.uniform(5.0, 10.0).unwrap();
            assert!((5.0..10.0).contains(&x));
        }
        assert_eq!(source.uniform(2.0, 2.0).unwrap(), 2.0);
    }

    #[test]
    fn test_bad_parameters_are_rejected() {
        let mut source = RandomVariateSource::new(0);
        assert!(matches!(
            source.exponential(0.0),
            Err(SimError::InvalidDistributionParameter(_))
        ));
        assert!(matches!(
            source.exponential(-1.0),
            Err(SimError::InvalidDistributionParameter(_))
        ));
        assert!(matches!(
            source.normal(1.0, -1.0),
            Err(SimError::InvalidDistributionParameter(_))
        ));
        assert!(matches!(
            source.normal(1.0, f64::NAN),
            Err(SimError::InvalidDistributionParameter(_))
        ));
        assert!(matches!(
            source.uniform(10.0, 5.0),
            Err(SimError::InvalidDistributionParameter(_))
        ));
    }
}
