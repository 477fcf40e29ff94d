//! Mutation contract and the default Gaussian perturbation policy.
//!
//! The evolution driver calls [`Mutation::mutate`] exactly once on every freshly
//! produced child, after crossover and before the child joins the new generation.
//! Implementations may perturb parameter values however they like but must keep every
//! tensor shape intact.

use rand::Rng;
use rand_distr::Normal;

use crate::{agent::Agent, error::ConfigError};

/// Perturbs an agent's network parameters in place.
pub trait Mutation {
    /// Mutates `agent` with per-parameter probability `rate`.
    fn mutate<R>(&self, agent: &mut Agent, rate: f64, rng: &mut R)
    where
        R: Rng + ?Sized;
}

/// Adds `N(0, sigma)` noise to each parameter with probability `rate`.
///
/// Parameters are visited in tensor order (all weights, then all biases). Each one
/// consumes a Bernoulli draw, and a normal sample only when it is mutated.
#[derive(Debug, Clone, Copy)]
pub struct GaussianMutation {
    noise: Normal<f64>,
}

impl GaussianMutation {
    pub const DEFAULT_SIGMA: f64 = 0.5;

    pub fn new(sigma: f64) -> Result<Self, ConfigError> {
        if !(sigma.is_finite() && sigma >= 0.0) {
            return Err(ConfigError::InvalidMutationSigma { sigma });
        }
        let noise =
            Normal::new(0.0, sigma).map_err(|_| ConfigError::InvalidMutationSigma { sigma })?;
        Ok(Self { noise })
    }

    #[must_use]
    pub fn sigma(&self) -> f64 {
        self.noise.std_dev()
    }
}

impl Mutation for GaussianMutation {
    fn mutate<R>(&self, agent: &mut Agent, rate: f64, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let rate = rate.clamp(0.0, 1.0);
        for values in agent.network_mut().tensors_mut() {
            for w in values {
                if rng.random_bool(rate) {
                    *w += rng.sample(self.noise);
                }
            }
        }
    }
}

/// Leaves agents untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMutation;

impl Mutation for NoMutation {
    fn mutate<R>(&self, _agent: &mut Agent, _rate: f64, _rng: &mut R)
    where
        R: Rng + ?Sized,
    {
    }
}

#[cfg(test)]
mod tests {
    use neuroevo_network::Activation;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;
    use crate::agent::Evaluated as _;

    fn agent() -> Agent {
        Agent::random(&[3, 4, 2], Activation::Sigmoid, "test", &mut Pcg64::seed_from_u64(0))
    }

    fn changed(a: &Agent, b: &Agent) -> usize {
        a.network()
            .tensors()
            .zip(b.network().tensors())
            .flat_map(|(x, y)| x.as_slice().iter().zip(y.as_slice()))
            .filter(|(x, y)| x != y)
            .count()
    }

    #[test]
    fn test_zero_rate_is_identity() {
        let original = agent();
        let mut mutated = original.clone();
        let mutation = GaussianMutation::new(1.0).unwrap();
        mutation.mutate(&mut mutated, 0.0, &mut Pcg64::seed_from_u64(1));
        assert_eq!(mutated, original);
    }

    #[test]
    fn test_full_rate_touches_every_parameter() {
        let original = agent();
        let mut mutated = original.clone();
        let mutation = GaussianMutation::new(1.0).unwrap();
        mutation.mutate(&mut mutated, 1.0, &mut Pcg64::seed_from_u64(2));
        assert_eq!(changed(&original, &mutated), original.network().parameter_count());
        assert_eq!(mutated.network().shape(), original.network().shape());
        assert_eq!(mutated.fitness(), original.fitness());
    }

    #[test]
    fn test_partial_rate_touches_some_parameters() {
        let original = agent();
        let mut mutated = original.clone();
        let mutation = GaussianMutation::new(0.1).unwrap();
        mutation.mutate(&mut mutated, 0.5, &mut Pcg64::seed_from_u64(3));
        let n = changed(&original, &mutated);
        assert!(n > 0 && n < original.network().parameter_count());
    }

    #[test]
    fn test_rejects_invalid_sigma() {
        assert!(GaussianMutation::new(-1.0).is_err());
        assert!(GaussianMutation::new(f64::NAN).is_err());
        assert_eq!(GaussianMutation::new(0.25).unwrap().sigma(), 0.25);
    }
}
