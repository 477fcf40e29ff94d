use neuroevo_network::{Activation, Network};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Something that carries a scalar fitness score.
///
/// Selection strategies are written against this trait so they work on owned
/// agents as well as on slices of references produced by an earlier selection.
pub trait Evaluated {
    fn fitness(&self) -> f64;
}

impl<T> Evaluated for &T
where
    T: Evaluated + ?Sized,
{
    fn fitness(&self) -> f64 {
        (**self).fitness()
    }
}

/// One individual of the population: a network policy plus its fitness.
///
/// An agent owns its network exclusively. `Clone` is a deep copy of every
/// parameter tensor and copies the fitness verbatim, so a cloned parent can be
/// recombined and mutated without touching the original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    network: Network,
    fitness: f64,
    tag: String,
}

impl Agent {
    pub fn new(network: Network, tag: impl Into<String>) -> Self {
        Self {
            network,
            fitness: 0.0,
            tag: tag.into(),
        }
    }

    /// Creates a generation-zero agent with a freshly initialized network.
    ///
    /// # Panics
    ///
    /// Panics if `layer_sizes` is not a valid topology (see [`Network::random`]).
    pub fn random<R>(layer_sizes: &[usize], activation: Activation, tag: &str, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::new(Network::random(layer_sizes, activation, rng), tag)
    }

    #[must_use]
    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    /// Records the score assigned by the environment.
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    /// Opaque mode label supplied by the environment.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Runs the agent's policy on an observation.
    #[must_use]
    pub fn act(&self, observation: &[f64]) -> Vec<f64> {
        self.network.forward(observation)
    }
}

impl Evaluated for Agent {
    fn fitness(&self) -> f64 {
        self.fitness
    }
}
