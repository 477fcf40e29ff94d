//! Error types reported by selection, crossover and the evolution driver.
//!
//! Every error is returned synchronously from the call that detects it. Nothing is
//! retried: a failed generation transition leaves the caller's previous population
//! untouched, since operators only ever read from it.

use neuroevo_network::UnknownActivationError;

/// Errors produced while evolving a population.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum EvolutionError {
    /// A mode tag, parameter or size is outside the supported domain.
    #[display("invalid configuration: {_0}")]
    InvalidConfiguration(ConfigError),
    /// Fitness values cannot be turned into selection probabilities.
    #[display("invalid population state: {_0}")]
    InvalidState(FitnessDomainError),
    /// Sampling asked for more distinct agents than the pool holds.
    #[display("insufficient population: requested {requested} agents but only {available} available")]
    InsufficientPopulation { requested: usize, available: usize },
    /// Crossover parents do not share a topology.
    #[display("network shape mismatch: {left:?} vs {right:?}")]
    ShapeMismatch {
        left: Vec<(usize, usize)>,
        right: Vec<(usize, usize)>,
    },
    /// The parent pool does not match the requested population size.
    #[display("expected {expected} parents but got {actual}")]
    ParentCountMismatch { expected: usize, actual: usize },
}

/// Configuration problems, detected when a mode or parameter is parsed or validated.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("{_0}")]
    UnknownActivation(UnknownActivationError),
    #[display("unknown selection mode '{name}'")]
    UnknownSelectionMode { name: String },
    #[display("unknown crossover method '{name}'")]
    UnknownCrossoverMethod { name: String },
    #[display("multi-point crossover needs at least one point")]
    ZeroCrossoverPoints,
    #[display("tournament size must be at least 1")]
    ZeroTournamentSize,
    #[display("population size must be even, got {count}")]
    OddPopulationSize { count: usize },
    #[display("{name} must be within [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },
    #[display("mutation sigma must be finite and non-negative, got {sigma}")]
    InvalidMutationSigma { sigma: f64 },
    #[display("layer sizes must list at least two positive sizes, got {sizes:?}")]
    InvalidLayerSizes { sizes: Vec<usize> },
}

/// Why fitness values cannot be normalized into probabilities.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum FitnessDomainError {
    #[display("total fitness must be positive and finite, got {total}")]
    NonPositiveTotal { total: f64 },
    #[display("agent #{index} has negative fitness {fitness}")]
    NegativeFitness { index: usize, fitness: f64 },
}

impl From<ConfigError> for EvolutionError {
    fn from(err: ConfigError) -> Self {
        Self::InvalidConfiguration(err)
    }
}

impl From<FitnessDomainError> for EvolutionError {
    fn from(err: FitnessDomainError) -> Self {
        Self::InvalidState(err)
    }
}

impl From<UnknownActivationError> for ConfigError {
    fn from(err: UnknownActivationError) -> Self {
        Self::UnknownActivation(err)
    }
}

impl From<UnknownActivationError> for EvolutionError {
    fn from(err: UnknownActivationError) -> Self {
        Self::InvalidConfiguration(err.into())
    }
}
