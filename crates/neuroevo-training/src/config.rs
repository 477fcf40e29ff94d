//! Evolution parameters.
//!
//! An [`EvolutionConfig`] is plain data: the CLI builds one from flags and the champion
//! file stores it next to the network. [`EvolutionConfig::validate`] runs when an
//! [`Evolution`](crate::evolution::Evolution) is created.

use neuroevo_network::Activation;
use serde::{Deserialize, Serialize};

use crate::{
    crossover::{Crossover, CrossoverMethod},
    error::ConfigError,
    mutation::GaussianMutation,
    selection::{ParentSelection, SelectionMode},
};

/// Every knob of a generation transition.
///
/// Missing fields fall back to [`EvolutionConfig::default`] when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Network topology shared by every agent, input layer first.
    pub layer_sizes: Vec<usize>,
    pub activation: Activation,
    /// Opaque label stamped on every agent.
    pub tag: String,
    /// How parents are picked from the survivors.
    pub parent_selection: ParentSelection,
    /// How the μ+λ pool is reduced to the survivors.
    pub survivor_selection: SelectionMode,
    pub crossover_method: CrossoverMethod,
    /// `P_c`, the probability that a parent pair is recombined.
    pub crossover_probability: f64,
    /// Per-parameter mutation probability.
    pub mutation_rate: f64,
    /// Standard deviation of the Gaussian mutation noise.
    pub mutation_sigma: f64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            layer_sizes: vec![2, 8, 1],
            activation: Activation::Sigmoid,
            tag: "Neuroevolution".to_owned(),
            parent_selection: ParentSelection::All,
            survivor_selection: SelectionMode::First,
            crossover_method: CrossoverMethod::Uniform,
            crossover_probability: 0.8,
            mutation_rate: 0.1,
            mutation_sigma: GaussianMutation::DEFAULT_SIGMA,
        }
    }
}

impl EvolutionConfig {
    /// Checks every parameter so that invalid modes surface before any generation runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.layer_sizes.len() < 2 || self.layer_sizes.contains(&0) {
            return Err(ConfigError::InvalidLayerSizes {
                sizes: self.layer_sizes.clone(),
            });
        }
        if let ParentSelection::Select(mode) = self.parent_selection {
            mode.validate()?;
        }
        self.survivor_selection.validate()?;
        self.crossover_method.validate()?;
        check_probability("crossover probability", self.crossover_probability)?;
        check_probability("mutation rate", self.mutation_rate)?;
        GaussianMutation::new(self.mutation_sigma)?;
        Ok(())
    }

    #[must_use]
    pub fn crossover(&self) -> Crossover {
        Crossover {
            probability: self.crossover_probability,
            method: self.crossover_method,
        }
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::ProbabilityOutOfRange { name, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::TournamentParams;

    #[test]
    fn test_default_is_valid() {
        let config = EvolutionConfig::default();
        config.validate().unwrap();
        assert_eq!(config.crossover_probability, 0.8);
        assert_eq!(config.mutation_rate, 0.1);
    }

    #[test]
    fn test_rejects_bad_values() {
        let cases = [
            EvolutionConfig {
                layer_sizes: vec![3],
                ..Default::default()
            },
            EvolutionConfig {
                layer_sizes: vec![3, 0, 1],
                ..Default::default()
            },
            EvolutionConfig {
                crossover_probability: 1.5,
                ..Default::default()
            },
            EvolutionConfig {
                mutation_rate: f64::NAN,
                ..Default::default()
            },
            EvolutionConfig {
                mutation_sigma: -0.1,
                ..Default::default()
            },
            EvolutionConfig {
                crossover_method: CrossoverMethod::MultiPoint { points: 0 },
                ..Default::default()
            },
            EvolutionConfig {
                parent_selection: ParentSelection::Select(SelectionMode::Tournament(
                    TournamentParams {
                        size: 0,
                        replace: true,
                    },
                )),
                ..Default::default()
            },
        ];
        for config in cases {
            assert!(config.validate().is_err(), "{config:?}");
        }
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "layer_sizes": [4, 6, 2],
            "activation": "relu",
            "parent_selection": { "select": { "mode": "sus" } },
            "crossover_method": { "method": "multi_points", "points": 3 }
        }"#;
        let config: EvolutionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.layer_sizes, vec![4, 6, 2]);
        assert_eq!(config.activation, Activation::Relu);
        assert_eq!(
            config.parent_selection,
            ParentSelection::Select(SelectionMode::StochasticUniversal)
        );
        assert_eq!(
            config.crossover_method,
            CrossoverMethod::MultiPoint { points: 3 }
        );
        assert_eq!(config.survivor_selection, SelectionMode::First);
        assert_eq!(config.crossover_probability, 0.8);
    }
}
