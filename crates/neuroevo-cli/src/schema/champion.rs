use chrono::{DateTime, Utc};
use neuroevo_network::Network;
use neuroevo_training::{agent::Agent, config::EvolutionConfig, stats::FitnessStats};
use serde::{Deserialize, Serialize};

use crate::environment::Task;

/// Best network of a training run together with how it was produced.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChampionModel {
    pub name: String,
    pub task: Task,
    pub trained_at: DateTime<Utc>,
    pub seed: u64,
    pub final_fitness: f64,
    pub config: EvolutionConfig,
    pub network: Network,
    pub learning_curve: Vec<GenerationRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GenerationRecord {
    pub generation: usize,
    #[serde(flatten)]
    pub stats: FitnessStats,
}

impl ChampionModel {
    pub(crate) fn to_agent(&self) -> Agent {
        Agent::new(self.network.clone(), self.config.tag.clone())
    }

    /// The network must have the topology recorded in the config and fit the task.
    pub(crate) fn check(&self) -> anyhow::Result<()> {
        self.config.validate()?;
        let layer_sizes = self.network.layer_sizes();
        anyhow::ensure!(
            layer_sizes == self.config.layer_sizes.as_slice(),
            "network layers {layer_sizes:?} differ from configured {:?}",
            self.config.layer_sizes
        );
        anyhow::ensure!(
            layer_sizes[0] == self.task.input_size(),
            "task {} takes {} inputs but the network takes {}",
            self.task,
            self.task.input_size(),
            layer_sizes[0]
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    fn champion() -> ChampionModel {
        let config = EvolutionConfig::default();
        let network = Network::random(
            &config.layer_sizes,
            config.activation,
            &mut Pcg64::seed_from_u64(0),
        );
        ChampionModel {
            name: "xor".to_owned(),
            task: Task::Xor,
            trained_at: Utc::now(),
            seed: 7,
            final_fitness: 0.9,
            config,
            network,
            learning_curve: vec![GenerationRecord {
                generation: 0,
                stats: FitnessStats::new([0.5, 0.9]).unwrap(),
            }],
        }
    }

    #[test]
    fn test_json_keeps_network_and_curve() {
        let model = champion();
        model.check().unwrap();

        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["task"], "xor");
        assert_eq!(json["learning_curve"][0]["max"], 0.9);

        let restored: ChampionModel = serde_json::from_value(json).unwrap();
        assert_eq!(restored.network, model.network);
        assert_eq!(restored.learning_curve, model.learning_curve);
        assert_eq!(
            restored.to_agent().act(&[1.0, 0.0]),
            model.to_agent().act(&[1.0, 0.0])
        );
    }

    #[test]
    fn test_malformed_network_is_rejected_on_load() {
        let mut json = serde_json::to_value(champion()).unwrap();
        json["network"]["layer_sizes"] = serde_json::json!([]);
        assert!(serde_json::from_value::<ChampionModel>(json).is_err());

        let mut json = serde_json::to_value(champion()).unwrap();
        json["network"]["weights"][0]["data"] = serde_json::json!([1.0, 1.0]);
        assert!(serde_json::from_value::<ChampionModel>(json).is_err());
    }

    #[test]
    fn test_check_catches_mismatched_parts() {
        let mut model = champion();
        model.task = Task::Parity;
        assert!(model.check().is_err());

        let mut model = champion();
        model.config.layer_sizes = vec![2, 3, 1];
        assert!(model.check().is_err());
    }
}
