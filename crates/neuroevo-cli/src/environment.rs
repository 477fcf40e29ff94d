//! Reference fitness environment: boolean parity tasks.
//!
//! An agent sees every bit pattern of the task's width and must output the parity of
//! the set bits on its first output neuron. Fitness is `1 / (1 + mse)`, which is always
//! in `(0, 1]` and therefore valid for fitness-proportionate selection.

use neuroevo_training::agent::Agent;
use serde::{Deserialize, Serialize};

#[derive(
    Default,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    derive_more::Display,
    derive_more::FromStr,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// Two-input exclusive or.
    #[default]
    #[display("xor")]
    Xor,
    /// Three-input parity.
    #[display("parity")]
    Parity,
}

impl Task {
    pub fn input_size(self) -> usize {
        match self {
            Task::Xor => 2,
            Task::Parity => 3,
        }
    }

    /// Every input pattern with its expected output.
    pub fn cases(self) -> Vec<(Vec<f64>, f64)> {
        let width = self.input_size();
        (0..1_usize << width)
            .map(|pattern| {
                let input = (0..width)
                    .map(|bit| if pattern >> bit & 1 == 1 { 1.0 } else { 0.0 })
                    .collect();
                let target = if pattern.count_ones() % 2 == 1 { 1.0 } else { 0.0 };
                (input, target)
            })
            .collect()
    }

    #[expect(clippy::cast_precision_loss)]
    pub fn fitness(self, agent: &Agent) -> f64 {
        let cases = self.cases();
        let squared_error = cases
            .iter()
            .map(|(input, target)| (agent.act(input)[0] - target).powi(2))
            .sum::<f64>();
        let mse = squared_error / cases.len() as f64;
        1.0 / (1.0 + mse)
    }

    /// Scores every agent of a generation.
    pub fn evaluate(self, agents: &mut [Agent]) {
        for agent in agents {
            let fitness = self.fitness(agent);
            agent.set_fitness(fitness);
        }
    }
}

#[cfg(test)]
mod tests {
    use neuroevo_network::{Activation, Matrix, Network};
    use neuroevo_training::agent::Evaluated as _;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    #[test]
    fn test_xor_cases() {
        let cases = Task::Xor.cases();
        assert_eq!(
            cases,
            vec![
                (vec![0.0, 0.0], 0.0),
                (vec![1.0, 0.0], 1.0),
                (vec![0.0, 1.0], 1.0),
                (vec![1.0, 1.0], 0.0),
            ]
        );
        assert_eq!(Task::Parity.cases().len(), 8);
    }

    #[test]
    fn test_parse_task() {
        assert_eq!("xor".parse::<Task>().unwrap(), Task::Xor);
        assert_eq!("parity".parse::<Task>().unwrap(), Task::Parity);
        assert_eq!(Task::Parity.to_string(), "parity");
    }

    #[test]
    fn test_fitness_is_in_unit_interval() {
        let mut rng = Pcg64::seed_from_u64(0);
        let mut agents = (0..4)
            .map(|_| Agent::random(&[2, 4, 1], Activation::Sigmoid, "test", &mut rng))
            .collect::<Vec<_>>();
        Task::Xor.evaluate(&mut agents);
        assert!(agents.iter().all(|a| a.fitness() > 0.0 && a.fitness() <= 1.0));
    }

    #[test]
    fn test_perfect_relu_xor_scores_one() {
        // h1 = relu(x1 + x2), h2 = relu(x1 + x2 - 1), y = relu(h1 - 2 h2)
        let mut rng = Pcg64::seed_from_u64(1);
        let mut network = Network::random(&[2, 2, 1], Activation::Relu, &mut rng);
        network.set_weights(0, Matrix::from_fn(2, 2, |_, _| 1.0)).unwrap();
        *network.bias_mut(0, 1) = -1.0;
        network
            .set_weights(1, Matrix::from_vec(1, 2, vec![1.0, -2.0]).unwrap())
            .unwrap();
        let agent = Agent::new(network, "test");
        assert_eq!(Task::Xor.fitness(&agent), 1.0);
    }
}
