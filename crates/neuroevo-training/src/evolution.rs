//! Generation transitions.
//!
//! [`Evolution`] composes selection, crossover and mutation into the two steps an
//! external driver loop calls once fitness has been assigned:
//!
//! 1. [`Evolution::next_population_selection`] reduces a μ+λ pool (previous survivors
//!    plus the current generation) to the survivors.
//! 2. [`Evolution::generate_new_population`] breeds the next generation from them.
//!
//! Both steps read the input population and return a new one, so a failure leaves the
//! caller's last valid generation intact.
//!
//! # Example
//!
//! ```
//! use neuroevo_training::{config::EvolutionConfig, evolution::Evolution};
//! use rand::SeedableRng as _;
//!
//! let mut rng = rand_pcg::Pcg64::seed_from_u64(42);
//! let evolution = Evolution::new(EvolutionConfig::default()).unwrap();
//!
//! let mut population = evolution.generate_new_population(10, None, &mut rng).unwrap();
//! for _ in 0..3 {
//!     for agent in &mut population {
//!         let output = agent.act(&[0.0, 1.0])[0];
//!         agent.set_fitness(output);
//!     }
//!     population = evolution
//!         .generate_new_population(10, Some(&population), &mut rng)
//!         .unwrap();
//! }
//! assert_eq!(population.len(), 10);
//! ```

use rand::Rng;

use crate::{
    agent::Agent,
    config::EvolutionConfig,
    error::{ConfigError, EvolutionError},
    mutation::{GaussianMutation, Mutation},
    selection::{self, ParentSelection},
};

/// Generation transition engine parameterized by its mutation policy.
#[derive(Debug, Clone)]
pub struct Evolution<M = GaussianMutation> {
    config: EvolutionConfig,
    mutation: M,
}

impl Evolution<GaussianMutation> {
    /// Validates `config` and uses Gaussian mutation with `config.mutation_sigma`.
    pub fn new(config: EvolutionConfig) -> Result<Self, EvolutionError> {
        let mutation = GaussianMutation::new(config.mutation_sigma)?;
        Self::with_mutation(config, mutation)
    }
}

impl<M> Evolution<M>
where
    M: Mutation,
{
    /// Validates `config` and uses a custom mutation policy.
    pub fn with_mutation(config: EvolutionConfig, mutation: M) -> Result<Self, EvolutionError> {
        config.validate()?;
        Ok(Self { config, mutation })
    }

    #[must_use]
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Reduces `players` to `num_players` survivors with the survivor selection mode.
    ///
    /// Survivors picked more than once are cloned for every pick.
    pub fn next_population_selection<R>(
        &self,
        players: &[Agent],
        num_players: usize,
        rng: &mut R,
    ) -> Result<Vec<Agent>, EvolutionError>
    where
        R: Rng + ?Sized,
    {
        let mode = self.config.survivor_selection;
        let survivors = selection::select(players, num_players, mode, rng)?
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();
        tracing::debug!(
            %mode,
            pool = players.len(),
            survivors = survivors.len(),
            "selected survivors"
        );
        Ok(survivors)
    }

    /// Produces the next generation of `num_players` agents.
    ///
    /// Without `prev_players` this is generation zero: fresh agents with random
    /// networks. Otherwise parents are chosen from `prev_players` (all of them, or a
    /// selection strategy), taken in consecutive pairs, recombined, and each child is
    /// mutated exactly once. Per pair the generator is consumed by crossover first,
    /// then by the mutation of the first child, then of the second.
    ///
    /// `num_players` must be even. With [`ParentSelection::All`] the survivor count
    /// must equal `num_players`.
    pub fn generate_new_population<R>(
        &self,
        num_players: usize,
        prev_players: Option<&[Agent]>,
        rng: &mut R,
    ) -> Result<Vec<Agent>, EvolutionError>
    where
        R: Rng + ?Sized,
    {
        if num_players % 2 != 0 {
            return Err(ConfigError::OddPopulationSize { count: num_players }.into());
        }

        let Some(prev_players) = prev_players else {
            tracing::debug!(num_players, "creating initial generation");
            return Ok(self.initial_population(num_players, rng));
        };

        let parents = match self.config.parent_selection {
            ParentSelection::All => {
                if prev_players.len() != num_players {
                    return Err(EvolutionError::ParentCountMismatch {
                        expected: num_players,
                        actual: prev_players.len(),
                    });
                }
                prev_players.iter().collect::<Vec<_>>()
            }
            ParentSelection::Select(mode) => {
                selection::select(prev_players, num_players, mode, rng)?
            }
        };

        let crossover = self.config.crossover();
        let mut children = Vec::with_capacity(num_players);
        for pair in parents.chunks_exact(2) {
            let (mut child1, mut child2) = crossover.apply(pair[0], pair[1], rng)?;
            self.mutation
                .mutate(&mut child1, self.config.mutation_rate, rng);
            self.mutation
                .mutate(&mut child2, self.config.mutation_rate, rng);
            children.push(child1);
            children.push(child2);
        }

        tracing::debug!(
            parent_selection = %self.config.parent_selection,
            crossover = %self.config.crossover_method,
            children = children.len(),
            "bred next generation"
        );
        Ok(children)
    }

    /// Creates `count` agents with freshly initialized networks.
    pub fn initial_population<R>(&self, count: usize, rng: &mut R) -> Vec<Agent>
    where
        R: Rng + ?Sized,
    {
        let EvolutionConfig {
            layer_sizes,
            activation,
            tag,
            ..
        } = &self.config;
        (0..count)
            .map(|_| Agent::random(layer_sizes, *activation, tag, rng))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;
    use crate::{
        agent::Evaluated,
        crossover::CrossoverMethod,
        mutation::NoMutation,
        selection::{SelectionMode, TournamentParams},
    };

    fn rng(seed: u64) -> Pcg64 {
        Pcg64::seed_from_u64(seed)
    }

    fn with_fitness(mut agents: Vec<Agent>, fitness: &[f64]) -> Vec<Agent> {
        for (agent, &f) in agents.iter_mut().zip(fitness) {
            agent.set_fitness(f);
        }
        agents
    }

    #[derive(Debug, Default)]
    struct CountingMutation {
        calls: Cell<usize>,
    }

    impl Mutation for CountingMutation {
        fn mutate<R>(&self, _agent: &mut Agent, _rate: f64, _rng: &mut R)
        where
            R: Rng + ?Sized,
        {
            self.calls.set(self.calls.get() + 1);
        }
    }

    #[test]
    fn test_initial_generation() {
        let config = EvolutionConfig {
            layer_sizes: vec![2, 3, 1],
            ..Default::default()
        };
        let evolution = Evolution::new(config).unwrap();
        let population = evolution
            .generate_new_population(6, None, &mut rng(0))
            .unwrap();
        assert_eq!(population.len(), 6);
        for agent in &population {
            assert_eq!(agent.network().layer_sizes(), &[2, 3, 1]);
            assert_eq!(agent.tag(), "Neuroevolution");
        }
        assert_ne!(population[0], population[1]);
    }

    #[test]
    fn test_rejects_odd_population() {
        let evolution = Evolution::new(EvolutionConfig::default()).unwrap();
        assert_eq!(
            evolution
                .generate_new_population(5, None, &mut rng(0))
                .unwrap_err(),
            EvolutionError::InvalidConfiguration(ConfigError::OddPopulationSize { count: 5 })
        );
    }

    #[test]
    fn test_all_parents_without_crossover_or_mutation_copies_parents() {
        let config = EvolutionConfig {
            crossover_probability: 0.0,
            ..Default::default()
        };
        let evolution = Evolution::with_mutation(config, NoMutation).unwrap();
        let mut rng = rng(1);
        let parents = with_fitness(
            evolution.initial_population(4, &mut rng),
            &[1.0, 2.0, 3.0, 4.0],
        );
        let children = evolution
            .generate_new_population(4, Some(&parents), &mut rng)
            .unwrap();
        assert_eq!(children, parents);
    }

    #[test]
    fn test_all_parents_requires_matching_count() {
        let evolution = Evolution::new(EvolutionConfig::default()).unwrap();
        let mut rng = rng(2);
        let parents = evolution.initial_population(6, &mut rng);
        assert_eq!(
            evolution
                .generate_new_population(4, Some(&parents), &mut rng)
                .unwrap_err(),
            EvolutionError::ParentCountMismatch {
                expected: 4,
                actual: 6
            }
        );
    }

    #[test]
    fn test_children_keep_topology() {
        let config = EvolutionConfig {
            layer_sizes: vec![3, 5, 2],
            crossover_probability: 1.0,
            crossover_method: CrossoverMethod::MultiPoint { points: 2 },
            mutation_rate: 0.5,
            ..Default::default()
        };
        let evolution = Evolution::new(config).unwrap();
        let mut rng = rng(3);
        let parents = evolution.initial_population(8, &mut rng);
        let children = evolution
            .generate_new_population(8, Some(&parents), &mut rng)
            .unwrap();
        assert_eq!(children.len(), 8);
        for child in &children {
            assert_eq!(child.network().shape(), parents[0].network().shape());
        }
    }

    #[test]
    fn test_selected_parents_dominate() {
        let config = EvolutionConfig {
            parent_selection: ParentSelection::Select(SelectionMode::RouletteWheel),
            crossover_probability: 0.0,
            ..Default::default()
        };
        let evolution = Evolution::with_mutation(config, NoMutation).unwrap();
        let mut rng = rng(4);
        let parents = with_fitness(
            evolution.initial_population(4, &mut rng),
            &[0.0, 0.0, 5.0, 0.0],
        );
        let children = evolution
            .generate_new_population(4, Some(&parents), &mut rng)
            .unwrap();
        assert!(children.iter().all(|c| *c == parents[2]));
    }

    #[test]
    fn test_mutation_runs_once_per_child() {
        let config = EvolutionConfig {
            parent_selection: ParentSelection::Select(SelectionMode::Tournament(
                TournamentParams {
                    size: 2,
                    replace: false,
                },
            )),
            ..Default::default()
        };
        let evolution = Evolution::with_mutation(config, CountingMutation::default()).unwrap();
        let mut rng = rng(5);
        let parents = with_fitness(
            evolution.initial_population(4, &mut rng),
            &[1.0, 2.0, 3.0, 4.0],
        );
        let children = evolution
            .generate_new_population(6, Some(&parents), &mut rng)
            .unwrap();
        assert_eq!(children.len(), 6);
        assert_eq!(evolution.mutation.calls.get(), 6);
    }

    #[test]
    fn test_proportionate_parents_need_positive_fitness() {
        let config = EvolutionConfig {
            parent_selection: ParentSelection::Select(SelectionMode::StochasticUniversal),
            ..Default::default()
        };
        let evolution = Evolution::new(config).unwrap();
        let mut rng = rng(6);
        let parents = evolution.initial_population(4, &mut rng);
        assert!(matches!(
            evolution.generate_new_population(4, Some(&parents), &mut rng),
            Err(EvolutionError::InvalidState(_))
        ));
    }

    #[test]
    fn test_survivor_selection_keeps_fittest() {
        let config = EvolutionConfig {
            survivor_selection: SelectionMode::TopK,
            ..Default::default()
        };
        let evolution = Evolution::new(config).unwrap();
        let mut rng = rng(7);
        let pool = with_fitness(
            evolution.initial_population(6, &mut rng),
            &[0.5, 4.0, 1.0, 3.0, 2.0, 0.1],
        );
        let survivors = evolution
            .next_population_selection(&pool, 4, &mut rng)
            .unwrap();
        let fitness = survivors.iter().map(Evaluated::fitness).collect::<Vec<_>>();
        assert_eq!(fitness, vec![4.0, 3.0, 2.0, 1.0]);
        assert_eq!(survivors[0], pool[1]);
    }

    #[test]
    fn test_default_survivor_selection_keeps_first() {
        let evolution = Evolution::new(EvolutionConfig::default()).unwrap();
        let mut rng = rng(8);
        let pool = evolution.initial_population(6, &mut rng);
        let survivors = evolution
            .next_population_selection(&pool, 4, &mut rng)
            .unwrap();
        assert_eq!(survivors, pool[..4]);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let config = EvolutionConfig {
            parent_selection: ParentSelection::Select(SelectionMode::Tournament(
                TournamentParams::default(),
            )),
            ..Default::default()
        };
        let evolution = Evolution::new(config).unwrap();
        let run = |seed| {
            let mut rng = rng(seed);
            let mut population = evolution.generate_new_population(6, None, &mut rng).unwrap();
            for _ in 0..3 {
                for (i, agent) in population.iter_mut().enumerate() {
                    #[expect(clippy::cast_precision_loss)]
                    let fitness = i as f64 + 1.0;
                    agent.set_fitness(fitness);
                }
                population = evolution
                    .generate_new_population(6, Some(&population), &mut rng)
                    .unwrap();
            }
            population
        };
        assert_eq!(run(9), run(9));
        assert_ne!(run(9), run(10));
    }

    #[test]
    fn test_invalid_config_is_rejected_up_front() {
        let config = EvolutionConfig {
            crossover_method: CrossoverMethod::MultiPoint { points: 0 },
            ..Default::default()
        };
        assert!(matches!(
            Evolution::new(config),
            Err(EvolutionError::InvalidConfiguration(
                ConfigError::ZeroCrossoverPoints
            ))
        ));
    }
}
