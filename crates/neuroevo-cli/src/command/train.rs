use std::{iter, mem, path::PathBuf};

use anyhow::Context as _;
use chrono::Utc;
use neuroevo_network::Activation;
use neuroevo_training::{
    agent::{Agent, Evaluated as _},
    config::EvolutionConfig,
    crossover::{CrossoverMethod, DEFAULT_CROSSOVER_POINTS},
    evolution::Evolution,
    mutation::GaussianMutation,
    selection::{self, ParentSelection, SelectionMode, TournamentParams},
    stats::FitnessStats,
};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64;

use crate::{
    environment::Task,
    schema::champion::{ChampionModel, GenerationRecord},
    util,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Task the networks are scored on
    #[arg(long, default_value = "xor")]
    task: Task,
    /// Random seed; a fresh one is drawn and logged when omitted
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 100)]
    generations: usize,
    /// Agents per generation (must be even)
    #[arg(long, default_value_t = 50)]
    population: usize,
    /// Hidden layer sizes, comma separated
    #[arg(long, value_delimiter = ',', default_value = "4")]
    hidden: Vec<usize>,
    #[arg(long, default_value = "sigmoid")]
    activation: Activation,
    /// `all`, or a selection mode used to pick parents
    #[arg(long, default_value = "sus")]
    parent_selection: ParentSelection,
    /// Selection mode reducing survivors plus children to the next survivors
    #[arg(long, default_value = "top_k")]
    selection: SelectionMode,
    /// `uniform` or `multi_points`
    #[arg(long, default_value = "uniform")]
    crossover: CrossoverMethod,
    /// Cut points for multi-point crossover
    #[arg(long, default_value_t = DEFAULT_CROSSOVER_POINTS)]
    points: usize,
    /// Tournament size `Q` for `q_tournament`
    #[arg(long, default_value_t = 2)]
    tournament_size: usize,
    /// Draw tournament entrants with replacement
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    tournament_replace: bool,
    #[arg(long, default_value_t = 0.8)]
    crossover_probability: f64,
    #[arg(long, default_value_t = 0.1)]
    mutation_rate: f64,
    #[arg(long, default_value_t = GaussianMutation::DEFAULT_SIGMA)]
    mutation_sigma: f64,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl TrainArg {
    fn to_config(&self) -> EvolutionConfig {
        let tournament = TournamentParams {
            size: self.tournament_size,
            replace: self.tournament_replace,
        };
        let layer_sizes = iter::once(self.task.input_size())
            .chain(self.hidden.iter().copied())
            .chain(iter::once(1))
            .collect();
        EvolutionConfig {
            layer_sizes,
            activation: self.activation,
            tag: self.task.to_string(),
            parent_selection: self.parent_selection.with_tournament(tournament),
            survivor_selection: self.selection.with_tournament(tournament),
            crossover_method: self.crossover.with_points(self.points),
            crossover_probability: self.crossover_probability,
            mutation_rate: self.mutation_rate,
            mutation_sigma: self.mutation_sigma,
        }
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    anyhow::ensure!(arg.generations > 0, "at least one generation is required");
    anyhow::ensure!(arg.population > 0, "population must not be empty");

    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = Pcg64::seed_from_u64(seed);
    let evolution = Evolution::new(arg.to_config())?;
    let task = arg.task;
    let num_players = arg.population;

    tracing::info!(
        %task,
        seed,
        num_players,
        generations = arg.generations,
        layer_sizes = ?evolution.config().layer_sizes,
        "starting training"
    );

    let mut population = evolution.generate_new_population(num_players, None, &mut rng)?;
    let mut survivors = Vec::<Agent>::new();
    let mut learning_curve = Vec::with_capacity(arg.generations);
    for generation in 0..arg.generations {
        task.evaluate(&mut population);
        let stats =
            FitnessStats::from_population(&population).context("generation has no agents")?;
        tracing::info!(
            generation,
            min = format_args!("{:.4}", stats.min),
            max = format_args!("{:.4}", stats.max),
            mean = format_args!("{:.4}", stats.mean),
            median = format_args!("{:.4}", stats.median),
            std_dev = format_args!("{:.4}", stats.std_dev),
            "evaluated generation"
        );
        learning_curve.push(GenerationRecord { generation, stats });

        let pool = mem::take(&mut survivors)
            .into_iter()
            .chain(mem::take(&mut population))
            .collect::<Vec<_>>();
        survivors = evolution.next_population_selection(&pool, num_players, &mut rng)?;

        if generation + 1 < arg.generations {
            population =
                evolution.generate_new_population(num_players, Some(&survivors), &mut rng)?;
        }
    }

    let champion = selection::top_k(&survivors, 1)?
        .into_iter()
        .next()
        .context("no survivors left after training")?;
    let model = ChampionModel {
        name: task.to_string(),
        task,
        trained_at: Utc::now(),
        seed,
        final_fitness: champion.fitness(),
        config: evolution.config().clone(),
        network: champion.network().clone(),
        learning_curve,
    };
    util::save_json(&model, arg.output.as_deref())?;

    let path = arg
        .output
        .as_ref()
        .map_or_else(|| "stdout".to_owned(), |p| p.display().to_string());
    tracing::info!(
        name = %model.name,
        %path,
        final_fitness = format_args!("{:.4}", model.final_fitness),
        parameters = model.network.parameter_count(),
        "champion saved"
    );

    Ok(())
}
