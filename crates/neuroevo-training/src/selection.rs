//! Fitness-based selection strategies.
//!
//! Every strategy takes a slice of [`Evaluated`] items whose fitness has already been
//! assigned and returns references to the chosen items, in selection order. Items may
//! appear more than once unless the strategy samples without replacement.
//!
//! # Strategies
//!
//! - [`first`] - keeps the first `k` items unchanged (truncation fallback)
//! - [`top_k`] - the `k` fittest items, stable on ties
//! - [`roulette_wheel`] - `k` independent fitness-proportional draws
//! - [`stochastic_universal_sampling`] - `k` evenly spaced pointers over one ruler
//! - [`q_tournament`] - `k` tournaments of `Q` uniformly drawn contestants
//!
//! [`select`] dispatches on a [`SelectionMode`], which is parsed from its tag once at
//! configuration time.
//!
//! # Random Draw Order
//!
//! Seeded runs are reproducible because each strategy consumes the generator in a fixed
//! order:
//!
//! - [`first`] and [`top_k`] draw nothing.
//! - [`roulette_wheel`] draws one `f64` in `[0, 1)` per output slot.
//! - [`stochastic_universal_sampling`] draws a single offset in `[0, 1/k)`.
//! - [`q_tournament`] runs tournaments one after another; with replacement each contestant
//!   is one `random_range(0..len)` draw, without replacement each tournament is one
//!   [`rand::seq::index::sample`] call.

use std::{cmp::Ordering, fmt, str::FromStr};

use rand::{Rng, seq::index};
use serde::{Deserialize, Serialize};

use crate::{
    agent::Evaluated,
    error::{ConfigError, EvolutionError, FitnessDomainError},
};

/// Parameters of [`q_tournament`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentParams {
    /// Contestants per tournament (`Q`).
    pub size: usize,
    /// Whether contestants are drawn with replacement.
    pub replace: bool,
}

impl Default for TournamentParams {
    fn default() -> Self {
        Self {
            size: 2,
            replace: true,
        }
    }
}

/// A selection strategy together with its parameters.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SelectionMode {
    /// Keep the first `k` items.
    #[default]
    First,
    TopK,
    RouletteWheel,
    #[serde(rename = "sus")]
    StochasticUniversal,
    #[serde(rename = "q_tournament")]
    Tournament(TournamentParams),
}

impl SelectionMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::TopK => "top_k",
            Self::RouletteWheel => "roulette_wheel",
            Self::StochasticUniversal => "sus",
            Self::Tournament(_) => "q_tournament",
        }
    }

    /// Replaces the tournament parameters; other modes are returned unchanged.
    #[must_use]
    pub fn with_tournament(self, params: TournamentParams) -> Self {
        match self {
            Self::Tournament(_) => Self::Tournament(params),
            mode => mode,
        }
    }

    pub(crate) fn validate(self) -> Result<(), ConfigError> {
        match self {
            Self::Tournament(TournamentParams { size: 0, .. }) => {
                Err(ConfigError::ZeroTournamentSize)
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a mode tag. `q_tournament` gets [`TournamentParams::default`]; use
/// [`SelectionMode::with_tournament`] to set `Q` and `replace`.
impl FromStr for SelectionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mode = match s.to_ascii_lowercase().as_str() {
            "first" => Self::First,
            "top_k" => Self::TopK,
            "roulette_wheel" => Self::RouletteWheel,
            "sus" | "stochastic_universal_sampling" => Self::StochasticUniversal,
            "q_tournament" => Self::Tournament(TournamentParams::default()),
            _ => {
                return Err(ConfigError::UnknownSelectionMode { name: s.to_owned() });
            }
        };
        Ok(mode)
    }
}

/// How parents are chosen from the survivors of the previous generation.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentSelection {
    /// Every survivor becomes a parent exactly once, in order.
    #[default]
    All,
    /// Parents are sampled with a selection strategy.
    Select(SelectionMode),
}

impl ParentSelection {
    #[must_use]
    pub fn with_tournament(self, params: TournamentParams) -> Self {
        match self {
            Self::All => Self::All,
            Self::Select(mode) => Self::Select(mode.with_tournament(params)),
        }
    }
}

impl fmt::Display for ParentSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Select(mode) => fmt::Display::fmt(mode, f),
        }
    }
}

impl FromStr for ParentSelection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Select)
        }
    }
}

/// Selects `k` items with the given strategy.
///
/// # Examples
///
/// ```
/// use neuroevo_training::{
///     agent::Evaluated,
///     selection::{self, SelectionMode},
/// };
/// use rand::SeedableRng as _;
///
/// struct Scored(f64);
/// impl Evaluated for Scored {
///     fn fitness(&self) -> f64 {
///         self.0
///     }
/// }
///
/// let items = [Scored(4.0), Scored(3.0), Scored(2.0), Scored(1.0)];
/// let mut rng = rand_pcg::Pcg64::seed_from_u64(0);
///
/// let best = selection::select(&items, 2, SelectionMode::TopK, &mut rng).unwrap();
/// assert_eq!(best.iter().map(|s| s.0).collect::<Vec<_>>(), [4.0, 3.0]);
/// ```
pub fn select<'a, T, R>(
    items: &'a [T],
    k: usize,
    mode: SelectionMode,
    rng: &mut R,
) -> Result<Vec<&'a T>, EvolutionError>
where
    T: Evaluated,
    R: Rng + ?Sized,
{
    tracing::trace!(%mode, k, available = items.len(), "selecting");
    match mode {
        SelectionMode::First => first(items, k),
        SelectionMode::TopK => top_k(items, k),
        SelectionMode::RouletteWheel => roulette_wheel(items, k, rng),
        SelectionMode::StochasticUniversal => stochastic_universal_sampling(items, k, rng),
        SelectionMode::Tournament(params) => q_tournament(items, k, params, rng),
    }
}

/// Returns the first `k` items in their original order.
pub fn first<T>(items: &[T], k: usize) -> Result<Vec<&T>, EvolutionError> {
    ensure_available(k, items.len())?;
    Ok(items[..k].iter().collect())
}

/// Returns the `k` items with the greatest fitness, in descending order.
///
/// The sort is stable, so items with equal fitness (including `0.0` and `-0.0`) keep
/// their original relative order. NaN fitness ranks below every number. Applying
/// `top_k` to its own output with the same `k` yields the same sequence.
pub fn top_k<T>(items: &[T], k: usize) -> Result<Vec<&T>, EvolutionError>
where
    T: Evaluated,
{
    ensure_available(k, items.len())?;
    let mut ranked = items.iter().collect::<Vec<_>>();
    ranked.sort_by(|a, b| rank(a.fitness(), b.fitness()));
    ranked.truncate(k);
    Ok(ranked)
}

/// Normalizes fitness into selection probabilities `p_i = f_i / Σf`.
///
/// The result has one entry per item and sums to 1 within floating-point tolerance.
/// Fails if any fitness is negative or the total is not strictly positive and finite
/// (which includes an empty slice).
pub fn fitness_proportionate<T>(items: &[T]) -> Result<Vec<f64>, EvolutionError>
where
    T: Evaluated,
{
    if let Some((index, fitness)) = items
        .iter()
        .map(Evaluated::fitness)
        .enumerate()
        .find(|(_, f)| *f < 0.0)
    {
        return Err(FitnessDomainError::NegativeFitness { index, fitness }.into());
    }

    let total = items.iter().map(Evaluated::fitness).sum::<f64>();
    if !(total > 0.0 && total.is_finite()) {
        return Err(FitnessDomainError::NonPositiveTotal { total }.into());
    }

    Ok(items.iter().map(|item| item.fitness() / total).collect())
}

/// Draws `k` items independently, each with probability proportional to its fitness.
///
/// Sampling is with replacement. Consumes one uniform `f64` per output slot.
pub fn roulette_wheel<'a, T, R>(
    items: &'a [T],
    k: usize,
    rng: &mut R,
) -> Result<Vec<&'a T>, EvolutionError>
where
    T: Evaluated,
    R: Rng + ?Sized,
{
    if k == 0 {
        return Ok(vec![]);
    }
    let ruler = Ruler::new(&fitness_proportionate(items)?);
    Ok((0..k)
        .map(|_| &items[ruler.locate(rng.random::<f64>())])
        .collect())
}

/// Stochastic universal sampling.
///
/// Lays the selection probabilities end to end on a ruler over `[0, 1]` and places `k`
/// pointers `1/k` apart, starting from a single random offset in `[0, 1/k)`. Each
/// pointer selects the item whose interval `[ruler[j], ruler[j + 1])` contains it; the
/// last non-empty interval is closed on the right.
///
/// Every item is selected either `⌊k·p_i⌋` or `⌈k·p_i⌉` times, which keeps the
/// expected count of roulette-wheel selection with much lower variance. Consumes
/// exactly one random draw when `k > 0` and none otherwise.
pub fn stochastic_universal_sampling<'a, T, R>(
    items: &'a [T],
    k: usize,
    rng: &mut R,
) -> Result<Vec<&'a T>, EvolutionError>
where
    T: Evaluated,
    R: Rng + ?Sized,
{
    if k == 0 {
        return Ok(vec![]);
    }
    let ruler = Ruler::new(&fitness_proportionate(items)?);

    #[expect(clippy::cast_precision_loss)]
    let spacing = 1.0 / k as f64;
    let offset = rng.random_range(0.0..spacing);

    #[expect(clippy::cast_precision_loss)]
    let selected = (0..k)
        .map(|i| &items[ruler.locate(offset + i as f64 * spacing)])
        .collect();
    Ok(selected)
}

/// Runs `k` tournaments of `params.size` contestants drawn uniformly at random and
/// keeps each winner.
///
/// The winner is the contestant with the greatest fitness; on ties the contestant drawn
/// first wins, and a NaN fitness loses to any number. Without replacement, a tournament larger than the population fails with
/// [`EvolutionError::InsufficientPopulation`].
pub fn q_tournament<'a, T, R>(
    items: &'a [T],
    k: usize,
    params: TournamentParams,
    rng: &mut R,
) -> Result<Vec<&'a T>, EvolutionError>
where
    T: Evaluated,
    R: Rng + ?Sized,
{
    let TournamentParams { size, replace } = params;
    if size == 0 {
        return Err(ConfigError::ZeroTournamentSize.into());
    }
    if k == 0 {
        return Ok(vec![]);
    }
    let required = if replace { 1 } else { size };
    ensure_available(required, items.len())?;

    let better = |best: usize, candidate: usize| {
        if rank(items[candidate].fitness(), items[best].fitness()) == Ordering::Less {
            candidate
        } else {
            best
        }
    };

    let winners = (0..k)
        .map(|_| {
            let winner = if replace {
                let first = rng.random_range(0..items.len());
                (1..size).fold(first, |best, _| {
                    better(best, rng.random_range(0..items.len()))
                })
            } else {
                let contestants = index::sample(rng, items.len(), size);
                contestants
                    .iter()
                    .skip(1)
                    .fold(contestants.index(0), |best, i| better(best, i))
            };
            &items[winner]
        })
        .collect();
    Ok(winners)
}

/// Orders fitness values best first, with NaN after every number.
fn rank(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

fn ensure_available(requested: usize, available: usize) -> Result<(), EvolutionError> {
    if requested > available {
        return Err(EvolutionError::InsufficientPopulation {
            requested,
            available,
        });
    }
    Ok(())
}

/// Cumulative probability ruler: `bounds[0] = 0`, `bounds[j + 1] = bounds[j] + p_j`.
#[derive(Debug)]
struct Ruler {
    bounds: Vec<f64>,
    /// Index of the last item with a non-empty interval.
    last: usize,
}

impl Ruler {
    fn new(probabilities: &[f64]) -> Self {
        let mut bounds = Vec::with_capacity(probabilities.len() + 1);
        bounds.push(0.0);
        let mut acc = 0.0;
        for p in probabilities {
            acc += p;
            bounds.push(acc);
        }
        let last = probabilities.iter().rposition(|&p| p > 0.0).unwrap_or(0);
        Self { bounds, last }
    }

    /// Index `j` with `bounds[j] <= pointer < bounds[j + 1]`.
    ///
    /// Empty intervals are never returned. Pointers at or past the end of the ruler
    /// (including rounding slack below 1.0) map to the last non-empty interval.
    fn locate(&self, pointer: f64) -> usize {
        let upper = self.bounds.partition_point(|&b| b <= pointer);
        upper.saturating_sub(1).min(self.last)
    }
}
