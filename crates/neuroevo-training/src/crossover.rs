//! Crossover operators over network parameter tensors.
//!
//! Both operators start from clones of the two parents and exchange parameter values
//! tensor by tensor, in [`Network::tensors`](neuroevo_network::Network::tensors) order
//! (all weight matrices, then all bias columns). Values are read from the parents and
//! written into the children, so a swap can never observe a half-written child.
//! Tensors are addressed through their row-major flat view; shapes never change.
//!
//! # Operators
//!
//! - [`uniform_crossover`] - every scalar is swapped independently with probability 0.5.
//! - [`multi_point_crossover`] - every tensor is cut into `points + 1` contiguous
//!   segments at `j * len / (points + 1)`; segments with an odd index (the second,
//!   fourth, ...) are swapped and the others are kept.
//!
//! [`Crossover`] gates either operator behind the crossover probability `P_c`.
//!
//! # Random Draw Order
//!
//! [`Crossover::apply`] first draws one `f64` in `[0, 1)` for the gate. If recombination
//! happens, [`uniform_crossover`] then draws one `f64` per scalar in tensor order;
//! [`multi_point_crossover`] draws nothing.

use std::{fmt, str::FromStr};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    agent::Agent,
    error::{ConfigError, EvolutionError},
};

/// Number of cut points used when `multi_points` is parsed without an explicit count.
pub const DEFAULT_CROSSOVER_POINTS: usize = 2;

/// Recombination operator applied when crossover happens.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum CrossoverMethod {
    #[default]
    Uniform,
    /// `points` cut points, giving `points + 1` segments per tensor.
    #[serde(rename = "multi_points")]
    MultiPoint { points: usize },
}

impl CrossoverMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::MultiPoint { .. } => "multi_points",
        }
    }

    /// Sets the cut point count of a multi-point method; uniform is returned unchanged.
    #[must_use]
    pub fn with_points(self, points: usize) -> Self {
        match self {
            Self::Uniform => Self::Uniform,
            Self::MultiPoint { .. } => Self::MultiPoint { points },
        }
    }

    pub(crate) fn validate(self) -> Result<(), ConfigError> {
        match self {
            Self::MultiPoint { points: 0 } => Err(ConfigError::ZeroCrossoverPoints),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for CrossoverMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CrossoverMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uniform" => Ok(Self::Uniform),
            "multi_points" | "multi_point" => Ok(Self::MultiPoint {
                points: DEFAULT_CROSSOVER_POINTS,
            }),
            _ => Err(ConfigError::UnknownCrossoverMethod { name: s.to_owned() }),
        }
    }
}

/// Probabilistic crossover: recombines with probability `probability`, otherwise
/// returns unchanged clones of the parents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossover {
    /// `P_c`, the chance that a pair is recombined at all.
    pub probability: f64,
    pub method: CrossoverMethod,
}

impl Crossover {
    /// Produces two children from two parents.
    ///
    /// Draws the gate value from `rng`, then behaves like [`Self::apply_with_draw`].
    pub fn apply<R>(
        &self,
        parent1: &Agent,
        parent2: &Agent,
        rng: &mut R,
    ) -> Result<(Agent, Agent), EvolutionError>
    where
        R: Rng + ?Sized,
    {
        let draw = rng.random::<f64>();
        self.apply_with_draw(draw, parent1, parent2, rng)
    }

    /// Produces two children using an already drawn gate value.
    ///
    /// Recombination happens only when `draw < probability`; a draw equal to or
    /// above the probability yields unchanged clones. Parents with different
    /// topologies are rejected before anything else happens.
    pub fn apply_with_draw<R>(
        &self,
        draw: f64,
        parent1: &Agent,
        parent2: &Agent,
        rng: &mut R,
    ) -> Result<(Agent, Agent), EvolutionError>
    where
        R: Rng + ?Sized,
    {
        ensure_same_shape(parent1, parent2)?;
        if draw >= self.probability {
            tracing::trace!(draw, probability = self.probability, "crossover skipped");
            return Ok((parent1.clone(), parent2.clone()));
        }
        match self.method {
            CrossoverMethod::Uniform => uniform_crossover(parent1, parent2, rng),
            CrossoverMethod::MultiPoint { points } => {
                multi_point_crossover(parent1, parent2, points)
            }
        }
    }
}

/// Swaps every scalar parameter between the children independently with probability 0.5.
///
/// For each scalar, in tensor order, one `f64` is drawn; values above 0.5 swap.
pub fn uniform_crossover<R>(
    parent1: &Agent,
    parent2: &Agent,
    rng: &mut R,
) -> Result<(Agent, Agent), EvolutionError>
where
    R: Rng + ?Sized,
{
    recombine(parent1, parent2, |source1, source2, target1, target2| {
        for i in 0..source1.len() {
            if rng.random::<f64>() > 0.5 {
                target1[i] = source2[i];
                target2[i] = source1[i];
            }
        }
    })
}

/// Cuts every tensor into `points + 1` equal segments and swaps the odd-indexed ones.
///
/// Segment `j` of a tensor with `len` scalars spans `[j * len / (points + 1),
/// (j + 1) * len / (points + 1))` using integer division. With one point this is the
/// classic single-point crossover: the first half stays, the second half is swapped.
pub fn multi_point_crossover(
    parent1: &Agent,
    parent2: &Agent,
    points: usize,
) -> Result<(Agent, Agent), EvolutionError> {
    if points == 0 {
        return Err(ConfigError::ZeroCrossoverPoints.into());
    }
    let segments = points + 1;
    recombine(parent1, parent2, |source1, source2, target1, target2| {
        let len = source1.len();
        for segment in (1..segments).step_by(2) {
            let range = segment * len / segments..(segment + 1) * len / segments;
            target1[range.clone()].copy_from_slice(&source2[range.clone()]);
            target2[range.clone()].copy_from_slice(&source1[range]);
        }
    })
}

/// Clones both parents and lets `exchange` rewrite each pair of child tensors,
/// reading the matching parent tensors.
fn recombine<F>(
    parent1: &Agent,
    parent2: &Agent,
    mut exchange: F,
) -> Result<(Agent, Agent), EvolutionError>
where
    F: FnMut(&[f64], &[f64], &mut [f64], &mut [f64]),
{
    ensure_same_shape(parent1, parent2)?;

    let mut child1 = parent1.clone();
    let mut child2 = parent2.clone();
    let sources = parent1
        .network()
        .tensors()
        .zip(parent2.network().tensors());
    let targets = child1
        .network_mut()
        .tensors_mut()
        .zip(child2.network_mut().tensors_mut());
    for ((source1, source2), (target1, target2)) in sources.zip(targets) {
        exchange(source1.as_slice(), source2.as_slice(), target1, target2);
    }
    Ok((child1, child2))
}

fn ensure_same_shape(parent1: &Agent, parent2: &Agent) -> Result<(), EvolutionError> {
    let left = parent1.network().shape();
    let right = parent2.network().shape();
    if left != right {
        return Err(EvolutionError::ShapeMismatch { left, right });
    }
    Ok(())
}
