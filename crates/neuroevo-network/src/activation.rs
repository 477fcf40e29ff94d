use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Elementwise activation applied after every layer transition.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    /// `1 / (1 + e^-x)`
    #[default]
    Sigmoid,
    /// `max(0, x)`
    Relu,
    /// Hyperbolic tangent.
    Tanh,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown activation function '{name}' (expected sigmoid, relu or tanh)")]
pub struct UnknownActivationError {
    pub name: String,
}

impl Activation {
    pub const ALL: [Self; 3] = [Self::Sigmoid, Self::Relu, Self::Tanh];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sigmoid => "sigmoid",
            Self::Relu => "relu",
            Self::Tanh => "tanh",
        }
    }

    /// Applies the activation to a single value.
    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Self::Relu => x.max(0.0),
            Self::Tanh => x.tanh(),
        }
    }

    /// Applies the activation to every element in place.
    pub fn apply_in_place(self, values: &mut [f64]) {
        for v in values {
            *v = self.apply(*v);
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names are matched case-insensitively, so `"Sigmoid"`, `"ReLU"` and `"tanh"` all parse.
impl FromStr for Activation {
    type Err = UnknownActivationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownActivationError { name: s.to_owned() })
    }
}
