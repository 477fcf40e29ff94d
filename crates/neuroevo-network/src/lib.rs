//! Fixed-topology feed-forward networks used as agent policies.
//!
//! A [`Network`] owns one weight matrix and one bias column per layer transition and
//! evaluates inputs with a single [`Activation`] applied after every layer. The crate
//! knows nothing about evolution: genetic operators in `neuroevo-training` read and
//! rewrite parameters through [`Network::tensors`] and [`Network::tensors_mut`].
//!
//! Shapes are fixed once a network exists. Mutable access only ever hands out
//! parameter values, and networks assembled from raw parts (including deserialized
//! ones) are checked by [`Network::from_parts`].
//!
//! # Parameter Layout
//!
//! ```text
//! layer sizes  [2, 3, 1]
//! weights      (3, 2), (1, 3)    shape = (out, in)
//! biases       (3, 1), (1, 1)    shape = (out, 1)
//! ```
//!
//! All tensors are [`Matrix`] values stored row-major, so a flat index `i` in a
//! tensor of shape `(rows, cols)` corresponds to element `(i / cols, i % cols)`.

pub use self::{
    activation::{Activation, UnknownActivationError},
    error::ShapeError,
    matrix::Matrix,
    network::Network,
};

mod activation;
mod error;
mod matrix;
mod network;
