use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::{Activation, Matrix, ShapeError};

/// Fully connected feed-forward network with a fixed topology.
///
/// For layer sizes `[n0, n1, ..., nL]` the network holds `L` weight matrices of
/// shape `(n{i+1}, n{i})` and `L` bias columns of shape `(n{i+1}, 1)`. The
/// topology never changes after construction; genetic operators only rewrite
/// parameter values in place. Deserialization goes through [`Network::from_parts`],
/// so a loaded network satisfies the same shape rules as a freshly created one.
///
/// # Example
///
/// ```
/// use neuroevo_network::{Activation, Network};
/// use rand::SeedableRng as _;
///
/// let mut rng = rand_pcg::Pcg64::seed_from_u64(7);
/// let network = Network::random(&[2, 3, 1], Activation::Sigmoid, &mut rng);
///
/// let output = network.forward(&[0.5, -1.0]);
/// assert_eq!(output.len(), 1);
/// assert!(0.0 < output[0] && output[0] < 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNetwork")]
pub struct Network {
    layer_sizes: Vec<usize>,
    weights: Vec<Matrix>,
    biases: Vec<Matrix>,
    activation: Activation,
}

#[derive(Deserialize)]
struct RawNetwork {
    layer_sizes: Vec<usize>,
    weights: Vec<Matrix>,
    biases: Vec<Matrix>,
    activation: Activation,
}

impl TryFrom<RawNetwork> for Network {
    type Error = ShapeError;

    fn try_from(raw: RawNetwork) -> Result<Self, Self::Error> {
        Self::from_parts(raw.layer_sizes, raw.weights, raw.biases, raw.activation)
    }
}

impl Network {
    /// Creates a network with `N(0, 1)` weights and zero biases.
    ///
    /// Weights are drawn layer by layer, each matrix in row-major order.
    ///
    /// # Panics
    ///
    /// Panics if fewer than two layer sizes are given or any layer size is zero.
    pub fn random<R>(layer_sizes: &[usize], activation: Activation, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        assert!(
            layer_sizes.len() >= 2,
            "a network needs at least an input and an output layer"
        );
        assert!(
            layer_sizes.iter().all(|&n| n > 0),
            "layer sizes must be positive"
        );

        let (weights, biases) = layer_sizes
            .windows(2)
            .map(|pair| {
                let (inputs, outputs) = (pair[0], pair[1]);
                let weight = Matrix::from_fn(outputs, inputs, |_, _| rng.sample(StandardNormal));
                (weight, Matrix::zeros(outputs, 1))
            })
            .unzip();

        Self {
            layer_sizes: layer_sizes.to_vec(),
            weights,
            biases,
            activation,
        }
    }

    /// Assembles a network from existing tensors.
    ///
    /// Requires at least two positive layer sizes, one weight matrix of shape
    /// `(n{i+1}, n{i})` and one bias column of shape `(n{i+1}, 1)` per transition.
    pub fn from_parts(
        layer_sizes: Vec<usize>,
        weights: Vec<Matrix>,
        biases: Vec<Matrix>,
        activation: Activation,
    ) -> Result<Self, ShapeError> {
        if layer_sizes.len() < 2 {
            return Err(ShapeError::TooFewLayers {
                count: layer_sizes.len(),
            });
        }
        if let Some(layer) = layer_sizes.iter().position(|&n| n == 0) {
            return Err(ShapeError::EmptyLayer { layer });
        }
        let transitions = layer_sizes.len() - 1;
        if weights.len() != transitions || biases.len() != transitions {
            return Err(ShapeError::TensorCount {
                layers: layer_sizes.len(),
                weights: weights.len(),
                biases: biases.len(),
            });
        }
        for (index, pair) in layer_sizes.windows(2).enumerate() {
            check_shape("weight", index, (pair[1], pair[0]), &weights[index])?;
            check_shape("bias", index, (pair[1], 1), &biases[index])?;
        }
        Ok(Self {
            layer_sizes,
            weights,
            biases,
            activation,
        })
    }

    /// Sizes of every layer, input first.
    #[must_use]
    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    #[must_use]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn set_activation(&mut self, activation: Activation) {
        self.activation = activation;
    }

    #[must_use]
    pub fn weights(&self) -> &[Matrix] {
        &self.weights
    }

    /// Weight from input `col` to output `row` of layer transition `layer`.
    pub fn weight_mut(&mut self, layer: usize, row: usize, col: usize) -> &mut f64 {
        &mut self.weights[layer][(row, col)]
    }

    /// Replaces the weight matrix of transition `layer` with one of the same shape.
    pub fn set_weights(&mut self, layer: usize, weights: Matrix) -> Result<(), ShapeError> {
        check_shape("weight", layer, self.weights[layer].shape(), &weights)?;
        self.weights[layer] = weights;
        Ok(())
    }

    #[must_use]
    pub fn biases(&self) -> &[Matrix] {
        &self.biases
    }

    pub fn bias_mut(&mut self, layer: usize, row: usize) -> &mut f64 {
        &mut self.biases[layer][(row, 0)]
    }

    /// Replaces the bias column of transition `layer` with one of the same shape.
    pub fn set_biases(&mut self, layer: usize, biases: Matrix) -> Result<(), ShapeError> {
        check_shape("bias", layer, self.biases[layer].shape(), &biases)?;
        self.biases[layer] = biases;
        Ok(())
    }

    /// Iterates over every parameter tensor: all weight matrices in layer order,
    /// then all bias columns in layer order.
    ///
    /// Genetic operators rely on this order being stable.
    pub fn tensors(&self) -> impl Iterator<Item = &Matrix> {
        self.weights.iter().chain(&self.biases)
    }

    /// Row-major parameter values of every tensor, in [`Self::tensors`] order.
    ///
    /// Only values are exposed, so shapes stay fixed.
    pub fn tensors_mut(&mut self) -> impl Iterator<Item = &mut [f64]> {
        self.weights
            .iter_mut()
            .chain(&mut self.biases)
            .map(Matrix::as_mut_slice)
    }

    /// Shapes of every tensor in [`Self::tensors`] order.
    ///
    /// Two networks can exchange parameters only if their shapes are equal.
    #[must_use]
    pub fn shape(&self) -> Vec<(usize, usize)> {
        self.tensors().map(Matrix::shape).collect()
    }

    /// Total number of trainable parameters.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.tensors().map(Matrix::len).sum()
    }

    /// Runs a forward pass and returns the output layer activations.
    ///
    /// Each layer computes `activation(W · x + b)` and feeds the result into the next.
    ///
    /// # Panics
    ///
    /// Panics if `input.len()` differs from the first layer size.
    #[must_use]
    pub fn forward(&self, input: &[f64]) -> Vec<f64> {
        assert_eq!(
            input.len(),
            self.layer_sizes[0],
            "input length must match the input layer size"
        );
        let mut values = input.to_vec();
        for (weight, bias) in self.weights.iter().zip(&self.biases) {
            values = weight.affine(&values, bias);
            self.activation.apply_in_place(&mut values);
        }
        values
    }
}

fn check_shape(
    kind: &'static str,
    index: usize,
    expected: (usize, usize),
    tensor: &Matrix,
) -> Result<(), ShapeError> {
    if tensor.shape() != expected {
        return Err(ShapeError::TensorShape {
            kind,
            index,
            expected,
            actual: tensor.shape(),
        });
    }
    Ok(())
}
