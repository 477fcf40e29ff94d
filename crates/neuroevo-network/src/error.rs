/// A network or tensor whose parts do not agree on their shape.
///
/// Returned when a [`Matrix`](crate::Matrix) or [`Network`](crate::Network) is built
/// from raw parts, including when one is deserialized.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ShapeError {
    #[display("matrix of shape ({rows}, {cols}) cannot hold {len} values")]
    MatrixLength { rows: usize, cols: usize, len: usize },
    #[display("a network needs at least an input and an output layer, got {count} layers")]
    TooFewLayers { count: usize },
    #[display("layer {layer} has size zero")]
    EmptyLayer { layer: usize },
    #[display(
        "{layers} layers need {} tensors of each kind, got {weights} weights and {biases} biases",
        layers - 1
    )]
    TensorCount {
        layers: usize,
        weights: usize,
        biases: usize,
    },
    #[display("{kind} tensor {index} has shape {actual:?}, expected {expected:?}")]
    TensorShape {
        kind: &'static str,
        index: usize,
        expected: (usize, usize),
        actual: (usize, usize),
    },
}
