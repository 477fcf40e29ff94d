use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::ShapeError;

/// Dense row-major matrix of `f64` values.
///
/// Weight matrices have shape `(out, in)` and bias vectors are stored as column
/// matrices of shape `(out, 1)`. The flat view returned by [`Matrix::as_slice`]
/// follows row-major order, so element `(r, c)` lives at `r * cols + c`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

#[derive(Deserialize)]
struct RawMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl TryFrom<RawMatrix> for Matrix {
    type Error = ShapeError;

    fn try_from(raw: RawMatrix) -> Result<Self, Self::Error> {
        Self::from_vec(raw.rows, raw.cols, raw.data)
    }
}

impl Matrix {
    /// Creates a matrix filled with zeros.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Creates a matrix by calling `f(row, col)` for every element in row-major order.
    ///
    /// # Examples
    ///
    /// ```
    /// use neuroevo_network::Matrix;
    ///
    /// let m = Matrix::from_fn(2, 3, |r, c| (r * 10 + c) as f64);
    /// assert_eq!(m.shape(), (2, 3));
    /// assert_eq!(m[(1, 2)], 12.0);
    /// ```
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { rows, cols, data }
    }

    /// Wraps row-major `data` as a `(rows, cols)` matrix.
    ///
    /// Fails unless `data` holds exactly `rows * cols` values.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, ShapeError> {
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(ShapeError::MatrixLength {
                rows,
                cols,
                len: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Returns `(rows, cols)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major flat view of the elements.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Mutable row-major flat view of the elements.
    ///
    /// The shape cannot change through this view.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Computes `self · x + bias` for a column vector `x`.
    ///
    /// # Panics
    ///
    /// Panics if `x.len() != self.cols()` or if `bias` is not a `(rows, 1)` column.
    #[must_use]
    pub fn affine(&self, x: &[f64], bias: &Matrix) -> Vec<f64> {
        assert_eq!(x.len(), self.cols, "input length must match matrix columns");
        assert_eq!(bias.shape(), (self.rows, 1), "bias must be a column vector");
        (0..self.rows)
            .map(|r| &self.data[r * self.cols..(r + 1) * self.cols])
            .zip(&bias.data)
            .map(|(row, b)| row.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + b)
            .collect()
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (r, c): (usize, usize)) -> &Self::Output {
        assert!(r < self.rows && c < self.cols, "matrix index out of bounds");
        &self.data[r * self.cols + c]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut Self::Output {
        assert!(r < self.rows && c < self.cols, "matrix index out of bounds");
        &mut self.data[r * self.cols + c]
    }
}
