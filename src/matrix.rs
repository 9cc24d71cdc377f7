//! Dense 2D matrix container
//!
//! Layers exchange data through `Matrix2d`, a row-major `f64` buffer indexed by
//! `(row, col)`. Shapes are not forced to be square so that callers can hand a
//! layer any matrix and get a shape error back instead of a panic.

use crate::error::{LayerError, Result};
use std::ops::{Index, IndexMut};

/// Row-major 2D matrix of `f64` values.
///
/// Indexing with a row or column outside the matrix panics.
///
/// # Example
///
/// ```
/// use conv_layer_nn::matrix::Matrix2d;
///
/// let mut m = Matrix2d::zeros(3);
/// m[(1, 2)] = 4.0;
/// assert_eq!(m.size(), 3);
/// assert!(m.is_square());
/// assert_eq!(m[(1, 2)], 4.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix2d {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix2d {
    /// Create a `size` × `size` matrix filled with zeros.
    pub fn zeros(size: usize) -> Self {
        Self::zeros_rect(size, size)
    }

    /// Create a `rows` × `cols` matrix filled with zeros.
    pub fn zeros_rect(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Build a matrix from nested rows.
    ///
    /// Fails with [`LayerError::RaggedRows`] when the rows differ in length.
    ///
    /// ```
    /// use conv_layer_nn::matrix::Matrix2d;
    ///
    /// let m = Matrix2d::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
    /// assert_eq!(m[(1, 0)], 3.0);
    /// assert!(Matrix2d::from_rows(vec![vec![1.0], vec![2.0, 3.0]]).is_err());
    /// ```
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);

        for (row, values) in rows.iter().enumerate() {
            if values.len() != cols {
                return Err(LayerError::RaggedRows {
                    row,
                    expected: cols,
                    got: values.len(),
                });
            }
            data.extend_from_slice(values);
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Number of rows. For the square matrices used by layers this is the side length.
    pub fn size(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Iterate over the rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.rows).map(move |row| &self.data[row * self.cols..(row + 1) * self.cols])
    }

    /// Flat row-major view of the elements.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Copy into nested rows.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(<[f64]>::to_vec).collect()
    }
}

impl Index<(usize, usize)> for Matrix2d {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(row < self.rows && col < self.cols, "matrix index out of bounds");
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix2d {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        assert!(row < self.rows && col < self.cols, "matrix index out of bounds");
        &mut self.data[row * self.cols + col]
    }
}
