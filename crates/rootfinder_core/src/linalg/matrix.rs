//! Dense immutable matrix of `f64`.

use super::DoubleVector;
use crate::types::{SolverError, SolverResult};
use nalgebra::DMatrix;
use std::ops::Index;

/// Immutable rows × cols array of `f64` values.
///
/// Square when it represents a Jacobian or an inverse-Jacobian estimate.
/// A 0×0 matrix stands for an absent input.
///
/// # Example
///
/// ```
/// use rootfinder_core::linalg::DoubleMatrix;
///
/// let m = DoubleMatrix::new(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
/// assert_eq!(m.shape(), (2, 2));
/// assert_eq!(m[(1, 0)], 3.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DoubleMatrix {
    data: DMatrix<f64>,
}

impl DoubleMatrix {
    /// Create a matrix from row vectors.
    ///
    /// # Errors
    ///
    /// `SolverError::DimensionMismatch` if the rows have different lengths.
    pub fn new(rows: Vec<Vec<f64>>) -> SolverResult<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        if let Some(ragged) = rows.iter().find(|row| row.len() != n_cols) {
            return Err(SolverError::dimension_mismatch(
                "matrix construction",
                (1, ragged.len()),
                (1, n_cols),
            ));
        }
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        Ok(Self {
            data: DMatrix::from_row_slice(n_rows, n_cols, &flat),
        })
    }

    /// Create a matrix from row-major data.
    ///
    /// # Errors
    ///
    /// `SolverError::DimensionMismatch` if `data.len() != rows * cols`.
    pub fn from_row_slice(rows: usize, cols: usize, data: &[f64]) -> SolverResult<Self> {
        if data.len() != rows * cols {
            return Err(SolverError::dimension_mismatch(
                "matrix construction",
                (rows, cols),
                (data.len(), 1),
            ));
        }
        Ok(Self {
            data: DMatrix::from_row_slice(rows, cols, data),
        })
    }

    /// Create a matrix whose entry `(i, j)` is `f(i, j)`.
    pub fn from_fn<F>(rows: usize, cols: usize, f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        Self {
            data: DMatrix::from_fn(rows, cols, f),
        }
    }

    /// Create a matrix from column vectors of equal length.
    ///
    /// # Errors
    ///
    /// `SolverError::DimensionMismatch` if the columns have different lengths.
    pub fn from_columns(columns: &[DoubleVector]) -> SolverResult<Self> {
        let n_rows = columns.first().map_or(0, DoubleVector::len);
        if let Some(ragged) = columns.iter().find(|c| c.len() != n_rows) {
            return Err(SolverError::dimension_mismatch(
                "matrix construction",
                ragged.shape(),
                (n_rows, 1),
            ));
        }
        Ok(Self::from_fn(n_rows, columns.len(), |i, j| columns[j][i]))
    }

    /// N×N identity matrix.
    pub fn identity(n: usize) -> Self {
        Self {
            data: DMatrix::identity(n, n),
        }
    }

    /// rows × cols matrix of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: DMatrix::zeros(rows, cols),
        }
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Shape as `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        self.data.shape()
    }

    /// True if rows == cols.
    #[inline]
    pub fn is_square(&self) -> bool {
        self.data.is_square()
    }

    /// True if the matrix has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Entry at `(row, col)`, or `None` when out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.data.get((row, col)).copied()
    }

    /// Copy of row `index`, or `None` when out of range.
    pub fn row(&self, index: usize) -> Option<DoubleVector> {
        (index < self.rows())
            .then(|| DoubleVector::from_dvector(self.data.row(index).transpose()))
    }

    /// Copy of column `index`, or `None` when out of range.
    pub fn column(&self, index: usize) -> Option<DoubleVector> {
        (index < self.cols())
            .then(|| DoubleVector::from_dvector(self.data.column(index).into_owned()))
    }

    /// Copy entries into row vectors.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect()
    }

    /// True if every entry is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }

    /// Largest absolute entry-wise difference to `other`.
    ///
    /// Returns `f64::INFINITY` when shapes differ.
    pub fn max_abs_diff(&self, other: &DoubleMatrix) -> f64 {
        if self.shape() != other.shape() {
            return f64::INFINITY;
        }
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }

    pub(crate) fn from_dmatrix(data: DMatrix<f64>) -> Self {
        Self { data }
    }

    pub(crate) fn as_dmatrix(&self) -> &DMatrix<f64> {
        &self.data
    }
}

impl Index<(usize, usize)> for DoubleMatrix {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &f64 {
        &self.data[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_row_major() {
        let m = DoubleMatrix::new(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m[(0, 2)], 3.0);
        assert_eq!(m[(1, 0)], 4.0);
        assert_eq!(m.get(2, 0), None);
        assert!(!m.is_square());
    }

    #[test]
    fn test_new_ragged_rows_rejected() {
        let err = DoubleMatrix::new(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(err.is_dimension_mismatch());
    }

    #[test]
    fn test_new_empty_is_zero_by_zero() {
        let m = DoubleMatrix::new(Vec::new()).unwrap();
        assert!(m.is_empty());
        assert_eq!(m.shape(), (0, 0));
    }

    #[test]
    fn test_from_row_slice_length_check() {
        assert!(DoubleMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0]).is_err());
        let m = DoubleMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(m.to_rows(), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn test_rows_and_columns() {
        let m = DoubleMatrix::from_fn(3, 2, |i, j| (10 * i + j) as f64);
        assert_eq!(m.row(2).unwrap().to_vec(), vec![20.0, 21.0]);
        assert_eq!(m.column(1).unwrap().to_vec(), vec![1.0, 11.0, 21.0]);
        assert!(m.row(3).is_none());
        assert!(m.column(2).is_none());
    }

    #[test]
    fn test_from_columns() {
        let cols = vec![
            DoubleVector::new(vec![1.0, 3.0]),
            DoubleVector::new(vec![2.0, 4.0]),
        ];
        let m = DoubleMatrix::from_columns(&cols).unwrap();
        assert_eq!(m.to_rows(), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);

        let ragged = vec![DoubleVector::zeros(2), DoubleVector::zeros(3)];
        assert!(DoubleMatrix::from_columns(&ragged).unwrap_err().is_dimension_mismatch());
    }

    #[test]
    fn test_identity_and_diff() {
        let i = DoubleMatrix::identity(3);
        assert_eq!(i.max_abs_diff(&DoubleMatrix::identity(3)), 0.0);
        assert_eq!(i.max_abs_diff(&DoubleMatrix::zeros(3, 3)), 1.0);
        assert!(i.max_abs_diff(&DoubleMatrix::zeros(2, 2)).is_infinite());
    }

    #[test]
    fn test_is_finite() {
        let mut rows = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        assert!(DoubleMatrix::new(rows.clone()).unwrap().is_finite());
        rows[1][0] = f64::NAN;
        assert!(!DoubleMatrix::new(rows).unwrap().is_finite());
    }
}
