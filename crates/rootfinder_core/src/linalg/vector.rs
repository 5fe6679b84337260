//! Dense immutable vector of `f64`.

use nalgebra::DVector;
use std::ops::Index;

/// Immutable ordered sequence of `f64` values.
///
/// An empty vector stands for an absent input: components that require a
/// value reject it with `SolverError::InvalidArgument`.
///
/// # Example
///
/// ```
/// use rootfinder_core::linalg::DoubleVector;
///
/// let v = DoubleVector::new(vec![3.0, 4.0]);
/// assert_eq!(v.len(), 2);
/// assert!((v.norm() - 5.0).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DoubleVector {
    data: DVector<f64>,
}

impl DoubleVector {
    /// Create a vector owning `data`.
    pub fn new(data: Vec<f64>) -> Self {
        Self {
            data: DVector::from_vec(data),
        }
    }

    /// Create a vector by copying a slice.
    pub fn from_slice(data: &[f64]) -> Self {
        Self {
            data: DVector::from_column_slice(data),
        }
    }

    /// Vector of `len` zeros.
    pub fn zeros(len: usize) -> Self {
        Self {
            data: DVector::zeros(len),
        }
    }

    /// Vector of `len` copies of `value`.
    pub fn filled(len: usize, value: f64) -> Self {
        Self {
            data: DVector::from_element(len, value),
        }
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the vector has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Entry at `index`, or `None` when out of range.
    #[inline]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.data.get(index).copied()
    }

    /// Entries as a contiguous slice.
    pub fn as_slice(&self) -> &[f64] {
        self.data.as_slice()
    }

    /// Copy entries into a `Vec`.
    pub fn to_vec(&self) -> Vec<f64> {
        self.data.as_slice().to_vec()
    }

    /// Iterate over entries.
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.data.iter()
    }

    /// Euclidean (L2) norm.
    #[inline]
    pub fn norm(&self) -> f64 {
        self.data.norm()
    }

    /// True if every entry is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }

    /// Shape as a column, `(len, 1)`, for error reporting.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.data.len(), 1)
    }

    pub(crate) fn from_dvector(data: DVector<f64>) -> Self {
        Self { data }
    }

    pub(crate) fn as_dvector(&self) -> &DVector<f64> {
        &self.data
    }
}

impl Index<usize> for DoubleVector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.data[index]
    }
}

impl From<Vec<f64>> for DoubleVector {
    fn from(data: Vec<f64>) -> Self {
        Self::new(data)
    }
}

impl From<&[f64]> for DoubleVector {
    fn from(data: &[f64]) -> Self {
        Self::from_slice(data)
    }
}
