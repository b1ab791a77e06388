//! N-dimensional position vector
//!
//! The number of dimensions is fixed when the world is created, so the
//! vector is a thin wrapper over `Vec<f64>` rather than a const-generic array.

use serde::{Serialize, Deserialize};

/// A true position in the full N-dimensional universe
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionVector(Vec<f64>);

impl DimensionVector {
    /// Origin of an `n`-dimensional space
    pub fn zeros(n: usize) -> Self {
        Self(vec![0.0; n])
    }

    /// Wrap existing components
    pub fn from_vec(components: Vec<f64>) -> Self {
        Self(components)
    }

    /// Number of dimensions
    #[inline]
    pub fn dimensions(&self) -> usize {
        self.0.len()
    }

    /// Component in dimension `dim`, if it exists
    #[inline]
    pub fn get(&self, dim: usize) -> Option<f64> {
        self.0.get(dim).copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.0.iter()
    }

    /// Consume into the raw components
    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }

    /// True if every component is finite
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|c| c.is_finite())
    }

    /// Euclidean distance over all dimensions
    ///
    /// # Panics
    /// Panics if the vectors have different dimension counts.
    pub fn distance(&self, other: &Self) -> f64 {
        assert_eq!(self.dimensions(), other.dimensions(), "dimension mismatch");
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}

impl std::ops::Index<usize> for DimensionVector {
    type Output = f64;
    #[inline]
    fn index(&self, dim: usize) -> &f64 {
        &self.0[dim]
    }
}

impl std::ops::IndexMut<usize> for DimensionVector {
    #[inline]
    fn index_mut(&mut self, dim: usize) -> &mut f64 {
        &mut self.0[dim]
    }
}

impl From<Vec<f64>> for DimensionVector {
    fn from(v: Vec<f64>) -> Self {
        Self(v)
    }
}

impl From<&[f64]> for DimensionVector {
    fn from(v: &[f64]) -> Self {
        Self(v.to_vec())
    }
}
