//! Axis-to-dimension mapping and the coordinate projector
//!
//! The three render axes X, Y and Z each show one of the N dimensions.
//! [`AxisMapping`] can only be built through validating constructors, so a
//! mapping that reaches [`project`] always has three distinct, in-range
//! dimension indices.

use std::fmt;
use hyperspace_math::{DimensionVector, Vec3};
use serde::{Serialize, Deserialize};

/// Smallest universe with a full 3D slice
pub const MIN_DIMENSIONS: usize = 3;

/// Display colours for the first ten dimensions (RGBA)
pub const DIMENSION_COLORS: [[f32; 4]; 10] = [
    [1.0, 0.0, 0.0, 1.0],     // red
    [0.0, 1.0, 0.0, 1.0],     // green
    [0.0, 0.0, 1.0, 1.0],     // blue
    [1.0, 0.843, 0.0, 1.0],   // gold
    [1.0, 0.0, 1.0, 1.0],     // magenta
    [0.0, 1.0, 1.0, 1.0],     // cyan
    [0.502, 0.0, 0.0, 1.0],   // maroon
    [0.0, 0.502, 0.0, 1.0],   // dark green
    [0.0, 0.0, 0.502, 1.0],   // navy
    [0.502, 0.502, 0.0, 1.0], // olive
];

/// Display colour of a dimension (the palette repeats past ten dimensions)
pub fn dimension_color(dim: usize) -> [f32; 4] {
    DIMENSION_COLORS[dim % DIMENSION_COLORS.len()]
}

/// One of the three visible render axes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in index order
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Array index of this axis
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Axis the view turns about when this axis is remapped
    ///
    /// Remapping X turns about Z, Y about X, and Z about Y.
    pub fn remap_rotation_axis(self) -> Vec3 {
        match self {
            Axis::X => Vec3::Z,
            Axis::Y => Vec3::X,
            Axis::Z => Vec3::Y,
        }
    }

    /// Single-letter label
    pub fn label(self) -> char {
        match self {
            Axis::X => 'X',
            Axis::Y => 'Y',
            Axis::Z => 'Z',
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Reasons a mapping cannot be built
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MappingError {
    /// The same dimension was assigned to two axes
    DuplicateDimension(usize),
    /// A dimension index is not below the dimension count
    DimensionOutOfRange { dimension: usize, dimensions: usize },
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingError::DuplicateDimension(d) => {
                write!(f, "dimension {} is mapped to more than one axis", d)
            }
            MappingError::DimensionOutOfRange { dimension, dimensions } => {
                write!(f, "dimension {} is out of range for {} dimensions", dimension, dimensions)
            }
        }
    }
}

impl std::error::Error for MappingError {}

/// Raw `{x, y, z}` form of a mapping as stored in snapshots
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRecord {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

/// Assignment of each render axis to a distinct dimension
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MappingRecord", into = "MappingRecord")]
pub struct AxisMapping {
    dims: [usize; 3],
}

impl Default for AxisMapping {
    fn default() -> Self {
        Self::identity()
    }
}

impl AxisMapping {
    /// X→0, Y→1, Z→2
    pub const fn identity() -> Self {
        Self { dims: [0, 1, 2] }
    }

    /// Build a mapping for a universe of `dimensions` dimensions
    pub fn new(x: usize, y: usize, z: usize, dimensions: usize) -> Result<Self, MappingError> {
        let mapping = Self::distinct([x, y, z])?;
        mapping.validate(dimensions)?;
        Ok(mapping)
    }

    fn distinct(dims: [usize; 3]) -> Result<Self, MappingError> {
        if dims[0] == dims[1] || dims[0] == dims[2] {
            return Err(MappingError::DuplicateDimension(dims[0]));
        }
        if dims[1] == dims[2] {
            return Err(MappingError::DuplicateDimension(dims[1]));
        }
        Ok(Self { dims })
    }

    /// Check every index is below `dimensions`
    pub fn validate(&self, dimensions: usize) -> Result<(), MappingError> {
        match self.dims.iter().find(|&&d| d >= dimensions) {
            Some(&dimension) => Err(MappingError::DimensionOutOfRange { dimension, dimensions }),
            None => Ok(()),
        }
    }

    /// Dimension shown on `axis`
    #[inline]
    pub fn dimension(&self, axis: Axis) -> usize {
        self.dims[axis.index()]
    }

    /// Dimensions in X, Y, Z order
    #[inline]
    pub fn dimensions(&self) -> [usize; 3] {
        self.dims
    }

    /// True if `dim` is shown on any axis
    #[inline]
    pub fn contains(&self, dim: usize) -> bool {
        self.dims.contains(&dim)
    }

    /// Axis currently showing `dim`
    pub fn axis_of(&self, dim: usize) -> Option<Axis> {
        Axis::ALL.into_iter().find(|a| self.dimension(*a) == dim)
    }

    /// Dimensions of an `n`-dimensional universe not shown on any axis
    pub fn unmapped(&self, n: usize) -> impl Iterator<Item = usize> + '_ {
        (0..n).filter(move |d| !self.contains(*d))
    }

    /// Copy of this mapping with `axis` reassigned to `dim`
    ///
    /// `dim` must be in range and not shown on any axis (including `axis`).
    pub fn with_axis(&self, axis: Axis, dim: usize, dimensions: usize) -> Result<Self, MappingError> {
        if dim >= dimensions {
            return Err(MappingError::DimensionOutOfRange { dimension: dim, dimensions });
        }
        if self.contains(dim) {
            return Err(MappingError::DuplicateDimension(dim));
        }
        let mut dims = self.dims;
        dims[axis.index()] = dim;
        Ok(Self { dims })
    }

    /// Next unmapped dimension after the one on `axis`, wrapping around
    pub fn next_unmapped(&self, axis: Axis, dimensions: usize) -> Option<usize> {
        let current = self.dimension(axis);
        (1..dimensions)
            .map(|step| (current + step) % dimensions)
            .find(|d| !self.contains(*d))
    }

    /// Display colours of the mapped dimensions, indexed by axis
    pub fn axis_colors(&self) -> [[f32; 4]; 3] {
        self.dims.map(dimension_color)
    }
}

impl TryFrom<MappingRecord> for AxisMapping {
    type Error = MappingError;

    fn try_from(record: MappingRecord) -> Result<Self, Self::Error> {
        Self::distinct([record.x, record.y, record.z])
    }
}

impl From<AxisMapping> for MappingRecord {
    fn from(mapping: AxisMapping) -> Self {
        let [x, y, z] = mapping.dims;
        Self { x, y, z }
    }
}

impl fmt::Display for AxisMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{x: {}, y: {}, z: {}}}", self.dims[0], self.dims[1], self.dims[2])
    }
}

/// Project an N-dimensional position onto the render axes
///
/// Returns `(position[m.x], position[m.y], position[m.z])`.
///
/// # Panics
/// Panics if `position` has fewer dimensions than the mapping refers to.
#[inline]
pub fn project(position: &DimensionVector, mapping: &AxisMapping) -> Vec3 {
    Vec3::new(
        position[mapping.dimension(Axis::X)],
        position[mapping.dimension(Axis::Y)],
        position[mapping.dimension(Axis::Z)],
    )
}
