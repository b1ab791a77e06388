//! Hyperspace Mathematics Library
//!
//! This crate provides the vector and rotation types shared by the
//! slice-projection engine.
//!
//! ## Core Types
//!
//! - [`Vec3`] - 3D vector for positions inside the visible slice
//! - [`Quat`] - Unit quaternion for pilot orientation
//! - [`DimensionVector`] - Position in the full N-dimensional universe

mod vec3;
mod quat;
mod dimension_vector;

pub use vec3::Vec3;
pub use quat::{Quat, LocalAxis};
pub use dimension_vector::DimensionVector;
