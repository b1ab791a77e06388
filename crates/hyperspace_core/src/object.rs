//! Celestial objects
//!
//! Stars and scenery asteroids share one type. Each keeps its true
//! N-dimensional position plus the derived rendered position, visibility and
//! texture state that the frame builder reads.

use std::sync::Arc;
use hyperspace_math::{DimensionVector, Vec3};
use slotmap::new_key_type;

new_key_type! {
    /// Stable key of an object in the world
    ///
    /// Keys of removed objects are never reused for a different object, so a
    /// late texture result for a destroyed object simply fails to resolve.
    pub struct ObjectKey;
}

/// What an object is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Navigation target; persisted in snapshots
    Star,
    /// Nearby asteroid kept around the pilot for a sense of motion
    Scenery,
}

impl ObjectKind {
    /// Numeric tag used in render instances
    pub fn tag(self) -> u32 {
        match self {
            ObjectKind::Star => 0,
            ObjectKind::Scenery => 1,
        }
    }
}

/// Decoded RGBA texture image
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    /// `width * height * 4` bytes, row-major
    pub rgba: Vec<u8>,
}

impl TextureImage {
    /// Solid-colour image
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixels = (width as usize) * (height as usize);
        Self {
            width,
            height,
            rgba: color.iter().copied().cycle().take(pixels * 4).collect(),
        }
    }

    /// True if the pixel buffer matches the dimensions
    pub fn is_well_formed(&self) -> bool {
        self.rgba.len() == (self.width as usize) * (self.height as usize) * 4
    }
}

/// A star or scenery object
#[derive(Clone, Debug)]
pub struct CelestialObject {
    pub kind: ObjectKind,
    /// True position in all N dimensions
    pub position: DimensionVector,
    /// Position in the visible slice
    pub rendered: Vec3,
    pub visible: bool,
    /// Perspective scale from slice distance
    pub scale: f64,
    /// Texture received for this object, kept once loaded
    pub texture: Option<Arc<TextureImage>>,
    /// A texture fetch is outstanding
    pub texture_requested: bool,
    /// The last fetch failed; no new one until the star leaves the radius
    pub texture_failed: bool,
    /// The loaded texture is currently shown
    pub texture_applied: bool,
}

impl CelestialObject {
    /// New object; derived state is filled in on the next refresh
    pub fn new(kind: ObjectKind, position: DimensionVector) -> Self {
        Self {
            kind,
            position,
            rendered: Vec3::ZERO,
            visible: false,
            scale: 1.0,
            texture: None,
            texture_requested: false,
            texture_failed: false,
            texture_applied: false,
        }
    }

    #[inline]
    pub fn is_star(&self) -> bool {
        self.kind == ObjectKind::Star
    }

    /// Store a received texture and show it
    pub fn attach_texture(&mut self, image: Arc<TextureImage>) {
        self.texture = Some(image);
        self.texture_requested = false;
        self.texture_failed = false;
        self.texture_applied = true;
    }
}
