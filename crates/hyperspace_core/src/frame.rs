//! Render frames
//!
//! A [`RenderFrame`] is the per-tick view of the world handed to whatever
//! draws it. Instances are `Pod` so a GPU backend can upload them as-is.

use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use hyperspace_math::{Quat, Vec3};
use crate::object::ObjectKey;
use crate::world::WorldState;

bitflags! {
    /// Per-instance render flags
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct InstanceFlags: u32 {
        /// Object lies inside the slice (always set on emitted instances)
        const VISIBLE = 1 << 0;
        /// Object shows its streamed texture
        const TEXTURED = 1 << 1;
        /// Object is the goal star
        const GOAL = 1 << 2;
    }
}

/// One drawable object
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ObjectInstance {
    pub position: [f32; 3],
    pub scale: f32,
    /// [`crate::ObjectKind::tag`]
    pub kind: u32,
    /// [`InstanceFlags`] bits
    pub flags: u32,
    pub _padding: [u32; 2],
}

impl ObjectInstance {
    pub fn flags(&self) -> InstanceFlags {
        InstanceFlags::from_bits_truncate(self.flags)
    }
}

/// Camera placement for a frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub orientation: Quat,
}

/// Everything needed to draw one frame
#[derive(Clone, Debug, PartialEq)]
pub struct RenderFrame {
    pub camera: CameraPose,
    /// Visible objects only
    pub instances: Vec<ObjectInstance>,
    /// Keys of `instances`, index for index
    pub keys: Vec<ObjectKey>,
    /// Colour of the dimension shown on each axis
    pub axis_colors: [[f32; 4]; 3],
    /// Progress of a running remap transition
    pub transition_progress: Option<f64>,
    pub speed: f64,
    pub goal_achieved: bool,
}

impl RenderFrame {
    /// Collect the visible part of `world`
    pub fn build(world: &WorldState, transition_progress: Option<f64>) -> Self {
        let goal = world.goal();
        let mut instances = Vec::new();
        let mut keys = Vec::new();
        for (key, obj) in world.objects().filter(|(_, o)| o.visible) {
            let mut flags = InstanceFlags::VISIBLE;
            if obj.texture_applied {
                flags |= InstanceFlags::TEXTURED;
            }
            if goal == Some(key) {
                flags |= InstanceFlags::GOAL;
            }
            instances.push(ObjectInstance {
                position: obj.rendered.to_f32_array(),
                scale: obj.scale as f32,
                kind: obj.kind.tag(),
                flags: flags.bits(),
                _padding: [0; 2],
            });
            keys.push(key);
        }
        Self {
            camera: CameraPose {
                position: world.pilot.rendered,
                orientation: world.pilot.orientation,
            },
            instances,
            keys,
            axis_colors: world.mapping().axis_colors(),
            transition_progress,
            speed: world.pilot.flight.speed,
            goal_achieved: world.goal_achieved(),
        }
    }

    /// Raw instance bytes for upload
    pub fn instance_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }
}

/// Consumer of render frames
pub trait SceneSink {
    fn submit(&mut self, frame: &RenderFrame);
}

/// Sink that keeps only the most recent frame
#[derive(Debug, Default)]
pub struct LatestFrame {
    pub frame: Option<RenderFrame>,
    pub submitted: u64,
}

impl SceneSink for LatestFrame {
    fn submit(&mut self, frame: &RenderFrame) {
        self.frame = Some(frame.clone());
        self.submitted += 1;
    }
}
