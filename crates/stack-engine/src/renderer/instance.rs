use bytemuck::{Pod, Zeroable};

/// Flag bit: draw the highlight outline shell.
pub const FLAG_OUTLINE: u32 = 1;
/// Flag bit: sample the surface texture instead of the flat color.
pub const FLAG_TEXTURED: u32 = 1 << 1;

/// One box as the host renderer sees it, 64 bytes on the wire. `size` is the
/// full extent along each local axis.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct RenderInstance {
    /// Box center in world space.
    pub position: [f32; 3],
    /// Orientation quaternion (x, y, z, w).
    pub rotation: [f32; 4],
    pub size: [f32; 3],
    /// Linear RGB.
    pub color: [f32; 3],
    /// Opacity (0.0 = invisible, 1.0 = opaque).
    pub opacity: f32,
    /// Grey emissive tint added on top of the lit color.
    pub emissive: f32,
    /// Bitset of `FLAG_*` values, stored as a float.
    pub flags: f32,
}

impl RenderInstance {
    pub const FLOATS: usize = 16;

    pub fn has_flag(&self, flag: u32) -> bool {
        (self.flags as u32) & flag != 0
    }
}

/// The packed frame handed to the host.
pub struct RenderBuffer {
    /// Box instances ordered by pass: opaque first, then translucent after
    /// `translucent_split`.
    pub instances: Vec<RenderInstance>,
    /// Index where the translucent pass begins.
    pub translucent_split: u32,
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self {
            instances: Vec::with_capacity(128),
            translucent_split: 0,
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.translucent_split = 0;
    }

    pub fn push(&mut self, instance: RenderInstance) {
        self.instances.push(instance);
    }

    pub fn set_translucent_split(&mut self, split: u32) {
        self.translucent_split = split;
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// The host copies `instance_count() * 16` floats from here.
    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.as_ptr() as *const f32
    }
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new()
    }
}
