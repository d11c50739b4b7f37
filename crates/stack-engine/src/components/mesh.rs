use glam::Vec3;

/// Linear RGB color for box meshes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl MeshColor {
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0 };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build a color from a `0xRRGGBB` literal.
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }
}

impl Default for MeshColor {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Component for box meshes drawn by the host renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshComponent {
    /// Full box extents in world units.
    pub size: Vec3,
    pub color: MeshColor,
    /// 1.0 = opaque. Anything lower is drawn in the translucent pass.
    pub opacity: f32,
    /// Additive grey tint (0.0 = none).
    pub emissive: f32,
    /// Draw the highlight outline shell around the box.
    pub outline: bool,
    /// Sample the host's surface texture instead of the flat color.
    pub textured: bool,
    pub visible: bool,
}

impl Default for MeshComponent {
    fn default() -> Self {
        Self {
            size: Vec3::ONE,
            color: MeshColor::default(),
            opacity: 1.0,
            emissive: 0.0,
            outline: false,
            textured: false,
            visible: true,
        }
    }
}

impl MeshComponent {
    pub fn cuboid(size: Vec3, color: MeshColor) -> Self {
        Self {
            size,
            color,
            ..Default::default()
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_textured(mut self, textured: bool) -> Self {
        self.textured = textured;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn half_extents(&self) -> Vec3 {
        self.size * 0.5
    }

    pub fn is_translucent(&self) -> bool {
        self.opacity < 1.0
    }
}
