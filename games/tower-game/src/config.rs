//! Tunable game settings.
//!
//! Defaults reproduce the classic 18-layer tower. The host page can override
//! any subset of fields with a JSON document; missing fields keep their
//! defaults.

use glam::Vec3;
use serde::Deserialize;
use std::f32::consts::FRAC_PI_2;
use stack_engine::MeshColor;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TowerConfig {
    /// Block extents: length, height, thickness.
    pub block_size: [f32; 3],
    /// Horizontal gap between neighbours in a layer.
    pub block_gap: f32,
    /// Vertical gap between layers.
    pub layer_gap: f32,
    pub layers: u32,
    pub blocks_per_layer: u32,
    /// Center height of the bottom layer. The ground top sits at 0.1, so the
    /// default puts the first layer exactly on it.
    pub tower_base_y: f32,
    /// Extents of the fixed ground slab centred at the origin.
    pub ground_size: [f32; 3],
    pub physics: PhysicsSettings,
    pub placement: PlacementSettings,
    pub stability: StabilitySettings,
    pub camera: CameraSettings,
    pub colors: ColorSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Vertical gravity (negative is down).
    pub gravity: f32,
    pub time_step: f32,
    pub iterations: usize,
    pub friction: f32,
    pub restitution: f32,
    pub block_mass: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlacementSettings {
    /// Max distance between a dropped block and the top height.
    pub height_tolerance: f32,
    /// Max |x| and |z| of a dropped block.
    pub horizontal_limit: f32,
    pub indicator_scale: f32,
    pub indicator_opacity: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StabilitySettings {
    /// A standing block whose center drops below this height means collapse.
    pub collapse_height: f32,
    /// Seconds between a drag ending and the collapse check.
    pub settle_delay: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub damping: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub max_polar_angle: f32,
}

/// Colors as `0xRRGGBB`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColorSettings {
    pub ground: u32,
    pub valid_placement: u32,
    pub invalid_placement: u32,
    /// Flat block color used when the wood texture is unavailable.
    pub wood_fallback: u32,
    /// Emissive tint of the block being dragged.
    pub selected_emissive: u32,
    /// Hover outline around the block under the pointer.
    pub highlight: u32,
}

impl Default for TowerConfig {
    fn default() -> Self {
        Self {
            block_size: [0.9, 0.3, 0.3],
            block_gap: 0.05,
            layer_gap: 0.0,
            layers: 18,
            blocks_per_layer: 3,
            tower_base_y: 0.25,
            ground_size: [10.0, 0.2, 10.0],
            physics: PhysicsSettings::default(),
            placement: PlacementSettings::default(),
            stability: StabilitySettings::default(),
            camera: CameraSettings::default(),
            colors: ColorSettings::default(),
        }
    }
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: -12.0,
            time_step: 1.0 / 60.0,
            iterations: 10,
            friction: 0.4,
            restitution: 0.2,
            block_mass: 1.0,
        }
    }
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            height_tolerance: 0.5,
            horizontal_limit: 2.0,
            indicator_scale: 1.02,
            indicator_opacity: 0.3,
        }
    }
}

impl Default for StabilitySettings {
    fn default() -> Self {
        Self {
            collapse_height: 0.05,
            settle_delay: 0.1,
        }
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov: 45.0,
            near: 0.1,
            far: 100.0,
            position: [3.0, 6.0, 10.0],
            target: [0.0, 3.0, 0.0],
            damping: 0.05,
            min_distance: 5.0,
            max_distance: 20.0,
            max_polar_angle: FRAC_PI_2 - 0.1,
        }
    }
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            ground: 0x6c4c1b,
            valid_placement: 0x00ff00,
            invalid_placement: 0xff0000,
            wood_fallback: 0x8b4513,
            selected_emissive: 0x333333,
            highlight: 0xffff00,
        }
    }
}

impl TowerConfig {
    /// Parse a (possibly partial) settings document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn block_extent(&self) -> Vec3 {
        Vec3::from_array(self.block_size)
    }

    pub fn block_height(&self) -> f32 {
        self.block_size[1]
    }

    /// Vertical distance between consecutive layer centers.
    pub fn layer_step(&self) -> f32 {
        self.block_height() + self.layer_gap
    }

    /// Distance between neighbouring block centers within a layer.
    pub fn slot_pitch(&self) -> f32 {
        self.block_size[2] + self.block_gap
    }

    pub fn layer_y(&self, layer: u32) -> f32 {
        self.tower_base_y + layer as f32 * self.layer_step()
    }

    pub fn gravity(&self) -> Vec3 {
        Vec3::new(0.0, self.physics.gravity, 0.0)
    }

    /// Grey level of the drag tint.
    pub fn selected_emissive(&self) -> f32 {
        MeshColor::from_hex(self.colors.selected_emissive).r
    }

    pub fn block_count(&self) -> usize {
        (self.layers * self.blocks_per_layer) as usize
    }
}
