//! Drop validation and the translucent placement preview.

use glam::{Quat, Vec3};
use stack_engine::{EngineContext, Entity, EntityId, MeshColor, MeshComponent, Scene};

use crate::config::TowerConfig;
use crate::tower::Tower;

pub const INDICATOR_TAG: &str = "placement_indicator";

/// Height a block dropped on top of the tower should rest at.
///
/// Measured from the highest block that is still part of the tower and not
/// being dragged; an empty tower falls back to the base height.
pub fn top_position(tower: &Tower, scene: &Scene, cfg: &TowerConfig) -> f32 {
    tower
        .iter()
        .filter(|b| !b.removed && !b.is_moving())
        .filter_map(|b| scene.get(b.entity).map(|e| e.pos.y))
        .reduce(f32::max)
        .map(|y| y + cfg.block_height() + cfg.layer_gap)
        .unwrap_or(cfg.tower_base_y)
}

/// Close enough to the top height to show the preview.
pub fn within_drop_height(y: f32, top: f32, cfg: &TowerConfig) -> bool {
    (y - top).abs() < cfg.placement.height_tolerance
}

pub fn is_valid_placement(pos: Vec3, top: f32, cfg: &TowerConfig) -> bool {
    let limit = cfg.placement.horizontal_limit;
    within_drop_height(pos.y, top, cfg) && pos.x.abs() < limit && pos.z.abs() < limit
}

/// Layer index a block resting at `height` belongs to.
pub fn layer_at_height(height: f32, cfg: &TowerConfig) -> i32 {
    // Nudge so a height computed as base + n * step never rounds down to n - 1
    ((height - cfg.tower_base_y) / cfg.layer_step() + 1e-4).floor() as i32
}

/// Translucent box previewing where a dragged block would land.
#[derive(Debug, Default)]
pub struct PlacementIndicator {
    entity: Option<EntityId>,
}

impl PlacementIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the hidden preview mesh. Does nothing if already spawned.
    pub fn spawn(&mut self, ctx: &mut EngineContext, cfg: &TowerConfig) {
        if self.entity.is_some() {
            return;
        }
        let id = ctx.next_id();
        let mesh = MeshComponent::cuboid(
            cfg.block_extent() * cfg.placement.indicator_scale,
            MeshColor::from_hex(cfg.colors.valid_placement),
        )
        .with_opacity(cfg.placement.indicator_opacity)
        .with_visible(false);
        ctx.scene
            .spawn(Entity::new(id).with_tag(INDICATOR_TAG).with_mesh(mesh));
        self.entity = Some(id);
    }

    #[cfg(test)]
    pub fn entity(&self) -> Option<EntityId> {
        self.entity
    }

    pub fn despawn(&mut self, ctx: &mut EngineContext) {
        if let Some(id) = self.entity.take() {
            ctx.scene.despawn(id);
        }
    }

    /// Show the preview under a dragged block when it is near the top height,
    /// green when the drop would be accepted and red otherwise.
    pub fn refresh(
        &self,
        ctx: &mut EngineContext,
        block_pos: Vec3,
        rotation: Quat,
        top: f32,
        cfg: &TowerConfig,
    ) {
        let Some(entity) = self.entity.and_then(|id| ctx.scene.get_mut(id)) else {
            return;
        };
        let Some(mesh) = entity.mesh.as_mut() else {
            return;
        };

        if !within_drop_height(block_pos.y, top, cfg) {
            mesh.visible = false;
            return;
        }

        let color = if is_valid_placement(block_pos, top, cfg) {
            cfg.colors.valid_placement
        } else {
            cfg.colors.invalid_placement
        };
        mesh.visible = true;
        mesh.color = MeshColor::from_hex(color);
        entity.pos = Vec3::new(block_pos.x, top, block_pos.z);
        entity.rotation = rotation;
    }

    pub fn hide(&self, ctx: &mut EngineContext) {
        if let Some(mesh) = self
            .entity
            .and_then(|id| ctx.scene.get_mut(id))
            .and_then(|e| e.mesh.as_mut())
        {
            mesh.visible = false;
        }
    }

    #[cfg(test)]
    pub fn is_visible(&self, ctx: &EngineContext) -> bool {
        self.entity
            .and_then(|id| ctx.scene.get(id))
            .and_then(|e| e.mesh)
            .map(|m| m.visible)
            .unwrap_or(false)
    }
}
