//! Pick-up, free movement and drop of a single block.

use glam::Vec3;
use stack_engine::{BodyType, EngineContext, EntityId, Plane, Ray, TransformAuthority};

use crate::config::TowerConfig;
use crate::placement::{is_valid_placement, layer_at_height, top_position, PlacementIndicator};
use crate::tower::{BlockMode, Tower};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Selection {
    #[default]
    Idle,
    /// `plane` faces +Z through the point where the block was grabbed.
    Dragging { block: EntityId, plane: Plane },
}

/// How a drag ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    /// Block now rests on top of the tower.
    Committed { layer: i32, height: f32 },
    /// Block went back to where it was built.
    Restored,
}

/// Sole owner of the current selection.
#[derive(Debug, Default)]
pub struct DragController {
    selection: Selection,
    indicator: PlacementIndicator,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the placement preview entity.
    pub fn init(&mut self, ctx: &mut EngineContext, cfg: &TowerConfig) {
        self.indicator.spawn(ctx, cfg);
    }

    #[cfg(test)]
    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.selection, Selection::Dragging { .. })
    }

    #[cfg(test)]
    pub fn indicator(&self) -> &PlacementIndicator {
        &self.indicator
    }

    /// Take control of `block`, grabbed at `point`. Returns false if a drag
    /// is already in progress or the block is unknown.
    pub fn begin(
        &mut self,
        ctx: &mut EngineContext,
        tower: &mut Tower,
        cfg: &TowerConfig,
        block: EntityId,
        point: Vec3,
    ) -> bool {
        if self.is_dragging() {
            return false;
        }
        let Some(record) = tower.block_mut(block) else {
            return false;
        };
        record.mode = BlockMode::PlayerControlled;

        if let Some(entity) = ctx.scene.get_mut(block) {
            entity.authority = TransformAuthority::PlayerControlled;
            if let Some(mesh) = entity.mesh.as_mut() {
                mesh.emissive = cfg.selected_emissive();
                mesh.outline = false;
            }
        }
        ctx.set_body_type(block, BodyType::KinematicPositionBased);
        ctx.zero_velocity(block);

        self.selection = Selection::Dragging {
            block,
            plane: Plane::from_normal_and_point(Vec3::Z, point),
        };
        log::debug!("picked up block {:?}", block);
        true
    }

    /// Move the dragged block to where `ray` meets the drag plane, never
    /// below the current top height. Returns false when nothing moved.
    pub fn drag_to(
        &mut self,
        ctx: &mut EngineContext,
        tower: &Tower,
        cfg: &TowerConfig,
        ray: &Ray,
    ) -> bool {
        let Selection::Dragging { block, plane } = self.selection else {
            return false;
        };
        let Some(hit) = ray.intersect_plane(&plane) else {
            return false;
        };
        let top = top_position(tower, &ctx.scene, cfg);

        let Some(entity) = ctx.scene.get_mut(block) else {
            return false;
        };
        entity.pos.x = hit.x;
        entity.pos.z = hit.z;
        entity.pos.y = entity.pos.y.max(top);
        let (pos, rotation) = (entity.pos, entity.rotation);

        ctx.push_pose(block);
        self.indicator.refresh(ctx, pos, rotation, top, cfg);
        true
    }

    /// Pointer released: place the block on top if the drop is valid,
    /// otherwise put it back. A block whose entity vanished mid-drag is
    /// restored so the selection always ends.
    pub fn release(
        &mut self,
        ctx: &mut EngineContext,
        tower: &mut Tower,
        cfg: &TowerConfig,
    ) -> Option<DragOutcome> {
        let Selection::Dragging { block, .. } = self.selection else {
            return None;
        };
        let top = top_position(tower, &ctx.scene, cfg);
        let outcome = match ctx.scene.get(block).map(|e| e.pos) {
            Some(pos) if is_valid_placement(pos, top, cfg) => {
                self.commit(ctx, tower, cfg, block, top)
            }
            _ => self.restore(ctx, tower, block),
        };
        self.finish(ctx, tower, block, outcome);
        Some(outcome)
    }

    /// Escape: always put the block back.
    pub fn cancel(&mut self, ctx: &mut EngineContext, tower: &mut Tower) -> Option<DragOutcome> {
        let Selection::Dragging { block, .. } = self.selection else {
            return None;
        };
        let outcome = self.restore(ctx, tower, block);
        self.finish(ctx, tower, block, outcome);
        Some(outcome)
    }

    /// Forget the current selection without touching any block. Used when
    /// the whole tower is torn down.
    pub fn reset(&mut self, ctx: &mut EngineContext) {
        self.selection = Selection::Idle;
        self.indicator.hide(ctx);
    }

    /// Reset and remove the preview entity; `init` spawns a fresh one.
    pub fn dispose(&mut self, ctx: &mut EngineContext) {
        self.selection = Selection::Idle;
        self.indicator.despawn(ctx);
    }

    fn commit(
        &self,
        ctx: &mut EngineContext,
        tower: &mut Tower,
        cfg: &TowerConfig,
        block: EntityId,
        top: f32,
    ) -> DragOutcome {
        let layer = layer_at_height(top, cfg);
        if let Some(entity) = ctx.scene.get_mut(block) {
            entity.pos.y = top;
        }
        ctx.push_pose(block);
        if let Some(record) = tower.block_mut(block) {
            record.removed = true;
            record.layer = layer;
        }
        DragOutcome::Committed { layer, height: top }
    }

    fn restore(&self, ctx: &mut EngineContext, tower: &mut Tower, block: EntityId) -> DragOutcome {
        if let Some(record) = tower.block_mut(block) {
            record.removed = false;
            if let Some(entity) = ctx.scene.get_mut(block) {
                entity.pos = record.original_position;
                entity.rotation = record.original_orientation();
            }
        }
        ctx.push_pose(block);
        log::debug!("returned block {:?}", block);
        DragOutcome::Restored
    }

    fn finish(
        &mut self,
        ctx: &mut EngineContext,
        tower: &mut Tower,
        block: EntityId,
        outcome: DragOutcome,
    ) {
        ctx.set_body_type(block, BodyType::Dynamic);
        ctx.zero_velocity(block);
        if let Some(record) = tower.block_mut(block) {
            record.mode = BlockMode::Simulated;
        }
        if let Some(entity) = ctx.scene.get_mut(block) {
            // Placed blocks keep their snapped transform on screen
            entity.authority = match outcome {
                DragOutcome::Committed { .. } => TransformAuthority::Detached,
                DragOutcome::Restored => TransformAuthority::Simulated,
            };
            if let Some(mesh) = entity.mesh.as_mut() {
                mesh.emissive = 0.0;
            }
        }
        self.indicator.hide(ctx);
        self.selection = Selection::Idle;
    }
}
