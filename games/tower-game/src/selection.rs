//! Which blocks the player may pick up.

use glam::Vec3;
use stack_engine::{EngineContext, EntityId, Ray};

use crate::tower::Tower;

/// Number of highest occupied layers that are off limits.
const PROTECTED_LAYERS: usize = 3;

/// Result of casting the pointer ray at the selectable blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pick {
    /// Nearest hit may be picked up; `point` is where the ray entered it.
    Actionable { block: EntityId, point: Vec3 },
    /// Nearest hit is selectable but its layer cannot spare it.
    Blocked(EntityId),
    Miss,
}

/// The highest occupied layers, highest first. At most three.
pub fn top_three_layers(tower: &Tower) -> Vec<i32> {
    let mut layers = tower.occupied_layers();
    layers.truncate(PROTECTED_LAYERS);
    layers
}

/// Standing blocks outside the protected top layers.
pub fn selectable_blocks(tower: &Tower) -> Vec<EntityId> {
    let protected = top_three_layers(tower);
    tower
        .iter()
        .filter(|b| !b.removed && !protected.contains(&b.layer))
        .map(|b| b.entity)
        .collect()
}

/// A block may leave its layer only if at least one other block stays behind.
pub fn can_remove_block(tower: &Tower, id: EntityId) -> bool {
    let Some(block) = tower.block(id) else {
        return false;
    };
    let occupants = tower
        .iter()
        .filter(|b| b.layer == block.layer && !b.removed)
        .count();
    occupants > 1
}

/// Hit-test `ray` against the selectable blocks only.
pub fn pick(ctx: &EngineContext, tower: &Tower, ray: &Ray) -> Pick {
    let candidates = selectable_blocks(tower);
    match ctx.raycast_meshes(ray, &candidates).first() {
        Some(hit) if can_remove_block(tower, hit.entity) => Pick::Actionable {
            block: hit.entity,
            point: hit.point,
        },
        Some(hit) => Pick::Blocked(hit.entity),
        None => Pick::Miss,
    }
}

pub fn clear_highlights(ctx: &mut EngineContext, tower: &Tower) {
    for block in tower.iter() {
        if let Some(mesh) = ctx.scene.get_mut(block.entity).and_then(|e| e.mesh.as_mut()) {
            mesh.outline = false;
        }
    }
}

/// Hover pass: clear every outline, then outline the actionable block under
/// the pointer.
pub fn update_hover(ctx: &mut EngineContext, tower: &Tower, ray: &Ray) -> Pick {
    clear_highlights(ctx, tower);
    let result = pick(ctx, tower, ray);
    if let Pick::Actionable { block, .. } = result {
        if let Some(mesh) = ctx.scene.get_mut(block).and_then(|e| e.mesh.as_mut()) {
            mesh.outline = true;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TowerConfig;
    use crate::tower::{layout, Block};
    use stack_engine::{Entity, MeshColor, MeshComponent};

    fn tower_of(layers: u32) -> Tower {
        let cfg = TowerConfig {
            layers,
            ..TowerConfig::default()
        };
        Tower::from_blocks(
            layout(&cfg)
                .iter()
                .enumerate()
                .map(|(i, s)| Block::new(EntityId(i as u32 + 1), s))
                .collect(),
        )
    }

    fn ids_in_layer(tower: &Tower, layer: i32) -> Vec<EntityId> {
        tower
            .iter()
            .filter(|b| b.layer == layer)
            .map(|b| b.entity)
            .collect()
    }

    /// Mirror the tower's blocks into a scene so the ray cast has meshes.
    fn scene_for(tower: &Tower) -> EngineContext {
        let mut ctx = EngineContext::new();
        let cfg = TowerConfig::default();
        for block in tower.iter() {
            ctx.scene.spawn(
                Entity::new(block.entity)
                    .with_pos(block.original_position)
                    .with_rotation(block.original_orientation())
                    .with_mesh(MeshComponent::cuboid(cfg.block_extent(), MeshColor::WHITE)),
            );
        }
        ctx
    }

    #[test]
    fn fresh_tower_protects_top_three_layers() {
        let tower = tower_of(18);
        assert_eq!(top_three_layers(&tower), vec![17, 16, 15]);

        let selectable = selectable_blocks(&tower);
        assert_eq!(selectable.len(), 45);
        for id in &selectable {
            let layer = tower.block(*id).unwrap().layer;
            assert!(layer < 15, "layer {} should be protected", layer);
        }
    }

    #[test]
    fn short_tower_protects_every_layer() {
        let tower = tower_of(2);
        assert_eq!(top_three_layers(&tower), vec![1, 0]);
        assert!(selectable_blocks(&tower).is_empty());
    }

    #[test]
    fn removed_blocks_are_never_selectable() {
        let mut tower = tower_of(6);
        let target = ids_in_layer(&tower, 0)[1];
        tower.block_mut(target).unwrap().removed = true;
        assert!(!selectable_blocks(&tower).contains(&target));
    }

    #[test]
    fn protected_layers_follow_placements() {
        let mut tower = tower_of(6);
        // Empty the top layer entirely: the protection window slides down
        for id in ids_in_layer(&tower, 5) {
            tower.block_mut(id).unwrap().removed = true;
        }
        assert_eq!(top_three_layers(&tower), vec![4, 3, 2]);
        // A placed block keeps its new layer out of the window
        tower.block_mut(EntityId(16)).unwrap().layer = 9;
        assert_eq!(top_three_layers(&tower), vec![4, 3, 2]);
    }

    #[test]
    fn removal_needs_a_remaining_neighbour() {
        let mut tower = tower_of(6);
        let layer = ids_in_layer(&tower, 1);
        assert!(layer.iter().all(|id| can_remove_block(&tower, *id)));

        tower.block_mut(layer[0]).unwrap().removed = true;
        assert!(can_remove_block(&tower, layer[1]));
        assert!(can_remove_block(&tower, layer[2]));

        tower.block_mut(layer[1]).unwrap().removed = true;
        assert!(!can_remove_block(&tower, layer[2]));
    }

    #[test]
    fn unknown_block_is_not_removable() {
        let tower = tower_of(6);
        assert!(!can_remove_block(&tower, EntityId(999)));
    }

    #[test]
    fn pick_hits_nearest_selectable_block() {
        let tower = tower_of(6);
        let ctx = scene_for(&tower);
        // Straight at layer 0 from the +Z side: slot 2 is in front
        let ray = Ray::new(Vec3::new(0.0, 0.25, 10.0), Vec3::new(0.0, 0.0, -1.0));
        let front = ids_in_layer(&tower, 0)[2];
        match pick(&ctx, &tower, &ray) {
            Pick::Actionable { block, point } => {
                assert_eq!(block, front);
                assert!((point.z - 0.5).abs() < 1e-4);
            }
            other => panic!("expected actionable pick, got {:?}", other),
        }
    }

    #[test]
    fn pick_ignores_protected_blocks() {
        let tower = tower_of(6);
        let ctx = scene_for(&tower);
        // Layer 5 is protected and nothing selectable lies behind it
        let y = tower.block(ids_in_layer(&tower, 5)[0]).unwrap().original_position.y;
        let ray = Ray::new(Vec3::new(0.0, y, 10.0), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(pick(&ctx, &tower, &ray), Pick::Miss);
    }

    #[test]
    fn pick_reports_blocked_sole_survivor() {
        let mut tower = tower_of(6);
        let layer = ids_in_layer(&tower, 0);
        tower.block_mut(layer[0]).unwrap().removed = true;
        tower.block_mut(layer[1]).unwrap().removed = true;
        let ctx = scene_for(&tower);

        let ray = Ray::new(Vec3::new(0.0, 0.25, 10.0), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(pick(&ctx, &tower, &ray), Pick::Blocked(layer[2]));
    }

    #[test]
    fn hover_outlines_only_actionable_block() {
        let tower = tower_of(6);
        let mut ctx = scene_for(&tower);
        let ray = Ray::new(Vec3::new(0.0, 0.25, 10.0), Vec3::new(0.0, 0.0, -1.0));

        let result = update_hover(&mut ctx, &tower, &ray);
        let front = ids_in_layer(&tower, 0)[2];
        assert!(matches!(result, Pick::Actionable { block, .. } if block == front));
        let outlined: Vec<EntityId> = ctx
            .scene
            .iter()
            .filter(|e| e.mesh.map(|m| m.outline).unwrap_or(false))
            .map(|e| e.id)
            .collect();
        assert_eq!(outlined, vec![front]);

        let away = Ray::new(Vec3::new(0.0, 50.0, 10.0), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(update_hover(&mut ctx, &tower, &away), Pick::Miss);
        assert!(ctx.scene.iter().all(|e| !e.mesh.unwrap().outline));
    }
}
