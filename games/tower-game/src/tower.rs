//! The block grid and its bookkeeping.

use std::collections::BTreeMap;
use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};
use stack_engine::{
    BodyDesc, BodyType, ColliderDesc, ColliderMaterial, EngineContext, Entity, EntityId,
    MeshColor, MeshComponent,
};

use crate::config::TowerConfig;

pub const BLOCK_TAG: &str = "block";
pub const GROUND_TAG: &str = "ground";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockMode {
    /// Physics drives the block.
    Simulated,
    /// The player is dragging the block.
    PlayerControlled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub entity: EntityId,
    /// Tier the block belongs to. Changes when the block is stacked on top.
    pub layer: i32,
    /// Position within the layer at build time. Never reassigned.
    pub slot_index: usize,
    /// Set once the block has been moved to the top of the tower.
    pub removed: bool,
    pub mode: BlockMode,
    pub original_position: Vec3,
    /// Yaw around +Y at build time.
    pub original_rotation: f32,
}

impl Block {
    pub fn new(entity: EntityId, slot: &BlockSlot) -> Self {
        Self {
            entity,
            layer: slot.layer,
            slot_index: slot.slot_index,
            removed: false,
            mode: BlockMode::Simulated,
            original_position: slot.position,
            original_rotation: slot.yaw,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.mode == BlockMode::PlayerControlled
    }

    pub fn original_orientation(&self) -> Quat {
        Quat::from_rotation_y(self.original_rotation)
    }
}

/// Where a block sits in the freshly built tower.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockSlot {
    pub layer: i32,
    pub slot_index: usize,
    pub position: Vec3,
    pub yaw: f32,
}

/// Grid positions for every block, bottom layer first.
///
/// Even layers run along X and are spread along Z; odd layers are turned a
/// quarter and spread along X.
pub fn layout(cfg: &TowerConfig) -> Vec<BlockSlot> {
    let center_index = cfg.blocks_per_layer.saturating_sub(1) as f32 / 2.0;
    let mut slots = Vec::with_capacity(cfg.block_count());

    for layer in 0..cfg.layers {
        let y = cfg.layer_y(layer);
        let even = layer % 2 == 0;
        let yaw = if even { 0.0 } else { FRAC_PI_2 };

        for slot_index in 0..cfg.blocks_per_layer as usize {
            let offset = (slot_index as f32 - center_index) * cfg.slot_pitch();
            let position = if even {
                Vec3::new(0.0, y, offset)
            } else {
                Vec3::new(offset, y, 0.0)
            };
            slots.push(BlockSlot {
                layer: layer as i32,
                slot_index,
                position,
                yaw,
            });
        }
    }
    slots
}

/// Spawn the fixed ground slab. Built once per game, survives restarts.
pub fn spawn_ground(ctx: &mut EngineContext, cfg: &TowerConfig) -> EntityId {
    let size = Vec3::from_array(cfg.ground_size);
    let id = ctx.next_id();
    let entity = Entity::new(id)
        .with_tag(GROUND_TAG)
        .with_mesh(MeshComponent::cuboid(size, MeshColor::from_hex(cfg.colors.ground)));
    let desc = BodyDesc::fixed(ColliderDesc::Cuboid {
        half_extents: size * 0.5,
    });
    let material = ColliderMaterial {
        restitution: cfg.physics.restitution,
        friction: cfg.physics.friction,
        ..ColliderMaterial::default()
    };
    ctx.spawn_with_body(entity, desc, material)
}

/// Authoritative record of every block.
#[derive(Debug, Default)]
pub struct Tower {
    blocks: Vec<Block>,
}

impl Tower {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Spawn every block (entity + body) in the start grid.
    ///
    /// Bodies start fixed so the half-built tower cannot shift; once all exist
    /// they become dynamic and are put to sleep until disturbed.
    pub fn build(ctx: &mut EngineContext, cfg: &TowerConfig, textured: bool) -> Self {
        let extent = cfg.block_extent();
        let material = ColliderMaterial {
            restitution: cfg.physics.restitution,
            friction: cfg.physics.friction,
            density: 1.0,
            mass: Some(cfg.physics.block_mass),
        };

        let mut blocks = Vec::with_capacity(cfg.block_count());
        for slot in layout(cfg) {
            let id = ctx.next_id();
            let mesh = block_mesh(extent, cfg, textured);
            let desc = BodyDesc::fixed(ColliderDesc::Cuboid {
                half_extents: extent * 0.5,
            })
            .with_position(slot.position)
            .with_rotation(Quat::from_rotation_y(slot.yaw));

            ctx.spawn_with_body(
                Entity::new(id).with_tag(BLOCK_TAG).with_mesh(mesh),
                desc,
                material,
            );
            blocks.push(Block::new(id, &slot));
        }

        for block in &blocks {
            ctx.set_body_type(block.entity, BodyType::Dynamic);
            ctx.sleep_body(block.entity);
        }

        log::info!(
            "tower built: {} layers x {} blocks",
            cfg.layers,
            cfg.blocks_per_layer
        );
        Self { blocks }
    }

    /// Despawn every block entity and body.
    pub fn teardown(&mut self, ctx: &mut EngineContext) {
        for block in self.blocks.drain(..) {
            ctx.despawn(block.entity);
        }
    }

    pub fn block(&self, id: EntityId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.entity == id)
    }

    pub fn block_mut(&mut self, id: EntityId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.entity == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Layer -> number of blocks still standing in it.
    pub fn layer_occupancy(&self) -> BTreeMap<i32, usize> {
        let mut occupancy = BTreeMap::new();
        for block in self.blocks.iter().filter(|b| !b.removed) {
            *occupancy.entry(block.layer).or_insert(0) += 1;
        }
        occupancy
    }

    /// Distinct layers with standing blocks, highest first.
    pub fn occupied_layers(&self) -> Vec<i32> {
        self.layer_occupancy().into_keys().rev().collect()
    }

    /// Switch every block to the flat fallback material.
    pub fn apply_fallback_material(&self, ctx: &mut EngineContext, cfg: &TowerConfig) {
        let color = MeshColor::from_hex(cfg.colors.wood_fallback);
        for block in &self.blocks {
            if let Some(mesh) = ctx.scene.get_mut(block.entity).and_then(|e| e.mesh.as_mut()) {
                mesh.textured = false;
                mesh.color = color;
            }
        }
    }
}

fn block_mesh(extent: Vec3, cfg: &TowerConfig, textured: bool) -> MeshComponent {
    if textured {
        MeshComponent::cuboid(extent, MeshColor::WHITE).with_textured(true)
    } else {
        MeshComponent::cuboid(extent, MeshColor::from_hex(cfg.colors.wood_fallback))
    }
}
