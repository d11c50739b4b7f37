use glam::{Vec2, Vec3};

use crate::api::types::{EntityId, GameEvent};
use crate::core::ray::Ray;
use crate::core::scene::Scene;
use crate::input::queue::InputQueue;
use crate::renderer::camera::Camera3D;
use crate::renderer::instance::RenderBuffer;
#[cfg(feature = "physics")]
use crate::components::entity::Entity;
#[cfg(feature = "physics")]
use crate::core::physics::{BodyDesc, BodyType, ColliderMaterial, PhysicsWorld};

/// What a game asks of the engine before it starts. Read once by the runner.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Seconds per simulation step.
    pub fixed_dt: f32,
    /// Canvas size in pixels until the first resize arrives.
    pub viewport: Vec2,
    /// Capacity of the shared instance section; extra boxes are not drawn.
    pub max_instances: usize,
    /// Events past this count in one frame are dropped.
    pub max_events: usize,
    /// Zero by default. Y is up.
    #[cfg(feature = "physics")]
    pub gravity: Vec3,
    #[cfg(feature = "physics")]
    pub solver_iterations: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            viewport: Vec2::new(800.0, 600.0),
            max_instances: 256,
            max_events: 32,
            #[cfg(feature = "physics")]
            gravity: Vec3::ZERO,
            #[cfg(feature = "physics")]
            solver_iterations: 4,
        }
    }
}

/// Hooks the runner calls. Per fixed step the order is `update`, physics
/// step with body sync, then `post_physics`.
pub trait Game {
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Build the starting scene.
    fn init(&mut self, ctx: &mut EngineContext);

    /// Input for the frame is only visible on the first step of a frame.
    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue);

    fn post_physics(&mut self, _ctx: &mut EngineContext) {}

    /// Settings pushed by the host page as JSON. May arrive before `init`.
    fn load_config(&mut self, _ctx: &mut EngineContext, _json: &str) {}

    /// Last chance to append instances after the scene has been packed.
    fn render(&self, _ctx: &mut RenderContext) {}
}

/// A ray hit on an entity's box mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshHit {
    pub entity: EntityId,
    pub point: Vec3,
    pub distance: f32,
}

/// Engine state a game works against.
pub struct EngineContext {
    pub scene: Scene,
    pub events: Vec<GameEvent>,
    pub camera: Camera3D,
    next_id: u32,
    #[cfg(feature = "physics")]
    pub physics: PhysicsWorld,
}

impl EngineContext {
    pub fn new() -> Self {
        Self::with_config(&GameConfig::default())
    }

    pub fn with_config(config: &GameConfig) -> Self {
        #[cfg(feature = "physics")]
        let physics = {
            let mut world = PhysicsWorld::new(config.gravity);
            world.set_dt(config.fixed_dt);
            world.set_solver_iterations(config.solver_iterations);
            world
        };

        Self {
            scene: Scene::new(),
            events: Vec::new(),
            camera: Camera3D::new(45.0, 0.1, 100.0, config.viewport),
            next_id: 1,
            #[cfg(feature = "physics")]
            physics,
        }
    }

    /// Ids start at 1 and are never reused.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Queue an event for the host; it is readable after the current tick.
    pub fn emit_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn clear_frame_data(&mut self) {
        self.events.clear();
    }

    /// Cast `ray` against the box meshes of `candidates` only.
    /// Hits come back nearest first; hidden or mesh-less entities are skipped.
    pub fn raycast_meshes(&self, ray: &Ray, candidates: &[EntityId]) -> Vec<MeshHit> {
        let mut hits: Vec<MeshHit> = candidates
            .iter()
            .filter_map(|&id| {
                let entity = self.scene.get(id)?;
                let mesh = entity.mesh.as_ref().filter(|m| m.visible)?;
                let distance = ray.intersect_box(entity.pos, entity.rotation, mesh.half_extents())?;
                Some(MeshHit {
                    entity: id,
                    point: ray.at(distance),
                    distance,
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Spawn `entity` with a body built from `desc`. The entity's transform is
    /// overwritten with the body's starting pose.
    #[cfg(feature = "physics")]
    pub fn spawn_with_body(
        &mut self,
        entity: Entity,
        desc: BodyDesc,
        material: ColliderMaterial,
    ) -> EntityId {
        let id = entity.id;
        let body = self.physics.create_body(id, &desc, material);
        let entity = entity
            .with_pos(desc.position)
            .with_rotation(desc.rotation)
            .with_body(body);
        self.scene.spawn(entity);
        id
    }

    /// Remove the entity and its body, if it has one.
    #[cfg(feature = "physics")]
    pub fn despawn(&mut self, id: EntityId) {
        if let Some(entity) = self.scene.despawn(id) {
            if let Some(body) = &entity.body {
                self.physics.remove_body(body);
            }
        }
    }

    #[cfg(feature = "physics")]
    pub fn set_body_type(&mut self, id: EntityId, body_type: BodyType) {
        if let Some(body) = self.scene.get(id).and_then(|e| e.body) {
            self.physics.set_body_type(&body, body_type);
        }
    }

    #[cfg(feature = "physics")]
    pub fn zero_velocity(&mut self, id: EntityId) {
        if let Some(body) = self.scene.get(id).and_then(|e| e.body) {
            self.physics.zero_velocity(&body);
        }
    }

    #[cfg(feature = "physics")]
    pub fn sleep_body(&mut self, id: EntityId) {
        if let Some(body) = self.scene.get(id).and_then(|e| e.body) {
            self.physics.sleep(&body);
        }
    }

    /// Push the entity's current transform into its body.
    #[cfg(feature = "physics")]
    pub fn push_pose(&mut self, id: EntityId) {
        if let Some(entity) = self.scene.get(id) {
            if let Some(body) = entity.body {
                self.physics.set_body_pose(&body, entity.pos, entity.rotation);
            }
        }
    }

    /// Advance the world one step, then copy body poses onto every entity
    /// whose authority is `Simulated`.
    #[cfg(feature = "physics")]
    pub fn step_physics(&mut self) {
        self.physics.step();

        for entity in self.scene.iter_mut() {
            if !entity.follows_body() {
                continue;
            }
            if let Some(body) = &entity.body {
                let (pos, rot) = self.physics.body_position(body);
                entity.pos = pos;
                entity.rotation = rot;
            }
        }
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}

pub struct RenderContext<'a> {
    pub render_buffer: &'a mut RenderBuffer,
}
