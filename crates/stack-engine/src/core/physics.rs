//! Rapier3D behind a glam-typed facade. Callers never see nalgebra types;
//! they hold a `PhysicsBody` handle pair and go through `PhysicsWorld`.

use glam::{Quat, Vec3};
use rapier3d::prelude::*;
use std::num::NonZeroUsize;

use crate::api::types::EntityId;

fn to_na(v: Vec3) -> nalgebra::Vector3<f32> {
    nalgebra::Vector3::new(v.x, v.y, v.z)
}

fn from_na(v: &nalgebra::Vector3<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn to_isometry(pos: Vec3, rot: Quat) -> nalgebra::Isometry3<f32> {
    let q = nalgebra::Quaternion::new(rot.w, rot.x, rot.y, rot.z);
    nalgebra::Isometry3::from_parts(
        nalgebra::Translation3::new(pos.x, pos.y, pos.z),
        nalgebra::UnitQuaternion::from_quaternion(q),
    )
}

fn from_isometry(iso: &nalgebra::Isometry3<f32>) -> (Vec3, Quat) {
    let r = iso.rotation;
    (
        from_na(&iso.translation.vector),
        Quat::from_xyzw(r.i, r.j, r.k, r.w),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    /// Pushed around by gravity and contacts.
    Dynamic,
    /// Never moves: the ground, and blocks that are not yet in play.
    Fixed,
    /// Teleported by game code each step; pushes dynamic bodies but is never
    /// pushed back.
    KinematicPositionBased,
}

impl From<BodyType> for RigidBodyType {
    fn from(body_type: BodyType) -> Self {
        match body_type {
            BodyType::Dynamic => RigidBodyType::Dynamic,
            BodyType::Fixed => RigidBodyType::Fixed,
            BodyType::KinematicPositionBased => RigidBodyType::KinematicPositionBased,
        }
    }
}

impl From<RigidBodyType> for BodyType {
    fn from(body_type: RigidBodyType) -> Self {
        match body_type {
            RigidBodyType::Dynamic => BodyType::Dynamic,
            RigidBodyType::Fixed => BodyType::Fixed,
            RigidBodyType::KinematicPositionBased | RigidBodyType::KinematicVelocityBased => {
                BodyType::KinematicPositionBased
            }
        }
    }
}

/// Collider shape. Blocks and the ground are both boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderDesc {
    Cuboid { half_extents: Vec3 },
}

impl ColliderDesc {
    fn builder(&self) -> ColliderBuilder {
        match *self {
            ColliderDesc::Cuboid { half_extents: h } => ColliderBuilder::cuboid(h.x, h.y, h.z),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColliderMaterial {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
    /// Total mass; replaces `density` when set.
    pub mass: Option<f32>,
}

impl Default for ColliderMaterial {
    fn default() -> Self {
        Self {
            restitution: 0.3,
            friction: 0.5,
            density: 1.0,
            mass: None,
        }
    }
}

/// Everything needed to create a body, filled in with `with_*` calls.
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub body_type: BodyType,
    pub position: Vec3,
    pub rotation: Quat,
    pub collider: ColliderDesc,
}

impl BodyDesc {
    pub fn new(body_type: BodyType, collider: ColliderDesc) -> Self {
        Self {
            body_type,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            collider,
        }
    }

    pub fn dynamic(collider: ColliderDesc) -> Self {
        Self::new(BodyType::Dynamic, collider)
    }

    pub fn fixed(collider: ColliderDesc) -> Self {
        Self::new(BodyType::Fixed, collider)
    }

    pub fn with_position(mut self, pos: Vec3) -> Self {
        self.position = pos;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Stored on the owning `Entity`.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsBody {
    pub body_handle: RigidBodyHandle,
    pub collider_handle: ColliderHandle,
}

pub struct PhysicsWorld {
    gravity: nalgebra::Vector3<f32>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    pub(crate) bodies: RigidBodySet,
    pub(crate) colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
}

impl PhysicsWorld {
    /// Y is up: pass a negative `gravity.y` to pull things down.
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity: to_na(gravity),
            params: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
        }
    }

    pub fn set_dt(&mut self, dt: f32) {
        self.params.dt = dt;
    }

    /// Zero is treated as one.
    pub fn set_solver_iterations(&mut self, iterations: usize) {
        self.params.num_solver_iterations =
            NonZeroUsize::new(iterations).unwrap_or(NonZeroUsize::MIN);
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = to_na(gravity);
    }

    /// Insert a body with a single attached collider. The owning entity id
    /// rides along in the body's `user_data`.
    pub fn create_body(
        &mut self,
        entity_id: EntityId,
        desc: &BodyDesc,
        material: ColliderMaterial,
    ) -> PhysicsBody {
        let rigid_body = RigidBodyBuilder::new(desc.body_type.into())
            .position(to_isometry(desc.position, desc.rotation))
            .user_data(entity_id.0 as u128)
            .build();
        let body_handle = self.bodies.insert(rigid_body);

        let mut collider = desc
            .collider
            .builder()
            .restitution(material.restitution)
            .friction(material.friction);
        collider = match material.mass {
            Some(mass) => collider.mass(mass),
            None => collider.density(material.density),
        };
        let collider_handle =
            self.colliders
                .insert_with_parent(collider.build(), body_handle, &mut self.bodies);

        PhysicsBody {
            body_handle,
            collider_handle,
        }
    }

    /// Removes the body together with its collider.
    pub fn remove_body(&mut self, body: &PhysicsBody) {
        self.bodies.remove(
            body.body_handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    pub fn step(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &(),
            &(),
        );
    }

    /// Becoming dynamic also wakes the body.
    pub fn set_body_type(&mut self, body: &PhysicsBody, body_type: BodyType) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_body_type(body_type.into(), body_type == BodyType::Dynamic);
        }
    }

    pub fn body_type(&self, body: &PhysicsBody) -> Option<BodyType> {
        self.bodies
            .get(body.body_handle)
            .map(|rb| rb.body_type().into())
    }

    pub fn zero_velocity(&mut self, body: &PhysicsBody) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_linvel(nalgebra::Vector3::zeros(), false);
            rb.set_angvel(nalgebra::Vector3::zeros(), false);
        }
    }

    pub fn sleep(&mut self, body: &PhysicsBody) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.sleep();
        }
    }

    pub fn is_sleeping(&self, body: &PhysicsBody) -> bool {
        self.bodies
            .get(body.body_handle)
            .is_some_and(|rb| rb.is_sleeping())
    }

    /// Teleport. A kinematic body also gets the pose as its next target,
    /// otherwise the following step would pull it back.
    pub fn set_body_pose(&mut self, body: &PhysicsBody, pos: Vec3, rotation: Quat) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            let iso = to_isometry(pos, rotation);
            rb.set_position(iso, true);
            if rb.is_kinematic() {
                rb.set_next_kinematic_position(iso);
            }
        }
    }

    pub fn body_position(&self, body: &PhysicsBody) -> (Vec3, Quat) {
        self.bodies
            .get(body.body_handle)
            .map_or((Vec3::ZERO, Quat::IDENTITY), |rb| from_isometry(rb.position()))
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAVITY: Vec3 = Vec3::new(0.0, -9.8, 0.0);

    fn block() -> ColliderDesc {
        ColliderDesc::Cuboid {
            half_extents: Vec3::new(1.5, 0.25, 0.5),
        }
    }

    fn world() -> PhysicsWorld {
        let mut world = PhysicsWorld::new(GRAVITY);
        world.set_dt(1.0 / 60.0);
        world
    }

    fn ground(world: &mut PhysicsWorld) -> PhysicsBody {
        world.create_body(
            EntityId(100),
            &BodyDesc::fixed(ColliderDesc::Cuboid {
                half_extents: Vec3::new(10.0, 0.5, 10.0),
            })
            .with_position(Vec3::new(0.0, -0.5, 0.0)),
            ColliderMaterial::default(),
        )
    }

    #[test]
    fn removed_body_leaves_the_world() {
        let mut world = world();
        let slab = ground(&mut world);
        let body = world.create_body(EntityId(7), &BodyDesc::dynamic(block()), ColliderMaterial::default());
        assert_eq!(world.body_count(), 2);

        world.remove_body(&body);
        assert_eq!(world.body_count(), 1);
        assert_eq!(world.body_type(&body), None);
        assert_eq!(world.body_type(&slab), Some(BodyType::Fixed));
    }

    #[test]
    fn unsupported_block_falls() {
        let mut world = world();
        let body = world.create_body(
            EntityId(1),
            &BodyDesc::dynamic(block()).with_position(Vec3::new(0.0, 5.0, 0.0)),
            ColliderMaterial::default(),
        );
        for _ in 0..10 {
            world.step();
        }
        let (pos, _) = world.body_position(&body);
        assert!(pos.y < 5.0, "y={}", pos.y);
    }

    #[test]
    fn block_comes_to_rest_on_ground() {
        let mut world = world();
        ground(&mut world);
        let body = world.create_body(
            EntityId(1),
            &BodyDesc::dynamic(block()).with_position(Vec3::new(0.0, 0.5, 0.0)),
            ColliderMaterial::default(),
        );
        for _ in 0..120 {
            world.step();
        }
        let (pos, _) = world.body_position(&body);
        assert!((pos.y - 0.25).abs() < 0.05, "y={}", pos.y);
    }

    #[test]
    fn fixed_block_hangs_in_the_air() {
        let mut world = world();
        let body = world.create_body(
            EntityId(1),
            &BodyDesc::fixed(block()).with_position(Vec3::new(0.0, 3.0, 0.0)),
            ColliderMaterial::default(),
        );
        for _ in 0..10 {
            world.step();
        }
        let (pos, _) = world.body_position(&body);
        assert!((pos.y - 3.0).abs() < 1e-3, "y={}", pos.y);
    }

    #[test]
    fn kinematic_block_ignores_gravity() {
        let mut world = world();
        let body = world.create_body(
            EntityId(1),
            &BodyDesc::dynamic(block()).with_position(Vec3::new(0.0, 4.0, 0.0)),
            ColliderMaterial::default(),
        );
        world.set_body_type(&body, BodyType::KinematicPositionBased);
        world.zero_velocity(&body);
        assert_eq!(world.body_type(&body), Some(BodyType::KinematicPositionBased));

        for _ in 0..10 {
            world.step();
        }
        let (pos, _) = world.body_position(&body);
        assert!((pos.y - 4.0).abs() < 1e-3, "y={}", pos.y);
    }

    #[test]
    fn kinematic_block_stays_where_it_was_put() {
        let mut world = world();
        let body = world.create_body(EntityId(1), &BodyDesc::dynamic(block()), ColliderMaterial::default());
        world.set_body_type(&body, BodyType::KinematicPositionBased);

        let target = Vec3::new(1.0, 6.0, -0.5);
        world.set_body_pose(&body, target, Quat::IDENTITY);
        world.step();

        let (pos, _) = world.body_position(&body);
        assert!((pos - target).length() < 1e-3, "pos={:?}", pos);
    }

    #[test]
    fn pose_keeps_rotation() {
        let mut world = world();
        let body = world.create_body(EntityId(1), &BodyDesc::fixed(block()), ColliderMaterial::default());
        let rot = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        world.set_body_pose(&body, Vec3::new(0.0, 2.0, 0.0), rot);

        let (pos, read_rot) = world.body_position(&body);
        assert!((pos.y - 2.0).abs() < 1e-5);
        assert!(read_rot.angle_between(rot) < 1e-4);
    }

    #[test]
    fn released_block_can_be_put_to_sleep() {
        let mut world = world();
        let body = world.create_body(
            EntityId(1),
            &BodyDesc::fixed(block()),
            ColliderMaterial {
                mass: Some(1.0),
                ..ColliderMaterial::default()
            },
        );
        world.set_body_type(&body, BodyType::Dynamic);
        assert!(!world.is_sleeping(&body));

        world.sleep(&body);
        assert_eq!(world.body_type(&body), Some(BodyType::Dynamic));
        assert!(world.is_sleeping(&body));
    }

    #[test]
    fn zero_velocity_stops_a_falling_block() {
        let mut world = world();
        let body = world.create_body(
            EntityId(1),
            &BodyDesc::dynamic(block()).with_position(Vec3::new(0.0, 10.0, 0.0)),
            ColliderMaterial::default(),
        );
        for _ in 0..20 {
            world.step();
        }
        world.zero_velocity(&body);
        world.set_gravity(Vec3::ZERO);
        let (before, _) = world.body_position(&body);
        world.step();
        let (after, _) = world.body_position(&body);
        assert!((after - before).length() < 1e-5, "moved {:?}", after - before);
    }
}
