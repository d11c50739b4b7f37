use glam::{Quat, Vec3};
use crate::api::types::EntityId;
use crate::components::mesh::MeshComponent;
#[cfg(feature = "physics")]
use crate::core::physics::PhysicsBody;

/// Which side owns an entity's transform for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformAuthority {
    /// The physics body drives the entity; synced after every step.
    #[default]
    Simulated,
    /// Game code drives the entity and pushes it into the body.
    PlayerControlled,
    /// Neither: the body keeps simulating but the entity is left where it is.
    Detached,
}

/// One scene object. Components are plain optional fields rather than
/// separate storages; a tower has a few dozen of these.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    /// Free-form label, e.g. "block" or "ground".
    pub tag: String,
    /// Inactive entities are not rendered.
    pub active: bool,
    /// World position of the box center.
    pub pos: Vec3,
    pub rotation: Quat,
    /// Entities without a mesh are invisible.
    pub mesh: Option<MeshComponent>,
    pub authority: TransformAuthority,
    #[cfg(feature = "physics")]
    pub body: Option<PhysicsBody>,
}

impl Entity {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            tag: String::new(),
            active: true,
            pos: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            mesh: None,
            authority: TransformAuthority::Simulated,
            #[cfg(feature = "physics")]
            body: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_pos(mut self, pos: Vec3) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_mesh(mut self, mesh: MeshComponent) -> Self {
        self.mesh = Some(mesh);
        self
    }

    #[cfg(feature = "physics")]
    pub fn with_body(mut self, body: PhysicsBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Whether the physics sync may overwrite this entity's transform.
    pub fn follows_body(&self) -> bool {
        self.authority == TransformAuthority::Simulated
    }
}
