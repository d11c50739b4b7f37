pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod renderer;
pub mod bridge;
pub mod input;

// Re-export key types at crate root for convenience
pub use api::game::{Game, GameConfig, EngineContext, RenderContext, MeshHit};
pub use api::types::{EntityId, GameEvent};
pub use components::entity::{Entity, TransformAuthority};
pub use components::mesh::{MeshColor, MeshComponent};
pub use core::ray::{Plane, Ray};
pub use core::scene::Scene;
pub use core::time::{FixedTimestep, Timers};
pub use renderer::instance::{RenderInstance, RenderBuffer};
pub use renderer::camera::{Camera3D, CameraUniform, OrbitControls};
pub use input::queue::{InputEvent, InputQueue, KEY_ESCAPE};
pub use bridge::protocol::ProtocolLayout;

#[cfg(feature = "physics")]
pub use core::physics::{
    PhysicsWorld, PhysicsBody, BodyDesc, BodyType,
    ColliderDesc, ColliderMaterial,
};
