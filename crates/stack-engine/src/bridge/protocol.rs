//! Shape of the float buffer the host shares with its render worker.
//!
//! ```text
//! | header (16) | instances (max_instances * 16) | events (max_events * 4) | camera (20) |
//! ```
//!
//! The host reads the capacities once at startup and derives every offset
//! from them, so this file and the host's copy have to agree.

use crate::api::game::GameConfig;

pub const HEADER_FLOATS: usize = 16;
pub const INSTANCE_FLOATS: usize = 16;
/// kind, a, b, c
pub const EVENT_FLOATS: usize = 4;
/// View-projection matrix followed by the eye position.
pub const CAMERA_FLOATS: usize = 20;

pub const PROTOCOL_VERSION: f32 = 2.0;

/// Capacities and total size of the shared buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    pub max_instances: usize,
    pub max_events: usize,
    pub buffer_total_floats: usize,
}

impl ProtocolLayout {
    pub fn new(max_instances: usize, max_events: usize) -> Self {
        Self {
            max_instances,
            max_events,
            buffer_total_floats: HEADER_FLOATS
                + max_instances * INSTANCE_FLOATS
                + max_events * EVENT_FLOATS
                + CAMERA_FLOATS,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.max_instances, config.max_events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::GameEvent;
    use crate::renderer::camera::CameraUniform;
    use crate::renderer::instance::RenderInstance;

    #[test]
    fn total_covers_every_section() {
        let layout = ProtocolLayout::new(100, 20);
        assert_eq!(layout.buffer_total_floats, 16 + 1600 + 80 + 20);
        assert_eq!(ProtocolLayout::new(0, 0).buffer_total_floats, 36);
    }

    #[test]
    fn default_config_capacities() {
        let layout = ProtocolLayout::from_config(&GameConfig::default());
        assert_eq!(layout.max_instances, 256);
        assert_eq!(layout.max_events, 32);
    }

    #[test]
    fn record_sizes_agree_with_types() {
        assert_eq!(INSTANCE_FLOATS, RenderInstance::FLOATS);
        assert_eq!(EVENT_FLOATS, GameEvent::FLOATS);
        assert_eq!(std::mem::size_of::<CameraUniform>(), CAMERA_FLOATS * 4);
    }
}
