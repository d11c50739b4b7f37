use crate::components::entity::Entity;
use crate::renderer::instance::{RenderBuffer, RenderInstance, FLAG_OUTLINE, FLAG_TEXTURED};

/// Build the render buffer from a set of entities.
/// Opaque boxes come first, translucent ones after `translucent_split`, each
/// group in scene order. Stops at `max_instances`.
pub fn build_render_buffer<'a>(
    entities: impl Iterator<Item = &'a Entity>,
    buffer: &mut RenderBuffer,
    max_instances: usize,
) {
    buffer.clear();

    let mut opaque: Vec<RenderInstance> = Vec::new();
    let mut translucent: Vec<RenderInstance> = Vec::new();

    for entity in entities {
        if !entity.active {
            continue;
        }

        let mesh = match &entity.mesh {
            Some(m) if m.visible => m,
            _ => continue,
        };

        let mut flags = 0;
        if mesh.outline {
            flags |= FLAG_OUTLINE;
        }
        if mesh.textured {
            flags |= FLAG_TEXTURED;
        }

        let instance = RenderInstance {
            position: entity.pos.to_array(),
            rotation: entity.rotation.to_array(),
            size: mesh.size.to_array(),
            color: [mesh.color.r, mesh.color.g, mesh.color.b],
            opacity: mesh.opacity,
            emissive: mesh.emissive,
            flags: flags as f32,
        };

        if mesh.is_translucent() {
            translucent.push(instance);
        } else {
            opaque.push(instance);
        }
    }

    if opaque.len() + translucent.len() > max_instances {
        log::warn!(
            "render buffer full: {} boxes, capacity {}",
            opaque.len() + translucent.len(),
            max_instances
        );
    }

    opaque.truncate(max_instances);
    let split = opaque.len() as u32;
    translucent.truncate(max_instances - opaque.len());

    for inst in opaque {
        buffer.push(inst);
    }
    buffer.set_translucent_split(split);
    for inst in translucent {
        buffer.push(inst);
    }
}
