//! Particle Field Shaders
//!
//! WGSL source for the two stages:
//! 1. Update Shader - advances every position by its velocity, recycling
//!    particles that leave the `±0.95` square
//! 2. Render Shader - passes positions and colors through as point primitives
//!
//! The update kernel mirrors `sparkfield_core::simulation::step_particle`
//! operation for operation. Change both or neither.

use sparkfield_core::BOUND;

/// Placeholder substituted with the configured workgroup size.
const WORKGROUP_SIZE_TOKEN: &str = "{{WORKGROUP_SIZE}}";

/// Placeholder substituted with the recycle bound.
const BOUND_TOKEN: &str = "{{BOUND}}";

/// Entry point of the update kernel.
pub const COMPUTE_ENTRY: &str = "cs_main";
/// Vertex entry point of the point draw.
pub const VERTEX_ENTRY: &str = "vs_main";
/// Fragment entry point of the point draw.
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Container for the particle field shaders
pub struct ParticleShaders;

impl ParticleShaders {
    /// Returns the update compute shader, specialized for `workgroup_size`.
    #[must_use]
    pub fn update_shader(workgroup_size: u32) -> String {
        PARTICLE_UPDATE_WGSL
            .replace(WORKGROUP_SIZE_TOKEN, &workgroup_size.to_string())
            .replace(BOUND_TOKEN, &format!("{BOUND:?}"))
    }

    /// Returns the point render shader (vertex + fragment).
    #[must_use]
    pub fn render_shader() -> &'static str {
        PARTICLE_RENDER_WGSL
    }
}

/// Particle update compute shader
const PARTICLE_UPDATE_WGSL: &str = r#"
// Particle Update Compute Shader
// One invocation per particle, no cross-invocation dependency.

@group(0) @binding(0) var<storage, read_write> positions: array<vec2<f32>>;
@group(0) @binding(1) var<storage, read> velocities: array<vec2<f32>>;

const BOUND: f32 = {{BOUND}};
const RECENTER_SCALE: f32 = 0.05;

@compute @workgroup_size({{WORKGROUP_SIZE}})
fn cs_main(@builtin(global_invocation_id) global_id: vec3<u32>) {
    let idx = global_id.x;
    if idx >= arrayLength(&positions) {
        return;
    }

    let velocity = velocities[idx];
    var moved = positions[idx] + velocity;

    // Either axis out of bounds recycles both components
    if abs(moved.x) > BOUND || abs(moved.y) > BOUND {
        moved = -2.0 * velocity + moved * RECENTER_SCALE;
    }

    positions[idx] = moved;
}
"#;

/// Particle point render shader
const PARTICLE_RENDER_WGSL: &str = r#"
// Particle Point Render Shader
// One vertex = one point. Positions are already in clip space.

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_main(
    @location(0) position: vec2<f32>,
    @location(1) color: vec4<f32>,
) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = vec4<f32>(position, 0.0, 1.0);
    out.color = color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    // Blend hardware does: framebuffer += color * color.a
    return in.color;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_sources_not_empty() {
        assert!(!ParticleShaders::update_shader(256).is_empty());
        assert!(!ParticleShaders::render_shader().is_empty());
    }

    #[test]
    fn test_update_shader_is_specialized() {
        let source = ParticleShaders::update_shader(64);
        assert!(source.contains("@workgroup_size(64)"));
        assert!(source.contains("const BOUND: f32 = 0.95;"));
        assert!(!source.contains("{{"));
    }

    #[test]
    fn test_entry_points_present() {
        assert!(ParticleShaders::update_shader(256).contains(COMPUTE_ENTRY));
        assert!(ParticleShaders::render_shader().contains(VERTEX_ENTRY));
        assert!(ParticleShaders::render_shader().contains(FRAGMENT_ENTRY));
    }
}
