//! Graphics stage: one non-indexed draw of N isolated points.

use sparkfield_core::BufferRole;

use crate::blend::BlendStateConfig;
use crate::buffers::{GpuParticleBuffers, VERTEX_LAYOUTS};
use crate::shaders::{ParticleShaders, FRAGMENT_ENTRY, VERTEX_ENTRY};

/// Background the points accumulate onto. Black keeps additive colors exact.
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

/// Primitive state of the point draw: isolated points, no culling.
pub const POINT_PRIMITIVE: wgpu::PrimitiveState = wgpu::PrimitiveState {
    topology: wgpu::PrimitiveTopology::PointList,
    strip_index_format: None,
    front_face: wgpu::FrontFace::Ccw,
    cull_mode: None,
    unclipped_depth: false,
    polygon_mode: wgpu::PolygonMode::Fill,
    conservative: false,
};

/// Point-sprite render pipeline.
#[derive(Debug)]
pub struct GraphicsStage {
    pipeline: wgpu::RenderPipeline,
    format: wgpu::TextureFormat,
}

impl GraphicsStage {
    /// Builds the point pipeline targeting `format`.
    ///
    /// Creation errors surface through the device's error scopes.
    #[must_use]
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Render Shader"),
            source: wgpu::ShaderSource::Wgsl(ParticleShaders::render_shader().into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Render Pipeline Layout"),
            bind_group_layouts: &[],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: VERTEX_ENTRY,
                buffers: &VERTEX_LAYOUTS,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: FRAGMENT_ENTRY,
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(BlendStateConfig::ADDITIVE.to_wgpu()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: POINT_PRIMITIVE,
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Self { pipeline, format }
    }

    /// Color target format the pipeline was built for.
    #[must_use]
    pub const fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Records the draw in its own render pass, clearing `target` first.
    pub fn record(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        buffers: &GpuParticleBuffers,
        vertex_count: u32,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Particle Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_vertex_buffer(0, buffers.buffer(BufferRole::Position).slice(..));
        pass.set_vertex_buffer(1, buffers.buffer(BufferRole::Color).slice(..));
        pass.draw(0..vertex_count, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_are_isolated() {
        assert_eq!(POINT_PRIMITIVE.topology, wgpu::PrimitiveTopology::PointList);
        assert_eq!(POINT_PRIMITIVE.strip_index_format, None);
        assert_eq!(POINT_PRIMITIVE.cull_mode, None);
    }
}
