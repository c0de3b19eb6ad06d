//! Compute stage: one dispatch advances every particle by one step.

use std::num::NonZeroU64;

use sparkfield_core::store::VEC2_STRIDE;
use sparkfield_core::BufferRole;

use crate::buffers::GpuParticleBuffers;
use crate::shaders::{ParticleShaders, COMPUTE_ENTRY};

/// Update pipeline plus its bind group over positions and velocities.
#[derive(Debug)]
pub struct ComputeStage {
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
    workgroup_size: u32,
}

impl ComputeStage {
    /// Builds the update pipeline for `workgroup_size` invocations per group.
    ///
    /// Creation errors surface through the device's error scopes.
    #[must_use]
    pub fn new(device: &wgpu::Device, buffers: &GpuParticleBuffers, workgroup_size: u32) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Update Shader"),
            source: wgpu::ShaderSource::Wgsl(ParticleShaders::update_shader(workgroup_size).into()),
        });

        let storage_entry = |binding: u32, read_only: bool| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(VEC2_STRIDE),
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle Update Bind Group Layout"),
            entries: &[storage_entry(0, false), storage_entry(1, true)],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Update Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffers.buffer(BufferRole::Position).as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: buffers.buffer(BufferRole::Velocity).as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Update Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Particle Update Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: COMPUTE_ENTRY,
        });

        Self {
            pipeline,
            bind_group,
            workgroup_size,
        }
    }

    /// Invocations per workgroup the pipeline was built for.
    #[must_use]
    pub const fn workgroup_size(&self) -> u32 {
        self.workgroup_size
    }

    /// Records the dispatch in its own compute pass.
    pub fn record(&self, encoder: &mut wgpu::CommandEncoder, workgroups: u32) {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Particle Update Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.dispatch_workgroups(workgroups, 1, 1);
    }
}
