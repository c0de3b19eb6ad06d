//! Runs the update kernel on a headless device and checks it against the
//! CPU step rule.
//!
//! Skips when no adapter is available.

use sparkfield_core::{step_particle, BufferRole, FieldConfig, ParticleStore, SpawnParams, BOUND};
use sparkfield_gpu::{ComputeStage, GpuParticleBuffers, ParticleRenderer};

const WORKGROUP_SIZE: u32 = 64;
const EPSILON: f32 = 1e-6;

fn init_device_queue() -> Option<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))?;

    pollster::block_on(adapter.request_device(
        &wgpu::DeviceDescriptor {
            label: Some("Kernel Test Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
        },
        None,
    ))
    .ok()
}

/// One workgroup: the hand-picked cases first, seeded particles after.
fn kernel_store() -> ParticleStore {
    let seeded =
        ParticleStore::initialize(WORKGROUP_SIZE, 0x5EED, &SpawnParams::default()).unwrap();
    let mut positions = seeded.positions().to_vec();
    let mut velocities = seeded.velocities().to_vec();

    let cases = [
        // Overshoot on x: 0.96 recenters to 0.028
        ([0.95, 0.0], [0.01, 0.0]),
        // Exactly on the bound stays put
        ([BOUND, -BOUND], [0.0, 0.0]),
        // Only y trips, both axes recenter
        ([0.5, 0.949], [0.001, 0.002]),
        ([-0.949, 0.3], [-0.002, 0.001]),
    ];
    for (i, (position, velocity)) in cases.into_iter().enumerate() {
        positions[i] = position;
        velocities[i] = velocity;
    }

    ParticleStore::from_arrays(positions, velocities, seeded.colors().to_vec()).unwrap()
}

fn read_positions(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    buffers: &GpuParticleBuffers,
) -> Vec<[f32; 2]> {
    let source = buffers.buffer(BufferRole::Position);
    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Position Staging Buffer"),
        size: source.size(),
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Readback Encoder"),
    });
    encoder.copy_buffer_to_buffer(source, 0, &staging, 0, source.size());
    queue.submit(Some(encoder.finish()));

    let slice = staging.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        tx.send(result).unwrap();
    });
    device.poll(wgpu::Maintain::Wait);
    rx.recv().unwrap().unwrap();

    let data = slice.get_mapped_range();
    let positions: Vec<[f32; 2]> = bytemuck::cast_slice(&data).to_vec();
    drop(data);
    staging.unmap();
    positions
}

#[test]
fn test_kernel_matches_cpu_step() {
    let Some((device, queue)) = init_device_queue() else {
        println!("Skipped: No GPU");
        return;
    };

    let store = kernel_store();
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let buffers = GpuParticleBuffers::upload(&device, &store).unwrap();
    let compute = ComputeStage::new(&device, &buffers, WORKGROUP_SIZE);

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Kernel Test Encoder"),
    });
    compute.record(&mut encoder, 1);
    queue.submit(Some(encoder.finish()));
    assert!(pollster::block_on(device.pop_error_scope()).is_none());

    let actual = read_positions(&device, &queue, &buffers);
    assert_eq!(actual.len(), store.len());

    for (i, got) in actual.iter().enumerate() {
        let expected = step_particle(store.positions()[i], store.velocities()[i]);
        for axis in 0..2 {
            assert!(
                (got[axis] - expected[axis]).abs() < EPSILON,
                "particle {i}: gpu {got:?}, cpu {expected:?}"
            );
        }
    }

    assert!((actual[0][0] - 0.028).abs() < EPSILON);
    assert_eq!(actual[1], [BOUND, -BOUND]);
}

#[test]
fn test_renderer_records_a_frame() {
    let Some((device, queue)) = init_device_queue() else {
        println!("Skipped: No GPU");
        return;
    };

    let format = wgpu::TextureFormat::Rgba8Unorm;
    let config = FieldConfig {
        particle_count: 1024,
        workgroup_size: WORKGROUP_SIZE,
        ..FieldConfig::default()
    };
    let mut renderer = ParticleRenderer::initialize(&device, &config, format).unwrap();

    let target = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Offscreen Target"),
        size: wgpu::Extent3d {
            width: 64,
            height: 64,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Frame Encoder"),
    });
    assert_eq!(renderer.record_frame(&mut encoder, &view).unwrap(), 0);
    queue.submit(Some(encoder.finish()));
    device.poll(wgpu::Maintain::Wait);
    assert!(pollster::block_on(device.pop_error_scope()).is_none());

    let stats = renderer.stats();
    assert_eq!(stats.frames_completed, 1);
    assert_eq!(stats.barriers_issued, 2);
    assert_eq!(stats.violations, 0);
}
