//! Frame driver: window, surface, device, and the per-frame submit loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use sparkfield_core::{FieldConfig, SparkError};
use sparkfield_gpu::{GpuError, ParticleRenderer};
use thiserror::Error;
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowBuilder},
};

/// Everything that stops the driver.
#[derive(Error, Debug)]
pub enum DriverError {
    /// The event loop could not be created or failed while running.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// The OS refused to create the window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    /// GPU setup or submission failure.
    #[error(transparent)]
    Gpu(#[from] GpuError),

    /// Configuration or protocol failure.
    #[error(transparent)]
    Core(#[from] SparkError),

    /// wgpu reported an error outside any error scope.
    #[error("uncaptured device error: {0}")]
    Device(String),
}

/// Result type for the driver.
pub type DriverResult<T> = Result<T, DriverError>;

/// Counts presented frames and reports a rate once per second.
#[derive(Debug)]
struct FpsCounter {
    frames: u32,
    window_start: Instant,
}

impl FpsCounter {
    const REPORT_INTERVAL: Duration = Duration::from_secs(1);

    fn new(now: Instant) -> Self {
        Self {
            frames: 0,
            window_start: now,
        }
    }

    /// Counts one frame; returns the rate when a reporting window closes.
    fn tick(&mut self, now: Instant) -> Option<f64> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < Self::REPORT_INTERVAL {
            return None;
        }
        let fps = f64::from(self.frames) / elapsed.as_secs_f64();
        self.frames = 0;
        self.window_start = now;
        Some(fps)
    }
}

/// Prefers an sRGB surface format, else the first one offered.
fn select_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(wgpu::TextureFormat::is_srgb)
        .or_else(|| formats.first().copied())
}

const fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

/// Owns every GPU object outside the particle renderer.
struct FrameDriver {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,
    renderer: ParticleRenderer,
    fps: FpsCounter,
    device_error: Arc<Mutex<Option<String>>>,
}

impl FrameDriver {
    fn new(window: Arc<Window>, config: &FieldConfig) -> DriverResult<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(Arc::clone(&window))
            .map_err(GpuError::from)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(GpuError::NoAdapter)?;

        let info = adapter.get_info();
        tracing::info!("Using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("SPARKFIELD Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
            },
            None,
        ))
        .map_err(GpuError::from)?;

        let device_error = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&device_error);
        device.on_uncaptured_error(Box::new(move |err: wgpu::Error| {
            tracing::error!("Uncaptured device error: {}", err);
            sink.lock().get_or_insert_with(|| err.to_string());
        }));

        let caps = surface.get_capabilities(&adapter);
        let format = select_format(&caps.formats).ok_or(GpuError::NoSurfaceFormat)?;
        let size = window.inner_size();
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: present_mode(config.window.vsync),
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            // One frame in flight
            desired_maximum_frame_latency: 1,
        };
        surface.configure(&device, &surface_config);

        let renderer = ParticleRenderer::initialize(&device, config, format)?;

        Ok(Self {
            window,
            surface,
            device,
            queue,
            surface_config,
            renderer,
            fps: FpsCounter::new(Instant::now()),
            device_error,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.surface_config.width = size.width;
        self.surface_config.height = size.height;
        self.surface.configure(&self.device, &self.surface_config);
        tracing::debug!("Surface resized to {}x{}", size.width, size.height);
    }

    fn render(&mut self) -> DriverResult<()> {
        if let Some(message) = self.device_error.lock().take() {
            return Err(DriverError::Device(message));
        }

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                return Ok(());
            }
            Err(err @ wgpu::SurfaceError::OutOfMemory) => {
                return Err(GpuError::Surface(err).into());
            }
            Err(err) => {
                tracing::warn!("Skipping frame: {}", err);
                return Ok(());
            }
        };

        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.renderer.record_frame(&mut encoder, &view)?;

        self.queue.submit(Some(encoder.finish()));
        self.window.pre_present_notify();
        frame.present();

        if let Some(fps) = self.fps.tick(Instant::now()) {
            tracing::info!(
                "{:.1} FPS, {} particles, {} frames",
                fps,
                self.renderer.particle_count(),
                self.renderer.stats().frames_completed
            );
        }
        Ok(())
    }
}

/// Opens the window and drives frames until it closes.
///
/// # Errors
///
/// Window or GPU setup failures, and any fatal error while running.
pub fn run(config: FieldConfig) -> DriverResult<()> {
    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window.title.as_str())
            .with_inner_size(PhysicalSize::new(config.window.width, config.window.height))
            .build(&event_loop)?,
    );

    let mut driver = FrameDriver::new(Arc::clone(&window), &config)?;
    let mut failure = None;

    event_loop.run(|event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { event, window_id } if window_id == window.id() => match event {
                WindowEvent::CloseRequested
                | WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            physical_key: PhysicalKey::Code(KeyCode::Escape),
                            state: ElementState::Pressed,
                            ..
                        },
                    ..
                } => elwt.exit(),
                WindowEvent::Resized(size) => driver.resize(size),
                WindowEvent::RedrawRequested => {
                    if let Err(err) = driver.render() {
                        failure = Some(err);
                        elwt.exit();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => window.request_redraw(),
            _ => {}
        }
    })?;

    let stats = driver.renderer.stats();
    tracing::info!(
        "Shut down after {} frames ({} barriers, {} violations)",
        stats.frames_completed,
        stats.barriers_issued,
        stats.violations
    );

    failure.map_or(Ok(()), Err)
}
