//! The wgpu device context.

use crate::error::{RenderError, RenderResult};

/// GPU context shared by every resource the viewer uploads.
///
/// Headless by construction: the embedding application owns the window
/// and the render passes; the viewer core only needs a device and queue
/// to allocate, stream, and release resources.
pub struct RenderEngine {
    /// The wgpu instance.
    pub instance: wgpu::Instance,
    /// The wgpu adapter.
    pub adapter: wgpu::Adapter,
    /// The wgpu device.
    pub device: wgpu::Device,
    /// The wgpu queue.
    pub queue: wgpu::Queue,
}

impl RenderEngine {
    /// Creates a headless engine.
    pub async fn new_headless() -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..wgpu::InstanceDescriptor::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterCreationFailed)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("arview device (headless)"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
            })
            .await?;

        log::info!(
            "render engine ready on {}",
            adapter.get_info().name
        );

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }

    /// Creates a headless engine, blocking the calling thread on device
    /// acquisition.
    pub fn new_blocking() -> RenderResult<Self> {
        pollster::block_on(Self::new_headless())
    }

    /// Tries to create a headless engine, returning `None` where no
    /// adapter exists (CI machines, containers). Callers keep working
    /// without GPU uploads in that case.
    #[must_use]
    pub fn try_new() -> Option<Self> {
        match Self::new_blocking() {
            Ok(engine) => Some(engine),
            Err(err) => {
                log::warn!("no GPU available, continuing without uploads: {err}");
                None
            }
        }
    }
}
