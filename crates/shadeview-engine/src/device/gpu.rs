use anyhow::{Context, Result};
use winit::window::Window;

use super::{GpuFrame, GpuInit, SurfaceErrorAction, WindowSurface};

/// Owns wgpu core objects and, when bound to a window, its surface.
///
/// This type is the low-level rendering context:
/// - creates and stores Adapter/Device/Queue
/// - optionally creates and configures the Surface (swapchain)
/// - submits recorded frames
pub struct Gpu<'w> {
    /// Selected adapter.
    adapter: wgpu::Adapter,

    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,

    /// Window surface; `None` for headless contexts.
    surface: Option<WindowSurface<'w>>,
}

impl<'w> Gpu<'w> {
    /// Creates a GPU context bound to a window.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = create_instance();

        // Surface lifetime is tied to `window` via `'w`.
        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: init.force_fallback_adapter,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = request_device(&adapter, &init).await?;

        let surface = WindowSurface::configure(surface, &adapter, &device, size, &init)
            .context("no supported surface formats")?;

        let gpu = Gpu {
            adapter,
            device,
            queue,
            surface: Some(surface),
        };
        gpu.log_adapter();
        Ok(gpu)
    }

    /// Returns the window surface, if this context has one.
    pub fn surface(&self) -> Option<&WindowSurface<'w>> {
        self.surface.as_ref()
    }

    /// Mutable access to the window surface.
    pub fn surface_mut(&mut self) -> Option<&mut WindowSurface<'w>> {
        self.surface.as_mut()
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Returns information about the selected adapter.
    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Reconfigures the window surface after a resize. No-op when headless.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if let Some(surface) = self.surface.as_mut() {
            surface.resize(&self.device, new_size);
        }
    }

    /// Converts a `SurfaceError` into a higher-level action.
    pub fn handle_surface_error(&mut self, err: wgpu::SurfaceError) -> SurfaceErrorAction {
        match self.surface.as_mut() {
            Some(surface) => surface.handle_error(&self.device, err),
            None => SurfaceErrorAction::Fatal,
        }
    }

    /// Submits the recorded commands for the given frame and presents it.
    pub fn submit(&self, frame: GpuFrame) {
        let GpuFrame {
            surface_texture,
            view,
            encoder,
        } = frame;
        self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        surface_texture.present();
    }

    fn log_adapter(&self) {
        let info = self.adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);
    }
}

impl Gpu<'static> {
    /// Creates a GPU context with no window or surface.
    ///
    /// Used for offscreen rendering, where the only targets are textures.
    pub async fn headless(init: GpuInit) -> Result<Self> {
        let instance = create_instance();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: None,
                force_fallback_adapter: init.force_fallback_adapter,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = request_device(&adapter, &init).await?;

        let gpu = Gpu {
            adapter,
            device,
            queue,
            surface: None,
        };
        gpu.log_adapter();
        Ok(gpu)
    }
}

fn create_instance() -> wgpu::Instance {
    // Use all backends to allow wgpu to select the optimal platform backend.
    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    })
}

async fn request_device(
    adapter: &wgpu::Adapter,
    init: &GpuInit,
) -> Result<(wgpu::Device, wgpu::Queue)> {
    adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("shadeview device"),
            required_features: init.required_features,
            required_limits: init.required_limits.clone(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        })
        .await
        .context("failed to create wgpu device/queue")
}
