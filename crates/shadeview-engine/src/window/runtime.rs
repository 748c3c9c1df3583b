use std::time::Instant;

use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::config::ViewerConfig;
use crate::device::{Gpu, GpuInit};
use crate::time::FramePacer;
use crate::viewer::ShaderViewer;

/// Entry point for the interactive viewer.
pub struct Runtime;

impl Runtime {
    /// Opens the window and runs the frame loop until the window is closed.
    ///
    /// Shader load failures are logged and survived. Anything else (missing
    /// texture, device loss, rendering with no program) stops the loop and is
    /// returned.
    pub fn run(config: ViewerConfig, gpu_init: GpuInit) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    pacer: FramePacer,

    window: Window,

    #[borrows(window)]
    #[covariant]
    viewer: ShaderViewer<'this>,
}

struct AppState {
    config: ViewerConfig,
    gpu_init: GpuInit,

    entry: Option<WindowEntry>,

    /// First error that stopped the loop.
    failure: Option<anyhow::Error>,
}

impl AppState {
    fn new(config: ViewerConfig, gpu_init: GpuInit) -> Self {
        Self {
            config,
            gpu_init,
            entry: None,
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        if self.failure.is_none() {
            self.failure = Some(err);
        }
        event_loop.exit();
    }

    /// Creates the window, the GPU context on it, and performs the startup loads.
    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(
                f64::from(self.config.width),
                f64::from(self.config.height),
            ));

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let config = &self.config;
        let gpu_init = self.gpu_init.clone();

        WindowEntryTryBuilder {
            pacer: FramePacer::new(config.frame_rate),
            window,
            viewer_builder: |w| {
                let gpu = pollster::block_on(Gpu::new(w, gpu_init))?;
                let mut viewer = ShaderViewer::new(gpu, config);
                viewer.load_shaders();
                viewer.load_texture(&config.texture)?;
                Ok::<_, anyhow::Error>(viewer)
            },
        }
        .try_build()
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        match self.create_window_entry(event_loop) {
            Ok(entry) => {
                entry.with_window(|w| w.request_redraw());
                self.entry = Some(entry);
            }
            Err(e) => self.fail(event_loop, e.context("failed to start viewer")),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(entry) = self.entry.as_ref() else {
            return;
        };

        let deadline = entry.borrow_pacer().deadline();
        if entry.borrow_pacer().is_due(Instant::now()) {
            entry.with_window(|w| w.request_redraw());
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(deadline));
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                log::debug!("close requested");
                event_loop.exit();
            }

            WindowEvent::Focused(true) => {
                entry.with_viewer_mut(|viewer| viewer.check_for_changes());
            }

            WindowEvent::Resized(new_size) => {
                entry.with_viewer_mut(|viewer| viewer.resize(new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                entry.with_viewer_mut(|viewer| viewer.resize(new_size));
            }

            WindowEvent::RedrawRequested => {
                let result = entry.with_mut(|fields| {
                    fields.pacer.tick(Instant::now());
                    fields.window.pre_present_notify();
                    fields.viewer.render_frame()
                });

                if let Err(e) = result {
                    self.fail(event_loop, e.context("render failed"));
                }
            }

            _ => {}
        }
    }
}
