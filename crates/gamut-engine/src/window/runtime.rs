use std::sync::Arc;

use anyhow::{Context, Result};

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::assets::AssetStore;
use crate::device::{Gpu, GpuInit};
use crate::driver::WgpuDriver;
use crate::render::QuadRenderer;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "gamut".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window and drives `renderer` until the window closes.
    ///
    /// A renderer setup failure ends the loop and is returned here.
    pub fn run<A>(
        config: RuntimeConfig,
        gpu_init: GpuInit,
        renderer: QuadRenderer<WgpuDriver, A>,
    ) -> Result<()>
    where
        A: AssetStore + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, renderer);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.fatal.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

struct AppState<A: AssetStore> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    renderer: QuadRenderer<WgpuDriver, A>,

    window: Option<Arc<Window>>,
    /// Present while a surface generation is live.
    driver: Option<WgpuDriver>,

    fatal: Option<anyhow::Error>,
}

impl<A: AssetStore> AppState<A> {
    fn new(config: RuntimeConfig, gpu_init: GpuInit, renderer: QuadRenderer<WgpuDriver, A>) -> Self {
        Self {
            config,
            gpu_init,
            renderer,
            window: None,
            driver: None,
            fatal: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.fatal = Some(err);
        self.driver = None;
        event_loop.exit();
    }

    fn ensure_window(&mut self, event_loop: &ActiveEventLoop) -> Result<Arc<Window>> {
        if let Some(w) = &self.window {
            return Ok(Arc::clone(w));
        }

        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );
        self.window = Some(Arc::clone(&window));
        Ok(window)
    }

    /// Creates a fresh GPU context for `window` and rebuilds the renderer's
    /// objects in it.
    fn start_generation(&mut self, window: Arc<Window>) -> Result<()> {
        self.driver = None;

        let gpu = pollster::block_on(Gpu::new(Arc::clone(&window), self.gpu_init.clone()))
            .context("GPU initialization failed")?;
        let info = gpu.adapter_info();
        log::info!("using {} ({:?})", info.name, info.backend);

        let mut driver = WgpuDriver::new(gpu);
        self.renderer
            .on_surface_created(&mut driver)
            .context("renderer setup failed")?;

        let size = window.inner_size();
        self.renderer.on_surface_resized(&mut driver, size.width, size.height);

        self.driver = Some(driver);
        window.request_redraw();
        Ok(())
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let Some(driver) = self.driver.as_mut() else { return };
        driver.gpu_mut().resize(size);
        self.renderer.on_surface_resized(driver, size.width, size.height);
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(driver) = self.driver.as_mut() else { return };
        self.renderer.on_draw_frame(driver);

        if !driver.context_lost() {
            return;
        }

        log::warn!("surface lost; starting a new generation");
        let Some(window) = self.window.clone() else { return };
        if let Err(e) = self.start_generation(window) {
            self.fail(event_loop, e);
        }
    }
}

impl<A: AssetStore> ApplicationHandler for AppState<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.driver.is_some() {
            return;
        }

        let started = self
            .ensure_window(event_loop)
            .and_then(|window| self.start_generation(window));
        if let Err(e) = started {
            self.fail(event_loop, e);
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        if self.driver.take().is_some() {
            log::info!("surface generation {} ended", self.renderer.generation());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // The image is static: frames are drawn on resize/expose only.
        event_loop.set_control_flow(ControlFlow::Wait);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.window.as_ref().map(|w| w.id()) != Some(window_id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.driver = None;
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => self.resize(new_size),

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.window.as_ref().map(|w| w.inner_size()) {
                    self.resize(size);
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}
