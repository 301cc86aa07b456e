use crate::{
    core::Timer,
    log,
    renderer::{self, SpinningQuadRenderer, TexturedQuadRenderer, TriangleRenderer},
    warn,
};
use std::time::Duration;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    raw_window_handle::HasWindowHandle,
    window::{Window, WindowAttributes, WindowId},
};

/// The tutorial checkpoints, in the order they build on each other.
///
/// Each checkpoint is a complete program. Change [`STAGE`] and rebuild
/// to run a different one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Open a window and keep it alive until it is closed.
    Window,
    /// Additionally acquire the GPU and report its name.
    Device,
    /// Draw a vertex-colored triangle.
    Triangle,
    /// Draw a square sampling an image texture.
    TexturedQuad,
    /// Spin the textured square in 3D with multisampling and depth.
    SpinningQuad,
}

/// The checkpoint this build runs.
pub const STAGE: Stage = Stage::SpinningQuad;

const WINDOW_TITLE: &str = "Metal Engine";
const WINDOW_WIDTH: u32 = 800;
const WINDOW_HEIGHT: u32 = 600;

/// All relative paths (assets, the data directory) resolve from here.
const WORKING_DIR: &str = env!("CARGO_MANIFEST_DIR");
const DATA_DIR: &str = ".data";
const QUAD_TEXTURE_PATH: &str = "assets/textures/checker.png";

/// Pause between loop iterations so the tutorials do not busy-spin.
const FRAME_DELAY: Duration = Duration::from_millis(10);

enum ActiveRenderer {
    None,
    Triangle(TriangleRenderer),
    TexturedQuad(TexturedQuadRenderer),
    SpinningQuad(SpinningQuadRenderer),
}

pub struct App {
    stage: Stage,
    window: Option<Window>,
    renderer: ActiveRenderer,
    timer: Timer,
    init_error: Option<String>,
}

impl App {
    pub fn new() -> Self {
        Self {
            stage: STAGE,
            window: None,
            renderer: ActiveRenderer::None,
            timer: Timer::new(),
            init_error: None,
        }
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        std::env::set_current_dir(WORKING_DIR)
            .map_err(|e| format!("Failed to set working directory to {WORKING_DIR}: {e}"))?;
        let working_path = std::env::current_dir()
            .map_err(|e| format!("Failed to read working directory: {e}"))?;
        log!("working path: {}", working_path.display());

        if !std::path::Path::new(DATA_DIR).exists() {
            std::fs::create_dir_all(DATA_DIR)
                .map_err(|e| format!("Failed to create data directory {DATA_DIR}: {e}"))?;
            log!("Created data directory: {}", DATA_DIR);
        }

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new();
        event_loop.run_app(&mut app)?;

        if let Some(error) = app.init_error {
            return Err(error.into());
        }

        log!("Exit!");
        Ok(())
    }

    fn create_renderer(&self, window: &Window) -> Result<ActiveRenderer, String> {
        let handle = window
            .window_handle()
            .map_err(|e| format!("Failed to get window handle: {e}"))?;
        let size = window.inner_size();

        let renderer = match self.stage {
            Stage::Window | Stage::Device => ActiveRenderer::None,
            Stage::Triangle => ActiveRenderer::Triangle(TriangleRenderer::new(handle.as_raw())?),
            Stage::TexturedQuad => ActiveRenderer::TexturedQuad(TexturedQuadRenderer::new(
                handle.as_raw(),
                QUAD_TEXTURE_PATH,
            )?),
            Stage::SpinningQuad => ActiveRenderer::SpinningQuad(SpinningQuadRenderer::new(
                handle.as_raw(),
                size.width,
                size.height,
                QUAD_TEXTURE_PATH,
            )?),
        };

        Ok(renderer)
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window_attributes = WindowAttributes::default()
                .with_title(WINDOW_TITLE)
                .with_inner_size(winit::dpi::LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));

            match event_loop.create_window(window_attributes) {
                Ok(window) => {
                    log!("Window created successfully");

                    if self.stage >= Stage::Device {
                        match renderer::probe_device() {
                            Ok(name) => log!("Device Name: {}", name),
                            Err(e) => {
                                warn!("Failed to acquire GPU device: {}", e);
                                self.init_error = Some(e);
                                event_loop.exit();
                                return;
                            }
                        }
                    }

                    match self.create_renderer(&window) {
                        Ok(renderer) => {
                            if !matches!(renderer, ActiveRenderer::None) {
                                log!("Renderer initialized successfully");
                            }
                            self.renderer = renderer;
                        }
                        Err(e) => {
                            warn!("Failed to create renderer: {}", e);
                            self.init_error = Some(e);
                            event_loop.exit();
                            return;
                        }
                    }

                    window.request_redraw();
                    self.window = Some(window);
                }
                Err(e) => {
                    warn!("Failed to create window: {}", e);
                    self.init_error = Some(format!("Failed to create window: {e}"));
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log!("Window close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if size.width > 0 && size.height > 0 {
                    match &mut self.renderer {
                        ActiveRenderer::None => {}
                        ActiveRenderer::Triangle(renderer) => {
                            renderer.update_drawable_size(size.width, size.height);
                        }
                        ActiveRenderer::TexturedQuad(renderer) => {
                            renderer.update_drawable_size(size.width, size.height);
                        }
                        ActiveRenderer::SpinningQuad(renderer) => {
                            renderer.update_drawable_size(size.width, size.height);
                        }
                    }
                    log!("Window resized to {}x{}", size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                let delta = self.timer.delta();

                let result = match &mut self.renderer {
                    ActiveRenderer::None => Ok(()),
                    ActiveRenderer::Triangle(renderer) => renderer.render(),
                    ActiveRenderer::TexturedQuad(renderer) => renderer.render(),
                    ActiveRenderer::SpinningQuad(renderer) => renderer.render(delta),
                };

                if let Err(e) = result {
                    warn!("Render error: {}", e);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // Pace the poll loop instead of spinning at full speed.
        std::thread::sleep(FRAME_DELAY);

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
