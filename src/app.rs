use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::controls::{ControlChanges, ViewControls};
use crate::geometry::{MeshFormat, load_mesh};
use crate::gpu::GpuContext;
use crate::input::Input;
use crate::mesh_renderer::MeshRenderer;

/// Window and initial view settings for [`run`].
#[derive(Clone, Debug)]
pub struct ViewerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub clear_color: wgpu::Color,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub swap_axes: bool,
    pub show_texture: bool,
    /// Mesh opened at startup (`.obj` or `.stl`).
    pub mesh: Option<PathBuf>,
    /// Texture image opened at startup.
    pub texture: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "Meshview".to_string(),
            width: 800,
            height: 600,
            clear_color: wgpu::Color::WHITE,
            fov: 60.0,
            swap_axes: false,
            show_texture: true,
            mesh: None,
            texture: None,
        }
    }
}

impl ViewerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn clear_color(mut self, color: wgpu::Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn fov(mut self, fov_degrees: f32) -> Self {
        self.fov = fov_degrees;
        self
    }

    pub fn swap_axes(mut self, enabled: bool) -> Self {
        self.swap_axes = enabled;
        self
    }

    pub fn show_texture(mut self, enabled: bool) -> Self {
        self.show_texture = enabled;
        self
    }

    pub fn mesh(mut self, path: impl Into<PathBuf>) -> Self {
        self.mesh = Some(path.into());
        self
    }

    pub fn texture(mut self, path: impl Into<PathBuf>) -> Self {
        self.texture = Some(path.into());
        self
    }

    fn controls(&self) -> ViewControls {
        ViewControls::new()
            .fov(self.fov)
            .swap_axes(self.swap_axes)
            .show_texture(self.show_texture)
    }
}

/// Opens the viewer window and runs until it is closed.
///
/// Setup failures (no adapter, shader errors, unreadable startup files) end
/// the event loop and are returned.
///
/// # Example
/// ```ignore
/// meshview::run(
///     ViewerConfig::new()
///         .mesh("models/teapot.obj")
///         .texture("models/teapot.png"),
/// )?;
/// ```
pub fn run(config: ViewerConfig) -> Result<(), Box<dyn Error>> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp {
        state: AppState::Pending(config),
        error: None,
    };
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct ViewerApp {
    state: AppState,
    error: Option<Box<dyn Error>>,
}

enum AppState {
    Pending(ViewerConfig),
    Running(Box<Viewer>),
    Failed,
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let AppState::Pending(config) = &self.state else {
            return;
        };

        match Viewer::new(event_loop, config) {
            Ok(viewer) => self.state = AppState::Running(Box::new(viewer)),
            Err(e) => {
                tracing::error!("viewer setup failed: {}", e);
                self.error = Some(e);
                self.state = AppState::Failed;
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let AppState::Running(viewer) = &mut self.state else {
            return;
        };

        viewer.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                viewer.gpu.resize(size.width, size.height);
                viewer
                    .renderer
                    .resize(viewer.gpu.width(), viewer.gpu.height());
            }
            WindowEvent::DroppedFile(path) => {
                viewer.open_dropped(&path);
            }
            WindowEvent::RedrawRequested => {
                viewer.redraw();
            }
            _ => {}
        }
    }
}

/// Everything that exists once the window is up.
struct Viewer {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: MeshRenderer,
    controls: ViewControls,
    input: Input,
    title: String,
    clear_color: wgpu::Color,
}

impl Viewer {
    fn new(event_loop: &ActiveEventLoop, config: &ViewerConfig) -> Result<Self, Box<dyn Error>> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let gpu = GpuContext::new(window.clone())?;
        let mut renderer = MeshRenderer::new(&gpu)?;
        renderer.set_swap_axes(config.swap_axes);
        renderer.set_show_texture(config.show_texture);

        let mut viewer = Self {
            window,
            gpu,
            renderer,
            controls: config.controls(),
            input: Input::new(),
            title: config.title.clone(),
            clear_color: config.clear_color,
        };

        if let Some(path) = &config.mesh {
            viewer.load_mesh(path)?;
        }
        if let Some(path) = &config.texture {
            viewer.load_texture(path)?;
        }
        viewer.update_title();

        Ok(viewer)
    }

    /// Loads a mesh file, fits it into a unit cube at the origin and uploads it.
    fn load_mesh(&mut self, path: &Path) -> Result<(), Box<dyn Error>> {
        let mut mesh = load_mesh(path)?;
        mesh.recenter();
        mesh.normalize();

        self.renderer.set_mesh(&mesh)?;
        self.controls.model_radius = mesh.bounding_radius().max(f32::EPSILON);
        tracing::info!(path = %path.display(), triangles = mesh.triangle_count(), "opened mesh");
        Ok(())
    }

    fn load_texture(&mut self, path: &Path) -> Result<(), Box<dyn Error>> {
        let image = image::open(path)?.to_rgba8();
        self.renderer.set_texture(&image)?;
        tracing::info!(path = %path.display(), "opened texture");
        Ok(())
    }

    /// Dropped mesh files replace the mesh; dropped images replace the texture.
    fn open_dropped(&mut self, path: &Path) {
        let result = if MeshFormat::from_path(path).is_some() {
            self.load_mesh(path)
        } else if image::ImageFormat::from_path(path).is_ok() {
            self.load_texture(path)
        } else {
            tracing::warn!(path = %path.display(), "ignoring dropped file of unknown type");
            return;
        };

        if let Err(e) = result {
            tracing::warn!(path = %path.display(), "failed to open dropped file: {}", e);
        }
    }

    fn apply(&mut self, changes: ControlChanges) {
        if let Some(enabled) = changes.swap_axes {
            self.renderer.set_swap_axes(enabled);
        }
        if let Some(enabled) = changes.show_texture {
            self.renderer.set_show_texture(enabled);
        }
        if !changes.is_empty() {
            self.update_title();
        }
    }

    fn update_title(&self) {
        let state = self.renderer.state();
        let on_off = |b: bool| if b { "on" } else { "off" };
        self.window.set_title(&format!(
            "{} - swap Y/Z: {}, texture: {}",
            self.title,
            on_off(state.swap_axes),
            on_off(state.show_texture)
        ));
    }

    fn redraw(&mut self) {
        let changes = self.controls.update(&self.input);
        self.apply(changes);

        let mvp = self.controls.model_view_projection(self.gpu.aspect());

        match self.gpu.surface.get_current_texture() {
            Ok(output) => {
                let view = self.gpu.target_view(&output.texture);
                self.renderer.render_frame(&view, mvp, self.clear_color);
                output.present();
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.gpu.reconfigure();
            }
            Err(e) => {
                tracing::error!("failed to get surface texture: {}", e);
            }
        }

        self.input.begin_frame();
        self.window.request_redraw();
    }
}
