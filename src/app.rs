//! Window and render loop on top of `eframe`'s glow backend.

use std::process::ExitCode;
use std::sync::Arc;

use eframe::{egui, egui_glow};
use egui::mutex::Mutex;
use rand::SeedableRng;

use crate::config::SceneConfig;
use crate::drawer_vtx2xy::Drawer;
use crate::error::{Error, Result};
use crate::shader::{self, ShaderBackend, ShaderProgram};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Closed,
}

/// Opens the window and draws `config` every frame until the window is closed.
pub fn run(config: SceneConfig) -> Result<()> {
    config.validate()?;
    let mut rng = rand::rngs::StdRng::from_entropy();
    let options = native_options(&config);
    let title = config.title.clone();
    log::info!(
        "opening {}x{} window, shader {}",
        config.width,
        config.height,
        config.shader_path.display()
    );
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            let app = FirstApp::new(cc, &config, &mut rng)?;
            Ok(Box::new(app))
        }),
    )
    .map_err(window_error)?;
    log::info!("window closed");
    Ok(())
}

/// Recovers our own error from app creation; anything else becomes [`Error::Window`].
pub fn window_error(err: eframe::Error) -> Error {
    match err {
        eframe::Error::AppCreation(err) => match err.downcast::<Error>() {
            Ok(err) => *err,
            Err(err) => Error::Window(err.to_string()),
        },
        err => Error::Window(err.to_string()),
    }
}

/// A missing OpenGL context ends the program quietly; everything else is a failure.
pub fn is_fatal(err: &Error) -> bool {
    !matches!(err, Error::GlUnavailable)
}

/// Reports the outcome of [`run`] on stderr and picks the process exit code.
pub fn exit_code(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if !is_fatal(&err) => {
            eprintln!("{err}, shutting down");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Fixed-size, resizable glow window with depth and stencil buffers.
pub fn native_options(config: &SceneConfig) -> eframe::NativeOptions {
    eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(config.title.clone())
            .with_inner_size([config.width as f32, config.height as f32])
            .with_resizable(true),
        renderer: eframe::Renderer::Glow,
        depth_buffer: 24,
        stencil_buffer: 8,
        vsync: true,
        ..Default::default()
    }
}

struct FirstApp {
    /// Behind an `Arc<Mutex<…>>` so we can pass it to [`egui::PaintCallback`] and paint later.
    drawer: Arc<Mutex<Drawer>>,
    clear_color: [f32; 4],
    state: LoopState,
    num_frames: u64,
}

impl FirstApp {
    fn new(
        cc: &eframe::CreationContext<'_>,
        config: &SceneConfig,
        rng: &mut rand::rngs::StdRng,
    ) -> Result<Self> {
        let gl: &glow::Context = cc.gl.as_deref().ok_or(Error::GlUnavailable)?;
        let vertex_shader = shader::load_vertex_shader(gl, &config.shader_path)?;
        let shaders = ShaderProgram {
            vertex_shader: Some(vertex_shader),
        };
        let program = shader::create_program(gl, &shaders);
        ShaderBackend::delete_shader(gl, vertex_shader);
        let program = program?;
        let drawer = Drawer::new(gl, program, config, rng).inspect_err(|_| {
            ShaderBackend::delete_program(gl, program);
        })?;
        log::debug!("drawer ready with {} vertices", drawer.num_vtx());
        Ok(Self {
            drawer: Arc::new(Mutex::new(drawer)),
            clear_color: config.clear_color,
            state: LoopState::Running,
            num_frames: 0,
        })
    }

    fn custom_painting(&mut self, ui: &mut egui::Ui) {
        let (rect, _response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());
        // Clone locals so we can move them into the paint callback:
        let drawer = self.drawer.clone();
        let callback = egui::PaintCallback {
            rect,
            callback: Arc::new(egui_glow::CallbackFn::new(move |_info, painter| {
                drawer.lock().draw(painter.gl());
            })),
        };
        ui.painter().add(callback);
    }
}

impl eframe::App for FirstApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.state == LoopState::Closed {
            return;
        }
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.custom_painting(ui));
        self.num_frames += 1;
        ctx.request_repaint();
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        self.clear_color
    }

    fn on_exit(&mut self, gl: Option<&glow::Context>) {
        if self.state == LoopState::Closed {
            return;
        }
        self.state = LoopState::Closed;
        log::debug!("closing after {} frames", self.num_frames);
        if let Some(gl) = gl {
            self.drawer.lock().destroy(gl);
        }
    }
}
