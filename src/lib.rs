//! Minimal OpenGL demo: one vertex shader, one program, a few vertices.

pub mod app;
pub mod config;
pub mod drawer_vtx2xy;
pub mod error;
pub mod load_file;
pub mod shader;

pub use config::SceneConfig;
pub use error::{Error, Result};
