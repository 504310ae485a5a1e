use std::path::PathBuf;

use crate::error::{Error, Result};

pub type Rgba = [f32; 4];

pub const DEFAULT_SHADER_PATH: &str = "MyFirstVertexShader.glsl";

/// What to open and what to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub clear_color: Rgba,
    pub shader_path: PathBuf,
    /// Flat `[x0, y0, x1, y1, ...]` positions, drawn as a triangle strip.
    pub vtx2xy: Vec<f32>,
    /// Number of random floats uploaded to attribute 1. Zero disables the buffer.
    pub num_random_offsets: usize,
    /// Value of the `offset` uniform.
    pub offset_uniform: [f32; 2],
}

impl SceneConfig {
    /// Red background, one outlined triangle.
    pub fn triangle() -> Self {
        Self {
            title: "My Engine".to_string(),
            width: 640,
            height: 480,
            clear_color: [1.0, 0.0, 0.0, 1.0],
            shader_path: PathBuf::from(DEFAULT_SHADER_PATH),
            vtx2xy: vec![
                -0.5, -0.25, //
                0.5, -0.25, //
                0.0, 0.6,
            ],
            num_random_offsets: 0,
            offset_uniform: [0.0, 0.0],
        }
    }

    /// White background, an outlined quad whose vertices get random offsets.
    pub fn quad() -> Self {
        Self {
            height: 400,
            clear_color: [1.0, 1.0, 1.0, 1.0],
            vtx2xy: vec![
                -0.5, -0.5, //
                0.5, -0.5, //
                -0.5, 0.5, //
                0.5, 0.5,
            ],
            num_random_offsets: 12,
            ..Self::triangle()
        }
    }

    pub fn num_vtx(&self) -> usize {
        self.vtx2xy.len() / 2
    }

    pub fn validate(&self) -> Result<()> {
        if self.vtx2xy.len() % 2 != 0 {
            return Err(Error::InvalidGeometry(format!(
                "{} coordinates is not a whole number of xy pairs",
                self.vtx2xy.len()
            )));
        }
        if self.num_vtx() < 3 {
            return Err(Error::InvalidGeometry(format!(
                "a triangle strip needs at least 3 vertices, got {}",
                self.num_vtx()
            )));
        }
        if self.num_random_offsets % 2 != 0 {
            return Err(Error::InvalidGeometry(format!(
                "{} random offsets is not a whole number of xy pairs",
                self.num_random_offsets
            )));
        }
        Ok(())
    }
}
