use std::path::PathBuf;

/// Everything that can stop the demo from starting or running.
///
/// None of these are recoverable; the binaries print the error and exit.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot open file {}: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot create shader object: {0}")]
    ShaderCreation(String),
    #[error("vertex shader failed to compile: {0}")]
    ShaderCompile(String),
    #[error("cannot create program object: {0}")]
    ProgramCreation(String),
    #[error("program failed to link: {0}")]
    ProgramLink(String),
    #[error("cannot create vertex buffer: {0}")]
    BufferCreation(String),
    #[error("invalid scene geometry: {0}")]
    InvalidGeometry(String),
    /// The window was created without an OpenGL context (e.g. a non-glow renderer).
    #[error("no OpenGL context available")]
    GlUnavailable,
    /// The windowing layer failed to start or stopped with an error.
    #[error("window error: {0}")]
    Window(String),
}

pub type Result<T> = std::result::Result<T, Error>;
