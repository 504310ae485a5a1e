//! Vertex shader compilation and GPU program linking.

use std::path::Path;

use crate::error::{Error, Result};

/// The slice of the OpenGL API needed to build a program.
///
/// Implemented for [`glow::Context`]; the methods wrap the corresponding
/// `glow::HasContext` calls so callers stay out of `unsafe`.
pub trait ShaderBackend {
    type Shader: Copy;
    type Program: Copy;

    fn create_shader(&self, shader_type: u32) -> std::result::Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> std::result::Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);
}

impl ShaderBackend for glow::Context {
    type Shader = glow::Shader;
    type Program = glow::Program;

    fn create_shader(&self, shader_type: u32) -> std::result::Result<glow::Shader, String> {
        unsafe { glow::HasContext::create_shader(self, shader_type) }
    }
    fn shader_source(&self, shader: glow::Shader, source: &str) {
        unsafe { glow::HasContext::shader_source(self, shader, source) }
    }
    fn compile_shader(&self, shader: glow::Shader) {
        unsafe { glow::HasContext::compile_shader(self, shader) }
    }
    fn shader_compile_status(&self, shader: glow::Shader) -> bool {
        unsafe { glow::HasContext::get_shader_compile_status(self, shader) }
    }
    fn shader_info_log(&self, shader: glow::Shader) -> String {
        unsafe { glow::HasContext::get_shader_info_log(self, shader) }
    }
    fn delete_shader(&self, shader: glow::Shader) {
        unsafe { glow::HasContext::delete_shader(self, shader) }
    }
    fn create_program(&self) -> std::result::Result<glow::Program, String> {
        unsafe { glow::HasContext::create_program(self) }
    }
    fn attach_shader(&self, program: glow::Program, shader: glow::Shader) {
        unsafe { glow::HasContext::attach_shader(self, program, shader) }
    }
    fn detach_shader(&self, program: glow::Program, shader: glow::Shader) {
        unsafe { glow::HasContext::detach_shader(self, program, shader) }
    }
    fn link_program(&self, program: glow::Program) {
        unsafe { glow::HasContext::link_program(self, program) }
    }
    fn program_link_status(&self, program: glow::Program) -> bool {
        unsafe { glow::HasContext::get_program_link_status(self, program) }
    }
    fn program_info_log(&self, program: glow::Program) -> String {
        unsafe { glow::HasContext::get_program_info_log(self, program) }
    }
    fn delete_program(&self, program: glow::Program) {
        unsafe { glow::HasContext::delete_program(self, program) }
    }
}

/// Shader stages that make up one GPU program. Only the vertex stage exists here.
#[derive(Debug, Clone, Copy)]
pub struct ShaderProgram<S> {
    pub vertex_shader: Option<S>,
}

impl<S> Default for ShaderProgram<S> {
    fn default() -> Self {
        Self {
            vertex_shader: None,
        }
    }
}

/// Compiles `source` as a vertex shader and returns its handle.
///
/// On failure the driver's info log is returned in [`Error::ShaderCompile`]
/// and the shader object is released.
pub fn compile_vertex_shader<B: ShaderBackend>(gl: &B, source: &str) -> Result<B::Shader> {
    let shader = gl
        .create_shader(glow::VERTEX_SHADER)
        .map_err(Error::ShaderCreation)?;
    gl.shader_source(shader, source);
    gl.compile_shader(shader);
    if gl.shader_compile_status(shader) {
        log::debug!("vertex shader compiled");
        return Ok(shader);
    }
    let info_log = gl.shader_info_log(shader);
    log::error!("vertex shader compile log: {info_log}");
    gl.delete_shader(shader);
    Err(Error::ShaderCompile(info_log))
}

/// Reads the vertex shader source at `path` and compiles it.
pub fn load_vertex_shader<B: ShaderBackend>(gl: &B, path: impl AsRef<Path>) -> Result<B::Shader> {
    let source = crate::load_file::load_file(path)?;
    compile_vertex_shader(gl, &source)
}

/// Links the stages of `shaders` into a program.
///
/// The vertex shader is attached only when present and is detached again
/// after a successful link, so the caller may delete it.
pub fn create_program<B: ShaderBackend>(
    gl: &B,
    shaders: &ShaderProgram<B::Shader>,
) -> Result<B::Program> {
    let program = gl.create_program().map_err(Error::ProgramCreation)?;
    if let Some(vertex_shader) = shaders.vertex_shader {
        gl.attach_shader(program, vertex_shader);
    }
    gl.link_program(program);
    if gl.program_link_status(program) {
        if let Some(vertex_shader) = shaders.vertex_shader {
            gl.detach_shader(program, vertex_shader);
        }
        log::debug!("program linked");
        return Ok(program);
    }
    let info_log = gl.program_info_log(program);
    log::error!("program link log: {info_log}");
    gl.delete_program(program);
    Err(Error::ProgramLink(info_log))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records every call and answers status queries from a script.
    #[derive(Default)]
    struct FakeGl {
        compile_ok: bool,
        link_ok: bool,
        info_log: String,
        calls: RefCell<Vec<String>>,
    }

    impl FakeGl {
        fn working() -> Self {
            Self {
                compile_ok: true,
                link_ok: true,
                ..Default::default()
            }
        }
        fn record(&self, call: impl Into<String>) {
            self.calls.borrow_mut().push(call.into());
        }
        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl ShaderBackend for FakeGl {
        type Shader = u32;
        type Program = u32;

        fn create_shader(&self, shader_type: u32) -> std::result::Result<u32, String> {
            assert_eq!(shader_type, glow::VERTEX_SHADER);
            self.record("create_shader");
            Ok(1)
        }
        fn shader_source(&self, shader: u32, source: &str) {
            self.record(format!("shader_source {shader} {}", source.len()));
        }
        fn compile_shader(&self, shader: u32) {
            self.record(format!("compile_shader {shader}"));
        }
        fn shader_compile_status(&self, _shader: u32) -> bool {
            self.compile_ok
        }
        fn shader_info_log(&self, _shader: u32) -> String {
            self.info_log.clone()
        }
        fn delete_shader(&self, shader: u32) {
            self.record(format!("delete_shader {shader}"));
        }
        fn create_program(&self) -> std::result::Result<u32, String> {
            self.record("create_program");
            Ok(7)
        }
        fn attach_shader(&self, program: u32, shader: u32) {
            self.record(format!("attach_shader {program} {shader}"));
        }
        fn detach_shader(&self, program: u32, shader: u32) {
            self.record(format!("detach_shader {program} {shader}"));
        }
        fn link_program(&self, program: u32) {
            self.record(format!("link_program {program}"));
        }
        fn program_link_status(&self, _program: u32) -> bool {
            self.link_ok
        }
        fn program_info_log(&self, _program: u32) -> String {
            self.info_log.clone()
        }
        fn delete_program(&self, program: u32) {
            self.record(format!("delete_program {program}"));
        }
    }

    const VALID: &str = "#version 330 core\nlayout(location = 0) in vec2 xy;\nvoid main() { gl_Position = vec4(xy, 0.0, 1.0); }\n";

    #[test]
    fn valid_source_returns_handle() {
        let gl = FakeGl::working();
        let shader = compile_vertex_shader(&gl, VALID).unwrap();
        assert_eq!(shader, 1);
        assert_eq!(
            gl.calls(),
            [
                "create_shader".to_string(),
                format!("shader_source 1 {}", VALID.len()),
                "compile_shader 1".to_string(),
            ]
        );
    }

    #[test]
    fn compile_failure_carries_log_and_releases_shader() {
        let gl = FakeGl {
            compile_ok: false,
            info_log: "0:3(40): error: syntax error, unexpected '}'".to_string(),
            ..Default::default()
        };
        let err = compile_vertex_shader(&gl, "void main() { gl_Position = vec4(0) }").unwrap_err();
        match err {
            Error::ShaderCompile(log) => assert!(log.contains("syntax error")),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(gl.calls().last().unwrap(), "delete_shader 1");
    }

    #[test]
    fn load_vertex_shader_propagates_missing_file() {
        let gl = FakeGl::working();
        let dir = tempfile::tempdir().unwrap();
        let err = load_vertex_shader(&gl, dir.path().join("missing.glsl")).unwrap_err();
        assert!(matches!(err, Error::FileOpen { .. }));
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn vertex_only_program_links_and_detaches() {
        let gl = FakeGl::working();
        let shaders = ShaderProgram {
            vertex_shader: Some(1),
        };
        let program = create_program(&gl, &shaders).unwrap();
        assert_eq!(program, 7);
        assert_eq!(
            gl.calls(),
            [
                "create_program",
                "attach_shader 7 1",
                "link_program 7",
                "detach_shader 7 1"
            ]
        );
    }

    #[test]
    fn absent_shader_is_not_attached() {
        let gl = FakeGl::working();
        let program = create_program(&gl, &ShaderProgram::default()).unwrap();
        assert_eq!(program, 7);
        assert_eq!(gl.calls(), ["create_program", "link_program 7"]);
    }

    #[test]
    fn link_failure_carries_log_and_releases_program() {
        let gl = FakeGl {
            compile_ok: true,
            link_ok: false,
            info_log: "error: no main() in vertex shader".to_string(),
            ..Default::default()
        };
        let shaders = ShaderProgram {
            vertex_shader: Some(1),
        };
        let err = create_program(&gl, &shaders).unwrap_err();
        assert!(err.to_string().contains("no main()"));
        let calls = gl.calls();
        assert!(!calls.contains(&"detach_shader 7 1".to_string()));
        assert_eq!(calls.last().unwrap(), "delete_program 7");
    }

    #[test]
    fn empty_log_still_reports_failure() {
        let gl = FakeGl::default();
        let err = compile_vertex_shader(&gl, VALID).unwrap_err();
        assert!(matches!(err, Error::ShaderCompile(ref log) if log.is_empty()));
    }
}
