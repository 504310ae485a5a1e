use rand::Rng;

use crate::config::SceneConfig;
use crate::error::{Error, Result};

/// Attribute location of the vertex positions.
pub const LOC_XY: u32 = 0;
/// Attribute location of the per-vertex random offsets.
pub const LOC_OFFSET: u32 = 1;

/// `n` values drawn uniformly from `[0, 0.5)`.
pub fn random_offsets<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<f32> {
    (0..n).map(|_| rng.gen_range(0.0f32..0.5f32)).collect()
}

/// Object allocation needed by [`Drawer::new`], split out so failures can be replayed.
pub trait BufferBackend {
    type VertexArray: Copy;
    type Buffer: Copy;

    fn create_vertex_array(&self) -> std::result::Result<Self::VertexArray, String>;
    fn create_buffer(&self) -> std::result::Result<Self::Buffer, String>;
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);
    fn delete_buffer(&self, buffer: Self::Buffer);
}

impl BufferBackend for glow::Context {
    type VertexArray = glow::VertexArray;
    type Buffer = glow::Buffer;

    fn create_vertex_array(&self) -> std::result::Result<glow::VertexArray, String> {
        unsafe { glow::HasContext::create_vertex_array(self) }
    }
    fn create_buffer(&self) -> std::result::Result<glow::Buffer, String> {
        unsafe { glow::HasContext::create_buffer(self) }
    }
    fn delete_vertex_array(&self, vertex_array: glow::VertexArray) {
        unsafe { glow::HasContext::delete_vertex_array(self, vertex_array) }
    }
    fn delete_buffer(&self, buffer: glow::Buffer) {
        unsafe { glow::HasContext::delete_buffer(self, buffer) }
    }
}

/// Creates the VAO, the position VBO and, if asked, the offset VBO.
///
/// Nothing is bound. When any creation fails, the objects created so far are
/// deleted before the error is returned.
pub fn create_objects<B: BufferBackend>(
    gl: &B,
    with_offset: bool,
) -> Result<(B::VertexArray, B::Buffer, Option<B::Buffer>)> {
    let vertex_array = gl.create_vertex_array().map_err(Error::BufferCreation)?;
    let vbo_xy = match gl.create_buffer() {
        Ok(vbo) => vbo,
        Err(msg) => {
            gl.delete_vertex_array(vertex_array);
            return Err(Error::BufferCreation(msg));
        }
    };
    if !with_offset {
        return Ok((vertex_array, vbo_xy, None));
    }
    match gl.create_buffer() {
        Ok(vbo_offset) => Ok((vertex_array, vbo_xy, Some(vbo_offset))),
        Err(msg) => {
            gl.delete_buffer(vbo_xy);
            gl.delete_vertex_array(vertex_array);
            Err(Error::BufferCreation(msg))
        }
    }
}

/// Draws a flat list of 2D vertices as an outlined triangle strip.
pub struct Drawer {
    pub program: Option<glow::Program>,
    pub vertex_array: Option<glow::VertexArray>,
    vbo_xy: Option<glow::Buffer>,
    vbo_offset: Option<glow::Buffer>,
    num_vtx: usize,
    clear_color: [f32; 4],
}

impl Drawer {
    /// Uploads the scene geometry and binds it to `program`.
    pub fn new<R: Rng + ?Sized>(
        gl: &glow::Context,
        program: glow::Program,
        config: &SceneConfig,
        rng: &mut R,
    ) -> Result<Self> {
        use glow::HasContext as _;
        let stride = 2 * std::mem::size_of::<f32>() as i32;
        unsafe {
            let (vertex_array, vbo_xy, vbo_offset) =
                create_objects(gl, config.num_random_offsets > 0)?;
            gl.bind_vertex_array(Some(vertex_array));
            //
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo_xy));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&config.vtx2xy),
                glow::STATIC_DRAW,
            );
            gl.vertex_attrib_pointer_f32(LOC_XY, 2, glow::FLOAT, false, stride, 0);
            gl.enable_vertex_attrib_array(LOC_XY);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            //
            if let Some(vbo) = vbo_offset {
                let vtx2offset = random_offsets(rng, config.num_random_offsets);
                log::debug!("random offsets: {vtx2offset:?}");
                gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
                gl.buffer_data_u8_slice(
                    glow::ARRAY_BUFFER,
                    bytemuck::cast_slice(&vtx2offset),
                    glow::STATIC_DRAW,
                );
                gl.vertex_attrib_pointer_f32(LOC_OFFSET, 2, glow::FLOAT, false, stride, 0);
                gl.enable_vertex_attrib_array(LOC_OFFSET);
                gl.bind_buffer(glow::ARRAY_BUFFER, None);
            }
            gl.bind_vertex_array(None);
            //
            gl.use_program(Some(program));
            let uniform_loc_offset = gl.get_uniform_location(program, "offset");
            if uniform_loc_offset.is_none() {
                log::debug!("uniform `offset` is not active in this program");
            }
            let [x, y] = config.offset_uniform;
            gl.uniform_2_f32(uniform_loc_offset.as_ref(), x, y);
            gl.use_program(None);
            Ok(Self {
                program: Some(program),
                vertex_array: Some(vertex_array),
                vbo_xy: Some(vbo_xy),
                vbo_offset,
                num_vtx: config.num_vtx(),
                clear_color: config.clear_color,
            })
        }
    }

    pub fn num_vtx(&self) -> usize {
        self.num_vtx
    }

    /// Clears the target and draws one frame.
    ///
    /// Culling and polygon mode are reset afterwards because the window layer
    /// paints its own widgets with the same context.
    pub fn draw(&self, gl: &glow::Context) {
        use glow::HasContext as _;
        let [r, g, b, a] = self.clear_color;
        unsafe {
            gl.enable(glow::CULL_FACE);
            gl.cull_face(glow::BACK);
            gl.polygon_mode(glow::FRONT_AND_BACK, glow::LINE);
            gl.clear_color(r, g, b, a);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT | glow::STENCIL_BUFFER_BIT);
            //
            gl.use_program(self.program);
            gl.bind_vertex_array(self.vertex_array);
            gl.draw_arrays(glow::TRIANGLE_STRIP, 0, self.num_vtx as i32);
            gl.bind_vertex_array(None);
            gl.use_program(None);
            //
            gl.polygon_mode(glow::FRONT_AND_BACK, glow::FILL);
            gl.disable(glow::CULL_FACE);
            gl.flush();
        }
    }

    /// Releases the program and the buffers. Calling it twice is harmless.
    pub fn destroy(&mut self, gl: &glow::Context) {
        use glow::HasContext as _;
        unsafe {
            if let Some(program) = self.program.take() {
                gl.use_program(None);
                gl.delete_program(program);
            }
            for vbo in [self.vbo_xy.take(), self.vbo_offset.take()].into_iter().flatten() {
                glow::HasContext::delete_buffer(gl, vbo);
            }
            if let Some(vertex_array) = self.vertex_array.take() {
                glow::HasContext::delete_vertex_array(gl, vertex_array);
            }
        }
    }
}
