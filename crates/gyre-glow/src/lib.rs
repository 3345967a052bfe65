// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `gyre`.
//
// `gyre` is free software: you can redistribute it and/or modify it under the terms of
// either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
// version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `gyre` is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Lesser General Public License or the Mozilla Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `gyre`. If not, see <https://www.gnu.org/licenses/> or
// <https://www.mozilla.org/en-US/MPL/2.0/>.

//! A backend for `gyre` that uses the [`glow`] crate.
//!
//! [`glow`]: https://crates.io/crates/glow

use glow::HasContext;

use gyre::glam::Mat4;
use gyre::{BufferType, GpuContext, PrimitiveMode, ShaderStage};

use std::fmt;

/// A wrapper around a [`glow`] context.
///
/// The wrapper decides which GLSL dialect header shader source gets compiled
/// under, and owns the vertex array object that all of the session's vertex
/// state lives in.
pub struct GlowContext<H: HasContext + ?Sized> {
    /// The `#version` line matching the context's GLSL dialect.
    shader_header: &'static str,

    /// The vertex array object every draw goes through.
    vao: H::VertexArray,

    /// The underlying context.
    context: H,
}

impl<H: HasContext + ?Sized> GlowContext<H> {
    /// Create a new [`GlowContext`] from a [`glow`] context.
    ///
    /// Fails with [`gyre::Error::Unsupported`] when the context's version is
    /// below OpenGL 3.3 or OpenGL ES 3.0.
    ///
    /// # Safety
    ///
    /// The context must be current while calling new, and must still be
    /// current whenever the [`GpuContext`] methods run, up to and including
    /// the drop of this type.
    pub unsafe fn new(context: H) -> Result<Self, gyre::Error>
    where
        H: Sized,
    {
        // Get the current version.
        let version = context.version();

        // Check that the version is supported.
        let has_supported_version = if version.is_embedded {
            version.major >= 3
        } else {
            version.major >= 4 || (version.major >= 3 && version.minor >= 3)
        };
        if !has_supported_version {
            return Err(gyre::Error::Unsupported(format!(
                "OpenGL version 3.3 (or 3.0 ES) or higher is required, found {}.{}",
                version.major, version.minor
            )));
        }

        let shader_header = if version.is_embedded {
            "#version 300 es"
        } else {
            "#version 330 core"
        };

        let vao = context
            .create_vertex_array()
            .gl_err()
            .map_err(gyre::Error::backend)?;
        context.bind_vertex_array(Some(vao));

        Ok(Self {
            shader_header,
            vao,
            context,
        })
    }

    /// Get a reference to the underlying [`glow`] context.
    pub fn context(&self) -> &H {
        &self.context
    }
}

impl<H: HasContext + ?Sized> Drop for GlowContext<H> {
    fn drop(&mut self) {
        unsafe {
            self.context.delete_vertex_array(self.vao);
        }
    }
}

impl<H: HasContext + ?Sized> fmt::Debug for GlowContext<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlowContext").finish_non_exhaustive()
    }
}

impl<H: HasContext + ?Sized> GpuContext for GlowContext<H> {
    type Shader = H::Shader;
    type Program = H::Program;
    type Buffer = H::Buffer;
    type AttribLocation = u32;
    type UniformLocation = H::UniformLocation;
    type Error = GlError;

    fn shader_header(&self) -> &str {
        self.shader_header
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, Self::Error> {
        unsafe { self.context.create_shader(gl_shader_stage(stage)).gl_err() }
    }

    fn shader_source(&self, shader: &Self::Shader, source: &str) {
        unsafe {
            self.context.shader_source(*shader, source);
        }
    }

    fn compile_shader(&self, shader: &Self::Shader) {
        unsafe {
            self.context.compile_shader(*shader);
        }
    }

    fn compile_succeeded(&self, shader: &Self::Shader) -> bool {
        unsafe { self.context.get_shader_compile_status(*shader) }
    }

    fn shader_info_log(&self, shader: &Self::Shader) -> String {
        unsafe { self.context.get_shader_info_log(*shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe {
            self.context.delete_shader(shader);
        }
    }

    fn create_program(&self) -> Result<Self::Program, Self::Error> {
        unsafe { self.context.create_program().gl_err() }
    }

    fn attach_shader(&self, program: &Self::Program, shader: &Self::Shader) {
        unsafe {
            self.context.attach_shader(*program, *shader);
        }
    }

    fn detach_shader(&self, program: &Self::Program, shader: &Self::Shader) {
        unsafe {
            self.context.detach_shader(*program, *shader);
        }
    }

    fn link_program(&self, program: &Self::Program) {
        unsafe {
            self.context.link_program(*program);
        }
    }

    fn link_succeeded(&self, program: &Self::Program) -> bool {
        unsafe { self.context.get_program_link_status(*program) }
    }

    fn program_info_log(&self, program: &Self::Program) -> String {
        unsafe { self.context.get_program_info_log(*program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe {
            self.context.delete_program(program);
        }
    }

    fn use_program(&self, program: &Self::Program) {
        unsafe {
            self.context.use_program(Some(*program));
        }
    }

    fn attrib_location(&self, program: &Self::Program, name: &str) -> Option<u32> {
        unsafe { self.context.get_attrib_location(*program, name) }
    }

    fn uniform_location(
        &self,
        program: &Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.context.get_uniform_location(*program, name) }
    }

    fn create_buffer(&self) -> Result<Self::Buffer, Self::Error> {
        unsafe { self.context.create_buffer().gl_err() }
    }

    fn write_buffer(&self, buffer: &Self::Buffer, ty: BufferType, data: &[u8]) {
        let target = gl_buffer_target(ty);

        unsafe {
            self.context.bind_buffer(target, Some(*buffer));
            self.context
                .buffer_data_u8_slice(target, data, glow::STATIC_DRAW);
        }

        gl_error(&self.context);
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe {
            self.context.delete_buffer(buffer);
        }
    }

    fn viewport(&self, width: u32, height: u32) {
        unsafe {
            self.context.viewport(0, 0, width as i32, height as i32);
        }
    }

    fn clear(&self, color: [f32; 4], depth: f32) {
        let [r, g, b, a] = color;

        unsafe {
            self.context.clear_color(r, g, b, a);
            self.context.clear_depth_f32(depth);
            self.context.enable(glow::DEPTH_TEST);
            self.context.depth_func(glow::LEQUAL);
            self.context
                .clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    fn bind_attribute(
        &self,
        buffer: &Self::Buffer,
        location: &Self::AttribLocation,
        components: i32,
    ) {
        unsafe {
            self.context.bind_buffer(glow::ARRAY_BUFFER, Some(*buffer));
            self.context
                .vertex_attrib_pointer_f32(*location, components, glow::FLOAT, false, 0, 0);
            self.context.enable_vertex_attrib_array(*location);
        }
    }

    fn bind_index_buffer(&self, buffer: &Self::Buffer) {
        unsafe {
            self.context
                .bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(*buffer));
        }
    }

    fn set_uniform_matrix(&self, location: &Self::UniformLocation, matrix: &Mat4) {
        unsafe {
            self.context
                .uniform_matrix_4_f32_slice(Some(location), false, &matrix.to_cols_array());
        }
    }

    fn draw_arrays(&self, mode: PrimitiveMode, first: i32, count: i32) {
        unsafe {
            self.context.draw_arrays(gl_primitive(mode), first, count);
        }

        gl_error(&self.context);
    }

    fn draw_elements(&self, mode: PrimitiveMode, count: i32) {
        unsafe {
            self.context
                .draw_elements(gl_primitive(mode), count, glow::UNSIGNED_SHORT, 0);
        }

        gl_error(&self.context);
    }
}

/// The error reported by the underlying [`glow`] context.
#[derive(Debug)]
pub struct GlError(String);

impl From<String> for GlError {
    fn from(s: String) -> Self {
        GlError(s)
    }
}

impl fmt::Display for GlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gl error: {}", self.0)
    }
}

impl std::error::Error for GlError {}

fn gl_shader_stage(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

fn gl_buffer_target(ty: BufferType) -> u32 {
    match ty {
        BufferType::Vertex => glow::ARRAY_BUFFER,
        BufferType::Index => glow::ELEMENT_ARRAY_BUFFER,
    }
}

fn gl_primitive(mode: PrimitiveMode) -> u32 {
    match mode {
        PrimitiveMode::Triangles => glow::TRIANGLES,
        PrimitiveMode::TriangleStrip => glow::TRIANGLE_STRIP,
    }
}

fn gl_error(h: &(impl HasContext + ?Sized)) {
    let err = unsafe { h.get_error() };

    if err != glow::NO_ERROR {
        let error_str = match err {
            glow::INVALID_ENUM => "GL_INVALID_ENUM",
            glow::INVALID_VALUE => "GL_INVALID_VALUE",
            glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
            glow::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
            glow::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
            glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
            glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
            glow::CONTEXT_LOST => "GL_CONTEXT_LOST",
            _ => "Unknown GL error",
        };

        tracing::error!("GL error: {}", error_str)
    }
}

trait ResultExt<T, E> {
    fn gl_err(self) -> Result<T, GlError>;
}

impl<T, E: Into<GlError>> ResultExt<T, E> for Result<T, E> {
    fn gl_err(self) -> Result<T, GlError> {
        self.map_err(Into::into)
    }
}
