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

//! Defines the GPU backend boundary.

use glam::Mat4;

use std::error::Error;

/// The backend for the scene renderer.
///
/// Implementations adapt a real graphics API (or a fake one, in tests) to the
/// handful of operations the crate needs: shader and program bootstrap, static
/// buffer upload, and a once-per-frame draw. All methods take `&self`; graphics
/// contexts are expected to be thread-unsafe and internally mutable, and nothing
/// here is ever touched from more than one thread.
pub trait GpuContext {
    /// The type associated with a single shader stage.
    type Shader;

    /// The type associated with a linked program.
    type Program;

    /// The type associated with a GPU buffer.
    type Buffer;

    /// The location of a per-vertex attribute within a linked program.
    type AttribLocation;

    /// The location of a uniform within a linked program.
    type UniformLocation;

    /// The error type associated with this GPU context.
    type Error: Error + 'static;

    /// The dialect header to prepend to shader source before compiling.
    ///
    /// One embedded GLSL body serves several profiles; the backend knows which
    /// `#version` line makes it valid for the context it talks to.
    fn shader_header(&self) -> &str;

    /// Create a new, empty shader stage object.
    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, Self::Error>;

    /// Replace the source text of a shader stage.
    fn shader_source(&self, shader: &Self::Shader, source: &str);

    /// Compile a shader stage from its current source.
    ///
    /// Failure is not reported here; query [`compile_succeeded`] afterwards.
    ///
    /// [`compile_succeeded`]: GpuContext::compile_succeeded
    fn compile_shader(&self, shader: &Self::Shader);

    /// Whether the last compile of this stage succeeded.
    fn compile_succeeded(&self, shader: &Self::Shader) -> bool;

    /// The diagnostic log of the last compile of this stage.
    fn shader_info_log(&self, shader: &Self::Shader) -> String;

    /// Delete a shader stage object.
    fn delete_shader(&self, shader: Self::Shader);

    /// Create a new, empty program object.
    fn create_program(&self) -> Result<Self::Program, Self::Error>;

    /// Attach a compiled stage to a program.
    fn attach_shader(&self, program: &Self::Program, shader: &Self::Shader);

    /// Detach a stage from a program.
    fn detach_shader(&self, program: &Self::Program, shader: &Self::Shader);

    /// Link the attached stages into an executable program.
    ///
    /// Failure is not reported here; query [`link_succeeded`] afterwards.
    ///
    /// [`link_succeeded`]: GpuContext::link_succeeded
    fn link_program(&self, program: &Self::Program);

    /// Whether the last link of this program succeeded.
    fn link_succeeded(&self, program: &Self::Program) -> bool;

    /// The diagnostic log of the last link of this program.
    fn program_info_log(&self, program: &Self::Program) -> String;

    /// Delete a program object.
    fn delete_program(&self, program: Self::Program);

    /// Select a linked program for subsequent draws.
    fn use_program(&self, program: &Self::Program);

    /// Look up a named per-vertex attribute in a linked program.
    ///
    /// Returns `None` when the name does not occur in the program. Backends do
    /// not treat this as an error.
    fn attrib_location(&self, program: &Self::Program, name: &str)
        -> Option<Self::AttribLocation>;

    /// Look up a named uniform in a linked program.
    ///
    /// Returns `None` when the name does not occur in the program. Backends do
    /// not treat this as an error.
    fn uniform_location(&self, program: &Self::Program, name: &str)
        -> Option<Self::UniformLocation>;

    /// Create a new, empty buffer object.
    fn create_buffer(&self) -> Result<Self::Buffer, Self::Error>;

    /// Write data into a buffer.
    ///
    /// Buffers in this crate are written exactly once and never updated, so
    /// backends should use their static-usage upload path.
    fn write_buffer(&self, buffer: &Self::Buffer, ty: BufferType, data: &[u8]);

    /// Delete a buffer object.
    fn delete_buffer(&self, buffer: Self::Buffer);

    /// Set the drawable area to the given size in pixels.
    fn viewport(&self, width: u32, height: u32);

    /// Clear the color and depth buffers.
    ///
    /// Sets the given clear color and clear depth, leaves depth testing enabled
    /// with a less-or-equal comparison, and clears both buffers.
    fn clear(&self, color: [f32; 4], depth: f32);

    /// Feed a buffer of tightly packed `f32` data to a vertex attribute.
    ///
    /// `components` is the number of floats per vertex (2, 3 or 4); the data is
    /// not normalized and has no stride or offset.
    fn bind_attribute(
        &self,
        buffer: &Self::Buffer,
        location: &Self::AttribLocation,
        components: i32,
    );

    /// Bind a buffer of `u16` indices for subsequent indexed draws.
    fn bind_index_buffer(&self, buffer: &Self::Buffer);

    /// Upload a 4x4 matrix uniform.
    fn set_uniform_matrix(&self, location: &Self::UniformLocation, matrix: &Mat4);

    /// Draw consecutive vertices from the bound attribute buffers.
    fn draw_arrays(&self, mode: PrimitiveMode, first: i32, count: i32);

    /// Draw `count` vertices through the bound `u16` index buffer, starting at
    /// offset zero.
    fn draw_elements(&self, mode: PrimitiveMode, count: i32);
}

impl<C: GpuContext + ?Sized> GpuContext for &C {
    type Shader = C::Shader;
    type Program = C::Program;
    type Buffer = C::Buffer;
    type AttribLocation = C::AttribLocation;
    type UniformLocation = C::UniformLocation;
    type Error = C::Error;

    fn attach_shader(&self, program: &Self::Program, shader: &Self::Shader) {
        (**self).attach_shader(program, shader)
    }

    fn attrib_location(
        &self,
        program: &Self::Program,
        name: &str,
    ) -> Option<Self::AttribLocation> {
        (**self).attrib_location(program, name)
    }

    fn bind_attribute(
        &self,
        buffer: &Self::Buffer,
        location: &Self::AttribLocation,
        components: i32,
    ) {
        (**self).bind_attribute(buffer, location, components)
    }

    fn bind_index_buffer(&self, buffer: &Self::Buffer) {
        (**self).bind_index_buffer(buffer)
    }

    fn clear(&self, color: [f32; 4], depth: f32) {
        (**self).clear(color, depth)
    }

    fn compile_shader(&self, shader: &Self::Shader) {
        (**self).compile_shader(shader)
    }

    fn compile_succeeded(&self, shader: &Self::Shader) -> bool {
        (**self).compile_succeeded(shader)
    }

    fn create_buffer(&self) -> Result<Self::Buffer, Self::Error> {
        (**self).create_buffer()
    }

    fn create_program(&self) -> Result<Self::Program, Self::Error> {
        (**self).create_program()
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, Self::Error> {
        (**self).create_shader(stage)
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        (**self).delete_buffer(buffer)
    }

    fn delete_program(&self, program: Self::Program) {
        (**self).delete_program(program)
    }

    fn delete_shader(&self, shader: Self::Shader) {
        (**self).delete_shader(shader)
    }

    fn detach_shader(&self, program: &Self::Program, shader: &Self::Shader) {
        (**self).detach_shader(program, shader)
    }

    fn draw_arrays(&self, mode: PrimitiveMode, first: i32, count: i32) {
        (**self).draw_arrays(mode, first, count)
    }

    fn draw_elements(&self, mode: PrimitiveMode, count: i32) {
        (**self).draw_elements(mode, count)
    }

    fn link_program(&self, program: &Self::Program) {
        (**self).link_program(program)
    }

    fn link_succeeded(&self, program: &Self::Program) -> bool {
        (**self).link_succeeded(program)
    }

    fn program_info_log(&self, program: &Self::Program) -> String {
        (**self).program_info_log(program)
    }

    fn set_uniform_matrix(&self, location: &Self::UniformLocation, matrix: &Mat4) {
        (**self).set_uniform_matrix(location, matrix)
    }

    fn shader_header(&self) -> &str {
        (**self).shader_header()
    }

    fn shader_info_log(&self, shader: &Self::Shader) -> String {
        (**self).shader_info_log(shader)
    }

    fn shader_source(&self, shader: &Self::Shader, source: &str) {
        (**self).shader_source(shader, source)
    }

    fn uniform_location(
        &self,
        program: &Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        (**self).uniform_location(program, name)
    }

    fn use_program(&self, program: &Self::Program) {
        (**self).use_program(program)
    }

    fn viewport(&self, width: u32, height: u32) {
        (**self).viewport(width, height)
    }

    fn write_buffer(&self, buffer: &Self::Buffer, ty: BufferType, data: &[u8]) {
        (**self).write_buffer(buffer, ty, data)
    }
}

/// One shader compilation unit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShaderStage {
    /// The per-vertex stage.
    Vertex,

    /// The per-fragment stage.
    Fragment,
}

impl ShaderStage {
    /// The lowercase name of the stage, as used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

/// The kind of primitive batch a draw call rasterizes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrimitiveMode {
    /// Every three vertices form an independent triangle.
    Triangles,

    /// Each vertex after the second forms a triangle with the two before it.
    TriangleStrip,
}

/// The type of the buffer to use.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BufferType {
    /// The buffer is used for vertices.
    Vertex,

    /// The buffer is used for indices.
    Index,
}
