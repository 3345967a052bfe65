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

//! Compiling and linking the shader program.

use super::gpu_backend::{GpuContext, ShaderStage};
use super::resources::CompiledProgram;
use super::Error;

use std::borrow::Cow;

/// Name of the per-vertex position attribute in the embedded shader pair.
pub const POSITION_ATTRIBUTE: &str = "aVertexPosition";

/// Name of the per-vertex color attribute in the embedded shader pair.
pub const COLOR_ATTRIBUTE: &str = "aVertexColor";

/// Name of the projection matrix uniform in the embedded shader pair.
pub const PROJECTION_UNIFORM: &str = "uProjectionMatrix";

/// Name of the model-view matrix uniform in the embedded shader pair.
pub const MODEL_VIEW_UNIFORM: &str = "uModelViewMatrix";

/// The two immutable text blobs a program is built from.
///
/// Supplied once at startup; there is no lifecycle beyond construction. The
/// text is a dialect-free GLSL body; the backend's [`shader_header`] is
/// prepended before compiling.
///
/// [`shader_header`]: GpuContext::shader_header
#[derive(Debug, Clone)]
pub struct ShaderSource {
    /// The vertex stage text.
    pub vertex: Cow<'static, str>,

    /// The fragment stage text.
    pub fragment: Cow<'static, str>,
}

impl ShaderSource {
    /// Bundle a vertex stage and a fragment stage.
    pub fn new(
        vertex: impl Into<Cow<'static, str>>,
        fragment: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }
}

/// Compiles a vertex/fragment source pair and links it into a program.
///
/// Each stage is compiled independently, vertex first. A stage that fails to
/// compile is surfaced as [`Error::ShaderCompile`] tagged with the failing
/// stage and the backend's diagnostic text; the build aborts without
/// attempting the link, and every partially-created object is released. A
/// link failure after two clean compiles is surfaced as
/// [`Error::ProgramLink`] the same way.
///
/// Success hands back the opaque program handle with no further validation.
/// Attribute and uniform locations are resolved separately through
/// [`ProgramBindings::resolve`], and that lookup is allowed to fail silently.
#[derive(Debug, Clone)]
pub struct ShaderProgramBuilder {
    source: ShaderSource,
}

impl ShaderProgramBuilder {
    /// Create a builder for the given source pair.
    pub fn new(source: ShaderSource) -> Self {
        Self { source }
    }

    /// Compile both stages and link them.
    pub fn build<C: GpuContext + ?Sized>(
        &self,
        context: &C,
    ) -> Result<CompiledProgram<C>, Error> {
        let vertex = compile_stage(context, ShaderStage::Vertex, &self.source.vertex)?;
        let fragment = match compile_stage(context, ShaderStage::Fragment, &self.source.fragment) {
            Ok(fragment) => fragment,
            Err(err) => {
                context.delete_shader(vertex);
                return Err(err);
            }
        };

        let program = match context.create_program() {
            Ok(program) => program,
            Err(err) => {
                context.delete_shader(vertex);
                context.delete_shader(fragment);
                return Err(Error::backend(err));
            }
        };

        context.attach_shader(&program, &vertex);
        context.attach_shader(&program, &fragment);
        context.link_program(&program);
        let linked = context.link_succeeded(&program);

        // The linked program carries its own executable; the stage objects
        // are dead weight from here on, success or not.
        context.detach_shader(&program, &vertex);
        context.detach_shader(&program, &fragment);
        context.delete_shader(vertex);
        context.delete_shader(fragment);

        if !linked {
            let diagnostic = context.program_info_log(&program);
            context.delete_program(program);
            return Err(Error::ProgramLink { diagnostic });
        }

        Ok(CompiledProgram::from_raw(program))
    }
}

/// Compile a single stage, deleting it again if the compile fails.
fn compile_stage<C: GpuContext + ?Sized>(
    context: &C,
    stage: ShaderStage,
    body: &str,
) -> Result<C::Shader, Error> {
    let shader = context.create_shader(stage).map_err(Error::backend)?;
    let source = format!("{}\n{}", context.shader_header(), body);
    context.shader_source(&shader, &source);
    context.compile_shader(&shader);

    if !context.compile_succeeded(&shader) {
        let diagnostic = context.shader_info_log(&shader);
        context.delete_shader(shader);
        return Err(Error::ShaderCompile { stage, diagnostic });
    }

    Ok(shader)
}

/// Name-to-slot lookups, resolved once after linking and read-only after.
///
/// A name the linked program does not expose resolves to `None`. Resolution
/// logs a warning for it, and draw code skips the affected bind or upload
/// rather than failing the frame.
pub struct ProgramBindings<C: GpuContext + ?Sized> {
    /// Slot of the per-vertex position attribute.
    pub position: Option<C::AttribLocation>,

    /// Slot of the per-vertex color attribute.
    pub color: Option<C::AttribLocation>,

    /// Slot of the projection matrix uniform.
    pub projection: Option<C::UniformLocation>,

    /// Slot of the model-view matrix uniform.
    pub model_view: Option<C::UniformLocation>,
}

impl<C: GpuContext + ?Sized> ProgramBindings<C> {
    /// Resolve the fixed attribute and uniform names against a linked program.
    pub fn resolve(context: &C, program: &CompiledProgram<C>) -> Self {
        Self {
            position: attrib(context, program, POSITION_ATTRIBUTE),
            color: attrib(context, program, COLOR_ATTRIBUTE),
            projection: uniform(context, program, PROJECTION_UNIFORM),
            model_view: uniform(context, program, MODEL_VIEW_UNIFORM),
        }
    }
}

fn attrib<C: GpuContext + ?Sized>(
    context: &C,
    program: &CompiledProgram<C>,
    name: &str,
) -> Option<C::AttribLocation> {
    let location = context.attrib_location(program.resource(), name);
    if location.is_none() {
        tracing::warn!("attribute {name:?} not found in linked program");
    }
    location
}

fn uniform<C: GpuContext + ?Sized>(
    context: &C,
    program: &CompiledProgram<C>,
    name: &str,
) -> Option<C::UniformLocation> {
    let location = context.uniform_location(program.resource(), name);
    if location.is_none() {
        tracing::warn!("uniform {name:?} not found in linked program");
    }
    location
}
