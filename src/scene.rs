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

//! The per-frame scene driver.

use super::geometry::Mesh;
use super::gpu_backend::{BufferType, GpuContext};
use super::program::{ProgramBindings, ShaderProgramBuilder, ShaderSource};
use super::resources::{CompiledProgram, DeviceBuffer};
use super::Error;

use glam::{Mat4, Vec3};

use std::time::Duration;

/// The embedded vertex stage of the canonical shader pair.
pub const VERTEX_SHADER: &str = include_str!("./shaders/scene.v.glsl");

/// The embedded fragment stage of the canonical shader pair.
pub const FRAGMENT_SHADER: &str = include_str!("./shaders/scene.f.glsl");

const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
const CLEAR_DEPTH: f32 = 1.0;

/// Vertical field of view of the projection, in radians.
const FIELD_OF_VIEW: f32 = std::f32::consts::FRAC_PI_4;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 100.0;

/// The mesh sits a few units into the screen so the projection can see it.
const MODEL_OFFSET: Vec3 = Vec3::new(0.0, 0.0, -6.0);

/// How the single rotation angle maps onto the three axes.
///
/// Each field is a rate factor; the mesh is rotated by `angle * rate` about
/// the matching axis, z first, then y, then x.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Spin {
    /// Rate about the z axis.
    pub z: f32,

    /// Rate about the y axis.
    pub y: f32,

    /// Rate about the x axis.
    pub x: f32,
}

impl Spin {
    /// Spin in the plane of the screen only.
    pub const ABOUT_Z: Self = Spin {
        z: 1.0,
        y: 0.0,
        x: 0.0,
    };

    /// The classic tumble: full rate about z, 0.7 about y, 0.3 about x.
    pub const TUMBLE: Self = Spin {
        z: 1.0,
        y: 0.7,
        x: 0.3,
    };
}

impl Default for Spin {
    fn default() -> Self {
        Self::ABOUT_Z
    }
}

/// The GPU-resident buffers backing a mesh.
///
/// One buffer per vertex stream plus the index buffer when the mesh is drawn
/// indexed. Each is written exactly once, at construction.
pub struct SceneBuffers<C: GpuContext + ?Sized> {
    position: DeviceBuffer<C>,
    color: DeviceBuffer<C>,
    index: Option<DeviceBuffer<C>>,
}

impl<C: GpuContext + ?Sized> SceneBuffers<C> {
    /// Create the buffers for a mesh and upload its fixed arrays.
    pub fn new(context: &C, mesh: &Mesh) -> Result<Self, Error> {
        let position = DeviceBuffer::new(context)?;
        position.upload(context, BufferType::Vertex, mesh.positions());

        let color = DeviceBuffer::new(context)?;
        color.upload(context, BufferType::Vertex, mesh.colors());

        let index = match mesh.indices() {
            Some(indices) => {
                let buffer = DeviceBuffer::new(context)?;
                buffer.upload(context, BufferType::Index, indices);
                Some(buffer)
            }
            None => None,
        };

        Ok(Self {
            position,
            color,
            index,
        })
    }
}

/// A mesh, its compiled program and buffers, and the rotation state.
///
/// This is the whole rendering session: construction compiles and links the
/// embedded shader pair, resolves the attribute and uniform bindings, and
/// uploads the mesh's arrays. After that, the host calls [`advance`] and
/// [`render`] once per display refresh, and [`into_context`] at teardown.
///
/// The rotation angle lives here, owned and explicit; it is only ever read
/// and written from the frame callback.
///
/// [`advance`]: Scene::advance
/// [`render`]: Scene::render
/// [`into_context`]: Scene::into_context
pub struct Scene<C: GpuContext> {
    program: CompiledProgram<C>,
    bindings: ProgramBindings<C>,
    buffers: SceneBuffers<C>,
    mesh: Mesh,
    spin: Spin,
    angle: f32,
    context: C,
}

impl<C: GpuContext> Scene<C> {
    /// Set up a scene with the default spin.
    pub fn new(context: C, mesh: Mesh) -> Result<Self, Error> {
        Self::with_spin(context, mesh, Spin::default())
    }

    /// Set up a scene, choosing how the angle maps onto the axes.
    pub fn with_spin(context: C, mesh: Mesh, spin: Spin) -> Result<Self, Error> {
        let source = ShaderSource::new(VERTEX_SHADER, FRAGMENT_SHADER);
        let program = ShaderProgramBuilder::new(source).build(&context)?;
        let bindings = ProgramBindings::resolve(&context, &program);
        let buffers = SceneBuffers::new(&context, &mesh)?;

        Ok(Self {
            program,
            bindings,
            buffers,
            mesh,
            spin,
            angle: 0.0,
            context,
        })
    }

    /// The backend this scene renders through.
    pub fn context(&self) -> &C {
        &self.context
    }

    /// The current rotation angle, in radians.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Advance the rotation by a frame delta.
    pub fn advance(&mut self, dt: Duration) {
        self.angle += dt.as_secs_f32();
    }

    /// Draw one frame at the given surface size.
    ///
    /// Clears color and depth, binds the vertex streams, selects the program,
    /// uploads the two matrices and issues exactly one draw call. Bindings
    /// that failed to resolve are skipped.
    pub fn render(&self, width: u32, height: u32) {
        let context = &self.context;

        context.viewport(width, height);
        context.clear(CLEAR_COLOR, CLEAR_DEPTH);

        if let Some(position) = &self.bindings.position {
            context.bind_attribute(
                self.buffers.position.resource(),
                position,
                self.mesh.position_components(),
            );
        }
        if let Some(color) = &self.bindings.color {
            context.bind_attribute(self.buffers.color.resource(), color, 4);
        }

        context.use_program(self.program.resource());

        if let Some(projection) = &self.bindings.projection {
            let aspect = width as f32 / height as f32;
            let matrix = Mat4::perspective_rh_gl(FIELD_OF_VIEW, aspect, Z_NEAR, Z_FAR);
            context.set_uniform_matrix(projection, &matrix);
        }
        if let Some(model_view) = &self.bindings.model_view {
            context.set_uniform_matrix(model_view, &model_view_matrix(self.angle, self.spin));
        }

        match (&self.buffers.index, self.mesh.indices()) {
            (Some(buffer), Some(indices)) => {
                context.bind_index_buffer(buffer.resource());
                context.draw_elements(self.mesh.primitive(), indices.len() as i32);
            }
            _ => {
                context.draw_arrays(self.mesh.primitive(), 0, self.mesh.vertex_count() as i32);
            }
        }
    }

    /// Tear the session down, deleting the program and buffers, and hand the
    /// backend back.
    pub fn into_context(self) -> C {
        let Self {
            program,
            buffers,
            context,
            ..
        } = self;

        context.delete_program(program.into_raw());

        let SceneBuffers {
            position,
            color,
            index,
        } = buffers;
        context.delete_buffer(position.into_raw());
        context.delete_buffer(color.into_raw());
        if let Some(index) = index {
            context.delete_buffer(index.into_raw());
        }

        context
    }
}

/// Place the mesh at the model offset, rotated by the angle about each axis
/// at its spin rate.
fn model_view_matrix(angle: f32, spin: Spin) -> Mat4 {
    Mat4::from_translation(MODEL_OFFSET)
        * Mat4::from_rotation_z(angle * spin.z)
        * Mat4::from_rotation_y(angle * spin.y)
        * Mat4::from_rotation_x(angle * spin.x)
}
