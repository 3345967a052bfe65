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

//! `gyre` turns a bare GPU context into a spinning, colored mesh.
//!
//! The crate is backend-agnostic: everything is phrased against the
//! [`GpuContext`] trait, which describes the handful of operations a real
//! graphics API has to provide. Compiling shaders, linking programs,
//! uploading static buffers, issuing one draw call per frame. The
//! `gyre-glow` crate implements the trait on top of [`glow`]; other
//! backends only need to fill in the same methods.
//!
//! The pieces stack as follows:
//!
//! - [`ShaderProgramBuilder`] compiles and links a vertex/fragment source
//!   pair into a [`CompiledProgram`], reporting compile and link failures
//!   separately and carrying the driver's diagnostic log in the error.
//! - [`Mesh`] holds the two built-in models, a flat quad and a cube, as
//!   plain vertex arrays.
//! - [`Scene`] owns the program, the mesh's device buffers and the rotation
//!   angle, and draws one frame per [`render`] call.
//!
//! [`glow`]: https://crates.io/crates/glow
//! [`render`]: Scene::render

#![forbid(unsafe_code, rust_2018_idioms)]

mod geometry;
mod gpu_backend;
mod program;
mod resources;
mod scene;

pub use glam;

pub use geometry::Mesh;
pub use gpu_backend::{BufferType, GpuContext, PrimitiveMode, ShaderStage};
pub use program::{
    ProgramBindings, ShaderProgramBuilder, ShaderSource, COLOR_ATTRIBUTE, MODEL_VIEW_UNIFORM,
    POSITION_ATTRIBUTE, PROJECTION_UNIFORM,
};
pub use resources::{CompiledProgram, DeviceBuffer};
pub use scene::{Scene, SceneBuffers, Spin, FRAGMENT_SHADER, VERTEX_SHADER};

use std::error::Error as StdError;
use std::fmt;

/// The error type for scene setup.
///
/// Shader trouble keeps its provenance: a failing compile is tagged with the
/// [`ShaderStage`] it came from, a failing link is its own variant, and both
/// carry the driver's info log verbatim.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// A shader stage failed to compile.
    ShaderCompile {
        /// The stage whose compilation failed.
        stage: ShaderStage,

        /// The driver's diagnostic log for the failed compile.
        diagnostic: String,
    },

    /// The attached stages failed to link into a program.
    ProgramLink {
        /// The driver's diagnostic log for the failed link.
        diagnostic: String,
    },

    /// The backend cannot support this crate at all.
    Unsupported(String),

    /// The backend reported an error of its own.
    Backend(Box<dyn StdError>),
}

impl Error {
    /// Wrap an error reported by the [`GpuContext`] implementation.
    pub fn backend<E: StdError + 'static>(err: E) -> Self {
        Self::Backend(Box::new(err))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ShaderCompile { stage, diagnostic } => {
                write!(f, "failed to compile {} shader: {}", stage.as_str(), diagnostic)
            }
            Error::ProgramLink { diagnostic } => {
                write!(f, "failed to link shader program: {diagnostic}")
            }
            Error::Unsupported(what) => write!(f, "unsupported backend: {what}"),
            Error::Backend(err) => write!(f, "backend error: {err}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Backend(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
