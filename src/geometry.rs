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

//! The two fixed meshes the crate knows how to draw.

use super::gpu_backend::PrimitiveMode;

/// One color per cube face, painted onto each of the face's four corners.
const FACE_COLORS: [[f32; 4]; 6] = [
    [1.0, 1.0, 1.0, 1.0], // white
    [1.0, 0.0, 0.0, 1.0], // red
    [0.0, 1.0, 0.0, 1.0], // green
    [0.0, 0.0, 1.0, 1.0], // blue
    [1.0, 1.0, 0.0, 1.0], // yellow
    [1.0, 0.0, 1.0, 1.0], // purple
];

/// A fixed mesh: vertex streams, an optional index list, and how to draw it.
///
/// The arrays are hardcoded and never change after construction; authoring
/// geometry is out of scope for this crate.
#[derive(Debug, Clone)]
pub struct Mesh {
    positions: Vec<f32>,
    position_components: i32,
    colors: Vec<f32>,
    indices: Option<Vec<u16>>,
    primitive: PrimitiveMode,
}

impl Mesh {
    /// The flat quad: four vertices with 2D positions, one color per corner,
    /// drawn as a triangle strip with no index list.
    pub fn quad() -> Self {
        let positions = vec![1.0, 1.0, -1.0, 1.0, 1.0, -1.0, -1.0, -1.0];

        let colors = vec![
            1.0, 1.0, 1.0, 1.0, // white
            1.0, 0.0, 0.0, 1.0, // red
            0.0, 1.0, 0.0, 1.0, // green
            0.0, 0.0, 1.0, 1.0, // blue
        ];

        Self {
            positions,
            position_components: 2,
            colors,
            indices: None,
            primitive: PrimitiveMode::TriangleStrip,
        }
    }

    /// The six-face cube: 24 vertices (four per face, so each face can have
    /// its own flat color), 36 indices forming two triangles per face.
    pub fn cube() -> Self {
        let positions = vec![
            // Front face
            -1.0, -1.0, 1.0, 1.0, -1.0, 1.0, 1.0, 1.0, 1.0, -1.0, 1.0, 1.0,
            // Back face
            -1.0, -1.0, -1.0, -1.0, 1.0, -1.0, 1.0, 1.0, -1.0, 1.0, -1.0, -1.0,
            // Top face
            -1.0, 1.0, -1.0, -1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, -1.0,
            // Bottom face
            -1.0, -1.0, -1.0, 1.0, -1.0, -1.0, 1.0, -1.0, 1.0, -1.0, -1.0, 1.0,
            // Right face
            1.0, -1.0, -1.0, 1.0, 1.0, -1.0, 1.0, 1.0, 1.0, 1.0, -1.0, 1.0,
            // Left face
            -1.0, -1.0, -1.0, -1.0, -1.0, 1.0, -1.0, 1.0, 1.0, -1.0, 1.0, -1.0,
        ];

        let mut colors = Vec::with_capacity(FACE_COLORS.len() * 16);
        for face in FACE_COLORS {
            for _ in 0..4 {
                colors.extend_from_slice(&face);
            }
        }

        let indices = vec![
            0, 1, 2, 0, 2, 3, // front
            4, 5, 6, 4, 6, 7, // back
            8, 9, 10, 8, 10, 11, // top
            12, 13, 14, 12, 14, 15, // bottom
            16, 17, 18, 16, 18, 19, // right
            20, 21, 22, 20, 22, 23, // left
        ];

        Self {
            positions,
            position_components: 3,
            colors,
            indices: Some(indices),
            primitive: PrimitiveMode::Triangles,
        }
    }

    /// The position stream, `position_components` floats per vertex.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Floats per vertex in the position stream (2 or 3).
    pub fn position_components(&self) -> i32 {
        self.position_components
    }

    /// The color stream, four floats per vertex.
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    /// The index list, when the mesh is drawn indexed.
    pub fn indices(&self) -> Option<&[u16]> {
        self.indices.as_deref()
    }

    /// How a draw call should rasterize this mesh.
    pub fn primitive(&self) -> PrimitiveMode {
        self.primitive
    }

    /// Number of vertices in the streams.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / self.position_components as usize
    }
}
