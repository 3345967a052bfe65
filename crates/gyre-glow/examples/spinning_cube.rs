// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `gyre-glow`.
//
// `gyre-glow` is free software: you can redistribute it and/or modify it under the terms of
// either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
// version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `gyre-glow` is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Lesser General Public License or the Mozilla Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `gyre-glow`. If not, see <https://www.gnu.org/licenses/>.

//! A cube with a different solid color per face, tumbling about all three axes.

#[path = "util/setup_context.rs"]
mod util;

use gyre::{Mesh, Spin};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    util::init();
    util::run("gyre spinning cube", Mesh::cube(), Spin::TUMBLE)
}
