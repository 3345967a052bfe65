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

//! Defines opaque wrappers around backend resource handles.

use super::gpu_backend::{BufferType, GpuContext};
use super::Error;

use std::fmt;

macro_rules! define_resource_wrappers {
    ($($(#[$attr:meta])* $name:ident($res:ident)),* $(,)?) => {
        $(
            $(#[$attr])*
            pub struct $name<C: GpuContext + ?Sized> {
                resource: C::$res,
            }

            impl<C: GpuContext + ?Sized> fmt::Debug for $name<C> {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.debug_struct(stringify!($name)).finish_non_exhaustive()
                }
            }

            impl<C: GpuContext + ?Sized> $name<C> {
                pub(crate) fn from_raw(resource: C::$res) -> Self {
                    Self { resource }
                }

                pub(crate) fn resource(&self) -> &C::$res {
                    &self.resource
                }

                pub(crate) fn into_raw(self) -> C::$res {
                    self.resource
                }
            }
        )*
    };
}

define_resource_wrappers! {
    /// A linked, GPU-executable pairing of a vertex stage and a fragment stage.
    ///
    /// Never mutated after a successful link; deleted at session teardown.
    CompiledProgram(Program),

    /// A GPU-resident buffer holding one of the fixed vertex streams or the
    /// index list. Written once, invariantly static for the session.
    DeviceBuffer(Buffer),
}

impl<C: GpuContext + ?Sized> DeviceBuffer<C> {
    /// Create an empty buffer object.
    pub(crate) fn new(context: &C) -> Result<Self, Error> {
        let resource = context.create_buffer().map_err(Error::backend)?;
        Ok(Self::from_raw(resource))
    }

    /// Write a fixed array into the buffer, as raw bytes.
    pub(crate) fn upload<T: bytemuck::Pod>(&self, context: &C, ty: BufferType, data: &[T]) {
        context.write_buffer(self.resource(), ty, bytemuck::cast_slice(data));
    }
}
