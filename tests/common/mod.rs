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

//! An in-memory backend that records every call made against it.
//!
//! The backend hands out integer handles, keeps a call log the tests assert
//! on, and runs a small GLSL-shaped front end over submitted shader source so
//! that compile and link failures behave like a driver's: bad source fails
//! the compile with a line-tagged log, and a fragment input with no matching
//! vertex output fails the link.

#![allow(dead_code)]

use gyre::glam::Mat4;
use gyre::{BufferType, GpuContext, PrimitiveMode, ShaderStage};

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::convert::Infallible;

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateShader(ShaderStage),
    CompileShader(ShaderStage),
    DeleteShader(ShaderStage),
    CreateProgram,
    AttachShader(ShaderStage),
    DetachShader(ShaderStage),
    LinkProgram,
    DeleteProgram,
    UseProgram,
    CreateBuffer(u32),
    WriteBuffer {
        buffer: u32,
        ty: BufferType,
        byte_len: usize,
    },
    DeleteBuffer(u32),
    Viewport {
        width: u32,
        height: u32,
    },
    Clear {
        color: [f32; 4],
        depth: f32,
    },
    BindAttribute {
        buffer: u32,
        location: u32,
        components: i32,
    },
    BindIndexBuffer(u32),
    SetUniformMatrix {
        name: String,
        matrix: [f32; 16],
    },
    DrawArrays {
        mode: PrimitiveMode,
        first: i32,
        count: i32,
    },
    DrawElements {
        mode: PrimitiveMode,
        count: i32,
    },
}

struct ShaderRecord {
    stage: ShaderStage,
    source: String,
    compiled: Option<Result<StageInterface, String>>,
}

struct ProgramRecord {
    attached: Vec<u32>,
    linked: Option<Result<LinkedProgram, String>>,
}

/// The names a compiled stage declares, in declaration order.
#[derive(Debug, Default, Clone)]
struct StageInterface {
    attributes: Vec<String>,
    outputs: Vec<String>,
    inputs: Vec<String>,
    uniforms: Vec<String>,
}

#[derive(Debug, Clone)]
struct LinkedProgram {
    attributes: Vec<String>,
    uniforms: Vec<String>,
}

#[derive(Default)]
struct State {
    next_id: u32,
    calls: Vec<Call>,
    shaders: BTreeMap<u32, ShaderRecord>,
    programs: BTreeMap<u32, ProgramRecord>,
    buffers: BTreeMap<u32, usize>,
}

impl State {
    fn fresh_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn stage_of(&self, shader: u32) -> ShaderStage {
        self.shaders
            .get(&shader)
            .expect("shader does not exist")
            .stage
    }
}

/// The recording backend itself.
#[derive(Default)]
pub struct RecordingContext {
    state: RefCell<State>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, in call order.
    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    /// Drain the call log, so later assertions start from a clean slate.
    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut self.state.borrow_mut().calls)
    }

    /// How many live (created, not deleted) buffers the backend holds.
    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    /// How many live programs the backend holds.
    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    /// How many live shader stage objects the backend holds.
    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }
}

impl GpuContext for RecordingContext {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type AttribLocation = u32;
    type UniformLocation = String;
    type Error = Infallible;

    fn shader_header(&self) -> &str {
        "#version 330 core"
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, Infallible> {
        let mut state = self.state.borrow_mut();
        let id = state.fresh_id();
        state.shaders.insert(
            id,
            ShaderRecord {
                stage,
                source: String::new(),
                compiled: None,
            },
        );
        state.calls.push(Call::CreateShader(stage));
        Ok(id)
    }

    fn shader_source(&self, shader: &u32, source: &str) {
        let mut state = self.state.borrow_mut();
        let record = state.shaders.get_mut(shader).expect("shader does not exist");
        record.source = source.to_owned();
    }

    fn compile_shader(&self, shader: &u32) {
        let mut state = self.state.borrow_mut();
        let record = state.shaders.get_mut(shader).expect("shader does not exist");
        record.compiled = Some(analyze(record.stage, &record.source));
        let stage = record.stage;
        state.calls.push(Call::CompileShader(stage));
    }

    fn compile_succeeded(&self, shader: &u32) -> bool {
        matches!(
            self.state.borrow().shaders[shader].compiled,
            Some(Ok(_))
        )
    }

    fn shader_info_log(&self, shader: &u32) -> String {
        match &self.state.borrow().shaders[shader].compiled {
            Some(Err(log)) => log.clone(),
            _ => String::new(),
        }
    }

    fn delete_shader(&self, shader: u32) {
        let mut state = self.state.borrow_mut();
        let record = state
            .shaders
            .remove(&shader)
            .expect("deleting a shader that does not exist");
        state.calls.push(Call::DeleteShader(record.stage));
    }

    fn create_program(&self) -> Result<u32, Infallible> {
        let mut state = self.state.borrow_mut();
        let id = state.fresh_id();
        state.programs.insert(
            id,
            ProgramRecord {
                attached: Vec::new(),
                linked: None,
            },
        );
        state.calls.push(Call::CreateProgram);
        Ok(id)
    }

    fn attach_shader(&self, program: &u32, shader: &u32) {
        let mut state = self.state.borrow_mut();
        let stage = state.stage_of(*shader);
        state
            .programs
            .get_mut(program)
            .expect("program does not exist")
            .attached
            .push(*shader);
        state.calls.push(Call::AttachShader(stage));
    }

    fn detach_shader(&self, program: &u32, shader: &u32) {
        let mut state = self.state.borrow_mut();
        let stage = state.stage_of(*shader);
        let attached = &mut state
            .programs
            .get_mut(program)
            .expect("program does not exist")
            .attached;
        attached.retain(|id| id != shader);
        state.calls.push(Call::DetachShader(stage));
    }

    fn link_program(&self, program: &u32) {
        let state = &mut *self.state.borrow_mut();
        state.calls.push(Call::LinkProgram);

        let attached = state
            .programs
            .get(program)
            .expect("program does not exist")
            .attached
            .clone();

        let mut vertex = None;
        let mut fragment = None;
        for id in attached {
            let record = state.shaders.get(&id).expect("attached shader was deleted");
            match (record.stage, &record.compiled) {
                (ShaderStage::Vertex, Some(Ok(interface))) => vertex = Some(interface.clone()),
                (ShaderStage::Fragment, Some(Ok(interface))) => fragment = Some(interface.clone()),
                _ => {}
            }
        }

        let outcome = match (vertex, fragment) {
            (Some(vertex), Some(fragment)) => link_interfaces(&vertex, &fragment),
            _ => Err(
                "error: program must have a compiled vertex and fragment shader attached"
                    .to_owned(),
            ),
        };

        state
            .programs
            .get_mut(program)
            .expect("program does not exist")
            .linked = Some(outcome);
    }

    fn link_succeeded(&self, program: &u32) -> bool {
        matches!(
            self.state.borrow().programs[program].linked,
            Some(Ok(_))
        )
    }

    fn program_info_log(&self, program: &u32) -> String {
        match &self.state.borrow().programs[program].linked {
            Some(Err(log)) => log.clone(),
            _ => String::new(),
        }
    }

    fn delete_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        state
            .programs
            .remove(&program)
            .expect("deleting a program that does not exist");
        state.calls.push(Call::DeleteProgram);
    }

    fn use_program(&self, program: &u32) {
        let mut state = self.state.borrow_mut();
        assert!(
            state.programs.contains_key(program),
            "using a program that does not exist"
        );
        state.calls.push(Call::UseProgram);
    }

    fn attrib_location(&self, program: &u32, name: &str) -> Option<u32> {
        match &self.state.borrow().programs[program].linked {
            Some(Ok(linked)) => linked
                .attributes
                .iter()
                .position(|attr| attr == name)
                .map(|slot| slot as u32),
            _ => None,
        }
    }

    fn uniform_location(&self, program: &u32, name: &str) -> Option<String> {
        match &self.state.borrow().programs[program].linked {
            Some(Ok(linked)) => linked
                .uniforms
                .iter()
                .any(|uniform| uniform == name)
                .then(|| name.to_owned()),
            _ => None,
        }
    }

    fn create_buffer(&self) -> Result<u32, Infallible> {
        let mut state = self.state.borrow_mut();
        let id = state.fresh_id();
        state.buffers.insert(id, 0);
        state.calls.push(Call::CreateBuffer(id));
        Ok(id)
    }

    fn write_buffer(&self, buffer: &u32, ty: BufferType, data: &[u8]) {
        let mut state = self.state.borrow_mut();
        *state
            .buffers
            .get_mut(buffer)
            .expect("writing a buffer that does not exist") = data.len();
        state.calls.push(Call::WriteBuffer {
            buffer: *buffer,
            ty,
            byte_len: data.len(),
        });
    }

    fn delete_buffer(&self, buffer: u32) {
        let mut state = self.state.borrow_mut();
        state
            .buffers
            .remove(&buffer)
            .expect("deleting a buffer that does not exist");
        state.calls.push(Call::DeleteBuffer(buffer));
    }

    fn viewport(&self, width: u32, height: u32) {
        self.state
            .borrow_mut()
            .calls
            .push(Call::Viewport { width, height });
    }

    fn clear(&self, color: [f32; 4], depth: f32) {
        self.state
            .borrow_mut()
            .calls
            .push(Call::Clear { color, depth });
    }

    fn bind_attribute(&self, buffer: &u32, location: &u32, components: i32) {
        self.state.borrow_mut().calls.push(Call::BindAttribute {
            buffer: *buffer,
            location: *location,
            components,
        });
    }

    fn bind_index_buffer(&self, buffer: &u32) {
        self.state
            .borrow_mut()
            .calls
            .push(Call::BindIndexBuffer(*buffer));
    }

    fn set_uniform_matrix(&self, location: &String, matrix: &Mat4) {
        self.state.borrow_mut().calls.push(Call::SetUniformMatrix {
            name: location.clone(),
            matrix: matrix.to_cols_array(),
        });
    }

    fn draw_arrays(&self, mode: PrimitiveMode, first: i32, count: i32) {
        self.state
            .borrow_mut()
            .calls
            .push(Call::DrawArrays { mode, first, count });
    }

    fn draw_elements(&self, mode: PrimitiveMode, count: i32) {
        self.state
            .borrow_mut()
            .calls
            .push(Call::DrawElements { mode, count });
    }
}

const DECLARATION_KEYWORDS: &[&str] = &[
    "in ",
    "out ",
    "uniform ",
    "attribute ",
    "varying ",
    "precision ",
];

/// Run the GLSL-shaped front end over one stage's source.
///
/// Understands just enough of the language for these tests: global
/// declarations must end in a semicolon, braces must balance, and a `main`
/// entry point must exist. Returns the declared interface on success and a
/// driver-flavored log on failure.
fn analyze(stage: ShaderStage, source: &str) -> Result<StageInterface, String> {
    let mut interface = StageInterface::default();
    let mut depth = 0i32;
    let mut saw_main = false;
    let mut last_line = 0;

    for (index, raw_line) in source.lines().enumerate() {
        let line_no = index + 1;
        last_line = line_no;
        let line = raw_line.trim();

        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }

        if line.contains("void main") {
            saw_main = true;
        }

        if depth == 0 && DECLARATION_KEYWORDS.iter().any(|kw| line.starts_with(kw)) {
            if !line.ends_with(';') {
                return Err(format!("ERROR: 0:{line_no}: ';' : syntax error"));
            }

            let mut tokens = line.trim_end_matches(';').split_whitespace();
            let qualifier = tokens.next().unwrap_or_default();
            let name = tokens.last().unwrap_or_default().to_owned();

            match (stage, qualifier) {
                (_, "precision") => {}
                (_, "uniform") => interface.uniforms.push(name),
                (ShaderStage::Vertex, "in") | (ShaderStage::Vertex, "attribute") => {
                    interface.attributes.push(name)
                }
                (ShaderStage::Vertex, "out") | (ShaderStage::Vertex, "varying") => {
                    interface.outputs.push(name)
                }
                (ShaderStage::Fragment, "in") | (ShaderStage::Fragment, "varying") => {
                    interface.inputs.push(name)
                }
                _ => {}
            }
        }

        for ch in line.chars() {
            match ch {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }
        }
    }

    if depth != 0 {
        return Err(format!(
            "ERROR: 0:{last_line}: '}}' : syntax error, unexpected end of file"
        ));
    }
    if !saw_main {
        return Err("ERROR: entry point 'main' not found".to_owned());
    }

    Ok(interface)
}

/// The link rule: every fragment input must be fed by a vertex output.
fn link_interfaces(
    vertex: &StageInterface,
    fragment: &StageInterface,
) -> Result<LinkedProgram, String> {
    for input in &fragment.inputs {
        if !vertex.outputs.contains(input) {
            return Err(format!(
                "error: fragment shader input '{input}' has no matching output in vertex shader"
            ));
        }
    }

    let mut uniforms: Vec<String> = vertex
        .uniforms
        .iter()
        .chain(&fragment.uniforms)
        .cloned()
        .collect();
    uniforms.sort();
    uniforms.dedup();

    Ok(LinkedProgram {
        attributes: vertex.attributes.clone(),
        uniforms,
    })
}
