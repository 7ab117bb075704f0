//! A software [`GraphicsDevice`] that keeps GL-style object state on the CPU
//! and records every call. Used by the command line front end to exercise a
//! whole session without a window, and by tests to assert on what the
//! renderer asked the device to do.
//!
//! Misuse that a real driver would flag with an error code (deleting an
//! unknown id, uploading a uniform with no program bound, drawing with no
//! vertex array) is appended to [`HeadlessDevice::errors`] instead.

use crate::device::{
    ActiveUniform, BufferTarget, ClearMask, DeviceError, DeviceInfo, GraphicsDevice,
    PrimitiveMode, TextureParam, UniformLocation,
};
use crate::glsl::{self, LinkedInterface, StageInterface};
use glam::Mat4;
use meshrig_common::{NativeId, ResourceKind, ShaderStage};
use std::collections::BTreeMap;

/// Last value uploaded to a uniform.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3([f32; 3]),
    Mat4 { data: [f32; 16], transpose: bool },
}

impl UniformValue {
    /// Reassemble a matrix upload, honoring the transpose flag.
    pub fn as_mat4(&self) -> Option<Mat4> {
        match self {
            UniformValue::Mat4 { data, transpose } => {
                let m = Mat4::from_cols_array(data);
                Some(if *transpose { m.transpose() } else { m })
            }
            _ => None,
        }
    }
}

/// One recorded device call.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    Create { kind: ResourceKind, id: NativeId },
    Delete { kind: ResourceKind, id: NativeId },
    CompileShader(NativeId),
    LinkProgram(NativeId),
    UseProgram(Option<NativeId>),
    SetUniform { program: NativeId, location: UniformLocation },
    BindBuffer { target: BufferTarget, buffer: Option<NativeId> },
    BufferData { target: BufferTarget, len: usize },
    BindVertexArray(Option<NativeId>),
    AttribPointer { location: u32, components: u32, stride: u32, offset: u32 },
    EnableAttrib(u32),
    ActiveTexture(u32),
    BindTexture { unit: u32, texture: Option<NativeId> },
    TexImage { width: u32, height: u32 },
    TexParameter(TextureParam),
    GenerateMipmap,
    EnableDepthTest,
    ClearColor([f32; 4]),
    Clear(ClearMask),
    Viewport { x: i32, y: i32, width: u32, height: u32 },
    DrawElements { mode: PrimitiveMode, count: u32 },
    Present,
}

/// Snapshot of the state a draw ran with.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub program: NativeId,
    pub vertex_array: NativeId,
    pub mode: PrimitiveMode,
    pub count: u32,
    /// Texture bound on each unit at draw time.
    pub textures: BTreeMap<u32, NativeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttribPointer {
    pub buffer: NativeId,
    pub components: u32,
    pub stride: u32,
    pub offset: u32,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexArrayObject {
    pub attribs: BTreeMap<u32, AttribPointer>,
    pub element_buffer: Option<NativeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureObject {
    pub width: u32,
    pub height: u32,
    pub byte_len: usize,
    pub params: Vec<TextureParam>,
    pub mip_levels: u32,
}

#[derive(Debug)]
struct ShaderObject {
    stage: ShaderStage,
    source: String,
    compiled: Option<Result<StageInterface, String>>,
}

#[derive(Debug, Default)]
struct ProgramObject {
    attached: Vec<NativeId>,
    linked: Option<Result<LinkedInterface, String>>,
    values: BTreeMap<UniformLocation, UniformValue>,
}

impl ProgramObject {
    fn interface(&self) -> Option<&LinkedInterface> {
        self.linked.as_ref().and_then(|l| l.as_ref().ok())
    }
}

#[derive(Debug)]
pub struct HeadlessDevice {
    next_id: u32,
    fail_next: Option<ResourceKind>,
    shaders: BTreeMap<NativeId, ShaderObject>,
    programs: BTreeMap<NativeId, ProgramObject>,
    buffers: BTreeMap<NativeId, Vec<u8>>,
    vertex_arrays: BTreeMap<NativeId, VertexArrayObject>,
    textures: BTreeMap<NativeId, TextureObject>,
    current_program: Option<NativeId>,
    array_buffer: Option<NativeId>,
    bound_vertex_array: Option<NativeId>,
    active_unit: u32,
    texture_units: BTreeMap<u32, NativeId>,
    depth_test: bool,
    clear_color: [f32; 4],
    viewport: (i32, i32, u32, u32),
    presented: u64,
    calls: Vec<DeviceCall>,
    draws: Vec<DrawCall>,
    errors: Vec<String>,
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            fail_next: None,
            shaders: BTreeMap::new(),
            programs: BTreeMap::new(),
            buffers: BTreeMap::new(),
            vertex_arrays: BTreeMap::new(),
            textures: BTreeMap::new(),
            current_program: None,
            array_buffer: None,
            bound_vertex_array: None,
            active_unit: 0,
            texture_units: BTreeMap::new(),
            depth_test: false,
            clear_color: [0.0, 0.0, 0.0, 0.0],
            viewport: (0, 0, 0, 0),
            presented: 0,
            calls: Vec::new(),
            draws: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Make the next creation of `kind` fail with [`DeviceError::CreationFailed`].
    pub fn fail_next_create(&mut self, kind: ResourceKind) {
        self.fail_next = Some(kind);
    }

    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    /// Forget recorded calls and draws, keeping object state.
    pub fn clear_log(&mut self) {
        self.calls.clear();
        self.draws.clear();
    }

    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.draws
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Value last uploaded to `name` on `program`, if any.
    pub fn uniform_value(&self, program: NativeId, name: &str) -> Option<&UniformValue> {
        let object = self.programs.get(&program)?;
        let index = object
            .interface()?
            .uniforms
            .iter()
            .position(|(n, _)| n == name)?;
        object.values.get(&UniformLocation(index as u32))
    }

    pub fn vertex_array(&self, id: NativeId) -> Option<&VertexArrayObject> {
        self.vertex_arrays.get(&id)
    }

    pub fn buffer_len(&self, id: NativeId) -> Option<usize> {
        self.buffers.get(&id).map(Vec::len)
    }

    pub fn texture(&self, id: NativeId) -> Option<&TextureObject> {
        self.textures.get(&id)
    }

    pub fn bound_texture(&self, unit: u32) -> Option<NativeId> {
        self.texture_units.get(&unit).copied()
    }

    pub fn is_depth_test_enabled(&self) -> bool {
        self.depth_test
    }

    pub fn clear_color_value(&self) -> [f32; 4] {
        self.clear_color
    }

    pub fn viewport_rect(&self) -> (i32, i32, u32, u32) {
        self.viewport
    }

    pub fn frames_presented(&self) -> u64 {
        self.presented
    }

    /// Native objects of every kind that have not been deleted.
    pub fn live_objects(&self) -> usize {
        self.shaders.len()
            + self.programs.len()
            + self.buffers.len()
            + self.vertex_arrays.len()
            + self.textures.len()
    }

    fn allocate(&mut self, kind: ResourceKind) -> Result<NativeId, DeviceError> {
        if self.fail_next == Some(kind) {
            self.fail_next = None;
            return Err(DeviceError::CreationFailed { kind });
        }
        let id = NativeId(self.next_id);
        self.next_id += 1;
        self.calls.push(DeviceCall::Create { kind, id });
        Ok(id)
    }

    fn record_delete(&mut self, kind: ResourceKind, id: NativeId, existed: bool) {
        if existed {
            self.calls.push(DeviceCall::Delete { kind, id });
        } else {
            self.errors.push(format!("delete of unknown {kind} {id}"));
        }
    }

    fn store_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let Some(program) = self.current_program else {
            self.errors
                .push(format!("uniform upload to {location} with no program bound"));
            return;
        };
        let Some(object) = self.programs.get_mut(&program) else {
            return;
        };
        let known = object
            .interface()
            .is_some_and(|i| (location.0 as usize) < i.uniforms.len());
        if !known {
            self.errors
                .push(format!("uniform {location} is not active in program {program}"));
            return;
        }
        object.values.insert(location, value);
        self.calls.push(DeviceCall::SetUniform { program, location });
    }

    fn bound_texture_mut(&mut self) -> Option<&mut TextureObject> {
        let id = self.texture_units.get(&self.active_unit).copied();
        match id.and_then(|id| self.textures.get_mut(&id)) {
            Some(texture) => Some(texture),
            None => {
                self.errors
                    .push(format!("no texture bound on unit {}", self.active_unit));
                None
            }
        }
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn info(&self) -> DeviceInfo {
        DeviceInfo {
            renderer: "meshrig headless".into(),
            version: "3.3 (software)".into(),
        }
    }

    fn create_shader(&mut self, stage: ShaderStage) -> Result<NativeId, DeviceError> {
        let id = self.allocate(ResourceKind::Shader(stage))?;
        self.shaders.insert(
            id,
            ShaderObject {
                stage,
                source: String::new(),
                compiled: None,
            },
        );
        Ok(id)
    }

    fn shader_source(&mut self, shader: NativeId, source: &str) {
        match self.shaders.get_mut(&shader) {
            Some(object) => object.source = source.to_string(),
            None => self.errors.push(format!("source for unknown shader {shader}")),
        }
    }

    fn compile_shader(&mut self, shader: NativeId) {
        self.calls.push(DeviceCall::CompileShader(shader));
        match self.shaders.get_mut(&shader) {
            Some(object) => object.compiled = Some(glsl::compile(object.stage, &object.source)),
            None => self.errors.push(format!("compile of unknown shader {shader}")),
        }
    }

    fn shader_compile_status(&self, shader: NativeId) -> bool {
        self.shaders
            .get(&shader)
            .is_some_and(|s| matches!(s.compiled, Some(Ok(_))))
    }

    fn shader_info_log(&self, shader: NativeId) -> String {
        match self.shaders.get(&shader).and_then(|s| s.compiled.as_ref()) {
            Some(Err(log)) => log.clone(),
            _ => String::new(),
        }
    }

    fn delete_shader(&mut self, shader: NativeId) {
        let existed = self.shaders.remove(&shader);
        let kind = ResourceKind::Shader(
            existed
                .as_ref()
                .map(|s| s.stage)
                .unwrap_or(ShaderStage::Vertex),
        );
        self.record_delete(kind, shader, existed.is_some());
    }

    fn create_program(&mut self) -> Result<NativeId, DeviceError> {
        let id = self.allocate(ResourceKind::Program)?;
        self.programs.insert(id, ProgramObject::default());
        Ok(id)
    }

    fn attach_shader(&mut self, program: NativeId, shader: NativeId) {
        match self.programs.get_mut(&program) {
            Some(object) if self.shaders.contains_key(&shader) => object.attached.push(shader),
            _ => self
                .errors
                .push(format!("attach of {shader} to {program} with unknown object")),
        }
    }

    fn detach_shader(&mut self, program: NativeId, shader: NativeId) {
        if let Some(object) = self.programs.get_mut(&program) {
            object.attached.retain(|s| *s != shader);
        }
    }

    fn link_program(&mut self, program: NativeId) {
        self.calls.push(DeviceCall::LinkProgram(program));
        let Some(object) = self.programs.get(&program) else {
            self.errors.push(format!("link of unknown program {program}"));
            return;
        };

        let stage_interface = |stage: ShaderStage| {
            object
                .attached
                .iter()
                .filter_map(|id| self.shaders.get(id))
                .find(|s| s.stage == stage)
                .and_then(|s| s.compiled.as_ref())
        };
        let result = match (
            stage_interface(ShaderStage::Vertex),
            stage_interface(ShaderStage::Fragment),
        ) {
            (Some(Ok(vertex)), Some(Ok(fragment))) => glsl::link(vertex, fragment),
            (None, _) | (_, None) => {
                Err("error: program needs a vertex and a fragment shader attached".into())
            }
            _ => Err("error: attached shader did not compile successfully".into()),
        };

        if let Some(object) = self.programs.get_mut(&program) {
            object.values.clear();
            object.linked = Some(result);
        }
    }

    fn program_link_status(&self, program: NativeId) -> bool {
        self.programs
            .get(&program)
            .is_some_and(|p| p.interface().is_some())
    }

    fn program_info_log(&self, program: NativeId) -> String {
        match self.programs.get(&program).and_then(|p| p.linked.as_ref()) {
            Some(Err(log)) => log.clone(),
            _ => String::new(),
        }
    }

    fn active_uniforms(&self, program: NativeId) -> Vec<ActiveUniform> {
        self.programs
            .get(&program)
            .and_then(ProgramObject::interface)
            .map(|i| {
                i.uniforms
                    .iter()
                    .enumerate()
                    .map(|(index, (name, ty))| ActiveUniform {
                        name: name.clone(),
                        ty: ty.clone(),
                        location: UniformLocation(index as u32),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn attribute_location(&self, program: NativeId, name: &str) -> Option<u32> {
        self.programs
            .get(&program)
            .and_then(ProgramObject::interface)
            .and_then(|i| i.attributes.get(name).copied())
    }

    fn use_program(&mut self, program: Option<NativeId>) {
        if let Some(id) = program {
            if !self.program_link_status(id) {
                self.errors.push(format!("use of unlinked program {id}"));
                return;
            }
        }
        self.current_program = program;
        self.calls.push(DeviceCall::UseProgram(program));
    }

    fn current_program(&self) -> Option<NativeId> {
        self.current_program
    }

    fn delete_program(&mut self, program: NativeId) {
        let existed = self.programs.remove(&program).is_some();
        if self.current_program == Some(program) {
            self.current_program = None;
        }
        self.record_delete(ResourceKind::Program, program, existed);
    }

    fn uniform_1i(&mut self, location: UniformLocation, value: i32) {
        self.store_uniform(location, UniformValue::Int(value));
    }

    fn uniform_1f(&mut self, location: UniformLocation, value: f32) {
        self.store_uniform(location, UniformValue::Float(value));
    }

    fn uniform_3f(&mut self, location: UniformLocation, value: [f32; 3]) {
        self.store_uniform(location, UniformValue::Vec3(value));
    }

    fn uniform_matrix4(&mut self, location: UniformLocation, transpose: bool, value: &[f32; 16]) {
        self.store_uniform(
            location,
            UniformValue::Mat4 {
                data: *value,
                transpose,
            },
        );
    }

    fn create_buffer(&mut self) -> Result<NativeId, DeviceError> {
        let id = self.allocate(ResourceKind::Buffer)?;
        self.buffers.insert(id, Vec::new());
        Ok(id)
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<NativeId>) {
        if let Some(id) = buffer {
            if !self.buffers.contains_key(&id) {
                self.errors.push(format!("bind of unknown buffer {id}"));
                return;
            }
        }
        match target {
            BufferTarget::Array => self.array_buffer = buffer,
            BufferTarget::ElementArray => {
                let vao = self
                    .bound_vertex_array
                    .and_then(|id| self.vertex_arrays.get_mut(&id));
                match vao {
                    Some(vao) => vao.element_buffer = buffer,
                    None => {
                        self.errors
                            .push("element buffer bound with no vertex array".into());
                        return;
                    }
                }
            }
        }
        self.calls.push(DeviceCall::BindBuffer { target, buffer });
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]) {
        let bound = match target {
            BufferTarget::Array => self.array_buffer,
            BufferTarget::ElementArray => self
                .bound_vertex_array
                .and_then(|id| self.vertex_arrays.get(&id))
                .and_then(|vao| vao.element_buffer),
        };
        match bound.and_then(|id| self.buffers.get_mut(&id)) {
            Some(storage) => {
                *storage = data.to_vec();
                self.calls.push(DeviceCall::BufferData {
                    target,
                    len: data.len(),
                });
            }
            None => self.errors.push(format!("buffer data with no {target:?} buffer bound")),
        }
    }

    fn delete_buffer(&mut self, buffer: NativeId) {
        let existed = self.buffers.remove(&buffer).is_some();
        if self.array_buffer == Some(buffer) {
            self.array_buffer = None;
        }
        self.record_delete(ResourceKind::Buffer, buffer, existed);
    }

    fn create_vertex_array(&mut self) -> Result<NativeId, DeviceError> {
        let id = self.allocate(ResourceKind::VertexArray)?;
        self.vertex_arrays.insert(id, VertexArrayObject::default());
        Ok(id)
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<NativeId>) {
        if let Some(id) = vertex_array {
            if !self.vertex_arrays.contains_key(&id) {
                self.errors.push(format!("bind of unknown vertex array {id}"));
                return;
            }
        }
        self.bound_vertex_array = vertex_array;
        self.calls.push(DeviceCall::BindVertexArray(vertex_array));
    }

    fn vertex_attrib_pointer(&mut self, location: u32, components: u32, stride: u32, offset: u32) {
        let Some(buffer) = self.array_buffer else {
            self.errors
                .push(format!("attribute {location} set with no array buffer bound"));
            return;
        };
        let Some(vao) = self
            .bound_vertex_array
            .and_then(|id| self.vertex_arrays.get_mut(&id))
        else {
            self.errors
                .push(format!("attribute {location} set with no vertex array bound"));
            return;
        };
        let enabled = vao.attribs.get(&location).is_some_and(|a| a.enabled);
        vao.attribs.insert(
            location,
            AttribPointer {
                buffer,
                components,
                stride,
                offset,
                enabled,
            },
        );
        self.calls.push(DeviceCall::AttribPointer {
            location,
            components,
            stride,
            offset,
        });
    }

    fn enable_vertex_attrib_array(&mut self, location: u32) {
        let attrib = self
            .bound_vertex_array
            .and_then(|id| self.vertex_arrays.get_mut(&id))
            .and_then(|vao| vao.attribs.get_mut(&location));
        match attrib {
            Some(attrib) => {
                attrib.enabled = true;
                self.calls.push(DeviceCall::EnableAttrib(location));
            }
            None => self
                .errors
                .push(format!("enable of unconfigured attribute {location}")),
        }
    }

    fn delete_vertex_array(&mut self, vertex_array: NativeId) {
        let existed = self.vertex_arrays.remove(&vertex_array).is_some();
        if self.bound_vertex_array == Some(vertex_array) {
            self.bound_vertex_array = None;
        }
        self.record_delete(ResourceKind::VertexArray, vertex_array, existed);
    }

    fn create_texture(&mut self) -> Result<NativeId, DeviceError> {
        let id = self.allocate(ResourceKind::Texture)?;
        self.textures.insert(id, TextureObject::default());
        Ok(id)
    }

    fn active_texture(&mut self, unit: u32) {
        self.active_unit = unit;
        self.calls.push(DeviceCall::ActiveTexture(unit));
    }

    fn bind_texture(&mut self, texture: Option<NativeId>) {
        match texture {
            Some(id) if !self.textures.contains_key(&id) => {
                self.errors.push(format!("bind of unknown texture {id}"));
                return;
            }
            Some(id) => {
                self.texture_units.insert(self.active_unit, id);
            }
            None => {
                self.texture_units.remove(&self.active_unit);
            }
        }
        self.calls.push(DeviceCall::BindTexture {
            unit: self.active_unit,
            texture,
        });
    }

    fn tex_image_2d_rgba8(&mut self, width: u32, height: u32, pixels: &[u8]) {
        if let Some(texture) = self.bound_texture_mut() {
            texture.width = width;
            texture.height = height;
            texture.byte_len = pixels.len();
            texture.mip_levels = 1;
            self.calls.push(DeviceCall::TexImage { width, height });
        }
    }

    fn tex_parameter(&mut self, param: TextureParam) {
        if let Some(texture) = self.bound_texture_mut() {
            texture.params.retain(|p| std::mem::discriminant(p) != std::mem::discriminant(&param));
            texture.params.push(param);
            self.calls.push(DeviceCall::TexParameter(param));
        }
    }

    fn generate_mipmap(&mut self) {
        if let Some(texture) = self.bound_texture_mut() {
            let largest = texture.width.max(texture.height).max(1);
            texture.mip_levels = 32 - largest.leading_zeros();
            self.calls.push(DeviceCall::GenerateMipmap);
        }
    }

    fn delete_texture(&mut self, texture: NativeId) {
        let existed = self.textures.remove(&texture).is_some();
        self.texture_units.retain(|_, id| *id != texture);
        self.record_delete(ResourceKind::Texture, texture, existed);
    }

    fn enable_depth_test(&mut self) {
        self.depth_test = true;
        self.calls.push(DeviceCall::EnableDepthTest);
    }

    fn clear_color(&mut self, rgba: [f32; 4]) {
        self.clear_color = rgba;
        self.calls.push(DeviceCall::ClearColor(rgba));
    }

    fn clear(&mut self, mask: ClearMask) {
        self.calls.push(DeviceCall::Clear(mask));
    }

    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.viewport = (x, y, width, height);
        self.calls.push(DeviceCall::Viewport {
            x,
            y,
            width,
            height,
        });
    }

    fn draw_elements(&mut self, mode: PrimitiveMode, count: u32) {
        let Some(program) = self.current_program else {
            self.errors.push("draw with no program bound".into());
            return;
        };
        let Some(vertex_array) = self.bound_vertex_array else {
            self.errors.push("draw with no vertex array bound".into());
            return;
        };
        let has_elements = self
            .vertex_arrays
            .get(&vertex_array)
            .is_some_and(|vao| vao.element_buffer.is_some());
        if !has_elements {
            self.errors
                .push(format!("indexed draw from {vertex_array} without element buffer"));
            return;
        }
        self.draws.push(DrawCall {
            program,
            vertex_array,
            mode,
            count,
            textures: self.texture_units.clone(),
        });
        self.calls.push(DeviceCall::DrawElements { mode, count });
    }

    fn present(&mut self) {
        self.presented += 1;
        self.calls.push(DeviceCall::Present);
    }
}
