use crate::error::RenderError;
use glam::{Mat4, Vec3};
use meshrig_common::{NativeId, ResourceKind, ShaderStage};
use meshrig_device::{Gpu, GraphicsDevice, ResourceHandle, UniformLocation};
use std::collections::HashMap;

/// A linked vertex + fragment program with its uniform table.
///
/// The name -> location table is read from the driver once, right after a
/// successful link, so uniform uploads never query the driver by name.
pub struct ShaderProgram {
    handle: ResourceHandle,
    uniforms: HashMap<String, UniformLocation>,
}

impl ShaderProgram {
    /// Compile both stages and link them.
    ///
    /// A failing stage yields [`RenderError::Compile`] with that stage's log;
    /// a failing link yields [`RenderError::Link`] with the program log. Stage
    /// objects never outlive this call.
    pub fn compile_and_link<D: GraphicsDevice>(
        gpu: &mut Gpu<D>,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, RenderError> {
        let mut vertex = compile_stage(gpu, ShaderStage::Vertex, vertex_source)?;
        let mut fragment = match compile_stage(gpu, ShaderStage::Fragment, fragment_source) {
            Ok(fragment) => fragment,
            Err(e) => {
                gpu.release(&mut vertex);
                return Err(e);
            }
        };

        let linked = link_stages(gpu, &vertex, &fragment);
        gpu.release(&mut vertex);
        gpu.release(&mut fragment);
        let handle = linked?;

        let uniforms: HashMap<String, UniformLocation> = gpu
            .device()
            .active_uniforms(handle.id())
            .into_iter()
            .map(|u| (u.name, u.location))
            .collect();
        tracing::debug!(
            "linked program {} with {} active uniforms",
            handle.id(),
            uniforms.len()
        );

        Ok(Self { handle, uniforms })
    }

    pub fn id(&self) -> NativeId {
        self.handle.id()
    }

    /// Make this the current program.
    pub fn use_program<D: GraphicsDevice + ?Sized>(&self, device: &mut D) {
        device.use_program(Some(self.handle.id()));
    }

    /// Bind unless already current.
    fn bind<D: GraphicsDevice + ?Sized>(&self, device: &mut D) {
        if device.current_program() != Some(self.handle.id()) {
            self.use_program(device);
        }
    }

    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.uniforms.get(name).copied()
    }

    /// Active uniform names, sorted.
    pub fn uniform_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.uniforms.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Location the linker gave the vertex input `name`.
    pub fn attribute_location<D: GraphicsDevice + ?Sized>(
        &self,
        device: &D,
        name: &str,
    ) -> Option<u32> {
        device.attribute_location(self.handle.id(), name)
    }

    fn location(&self, name: &str) -> Result<UniformLocation, RenderError> {
        self.uniform_location(name)
            .ok_or_else(|| RenderError::UnknownUniform {
                name: name.to_string(),
                program: self.handle.id(),
            })
    }

    pub fn set_int<D: GraphicsDevice + ?Sized>(
        &self,
        device: &mut D,
        name: &str,
        value: i32,
    ) -> Result<(), RenderError> {
        let location = self.location(name)?;
        self.bind(device);
        device.uniform_1i(location, value);
        Ok(())
    }

    pub fn set_float<D: GraphicsDevice + ?Sized>(
        &self,
        device: &mut D,
        name: &str,
        value: f32,
    ) -> Result<(), RenderError> {
        let location = self.location(name)?;
        self.bind(device);
        device.uniform_1f(location, value);
        Ok(())
    }

    pub fn set_vec3<D: GraphicsDevice + ?Sized>(
        &self,
        device: &mut D,
        name: &str,
        value: Vec3,
    ) -> Result<(), RenderError> {
        let location = self.location(name)?;
        self.bind(device);
        device.uniform_3f(location, value.to_array());
        Ok(())
    }

    /// Upload a matrix. The data is sent row by row with the transpose flag
    /// set, whatever the in-memory layout of `Mat4`.
    pub fn set_matrix4<D: GraphicsDevice + ?Sized>(
        &self,
        device: &mut D,
        name: &str,
        value: &Mat4,
    ) -> Result<(), RenderError> {
        let location = self.location(name)?;
        self.bind(device);
        let rows = value.transpose().to_cols_array();
        device.uniform_matrix4(location, true, &rows);
        Ok(())
    }

    /// Delete the native program.
    pub fn dispose<D: GraphicsDevice>(mut self, gpu: &mut Gpu<D>) {
        gpu.release(&mut self.handle);
    }
}

fn compile_stage<D: GraphicsDevice>(
    gpu: &mut Gpu<D>,
    stage: ShaderStage,
    source: &str,
) -> Result<ResourceHandle, RenderError> {
    let mut shader = gpu.acquire(ResourceKind::Shader(stage))?;
    let device = gpu.device_mut();
    device.shader_source(shader.id(), source);
    device.compile_shader(shader.id());
    if device.shader_compile_status(shader.id()) {
        return Ok(shader);
    }

    let log = device.shader_info_log(shader.id());
    tracing::error!("{stage} shader failed to compile: {log}");
    gpu.release(&mut shader);
    Err(RenderError::Compile { stage, log })
}

fn link_stages<D: GraphicsDevice>(
    gpu: &mut Gpu<D>,
    vertex: &ResourceHandle,
    fragment: &ResourceHandle,
) -> Result<ResourceHandle, RenderError> {
    let mut program = gpu.acquire(ResourceKind::Program)?;
    let id = program.id();
    let device = gpu.device_mut();
    device.attach_shader(id, vertex.id());
    device.attach_shader(id, fragment.id());
    device.link_program(id);
    let linked = device.program_link_status(id);
    let log = device.program_info_log(id);
    device.detach_shader(id, vertex.id());
    device.detach_shader(id, fragment.id());

    if linked {
        return Ok(program);
    }
    tracing::error!("program {id} failed to link: {log}");
    gpu.release(&mut program);
    Err(RenderError::Link { log })
}
