use meshrig_common::{NativeId, ResourceKind, ShaderStage};
use std::fmt;

/// Errors raised by the device itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("device refused to create {kind}")]
    CreationFailed { kind: ResourceKind },
}

/// Renderer and version strings reported by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub renderer: String,
    pub version: String,
}

/// Location of an active uniform inside a linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniformLocation(pub u32);

impl fmt::Display for UniformLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "location {}", self.0)
    }
}

/// One entry of a program's active uniform table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveUniform {
    pub name: String,
    pub ty: String,
    pub location: UniformLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Array,
    ElementArray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapMode {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    Nearest,
    Linear,
}

/// Sampling state applied to the texture bound on the active unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureParam {
    WrapS(WrapMode),
    WrapT(WrapMode),
    MinFilter(Filter),
    MagFilter(Filter),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveMode {
    Triangles,
    Lines,
}

/// Which framebuffer planes a clear touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClearMask {
    pub color: bool,
    pub depth: bool,
}

impl ClearMask {
    pub const COLOR: Self = Self {
        color: true,
        depth: false,
    };
    pub const COLOR_DEPTH: Self = Self {
        color: true,
        depth: true,
    };
}

/// The slice of a GL-style graphics API the renderer depends on.
///
/// Implementations own the native context. All calls happen on the thread
/// that owns the frame loop; nothing here blocks.
///
/// State-setting calls (`tex_parameter`, `buffer_data`, ...) act on whatever
/// is currently bound, mirroring the underlying API.
pub trait GraphicsDevice {
    fn info(&self) -> DeviceInfo;

    fn create_shader(&mut self, stage: ShaderStage) -> Result<NativeId, DeviceError>;
    fn shader_source(&mut self, shader: NativeId, source: &str);
    fn compile_shader(&mut self, shader: NativeId);
    fn shader_compile_status(&self, shader: NativeId) -> bool;
    fn shader_info_log(&self, shader: NativeId) -> String;
    fn delete_shader(&mut self, shader: NativeId);

    fn create_program(&mut self) -> Result<NativeId, DeviceError>;
    fn attach_shader(&mut self, program: NativeId, shader: NativeId);
    fn detach_shader(&mut self, program: NativeId, shader: NativeId);
    fn link_program(&mut self, program: NativeId);
    fn program_link_status(&self, program: NativeId) -> bool;
    fn program_info_log(&self, program: NativeId) -> String;
    fn active_uniforms(&self, program: NativeId) -> Vec<ActiveUniform>;
    fn attribute_location(&self, program: NativeId, name: &str) -> Option<u32>;
    fn use_program(&mut self, program: Option<NativeId>);
    fn current_program(&self) -> Option<NativeId>;
    fn delete_program(&mut self, program: NativeId);

    fn uniform_1i(&mut self, location: UniformLocation, value: i32);
    fn uniform_1f(&mut self, location: UniformLocation, value: f32);
    fn uniform_3f(&mut self, location: UniformLocation, value: [f32; 3]);
    /// `transpose` is true when `value` is laid out row by row.
    fn uniform_matrix4(&mut self, location: UniformLocation, transpose: bool, value: &[f32; 16]);

    fn create_buffer(&mut self) -> Result<NativeId, DeviceError>;
    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<NativeId>);
    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]);
    fn delete_buffer(&mut self, buffer: NativeId);

    fn create_vertex_array(&mut self) -> Result<NativeId, DeviceError>;
    fn bind_vertex_array(&mut self, vertex_array: Option<NativeId>);
    /// Float attribute sourced from the bound array buffer. Stride and offset are in bytes.
    fn vertex_attrib_pointer(&mut self, location: u32, components: u32, stride: u32, offset: u32);
    fn enable_vertex_attrib_array(&mut self, location: u32);
    fn delete_vertex_array(&mut self, vertex_array: NativeId);

    fn create_texture(&mut self) -> Result<NativeId, DeviceError>;
    fn active_texture(&mut self, unit: u32);
    fn bind_texture(&mut self, texture: Option<NativeId>);
    fn tex_image_2d_rgba8(&mut self, width: u32, height: u32, pixels: &[u8]);
    fn tex_parameter(&mut self, param: TextureParam);
    fn generate_mipmap(&mut self);
    fn delete_texture(&mut self, texture: NativeId);

    fn enable_depth_test(&mut self);
    fn clear_color(&mut self, rgba: [f32; 4]);
    fn clear(&mut self, mask: ClearMask);
    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32);
    /// Indexed draw of `count` `u32` indices from the bound vertex array.
    fn draw_elements(&mut self, mode: PrimitiveMode, count: u32);
    fn present(&mut self);
}

/// Create the native object backing `kind`.
pub(crate) fn create_native<D: GraphicsDevice + ?Sized>(
    device: &mut D,
    kind: ResourceKind,
) -> Result<NativeId, DeviceError> {
    match kind {
        ResourceKind::Shader(stage) => device.create_shader(stage),
        ResourceKind::Program => device.create_program(),
        ResourceKind::Buffer => device.create_buffer(),
        ResourceKind::VertexArray => device.create_vertex_array(),
        ResourceKind::Texture => device.create_texture(),
    }
}

/// Delete the native object backing `kind`.
pub(crate) fn delete_native<D: GraphicsDevice + ?Sized>(
    device: &mut D,
    kind: ResourceKind,
    id: NativeId,
) {
    match kind {
        ResourceKind::Shader(_) => device.delete_shader(id),
        ResourceKind::Program => device.delete_program(id),
        ResourceKind::Buffer => device.delete_buffer(id),
        ResourceKind::VertexArray => device.delete_vertex_array(id),
        ResourceKind::Texture => device.delete_texture(id),
    }
}
