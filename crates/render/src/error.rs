use meshrig_common::{NativeId, ShaderStage};
use meshrig_device::DeviceError;

/// Errors from creating or using render resources.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Creation(#[from] DeviceError),
    #[error("{stage} shader failed to compile: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("shader program failed to link: {log}")]
    Link { log: String },
    #[error("uniform `{name}` is not active in program {program}")]
    UnknownUniform { name: String, program: NativeId },
    #[error("vertex attribute `{name}` is not an input of program {program}")]
    UnknownAttribute { name: String, program: NativeId },
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: u32 },
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),
    #[error("mesh buffers are not initialized")]
    NotInitialized,
    #[error("mesh buffers are already initialized")]
    AlreadyInitialized,
    #[error("image {width}x{height} has {len} bytes, expected {expected}")]
    InvalidImage {
        width: u32,
        height: u32,
        len: usize,
        expected: usize,
    },
    #[error("image decode failed: {0}")]
    Decode(#[source] Box<dyn std::error::Error + Send + Sync>),
}
