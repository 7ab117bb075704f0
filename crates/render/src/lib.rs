//! Render resources: the GPU-side objects a frame draws with.
//!
//! # Invariants
//! - Every resource owns its native objects through `ResourceHandle`s and is
//!   torn down by an explicit `dispose`.
//! - A program's uniform table is built once at link time; setting a name
//!   outside it is an error, never a silent no-op.
//! - Meshes never reference an index at or past their vertex count.

mod error;
mod mesh;
mod shader;
pub mod shaders;
mod texture;

pub use error::RenderError;
pub use mesh::Mesh;
pub use shader::ShaderProgram;
pub use texture::{ImageDecoder, Texture2D};

pub fn crate_info() -> &'static str {
    "meshrig-render v0.1.0"
}
