use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a native object owned by the graphics device.
///
/// Zero is never handed out by a device; it plays the role of "no object".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NativeId(pub u32);

impl fmt::Display for NativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Programmable pipeline stage a shader object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// The kind of native object behind a handle. Decides which device call
/// creates and deletes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Shader(ShaderStage),
    Program,
    Buffer,
    VertexArray,
    Texture,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Shader(stage) => write!(f, "{stage} shader"),
            ResourceKind::Program => f.write_str("program"),
            ResourceKind::Buffer => f.write_str("buffer"),
            ResourceKind::VertexArray => f.write_str("vertex array"),
            ResourceKind::Texture => f.write_str("texture"),
        }
    }
}

/// One float attribute of an interleaved vertex, matched to a shader input by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexAttribute {
    pub name: String,
    pub components: u32,
}

impl VertexAttribute {
    pub fn new(name: impl Into<String>, components: u32) -> Self {
        Self {
            name: name.into(),
            components,
        }
    }
}

/// Interleaved `f32` vertex layout. Attributes are packed in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexLayout {
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    pub fn new(attributes: Vec<VertexAttribute>) -> Self {
        Self { attributes }
    }

    /// `aPosition` (3 floats).
    pub fn position_only() -> Self {
        Self::new(vec![VertexAttribute::new("aPosition", 3)])
    }

    /// `aPosition` (3 floats) followed by `aTexCoord` (2 floats).
    pub fn position_tex() -> Self {
        Self::new(vec![
            VertexAttribute::new("aPosition", 3),
            VertexAttribute::new("aTexCoord", 2),
        ])
    }

    /// Number of floats making up one vertex.
    pub fn floats_per_vertex(&self) -> u32 {
        self.attributes.iter().map(|a| a.components).sum()
    }

    /// Distance in bytes between consecutive vertices.
    pub fn stride_bytes(&self) -> u32 {
        self.floats_per_vertex() * std::mem::size_of::<f32>() as u32
    }

    /// Each attribute paired with its byte offset inside a vertex.
    pub fn offsets(&self) -> impl Iterator<Item = (&VertexAttribute, u32)> {
        let mut offset = 0;
        self.attributes.iter().map(move |attr| {
            let at = offset;
            offset += attr.components * std::mem::size_of::<f32>() as u32;
            (attr, at)
        })
    }
}

/// RGBA8 pixels produced by an image decoder, row 0 at the bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Byte length a well-formed RGBA8 buffer of this size must have.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    /// Two-color checkerboard, handy when no image file is supplied.
    pub fn checkerboard(size: u32, cell: u32, a: [u8; 4], b: [u8; 4]) -> Self {
        let cell = cell.max(1);
        let mut pixels = Vec::with_capacity(size as usize * size as usize * 4);
        for y in 0..size {
            for x in 0..size {
                let color = if ((x / cell) + (y / cell)) % 2 == 0 { a } else { b };
                pixels.extend_from_slice(&color);
            }
        }
        Self::new(size, size, pixels)
    }
}

/// How keyboard movement speed relates to time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementPolicy {
    /// Fixed distance per update tick; speed depends on framerate.
    #[default]
    PerTick,
    /// Distance per second, scaled by the frame's elapsed time.
    PerSecond,
}
