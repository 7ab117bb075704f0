use crate::error::RenderError;
use crate::shader::ShaderProgram;
use meshrig_common::{ResourceKind, VertexLayout};
use meshrig_device::{BufferTarget, Gpu, GraphicsDevice, PrimitiveMode, ResourceHandle};

struct MeshBuffers {
    vertex_buffer: ResourceHandle,
    index_buffer: ResourceHandle,
    vertex_array: ResourceHandle,
}

/// Indexed triangle geometry with an interleaved `f32` vertex layout.
///
/// Construction only validates and stores the data; nothing reaches the
/// device until [`initialize_buffers`](Mesh::initialize_buffers).
pub struct Mesh {
    vertices: Vec<f32>,
    indices: Vec<u32>,
    layout: VertexLayout,
    buffers: Option<MeshBuffers>,
}

impl Mesh {
    pub fn new(
        vertices: Vec<f32>,
        indices: Vec<u32>,
        layout: VertexLayout,
    ) -> Result<Self, RenderError> {
        let per_vertex = layout.floats_per_vertex() as usize;
        if per_vertex == 0 {
            return Err(RenderError::InvalidMesh("layout has no components".into()));
        }
        if vertices.len() % per_vertex != 0 {
            return Err(RenderError::InvalidMesh(format!(
                "{} floats is not a whole number of {per_vertex}-float vertices",
                vertices.len()
            )));
        }
        let vertex_count = (vertices.len() / per_vertex) as u32;
        if let Some(&index) = indices.iter().find(|&&i| i >= vertex_count) {
            return Err(RenderError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }
        Ok(Self {
            vertices,
            indices,
            layout,
            buffers: None,
        })
    }

    /// Single triangle centered on the origin.
    pub fn triangle() -> Result<Self, RenderError> {
        #[rustfmt::skip]
        let vertices = vec![
            -0.5, -0.5, 0.0,
             0.5, -0.5, 0.0,
             0.0,  0.5, 0.0,
        ];
        Self::new(vertices, vec![0, 1, 2], VertexLayout::position_only())
    }

    /// Unit quad built from two triangles.
    pub fn quad() -> Result<Self, RenderError> {
        #[rustfmt::skip]
        let vertices = vec![
             0.5,  0.5, 0.0, // top right
             0.5, -0.5, 0.0, // bottom right
            -0.5, -0.5, 0.0, // bottom left
            -0.5,  0.5, 0.0, // top left
        ];
        Self::new(vertices, vec![0, 1, 3, 1, 2, 3], VertexLayout::position_only())
    }

    /// Unit quad with texture coordinates, origin at the bottom-left.
    pub fn textured_quad() -> Result<Self, RenderError> {
        #[rustfmt::skip]
        let vertices = vec![
             0.5,  0.5, 0.0, 1.0, 1.0,
             0.5, -0.5, 0.0, 1.0, 0.0,
            -0.5, -0.5, 0.0, 0.0, 0.0,
            -0.5,  0.5, 0.0, 0.0, 1.0,
        ];
        Self::new(vertices, vec![0, 1, 3, 1, 2, 3], VertexLayout::position_tex())
    }

    pub fn vertex_count(&self) -> u32 {
        (self.vertices.len() / self.layout.floats_per_vertex() as usize) as u32
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    pub fn is_initialized(&self) -> bool {
        self.buffers.is_some()
    }

    /// Upload vertex and index data and wire the layout to `shader`'s inputs.
    ///
    /// Attribute locations are looked up by name on `shader`, so this must be
    /// called with the program the mesh will be drawn with.
    pub fn initialize_buffers<D: GraphicsDevice>(
        &mut self,
        gpu: &mut Gpu<D>,
        shader: &ShaderProgram,
    ) -> Result<(), RenderError> {
        if self.buffers.is_some() {
            return Err(RenderError::AlreadyInitialized);
        }

        let mut locations = Vec::with_capacity(self.layout.attributes.len());
        for (attribute, offset) in self.layout.offsets() {
            let location = shader
                .attribute_location(gpu.device(), &attribute.name)
                .ok_or_else(|| RenderError::UnknownAttribute {
                    name: attribute.name.clone(),
                    program: shader.id(),
                })?;
            locations.push((location, attribute.components, offset));
        }

        let mut vertex_buffer = gpu.acquire(ResourceKind::Buffer)?;
        let mut vertex_array = match gpu.acquire(ResourceKind::VertexArray) {
            Ok(handle) => handle,
            Err(e) => {
                gpu.release(&mut vertex_buffer);
                return Err(e.into());
            }
        };
        let index_buffer = match gpu.acquire(ResourceKind::Buffer) {
            Ok(handle) => handle,
            Err(e) => {
                gpu.release(&mut vertex_buffer);
                gpu.release(&mut vertex_array);
                return Err(e.into());
            }
        };

        let stride = self.layout.stride_bytes();
        let device = gpu.device_mut();
        device.bind_buffer(BufferTarget::Array, Some(vertex_buffer.id()));
        device.buffer_data(BufferTarget::Array, bytemuck::cast_slice(&self.vertices));

        device.bind_vertex_array(Some(vertex_array.id()));
        for (location, components, offset) in locations {
            device.vertex_attrib_pointer(location, components, stride, offset);
            device.enable_vertex_attrib_array(location);
        }

        device.bind_buffer(BufferTarget::ElementArray, Some(index_buffer.id()));
        device.buffer_data(BufferTarget::ElementArray, bytemuck::cast_slice(&self.indices));
        device.bind_vertex_array(None);

        tracing::debug!(
            "uploaded mesh: {} vertices, {} indices, vertex array {}",
            self.vertex_count(),
            self.index_count(),
            vertex_array.id()
        );
        self.buffers = Some(MeshBuffers {
            vertex_buffer,
            index_buffer,
            vertex_array,
        });
        Ok(())
    }

    /// Draw every index as triangles. The caller binds program and textures.
    pub fn render<D: GraphicsDevice + ?Sized>(&self, device: &mut D) -> Result<(), RenderError> {
        if self.indices.is_empty() {
            return Ok(());
        }
        let buffers = self.buffers.as_ref().ok_or(RenderError::NotInitialized)?;
        device.bind_vertex_array(Some(buffers.vertex_array.id()));
        device.draw_elements(PrimitiveMode::Triangles, self.index_count());
        Ok(())
    }

    /// Delete the vertex array and both buffers.
    pub fn dispose<D: GraphicsDevice>(mut self, gpu: &mut Gpu<D>) {
        if let Some(mut buffers) = self.buffers.take() {
            gpu.release(&mut buffers.vertex_array);
            gpu.release(&mut buffers.vertex_buffer);
            gpu.release(&mut buffers.index_buffer);
        }
    }
}
