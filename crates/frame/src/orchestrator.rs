use crate::error::FrameError;
use crate::spin::Spin;
use crate::state::FrameState;
use glam::{Mat4, Vec3};
use meshrig_camera::Camera;
use meshrig_common::RigConfig;
use meshrig_device::{ClearMask, Gpu, GraphicsDevice, LeakReport};
use meshrig_input::{FrameInput, InputMapper};
use meshrig_render::{Mesh, ShaderProgram, Texture2D};
use std::collections::BTreeSet;

/// A texture and the sampler uniform that reads it.
pub struct TextureBinding {
    pub unit: u32,
    pub sampler: String,
    pub texture: Texture2D,
}

impl TextureBinding {
    pub fn new(unit: u32, sampler: impl Into<String>, texture: Texture2D) -> Self {
        Self {
            unit,
            sampler: sampler.into(),
            texture,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    Exit,
}

/// Owns the scene (one program, its meshes and textures) plus the camera,
/// and drives them through one frame at a time.
pub struct FrameOrchestrator {
    camera: Camera,
    mapper: InputMapper,
    spin: Spin,
    program: ShaderProgram,
    meshes: Vec<Mesh>,
    textures: Vec<TextureBinding>,
    model: Mat4,
}

impl FrameOrchestrator {
    pub const MODEL: &'static str = "model";
    pub const VIEW: &'static str = "view";
    pub const PROJECTION: &'static str = "projection";
    pub const COLOR: &'static str = "color";

    /// Configure the device and upload every mesh against `program`.
    ///
    /// On failure everything passed in has already been released.
    pub fn new<D: GraphicsDevice>(
        gpu: &mut Gpu<D>,
        config: &RigConfig,
        program: ShaderProgram,
        meshes: Vec<Mesh>,
        textures: Vec<TextureBinding>,
    ) -> Result<Self, FrameError> {
        let mut orchestrator = Self {
            camera: Camera::from_config(&config.camera, config.window.width, config.window.height),
            mapper: InputMapper::new(&config.input),
            spin: Spin::from_config(&config.scene),
            program,
            meshes,
            textures,
            model: Mat4::IDENTITY,
        };
        if let Err(e) = orchestrator.start(gpu, config) {
            tracing::error!("scene setup failed: {e}");
            orchestrator.shutdown(gpu);
            return Err(e);
        }
        Ok(orchestrator)
    }

    fn start<D: GraphicsDevice>(
        &mut self,
        gpu: &mut Gpu<D>,
        config: &RigConfig,
    ) -> Result<(), FrameError> {
        let mut units = BTreeSet::new();
        for binding in &self.textures {
            if !units.insert(binding.unit) {
                return Err(FrameError::DuplicateUnit { unit: binding.unit });
            }
        }

        let info = gpu.device().info();
        tracing::info!("renderer: {}", info.renderer);
        tracing::info!("version: {}", info.version);

        let device = gpu.device_mut();
        device.clear_color(config.scene.clear_color);
        if config.scene.depth_test {
            device.enable_depth_test();
        }
        device.viewport(0, 0, config.window.width, config.window.height);
        for binding in &self.textures {
            self.program
                .set_int(device, &binding.sampler, binding.unit as i32)?;
        }
        if self.program.uniform_location(Self::COLOR).is_some() {
            let color = Vec3::from_array(config.scene.flat_color);
            self.program.set_vec3(device, Self::COLOR, color)?;
        }

        for mesh in &mut self.meshes {
            if !mesh.is_initialized() {
                mesh.initialize_buffers(gpu, &self.program)?;
            }
        }
        tracing::info!(
            "scene ready: {} meshes, {} textures",
            self.meshes.len(),
            self.textures.len()
        );
        Ok(())
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Call when the window recaptures the cursor.
    pub fn reacquire_cursor(&mut self) {
        self.mapper.reacquire();
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Model matrix uploaded by the last frame.
    pub fn model_matrix(&self) -> Mat4 {
        self.model
    }

    pub fn set_spin(&mut self, spin: Spin) {
        self.spin = spin;
    }

    /// Run one frame, or report that the loop should stop.
    pub fn frame<D: GraphicsDevice>(
        &mut self,
        gpu: &mut Gpu<D>,
        state: &mut FrameState,
        input: &FrameInput,
    ) -> Result<FrameControl, FrameError> {
        if input.wants_exit() {
            tracing::info!("close requested after {} frames", state.index());
            return Ok(FrameControl::Exit);
        }
        if let Some((width, height)) = input.resized {
            self.resize(gpu.device_mut(), width, height);
        }

        let delta = self.mapper.update(input);
        self.camera.apply(&delta);

        state.advance(input.dt);
        self.model = self.spin.model(state.elapsed());

        let device = gpu.device_mut();
        device.clear(ClearMask::COLOR_DEPTH);
        for binding in &self.textures {
            binding.texture.bind(device, binding.unit);
        }
        self.program.set_matrix4(device, Self::MODEL, &self.model)?;
        self.program
            .set_matrix4(device, Self::VIEW, &self.camera.view_matrix())?;
        self.program
            .set_matrix4(device, Self::PROJECTION, &self.camera.projection_matrix())?;
        self.program.use_program(device);
        for mesh in &self.meshes {
            mesh.render(device)?;
        }
        device.present();

        gpu.reclaim();
        Ok(FrameControl::Continue)
    }

    /// Track a framebuffer resize.
    pub fn resize<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D, width: u32, height: u32) {
        tracing::debug!("viewport resized to {width}x{height}");
        device.viewport(0, 0, width, height);
        self.camera.set_aspect_ratio(width, height);
    }

    /// Swap the mesh at `index`. The new mesh is uploaded before the old one
    /// is released, so a failed upload leaves the scene unchanged.
    pub fn replace_mesh<D: GraphicsDevice>(
        &mut self,
        gpu: &mut Gpu<D>,
        index: usize,
        mut mesh: Mesh,
    ) -> Result<(), FrameError> {
        let len = self.meshes.len();
        let slot = self
            .meshes
            .get_mut(index)
            .ok_or(FrameError::MeshIndex { index, len })?;
        if !mesh.is_initialized() {
            mesh.initialize_buffers(gpu, &self.program)?;
        }
        let old = std::mem::replace(slot, mesh);
        old.dispose(gpu);
        tracing::debug!("replaced mesh {index}");
        Ok(())
    }

    /// Release every resource and audit the device.
    pub fn shutdown<D: GraphicsDevice>(self, gpu: &mut Gpu<D>) -> LeakReport {
        for mesh in self.meshes {
            mesh.dispose(gpu);
        }
        for binding in self.textures {
            binding.texture.dispose(gpu);
        }
        self.program.dispose(gpu);
        gpu.shutdown()
    }
}
