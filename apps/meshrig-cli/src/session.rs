//! Scripted headless session: a full frame loop against [`HeadlessDevice`]
//! with synthetic input standing in for a window.

use crate::decode::FileDecoder;
use anyhow::{Context, bail};
use glam::Vec2;
use meshrig_common::{DecodedImage, RigConfig};
use meshrig_device::{GraphicsDevice, Gpu, HeadlessDevice};
use meshrig_frame::{FrameControl, FrameOrchestrator, FrameState, TextureBinding};
use meshrig_input::{FrameInput, Key, KeyboardState};
use meshrig_render::{Mesh, ShaderProgram, Texture2D, shaders};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct SessionOptions {
    pub frames: u64,
    pub dt: f32,
    pub vertex: Option<PathBuf>,
    pub fragment: Option<PathBuf>,
    pub textures: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct CameraReport {
    pub position: [f32; 3],
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub aspect: f32,
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub renderer: String,
    pub frames_presented: u64,
    pub draw_calls: usize,
    pub exited: bool,
    pub title: Option<String>,
    pub camera: CameraReport,
    pub leaked: usize,
    pub outstanding: usize,
    pub device_errors: Vec<String>,
}

/// Input for frame `index` of `total`: hold a different movement key each
/// quarter, circle the cursor, scroll and resize once, drop focus briefly,
/// and press Escape on the last frame.
pub fn scripted_input(index: u64, total: u64, dt: f32) -> FrameInput {
    let quarter = (total / 4).max(1);
    let key = match index / quarter {
        0 => Key::Space,
        1 => Key::W,
        2 => Key::A,
        _ => Key::LeftShift,
    };
    let mut keyboard = KeyboardState::with(&[key]);
    if index + 1 >= total {
        keyboard.press(Key::Escape);
    }
    let t = index as f32 * 0.1;
    let unfocused = total / 4 * 3;
    FrameInput {
        keyboard,
        cursor: Vec2::new(400.0 + 40.0 * t.cos(), 300.0 + 40.0 * t.sin()),
        scroll: if index == total / 2 { 1.0 } else { 0.0 },
        focused: index + 1 >= total || !(unfocused..unfocused + 3).contains(&index),
        resized: (index == total / 3).then_some((1024, 768)),
        close_requested: false,
        dt,
    }
}

fn read_source(path: Option<&PathBuf>, builtin: &'static str) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading shader {}", path.display())),
        None => Ok(builtin.to_string()),
    }
}

fn release_all(gpu: &mut Gpu<HeadlessDevice>, bindings: Vec<TextureBinding>) {
    for binding in bindings {
        binding.texture.dispose(gpu);
    }
}

fn load_file(gpu: &mut Gpu<HeadlessDevice>, path: &Path) -> anyhow::Result<Texture2D> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading texture {}", path.display()))?;
    let texture = Texture2D::from_encoded(gpu, &FileDecoder, &bytes)
        .with_context(|| format!("loading texture {}", path.display()))?;
    tracing::info!(
        "loaded {} ({}x{})",
        path.display(),
        texture.width(),
        texture.height()
    );
    Ok(texture)
}

/// Textures from `paths` on units 0.. (samplers `texture0`..), or built-in
/// checkerboards for whichever of `texture0`/`texture1` the program declares.
fn load_textures(
    gpu: &mut Gpu<HeadlessDevice>,
    program: &ShaderProgram,
    paths: &[PathBuf],
) -> anyhow::Result<Vec<TextureBinding>> {
    let mut bindings = Vec::new();
    if paths.is_empty() {
        let patterns = [
            ([200, 120, 60, 255], [90, 50, 20, 255]),
            ([255, 255, 255, 255], [30, 30, 30, 255]),
        ];
        for (unit, (a, b)) in patterns.into_iter().enumerate() {
            let sampler = format!("texture{unit}");
            if program.uniform_location(&sampler).is_none() {
                continue;
            }
            let image = DecodedImage::checkerboard(64, 8, a, b);
            match Texture2D::create(gpu, &image) {
                Ok(texture) => bindings.push(TextureBinding::new(unit as u32, sampler, texture)),
                Err(e) => {
                    release_all(gpu, bindings);
                    return Err(e).with_context(|| format!("creating built-in {sampler}"));
                }
            }
        }
        return Ok(bindings);
    }

    for (unit, path) in paths.iter().enumerate() {
        match load_file(gpu, path) {
            Ok(texture) => {
                bindings.push(TextureBinding::new(unit as u32, format!("texture{unit}"), texture))
            }
            Err(e) => {
                release_all(gpu, bindings);
                return Err(e);
            }
        }
    }
    Ok(bindings)
}

pub fn run(config: &RigConfig, options: &SessionOptions) -> anyhow::Result<RunReport> {
    if options.frames == 0 {
        bail!("a session needs at least one frame");
    }
    let mut gpu = Gpu::new(HeadlessDevice::new());
    let renderer = gpu.device().info().renderer;

    let vertex = read_source(options.vertex.as_ref(), shaders::TEXTURED_VERTEX)?;
    let fragment = read_source(options.fragment.as_ref(), shaders::TEXTURED_FRAGMENT)?;
    let program = ShaderProgram::compile_and_link(&mut gpu, &vertex, &fragment)
        .context("building shader program")?;

    let textured = program
        .attribute_location(gpu.device(), "aTexCoord")
        .is_some();
    let built = if textured {
        Mesh::textured_quad()
    } else {
        Mesh::triangle()
    };
    let mesh = match built {
        Ok(mesh) => mesh,
        Err(e) => {
            program.dispose(&mut gpu);
            return Err(e).context("building mesh");
        }
    };
    let textures = match load_textures(&mut gpu, &program, &options.textures) {
        Ok(textures) => textures,
        Err(e) => {
            program.dispose(&mut gpu);
            return Err(e);
        }
    };

    let mut rig = FrameOrchestrator::new(&mut gpu, config, program, vec![mesh], textures)
        .context("setting up scene")?;
    let mut state = FrameState::new(config.window.title.clone());
    let mut title = None;
    let mut exited = false;

    for index in 0..options.frames {
        let input = scripted_input(index, options.frames, options.dt);
        match rig.frame(&mut gpu, &mut state, &input) {
            Ok(FrameControl::Continue) => {}
            Ok(FrameControl::Exit) => {
                exited = true;
                break;
            }
            Err(e) => {
                rig.shutdown(&mut gpu);
                return Err(e).with_context(|| format!("frame {index}"));
            }
        }
        if let Some(new_title) = state.take_title() {
            tracing::info!("{new_title}");
            title = Some(new_title);
        }
    }

    let camera = rig.camera();
    let camera = CameraReport {
        position: camera.position().to_array(),
        yaw: camera.yaw(),
        pitch: camera.pitch(),
        fov: camera.fov(),
        aspect: camera.aspect_ratio(),
    };
    let leaks = rig.shutdown(&mut gpu);
    let device = gpu.device();
    Ok(RunReport {
        renderer,
        frames_presented: device.frames_presented(),
        draw_calls: device.draw_calls().len(),
        exited,
        title,
        camera,
        leaked: leaks.leaked.len(),
        outstanding: leaks.outstanding.len(),
        device_errors: device.errors().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(frames: u64) -> SessionOptions {
        SessionOptions {
            frames,
            dt: 1.0 / 60.0,
            ..SessionOptions::default()
        }
    }

    #[test]
    fn default_session_is_clean() {
        let report = run(&RigConfig::default(), &options(120)).unwrap();
        assert!(report.exited);
        assert_eq!(report.frames_presented, 119);
        assert_eq!(report.draw_calls, 119);
        assert_eq!(report.leaked, 0);
        assert_eq!(report.outstanding, 0);
        assert!(report.device_errors.is_empty(), "{:?}", report.device_errors);
        assert!(report.title.unwrap().starts_with("meshrig - "));
        assert!((report.camera.aspect - 1024.0 / 768.0).abs() < 1e-6);
        assert!(report.camera.pitch.abs() <= 89.0);
    }

    #[test]
    fn flat_shaders_draw_a_triangle() {
        let dir = tempfile::tempdir().unwrap();
        let vertex = dir.path().join("flat.vert");
        let fragment = dir.path().join("flat.frag");
        std::fs::write(&vertex, shaders::FLAT_VERTEX).unwrap();
        std::fs::write(&fragment, shaders::FLAT_FRAGMENT).unwrap();

        let report = run(
            &RigConfig::default(),
            &SessionOptions {
                vertex: Some(vertex),
                fragment: Some(fragment),
                ..options(8)
            },
        )
        .unwrap();
        assert_eq!(report.frames_presented, 7);
        assert_eq!(report.leaked + report.outstanding, 0);
    }

    #[test]
    fn broken_shader_reports_log() {
        let dir = tempfile::tempdir().unwrap();
        let fragment = dir.path().join("broken.frag");
        std::fs::write(&fragment, "#version 330 core\n#error nope\n").unwrap();
        let err = run(
            &RigConfig::default(),
            &SessionOptions {
                fragment: Some(fragment),
                ..options(4)
            },
        )
        .unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("'#error' : nope"), "{chain}");
    }

    #[test]
    fn script_ends_with_escape() {
        assert!(scripted_input(9, 10, 0.0).wants_exit());
        assert!(!scripted_input(8, 10, 0.0).wants_exit());
        assert_eq!(scripted_input(3, 10, 0.0).resized, Some((1024, 768)));
    }
}
