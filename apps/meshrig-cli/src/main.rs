mod decode;
mod session;

use anyhow::Context;
use clap::{Parser, Subcommand};
use meshrig_common::RigConfig;
use meshrig_device::{Gpu, GraphicsDevice, HeadlessDevice};
use meshrig_render::ShaderProgram;
use session::SessionOptions;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "meshrig", about = "CLI tool for meshrig scenes")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Compile and link a shader pair, then list its uniforms
    Validate {
        #[arg(long)]
        vertex: PathBuf,
        #[arg(long)]
        fragment: PathBuf,
    },
    /// Run a scripted session on the headless device
    Run {
        /// YAML rig configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of frames; the last one presses Escape
        #[arg(short, long, default_value = "120")]
        frames: u64,
        /// Seconds per frame
        #[arg(long, default_value = "0.016666668")]
        dt: f32,
        #[arg(long)]
        vertex: Option<PathBuf>,
        #[arg(long)]
        fragment: Option<PathBuf>,
        /// Image for sampler textureN, in order
        #[arg(long = "texture")]
        textures: Vec<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("meshrig v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", meshrig_common::crate_info());
            println!("device: {}", meshrig_device::crate_info());
            println!("render: {}", meshrig_render::crate_info());
            println!("camera: {}", meshrig_camera::crate_info());
            println!("input: {}", meshrig_input::crate_info());
            println!("frame: {}", meshrig_frame::crate_info());
        }
        Commands::Validate { vertex, fragment } => {
            let vertex_source = std::fs::read_to_string(&vertex)
                .with_context(|| format!("reading {}", vertex.display()))?;
            let fragment_source = std::fs::read_to_string(&fragment)
                .with_context(|| format!("reading {}", fragment.display()))?;

            let mut gpu = Gpu::new(HeadlessDevice::new());
            let program = ShaderProgram::compile_and_link(&mut gpu, &vertex_source, &fragment_source)
                .with_context(|| {
                    format!("{} + {}", vertex.display(), fragment.display())
                })?;
            println!("Linked program {}", program.id());
            for name in program.uniform_names() {
                if let Some(location) = program.uniform_location(name) {
                    println!("  uniform {name} @ {}", location.0);
                }
            }
            for attribute in ["aPosition", "aTexCoord"] {
                if let Some(location) = gpu.device().attribute_location(program.id(), attribute) {
                    println!("  attribute {attribute} @ {location}");
                }
            }
            program.dispose(&mut gpu);
        }
        Commands::Run {
            config,
            frames,
            dt,
            vertex,
            fragment,
            textures,
            json,
        } => {
            let config = match config {
                Some(path) => RigConfig::load(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => RigConfig::default(),
            };
            let options = SessionOptions {
                frames,
                dt,
                vertex,
                fragment,
                textures,
            };
            let report = session::run(&config, &options)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Renderer: {}", report.renderer);
                println!(
                    "Frames presented: {}, draws: {}, exited: {}",
                    report.frames_presented, report.draw_calls, report.exited
                );
                if let Some(title) = &report.title {
                    println!("Title: {title}");
                }
                let camera = &report.camera;
                println!(
                    "Camera: position={:?} yaw={:.2} pitch={:.2} fov={:.2} aspect={:.3}",
                    camera.position, camera.yaw, camera.pitch, camera.fov, camera.aspect
                );
                println!(
                    "Resources: {} leaked, {} outstanding",
                    report.leaked, report.outstanding
                );
                for error in &report.device_errors {
                    println!("Device error: {error}");
                }
            }
        }
    }

    Ok(())
}
