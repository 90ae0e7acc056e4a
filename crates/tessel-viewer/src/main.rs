use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use tessel_engine::core::{DrawCommand, RenderLoop, Scene};
use tessel_engine::device::{Device, GpuInit, Primitive, TextureOrigin, UniformValue, WgpuDevice, share};
use tessel_engine::geometry::{GeometryBuffer, VertexLayout};
use tessel_engine::logging::{LoggingConfig, init_logging};
use tessel_engine::paint::Color;
use tessel_engine::shader::ShaderProgram;
use tessel_engine::texture::{SamplerSlot, SamplingConfig};
use tessel_engine::window::{ContextConfig, WinitContext};

const TITLE: &str = "tessel viewer";
const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;
const CLEAR_COLOR: Color = Color::rgb(0.8, 0.8, 0.8);
/// Weight of the second texture in the fragment blend.
const MIX_AMOUNT: f32 = 0.2;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    color: [f32; 3],
    /// `v` grows upwards.
    uv: [f32; 2],
}

const QUAD: [Vertex; 4] = [
    Vertex { position: [0.5, 0.5, 0.0], color: [1.0, 0.0, 0.0], uv: [1.0, 1.0] },
    Vertex { position: [0.5, -0.5, 0.0], color: [0.0, 1.0, 0.0], uv: [1.0, 0.0] },
    Vertex { position: [-0.5, -0.5, 0.0], color: [0.0, 0.0, 1.0], uv: [0.0, 0.0] },
    Vertex { position: [-0.5, 0.5, 0.0], color: [1.0, 1.0, 0.0], uv: [0.0, 1.0] },
];
const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let mut window = WinitContext::create(ContextConfig {
        title: TITLE.to_string(),
        width: WIDTH,
        height: HEIGHT,
    })?;
    let device = share(WgpuDevice::new(window.window(), GpuInit::default())?);
    let origin = device.borrow().texture_origin();

    let program = ShaderProgram::from_files(
        &device,
        asset("shaders/vertex.wgsl"),
        asset("shaders/fragment.wgsl"),
    )
    .context("failed to build the quad program")?;

    let layout = VertexLayout::packed_f32(&[3, 3, 2])?;
    let geometry = GeometryBuffer::create(&device, &quad(origin), Some(&QUAD_INDICES), layout)?;

    let scene = Scene::new(
        program,
        geometry,
        DrawCommand::Indexed {
            primitive: Primitive::Triangles,
            count: QUAD_INDICES.len() as u32,
        },
    )
    .with_texture(SamplerSlot::load(
        &device,
        "texture1",
        asset("assets/container.png"),
        0,
        SamplingConfig::default(),
    ))
    .with_texture(SamplerSlot::load(
        &device,
        "texture2",
        asset("assets/awesomeface.png"),
        1,
        SamplingConfig::default(),
    ))
    .with_uniform("mix_amount", UniformValue::Float(MIX_AMOUNT));

    let mut render_loop = RenderLoop::new(device, CLEAR_COLOR);
    render_loop.load(scene)?;
    render_loop.run(&mut window)?;

    let stats = render_loop.stats();
    log::info!(
        "closed after {} frame(s); {} draw(s) dropped, {} frame(s) skipped",
        stats.presented,
        stats.dropped_draws,
        stats.skipped_frames
    );
    Ok(())
}

/// The quad with texture coordinates matching where the device puts texel row 0.
fn quad(origin: TextureOrigin) -> [Vertex; 4] {
    QUAD.map(|mut v| {
        if origin == TextureOrigin::TopLeft {
            v.uv[1] = 1.0 - v.uv[1];
        }
        v
    })
}

fn asset(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(relative)
}
