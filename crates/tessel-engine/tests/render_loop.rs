//! Whole-harness runs against the recording device.

use tessel_engine::core::{ContextProvider, DrawCommand, LoopState, RenderLoop, Scene, StartupError};
use tessel_engine::device::{
    DeviceCall, Primitive, ProgramInterface, RecordingDevice, SharedDevice, UniformValue, share,
};
use tessel_engine::geometry::{GeometryBuffer, GeometryError, LayoutError, VertexAttribute, VertexLayout};
use tessel_engine::paint::Color;
use tessel_engine::shader::{ProgramError, ShaderProgram};
use tessel_engine::texture::{PixelData, PixelSource, SamplerSlot, SamplingConfig, TextureUnit};

/// Window stand-in: closes once `close` is set.
#[derive(Default)]
struct Window {
    close: bool,
    polls: u32,
    presents: u32,
}

impl ContextProvider for Window {
    fn poll_events(&mut self) {
        self.polls += 1;
    }

    fn should_close(&self) -> bool {
        self.close
    }

    fn present(&mut self) {
        self.presents += 1;
    }

    fn take_resize(&mut self) -> Option<(u32, u32)> {
        None
    }
}

fn textured_device(samplers: &[&str]) -> SharedDevice<RecordingDevice> {
    share(RecordingDevice::new().with_interface(ProgramInterface {
        inputs: vec![0, 1, 2],
        samplers: samplers.iter().map(|s| s.to_string()).collect(),
        uniforms: vec!["mix_amount".into()],
    }))
}

fn program(device: &SharedDevice<RecordingDevice>) -> ShaderProgram<RecordingDevice> {
    ShaderProgram::from_sources(device, "vertex source", "fragment source").unwrap()
}

fn triangle(device: &SharedDevice<RecordingDevice>) -> GeometryBuffer<RecordingDevice> {
    let vertices = [[-0.5f32, -0.5, 0.0], [0.5, -0.5, 0.0], [0.0, 0.5, 0.0]];
    GeometryBuffer::create(device, &vertices, None, VertexLayout::packed_f32(&[3]).unwrap()).unwrap()
}

/// Position, color and texture coordinate per vertex; two triangles sharing an edge.
fn quad(device: &SharedDevice<RecordingDevice>) -> GeometryBuffer<RecordingDevice> {
    let vertices: [[f32; 8]; 4] = [
        [0.5, 0.5, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0],
        [0.5, -0.5, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0],
        [-0.5, -0.5, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
        [-0.5, 0.5, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0],
    ];
    let indices = [0u32, 1, 3, 1, 2, 3];
    let layout = VertexLayout::packed_f32(&[3, 3, 2]).unwrap();
    GeometryBuffer::create(device, &vertices, Some(&indices), layout).unwrap()
}

fn indexed_quad_scene(device: &SharedDevice<RecordingDevice>) -> Scene<RecordingDevice> {
    Scene::new(
        program(device),
        quad(device),
        DrawCommand::Indexed {
            primitive: Primitive::Triangles,
            count: 6,
        },
    )
}

fn draws(calls: &[DeviceCall]) -> Vec<&DeviceCall> {
    calls
        .iter()
        .filter(|c| matches!(c, DeviceCall::DrawArrays { .. } | DeviceCall::DrawIndexed { .. }))
        .collect()
}

// ── draw scenarios ───────────────────────────────────────────────────────

#[test]
fn triangle_issues_one_array_draw_of_three_vertices() {
    let device = share(RecordingDevice::new());
    let scene = Scene::new(
        program(&device),
        triangle(&device),
        DrawCommand::Arrays {
            primitive: Primitive::Triangles,
            count: 3,
        },
    );
    let mut lp = RenderLoop::new(device.clone(), Color::BLACK);
    lp.load(scene).unwrap();
    device.borrow_mut().clear_calls();

    lp.step(&mut Window::default());

    let calls = device.borrow_mut().take_calls();
    assert_eq!(
        draws(&calls),
        vec![&DeviceCall::DrawArrays {
            primitive: Primitive::Triangles,
            first: 0,
            count: 3
        }]
    );
}

#[test]
fn quad_issues_one_indexed_draw_of_six_indices() {
    let device = textured_device(&[]);
    let mut lp = RenderLoop::new(device.clone(), Color::BLACK);
    lp.load(indexed_quad_scene(&device)).unwrap();
    device.borrow_mut().clear_calls();

    lp.step(&mut Window::default());

    let calls = device.borrow_mut().take_calls();
    assert_eq!(
        draws(&calls),
        vec![&DeviceCall::DrawIndexed {
            primitive: Primitive::Triangles,
            count: 6
        }]
    );
    assert_eq!(lp.stats().dropped_draws, 0);
}

#[test]
fn undecodable_texture_leaves_its_slot_unbound() {
    let device = textured_device(&["texture1"]);
    let garbage = PixelSource::Memory(b"definitely not an image".to_vec());

    let direct = TextureUnit::load(&device, garbage.clone(), 0, SamplingConfig::default());
    assert!(direct.is_err());

    let slot = SamplerSlot::load(&device, "texture1", garbage, 0, SamplingConfig::default());
    assert!(!slot.is_loaded());

    let scene = indexed_quad_scene(&device).with_texture(slot);
    let mut lp = RenderLoop::new(device.clone(), Color::BLACK);
    lp.load(scene).unwrap();
    device.borrow_mut().clear_calls();

    let mut window = Window::default();
    lp.step(&mut window);
    lp.step(&mut window);

    let calls = device.borrow().calls().to_vec();
    assert!(!calls.iter().any(|c| matches!(c, DeviceCall::BindTexture { .. })));
    assert_eq!(draws(&calls).len(), 2);
    assert_eq!(lp.stats().presented, 2);
}

#[test]
fn close_while_running_terminates_on_the_next_step() {
    let device = textured_device(&["texture1"]);
    let scene = indexed_quad_scene(&device).with_texture(SamplerSlot::load(
        &device,
        "texture1",
        PixelData::filled(2, 2, [200, 100, 50, 255]),
        0,
        SamplingConfig::default(),
    ));
    let mut lp = RenderLoop::new(device.clone(), Color::BLACK);
    lp.load(scene).unwrap();
    assert_eq!(device.borrow().live_resources(), 3);
    assert_eq!(device.borrow().live_stages(), 0);

    let mut window = Window::default();
    assert_eq!(lp.step(&mut window), LoopState::Running);
    assert_eq!(lp.step(&mut window), LoopState::Running);

    window.close = true;
    assert_eq!(lp.step(&mut window), LoopState::Terminated);
    assert_eq!(device.borrow().live_resources(), 0);
    assert!(lp.scene().is_none());
    assert_eq!(window.presents, 2);
}

#[test]
fn run_returns_once_the_window_closes() {
    struct CloseAfter(u32);
    impl ContextProvider for CloseAfter {
        fn poll_events(&mut self) {
            self.0 = self.0.saturating_sub(1);
        }
        fn should_close(&self) -> bool {
            self.0 == 0
        }
        fn present(&mut self) {}
        fn take_resize(&mut self) -> Option<(u32, u32)> {
            None
        }
    }

    let device = textured_device(&[]);
    let mut lp = RenderLoop::new(device.clone(), Color::BLACK);
    lp.load(indexed_quad_scene(&device)).unwrap();
    lp.run(&mut CloseAfter(3)).unwrap();

    assert_eq!(lp.state(), LoopState::Terminated);
    assert_eq!(lp.stats().presented, 3);
    assert_eq!(device.borrow().live_resources(), 0);
}

// ── textures ─────────────────────────────────────────────────────────────

fn scene_with_textures(
    device: &SharedDevice<RecordingDevice>,
    samplers: &[&str],
) -> Scene<RecordingDevice> {
    samplers.iter().enumerate().fold(indexed_quad_scene(device), |scene, (slot, name)| {
        scene.with_texture(SamplerSlot::load(
            device,
            *name,
            PixelData::filled(4, 4, [slot as u8 * 80, 0, 0, 255]),
            slot as u32,
            SamplingConfig::default(),
        ))
    })
}

#[test]
fn each_texture_is_bound_to_its_own_slot() {
    for samplers in [&[][..], &["texture1"][..], &["texture1", "texture2"][..]] {
        let device = textured_device(samplers);
        let scene = scene_with_textures(&device, samplers)
            .with_uniform("mix_amount", UniformValue::Float(0.2));
        let mut lp = RenderLoop::new(device.clone(), Color::rgb(0.8, 0.8, 0.8));
        lp.load(scene).unwrap();
        device.borrow_mut().clear_calls();

        lp.step(&mut Window::default());
        let calls = device.borrow_mut().take_calls();

        let bound: Vec<u32> = calls
            .iter()
            .filter_map(|c| match c {
                DeviceCall::BindTexture { slot, .. } => Some(*slot),
                _ => None,
            })
            .collect();
        assert_eq!(bound, (0..samplers.len() as u32).collect::<Vec<_>>());

        let slot_writes: Vec<UniformValue> = calls
            .iter()
            .filter_map(|c| match c {
                DeviceCall::SetUniform {
                    value: v @ UniformValue::Int(_),
                    ..
                } => Some(*v),
                _ => None,
            })
            .collect();
        assert_eq!(
            slot_writes,
            (0..samplers.len() as i32).map(UniformValue::Int).collect::<Vec<_>>()
        );
        assert_eq!(draws(&calls).len(), 1);
    }
}

#[test]
fn textures_bind_before_the_draw() {
    let device = textured_device(&["texture1", "texture2"]);
    let mut lp = RenderLoop::new(device.clone(), Color::BLACK);
    lp.load(scene_with_textures(&device, &["texture1", "texture2"]))
        .unwrap();
    device.borrow_mut().clear_calls();

    lp.step(&mut Window::default());
    let calls = device.borrow_mut().take_calls();
    let last_bind = calls
        .iter()
        .rposition(|c| matches!(c, DeviceCall::BindTexture { .. }))
        .unwrap();
    let draw = calls
        .iter()
        .position(|c| matches!(c, DeviceCall::DrawIndexed { .. }))
        .unwrap();
    assert!(last_bind < draw);
    assert_eq!(calls.last(), Some(&DeviceCall::Present));
}

#[test]
fn binds_are_reissued_every_frame_but_once_per_frame() {
    let device = textured_device(&["texture1"]);
    let mut lp = RenderLoop::new(device.clone(), Color::BLACK);
    lp.load(scene_with_textures(&device, &["texture1"])).unwrap();
    device.borrow_mut().clear_calls();

    let mut window = Window::default();
    for _ in 0..3 {
        lp.step(&mut window);
    }
    let calls = device.borrow().calls().to_vec();
    let count = |f: fn(&DeviceCall) -> bool| calls.iter().filter(|c| f(c)).count();
    assert_eq!(count(|c| matches!(c, DeviceCall::UseProgram(_))), 3);
    assert_eq!(count(|c| matches!(c, DeviceCall::BindGeometry(_))), 3);
    assert_eq!(count(|c| matches!(c, DeviceCall::BindTexture { .. })), 3);
}

// ── failures ─────────────────────────────────────────────────────────────

#[test]
fn failed_draw_still_presents_and_the_loop_continues() {
    let device = textured_device(&[]);
    let mut lp = RenderLoop::new(device.clone(), Color::BLACK);
    lp.load(indexed_quad_scene(&device)).unwrap();
    device.borrow_mut().fail_next_draws(1);

    let mut window = Window::default();
    assert_eq!(lp.step(&mut window), LoopState::Running);
    assert_eq!(lp.step(&mut window), LoopState::Running);

    let stats = lp.stats();
    assert_eq!(stats.dropped_draws, 1);
    assert_eq!(stats.presented, 2);
    assert_eq!(window.presents, 2);
}

#[test]
fn compile_failure_never_reaches_ready() {
    let device = share(RecordingDevice::new().reject_source("broken", "0:1: syntax error"));
    let err = ShaderProgram::from_sources(&device, "broken vertex", "fine fragment").unwrap_err();
    match err {
        ProgramError::Compile(errors) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].to_string().contains("syntax error"));
        }
        other => panic!("expected a compile error, got {other:?}"),
    }
    assert_eq!(device.borrow().live_stages(), 0);
    assert_eq!(device.borrow().live_resources(), 0);
}

#[test]
fn link_failure_is_reported_as_startup_error() {
    let device = share(RecordingDevice::new().fail_link("varying mismatch"));
    let err: StartupError = ShaderProgram::from_sources(&device, "vs", "fs")
        .unwrap_err()
        .into();
    assert!(err.to_string().contains("varying mismatch"));
    assert_eq!(device.borrow().live_stages(), 0);
}

#[test]
fn overlapping_layout_is_rejected_before_upload() {
    let device = share(RecordingDevice::new());
    let layout = VertexLayout::new([
        VertexAttribute::float(0, 3, 20, 0),
        VertexAttribute::float(1, 3, 20, 8),
    ]);
    assert!(matches!(layout, Err(LayoutError::Overlap { .. })));

    let ragged = [0u8; 10];
    let err = GeometryBuffer::create(&device, &ragged, None, VertexLayout::packed_f32(&[3]).unwrap())
        .unwrap_err();
    assert!(matches!(err, GeometryError::PartialVertex { bytes: 10, stride: 12 }));
    assert!(device.borrow().calls().is_empty());
}
