use anyhow::Context;
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::PhysicalKey,
    window::WindowBuilder,
};

use tree_core::{FrameClock, LayoutParams, Scene, SceneConfig, SceneLayout};

mod input;
mod render;

use render::GpuState;

/// Fixed layout seed, read from `TREE_SEED` when set.
fn layout_seed() -> Option<u64> {
    let raw = std::env::var("TREE_SEED").ok()?;
    match raw.trim().parse() {
        Ok(seed) => Some(seed),
        Err(_) => {
            log::warn!("ignoring TREE_SEED={raw:?}, not an unsigned integer");
            None
        }
    }
}

fn build_scene(config: &SceneConfig) -> anyhow::Result<Scene> {
    let params = LayoutParams::default();
    let layout = match layout_seed() {
        Some(seed) => {
            log::info!("[layout] seed={seed}");
            SceneLayout::from_seed(&params, seed)
        }
        None => SceneLayout::from_entropy(&params),
    }
    .context("generating scene layout")?;
    Scene::new(layout, config.morph_state).context("assembling scene")
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let mut config = SceneConfig::default();
    let mut scene = build_scene(&config)?;
    let mut clock = FrameClock::new();

    let event_loop = EventLoop::new().context("creating event loop")?;
    let window = WindowBuilder::new()
        .with_title("Morphing Tree (native)")
        .build(&event_loop)
        .context("creating window")?;

    let mut state = pollster::block_on(GpuState::new(&window, &scene)).context("gpu setup")?;
    log::info!("Space: morph, Up/Down: rotation, =/-: bloom, C: lights color, Esc: quit");

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent {
                event: WindowEvent::Resized(size),
                ..
            } => state.resize(size),
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => elwt.exit(),
            Event::WindowEvent {
                event:
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                physical_key: PhysicalKey::Code(code),
                                state: ElementState::Pressed,
                                repeat: false,
                                ..
                            },
                        ..
                    },
                ..
            } => {
                let before = config.morph_state;
                if !input::handle_key(&mut config, code) {
                    elwt.exit();
                } else if config.morph_state != before {
                    log::info!("morph -> {:?}", config.morph_state);
                }
            }
            Event::AboutToWait => {
                let frame = clock.tick();
                let cfg = config.sanitized();
                scene.update_frame(&cfg, frame);
                match state.render(&scene, &cfg) {
                    Ok(_) => state.window.request_redraw(),
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        state.resize(state.window.inner_size())
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("surface out of memory, exiting");
                        elwt.exit()
                    }
                    Err(e) => log::warn!("frame skipped: {e:?}"),
                }
            }
            _ => {}
        })
        .context("event loop")?;
    Ok(())
}
