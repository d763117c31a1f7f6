use tree_core::{SceneConfig, MIN_BLOOM_INTENSITY, MIN_ROTATION_SPEED};
use winit::keyboard::KeyCode;

pub const ROTATION_STEP: f32 = 0.1;
pub const MAX_ROTATION_SPEED: f32 = 3.0;
pub const BLOOM_STEP: f32 = 0.1;
pub const MAX_BLOOM_INTENSITY: f32 = 4.0;

/// Lights colors cycled with `C`, starting from the default warm gold.
pub const LIGHTS_PALETTE: [[f32; 3]; 5] = [
    [1.0, 0.78, 0.35],
    [1.0, 0.32, 0.28],
    [0.45, 0.75, 1.0],
    [0.95, 0.95, 1.0],
    [0.8, 0.45, 1.0],
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    ToggleMorph,
    RotationUp,
    RotationDown,
    BloomUp,
    BloomDown,
    CycleLights,
    Exit,
}

#[inline]
pub fn action_for_key(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::Space => Some(Action::ToggleMorph),
        KeyCode::ArrowUp => Some(Action::RotationUp),
        KeyCode::ArrowDown => Some(Action::RotationDown),
        KeyCode::Equal | KeyCode::NumpadAdd => Some(Action::BloomUp),
        KeyCode::Minus | KeyCode::NumpadSubtract => Some(Action::BloomDown),
        KeyCode::KeyC => Some(Action::CycleLights),
        KeyCode::Escape => Some(Action::Exit),
        _ => None,
    }
}

/// Index of the palette entry after `current`; unknown colors restart the cycle.
pub fn next_palette_index(current: [f32; 3]) -> usize {
    LIGHTS_PALETTE
        .iter()
        .position(|c| *c == current)
        .map_or(0, |i| (i + 1) % LIGHTS_PALETTE.len())
}

/// Apply one action to the config. Returns `false` when the app should exit.
pub fn apply_action(config: &mut SceneConfig, action: Action) -> bool {
    match action {
        Action::ToggleMorph => config.morph_state = config.morph_state.toggled(),
        Action::RotationUp => {
            config.rotation_speed = (config.rotation_speed + ROTATION_STEP)
                .clamp(MIN_ROTATION_SPEED, MAX_ROTATION_SPEED)
        }
        Action::RotationDown => {
            config.rotation_speed = (config.rotation_speed - ROTATION_STEP)
                .clamp(MIN_ROTATION_SPEED, MAX_ROTATION_SPEED)
        }
        Action::BloomUp => {
            config.bloom_intensity = (config.bloom_intensity + BLOOM_STEP)
                .clamp(MIN_BLOOM_INTENSITY, MAX_BLOOM_INTENSITY)
        }
        Action::BloomDown => {
            config.bloom_intensity = (config.bloom_intensity - BLOOM_STEP)
                .clamp(MIN_BLOOM_INTENSITY, MAX_BLOOM_INTENSITY)
        }
        Action::CycleLights => {
            config.lights_color = LIGHTS_PALETTE[next_palette_index(config.lights_color)]
        }
        Action::Exit => return false,
    }
    true
}

/// Map a key press onto the config. Returns `false` when the app should exit.
pub fn handle_key(config: &mut SceneConfig, key: KeyCode) -> bool {
    match action_for_key(key) {
        Some(action) => {
            log::debug!("key {key:?} -> {action:?}");
            apply_action(config, action)
        }
        None => true,
    }
}
