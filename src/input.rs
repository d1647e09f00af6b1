use winit::{
    event::*,
    keyboard::{KeyCode, PhysicalKey},
};

use crate::math::Vector;
use crate::{BOUNCER, State};

/// How far the arrow keys push the bouncing triangle per press.
const NUDGE: f32 = 0.05;

pub fn handle_input(state: &mut State, event: &WindowEvent) -> bool {
    match event {
        WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    state: ElementState::Pressed,
                    physical_key: PhysicalKey::Code(key),
                    ..
                },
            ..
        } => match key {
            // Toggle the FPS cap with the F key
            KeyCode::KeyF => {
                state.fps_cap_enabled = !state.fps_cap_enabled;
                log::info!(
                    "FPS cap {} (target: {} FPS)",
                    if state.fps_cap_enabled {
                        "enabled"
                    } else {
                        "disabled"
                    },
                    state.target_fps
                );
                state.update_window_title();
                true
            }
            // Pause/resume the animation
            KeyCode::Space => {
                state.paused = !state.paused;
                log::info!(
                    "animation {}",
                    if state.paused { "paused" } else { "resumed" }
                );
                state.update_window_title();
                true
            }
            // Arrow keys nudge the bouncing triangle
            KeyCode::ArrowLeft => {
                state.triangles[BOUNCER].translate(Vector::new2(-NUDGE, 0.0));
                true
            }
            KeyCode::ArrowRight => {
                state.triangles[BOUNCER].translate(Vector::new2(NUDGE, 0.0));
                true
            }
            KeyCode::ArrowUp => {
                state.triangles[BOUNCER].translate(Vector::new2(0.0, NUDGE));
                true
            }
            KeyCode::ArrowDown => {
                state.triangles[BOUNCER].translate(Vector::new2(0.0, -NUDGE));
                true
            }
            _ => false,
        },
        _ => false,
    }
}
