use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Per-frame keyboard and mouse state gathered from window events.
#[derive(Default)]
pub struct Input {
    keys_pressed: HashSet<KeyCode>,
    keys_down: HashSet<KeyCode>,
    mouse_buttons_down: HashSet<MouseButton>,
    cursor: Option<Vec2>,
    mouse_delta: Vec2,
    scroll_delta: Vec2,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the per-frame deltas and presses. Call after each redraw.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }

    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.key(key, event.state);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => {
                    self.mouse_buttons_down.insert(*button);
                }
                ElementState::Released => {
                    self.mouse_buttons_down.remove(button);
                }
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll_delta += match delta {
                    MouseScrollDelta::LineDelta(x, y) => Vec2::new(*x, *y),
                    MouseScrollDelta::PixelDelta(pos) => {
                        Vec2::new(pos.x as f32, pos.y as f32) / 120.0
                    }
                };
            }
            WindowEvent::Focused(false) => {
                self.keys_down.clear();
                self.mouse_buttons_down.clear();
            }
            _ => {}
        }
    }

    fn key(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                // auto-repeat arrives as repeated presses
                if self.keys_down.insert(key) {
                    self.keys_pressed.insert(key);
                }
            }
            ElementState::Released => {
                self.keys_down.remove(&key);
            }
        }
    }

    fn cursor_moved(&mut self, position: Vec2) {
        // the first position after entering the window is not a drag
        if let Some(previous) = self.cursor {
            self.mouse_delta += position - previous;
        }
        self.cursor = Some(position);
    }

    /// Returns true if the key went down this frame.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn mouse_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons_down.contains(&button)
    }

    /// Cursor movement since the last frame, in physical pixels.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Scroll since the last frame, in lines.
    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll_delta
    }
}

#[cfg(test)]
impl Input {
    pub(crate) fn simulate_key(&mut self, key: KeyCode) {
        self.key(key, ElementState::Pressed);
        self.key(key, ElementState::Released);
    }

    pub(crate) fn simulate_drag(&mut self, from: Vec2, to: Vec2) {
        self.mouse_buttons_down.insert(MouseButton::Left);
        self.cursor_moved(from);
        self.cursor_moved(to);
    }

    pub(crate) fn simulate_scroll(&mut self, lines: f32) {
        self.scroll_delta.y += lines;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_press_lasts_one_frame() {
        let mut input = Input::new();
        input.simulate_key(KeyCode::KeyS);
        assert!(input.key_pressed(KeyCode::KeyS));
        input.begin_frame();
        assert!(!input.key_pressed(KeyCode::KeyS));
    }

    #[test]
    fn held_key_does_not_repeat() {
        let mut input = Input::new();
        input.key(KeyCode::KeyT, ElementState::Pressed);
        input.begin_frame();
        input.key(KeyCode::KeyT, ElementState::Pressed);
        assert!(!input.key_pressed(KeyCode::KeyT));
    }

    #[test]
    fn first_cursor_position_is_not_motion() {
        let mut input = Input::new();
        input.cursor_moved(Vec2::new(100.0, 100.0));
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
        input.cursor_moved(Vec2::new(110.0, 95.0));
        assert_eq!(input.mouse_delta(), Vec2::new(10.0, -5.0));
    }

    #[test]
    fn deltas_reset_each_frame() {
        let mut input = Input::new();
        input.simulate_drag(Vec2::ZERO, Vec2::new(3.0, 4.0));
        input.simulate_scroll(2.0);
        input.begin_frame();
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
        assert_eq!(input.scroll_delta(), Vec2::ZERO);
        assert!(input.mouse_down(MouseButton::Left));
    }
}
