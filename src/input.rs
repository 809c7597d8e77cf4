use std::collections::HashSet;

use glam::Vec3;
use log::{debug, info};
use winit::event::{ElementState, VirtualKeyCode};

/// Accumulated directional key presses, one step per frame a key is held.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Offset {
    pub dx: i32,
    pub dy: i32,
    pub dz: i32,
}

impl Offset {
    pub fn as_vec3(&self) -> Vec3 {
        Vec3::new(self.dx as f32, self.dy as f32, self.dz as f32)
    }
}

/// Key state gathered from window events and sampled once per frame.
#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<VirtualKeyCode>,
    close_requested: bool,
    offset: Offset,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_key(&mut self, key: VirtualKeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.held.insert(key);
            }
            ElementState::Released => {
                self.held.remove(&key);
            }
        }
    }

    /// Window manager asked for the window to close.
    pub fn request_close(&mut self) {
        if !self.close_requested {
            info!("Close requested by window manager");
        }
        self.close_requested = true;
    }

    pub fn is_held(&self, key: VirtualKeyCode) -> bool {
        self.held.contains(&key)
    }

    /// Samples held keys, updating the close signal and the offset.
    /// Returns whether the close signal is set.
    pub fn poll(&mut self) -> bool {
        if self.is_held(VirtualKeyCode::Escape) && !self.close_requested {
            info!("Escape pressed, closing");
            self.close_requested = true;
        }

        let before = self.offset;
        if self.is_held(VirtualKeyCode::W) {
            self.offset.dy -= 1;
        }
        if self.is_held(VirtualKeyCode::S) {
            self.offset.dy += 1;
        }
        if self.is_held(VirtualKeyCode::A) {
            self.offset.dx += 1;
        }
        if self.is_held(VirtualKeyCode::D) {
            self.offset.dx -= 1;
        }
        if self.is_held(VirtualKeyCode::Q) {
            self.offset.dz -= 1;
        }
        if self.is_held(VirtualKeyCode::E) {
            self.offset.dz += 1;
        }
        if before != self.offset {
            debug!("Offset now {:?}", self.offset);
        }

        self.close_requested
    }

    pub fn should_close(&self) -> bool {
        self.close_requested
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(input: &mut InputState, key: VirtualKeyCode) {
        input.handle_key(key, ElementState::Pressed);
    }

    #[test]
    fn escape_sets_close_on_next_poll() {
        let mut input = InputState::new();
        assert!(!input.poll());

        press(&mut input, VirtualKeyCode::Escape);
        assert!(!input.should_close());
        assert!(input.poll());
        assert!(input.should_close());
    }

    #[test]
    fn close_is_terminal() {
        let mut input = InputState::new();
        press(&mut input, VirtualKeyCode::Escape);
        input.poll();
        input.handle_key(VirtualKeyCode::Escape, ElementState::Released);

        assert!(input.poll());
    }

    #[test]
    fn other_keys_never_close() {
        let mut input = InputState::new();
        for key in [
            VirtualKeyCode::W,
            VirtualKeyCode::A,
            VirtualKeyCode::S,
            VirtualKeyCode::D,
            VirtualKeyCode::Q,
            VirtualKeyCode::E,
            VirtualKeyCode::Space,
            VirtualKeyCode::Return,
            VirtualKeyCode::Up,
        ] {
            press(&mut input, key);
        }

        for _ in 0..10 {
            assert!(!input.poll());
        }
    }

    #[test]
    fn window_close_request_sets_signal() {
        let mut input = InputState::new();
        input.request_close();

        assert!(input.should_close());
        assert!(input.poll());
    }

    #[test]
    fn held_keys_accumulate_per_poll() {
        let mut input = InputState::new();
        press(&mut input, VirtualKeyCode::W);
        press(&mut input, VirtualKeyCode::A);

        input.poll();
        input.poll();
        input.poll();
        assert_eq!(input.offset(), Offset { dx: 3, dy: -3, dz: 0 });

        input.handle_key(VirtualKeyCode::W, ElementState::Released);
        press(&mut input, VirtualKeyCode::D);
        press(&mut input, VirtualKeyCode::E);
        input.poll();
        assert_eq!(input.offset(), Offset { dx: 3, dy: -3, dz: 1 });
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut input = InputState::new();
        press(&mut input, VirtualKeyCode::W);
        press(&mut input, VirtualKeyCode::S);
        press(&mut input, VirtualKeyCode::Q);
        press(&mut input, VirtualKeyCode::E);

        input.poll();
        assert_eq!(input.offset(), Offset::default());
    }
}
