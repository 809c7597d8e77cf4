use std::time::Duration;

use crate::{input::InputState, transform::Transforms};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Closing,
}

/// Per-frame bookkeeping of the render loop, independent of the device.
#[derive(Debug)]
pub struct RenderLoop {
    pub input: InputState,
    state: LoopState,
    frames: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            input: InputState::new(),
            state: LoopState::Running,
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Polls input and, while still running, yields the transforms for a
    /// frame drawn `elapsed` after start-up.
    pub fn step(&mut self, elapsed: Duration) -> Option<Transforms> {
        if self.state == LoopState::Closing {
            return None;
        }
        self.input.poll();
        if self.input.should_close() {
            self.state = LoopState::Closing;
            return None;
        }

        self.frames += 1;
        Some(Transforms::at(elapsed.as_secs_f32(), self.input.offset()))
    }
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use winit::event::{ElementState, VirtualKeyCode};

    use super::*;
    use crate::input::Offset;
    use crate::transform;

    #[test]
    fn simulated_frames_advance_rotation_only() {
        let mut render_loop = RenderLoop::new();
        let first = render_loop.step(Duration::ZERO).unwrap();

        for frame in 1..=120u32 {
            let elapsed = Duration::from_millis(frame as u64 * 16);
            let transforms = render_loop.step(elapsed).unwrap();

            assert_eq!(transforms.view, first.view);
            assert_eq!(transforms.projection, first.projection);
            assert_eq!(
                transforms.model,
                transform::model(elapsed.as_secs_f32(), Offset::default())
            );
        }
        assert_eq!(render_loop.frames(), 121);
        assert_eq!(render_loop.state(), LoopState::Running);
    }

    #[test]
    fn rotation_angle_at_time() {
        let mut render_loop = RenderLoop::new();
        let transforms = render_loop.step(Duration::from_secs(2)).unwrap();

        let (axis, angle) = transforms.model.to_scale_rotation_translation().1.to_axis_angle();
        assert!((angle.to_degrees() - 100.0).abs() < 1e-3);
        assert!(axis.abs_diff_eq(Vec3::new(1.0, 0.3, 0.5).normalize(), 1e-5));
    }

    #[test]
    fn escape_moves_to_closing() {
        let mut render_loop = RenderLoop::new();
        assert!(render_loop.step(Duration::ZERO).is_some());

        render_loop
            .input
            .handle_key(VirtualKeyCode::Escape, ElementState::Pressed);
        assert!(render_loop.step(Duration::from_millis(16)).is_none());
        assert_eq!(render_loop.state(), LoopState::Closing);

        render_loop
            .input
            .handle_key(VirtualKeyCode::Escape, ElementState::Released);
        assert!(render_loop.step(Duration::from_millis(32)).is_none());
        assert_eq!(render_loop.frames(), 1);
    }

    #[test]
    fn held_direction_moves_model() {
        let mut render_loop = RenderLoop::new();
        render_loop
            .input
            .handle_key(VirtualKeyCode::S, ElementState::Pressed);

        render_loop.step(Duration::ZERO);
        let transforms = render_loop.step(Duration::ZERO).unwrap();

        let centre = transforms.model.transform_point3(Vec3::ZERO);
        assert!(centre.abs_diff_eq(Vec3::new(0.0, 0.1, 0.0), 1e-6));
    }
}
