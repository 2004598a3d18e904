use cgmath::{Vector3, Zero};
use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use super::orbit_camera::OrbitCamera;

/// Rotational momentum below this magnitude is snapped to zero.
const VELOCITY_EPSILON: f32 = 1e-4;

/// World units the camera travels per frame while a movement key is held.
const MOVE_STEP: f32 = 0.25;

/// Held state for the four tracked movement keys.
///
/// Set on key-down, cleared on key-up, read once per frame. Keys outside the
/// tracked set never touch it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldKeys {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

impl HeldKeys {
    pub fn any(&self) -> bool {
        self.forward || self.back || self.left || self.right
    }
}

/// Translates mouse and keyboard input into orbit camera motion.
///
/// Mouse drag orbits (shift-drag pans), the wheel zooms, and the arrow keys
/// translate the camera along its forward/right axes once per frame. Drag
/// rotation carries momentum that decays each frame after release.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    damping: f32,
    yaw_velocity: f32,
    pitch_velocity: f32,
    is_shift_held: bool,
    is_mouse_pressed: bool,
    held: HeldKeys,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            pan_speed: 0.01,
            damping: 0.85,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            is_shift_held: false,
            is_mouse_pressed: false,
            held: HeldKeys::default(),
        }
    }

    pub fn process_events(
        &mut self,
        event: &DeviceEvent,
        window: &Window,
        camera: &mut OrbitCamera,
    ) {
        match event {
            DeviceEvent::Button {
                button: 0, // Left Mouse Button
                state,
            } => {
                self.is_mouse_pressed = *state == ElementState::Pressed;
            }
            DeviceEvent::MouseWheel { delta, .. } => {
                let scroll_amount = -match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32
                    }
                };
                camera.add_distance(scroll_amount * self.zoom_speed);
                window.request_redraw();
            }
            DeviceEvent::MouseMotion { delta } => {
                if self.is_mouse_pressed {
                    if self.is_shift_held {
                        // SHIFT + DRAG = PAN (move focus point)
                        camera.pan((
                            -delta.0 as f32 * self.pan_speed,
                            delta.1 as f32 * self.pan_speed,
                        ));
                    } else {
                        // NORMAL DRAG = ROTATE (orbit around focus)
                        let yaw_delta = -delta.0 as f32 * self.rotate_speed;
                        let pitch_delta = delta.1 as f32 * self.rotate_speed;

                        camera.add_yaw(yaw_delta);
                        camera.add_pitch(pitch_delta);

                        // Remember the last drag step so the orbit keeps
                        // gliding after release
                        self.yaw_velocity = yaw_delta;
                        self.pitch_velocity = pitch_delta;
                    }
                    window.request_redraw();
                }
            }
            _ => (),
        }
    }

    pub fn process_keyed_events(&mut self, event: &KeyEvent) {
        if let KeyEvent {
            physical_key: PhysicalKey::Code(code),
            state,
            ..
        } = event
        {
            self.set_key(*code, *state == ElementState::Pressed);
        }
    }

    /// Updates held state for a single key. Untracked keys are ignored.
    pub fn set_key(&mut self, code: KeyCode, pressed: bool) {
        match code {
            KeyCode::ShiftLeft | KeyCode::ShiftRight => self.is_shift_held = pressed,
            KeyCode::ArrowUp => self.held.forward = pressed,
            KeyCode::ArrowDown => self.held.back = pressed,
            KeyCode::ArrowLeft => self.held.left = pressed,
            KeyCode::ArrowRight => self.held.right = pressed,
            _ => (),
        }
    }

    pub fn held_keys(&self) -> HeldKeys {
        self.held
    }

    /// Per-frame integration: keyboard translation plus rotational damping.
    pub fn update(&mut self, camera: &mut OrbitCamera) {
        self.apply_held_keys(camera);

        // Momentum only runs freely once the drag ends; during a drag the
        // motion events drive the camera directly.
        if self.is_mouse_pressed {
            return;
        }

        if self.yaw_velocity.abs() > VELOCITY_EPSILON || self.pitch_velocity.abs() > VELOCITY_EPSILON
        {
            camera.add_yaw(self.yaw_velocity);
            camera.add_pitch(self.pitch_velocity);
            self.yaw_velocity *= self.damping;
            self.pitch_velocity *= self.damping;
        } else {
            self.yaw_velocity = 0.0;
            self.pitch_velocity = 0.0;
        }
    }

    /// Translates the camera along its forward/right axes for held keys.
    ///
    /// Simultaneous keys compound linearly; there is no diagonal-speed
    /// normalization and no acceleration.
    fn apply_held_keys(&mut self, camera: &mut OrbitCamera) {
        if !self.held.any() {
            return;
        }

        let forward = camera.forward();
        let right = camera.right();
        let mut delta = Vector3::zero();

        if self.held.forward {
            delta += forward * MOVE_STEP;
        }
        if self.held.back {
            delta -= forward * MOVE_STEP;
        }
        if self.held.right {
            delta += right * MOVE_STEP;
        }
        if self.held.left {
            delta -= right * MOVE_STEP;
        }

        camera.translate(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::MetricSpace;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(5.0, 0.3, 0.1, Vector3::zero(), 1.0)
    }

    #[test]
    fn test_tracked_keys_toggle_held_state() {
        let mut controller = CameraController::new(0.005, 0.1);

        controller.set_key(KeyCode::ArrowUp, true);
        controller.set_key(KeyCode::ArrowLeft, true);
        assert!(controller.held_keys().forward);
        assert!(controller.held_keys().left);

        controller.set_key(KeyCode::ArrowUp, false);
        assert!(!controller.held_keys().forward);
        assert!(controller.held_keys().left);
    }

    #[test]
    fn test_untracked_keys_never_alter_state() {
        let mut controller = CameraController::new(0.005, 0.1);

        controller.set_key(KeyCode::KeyW, true);
        controller.set_key(KeyCode::Space, true);
        controller.set_key(KeyCode::Escape, true);

        assert_eq!(controller.held_keys(), HeldKeys::default());
    }

    #[test]
    fn test_forward_key_moves_camera_along_view_direction() {
        let mut controller = CameraController::new(0.005, 0.1);
        let mut cam = camera();
        let forward = cam.forward();

        controller.set_key(KeyCode::ArrowUp, true);
        controller.update(&mut cam);

        let expected = forward * MOVE_STEP;
        assert!(cam.target.distance(expected) < 1e-5);
    }

    #[test]
    fn test_simultaneous_keys_compound_linearly() {
        let mut controller = CameraController::new(0.005, 0.1);
        let mut cam = camera();
        let expected = (cam.forward() + cam.right()) * MOVE_STEP;

        controller.set_key(KeyCode::ArrowUp, true);
        controller.set_key(KeyCode::ArrowRight, true);
        controller.update(&mut cam);

        assert!(cam.target.distance(expected) < 1e-5);
    }

    #[test]
    fn test_opposed_keys_cancel() {
        let mut controller = CameraController::new(0.005, 0.1);
        let mut cam = camera();

        controller.set_key(KeyCode::ArrowLeft, true);
        controller.set_key(KeyCode::ArrowRight, true);
        controller.update(&mut cam);

        assert!(cam.target.distance(Vector3::zero()) < 1e-5);
    }
}
