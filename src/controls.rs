use glam::{Mat4, Vec3};
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::input::Input;
use crate::projection::{framing_planes, perspective};
use crate::transform::model_view_projection;

/// Key that toggles the Y/Z axis swap.
pub const SWAP_AXES_KEY: KeyCode = KeyCode::KeyS;
/// Key that toggles texture display.
pub const SHOW_TEXTURE_KEY: KeyCode = KeyCode::KeyT;
/// Key that restores the initial view.
pub const RESET_KEY: KeyCode = KeyCode::KeyR;

/// Toggles flipped by the last [`ViewControls::update`].
///
/// Each field holds the new value when it changed, so the caller can forward
/// exactly those to the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlChanges {
    pub swap_axes: Option<bool>,
    pub show_texture: Option<bool>,
}

impl ControlChanges {
    pub fn is_empty(&self) -> bool {
        self.swap_axes.is_none() && self.show_texture.is_none()
    }
}

/// Interactive view state: the translation and the two rotation angles fed to
/// [`model_view_projection`], plus the draw-mode toggles.
///
/// Left-drag rotates the model (horizontal motion about Y, vertical about X),
/// the scroll wheel moves it toward or away from the camera.
///
/// # Example
/// ```ignore
/// let mut controls = ViewControls::new().distance(3.0).fov(60.0);
///
/// // In frame loop:
/// let changes = controls.update(&input);
/// if let Some(swap) = changes.swap_axes {
///     renderer.set_swap_axes(swap);
/// }
/// let mvp = controls.model_view_projection(gpu.aspect());
/// ```
#[derive(Clone, Debug)]
pub struct ViewControls {
    /// Model translation; the camera looks down -Z.
    pub translation: Vec3,
    /// Rotation about the model's X axis, in degrees.
    pub rotation_x: f32,
    /// Rotation about the model's Y axis, in degrees.
    pub rotation_y: f32,
    pub swap_axes: bool,
    pub show_texture: bool,
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// Radius of the model's bounding sphere, used to fit the depth range.
    pub model_radius: f32,
    /// Degrees of rotation per pixel dragged.
    pub sensitivity: f32,
    /// Distance moved per scroll line.
    pub zoom_sensitivity: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    home: (Vec3, f32, f32),
}

impl Default for ViewControls {
    fn default() -> Self {
        let translation = Vec3::new(0.0, 0.0, -3.0);
        Self {
            translation,
            rotation_x: 0.0,
            rotation_y: 0.0,
            swap_axes: false,
            show_texture: true,
            fov: 60.0,
            // half diagonal of a unit cube
            model_radius: 0.87,
            sensitivity: 0.4,
            zoom_sensitivity: 0.25,
            min_distance: 0.5,
            max_distance: 50.0,
            home: (translation, 0.0, 0.0),
        }
    }
}

impl ViewControls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the distance between the camera and the model.
    pub fn distance(mut self, distance: f32) -> Self {
        self.translation.z = -distance.clamp(self.min_distance, self.max_distance);
        self.home.0 = self.translation;
        self
    }

    /// Set the initial rotation angles in degrees.
    pub fn rotation(mut self, rotation_x: f32, rotation_y: f32) -> Self {
        self.rotation_x = rotation_x;
        self.rotation_y = rotation_y;
        self.home.1 = rotation_x;
        self.home.2 = rotation_y;
        self
    }

    /// Set the vertical field of view in degrees.
    pub fn fov(mut self, fov_degrees: f32) -> Self {
        self.fov = fov_degrees;
        self
    }

    pub fn model_radius(mut self, radius: f32) -> Self {
        self.model_radius = radius;
        self
    }

    pub fn swap_axes(mut self, enabled: bool) -> Self {
        self.swap_axes = enabled;
        self
    }

    pub fn show_texture(mut self, enabled: bool) -> Self {
        self.show_texture = enabled;
        self
    }

    /// Current camera-to-model distance.
    pub fn current_distance(&self) -> f32 {
        -self.translation.z
    }

    /// Applies this frame's input. Returns the toggles that flipped.
    pub fn update(&mut self, input: &Input) -> ControlChanges {
        let mut changes = ControlChanges::default();

        if input.mouse_down(MouseButton::Left) {
            let delta = input.mouse_delta();
            self.rotation_y = (self.rotation_y + delta.x * self.sensitivity).rem_euclid(360.0);
            self.rotation_x = (self.rotation_x + delta.y * self.sensitivity).rem_euclid(360.0);
        }

        let scroll = input.scroll_delta();
        if scroll.y != 0.0 {
            let distance = (self.current_distance() - scroll.y * self.zoom_sensitivity)
                .clamp(self.min_distance, self.max_distance);
            self.translation.z = -distance;
        }

        if input.key_pressed(SWAP_AXES_KEY) {
            self.swap_axes = !self.swap_axes;
            changes.swap_axes = Some(self.swap_axes);
        }
        if input.key_pressed(SHOW_TEXTURE_KEY) {
            self.show_texture = !self.show_texture;
            changes.show_texture = Some(self.show_texture);
        }
        if input.key_pressed(RESET_KEY) {
            self.reset_view();
        }

        changes
    }

    /// Restores the initial translation and rotation. Toggles are kept.
    pub fn reset_view(&mut self) {
        let (translation, rotation_x, rotation_y) = self.home;
        self.translation = translation;
        self.rotation_x = rotation_x;
        self.rotation_y = rotation_y;
    }

    /// Perspective projection with depth planes fitted around the model.
    pub fn projection(&self, aspect: f32) -> Mat4 {
        let (near, far) = framing_planes(self.current_distance(), self.model_radius);
        perspective(aspect, self.fov, near, far)
    }

    /// The matrix to hand to the renderer's draw call this frame.
    pub fn model_view_projection(&self, aspect: f32) -> Mat4 {
        model_view_projection(
            self.projection(aspect),
            self.translation,
            self.rotation_x,
            self.rotation_y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn horizontal_drag_turns_about_y() {
        let mut controls = ViewControls::new();
        let mut input = Input::new();
        input.simulate_drag(Vec2::ZERO, Vec2::new(100.0, 0.0));
        controls.update(&input);
        assert!((controls.rotation_y - 40.0).abs() < 1e-4);
        assert_eq!(controls.rotation_x, 0.0);
    }

    #[test]
    fn rotation_wraps_into_one_turn() {
        let mut controls = ViewControls::new().rotation(0.0, 0.0);
        let mut input = Input::new();
        input.simulate_drag(Vec2::ZERO, Vec2::new(0.0, -25.0));
        controls.update(&input);
        assert!((controls.rotation_x - 350.0).abs() < 1e-4);
    }

    #[test]
    fn scroll_zooms_within_limits() {
        let mut controls = ViewControls::new().distance(3.0);
        let mut input = Input::new();
        input.simulate_scroll(4.0);
        controls.update(&input);
        assert!((controls.current_distance() - 2.0).abs() < 1e-5);

        input.simulate_scroll(1000.0);
        controls.update(&input);
        assert_eq!(controls.current_distance(), controls.min_distance);
    }

    #[test]
    fn keys_toggle_and_report_changes() {
        let mut controls = ViewControls::new();
        let mut input = Input::new();

        input.simulate_key(SWAP_AXES_KEY);
        let changes = controls.update(&input);
        assert_eq!(changes.swap_axes, Some(true));
        assert_eq!(changes.show_texture, None);

        input.begin_frame();
        input.simulate_key(SHOW_TEXTURE_KEY);
        let changes = controls.update(&input);
        assert_eq!(changes.show_texture, Some(false));
        assert!(controls.swap_axes);

        input.begin_frame();
        assert!(controls.update(&input).is_empty());
    }

    #[test]
    fn reset_restores_home_view() {
        let mut controls = ViewControls::new().distance(4.0).rotation(10.0, 20.0);
        controls.rotation_x = 90.0;
        controls.translation = Vec3::new(1.0, 1.0, -9.0);
        controls.swap_axes = true;

        let mut input = Input::new();
        input.simulate_key(RESET_KEY);
        controls.update(&input);

        assert_eq!(controls.translation, Vec3::new(0.0, 0.0, -4.0));
        assert_eq!((controls.rotation_x, controls.rotation_y), (10.0, 20.0));
        assert!(controls.swap_axes);
    }

    #[test]
    fn mvp_places_model_center_mid_depth() {
        let controls = ViewControls::new().distance(3.0).model_radius(1.0);
        let mvp = controls.model_view_projection(1.0);
        let center = mvp.project_point3(Vec3::ZERO);
        assert!(center.x.abs() < 1e-5 && center.y.abs() < 1e-5);
        assert!(center.z > 0.0 && center.z < 1.0);
    }
}
