use glam::Mat4;

/// Smallest near plane distance [`framing_planes`] will return.
pub const MIN_NEAR: f32 = 0.001;

/// Right-handed perspective projection with a `[0, 1]` depth range.
///
/// The camera looks down -Z, so visible geometry needs a negative Z
/// translation.
pub fn perspective(aspect: f32, fov_y_degrees: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh(fov_y_degrees.to_radians(), aspect, near, far)
}

/// Near and far planes that tightly enclose a model of bounding `radius`
/// centered `distance` units in front of the camera.
///
/// Tight planes spread the model across the whole depth range, which is
/// what the depth-tinted fallback shading shows.
pub fn framing_planes(distance: f32, radius: f32) -> (f32, f32) {
    let near = (distance - radius).max(MIN_NEAR);
    let far = (distance + radius).max(near + MIN_NEAR);
    (near, far)
}
