//! Model-view-projection composition.
//!
//! The viewer drives the mesh with two rotation angles and a translation. This
//! module turns those values into the single matrix the vertex stage consumes:
//!
//! ```text
//! mvp = projection * T(tx, ty, tz) * Ry(rot_y) * Rx(rot_x)
//! ```
//!
//! The rotation-translation part is written out by hand as a single
//! column-major literal, following the manual `T * Ry * Rx` composition
//! entry by entry. Tests check it against glam's matrix products.
//!
//! # Example
//!
//! ```
//! use meshview::{Mat4, Vec3, model_view_projection};
//!
//! let mvp = model_view_projection(Mat4::IDENTITY, Vec3::new(1.0, 2.0, 3.0), 0.0, 0.0);
//! assert_eq!(mvp.w_axis.to_array(), [1.0, 2.0, 3.0, 1.0]);
//! ```

use glam::{Mat4, Vec3};

/// Builds the combined transform for a mesh rotated about its local X and Y
/// axes (angles in degrees) and then translated.
///
/// The rotation about X is applied first, then the rotation about Y, then the
/// translation, then `projection`. Angles are converted to radians once and
/// only the converted values feed the trigonometry.
///
/// Non-finite inputs are not checked; they propagate into the result.
pub fn model_view_projection(
    projection: Mat4,
    translation: Vec3,
    rotation_x_degrees: f32,
    rotation_y_degrees: f32,
) -> Mat4 {
    projection * rotation_translation(translation, rotation_x_degrees, rotation_y_degrees)
}

/// Returns `T * Ry * Rx` as a column-major matrix.
pub fn rotation_translation(
    translation: Vec3,
    rotation_x_degrees: f32,
    rotation_y_degrees: f32,
) -> Mat4 {
    let (sx, cx) = rotation_x_degrees.to_radians().sin_cos();
    let (sy, cy) = rotation_y_degrees.to_radians().sin_cos();

    // Ry * Rx, column by column
    Mat4::from_cols_array(&[
        cy,
        0.0,
        -sy,
        0.0,
        sy * sx,
        cx,
        cy * sx,
        0.0,
        sy * cx,
        -sx,
        cy * cx,
        0.0,
        translation.x,
        translation.y,
        translation.z,
        1.0,
    ])
}
