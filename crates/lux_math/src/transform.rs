// Rigid transforms for placing cameras.
//
// A transform is a glam::Mat4; glam already provides transform_point3(),
// transform_vector3() and inverse().

use glam::{Mat4, Vec3};

/// Build `translation * rotation` from a translation and an angle/axis rotation.
///
/// The angle is in degrees. A zero-length axis yields no rotation.
pub fn translate_rotate(translate: Vec3, angle_degrees: f32, axis: Vec3) -> Mat4 {
    let rotation = match axis.try_normalize() {
        Some(axis) => Mat4::from_axis_angle(axis, angle_degrees.to_radians()),
        None => Mat4::IDENTITY,
    };

    Mat4::from_translation(translate) * rotation
}
