//! Fixed coordinate conversions between the editor and the game.

use glam::Mat4;

/// Rotation of -90 degrees about X, taking the editor's Z-up frame to the game's Y-up frame.
pub const AXIS_CORRECTION: Mat4 = Mat4::from_cols_array(&[
    1.0, 0.0, 0.0, 0.0, //
    0.0, 0.0, -1.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 0.0, 1.0, //
]);

/// Apply [`AXIS_CORRECTION`] to a point or direction.
///
/// Written as a swizzle so components are moved, never rounded.
#[inline]
pub fn to_game_frame([x, y, z]: [f32; 3]) -> [f32; 3] {
    [x, z, -y]
}

/// Flip a texture coordinate from the editor's bottom-left origin to the game's top-left origin.
#[inline]
pub fn flip_v([u, v]: [f32; 2]) -> [f32; 2] {
    [u, 1.0 - v]
}
