//! Random sampling helpers.
//!
//! Every function takes the generator explicitly. Workers own their
//! generator, nothing here touches global or thread-local state.

use lux_math::Vec3;
use rand::{Rng, RngCore};
use std::f32::consts::TAU;

/// Uniform f32 in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Cosine-weighted direction in the hemisphere around `normal`.
///
/// Malley's method: a uniform point on the unit disk is lifted onto the
/// hemisphere. `normal` must be unit length; the result is unit length and
/// `dot(result, normal) >= 0`.
pub fn cosine_sample_hemisphere(normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let r1 = gen_f32(rng);
    let r2 = gen_f32(rng);

    let phi = TAU * r1;
    let r = r2.sqrt();
    let (sin_phi, cos_phi) = phi.sin_cos();
    let z = (1.0 - r2).max(0.0).sqrt();

    let (tangent, bitangent) = normal.any_orthonormal_pair();
    (tangent * (r * cos_phi) + bitangent * (r * sin_phi) + normal * z).normalize()
}

/// Random offset in [-0.5, 0.5) x [-0.5, 0.5) for jittering inside a pixel.
pub fn sample_unit_square(rng: &mut dyn RngCore) -> (f32, f32) {
    (gen_f32(rng) - 0.5, gen_f32(rng) - 0.5)
}
