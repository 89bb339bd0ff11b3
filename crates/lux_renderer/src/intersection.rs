//! Result of a ray/geometry intersection test.

use crate::sampling::cosine_sample_hemisphere;
use lux_math::Vec3;
use rand::RngCore;

/// Where a ray hit a surface.
///
/// `distance` is the ray parameter of the hit, or `f32::INFINITY` when the
/// ray missed. `position` and `normal` mean nothing for a miss.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Point of intersection
    pub position: Vec3,
    /// Unit surface normal, pointing out of the surface
    pub normal: Vec3,
    /// Ray parameter t of the hit
    pub distance: f32,
}

impl Intersection {
    /// The no-hit value.
    pub const MISS: Intersection = Intersection {
        position: Vec3::ZERO,
        normal: Vec3::ZERO,
        distance: f32::INFINITY,
    };

    /// Create a hit record.
    pub fn new(position: Vec3, normal: Vec3, distance: f32) -> Self {
        Self {
            position,
            normal,
            distance,
        }
    }

    /// Whether this records an actual hit.
    #[inline]
    pub fn is_hit(&self) -> bool {
        self.distance < f32::INFINITY
    }

    /// This record with the normal flipped, if needed, to face against `direction`.
    ///
    /// One-sided scattering uses it so that a surface hit from behind still
    /// bounces light back to the side the ray came from.
    #[inline]
    pub fn facing(&self, direction: Vec3) -> Intersection {
        if self.normal.dot(direction) > 0.0 {
            Intersection {
                normal: -self.normal,
                ..*self
            }
        } else {
            *self
        }
    }

    /// Draw a direction in the hemisphere around `normal`, cosine-weighted.
    ///
    /// Diffuse scattering uses this; the cosine weighting cancels the
    /// Lambertian cosine term, so the path weight is just the albedo.
    pub fn sample_hemisphere(&self, rng: &mut dyn RngCore) -> Vec3 {
        cosine_sample_hemisphere(self.normal, rng)
    }
}

impl Default for Intersection {
    fn default() -> Self {
        Self::MISS
    }
}
