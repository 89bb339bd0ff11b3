//! Light ray type for path tracing.
//!
//! A light ray is one segment of a light path: a geometric ray plus the
//! color weight the path has accumulated so far.

use crate::Color;
use lux_math::{Ray, Vec3};

/// A path segment with origin, direction and carried color.
///
/// `color` is an RGB weight, multiplied componentwise at every bounce. It is
/// not clamped: importance-sampling weights can push it above one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRay {
    /// Origin point of the segment
    pub origin: Vec3,
    /// Direction vector (not necessarily normalized)
    pub direction: Vec3,
    /// Color weight carried by the path
    pub color: Color,
}

impl LightRay {
    /// Create a new light ray.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3, color: Color) -> Self {
        Self {
            origin,
            direction,
            color,
        }
    }

    /// Start a path along a camera ray with full weight.
    #[inline]
    pub fn from_ray(ray: Ray) -> Self {
        Self::new(ray.origin, ray.direction, Color::ONE)
    }

    /// Copy of this ray with a unit-length direction.
    #[inline]
    pub fn unit(&self) -> Self {
        Self {
            direction: self.direction.normalize(),
            ..*self
        }
    }

    /// Geometric ray for intersection tests.
    #[inline]
    pub fn ray(&self) -> Ray {
        Ray::new(self.origin, self.direction)
    }

    /// Point along the segment at parameter t.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_ray_unit() {
        let ray = LightRay::new(Vec3::ONE, Vec3::new(0.0, 3.0, 4.0), Color::splat(0.5));
        let unit = ray.unit();

        assert!((unit.direction.length() - 1.0).abs() < 1e-6);
        assert!((unit.direction - Vec3::new(0.0, 0.6, 0.8)).length() < 1e-6);
        // Only the direction changes
        assert_eq!(unit.origin, ray.origin);
        assert_eq!(unit.color, ray.color);
    }

    #[test]
    fn test_light_ray_geometry() {
        let ray = LightRay::from_ray(Ray::new(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)));

        assert_eq!(ray.color, Color::ONE);
        assert_eq!(ray.at(1.5), Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(ray.ray().at(1.5), ray.at(1.5));
    }
}
