//! Triangle primitive.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::{AreaLight, Geom, Intersection, Material, T_EPSILON};
use lux_math::{Aabb, Ray, Vec3};
use std::sync::Arc;

/// A single-sided-normal triangle.
///
/// The normal follows the winding: `(v1 - v0) x (v2 - v0)`. It is reported
/// as-is for hits from either side, the same outward convention spheres use.
pub struct Triangle {
    v0: Vec3,
    edge1: Vec3,
    edge2: Vec3,
    normal: Vec3,
    material: Arc<dyn Material>,
    light: Option<Arc<AreaLight>>,
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<dyn Material>) -> Self {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let normal = edge1.cross(edge2).normalize();

        // from_points pads flat axes
        let bbox = Aabb::from_points(v0.min(v1).min(v2), v0.max(v1).max(v2));

        Self {
            v0,
            edge1,
            edge2,
            normal,
            material,
            light: None,
            bbox,
        }
    }

    /// Attach an area light to this triangle.
    pub fn with_light(mut self, light: Arc<AreaLight>) -> Self {
        self.light = Some(light);
        self
    }
}

impl Geom for Triangle {
    fn intersect(&self, ray: &Ray) -> Intersection {
        let h = ray.direction.cross(self.edge2);
        let det = self.edge1.dot(h);

        // Ray is parallel to the triangle plane
        if det.abs() < 1e-8 {
            return Intersection::MISS;
        }

        let inv_det = 1.0 / det;
        let s = ray.origin - self.v0;
        let u = inv_det * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return Intersection::MISS;
        }

        let q = s.cross(self.edge1);
        let v = inv_det * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return Intersection::MISS;
        }

        let t = inv_det * self.edge2.dot(q);
        if t <= T_EPSILON {
            return Intersection::MISS;
        }

        Intersection::new(ray.at(t), self.normal, t)
    }

    fn bounds(&self) -> Aabb {
        self.bbox
    }

    fn material(&self) -> &Arc<dyn Material> {
        &self.material
    }

    fn light(&self) -> Option<&Arc<AreaLight>> {
        self.light.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Diffuse};

    fn xy_triangle(z: f32) -> Triangle {
        Triangle::new(
            Vec3::new(-1.0, -1.0, z),
            Vec3::new(1.0, -1.0, z),
            Vec3::new(0.0, 1.0, z),
            Arc::new(Diffuse::new(Color::splat(0.5))),
        )
    }

    #[test]
    fn test_triangle_hit() {
        let tri = xy_triangle(-1.0);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);

        let isect = tri.intersect(&ray);
        assert!(isect.is_hit());
        assert!((isect.distance - 1.0).abs() < 1e-5);
        assert!((isect.position - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
        // Counter-clockwise in XY: normal is +Z
        assert!((isect.normal - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_triangle_hit_from_behind_keeps_normal() {
        let tri = xy_triangle(-1.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::Z);

        let isect = tri.intersect(&ray);
        assert!((isect.distance - 2.0).abs() < 1e-5);
        assert!((isect.normal - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_triangle_miss_outside() {
        let tri = xy_triangle(-1.0);
        let ray = Ray::new(Vec3::new(2.0, 2.0, 0.0), -Vec3::Z);

        assert!(!tri.intersect(&ray).is_hit());
    }

    #[test]
    fn test_triangle_miss_behind_and_parallel() {
        let tri = xy_triangle(-1.0);

        // Pointing away
        assert!(!tri.intersect(&Ray::new(Vec3::ZERO, Vec3::Z)).is_hit());
        // In the plane's direction
        assert!(!tri.intersect(&Ray::new(Vec3::ZERO, Vec3::X)).is_hit());
    }

    #[test]
    fn test_triangle_bounds_padded() {
        let tri = xy_triangle(-1.0);
        let bounds = tri.bounds();

        assert_eq!(bounds.x.min, -1.0);
        assert_eq!(bounds.y.max, 1.0);
        assert!(bounds.z.size() > 0.0);
        assert!(bounds.z.contains(-1.0));
    }
}
