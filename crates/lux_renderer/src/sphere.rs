//! Sphere primitive.

use crate::{AreaLight, Geom, Intersection, Material, T_EPSILON};
use lux_math::{Aabb, Ray, Vec3};
use std::sync::Arc;

/// A sphere given by its center and radius.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<dyn Material>,
    light: Option<Arc<AreaLight>>,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere.
    ///
    /// The radius must be positive; scene loading rejects anything else.
    pub fn new(center: Vec3, radius: f32, material: Arc<dyn Material>) -> Self {
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            material,
            light: None,
            bbox,
        }
    }

    /// Attach an area light to this sphere.
    pub fn with_light(mut self, light: Arc<AreaLight>) -> Self {
        self.light = Some(light);
        self
    }

    fn hit_at(&self, ray: &Ray, t: f32) -> Intersection {
        let position = ray.at(t);
        let normal = (position - self.center).normalize();
        Intersection::new(position, normal, t)
    }
}

impl Geom for Sphere {
    fn intersect(&self, ray: &Ray) -> Intersection {
        // Substitute the ray into |P - center|^2 = r^2. With b = d·(o - c)
        // the factor of two cancels: t = (-b ± sqrt(b^2 - a·c)) / a.
        let diff = ray.origin - self.center;
        let a = ray.direction.length_squared();
        let b = ray.direction.dot(diff);
        let c = diff.length_squared() - self.radius * self.radius;

        let discriminant = b * b - a * c;
        if discriminant <= 0.0 {
            return Intersection::MISS;
        }

        let sqrtd = discriminant.sqrt();

        // Near root first, so the closest hit wins.
        let near = (-b - sqrtd) / a;
        if near > T_EPSILON {
            return self.hit_at(ray, near);
        }

        // Origin inside the sphere (or on its surface): take the exit point.
        let far = (-b + sqrtd) / a;
        if far > T_EPSILON {
            return self.hit_at(ray, far);
        }

        // Sphere is behind the ray.
        Intersection::MISS
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
