//! Pinhole camera for ray generation.

use crate::sample_unit_square;
use lux_math::{Mat4, Ray, Vec3};
use rand::RngCore;

/// Camera for generating rays into the scene.
///
/// Configure with the `with_*` builders, then call [`Camera::initialize`]
/// before generating rays. Pixel (0, 0) is the top-left corner.
#[derive(Debug, Clone)]
pub struct Camera {
    // Image settings
    pub image_width: u32,
    pub image_height: u32,

    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    vfov: f32, // Vertical field of view in degrees

    // Cached computed values (set by initialize())
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    w: Vec3,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            image_width: 320,
            image_height: 240,
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 45.0,
            pixel00_loc: Vec3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
            w: Vec3::Z,
        }
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }

    /// Set vertical field of view in degrees.
    pub fn with_fov(mut self, vfov: f32) -> Self {
        self.vfov = vfov;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Place the camera with a transform. In camera space it sits at the
    /// origin looking down -Z with +Y up.
    pub fn with_transform(self, transform: Mat4) -> Self {
        let look_from = transform.transform_point3(Vec3::ZERO);
        let forward = transform.transform_vector3(-Vec3::Z);
        let vup = transform.transform_vector3(Vec3::Y);
        self.with_position(look_from, look_from + forward, vup)
    }

    /// Initialize the camera (must be called before generating rays).
    pub fn initialize(&mut self) {
        // Viewport one unit in front of the camera
        let h = (self.vfov.to_radians() / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = viewport_height * (self.image_width as f32 / self.image_height as f32);

        // Camera basis vectors
        self.w = (self.look_from - self.look_at).normalize();
        let u = self.vup.cross(self.w).normalize();
        let v = self.w.cross(u);

        // Rows run top to bottom
        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;

        self.pixel_delta_u = viewport_u / self.image_width as f32;
        self.pixel_delta_v = viewport_v / self.image_height as f32;

        let viewport_upper_left = self.look_from - self.w - viewport_u / 2.0 - viewport_v / 2.0;
        self.pixel00_loc = viewport_upper_left + 0.5 * (self.pixel_delta_u + self.pixel_delta_v);
    }

    /// Generate a ray through a random point of pixel (i, j).
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let (dx, dy) = sample_unit_square(rng);

        let pixel_sample = self.pixel00_loc
            + ((i as f32) + dx) * self.pixel_delta_u
            + ((j as f32) + dy) * self.pixel_delta_v;

        Ray::new(self.look_from, pixel_sample - self.look_from)
    }

    /// Direction the camera looks in.
    pub fn forward(&self) -> Vec3 {
        -self.w
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lux_math::translate_rotate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_center_ray_looks_forward() {
        let mut camera = Camera::new()
            .with_resolution(101, 101)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y);
        camera.initialize();
        let mut rng = StdRng::seed_from_u64(42);

        let dir = camera.get_ray(50, 50, &mut rng).direction.normalize();
        // Within half a pixel of straight ahead
        assert!(dir.dot(-Vec3::Z) > 0.9999);
    }

    #[test]
    fn test_top_left_pixel_is_up_and_left() {
        let mut camera = Camera::new()
            .with_resolution(100, 50)
            .with_fov(90.0);
        camera.initialize();
        let mut rng = StdRng::seed_from_u64(42);

        let ray = camera.get_ray(0, 0, &mut rng);
        assert!(ray.direction.x < 0.0);
        assert!(ray.direction.y > 0.0);
        assert_eq!(ray.origin, Vec3::ZERO);
    }

    #[test]
    fn test_fov_edges() {
        // 90 degree vertical fov: the top edge is at 45 degrees
        let mut camera = Camera::new().with_resolution(2, 2).with_fov(90.0);
        camera.initialize();

        let top = camera.pixel00_loc - 0.5 * camera.pixel_delta_v;
        assert!((top.y - 1.0).abs() < 1e-5);
        assert!((top.z + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_transform_placement() {
        let transform = translate_rotate(Vec3::new(0.0, 1.0, 8.0), 90.0, Vec3::Y);
        let mut camera = Camera::new().with_transform(transform);
        camera.initialize();
        let mut rng = StdRng::seed_from_u64(0);

        assert!((camera.forward() - (-Vec3::X)).length() < 1e-5);
        let ray = camera.get_ray(160, 120, &mut rng);
        assert!((ray.origin - Vec3::new(0.0, 1.0, 8.0)).length() < 1e-5);
        assert!(ray.direction.normalize().dot(-Vec3::X) > 0.99);
    }
}
