//! Core path tracing loop.
//!
//! Implements Monte Carlo path tracing with:
//! - Iterative bouncing with a depth limit and Russian roulette
//! - Emission from area lights and a constant background
//! - Anti-aliasing via jittered multi-sampling
//! - Gamma-corrected 8-bit output

use crate::{gen_f32, Aggregate, Camera, Color, LightRay};
use lux_math::{Interval, Ray};
use rand::RngCore;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while producing an image.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Image buffer does not match its {width}x{height} size")]
    InvalidImage { width: u32, height: u32 },
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum number of bounces per path
    pub max_depth: u32,
    /// Bounces before Russian roulette may end a path
    pub russian_roulette_depth: u32,
    /// Radiance of rays that leave the scene
    pub background: Color,
    /// Seed for the per-bucket generators
    pub seed: u64,
    /// Edge length of render buckets in pixels
    pub bucket_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 64,
            max_depth: 16,
            russian_roulette_depth: 4,
            background: Color::ZERO,
            seed: 0,
            bucket_size: 32,
        }
    }
}

/// Follow one light path from a camera ray and return the radiance it carries back.
pub fn trace_path(
    world: &dyn Aggregate,
    ray: Ray,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let mut path = LightRay::from_ray(ray);
    let mut radiance = Color::ZERO;

    for bounce in 0..config.max_depth {
        let Some(hit) = world.hit(&path.ray()) else {
            // Escaped the scene
            radiance += path.color * config.background;
            break;
        };

        if let Some(light) = hit.geom.light() {
            radiance += path.color * light.emitted();
        }

        path = hit.geom.material().propagate(&path, &hit.isect, rng);

        // Absorbed
        if path.color.max_element() <= 0.0 {
            break;
        }

        if bounce + 1 >= config.russian_roulette_depth {
            let survival = path.color.max_element().clamp(0.05, 1.0);
            if gen_f32(rng) >= survival {
                break;
            }
            path.color /= survival;
        }
    }

    radiance
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let channel = |c: f32| (255.0 * Interval::UNIT.clamp(linear_to_gamma(c))) as u8;
    [channel(color.x), channel(color.y), channel(color.z), 255]
}

/// Render a single pixel with multi-sampling.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Aggregate,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let mut pixel_color = Color::ZERO;

    for _ in 0..config.samples_per_pixel {
        let ray = camera.get_ray(x, y, rng);
        pixel_color += trace_path(world, ray, config, rng);
    }

    pixel_color / config.samples_per_pixel as f32
}

/// Linear-color image, row-major from the top-left pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| color_to_rgba(*c)).collect()
    }

    /// Write the image as an 8-bit PNG.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> RenderResult<()> {
        let path = path.as_ref();
        let image = image::RgbaImage::from_raw(self.width, self.height, self.to_rgba()).ok_or(
            RenderError::InvalidImage {
                width: self.width,
                height: self.height,
            },
        )?;

        image.save_with_format(path, image::ImageFormat::Png)?;
        log::info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

/// Render the entire image on the calling thread.
///
/// [`render_buckets`](crate::render_buckets) is the parallel version.
pub fn render(
    camera: &Camera,
    world: &dyn Aggregate,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> ImageBuffer {
    let mut image = ImageBuffer::new(camera.image_width, camera.image_height);

    for y in 0..camera.image_height {
        for x in 0..camera.image_width {
            let color = render_pixel(camera, world, x, y, config, rng);
            image.set(x, y, color);
        }
    }

    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AreaLight, Diffuse, Geom, GeomList, Material, Sphere, Vec3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn config() -> RenderConfig {
        RenderConfig {
            samples_per_pixel: 4,
            max_depth: 8,
            ..Default::default()
        }
    }

    fn one_sphere(material: Arc<dyn Material>, light: Option<AreaLight>) -> GeomList {
        let mut sphere = Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0, material);
        if let Some(light) = light {
            sphere = sphere.with_light(Arc::new(light));
        }
        [Arc::new(sphere) as Arc<dyn Geom>].into_iter().collect()
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 1e-4);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_color_to_rgba_clamps() {
        assert_eq!(color_to_rgba(Color::new(4.0, 0.25, -1.0)), [255, 127, 0, 255]);
    }

    #[test]
    fn test_escaping_ray_sees_background() {
        let world = GeomList::new();
        let config = RenderConfig {
            background: Color::new(0.5, 0.7, 1.0),
            ..config()
        };
        let mut rng = StdRng::seed_from_u64(42);

        let color = trace_path(&world, Ray::new(Vec3::ZERO, -Vec3::Z), &config, &mut rng);
        assert_eq!(color, config.background);
    }

    #[test]
    fn test_light_seen_directly() {
        // A black emitter: the path is absorbed right after collecting emission
        let world = one_sphere(
            Arc::new(Diffuse::new(Color::ZERO)),
            Some(AreaLight::new(Color::ONE, 3.0)),
        );
        let mut rng = StdRng::seed_from_u64(42);

        let color = trace_path(&world, Ray::new(Vec3::ZERO, -Vec3::Z), &config(), &mut rng);
        assert_eq!(color, Color::splat(3.0));
    }

    #[test]
    fn test_white_furnace_converges_to_background() {
        // A white diffuse sphere under a uniform sky reflects the sky unchanged
        let world = one_sphere(Arc::new(Diffuse::new(Color::ONE)), None);
        let config = RenderConfig {
            max_depth: 64,
            russian_roulette_depth: 64,
            background: Color::ONE,
            ..config()
        };
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..200 {
            let color = trace_path(&world, Ray::new(Vec3::ZERO, -Vec3::Z), &config, &mut rng);
            assert!((color - Color::ONE).abs().max_element() < 1e-5);
        }
    }

    #[test]
    fn test_max_depth_bounds_path() {
        // Camera inside a mirror sphere never escapes
        let world: GeomList = [Arc::new(Sphere::new(
            Vec3::ZERO,
            5.0,
            Arc::new(crate::Mirror::new(Color::ONE)),
        )) as Arc<dyn Geom>]
        .into_iter()
        .collect();
        let config = RenderConfig {
            background: Color::ONE,
            ..config()
        };
        let mut rng = StdRng::seed_from_u64(1);

        let color = trace_path(&world, Ray::new(Vec3::ZERO, Vec3::X), &config, &mut rng);
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_render_small_image() {
        let world = one_sphere(
            Arc::new(Diffuse::new(Color::splat(0.5))),
            Some(AreaLight::new(Color::ONE, 1.0)),
        );
        let mut camera = Camera::new().with_resolution(8, 6).with_fov(60.0);
        camera.initialize();
        let mut rng = StdRng::seed_from_u64(42);

        let image = render(&camera, &world, &config(), &mut rng);

        assert_eq!(image.pixels.len(), 48);
        assert_eq!(image.to_rgba().len(), 48 * 4);
        // Center sees the emitter, the corner sees black background
        assert!(image.get(4, 3).length() > 0.0);
        assert_eq!(image.get(0, 0), Color::ZERO);
    }

    #[test]
    fn test_save_png_round_trip_size() {
        let mut image = ImageBuffer::new(3, 2);
        image.set(1, 1, Color::ONE);

        let path = std::env::temp_dir().join(format!("lux_test_{}.png", std::process::id()));
        image.save_png(&path).unwrap();

        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.dimensions(), (3, 2));
        assert_eq!(loaded.get_pixel(1, 1).0, [255, 255, 255, 255]);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_pixel_index_does_not_wrap_in_u32() {
        // 70000 * 70000 overflows u32; the row offset must not wrap
        let image = ImageBuffer {
            width: 70_000,
            height: 70_000,
            pixels: Vec::new(),
        };

        assert_eq!(image.index(0, 69_999), 69_999 * 70_000);
        assert_eq!(image.index(5, 1), 70_005);
    }

    #[test]
    fn test_save_png_rejects_bad_buffer() {
        let mut image = ImageBuffer::new(2, 2);
        image.pixels.pop();

        assert!(matches!(
            image.save_png(std::env::temp_dir().join("lux_bad.png")),
            Err(RenderError::InvalidImage { width: 2, height: 2 })
        ));
    }
}
