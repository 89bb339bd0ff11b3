//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that are rendered independently
//! and in parallel using rayon. Every bucket draws from its own generator
//! seeded from the render seed and the bucket index, so the image does not
//! depend on thread scheduling.

use crate::renderer::render_pixel;
use crate::{Aggregate, Camera, Color, ImageBuffer, RenderConfig};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use std::time::Instant;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    /// Create a new bucket.
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self { x, y, width, height, index }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Seed for this bucket's generator.
    fn seed(&self, render_seed: u64) -> u64 {
        render_seed ^ (self.index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }
}

/// Generate buckets for an image, sorted in spiral order from center.
///
/// Buckets near the center come first so the interesting part of the frame
/// finishes early.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let bucket_size = bucket_size.max(1);
    let mut buckets = Vec::new();

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, buckets.len()));
            x += bucket_size;
        }
        y += bucket_size;
    }

    sort_spiral(&mut buckets, width, height);

    // Indices follow render order
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from the image center. The sort is stable,
/// so equidistant buckets keep scanline order.
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    let distance = |b: &Bucket| {
        let dx = b.x as f32 + b.width as f32 / 2.0 - center_x;
        let dy = b.y as f32 + b.height as f32 / 2.0 - center_y;
        dx * dx + dy * dy
    };

    buckets.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
}

/// Render a single bucket to a vector of colors.
///
/// Returns pixels in row-major order within the bucket.
pub fn render_bucket(
    bucket: &Bucket,
    camera: &Camera,
    world: &dyn Aggregate,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Vec<Color> {
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let global_x = bucket.x + local_x;
            let global_y = bucket.y + local_y;
            pixels.push(render_pixel(camera, world, global_x, global_y, config, rng));
        }
    }

    pixels
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    /// The bucket that was rendered
    pub bucket: Bucket,
    /// Pixel colors in row-major order
    pub pixels: Vec<Color>,
}

impl BucketResult {
    /// Create a new bucket result.
    pub fn new(bucket: Bucket, pixels: Vec<Color>) -> Self {
        Self { bucket, pixels }
    }

    /// Copy the bucket's pixels into place.
    pub fn write_into(&self, image: &mut ImageBuffer) {
        let mut pixels = self.pixels.iter();
        for local_y in 0..self.bucket.height {
            for local_x in 0..self.bucket.width {
                if let Some(&color) = pixels.next() {
                    image.set(self.bucket.x + local_x, self.bucket.y + local_y, color);
                }
            }
        }
    }
}

/// Render the whole image in parallel on the current rayon pool.
pub fn render_buckets(
    camera: &Camera,
    world: &dyn Aggregate,
    config: &RenderConfig,
) -> ImageBuffer {
    let buckets = generate_buckets(camera.image_width, camera.image_height, config.bucket_size);
    log::info!(
        "Rendering {}x{} at {} spp in {} buckets on {} threads",
        camera.image_width,
        camera.image_height,
        config.samples_per_pixel,
        buckets.len(),
        rayon::current_num_threads()
    );
    let start = Instant::now();

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            let mut rng = StdRng::seed_from_u64(bucket.seed(config.seed));
            let pixels = render_bucket(bucket, camera, world, config, &mut rng);
            log::debug!(
                "Bucket {} ({}, {}) {}x{} done",
                bucket.index,
                bucket.x,
                bucket.y,
                bucket.width,
                bucket.height
            );
            BucketResult::new(*bucket, pixels)
        })
        .collect();

    let mut image = ImageBuffer::new(camera.image_width, camera.image_height);
    for result in &results {
        result.write_into(&mut image);
    }

    log::info!("Render finished in {:.2?}", start.elapsed());
    image
}
