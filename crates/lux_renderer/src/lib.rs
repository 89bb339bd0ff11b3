//! LUX Renderer - CPU light transport
//!
//! A Monte Carlo path tracer. The core is two open interfaces:
//! [`Geom`] finds the nearest intersection of a ray with a shape and
//! [`Material`] turns an incoming ray and an intersection into the next
//! segment of the light path.
//!
//! Around the core sit the BVH, the camera, the bounce loop, bucketed
//! parallel rendering and world assembly from a `lux_core::Scene`.

mod ray;
mod intersection;
mod sampling;
mod geom;
mod material;
mod light;
mod sphere;
mod triangle;
mod camera;
mod bvh;
mod renderer;
mod bucket;
mod world;

pub use ray::LightRay;
pub use intersection::Intersection;
pub use sampling::{cosine_sample_hemisphere, gen_f32, sample_unit_square};
pub use geom::{Aggregate, Geom, GeomList, Hit, T_EPSILON};
pub use material::{Absorber, Color, Diffuse, Fresnel, Material, Mirror, RAY_BIAS};
pub use light::AreaLight;
pub use sphere::Sphere;
pub use triangle::Triangle;
pub use camera::Camera;
pub use bvh::BvhNode;
pub use renderer::{
    color_to_rgba, render, render_pixel, trace_path, ImageBuffer, RenderConfig, RenderError,
    RenderResult,
};
pub use bucket::{generate_buckets, render_bucket, render_buckets, Bucket, BucketResult};
pub use world::{build_camera, build_world, render_config, World};

/// Re-export Vec3 and common math types from lux_math
pub use lux_math::{Aabb, Interval, Ray, Vec3};
