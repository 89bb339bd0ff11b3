//! Material trait for surface scattering.

use crate::{gen_f32, Intersection, LightRay};
use lux_math::Vec3;
use rand::RngCore;

/// Color type alias (RGB, linear, unbounded)
pub type Color = Vec3;

/// Distance a scattered ray's origin is pushed along its direction.
///
/// Keeps floating-point error from re-hitting the surface just left.
pub const RAY_BIAS: f32 = 0.01;

/// Refraction vectors shorter than this mean total internal reflection.
const NEARLY_ZERO: f32 = 1e-6;

/// Index of refraction of the medium outside every dielectric.
const IOR_VACUUM: f32 = 1.0;

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Produce the next segment of a light path after `incoming` hit a surface.
    ///
    /// The returned ray starts just off `isect.position` (see [`RAY_BIAS`])
    /// and carries the updated path color. Consumes entropy from `rng` and
    /// has no other side effects.
    fn propagate(
        &self,
        incoming: &LightRay,
        isect: &Intersection,
        rng: &mut dyn RngCore,
    ) -> LightRay;
}

/// Continue a path from `isect` along `direction`.
#[inline]
fn scattered(isect: &Intersection, direction: Vec3, color: Color) -> LightRay {
    LightRay::new(isect.position + direction * RAY_BIAS, direction, color)
}

/// Ideal diffuse (Lambertian) material.
#[derive(Debug, Clone)]
pub struct Diffuse {
    color: Color,
}

impl Diffuse {
    /// Create a new diffuse material with the given albedo.
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Material for Diffuse {
    fn propagate(
        &self,
        incoming: &LightRay,
        isect: &Intersection,
        rng: &mut dyn RngCore,
    ) -> LightRay {
        let direction = isect.facing(incoming.direction).sample_hemisphere(rng);
        scattered(isect, direction, incoming.color * self.color)
    }
}

/// Smooth dielectric boundary (glass, water).
///
/// Reflects or refracts by Schlick's approximation of the Fresnel terms,
/// choosing one branch per event and reweighting by its probability.
/// Assumes closed, non-nested geometry with outward normals: a ray is
/// exiting exactly when it travels along the normal.
#[derive(Debug, Clone)]
pub struct Fresnel {
    /// Ratio of indices when going from vacuum into the material
    eta_entering: f32,
    /// Ratio of indices when going from the material into vacuum
    eta_exiting: f32,
    /// Reflectance at normal incidence
    r0: f32,
}

impl Fresnel {
    /// Create a new dielectric with index of refraction `ior` (1.5 = glass).
    pub fn new(ior: f32) -> Self {
        let r0 = (IOR_VACUUM - ior) / (IOR_VACUUM + ior);

        Self {
            eta_entering: IOR_VACUUM / ior,
            eta_exiting: ior / IOR_VACUUM,
            r0: r0 * r0,
        }
    }

    /// Schlick's approximation: `r0 + (1 - r0)(1 - cos)^5`.
    #[inline]
    fn reflectance(&self, one_minus_cos: f32) -> f32 {
        self.r0 + (1.0 - self.r0) * one_minus_cos.powi(5)
    }
}

impl Material for Fresnel {
    fn propagate(
        &self,
        incoming: &LightRay,
        isect: &Intersection,
        rng: &mut dyn RngCore,
    ) -> LightRay {
        let entering = isect.normal.dot(incoming.direction) < 0.0;

        // Normal on the side the ray arrives from.
        let (aligned_normal, eta) = if entering {
            (isect.normal, self.eta_entering)
        } else {
            (-isect.normal, self.eta_exiting)
        };

        let unit_direction = incoming.unit().direction;
        let reflect_dir = reflect(unit_direction, aligned_normal);
        let refract_dir = refract(unit_direction, aligned_normal, eta);

        // Total internal reflection: there is no transmitted ray.
        if refract_dir.length() < NEARLY_ZERO {
            return scattered(isect, reflect_dir, incoming.color);
        }

        // Schlick uses the angle on the optically thinner side: incidence
        // when entering the denser medium, refraction when leaving it.
        let one_minus_cos = if eta < 1.0 {
            1.0 - (-unit_direction).dot(aligned_normal)
        } else {
            1.0 - refract_dir.dot(-aligned_normal)
        };

        let refl = self.reflectance(one_minus_cos);
        let refr = 1.0 - refl;

        // Reflect with probability in [0.25, 0.75], then divide by it.
        let prob_reflect = 0.25 + 0.5 * refl;
        let prob_refract = 1.0 - prob_reflect;

        if gen_f32(rng) < prob_reflect {
            scattered(isect, reflect_dir, incoming.color * (refl / prob_reflect))
        } else {
            scattered(isect, refract_dir, incoming.color * (refr / prob_refract))
        }
    }
}

/// Perfect mirror tinted by a color.
#[derive(Debug, Clone)]
pub struct Mirror {
    color: Color,
}

impl Mirror {
    /// Create a new mirror material.
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Material for Mirror {
    fn propagate(
        &self,
        incoming: &LightRay,
        isect: &Intersection,
        _rng: &mut dyn RngCore,
    ) -> LightRay {
        // Reflection is the same about either side of the surface
        let direction = reflect(incoming.unit().direction, isect.normal);
        scattered(isect, direction, incoming.color * self.color)
    }
}

/// Black body: ends every path that reaches it.
///
/// Surfaces without a material use this, typically pure emitters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Absorber;

impl Material for Absorber {
    fn propagate(
        &self,
        incoming: &LightRay,
        isect: &Intersection,
        _rng: &mut dyn RngCore,
    ) -> LightRay {
        scattered(isect, incoming.unit().direction, Color::ZERO)
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal.
#[inline]
fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract unit vector `v` through a surface with unit normal `n` facing it.
///
/// `eta` is the ratio of indices (incident over transmitted). Returns the
/// zero vector when Snell's law has no solution.
#[inline]
fn refract(v: Vec3, n: Vec3, eta: f32) -> Vec3 {
    let cos_i = n.dot(v);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        Vec3::ZERO
    } else {
        eta * v - (eta * cos_i + k.sqrt()) * n
    }
}
