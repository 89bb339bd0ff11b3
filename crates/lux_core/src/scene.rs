//! Scene description types for LUX.
//!
//! These are plain data: the renderer turns them into shared geometry and
//! material instances. Geometry refers to materials, lights and other
//! geometry by index into the scene's registries, so many geoms can share
//! one material.

use lux_math::Vec3;
use serde::Deserialize;

use crate::loader::{SceneError, SceneResult};

/// A registry entry: a definition and the name it was declared under.
#[derive(Clone, Debug, PartialEq)]
pub struct Named<T> {
    pub name: String,
    pub def: T,
}

/// Scattering model of a surface.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MaterialDef {
    /// Ideal diffuse reflector with the given albedo.
    Diffuse { color: Vec3 },

    /// Smooth dielectric (glass, water) with the given index of refraction.
    Fresnel { ior: f32 },

    /// Perfect specular reflector tinted by `color`.
    Mirror {
        #[serde(default = "white")]
        color: Vec3,
    },
}

/// A light source attached to geometry.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LightDef {
    /// Emits `color * intensity` from every point of the geometry it is attached to.
    Area {
        color: Vec3,
        #[serde(default = "one")]
        intensity: f32,
    },
}

/// Shape parameters of a geometry entry.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Sphere { origin: Vec3, radius: f32 },
    Triangle { v0: Vec3, v1: Vec3, v2: Vec3 },
    /// Other geometry entries, by index into `Scene::geometry`.
    ///
    /// Groups form a forest: an entry belongs to at most one group and no
    /// group contains itself.
    Group { members: Vec<usize> },
}

/// A resolved geometry entry.
#[derive(Clone, Debug, PartialEq)]
pub struct GeomDef {
    pub name: String,
    pub shape: Shape,
    /// Index into `Scene::materials`; `None` absorbs every path that hits it
    pub material: Option<usize>,
    /// Index into `Scene::lights`, if the geometry emits
    pub light: Option<usize>,
}

/// Angle/axis rotation; the angle is in degrees.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RotateDef {
    pub angle: f32,
    pub axis: Vec3,
}

impl Default for RotateDef {
    fn default() -> Self {
        Self {
            angle: 0.0,
            axis: Vec3::Y,
        }
    }
}

/// Rigid transform: rotate first, then translate.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TransformDef {
    #[serde(default)]
    pub translate: Vec3,
    #[serde(default)]
    pub rotate: RotateDef,
}

/// Pinhole camera. Looks down its local -Z axis with +Y up.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CameraDef {
    pub width: u32,
    pub height: u32,
    /// Vertical field of view in degrees
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default)]
    pub transform: TransformDef,
}

/// Render settings carried by the scene file. Every field is optional.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Samples per pixel
    pub samples: u32,
    /// Maximum number of bounces per path
    pub max_depth: u32,
    /// Bounces before Russian roulette may terminate a path
    pub russian_roulette_depth: u32,
    /// Seed for the per-bucket random generators
    pub seed: u64,
    /// Radiance of rays that escape the scene
    pub background: Vec3,
    /// Edge length of render buckets in pixels
    pub bucket_size: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            samples: 64,
            max_depth: 16,
            russian_roulette_depth: 4,
            seed: 0,
            background: Vec3::ZERO,
            bucket_size: 32,
        }
    }
}

/// A fully resolved and validated scene.
///
/// Registries are sorted by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub name: String,
    pub settings: RenderSettings,
    pub lights: Vec<Named<LightDef>>,
    pub materials: Vec<Named<MaterialDef>>,
    pub geometry: Vec<GeomDef>,
    pub cameras: Vec<Named<CameraDef>>,
}

impl Scene {
    /// Look up a material's index by name.
    pub fn material_index(&self, name: &str) -> Option<usize> {
        self.materials.iter().position(|m| m.name == name)
    }

    /// Look up a light's index by name.
    pub fn light_index(&self, name: &str) -> Option<usize> {
        self.lights.iter().position(|l| l.name == name)
    }

    /// Geometry that is not a member of any group, in name order.
    ///
    /// Rendering starts from these; group members are reached through
    /// their group.
    pub fn roots(&self) -> Vec<usize> {
        let mut is_member = vec![false; self.geometry.len()];
        for geom in &self.geometry {
            if let Shape::Group { members } = &geom.shape {
                for &member in members {
                    is_member[member] = true;
                }
            }
        }

        (0..self.geometry.len()).filter(|&i| !is_member[i]).collect()
    }

    /// Pick the camera to render through.
    ///
    /// With no name, the first camera (by name) is used.
    pub fn camera(&self, name: Option<&str>) -> SceneResult<&Named<CameraDef>> {
        match name {
            Some(name) => self
                .cameras
                .iter()
                .find(|c| c.name == name)
                .ok_or_else(|| SceneError::UnknownCamera(name.to_string())),
            None => self.cameras.first().ok_or(SceneError::NoCamera),
        }
    }

    /// Number of geoms that carry a light.
    pub fn emitter_count(&self) -> usize {
        self.geometry.iter().filter(|g| g.light.is_some()).count()
    }
}

fn white() -> Vec3 {
    Vec3::ONE
}

fn one() -> f32 {
    1.0
}

fn default_fov() -> f32 {
    45.0
}
