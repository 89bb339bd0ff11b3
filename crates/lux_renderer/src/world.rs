//! Builds renderable objects from a loaded `lux_core::Scene`.
//!
//! Each material and light definition becomes exactly one shared instance;
//! geoms hold `Arc` clones of them, so editing a scene's material registry
//! changes every surface that names it. Groups are flattened: their
//! primitives go into the world BVH alongside the ungrouped ones.

use crate::{
    Absorber, Aggregate, AreaLight, BvhNode, Camera, Diffuse, Fresnel, Geom, Hit, Material,
    Mirror, RenderConfig, Sphere, Triangle,
};
use lux_core::{CameraDef, GeomDef, LightDef, MaterialDef, RenderSettings, Scene, Shape};
use lux_math::{translate_rotate, Aabb, Ray};
use std::sync::Arc;

/// Renderable scene contents: a BVH over every primitive reachable from
/// the scene's root geometry.
pub struct World {
    bvh: BvhNode,
}

impl World {
    /// Number of primitives in the world.
    pub fn len(&self) -> usize {
        self.bvh.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bvh.is_empty()
    }
}

impl Aggregate for World {
    fn hit(&self, ray: &Ray) -> Option<Hit<'_>> {
        self.bvh.hit(ray)
    }

    fn bounds(&self) -> Aabb {
        self.bvh.bounds()
    }
}

fn build_material(def: &MaterialDef) -> Arc<dyn Material> {
    match *def {
        MaterialDef::Diffuse { color } => Arc::new(Diffuse::new(color)),
        MaterialDef::Fresnel { ior } => Arc::new(Fresnel::new(ior)),
        MaterialDef::Mirror { color } => Arc::new(Mirror::new(color)),
    }
}

fn build_light(def: &LightDef) -> Arc<AreaLight> {
    match *def {
        LightDef::Area { color, intensity } => Arc::new(AreaLight::new(color, intensity)),
    }
}

/// Shared instances a primitive draws its material and light from.
struct Instances {
    materials: Vec<Arc<dyn Material>>,
    lights: Vec<Arc<AreaLight>>,
    absorber: Arc<dyn Material>,
}

impl Instances {
    /// Build one primitive; `None` for groups.
    fn primitive(&self, def: &GeomDef) -> Option<Arc<dyn Geom>> {
        let material = def
            .material
            .and_then(|i| self.materials.get(i))
            .unwrap_or(&self.absorber)
            .clone();
        let light = def.light.and_then(|i| self.lights.get(i)).cloned();

        let geom: Arc<dyn Geom> = match def.shape {
            Shape::Sphere { origin, radius } => {
                let sphere = Sphere::new(origin, radius, material);
                Arc::new(match light {
                    Some(light) => sphere.with_light(light),
                    None => sphere,
                })
            }
            Shape::Triangle { v0, v1, v2 } => {
                let triangle = Triangle::new(v0, v1, v2, material);
                Arc::new(match light {
                    Some(light) => triangle.with_light(light),
                    None => triangle,
                })
            }
            Shape::Group { .. } => return None,
        };
        Some(geom)
    }
}

/// Instantiate materials, lights and geometry, and build the BVH.
///
/// The scene must come from the loader, which guarantees every index is in
/// range and that groups form a forest. Geometry without a material absorbs
/// every path that reaches it.
pub fn build_world(scene: &Scene) -> World {
    let instances = Instances {
        materials: scene.materials.iter().map(|m| build_material(&m.def)).collect(),
        lights: scene.lights.iter().map(|l| build_light(&l.def)).collect(),
        absorber: Arc::new(Absorber),
    };

    let mut geoms: Vec<Arc<dyn Geom>> = Vec::with_capacity(scene.geometry.len());
    let mut visited = vec![false; scene.geometry.len()];
    let mut groups = 0;

    // Walk down from the roots so grouped geometry is built exactly once
    let mut pending = scene.roots();
    while let Some(index) = pending.pop() {
        if std::mem::replace(&mut visited[index], true) {
            continue;
        }

        let def = &scene.geometry[index];
        match &def.shape {
            Shape::Group { members } => {
                groups += 1;
                pending.extend(members.iter().copied());
            }
            _ => geoms.extend(instances.primitive(def)),
        }
    }

    log::info!(
        "Built world '{}': {} primitives from {} groups, {} materials, {} lights",
        scene.name,
        geoms.len(),
        groups,
        instances.materials.len(),
        instances.lights.len()
    );

    World {
        bvh: BvhNode::new(geoms),
    }
}

/// Create an initialized camera from its definition.
pub fn build_camera(def: &CameraDef) -> Camera {
    let rotate = &def.transform.rotate;
    let transform = translate_rotate(def.transform.translate, rotate.angle, rotate.axis);

    let mut camera = Camera::new()
        .with_resolution(def.width, def.height)
        .with_fov(def.fov)
        .with_transform(transform);
    camera.initialize();
    camera
}

/// Render configuration from scene settings.
pub fn render_config(settings: &RenderSettings) -> RenderConfig {
    RenderConfig {
        samples_per_pixel: settings.samples,
        max_depth: settings.max_depth,
        russian_roulette_depth: settings.russian_roulette_depth,
        background: settings.background,
        seed: settings.seed,
        bucket_size: settings.bucket_size,
    }
}
