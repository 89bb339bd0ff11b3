//! JSON scene loading.
//!
//! Parses a scene document, resolves by-name references between registries
//! (including group members) and rejects parameters the renderer cannot
//! handle. The renderer assumes
//! everything it receives from here is valid.

use std::collections::BTreeMap;
use std::path::Path;

use lux_math::Vec3;
use serde::Deserialize;
use thiserror::Error;

use crate::scene::{
    CameraDef, GeomDef, LightDef, MaterialDef, Named, RenderSettings, Scene, Shape,
};

/// Errors that can occur during scene loading.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Property '{property}' references an unknown object '{name}'")]
    UnknownReference { property: String, name: String },

    #[error("Property '{property}' references an unknown object '{name}' at index {index}")]
    UnknownListReference {
        property: String,
        index: usize,
        name: String,
    },

    #[error("Property '{0}' must not be empty")]
    EmptyName(String),

    #[error("Geometry '{0}' is part of a group cycle")]
    GroupCycle(String),

    #[error("Invalid parameter in '{object}': {message}")]
    InvalidParameter { object: String, message: String },

    #[error("Scene has no cameras")]
    NoCamera,

    #[error("Unknown camera: {0}")]
    UnknownCamera(String),
}

/// Result type for loading operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Shape as written in the file; groups still name their members.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawShape {
    Sphere { origin: Vec3, radius: f32 },
    Triangle { v0: Vec3, v1: Vec3, v2: Vec3 },
    Group {
        #[serde(default)]
        members: Vec<String>,
    },
}

/// Geometry as written in the file, before name resolution.
#[derive(Deserialize)]
struct RawGeom {
    #[serde(flatten)]
    shape: RawShape,
    #[serde(default)]
    mat: String,
    #[serde(default)]
    light: String,
}

#[derive(Deserialize)]
struct RawScene {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    settings: RenderSettings,
    #[serde(default)]
    lights: BTreeMap<String, LightDef>,
    #[serde(default)]
    materials: BTreeMap<String, MaterialDef>,
    #[serde(default)]
    geometry: BTreeMap<String, RawGeom>,
    #[serde(default)]
    cameras: BTreeMap<String, CameraDef>,
}

/// Load a scene from a JSON file.
///
/// The scene is named after the `name` field, or the file stem when absent.
pub fn load_scene<P: AsRef<Path>>(path: P) -> SceneResult<Scene> {
    let path = path.as_ref();
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed");

    let source = std::fs::read_to_string(path)?;
    log::info!("Loading scene from {}", path.display());
    load_scene_from_string(&source, name)
}

/// Load a scene from a JSON string. `default_name` is used if the document has no name.
pub fn load_scene_from_string(source: &str, default_name: &str) -> SceneResult<Scene> {
    let raw: RawScene = serde_json::from_str(source)?;
    let scene = resolve(raw, default_name)?;

    log::info!(
        "Loaded scene '{}': {} geoms, {} materials, {} lights, {} cameras",
        scene.name,
        scene.geometry.len(),
        scene.materials.len(),
        scene.lights.len(),
        scene.cameras.len()
    );
    if scene.emitter_count() == 0 && scene.settings.background.max_element() <= 0.0 {
        log::warn!("Scene '{}' has no lights and a black background", scene.name);
    }

    Ok(scene)
}

fn resolve(raw: RawScene, default_name: &str) -> SceneResult<Scene> {
    check_settings(&raw.settings)?;

    let lights = named("lights", raw.lights, check_light)?;
    let materials = named("materials", raw.materials, check_material)?;
    let cameras = named("cameras", raw.cameras, check_camera)?;
    if cameras.is_empty() {
        return Err(SceneError::NoCamera);
    }

    let mut scene = Scene {
        name: raw.name.unwrap_or_else(|| default_name.to_string()),
        settings: raw.settings,
        lights,
        materials,
        geometry: Vec::with_capacity(raw.geometry.len()),
        cameras,
    };

    // Geometry indices follow name order, so members may be declared later.
    let names: Vec<String> = raw.geometry.keys().cloned().collect();
    let mut parent: Vec<Option<usize>> = vec![None; names.len()];

    for (index, (name, geom)) in raw.geometry.into_iter().enumerate() {
        check_name("geometry", &name)?;

        let shape = match geom.shape {
            RawShape::Sphere { origin, radius } => Shape::Sphere { origin, radius },
            RawShape::Triangle { v0, v1, v2 } => Shape::Triangle { v0, v1, v2 },
            RawShape::Group { members } => {
                if !geom.mat.is_empty() || !geom.light.is_empty() {
                    return Err(invalid(&name, "a group takes no material or light"));
                }
                let members = resolve_members(&name, index, &members, &names, &mut parent)?;
                Shape::Group { members }
            }
        };
        check_shape(&name, &shape)?;

        // Empty material and light references are allowed and mean none.
        let material = resolve_reference(format!("geometry.{name}.mat"), &geom.mat, |n| {
            scene.material_index(n)
        })?;
        let light = resolve_reference(format!("geometry.{name}.light"), &geom.light, |n| {
            scene.light_index(n)
        })?;

        scene.geometry.push(GeomDef {
            name,
            shape,
            material,
            light,
        });
    }

    check_group_cycles(&scene.geometry, &parent)?;

    Ok(scene)
}

/// Resolve an optional by-name reference; an empty name resolves to `None`.
fn resolve_reference(
    property: String,
    name: &str,
    lookup: impl Fn(&str) -> Option<usize>,
) -> SceneResult<Option<usize>> {
    if name.is_empty() {
        return Ok(None);
    }
    lookup(name).map(Some).ok_or_else(|| SceneError::UnknownReference {
        property,
        name: name.to_string(),
    })
}

/// Resolve a group's member names and record the group as their parent.
///
/// `names` is the sorted list of all geometry names.
fn resolve_members(
    group: &str,
    group_index: usize,
    members: &[String],
    names: &[String],
    parent: &mut [Option<usize>],
) -> SceneResult<Vec<usize>> {
    let property = format!("geometry.{group}.members");

    members
        .iter()
        .enumerate()
        .map(|(position, member)| {
            let index = names.binary_search(member).map_err(|_| {
                SceneError::UnknownListReference {
                    property: property.clone(),
                    index: position,
                    name: member.clone(),
                }
            })?;

            if let Some(other) = parent[index] {
                return Err(invalid(
                    member,
                    format!("already belongs to group '{}'", names[other]),
                ));
            }
            parent[index] = Some(group_index);
            Ok(index)
        })
        .collect()
}

/// Every chain of enclosing groups must end at a root.
fn check_group_cycles(geometry: &[GeomDef], parent: &[Option<usize>]) -> SceneResult<()> {
    for start in 0..parent.len() {
        let mut current = parent[start];
        let mut steps = 0;

        while let Some(group) = current {
            // More steps than entries means the walk is circling
            if group == start || steps > parent.len() {
                return Err(SceneError::GroupCycle(geometry[group].name.clone()));
            }
            current = parent[group];
            steps += 1;
        }
    }
    Ok(())
}

/// Validate every entry of a registry and keep it in name order.
fn named<T>(
    registry: &str,
    entries: BTreeMap<String, T>,
    check: fn(&str, &T) -> SceneResult<()>,
) -> SceneResult<Vec<Named<T>>> {
    entries
        .into_iter()
        .map(|(name, def)| {
            check_name(registry, &name)?;
            check(&name, &def)?;
            Ok(Named { name, def })
        })
        .collect()
}

fn check_name(registry: &str, name: &str) -> SceneResult<()> {
    if name.is_empty() {
        return Err(SceneError::EmptyName(format!("{registry} name")));
    }
    Ok(())
}

fn invalid(object: &str, message: impl Into<String>) -> SceneError {
    SceneError::InvalidParameter {
        object: object.to_string(),
        message: message.into(),
    }
}

fn check_finite(object: &str, what: &str, v: Vec3) -> SceneResult<()> {
    if !v.is_finite() {
        return Err(invalid(object, format!("{what} must be finite, got {v}")));
    }
    Ok(())
}

fn check_color(object: &str, what: &str, color: Vec3) -> SceneResult<()> {
    check_finite(object, what, color)?;
    if color.min_element() < 0.0 {
        return Err(invalid(object, format!("{what} must not be negative, got {color}")));
    }
    Ok(())
}

fn check_settings(settings: &RenderSettings) -> SceneResult<()> {
    if settings.samples == 0 {
        return Err(invalid("settings", "samples must be at least 1"));
    }
    if settings.max_depth == 0 {
        return Err(invalid("settings", "max_depth must be at least 1"));
    }
    if settings.bucket_size == 0 {
        return Err(invalid("settings", "bucket_size must be at least 1"));
    }
    check_color("settings", "background", settings.background)
}

fn check_light(name: &str, light: &LightDef) -> SceneResult<()> {
    match *light {
        LightDef::Area { color, intensity } => {
            check_color(name, "color", color)?;
            if !intensity.is_finite() || intensity < 0.0 {
                return Err(invalid(name, format!("intensity must be >= 0, got {intensity}")));
            }
            Ok(())
        }
    }
}

fn check_material(name: &str, material: &MaterialDef) -> SceneResult<()> {
    match *material {
        MaterialDef::Diffuse { color } | MaterialDef::Mirror { color } => {
            check_color(name, "color", color)
        }
        MaterialDef::Fresnel { ior } => {
            if !ior.is_finite() || ior <= 0.0 {
                return Err(invalid(name, format!("ior must be > 0, got {ior}")));
            }
            Ok(())
        }
    }
}

fn check_shape(name: &str, shape: &Shape) -> SceneResult<()> {
    match *shape {
        Shape::Sphere { origin, radius } => {
            check_finite(name, "origin", origin)?;
            if !radius.is_finite() || radius <= 0.0 {
                return Err(invalid(name, format!("radius must be > 0, got {radius}")));
            }
            Ok(())
        }
        Shape::Triangle { v0, v1, v2 } => {
            check_finite(name, "v0", v0)?;
            check_finite(name, "v1", v1)?;
            check_finite(name, "v2", v2)?;
            if (v1 - v0).cross(v2 - v0).length_squared() < 1e-12 {
                return Err(invalid(name, "triangle has zero area"));
            }
            Ok(())
        }
        Shape::Group { .. } => Ok(()),
    }
}

fn check_camera(name: &str, camera: &CameraDef) -> SceneResult<()> {
    if camera.width == 0 || camera.height == 0 {
        return Err(invalid(
            name,
            format!("image size must be non-zero, got {}x{}", camera.width, camera.height),
        ));
    }
    if !(camera.fov > 0.0 && camera.fov < 180.0) {
        return Err(invalid(name, format!("fov must be in (0, 180), got {}", camera.fov)));
    }
    check_finite(name, "translate", camera.transform.translate)?;
    check_finite(name, "rotate.axis", camera.transform.rotate.axis)?;
    if !camera.transform.rotate.angle.is_finite() {
        return Err(invalid(name, "rotate.angle must be finite"));
    }
    Ok(())
}
