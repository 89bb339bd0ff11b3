//! LUX Core - renderer-agnostic scene description.
//!
//! This crate provides:
//!
//! - **Scene types**: `Scene` with named registries of materials, lights,
//!   geometry and cameras, plus the render settings
//! - **Loading**: JSON scene parsing, reference resolution and validation
//!
//! # Example
//!
//! ```ignore
//! use lux_core::load_scene;
//!
//! let scene = load_scene("demos/glass.json")?;
//! println!("Loaded {} geoms sharing {} materials",
//!     scene.geometry.len(),
//!     scene.materials.len());
//! ```

pub mod loader;
pub mod scene;

// Re-export commonly used types
pub use loader::{load_scene, load_scene_from_string, SceneError, SceneResult};
pub use scene::{
    CameraDef, GeomDef, LightDef, MaterialDef, Named, RenderSettings, RotateDef, Scene, Shape,
    TransformDef,
};
