//! Area lights.

use crate::Color;

/// Diffuse emitter attached to a geom.
///
/// Every point of the surface emits `color * intensity` in all directions.
#[derive(Debug, Clone)]
pub struct AreaLight {
    color: Color,
    intensity: f32,
}

impl AreaLight {
    /// Create a new area light.
    pub fn new(color: Color, intensity: f32) -> Self {
        Self { color, intensity }
    }

    /// Emitted radiance.
    #[inline]
    pub fn emitted(&self) -> Color {
        self.color * self.intensity
    }
}
