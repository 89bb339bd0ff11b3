//! Geometry interface and the linear nearest-hit aggregate.

use crate::{AreaLight, Intersection, Material};
use lux_math::{Aabb, Ray};
use std::sync::Arc;

/// Smallest ray parameter accepted as a hit.
///
/// Keeps a ray leaving a surface from hitting that surface again at t ≈ 0.
pub const T_EPSILON: f32 = 1e-4;

/// A shape that rays can hit.
///
/// Implementations return the nearest hit with `t > T_EPSILON` and a unit
/// normal pointing out of the surface, or [`Intersection::MISS`].
/// Materials and lights are shared between geoms through `Arc`.
pub trait Geom: Send + Sync {
    /// Nearest intersection of `ray` with this shape.
    fn intersect(&self, ray: &Ray) -> Intersection;

    /// Conservative bounding box.
    fn bounds(&self) -> Aabb;

    /// Material that scatters light at this surface.
    fn material(&self) -> &Arc<dyn Material>;

    /// Light emitted by this surface, if any.
    fn light(&self) -> Option<&Arc<AreaLight>> {
        None
    }
}

/// A hit found by an aggregate: the intersection and the geom that produced it.
#[derive(Clone, Copy)]
pub struct Hit<'a> {
    pub isect: Intersection,
    pub geom: &'a dyn Geom,
}

/// A collection of geoms that answers nearest-hit queries.
pub trait Aggregate: Send + Sync {
    /// Nearest hit over all geoms, if any.
    fn hit(&self, ray: &Ray) -> Option<Hit<'_>>;

    /// Bounding box of everything in the aggregate.
    fn bounds(&self) -> Aabb;
}

/// Nearest hit among `geoms` closer than `max_distance`.
pub(crate) fn nearest<'a>(
    geoms: &'a [Arc<dyn Geom>],
    ray: &Ray,
    max_distance: f32,
) -> Option<Hit<'a>> {
    let mut closest: Option<Hit<'a>> = None;
    let mut closest_so_far = max_distance;

    for geom in geoms {
        let isect = geom.intersect(ray);
        if isect.is_hit() && isect.distance < closest_so_far {
            closest_so_far = isect.distance;
            closest = Some(Hit {
                isect,
                geom: geom.as_ref(),
            });
        }
    }

    closest
}

/// A flat list of geoms, searched linearly.
pub struct GeomList {
    geoms: Vec<Arc<dyn Geom>>,
    bbox: Aabb,
}

impl GeomList {
    /// Create a new empty list.
    pub fn new() -> Self {
        Self {
            geoms: Vec::new(),
            bbox: Aabb::EMPTY,
        }
    }

    /// Add a geom to the list.
    pub fn add(&mut self, geom: Arc<dyn Geom>) {
        self.bbox = Aabb::surrounding(&self.bbox, &geom.bounds());
        self.geoms.push(geom);
    }

    /// Get the number of geoms.
    pub fn len(&self) -> usize {
        self.geoms.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.geoms.is_empty()
    }
}

impl Default for GeomList {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Arc<dyn Geom>> for GeomList {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Geom>>>(iter: I) -> Self {
        let mut list = GeomList::new();
        for geom in iter {
            list.add(geom);
        }
        list
    }
}

impl Aggregate for GeomList {
    fn hit(&self, ray: &Ray) -> Option<Hit<'_>> {
        nearest(&self.geoms, ray, f32::INFINITY)
    }

    fn bounds(&self) -> Aabb {
        self.bbox
    }
}
