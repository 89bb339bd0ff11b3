//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree over geom bounding boxes; answers the same nearest-hit
//! queries as [`GeomList`](crate::GeomList) while skipping whole subtrees.

use crate::geom::nearest;
use crate::{Aggregate, Geom, Hit};
use lux_math::{Aabb, Interval, Ray};
use std::sync::Arc;

/// Maximum geoms per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 4;

/// BVH node - either a branch with two children or a leaf with geoms.
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node with a small number of geoms.
    Leaf {
        geoms: Vec<Arc<dyn Geom>>,
        bbox: Aabb,
    },
    /// Empty tree.
    Empty,
}

impl BvhNode {
    /// Create a BVH over a list of geoms.
    pub fn new(geoms: Vec<Arc<dyn Geom>>) -> Self {
        if geoms.is_empty() {
            return BvhNode::Empty;
        }
        Self::build(geoms)
    }

    /// Recursive median split on the longest axis of the centroid bounds.
    fn build(mut geoms: Vec<Arc<dyn Geom>>) -> Self {
        let bbox = geoms
            .iter()
            .fold(Aabb::EMPTY, |acc, g| Aabb::surrounding(&acc, &g.bounds()));

        if geoms.len() <= LEAF_MAX_SIZE {
            return BvhNode::Leaf { geoms, bbox };
        }

        let centroid_bounds = geoms.iter().fold(Aabb::EMPTY, |acc, g| {
            let c = g.bounds().centroid();
            Aabb::surrounding(&acc, &Aabb::from_points(c, c))
        });
        let axis = centroid_bounds.longest_axis();

        geoms.sort_unstable_by(|a, b| {
            let a_val = a.bounds().centroid()[axis];
            let b_val = b.bounds().centroid()[axis];
            a_val.total_cmp(&b_val)
        });

        let right = geoms.split_off(geoms.len() / 2);

        BvhNode::Branch {
            left: Box::new(Self::build(geoms)),
            right: Box::new(Self::build(right)),
            bbox,
        }
    }

    /// Nearest hit closer than `ray_t.max`.
    fn hit_within(&self, ray: &Ray, ray_t: Interval) -> Option<Hit<'_>> {
        match self {
            BvhNode::Empty => None,

            BvhNode::Leaf { geoms, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }
                nearest(geoms, ray, ray_t.max)
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let hit_left = left.hit_within(ray, ray_t);

                // Only check right up to the closest hit
                let right_max = hit_left.map_or(ray_t.max, |h| h.isect.distance);
                let hit_right = right.hit_within(ray, Interval::new(ray_t.min, right_max));

                hit_right.or(hit_left)
            }
        }
    }

    /// Number of geoms stored in the tree.
    pub fn len(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { geoms, .. } => geoms.len(),
            BvhNode::Branch { left, right, .. } => left.len() + right.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, BvhNode::Empty)
    }
}

impl Aggregate for BvhNode {
    fn hit(&self, ray: &Ray) -> Option<Hit<'_>> {
        self.hit_within(ray, Interval::new(0.0, f32::INFINITY))
    }

    fn bounds(&self) -> Aabb {
        match self {
            BvhNode::Empty => Aabb::EMPTY,
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Branch { bbox, .. } => *bbox,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Diffuse, GeomList, Material, Sphere, Triangle};
    use lux_math::Vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn gray() -> Arc<dyn Material> {
        Arc::new(Diffuse::new(Color::splat(0.5)))
    }

    #[test]
    fn test_bvh_empty() {
        let bvh = BvhNode::new(vec![]);

        assert!(bvh.is_empty());
        assert!(bvh.hit(&Ray::new(Vec3::ZERO, Vec3::Z)).is_none());
    }

    #[test]
    fn test_bvh_single_sphere() {
        let sphere: Arc<dyn Geom> = Arc::new(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, gray()));
        let bvh = BvhNode::new(vec![sphere]);

        assert!(matches!(bvh, BvhNode::Leaf { .. }));
        let hit = bvh.hit(&Ray::new(Vec3::ZERO, -Vec3::Z)).unwrap();
        assert!((hit.isect.distance - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_bvh_row_of_spheres() {
        let spheres: Vec<Arc<dyn Geom>> = (0..10)
            .map(|i| {
                Arc::new(Sphere::new(Vec3::new(i as f32, 0.0, -5.0), 0.5, gray())) as Arc<dyn Geom>
            })
            .collect();
        let bvh = BvhNode::new(spheres);

        assert!(matches!(bvh, BvhNode::Branch { .. }));
        assert_eq!(bvh.len(), 10);

        let hit = bvh.hit(&Ray::new(Vec3::new(5.0, 0.0, 0.0), -Vec3::Z)).unwrap();
        assert!((hit.isect.position.z - (-4.5)).abs() < 1e-4);
    }

    #[test]
    fn test_bvh_matches_linear_list() {
        let mut rng = StdRng::seed_from_u64(42);
        let material = gray();

        let mut geoms: Vec<Arc<dyn Geom>> = Vec::new();
        for _ in 0..40 {
            let center = Vec3::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
            );
            geoms.push(Arc::new(Sphere::new(center, rng.gen_range(0.2..1.5), material.clone())));
        }
        for _ in 0..20 {
            let v0 = Vec3::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
            );
            let v1 = v0 + Vec3::new(rng.gen_range(0.5..2.0), 0.0, rng.gen_range(-1.0..1.0));
            let v2 = v0 + Vec3::new(0.0, rng.gen_range(0.5..2.0), rng.gen_range(-1.0..1.0));
            geoms.push(Arc::new(Triangle::new(v0, v1, v2, material.clone())));
        }

        let list: GeomList = geoms.iter().cloned().collect();
        let bvh = BvhNode::new(geoms);
        assert_eq!(bvh.len(), list.len());

        let mut hits = 0;
        for _ in 0..2000 {
            let origin = Vec3::new(
                rng.gen_range(-15.0..15.0),
                rng.gen_range(-15.0..15.0),
                rng.gen_range(-15.0..15.0),
            );
            let direction = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            let ray = Ray::new(origin, direction);

            match (list.hit(&ray), bvh.hit(&ray)) {
                (None, None) => {}
                (Some(a), Some(b)) => {
                    hits += 1;
                    assert!((a.isect.distance - b.isect.distance).abs() < 1e-5);
                }
                _ => panic!("BVH and list disagree for {ray:?}"),
            }
        }
        assert!(hits > 0);
    }
}
