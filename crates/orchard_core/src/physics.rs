//! Minimal 2D physics space on the ground (x, z) plane.
//!
//! Shapes are circles. Areas are sensors that never move on their own;
//! bodies additionally carry a mode, and rigid bodies integrate velocity in
//! [`PhysicsSpace::step`]. Everything is addressed by [`Rid`] handles that
//! stay valid until [`PhysicsSpace::free`].

use crate::spatial_hash::SpatialHash;
use glam::Vec2;
use orchard_data::Rid;
use std::collections::BTreeMap;

/// Collision layer of creature and tree bodies.
pub const BODY_LAYER: u32 = 1;
/// Collision layer of creature awareness sensors.
pub const AWARENESS_LAYER: u32 = 1 << 1;
/// Collision layer of fruit bodies.
pub const FRUIT_LAYER: u32 = 1 << 2;
/// Extra layer carried by tree bodies, so tree-to-tree queries skip creatures.
pub const TREE_LAYER: u32 = 1 << 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle { radius: f32 },
}

impl Shape {
    #[must_use]
    pub fn radius(&self) -> f32 {
        match *self {
            Shape::Circle { radius } => radius,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Area,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    Static,
    Kinematic,
    Rigid,
}

#[derive(Debug, Clone)]
pub struct PhysicsObject {
    pub kind: ObjectKind,
    pub shape: Shape,
    pub position: Vec2,
    pub velocity: Vec2,
    pub mode: BodyMode,
    pub layer: u32,
    pub mask: u32,
    pub linear_damping: f32,
}

/// A shape-overlap query.
#[derive(Debug, Clone)]
pub struct ShapeQuery<'a> {
    pub shape: Shape,
    pub position: Vec2,
    pub collision_mask: u32,
    pub exclude: &'a [Rid],
    pub collide_with_areas: bool,
    pub collide_with_bodies: bool,
    pub max_results: usize,
}

impl<'a> ShapeQuery<'a> {
    /// Areas only, every layer, nothing excluded.
    pub fn areas(shape: Shape, position: Vec2, max_results: usize) -> Self {
        Self {
            shape,
            position,
            collision_mask: u32::MAX,
            exclude: &[],
            collide_with_areas: true,
            collide_with_bodies: false,
            max_results,
        }
    }

    #[must_use]
    pub fn with_mask(mut self, mask: u32) -> Self {
        self.collision_mask = mask;
        self
    }

    #[must_use]
    pub fn excluding(mut self, exclude: &'a [Rid]) -> Self {
        self.exclude = exclude;
        self
    }

    #[must_use]
    pub fn with_bodies(mut self, bodies: bool) -> Self {
        self.collide_with_bodies = bodies;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeHit {
    pub rid: Rid,
    pub position: Vec2,
}

/// Owner of every physics shape in a simulation.
#[derive(Debug, Clone)]
pub struct PhysicsSpace {
    objects: BTreeMap<Rid, PhysicsObject>,
    broadphase: SpatialHash,
    next_rid: u64,
}

impl PhysicsSpace {
    pub fn new(cell_size: f32) -> Self {
        Self {
            objects: BTreeMap::new(),
            broadphase: SpatialHash::new(cell_size),
            next_rid: 1,
        }
    }

    fn create(&mut self, object: PhysicsObject) -> Rid {
        let rid = Rid(self.next_rid);
        self.next_rid += 1;
        self.broadphase
            .insert(rid, object.position, object.shape.radius());
        self.objects.insert(rid, object);
        rid
    }

    pub fn area_create(&mut self, shape: Shape, position: Vec2, layer: u32, mask: u32) -> Rid {
        self.create(PhysicsObject {
            kind: ObjectKind::Area,
            shape,
            position,
            velocity: Vec2::ZERO,
            mode: BodyMode::Static,
            layer,
            mask,
            linear_damping: 0.0,
        })
    }

    /// Creates a body in `Kinematic` mode; it only moves when told to.
    pub fn body_create(
        &mut self,
        shape: Shape,
        position: Vec2,
        layer: u32,
        linear_damping: f32,
    ) -> Rid {
        self.create(PhysicsObject {
            kind: ObjectKind::Body,
            shape,
            position,
            velocity: Vec2::ZERO,
            mode: BodyMode::Kinematic,
            layer,
            mask: 0,
            linear_damping,
        })
    }

    /// Frees a shape. Returns false for unknown handles.
    pub fn free(&mut self, rid: Rid) -> bool {
        match self.objects.remove(&rid) {
            Some(object) => {
                self.broadphase.remove(rid, object.position);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, rid: Rid) -> bool {
        self.objects.contains_key(&rid)
    }

    pub fn get(&self, rid: Rid) -> Option<&PhysicsObject> {
        self.objects.get(&rid)
    }

    pub fn position(&self, rid: Rid) -> Option<Vec2> {
        self.objects.get(&rid).map(|o| o.position)
    }

    pub fn set_position(&mut self, rid: Rid, position: Vec2) -> bool {
        let Some(object) = self.objects.get_mut(&rid) else {
            return false;
        };
        let from = object.position;
        object.position = position;
        self.broadphase
            .relocate(rid, from, position, object.shape.radius());
        true
    }

    pub fn body_set_mode(&mut self, rid: Rid, mode: BodyMode) -> bool {
        match self.objects.get_mut(&rid) {
            Some(object) if object.kind == ObjectKind::Body => {
                object.mode = mode;
                true
            }
            _ => false,
        }
    }

    /// Applies an impulse to a rigid body of unit mass.
    pub fn body_apply_central_impulse(&mut self, rid: Rid, impulse: Vec2) -> bool {
        match self.objects.get_mut(&rid) {
            Some(object) if object.kind == ObjectKind::Body && object.mode == BodyMode::Rigid => {
                object.velocity += impulse;
                true
            }
            _ => false,
        }
    }

    /// Integrates every rigid body by `delta_time` seconds.
    pub fn step(&mut self, delta_time: f32) {
        let damping = |d: f32| (1.0 - d * delta_time).max(0.0);
        let mut moves = Vec::new();
        for (&rid, object) in self.objects.iter_mut() {
            if object.kind != ObjectKind::Body || object.mode != BodyMode::Rigid {
                continue;
            }
            if object.velocity == Vec2::ZERO {
                continue;
            }
            let from = object.position;
            object.position += object.velocity * delta_time;
            object.velocity *= damping(object.linear_damping);
            if object.velocity.length_squared() < 1e-8 {
                object.velocity = Vec2::ZERO;
            }
            moves.push((rid, from, object.position, object.shape.radius()));
        }
        for (rid, from, to, radius) in moves {
            self.broadphase.relocate(rid, from, to, radius);
        }
    }

    /// Shapes overlapping the query shape, at most `query.max_results` of them.
    ///
    /// Hits come back in broadphase order, not by distance.
    pub fn intersect_shape(&self, query: &ShapeQuery<'_>) -> Vec<ShapeHit> {
        let mut hits = Vec::new();
        if query.max_results == 0 {
            return hits;
        }
        let radius = query.shape.radius();
        self.broadphase
            .query_callback(query.position, radius, |rid| {
                if hits.len() >= query.max_results || query.exclude.contains(&rid) {
                    return;
                }
                let Some(object) = self.objects.get(&rid) else {
                    return;
                };
                let kind_ok = match object.kind {
                    ObjectKind::Area => query.collide_with_areas,
                    ObjectKind::Body => query.collide_with_bodies,
                };
                if !kind_ok || object.layer & query.collision_mask == 0 {
                    return;
                }
                let reach = radius + object.shape.radius();
                if object.position.distance_squared(query.position) <= reach * reach {
                    hits.push(ShapeHit {
                        rid,
                        position: object.position,
                    });
                }
            });
        hits
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle(radius: f32) -> Shape {
        Shape::Circle { radius }
    }

    #[test]
    fn test_overlap_respects_radius_sum() {
        let mut space = PhysicsSpace::new(5.0);
        let near = space.area_create(circle(1.0), Vec2::new(3.0, 0.0), BODY_LAYER, 0);
        space.area_create(circle(1.0), Vec2::new(3.5, 3.5), BODY_LAYER, 0);

        let hits = space.intersect_shape(&ShapeQuery::areas(circle(2.0), Vec2::ZERO, 32));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].rid, near);
    }

    #[test]
    fn test_query_filters_mask_kind_and_exclusions() {
        let mut space = PhysicsSpace::new(5.0);
        let me = space.area_create(circle(0.5), Vec2::ZERO, BODY_LAYER, 0);
        let sensor = space.area_create(circle(5.0), Vec2::ZERO, AWARENESS_LAYER, BODY_LAYER);
        let fruit = space.body_create(circle(0.2), Vec2::new(0.5, 0.0), FRUIT_LAYER, 0.0);
        let other = space.area_create(circle(0.5), Vec2::new(1.0, 0.0), BODY_LAYER, 0);

        let exclude = [me];
        let query = ShapeQuery::areas(circle(5.0), Vec2::ZERO, 32)
            .with_mask(BODY_LAYER)
            .excluding(&exclude);
        let hits: Vec<Rid> = space.intersect_shape(&query).iter().map(|h| h.rid).collect();
        assert_eq!(hits, vec![other]);
        assert!(!hits.contains(&sensor));
        assert!(!hits.contains(&fruit));

        let with_bodies = ShapeQuery::areas(circle(5.0), Vec2::ZERO, 32)
            .with_mask(FRUIT_LAYER)
            .with_bodies(true);
        let hits: Vec<Rid> = space.intersect_shape(&with_bodies).iter().map(|h| h.rid).collect();
        assert_eq!(hits, vec![fruit]);
    }

    #[test]
    fn test_results_are_capped() {
        let mut space = PhysicsSpace::new(5.0);
        for i in 0..10 {
            space.area_create(circle(0.5), Vec2::new(i as f32 * 0.1, 0.0), BODY_LAYER, 0);
        }
        let hits = space.intersect_shape(&ShapeQuery::areas(circle(3.0), Vec2::ZERO, 4));
        assert_eq!(hits.len(), 4);
    }

    #[test]
    fn test_rigid_body_integrates_impulse() {
        let mut space = PhysicsSpace::new(5.0);
        let body = space.body_create(circle(0.2), Vec2::new(10.0, 10.0), FRUIT_LAYER, 0.0);

        assert!(!space.body_apply_central_impulse(body, Vec2::X));
        assert!(space.body_set_mode(body, BodyMode::Rigid));
        assert!(space.body_apply_central_impulse(body, Vec2::new(1.0, -0.5)));

        space.step(0.5);
        let pos = space.position(body).unwrap();
        assert!((pos - Vec2::new(10.5, 9.75)).length() < 1e-5);

        let hits = space.intersect_shape(
            &ShapeQuery::areas(circle(0.1), pos, 8)
                .with_bodies(true),
        );
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_free_removes_from_queries() {
        let mut space = PhysicsSpace::new(5.0);
        let rid = space.area_create(circle(1.0), Vec2::ZERO, BODY_LAYER, 0);
        assert!(space.free(rid));
        assert!(!space.free(rid));
        assert!(space
            .intersect_shape(&ShapeQuery::areas(circle(1.0), Vec2::ZERO, 8))
            .is_empty());
    }
}
