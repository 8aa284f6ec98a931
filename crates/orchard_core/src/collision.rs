//! Typed view over physics queries.
//!
//! The physics space only knows shapes; [`CollisionRegistry`] remembers which
//! entity each body shape belongs to and [`CollisionDetector`] turns raw hits
//! into [`TypedCollision`]s.

use crate::physics::{PhysicsSpace, Shape, ShapeQuery};
use glam::Vec2;
use orchard_data::{EntityId, EntityType, Rid, TypedCollision};
use std::collections::HashMap;

/// One-to-one map from body handle to entity identity.
#[derive(Debug, Clone, Default)]
pub struct CollisionRegistry {
    bodies: HashMap<Rid, (EntityType, EntityId)>,
}

impl CollisionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `rid`, replacing any previous owner.
    pub fn register_body(&mut self, rid: Rid, entity_type: EntityType, entity_id: EntityId) {
        if let Some((old_type, old_id)) = self.bodies.insert(rid, (entity_type, entity_id)) {
            tracing::warn!(%rid, ?old_type, %old_id, %entity_id, "Body re-registered");
        }
    }

    pub fn unregister_body(&mut self, rid: Rid) -> bool {
        self.bodies.remove(&rid).is_some()
    }

    pub fn try_get_entity_info(&self, rid: Rid) -> Option<(EntityType, EntityId)> {
        self.bodies.get(&rid).copied()
    }

    /// Handles registered for `entity_id`.
    pub fn rids_of(&self, entity_id: EntityId) -> Vec<Rid> {
        let mut rids: Vec<Rid> = self
            .bodies
            .iter()
            .filter(|(_, (_, id))| *id == entity_id)
            .map(|(rid, _)| *rid)
            .collect();
        rids.sort();
        rids
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

/// Issues overlap queries and resolves hits through a [`CollisionRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct CollisionDetector<'a> {
    pub space: &'a PhysicsSpace,
    pub registry: &'a CollisionRegistry,
    pub max_results: usize,
}

impl<'a> CollisionDetector<'a> {
    pub fn new(space: &'a PhysicsSpace, registry: &'a CollisionRegistry, max_results: usize) -> Self {
        Self {
            space,
            registry,
            max_results,
        }
    }

    /// Entities whose shapes overlap the area `area`, using the area's own
    /// shape, position and collision mask. Unknown areas yield nothing.
    pub fn overlapping_with_area(&self, area: Rid, exclusions: &[Rid]) -> Vec<TypedCollision> {
        let Some(object) = self.space.get(area) else {
            tracing::debug!(%area, "Overlap query on a freed area");
            return Vec::new();
        };
        let mut exclude = Vec::with_capacity(exclusions.len() + 1);
        exclude.push(area);
        exclude.extend_from_slice(exclusions);
        let query = ShapeQuery::areas(object.shape, object.position, self.max_results)
            .with_mask(object.mask)
            .excluding(&exclude);
        self.resolve(&query)
    }

    /// Entities whose shapes overlap a disk of `radius` at `position`.
    pub fn overlapping_in_radius(
        &self,
        position: Vec2,
        radius: f32,
        mask: u32,
        exclusions: &[Rid],
    ) -> Vec<TypedCollision> {
        let query = ShapeQuery::areas(Shape::Circle { radius }, position, self.max_results)
            .with_mask(mask)
            .excluding(exclusions)
            .with_bodies(true);
        self.resolve(&query)
    }

    fn resolve(&self, query: &ShapeQuery<'_>) -> Vec<TypedCollision> {
        let hits = self.space.intersect_shape(query);
        if hits.len() >= query.max_results {
            tracing::warn!(
                max_results = query.max_results,
                x = query.position.x,
                z = query.position.y,
                "Shape query hit the result cap; results truncated"
            );
        }
        hits.into_iter()
            .filter_map(|hit| {
                self.registry
                    .try_get_entity_info(hit.rid)
                    .map(|(entity_type, entity_id)| TypedCollision {
                        entity_type,
                        entity_id,
                        position: hit.position,
                    })
            })
            .collect()
    }
}

/// Nearest collision to `origin` by squared distance. Ties keep the earlier entry.
pub fn nearest<'c, I>(origin: Vec2, candidates: I) -> Option<&'c TypedCollision>
where
    I: IntoIterator<Item = &'c TypedCollision>,
{
    candidates.into_iter().fold(None, |best, c| match best {
        Some(b) if b.distance_squared_to(origin) <= c.distance_squared_to(origin) => Some(b),
        _ => Some(c),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{AWARENESS_LAYER, BODY_LAYER};

    fn circle(radius: f32) -> Shape {
        Shape::Circle { radius }
    }

    #[test]
    fn test_unregistered_rids_are_dropped() {
        let mut space = PhysicsSpace::new(5.0);
        let mut registry = CollisionRegistry::new();
        let tracked = space.area_create(circle(1.0), Vec2::new(1.0, 0.0), BODY_LAYER, 0);
        space.area_create(circle(1.0), Vec2::new(-1.0, 0.0), BODY_LAYER, 0);
        registry.register_body(tracked, EntityType::Tree, EntityId(4));

        let detector = CollisionDetector::new(&space, &registry, 32);
        let hits = detector.overlapping_in_radius(Vec2::ZERO, 2.0, BODY_LAYER, &[]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity_id, EntityId(4));
        assert_eq!(hits[0].entity_type, EntityType::Tree);
        assert_eq!(hits[0].position, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_area_query_uses_own_mask_and_excludes_itself() {
        let mut space = PhysicsSpace::new(5.0);
        let mut registry = CollisionRegistry::new();
        let body = space.area_create(circle(0.25), Vec2::ZERO, BODY_LAYER, 0);
        let sensor = space.area_create(circle(5.0), Vec2::ZERO, AWARENESS_LAYER, BODY_LAYER);
        let other = space.area_create(circle(0.25), Vec2::new(3.0, 0.0), BODY_LAYER, 0);
        let other_sensor =
            space.area_create(circle(5.0), Vec2::new(3.0, 0.0), AWARENESS_LAYER, BODY_LAYER);
        registry.register_body(body, EntityType::Creature, EntityId(1));
        registry.register_body(other, EntityType::Creature, EntityId(2));
        registry.register_body(other_sensor, EntityType::Creature, EntityId(2));

        let detector = CollisionDetector::new(&space, &registry, 32);
        let hits = detector.overlapping_with_area(sensor, &[body]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity_id, EntityId(2));
    }

    #[test]
    fn test_nearest_prefers_smallest_squared_distance() {
        let hit = |id, x| TypedCollision {
            entity_type: EntityType::Creature,
            entity_id: EntityId(id),
            position: Vec2::new(x, 0.0),
        };
        let hits = vec![hit(1, 4.0), hit(2, -1.5), hit(3, 2.0)];
        assert_eq!(nearest(Vec2::ZERO, &hits).map(|c| c.entity_id), Some(EntityId(2)));
        assert!(nearest(Vec2::ZERO, &[]).is_none());
    }

    #[test]
    fn test_unregister() {
        let mut registry = CollisionRegistry::new();
        registry.register_body(Rid(3), EntityType::Fruit, EntityId(8));
        assert_eq!(registry.rids_of(EntityId(8)), vec![Rid(3)]);
        assert!(registry.unregister_body(Rid(3)));
        assert!(!registry.unregister_body(Rid(3)));
        assert!(registry.try_get_entity_info(Rid(3)).is_none());
    }
}
