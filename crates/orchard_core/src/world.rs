use crate::collision::{CollisionDetector, CollisionRegistry};
use crate::config::AppConfig;
use crate::events::EventBus;
use crate::physics::PhysicsSpace;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f32::consts::TAU;

/// Axis-aligned rectangle on the ground plane. `Vec2::y` is the world z axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl WorldBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::new(width, height),
        }
    }

    /// Inclusive on every edge.
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn random_point<R: Rng>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(
            rng.gen_range(self.min.x..=self.max.x),
            rng.gen_range(self.min.y..=self.max.y),
        )
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
}

/// Clock, randomness, bounds and physics shared by every system.
#[derive(Debug)]
pub struct SimulationWorld {
    pub bounds: WorldBounds,
    pub rng: ChaCha8Rng,
    pub space: PhysicsSpace,
    pub collisions: CollisionRegistry,
    pub events: EventBus,
    pub time_scale: f32,
    pub steps_per_sim_second: u32,
    pub max_query_results: usize,
}

impl SimulationWorld {
    pub fn new(config: &AppConfig) -> Self {
        let rng = match config.world.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            bounds: WorldBounds::new(config.world.width, config.world.height),
            rng,
            space: PhysicsSpace::new(config.physics.cell_size),
            collisions: CollisionRegistry::new(),
            events: EventBus::new(),
            time_scale: config.world.time_scale,
            steps_per_sim_second: config.world.physics_steps_per_sim_second,
            max_query_results: config.physics.max_query_results,
        }
    }

    #[inline]
    pub fn delta_time(&self) -> f32 {
        1.0 / self.steps_per_sim_second as f32
    }

    #[inline]
    pub fn is_within_bounds(&self, point: Vec2) -> bool {
        self.bounds.contains(point)
    }

    pub fn detector(&self) -> CollisionDetector<'_> {
        CollisionDetector::new(&self.space, &self.collisions, self.max_query_results)
    }

    /// Uniform draw in `[0, 1)`.
    pub fn chance(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    /// Uniform draw in `[low, high]`; returns `low` for an empty range.
    pub fn range(&mut self, low: f32, high: f32) -> f32 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    pub fn random_angle(&mut self) -> f32 {
        self.rng.gen_range(0.0..TAU)
    }

    /// A point drawn uniformly from the disk of `max_distance` around
    /// `origin` that lies inside the bounds.
    ///
    /// Gives up after `attempts` rejected draws and returns `origin`.
    pub fn random_destination(&mut self, origin: Vec2, max_distance: f32, attempts: u32) -> Vec2 {
        for _ in 0..attempts {
            let angle = self.rng.gen_range(0.0..TAU);
            let distance = max_distance * self.rng.gen::<f32>().sqrt();
            let candidate = origin + Vec2::from_angle(angle) * distance;
            if self.bounds.contains(candidate) {
                return candidate;
            }
        }
        tracing::warn!(
            x = origin.x,
            z = origin.y,
            attempts,
            "No in-bounds destination found; holding position"
        );
        origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> SimulationWorld {
        let mut config = AppConfig::default();
        config.world.seed = Some(11);
        SimulationWorld::new(&config)
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let bounds = WorldBounds::new(10.0, 5.0);
        assert!(bounds.contains(Vec2::new(0.0, 0.0)));
        assert!(bounds.contains(Vec2::new(10.0, 5.0)));
        assert!(!bounds.contains(Vec2::new(10.01, 2.0)));
        assert!(!bounds.contains(Vec2::new(3.0, -0.01)));
    }

    #[test]
    fn test_random_destination_stays_in_disk_and_bounds() {
        let mut world = seeded();
        let origin = Vec2::new(1.0, 1.0);
        for _ in 0..200 {
            let d = world.random_destination(origin, 10.0, 100);
            assert!(world.is_within_bounds(d));
            assert!(d.distance(origin) <= 10.0 + 1e-4);
        }
    }

    #[test]
    fn test_random_destination_holds_position_when_impossible() {
        let mut world = seeded();
        let outside = Vec2::new(-100.0, -100.0);
        assert_eq!(world.random_destination(outside, 1.0, 5), outside);
    }

    #[test]
    fn test_same_seed_same_draws() {
        let mut a = seeded();
        let mut b = seeded();
        for _ in 0..10 {
            assert_eq!(a.chance(), b.chance());
        }
    }
}
