use orchard_data::Rid;
use std::collections::HashMap;

/// Uniform grid broadphase over physics shapes.
///
/// Each shape is bucketed by the cell containing its center. Shapes may be
/// larger than a cell, so queries widen their search window by the largest
/// radius ever inserted (`max_radius`).
///
/// Unlike a bounded grid, cells are keyed by integer coordinates, so shapes
/// that leave the world (a rolling fruit, for instance) stay indexed.
///
/// # Examples
/// ```
/// use orchard_core::spatial_hash::SpatialHash;
/// use orchard_data::{Rid, Vec2};
///
/// let mut spatial = SpatialHash::new(5.0);
/// spatial.insert(Rid(1), Vec2::new(12.0, 3.0), 1.0);
///
/// let mut nearby = Vec::new();
/// spatial.query_into(Vec2::new(10.0, 3.0), 2.0, &mut nearby);
/// assert_eq!(nearby, vec![Rid(1)]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SpatialHash {
    pub cell_size: f32,
    cells: HashMap<(i32, i32), Vec<Rid>>,
    max_radius: f32,
    len: usize,
}

impl SpatialHash {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            max_radius: 0.0,
            len: 0,
        }
    }

    /// Grid coordinates of the cell containing `(x, z)`.
    ///
    /// Non-finite coordinates and coordinates that would overflow `i32`
    /// return `None`.
    #[inline]
    pub fn get_cell(&self, x: f32, z: f32) -> Option<(i32, i32)> {
        if !x.is_finite() || !z.is_finite() {
            return None;
        }
        let limit = i32::MAX as f32 * self.cell_size;
        if x.abs() >= limit || z.abs() >= limit {
            return None;
        }
        Some((
            (x / self.cell_size).floor() as i32,
            (z / self.cell_size).floor() as i32,
        ))
    }

    /// Returns false when the position cannot be indexed.
    pub fn insert(&mut self, rid: Rid, position: glam::Vec2, radius: f32) -> bool {
        let Some(cell) = self.get_cell(position.x, position.y) else {
            return false;
        };
        self.cells.entry(cell).or_default().push(rid);
        self.max_radius = self.max_radius.max(radius);
        self.len += 1;
        true
    }

    pub fn remove(&mut self, rid: Rid, position: glam::Vec2) -> bool {
        let Some(cell) = self.get_cell(position.x, position.y) else {
            return false;
        };
        let Some(bucket) = self.cells.get_mut(&cell) else {
            return false;
        };
        let Some(idx) = bucket.iter().position(|&r| r == rid) else {
            return false;
        };
        bucket.remove(idx);
        if bucket.is_empty() {
            self.cells.remove(&cell);
        }
        self.len -= 1;
        true
    }

    /// Moves `rid` between buckets when its cell changes.
    pub fn relocate(&mut self, rid: Rid, from: glam::Vec2, to: glam::Vec2, radius: f32) {
        if self.get_cell(from.x, from.y) == self.get_cell(to.x, to.y) {
            return;
        }
        self.remove(rid, from);
        self.insert(rid, to, radius);
    }

    /// Calls `callback` for every shape whose bounds may reach the disk at
    /// `center` with `radius`. Candidates still need an exact overlap test.
    pub fn query_callback<F>(&self, center: glam::Vec2, radius: f32, mut callback: F)
    where
        F: FnMut(Rid),
    {
        let reach = radius + self.max_radius;
        let (Some((min_cx, min_cz)), Some((max_cx, max_cz))) = (
            self.get_cell(center.x - reach, center.y - reach),
            self.get_cell(center.x + reach, center.y + reach),
        ) else {
            return;
        };

        for cz in min_cz..=max_cz {
            for cx in min_cx..=max_cx {
                if let Some(bucket) = self.cells.get(&(cx, cz)) {
                    for &rid in bucket {
                        callback(rid);
                    }
                }
            }
        }
    }

    pub fn query_into(&self, center: glam::Vec2, radius: f32, results: &mut Vec<Rid>) {
        self.query_callback(center, radius, |rid| results.push(rid));
    }

    pub fn count_nearby(&self, center: glam::Vec2, radius: f32) -> usize {
        let mut count = 0;
        self.query_callback(center, radius, |_| count += 1);
        count
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
