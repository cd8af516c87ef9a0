//! Map-space vectors, grid tiles, and the polyline helpers used by convoy
//! lanes.
//!
//! World space is measured in tiles: tile `(x, y)` covers the square
//! `[x, x + 1) x [y, y + 1)` and its centre sits at `(x + 0.5, y + 0.5)`.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

// ---------------------------------------------------------------------------
// Vec2
// ---------------------------------------------------------------------------

/// A continuous map-space point or displacement.
#[derive(
    Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, bitcode::Encode, bitcode::Decode,
)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (other - self).length()
    }

    /// Unit vector at `radians`, measured from the +x axis towards +y.
    pub fn from_angle(radians: f64) -> Self {
        Self::new(radians.cos(), radians.sin())
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

// ---------------------------------------------------------------------------
// Tile
// ---------------------------------------------------------------------------

/// An integer grid coordinate.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    bitcode::Encode,
    bitcode::Decode,
)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
}

impl Tile {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The tile a world point rounds to. Halves round towards +infinity.
    pub fn from_world(point: Vec2) -> Self {
        Self::new(round_half_up(point.x), round_half_up(point.y))
    }

    /// World-space centre of this tile.
    pub fn center(self) -> Vec2 {
        Vec2::new(self.x as f64 + 0.5, self.y as f64 + 0.5)
    }

    /// Saturates at `u32::MAX` for tiles at opposite ends of the `i32` range.
    pub fn manhattan(self, other: Tile) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }
}

fn round_half_up(v: f64) -> i32 {
    (v + 0.5).floor() as i32
}

// ---------------------------------------------------------------------------
// Scalar helpers
// ---------------------------------------------------------------------------

/// Move `current` toward `target` by at most `max_delta`.
///
/// A non-positive `max_delta` jumps straight to `target`.
pub fn approach(current: f64, target: f64, max_delta: f64) -> f64 {
    if max_delta <= 0.0 {
        return target;
    }
    if current < target {
        (current + max_delta).min(target)
    } else if current > target {
        (current - max_delta).max(target)
    } else {
        target
    }
}

/// Clamp that tolerates NaN input by falling back to `min`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.max(min).min(max)
}

// ---------------------------------------------------------------------------
// Polylines
// ---------------------------------------------------------------------------

/// Shortest distance from `point` to the segment `a..b`.
pub fn distance_to_segment(a: Vec2, b: Vec2, point: Vec2) -> f64 {
    let ab = b - a;
    let ap = point - a;
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq == 0.0 {
        return point.distance(a);
    }
    let t = clamp((ap.x * ab.x + ap.y * ab.y) / len_sq, 0.0, 1.0);
    point.distance(a + ab * t)
}

/// Shortest distance from `point` to any segment of the polyline.
///
/// A single-point polyline degenerates to point distance; an empty one is
/// infinitely far from everything.
pub fn distance_to_polyline(points: &[Vec2], point: Vec2) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => only.distance(point),
        _ => points
            .windows(2)
            .map(|pair| distance_to_segment(pair[0], pair[1], point))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Total length of a polyline. Degenerate lanes report a length of 1 so
/// progress arithmetic never divides by zero.
pub fn polyline_length(points: &[Vec2]) -> f64 {
    if points.len() <= 1 {
        return 1.0;
    }
    points.windows(2).map(|pair| pair[0].distance(pair[1])).sum()
}

/// The point `progress` units along the polyline (wrapping at `length`).
pub fn sample_polyline(points: &[Vec2], progress: f64, length: f64) -> Vec2 {
    match points {
        [] => Vec2::ZERO,
        [only] => *only,
        _ => {
            let mut remaining = if length > 0.0 {
                progress.rem_euclid(length)
            } else {
                0.0
            };
            for pair in points.windows(2) {
                let segment = pair[0].distance(pair[1]);
                if remaining <= segment {
                    let t = if segment == 0.0 { 0.0 } else { remaining / segment };
                    return pair[0] + (pair[1] - pair[0]) * t;
                }
                remaining -= segment;
            }
            points[points.len() - 1]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_from_world_rounds_half_up() {
        assert_eq!(Tile::from_world(Vec2::new(2.0, 2.0)), Tile::new(2, 2));
        assert_eq!(Tile::from_world(Vec2::new(6.5, 6.49)), Tile::new(7, 6));
        assert_eq!(Tile::from_world(Vec2::new(-0.5, -0.6)), Tile::new(0, -1));
    }

    #[test]
    fn tile_center_offsets_by_half() {
        assert_eq!(Tile::new(3, 4).center(), Vec2::new(3.5, 4.5));
    }

    #[test]
    fn manhattan_counts_both_axes() {
        assert_eq!(Tile::new(1, 1).manhattan(Tile::new(4, -1)), 5);
        assert_eq!(Tile::new(0, 0).manhattan(Tile::new(1, 1)), 2);
        assert_eq!(
            Tile::new(i32::MIN, i32::MIN).manhattan(Tile::new(i32::MAX, 3)),
            u32::MAX
        );
    }

    #[test]
    fn approach_is_bounded_by_max_delta() {
        assert_eq!(approach(0.0, 1.0, 0.25), 0.25);
        assert_eq!(approach(1.0, 0.0, 0.25), 0.75);
        assert_eq!(approach(0.9, 1.0, 0.25), 1.0);
        assert_eq!(approach(0.3, -2.0, 0.0), -2.0);
    }

    #[test]
    fn segment_distance_projects_onto_segment() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(4.0, 0.0);
        assert!((distance_to_segment(a, b, Vec2::new(2.0, 3.0)) - 3.0).abs() < 1e-12);
        assert!((distance_to_segment(a, b, Vec2::new(7.0, 4.0)) - 5.0).abs() < 1e-12);
        assert!((distance_to_segment(a, a, Vec2::new(3.0, 4.0)) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn polyline_distance_takes_minimum_segment() {
        let lane = [Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), Vec2::new(4.0, 4.0)];
        assert!((distance_to_polyline(&lane, Vec2::new(5.0, 3.0)) - 1.0).abs() < 1e-12);
        assert!(distance_to_polyline(&[], Vec2::ZERO).is_infinite());
    }

    #[test]
    fn polyline_length_and_sampling() {
        let lane = [Vec2::new(0.0, 0.0), Vec2::new(3.0, 0.0), Vec2::new(3.0, 4.0)];
        let length = polyline_length(&lane);
        assert!((length - 7.0).abs() < 1e-12);
        assert_eq!(sample_polyline(&lane, 1.5, length), Vec2::new(1.5, 0.0));
        assert_eq!(sample_polyline(&lane, 5.0, length), Vec2::new(3.0, 2.0));
        // Wraps past the end.
        assert_eq!(sample_polyline(&lane, 8.5, length), Vec2::new(1.5, 0.0));
        assert_eq!(polyline_length(&lane[..1]), 1.0);
    }

    #[test]
    fn clamp_handles_nan() {
        assert_eq!(clamp(f64::NAN, 5.0, 100.0), 5.0);
        assert_eq!(clamp(150.0, 5.0, 100.0), 100.0);
    }
}
