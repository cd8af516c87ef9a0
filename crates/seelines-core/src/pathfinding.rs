//! A* search over the 8-connected walkability grid.
//!
//! Manhattan distance is both the step cost and the heuristic, so a diagonal
//! step costs 2. Diagonals are only taken when both orthogonal neighbours
//! are walkable, which keeps paths from cutting across land corners.
//!
//! Ties on `f` resolve to the node that entered the open set first. A node
//! keeps its original entry position when its score improves, so replays of
//! the same map and endpoints always produce the same path.

use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::geometry::{Tile, Vec2};
use crate::map::GridMap;

const CARDINALS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONALS: [(i32, i32); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];

#[derive(Debug, Clone, Copy)]
struct NodeRecord {
    g: u32,
    f: u32,
    /// Position in the open set's insertion order.
    seq: u64,
    parent: Option<Tile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenEntry {
    f: u32,
    seq: u64,
    tile: Tile,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; invert so the smallest (f, seq) pops first.
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn neighbors(map: &GridMap, at: Tile) -> impl Iterator<Item = Tile> + '_ {
    let cardinals = CARDINALS
        .iter()
        .map(move |&(dx, dy)| Tile::new(at.x + dx, at.y + dy))
        .filter(|&t| map.is_walkable(t));
    let diagonals = DIAGONALS
        .iter()
        .map(move |&(dx, dy)| Tile::new(at.x + dx, at.y + dy))
        .filter(move |&diag| {
            map.is_walkable(diag)
                && map.is_walkable(Tile::new(diag.x, at.y))
                && map.is_walkable(Tile::new(at.x, diag.y))
        });
    cardinals.chain(diagonals)
}

fn reconstruct(records: &HashMap<Tile, NodeRecord>, goal: Tile) -> Vec<Tile> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(parent) = records.get(&current).and_then(|r| r.parent) {
        path.push(parent);
        current = parent;
    }
    path.reverse();
    path
}

/// Find a tile path from `start` to `goal`, inclusive of both ends.
///
/// Returns `None` when `goal` is not walkable or cannot be reached, or when
/// `start` lies outside the map. The start tile's terrain is not checked, so
/// a unit nudged onto a land edge can still plan its way out.
pub fn find_path(map: &GridMap, start: Tile, goal: Tile) -> Option<Vec<Tile>> {
    if !map.is_walkable(goal) || !map.in_bounds(start) {
        return None;
    }

    let mut records: HashMap<Tile, NodeRecord> = HashMap::new();
    let mut closed: HashSet<Tile> = HashSet::new();
    let mut open = BinaryHeap::new();
    let mut next_seq = 0u64;

    let h = start.manhattan(goal);
    records.insert(
        start,
        NodeRecord {
            g: 0,
            f: h,
            seq: next_seq,
            parent: None,
        },
    );
    open.push(OpenEntry {
        f: h,
        seq: next_seq,
        tile: start,
    });
    next_seq += 1;

    while let Some(entry) = open.pop() {
        if closed.contains(&entry.tile) {
            continue;
        }
        let current = match records.get(&entry.tile) {
            Some(record) if record.f == entry.f => *record,
            // Superseded by a cheaper entry for the same tile.
            _ => continue,
        };

        if entry.tile == goal {
            return Some(reconstruct(&records, goal));
        }
        closed.insert(entry.tile);

        for neighbor in neighbors(map, entry.tile) {
            if closed.contains(&neighbor) {
                continue;
            }
            let g = current.g.saturating_add(entry.tile.manhattan(neighbor));
            let f = g.saturating_add(neighbor.manhattan(goal));
            let seq = match records.entry(neighbor) {
                Entry::Occupied(mut slot) => {
                    let record = slot.get_mut();
                    if g >= record.g {
                        continue;
                    }
                    record.g = g;
                    record.f = f;
                    record.parent = Some(entry.tile);
                    record.seq
                }
                Entry::Vacant(slot) => {
                    let seq = next_seq;
                    next_seq += 1;
                    slot.insert(NodeRecord {
                        g,
                        f,
                        seq,
                        parent: Some(entry.tile),
                    });
                    seq
                }
            };
            open.push(OpenEntry {
                f,
                seq,
                tile: neighbor,
            });
        }
    }

    None
}

/// Convert a tile path into world-space waypoints.
///
/// The start tile is dropped because the unit is already standing on it,
/// except for a one-tile path, which is kept so the unit still settles on
/// the tile centre.
pub fn path_to_waypoints(path: &[Tile]) -> Vec<Vec2> {
    if path.len() <= 1 {
        return path.iter().map(|t| t.center()).collect();
    }
    path[1..].iter().map(|t| t.center()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::strip_map;

    fn assert_valid_path(map: &GridMap, path: &[Tile], start: Tile, goal: Tile) {
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        for pair in path.windows(2) {
            let dx = (pair[1].x - pair[0].x).abs();
            let dy = (pair[1].y - pair[0].y).abs();
            assert!(dx <= 1 && dy <= 1 && dx + dy > 0, "non-adjacent step {pair:?}");
        }
        for tile in &path[1..] {
            assert!(map.is_walkable(*tile), "{tile:?} is not walkable");
        }
    }

    #[test]
    fn straight_line_on_open_water() {
        let map = GridMap::open_water(6, 6);
        let path = find_path(&map, Tile::new(0, 0), Tile::new(4, 0)).unwrap();
        assert_eq!(
            path,
            vec![
                Tile::new(0, 0),
                Tile::new(1, 0),
                Tile::new(2, 0),
                Tile::new(3, 0),
                Tile::new(4, 0),
            ]
        );
    }

    #[test]
    fn start_equals_goal() {
        let map = GridMap::open_water(3, 3);
        let path = find_path(&map, Tile::new(1, 1), Tile::new(1, 1)).unwrap();
        assert_eq!(path, vec![Tile::new(1, 1)]);
    }

    #[test]
    fn unwalkable_goal_is_none() {
        let map = strip_map();
        assert!(find_path(&map, Tile::new(0, 0), Tile::new(4, 3)).is_none());
        assert!(find_path(&map, Tile::new(4, 3), Tile::new(4, 3)).is_none());
        assert!(find_path(&map, Tile::new(0, 0), Tile::new(-1, 0)).is_none());
    }

    #[test]
    fn off_map_start_is_none() {
        let map = GridMap::open_water(8, 8);
        assert!(find_path(&map, Tile::new(i32::MIN, i32::MIN), Tile::new(3, 3)).is_none());
        assert!(find_path(&map, Tile::new(i32::MAX, 0), Tile::new(3, 3)).is_none());
        assert!(find_path(&map, Tile::new(8, 3), Tile::new(3, 3)).is_none());
    }

    #[test]
    fn enclosed_goal_is_none() {
        let map = GridMap::from_rows(&[".....", ".###.", ".#.#.", ".###.", "....."]).unwrap();
        assert!(find_path(&map, Tile::new(0, 0), Tile::new(2, 2)).is_none());
    }

    #[test]
    fn routes_around_the_strip() {
        let map = strip_map();
        let start = Tile::new(2, 2);
        let goal = Tile::new(6, 6);
        let path = find_path(&map, start, goal).unwrap();
        assert_valid_path(&map, &path, start, goal);
        assert!(
            path.iter().all(|t| !(t.x == 4 && (2..=5).contains(&t.y))),
            "path crosses the strip: {path:?}"
        );
    }

    #[test]
    fn diagonal_blocked_by_land_corner() {
        // (1,0) is land, so (0,0) -> (1,1) may not be taken diagonally.
        let map = GridMap::from_rows(&[".#.", "...", "..."]).unwrap();
        let path = find_path(&map, Tile::new(0, 0), Tile::new(1, 1)).unwrap();
        assert_eq!(path, vec![Tile::new(0, 0), Tile::new(0, 1), Tile::new(1, 1)]);
    }

    #[test]
    fn diagonal_allowed_on_open_water() {
        let map = GridMap::open_water(3, 3);
        let path = find_path(&map, Tile::new(0, 0), Tile::new(1, 1)).unwrap();
        // The diagonal records its parent on discovery and no cardinal
        // detour beats its g of 2.
        assert_eq!(path, vec![Tile::new(0, 0), Tile::new(1, 1)]);
    }

    #[test]
    fn identical_queries_are_identical() {
        let map = GridMap::skirmish();
        let a = find_path(&map, Tile::new(3, 12), Tile::new(20, 4));
        let b = find_path(&map, Tile::new(3, 12), Tile::new(20, 4));
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn waypoints_drop_start_and_center_tiles() {
        let path = [Tile::new(0, 0), Tile::new(1, 0), Tile::new(2, 1)];
        assert_eq!(
            path_to_waypoints(&path),
            vec![Vec2::new(1.5, 0.5), Vec2::new(2.5, 1.5)]
        );
        assert_eq!(
            path_to_waypoints(&[Tile::new(3, 3)]),
            vec![Vec2::new(3.5, 3.5)]
        );
        assert!(path_to_waypoints(&[]).is_empty());
    }
}
