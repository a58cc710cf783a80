//! Scoring of candidate waypoint paths against the map and a guide path.
//!
//! A candidate is `[start, w_1, ..., w_n, end]`. Its fitness starts from
//! [`BASE_SCORE`] and is adjusted by five independent terms, collected in a
//! [`FitnessBreakdown`] so callers can inspect which term dominates.

use swarmpath_navigation::{GridMap, Point};

/// Starting score of every candidate.
pub const BASE_SCORE: f64 = 1000.0;
/// Charged once per colliding hop.
pub const COLLISION_PENALTY: f64 = 500.0;
/// Charged once per interior waypoint outside the map.
pub const BOUNDARY_PENALTY: f64 = 300.0;
/// Charged per world unit of path length.
pub const LENGTH_WEIGHT: f64 = 0.5;
/// Awarded per unit of turn cosine at each interior waypoint.
pub const SMOOTHNESS_SCALE: f64 = 10.0;

const DEGENERATE: f64 = 1e-8;

/// The individual terms of a candidate's fitness.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FitnessBreakdown {
    /// Number of hops flagged by [`GridMap::segment_collides`].
    pub collisions: usize,
    /// Number of interior waypoints outside the map.
    pub out_of_bounds: usize,
    /// Total path length.
    pub length: f64,
    /// Sum of interior waypoint distances to the guide path.
    pub deviation: f64,
    /// Weight applied to `deviation`.
    pub deviation_weight: f64,
    /// Sum of turn cosines at interior waypoints.
    pub smoothness: f64,
}

impl FitnessBreakdown {
    /// Scores `path` on `map`. An empty `guide` disables the deviation term.
    pub fn evaluate(map: &GridMap, path: &[Point], guide: &[Point], deviation_weight: f64) -> Self {
        let interior = interior(path);
        Self {
            collisions: path.windows(2).filter(|hop| map.segment_collides(hop[0], hop[1])).count(),
            out_of_bounds: interior.iter().filter(|p| !map.bounds_check(**p)).count(),
            length: path_length(path),
            deviation: guide_deviation(interior, guide),
            deviation_weight,
            smoothness: turn_cosine_sum(path),
        }
    }

    /// Combined fitness; higher is better.
    pub fn total(&self) -> f64 {
        BASE_SCORE
            - COLLISION_PENALTY * self.collisions as f64
            - BOUNDARY_PENALTY * self.out_of_bounds as f64
            - LENGTH_WEIGHT * self.length
            - self.deviation_weight * self.deviation
            + SMOOTHNESS_SCALE * self.smoothness
    }
}

fn interior(path: &[Point]) -> &[Point] {
    if path.len() < 2 { &[] } else { &path[1..path.len() - 1] }
}

/// Sum of hop lengths.
pub fn path_length(path: &[Point]) -> f64 {
    path.windows(2).map(|hop| hop[0].distance_to(hop[1])).sum()
}

/// Whether any hop of `path` collides on `map`.
pub fn path_collides(map: &GridMap, path: &[Point]) -> bool {
    path.windows(2).any(|hop| map.segment_collides(hop[0], hop[1]))
}

/// Shortest distance from `p` to the segment `a`-`b`. A segment shorter than
/// numerical noise is treated as the point `a`.
pub fn point_to_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    if len_sq < DEGENERATE {
        return p.distance_to(a);
    }

    let t = (p - a).dot(ab) / len_sq;
    let closest = if t < 0.0 {
        a
    } else if t > 1.0 {
        b
    } else {
        Point::new(a.x + t * ab.x, a.y + t * ab.y)
    };
    p.distance_to(closest)
}

/// Sum over `waypoints` of the distance to the nearest segment of `guide`.
/// Zero when `guide` has fewer than two points.
pub fn guide_deviation(waypoints: &[Point], guide: &[Point]) -> f64 {
    if guide.len() < 2 {
        return 0.0;
    }
    waypoints
        .iter()
        .map(|&w| {
            guide
                .windows(2)
                .map(|seg| point_to_segment_distance(w, seg[0], seg[1]))
                .fold(f64::INFINITY, f64::min)
        })
        .sum()
}

/// Cosine of the turn at `curr`, or `None` when either adjoining hop has no length.
pub fn turn_cosine(prev: Point, curr: Point, next: Point) -> Option<f64> {
    let incoming = curr - prev;
    let outgoing = next - curr;
    let (m1, m2) = (incoming.norm(), outgoing.norm());
    if m1 > DEGENERATE && m2 > DEGENERATE {
        Some(incoming.dot(outgoing) / (m1 * m2))
    } else {
        None
    }
}

/// Sum of turn cosines over interior points; degenerate turns contribute 0.
pub fn turn_cosine_sum(path: &[Point]) -> f64 {
    path.windows(3).filter_map(|w| turn_cosine(w[0], w[1], w[2])).sum()
}

/// Builds `[start, (v[0], v[1]), (v[2], v[3]), ..., end]` from a flat coordinate vector.
pub fn decode_path(start: Point, end: Point, coordinates: &[f64]) -> Vec<Point> {
    let mut path = Vec::with_capacity(coordinates.len() / 2 + 2);
    path.push(start);
    path.extend(coordinates.chunks_exact(2).map(|xy| Point::new(xy[0], xy[1])));
    path.push(end);
    path
}
