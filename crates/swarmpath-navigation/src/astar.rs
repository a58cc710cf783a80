/*

A* = f(n) = g(n) + h(n)

Where:
    n = a cell of the grid map
    g(n) = cost from the start cell to n (1 per orthogonal step, sqrt(2) per diagonal step)
    h(n) = Euclidean distance from n to the goal cell, in cells
    f(n) = estimated cost of the cheapest route through n

Initialize:
    - heap of cells to explore, keyed by f
    - closed set of finalized cells
    - open set of cells currently waiting in the heap

Loop:
    - pop the cell with the lowest f
    - if it is the goal, walk the parent chain back to the start
    - close it
    - for each of the 8 neighbours that is inside the map and free:
        - skip it if it is closed or already waiting in the heap
        - otherwise push it with g = g(current) + step cost

A neighbour that is already queued is never re-keyed when a cheaper route shows
up later, and diagonal steps do not look at the two flanking cells. Both are
deliberate: the guide path shapes that downstream fitness terms are tuned on
depend on them.

*/

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::f64::consts::SQRT_2;

use tracing::debug;

use crate::map::{Cell, GridMap, GridPoint, Point};

const DIRECTIONS: [(isize, isize); 8] =
    [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)];

fn euclidean_distance(a: GridPoint, b: GridPoint) -> f64 {
    let dx = a.x as f64 - b.x as f64;
    let dy = a.y as f64 - b.y as f64;
    (dx * dx + dy * dy).sqrt()
}

fn step_cost(dx: isize, dy: isize) -> f64 {
    if dx == 0 || dy == 0 { 1.0 } else { SQRT_2 }
}

fn is_free(map: &GridMap, p: GridPoint) -> bool {
    matches!(map.get_cell(p), Ok(Cell::Free))
}

/// One discovered cell. Nodes live in a per-search arena and point at their
/// parent by index, so the ancestor chain is a plain tree.
#[derive(Copy, Clone, Debug)]
struct SearchNode {
    cell: GridPoint,
    g: f64,
    h: f64,
    parent: Option<usize>,
}

impl SearchNode {
    fn f(&self) -> f64 {
        self.g + self.h
    }
}

#[derive(Copy, Clone, Debug)]
struct State {
    cost: f64,
    node: usize,
}

// The priority queue depends on `Ord`.
// Flip the ordering on costs so the queue becomes a min-heap; on a tie the
// earlier-discovered node wins.
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

fn reconstruct_path(
    map: &GridMap,
    nodes: &[SearchNode],
    goal_node: usize,
    start: Point,
    goal: Point,
) -> Vec<Point> {
    let mut path = Vec::new();
    let mut current = Some(goal_node);
    while let Some(index) = current {
        path.push(map.cell_center(nodes[index].cell));
        current = nodes[index].parent;
    }
    path.reverse();

    // Endpoints are the exact request coordinates, not cell centres.
    if let Some(first) = path.first_mut() {
        *first = start;
    }
    if let Some(last) = path.last_mut() {
        *last = goal;
    }
    path
}

/// Finds an 8-connected route from `start` to `goal` over the free cells of `map`.
///
/// Returns the world-space route: the exact `start`, the centres of the
/// intermediate cells, and the exact `goal`. The result is empty when either
/// endpoint is outside the map or on an obstacle, or when the goal cannot be
/// reached. When both endpoints share a cell the result is `[start, goal]`.
pub fn astar_search(map: &GridMap, start: Point, goal: Point) -> Vec<Point> {
    let (Some(start_cell), Some(goal_cell)) = (map.world_to_grid(start), map.world_to_grid(goal))
    else {
        debug!(%start, %goal, "Grid search endpoint outside the map");
        return Vec::new();
    };
    if !is_free(map, start_cell) || !is_free(map, goal_cell) {
        debug!(%start, %goal, "Grid search endpoint on an obstacle");
        return Vec::new();
    }
    if start_cell == goal_cell {
        return vec![start, goal];
    }

    let width = map.width();
    let height = map.height();
    let index_of = |p: GridPoint| p.y * width + p.x;

    let mut nodes: Vec<SearchNode> = Vec::new();
    let mut open_list = BinaryHeap::new();
    let mut open_set = vec![false; width * height];
    let mut closed_set = vec![false; width * height];

    nodes.push(SearchNode {
        cell: start_cell,
        g: 0.0,
        h: euclidean_distance(start_cell, goal_cell),
        parent: None,
    });
    open_list.push(State { cost: nodes[0].f(), node: 0 });
    open_set[index_of(start_cell)] = true;

    let mut expanded = 0usize;
    while let Some(State { node: current, .. }) = open_list.pop() {
        let SearchNode { cell, g, .. } = nodes[current];
        let id = index_of(cell);
        if closed_set[id] {
            continue;
        }
        open_set[id] = false;
        closed_set[id] = true;
        expanded += 1;

        if cell == goal_cell {
            debug!(expanded, cost = g, "Grid search reached the goal");
            return reconstruct_path(map, &nodes, current, start, goal);
        }

        for (dx, dy) in DIRECTIONS {
            let nx = cell.x as isize + dx;
            let ny = cell.y as isize + dy;
            if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                continue;
            }
            let neighbor = GridPoint::new(nx as usize, ny as usize);
            if !is_free(map, neighbor) {
                continue;
            }

            let neighbor_id = index_of(neighbor);
            if closed_set[neighbor_id] || open_set[neighbor_id] {
                continue;
            }

            let node = SearchNode {
                cell: neighbor,
                g: g + step_cost(dx, dy),
                h: euclidean_distance(neighbor, goal_cell),
                parent: Some(current),
            };
            nodes.push(node);
            open_list.push(State { cost: node.f(), node: nodes.len() - 1 });
            open_set[neighbor_id] = true;
        }
    }

    debug!(expanded, "Grid search exhausted the open set");
    Vec::new()
}
