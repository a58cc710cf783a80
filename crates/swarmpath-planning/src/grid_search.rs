//! Grid search wrapped as a planning strategy.

use std::time::Instant;

use tracing::{debug, info};

use swarmpath_navigation::astar_search;

use crate::algorithm::{PlanningAlgorithm, PlanningRequest, PlanningResult};
use crate::fitness::{path_collides, path_length};

const NAME: &str = "A*";

/// Plain grid search exposed as a planning strategy.
///
/// The result is the guide path itself; the waypoint count of the request is
/// ignored. Fitness is the negated length, so shorter routes score higher.
#[derive(Debug, Default, Clone)]
pub struct GridSearchPlanner;

impl GridSearchPlanner {
    /// Creates the planner. It has no parameters.
    pub fn new() -> Self {
        Self
    }
}

impl PlanningAlgorithm for GridSearchPlanner {
    fn plan(&mut self, request: &PlanningRequest<'_>) -> PlanningResult {
        let started = Instant::now();
        let path = astar_search(request.map, request.start, request.end);
        let elapsed = started.elapsed();
        if path.is_empty() {
            info!(start = %request.start, end = %request.end, "Grid search found no route");
            return PlanningResult::failed(NAME, elapsed);
        }

        let length = path_length(&path);
        // forced exact endpoints can leave the centre line of their cells
        let success = !path_collides(request.map, &path);
        info!(points = path.len(), length, success, "Grid search finished");
        PlanningResult {
            path,
            length,
            fitness: -length,
            success,
            elapsed,
            algorithm_name: NAME.to_string(),
        }
    }

    fn name(&self) -> &str {
        NAME
    }

    fn get_parameter(&self, _name: &str) -> f64 {
        0.0
    }

    fn set_parameter(&mut self, name: &str, _value: f64) {
        debug!(name, "Grid search has no tunable parameters");
    }

    fn reset(&mut self) {}

    fn complexity_info(&self) -> &str {
        "O(b^d), bounded by O(W*H log(W*H)) on a W x H grid"
    }

    fn usage_description(&self) -> &str {
        "fast shortest route on the grid when smoothness does not matter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarmpath_navigation::{GridMap, Point};

    #[test]
    fn test_grid_search_plan() {
        let map = GridMap::with_default_layout(20, 20, 1.0).unwrap();
        let start = Point::new(2.0, 2.0);
        let end = Point::new(17.0, 17.0);
        let mut planner = GridSearchPlanner::new();

        let result = planner.plan(&PlanningRequest::new(&map, start, end, 6));
        assert!(!result.path.is_empty());
        assert_eq!(result.path[0], start);
        assert_eq!(*result.path.last().unwrap(), end);
        assert_eq!(result.fitness, -result.length);
        assert_eq!(result.algorithm_name, "A*");
    }

    #[test]
    fn test_grid_search_unreachable() {
        let map = GridMap::with_default_layout(20, 20, 1.0).unwrap();
        let mut planner = GridSearchPlanner::new();
        // (0.5, 0.5) is on the border
        let request = PlanningRequest::new(&map, Point::new(0.5, 0.5), Point::new(17.0, 17.0), 6);
        let result = planner.plan(&request);
        assert!(!result.success);
        assert!(result.path.is_empty());
    }

    #[test]
    fn test_no_parameters() {
        let mut planner = GridSearchPlanner::new();
        planner.set_parameter("generations", 10.0);
        assert_eq!(planner.get_parameter("generations"), 0.0);
    }
}
