//! Planning facade holding the current mission and a swappable strategy.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use swarmpath_navigation::{GridMap, Point};

use crate::algorithm::{PlanningAlgorithm, PlanningRequest, PlanningResult};
use crate::fitness::{path_collides, path_length, turn_cosine};

/// Path quality metrics that depend only on a path and a map.
#[derive(Debug, Clone, Copy)]
pub struct PathEvaluator<'a> {
    map: &'a GridMap,
}

impl<'a> PathEvaluator<'a> {
    /// Creates an evaluator for `map`.
    pub fn new(map: &'a GridMap) -> Self {
        Self { map }
    }

    /// Total polyline length.
    pub fn length(&self, path: &[Point]) -> f64 {
        path_length(path)
    }

    /// Whether any hop of the path hits an obstacle or leaves the map.
    pub fn collides(&self, path: &[Point]) -> bool {
        path_collides(self.map, path)
    }

    /// Mean turn cosine over interior points, in `[-1, 1]`. `1.0` for paths
    /// with fewer than three points. Zero-length hops count as `0`.
    pub fn smoothness(&self, path: &[Point]) -> f64 {
        if path.len() < 3 {
            return 1.0;
        }
        let total: f64 = path
            .windows(3)
            .map(|w| turn_cosine(w[0], w[1], w[2]).unwrap_or(0.0))
            .sum();
        total / (path.len() - 2) as f64
    }
}

/// Holds the map, endpoints and waypoint count of the current mission and
/// delegates planning to the installed strategy.
pub struct PathPlanner {
    map: Arc<GridMap>,
    start: Point,
    end: Point,
    waypoint_count: usize,
    max_time: Duration,
    algorithm: Option<Box<dyn PlanningAlgorithm>>,
    best_path: Vec<Point>,
}

impl PathPlanner {
    /// Creates a facade. `algorithm` may be installed later with
    /// [`set_algorithm`](Self::set_algorithm).
    pub fn new(
        map: Arc<GridMap>,
        start: Point,
        end: Point,
        algorithm: Option<Box<dyn PlanningAlgorithm>>,
        waypoint_count: usize,
    ) -> Self {
        Self {
            map,
            start,
            end,
            waypoint_count,
            max_time: PlanningRequest::DEFAULT_MAX_TIME,
            algorithm,
            best_path: Vec::new(),
        }
    }

    /// Replaces both endpoints.
    pub fn set_start_end(&mut self, start: Point, end: Point) {
        self.start = start;
        self.end = end;
    }

    /// Sets the number of interior waypoints requested from the strategy.
    pub fn set_waypoint_count(&mut self, waypoint_count: usize) {
        self.waypoint_count = waypoint_count;
    }

    /// Sets the advisory time budget.
    pub fn set_max_time(&mut self, max_time: Duration) {
        self.max_time = max_time;
    }

    /// Swaps the map used by subsequent plans.
    pub fn set_map(&mut self, map: Arc<GridMap>) {
        self.map = map;
    }

    /// Map used for planning.
    pub fn map(&self) -> &GridMap {
        &self.map
    }

    /// Installs a new strategy, dropping the previous one.
    pub fn set_algorithm(&mut self, algorithm: Box<dyn PlanningAlgorithm>) {
        debug!(algorithm = algorithm.name(), "Planning strategy installed");
        self.algorithm = Some(algorithm);
    }

    /// Name of the installed strategy, `"None"` when there is none.
    pub fn algorithm_name(&self) -> &str {
        self.algorithm.as_deref().map_or("None", |a| a.name())
    }

    /// The installed strategy.
    pub fn algorithm(&self) -> Option<&dyn PlanningAlgorithm> {
        self.algorithm.as_deref()
    }

    /// Forwards a parameter to the installed strategy.
    pub fn set_parameter(&mut self, name: &str, value: f64) {
        if let Some(algorithm) = self.algorithm.as_mut() {
            algorithm.set_parameter(name, value);
        }
    }

    /// Reads a parameter from the installed strategy, `0.0` without one.
    pub fn get_parameter(&self, name: &str) -> f64 {
        self.algorithm.as_ref().map_or(0.0, |a| a.get_parameter(name))
    }

    /// Plans with the current mission state.
    ///
    /// The result's path becomes the best path only when it is successful.
    pub fn plan(&mut self) -> PlanningResult {
        let Some(algorithm) = self.algorithm.as_mut() else {
            warn!("No planning strategy installed");
            return PlanningResult::failed("None", Duration::ZERO);
        };

        let request = PlanningRequest {
            start: self.start,
            end: self.end,
            map: &self.map,
            waypoint_count: self.waypoint_count,
            max_time: self.max_time,
        };
        let result = algorithm.plan(&request);
        if result.success {
            self.best_path.clone_from(&result.path);
        }
        result
    }

    /// Path of the last successful plan.
    pub fn best_path(&self) -> &[Point] {
        &self.best_path
    }

    /// Evaluator bound to the current map.
    pub fn evaluator(&self) -> PathEvaluator<'_> {
        PathEvaluator::new(&self.map)
    }
}
