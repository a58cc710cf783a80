//! The planning strategy interface and the name-keyed registry of strategies.

use std::collections::HashMap;
use std::time::Duration;

use swarmpath_navigation::{GridMap, Point};

use crate::grid_search::GridSearchPlanner;
use crate::hybrid::HybridPlanner;

/// Everything a strategy needs for one planning call.
#[derive(Debug, Clone, Copy)]
pub struct PlanningRequest<'a> {
    /// Route origin in world coordinates.
    pub start: Point,
    /// Route destination in world coordinates.
    pub end: Point,
    /// Map to plan on. Never mutated while planning.
    pub map: &'a GridMap,
    /// Number of free interior waypoints.
    pub waypoint_count: usize,
    /// Advisory budget. Exceeding it is logged, never enforced.
    pub max_time: Duration,
}

impl<'a> PlanningRequest<'a> {
    /// Default time budget.
    pub const DEFAULT_MAX_TIME: Duration = Duration::from_secs(30);

    /// Creates a request with the default time budget.
    pub fn new(map: &'a GridMap, start: Point, end: Point, waypoint_count: usize) -> Self {
        Self { start, end, map, waypoint_count, max_time: Self::DEFAULT_MAX_TIME }
    }
}

/// Outcome of a planning call. Owned by the caller.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanningResult {
    /// Ordered route, endpoints included.
    pub path: Vec<Point>,
    /// Total polyline length in world units.
    pub length: f64,
    /// Strategy-specific score; higher is better.
    pub fitness: f64,
    /// True when the route was independently checked to be collision-free.
    pub success: bool,
    /// Wall-clock planning time.
    pub elapsed: Duration,
    /// Name of the strategy that produced the result.
    pub algorithm_name: String,
}

impl PlanningResult {
    /// An empty, unsuccessful result.
    pub fn failed(algorithm_name: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            path: Vec::new(),
            length: 0.0,
            fitness: 0.0,
            success: false,
            elapsed,
            algorithm_name: algorithm_name.into(),
        }
    }
}

/// A swappable planning strategy.
///
/// Parameters are addressed by name so callers can tune any strategy the same
/// way. Unknown names read back as `0.0` and are ignored on write.
pub trait PlanningAlgorithm {
    /// Plans a route for `request`.
    ///
    /// Never fails: an impossible request yields a result with `success == false`.
    fn plan(&mut self, request: &PlanningRequest<'_>) -> PlanningResult;

    /// Human-readable strategy name.
    fn name(&self) -> &str;

    /// Reads a named parameter, `0.0` when the name is unknown.
    fn get_parameter(&self, name: &str) -> f64;

    /// Writes a named parameter. Unknown names are ignored.
    fn set_parameter(&mut self, name: &str, value: f64);

    /// Drops per-run state. Configured parameters are kept.
    fn reset(&mut self);

    /// Whether the strategy can repair a plan incrementally after the map changes.
    fn supports_dynamic_replanning(&self) -> bool {
        false
    }

    /// Asymptotic cost of one planning call.
    fn complexity_info(&self) -> &str {
        "unknown"
    }

    /// When to pick this strategy.
    fn usage_description(&self) -> &str {
        "general-purpose path planning"
    }
}

/// Builds a fresh strategy instance.
pub type AlgorithmFactory = fn() -> Box<dyn PlanningAlgorithm>;

/// Maps strategy keys to factories.
#[derive(Debug, Default, Clone)]
pub struct AlgorithmRegistry {
    factories: HashMap<String, AlgorithmFactory>,
}

impl AlgorithmRegistry {
    /// Key of [`HybridPlanner`].
    pub const HYBRID: &'static str = "hybrid-astar-pso";
    /// Key of [`GridSearchPlanner`].
    pub const GRID_SEARCH: &'static str = "astar";

    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in strategy.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Self::HYBRID, new_hybrid);
        registry.register(Self::GRID_SEARCH, new_grid_search);
        registry
    }

    /// Adds or replaces the factory for `name`.
    pub fn register(&mut self, name: impl Into<String>, factory: AlgorithmFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// Instantiates the strategy registered as `name`.
    pub fn create(&self, name: &str) -> Option<Box<dyn PlanningAlgorithm>> {
        self.factories.get(name).map(|factory| factory())
    }

    /// Registered keys, sorted.
    pub fn available(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn new_hybrid() -> Box<dyn PlanningAlgorithm> {
    Box::new(HybridPlanner::new())
}

fn new_grid_search() -> Box<dyn PlanningAlgorithm> {
    Box::new(GridSearchPlanner::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_defaults() {
        let registry = AlgorithmRegistry::with_defaults();
        assert_eq!(registry.available(), vec!["astar", "hybrid-astar-pso"]);

        let hybrid = registry.create("hybrid-astar-pso").unwrap();
        assert_eq!(hybrid.name(), "Hybrid A*-PSO");
        let grid = registry.create("astar").unwrap();
        assert_eq!(grid.name(), "A*");
        assert!(registry.create("rrt-star").is_none());
    }

    #[test]
    fn test_registry_creates_independent_instances() {
        let registry = AlgorithmRegistry::with_defaults();
        let mut first = registry.create(AlgorithmRegistry::HYBRID).unwrap();
        let second = registry.create(AlgorithmRegistry::HYBRID).unwrap();

        first.set_parameter("generations", 7.0);
        assert_eq!(first.get_parameter("generations"), 7.0);
        assert_eq!(second.get_parameter("generations"), 300.0);
    }

    #[test]
    fn test_failed_result() {
        let result = PlanningResult::failed("None", Duration::ZERO);
        assert!(!result.success);
        assert!(result.path.is_empty());
        assert_eq!(result.algorithm_name, "None");
    }
}
