//! The grid-search guided particle swarm planner.

/*

Hybrid planning in two stages:

    1. Grid search from start to end gives a guide path (possibly empty).
    2. A particle swarm searches the 2N-dimensional box
           [0, world_width] x [0, world_height] repeated N times
       where each particle encodes N interior waypoints. The fitness of a
       particle is the FitnessBreakdown of [start, w_1..w_N, end], with the
       guide path anchoring the deviation term.

The winning particle is decoded and its route re-checked for collisions on its
own; that re-check alone decides success.

*/

use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use swarmpath_navigation::{Point, astar_search};
use swarmpath_optim::{ParticleSwarm, SwarmConfig};

use crate::algorithm::{PlanningAlgorithm, PlanningRequest, PlanningResult};
use crate::fitness::{FitnessBreakdown, decode_path, path_collides, path_length};

const NAME: &str = "Hybrid A*-PSO";

/// Grid-search guided particle swarm planner.
#[derive(Debug, Clone)]
pub struct HybridPlanner {
    particle_count: usize,
    generations: usize,
    deviation_weight: f64,
    max_speed: f64,
    global_guide_coe: f64,
    local_guide_coe: f64,
    seed: Option<u64>,
    rng: StdRng,
    guide_path: Vec<Point>,
    convergence: Vec<f64>,
}

impl Default for HybridPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl HybridPlanner {
    /// A planner with default parameters, seeded from the operating system.
    pub fn new() -> Self {
        Self::with_rng(None, StdRng::from_os_rng())
    }

    /// A planner whose runs are reproducible: the generator is seeded with
    /// `seed` now and again on every [`reset`](PlanningAlgorithm::reset).
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(Some(seed), StdRng::seed_from_u64(seed))
    }

    fn with_rng(seed: Option<u64>, rng: StdRng) -> Self {
        let swarm = SwarmConfig::default();
        Self {
            particle_count: swarm.particle_count,
            generations: 300,
            deviation_weight: 5.0,
            max_speed: swarm.max_speed,
            global_guide_coe: swarm.global_guide_coe,
            local_guide_coe: swarm.local_guide_coe,
            seed,
            rng,
            guide_path: Vec::new(),
            convergence: Vec::new(),
        }
    }

    /// Guide path of the last run, empty before the first run or after a reset.
    pub fn guide_path(&self) -> &[Point] {
        &self.guide_path
    }

    /// Global best fitness after seeding and after every generation of the last run.
    pub fn convergence(&self) -> &[f64] {
        &self.convergence
    }

    fn swarm_config(&self) -> SwarmConfig {
        SwarmConfig {
            particle_count: self.particle_count,
            global_guide_coe: self.global_guide_coe,
            local_guide_coe: self.local_guide_coe,
            max_speed: self.max_speed,
            ..SwarmConfig::default()
        }
    }
}

impl PlanningAlgorithm for HybridPlanner {
    fn plan(&mut self, request: &PlanningRequest<'_>) -> PlanningResult {
        let started = Instant::now();
        let map = request.map;
        let (start, end) = (request.start, request.end);
        info!(%start, %end, waypoints = request.waypoint_count, "Hybrid planning started");

        self.guide_path = astar_search(map, start, end);
        let deviation_weight = if self.guide_path.is_empty() {
            warn!("No guide path found, optimizing without deviation term");
            0.0
        } else {
            debug!(points = self.guide_path.len(), "Guide path ready");
            self.deviation_weight
        };

        let (world_width, world_height) = map.world_size();
        let dimension = request.waypoint_count * 2;
        let lower = vec![0.0; dimension];
        let upper: Vec<f64> = (0..dimension)
            .map(|i| if i % 2 == 0 { world_width } else { world_height })
            .collect();

        let config = self.swarm_config();
        let guide = &self.guide_path;
        let fitness = |position: &[f64]| {
            let path = decode_path(start, end, position);
            FitnessBreakdown::evaluate(map, &path, guide, deviation_weight).total()
        };

        let swarm = ParticleSwarm::new(fitness, lower, upper, config, &mut self.rng);
        let mut swarm = match swarm {
            Ok(swarm) => swarm,
            Err(err) => {
                warn!(%err, "Swarm configuration rejected");
                return PlanningResult::failed(NAME, started.elapsed());
            }
        };
        let (best, history) = swarm.find_max_tracked(self.generations);
        self.convergence = history;

        let path = decode_path(start, end, &best.best_position);
        let length = path_length(&path);
        let success = !path_collides(map, &path);
        let elapsed = started.elapsed();

        if elapsed > request.max_time {
            warn!(?elapsed, budget = ?request.max_time, "Hybrid planning exceeded its time budget");
        }
        info!(length, fitness = best.best_fitness, success, ?elapsed, "Hybrid planning finished");

        PlanningResult {
            path,
            length,
            fitness: best.best_fitness,
            success,
            elapsed,
            algorithm_name: NAME.to_string(),
        }
    }

    fn name(&self) -> &str {
        NAME
    }

    fn get_parameter(&self, name: &str) -> f64 {
        match name {
            "particle_count" => self.particle_count as f64,
            "generations" => self.generations as f64,
            "deviation_weight" => self.deviation_weight,
            "max_speed" => self.max_speed,
            "global_guide_coe" => self.global_guide_coe,
            "local_guide_coe" => self.local_guide_coe,
            _ => 0.0,
        }
    }

    fn set_parameter(&mut self, name: &str, value: f64) {
        match name {
            "particle_count" => self.particle_count = (value as usize).max(1),
            "generations" => self.generations = value as usize,
            "deviation_weight" => self.deviation_weight = value,
            "max_speed" => self.max_speed = value,
            "global_guide_coe" => self.global_guide_coe = value,
            "local_guide_coe" => self.local_guide_coe = value,
            _ => debug!(name, "Ignoring unknown parameter"),
        }
    }

    fn reset(&mut self) {
        self.guide_path.clear();
        self.convergence.clear();
        if let Some(seed) = self.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
    }

    fn complexity_info(&self) -> &str {
        "grid search O(b^d), swarm O(P*G*D) for P particles, G generations, D = 2 * waypoints"
    }

    fn usage_description(&self) -> &str {
        "cluttered maps where a short, smooth route close to the shortest grid route is wanted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarmpath_navigation::{Cell, GridMap, GridPoint};

    fn small_planner(seed: u64) -> HybridPlanner {
        let mut planner = HybridPlanner::with_seed(seed);
        planner.set_parameter("particle_count", 30.0);
        planner.set_parameter("generations", 40.0);
        planner
    }

    #[test]
    fn test_default_parameters() {
        let planner = HybridPlanner::with_seed(0);
        assert_eq!(planner.get_parameter("particle_count"), 150.0);
        assert_eq!(planner.get_parameter("generations"), 300.0);
        assert_eq!(planner.get_parameter("deviation_weight"), 5.0);
        assert_eq!(planner.get_parameter("max_speed"), 4.0);
        assert_eq!(planner.get_parameter("global_guide_coe"), 2.0);
        assert_eq!(planner.get_parameter("local_guide_coe"), 2.0);
        assert_eq!(planner.get_parameter("inertia"), 0.0);
        assert!(!planner.supports_dynamic_replanning());
    }

    #[test]
    fn test_set_parameter() {
        let mut planner = HybridPlanner::with_seed(0);
        planner.set_parameter("max_speed", 1.5);
        planner.set_parameter("particle_count", 0.0);
        planner.set_parameter("bogus", 3.0);
        assert_eq!(planner.get_parameter("max_speed"), 1.5);
        assert_eq!(planner.get_parameter("particle_count"), 1.0);
        assert_eq!(planner.get_parameter("bogus"), 0.0);
    }

    #[test]
    fn test_plan_shape() {
        let map = GridMap::new(20, 20, 1.0).unwrap();
        let start = Point::new(2.0, 2.0);
        let end = Point::new(17.0, 17.0);
        let mut planner = small_planner(1);

        let result = planner.plan(&PlanningRequest::new(&map, start, end, 4));

        assert_eq!(result.path.len(), 6);
        assert_eq!(result.path[0], start);
        assert_eq!(result.path[5], end);
        assert_eq!(result.algorithm_name, "Hybrid A*-PSO");
        assert!((result.length - path_length(&result.path)).abs() < 1e-12);
        assert_eq!(result.success, !path_collides(&map, &result.path));
        assert!(!planner.guide_path().is_empty());
        assert_eq!(planner.convergence().len(), 41);
        for p in &result.path[1..5] {
            assert!(map.bounds_check(*p) || p.x == 20.0 || p.y == 20.0);
        }
    }

    #[test]
    fn test_open_map_plan_succeeds() {
        let map = GridMap::new(20, 20, 1.0).unwrap();
        let mut planner = small_planner(2);
        let request = PlanningRequest::new(&map, Point::new(2.0, 2.0), Point::new(17.0, 17.0), 3);
        let result = planner.plan(&request);
        assert!(result.success);
        assert!(result.fitness > 900.0);
    }

    #[test]
    fn test_seeded_runs_repeat_after_reset() {
        let map = GridMap::with_default_layout(20, 20, 1.0).unwrap();
        let request = PlanningRequest::new(&map, Point::new(2.0, 2.0), Point::new(17.0, 17.0), 3);
        let mut planner = small_planner(3);

        let first = planner.plan(&request);
        planner.reset();
        assert!(planner.guide_path().is_empty());
        assert!(planner.convergence().is_empty());
        assert_eq!(planner.get_parameter("particle_count"), 30.0);

        let second = planner.plan(&request);
        assert_eq!(first.path, second.path);
        assert_eq!(first.fitness, second.fitness);
    }

    #[test]
    fn test_missing_guide_path_is_not_fatal() {
        // the goal is walled in, so grid search fails
        let mut map = GridMap::new(10, 10, 1.0).unwrap();
        for (x, y) in [(6, 6), (7, 6), (8, 6), (6, 7), (8, 7), (6, 8), (7, 8), (8, 8)] {
            map.set_cell(GridPoint::new(x, y), Cell::Obstacle).unwrap();
        }
        let mut planner = small_planner(4);
        let request = PlanningRequest::new(&map, Point::new(1.5, 1.5), Point::new(7.5, 7.5), 2);
        let result = planner.plan(&request);

        assert!(planner.guide_path().is_empty());
        assert_eq!(result.path.len(), 4);
        assert!(!result.success);
        // deviation weight itself is untouched
        assert_eq!(planner.get_parameter("deviation_weight"), 5.0);
    }

    #[test]
    fn test_zero_waypoints() {
        let map = GridMap::new(10, 10, 1.0).unwrap();
        let mut planner = small_planner(5);
        let request = PlanningRequest::new(&map, Point::new(1.5, 1.5), Point::new(8.5, 1.5), 0);
        let result = planner.plan(&request);
        assert_eq!(result.path, vec![Point::new(1.5, 1.5), Point::new(8.5, 1.5)]);
        assert!(result.success);
        assert_eq!(result.length, 7.0);
    }

    #[test]
    fn test_invalid_speed_fails_cleanly() {
        let map = GridMap::new(10, 10, 1.0).unwrap();
        let mut planner = small_planner(6);
        planner.set_parameter("max_speed", -2.0);
        let request = PlanningRequest::new(&map, Point::new(1.5, 1.5), Point::new(8.5, 1.5), 2);
        let result = planner.plan(&request);
        assert!(!result.success);
        assert!(result.path.is_empty());
    }
}
