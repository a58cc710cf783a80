//! Path planning on occupancy grids.
//!
//! Strategies implement [`PlanningAlgorithm`] and are created by name through an
//! [`AlgorithmRegistry`]. [`HybridPlanner`] runs a grid search for a guide path and
//! refines a fixed number of waypoints around it with a particle swarm;
//! [`GridSearchPlanner`] returns the grid route as is. [`PathPlanner`] holds the
//! mission state and delegates to whichever strategy is installed.
#![warn(missing_docs)]

pub mod algorithm;
pub mod fitness;
pub mod grid_search;
pub mod hybrid;
pub mod planner;

pub use algorithm::{
    AlgorithmFactory, AlgorithmRegistry, PlanningAlgorithm, PlanningRequest, PlanningResult,
};
pub use fitness::FitnessBreakdown;
pub use grid_search::GridSearchPlanner;
pub use hybrid::HybridPlanner;
pub use planner::{PathEvaluator, PathPlanner};
