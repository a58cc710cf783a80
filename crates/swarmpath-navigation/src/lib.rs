//! Occupancy grid map and grid search for the swarmpath planners.
//!
//! [`map::GridMap`] answers every geometric question the planners ask (bounds,
//! obstacles, straight-hop collisions) and [`astar::astar_search`] produces the
//! discrete guide path that the continuous optimizer is anchored to.

pub mod astar;
pub mod error;
pub mod map;

pub use astar::astar_search;
pub use error::NavigationError;
pub use map::{Cell, GridMap, GridPoint, Point};
