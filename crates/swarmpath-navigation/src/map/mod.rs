//! Map-related functionality for navigation.
//!
//! This module provides the occupancy grid used by every planning stage and the
//! point types it is queried with.

pub mod grid_map;
pub mod point_types;

pub use grid_map::{Cell, GridMap};
pub use point_types::{GridPoint, Point};
