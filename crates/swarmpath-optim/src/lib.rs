//! Particle swarm optimization.
//!
//! [`ParticleSwarm`] maximizes a caller-supplied fitness function over a box
//! in `R^n`. It knows nothing about paths or maps; the planning crate encodes
//! its candidates as flat coordinate vectors.
#![warn(missing_docs)]

pub mod error;
pub mod particle;
pub mod swarm;

pub use error::OptimError;
pub use particle::Particle;
pub use swarm::{ParticleSwarm, SwarmConfig, SwarmState};
