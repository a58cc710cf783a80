//! Swarm members.

/// A single member of the swarm.
///
/// `fitness` is the score of the current `position`; `best_position` and
/// `best_fitness` remember the best point this particle has visited.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Particle {
    /// Current position in the search space.
    pub position: Vec<f64>,
    /// Current velocity.
    pub velocity: Vec<f64>,
    /// Best position visited so far.
    pub best_position: Vec<f64>,
    /// Fitness of `position`.
    pub fitness: f64,
    /// Fitness of `best_position`.
    pub best_fitness: f64,
}

impl Particle {
    /// Creates a particle at the origin of a `dimension`-dimensional space, at rest.
    pub fn new(dimension: usize) -> Self {
        Self {
            position: vec![0.0; dimension],
            velocity: vec![0.0; dimension],
            best_position: vec![0.0; dimension],
            fitness: f64::NEG_INFINITY,
            best_fitness: f64::NEG_INFINITY,
        }
    }

    /// Number of dimensions.
    pub fn dimension(&self) -> usize {
        self.position.len()
    }

    /// Euclidean length of the velocity.
    pub fn speed(&self) -> f64 {
        norm(&self.velocity)
    }

    /// Records the current position as the personal best if it scores higher.
    /// Returns whether the personal best moved.
    pub(crate) fn remember_if_better(&mut self) -> bool {
        if self.fitness > self.best_fitness {
            self.best_fitness = self.fitness;
            self.best_position.clone_from(&self.position);
            true
        } else {
            false
        }
    }
}

pub(crate) fn norm(v: &[f64]) -> f64 {
    v.iter().map(|c| c * c).sum::<f64>().sqrt()
}
