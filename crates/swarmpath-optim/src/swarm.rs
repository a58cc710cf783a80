//! The swarm and its update rule.

/*

Particle swarm, maximizing f over the box [lower, upper].

Every iteration takes a snapshot G of the global best, then for each particle:

    v += c_g * r1 * (G - x) + c_l * r2 * (P - x)       r1, r2 ~ U[0, 1), drawn once per particle
    |v| <= max_speed
    with probability `disturbance_rate`, add a random kick of magnitude
        <= disturbance_speed_fraction * max_speed and clamp again
    x += v, clamped to the box
    score x, update P and the live global best
    v += c_g * r3 * (G - x) + c_l * r4 * (P - x)       fresh r3, r4
    |v| <= max_speed

After the sweep every personal best is compared against the global best once
more. There is no inertia term: the speed clamp is what keeps velocities
bounded.

*/

use rand::Rng;
use tracing::{debug, trace};

use crate::error::OptimError;
use crate::particle::{Particle, norm};

/// Tuning knobs of the swarm.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwarmConfig {
    /// Population size. Must be at least 1.
    pub particle_count: usize,
    /// Pull toward the global best.
    pub global_guide_coe: f64,
    /// Pull toward each particle's own best.
    pub local_guide_coe: f64,
    /// Upper bound on velocity magnitude.
    pub max_speed: f64,
    /// Probability per particle per iteration of a random velocity kick.
    pub disturbance_rate: f64,
    /// Kick magnitude as a fraction of `max_speed`.
    pub disturbance_speed_fraction: f64,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            particle_count: 150,
            global_guide_coe: 2.0,
            local_guide_coe: 2.0,
            max_speed: 4.0,
            disturbance_rate: 0.2,
            disturbance_speed_fraction: 0.05,
        }
    }
}

/// Lifecycle of a [`ParticleSwarm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwarmState {
    /// No population yet.
    Uninitialized,
    /// Population seeded, no iteration run.
    Initialized,
    /// At least one iteration has run.
    Iterating,
    /// A full [`ParticleSwarm::find_max`] run completed.
    Done,
}

/// A particle swarm maximizing `fitness` over a bounded box.
///
/// The fitness function and the random source are owned by the swarm, so a
/// seeded generator makes a run fully reproducible.
pub struct ParticleSwarm<F, R> {
    fitness: F,
    rng: R,
    config: SwarmConfig,
    lower: Vec<f64>,
    upper: Vec<f64>,
    particles: Vec<Particle>,
    global_best: Particle,
    state: SwarmState,
}

impl<F, R> ParticleSwarm<F, R>
where
    F: FnMut(&[f64]) -> f64,
    R: Rng,
{
    /// Creates a swarm over the box `[lower, upper]`.
    ///
    /// # Arguments
    ///
    /// * `fitness` - Scoring function; higher is better.
    /// * `lower`, `upper` - Per-dimension bounds, equal length, `lower[i] <= upper[i]`.
    /// * `config` - Swarm parameters.
    /// * `rng` - Random source used for every draw.
    ///
    /// # Returns
    ///
    /// An uninitialized swarm, or an [`OptimError`] when the bounds or the
    /// parameters are inconsistent.
    pub fn new(
        fitness: F,
        lower: Vec<f64>,
        upper: Vec<f64>,
        config: SwarmConfig,
        rng: R,
    ) -> Result<Self, OptimError> {
        if lower.len() != upper.len() {
            return Err(OptimError::DimensionMismatch { lower: lower.len(), upper: upper.len() });
        }
        for (index, (&lo, &hi)) in lower.iter().zip(&upper).enumerate() {
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(OptimError::InvalidBounds { index, lower: lo, upper: hi });
            }
        }
        if config.particle_count == 0 {
            return Err(OptimError::EmptyPopulation);
        }
        if !config.max_speed.is_finite() || config.max_speed < 0.0 {
            return Err(OptimError::InvalidMaxSpeed(config.max_speed));
        }

        let dimension = lower.len();
        Ok(Self {
            fitness,
            rng,
            config,
            lower,
            upper,
            particles: Vec::new(),
            global_best: Particle::new(dimension),
            state: SwarmState::Uninitialized,
        })
    }

    /// Number of dimensions of the search space.
    pub fn dimension(&self) -> usize {
        self.lower.len()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SwarmState {
        self.state
    }

    /// Swarm parameters.
    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    /// Current population. Empty before [`initialize`](Self::initialize).
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Best particle seen so far, or `None` before initialization.
    pub fn global_best(&self) -> Option<&Particle> {
        match self.state {
            SwarmState::Uninitialized => None,
            _ => Some(&self.global_best),
        }
    }

    /// Seeds a fresh population and scores it. Any previous population is discarded.
    ///
    /// Positions are uniform in the box. Velocities point in a random direction
    /// with a magnitude uniform in `[0, max_speed]`.
    pub fn initialize(&mut self) {
        let dimension = self.dimension();
        self.particles.clear();
        self.particles.reserve(self.config.particle_count);

        for _ in 0..self.config.particle_count {
            let mut particle = Particle::new(dimension);
            for j in 0..dimension {
                let r: f64 = self.rng.random();
                particle.position[j] = self.lower[j] + r * (self.upper[j] - self.lower[j]);
            }
            let magnitude = self.rng.random::<f64>() * self.config.max_speed;
            particle.velocity = random_vector(&mut self.rng, dimension, magnitude);

            particle.fitness = (self.fitness)(&particle.position);
            particle.best_position.clone_from(&particle.position);
            particle.best_fitness = particle.fitness;
            self.particles.push(particle);
        }

        let mut best = 0;
        for (i, particle) in self.particles.iter().enumerate().skip(1) {
            if particle.best_fitness > self.particles[best].best_fitness {
                best = i;
            }
        }
        self.global_best = self.particles[best].clone();
        self.state = SwarmState::Initialized;
        debug!(
            particles = self.particles.len(),
            dimension,
            best_fitness = self.global_best.best_fitness,
            "Swarm initialized"
        );
    }

    /// Runs one iteration over the whole population. Initializes first if needed.
    ///
    /// # Returns
    ///
    /// The global best fitness after the iteration.
    pub fn step(&mut self) -> f64 {
        if self.state == SwarmState::Uninitialized {
            self.initialize();
        }

        let SwarmConfig {
            global_guide_coe,
            local_guide_coe,
            max_speed,
            disturbance_rate,
            disturbance_speed_fraction,
            ..
        } = self.config;
        let guide = self.global_best.best_position.clone();
        let dimension = guide.len();

        for particle in self.particles.iter_mut() {
            let r1: f64 = self.rng.random();
            let r2: f64 = self.rng.random();
            accelerate(particle, &guide, global_guide_coe * r1, local_guide_coe * r2);
            clamp_speed(&mut particle.velocity, max_speed);

            if self.rng.random::<f64>() < disturbance_rate {
                let magnitude = disturbance_speed_fraction * max_speed * self.rng.random::<f64>();
                let kick = random_vector(&mut self.rng, dimension, magnitude);
                for (v, k) in particle.velocity.iter_mut().zip(kick) {
                    *v += k;
                }
                clamp_speed(&mut particle.velocity, max_speed);
            }

            for j in 0..dimension {
                let moved = particle.position[j] + particle.velocity[j];
                particle.position[j] = moved.clamp(self.lower[j], self.upper[j]);
            }

            particle.fitness = (self.fitness)(&particle.position);
            let improved = particle.remember_if_better();
            if improved && particle.best_fitness > self.global_best.best_fitness {
                self.global_best = particle.clone();
            }

            let r3: f64 = self.rng.random();
            let r4: f64 = self.rng.random();
            accelerate(particle, &guide, global_guide_coe * r3, local_guide_coe * r4);
            clamp_speed(&mut particle.velocity, max_speed);
        }

        for particle in &self.particles {
            if particle.best_fitness > self.global_best.best_fitness {
                self.global_best = particle.clone();
            }
        }

        self.state = SwarmState::Iterating;
        trace!(best_fitness = self.global_best.best_fitness, "Swarm iteration complete");
        self.global_best.best_fitness
    }

    /// Seeds a fresh population and runs `iterations` iterations.
    ///
    /// # Returns
    ///
    /// A copy of the best particle found. Its `best_position` and
    /// `best_fitness` hold the optimum.
    pub fn find_max(&mut self, iterations: usize) -> Particle {
        self.find_max_tracked(iterations).0
    }

    /// Like [`find_max`](Self::find_max), also returning the global best
    /// fitness after initialization followed by one entry per iteration.
    pub fn find_max_tracked(&mut self, iterations: usize) -> (Particle, Vec<f64>) {
        self.initialize();
        let mut history = Vec::with_capacity(history_capacity(iterations));
        history.push(self.global_best.best_fitness);
        for _ in 0..iterations {
            history.push(self.step());
        }
        self.state = SwarmState::Done;
        debug!(iterations, best_fitness = self.global_best.best_fitness, "Swarm search finished");
        (self.global_best.clone(), history)
    }
}

/// Entries reserved up front for a tracked run; longer runs grow the vector.
const MAX_HISTORY_RESERVE: usize = 4096;

fn history_capacity(iterations: usize) -> usize {
    iterations.saturating_add(1).min(MAX_HISTORY_RESERVE)
}

fn accelerate(particle: &mut Particle, guide: &[f64], global_pull: f64, local_pull: f64) {
    for j in 0..particle.velocity.len() {
        let x = particle.position[j];
        let toward_best = particle.best_position[j] - x;
        particle.velocity[j] += global_pull * (guide[j] - x) + local_pull * toward_best;
    }
}

fn clamp_speed(velocity: &mut [f64], max_speed: f64) {
    let speed = norm(velocity);
    if speed > max_speed {
        let scale = max_speed / speed;
        velocity.iter_mut().for_each(|v| *v *= scale);
    }
}

/// A vector of length `magnitude` whose components, before scaling, are
/// drawn from `[0, 1)`. A degenerate draw yields the zero vector.
fn random_vector<R: Rng>(rng: &mut R, dimension: usize, magnitude: f64) -> Vec<f64> {
    let mut v: Vec<f64> = (0..dimension).map(|_| rng.random::<f64>()).collect();
    let length = norm(&v);
    if length <= f64::EPSILON {
        v.iter_mut().for_each(|c| *c = 0.0);
    } else {
        let scale = magnitude / length;
        v.iter_mut().for_each(|c| *c *= scale);
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn bowl(x: &[f64]) -> f64 {
        -((x[0] - 3.0).powi(2) + (x[1] + 1.0).powi(2))
    }

    fn config(particle_count: usize, max_speed: f64) -> SwarmConfig {
        SwarmConfig { particle_count, max_speed, ..SwarmConfig::default() }
    }

    #[test]
    fn test_rejects_bad_bounds() {
        let rng = StdRng::seed_from_u64(0);
        let err = ParticleSwarm::new(bowl, vec![0.0], vec![1.0, 2.0], config(5, 1.0), rng).err();
        assert_eq!(err, Some(OptimError::DimensionMismatch { lower: 1, upper: 2 }));

        let rng = StdRng::seed_from_u64(0);
        let err =
            ParticleSwarm::new(bowl, vec![0.0, 5.0], vec![1.0, 2.0], config(5, 1.0), rng).err();
        assert_eq!(err, Some(OptimError::InvalidBounds { index: 1, lower: 5.0, upper: 2.0 }));

        let rng = StdRng::seed_from_u64(0);
        let err =
            ParticleSwarm::new(bowl, vec![0.0], vec![f64::INFINITY], config(5, 1.0), rng).err();
        assert!(matches!(err, Some(OptimError::InvalidBounds { index: 0, .. })));
    }

    #[test]
    fn test_rejects_bad_config() {
        let rng = StdRng::seed_from_u64(0);
        let err = ParticleSwarm::new(bowl, vec![0.0; 2], vec![1.0; 2], config(0, 1.0), rng).err();
        assert_eq!(err, Some(OptimError::EmptyPopulation));

        let rng = StdRng::seed_from_u64(0);
        let err = ParticleSwarm::new(bowl, vec![0.0; 2], vec![1.0; 2], config(3, -1.0), rng).err();
        assert_eq!(err, Some(OptimError::InvalidMaxSpeed(-1.0)));
    }

    #[test]
    fn test_initialize() {
        let rng = StdRng::seed_from_u64(7);
        let (lower, upper) = (vec![-10.0, -10.0], vec![10.0, 10.0]);
        let mut swarm = ParticleSwarm::new(bowl, lower, upper, config(20, 2.0), rng).unwrap();
        assert_eq!(swarm.state(), SwarmState::Uninitialized);
        assert!(swarm.global_best().is_none());

        swarm.initialize();
        assert_eq!(swarm.state(), SwarmState::Initialized);
        assert_eq!(swarm.particles().len(), 20);

        let best = swarm.global_best().unwrap().best_fitness;
        for p in swarm.particles() {
            assert!(p.position.iter().all(|c| (-10.0..=10.0).contains(c)));
            assert!(p.speed() <= 2.0 + 1e-9);
            assert_eq!(p.fitness, p.best_fitness);
            assert!(p.best_fitness <= best);
        }
        // the global best is one of the population, not a placeholder
        assert!(swarm.particles().iter().any(|p| p.best_fitness == best));
    }

    #[test]
    fn test_step_respects_bounds_and_speed() {
        let rng = StdRng::seed_from_u64(11);
        let cfg = SwarmConfig { disturbance_rate: 1.0, ..config(25, 1.5) };
        let mut swarm =
            ParticleSwarm::new(bowl, vec![-2.0, 0.0], vec![2.0, 4.0], cfg, rng).unwrap();

        for _ in 0..50 {
            swarm.step();
            assert_eq!(swarm.state(), SwarmState::Iterating);
            for p in swarm.particles() {
                assert!((-2.0..=2.0).contains(&p.position[0]));
                assert!((0.0..=4.0).contains(&p.position[1]));
                assert!(p.speed() <= 1.5 + 1e-9);
            }
        }
    }

    #[test]
    fn test_global_best_dominates_personal_bests() {
        let rng = StdRng::seed_from_u64(3);
        let mut swarm =
            ParticleSwarm::new(bowl, vec![-10.0; 2], vec![10.0; 2], config(15, 1.0), rng).unwrap();
        for _ in 0..20 {
            let best = swarm.step();
            assert!(swarm.particles().iter().all(|p| p.best_fitness <= best));
        }
    }

    #[test]
    fn test_history_is_non_decreasing() {
        let rng = StdRng::seed_from_u64(5);
        let mut swarm =
            ParticleSwarm::new(bowl, vec![-10.0; 2], vec![10.0; 2], config(10, 1.0), rng).unwrap();
        let (best, history) = swarm.find_max_tracked(40);

        assert_eq!(history.len(), 41);
        assert!(history.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*history.last().unwrap(), best.best_fitness);
        assert_eq!(swarm.state(), SwarmState::Done);
    }

    #[test]
    fn test_history_reservation_is_bounded() {
        assert_eq!(history_capacity(0), 1);
        assert_eq!(history_capacity(40), 41);
        assert_eq!(history_capacity(usize::MAX), MAX_HISTORY_RESERVE);
    }

    #[test]
    fn test_history_grows_past_reservation() {
        let rng = StdRng::seed_from_u64(4);
        let mut swarm =
            ParticleSwarm::new(bowl, vec![-5.0; 2], vec![5.0; 2], config(2, 1.0), rng).unwrap();
        let (_, history) = swarm.find_max_tracked(MAX_HISTORY_RESERVE + 10);
        assert_eq!(history.len(), MAX_HISTORY_RESERVE + 11);
    }

    #[test]
    fn test_finds_bowl_maximum() {
        let rng = StdRng::seed_from_u64(42);
        let mut swarm =
            ParticleSwarm::new(bowl, vec![-10.0; 2], vec![10.0; 2], config(30, 0.5), rng).unwrap();
        let best = swarm.find_max(200);

        let dx = best.best_position[0] - 3.0;
        let dy = best.best_position[1] + 1.0;
        assert!((dx * dx + dy * dy).sqrt() < 0.5, "best {:?}", best.best_position);
        assert_eq!(best.best_fitness, bowl(&best.best_position));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let run = |seed| {
            let rng = StdRng::seed_from_u64(seed);
            let mut swarm =
                ParticleSwarm::new(bowl, vec![-5.0; 2], vec![5.0; 2], config(12, 1.0), rng)
                    .unwrap();
            swarm.find_max(30)
        };
        assert_eq!(run(9), run(9));
    }

    #[test]
    fn test_zero_iterations_returns_initial_best() {
        let rng = StdRng::seed_from_u64(1);
        let mut swarm =
            ParticleSwarm::new(bowl, vec![-5.0; 2], vec![5.0; 2], config(8, 1.0), rng).unwrap();
        let best = swarm.find_max(0);
        let initial_best =
            swarm.particles().iter().map(|p| p.best_fitness).fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(best.best_fitness, initial_best);
    }

    #[test]
    fn test_zero_dimensions() {
        let rng = StdRng::seed_from_u64(1);
        let flat = |_: &[f64]| 1.5;
        let mut swarm =
            ParticleSwarm::new(flat, Vec::new(), Vec::new(), config(4, 1.0), rng).unwrap();
        let best = swarm.find_max(3);
        assert!(best.best_position.is_empty());
        assert_eq!(best.best_fitness, 1.5);
    }

    #[test]
    fn test_degenerate_box_pins_particles() {
        let rng = StdRng::seed_from_u64(2);
        let mut swarm =
            ParticleSwarm::new(bowl, vec![1.0, 1.0], vec![1.0, 1.0], config(5, 3.0), rng).unwrap();
        let best = swarm.find_max(5);
        assert_eq!(best.best_position, vec![1.0, 1.0]);
    }
}
