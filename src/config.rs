use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::{error, info};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const ENV_PREFIX: &str = "SWARMPATH";

/// Swarm settings for the hybrid planner.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PsoConfig {
    pub generations: usize,
    pub particle_count: usize,
    pub global_guide_coe: f64,
    pub local_guide_coe: f64,
    pub max_speed: f64,
    pub deviation_weight: f64,
    /// Fixed seed for reproducible runs; random when absent.
    pub seed: Option<u64>,
}

impl Default for PsoConfig {
    fn default() -> Self {
        Self {
            generations: 300,
            particle_count: 150,
            global_guide_coe: 2.0,
            local_guide_coe: 2.0,
            max_speed: 4.0,
            deviation_weight: 5.0,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathPlanningConfig {
    pub num_waypoints: usize,
    pub map_cell_size: f64,
    /// Advisory; overruns are only logged.
    pub max_time_secs: f64,
    /// Registry key of the strategy to run.
    pub algorithm: String,
}

impl Default for PathPlanningConfig {
    fn default() -> Self {
        Self {
            num_waypoints: 6,
            map_cell_size: 1.0,
            max_time_secs: 30.0,
            algorithm: "hybrid-astar-pso".to_string(),
        }
    }
}

/// Map source, and the size of the built-in fallback layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub path: String,
    pub width: usize,
    pub height: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self { path: "data/maps/map.txt".to_string(), width: 20, height: 20 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MissionConfig {
    pub start: [f64; 2],
    pub end: [f64; 2],
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self { start: [2.0, 2.0], end: [17.0, 17.0] }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pso: PsoConfig,
    pub path_planning: PathPlanningConfig,
    pub map: MapConfig,
    pub mission: MissionConfig,
}

/// Loads `config/default.toml` if present, then applies `SWARMPATH_*`
/// environment overrides (`SWARMPATH_PSO__SEED=7` sets `pso.seed`).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    info!("Attempting to load configuration from {}", DEFAULT_CONFIG_PATH);

    let settings = Config::builder()
        .add_source(File::new(DEFAULT_CONFIG_PATH, FileFormat::Toml).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .and_then(|config| config.try_deserialize::<AppConfig>());

    match settings {
        Ok(config) => {
            info!("Successfully loaded configuration: {:?}", config);
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.pso.generations, 300);
        assert_eq!(config.pso.particle_count, 150);
        assert_eq!(config.path_planning.num_waypoints, 6);
        assert_eq!(config.path_planning.algorithm, "hybrid-astar-pso");
        assert_eq!(config.mission.end, [17.0, 17.0]);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str("[pso]\nseed = 7\nmax_speed = 2.5\n", FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.pso.seed, Some(7));
        assert_eq!(config.pso.max_speed, 2.5);
        assert_eq!(config.pso.particle_count, 150);
        assert_eq!(config.map.path, "data/maps/map.txt");
    }
}
