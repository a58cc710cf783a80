mod config;   // brings `config.rs` in as `crate::config`
mod report;   // brings `report.rs` in as `crate::report`

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use swarmpath_navigation::{GridMap, Point};
use swarmpath_planning::{AlgorithmRegistry, HybridPlanner, PathPlanner, PlanningAlgorithm};
use tracing::{error, info, warn};
use tracing_subscriber::{self, EnvFilter};

use crate::config::AppConfig;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Swarmpath planner started.");

    let config = config::load_config().unwrap_or_else(|e| {
        warn!("Falling back to built-in configuration: {}", e);
        AppConfig::default()
    });

    match run(&config) {
        Ok(()) => info!("Planning run finished."),
        Err(e) => {
            error!("Planning run failed: {:?}", e);
            std::process::exit(1);
        }
    }
}

fn run(config: &AppConfig) -> anyhow::Result<()> {
    let map = load_map(config)?;
    info!(width = map.width(), height = map.height(), cell_size = map.cell_size(), "Map ready");

    let start = Point::new(config.mission.start[0], config.mission.start[1]);
    let end = Point::new(config.mission.end[0], config.mission.end[1]);
    for (label, p) in [("start", start), ("end", end)] {
        if !map.bounds_check(p) {
            warn!(%p, "The {} point lies outside the map", label);
        } else if map.is_obstacle(p) {
            warn!(%p, "The {} point lies on an obstacle", label);
        }
    }

    let algorithm = create_algorithm(config)?;
    println!("Configuration:");
    println!("  algorithm:       {}", algorithm.name());
    println!("  waypoints:       {}", config.path_planning.num_waypoints);
    println!("  particles:       {}", config.pso.particle_count);
    println!("  generations:     {}", config.pso.generations);
    println!("  max speed:       {}", config.pso.max_speed);
    println!(
        "  guide coe:       global {} / local {}",
        config.pso.global_guide_coe, config.pso.local_guide_coe
    );
    println!("  start / end:     {} -> {}", start, end);
    println!();

    let map = Arc::new(map);
    let mut planner = PathPlanner::new(
        Arc::clone(&map),
        start,
        end,
        Some(algorithm),
        config.path_planning.num_waypoints,
    );
    let max_time =
        Duration::try_from_secs_f64(config.path_planning.max_time_secs).unwrap_or(Duration::MAX);
    planner.set_max_time(max_time);

    let result = planner.plan();
    if result.path.is_empty() {
        bail!("{} produced no path from {} to {}", result.algorithm_name, start, end);
    }
    if !result.success {
        warn!("Best path found still collides with the map");
    }

    print!("{}", report::render_summary(&map, &result));
    println!();
    print!("{}", report::render_overlay(&map, &result.path));
    Ok(())
}

/// Reads the configured map file, keeping the built-in layout when it cannot be used.
fn load_map(config: &AppConfig) -> anyhow::Result<GridMap> {
    let cell_size = config.path_planning.map_cell_size;
    let mut map = GridMap::with_default_layout(config.map.width, config.map.height, cell_size)
        .context("Invalid map dimensions or cell size in configuration")?;

    match map.load_from_file(&config.map.path) {
        Ok(()) => info!("Loaded map from {}", config.map.path),
        Err(e) => warn!("Using the built-in map layout: {}", e),
    }
    Ok(map)
}

fn create_algorithm(config: &AppConfig) -> anyhow::Result<Box<dyn PlanningAlgorithm>> {
    let name = config.path_planning.algorithm.as_str();
    let registry = AlgorithmRegistry::with_defaults();

    let mut algorithm: Box<dyn PlanningAlgorithm> = match (name, config.pso.seed) {
        (AlgorithmRegistry::HYBRID, Some(seed)) => Box::new(HybridPlanner::with_seed(seed)),
        _ => match registry.create(name) {
            Some(algorithm) => algorithm,
            None => {
                let available = registry.available().join(", ");
                bail!("Unknown algorithm '{}', available: {}", name, available)
            }
        },
    };

    let pso = &config.pso;
    algorithm.set_parameter("particle_count", pso.particle_count as f64);
    algorithm.set_parameter("generations", pso.generations as f64);
    algorithm.set_parameter("deviation_weight", pso.deviation_weight);
    algorithm.set_parameter("max_speed", pso.max_speed);
    algorithm.set_parameter("global_guide_coe", pso.global_guide_coe);
    algorithm.set_parameter("local_guide_coe", pso.local_guide_coe);
    info!(
        algorithm = algorithm.name(),
        complexity = algorithm.complexity_info(),
        "Planning strategy selected"
    );
    Ok(algorithm)
}
