use std::fmt;

use swarmpath_navigation::{GridMap, GridPoint, Point};
use swarmpath_planning::{PathEvaluator, PlanningResult};

/// Draws the map with the path's points on top.
///
/// `S` and `E` mark the endpoint cells, `*` a waypoint cell, `#` an obstacle
/// and `.` a free cell. Points outside the map are not drawn.
pub fn render_overlay(map: &GridMap, path: &[Point]) -> String {
    let mut marks: Vec<Option<char>> = vec![None; map.width() * map.height()];
    let mut mark = |p: Point, c: char| {
        if let Some(GridPoint { x, y }) = map.world_to_grid(p) {
            marks[y * map.width() + x] = Some(c);
        }
    };

    if let [start, interior @ .., end] = path {
        for &p in interior {
            mark(p, '*');
        }
        mark(*start, 'S');
        mark(*end, 'E');
    }

    let mut out = String::with_capacity((map.width() + 1) * map.height());
    for y in 0..map.height() {
        for x in 0..map.width() {
            let c = marks[y * map.width() + x]
                .unwrap_or(if map.cell_value(x as isize, y as isize) == 1 { '#' } else { '.' });
            out.push(c);
        }
        out.push('\n');
    }
    out
}

/// Summary, waypoint list and quality metrics of a planning result.
pub fn render_summary(map: &GridMap, result: &PlanningResult) -> String {
    Summary { map, result }.to_string()
}

struct Summary<'a> {
    map: &'a GridMap,
    result: &'a PlanningResult,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.result;
        let evaluator = PathEvaluator::new(self.map);
        let yes_no = |flag: bool| if flag { "yes" } else { "no" };

        writeln!(f, "Algorithm:      {}", result.algorithm_name)?;
        writeln!(f, "Success:        {}", yes_no(result.success))?;
        writeln!(f, "Path length:    {:.3}", result.length)?;
        writeln!(f, "Fitness:        {:.3}", result.fitness)?;
        writeln!(f, "Planning time:  {:.3} s", result.elapsed.as_secs_f64())?;

        writeln!(f, "\nWaypoints:")?;
        for (i, p) in result.path.iter().enumerate() {
            writeln!(f, "  {i:>2}: {p}")?;
        }

        writeln!(f, "\nPath quality:")?;
        writeln!(f, "  length:     {:.3}", evaluator.length(&result.path))?;
        writeln!(f, "  smoothness: {:.3}", evaluator.smoothness(&result.path))?;
        writeln!(f, "  collision:  {}", yes_no(evaluator.collides(&result.path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_overlay() {
        let map = GridMap::with_default_layout(5, 4, 1.0).unwrap();
        let path = [Point::new(1.5, 1.5), Point::new(2.5, 1.5), Point::new(3.5, 2.5)];
        assert_eq!(render_overlay(&map, &path), "#####\n#S*.#\n#..E#\n#####\n");
    }

    #[test]
    fn test_overlay_empty_path() {
        let map = GridMap::new(3, 2, 1.0).unwrap();
        assert_eq!(render_overlay(&map, &[]), "...\n...\n");
    }

    #[test]
    fn test_summary_lists_waypoints() {
        let map = GridMap::new(10, 10, 1.0).unwrap();
        let result = PlanningResult {
            path: vec![Point::new(1.0, 1.0), Point::new(4.0, 5.0)],
            length: 5.0,
            fitness: 997.5,
            success: true,
            elapsed: Duration::from_millis(250),
            algorithm_name: "A*".to_string(),
        };
        let summary = render_summary(&map, &result);
        assert!(summary.contains("Algorithm:      A*"));
        assert!(summary.contains("   1: (4.00, 5.00)"));
        assert!(summary.contains("collision:  no"));
        assert!(summary.contains("smoothness: 1.000"));
    }

    #[test]
    fn test_summary_reports_failure_and_collision() {
        let map = GridMap::with_default_layout(5, 4, 1.0).unwrap();
        let result = PlanningResult {
            path: vec![Point::new(0.5, 0.5), Point::new(4.5, 3.5)],
            length: 5.0,
            fitness: -10.0,
            success: false,
            elapsed: Duration::ZERO,
            algorithm_name: "Hybrid A*-PSO".to_string(),
        };
        let summary = render_summary(&map, &result);
        assert!(summary.starts_with("Algorithm:      Hybrid A*-PSO\n"));
        assert!(summary.contains("Success:        no"));
        assert!(summary.contains("Fitness:        -10.000"));
        assert!(summary.contains("collision:  yes"));
        assert!(summary.ends_with("collision:  yes\n"));
    }
}
