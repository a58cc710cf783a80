use std::collections::HashSet;

use swarmpath_navigation::{GridMap, GridPoint, Point, astar_search};

fn main() {
    // Create a grid
    // 0 = free
    // 1 = obstacle
    let text = "\
10 10
0 0 0 0 0 0 0 0 0 0
0 1 1 0 0 0 0 1 1 0
0 0 0 0 1 0 0 0 0 0
0 0 1 1 1 1 0 1 0 0
0 0 0 0 0 1 0 1 0 0
0 1 1 1 0 1 0 1 1 0
0 0 0 1 0 0 0 0 0 0
0 1 0 1 0 1 1 1 0 0
0 1 0 0 0 0 0 0 1 0
0 0 0 1 1 1 0 0 0 0
";
    let mut map = GridMap::new(10, 10, 1.0).expect("valid dimensions");
    map.load_from_str(text).expect("well-formed map");

    let start = Point::new(0.5, 0.5);
    let goal = Point::new(9.5, 9.5);

    println!("Grid:\n{map}");
    println!("Start: {start}, Goal: {goal}");

    let path = astar_search(&map, start, goal);
    if path.is_empty() {
        println!("\nNo path found.");
        return;
    }

    println!("\nPath found:");
    for p in &path {
        println!("  {p}");
    }

    let cells: HashSet<GridPoint> = path.iter().filter_map(|p| map.world_to_grid(*p)).collect();
    let start_cell = map.world_to_grid(start);
    let goal_cell = map.world_to_grid(goal);

    println!("\nGrid with path:");
    for y in 0..map.height() {
        for x in 0..map.width() {
            let cell = Some(GridPoint::new(x, y));
            if cell == start_cell {
                print!("S ");
            } else if cell == goal_cell {
                print!("G ");
            } else if cells.contains(&GridPoint::new(x, y)) {
                print!("* ");
            } else if map.cell_value(x as isize, y as isize) == 1 {
                print!("# ");
            } else {
                print!(". ");
            }
        }
        println!();
    }

    let from = Point::new(0.5, 9.5);
    let to = Point::new(9.5, 0.5);
    println!("\nStraight hop {from} -> {to} collides: {}", map.segment_collides(from, to));
}
