#![warn(missing_docs)]

use std::path::Path;

use tracing::{debug, info};

use super::{GridPoint, Point};
use crate::error::NavigationError;

/// Occupancy state of a single grid cell.
///
/// The map file format stores cells as `0` (free) and `1` (obstacle).
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cell {
    /// Traversable cell
    #[default]
    Free = 0,
    /// Blocked cell
    Obstacle = 1,
}

impl Cell {
    /// Converts the Cell to its file representation
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Creates a Cell from its file representation, `None` for anything but 0/1
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Cell::Free),
            1 => Some(Cell::Obstacle),
            _ => None,
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Free => write!(f, "Free"),
            Cell::Obstacle => write!(f, "Obstacle"),
        }
    }
}

/// A 2D occupancy grid with its origin at world `(0, 0)`.
///
/// Cell `(x, y)` covers the world square `[x*cell_size, (x+1)*cell_size) x
/// [y*cell_size, (y+1)*cell_size)`. The map is read-only while planning; it only
/// changes through [`GridMap::set_cell`], [`GridMap::reset_to_default_layout`] and
/// the `load_*` methods.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridMap {
    /// Width of the map in cells
    width: usize,
    /// Height of the map in cells
    height: usize,
    /// World units per cell
    cell_size: f64,
    /// Row-major cells, `width * height` entries
    data: Vec<Cell>,
}

impl GridMap {
    /// Creates a new, entirely free GridMap.
    ///
    /// # Arguments
    /// * `width` - Width of the map in cells
    /// * `height` - Height of the map in cells
    /// * `cell_size` - World units per cell
    ///
    /// # Returns
    /// * `Result<Self, NavigationError>` - The map or an error if parameters are invalid
    pub fn new(width: usize, height: usize, cell_size: f64) -> Result<Self, NavigationError> {
        if !(cell_size > 0.0) || !cell_size.is_finite() {
            return Err(NavigationError::InvalidCellSize("Cell size must be positive and finite"));
        }
        if width == 0 || height == 0 {
            return Err(NavigationError::InvalidDimensions("Width and height must be non-zero"));
        }
        let len = width
            .checked_mul(height)
            .ok_or(NavigationError::InvalidDimensions(
                "Map dimensions too large, would cause overflow",
            ))?;

        Ok(GridMap {
            width,
            height,
            cell_size,
            data: vec![Cell::Free; len],
        })
    }

    /// Creates a map holding the built-in demonstration layout.
    ///
    /// This is the deterministic fallback used when a map file cannot be loaded.
    pub fn with_default_layout(
        width: usize,
        height: usize,
        cell_size: f64,
    ) -> Result<Self, NavigationError> {
        let mut map = Self::new(width, height, cell_size)?;
        map.reset_to_default_layout();
        Ok(map)
    }

    /// Overwrites the grid with the built-in layout: a one-cell border, a vertical
    /// wall, a horizontal wall and an L-shaped block. Interior obstacles that do not
    /// fit the current dimensions are skipped.
    pub fn reset_to_default_layout(&mut self) {
        self.data.fill(Cell::Free);

        for y in 0..self.height {
            self.mark(0, y);
            self.mark(self.width - 1, y);
        }
        for x in 0..self.width {
            self.mark(x, 0);
            self.mark(x, self.height - 1);
        }

        // vertical wall
        for y in 5..15 {
            self.mark(8, y);
        }
        // horizontal wall
        for x in 12..18 {
            self.mark(x, 6);
        }
        // L-shape
        for y in 10..15 {
            self.mark(15, y);
        }
        for x in 15..18 {
            self.mark(x, 14);
        }
    }

    fn mark(&mut self, x: usize, y: usize) {
        if x < self.width && y < self.height {
            let index = self.get_index(GridPoint::new(x, y));
            self.data[index] = Cell::Obstacle;
        }
    }

    /// Calculates the index in the data vector for a given grid point
    fn get_index(&self, p: GridPoint) -> usize {
        p.y * self.width + p.x
    }

    /// Width of the map in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the map in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// World units per cell.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// World extent of the map as `(width, height)` in world units.
    pub fn world_size(&self) -> (f64, f64) {
        (self.width as f64 * self.cell_size, self.height as f64 * self.cell_size)
    }

    /// Converts world coordinates to the owning grid cell.
    /// Returns None if the owning cell lies outside the map, or the point is not finite.
    ///
    /// # Arguments
    /// * `world_p` - Point in world frame
    ///
    /// # Returns
    /// * `Option<GridPoint>` - Grid coordinates if within bounds, None otherwise
    pub fn world_to_grid(&self, world_p: Point) -> Option<GridPoint> {
        let grid_x_f = (world_p.x / self.cell_size).floor();
        let grid_y_f = (world_p.y / self.cell_size).floor();

        // NaN fails every comparison and lands here too.
        let in_x = grid_x_f >= 0.0 && grid_x_f < self.width as f64;
        let in_y = grid_y_f >= 0.0 && grid_y_f < self.height as f64;
        if !(in_x && in_y) {
            return None;
        }

        Some(GridPoint::new(grid_x_f as usize, grid_y_f as usize))
    }

    /// Converts grid coordinates to the world coordinates of the cell centre.
    ///
    /// # Arguments
    /// * `grid_p` - Point in grid frame (cells)
    ///
    /// # Returns
    /// * `Option<Point>` - World coordinates if within bounds, None otherwise
    pub fn grid_to_world(&self, grid_p: GridPoint) -> Option<Point> {
        if grid_p.x < self.width && grid_p.y < self.height {
            Some(self.cell_center(grid_p))
        } else {
            None
        }
    }

    /// Centre of a cell in world coordinates, without a bounds check.
    pub(crate) fn cell_center(&self, grid_p: GridPoint) -> Point {
        Point::new(
            (grid_p.x as f64 + 0.5) * self.cell_size,
            (grid_p.y as f64 + 0.5) * self.cell_size,
        )
    }

    /// True iff the cell owning `p` lies inside the map.
    pub fn bounds_check(&self, p: Point) -> bool {
        self.world_to_grid(p).is_some()
    }

    /// True if `p` is outside the map or its owning cell is an obstacle.
    pub fn is_obstacle(&self, p: Point) -> bool {
        match self.world_to_grid(p) {
            Some(grid_p) => self.data[self.get_index(grid_p)] == Cell::Obstacle,
            None => true,
        }
    }

    /// Raw cell value: `0` free, `1` obstacle. Coordinates outside the map read as `1`.
    pub fn cell_value(&self, x: isize, y: isize) -> u8 {
        if x < 0 || y < 0 {
            return Cell::Obstacle.as_u8();
        }
        match self.get_cell(GridPoint::new(x as usize, y as usize)) {
            Ok(cell) => cell.as_u8(),
            Err(_) => Cell::Obstacle.as_u8(),
        }
    }

    /// Gets the cell at a grid coordinate position.
    ///
    /// # Returns
    /// * `Result<Cell, NavigationError>` - The cell or an error if out of bounds
    pub fn get_cell(&self, p: GridPoint) -> Result<Cell, NavigationError> {
        if p.x < self.width && p.y < self.height {
            Ok(self.data[self.get_index(p)])
        } else {
            Err(NavigationError::OutOfBounds { x: p.x, y: p.y })
        }
    }

    /// Sets the cell at a grid coordinate position.
    ///
    /// # Returns
    /// * `Result<(), NavigationError>` - Success or error if out of bounds
    pub fn set_cell(&mut self, p: GridPoint, cell: Cell) -> Result<(), NavigationError> {
        if p.x < self.width && p.y < self.height {
            let index = self.get_index(p);
            self.data[index] = cell;
            Ok(())
        } else {
            Err(NavigationError::OutOfBounds { x: p.x, y: p.y })
        }
    }

    /// Gets a reference to the underlying row-major cell data.
    pub fn cells(&self) -> &[Cell] {
        &self.data
    }

    /// Checks whether the straight hop from `p0` to `p1` touches an obstacle.
    ///
    /// Walks every cell between the two owning cells with an integer error
    /// accumulator, stepping one axis at a time so no cell is skipped at a
    /// direction change. An endpoint outside the map counts as a collision. The
    /// walk always starts from the smaller endpoint cell, which makes the answer
    /// independent of argument order.
    pub fn segment_collides(&self, p0: Point, p1: Point) -> bool {
        let (Some(a), Some(b)) = (self.world_to_grid(p0), self.world_to_grid(p1)) else {
            return true;
        };
        let (from, to) = if a <= b { (a, b) } else { (b, a) };

        // The walk stays inside the bounding box of two in-map cells.
        SegmentWalk::new(from, to).any(|cell| self.data[self.get_index(cell)] == Cell::Obstacle)
    }

    /// Replaces the grid from map text: `rows cols` followed by `rows * cols`
    /// whitespace-separated `0`/`1` values in row-major order.
    ///
    /// On error the current grid is left untouched. The cell size is kept.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), NavigationError> {
        let mut tokens = text.split_whitespace();
        let rows = parse_map_value(tokens.next(), "row count")?;
        let cols = parse_map_value(tokens.next(), "column count")?;
        if rows <= 0 || cols <= 0 {
            return Err(NavigationError::MalformedMap(format!(
                "dimensions must be positive, got {rows}x{cols}"
            )));
        }

        // Count the cells before allocating so a bogus header cannot size the grid.
        let values: Vec<&str> = tokens.collect();
        let expected = usize::try_from(rows)
            .ok()
            .zip(usize::try_from(cols).ok())
            .and_then(|(rows, cols)| rows.checked_mul(cols));
        if expected != Some(values.len()) {
            return Err(NavigationError::MalformedMap(format!(
                "a {rows}x{cols} map needs {rows}*{cols} cell values, found {}",
                values.len()
            )));
        }

        let mut loaded = GridMap::new(cols as usize, rows as usize, self.cell_size)?;
        for (index, token) in values.into_iter().enumerate() {
            let value = parse_map_value(Some(token), "cell value")?;
            let cell = u8::try_from(value).ok().and_then(Cell::from_u8).ok_or_else(|| {
                let (x, y) = (index % loaded.width, index / loaded.width);
                NavigationError::MalformedMap(format!(
                    "cell ({x}, {y}) has value {value}, expected 0 or 1"
                ))
            })?;
            loaded.data[index] = cell;
        }

        debug!(width = loaded.width, height = loaded.height, "Map data parsed");
        *self = loaded;
        Ok(())
    }

    /// Replaces the grid from a map file, see [`GridMap::load_from_str`].
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<(), NavigationError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| NavigationError::MapIo {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_from_str(&text)?;
        info!(path = %path.display(), width = self.width, height = self.height, "Map loaded");
        Ok(())
    }
}

fn parse_map_value(token: Option<&str>, what: &str) -> Result<i64, NavigationError> {
    let token = token.ok_or_else(|| {
        NavigationError::MalformedMap(format!("unexpected end of data while reading {what}"))
    })?;
    token
        .parse::<i64>()
        .map_err(|_| NavigationError::MalformedMap(format!("'{token}' is not an integer ({what})")))
}

impl std::fmt::Display for GridMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "GridMap ({}x{}, cell size: {:.3})", self.width, self.height, self.cell_size)?;
        for y in 0..self.height {
            for x in 0..self.width {
                let symbol = match self.data[self.get_index(GridPoint::new(x, y))] {
                    Cell::Free => '.',
                    Cell::Obstacle => '#',
                };
                write!(f, "{symbol} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// 4-connected integer line walk between two cells, endpoints included.
struct SegmentWalk {
    x: isize,
    y: isize,
    x_inc: isize,
    y_inc: isize,
    dx: isize,
    dy: isize,
    error: isize,
    remaining: usize,
}

impl SegmentWalk {
    fn new(from: GridPoint, to: GridPoint) -> Self {
        let (x0, y0) = (from.x as isize, from.y as isize);
        let (x1, y1) = (to.x as isize, to.y as isize);
        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();

        SegmentWalk {
            x: x0,
            y: y0,
            x_inc: if x1 > x0 { 1 } else { -1 },
            y_inc: if y1 > y0 { 1 } else { -1 },
            dx: dx * 2,
            dy: dy * 2,
            error: dx - dy,
            remaining: (1 + dx + dy) as usize,
        }
    }
}

impl Iterator for SegmentWalk {
    type Item = GridPoint;

    fn next(&mut self) -> Option<GridPoint> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = GridPoint::new(self.x as usize, self.y as usize);

        if self.error > 0 {
            self.x += self.x_inc;
            self.error -= self.dy;
        } else {
            self.y += self.y_inc;
            self.error += self.dx;
        }
        Some(current)
    }
}
