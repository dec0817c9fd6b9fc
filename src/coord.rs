use core::cmp::Ordering;
use core::fmt;
use grid_util::point::Point;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Offsets of the Moore neighbourhood, counter-clockwise starting east.
pub const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Integer cell index into an [OccupancyGrid](crate::OccupancyGrid). `x` runs along the first
/// axis (the world X axis), `y` along the second. Coordinates may be negative or exceed the grid
/// so that out-of-range quantisation results can be represented and rejected.
pub type GridCoord = Point;

/// The eight cells surrounding `coord` in [NEIGHBOUR_OFFSETS] order.
pub fn moore_neighborhood(coord: GridCoord) -> [GridCoord; 8] {
    NEIGHBOUR_OFFSETS.map(|(dx, dy)| Point::new(coord.x + dx, coord.y + dy))
}

/// True if `b` is one of the eight neighbours of `a`.
pub fn is_adjacent(a: GridCoord, b: GridCoord) -> bool {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    dx <= 1 && dy <= 1 && (dx, dy) != (0, 0)
}

/// Lexicographic order on `(x, y)`.
pub(crate) fn cmp_cells(a: &GridCoord, b: &GridCoord) -> Ordering {
    (a.x, a.y).cmp(&(b.x, b.y))
}

/// A position in world units (the unit of the drone poses).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    pub const fn new(x: f64, y: f64) -> WorldPoint {
        WorldPoint { x, y }
    }
}

impl From<(f64, f64)> for WorldPoint {
    fn from((x, y): (f64, f64)) -> Self {
        WorldPoint::new(x, y)
    }
}

impl From<WorldPoint> for (f64, f64) {
    fn from(p: WorldPoint) -> Self {
        (p.x, p.y)
    }
}

impl fmt::Display for WorldPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// Euclidean distance between two cells, in cell units. Used both as the step cost and as the
/// search heuristic.
pub fn euclidean_distance(a: GridCoord, b: GridCoord) -> f64 {
    let dx = (a.x - b.x) as f64;
    let dy = (a.y - b.y) as f64;
    dx.hypot(dy)
}
