//! # lidar_pathfinding
//!
//! Turns a flight of drone LIDAR sweeps into a 2D
//! [occupancy grid](https://en.wikipedia.org/wiki/Occupancy_grid_mapping) and plans
//! collision-free paths on it with [A*](https://en.wikipedia.org/wiki/A*_search_algorithm).
//!
//! The pipeline has two halves:
//! - [GridMapper] joins each range reading to the pose of its scan, projects it into world
//!   coordinates, bins the resulting point cloud into cells of a fixed size and thresholds the
//!   per-cell hit counts into an [OccupancyGrid].
//! - [PathSearch] finds a lowest-cost 8-connected path between two cells of that grid for an
//!   agent occupying a square footprint of configurable radius. Step costs and the heuristic are
//!   both Euclidean distances in cell units, so the heuristic is consistent and paths are optimal.
//!
//! Reading sensor files and plotting are left to the caller; the crate consumes parsed poses and
//! readings and produces cell sequences that [OccupancyGrid::to_world] maps back to world
//! coordinates.
//!
//! ```
//! use lidar_pathfinding::{GridCoord, OccupancyGrid, PathSearch, SearchConfig};
//!
//! let grid = OccupancyGrid::empty(5, 5);
//! let mut search = PathSearch::new(
//!     &grid,
//!     SearchConfig {
//!         clearance_radius: 0,
//!         ..Default::default()
//!     },
//! );
//! let outcome = search
//!     .search(GridCoord::new(0, 0), GridCoord::new(4, 4))
//!     .unwrap();
//! assert_eq!(outcome.path().map(|p| p.len()), Some(5));
//! ```
mod coord;
mod error;
mod grid;
mod mapper;
mod planner;
mod quantize;
mod scan;
mod search;

use fxhash::FxBuildHasher;
use indexmap::IndexMap;
use itertools::Itertools;

pub use crate::coord::{
    euclidean_distance, is_adjacent, moore_neighborhood, GridCoord, WorldPoint, NEIGHBOUR_OFFSETS,
};
pub use crate::error::{MapError, SearchError};
pub use crate::grid::OccupancyGrid;
pub use crate::mapper::{GridMapper, MapperConfig};
pub use crate::planner::{collides, PathSearch, PlannedPath, SearchConfig, SearchOutcome};
pub use crate::quantize::AxisBins;
pub use crate::scan::{build_obstacle_cloud, DronePose, ObstaclePoint, PoseTable, SweepReading};

pub(crate) type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Side of a grid cell in world units.
pub const DEFAULT_CELL_SIZE: f64 = 0.1;
/// Readings at or below this many millimetres are treated as sensor noise.
pub const DEFAULT_NOISE_FLOOR_MM: f64 = 100.0;
/// Footprint half-width of the drone, in cells.
pub const DEFAULT_CLEARANCE_RADIUS: u32 = 2;
/// Cost of a diagonal step.
pub const SQRT_2: f64 = std::f64::consts::SQRT_2;

/// Total Euclidean length of a cell sequence, in cell units.
pub fn path_cost(cells: &[GridCoord]) -> f64 {
    cells
        .iter()
        .tuple_windows()
        .map(|(a, b)| euclidean_distance(*a, *b))
        .sum()
}

/// True if every consecutive pair of cells are neighbours.
pub fn is_connected(cells: &[GridCoord]) -> bool {
    cells.iter().tuple_windows().all(|(a, b)| is_adjacent(*a, *b))
}
