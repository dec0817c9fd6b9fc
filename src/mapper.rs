//! Conversion of drone poses and LIDAR sweeps into an [OccupancyGrid].
use itertools::Itertools;
use log::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::coord::GridCoord;
use crate::error::MapError;
use crate::grid::OccupancyGrid;
use crate::quantize::AxisBins;
use crate::scan::{build_obstacle_cloud, ObstaclePoint, PoseTable, SweepReading};
use crate::{DEFAULT_CELL_SIZE, DEFAULT_NOISE_FLOOR_MM};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MapperConfig {
    /// Side of a grid cell in world units.
    pub cell_size: f64,
    /// A cell is occupied when more than this many obstacle points fall into it.
    pub tolerance: u32,
    /// Readings at or below this distance (millimetres) are discarded as noise.
    pub noise_floor_mm: f64,
}

impl Default for MapperConfig {
    fn default() -> Self {
        MapperConfig {
            cell_size: DEFAULT_CELL_SIZE,
            tolerance: 0,
            noise_floor_mm: DEFAULT_NOISE_FLOOR_MM,
        }
    }
}

impl MapperConfig {
    pub fn validate(&self) -> Result<(), MapError> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(MapError::InvalidConfig("cell size must be positive and finite"));
        }
        if !(self.noise_floor_mm.is_finite() && self.noise_floor_mm >= 0.0) {
            return Err(MapError::InvalidConfig("noise floor must be non-negative and finite"));
        }
        Ok(())
    }
}

/// Turns pose and sweep data into an occupancy grid. Stateless apart from its configuration;
/// every call recomputes from its inputs.
#[derive(Clone, Debug, Default)]
pub struct GridMapper {
    pub config: MapperConfig,
}

impl GridMapper {
    pub fn new(config: MapperConfig) -> GridMapper {
        GridMapper { config }
    }

    /// Absolute obstacle points for every reading above the noise floor.
    pub fn build_obstacle_cloud(
        &self,
        poses: &PoseTable,
        sweeps: &[SweepReading],
    ) -> Result<Vec<ObstaclePoint>, MapError> {
        self.config.validate()?;
        build_obstacle_cloud(poses, sweeps, self.config.noise_floor_mm)
    }

    /// Fits bins to the cloud's bounding box and returns them with the cell of every point.
    pub fn quantize(
        &self,
        cloud: &[ObstaclePoint],
    ) -> Result<(AxisBins, AxisBins, Vec<GridCoord>), MapError> {
        self.config.validate()?;
        if cloud.is_empty() {
            return Err(MapError::EmptyObstacleCloud);
        }
        let cell_size = self.config.cell_size;
        let x_bins = AxisBins::fit(cloud.iter().map(|p| p.position.x), cell_size, 'x')?;
        let y_bins = AxisBins::fit(cloud.iter().map(|p| p.position.y), cell_size, 'y')?;
        let coords = cloud
            .iter()
            .map(|p| GridCoord::new(x_bins.bin(p.position.x), y_bins.bin(p.position.y)))
            .collect();
        Ok((x_bins, y_bins, coords))
    }

    /// Quantises the cloud, counts the points falling into every cell and thresholds the counts
    /// by the configured tolerance.
    pub fn generate_grid(&self, cloud: &[ObstaclePoint]) -> Result<OccupancyGrid, MapError> {
        let (x_bins, y_bins, coords) = self.quantize(cloud)?;
        debug!(
            "Quantising {} points into a {}x{} grid",
            coords.len(),
            x_bins.resolution,
            y_bins.resolution
        );
        let hits = coords.into_iter().counts();
        let grid = OccupancyGrid::from_hits(hits, self.config.tolerance, x_bins, y_bins);
        info!(
            "Generated {}x{} occupancy grid with {} occupied cells",
            grid.width(),
            grid.height(),
            grid.occupied_count()
        );
        Ok(grid)
    }

    /// Builds the cloud and the grid in one go.
    pub fn map(
        &self,
        poses: &PoseTable,
        sweeps: &[SweepReading],
    ) -> Result<OccupancyGrid, MapError> {
        let cloud = self.build_obstacle_cloud(poses, sweeps)?;
        info!("Built obstacle cloud of {} points", cloud.len());
        self.generate_grid(&cloud)
    }

    /// Grid cells of the first and the last pose, the endpoints of the flight.
    pub fn endpoints(
        &self,
        poses: &PoseTable,
        grid: &OccupancyGrid,
    ) -> Result<(GridCoord, GridCoord), MapError> {
        match (poses.first(), poses.last()) {
            (Some(first), Some(last)) => {
                Ok((grid.to_grid(first.position), grid.to_grid(last.position)))
            }
            _ => Err(MapError::EmptyPoses),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::WorldPoint;

    fn point(x: f64, y: f64) -> ObstaclePoint {
        ObstaclePoint {
            scan: 0,
            position: WorldPoint::new(x, y),
        }
    }

    #[test]
    fn accumulates_hits() {
        // Two points share the bottom-left cell, one sits in the top-right cell
        let cloud = [point(0.0, 0.0), point(0.01, 0.02), point(1.05, 0.55)];
        let single = GridMapper::default().generate_grid(&cloud).unwrap();
        assert_eq!(single.width(), 10);
        assert_eq!(single.height(), 5);
        assert!(single.is_occupied(GridCoord::new(0, 0)));
        assert!(single.is_occupied(GridCoord::new(9, 4)));
        assert_eq!(single.occupied_count(), 2);

        let mapper = GridMapper::new(MapperConfig {
            tolerance: 1,
            ..Default::default()
        });
        let filtered = mapper.generate_grid(&cloud).unwrap();
        assert_eq!(filtered.occupied_count(), 1);
        assert!(filtered.is_occupied(GridCoord::new(0, 0)));
    }

    #[test]
    fn empty_cloud_is_refused() {
        assert_eq!(
            GridMapper::default().generate_grid(&[]),
            Err(MapError::EmptyObstacleCloud)
        );
    }

    #[test]
    fn invalid_config() {
        let mapper = GridMapper::new(MapperConfig {
            cell_size: 0.0,
            ..Default::default()
        });
        assert!(matches!(
            mapper.generate_grid(&[point(0.0, 0.0), point(1.0, 1.0)]),
            Err(MapError::InvalidConfig(_))
        ));
    }

    #[test]
    fn endpoints_use_grid_binning() {
        let poses =
            PoseTable::from_poses([(0, 0.2, 0.2), (1, 0.5, 0.3), (2, 0.85, 0.75)]).unwrap();
        let cloud = [point(0.0, 0.0), point(1.0, 1.0)];
        let mapper = GridMapper::default();
        let grid = mapper.generate_grid(&cloud).unwrap();
        let (start, end) = mapper.endpoints(&poses, &grid).unwrap();
        assert_eq!(start, grid.to_grid(WorldPoint::new(0.2, 0.2)));
        assert_eq!(end, grid.to_grid(WorldPoint::new(0.85, 0.75)));
        assert!(grid.in_bounds(start) && grid.in_bounds(end));
    }
}
