use core::fmt;

use grid_util::grid::{BoolGrid, ValueGrid};

use crate::coord::{GridCoord, WorldPoint};
use crate::quantize::AxisBins;

/// Boolean occupancy grid of shape `(x_bins.resolution, y_bins.resolution)` together with the
/// binning parameters needed to move between world and grid coordinates. A cell is [true] when
/// occupied. The grid is never modified after generation.
#[derive(Clone, Debug)]
pub struct OccupancyGrid {
    cells: BoolGrid,
    x_bins: AxisBins,
    y_bins: AxisBins,
}

impl OccupancyGrid {
    /// Assembles a grid from per-cell hit counts. Cells with more than `tolerance` hits are
    /// occupied, counts for cells outside the bins are ignored.
    pub(crate) fn from_hits<I>(
        hits: I,
        tolerance: u32,
        x_bins: AxisBins,
        y_bins: AxisBins,
    ) -> OccupancyGrid
    where
        I: IntoIterator<Item = (GridCoord, usize)>,
    {
        let mut cells = BoolGrid::new(x_bins.resolution, y_bins.resolution, false);
        for (coord, count) in hits {
            if count > tolerance as usize
                && x_bins.contains_index(coord.x)
                && y_bins.contains_index(coord.y)
            {
                cells.set(coord.x, coord.y, true);
            }
        }
        OccupancyGrid {
            cells,
            x_bins,
            y_bins,
        }
    }

    /// Builds a grid directly from cell values, with unit cells anchored at the world origin.
    /// Handy for planning on hand-made maps. `rows[y][x]` is the cell at `(x, y)`.
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> OccupancyGrid {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.as_ref().len());
        let unit_axis = |n: usize| AxisBins {
            offset: 0.0,
            span: n as f64,
            resolution: n,
            edges: (0..n).map(|i| i as f64).collect(),
        };
        let mut cells = BoolGrid::new(width, height, false);
        for (y, row) in rows.iter().enumerate() {
            for (x, &value) in row.as_ref().iter().enumerate().take(width) {
                if value {
                    cells.set(x as i32, y as i32, true);
                }
            }
        }
        OccupancyGrid {
            cells,
            x_bins: unit_axis(width),
            y_bins: unit_axis(height),
        }
    }

    /// An entirely free grid of unit cells.
    pub fn empty(width: usize, height: usize) -> OccupancyGrid {
        OccupancyGrid::from_rows(&vec![vec![false; width]; height])
    }

    pub fn width(&self) -> usize {
        self.x_bins.resolution
    }

    pub fn height(&self) -> usize {
        self.y_bins.resolution
    }

    pub fn x_bins(&self) -> &AxisBins {
        &self.x_bins
    }

    pub fn y_bins(&self) -> &AxisBins {
        &self.y_bins
    }

    pub fn in_bounds(&self, coord: GridCoord) -> bool {
        self.x_bins.contains_index(coord.x) && self.y_bins.contains_index(coord.y)
    }

    /// Occupancy of a cell. Cells outside the grid read as free, bounds are the caller's concern.
    pub fn is_occupied(&self, coord: GridCoord) -> bool {
        self.in_bounds(coord) && self.cells.get(coord.x, coord.y)
    }

    /// True if any cell of the `(2r+1) x (2r+1)` square centred on `center` is occupied. Parts
    /// of the window outside the grid are ignored.
    pub fn window_occupied(&self, center: GridCoord, radius: u32) -> bool {
        // Clip to the grid in i64 so that no radius can overflow
        let r = i64::from(radius);
        let x0 = (i64::from(center.x) - r).max(0);
        let x1 = (i64::from(center.x) + r).min(self.width() as i64 - 1);
        let y0 = (i64::from(center.y) - r).max(0);
        let y1 = (i64::from(center.y) + r).min(self.height() as i64 - 1);
        (y0..=y1).any(|y| (x0..=x1).any(|x| self.cells.get(x as i32, y as i32)))
    }

    /// True if the whole `(2r+1) x (2r+1)` square centred on `center` lies inside the grid.
    pub fn window_in_bounds(&self, center: GridCoord, radius: u32) -> bool {
        let r = i64::from(radius);
        let inside = |c: i32, len: usize| {
            let c = i64::from(c);
            c - r >= 0 && c + r < len as i64
        };
        inside(center.x, self.width()) && inside(center.y, self.height())
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied_cells().count()
    }

    /// Occupied cells, row by row.
    pub fn occupied_cells(&self) -> impl Iterator<Item = GridCoord> + '_ {
        let width = self.width() as i32;
        (0..self.height() as i32)
            .flat_map(move |y| (0..width).map(move |x| GridCoord::new(x, y)))
            .filter(move |c| self.cells.get(c.x, c.y))
    }

    /// Quantises a world point with the same rule used to build the grid. The result may lie
    /// outside the grid.
    pub fn to_grid(&self, point: WorldPoint) -> GridCoord {
        GridCoord::new(self.x_bins.bin(point.x), self.y_bins.bin(point.y))
    }

    /// Maps a cell back to world coordinates with the affine inverse of the binning. Binning is
    /// lossy, so this only approximates the original point.
    pub fn to_world(&self, coord: GridCoord) -> WorldPoint {
        WorldPoint::new(self.x_bins.unbin(coord.x), self.y_bins.unbin(coord.y))
    }
}

impl PartialEq for OccupancyGrid {
    fn eq(&self, other: &Self) -> bool {
        self.x_bins == other.x_bins
            && self.y_bins == other.y_bins
            && self.occupied_cells().eq(other.occupied_cells())
    }
}

impl fmt::Display for OccupancyGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in 0..self.height() as i32 {
            let row: String = (0..self.width() as i32)
                .map(|x| {
                    if self.is_occupied(GridCoord::new(x, y)) {
                        '#'
                    } else {
                        '.'
                    }
                })
                .collect();
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}
