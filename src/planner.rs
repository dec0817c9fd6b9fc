//! Clearance-aware path search on an [OccupancyGrid].
use core::fmt;
use log::{info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::coord::{GridCoord, WorldPoint};
use crate::error::SearchError;
use crate::grid::OccupancyGrid;
use crate::search::{SearchContext, Termination};
use crate::DEFAULT_CLEARANCE_RADIUS;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchConfig {
    /// Half-width, in cells, of the square footprint that must stay inside the grid and free of
    /// obstacles around every cell of the path.
    pub clearance_radius: u32,
    /// Upper bound on the number of expanded nodes. [None] searches until the frontier empties.
    pub max_expansions: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            clearance_radius: DEFAULT_CLEARANCE_RADIUS,
            max_expansions: None,
        }
    }
}

/// A path found by [PathSearch], ordered from start to goal.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedPath {
    pub cells: Vec<GridCoord>,
    /// Sum of the step lengths in cell units.
    pub cost: f64,
    /// Number of nodes expanded to find it.
    pub expanded: usize,
}

impl PlannedPath {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The path in world coordinates, for export.
    pub fn to_world(&self, grid: &OccupancyGrid) -> Vec<WorldPoint> {
        self.cells.iter().map(|&c| grid.to_world(c)).collect()
    }
}

/// Result of a search that was allowed to run.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchOutcome {
    Found(PlannedPath),
    /// Every reachable cell was expanded without meeting the goal.
    NoPath { expanded: usize },
    /// [SearchConfig::max_expansions] was hit first.
    BudgetExhausted { expanded: usize },
}

impl SearchOutcome {
    pub fn path(&self) -> Option<&PlannedPath> {
        match self {
            SearchOutcome::Found(path) => Some(path),
            _ => None,
        }
    }

    pub fn into_path(self) -> Option<PlannedPath> {
        match self {
            SearchOutcome::Found(path) => Some(path),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }
}

impl fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SearchOutcome::Found(path) => write!(
                f,
                "path of {} cells, cost {:.3}, {} expansions",
                path.len(),
                path.cost,
                path.expanded
            ),
            SearchOutcome::NoPath { expanded } => {
                write!(f, "no path found after {} expansions", expanded)
            }
            SearchOutcome::BudgetExhausted { expanded } => {
                write!(f, "expansion budget exhausted after {} expansions", expanded)
            }
        }
    }
}

/// True if an agent centred on `coord` would leave the grid or touch an occupied cell.
pub fn collides(grid: &OccupancyGrid, coord: GridCoord, clearance_radius: u32) -> bool {
    !grid.window_in_bounds(coord, clearance_radius) || grid.window_occupied(coord, clearance_radius)
}

/// Finds lowest-cost 8-connected paths on a read-only grid for an agent with a square footprint.
///
/// Collision results are memoised for the lifetime of the searcher, so repeated searches on the
/// same grid never test a cell twice.
pub struct PathSearch<'a> {
    grid: &'a OccupancyGrid,
    config: SearchConfig,
    context: SearchContext,
}

impl<'a> PathSearch<'a> {
    pub fn new(grid: &'a OccupancyGrid, config: SearchConfig) -> PathSearch<'a> {
        PathSearch {
            grid,
            config,
            context: SearchContext::new(),
        }
    }

    pub fn grid(&self) -> &OccupancyGrid {
        self.grid
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Collision test with memoisation. Cells expanded in the current run also count as blocked.
    pub fn is_blocked(&mut self, coord: GridCoord) -> bool {
        let grid = self.grid;
        let radius = self.config.clearance_radius;
        self.context
            .is_blocked(coord, &mut |c| collides(grid, c, radius))
    }

    /// Number of cells memoised as colliding so far.
    pub fn blocked_count(&self) -> usize {
        self.context.blocked_count()
    }

    /// Searches from `start` to `goal`. Endpoints outside the grid or violating the clearance are
    /// rejected before any expansion. Failing to reach the goal is reported through the outcome.
    pub fn search(
        &mut self,
        start: GridCoord,
        goal: GridCoord,
    ) -> Result<SearchOutcome, SearchError> {
        self.context.reset();
        if !self.grid.in_bounds(start) {
            warn!("Rejecting start {:?}: outside the grid", start);
            return Err(SearchError::StartOutOfBounds(start));
        }
        if !self.grid.in_bounds(goal) {
            warn!("Rejecting goal {:?}: outside the grid", goal);
            return Err(SearchError::GoalOutOfBounds(goal));
        }
        if self.is_blocked(start) {
            warn!("Rejecting start {:?}: clearance violated", start);
            return Err(SearchError::StartBlocked(start));
        }
        if self.is_blocked(goal) {
            warn!("Rejecting goal {:?}: clearance violated", goal);
            return Err(SearchError::GoalBlocked(goal));
        }

        let grid = self.grid;
        let radius = self.config.clearance_radius;
        let termination = self.context.astar(
            start,
            goal,
            |c| collides(grid, c, radius),
            self.config.max_expansions,
        );
        let expanded = self.context.expanded_count();
        let outcome = match termination {
            Termination::Reached(index) => {
                let cost = self.context.node(index).map_or(0.0, |(_, node)| node.g);
                let mut cells = self.context.backtrack(index);
                cells.reverse();
                info!(
                    "Found path from {:?} to {:?}: {} cells, cost {:.3}",
                    start,
                    goal,
                    cells.len(),
                    cost
                );
                SearchOutcome::Found(PlannedPath {
                    cells,
                    cost,
                    expanded,
                })
            }
            Termination::Exhausted => SearchOutcome::NoPath { expanded },
            Termination::Budget => SearchOutcome::BudgetExhausted { expanded },
        };
        Ok(outcome)
    }
}
