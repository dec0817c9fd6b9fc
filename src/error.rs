use thiserror::Error;

use crate::coord::GridCoord;

/// Failures while turning poses and sweeps into an [OccupancyGrid](crate::OccupancyGrid).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MapError {
    #[error("no drone poses were supplied")]
    EmptyPoses,
    #[error("no sweep readings were supplied")]
    EmptySweeps,
    #[error("sweep reading references unknown scan {scan}")]
    UnknownScan { scan: u32 },
    #[error("scan {scan} does not follow scan {previous} in acquisition order")]
    NonIncreasingScan { previous: u32, scan: u32 },
    #[error("no obstacles detected: every reading is at or below the noise floor")]
    EmptyObstacleCloud,
    #[error("obstacle cloud spans {span} along the {axis} axis, less than one cell")]
    DegenerateExtent { axis: char, span: f64 },
    #[error("invalid mapper configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Rejections raised before a search starts. Exhausting the frontier is not an error, see
/// [SearchOutcome](crate::SearchOutcome).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
    #[error("start {0:?} lies outside the grid")]
    StartOutOfBounds(GridCoord),
    #[error("goal {0:?} lies outside the grid")]
    GoalOutOfBounds(GridCoord),
    #[error("start {0:?} violates the clearance radius")]
    StartBlocked(GridCoord),
    #[error("goal {0:?} violates the clearance radius")]
    GoalBlocked(GridCoord),
}
