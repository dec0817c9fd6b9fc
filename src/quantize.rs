//! Per-axis binning of real coordinates into cell indices.
use itertools::{Itertools, MinMaxResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::MapError;

/// Discretisation of one axis of the obstacle cloud.
///
/// `resolution` is `floor(span / cell_size)` and `edges` holds `resolution` values evenly spaced
/// from the observed minimum to the observed maximum, both ends included.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisBins {
    pub offset: f64,
    pub span: f64,
    pub resolution: usize,
    pub edges: Vec<f64>,
}

impl AxisBins {
    /// Fits bins to the extent of `values`. `axis` only labels the error.
    pub fn fit<I>(values: I, cell_size: f64, axis: char) -> Result<AxisBins, MapError>
    where
        I: IntoIterator<Item = f64>,
    {
        let (min, max) = match values.into_iter().minmax_by(|a, b| a.total_cmp(b)) {
            MinMaxResult::NoElements => return Err(MapError::EmptyObstacleCloud),
            MinMaxResult::OneElement(v) => (v, v),
            MinMaxResult::MinMax(lo, hi) => (lo, hi),
        };
        let span = max - min;
        let resolution = (span / cell_size).floor() as usize;
        if resolution == 0 {
            return Err(MapError::DegenerateExtent { axis, span });
        }
        Ok(AxisBins {
            offset: min,
            span,
            resolution,
            edges: linspace(min, max, resolution),
        })
    }

    /// Bin index of `value`: the number of edges `<= value`, minus one. Values below the first
    /// edge give -1 and values at or past the last edge give `resolution - 1`.
    pub fn bin(&self, value: f64) -> i32 {
        let count = self.edges.partition_point(|&edge| edge <= value);
        count as i32 - 1
    }

    /// Approximate inverse of [bin](Self::bin): `index * span / resolution + offset`.
    pub fn unbin(&self, index: i32) -> f64 {
        index as f64 * self.cell_width() + self.offset
    }

    /// World size of one cell as used by [unbin](Self::unbin).
    pub fn cell_width(&self) -> f64 {
        self.span / self.resolution as f64
    }

    pub fn contains_index(&self, index: i32) -> bool {
        index >= 0 && (index as usize) < self.resolution
    }
}

/// `n` evenly spaced values from `start` to `stop` inclusive. A single value is just `start`.
fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut edges: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            // Pin the last edge so the maximum itself always lands in the last bin
            edges[n - 1] = stop;
            edges
        }
    }
}
