//! A* over the 8-connected grid with an explicit arena of search nodes.
//!
//! Discovered nodes live in an [IndexMap](indexmap::IndexMap) keyed by cell; a node's position in the map is its id
//! and parents are referred to by id, so the whole tree is dropped at once with the context.
//! Priorities sit in a [BinaryHeap] with lazy deletion: when a cheaper route to a frontier cell
//! is found, the node is updated in place and a new heap entry is pushed, and outdated entries
//! are skipped when popped.
use fxhash::FxHashSet;
use indexmap::map::Entry::{Occupied, Vacant};
use log::{debug, warn};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::coord::{cmp_cells, euclidean_distance, moore_neighborhood, GridCoord};
use crate::FxIndexMap;

/// A discovered cell. `g` is the cost of the best known route from the start, `h` the
/// straight-line estimate to the goal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SearchNode {
    pub parent: Option<usize>,
    pub g: f64,
    pub h: f64,
}

struct SmallestCostHolder {
    estimated_cost: f64,
    cost: f64,
    coord: GridCoord,
    index: usize,
}

impl Eq for SmallestCostHolder {}

impl PartialEq for SmallestCostHolder {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd for SmallestCostHolder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SmallestCostHolder {
    fn cmp(&self, other: &Self) -> Ordering {
        // Smallest estimated cost first. Among equal estimates the node with the larger cost
        // (closer to the goal) goes first, then the lexicographically smallest cell.
        other
            .estimated_cost
            .total_cmp(&self.estimated_cost)
            .then_with(|| self.cost.total_cmp(&other.cost))
            .then_with(|| cmp_cells(&other.coord, &self.coord))
    }
}

/// How a search run ended.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Termination {
    /// The goal was expanded; holds its node id.
    Reached(usize),
    /// The frontier emptied without reaching the goal.
    Exhausted,
    /// The expansion budget ran out.
    Budget,
}

/// State of one search: the node arena, the priority queue, the expanded set and the memo of
/// cells that are permanently blocked.
#[derive(Default)]
pub(crate) struct SearchContext {
    nodes: FxIndexMap<GridCoord, SearchNode>,
    to_see: BinaryHeap<SmallestCostHolder>,
    expanded: FxHashSet<GridCoord>,
    blocked: FxHashSet<GridCoord>,
}

impl SearchContext {
    pub fn new() -> SearchContext {
        SearchContext::default()
    }

    /// Forgets everything from the previous run except the blocked memo, which only depends on
    /// the grid and the clearance radius.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.to_see.clear();
        self.expanded.clear();
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked.len()
    }

    pub fn expanded_count(&self) -> usize {
        self.expanded.len()
    }

    /// A cell is blocked if it was already expanded or is known to collide. Otherwise `collides`
    /// is consulted and a positive answer is memoised for good.
    pub fn is_blocked<F>(&mut self, coord: GridCoord, collides: &mut F) -> bool
    where
        F: FnMut(GridCoord) -> bool,
    {
        if self.expanded.contains(&coord) || self.blocked.contains(&coord) {
            return true;
        }
        if collides(coord) {
            self.blocked.insert(coord);
            return true;
        }
        false
    }

    pub fn node(&self, index: usize) -> Option<(&GridCoord, &SearchNode)> {
        self.nodes.get_index(index)
    }

    /// Runs A* from `start` to `goal`. The caller has already checked that both endpoints are
    /// free. At most `max_expansions` nodes are expanded when a budget is given.
    pub fn astar<F>(
        &mut self,
        start: GridCoord,
        goal: GridCoord,
        mut collides: F,
        max_expansions: Option<usize>,
    ) -> Termination
    where
        F: FnMut(GridCoord) -> bool,
    {
        self.reset();
        let h = euclidean_distance(start, goal);
        self.nodes.insert(
            start,
            SearchNode {
                parent: None,
                g: 0.0,
                h,
            },
        );
        self.to_see.push(SmallestCostHolder {
            estimated_cost: h,
            cost: 0.0,
            coord: start,
            index: 0,
        });

        while let Some(SmallestCostHolder {
            cost, coord, index, ..
        }) = self.to_see.pop()
        {
            // Stale entries: the cell was expanded already or a cheaper route was found later
            if self.expanded.contains(&coord) {
                continue;
            }
            let g = match self.nodes.get_index(index) {
                Some((_, node)) => node.g,
                None => continue,
            };
            if cost > g {
                continue;
            }
            if max_expansions.is_some_and(|budget| self.expanded.len() >= budget) {
                warn!(
                    "Expansion budget of {} exhausted before reaching {:?}",
                    self.expanded.len(),
                    goal
                );
                return Termination::Budget;
            }
            self.expanded.insert(coord);
            if coord == goal {
                debug!("Reached {:?} after {} expansions", goal, self.expanded.len());
                return Termination::Reached(index);
            }
            for neighbour in moore_neighborhood(coord) {
                if self.is_blocked(neighbour, &mut collides) {
                    continue;
                }
                let new_cost = g + euclidean_distance(coord, neighbour);
                let n;
                let h;
                match self.nodes.entry(neighbour) {
                    Vacant(e) => {
                        h = euclidean_distance(neighbour, goal);
                        n = e.index();
                        e.insert(SearchNode {
                            parent: Some(index),
                            g: new_cost,
                            h,
                        });
                    }
                    Occupied(mut e) => {
                        // Only a strictly cheaper route replaces the frontier entry
                        if e.get().g > new_cost {
                            h = e.get().h;
                            n = e.index();
                            e.insert(SearchNode {
                                parent: Some(index),
                                g: new_cost,
                                h,
                            });
                        } else {
                            continue;
                        }
                    }
                }
                self.to_see.push(SmallestCostHolder {
                    estimated_cost: new_cost + h,
                    cost: new_cost,
                    coord: neighbour,
                    index: n,
                });
            }
        }
        warn!(
            "Frontier exhausted after {} expansions, {:?} is unreachable from {:?}",
            self.expanded.len(),
            goal,
            start
        );
        Termination::Exhausted
    }

    /// Cells from the node `index` back to the start, following parent links. The result runs
    /// goal to start.
    pub fn backtrack(&self, index: usize) -> Vec<GridCoord> {
        std::iter::successors(self.nodes.get_index(index), |(_, node)| {
            node.parent.and_then(|p| self.nodes.get_index(p))
        })
        .map(|(coord, _)| *coord)
        .collect()
    }
}
