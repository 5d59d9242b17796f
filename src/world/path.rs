//! Weighted grid pathfinding
//!
//! A cost grid marks impassable cells with 0. Entering a cell costs its
//! value times 2 for a cardinal step or 3 for a diagonal one.

use pathfinding::prelude::astar;

use super::Map;
use crate::ecs::{Direction, Position};

const CARDINAL_COST: u32 = 2;
const DIAGONAL_COST: u32 = 3;

/// Extra cost for cells holding a blocking entity
pub const CROWDING_PENALTY: u32 = 10;

/// Per-cell movement costs
#[derive(Debug, Clone)]
pub struct CostGrid {
    width: i32,
    height: i32,
    costs: Vec<u32>,
}

impl CostGrid {
    /// Walkable cells cost 1, everything else is impassable
    pub fn from_map(map: &Map) -> Self {
        Self {
            width: map.width,
            height: map.height,
            costs: map.tiles.iter().map(|t| u32::from(t.is_walkable())).collect(),
        }
    }

    fn idx(&self, pos: Position) -> Option<usize> {
        (pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height)
            .then(|| (pos.y * self.width + pos.x) as usize)
    }

    pub fn cost(&self, pos: Position) -> u32 {
        self.idx(pos).map_or(0, |i| self.costs[i])
    }

    /// Raise the cost of a passable cell
    pub fn add_cost(&mut self, pos: Position, amount: u32) {
        if let Some(i) = self.idx(pos) {
            if self.costs[i] > 0 {
                self.costs[i] += amount;
            }
        }
    }

    fn successors(&self, pos: &Position) -> Vec<(Position, u32)> {
        Direction::ALL
            .iter()
            .filter_map(|d| {
                let next = *pos + d.delta();
                let cost = self.cost(next);
                if cost == 0 {
                    return None;
                }
                let step = if d.is_cardinal() { CARDINAL_COST } else { DIAGONAL_COST };
                Some((next, cost * step))
            })
            .collect()
    }
}

/// Cheapest path from `from` to `to`, excluding `from`. Empty when unreachable.
pub fn path_to(grid: &CostGrid, from: Position, to: Position) -> Vec<Position> {
    if from == to || grid.cost(to) == 0 {
        return Vec::new();
    }
    let result = astar(
        &from,
        |p| grid.successors(p),
        |p| p.chebyshev_distance(&to) as u32 * CARDINAL_COST,
        |p| *p == to,
    );
    match result {
        Some((mut path, _)) => {
            path.remove(0);
            path
        }
        None => Vec::new(),
    }
}
