use std::collections::HashSet;

use cogex_core::Position;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{GenerateError, Result};

/// Rectangular placement grid on the z = 0 plane, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionGrid {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl Default for PositionGrid {
    /// 9 × 5 cells centred on the origin.
    fn default() -> Self {
        Self {
            x_min: -4,
            x_max: 4,
            y_min: -2,
            y_max: 2,
        }
    }
}

impl PositionGrid {
    /// All cells, x-major.
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (self.x_min..=self.x_max)
            .flat_map(move |x| (self.y_min..=self.y_max).map(move |y| Position::new(x, y, 0)))
    }

    /// Picks `count` distinct cells not in `used`, in random order.
    pub fn pick_positions<R: Rng + ?Sized>(
        &self,
        count: usize,
        used: &HashSet<Position>,
        rng: &mut R,
    ) -> Result<Vec<Position>> {
        let mut available: Vec<Position> = self.cells().filter(|p| !used.contains(p)).collect();
        if available.len() < count {
            return Err(GenerateError::InsufficientPositions {
                requested: count,
                available: available.len(),
            });
        }
        let (picked, _) = available.partial_shuffle(rng, count);
        Ok(picked.to_vec())
    }
}
