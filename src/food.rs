use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::snake::Snake;
use crate::Coords;

/// Rejection sampling gives up after this many draws and scans instead.
pub const MAX_REJECTION_ATTEMPTS: usize = 1024;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodPlacement {
    /// Draw uniformly random cells until one is free.
    Rejection,
    /// Collect every free cell and pick one uniformly.
    FreeCellScan,
}

/// The cells of a board, `width` x `height` cells of `grid` units each.
#[derive(Copy, Clone, Debug)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    pub size: i32,
}

impl Grid {
    pub fn random_cell<R: Rng>(&self, rng: &mut R) -> Coords {
        (rng.gen_range(0..self.width) * self.size, rng.gen_range(0..self.height) * self.size)
    }

    pub fn cells(&self) -> impl Iterator<Item = Coords> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| (x * self.size, y * self.size)))
    }
}

/// Picks a cell not occupied by `snake`, or `None` when the board is full.
pub fn place_food<R: Rng>(policy: FoodPlacement, grid: &Grid, snake: &Snake, rng: &mut R) -> Option<Coords> {
    if policy == FoodPlacement::Rejection {
        for _ in 0..MAX_REJECTION_ATTEMPTS {
            let cell = grid.random_cell(rng);
            if !snake.occupies(cell) {
                return Some(cell);
            }
        }
    }

    let choices: Vec<Coords> = grid.cells().filter(|pos| !snake.occupies(*pos)).collect();
    choices.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snake::Direction;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const GRID: Grid = Grid { width: 3, height: 2, size: 16 };

    #[test]
    fn test_never_on_snake() {
        let snake = Snake::from_cells(vec![(0, 0), (16, 0), (32, 0), (32, 16)], 4, Direction::Down.velocity(16)).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for policy in [FoodPlacement::Rejection, FoodPlacement::FreeCellScan].iter() {
            for _ in 0..100 {
                let cell = place_food(*policy, &GRID, &snake, &mut rng).unwrap();
                assert!(cell == (0, 16) || cell == (16, 16), "{:?}", cell);
            }
        }
    }

    #[test]
    fn test_full_board_has_no_cell() {
        let cells: Vec<Coords> = GRID.cells().collect();
        let snake = Snake::from_cells(cells, 6, Direction::Right.velocity(16)).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(place_food(FoodPlacement::Rejection, &GRID, &snake, &mut rng), None);
        assert_eq!(place_food(FoodPlacement::FreeCellScan, &GRID, &snake, &mut rng), None);
    }

    #[test]
    fn test_grid_cells_are_grid_aligned() {
        let cells: Vec<Coords> = GRID.cells().collect();
        assert_eq!(cells.len(), 6);
        assert!(cells.iter().all(|(x, y)| x % 16 == 0 && y % 16 == 0 && *x < 48 && *y < 32));
    }
}
