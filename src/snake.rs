use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::Coords;
use Direction::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Direction {
    pub fn axis(self) -> Axis {
        match self {
            Up | Down => Axis::Vertical,
            Left | Right => Axis::Horizontal,
        }
    }

    /// Velocity vector for one step of `grid` units in this direction.
    pub fn velocity(self, grid: i32) -> Velocity {
        match self {
            Up => Velocity { dx: 0, dy: -grid },
            Down => Velocity { dx: 0, dy: grid },
            Left => Velocity { dx: -grid, dy: 0 },
            Right => Velocity { dx: grid, dy: 0 },
        }
    }
}

/// Per-tick displacement. Exactly one component is non-zero.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Velocity {
    pub dx: i32,
    pub dy: i32,
}

impl Velocity {
    pub fn axis(self) -> Axis {
        if self.dx != 0 { Axis::Horizontal } else { Axis::Vertical }
    }

    pub fn direction(self) -> Direction {
        match (self.dx.signum(), self.dy.signum()) {
            (1, _) => Right,
            (-1, _) => Left,
            (_, 1) => Down,
            _ => Up,
        }
    }
}

/// Board extent in grid units. Positions live in `[0, width) x [0, height)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub fn wrap(&self, pos: Coords, grid: i32) -> Coords {
        (wrap_axis(pos.0, self.width, grid), wrap_axis(pos.1, self.height, grid))
    }
}

fn wrap_axis(v: i32, extent: i32, grid: i32) -> i32 {
    if v < 0 {
        extent - grid
    } else if v >= extent {
        0
    } else {
        v
    }
}

#[derive(Clone, Debug)]
pub struct Snake {
    body: VecDeque<Coords>,
    velocity: Velocity,
    max_cells: usize,
}

impl Snake {
    pub fn new(head: Coords, max_cells: usize, velocity: Velocity) -> Self {
        let mut body = VecDeque::with_capacity(max_cells + 1);
        body.push_back(head);
        Snake { body, velocity, max_cells: max_cells.max(1) }
    }

    /// Builds a snake from an explicit head-first body.
    pub fn from_cells(cells: impl IntoIterator<Item = Coords>, max_cells: usize, velocity: Velocity) -> Option<Self> {
        let body: VecDeque<Coords> = cells.into_iter().collect();
        if body.is_empty() || body.len() > max_cells {
            return None;
        }
        Some(Snake { body, velocity, max_cells })
    }

    /// Head-first cells.
    pub fn body(&self) -> &VecDeque<Coords> {
        &self.body
    }

    pub fn head(&self) -> Coords {
        self.body[0]
    }

    pub fn velocity(&self) -> Velocity {
        self.velocity
    }

    pub fn direction(&self) -> Direction {
        self.velocity.direction()
    }

    pub fn max_cells(&self) -> usize {
        self.max_cells
    }

    pub fn occupies(&self, pos: Coords) -> bool {
        self.body.contains(&pos)
    }

    /// Whether a turn towards `dir` is allowed from the current movement axis.
    pub fn accepts_turn(&self, dir: Direction) -> bool {
        dir.axis() != self.velocity.axis()
    }

    pub fn set_velocity(&mut self, velocity: Velocity) {
        self.velocity = velocity;
    }

    /// Moves the head one step, wrapping at the board edges, and trims the tail
    /// back to the target length. Returns the new head.
    pub fn step(&mut self, bounds: Bounds, grid: i32) -> Coords {
        let old_head = self.head();
        let new_head = bounds.wrap((old_head.0 + self.velocity.dx, old_head.1 + self.velocity.dy), grid);

        self.body.push_front(new_head);
        if self.body.len() > self.max_cells {
            self.body.pop_back();
        }

        new_head
    }

    pub fn grow(&mut self) {
        self.max_cells += 1;
    }

    /// True when the head shares a cell with any trailing segment.
    pub fn head_collides(&self) -> bool {
        let head = self.head();
        self.body.iter().skip(1).any(|cell| *cell == head)
    }

    pub fn head_char(&self) -> char {
        match self.direction() {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }
}
