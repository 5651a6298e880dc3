//! Grid vocabulary shared by the maze, the robot and the planner.
//!
//! Axis convention, fixed once: `x` is the column (grows rightward),
//! `y` is the row (grows downward), so `Up` means y-1 and `Right` means x+1.

use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The adjacent cell one step along `heading`. May land outside the grid;
    /// bounds are the topology's concern.
    pub fn step(self, heading: Heading) -> Self {
        let (dx, dy) = heading.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn manhattan(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// The robot's facing direction. Discriminants are wire values:
/// observations expose them as plain integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Heading {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

/// A side of the robot relative to where it faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeSide {
    Front,
    Left,
    Right,
}

impl Heading {
    pub const ALL: [Heading; 4] = [Heading::Up, Heading::Right, Heading::Down, Heading::Left];

    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(i: u8) -> Self {
        match i % 4 {
            0 => Heading::Up,
            1 => Heading::Right,
            2 => Heading::Down,
            _ => Heading::Left,
        }
    }

    pub fn turned_left(self) -> Self {
        Self::from_index(self.index().wrapping_add(3))
    }

    pub fn turned_right(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn reversed(self) -> Self {
        Self::from_index(self.index() + 2)
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Heading::Up => (0, -1),
            Heading::Right => (1, 0),
            Heading::Down => (0, 1),
            Heading::Left => (-1, 0),
        }
    }

    /// The absolute direction of one of the robot's relative sides.
    ///
    /// This is the single heading-to-absolute table: movement and sensing
    /// both go through it, so they cannot disagree on what "left" means.
    pub fn relative(self, side: RelativeSide) -> Heading {
        match side {
            RelativeSide::Front => self,
            RelativeSide::Left => self.turned_left(),
            RelativeSide::Right => self.turned_right(),
        }
    }
}

/// One discrete robot command. Serializes as a single-letter wire tag,
/// which is what step telemetry records carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "F")]
    Forward,
    #[serde(rename = "B")]
    Backward,
    #[serde(rename = "L")]
    TurnLeft,
    #[serde(rename = "R")]
    TurnRight,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::Forward,
        Action::Backward,
        Action::TurnLeft,
        Action::TurnRight,
    ];

    pub fn is_turn(self) -> bool {
        matches!(self, Action::TurnLeft | Action::TurnRight)
    }
}

/// Which edge of its anchor cell a wall sits on.
///
/// Every wall is anchored at the smaller cell on the varying axis, so each
/// boundary between two cells has exactly one record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum WallSide {
    #[serde(rename = "R")]
    Right,
    #[serde(rename = "D")]
    Down,
}

/// A blocking edge: the wall on the `side` edge of cell (`x`, `y`).
///
/// Border walls anchor just outside the grid (`y = -1` above the top row,
/// `x = -1` left of the first column), which keeps the movement check
/// uniform for every edge of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WallRecord {
    pub x: i32,
    pub y: i32,
    pub side: WallSide,
}

impl WallRecord {
    pub fn new(x: i32, y: i32, side: WallSide) -> Self {
        Self { x, y, side }
    }
}

/// The record separating two 4-adjacent cells, or `None` when the cells
/// are not 4-adjacent.
pub fn wall_between(a: Cell, b: Cell) -> Option<WallRecord> {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    match (dx, dy) {
        (1, 0) | (-1, 0) => Some(WallRecord::new(a.x.min(b.x), a.y, WallSide::Right)),
        (0, 1) | (0, -1) => Some(WallRecord::new(a.x, a.y.min(b.y), WallSide::Down)),
        _ => None,
    }
}
