//! The directional robot: a position plus a heading, with wall-relative
//! sensing. Moves are gated by the wall set; a blocked move is absorbed
//! silently so noisy policies pay in wasted steps, never in errors.

use serde::{Deserialize, Serialize};

use crate::grid::{Action, Cell, Heading, RelativeSide};
use crate::topology::MazeTopology;

/// One wall reading, relative to the robot's heading. `true` means the
/// matching side is blocked, either by a wall record or by the grid edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallSensors {
    pub front: bool,
    pub left: bool,
    pub right: bool,
}

#[derive(Debug, Clone)]
pub struct Robot {
    position: Cell,
    heading: Heading,
    sensors: WallSensors,
}

impl Robot {
    /// A robot facing up at `position`, sensors unread.
    pub fn new(position: Cell) -> Self {
        Self {
            position,
            heading: Heading::Up,
            sensors: WallSensors::default(),
        }
    }

    pub fn position(&self) -> Cell {
        self.position
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    /// The reading cached by the last [`Robot::sense`] call. Stale after
    /// any move or turn until the caller senses again.
    pub fn sensors(&self) -> WallSensors {
        self.sensors
    }

    pub fn turn_left(&mut self) {
        self.heading = self.heading.turned_left();
    }

    pub fn turn_right(&mut self) {
        self.heading = self.heading.turned_right();
    }

    /// Execute one action against the given topology. Forward/backward
    /// moves happen only when the separating wall is absent; turns always
    /// succeed. Returns whether the position changed.
    pub fn apply(&mut self, action: Action, topology: &MazeTopology) -> bool {
        match action {
            Action::TurnLeft => {
                self.turn_left();
                false
            }
            Action::TurnRight => {
                self.turn_right();
                false
            }
            Action::Forward => self.advance(self.heading, topology),
            Action::Backward => self.advance(self.heading.reversed(), topology),
        }
    }

    fn advance(&mut self, direction: Heading, topology: &MazeTopology) -> bool {
        if topology.blocked(self.position, direction) {
            return false;
        }
        self.position = self.position.step(direction);
        true
    }

    /// Read the walls on the robot's front, left and right. All three go
    /// through the same heading-relative table as movement, and refresh
    /// the cached reading.
    pub fn sense(&mut self, topology: &MazeTopology) -> WallSensors {
        let reading = WallSensors {
            front: topology.blocked(self.position, self.heading.relative(RelativeSide::Front)),
            left: topology.blocked(self.position, self.heading.relative(RelativeSide::Left)),
            right: topology.blocked(self.position, self.heading.relative(RelativeSide::Right)),
        };
        self.sensors = reading;
        reading
    }
}
