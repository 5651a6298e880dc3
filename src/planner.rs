//! Turn a cell path into the minimal-turn action sequence that walks it.

use std::fmt;

use crate::grid::{Action, Cell, Heading};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanError {
    /// Consecutive path cells must be 4-adjacent; anything else is a
    /// usage error in the caller's path, fatal to this call only.
    InvalidStep { from: Cell, to: Cell },
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::InvalidStep { from, to } => write!(
                f,
                "path step ({}, {}) -> ({}, {}) is not a unit grid move",
                from.x, from.y, to.x, to.y
            ),
        }
    }
}

impl std::error::Error for PlanError {}

/// Actions that walk `cells` starting from heading up, with the fewest
/// turns: one quarter turn for +/-90 degrees, and a reversal always as two
/// right turns so equal plans come out identical. Paths shorter than two
/// cells plan to nothing.
pub fn route_to_actions(cells: &[Cell]) -> Result<Vec<Action>, PlanError> {
    route_to_actions_from(cells, Heading::Up)
}

/// Same, for a robot already facing `heading` (closed-loop replanning
/// starts from whatever the last step left behind).
pub fn route_to_actions_from(cells: &[Cell], heading: Heading) -> Result<Vec<Action>, PlanError> {
    if cells.len() < 2 {
        return Ok(Vec::new());
    }

    // The planner simulates its own heading; it never touches a robot.
    let mut facing = heading;
    let mut actions = Vec::with_capacity(cells.len() * 2);
    for pair in cells.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let target = step_heading(from, to).ok_or(PlanError::InvalidStep { from, to })?;
        match target.index().wrapping_sub(facing.index()) % 4 {
            0 => {}
            1 => actions.push(Action::TurnRight),
            3 => actions.push(Action::TurnLeft),
            _ => {
                actions.push(Action::TurnRight);
                actions.push(Action::TurnRight);
            }
        }
        facing = target;
        actions.push(Action::Forward);
    }
    Ok(actions)
}

fn step_heading(from: Cell, to: Cell) -> Option<Heading> {
    match (to.x - from.x, to.y - from.y) {
        (0, -1) => Some(Heading::Up),
        (1, 0) => Some(Heading::Right),
        (0, 1) => Some(Heading::Down),
        (-1, 0) => Some(Heading::Left),
        _ => None,
    }
}
