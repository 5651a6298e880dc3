//! Reference action streams derived from the shortest path.
//!
//! The open-loop stream is the demonstration source external learners
//! imitate; the closed-loop variant replans from wherever noise actually
//! left the robot. Neither touches any learned weights.

use crate::env::{Environment, Observation};
use crate::grid::{Action, Cell, Heading};
use crate::maze::Maze;
use crate::planner::{route_to_actions, route_to_actions_from};
use crate::solve::{shortest_path, shortest_path_len};

/// The whole start-to-goal action sequence, assuming the robot stands at
/// the start facing up (which is where `reset` puts it). Empty when the
/// goal is unreachable.
pub fn reference_actions(env: &Environment) -> Vec<Action> {
    let cells = env.optimal_path_cells();
    // A tree path is always plannable; an empty/degenerate one plans to
    // nothing either way.
    route_to_actions(&cells).unwrap_or_default()
}

/// The next reference action from the robot's current cell and heading,
/// replanned fresh. `None` once the robot stands on the goal or when the
/// goal is unreachable.
pub fn closed_loop_reference(env: &Environment) -> Option<Action> {
    let robot = env.robot();
    let cells = shortest_path(env.maze(), robot.position(), env.maze().goal())?;
    route_to_actions_from(&cells, robot.heading())
        .ok()
        .and_then(|actions| actions.first().copied())
}

/// Detour suggestion when the front is blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detour {
    Keep,
    Left,
    Right,
    Back,
}

/// Label a blocked-front situation with the cheapest way out: for each of
/// left/right/back, cost one turn plus one step plus the remaining
/// shortest-path distance from the cell that turn-and-step reaches, and
/// take the minimum. Cells the maze graph cannot reach fall back to the
/// Manhattan distance. Open fronts label as `Keep`.
pub fn detour_hint(maze: &Maze, obs: &Observation) -> Detour {
    if !obs.wall_front {
        return Detour::Keep;
    }

    let position = Cell::new(obs.x, obs.y);
    let goal = Cell::new(obs.goal_x, obs.goal_y);
    let heading = Heading::from_index(obs.dir);

    let candidates = [
        (Detour::Left, heading.turned_left()),
        (Detour::Right, heading.turned_right()),
        (Detour::Back, heading.reversed()),
    ];

    let mut best = Detour::Back;
    let mut best_cost = usize::MAX;
    for (label, direction) in candidates {
        let landing = position.step(direction);
        if !maze.topology().in_bounds(landing) {
            continue;
        }
        let distance = shortest_path_len(maze, landing, goal)
            .unwrap_or_else(|| landing.manhattan(goal) as usize);
        let cost = 2 + distance;
        if cost < best_cost {
            best_cost = cost;
            best = label;
        }
    }
    best
}
