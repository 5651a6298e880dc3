//! The episodic environment: owns one maze, one robot and one seeded
//! generator, applies action noise, and steps episodes to termination.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::grid::{Action, Cell, Heading};
use crate::maze::{generate_with, Algorithm, Maze};
use crate::prng::Prng;
use crate::robot::Robot;
use crate::solve::{shortest_path, shortest_path_len};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnvConfig {
    pub rows: i32,
    pub cols: i32,
    pub algorithm: Algorithm,
    pub seed: u64,
    /// Probability that the executed action is replaced by a uniformly
    /// random one, whatever the intent was.
    pub slip_p: f32,
    /// Probability that a turn intent flips to the opposite turn.
    pub turn_error_p: f32,
    /// Step budget = multiplier * rows * cols.
    pub step_budget_multiplier: u32,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            rows: 15,
            cols: 15,
            algorithm: Algorithm::RandomPrim,
            seed: 1,
            slip_p: 0.05,
            turn_error_p: 0.0,
            step_budget_multiplier: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    InvalidDimensions { rows: i32, cols: i32 },
    /// A single-cell grid cannot hold distinct start and goal cells.
    GridTooSmall { rows: i32, cols: i32 },
    InvalidProbability { name: &'static str, value: f32 },
    ZeroStepBudget,
    InvalidEndpoints { start: Cell, goal: Cell },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidDimensions { rows, cols } => {
                write!(f, "maze dimensions {}x{} must be positive", rows, cols)
            }
            ConfigError::GridTooSmall { rows, cols } => {
                write!(f, "{}x{} grid has no room for distinct start and goal", rows, cols)
            }
            ConfigError::InvalidProbability { name, value } => {
                write!(f, "{} = {} is outside [0, 1]", name, value)
            }
            ConfigError::ZeroStepBudget => write!(f, "step budget multiplier must be nonzero"),
            ConfigError::InvalidEndpoints { start, goal } => write!(
                f,
                "endpoints ({}, {}) and ({}, {}) must be distinct in-grid cells",
                start.x, start.y, goal.x, goal.y
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl EnvConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows <= 0 || self.cols <= 0 {
            return Err(ConfigError::InvalidDimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if self.rows == 1 && self.cols == 1 {
            return Err(ConfigError::GridTooSmall {
                rows: self.rows,
                cols: self.cols,
            });
        }
        for (name, value) in [("slip_p", self.slip_p), ("turn_error_p", self.turn_error_p)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }
        if self.step_budget_multiplier == 0 {
            return Err(ConfigError::ZeroStepBudget);
        }
        Ok(())
    }

    pub fn step_budget(&self) -> u32 {
        self.step_budget_multiplier * (self.rows as u32) * (self.cols as u32)
    }
}

/// What any policy consumes: the three relative wall readings plus the
/// robot and goal coordinates, all plain integers and booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub wall_front: bool,
    pub wall_left: bool,
    pub wall_right: bool,
    pub x: i32,
    pub y: i32,
    pub dir: u8,
    pub goal_x: i32,
    pub goal_y: i32,
}

/// Step telemetry: where the robot ended up, what actually ran, and what
/// was asked for (the intended/executed pair makes noise visible).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepInfo {
    pub position: Cell,
    pub heading: Heading,
    pub goal: Cell,
    pub collisions: u32,
    pub latency_ms: f64,
    pub executed: Action,
    pub intended: Action,
}

#[derive(Debug, Clone, Copy)]
pub struct StepOutcome {
    pub observation: Observation,
    pub reward: f32,
    pub done: bool,
    pub info: StepInfo,
}

#[derive(Debug)]
pub struct Environment {
    cfg: EnvConfig,
    rng: Prng,
    maze: Maze,
    robot: Robot,
    steps: u32,
    collisions: u32,
    done: bool,
}

impl Environment {
    /// Validates the configuration and seeds the environment's single
    /// generator. The first episode still needs a `reset` call.
    pub fn new(cfg: EnvConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let mut rng = Prng::new(cfg.seed);
        let maze = generate_with(cfg.rows, cfg.cols, cfg.algorithm, &mut rng);
        let robot = Robot::new(maze.start());
        Ok(Self {
            cfg,
            rng,
            maze,
            robot,
            steps: 0,
            collisions: 0,
            done: false,
        })
    }

    pub fn config(&self) -> &EnvConfig {
        &self.cfg
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn robot(&self) -> &Robot {
        &self.robot
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn collisions(&self) -> u32 {
        self.collisions
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Fresh maze, uniformly random distinct start/goal, robot facing up
    /// at the start, counters cleared, initial sense taken.
    pub fn reset(&mut self) -> Observation {
        let mut maze = generate_with(self.cfg.rows, self.cfg.cols, self.cfg.algorithm, &mut self.rng);
        let (start, goal) = self.draw_endpoints();
        maze.set_endpoints(start, goal);
        self.begin_episode(maze)
    }

    /// Fresh maze with caller-chosen endpoints.
    pub fn reset_with(&mut self, start: Cell, goal: Cell) -> Result<Observation, ConfigError> {
        let in_grid = |c: Cell| c.x >= 0 && c.x < self.cfg.cols && c.y >= 0 && c.y < self.cfg.rows;
        if start == goal || !in_grid(start) || !in_grid(goal) {
            return Err(ConfigError::InvalidEndpoints { start, goal });
        }
        let mut maze = generate_with(self.cfg.rows, self.cfg.cols, self.cfg.algorithm, &mut self.rng);
        maze.set_endpoints(start, goal);
        Ok(self.begin_episode(maze))
    }

    /// Reuse an explicitly provided maze (for instance one rebuilt from a
    /// snapshot) with the endpoints it carries.
    pub fn reset_on(&mut self, maze: Maze) -> Observation {
        self.begin_episode(maze)
    }

    fn begin_episode(&mut self, maze: Maze) -> Observation {
        self.maze = maze;
        self.robot = Robot::new(self.maze.start());
        self.steps = 0;
        self.collisions = 0;
        self.done = false;
        self.robot.sense(self.maze.topology());
        self.observation()
    }

    fn draw_endpoints(&mut self) -> (Cell, Cell) {
        let cols = self.cfg.cols as usize;
        let rows = self.cfg.rows as usize;
        loop {
            let start = Cell::new(
                self.rng.gen_range_usize(0, cols) as i32,
                self.rng.gen_range_usize(0, rows) as i32,
            );
            let goal = Cell::new(
                self.rng.gen_range_usize(0, cols) as i32,
                self.rng.gen_range_usize(0, rows) as i32,
            );
            if start != goal {
                return (start, goal);
            }
        }
    }

    /// One environment step.
    ///
    /// Noise first: a turn intent may flip (probability `turn_error_p`),
    /// then an independent slip draw may replace the action outright with
    /// a uniform random one, overriding any flip. Collisions count the
    /// intent to drive into a sensed wall; the move itself is then still
    /// attempted and absorbed by the robot's own wall check, so the two
    /// mechanisms stay independent.
    ///
    /// Stepping a finished episode returns the terminal observation with
    /// zero reward and changes nothing.
    pub fn step(&mut self, intended: Action) -> StepOutcome {
        let started = Instant::now();

        if self.done {
            return StepOutcome {
                observation: self.observation(),
                reward: 0.0,
                done: true,
                info: self.info(intended, intended, started),
            };
        }

        let mut executed = intended;
        if executed.is_turn() && self.rng.chance(self.cfg.turn_error_p) {
            executed = match executed {
                Action::TurnLeft => Action::TurnRight,
                _ => Action::TurnLeft,
            };
        }
        // The slip draw is taken every step, so trajectories with and
        // without turn intents stay aligned on the same draw stream.
        if self.rng.chance(self.cfg.slip_p) {
            executed = Action::ALL[self.rng.gen_range_usize(0, Action::ALL.len())];
        }

        let before = self.robot.sense(self.maze.topology());
        if executed == Action::Forward && before.front {
            self.collisions += 1;
        }

        self.robot.apply(executed, self.maze.topology());
        self.robot.sense(self.maze.topology());

        self.steps += 1;
        let reached_goal = self.robot.position() == self.maze.goal();
        self.done = reached_goal || self.steps >= self.cfg.step_budget();

        // Additive reward: time penalty, goal bonus, turn discouragement.
        // All terms rate the executed action, not the intended one.
        let mut reward = -1.0;
        if reached_goal {
            reward += 100.0;
        }
        if executed.is_turn() {
            reward -= 0.1;
        }

        StepOutcome {
            observation: self.observation(),
            reward,
            done: self.done,
            info: self.info(executed, intended, started),
        }
    }

    pub fn observation(&self) -> Observation {
        let sensors = self.robot.sensors();
        let position = self.robot.position();
        let goal = self.maze.goal();
        Observation {
            wall_front: sensors.front,
            wall_left: sensors.left,
            wall_right: sensors.right,
            x: position.x,
            y: position.y,
            dir: self.robot.heading().index(),
            goal_x: goal.x,
            goal_y: goal.y,
        }
    }

    fn info(&self, executed: Action, intended: Action, started: Instant) -> StepInfo {
        StepInfo {
            position: self.robot.position(),
            heading: self.robot.heading(),
            goal: self.maze.goal(),
            collisions: self.collisions,
            latency_ms: started.elapsed().as_secs_f64() * 1000.0,
            executed,
            intended,
        }
    }

    /// Start-to-goal cell path, or empty when no connection exists.
    pub fn optimal_path_cells(&self) -> Vec<Cell> {
        shortest_path(&self.maze, self.maze.start(), self.maze.goal()).unwrap_or_default()
    }

    /// Start-to-goal cost in steps; `None` is the no-path sentinel.
    pub fn optimal_path_cost(&self) -> Option<usize> {
        shortest_path_len(&self.maze, self.maze.start(), self.maze.goal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::generate;
    use crate::topology::MazeTopology;

    fn quiet_config(rows: i32, cols: i32, seed: u64) -> EnvConfig {
        EnvConfig {
            rows,
            cols,
            seed,
            slip_p: 0.0,
            turn_error_p: 0.0,
            ..EnvConfig::default()
        }
    }

    #[test]
    fn validation_rejects_bad_configs() {
        let bad_dims = EnvConfig { rows: 0, ..EnvConfig::default() };
        assert!(matches!(
            bad_dims.validate(),
            Err(ConfigError::InvalidDimensions { .. })
        ));

        let single_cell = EnvConfig { rows: 1, cols: 1, ..EnvConfig::default() };
        assert!(matches!(
            single_cell.validate(),
            Err(ConfigError::GridTooSmall { .. })
        ));

        let bad_slip = EnvConfig { slip_p: 1.5, ..EnvConfig::default() };
        assert!(matches!(
            bad_slip.validate(),
            Err(ConfigError::InvalidProbability { name: "slip_p", .. })
        ));

        let bad_budget = EnvConfig { step_budget_multiplier: 0, ..EnvConfig::default() };
        assert_eq!(bad_budget.validate(), Err(ConfigError::ZeroStepBudget));

        assert!(EnvConfig::default().validate().is_ok());
    }

    #[test]
    fn reset_places_the_robot_at_a_fresh_start() {
        let mut env = Environment::new(quiet_config(6, 6, 3)).unwrap();
        let obs = env.reset();
        assert_eq!(Cell::new(obs.x, obs.y), env.maze().start());
        assert_eq!(obs.dir, 0);
        assert_ne!(env.maze().start(), env.maze().goal());
        assert_eq!(env.steps(), 0);
        assert_eq!(env.collisions(), 0);
    }

    #[test]
    fn reset_with_validates_endpoints() {
        let mut env = Environment::new(quiet_config(5, 5, 3)).unwrap();
        let obs = env.reset_with(Cell::new(1, 1), Cell::new(3, 2)).unwrap();
        assert_eq!((obs.x, obs.y), (1, 1));
        assert_eq!((obs.goal_x, obs.goal_y), (3, 2));

        let same = env.reset_with(Cell::new(2, 2), Cell::new(2, 2));
        assert!(matches!(same, Err(ConfigError::InvalidEndpoints { .. })));
        let outside = env.reset_with(Cell::new(0, 0), Cell::new(9, 9));
        assert!(outside.is_err());
    }

    #[test]
    fn same_seed_replays_the_same_trajectory() {
        let script = [
            Action::Forward,
            Action::TurnRight,
            Action::Forward,
            Action::Forward,
            Action::TurnLeft,
            Action::Forward,
            Action::Backward,
            Action::Forward,
        ];

        let cfg = EnvConfig {
            slip_p: 0.3,
            turn_error_p: 0.2,
            ..quiet_config(8, 8, 21)
        };

        let run = |cfg: EnvConfig| {
            let mut env = Environment::new(cfg).unwrap();
            let mut log = vec![(env.reset(), 0.0)];
            for action in script {
                let out = env.step(action);
                log.push((out.observation, out.reward));
            }
            log
        };

        assert_eq!(run(cfg), run(cfg));
    }

    #[test]
    fn forward_into_a_wall_counts_a_collision_and_stays_put() {
        // 2x1 maze: the robot starts at (0, 0) facing up, straight into
        // the top border.
        let mut env = Environment::new(quiet_config(1, 2, 5)).unwrap();
        let mut maze = generate(1, 2, Algorithm::RandomPrim, 5);
        maze.set_endpoints(Cell::new(0, 0), Cell::new(1, 0));
        let obs = env.reset_on(maze);
        assert!(obs.wall_front);

        let out = env.step(Action::Forward);
        assert_eq!(out.info.collisions, 1);
        assert_eq!((out.observation.x, out.observation.y), (0, 0));
        assert!(!out.done);

        // Blocking and collision counting stay independent: the blocked
        // move was absorbed without error.
        assert_eq!(env.collisions(), 1);
    }

    #[test]
    fn goal_pays_the_bonus_and_finishes_the_episode() {
        let mut env = Environment::new(quiet_config(1, 2, 5)).unwrap();
        let mut maze = generate(1, 2, Algorithm::RandomPrim, 5);
        maze.set_endpoints(Cell::new(0, 0), Cell::new(1, 0));
        env.reset_on(maze);

        let turn = env.step(Action::TurnRight);
        assert!((turn.reward - (-1.1)).abs() < 1e-6);
        assert!(!turn.done);

        let forward = env.step(Action::Forward);
        assert!(forward.done);
        assert!((forward.reward - 99.0).abs() < 1e-6);

        // A finished episode is frozen.
        let after = env.step(Action::Forward);
        assert!(after.done);
        assert_eq!(after.reward, 0.0);
        assert_eq!((after.observation.x, after.observation.y), (1, 0));
    }

    #[test]
    fn budget_exhaustion_terminates_without_the_bonus() {
        let cfg = EnvConfig {
            step_budget_multiplier: 1,
            ..quiet_config(1, 2, 9)
        };
        let mut env = Environment::new(cfg).unwrap();
        let mut maze = generate(1, 2, Algorithm::RandomPrim, 9);
        maze.set_endpoints(Cell::new(0, 0), Cell::new(1, 0));
        env.reset_on(maze);

        // Budget is 2 steps; spin in place until it runs out.
        let first = env.step(Action::TurnLeft);
        assert!(!first.done);
        let second = env.step(Action::TurnRight);
        assert!(second.done);
        assert!((second.reward - (-1.1)).abs() < 1e-6);
    }

    #[test]
    fn slip_draws_keep_the_stream_aligned() {
        // With slip_p = 0 the draw still happens, so a noise-free run and
        // its observation stream depend only on the seed and the script.
        let mut env = Environment::new(quiet_config(6, 6, 13)).unwrap();
        let obs = env.reset();
        let out = env.step(Action::TurnRight);
        assert_eq!(out.info.intended, Action::TurnRight);
        assert_eq!(out.info.executed, Action::TurnRight);
        assert_eq!(out.observation.dir, 1);
        assert_eq!((out.observation.x, out.observation.y), (obs.x, obs.y));
    }

    #[test]
    fn optimal_path_helpers_agree() {
        let mut env = Environment::new(quiet_config(7, 7, 31)).unwrap();
        env.reset();
        let cells = env.optimal_path_cells();
        let cost = env.optimal_path_cost().unwrap();
        assert_eq!(cells.len(), cost + 1);
        assert_eq!(cells.first(), Some(&env.maze().start()));
        assert_eq!(cells.last(), Some(&env.maze().goal()));
    }

    #[test]
    fn disconnected_snapshot_mazes_probe_as_unreachable() {
        // A fully walled grid has no path; helpers return sentinels.
        let mut env = Environment::new(quiet_config(2, 2, 1)).unwrap();
        let topo = MazeTopology::new(2, 2);
        let maze = Maze::from_parts(
            2,
            2,
            Algorithm::RandomPrim,
            topo,
            Cell::new(0, 0),
            Cell::new(1, 1),
        );
        env.reset_on(maze);
        assert!(env.optimal_path_cells().is_empty());
        assert_eq!(env.optimal_path_cost(), None);
    }
}
