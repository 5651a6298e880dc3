//! Maze interchange: a JSON document carrying dimensions, endpoints, the
//! generation tag and the wall set as (x, y, side) triples. The wall set
//! is the canonical half of the dual representation, so loading rebuilds
//! the connectivity graph from it and nothing else.

use std::io::{self, Read, Write};

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::grid::{Cell, WallRecord, WallSide};
use crate::maze::{Algorithm, Maze};
use crate::topology::MazeTopology;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MazeSnapshot {
    pub rows: i32,
    pub cols: i32,
    pub algorithm: Algorithm,
    pub start: (i32, i32),
    pub goal: (i32, i32),
    pub walls: Vec<(i32, i32, WallSide)>,
}

impl MazeSnapshot {
    pub fn from_maze(maze: &Maze) -> Self {
        let mut walls: Vec<(i32, i32, WallSide)> = maze
            .walls()
            .iter()
            .map(|w| (w.x, w.y, w.side))
            .collect();
        // Stable output: the wall set iterates in hash order.
        walls.sort_unstable();

        Self {
            rows: maze.rows(),
            cols: maze.cols(),
            algorithm: maze.algorithm(),
            start: (maze.start().x, maze.start().y),
            goal: (maze.goal().x, maze.goal().y),
            walls,
        }
    }

    /// Rebuild the full maze, connectivity graph included, from the wall
    /// list. A wall set that disconnects cells still loads; the solver
    /// reports such goals as unreachable.
    pub fn into_maze(self) -> Maze {
        let walls: HashSet<WallRecord> = self
            .walls
            .iter()
            .map(|&(x, y, side)| WallRecord::new(x, y, side))
            .collect();
        let topology = MazeTopology::from_walls(self.rows, self.cols, walls);
        Maze::from_parts(
            self.rows,
            self.cols,
            self.algorithm,
            topology,
            Cell::new(self.start.0, self.start.1),
            Cell::new(self.goal.0, self.goal.1),
        )
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        serde_json::to_writer(w, self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        serde_json::from_reader(r).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
