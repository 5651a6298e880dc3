//! Dual maze representation: a wall set and its connectivity graph.
//!
//! The two views describe the same structure and drift independently if
//! callers can touch either one alone. All mutation therefore goes through
//! [`MazeTopology::connect`], which clears a wall and adds the matching
//! graph edge in one operation.

use hashbrown::{HashMap, HashSet};

use crate::grid::{wall_between, Cell, Heading, WallRecord, WallSide};

#[derive(Debug, Clone)]
pub struct MazeTopology {
    rows: i32,
    cols: i32,
    walls: HashSet<WallRecord>,
    adjacency: HashMap<Cell, Vec<Cell>>,
    edge_count: usize,
}

impl MazeTopology {
    /// A fully walled grid: every internal edge and all four borders are
    /// present, and no cell connects to any other.
    pub fn new(rows: i32, cols: i32) -> Self {
        let mut walls = HashSet::new();
        for y in 0..rows {
            for x in 0..cols {
                // Includes the bottom border (y = rows-1) and the right
                // border (x = cols-1); those records are never cleared
                // because no in-grid cell lies beyond them.
                walls.insert(WallRecord::new(x, y, WallSide::Right));
                walls.insert(WallRecord::new(x, y, WallSide::Down));
            }
        }
        for x in 0..cols {
            walls.insert(WallRecord::new(x, -1, WallSide::Down));
        }
        for y in 0..rows {
            walls.insert(WallRecord::new(-1, y, WallSide::Right));
        }

        Self {
            rows,
            cols,
            walls,
            adjacency: HashMap::new(),
            edge_count: 0,
        }
    }

    /// Rebuild the connectivity graph from a wall set alone.
    ///
    /// The inverse of reading [`MazeTopology::walls`]: any two adjacent
    /// cells without a separating record become a graph edge. Loaded wall
    /// sets may describe a disconnected grid; that is the solver's problem,
    /// not this one's.
    pub fn from_walls(rows: i32, cols: i32, walls: HashSet<WallRecord>) -> Self {
        let mut topo = Self {
            rows,
            cols,
            walls,
            adjacency: HashMap::new(),
            edge_count: 0,
        };
        for y in 0..rows {
            for x in 0..cols {
                let cell = Cell::new(x, y);
                for heading in [Heading::Right, Heading::Down] {
                    let next = cell.step(heading);
                    if !topo.in_bounds(next) {
                        continue;
                    }
                    if !topo.has_wall_between(cell, next) {
                        topo.add_edge(cell, next);
                    }
                }
            }
        }
        topo
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn cell_count(&self) -> usize {
        (self.rows as usize) * (self.cols as usize)
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.cols && cell.y >= 0 && cell.y < self.rows
    }

    /// Open the boundary between two adjacent cells: clears the wall record
    /// and inserts the graph edge together. Returns false (and changes
    /// nothing) for non-adjacent pairs or already-open boundaries.
    pub fn connect(&mut self, a: Cell, b: Cell) -> bool {
        let Some(record) = wall_between(a, b) else {
            return false;
        };
        if !self.in_bounds(a) || !self.in_bounds(b) {
            return false;
        }
        if !self.walls.remove(&record) {
            return false;
        }
        self.add_edge(a, b);
        true
    }

    fn add_edge(&mut self, a: Cell, b: Cell) {
        let forward = self.adjacency.entry(a).or_default();
        if forward.contains(&b) {
            return;
        }
        forward.push(b);
        self.adjacency.entry(b).or_default().push(a);
        self.edge_count += 1;
    }

    pub fn has_wall(&self, record: WallRecord) -> bool {
        self.walls.contains(&record)
    }

    pub fn has_wall_between(&self, a: Cell, b: Cell) -> bool {
        match wall_between(a, b) {
            Some(record) => self.walls.contains(&record),
            None => true,
        }
    }

    /// Whether a move from `cell` along `heading` is blocked. Leaving the
    /// grid counts as a wall even if a loaded wall set lost its borders.
    pub fn blocked(&self, cell: Cell, heading: Heading) -> bool {
        let target = cell.step(heading);
        if !self.in_bounds(target) {
            return true;
        }
        self.has_wall_between(cell, target)
    }

    pub fn neighbors(&self, cell: Cell) -> &[Cell] {
        self.adjacency.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Read-only view of the wall set.
    pub fn walls(&self) -> &HashSet<WallRecord> {
        &self.walls
    }

    /// The connectivity edges, each pair normalized smaller-cell-first.
    pub fn edges(&self) -> Vec<(Cell, Cell)> {
        let mut out = Vec::with_capacity(self.edge_count);
        for (&cell, neighbors) in &self.adjacency {
            for &next in neighbors {
                if cell < next {
                    out.push((cell, next));
                }
            }
        }
        out
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.rows).flat_map(move |y| (0..self.cols).map(move |x| Cell::new(x, y)))
    }

    /// In-grid 4-neighbors, walls ignored. Generation explores these.
    pub fn grid_neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        Heading::ALL
            .into_iter()
            .map(move |h| cell.step(h))
            .filter(|&c| self.in_bounds(c))
    }

    /// Whether every cell is reachable from (0, 0) through the graph.
    pub fn is_connected(&self) -> bool {
        if self.rows <= 0 || self.cols <= 0 {
            return false;
        }
        let mut seen: HashSet<Cell> = HashSet::new();
        let mut stack = vec![Cell::new(0, 0)];
        seen.insert(Cell::new(0, 0));
        while let Some(cell) = stack.pop() {
            for &next in self.neighbors(cell) {
                if seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        seen.len() == self.cell_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_grid_is_fully_walled() {
        let topo = MazeTopology::new(3, 4);
        // 12 cells with two records each, plus top and left borders.
        assert_eq!(topo.walls().len(), 12 * 2 + 4 + 3);
        assert_eq!(topo.edge_count(), 0);
        for cell in topo.cells() {
            for heading in Heading::ALL {
                assert!(topo.blocked(cell, heading));
            }
            assert!(topo.neighbors(cell).is_empty());
        }
    }

    #[test]
    fn connect_pairs_both_views() {
        let mut topo = MazeTopology::new(2, 2);
        let a = Cell::new(0, 0);
        let b = Cell::new(1, 0);

        assert!(topo.connect(a, b));
        assert!(!topo.has_wall_between(a, b));
        assert!(!topo.blocked(a, Heading::Right));
        assert_eq!(topo.neighbors(a), &[b]);
        assert_eq!(topo.neighbors(b), &[a]);
        assert_eq!(topo.edge_count(), 1);

        // Re-opening an open boundary is a no-op.
        assert!(!topo.connect(a, b));
        assert_eq!(topo.edge_count(), 1);
    }

    #[test]
    fn connect_rejects_bad_pairs() {
        let mut topo = MazeTopology::new(2, 2);
        // Diagonal.
        assert!(!topo.connect(Cell::new(0, 0), Cell::new(1, 1)));
        // Out of the grid.
        assert!(!topo.connect(Cell::new(1, 0), Cell::new(2, 0)));
        assert_eq!(topo.edge_count(), 0);
    }

    #[test]
    fn borders_stay_blocked_after_connecting() {
        let mut topo = MazeTopology::new(1, 2);
        topo.connect(Cell::new(0, 0), Cell::new(1, 0));
        assert!(topo.blocked(Cell::new(0, 0), Heading::Up));
        assert!(topo.blocked(Cell::new(0, 0), Heading::Left));
        assert!(topo.blocked(Cell::new(0, 0), Heading::Down));
        assert!(topo.blocked(Cell::new(1, 0), Heading::Right));
        assert!(!topo.blocked(Cell::new(0, 0), Heading::Right));
    }

    #[test]
    fn rebuild_from_walls_matches_edges() {
        let mut topo = MazeTopology::new(3, 3);
        topo.connect(Cell::new(0, 0), Cell::new(1, 0));
        topo.connect(Cell::new(1, 0), Cell::new(1, 1));
        topo.connect(Cell::new(1, 1), Cell::new(0, 1));

        let rebuilt = MazeTopology::from_walls(3, 3, topo.walls().clone());
        let mut original: Vec<_> = topo.edges();
        let mut recovered: Vec<_> = rebuilt.edges();
        original.sort();
        recovered.sort();
        assert_eq!(original, recovered);
        assert_eq!(rebuilt.edge_count(), topo.edge_count());
    }

    #[test]
    fn connectivity_check_walks_the_graph() {
        let mut topo = MazeTopology::new(1, 3);
        assert!(!topo.is_connected());
        topo.connect(Cell::new(0, 0), Cell::new(1, 0));
        assert!(!topo.is_connected());
        topo.connect(Cell::new(1, 0), Cell::new(2, 0));
        assert!(topo.is_connected());
    }
}
