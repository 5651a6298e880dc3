//! Maze generation: randomized spanning trees over the grid graph.
//!
//! Both algorithms open `rows * cols - 1` boundaries and leave every cell
//! reachable from every other; they differ only in topology bias. Prim
//! grows a frontier and produces many short branches, Kruskal unions a
//! shuffled edge list and produces fewer dead ends.

use serde::{Deserialize, Serialize};

use crate::grid::{Cell, WallRecord};
use crate::prng::Prng;
use crate::topology::MazeTopology;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    #[serde(rename = "prim")]
    RandomPrim,
    #[serde(rename = "kruskal")]
    RandomKruskal,
}

impl Algorithm {
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::RandomPrim => "prim",
            Algorithm::RandomKruskal => "kruskal",
        }
    }
}

/// A generated maze: dimensions, the dual wall/graph topology, and the
/// current endpoints. Immutable after generation except for the endpoints,
/// which callers may reassign before an episode starts.
#[derive(Debug, Clone)]
pub struct Maze {
    rows: i32,
    cols: i32,
    algorithm: Algorithm,
    topology: MazeTopology,
    start: Cell,
    goal: Cell,
}

impl Maze {
    pub(crate) fn from_parts(
        rows: i32,
        cols: i32,
        algorithm: Algorithm,
        topology: MazeTopology,
        start: Cell,
        goal: Cell,
    ) -> Self {
        Self {
            rows,
            cols,
            algorithm,
            topology,
            start,
            goal,
        }
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn topology(&self) -> &MazeTopology {
        &self.topology
    }

    pub fn start(&self) -> Cell {
        self.start
    }

    pub fn goal(&self) -> Cell {
        self.goal
    }

    pub fn set_endpoints(&mut self, start: Cell, goal: Cell) {
        self.start = start;
        self.goal = goal;
    }

    /// Read-only wall view, for rendering and export.
    pub fn walls(&self) -> &hashbrown::HashSet<WallRecord> {
        self.topology.walls()
    }

    /// Normalized connectivity edge list, for rendering and export.
    pub fn connectivity_edges(&self) -> Vec<(Cell, Cell)> {
        self.topology.edges()
    }
}

/// Generate a maze with a one-shot generator seeded from `seed`.
pub fn generate(rows: i32, cols: i32, algorithm: Algorithm, seed: u64) -> Maze {
    let mut rng = Prng::new(seed);
    generate_with(rows, cols, algorithm, &mut rng)
}

/// Generate a maze drawing from a caller-owned generator. The environment
/// uses this so one seed covers maze layout and noise draws alike.
pub fn generate_with(rows: i32, cols: i32, algorithm: Algorithm, rng: &mut Prng) -> Maze {
    assert!(rows >= 1 && cols >= 1, "maze needs at least one cell");
    let mut topology = MazeTopology::new(rows, cols);
    match algorithm {
        Algorithm::RandomPrim => carve_prim(&mut topology, rng),
        Algorithm::RandomKruskal => carve_kruskal(&mut topology, rng),
    }
    Maze::from_parts(
        rows,
        cols,
        algorithm,
        topology,
        Cell::new(0, 0),
        Cell::new(cols - 1, rows - 1),
    )
}

/// Frontier growth from (0, 0): pick a frontier edge uniformly at random,
/// open it if the far cell is still unvisited, then push that cell's
/// unvisited neighbors. Ends when the frontier drains, which visits every
/// cell because the grid graph is connected.
fn carve_prim(topology: &mut MazeTopology, rng: &mut Prng) {
    let start = Cell::new(0, 0);
    let mut visited = hashbrown::HashSet::with_capacity(topology.cell_count());
    visited.insert(start);

    let mut frontier: Vec<(Cell, Cell)> = topology
        .grid_neighbors(start)
        .map(|next| (start, next))
        .collect();

    while !frontier.is_empty() {
        let pick = rng.gen_range_usize(0, frontier.len());
        let (cell, next) = frontier.swap_remove(pick);
        if !visited.insert(next) {
            continue;
        }
        topology.connect(cell, next);
        for neighbor in topology.grid_neighbors(next) {
            if !visited.contains(&neighbor) {
                frontier.push((next, neighbor));
            }
        }
    }
}

/// Shuffled edge union: walk the internal edges in uniform random order
/// and open each one whose endpoints are still in different components.
/// Skipped edges would close a cycle, so the result is a tree.
fn carve_kruskal(topology: &mut MazeTopology, rng: &mut Prng) {
    let cols = topology.cols();
    let mut edges: Vec<(Cell, Cell)> = Vec::new();
    for cell in topology.cells() {
        for next in topology.grid_neighbors(cell) {
            if cell < next {
                edges.push((cell, next));
            }
        }
    }
    rng.shuffle(&mut edges);

    let index = |cell: Cell| (cell.y * cols + cell.x) as usize;
    let mut components = DisjointSet::new(topology.cell_count());
    for (a, b) in edges {
        if components.union(index(a), index(b)) {
            topology.connect(a, b);
        }
    }
}

/// Union-find with path compression and union by rank.
struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    fn find(&mut self, mut v: usize) -> usize {
        while self.parent[v] != v {
            // Path halving: point at the grandparent as we walk up.
            self.parent[v] = self.parent[self.parent[v]];
            v = self.parent[v];
        }
        v
    }

    /// Merge the two components. False when already merged.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        if self.rank[ra] < self.rank[rb] {
            self.parent[ra] = rb;
        } else if self.rank[ra] > self.rank[rb] {
            self.parent[rb] = ra;
        } else {
            self.parent[rb] = ra;
            self.rank[ra] += 1;
        }
        true
    }
}
