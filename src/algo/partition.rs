//! Weighted k-way graph partitioning.
//!
//! Splits a node-weighted graph into `k` parts of roughly equal total weight
//! while keeping the number of cut arcs low. For surface partitioning the
//! nodes are triangles, the arcs come from [`FaceAdjacency`] and node weights
//! are scaled triangle areas, so parts end up with similar surface area.
//!
//! # Algorithm
//!
//! 1. **Greedy graph growing.** Parts are grown one after another. Each part
//!    starts from a seed on the rim of the already assigned region (the very
//!    first seed is a pseudo-peripheral node) and repeatedly absorbs the
//!    frontier node with the most arcs into the part until it holds its share
//!    of the remaining weight. The last part takes whatever is left.
//! 2. **Boundary refinement.** Boundary nodes move to the neighboring part
//!    that reduces the cut the most, as long as the destination stays below
//!    `(1 + imbalance)` times the ideal part weight. Overweight parts may also
//!    shed nodes at a cut cost when that improves balance.
//!
//! The result is fully deterministic for a given graph and part count.
//!
//! # Example
//!
//! ```
//! use atrophy::algo::adjacency::FaceAdjacency;
//! use atrophy::algo::partition::{partition_graph, Graph, PartitionOptions};
//!
//! // Four triangles in a strip
//! let faces = vec![[0, 1, 2], [1, 3, 2], [2, 3, 4], [3, 5, 4]];
//! let adj = FaceAdjacency::from_triangles(&faces);
//! let graph = Graph::from_adjacency(&adj, vec![1; 4]).unwrap();
//!
//! let parts = partition_graph(&graph, 2, &PartitionOptions::default()).unwrap();
//! assert_eq!(parts.edge_cut, 1);
//! ```

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;

use super::adjacency::FaceAdjacency;
use super::Progress;
use crate::error::{MeshError, Result};

const UNASSIGNED: usize = usize::MAX;

/// Default multiplier from triangle area to integer node weight.
pub const DEFAULT_WEIGHT_SCALE: f64 = 10_000.0;

/// Name of the per-triangle label array written by the partition command.
pub const PART_ARRAY: &str = "MetisPart";

/// A node-weighted undirected graph in compressed sparse row form.
#[derive(Debug, Clone)]
pub struct Graph {
    xadj: Vec<usize>,
    adjncy: Vec<usize>,
    weights: Vec<u64>,
}

impl Graph {
    /// Create a graph from CSR arrays and per-node weights.
    ///
    /// Arcs must be listed in both directions. Every weight must be at least 1.
    pub fn new(xadj: Vec<usize>, adjncy: Vec<usize>, weights: Vec<u64>) -> Result<Self> {
        if xadj.len() != weights.len() + 1 {
            return Err(MeshError::invalid_param(
                "xadj",
                xadj.len(),
                "must have one more entry than there are nodes",
            ));
        }
        if xadj[0] != 0 || xadj.windows(2).any(|w| w[0] > w[1]) {
            return Err(MeshError::invalid_param(
                "xadj",
                format!("{:?}", &xadj[..xadj.len().min(8)]),
                "offsets must start at 0 and never decrease",
            ));
        }
        if xadj[xadj.len() - 1] != adjncy.len() {
            return Err(MeshError::invalid_param(
                "adjncy",
                adjncy.len(),
                "length must equal the last xadj offset",
            ));
        }
        if let Some(&bad) = adjncy.iter().find(|&&v| v >= weights.len()) {
            return Err(MeshError::invalid_param("adjncy", bad, "node index out of range"));
        }
        if let Some(pos) = weights.iter().position(|&w| w == 0) {
            return Err(MeshError::invalid_param("weights", pos, "node weights must be positive"));
        }
        Ok(Self {
            xadj,
            adjncy,
            weights,
        })
    }

    /// Create the triangle graph of a face adjacency.
    pub fn from_adjacency(adjacency: &FaceAdjacency, weights: Vec<u64>) -> Result<Self> {
        let (xadj, adjncy) = adjacency.to_csr();
        Self::new(xadj, adjncy, weights)
    }

    /// Number of nodes.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.weights.len()
    }

    /// Neighbors of node `v`.
    #[inline]
    pub fn neighbors(&self, v: usize) -> &[usize] {
        &self.adjncy[self.xadj[v]..self.xadj[v + 1]]
    }

    /// Weight of node `v`.
    #[inline]
    pub fn weight(&self, v: usize) -> u64 {
        self.weights[v]
    }

    /// Sum of all node weights.
    pub fn total_weight(&self) -> u64 {
        self.weights.iter().sum()
    }
}

/// Turn triangle areas into positive integer node weights.
///
/// Each weight is `trunc(scale * area)`, raised to 1 where that would be zero.
pub fn node_weights_from_areas(areas: &[f64], scale: f64) -> Vec<u64> {
    areas
        .iter()
        .map(|&a| ((scale * a) as u64).max(1))
        .collect()
}

/// Options for graph partitioning.
#[derive(Debug, Clone)]
pub struct PartitionOptions {
    /// Allowed relative overweight of a part during refinement.
    pub imbalance: f64,

    /// Maximum number of boundary refinement passes.
    pub refine_passes: usize,
}

impl Default for PartitionOptions {
    fn default() -> Self {
        Self {
            imbalance: 0.03,
            refine_passes: 8,
        }
    }
}

impl PartitionOptions {
    /// Set the allowed imbalance (clamped to be non-negative).
    pub fn with_imbalance(mut self, imbalance: f64) -> Self {
        self.imbalance = imbalance.max(0.0);
        self
    }

    /// Set the number of refinement passes.
    pub fn with_refine_passes(mut self, passes: usize) -> Self {
        self.refine_passes = passes;
        self
    }
}

/// Result of a partitioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Part label of every node, each below the requested part count.
    pub labels: Vec<usize>,
    /// Number of arcs joining nodes in different parts (each counted once).
    pub edge_cut: usize,
    /// Total node weight of every part.
    pub part_weights: Vec<u64>,
}

/// Partition `graph` into `nparts` parts.
///
/// # Errors
///
/// Returns [`MeshError::InvalidParameter`] if `nparts` is zero.
pub fn partition_graph(
    graph: &Graph,
    nparts: usize,
    options: &PartitionOptions,
) -> Result<Partition> {
    partition_graph_with_progress(graph, nparts, options, &Progress::none())
}

/// Graph partitioning with progress reporting.
pub fn partition_graph_with_progress(
    graph: &Graph,
    nparts: usize,
    options: &PartitionOptions,
    progress: &Progress,
) -> Result<Partition> {
    if nparts == 0 {
        return Err(MeshError::invalid_param("nparts", nparts, "must be at least 1"));
    }

    let n = graph.num_nodes();
    let total_steps = nparts + options.refine_passes;

    let mut labels = if nparts == 1 {
        vec![0; n]
    } else {
        grow_parts(graph, nparts, progress, total_steps)
    };

    let mut part_weights = vec![0u64; nparts];
    for (v, &p) in labels.iter().enumerate() {
        part_weights[p] += graph.weight(v);
    }

    if nparts > 1 && n > 0 {
        let ideal = graph.total_weight() as f64 / nparts as f64;
        let max_weight = ((1.0 + options.imbalance) * ideal).ceil() as u64;
        for pass in 0..options.refine_passes {
            progress.report(nparts + pass, total_steps, "Refining partition");
            let moved = refine_pass(graph, &mut labels, &mut part_weights, max_weight);
            debug!("refinement pass {}: moved {} nodes", pass, moved);
            if moved == 0 {
                break;
            }
        }
    }
    progress.report(total_steps, total_steps, "Refining partition");

    let cut = edge_cut(graph, &labels);
    info!(
        "partitioned {} nodes into {} parts, edge cut {}",
        n, nparts, cut
    );

    Ok(Partition {
        labels,
        edge_cut: cut,
        part_weights,
    })
}

/// Number of arcs whose endpoints carry different labels.
pub fn edge_cut(graph: &Graph, labels: &[usize]) -> usize {
    (0..graph.num_nodes())
        .map(|v| {
            graph
                .neighbors(v)
                .iter()
                .filter(|&&u| u > v && labels[u] != labels[v])
                .count()
        })
        .sum()
}

/// Greedy graph growing. Every node ends up with a label below `nparts`.
fn grow_parts(graph: &Graph, nparts: usize, progress: &Progress, total_steps: usize) -> Vec<usize> {
    let n = graph.num_nodes();
    let mut labels = vec![UNASSIGNED; n];
    let mut remaining_weight = graph.total_weight();
    let mut assigned = 0usize;
    // Connections from each node into the part being grown
    let mut conn = vec![0usize; n];
    let mut seeds = SeedPicker::new(n);

    for part in 0..nparts {
        if assigned == n {
            break;
        }
        progress.report(part, total_steps, "Growing partition");

        let is_last = part + 1 == nparts;
        let target = remaining_weight as f64 / (nparts - part) as f64;
        let mut weight = 0u64;
        let mut heap: BinaryHeap<(usize, Reverse<usize>)> = BinaryHeap::new();
        let mut touched: Vec<usize> = Vec::new();

        while assigned < n && (is_last || (weight as f64) < target) {
            let v = match pop_frontier(&mut heap, &labels, &conn) {
                Some(v) => v,
                None => seeds.pick(graph, &labels),
            };

            labels[v] = part;
            weight += graph.weight(v);
            assigned += 1;

            for &u in graph.neighbors(v) {
                if labels[u] == UNASSIGNED {
                    seeds.touch(u);
                    if conn[u] == 0 {
                        touched.push(u);
                    }
                    conn[u] += 1;
                    heap.push((conn[u], Reverse(u)));
                }
            }
        }

        for u in touched {
            conn[u] = 0;
        }
        remaining_weight -= weight;
    }

    labels
}

/// Pop the unassigned frontier node with the most connections into the part.
fn pop_frontier(
    heap: &mut BinaryHeap<(usize, Reverse<usize>)>,
    labels: &[usize],
    conn: &[usize],
) -> Option<usize> {
    while let Some((c, Reverse(v))) = heap.pop() {
        // Skip stale entries
        if labels[v] == UNASSIGNED && conn[v] == c {
            return Some(v);
        }
    }
    None
}

/// Chooses where the next part (or the next component of a part) starts.
///
/// Prefers the unassigned node on the rim of the assigned region with the
/// fewest unassigned neighbors. Without such a node, starts from a
/// pseudo-peripheral node of the first unassigned component.
struct SeedPicker {
    /// Unassigned nodes seen next to an assigned one; may hold stale entries.
    rim: Vec<usize>,
    on_rim: Vec<bool>,
    /// Every node below this index is assigned.
    cursor: usize,
    /// BFS visit marks, valid when equal to `round`.
    visited: Vec<usize>,
    round: usize,
}

impl SeedPicker {
    fn new(n: usize) -> Self {
        Self {
            rim: Vec::new(),
            on_rim: vec![false; n],
            cursor: 0,
            visited: vec![0; n],
            round: 0,
        }
    }

    /// Record an unassigned neighbor of a newly assigned node.
    fn touch(&mut self, v: usize) {
        if !self.on_rim[v] {
            self.on_rim[v] = true;
            self.rim.push(v);
        }
    }

    fn pick(&mut self, graph: &Graph, labels: &[usize]) -> usize {
        let on_rim = &mut self.on_rim;
        self.rim.retain(|&v| {
            let live = labels[v] == UNASSIGNED;
            on_rim[v] = live;
            live
        });
        let best = self.rim.iter().copied().min_by_key(|&v| {
            let free = graph
                .neighbors(v)
                .iter()
                .filter(|&&u| labels[u] == UNASSIGNED)
                .count();
            (free, v)
        });
        if let Some(v) = best {
            return v;
        }

        while self.cursor < labels.len() && labels[self.cursor] != UNASSIGNED {
            self.cursor += 1;
        }
        let start = self.cursor.min(labels.len().saturating_sub(1));
        self.farthest_unassigned(graph, labels, start)
    }

    /// Breadth-first search over unassigned nodes; returns the last node reached.
    fn farthest_unassigned(&mut self, graph: &Graph, labels: &[usize], start: usize) -> usize {
        self.round += 1;
        let round = self.round;
        let mut queue = VecDeque::from([start]);
        self.visited[start] = round;
        let mut last = start;
        while let Some(v) = queue.pop_front() {
            last = v;
            for &u in graph.neighbors(v) {
                if self.visited[u] != round && labels[u] == UNASSIGNED {
                    self.visited[u] = round;
                    queue.push_back(u);
                }
            }
        }
        last
    }
}

/// One sweep of boundary moves. Returns the number of nodes moved.
fn refine_pass(
    graph: &Graph,
    labels: &mut [usize],
    part_weights: &mut [u64],
    max_weight: u64,
) -> usize {
    let mut part_sizes = vec![0usize; part_weights.len()];
    for &p in labels.iter() {
        part_sizes[p] += 1;
    }

    let mut moved = 0;
    let mut counts: Vec<(usize, usize)> = Vec::new();

    for v in 0..graph.num_nodes() {
        let from = labels[v];
        if part_sizes[from] <= 1 {
            continue;
        }

        counts.clear();
        let mut internal = 0usize;
        for &u in graph.neighbors(v) {
            let q = labels[u];
            if q == from {
                internal += 1;
            } else if let Some(entry) = counts.iter_mut().find(|(p, _)| *p == q) {
                entry.1 += 1;
            } else {
                counts.push((q, 1));
            }
        }
        if counts.is_empty() {
            continue;
        }

        let w = graph.weight(v);
        let overweight = part_weights[from] > max_weight;
        let mut best: Option<(i64, usize)> = None;

        for &(q, ext) in &counts {
            let dest_weight = part_weights[q] + w;
            if dest_weight > max_weight {
                continue;
            }
            let gain = ext as i64 - internal as i64;
            let rebalances = overweight && dest_weight < part_weights[from];
            if gain <= 0 && !rebalances {
                continue;
            }
            let better = match best {
                None => true,
                Some((g, p)) => gain > g || (gain == g && q < p),
            };
            if better {
                best = Some((gain, q));
            }
        }

        if let Some((_, to)) = best {
            labels[v] = to;
            part_weights[from] -= w;
            part_weights[to] += w;
            part_sizes[from] -= 1;
            part_sizes[to] += 1;
            moved += 1;
        }
    }

    moved
}

/// Relabel parts through a random permutation of `0..nparts`.
///
/// Neighboring regions get unrelated labels, which helps when a label is
/// shown through a color map.
pub fn shuffle_labels<R: Rng + ?Sized>(labels: &mut [usize], nparts: usize, rng: &mut R) {
    let mut perm: Vec<usize> = (0..nparts).collect();
    perm.shuffle(rng);
    for l in labels.iter_mut() {
        *l = perm[*l];
    }
}
