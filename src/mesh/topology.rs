// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Alexandre Severino
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

use std::collections::VecDeque;

use ahash::{AHashMap, AHashSet};
use smallvec::SmallVec;
use tracing::debug;

/// Vertex/edge/face counts of a closed triangle mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EulerCounts {
    pub vertices: usize,
    pub edges: usize,
    pub faces: usize,
    pub euler: i64,
}

impl EulerCounts {
    pub fn new(vertices: usize, edges: usize, faces: usize) -> Self {
        EulerCounts {
            vertices,
            edges,
            faces,
            euler: vertices as i64 - edges as i64 + faces as i64,
        }
    }

    pub fn is_sphere(&self) -> bool {
        self.euler == 2
    }
}

/// Triangle connectivity over node indices `0..num_nodes`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    num_nodes: usize,
    tiles: Vec<[usize; 3]>,
}

impl Topology {
    pub fn new(num_nodes: usize) -> Self {
        Topology { num_nodes, tiles: Vec::new() }
    }

    pub fn from_tiles(num_nodes: usize, tiles: Vec<[usize; 3]>) -> Self {
        debug_assert!(tiles.iter().flatten().all(|&n| n < num_nodes));
        Topology { num_nodes, tiles }
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn num_tiles(&self) -> usize {
        self.tiles.len()
    }

    pub fn tiles(&self) -> &[[usize; 3]] {
        &self.tiles
    }

    #[inline]
    pub fn tile(&self, i: usize) -> [usize; 3] {
        self.tiles[i]
    }

    pub fn add_tile(&mut self, a: usize, b: usize, c: usize) -> usize {
        debug_assert!(a < self.num_nodes && b < self.num_nodes && c < self.num_nodes);
        self.tiles.push([a, b, c]);
        self.tiles.len() - 1
    }

    /// Reverse the winding of tile `i`.
    pub fn flip_tile(&mut self, i: usize) {
        self.tiles[i].swap(0, 2);
    }

    pub fn helper(&self) -> TopologyHelper {
        TopologyHelper::build(self)
    }

    /// Remove every tile that uses a marked node. Returns the number of
    /// tiles removed.
    pub fn delete_tiles_with_marked_nodes(&mut self, marked: &[bool]) -> usize {
        let before = self.tiles.len();
        self.tiles
            .retain(|t| !t.iter().any(|&n| marked.get(n).copied().unwrap_or(false)));
        before - self.tiles.len()
    }

    /// Keep only the connected piece with the most nodes, deleting the tiles
    /// of every other piece. Returns the number of tiles removed.
    pub fn disconnect_islands(&mut self) -> usize {
        let helper = self.helper();
        let components = helper.connected_components();
        if components.len() <= 1 {
            return 0;
        }

        let Some(largest) = components
            .iter()
            .enumerate()
            .max_by_key(|(i, c)| (c.len(), std::cmp::Reverse(*i)))
            .map(|(i, _)| i)
        else {
            return 0;
        };

        let mut marked = vec![false; self.num_nodes];
        for (i, comp) in components.iter().enumerate() {
            if i != largest {
                for &n in comp {
                    marked[n] = true;
                }
            }
        }
        let removed = self.delete_tiles_with_marked_nodes(&marked);
        debug!(
            "disconnected {} islands, kept {} nodes, removed {} tiles",
            components.len() - 1,
            components[largest].len(),
            removed
        );
        removed
    }

    /// Euler counts over the nodes that are used by at least one tile.
    pub fn euler_counts(&self) -> EulerCounts {
        let helper = self.helper();
        let v = (0..self.num_nodes).filter(|&n| helper.node_has_neighbors(n)).count();
        EulerCounts::new(v, helper.edge_count(), self.tiles.len())
    }
}

/// Neighbor graph derived from a [`Topology`].
///
/// Each node's neighbors are listed in the rotational order implied by the
/// tile winding: for a tile `(n, a, b)` neighbor `b` follows `a`.
#[derive(Debug, Clone)]
pub struct TopologyHelper {
    neighbors: Vec<SmallVec<[usize; 8]>>,
    node_tiles: Vec<SmallVec<[usize; 8]>>,
    edge_count: usize,
}

impl TopologyHelper {
    pub fn build(topology: &Topology) -> Self {
        let n = topology.num_nodes();
        let mut wedges: Vec<SmallVec<[(usize, usize); 8]>> = vec![SmallVec::new(); n];
        let mut node_tiles: Vec<SmallVec<[usize; 8]>> = vec![SmallVec::new(); n];
        let mut edges: AHashSet<(usize, usize)> = AHashSet::default();

        for (ti, t) in topology.tiles().iter().enumerate() {
            for k in 0..3 {
                let (a, b, c) = (t[k], t[(k + 1) % 3], t[(k + 2) % 3]);
                wedges[a].push((b, c));
                node_tiles[a].push(ti);
                edges.insert(if a < b { (a, b) } else { (b, a) });
            }
        }

        let neighbors = wedges.iter().map(|w| order_wedges(w)).collect();

        TopologyHelper {
            neighbors,
            node_tiles,
            edge_count: edges.len(),
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.neighbors.len()
    }

    #[inline]
    pub fn node_neighbors(&self, node: usize) -> &[usize] {
        &self.neighbors[node]
    }

    #[inline]
    pub fn node_has_neighbors(&self, node: usize) -> bool {
        !self.neighbors[node].is_empty()
    }

    /// Tiles that use `node`.
    pub fn node_tiles(&self, node: usize) -> &[usize] {
        &self.node_tiles[node]
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Every node within `depth` edges of `node`, excluding `node` itself.
    pub fn neighbors_to_depth(&self, node: usize, depth: usize) -> Vec<usize> {
        let mut seen: AHashMap<usize, usize> = AHashMap::default();
        seen.insert(node, 0);
        let mut queue = VecDeque::from([node]);
        let mut out = Vec::new();

        while let Some(cur) = queue.pop_front() {
            let d = seen[&cur];
            if d == depth {
                continue;
            }
            for &nb in self.node_neighbors(cur) {
                if !seen.contains_key(&nb) {
                    seen.insert(nb, d + 1);
                    out.push(nb);
                    queue.push_back(nb);
                }
            }
        }
        out
    }

    /// Connected pieces among nodes that have neighbors.
    pub fn connected_components(&self) -> Vec<Vec<usize>> {
        let n = self.num_nodes();
        let mut visited = vec![false; n];
        let mut out = Vec::new();

        for start in 0..n {
            if visited[start] || !self.node_has_neighbors(start) {
                continue;
            }
            let mut comp = Vec::new();
            let mut stack = vec![start];
            visited[start] = true;
            while let Some(cur) = stack.pop() {
                comp.push(cur);
                for &nb in self.node_neighbors(cur) {
                    if !visited[nb] {
                        visited[nb] = true;
                        stack.push(nb);
                    }
                }
            }
            out.push(comp);
        }
        out
    }
}

/// Chain the `(a, b)` wedges around a node into a neighbor ring.
/// Open fans start at the wedge whose first neighbor nobody precedes.
fn order_wedges(wedges: &[(usize, usize)]) -> SmallVec<[usize; 8]> {
    let mut out: SmallVec<[usize; 8]> = SmallVec::new();
    if wedges.is_empty() {
        return out;
    }

    let next: AHashMap<usize, usize> = wedges.iter().copied().collect();
    let targets: AHashSet<usize> = wedges.iter().map(|w| w.1).collect();
    let start = wedges
        .iter()
        .map(|w| w.0)
        .find(|a| !targets.contains(a))
        .unwrap_or(wedges[0].0);

    let mut seen: AHashSet<usize> = AHashSet::default();
    let mut cur = start;
    loop {
        if !seen.insert(cur) {
            break;
        }
        out.push(cur);
        match next.get(&cur) {
            Some(&nb) => cur = nb,
            None => break,
        }
    }

    // Non-manifold leftovers keep their first-seen order.
    for &(a, b) in wedges {
        for x in [a, b] {
            if seen.insert(x) {
                out.push(x);
            }
        }
    }
    out
}
