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

//! Incremental triangle structure used while building a spherical
//! tessellation.
//!
//! Vertices and triangles live in arenas and are addressed by integer ids.
//! Removed triangles leave a tombstone and their slot is reused by the next
//! [`Tessellation::add_triangle`]. Triangle adjacency is derived from an
//! edge map keyed by the sorted vertex pair, so a newly added triangle is
//! linked to its neighbors without any caller-supplied hints.

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::{
    error::{StructureError, StructureResult},
    mesh::topology::EulerCounts,
};

pub type VertexId = usize;
pub type TriangleId = usize;

#[inline(always)]
fn edge_key(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    if a < b { (a, b) } else { (b, a) }
}

/// A tessellation vertex. `node` is the index of the surface node it stands
/// for.
#[derive(Debug, Clone)]
pub struct TessVertex {
    pub node: usize,
    triangles: SmallVec<[TriangleId; 8]>,
}

impl TessVertex {
    pub fn triangles(&self) -> &[TriangleId] {
        &self.triangles
    }
}

#[derive(Debug, Clone)]
struct TessTriangle {
    vertices: [VertexId; 3],
    removed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Tessellation {
    vertices: Vec<TessVertex>,
    triangles: Vec<TessTriangle>,
    free_triangles: Vec<TriangleId>,
    edges: AHashMap<(VertexId, VertexId), SmallVec<[TriangleId; 2]>>,
    live_triangles: usize,
}

impl Tessellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize) -> Self {
        Tessellation {
            vertices: Vec::with_capacity(vertices),
            triangles: Vec::with_capacity(2 * vertices),
            free_triangles: Vec::new(),
            edges: AHashMap::with_capacity(3 * vertices),
            live_triangles: 0,
        }
    }

    pub fn add_vertex(&mut self, node: usize) -> VertexId {
        self.vertices.push(TessVertex {
            node,
            triangles: SmallVec::new(),
        });
        self.vertices.len() - 1
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_triangles(&self) -> usize {
        self.live_triangles
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn vertex(&self, v: VertexId) -> StructureResult<&TessVertex> {
        self.vertices.get(v).ok_or(StructureError::UnknownVertex(v))
    }

    pub fn vertices(&self) -> &[TessVertex] {
        &self.vertices
    }

    /// Ids of all live triangles, in slot order.
    pub fn triangles(&self) -> impl Iterator<Item = TriangleId> + '_ {
        self.triangles
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.removed)
            .map(|(i, _)| i)
    }

    pub fn is_live(&self, t: TriangleId) -> bool {
        self.triangles.get(t).is_some_and(|tri| !tri.removed)
    }

    pub fn triangle_vertices(&self, t: TriangleId) -> StructureResult<[VertexId; 3]> {
        match self.triangles.get(t) {
            Some(tri) if !tri.removed => Ok(tri.vertices),
            _ => Err(StructureError::StaleTriangle(t)),
        }
    }

    /// Surface node ids of a triangle's corners, in winding order.
    pub fn triangle_nodes(&self, t: TriangleId) -> StructureResult<[usize; 3]> {
        let [a, b, c] = self.triangle_vertices(t)?;
        Ok([
            self.vertices[a].node,
            self.vertices[b].node,
            self.vertices[c].node,
        ])
    }

    /// Creates a triangle and links it into its vertices and edges.
    ///
    /// Fails if a vertex is unknown or repeated, or if one of the three edges
    /// is already shared by two triangles.
    pub fn add_triangle(
        &mut self,
        a: VertexId,
        b: VertexId,
        c: VertexId,
    ) -> StructureResult<TriangleId> {
        for v in [a, b, c] {
            if v >= self.vertices.len() {
                return Err(StructureError::UnknownVertex(v));
            }
        }
        if a == b || b == c || a == c {
            return Err(StructureError::DegenerateTriangle(a, b, c));
        }
        for (p, q) in [(a, b), (b, c), (c, a)] {
            if self.edges.get(&edge_key(p, q)).is_some_and(|e| e.len() >= 2) {
                return Err(StructureError::EdgeFull(p, q));
            }
        }

        let tri = TessTriangle {
            vertices: [a, b, c],
            removed: false,
        };
        let id = match self.free_triangles.pop() {
            Some(slot) => {
                self.triangles[slot] = tri;
                slot
            }
            None => {
                self.triangles.push(tri);
                self.triangles.len() - 1
            }
        };

        for v in [a, b, c] {
            self.vertices[v].triangles.push(id);
        }
        for (p, q) in [(a, b), (b, c), (c, a)] {
            self.edges.entry(edge_key(p, q)).or_default().push(id);
        }
        self.live_triangles += 1;
        Ok(id)
    }

    /// Unlinks a triangle. Edges left without triangles disappear.
    pub fn remove_triangle(&mut self, t: TriangleId) -> StructureResult<()> {
        let [a, b, c] = self.triangle_vertices(t)?;

        for v in [a, b, c] {
            self.vertices[v].triangles.retain(|x| *x != t);
        }
        for (p, q) in [(a, b), (b, c), (c, a)] {
            let key = edge_key(p, q);
            if let Some(users) = self.edges.get_mut(&key) {
                users.retain(|x| *x != t);
                if users.is_empty() {
                    self.edges.remove(&key);
                }
            }
        }

        self.triangles[t].removed = true;
        self.free_triangles.push(t);
        self.live_triangles -= 1;
        Ok(())
    }

    /// Reverses the winding of a triangle. Adjacency is unaffected.
    pub fn flip_triangle(&mut self, t: TriangleId) -> StructureResult<()> {
        self.triangle_vertices(t)?;
        self.triangles[t].vertices.swap(0, 2);
        Ok(())
    }

    /// Triangles sharing an edge with `t`.
    pub fn neighbor_triangles(&self, t: TriangleId) -> StructureResult<SmallVec<[TriangleId; 3]>> {
        let [a, b, c] = self.triangle_vertices(t)?;
        let mut out = SmallVec::new();
        for (p, q) in [(a, b), (b, c), (c, a)] {
            if let Some(users) = self.edges.get(&edge_key(p, q)) {
                out.extend(users.iter().copied().filter(|x| *x != t));
            }
        }
        Ok(out)
    }

    /// Vertices connected to `v` by an edge, without duplicates.
    pub fn neighbor_vertices(&self, v: VertexId) -> StructureResult<SmallVec<[VertexId; 8]>> {
        let vertex = self.vertex(v)?;
        let mut out: SmallVec<[VertexId; 8]> = SmallVec::new();
        for &t in &vertex.triangles {
            for w in self.triangles[t].vertices {
                if w != v && !out.contains(&w) {
                    out.push(w);
                }
            }
        }
        Ok(out)
    }

    /// The vertex of `other` that is not a corner of `t`, if exactly one
    /// exists.
    pub fn vertex_not_in(&self, t: TriangleId, other: TriangleId) -> StructureResult<Option<VertexId>> {
        let mine = self.triangle_vertices(t)?;
        let theirs = self.triangle_vertices(other)?;
        let mut missing = theirs.iter().filter(|v| !mine.contains(v));
        match (missing.next(), missing.next()) {
            (Some(&v), None) => Ok(Some(v)),
            _ => Ok(None),
        }
    }

    /// Replaces two triangles sharing an edge with the two triangles on the
    /// other diagonal of their quad. The winding of `t1` is carried over to
    /// both results.
    pub fn swap_triangle_edges(
        &mut self,
        t1: TriangleId,
        t2: TriangleId,
    ) -> StructureResult<(TriangleId, TriangleId)> {
        let v1 = self.triangle_vertices(t1)?;
        let v2 = self.triangle_vertices(t2)?;

        if v2.iter().all(|v| v1.contains(v)) {
            return Err(StructureError::SameVertices(t1, t2));
        }
        let a = match v1.iter().position(|v| !v2.contains(v)) {
            Some(i) => i,
            None => return Err(StructureError::NoCommonEdge(t1, t2)),
        };
        let (apex, p, q) = (v1[a], v1[(a + 1) % 3], v1[(a + 2) % 3]);
        if !(v2.contains(&p) && v2.contains(&q)) {
            return Err(StructureError::NoCommonEdge(t1, t2));
        }
        let Some(&opposite) = v2.iter().find(|v| **v != p && **v != q) else {
            return Err(StructureError::NoCommonEdge(t1, t2));
        };
        if self.edges.contains_key(&edge_key(apex, opposite)) {
            return Err(StructureError::EdgeFull(apex, opposite));
        }

        self.remove_triangle(t1)?;
        self.remove_triangle(t2)?;
        let n1 = self.add_triangle(apex, p, opposite)?;
        let n2 = self.add_triangle(opposite, q, apex)?;
        Ok((n1, n2))
    }

    pub fn euler_counts(&self) -> EulerCounts {
        EulerCounts::new(self.vertices.len(), self.edges.len(), self.live_triangles)
    }

    /// Checks that the structure is a closed genus-0 surface: every edge has
    /// two triangles, V - E + F = 2, and every vertex has at least three
    /// neighbors.
    pub fn validate_closed(&self) -> StructureResult<EulerCounts> {
        let counts = self.euler_counts();
        if let Some((&(p, q), _)) = self.edges.iter().find(|(_, users)| users.len() != 2) {
            return Err(StructureError::OpenEdge(p, q));
        }
        if counts.euler != 2 {
            return Err(StructureError::EulerCount {
                v: counts.vertices,
                e: counts.edges,
                f: counts.faces,
                euler: counts.euler,
            });
        }
        for v in 0..self.vertices.len() {
            let degree = self.neighbor_vertices(v)?.len();
            if degree < 3 {
                return Err(StructureError::LowDegreeVertex(v, degree));
            }
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn octahedron() -> Tessellation {
        let mut t = Tessellation::new();
        for n in 0..6 {
            t.add_vertex(n);
        }
        for [a, b, c] in [
            [0, 2, 4],
            [2, 1, 4],
            [1, 3, 4],
            [3, 0, 4],
            [2, 0, 5],
            [1, 2, 5],
            [3, 1, 5],
            [0, 3, 5],
        ] {
            t.add_triangle(a, b, c).expect("octahedron triangle");
        }
        t
    }

    #[test]
    fn octahedron_is_closed() {
        let t = octahedron();
        let counts = t.validate_closed().expect("closed");
        assert_eq!((counts.vertices, counts.edges, counts.faces), (6, 12, 8));
        assert!(counts.is_sphere());
    }

    #[test]
    fn each_octahedron_triangle_has_three_neighbors() {
        let t = octahedron();
        for id in t.triangles() {
            assert_eq!(t.neighbor_triangles(id).expect("live").len(), 3);
        }
        assert_eq!(t.neighbor_vertices(4).expect("known").len(), 4);
    }

    #[test]
    fn split_then_remove_keeps_counts() {
        let mut t = octahedron();
        let v = t.add_vertex(6);
        let [a, b, c] = t.triangle_vertices(0).expect("live");
        t.remove_triangle(0).expect("remove");
        t.add_triangle(a, b, v).expect("split");
        t.add_triangle(b, c, v).expect("split");
        t.add_triangle(c, a, v).expect("split");
        let counts = t.validate_closed().expect("closed");
        assert_eq!((counts.vertices, counts.edges, counts.faces), (7, 15, 10));
    }

    #[test]
    fn removed_triangle_is_stale_and_slot_reused() {
        let mut t = octahedron();
        t.remove_triangle(3).expect("remove");
        assert!(!t.is_live(3));
        assert_eq!(t.remove_triangle(3), Err(StructureError::StaleTriangle(3)));
        let id = t.add_triangle(3, 0, 4).expect("re-add");
        assert_eq!(id, 3);
    }

    #[test]
    fn third_triangle_on_an_edge_is_rejected() {
        let mut t = octahedron();
        let v = t.add_vertex(6);
        assert_eq!(t.add_triangle(0, 2, v), Err(StructureError::EdgeFull(0, 2)));
        assert_eq!(t.add_triangle(0, 0, v), Err(StructureError::DegenerateTriangle(0, 0, v)));
    }

    #[test]
    fn vertex_not_in_finds_opposite_corner() {
        let t = octahedron();
        // [0, 2, 4] and [2, 0, 5] share edge 0-2.
        assert_eq!(t.vertex_not_in(0, 4), Ok(Some(5)));
        // [0, 2, 4] and [1, 3, 4] share only vertex 4.
        assert_eq!(t.vertex_not_in(0, 2), Ok(None));
    }

    #[test]
    fn swap_replaces_shared_edge_and_keeps_winding() {
        let mut t = octahedron();
        // [0, 2, 4] and [2, 0, 5]: flip 0-2 to 4-5.
        let (n1, n2) = t.swap_triangle_edges(0, 4).expect("swap");
        let a = t.triangle_vertices(n1).expect("live");
        let b = t.triangle_vertices(n2).expect("live");
        assert!(a.contains(&4) && a.contains(&5));
        assert!(b.contains(&4) && b.contains(&5));
        assert_eq!(t.vertex_not_in(n1, n2).expect("live").map(|v| a.contains(&v)), Some(false));

        // Each directed edge appears once across all triangles.
        let mut directed = Vec::new();
        for id in t.triangles() {
            let [p, q, r] = t.triangle_vertices(id).expect("live");
            directed.extend([(p, q), (q, r), (r, p)]);
        }
        let count = directed.len();
        directed.sort_unstable();
        directed.dedup();
        assert_eq!(directed.len(), count);

        // 4 and 5 are antipodal in the octahedron, but the result is still
        // a closed structure.
        assert!(t.validate_closed().is_ok());
    }

    #[test]
    fn swap_errors() {
        let mut t = octahedron();
        assert_eq!(t.swap_triangle_edges(0, 2), Err(StructureError::NoCommonEdge(0, 2)));
        assert_eq!(t.swap_triangle_edges(0, 0), Err(StructureError::SameVertices(0, 0)));
        assert_eq!(t.swap_triangle_edges(0, 99), Err(StructureError::StaleTriangle(99)));
    }
}
