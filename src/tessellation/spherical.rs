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

//! Incremental retessellation of points lying on a sphere.
//!
//! The six axis-extreme points seed an octahedron. Every other included
//! point is then inserted by splitting the triangle hit by the ray from the
//! sphere's center through the point, and the split is followed by local
//! Delaunay edge flips. Insertion order is shuffled per pass and a failed
//! attempt restarts from scratch with a fresh order.

use std::{cmp::Ordering, collections::BTreeSet};

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, info, warn};

use crate::{
    error::{TessellationError, TessellationResult},
    geometry::{
        aabb::Bounds3,
        point_locator::PointLocator,
        predicates::{
            compute_normal, orient3d_sign, ray_intersect_plane, signed_triangle_area_3d,
            triangle_circumcenter_3d,
        },
        vector_3::Vector3,
    },
    mesh::{
        surface::{Surface, SurfaceKind},
        topology::{EulerCounts, Topology},
    },
    tessellation::structure::{Tessellation, TriangleId, VertexId},
};

/// Octahedron over the extreme points, indexed
/// `[min x, max x, min y, max y, min z, max z]`.
const OCTAHEDRON: [[usize; 3]; 8] = [
    [0, 3, 5],
    [3, 1, 5],
    [1, 2, 5],
    [2, 0, 5],
    [0, 3, 4],
    [3, 1, 4],
    [1, 2, 4],
    [2, 0, 4],
];

/// Parameters for [`SphericalTessellator`].
///
/// # Example
///
/// ```
/// use spherical_retess::tessellation::TessellatorParams;
///
/// let params = TessellatorParams::default().with_seed(7).with_max_attempts(3);
/// assert_eq!(params.insertion_passes, 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TessellatorParams {
    /// Full restarts before giving up.
    ///
    /// Default: `10`
    pub max_attempts: usize,

    /// Passes over the not-yet-inserted points within one attempt. Points
    /// with no containing triangle are retried on the next pass.
    ///
    /// Default: `5`
    pub insertion_passes: usize,

    /// Bucket counts of the nearest-vertex grid.
    ///
    /// Default: `[20, 20, 20]`
    pub grid_dims: [usize; 3],

    /// Padding added to every face of the grid's bounding box.
    ///
    /// Default: `0.01`
    pub bounds_padding: f64,

    /// A point closer than this to an inserted vertex is dropped as a
    /// duplicate and never retried.
    ///
    /// Default: `0.1`
    pub duplicate_tolerance: f64,

    /// Offset added to each axis of the query point, multiplied by the pass
    /// number, to break exact ties on later passes.
    ///
    /// Default: `1e-5`
    pub jitter_step: f64,

    /// Factor applied to the circumradius in the flip test.
    ///
    /// Default: `0.98`
    pub circumradius_shrink: f64,

    /// Seed for the insertion order. `None` draws one at random; the seed
    /// used is reported either way.
    pub seed: Option<u64>,
}

impl Default for TessellatorParams {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            insertion_passes: 5,
            grid_dims: [20, 20, 20],
            bounds_padding: 0.01,
            duplicate_tolerance: 0.1,
            jitter_step: 1e-5,
            circumradius_shrink: 0.98,
            seed: None,
        }
    }
}

impl TessellatorParams {
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_insertion_passes(mut self, passes: usize) -> Self {
        self.insertion_passes = passes;
        self
    }

    pub fn with_grid_dims(mut self, dims: [usize; 3]) -> Self {
        self.grid_dims = dims;
        self
    }

    pub fn with_duplicate_tolerance(mut self, tolerance: f64) -> Self {
        self.duplicate_tolerance = tolerance;
        self
    }

    pub fn with_bounds_padding(mut self, padding: f64) -> Self {
        self.bounds_padding = padding;
        self
    }

    pub fn with_jitter_step(mut self, step: f64) -> Self {
        self.jitter_step = step;
        self
    }

    pub fn with_circumradius_shrink(mut self, shrink: f64) -> Self {
        self.circumradius_shrink = shrink;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Statistics of a successful tessellation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TessellationReport {
    /// Attempts used, including the successful one.
    pub attempts: usize,
    pub seed: u64,
    /// Vertices in the output, the six seed points included.
    pub inserted: usize,
    /// Points dropped for lying within the duplicate tolerance of a vertex.
    pub duplicates: usize,
    /// Included nodes that never found a containing triangle.
    pub not_inserted: Vec<usize>,
    pub euler: EulerCounts,
}

/// Rebuilds a closed, outward-wound triangulation over a subset of the
/// nodes of a spherical surface.
#[derive(Debug, Clone, Default)]
pub struct SphericalTessellator {
    params: TessellatorParams,
}

impl SphericalTessellator {
    pub fn new(params: TessellatorParams) -> Self {
        SphericalTessellator { params }
    }

    pub fn params(&self) -> &TessellatorParams {
        &self.params
    }

    /// Tessellate the nodes of `sphere` whose `include` flag is set.
    ///
    /// The returned surface has the same coordinates as `sphere`, kind
    /// [`SurfaceKind::Spherical`], and tiles only over the inserted nodes.
    /// Every attempt starts from scratch; when all fail their messages are
    /// returned together in [`TessellationError::Exhausted`].
    pub fn execute(
        &self,
        sphere: &Surface,
        include: &[bool],
    ) -> TessellationResult<(Surface, TessellationReport)> {
        let n = sphere.num_nodes();
        if n == 0 {
            return Err(TessellationError::EmptySurface);
        }
        if include.len() != n {
            return Err(TessellationError::FlagCountMismatch {
                expected: n,
                actual: include.len(),
            });
        }

        let seed = self.params.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let points = sphere.coordinates.to_points();
        let max_attempts = self.params.max_attempts.max(1);
        let mut messages = Vec::new();

        for attempt in 1..=max_attempts {
            match Attempt::new(&self.params, &points, include).and_then(|a| a.run(&mut rng)) {
                Ok(built) => {
                    let report = TessellationReport {
                        attempts: attempt,
                        seed,
                        inserted: built.tess.num_vertices(),
                        duplicates: built.duplicates,
                        not_inserted: built.not_inserted.clone(),
                        euler: built.euler,
                    };
                    let surface = built.into_surface(sphere)?;
                    info!(
                        "Spherical tessellation: {} vertices, {} triangles, attempt {}",
                        report.inserted, report.euler.faces, attempt
                    );
                    return Ok((surface, report));
                }
                Err(e) => {
                    warn!(
                        "Spherical tessellation attempt {} failed, trying again: {}",
                        attempt, e
                    );
                    messages.push(e.to_string());
                }
            }
        }

        Err(TessellationError::Exhausted {
            attempts: max_attempts,
            messages,
        })
    }
}

/// State of a single attempt. Nothing here outlives the attempt.
struct Attempt<'p> {
    params: &'p TessellatorParams,
    /// Node positions relative to `center`.
    points: Vec<Vector3>,
    center: Vector3,
    pending: Vec<bool>,
    locator: PointLocator,
    tess: Tessellation,
    duplicates: usize,
}

struct Built {
    tess: Tessellation,
    center: Vector3,
    euler: EulerCounts,
    duplicates: usize,
    not_inserted: Vec<usize>,
}

impl<'p> Attempt<'p> {
    fn new(
        params: &'p TessellatorParams,
        points: &[Vector3],
        include: &[bool],
    ) -> TessellationResult<Self> {
        let mut sum = Vector3::zero();
        let mut count = 0usize;
        for (p, _) in points.iter().zip(include).filter(|(_, f)| **f) {
            if !p.is_finite() {
                return Err(TessellationError::DegenerateSphere);
            }
            sum += *p;
            count += 1;
        }
        if count == 0 {
            return Err(TessellationError::MissingExtremeNodes);
        }

        // Containment rays start at the center of the included points.
        let center = sum / count as f64;
        let points: Vec<Vector3> = points.iter().map(|p| *p - center).collect();
        let has_extent = points
            .iter()
            .zip(include)
            .any(|(p, &f)| f && p.norm_squared() > 0.0);
        if !has_extent {
            return Err(TessellationError::DegenerateSphere);
        }

        let bounds = Bounds3::from_points(points.iter().copied().filter(Vector3::is_finite))
            .ok_or(TessellationError::DegenerateSphere)?
            .padded(params.bounds_padding);

        Ok(Attempt {
            params,
            locator: PointLocator::new(bounds, params.grid_dims),
            tess: Tessellation::with_capacity(count),
            pending: include.to_vec(),
            points,
            center,
            duplicates: 0,
        })
    }

    fn run(mut self, rng: &mut StdRng) -> TessellationResult<Built> {
        self.create_initial_sphere()?;
        debug!("Initial sphere: {:?}", self.tess.euler_counts());

        for pass in 0..self.params.insertion_passes {
            self.insert_pass(pass, rng)?;
        }

        if self.tess.num_triangles() == 0 {
            return Err(TessellationError::NoTriangles);
        }
        let euler = self.tess.validate_closed()?;
        debug!("Final sphere: {:?}", euler);

        let not_inserted = (0..self.pending.len()).filter(|&i| self.pending[i]).collect();
        Ok(Built {
            tess: self.tess,
            center: self.center,
            euler,
            duplicates: self.duplicates,
            not_inserted,
        })
    }

    fn create_initial_sphere(&mut self) -> TessellationResult<()> {
        let mut lo = [f64::INFINITY; 3];
        let mut hi = [f64::NEG_INFINITY; 3];
        let mut nodes: [Option<usize>; 6] = [None; 6];

        for (i, p) in self.points.iter().enumerate() {
            if !self.pending[i] {
                continue;
            }
            for axis in 0..3 {
                if p[axis] < lo[axis] {
                    lo[axis] = p[axis];
                    nodes[2 * axis] = Some(i);
                }
                if p[axis] > hi[axis] {
                    hi[axis] = p[axis];
                    nodes[2 * axis + 1] = Some(i);
                }
            }
        }

        let mut extremes = [0usize; 6];
        for (slot, node) in extremes.iter_mut().zip(nodes) {
            *slot = node.ok_or(TessellationError::MissingExtremeNodes)?;
        }
        let mut unique = extremes.to_vec();
        unique.sort_unstable();
        unique.dedup();
        if unique.len() != 6 {
            return Err(TessellationError::NonUniqueExtremeNodes);
        }

        let mut ids = [0 as VertexId; 6];
        for (id, &node) in ids.iter_mut().zip(&extremes) {
            self.pending[node] = false;
            *id = self.tess.add_vertex(node);
            self.locator.add_point(self.points[node], *id);
        }
        let mut suspects = BTreeSet::new();
        for [a, b, c] in OCTAHEDRON {
            let t = self.tess.add_triangle(ids[a], ids[b], ids[c])?;
            self.orient_outward(t)?;
            suspects.insert(t);
        }
        self.process_suspect_triangles(&mut suspects)
    }

    fn insert_pass(&mut self, pass: usize, rng: &mut StdRng) -> TessellationResult<()> {
        let mut order: Vec<usize> = (0..self.points.len()).filter(|&i| self.pending[i]).collect();
        order.shuffle(rng);

        let jitter = self.params.jitter_step * pass as f64;
        let offset = Vector3::new(jitter, jitter, jitter);
        let tolerance_sq = self.params.duplicate_tolerance * self.params.duplicate_tolerance;
        let (mut inserted, mut deferred, mut duplicates) = (0usize, 0usize, 0usize);

        for node in order {
            self.pending[node] = false;
            let xyz = self.points[node] + offset;

            let (nearest, dist_sq) = self.nearest_vertex(&xyz)?;
            if dist_sq < tolerance_sq {
                duplicates += 1;
                continue;
            }

            match self.find_containing_triangle(&xyz, nearest)? {
                Some(t) => {
                    self.split_triangle(t, node)?;
                    inserted += 1;
                }
                None => {
                    self.pending[node] = true;
                    deferred += 1;
                }
            }
        }

        self.duplicates += duplicates;
        debug!(
            "Insertion pass {}: {} inserted, {} deferred, {} duplicates",
            pass, inserted, deferred, duplicates
        );
        Ok(())
    }

    fn nearest_vertex(&self, xyz: &Vector3) -> TessellationResult<(VertexId, f64)> {
        if let Some(hit) = self.locator.nearest_point_with_distance(xyz) {
            return Ok(hit);
        }
        self.tess
            .vertices()
            .iter()
            .enumerate()
            .map(|(v, tv)| (v, self.points[tv.node].distance_squared(xyz)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .ok_or(TessellationError::NoNearestNode)
    }

    /// Triangles around `nearest` are tried first, then those around its
    /// neighbors.
    fn find_containing_triangle(
        &self,
        xyz: &Vector3,
        nearest: VertexId,
    ) -> TessellationResult<Option<TriangleId>> {
        let first: SmallVec<[TriangleId; 8]> =
            self.tess.vertex(nearest)?.triangles().iter().copied().collect();
        for &t in &first {
            if self.contains(t, xyz)? {
                return Ok(Some(t));
            }
        }

        let mut wider: Vec<TriangleId> = Vec::new();
        for w in self.tess.neighbor_vertices(nearest)? {
            for &t in self.tess.vertex(w)?.triangles() {
                if !first.contains(&t) && !wider.contains(&t) {
                    wider.push(t);
                }
            }
        }
        for t in wider {
            if self.contains(t, xyz)? {
                return Ok(Some(t));
            }
        }
        Ok(None)
    }

    fn contains(&self, t: TriangleId, xyz: &Vector3) -> TessellationResult<bool> {
        let [a, b, c] = self.tess.triangle_nodes(t)?;
        let (p1, p2, p3) = (&self.points[a], &self.points[b], &self.points[c]);

        let Some(hit) = ray_intersect_plane(p1, p2, p3, &Vector3::zero(), xyz) else {
            return Ok(false);
        };
        let normal = compute_normal(p1, p2, p3);
        Ok(signed_triangle_area_3d(&normal, p1, p2, &hit) > 0.0
            && signed_triangle_area_3d(&normal, p2, p3, &hit) > 0.0
            && signed_triangle_area_3d(&normal, p3, p1, &hit) > 0.0)
    }

    /// 1-to-3 split of `t` around a new vertex for `node`.
    fn split_triangle(&mut self, t: TriangleId, node: usize) -> TessellationResult<()> {
        let neighbors = self.tess.neighbor_triangles(t)?;
        let [a, b, c] = self.tess.triangle_vertices(t)?;

        let v = self.tess.add_vertex(node);
        self.locator.add_point(self.points[node], v);

        self.tess.remove_triangle(t)?;
        let mut suspects: BTreeSet<TriangleId> = neighbors.into_iter().collect();
        for (p, q) in [(a, b), (b, c), (c, a)] {
            let new = self.tess.add_triangle(p, q, v)?;
            self.orient_outward(new)?;
            suspects.insert(new);
        }
        self.process_suspect_triangles(&mut suspects)
    }

    /// Flips edges until no suspect's shrunk circumcircle holds the far
    /// vertex of a neighbor. Triangles created by a flip are suspects too.
    fn process_suspect_triangles(
        &mut self,
        suspects: &mut BTreeSet<TriangleId>,
    ) -> TessellationResult<()> {
        while let Some(t) = suspects.pop_first() {
            let [a, b, c] = self.tess.triangle_nodes(t)?;
            let Some((center, radius)) =
                triangle_circumcenter_3d(&self.points[a], &self.points[b], &self.points[c])
            else {
                continue;
            };
            let radius = radius * self.params.circumradius_shrink;

            for n in self.tess.neighbor_triangles(t)? {
                let Some(opposite) = self.tess.vertex_not_in(t, n)? else {
                    suspects.remove(&n);
                    continue;
                };
                let node = self.tess.vertex(opposite)?.node;
                if self.points[node].distance(&center) >= radius {
                    continue;
                }

                suspects.remove(&n);
                let (n1, n2) = self.tess.swap_triangle_edges(t, n)?;
                self.orient_outward(n1)?;
                self.orient_outward(n2)?;
                suspects.insert(n1);
                suspects.insert(n2);
                for (x, other) in [(n1, n2), (n2, n1)] {
                    for m in self.tess.neighbor_triangles(x)? {
                        if m != other {
                            suspects.insert(m);
                        }
                    }
                }
                break;
            }
        }
        Ok(())
    }

    fn orient_outward(&mut self, t: TriangleId) -> TessellationResult<()> {
        let [a, b, c] = self.tess.triangle_nodes(t)?;
        let inward = orient3d_sign(
            &Vector3::zero(),
            &self.points[a],
            &self.points[b],
            &self.points[c],
        ) == Ordering::Less;
        if inward {
            self.tess.flip_triangle(t)?;
        }
        Ok(())
    }
}

impl Built {
    fn into_surface(self, sphere: &Surface) -> TessellationResult<Surface> {
        let mut tiles = Vec::with_capacity(self.tess.num_triangles());
        for t in self.tess.triangles() {
            tiles.push(self.tess.triangle_nodes(t)?);
        }
        let topology = Topology::from_tiles(sphere.num_nodes(), tiles);
        let mut surface = sphere.with_topology(topology, SurfaceKind::Spherical);
        surface.orient_tiles_away_from(self.center);
        surface.compute_normals();
        Ok(surface)
    }
}
