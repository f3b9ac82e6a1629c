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

use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    geometry::{
        predicates::{compute_normal, orient3d_sign},
        vector_3::Vector3,
    },
    mesh::{
        coordinates::CoordinateSet,
        topology::{Topology, TopologyHelper},
    },
};

/// What the coordinates of a surface represent. Only spherical surfaces
/// get their tiles reoriented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SurfaceKind {
    Fiducial,
    Spherical,
    Other,
}

/// One surface snapshot: positions plus the tiles connecting them.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub coordinates: CoordinateSet,
    pub topology: Topology,
    pub kind: SurfaceKind,
    normals: Vec<[f32; 3]>,
}

impl Surface {
    pub fn new(coordinates: CoordinateSet, topology: Topology, kind: SurfaceKind) -> Self {
        debug_assert_eq!(coordinates.len(), topology.num_nodes());
        Surface {
            coordinates,
            topology,
            kind,
            normals: Vec::new(),
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.coordinates.len()
    }

    /// Copy of this surface's positions carrying a different topology.
    pub fn with_topology(&self, topology: Topology, kind: SurfaceKind) -> Surface {
        Surface::new(self.coordinates.clone(), topology, kind)
    }

    pub fn helper(&self) -> TopologyHelper {
        self.topology.helper()
    }

    /// Mean position of the nodes that belong to at least one tile.
    pub fn center_of_mass(&self) -> Vector3 {
        let helper = self.helper();
        let mut sum = Vector3::zero();
        let mut count = 0usize;
        for i in 0..self.num_nodes() {
            if helper.node_has_neighbors(i) {
                sum += self.coordinates.point(i);
                count += 1;
            }
        }
        if count > 0 { sum / count as f64 } else { Vector3::zero() }
    }

    pub fn translate_to_center_of_mass(&mut self) {
        let com = self.center_of_mass();
        self.coordinates.translate(-com);
    }

    /// Mean distance from the origin over the connected nodes.
    pub fn spherical_radius(&self) -> f64 {
        let helper = self.helper();
        let mut sum = 0.0;
        let mut count = 0usize;
        for i in 0..self.num_nodes() {
            if helper.node_has_neighbors(i) {
                sum += self.coordinates.point(i).norm();
                count += 1;
            }
        }
        if count > 0 { sum / count as f64 } else { 0.0 }
    }

    /// Wind every tile of a spherical surface so its normal points away from
    /// the origin. Returns the number of tiles flipped.
    pub fn orient_tiles_outward(&mut self) -> usize {
        self.orient_tiles_away_from(Vector3::zero())
    }

    /// Like [`Surface::orient_tiles_outward`] for a sphere centered at
    /// `center`.
    pub fn orient_tiles_away_from(&mut self, center: Vector3) -> usize {
        if self.kind != SurfaceKind::Spherical {
            return 0;
        }
        let mut flipped = 0;
        for i in 0..self.topology.num_tiles() {
            let [a, b, c] = self.topology.tile(i);
            let pa = self.coordinates.point(a);
            let pb = self.coordinates.point(b);
            let pc = self.coordinates.point(c);
            if orient3d_sign(&center, &pa, &pb, &pc) == Ordering::Less {
                self.topology.flip_tile(i);
                flipped += 1;
            }
        }
        flipped
    }

    /// Node normals: normalized average of the incident tile normals.
    /// Nodes without tiles get the zero vector.
    pub fn compute_normals(&mut self) {
        let n = self.num_nodes();
        let mut sums = vec![Vector3::zero(); n];
        let mut counts = vec![0usize; n];
        for t in self.topology.tiles() {
            let normal = compute_normal(
                &self.coordinates.point(t[0]),
                &self.coordinates.point(t[1]),
                &self.coordinates.point(t[2]),
            );
            for &v in t {
                sums[v] += normal;
                counts[v] += 1;
            }
        }
        self.normals = sums
            .into_iter()
            .zip(counts)
            .map(|(s, c)| if c > 0 { (s / c as f64).normalized().to_f32() } else { [0.0; 3] })
            .collect();
    }

    /// Node normals from the last [`Surface::compute_normals`] call.
    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    /// Unit normal of tile `i` from the current positions.
    pub fn tile_normal(&self, i: usize) -> Vector3 {
        let [a, b, c] = self.topology.tile(i);
        compute_normal(
            &self.coordinates.point(a),
            &self.coordinates.point(b),
            &self.coordinates.point(c),
        )
    }

    /// Centroid of tile `i`.
    pub fn tile_center(&self, i: usize) -> Vector3 {
        let [a, b, c] = self.topology.tile(i);
        (self.coordinates.point(a) + self.coordinates.point(b) + self.coordinates.point(c)) / 3.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn octahedron(kind: SurfaceKind) -> Surface {
        let coords = CoordinateSet::from_xyz(&[
            [1.0f64, 0.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, -1.0],
        ]);
        // Every tile wound inward.
        let topo = Topology::from_tiles(
            6,
            vec![
                [0, 4, 2],
                [2, 4, 1],
                [1, 4, 3],
                [3, 4, 0],
                [2, 5, 0],
                [1, 5, 2],
                [3, 5, 1],
                [0, 5, 3],
            ],
        );
        Surface::new(coords, topo, kind)
    }

    #[test]
    fn spherical_tiles_are_flipped_outward() {
        let mut s = octahedron(SurfaceKind::Spherical);
        assert_eq!(s.orient_tiles_outward(), 8);
        for i in 0..s.topology.num_tiles() {
            assert!(s.tile_normal(i).dot(&s.tile_center(i).normalized()) > 0.0);
        }
        assert_eq!(s.orient_tiles_outward(), 0);
    }

    #[test]
    fn fiducial_tiles_are_left_alone() {
        let mut s = octahedron(SurfaceKind::Fiducial);
        assert_eq!(s.orient_tiles_outward(), 0);
    }

    #[test]
    fn normals_point_along_radius() {
        let mut s = octahedron(SurfaceKind::Spherical);
        s.orient_tiles_outward();
        s.compute_normals();
        let n = s.normals()[4];
        assert!((n[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn center_of_mass_ignores_unconnected_nodes() {
        let mut s = octahedron(SurfaceKind::Spherical);
        s.coordinates.push([50.0, 50.0, 50.0]);
        s.topology = Topology::from_tiles(7, s.topology.tiles().to_vec());
        assert!(s.center_of_mass().norm() < 1e-9);
        assert!((s.spherical_radius() - 1.0).abs() < 1e-9);
    }
}
