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

mod common;

use common::octasphere;
use spherical_retess::{geometry::Vector3, mesh::SurfaceKind};

#[test]
fn test_neighbor_rings_follow_winding() {
    let surface = octasphere(2, 1.0, SurfaceKind::Spherical);
    let helper = surface.helper();
    for &[a, b, c] in surface.topology.tiles() {
        let ring = helper.node_neighbors(a);
        let k = ring.iter().position(|&n| n == b).expect("b is a neighbor of a");
        assert_eq!(ring[(k + 1) % ring.len()], c, "ring of {} breaks at tile ({}, {}, {})", a, a, b, c);
    }
}

#[test]
fn test_subdivided_octahedron_counts() {
    for (levels, v, e, f) in [(0, 6, 12, 8), (1, 18, 48, 32), (2, 66, 192, 128)] {
        let counts = octasphere(levels, 1.0, SurfaceKind::Spherical).topology.euler_counts();
        assert_eq!((counts.vertices, counts.edges, counts.faces), (v, e, f));
        assert!(counts.is_sphere());
    }
}

#[test]
fn test_orient_tiles_outward_repairs_flipped_tiles() {
    let mut surface = octasphere(2, 10.0, SurfaceKind::Spherical);
    for i in (0..surface.topology.num_tiles()).step_by(3) {
        surface.topology.flip_tile(i);
    }
    let flipped = surface.orient_tiles_outward();
    assert_eq!(flipped, surface.topology.num_tiles().div_ceil(3));
    for i in 0..surface.topology.num_tiles() {
        assert!(surface.tile_normal(i).dot(&surface.tile_center(i)) > 0.0);
    }

    // Fiducial surfaces are left alone.
    let mut fiducial = octasphere(1, 10.0, SurfaceKind::Fiducial);
    fiducial.topology.flip_tile(0);
    assert_eq!(fiducial.orient_tiles_outward(), 0);
}

#[test]
fn test_center_of_mass_and_radius() {
    let mut surface = octasphere(2, 25.0, SurfaceKind::Spherical);
    surface.coordinates.translate(Vector3::new(3.0, -4.0, 5.0));
    surface.translate_to_center_of_mass();
    assert!(surface.center_of_mass().norm() < 1e-4);
    assert!((surface.spherical_radius() - 25.0).abs() < 1e-3);
}

#[test]
fn test_normals_point_outward() {
    let mut surface = octasphere(2, 5.0, SurfaceKind::Spherical);
    surface.compute_normals();
    for (i, n) in surface.normals().iter().enumerate() {
        let n = Vector3::from(*n);
        assert!((n.norm() - 1.0).abs() < 1e-5);
        assert!(n.dot(&surface.coordinates.point(i).normalized()) > 0.9);
    }
}
