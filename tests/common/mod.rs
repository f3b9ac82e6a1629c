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

#![allow(dead_code)]

use std::collections::HashMap;

use rand::{Rng, SeedableRng, rngs::StdRng};
use spherical_retess::{
    geometry::{Vector3, predicates::triangle_circumcenter_3d},
    mesh::{CoordinateSet, Surface, SurfaceKind, Topology},
};

/// Points spread evenly over a sphere of `radius` by the golden-angle
/// spiral. The returned surface has no tiles.
pub fn fibonacci_sphere(n: usize, radius: f64) -> Surface {
    let golden = std::f64::consts::PI * (3.0 - 5.0f64.sqrt());
    let points: Vec<[f64; 3]> = (0..n)
        .map(|i| {
            let y = 1.0 - 2.0 * (i as f64 + 0.5) / n as f64;
            let r = (1.0 - y * y).sqrt();
            let theta = golden * i as f64;
            [r * theta.cos() * radius, y * radius, r * theta.sin() * radius]
        })
        .collect();
    Surface::new(CoordinateSet::from_xyz(&points), Topology::new(n), SurfaceKind::Spherical)
}

/// `n` points drawn uniformly on a sphere of `radius`, reproducible from
/// `seed`. The returned surface has no tiles.
pub fn random_sphere(n: usize, radius: f64, seed: u64) -> Surface {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut points = Vec::with_capacity(n);
    while points.len() < n {
        let p = Vector3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        let len = p.norm();
        if len > 0.1 && len <= 1.0 {
            let q = p * (radius / len);
            points.push([q.x, q.y, q.z]);
        }
    }
    Surface::new(CoordinateSet::from_xyz(&points), Topology::new(n), SurfaceKind::Spherical)
}

fn midpoint(
    points: &mut Vec<Vector3>,
    cache: &mut HashMap<(usize, usize), usize>,
    p: usize,
    q: usize,
) -> usize {
    let key = (p.min(q), p.max(q));
    if let Some(&m) = cache.get(&key) {
        return m;
    }
    points.push(((points[p] + points[q]) * 0.5).normalized());
    cache.insert(key, points.len() - 1);
    points.len() - 1
}

/// Octahedron subdivided `levels` times, projected onto a sphere of
/// `radius`, tiles wound outward.
pub fn octasphere(levels: usize, radius: f64, kind: SurfaceKind) -> Surface {
    let mut points = vec![
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(-1.0, 0.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(0.0, -1.0, 0.0),
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::new(0.0, 0.0, -1.0),
    ];
    let mut tiles = vec![
        [0, 2, 4],
        [2, 1, 4],
        [1, 3, 4],
        [3, 0, 4],
        [2, 0, 5],
        [1, 2, 5],
        [3, 1, 5],
        [0, 3, 5],
    ];
    for _ in 0..levels {
        let mut cache = HashMap::new();
        let mut next = Vec::with_capacity(tiles.len() * 4);
        for [a, b, c] in tiles {
            let ab = midpoint(&mut points, &mut cache, a, b);
            let bc = midpoint(&mut points, &mut cache, b, c);
            let ca = midpoint(&mut points, &mut cache, c, a);
            next.extend([[a, ab, ca], [ab, b, bc], [ca, bc, c], [ab, bc, ca]]);
        }
        tiles = next;
    }
    let coords = CoordinateSet::from_vec(points.iter().map(|p| (*p * radius).to_f32()).collect());
    Surface::new(coords, Topology::from_tiles(points.len(), tiles), kind)
}

/// Swap the positions of the two ends of the first edge of tile 0, folding
/// the tiles around them.
pub fn fold_first_edge(surface: &mut Surface) -> (usize, usize) {
    let [a, b, _] = surface.topology.tile(0);
    let pa = surface.coordinates.get(a);
    let pb = surface.coordinates.get(b);
    surface.coordinates.set(a, pb);
    surface.coordinates.set(b, pa);
    (a, b)
}

/// Nodes that appear in at least one tile.
pub fn used_nodes(surface: &Surface) -> Vec<usize> {
    let helper = surface.helper();
    (0..surface.num_nodes()).filter(|&i| helper.node_has_neighbors(i)).collect()
}

/// For every pair of tiles sharing an edge, the distance from the opposite
/// vertex to the first tile's circumcenter divided by its circumradius.
/// Returns the smallest ratio found.
pub fn min_circumcircle_ratio(surface: &Surface) -> f64 {
    let tiles = surface.topology.tiles();
    let mut by_edge: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
    for (i, t) in tiles.iter().enumerate() {
        for k in 0..3 {
            let (p, q) = (t[k], t[(k + 1) % 3]);
            by_edge.entry((p.min(q), p.max(q))).or_default().push(i);
        }
    }

    let mut worst = f64::INFINITY;
    for users in by_edge.values() {
        if users.len() != 2 {
            continue;
        }
        for (t, n) in [(users[0], users[1]), (users[1], users[0])] {
            let [a, b, c] = tiles[t];
            let Some(&opposite) = tiles[n].iter().find(|v| ![a, b, c].contains(v)) else {
                continue;
            };
            let p = |i: usize| surface.coordinates.point(i);
            if let Some((center, radius)) = triangle_circumcenter_3d(&p(a), &p(b), &p(c)) {
                worst = worst.min(p(opposite).distance(&center) / radius);
            }
        }
    }
    worst
}
