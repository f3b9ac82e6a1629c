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

use crate::mesh::surface::Surface;

/// Result of a self-intersection scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossoverReport {
    pub tile_crossovers: usize,
    pub node_crossovers: usize,
    /// One flag per node; `true` when the node touches a crossover tile.
    pub node_flags: Vec<bool>,
}

/// Flags nodes that take part in folded or self-intersecting tiles.
pub trait CrossoverDetector {
    fn detect(&self, surface: &Surface) -> CrossoverReport;
}

/// Sphere test: a tile whose normal strays more than 30 degrees from the
/// radial direction through its center is a crossover.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalCrossoverCheck {
    pub min_cosine: f64,
}

impl Default for SphericalCrossoverCheck {
    fn default() -> Self {
        SphericalCrossoverCheck { min_cosine: 0.866 }
    }
}

impl CrossoverDetector for SphericalCrossoverCheck {
    fn detect(&self, surface: &Surface) -> CrossoverReport {
        let mut node_flags = vec![false; surface.num_nodes()];
        let mut tile_crossovers = 0;

        for i in 0..surface.topology.num_tiles() {
            let normal = surface.tile_normal(i);
            let radial = surface.tile_center(i).normalized();
            if normal.dot(&radial) < self.min_cosine {
                for n in surface.topology.tile(i) {
                    node_flags[n] = true;
                }
                tile_crossovers += 1;
            }
        }

        let node_crossovers = node_flags.iter().filter(|&&f| f).count();
        CrossoverReport {
            tile_crossovers,
            node_crossovers,
            node_flags,
        }
    }
}
