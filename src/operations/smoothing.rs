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

use crate::{
    error::{CorrectionError, CorrectionResult},
    geometry::{predicates::triangle_area, vector_3::Vector3},
    mesh::surface::Surface,
};

/// Relaxes vertex positions over the surface's neighbor graph.
pub trait Smoother {
    /// Run `iterations` passes. When `mask` is given only nodes flagged
    /// `true` move.
    fn smooth(
        &self,
        surface: &mut Surface,
        iterations: usize,
        mask: Option<&[bool]>,
    ) -> CorrectionResult<()>;
}

/// Moves each node toward the plain average of its neighbors, optionally
/// pushing every node back onto the sphere every few iterations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearSmoothing {
    pub strength: f64,
    /// Reproject to the starting spherical radius every this many
    /// iterations; `0` disables projection.
    pub project_to_sphere_every: usize,
}

impl Default for LinearSmoothing {
    fn default() -> Self {
        LinearSmoothing {
            strength: 1.0,
            project_to_sphere_every: 10,
        }
    }
}

/// Moves each node toward the area-weighted average of the centers of the
/// tiles around it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArealSmoothing {
    pub strength: f64,
}

impl Default for ArealSmoothing {
    fn default() -> Self {
        ArealSmoothing { strength: 1.0 }
    }
}

impl Smoother for LinearSmoothing {
    fn smooth(
        &self,
        surface: &mut Surface,
        iterations: usize,
        mask: Option<&[bool]>,
    ) -> CorrectionResult<()> {
        let radius = surface.spherical_radius();
        let project_every = self.project_to_sphere_every;

        let neighbor_average = |_: usize, input: &[Vector3], neighbors: &[usize]| {
            if neighbors.len() < 2 {
                return None;
            }
            let mut avg = Vector3::zero();
            for &n in neighbors {
                avg += input[n];
            }
            Some(avg / neighbors.len() as f64)
        };
        let project = |iteration: usize, output: &mut [Vector3]| {
            if project_every > 0 && iteration % project_every == 0 && radius > 0.0 {
                for p in output.iter_mut() {
                    *p = p.with_length(radius);
                }
            }
        };

        relax(surface, iterations, mask, self.strength, neighbor_average, project)
    }
}

impl Smoother for ArealSmoothing {
    fn smooth(
        &self,
        surface: &mut Surface,
        iterations: usize,
        mask: Option<&[bool]>,
    ) -> CorrectionResult<()> {
        let weighted_tile_centers = |i: usize, input: &[Vector3], neighbors: &[usize]| {
            let k = neighbors.len();
            if k < 2 {
                return None;
            }
            let mut total = 0.0;
            let mut weighted = Vector3::zero();
            for j in 0..k {
                let a = input[neighbors[j]];
                let b = input[neighbors[(j + 1) % k]];
                let area = triangle_area(&input[i], &a, &b);
                total += area;
                weighted += (input[i] + a + b) / 3.0 * area;
            }
            // All coincident: nothing to pull toward.
            if total > 0.0 { Some(weighted / total) } else { None }
        };

        relax(surface, iterations, mask, self.strength, weighted_tile_centers, |_, _| {})
    }
}

/// Shared Jacobi loop: `target` proposes a new position for node `i` from
/// the previous iteration's positions, `after` post-processes each
/// iteration's output.
fn relax<F, G>(
    surface: &mut Surface,
    iterations: usize,
    mask: Option<&[bool]>,
    strength: f64,
    target: F,
    mut after: G,
) -> CorrectionResult<()>
where
    F: Fn(usize, &[Vector3], &[usize]) -> Option<Vector3>,
    G: FnMut(usize, &mut [Vector3]),
{
    let n = surface.num_nodes();
    if n == 0 {
        return Err(CorrectionError::NothingToSmooth);
    }
    if iterations == 0 {
        return Ok(());
    }

    let helper = surface.helper();
    let mut input = surface.coordinates.to_points();
    let mut output = input.clone();
    let inverse = 1.0 - strength;

    for iteration in 1..=iterations {
        for i in 0..n {
            let movable = mask.map_or(true, |m| m.get(i).copied().unwrap_or(false));
            output[i] = input[i];
            if !movable {
                continue;
            }
            if let Some(t) = target(i, &input, helper.node_neighbors(i)) {
                output[i] = input[i] * inverse + t * strength;
            }
        }
        after(iteration, &mut output);
        std::mem::swap(&mut input, &mut output);
    }

    for (i, p) in input.into_iter().enumerate() {
        surface.coordinates.set_point(i, p);
    }
    Ok(())
}
