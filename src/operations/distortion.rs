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
    geometry::predicates::triangle_area,
    mesh::surface::Surface,
};

/// Per-node scalar describing how a deformation changed the surface.
pub trait DistortionMeasure {
    /// `deformed` and `reference` share node numbering; tiles come from the
    /// reference topology.
    fn measure(&self, deformed: &Surface, reference: &Surface) -> CorrectionResult<Vec<f64>>;
}

/// Log2 ratio of the area around each node after and before deformation,
/// with the deformed surface rescaled to the reference's total area.
/// Negative values are compressed, positive values expanded.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ArealDistortion;

impl DistortionMeasure for ArealDistortion {
    fn measure(&self, deformed: &Surface, reference: &Surface) -> CorrectionResult<Vec<f64>> {
        let n = reference.num_nodes();
        if deformed.num_nodes() != n {
            return Err(CorrectionError::DistortionFailed(format!(
                "deformed surface has {} nodes, reference has {}",
                deformed.num_nodes(),
                n
            )));
        }

        let tiles = reference.topology.tiles();
        let mut deformed_area = vec![0.0; n];
        let mut reference_area = vec![0.0; n];
        let mut deformed_total = 0.0;
        let mut reference_total = 0.0;

        for t in tiles {
            let [a, b, c] = *t;
            let da = triangle_area(
                &deformed.coordinates.point(a),
                &deformed.coordinates.point(b),
                &deformed.coordinates.point(c),
            );
            let ra = triangle_area(
                &reference.coordinates.point(a),
                &reference.coordinates.point(b),
                &reference.coordinates.point(c),
            );
            deformed_total += da;
            reference_total += ra;
            for v in [a, b, c] {
                deformed_area[v] += da;
                reference_area[v] += ra;
            }
        }

        if !(deformed_total > 0.0 && reference_total > 0.0) {
            return Err(CorrectionError::DistortionFailed(
                "surface has no tile area".to_string(),
            ));
        }
        let scale = reference_total / deformed_total;

        Ok((0..n)
            .map(|i| {
                if reference_area[i] > 0.0 && deformed_area[i] > 0.0 {
                    (deformed_area[i] * scale / reference_area[i]).log2()
                } else {
                    0.0
                }
            })
            .collect())
    }
}
