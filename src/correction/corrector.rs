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

//! Topology correction of a fiducial surface through its sphere.
//!
//! A copy of the fiducial is smoothed onto a sphere until it stops folding.
//! Nodes that still cross over (and optionally nodes squeezed too hard by
//! the smoothing) are cut out of a working copy of the topology, small
//! islands are dropped, and the surviving nodes are retessellated on the
//! sphere. The new tiles are finally put back on the fiducial coordinates.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    correction::status::{NodeStatus, removed_nodes, update_node_status},
    error::{CorrectionError, CorrectionResult},
    mesh::{
        surface::{Surface, SurfaceKind},
        topology::{Topology, TopologyHelper},
    },
    operations::{
        crossover::{CrossoverDetector, SphericalCrossoverCheck},
        distortion::{ArealDistortion, DistortionMeasure},
        smoothing::{ArealSmoothing, LinearSmoothing, Smoother},
    },
    tessellation::spherical::{SphericalTessellator, TessellationReport, TessellatorParams},
};

/// Parameters for [`TopologyCorrector`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CorrectorParams {
    /// Upper bound on smooth-then-check cycles. Smoothing stops early once
    /// no node crosses over.
    ///
    /// Default: `20`
    pub smoothing_cycles: usize,

    /// Linear smoothing iterations per cycle.
    ///
    /// Default: `100`
    pub smoothing_iterations: usize,

    /// Sphere projection interval during linear smoothing.
    ///
    /// Default: `10`
    pub project_to_sphere_every: usize,

    /// Also cut out nodes whose areal distortion falls below
    /// `compressed_distortion_threshold`.
    ///
    /// Default: `false`
    pub remove_highly_compressed: bool,

    /// Log2 areal distortion (smoothed sphere vs. fiducial) under which a
    /// node counts as highly compressed.
    ///
    /// Default: `-2.0`
    pub compressed_distortion_threshold: f64,

    /// Stop after pruning; no retessellation and no corrected surface.
    ///
    /// Default: `false`
    pub skip_corrected_surface: bool,

    /// Return the smoothed and the retessellated spheres as well.
    ///
    /// Default: `false`
    pub keep_intermediate_surfaces: bool,

    /// Also produce a copy of the corrected fiducial relaxed around the
    /// removed nodes.
    ///
    /// Default: `false`
    pub smooth_around_removed: bool,

    /// Rings (original topology) around each removed node that get relaxed.
    ///
    /// Default: `3`
    pub removed_smoothing_depth: usize,

    /// Areal smoothing iterations around removed nodes.
    ///
    /// Default: `10`
    pub removed_smoothing_iterations: usize,

    pub tessellator: TessellatorParams,
}

impl Default for CorrectorParams {
    fn default() -> Self {
        Self {
            smoothing_cycles: 20,
            smoothing_iterations: 100,
            project_to_sphere_every: 10,
            remove_highly_compressed: false,
            compressed_distortion_threshold: -2.0,
            skip_corrected_surface: false,
            keep_intermediate_surfaces: false,
            smooth_around_removed: false,
            removed_smoothing_depth: 3,
            removed_smoothing_iterations: 10,
            tessellator: TessellatorParams::default(),
        }
    }
}

impl CorrectorParams {
    pub fn with_smoothing_cycles(mut self, cycles: usize) -> Self {
        self.smoothing_cycles = cycles;
        self
    }

    pub fn with_smoothing_iterations(mut self, iterations: usize) -> Self {
        self.smoothing_iterations = iterations;
        self
    }

    /// Enable removal of nodes with log2 areal distortion below `threshold`.
    pub fn with_compressed_node_removal(mut self, threshold: f64) -> Self {
        self.remove_highly_compressed = true;
        self.compressed_distortion_threshold = threshold;
        self
    }

    pub fn with_skip_corrected_surface(mut self, skip: bool) -> Self {
        self.skip_corrected_surface = skip;
        self
    }

    pub fn with_intermediate_surfaces(mut self, keep: bool) -> Self {
        self.keep_intermediate_surfaces = keep;
        self
    }

    pub fn with_smoothing_around_removed(mut self, smooth: bool) -> Self {
        self.smooth_around_removed = smooth;
        self
    }

    pub fn with_tessellator(mut self, tessellator: TessellatorParams) -> Self {
        self.tessellator = tessellator;
        self
    }
}

/// Everything a correction run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionOutcome {
    /// Fiducial coordinates with the retessellated topology. `None` when
    /// the corrected surface was skipped.
    pub corrected_fiducial: Option<Surface>,
    /// Corrected fiducial relaxed around the removed nodes, when requested.
    pub smoothed_fiducial: Option<Surface>,
    /// The untangled sphere with its original topology. Only kept on
    /// request.
    pub smoothed_sphere: Option<Surface>,
    /// Output of the tessellator. Only kept on request.
    pub retessellated_sphere: Option<Surface>,
    /// Crossing-over node count after each smoothing cycle.
    pub crossovers_per_cycle: Vec<usize>,
    pub node_status: Vec<NodeStatus>,
    /// Nodes connected in the input but cut out of the working topology.
    pub removed_nodes: Vec<usize>,
    pub tessellation: Option<TessellationReport>,
}

/// Repairs the topology of a fiducial surface so it becomes a closed
/// genus-0 mesh.
///
/// The smoothing, crossover and distortion steps are pluggable; [`new`]
/// uses [`LinearSmoothing`], [`SphericalCrossoverCheck`] and
/// [`ArealDistortion`].
///
/// [`new`]: TopologyCorrector::new
#[derive(Debug, Clone)]
pub struct TopologyCorrector<S = LinearSmoothing, C = SphericalCrossoverCheck, D = ArealDistortion>
{
    params: CorrectorParams,
    smoother: S,
    detector: C,
    distortion: D,
}

impl TopologyCorrector {
    pub fn new(params: CorrectorParams) -> Self {
        let smoother = LinearSmoothing {
            project_to_sphere_every: params.project_to_sphere_every,
            ..LinearSmoothing::default()
        };
        TopologyCorrector {
            params,
            smoother,
            detector: SphericalCrossoverCheck::default(),
            distortion: ArealDistortion,
        }
    }
}

impl Default for TopologyCorrector {
    fn default() -> Self {
        Self::new(CorrectorParams::default())
    }
}

impl<S, C, D> TopologyCorrector<S, C, D>
where
    S: Smoother,
    C: CrossoverDetector,
    D: DistortionMeasure,
{
    pub fn with_components(params: CorrectorParams, smoother: S, detector: C, distortion: D) -> Self {
        TopologyCorrector {
            params,
            smoother,
            detector,
            distortion,
        }
    }

    pub fn params(&self) -> &CorrectorParams {
        &self.params
    }

    /// Correct `fiducial`, starting the sphere from its own coordinates.
    pub fn execute(&self, fiducial: &Surface) -> CorrectionResult<CorrectionOutcome> {
        self.execute_from_sphere(fiducial, fiducial)
    }

    /// Correct `fiducial`, starting the sphere from the coordinates of
    /// `sphere`. Both must have the same nodes; tiles always come from the
    /// fiducial.
    pub fn execute_from_sphere(
        &self,
        fiducial: &Surface,
        sphere: &Surface,
    ) -> CorrectionResult<CorrectionOutcome> {
        let n = fiducial.num_nodes();
        if n == 0 {
            return Err(CorrectionError::EmptySurface);
        }
        if sphere.num_nodes() != n {
            return Err(CorrectionError::NodeCountMismatch {
                fiducial: n,
                spherical: sphere.num_nodes(),
            });
        }

        let original = fiducial.topology.clone();
        let original_helper = original.helper();
        let mut working = original.clone();
        let mut sphere = sphere.with_topology(original.clone(), SurfaceKind::Spherical);

        let crossovers_per_cycle = self.smooth_to_untangle(&mut sphere)?;

        let mut node_status = vec![NodeStatus::Outside; n];
        update_node_status(&mut node_status, &original_helper, &original_helper);

        let crossovers = self.detector.detect(&sphere);
        let deleted = working.delete_tiles_with_marked_nodes(&crossovers.node_flags);
        update_node_status(&mut node_status, &original_helper, &working.helper());
        info!(
            "Removed {} tiles around {} crossover nodes",
            deleted, crossovers.node_crossovers
        );

        if self.params.remove_highly_compressed {
            let deleted = self.remove_compressed_nodes(&sphere, fiducial, &mut working)?;
            update_node_status(&mut node_status, &original_helper, &working.helper());
            info!("Removed {} tiles around highly compressed nodes", deleted);
        }

        working.disconnect_islands();
        let working_helper = working.helper();
        update_node_status(&mut node_status, &original_helper, &working_helper);
        let removed = removed_nodes(&original, &working);
        info!("{} nodes removed from the surface", removed.len());

        let mut outcome = CorrectionOutcome {
            corrected_fiducial: None,
            smoothed_fiducial: None,
            smoothed_sphere: None,
            retessellated_sphere: None,
            crossovers_per_cycle,
            node_status,
            removed_nodes: removed,
            tessellation: None,
        };

        if !self.params.skip_corrected_surface {
            let include: Vec<bool> = (0..n).map(|i| working_helper.node_has_neighbors(i)).collect();
            let tessellator = SphericalTessellator::new(self.params.tessellator.clone());
            let (retessellated, report) = tessellator.execute(&sphere, &include)?;

            let mut corrected =
                fiducial.with_topology(retessellated.topology.clone(), SurfaceKind::Fiducial);
            corrected.compute_normals();

            if self.params.smooth_around_removed {
                outcome.smoothed_fiducial = Some(smooth_around_removed_nodes(
                    &corrected,
                    &original,
                    &outcome.removed_nodes,
                    self.params.removed_smoothing_depth,
                    self.params.removed_smoothing_iterations,
                )?);
            }

            info!(
                "Corrected surface: {} tiles, Euler count {}",
                corrected.topology.num_tiles(),
                report.euler.euler
            );
            outcome.corrected_fiducial = Some(corrected);
            outcome.tessellation = Some(report);
            if self.params.keep_intermediate_surfaces {
                outcome.retessellated_sphere = Some(retessellated);
            }
        }

        if self.params.keep_intermediate_surfaces {
            outcome.smoothed_sphere = Some(sphere);
        }
        Ok(outcome)
    }

    /// Smooth-then-check cycles. Returns the crossover count after each.
    fn smooth_to_untangle(&self, sphere: &mut Surface) -> CorrectionResult<Vec<usize>> {
        let mut counts = Vec::with_capacity(self.params.smoothing_cycles);
        for cycle in 0..self.params.smoothing_cycles {
            sphere.translate_to_center_of_mass();
            self.smoother
                .smooth(sphere, self.params.smoothing_iterations, None)?;

            let report = self.detector.detect(sphere);
            debug!(
                "Crossovers at smoothing cycle {}: {}",
                cycle, report.node_crossovers
            );
            counts.push(report.node_crossovers);
            if report.node_crossovers == 0 {
                break;
            }
        }
        Ok(counts)
    }

    fn remove_compressed_nodes(
        &self,
        sphere: &Surface,
        fiducial: &Surface,
        working: &mut Topology,
    ) -> CorrectionResult<usize> {
        let distortion = self.distortion.measure(sphere, fiducial)?;
        if distortion.len() != working.num_nodes() {
            return Err(CorrectionError::DistortionFailed(format!(
                "{} values for {} nodes",
                distortion.len(),
                working.num_nodes()
            )));
        }

        let helper = working.helper();
        let threshold = self.params.compressed_distortion_threshold;
        let marked: Vec<bool> = distortion
            .iter()
            .enumerate()
            .map(|(i, &d)| d < threshold && helper.node_has_neighbors(i))
            .collect();
        Ok(working.delete_tiles_with_marked_nodes(&marked))
    }
}

/// Copy of `corrected` with areal smoothing applied to the nodes within
/// `depth` rings of a removed node, rings taken from `original`.
pub fn smooth_around_removed_nodes(
    corrected: &Surface,
    original: &Topology,
    removed: &[usize],
    depth: usize,
    iterations: usize,
) -> CorrectionResult<Surface> {
    let mask = removed_neighborhood(&original.helper(), removed, depth);
    let mut smoothed = corrected.clone();
    ArealSmoothing::default().smooth(&mut smoothed, iterations, Some(&mask))?;
    smoothed.compute_normals();
    Ok(smoothed)
}

fn removed_neighborhood(helper: &TopologyHelper, removed: &[usize], depth: usize) -> Vec<bool> {
    let mut mask = vec![false; helper.num_nodes()];
    for &node in removed {
        for nb in helper.neighbors_to_depth(node, depth) {
            mask[nb] = true;
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::{geometry::vector_3::Vector3, mesh::CoordinateSet};

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

    /// Octahedron subdivided `levels` times and pushed onto a sphere.
    fn octasphere(levels: usize, radius: f64) -> Surface {
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
        let topo = Topology::from_tiles(points.len(), tiles);
        Surface::new(coords, topo, SurfaceKind::Fiducial)
    }

    fn params() -> CorrectorParams {
        CorrectorParams::default()
            .with_smoothing_iterations(20)
            .with_tessellator(TessellatorParams::default().with_seed(11))
    }

    #[test]
    fn clean_sphere_is_kept() {
        let fiducial = octasphere(2, 50.0);
        let outcome = TopologyCorrector::new(params()).execute(&fiducial).expect("correct");

        assert_eq!(outcome.crossovers_per_cycle, vec![0]);
        assert!(outcome.removed_nodes.is_empty());
        assert!(outcome.node_status.iter().all(|s| *s == NodeStatus::Inside));

        let corrected = outcome.corrected_fiducial.expect("corrected surface");
        assert_eq!(corrected.kind, SurfaceKind::Fiducial);
        assert_eq!(corrected.coordinates, fiducial.coordinates);
        assert!(corrected.topology.euler_counts().is_sphere());
        assert_eq!(outcome.tessellation.map(|r| r.inserted), Some(66));
        assert!(outcome.smoothed_sphere.is_none());
        assert!(outcome.retessellated_sphere.is_none());
    }

    #[test]
    fn skip_leaves_no_surface() {
        let outcome = TopologyCorrector::new(params().with_skip_corrected_surface(true))
            .execute(&octasphere(1, 50.0))
            .expect("correct");
        assert!(outcome.corrected_fiducial.is_none());
        assert!(outcome.tessellation.is_none());
    }

    #[test]
    fn intermediate_surfaces_on_request() {
        let outcome = TopologyCorrector::new(params().with_intermediate_surfaces(true))
            .execute(&octasphere(2, 50.0))
            .expect("correct");
        assert_eq!(
            outcome.smoothed_sphere.map(|s| s.kind),
            Some(SurfaceKind::Spherical)
        );
        assert!(outcome.retessellated_sphere.is_some());
    }

    #[test]
    fn mismatched_sphere_is_rejected() {
        let fiducial = octasphere(0, 10.0);
        let sphere = Surface::new(CoordinateSet::new(), Topology::new(0), SurfaceKind::Spherical);
        let err = TopologyCorrector::default()
            .execute_from_sphere(&fiducial, &sphere)
            .unwrap_err();
        assert_eq!(
            err,
            CorrectionError::NodeCountMismatch {
                fiducial: 6,
                spherical: 0
            }
        );
    }

    #[test]
    fn empty_fiducial_is_rejected() {
        let empty = Surface::new(CoordinateSet::new(), Topology::new(0), SurfaceKind::Fiducial);
        assert_eq!(
            TopologyCorrector::default().execute(&empty).unwrap_err(),
            CorrectionError::EmptySurface
        );
    }

    #[test]
    fn neighborhood_mask_reaches_depth() {
        let topo = octasphere(0, 1.0).topology;
        let mask = removed_neighborhood(&topo.helper(), &[4], 1);
        assert_eq!(mask, vec![true, true, true, true, false, false]);
    }
}
