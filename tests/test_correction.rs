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

use common::{fold_first_edge, octasphere, used_nodes};
use spherical_retess::{
    correction::{CorrectorParams, NodeStatus, TopologyCorrector, smooth_around_removed_nodes},
    mesh::SurfaceKind,
    operations::{ArealDistortion, CrossoverDetector, LinearSmoothing, SphericalCrossoverCheck},
    tessellation::TessellatorParams,
};

fn params() -> CorrectorParams {
    CorrectorParams::default().with_tessellator(TessellatorParams::default().with_seed(21))
}

#[test]
fn test_clean_sphere_keeps_every_node() {
    let fiducial = octasphere(3, 80.0, SurfaceKind::Fiducial);
    let n = fiducial.num_nodes();
    let outcome = TopologyCorrector::new(params()).execute(&fiducial).expect("correct");

    assert_eq!(outcome.crossovers_per_cycle, vec![0]);
    assert!(outcome.removed_nodes.is_empty());

    let corrected = outcome.corrected_fiducial.expect("corrected surface");
    let counts = corrected.topology.euler_counts();
    assert!(counts.is_sphere());
    assert_eq!(counts.vertices, n);
    assert_eq!(used_nodes(&corrected).len(), n);
}

#[test]
fn test_folded_sphere_untangles() {
    let mut fiducial = octasphere(3, 80.0, SurfaceKind::Fiducial);
    fold_first_edge(&mut fiducial);
    assert!(SphericalCrossoverCheck::default().detect(&fiducial).node_crossovers > 0);

    let outcome = TopologyCorrector::new(params()).execute(&fiducial).expect("correct");
    let cycles = &outcome.crossovers_per_cycle;
    assert!(!cycles.is_empty());
    assert!(cycles.windows(2).all(|w| w[1] <= w[0]), "counts went up: {:?}", cycles);
    assert_eq!(cycles.last(), Some(&0));

    let corrected = outcome.corrected_fiducial.expect("corrected surface");
    assert!(corrected.topology.euler_counts().is_sphere());
}

#[test]
fn test_gentle_smoothing_untangles_over_several_cycles() {
    let mut fiducial = octasphere(3, 80.0, SurfaceKind::Fiducial);
    fold_first_edge(&mut fiducial);

    // One weak iteration per cycle moves each swapped node only part of the
    // way back, so the fold survives the first few checks.
    let smoother = LinearSmoothing {
        strength: 0.2,
        project_to_sphere_every: 1,
    };
    let corrector = TopologyCorrector::with_components(
        params().with_smoothing_cycles(40).with_smoothing_iterations(1),
        smoother,
        SphericalCrossoverCheck::default(),
        ArealDistortion,
    );
    let outcome = corrector.execute(&fiducial).expect("correct");

    let cycles = &outcome.crossovers_per_cycle;
    assert!(cycles.len() > 1, "untangled in one cycle: {:?}", cycles);
    assert!(cycles[0] > 0);
    assert!(cycles.windows(2).all(|w| w[1] <= w[0]), "counts went up: {:?}", cycles);
    assert_eq!(cycles.last(), Some(&0));
    assert!(outcome.removed_nodes.is_empty());

    let corrected = outcome.corrected_fiducial.expect("corrected surface");
    assert!(corrected.topology.euler_counts().is_sphere());
}

#[test]
fn test_unsmoothed_folds_are_cut_out() {
    let mut fiducial = octasphere(3, 80.0, SurfaceKind::Fiducial);
    let (a, b) = fold_first_edge(&mut fiducial);

    let outcome = TopologyCorrector::new(params().with_smoothing_cycles(0))
        .execute(&fiducial)
        .expect("correct");

    assert!(outcome.crossovers_per_cycle.is_empty());
    assert!(outcome.removed_nodes.contains(&a));
    assert!(outcome.removed_nodes.contains(&b));
    assert!(outcome.node_status.contains(&NodeStatus::Boundary));
    for &r in &outcome.removed_nodes {
        assert_eq!(outcome.node_status[r], NodeStatus::Outside);
    }

    let corrected = outcome.corrected_fiducial.expect("corrected surface");
    assert!(corrected.topology.euler_counts().is_sphere());
    let used = used_nodes(&corrected);
    for r in &outcome.removed_nodes {
        assert!(!used.contains(r), "removed node {} is still tiled", r);
    }
    assert_eq!(used.len() + outcome.removed_nodes.len(), fiducial.num_nodes());
}

#[test]
fn test_compressed_node_removal_runs() {
    let fiducial = octasphere(2, 80.0, SurfaceKind::Fiducial);
    // Every node passes a threshold this low.
    let outcome = TopologyCorrector::new(params().with_compressed_node_removal(-50.0))
        .execute(&fiducial)
        .expect("correct");
    assert!(outcome.removed_nodes.is_empty());
    assert!(outcome.corrected_fiducial.is_some());
}

#[test]
fn test_smoothing_around_removed_nodes() {
    let mut fiducial = octasphere(3, 80.0, SurfaceKind::Fiducial);
    fold_first_edge(&mut fiducial);

    let outcome = TopologyCorrector::new(
        params()
            .with_smoothing_cycles(0)
            .with_smoothing_around_removed(true),
    )
    .execute(&fiducial)
    .expect("correct");

    let corrected = outcome.corrected_fiducial.expect("corrected surface");
    let smoothed = outcome.smoothed_fiducial.expect("smoothed surface");
    assert_eq!(smoothed.topology, corrected.topology);

    // Nodes far from the cut do not move.
    let again =
        smooth_around_removed_nodes(&corrected, &fiducial.topology, &outcome.removed_nodes, 1, 10)
            .expect("smooth");
    let helper = fiducial.topology.helper();
    let near: Vec<usize> = outcome
        .removed_nodes
        .iter()
        .flat_map(|&r| helper.neighbors_to_depth(r, 1))
        .collect();
    for i in 0..fiducial.num_nodes() {
        if !near.contains(&i) {
            assert_eq!(again.coordinates.get(i), corrected.coordinates.get(i));
        }
    }
}
