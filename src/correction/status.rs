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

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::mesh::topology::{Topology, TopologyHelper};

/// Where a node stands relative to the region kept by the corrector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NodeStatus {
    /// Not connected in the working topology.
    #[default]
    Outside,
    /// Connected, and none of its original neighbors were removed.
    Inside,
    /// Connected, next to at least one removed node.
    Boundary,
    /// Was on the boundary after an earlier pruning pass, removed since.
    WasBoundary,
}

impl NodeStatus {
    /// Inside and boundary nodes take part in retessellation.
    pub fn is_connected(self) -> bool {
        matches!(self, NodeStatus::Inside | NodeStatus::Boundary)
    }
}

/// Recompute every node's status after a pruning pass.
pub fn update_node_status(
    status: &mut [NodeStatus],
    original: &TopologyHelper,
    working: &TopologyHelper,
) {
    for (i, s) in status.iter_mut().enumerate() {
        *s = if working.node_has_neighbors(i) {
            let touches_removed = original
                .node_neighbors(i)
                .iter()
                .any(|&n| !working.node_has_neighbors(n));
            if touches_removed {
                NodeStatus::Boundary
            } else {
                NodeStatus::Inside
            }
        } else if matches!(*s, NodeStatus::Boundary | NodeStatus::WasBoundary) {
            NodeStatus::WasBoundary
        } else {
            NodeStatus::Outside
        };
    }
}

/// Nodes connected in `original` but not in `working`, ascending.
pub fn removed_nodes(original: &Topology, working: &Topology) -> Vec<usize> {
    let before = original.helper();
    let after = working.helper();
    (0..original.num_nodes())
        .filter(|&i| before.node_has_neighbors(i) && !after.node_has_neighbors(i))
        .collect()
}
