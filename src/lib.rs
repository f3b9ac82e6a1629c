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

//! Spherical retessellation and topology correction of triangulated
//! surfaces.
//!
//! - [`tessellation::SphericalTessellator`] builds a closed, outward-wound
//!   triangulation over a chosen subset of points lying on a sphere.
//! - [`correction::TopologyCorrector`] untangles a fiducial surface on the
//!   sphere, cuts out the nodes that still fold, and retessellates the rest
//!   into a genus-0 mesh.
//!
//! ```
//! use spherical_retess::{
//!     mesh::{CoordinateSet, Surface, SurfaceKind, Topology},
//!     tessellation::{SphericalTessellator, TessellatorParams},
//! };
//!
//! let coords = CoordinateSet::from_xyz(&[
//!     [10.0f32, 0.0, 0.0],
//!     [-10.0, 0.0, 0.0],
//!     [0.0, 10.0, 0.0],
//!     [0.0, -10.0, 0.0],
//!     [0.0, 0.0, 10.0],
//!     [0.0, 0.0, -10.0],
//! ]);
//! let sphere = Surface::new(coords, Topology::new(6), SurfaceKind::Spherical);
//! let tessellator = SphericalTessellator::new(TessellatorParams::default().with_seed(1));
//! let (surface, report) = tessellator.execute(&sphere, &[true; 6]).unwrap();
//! assert_eq!(surface.topology.num_tiles(), 8);
//! assert!(report.euler.is_sphere());
//! ```

pub mod correction;
pub mod error;
pub mod geometry;
pub mod mesh;
pub mod operations;
pub mod tessellation;

pub use correction::{CorrectionOutcome, CorrectorParams, NodeStatus, TopologyCorrector};
pub use error::{CorrectionError, StructureError, TessellationError};
pub use mesh::{CoordinateSet, Surface, SurfaceKind, Topology};
pub use tessellation::{SphericalTessellator, TessellationReport, TessellatorParams};
