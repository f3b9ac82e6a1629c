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

//! Error types for tessellation and topology correction.
//!
//! Three layers, each with its own `Result` alias:
//! - [`StructureError`]: a structural precondition of the incremental
//!   tessellation was violated. These indicate a bug or a degenerate
//!   configuration and fail the current attempt.
//! - [`TessellationError`]: a single tessellation attempt failed, or every
//!   attempt failed ([`TessellationError::Exhausted`]).
//! - [`CorrectionError`]: the topology correction pipeline aborted.

use thiserror::Error;

use crate::tessellation::structure::{TriangleId, VertexId};

pub type StructureResult<T> = Result<T, StructureError>;
pub type TessellationResult<T> = Result<T, TessellationError>;
pub type CorrectionResult<T> = Result<T, CorrectionError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StructureError {
    #[error("triangle {0} is not part of the tessellation")]
    StaleTriangle(TriangleId),

    #[error("vertex {0} is not part of the tessellation")]
    UnknownVertex(VertexId),

    #[error("triangle ({0}, {1}, {2}) repeats a vertex")]
    DegenerateTriangle(VertexId, VertexId, VertexId),

    #[error("edge ({0}, {1}) already has two triangles")]
    EdgeFull(VertexId, VertexId),

    #[error("edge ({0}, {1}) is not shared by exactly two triangles")]
    OpenEdge(VertexId, VertexId),

    #[error("vertex {0} has only {1} neighbors")]
    LowDegreeVertex(VertexId, usize),

    #[error("triangles {0} and {1} do not share an edge")]
    NoCommonEdge(TriangleId, TriangleId),

    #[error("triangles {0} and {1} have the same vertices")]
    SameVertices(TriangleId, TriangleId),

    #[error("Euler count invalid = {euler} (V, E, F) = ({v}, {e}, {f})")]
    EulerCount { v: usize, e: usize, f: usize, euler: i64 },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TessellationError {
    #[error("input sphere surface has no nodes")]
    EmptySurface,

    #[error("inclusion flags cover {actual} nodes, surface has {expected}")]
    FlagCountMismatch { expected: usize, actual: usize },

    #[error("included nodes have no usable spherical extent")]
    DegenerateSphere,

    #[error("could not find extreme nodes")]
    MissingExtremeNodes,

    #[error("could not find unique extreme nodes")]
    NonUniqueExtremeNodes,

    #[error("no nearest node found")]
    NoNearestNode,

    #[error("tessellation produced no triangles")]
    NoTriangles,

    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error("spherical tessellation failed after {attempts} attempts:\n{}", messages.join("\n"))]
    Exhausted { attempts: usize, messages: Vec<String> },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CorrectionError {
    #[error("surface has no nodes to correct")]
    EmptySurface,

    #[error("surface has no nodes to smooth")]
    NothingToSmooth,

    #[error("calculation of areal distortion failed: {0}")]
    DistortionFailed(String),

    #[error("fiducial and spherical surfaces differ in node count ({fiducial} vs {spherical})")]
    NodeCountMismatch { fiducial: usize, spherical: usize },

    #[error(transparent)]
    Tessellation(#[from] TessellationError),
}
