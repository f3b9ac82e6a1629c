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

use tracing::warn;

use crate::geometry::{aabb::Bounds3, vector_3::Vector3};

/// Uniform bucket grid over a fixed bounding box answering nearest-point
/// queries as points accumulate.
///
/// Every stored point lives in exactly the bucket containing its
/// coordinate. Points whose coordinate falls outside the grid are dropped
/// with a warning.
#[derive(Debug, Clone)]
pub struct PointLocator {
    bounds: Bounds3,
    dims: [usize; 3],
    bucket_size: Vector3,
    buckets: Vec<Vec<(Vector3, usize)>>,
    len: usize,
}

impl PointLocator {
    /// Grid of `dims[0] x dims[1] x dims[2]` buckets spanning `bounds`.
    /// Zero dimensions are raised to one.
    pub fn new(bounds: Bounds3, dims: [usize; 3]) -> Self {
        let dims = dims.map(|d| d.max(1));
        let size = |i: usize| {
            let s = bounds.extent(i) / dims[i] as f64;
            if s > 0.0 && s.is_finite() { s } else { 1.0 }
        };
        let bucket_size = Vector3::new(size(0), size(1), size(2));
        PointLocator {
            bounds,
            dims,
            bucket_size,
            buckets: vec![Vec::new(); dims[0] * dims[1] * dims[2]],
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn bounds(&self) -> &Bounds3 {
        &self.bounds
    }

    #[inline(always)]
    fn axis_cell(&self, xyz: &Vector3, axis: usize) -> i64 {
        let f = (xyz[axis] - self.bounds.min[axis]) / self.bucket_size[axis];
        if !f.is_finite() {
            return if f.is_sign_positive() { i64::MAX } else { i64::MIN };
        }
        f.floor() as i64
    }

    /// Signed cell coordinates of `xyz`, possibly outside the grid.
    fn raw_cell(&self, xyz: &Vector3) -> [i64; 3] {
        [
            self.axis_cell(xyz, 0),
            self.axis_cell(xyz, 1),
            self.axis_cell(xyz, 2),
        ]
    }

    /// The bucket containing `xyz`, or `None` when it lies outside the grid.
    /// A coordinate exactly on the upper bound belongs to the last bucket.
    pub fn bucket_of(&self, xyz: &Vector3) -> Option<[usize; 3]> {
        let raw = self.raw_cell(xyz);
        let mut out = [0usize; 3];
        for i in 0..3 {
            let d = self.dims[i] as i64;
            let c = if raw[i] == d && xyz[i] <= self.bounds.max[i] { d - 1 } else { raw[i] };
            if c < 0 || c >= d {
                return None;
            }
            out[i] = c as usize;
        }
        Some(out)
    }

    #[inline]
    fn flat(&self, c: [usize; 3]) -> usize {
        (c[2] * self.dims[1] + c[1]) * self.dims[0] + c[0]
    }

    /// Insert a point. Returns `false` (and drops the point) when it lies
    /// outside the grid.
    pub fn add_point(&mut self, xyz: Vector3, id: usize) -> bool {
        match self.bucket_of(&xyz) {
            Some(cell) => {
                let k = self.flat(cell);
                self.buckets[k].push((xyz, id));
                self.len += 1;
                true
            }
            None => {
                warn!(
                    "point {} at ({}, {}, {}) is outside the locator bounds, dropped",
                    id, xyz.x, xyz.y, xyz.z
                );
                false
            }
        }
    }

    /// Id of the stored point closest to `xyz`, `None` only when empty.
    pub fn nearest_point(&self, xyz: &Vector3) -> Option<usize> {
        self.nearest_point_with_distance(xyz).map(|(id, _)| id)
    }

    /// Id of the closest stored point and its squared distance.
    pub fn nearest_point_with_distance(&self, xyz: &Vector3) -> Option<(usize, f64)> {
        if self.len == 0 {
            return None;
        }

        let raw = self.raw_cell(xyz);
        let start: [i64; 3] =
            std::array::from_fn(|i| raw[i].clamp(0, self.dims[i] as i64 - 1));
        let max_delta = self.dims.iter().copied().max().unwrap_or(1) as i64;

        let mut best: Option<(usize, f64)> = None;

        // Expanding cubic shells until something turns up.
        for delta in 0..=max_delta {
            self.scan_shell(start, delta, xyz, &mut best);
            if best.is_some() {
                break;
            }
        }

        // The first non-empty shell is not necessarily the closest; confirm
        // against every bucket the candidate's sphere touches.
        let (_, d2) = best?;
        let r = d2.sqrt();
        let lo = self.raw_cell(&(*xyz - Vector3::new(r, r, r)));
        let hi = self.raw_cell(&(*xyz + Vector3::new(r, r, r)));
        let clamp = |c: i64, i: usize| c.clamp(0, self.dims[i] as i64 - 1) as usize;
        for k in clamp(lo[2], 2)..=clamp(hi[2], 2) {
            for j in clamp(lo[1], 1)..=clamp(hi[1], 1) {
                for i in clamp(lo[0], 0)..=clamp(hi[0], 0) {
                    self.scan_bucket([i, j, k], xyz, &mut best);
                }
            }
        }

        best
    }

    fn scan_shell(&self, c: [i64; 3], delta: i64, xyz: &Vector3, best: &mut Option<(usize, f64)>) {
        let in_grid = |v: i64, i: usize| v >= 0 && v < self.dims[i] as i64;
        for k in (c[2] - delta)..=(c[2] + delta) {
            if !in_grid(k, 2) {
                continue;
            }
            for j in (c[1] - delta)..=(c[1] + delta) {
                if !in_grid(j, 1) {
                    continue;
                }
                for i in (c[0] - delta)..=(c[0] + delta) {
                    if !in_grid(i, 0) {
                        continue;
                    }
                    let on_shell = (i - c[0]).abs() == delta
                        || (j - c[1]).abs() == delta
                        || (k - c[2]).abs() == delta;
                    if on_shell {
                        self.scan_bucket([i as usize, j as usize, k as usize], xyz, best);
                    }
                }
            }
        }
    }

    #[inline]
    fn scan_bucket(&self, cell: [usize; 3], xyz: &Vector3, best: &mut Option<(usize, f64)>) {
        for (p, id) in &self.buckets[self.flat(cell)] {
            let d2 = p.distance_squared(xyz);
            match best {
                Some((_, bd)) if *bd <= d2 => {}
                _ => *best = Some((*id, d2)),
            }
        }
    }
}
