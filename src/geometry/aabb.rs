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

use crate::geometry::vector_3::Vector3;

/// Axis-aligned bounding box in three dimensions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds3 {
    pub min: Vector3,
    pub max: Vector3,
}

impl Bounds3 {
    pub fn new(min: Vector3, max: Vector3) -> Self {
        Bounds3 { min, max }
    }

    /// Smallest box containing every point, or `None` for an empty input.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vector3>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut b = Bounds3::new(first, first);
        for p in iter {
            b.expand_to(&p);
        }
        Some(b)
    }

    pub fn expand_to(&mut self, p: &Vector3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Grow every face outward by `pad`.
    pub fn padded(&self, pad: f64) -> Self {
        let d = Vector3::new(pad, pad, pad);
        Bounds3::new(self.min - d, self.max + d)
    }

    /// Length along axis `i`.
    pub fn extent(&self, i: usize) -> f64 {
        self.max[i] - self.min[i]
    }

    pub fn center(&self) -> Vector3 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, p: &Vector3) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] && p[i] <= self.max[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_bounds_contain_inputs() {
        let b = Bounds3::from_points([
            Vector3::new(-1.0, 2.0, 0.0),
            Vector3::new(3.0, -2.0, 1.0),
        ])
        .expect("non-empty");
        assert_eq!(b.min, Vector3::new(-1.0, -2.0, 0.0));
        assert_eq!(b.max, Vector3::new(3.0, 2.0, 1.0));

        let p = b.padded(0.5);
        assert!(p.contains(&Vector3::new(-1.4, 2.4, 1.4)));
        assert!((p.extent(0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn empty_input_has_no_bounds() {
        assert!(Bounds3::from_points(std::iter::empty()).is_none());
    }
}
