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

use num_traits::ToPrimitive;

use crate::geometry::{aabb::Bounds3, vector_3::Vector3};

/// Per-node 3D positions of a surface, stored in single precision.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinateSet {
    coords: Vec<[f32; 3]>,
}

impl CoordinateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(coords: Vec<[f32; 3]>) -> Self {
        CoordinateSet { coords }
    }

    /// Build from any numeric triples, e.g. `f64` test fixtures.
    /// Values that do not fit an `f32` become NaN.
    pub fn from_xyz<T: ToPrimitive>(xyz: &[[T; 3]]) -> Self {
        let c = |v: &T| v.to_f32().unwrap_or(f32::NAN);
        CoordinateSet {
            coords: xyz.iter().map(|p| [c(&p[0]), c(&p[1]), c(&p[2])]).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn push(&mut self, xyz: [f32; 3]) -> usize {
        self.coords.push(xyz);
        self.coords.len() - 1
    }

    #[inline]
    pub fn get(&self, i: usize) -> [f32; 3] {
        self.coords[i]
    }

    #[inline]
    pub fn point(&self, i: usize) -> Vector3 {
        Vector3::from_f32(self.coords[i])
    }

    pub fn set(&mut self, i: usize, xyz: [f32; 3]) {
        self.coords[i] = xyz;
    }

    pub fn set_point(&mut self, i: usize, p: Vector3) {
        self.coords[i] = p.to_f32();
    }

    pub fn as_slice(&self) -> &[[f32; 3]] {
        &self.coords
    }

    pub fn iter(&self) -> impl Iterator<Item = Vector3> + '_ {
        self.coords.iter().map(|c| Vector3::from_f32(*c))
    }

    /// Double-precision copy of every coordinate.
    pub fn to_points(&self) -> Vec<Vector3> {
        self.iter().collect()
    }

    pub fn bounds(&self) -> Option<Bounds3> {
        Bounds3::from_points(self.iter())
    }

    pub fn distance_squared_to(&self, i: usize, p: &Vector3) -> f64 {
        self.point(i).distance_squared(p)
    }

    pub fn translate(&mut self, delta: Vector3) {
        for c in self.coords.iter_mut() {
            *c = (Vector3::from_f32(*c) + delta).to_f32();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_and_bounds() {
        let mut cs = CoordinateSet::from_xyz(&[[0.0f64, 0.0, 0.0], [2.0, 4.0, -2.0]]);
        cs.translate(Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(cs.get(1), [3.0, 5.0, -1.0]);
        let b = cs.bounds().expect("bounds");
        assert_eq!(b.min, Vector3::new(1.0, 1.0, -1.0));
        assert_eq!(b.max, Vector3::new(3.0, 5.0, 1.0));
    }
}
