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

use std::cmp::Ordering;

use rug::Rational;

use crate::geometry::vector_3::Vector3;

/// Relative error bound for the floating-point `orient3d` determinant,
/// expressed against the permanent of the absolute terms.
const ORIENT3D_ERR_BOUND: f64 = 7.771_561_172_376_103e-16;

/// Unit normal of the triangle `(p1, p2, p3)` using right-hand winding.
/// Degenerate triangles yield the zero vector.
pub fn compute_normal(p1: &Vector3, p2: &Vector3, p3: &Vector3) -> Vector3 {
    (*p2 - *p1).cross(&(*p3 - *p1)).normalized()
}

/// Unsigned triangle area (Heron-style, stable for slivers).
pub fn triangle_area(p1: &Vector3, p2: &Vector3, p3: &Vector3) -> f64 {
    let a = p1.distance_squared(p2);
    let b = p2.distance_squared(p3);
    let c = p3.distance_squared(p1);
    0.25 * (4.0 * a * c - (a - b + c) * (a - b + c)).abs().sqrt()
}

/// Area of `(p1, p2, p3)`, negated when the triangle's own normal points
/// away from `reference_normal` (angle above 90 degrees).
pub fn signed_triangle_area_3d(
    reference_normal: &Vector3,
    p1: &Vector3,
    p2: &Vector3,
    p3: &Vector3,
) -> f64 {
    let area = triangle_area(p1, p2, p3);
    let n = compute_normal(p1, p2, p3);
    if reference_normal.dot(&n) < 0.0 { -area } else { area }
}

/// Intersection of the ray `origin + t * direction` (t > 0) with the plane
/// through `p1, p2, p3`.
///
/// Returns `None` when the ray is parallel to the plane, the plane is
/// degenerate, or the hit lies behind the origin.
pub fn ray_intersect_plane(
    p1: &Vector3,
    p2: &Vector3,
    p3: &Vector3,
    origin: &Vector3,
    direction: &Vector3,
) -> Option<Vector3> {
    let ray = direction.normalized();
    let normal = compute_normal(p1, p2, p3);
    if normal.norm_squared() == 0.0 || ray.norm_squared() == 0.0 {
        return None;
    }

    let d = -normal.dot(p1);
    let denom = normal.dot(&ray);
    if denom == 0.0 {
        return None;
    }

    let t = -(normal.dot(origin) + d) / denom;
    if !(t > 0.0) {
        return None;
    }
    Some(*origin + ray * t)
}

/// Center and radius of the circle through `a, b, c`, lying in the
/// triangle's plane. `None` for collinear or coincident vertices.
pub fn triangle_circumcenter_3d(a: &Vector3, b: &Vector3, c: &Vector3) -> Option<(Vector3, f64)> {
    let ba = *b - *a;
    let ca = *c - *a;

    let ba_len = ba.norm_squared();
    let ca_len = ca.norm_squared();

    let cross = ba.cross(&ca);
    let cross_len = cross.norm_squared();
    if cross_len == 0.0 || !cross_len.is_finite() {
        return None;
    }
    let denominator = 0.5 / cross_len;

    let offset = Vector3::new(
        ((ba_len * ca.y - ca_len * ba.y) * cross.z - (ba_len * ca.z - ca_len * ba.z) * cross.y)
            * denominator,
        ((ba_len * ca.z - ca_len * ba.z) * cross.x - (ba_len * ca.x - ca_len * ba.x) * cross.z)
            * denominator,
        ((ba_len * ca.x - ca_len * ba.x) * cross.y - (ba_len * ca.y - ca_len * ba.y) * cross.x)
            * denominator,
    );

    let radius = offset.norm();
    let center = *a + offset;
    if !center.is_finite() {
        return None;
    }
    Some((center, radius))
}

/// Floating-point orientation determinant `(b - a) x (c - a) . (d - a)`.
///
/// Returns:
/// - >0 if `d` lies on the side the counter-clockwise normal of `abc` points to
/// - <0 on the other side
/// - =0 if coplanar
pub fn orient3d(a: &Vector3, b: &Vector3, c: &Vector3, d: &Vector3) -> f64 {
    let ab = *b - *a;
    let ac = *c - *a;
    let ad = *d - *a;
    ab.cross(&ac).dot(&ad)
}

/// Sign of [`orient3d`], resolved exactly with rational arithmetic whenever
/// the floating-point determinant falls inside its error bound.
pub fn orient3d_sign(a: &Vector3, b: &Vector3, c: &Vector3, d: &Vector3) -> Ordering {
    let ad = *a - *d;
    let bd = *b - *d;
    let cd = *c - *d;

    let bdxcdy = bd.x * cd.y;
    let cdxbdy = cd.x * bd.y;
    let cdxady = cd.x * ad.y;
    let adxcdy = ad.x * cd.y;
    let adxbdy = ad.x * bd.y;
    let bdxady = bd.x * ad.y;

    // Shewchuk's form; its sign is the negation of `orient3d`.
    let det = ad.z * (bdxcdy - cdxbdy) + bd.z * (cdxady - adxcdy) + cd.z * (adxbdy - bdxady);
    let permanent = (bdxcdy.abs() + cdxbdy.abs()) * ad.z.abs()
        + (cdxady.abs() + adxcdy.abs()) * bd.z.abs()
        + (adxbdy.abs() + bdxady.abs()) * cd.z.abs();

    let bound = ORIENT3D_ERR_BOUND * permanent;
    if det.is_finite() && (det > bound || -det > bound) {
        return if det > 0.0 { Ordering::Less } else { Ordering::Greater };
    }

    orient3d_exact(a, b, c, d).unwrap_or_else(|| {
        let fallback = orient3d(a, b, c, d);
        fallback.partial_cmp(&0.0).unwrap_or(Ordering::Equal)
    })
}

/// Exact determinant sign; `None` when any coordinate is not finite.
fn orient3d_exact(a: &Vector3, b: &Vector3, c: &Vector3, d: &Vector3) -> Option<Ordering> {
    let q = |v: &Vector3| -> Option<[Rational; 3]> {
        Some([
            Rational::from_f64(v.x)?,
            Rational::from_f64(v.y)?,
            Rational::from_f64(v.z)?,
        ])
    };
    let [ax, ay, az] = q(a)?;
    let [bx, by, bz] = q(b)?;
    let [cx, cy, cz] = q(c)?;
    let [dx, dy, dz] = q(d)?;

    let abx = Rational::from(&bx - &ax);
    let aby = Rational::from(&by - &ay);
    let abz = Rational::from(&bz - &az);
    let acx = Rational::from(&cx - &ax);
    let acy = Rational::from(&cy - &ay);
    let acz = Rational::from(&cz - &az);
    let adx = Rational::from(&dx - &ax);
    let ady = Rational::from(&dy - &ay);
    let adz = Rational::from(&dz - &az);

    let nx = Rational::from(&aby * &acz) - Rational::from(&abz * &acy);
    let ny = Rational::from(&abz * &acx) - Rational::from(&abx * &acz);
    let nz = Rational::from(&abx * &acy) - Rational::from(&aby * &acx);

    let det = nx * adx + ny * ady + nz * adz;
    Some(det.cmp0())
}
