// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ring winding normalisation
//!
//! Every face loop emitted by the extruder and the road buffer goes through
//! [`fix_orientation`], so winding is decided in one place.

use crate::Point2;

/// Shoelace orientation sum `Σ (x[i+1] - x[i]) * (y[i+1] + y[i])`
///
/// Positive for clockwise rings (y up), negative for counter-clockwise ones,
/// and twice the enclosed area in magnitude.
#[inline]
pub fn orientation_sum(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let p = &points[i];
            let q = &points[(i + 1) % n];
            (q.x - p.x) * (q.y + p.y)
        })
        .sum()
}

/// Signed area, positive for counter-clockwise rings
#[inline]
pub fn signed_area(points: &[Point2<f64>]) -> f64 {
    -0.5 * orientation_sum(points)
}

/// Normalise the winding of an index loop
///
/// `points` are the ring positions in index order. When the orientation sum
/// is negative the indices are reversed and `true` ("inverted") is returned,
/// leaving the loop with a non-negative sum.
pub fn fix_orientation<I>(points: &[Point2<f64>], indices: &mut [I]) -> bool {
    if orientation_sum(points) < 0.0 {
        indices.reverse();
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_orientation_sum_counter_clockwise() {
        assert_relative_eq!(orientation_sum(&unit_square()), -2.0);
        assert_relative_eq!(signed_area(&unit_square()), 1.0);
    }

    #[test]
    fn test_fix_reverses_counter_clockwise() {
        let square = unit_square();
        let mut indices: Vec<u32> = vec![0, 1, 2, 3];
        assert!(fix_orientation(&square, &mut indices));
        assert_eq!(indices, vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_fixed_loop_has_non_negative_sum() {
        let rings = [
            unit_square(),
            unit_square().into_iter().rev().collect(),
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(4.0, 0.0),
                Point2::new(4.0, 3.0),
                Point2::new(2.0, 1.0),
                Point2::new(0.0, 3.0),
            ],
        ];
        for ring in rings {
            let mut indices: Vec<usize> = (0..ring.len()).collect();
            fix_orientation(&ring, &mut indices);
            let reordered: Vec<Point2<f64>> = indices.iter().map(|&i| ring[i]).collect();
            assert!(orientation_sum(&reordered) >= 0.0);
        }
    }
}
