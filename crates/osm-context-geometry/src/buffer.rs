// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Road ribbons
//!
//! A centerline is offset by a half-width on both sides. Open lines get
//! square caps; closed lines become an annulus. Corners use mitre joins,
//! falling back to a bevel once the mitre grows past the limit. The pieces
//! are merged with a polygon union before triangulation.

use crate::error::{Error, Result};
use crate::orientation::{fix_orientation, signed_area};
use crate::triangulation::triangulate_polygon_with_holes;
use crate::{Mesh, Point2, Polyline, Vector2};
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Consecutive points closer than this are merged
const POINT_EPSILON: f64 = 1e-9;

/// Half-width used when the table itself is unusable
const FALLBACK_HALF_WIDTH: f64 = 2.0;

/// Road classification to ribbon half-width, in metres
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadWidthTable {
    pub classes: BTreeMap<String, f64>,
    pub default_half_width: f64,
}

impl Default for RoadWidthTable {
    fn default() -> Self {
        let classes = [("primary", 12.0), ("secondary", 7.0)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        Self {
            classes,
            default_half_width: FALLBACK_HALF_WIDTH,
        }
    }
}

impl RoadWidthTable {
    /// Builder-style override of one classification
    pub fn with_class(mut self, classification: impl Into<String>, half_width: f64) -> Self {
        self.classes.insert(classification.into(), half_width);
        self
    }

    /// Half-width for a classification
    ///
    /// Unknown classes use the default; unusable entries fall back to the
    /// default with a warning.
    pub fn half_width(&self, classification: Option<&str>) -> f64 {
        let default = if is_usable(self.default_half_width) {
            self.default_half_width
        } else {
            log::warn!(
                "Default road half-width {} is unusable, using {}",
                self.default_half_width,
                FALLBACK_HALF_WIDTH
            );
            FALLBACK_HALF_WIDTH
        };

        match classification.and_then(|c| self.classes.get(c).map(|w| (c, *w))) {
            Some((_, width)) if is_usable(width) => width,
            Some((class, width)) => {
                log::warn!(
                    "Road half-width {} for '{}' is unusable, using {}",
                    width,
                    class,
                    default
                );
                default
            }
            None => default,
        }
    }
}

fn is_usable(width: f64) -> bool {
    width.is_finite() && width > 0.0
}

/// Appearance of a ribbon mesh
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct RibbonStyle {
    /// Longest allowed mitre, as a multiple of the half-width
    pub miter_limit: f64,
    /// Z of every ribbon vertex
    pub elevation: f64,
    pub color: u32,
}

/// One polygon of a ribbon, outer boundary first
#[derive(Clone, PartialEq, Debug)]
pub struct RibbonPolygon {
    pub outer: Vec<Point2<f64>>,
    pub holes: Vec<Vec<Point2<f64>>>,
}

impl RibbonPolygon {
    /// Enclosed area, holes subtracted
    pub fn area(&self) -> f64 {
        let holes: f64 = self.holes.iter().map(|h| signed_area(h).abs()).sum();
        signed_area(&self.outer).abs() - holes
    }
}

/// Offset a centerline into ribbon polygons
///
/// Every segment contributes a rectangle and every corner a join piece;
/// their union is the ribbon, so a line that doubles back on itself never
/// covers ground twice. A closed line around an open interior comes back
/// as one polygon with a hole.
///
/// # Errors
/// `Error::Configuration` for a non-positive half-width,
/// `Error::DegenerateGeometry` when the centerline has no length.
pub fn ribbon_outline(
    points: &[Point2<f64>],
    closed: bool,
    half_width: f64,
    miter_limit: f64,
) -> Result<Vec<RibbonPolygon>> {
    if !is_usable(half_width) {
        return Err(Error::configuration(format!(
            "Ribbon half-width must be positive, got {}",
            half_width
        )));
    }
    let miter_limit = if miter_limit.is_finite() && miter_limit >= 1.0 {
        miter_limit
    } else {
        1.0
    };

    let points = clean_points(points, closed);
    if points.len() < 2 {
        return Err(Error::degenerate("Centerline collapses to a single point"));
    }
    let closed = closed && points.len() >= 3;

    let pieces: Vec<Vec<[f64; 2]>> = ribbon_pieces(&points, closed, half_width, miter_limit)
        .into_iter()
        .filter_map(|mut piece| {
            let area = signed_area(&piece);
            if area.abs() <= POINT_EPSILON {
                return None;
            }
            // Counter-clockwise throughout so overlaps add up under NonZero
            if area < 0.0 {
                piece.reverse();
            }
            Some(piece.iter().map(|p| [p.x, p.y]).collect())
        })
        .collect();

    let clip: Vec<Vec<[f64; 2]>> = Vec::new();
    let shapes = pieces.overlay(&clip, OverlayRule::Union, FillRule::NonZero);

    let polygons: Vec<RibbonPolygon> = shapes
        .into_iter()
        .filter_map(|shape| {
            let mut contours = shape.into_iter().map(|contour| {
                contour
                    .into_iter()
                    .map(|[x, y]| Point2::new(x, y))
                    .collect::<Vec<Point2<f64>>>()
            });
            let outer = contours.next()?;
            let holes: Vec<Vec<Point2<f64>>> = contours.filter(|h| h.len() >= 3).collect();
            (outer.len() >= 3).then_some(RibbonPolygon { outer, holes })
        })
        .collect();

    if polygons.is_empty() {
        return Err(Error::degenerate("Ribbon encloses no area"));
    }
    log::trace!(
        "Ribbon of {} points: {} pieces, {} polygons",
        points.len(),
        pieces.len(),
        polygons.len()
    );
    Ok(polygons)
}

/// Buffer a polyline into an upward-facing triangle mesh
pub fn buffer_polyline(polyline: &Polyline, half_width: f64, style: &RibbonStyle) -> Result<Mesh> {
    let points: Vec<Point2<f64>> = polyline
        .points
        .iter()
        .map(|p| Point2::new(p[0], p[1]))
        .collect();
    let polygons = ribbon_outline(&points, polyline.closed, half_width, style.miter_limit)?;

    let mut mesh = Mesh::new();
    for polygon in &polygons {
        let indices = triangulate_polygon_with_holes(&polygon.outer, &polygon.holes)?;
        let all_points: Vec<Point2<f64>> = polygon
            .outer
            .iter()
            .chain(polygon.holes.iter().flatten())
            .copied()
            .collect();

        let base = mesh.vertex_count() as u32;
        for p in &all_points {
            mesh.push_vertex([p.x, p.y, style.elevation], style.color);
        }
        for tri in indices.chunks_exact(3) {
            let corners = [all_points[tri[0]], all_points[tri[1]], all_points[tri[2]]];
            let mut face = [tri[0] as u32, tri[1] as u32, tri[2] as u32];
            fix_orientation(&corners, &mut face);
            face.reverse();
            mesh.push_face(face.iter().map(|i| base + i).collect());
        }
    }

    Ok(mesh)
}

/// Drop repeated points and the closing duplicate
fn clean_points(points: &[Point2<f64>], closed: bool) -> Vec<Point2<f64>> {
    let mut cleaned: Vec<Point2<f64>> = Vec::with_capacity(points.len());
    for p in points {
        if cleaned
            .last()
            .map_or(true, |last| (p - last).norm() > POINT_EPSILON)
        {
            cleaned.push(*p);
        }
    }
    if closed && cleaned.len() > 1 {
        let first = cleaned[0];
        if cleaned.last().is_some_and(|last| (first - last).norm() <= POINT_EPSILON) {
            cleaned.pop();
        }
    }
    cleaned
}

/// Left-hand normal of a unit direction
#[inline]
fn left_normal(d: &Vector2<f64>) -> Vector2<f64> {
    Vector2::new(-d.y, d.x)
}

fn segment_directions(points: &[Point2<f64>], closed: bool) -> Vec<Vector2<f64>> {
    let n = points.len();
    let segments = if closed { n } else { n - 1 };
    (0..segments)
        .map(|i| (points[(i + 1) % n] - points[i]).normalize())
        .collect()
}

/// Segment rectangles, square caps on open ends, and corner joins
fn ribbon_pieces(
    points: &[Point2<f64>],
    closed: bool,
    half_width: f64,
    miter_limit: f64,
) -> Vec<Vec<Point2<f64>>> {
    let n = points.len();
    let dirs = segment_directions(points, closed);
    let last = dirs.len() - 1;
    let mut pieces = Vec::with_capacity(dirs.len() * 2);

    for (i, d) in dirs.iter().enumerate() {
        let (a, b) = (points[i], points[(i + 1) % n]);
        let start = if !closed && i == 0 { a - d * half_width } else { a };
        let end = if !closed && i == last { b + d * half_width } else { b };
        let normal = left_normal(d) * half_width;
        pieces.push(vec![start - normal, end - normal, end + normal, start + normal]);
    }

    let corners = if closed { 0..n } else { 1..n - 1 };
    for i in corners {
        let d_in = &dirs[(i + dirs.len() - 1) % dirs.len()];
        let d_out = &dirs[i % dirs.len()];
        pieces.extend(join_piece(&points[i], d_in, d_out, half_width, miter_limit));
    }
    pieces
}

/// Wedge filling the gap on the outside of the corner at `p`
///
/// Mitre when the tip stays within the limit, bevel otherwise. A full
/// reversal gets a square cap ahead of the corner.
fn join_piece(
    p: &Point2<f64>,
    d_in: &Vector2<f64>,
    d_out: &Vector2<f64>,
    half_width: f64,
    miter_limit: f64,
) -> Option<Vec<Point2<f64>>> {
    let turn = d_in.perp(d_out);
    if turn.abs() <= POINT_EPSILON {
        if d_in.dot(d_out) > 0.0 {
            return None;
        }
        let normal = left_normal(d_in) * half_width;
        let ahead = d_in * half_width;
        return Some(vec![p - normal, p - normal + ahead, p + normal + ahead, p + normal]);
    }

    // Left turns open a gap on the right
    let side = if turn > 0.0 { -1.0 } else { 1.0 };
    let n_in = left_normal(d_in) * side;
    let n_out = left_normal(d_out) * side;

    let mut piece = vec![*p, p + n_in * half_width];
    let bisector = n_in + n_out;
    let len = bisector.norm();
    if len > POINT_EPSILON {
        let m = bisector / len;
        let cos = m.dot(&n_in);
        if cos > POINT_EPSILON && 1.0 / cos <= miter_limit {
            piece.push(p + m * (half_width / cos));
        }
    }
    piece.push(p + n_out * half_width);
    Some(piece)
}
