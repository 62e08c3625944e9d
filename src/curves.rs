//! Connection path geometry.
//!
//! Paths and markers are produced as plain point lists in whatever space the
//! endpoints are given in. The renderer feeds world-space endpoints through
//! the frame transform, so every curve kind scales with zoom identically.

use crate::constants::*;
use crate::types::{ArrowKind, CurveKind};
use eframe::egui;

/// A filled decoration at a connection end.
#[derive(Debug, Clone, PartialEq)]
pub enum Marker {
    /// Closed convex polygon
    Polygon(Vec<egui::Pos2>),
    /// Filled dot
    Circle {
        /// Dot centre
        center: egui::Pos2,
        /// Dot radius
        radius: f32,
    },
}

/// Polyline approximating a connection from `from` to `to`.
pub fn connection_path(from: egui::Pos2, to: egui::Pos2, curve: CurveKind) -> Vec<egui::Pos2> {
    match curve {
        CurveKind::Straight => vec![from, to],
        CurveKind::Bezier => {
            let mid_x = (from.x + to.x) / 2.0;
            let c1 = egui::pos2(mid_x, from.y);
            let c2 = egui::pos2(mid_x, to.y);
            (0..=BEZIER_SAMPLES)
                .map(|i| cubic_point(from, c1, c2, to, i as f32 / BEZIER_SAMPLES as f32))
                .collect()
        }
        CurveKind::Orthogonal => {
            let mid_x = (from.x + to.x) / 2.0;
            vec![
                from,
                egui::pos2(mid_x, from.y),
                egui::pos2(mid_x, to.y),
                to,
            ]
        }
        CurveKind::Zigzag => {
            let step = (to - from) / ZIGZAG_SEGMENTS as f32;
            let mut points = Vec::with_capacity(ZIGZAG_SEGMENTS + 2);
            points.push(from);
            for i in 1..=ZIGZAG_SEGMENTS {
                let bump = if i % 2 == 0 { ZIGZAG_AMPLITUDE } else { -ZIGZAG_AMPLITUDE };
                let base = from + step * i as f32;
                points.push(egui::pos2(base.x, base.y + bump));
            }
            points.push(to);
            points
        }
    }
}

fn cubic_point(p0: egui::Pos2, p1: egui::Pos2, p2: egui::Pos2, p3: egui::Pos2, t: f32) -> egui::Pos2 {
    let u = 1.0 - t;
    let a = u * u * u;
    let b = 3.0 * u * u * t;
    let c = 3.0 * u * t * t;
    let d = t * t * t;
    egui::pos2(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}

/// Direction of travel when arriving at the end of `path`.
fn end_direction(path: &[egui::Pos2]) -> egui::Vec2 {
    let Some(&tip) = path.last() else {
        return egui::Vec2::X;
    };
    path.iter()
        .rev()
        .skip(1)
        .map(|p| tip - *p)
        .find(|d| d.length_sq() > f32::EPSILON)
        .map(|d| d.normalized())
        .unwrap_or(egui::Vec2::X)
}

/// End markers for a connection drawn along `path`.
///
/// `length` is the marker size in the same space as `path`.
pub fn markers(path: &[egui::Pos2], arrow: ArrowKind, length: f32) -> Vec<Marker> {
    let (Some(&start), Some(&end)) = (path.first(), path.last()) else {
        return Vec::new();
    };
    let forward = end_direction(path);
    match arrow {
        ArrowKind::None => Vec::new(),
        ArrowKind::Arrow => vec![arrow_head(end, forward, length)],
        ArrowKind::Double => {
            let reversed: Vec<egui::Pos2> = path.iter().rev().copied().collect();
            vec![
                arrow_head(end, forward, length),
                arrow_head(start, end_direction(&reversed), length),
            ]
        }
        ArrowKind::Diamond => vec![diamond(end, forward, length)],
        ArrowKind::Circle => vec![Marker::Circle {
            center: end,
            radius: length / 2.0,
        }],
    }
}

fn rotate(v: egui::Vec2, angle: f32) -> egui::Vec2 {
    let (sin, cos) = angle.sin_cos();
    egui::vec2(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

fn arrow_head(tip: egui::Pos2, direction: egui::Vec2, length: f32) -> Marker {
    Marker::Polygon(vec![
        tip,
        tip - rotate(direction, -ARROW_HALF_ANGLE) * length,
        tip - rotate(direction, ARROW_HALF_ANGLE) * length,
    ])
}

fn diamond(tip: egui::Pos2, direction: egui::Vec2, size: f32) -> Marker {
    let normal = egui::vec2(-direction.y, direction.x);
    let back = tip - direction * size;
    Marker::Polygon(vec![
        tip,
        back + normal * (size / 2.0),
        tip - direction * (size * 2.0),
        back - normal * (size / 2.0),
    ])
}

/// Shortest distance from `point` to the polyline `path`.
pub fn distance_to_path(point: egui::Pos2, path: &[egui::Pos2]) -> f32 {
    match path {
        [] => f32::INFINITY,
        [only] => (point - *only).length(),
        _ => path
            .windows(2)
            .map(|w| distance_to_segment(point, w[0], w[1]))
            .fold(f32::INFINITY, f32::min),
    }
}

fn distance_to_segment(p: egui::Pos2, a: egui::Pos2, b: egui::Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq <= f32::EPSILON {
        return (p - a).length();
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).length()
}
