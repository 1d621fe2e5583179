//! Cubic Bezier curves and the tube meshes swept along them

use crate::camera::Ray;
use glam::{Mat3, Vec3};
use std::ops::Range;

/// Divisions used when measuring arc length
const LENGTH_DIVISIONS: usize = 200;

/// Triangle-ray determinant below which the ray is treated as parallel
const RAY_EPSILON: f32 = 1e-7;

#[derive(Clone, Debug)]
pub struct CubicBezier {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
    pub v3: Vec3,
    /// Cumulative arc length at `LENGTH_DIVISIONS + 1` evenly spaced `t`
    lengths: Vec<f32>,
}

impl CubicBezier {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, v3: Vec3) -> Self {
        let mut curve = Self { v0, v1, v2, v3, lengths: Vec::new() };
        curve.lengths = curve.measure();
        curve
    }

    /// Point at curve parameter `t` in [0, 1]
    pub fn point(&self, t: f32) -> Vec3 {
        let k = 1.0 - t;
        self.v0 * (k * k * k)
            + self.v1 * (3.0 * k * k * t)
            + self.v2 * (3.0 * k * t * t)
            + self.v3 * (t * t * t)
    }

    /// Unit tangent at curve parameter `t`
    pub fn tangent(&self, t: f32) -> Vec3 {
        let k = 1.0 - t;
        let d = (self.v1 - self.v0) * (3.0 * k * k)
            + (self.v2 - self.v1) * (6.0 * k * t)
            + (self.v3 - self.v2) * (3.0 * t * t);
        d.try_normalize()
            .or_else(|| (self.v3 - self.v0).try_normalize())
            .unwrap_or(Vec3::X)
    }

    pub fn length(&self) -> f32 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    /// Point at fraction `u` of the arc length
    pub fn point_at(&self, u: f32) -> Vec3 {
        self.point(self.u_to_t(u))
    }

    pub fn tangent_at(&self, u: f32) -> Vec3 {
        self.tangent(self.u_to_t(u))
    }

    fn measure(&self) -> Vec<f32> {
        let mut lengths = Vec::with_capacity(LENGTH_DIVISIONS + 1);
        let mut last = self.point(0.0);
        let mut sum = 0.0;
        lengths.push(0.0);
        for p in 1..=LENGTH_DIVISIONS {
            let current = self.point(p as f32 / LENGTH_DIVISIONS as f32);
            sum += current.distance(last);
            lengths.push(sum);
            last = current;
        }
        lengths
    }

    /// Map an arc-length fraction to the curve parameter
    fn u_to_t(&self, u: f32) -> f32 {
        let total = self.length();
        if total <= 0.0 {
            return u.clamp(0.0, 1.0);
        }

        let last_index = self.lengths.len() - 1;
        let target = u.clamp(0.0, 1.0) * total;
        let idx = self.lengths.partition_point(|&l| l < target).min(last_index);
        if idx == 0 || self.lengths[idx] == target {
            return idx as f32 / last_index as f32;
        }

        let i = idx - 1;
        let before = self.lengths[i];
        let segment = self.lengths[idx] - before;
        let fraction = if segment > 0.0 { (target - before) / segment } else { 0.0 };
        (i as f32 + fraction) / last_index as f32
    }
}

/// Contiguous run of indices to draw, open-ended when `count` is `None`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawRange {
    pub start: usize,
    pub count: Option<usize>,
}

impl DrawRange {
    pub const NONE: DrawRange = DrawRange { start: 0, count: Some(0) };

    pub fn head(count: usize) -> Self {
        Self { start: 0, count: Some(count) }
    }

    pub fn tail(start: usize) -> Self {
        Self { start, count: None }
    }

    /// The part of `0..total` this range covers
    pub fn clamp(self, total: usize) -> Range<usize> {
        let start = self.start.min(total);
        let end = match self.count {
            Some(count) => self.start.saturating_add(count).min(total),
            None => total,
        };
        start..end.max(start)
    }
}

/// Triangle mesh swept along a curve, the way a WebGL tube geometry is built
pub struct Tube {
    tubular_segments: usize,
    radial_segments: usize,
    radius: f32,
    centers: Vec<Vec3>,
    vertices: Vec<Vec3>,
    indices: Vec<u32>,
}

impl Tube {
    pub fn new(curve: &CubicBezier, tubular_segments: usize, radius: f32, radial_segments: usize) -> Self {
        let radial_segments = radial_segments.max(3);
        let rings = tubular_segments + 1;
        let (normals, binormals) = frames(curve, tubular_segments);

        let mut centers = Vec::with_capacity(rings);
        let mut vertices = Vec::with_capacity(rings * (radial_segments + 1));
        for i in 0..rings {
            let u = if tubular_segments == 0 { 0.0 } else { i as f32 / tubular_segments as f32 };
            let center = curve.point_at(u);
            centers.push(center);

            for j in 0..=radial_segments {
                let v = j as f32 / radial_segments as f32 * std::f32::consts::TAU;
                let (sin, cos) = (v.sin(), -v.cos());
                let normal = (normals[i] * cos + binormals[i] * sin).normalize_or_zero();
                vertices.push(center + normal * radius);
            }
        }

        let stride = (radial_segments + 1) as u32;
        let mut indices = Vec::with_capacity(tubular_segments * radial_segments * 6);
        for j in 1..=tubular_segments as u32 {
            for i in 1..=radial_segments as u32 {
                let a = stride * (j - 1) + (i - 1);
                let b = stride * j + (i - 1);
                let c = stride * j + i;
                let d = stride * (j - 1) + i;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Self {
            tubular_segments,
            radial_segments,
            radius,
            centers,
            vertices,
            indices,
        }
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn tubular_segments(&self) -> usize {
        self.tubular_segments
    }

    /// Curve samples the tube rings are centred on
    pub fn centers(&self) -> &[Vec3] {
        &self.centers
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Tubular segments touched by the indices in `range`
    pub fn segment_range(&self, range: DrawRange) -> Range<usize> {
        let per_segment = self.radial_segments * 6;
        let indices = range.clamp(self.index_count());
        if indices.is_empty() {
            return 0..0;
        }
        indices.start / per_segment..(indices.end + per_segment - 1) / per_segment
    }

    /// Nearest hit distance along `ray` over the triangles inside `range`
    pub fn raycast(&self, ray: &Ray, range: DrawRange) -> Option<f32> {
        let indices = range.clamp(self.index_count());
        let mut nearest: Option<f32> = None;

        let mut i = indices.start - indices.start % 3;
        while i + 2 < indices.end {
            let a = self.vertices[self.indices[i] as usize];
            let b = self.vertices[self.indices[i + 1] as usize];
            let c = self.vertices[self.indices[i + 2] as usize];
            if let Some(t) = ray_triangle(ray, a, b, c) {
                nearest = Some(nearest.map_or(t, |n| n.min(t)));
            }
            i += 3;
        }
        nearest
    }

    /// Drop the mesh buffers
    pub fn release(&mut self) {
        self.centers = Vec::new();
        self.vertices = Vec::new();
        self.indices = Vec::new();
    }
}

/// Rotation-minimising frames along the curve (normals, binormals)
fn frames(curve: &CubicBezier, segments: usize) -> (Vec<Vec3>, Vec<Vec3>) {
    let tangents: Vec<Vec3> = (0..=segments)
        .map(|i| {
            let u = if segments == 0 { 0.0 } else { i as f32 / segments as f32 };
            curve.tangent_at(u)
        })
        .collect();

    let t0 = tangents[0];
    let axis = if t0.x.abs() <= t0.y.abs() && t0.x.abs() <= t0.z.abs() {
        Vec3::X
    } else if t0.y.abs() <= t0.z.abs() {
        Vec3::Y
    } else {
        Vec3::Z
    };
    let side = t0.cross(axis).normalize_or_zero();

    let mut normals = Vec::with_capacity(tangents.len());
    let mut binormals = Vec::with_capacity(tangents.len());
    normals.push(t0.cross(side));
    binormals.push(t0.cross(normals[0]));

    for i in 1..tangents.len() {
        let mut normal = normals[i - 1];
        let turn = tangents[i - 1].cross(tangents[i]);
        if turn.length() > f32::EPSILON {
            let theta = tangents[i - 1].dot(tangents[i]).clamp(-1.0, 1.0).acos();
            normal = Mat3::from_axis_angle(turn.normalize(), theta) * normal;
        }
        binormals.push(tangents[i].cross(normal));
        normals.push(normal);
    }

    (normals, binormals)
}

/// Möller–Trumbore, two-sided
fn ray_triangle(ray: &Ray, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    let edge1 = b - a;
    let edge2 = c - a;
    let p = ray.direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < RAY_EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t > RAY_EPSILON).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight() -> CubicBezier {
        CubicBezier::new(
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
        )
    }

    fn arched() -> CubicBezier {
        CubicBezier::new(
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(-1.0, 2.0, 0.0),
            Vec3::new(1.0, 2.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
        )
    }

    #[test]
    fn straight_curve_length() {
        assert!((straight().length() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn point_at_is_arc_length_uniform() {
        let curve = CubicBezier::new(
            Vec3::ZERO,
            Vec3::new(0.1, 0.0, 0.0),
            Vec3::new(0.2, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
        );
        // the control points bunch `t` near the start; `u` still spaces evenly
        let mid = curve.point_at(0.5);
        assert!((mid.x - 1.5).abs() < 0.02, "{mid:?}");
        assert!(curve.point_at(0.0).distance(Vec3::ZERO) < 1e-5);
        assert!(curve.point_at(1.0).distance(Vec3::new(3.0, 0.0, 0.0)) < 1e-4);
    }

    #[test]
    fn endpoints_are_interpolated() {
        let curve = arched();
        assert!(curve.point(0.0).distance(curve.v0) < 1e-6);
        assert!(curve.point(1.0).distance(curve.v3) < 1e-6);
    }

    #[test]
    fn tube_index_count() {
        let curve = arched();
        let tube = Tube::new(&curve, 40, 0.01, 3);
        assert_eq!(tube.index_count(), 40 * 3 * 6);
        assert_eq!(tube.centers().len(), 41);
        assert_eq!(tube.vertices().len(), 41 * 4);
    }

    #[test]
    fn tube_vertices_keep_radius() {
        let curve = arched();
        let tube = Tube::new(&curve, 20, 0.05, 3);
        for (ring, center) in tube.centers().iter().enumerate() {
            for v in &tube.vertices()[ring * 4..ring * 4 + 4] {
                assert!((v.distance(*center) - 0.05).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn degenerate_curve_builds_empty_tube() {
        let p = Vec3::new(0.3, 0.4, 0.5);
        let curve = CubicBezier::new(p, p, p, p);
        assert_eq!(curve.length(), 0.0);
        assert!(curve.point_at(0.7).distance(p) < 1e-6);

        let tube = Tube::new(&curve, (100.0 * curve.length()) as usize, 0.01, 3);
        assert_eq!(tube.index_count(), 0);
        let ray = Ray { origin: Vec3::new(0.3, 0.4, 5.0), direction: Vec3::NEG_Z };
        assert_eq!(tube.raycast(&ray, DrawRange::tail(0)), None);
    }

    #[test]
    fn draw_range_clamps() {
        assert_eq!(DrawRange::head(10).clamp(6), 0..6);
        assert_eq!(DrawRange::head(4).clamp(6), 0..4);
        assert_eq!(DrawRange::tail(3).clamp(6), 3..6);
        assert_eq!(DrawRange::tail(9).clamp(6), 6..6);
        assert!(DrawRange::NONE.clamp(6).is_empty());
    }

    #[test]
    fn segment_range_follows_draw_range() {
        let tube = Tube::new(&straight(), 10, 0.1, 3);
        assert_eq!(tube.segment_range(DrawRange::head(18)), 0..1);
        assert_eq!(tube.segment_range(DrawRange::head(36)), 0..2);
        assert_eq!(tube.segment_range(DrawRange::tail(18 * 9)), 9..10);
        assert_eq!(tube.segment_range(DrawRange::NONE), 0..0);
    }

    #[test]
    fn raycast_hits_only_drawn_part() {
        let tube = Tube::new(&straight(), 30, 0.1, 3);
        let ray = Ray { origin: Vec3::new(2.45, 0.0, 5.0), direction: Vec3::NEG_Z };

        let hit = tube.raycast(&ray, DrawRange::tail(0)).expect("full tube is hit");
        assert!(hit > 4.8 && hit < 5.0, "{hit}");

        // only the first third is drawn, x = 2.45 lies past it
        assert_eq!(tube.raycast(&ray, DrawRange::head(10 * 18)), None);
        assert_eq!(tube.raycast(&ray, DrawRange::NONE), None);
    }

    #[test]
    fn raycast_misses_beside_tube() {
        let tube = Tube::new(&straight(), 30, 0.1, 3);
        let ray = Ray { origin: Vec3::new(1.5, 1.0, 5.0), direction: Vec3::NEG_Z };
        assert_eq!(tube.raycast(&ray, DrawRange::tail(0)), None);
    }
}
