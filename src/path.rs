//! Animated arc between two cities
//!
//! A path reveals itself from the start city, holds for a while, then
//! disappears from the tail end. Progress is measured in mesh indices, so the
//! visible part is always a draw range over the tube's index buffer.

use crate::camera::Ray;
use crate::cities::Route;
use crate::colors::Rgb;
use crate::curve::{CubicBezier, DrawRange, Tube};
use crate::geo::normalize;
use glam::Vec3;
use std::fmt;
use tracing::trace;

/// Radius of the visible line
pub const LINE_RADIUS: f32 = 0.004;
/// Radius of the invisible tube used for hover hit-tests
pub const HITBOX_RADIUS: f32 = 0.04;
/// Radius of the marker travelling along the arc
pub const MARKER_RADIUS: f32 = 0.015;
const RADIAL_SEGMENTS: usize = 3;

/// Where the Bezier control points are sampled on the interim curve
const CONTROL_T1: f32 = 0.15;
const CONTROL_T2: f32 = 0.85;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathId(pub u64);

impl fmt::Display for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "path#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathPhase {
    Revealing,
    Pausing,
    Concealing,
    Disposed,
}

pub type DisposeCallback = Box<dyn FnOnce(PathId)>;

/// Sphere riding along the arc while it is revealed
#[derive(Clone, Copy, Debug)]
pub struct Marker {
    pub position: Vec3,
    pub visible: bool,
}

pub struct ArcPath {
    id: PathId,
    route: Route,
    curve: CubicBezier,
    arc_height: f32,
    line: Tube,
    hitbox: Tube,
    draw_range: DrawRange,
    marker: Marker,
    total: usize,
    reveal_count: usize,
    conceal_count: usize,
    animation_speed: usize,
    min_pause: usize,
    animating: bool,
    hovered: bool,
    phase: PathPhase,
    on_dispose: Option<DisposeCallback>,
}

impl ArcPath {
    /// Build the arc for `route` on a globe of `radius`
    pub fn new(id: PathId, route: Route, radius: f64) -> Self {
        let start = route.start.point().to_vector(radius);
        let end = route.end.point().to_vector(radius);

        let distance = start.distance(end) as f64;
        let ceiling = if distance > 1.8 * radius {
            2.0
        } else if distance > 1.4 * radius {
            1.7
        } else {
            1.6
        };
        let arc_height = normalize(distance, 0.0, 2.0 * radius, radius, ceiling);

        let mid = route
            .start
            .point()
            .midpoint(route.end.point())
            .to_vector(radius * arc_height);
        let interim = CubicBezier::new(start, mid, mid, end);
        let arc_height = arc_height as f32;
        let control1 = interim.point(CONTROL_T1) * arc_height;
        let control2 = interim.point(CONTROL_T2) * arc_height;
        let curve = CubicBezier::new(start, control1, control2, end);

        let segments = (100.0 * curve.length()) as usize;
        let line = Tube::new(&curve, segments, LINE_RADIUS, RADIAL_SEGMENTS);
        let hitbox = Tube::new(&curve, segments, HITBOX_RADIUS, RADIAL_SEGMENTS);
        let total = line.index_count();

        // comparable wall-clock duration regardless of arc length
        let animation_speed = (((2.0 * curve.length()).ceil() as usize) * 3).max(1);
        let min_pause = animation_speed * 30;

        trace!(%id, label = %route.label, segments, total, animation_speed, "arc path built");

        Self {
            id,
            route,
            marker: Marker { position: curve.point_at(0.0), visible: true },
            curve,
            arc_height,
            line,
            hitbox,
            draw_range: DrawRange::NONE,
            total,
            reveal_count: 0,
            conceal_count: 0,
            animation_speed,
            min_pause,
            animating: true,
            hovered: false,
            phase: PathPhase::Revealing,
            on_dispose: None,
        }
    }

    /// Called once, with this path's id, when the path finishes concealing
    pub fn on_dispose(mut self, callback: impl FnOnce(PathId) + 'static) -> Self {
        self.on_dispose = Some(Box::new(callback));
        self
    }

    pub fn id(&self) -> PathId {
        self.id
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn label(&self) -> &str {
        &self.route.label
    }

    pub fn curve(&self) -> &CubicBezier {
        &self.curve
    }

    pub fn arc_height(&self) -> f32 {
        self.arc_height
    }

    pub fn line(&self) -> &Tube {
        &self.line
    }

    pub fn hitbox(&self) -> &Tube {
        &self.hitbox
    }

    pub fn draw_range(&self) -> DrawRange {
        self.draw_range
    }

    pub fn marker(&self) -> Marker {
        self.marker
    }

    pub fn phase(&self) -> PathPhase {
        self.phase
    }

    pub fn total_indices(&self) -> usize {
        self.total
    }

    pub fn reveal_count(&self) -> usize {
        self.reveal_count
    }

    pub fn conceal_count(&self) -> usize {
        self.conceal_count
    }

    pub fn animation_speed(&self) -> usize {
        self.animation_speed
    }

    pub fn min_pause(&self) -> usize {
        self.min_pause
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Line and marker colour for the current hover state
    pub fn color(&self, normal: Rgb, highlight: Rgb) -> Rgb {
        if self.hovered {
            highlight
        } else {
            normal
        }
    }

    /// Freeze and highlight (or release) the path
    pub fn set_hover(&mut self, hovered: bool) {
        self.hovered = hovered;
        self.animating = !hovered;
    }

    /// Hit distance against the drawn part of the hitbox tube
    pub fn raycast(&self, ray: &Ray) -> Option<f32> {
        if self.phase == PathPhase::Disposed {
            return None;
        }
        self.hitbox.raycast(ray, self.draw_range)
    }

    /// Advance one animation frame
    pub fn tick(&mut self) -> PathPhase {
        if self.phase == PathPhase::Disposed {
            return self.phase;
        }

        if self.animating {
            self.reveal_count += self.animation_speed;
        }

        match self.phase {
            PathPhase::Revealing => {
                if self.reveal_count >= self.total {
                    self.marker.visible = false;
                    self.draw_range = DrawRange::head(self.total);
                    self.phase = PathPhase::Pausing;
                } else {
                    let u = normalize(self.reveal_count as f64, 0.0, self.total as f64, 0.0, 1.0);
                    self.marker.position = self.curve.point_at(u as f32);
                    self.draw_range = DrawRange::head(self.reveal_count);
                }
            }
            PathPhase::Pausing => {
                if self.reveal_count >= self.total + self.min_pause {
                    self.phase = PathPhase::Concealing;
                    self.conceal();
                }
            }
            PathPhase::Concealing => self.conceal(),
            PathPhase::Disposed => {}
        }

        self.phase
    }

    fn conceal(&mut self) {
        if self.animating {
            self.conceal_count += self.animation_speed;
        }
        self.draw_range = DrawRange::tail(self.conceal_count);

        if self.conceal_count >= self.total {
            self.dispose();
        }
    }

    fn dispose(&mut self) {
        self.phase = PathPhase::Disposed;
        self.draw_range = DrawRange::NONE;
        self.marker.visible = false;
        self.line.release();
        self.hitbox.release();

        trace!(id = %self.id, label = %self.route.label, "arc path disposed");
        if let Some(callback) = self.on_dispose.take() {
            callback(self.id);
        }
    }
}

impl fmt::Debug for ArcPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArcPath")
            .field("id", &self.id)
            .field("label", &self.route.label)
            .field("phase", &self.phase)
            .field("reveal_count", &self.reveal_count)
            .field("conceal_count", &self.conceal_count)
            .field("total", &self.total)
            .finish()
    }
}
