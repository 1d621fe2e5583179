//! Pointer picking, hover highlighting and the route tooltip

use crate::camera::{PerspectiveCamera, Ray};
use crate::path::PathId;
use crate::scheduler::PathRegistry;
use glam::{Mat4, Vec2, Vec3};
use tracing::debug;

/// Where the pointer sits before the first move event, far outside the view
pub const OFF_SCREEN: Vec2 = Vec2::new(-100.0, -100.0);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerState {
    /// Normalized device coordinates, y up
    pub ndc: Vec2,
    pub column: u16,
    pub row: u16,
}

impl Default for PointerState {
    fn default() -> Self {
        Self { ndc: OFF_SCREEN, column: 0, row: 0 }
    }
}

impl PointerState {
    /// Pointer over terminal cell (`column`, `row`) of a `width` x `height` view
    pub fn from_cell(column: u16, row: u16, width: u16, height: u16) -> Self {
        if width == 0 || height == 0 {
            return Self::default();
        }
        let x = (column as f32 + 0.5) / width as f32 * 2.0 - 1.0;
        let y = -((row as f32 + 0.5) / height as f32 * 2.0 - 1.0);
        Self { ndc: Vec2::new(x, y), column, row }
    }

    pub fn is_on_screen(&self) -> bool {
        self.ndc.x.abs() <= 1.0 && self.ndc.y.abs() <= 1.0
    }
}

/// Route label shown next to the pointer while a path is hovered
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tooltip {
    label: Option<String>,
    column: u16,
    row: u16,
}

impl Tooltip {
    /// Box width in cells for a label, border and padding included
    pub fn box_width(label: &str) -> u16 {
        (label.chars().count() + 4).min(u16::MAX as usize) as u16
    }

    pub const BOX_HEIGHT: u16 = 3;

    /// Show `label` just below and right of the pointer, kept inside the view
    pub fn show(&mut self, label: &str, pointer: &PointerState, width: u16, height: u16) {
        let box_width = Self::box_width(label);
        let max_column = width.saturating_sub(box_width);
        let max_row = height.saturating_sub(Self::BOX_HEIGHT);

        self.column = pointer.column.saturating_add(2).min(max_column);
        self.row = pointer.row.saturating_add(1).min(max_row);
        if self.label.as_deref() != Some(label) {
            self.label = Some(label.to_string());
        }
    }

    pub fn hide(&mut self) {
        self.label = None;
    }

    pub fn is_visible(&self) -> bool {
        self.label.is_some()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Top-left cell of the tooltip box
    pub fn position(&self) -> (u16, u16) {
        (self.column, self.row)
    }
}

/// Nearest thing under the pointer
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Hit {
    Globe(f32),
    Path(PathId, f32),
}

impl Hit {
    pub fn distance(&self) -> f32 {
        match *self {
            Hit::Globe(d) | Hit::Path(_, d) => d,
        }
    }
}

/// Intersect a globe-local ray with the globe body and every path hitbox.
/// The globe occludes paths behind it.
pub fn pick(ray: &Ray, globe_radius: f32, registry: &PathRegistry) -> Option<Hit> {
    let globe = ray.intersect_sphere(Vec3::ZERO, globe_radius).map(Hit::Globe);

    registry
        .iter()
        .filter_map(|path| path.raycast(ray).map(|d| Hit::Path(path.id(), d)))
        .chain(globe)
        .min_by(|a, b| a.distance().total_cmp(&b.distance()))
}

/// Tracks the single highlighted path
#[derive(Debug, Default)]
pub struct HoverTracker {
    current: Option<PathId>,
}

impl HoverTracker {
    pub fn current(&self) -> Option<PathId> {
        self.current
    }

    /// Highlight `id`, releasing the previous path. Returns false if `id` is
    /// not live.
    pub fn hover(&mut self, id: PathId, registry: &mut PathRegistry) -> bool {
        if self.current == Some(id) {
            if registry.get(id).is_some() {
                return true;
            }
            self.current = None;
            return false;
        }

        self.release(registry);
        match registry.get_mut(id) {
            Some(path) => {
                path.set_hover(true);
                debug!(%id, label = path.label(), "path hovered");
                self.current = Some(id);
                true
            }
            None => false,
        }
    }

    /// Un-highlight the current path, if it is still live
    pub fn release(&mut self, registry: &mut PathRegistry) {
        if let Some(id) = self.current.take() {
            if let Some(path) = registry.get_mut(id) {
                path.set_hover(false);
                debug!(%id, "path released");
            }
        }
    }

    /// Drop a current path that has left the registry
    pub fn forget_stale(&mut self, registry: &PathRegistry) {
        if self.current.is_some_and(|id| registry.get(id).is_none()) {
            self.current = None;
        }
    }
}

/// Per-frame pointer handling for the globe
#[derive(Debug)]
pub struct Interaction {
    pub pointer: PointerState,
    pub hover: HoverTracker,
    pub tooltip: Tooltip,
    idle_rotation: f32,
}

impl Interaction {
    pub fn new(idle_rotation_deg: f32) -> Self {
        Self {
            pointer: PointerState::default(),
            hover: HoverTracker::default(),
            tooltip: Tooltip::default(),
            idle_rotation: idle_rotation_deg.to_radians(),
        }
    }

    /// Pick under the pointer, update hover and tooltip, and spin the globe
    /// (`rotation`, radians about Y) when no path is hovered.
    pub fn update(
        &mut self,
        camera: &PerspectiveCamera,
        rotation: &mut f32,
        globe_radius: f32,
        registry: &mut PathRegistry,
        viewport: (u16, u16),
    ) -> Option<Hit> {
        self.hover.forget_stale(registry);

        let ray = camera.ray_from_ndc(self.pointer.ndc);
        let local = ray.transformed(&Mat4::from_rotation_y(*rotation).inverse());
        let hit = pick(&local, globe_radius, registry);

        let hovered = match hit {
            Some(Hit::Path(id, _)) if self.hover.hover(id, registry) => registry.get(id),
            _ => None,
        };

        match hovered {
            Some(path) => {
                self.tooltip.show(path.label(), &self.pointer, viewport.0, viewport.1);
            }
            None => {
                self.hover.release(registry);
                self.tooltip.hide();
                *rotation += self.idle_rotation;
            }
        }
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cities::{City, Route};

    fn route(a: (f64, f64), b: (f64, f64), name: &str) -> Route {
        let city = |n: String, (lat, long): (f64, f64)| City { city: n, country: "X".into(), lat, long };
        Route::new(city(format!("{name}-a"), a), city(format!("{name}-b"), b))
    }

    fn revealed(registry: &mut PathRegistry, id: PathId) {
        while registry.get(id).unwrap().phase() == crate::path::PathPhase::Revealing {
            registry.get_mut(id).unwrap().tick();
        }
    }

    #[test]
    fn pointer_starts_off_screen() {
        let pointer = PointerState::default();
        assert_eq!(pointer.ndc, Vec2::new(-100.0, -100.0));
        assert!(!pointer.is_on_screen());
    }

    #[test]
    fn pointer_maps_cells_to_ndc() {
        let center = PointerState::from_cell(50, 20, 101, 41);
        assert!(center.ndc.length() < 1e-6);

        let corner = PointerState::from_cell(0, 0, 100, 40);
        assert!(corner.ndc.x < -0.98 && corner.ndc.y > 0.97);
        assert!(corner.is_on_screen());
        assert_eq!(PointerState::from_cell(3, 3, 0, 10), PointerState::default());
    }

    #[test]
    fn tooltip_stays_in_view() {
        let mut tooltip = Tooltip::default();
        let label = "Lagos, Nigeria To Oslo, Norway";
        tooltip.show(label, &PointerState::from_cell(78, 23, 80, 24), 80, 24);
        let (column, row) = tooltip.position();
        assert!(column + Tooltip::box_width(label) <= 80);
        assert!(row + Tooltip::BOX_HEIGHT <= 24);

        tooltip.show(label, &PointerState::from_cell(5, 5, 80, 24), 80, 24);
        assert_eq!(tooltip.position(), (7, 6));
        assert_eq!(tooltip.label(), Some(label));

        tooltip.hide();
        assert!(!tooltip.is_visible());
    }

    #[test]
    fn globe_occludes_paths_behind_it() {
        let mut registry = PathRegistry::new(4, 1.0);
        let id = registry.insert(route((0.0, -10.0), (0.0, 10.0), "back")).unwrap();
        revealed(&mut registry, id);
        let apex = registry.get(id).unwrap().curve().point_at(0.5);

        // from outside, straight at the apex: path first
        let front = Ray { origin: apex * 4.0, direction: -apex.normalize() };
        assert!(matches!(pick(&front, 1.0, &registry), Some(Hit::Path(hit, _)) if hit == id));

        // from the opposite side the globe is in the way
        let back = Ray { origin: -apex * 4.0, direction: apex.normalize() };
        assert!(matches!(pick(&back, 1.0, &registry), Some(Hit::Globe(_))));

        let miss = Ray { origin: Vec3::new(0.0, 10.0, 10.0), direction: Vec3::Y };
        assert_eq!(pick(&miss, 1.0, &registry), None);
    }

    #[test]
    fn only_one_path_is_hovered() {
        let mut registry = PathRegistry::new(4, 1.0);
        let a = registry.insert(route((0.0, 0.0), (10.0, 10.0), "a")).unwrap();
        let b = registry.insert(route((20.0, 0.0), (30.0, 10.0), "b")).unwrap();
        let mut hover = HoverTracker::default();

        assert!(hover.hover(a, &mut registry));
        assert!(registry.get(a).unwrap().is_hovered());

        assert!(hover.hover(b, &mut registry));
        assert!(!registry.get(a).unwrap().is_hovered());
        assert!(registry.get(b).unwrap().is_hovered());
        assert_eq!(hover.current(), Some(b));

        hover.release(&mut registry);
        assert!(!registry.get(b).unwrap().is_hovered());
        assert_eq!(hover.current(), None);
    }

    #[test]
    fn stale_hover_is_forgotten() {
        let mut registry = PathRegistry::new(4, 1.0);
        let a = registry.insert(route((0.0, 0.0), (10.0, 10.0), "a")).unwrap();
        let mut hover = HoverTracker::default();
        hover.hover(a, &mut registry);

        registry.clear();
        hover.forget_stale(&registry);
        assert_eq!(hover.current(), None);
        assert!(!hover.hover(a, &mut registry));
    }

    #[test]
    fn idle_rotation_only_without_hover() {
        let camera = PerspectiveCamera::looking_at_origin(8.0, 1.0);
        let mut registry = PathRegistry::new(4, 1.0);
        let mut interaction = Interaction::new(0.1);
        let mut rotation = 0.0;

        interaction.update(&camera, &mut rotation, 1.0, &mut registry, (80, 24));
        assert!((rotation - 0.1f32.to_radians()).abs() < 1e-7);
        assert!(!interaction.tooltip.is_visible());

        // pointer over the globe body still rotates
        interaction.pointer = PointerState::from_cell(40, 12, 81, 25);
        let hit = interaction.update(&camera, &mut rotation, 1.0, &mut registry, (80, 24));
        assert!(matches!(hit, Some(Hit::Globe(_))));
        assert!((rotation - 0.2f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn hovering_a_path_freezes_rotation_and_shows_label() {
        let camera = PerspectiveCamera::looking_at_origin(8.0, 1.0);
        let mut registry = PathRegistry::new(4, 1.0);
        // long 0 lies on +X, which faces the camera once the group turns -90 degrees
        let id = registry.insert(route((-10.0, 0.0), (10.0, 0.0), "front")).unwrap();
        revealed(&mut registry, id);

        let mut rotation = -std::f32::consts::FRAC_PI_2;
        let local_apex = registry.get(id).unwrap().curve().point_at(0.5);
        let world_apex = Mat4::from_rotation_y(rotation).transform_point3(local_apex);
        let ndc = camera.project(world_apex).truncate();

        let mut interaction = Interaction::new(0.1);
        interaction.pointer = PointerState { ndc, column: 10, row: 5 };
        let hit = interaction.update(&camera, &mut rotation, 1.0, &mut registry, (80, 24));

        assert!(matches!(hit, Some(Hit::Path(hit, _)) if hit == id), "{hit:?}");
        assert_eq!(rotation, -std::f32::consts::FRAC_PI_2);
        assert_eq!(interaction.hover.current(), Some(id));
        assert!(registry.get(id).unwrap().is_hovered());
        assert_eq!(interaction.tooltip.label(), Some("front-a, X To front-b, X"));

        interaction.pointer = PointerState::default();
        interaction.update(&camera, &mut rotation, 1.0, &mut registry, (80, 24));
        assert_eq!(interaction.hover.current(), None);
        assert!(!registry.get(id).unwrap().is_hovered());
        assert!(!interaction.tooltip.is_visible());
    }
}
