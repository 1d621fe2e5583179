//! Drawing the globe into a terminal

use crate::braille::BrailleCanvas;
use crate::camera::{PerspectiveCamera, Ray};
use crate::colors::Palette;
use crate::globe::Globe;
use crate::help::{draw_panel, render_help_overlay, HELP_TEXT};
use crate::path::MARKER_RADIUS;
use crate::terminal::Terminal;
use glam::{Mat4, Vec2, Vec3};
use std::io;

/// Anything that can show a globe frame
pub trait Renderer {
    fn render(&mut self, globe: &Globe, camera: &PerspectiveCamera) -> io::Result<()>;
}

/// Lightest shade a dot on the limb is drawn with
const LIMB_SHADE: f32 = 0.35;

/// Draws dots, arcs and markers as braille, the globe body as cell
/// backgrounds and the tooltip as a boxed panel.
pub struct BrailleRenderer {
    term: Terminal,
    canvas: BrailleCanvas,
    show_help: bool,
    present: bool,
}

impl BrailleRenderer {
    /// Renderer that draws to the screen every frame
    pub fn new(term: Terminal) -> Self {
        Self::build(term, true)
    }

    /// Renderer that only fills the back buffer
    pub fn offscreen(term: Terminal) -> Self {
        Self::build(term, false)
    }

    fn build(term: Terminal, present: bool) -> Self {
        let (w, h) = term.size();
        Self {
            term,
            canvas: BrailleCanvas::new(w, h),
            show_help: false,
            present,
        }
    }

    pub fn terminal(&self) -> &Terminal {
        &self.term
    }

    pub fn resize(&mut self, width: u16, height: u16) -> io::Result<()> {
        self.term.resize(width, height);
        self.canvas.resize(width, height);
        if self.present {
            self.term.clear_screen()?;
        }
        Ok(())
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn is_help_visible(&self) -> bool {
        self.show_help
    }

    fn draw_body(&mut self, globe: &Globe, camera: &PerspectiveCamera, group: &Mat4) {
        let (columns, rows) = self.canvas.cell_size();
        let inverse = group.inverse();
        let radius = globe.config().radius as f32;
        let color = globe.config().palette.globe;

        for row in 0..rows {
            for column in 0..columns {
                let ndc = Vec2::new(
                    (column as f32 + 0.5) / columns as f32 * 2.0 - 1.0,
                    1.0 - (row as f32 + 0.5) / rows as f32 * 2.0,
                );
                let ray = camera.ray_from_ndc(ndc).transformed(&inverse);
                if ray.intersect_sphere(Vec3::ZERO, radius).is_some() {
                    self.canvas.fill_cell(column, row, color);
                }
            }
        }
    }

    fn draw_dots(&mut self, globe: &Globe, camera: &PerspectiveCamera, group: &Mat4) {
        let view_projection = camera.view_projection() * *group;
        let color = globe.config().palette.dot;

        for (position, normal) in globe.field().positions_and_normals() {
            let world = group.transform_point3(position);
            let to_camera = (camera.position - world).normalize_or_zero();
            let facing = group.transform_vector3(normal).dot(to_camera);
            if facing <= 0.0 {
                continue;
            }

            let ndc = view_projection.project_point3(position);
            let (x, y) = self.canvas.ndc_to_dot(ndc.x, ndc.y);
            let shade = LIMB_SHADE + (1.0 - LIMB_SHADE) * facing;
            self.canvas.plot(x, y, ndc.z, color.dim(shade));
        }
    }

    fn draw_paths(&mut self, globe: &Globe, camera: &PerspectiveCamera, group: &Mat4) {
        let view_projection = camera.view_projection() * *group;
        let radius = globe.config().radius as f32;
        let palette: &Palette = &globe.config().palette;
        let local_camera = group.inverse().transform_point3(camera.position);

        let visible = |point: Vec3| -> Option<(i32, i32, f32)> {
            let offset = point - local_camera;
            let distance = offset.length();
            let ray = Ray { origin: local_camera, direction: offset / distance.max(1e-6) };
            if ray
                .intersect_sphere(Vec3::ZERO, radius)
                .is_some_and(|t| t < distance - 1e-3)
            {
                return None;
            }
            let ndc = view_projection.project_point3(point);
            let (x, y) = self.canvas.ndc_to_dot(ndc.x, ndc.y);
            Some((x, y, ndc.z))
        };

        let mut segments = Vec::new();
        let mut markers = Vec::new();
        for path in globe.registry().iter() {
            let color = path.color(palette.path, palette.highlight);
            let line = path.line();
            let range = line.segment_range(path.draw_range());
            if !range.is_empty() {
                let centers = &line.centers()[range.start..=range.end.min(line.centers().len() - 1)];
                let points: Vec<_> = centers.iter().map(|&c| visible(c)).collect();
                for pair in points.windows(2) {
                    if let [Some(a), Some(b)] = pair {
                        segments.push((*a, *b, color));
                    }
                }
            }

            let marker = path.marker();
            if marker.visible {
                if let Some(at) = visible(marker.position) {
                    markers.push((at, color));
                }
            }
        }

        let (_, dot_height) = self.canvas.dot_size();
        let marker_dots = marker_radius_in_dots(camera, dot_height);
        for (a, b, color) in segments {
            self.canvas.line(a, b, color);
        }
        for ((x, y, depth), color) in markers {
            self.canvas.disc(x, y, marker_dots, depth, color);
        }
    }

    fn draw_tooltip(&mut self, globe: &Globe) {
        let tooltip = globe.tooltip();
        if let Some(label) = tooltip.label() {
            let palette = &globe.config().palette;
            let (x, y) = tooltip.position();
            draw_panel(
                &mut self.term,
                x,
                y,
                &[label],
                palette.tooltip_border.to_color(),
                palette.tooltip_text.to_color(),
            );
        }
    }
}

/// Rough on-screen size of a marker sphere at the globe's distance
fn marker_radius_in_dots(camera: &PerspectiveCamera, dot_height: usize) -> i32 {
    let distance = camera.position.distance(camera.target).max(1e-3);
    let visible_height = 2.0 * distance * (camera.fov_y * 0.5).tan();
    let dots = MARKER_RADIUS / visible_height * dot_height as f32;
    (dots.round() as i32).clamp(0, 3)
}

impl Renderer for BrailleRenderer {
    fn render(&mut self, globe: &Globe, camera: &PerspectiveCamera) -> io::Result<()> {
        let (w, h) = self.term.size();
        self.canvas.resize(w, h);
        self.canvas.clear();
        self.term.clear();

        let group = globe.group_transform();
        self.draw_body(globe, camera, &group);
        self.draw_dots(globe, camera, &group);
        self.draw_paths(globe, camera, &group);
        self.canvas.blit(&mut self.term);

        self.draw_tooltip(globe);
        if self.show_help {
            let palette = &globe.config().palette;
            render_help_overlay(&mut self.term, HELP_TEXT, palette.tooltip_border, palette.tooltip_text);
        }

        if self.present {
            self.term.present()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cities::{City, Route};
    use crate::config::GlobeConfig;
    use crate::mask::VisibilityMask;
    use crate::path::PathPhase;

    fn config() -> GlobeConfig {
        GlobeConfig { rows: 60, dot_density: 20.0, max_paths: 2, ..GlobeConfig::default() }
    }

    fn count_braille(term: &Terminal) -> usize {
        let (_, h) = term.size();
        (0..h)
            .map(|y| term.row_text(y).chars().filter(|c| ('\u{2801}'..='\u{28ff}').contains(c)).count())
            .sum()
    }

    #[test]
    fn empty_mask_draws_only_the_body() {
        let mut globe = Globe::new(config(), VisibilityMask::from_alpha(2, 1, vec![0, 0]), Vec::new());
        globe.resize(60, 20);
        let mut renderer = BrailleRenderer::offscreen(Terminal::offscreen(60, 20));
        renderer.render(&globe, globe.camera()).unwrap();

        assert_eq!(count_braille(renderer.terminal()), 0);
        let center = renderer.terminal().get(30, 10).unwrap();
        assert_eq!(center.bg, Some(globe.config().palette.globe.to_color()));
        let corner = renderer.terminal().get(0, 0).unwrap();
        assert_eq!(corner.bg, None);
    }

    #[test]
    fn opaque_mask_fills_the_disc_with_dots() {
        let mut globe = Globe::new(config(), VisibilityMask::opaque(4, 2), Vec::new());
        globe.resize(60, 20);
        let mut renderer = BrailleRenderer::offscreen(Terminal::offscreen(60, 20));
        renderer.render(&globe, globe.camera()).unwrap();

        assert!(count_braille(renderer.terminal()) > 20);
        assert_eq!(renderer.terminal().row_text(0).trim(), "");
    }

    #[test]
    fn help_overlay_is_drawn() {
        let routes = vec![Route::new(
            City { city: "A".into(), country: "X".into(), lat: 0.0, long: -80.0 },
            City { city: "B".into(), country: "Y".into(), lat: 10.0, long: -100.0 },
        )];
        let mut globe = Globe::new(config(), VisibilityMask::from_alpha(1, 1, vec![0]), routes);
        globe.resize(80, 30);
        globe.spawn_now();

        let mut renderer = BrailleRenderer::offscreen(Terminal::offscreen(80, 30));
        renderer.toggle_help();
        renderer.render(&globe, globe.camera()).unwrap();
        let text: String = (0..30).map(|y| renderer.terminal().row_text(y)).collect();
        assert!(text.contains("DOTGLOBE"));
        assert!(globe.registry().iter().all(|p| p.phase() == PathPhase::Revealing));
    }

    #[test]
    fn marker_size_is_small() {
        let camera = PerspectiveCamera::looking_at_origin(8.0, 1.0);
        assert!(marker_radius_in_dots(&camera, 120) <= 1);
        assert!(marker_radius_in_dots(&camera, 4000) >= 1);
    }
}
