//! The globe scene: dot field, live arcs, camera and pointer state

use crate::camera::PerspectiveCamera;
use crate::cities::Route;
use crate::config::GlobeConfig;
use crate::continents::outline_mask;
use crate::error::Result;
use crate::field::{generate_dot_field, DotField};
use crate::interaction::{Hit, Interaction, PointerState, Tooltip};
use crate::mask::{MaskLoader, VisibilityMask};
use crate::path::PathId;
use crate::scheduler::{PathRegistry, PathScheduler};
use glam::Mat4;
use std::time::Instant;
use tracing::{debug, info};

/// Size of the raster built from the compiled-in continent outlines
const OUTLINE_MASK_SIZE: (usize, usize) = (720, 360);

/// Terminal cells are roughly twice as tall as they are wide
pub const CELL_ASPECT: f32 = 2.0;

pub struct Globe {
    config: GlobeConfig,
    field: DotField,
    registry: PathRegistry,
    scheduler: PathScheduler,
    camera: PerspectiveCamera,
    rotation: f32,
    interaction: Interaction,
    viewport: (u16, u16),
    last_hit: Option<Hit>,
    disposed: bool,
}

impl Globe {
    /// Load the configured mask (in the background) and build the globe.
    /// Without a mask source the continent outlines are used.
    pub fn load(config: GlobeConfig, routes: Vec<Route>) -> Result<Self> {
        let mask = load_mask(&config)?;
        Ok(Self::new(config, mask, routes))
    }

    pub fn new(config: GlobeConfig, mask: VisibilityMask, routes: Vec<Route>) -> Self {
        let mask = mask.with_threshold(config.alpha_threshold);
        info!(
            width = mask.width(),
            height = mask.height(),
            coverage = mask.coverage(),
            "visibility mask ready"
        );

        let field = generate_dot_field(&mask, &config.field_params());
        let registry = PathRegistry::new(config.max_paths, config.radius);
        let scheduler = PathScheduler::new(routes, config.spawn_interval);
        let camera = PerspectiveCamera::looking_at_origin(config.camera_distance, 1.0);
        let interaction = Interaction::new(config.idle_rotation_deg);
        let rotation = config.initial_rotation_deg.to_radians();

        Self {
            config,
            field,
            registry,
            scheduler,
            camera,
            rotation,
            interaction,
            viewport: (0, 0),
            last_hit: None,
            disposed: false,
        }
    }

    /// One frame: spawn due paths, animate, then resolve the pointer
    pub fn update(&mut self, now: Instant) {
        if self.disposed {
            return;
        }

        self.scheduler.poll(now, &mut self.registry);
        self.registry.tick_all();
        self.last_hit = self.interaction.update(
            &self.camera,
            &mut self.rotation,
            self.config.radius as f32,
            &mut self.registry,
            self.viewport,
        );
    }

    /// Viewport size in terminal cells
    pub fn resize(&mut self, width: u16, height: u16) {
        self.viewport = (width, height);
        if width > 0 && height > 0 {
            self.camera
                .set_aspect(width as f32 / (height as f32 * CELL_ASPECT));
        }
    }

    pub fn pointer_moved(&mut self, column: u16, row: u16, width: u16, height: u16) {
        if (width, height) != self.viewport {
            self.resize(width, height);
        }
        self.interaction.pointer = PointerState::from_cell(column, row, width, height);
    }

    pub fn pointer_left(&mut self) {
        self.interaction.pointer = PointerState::default();
    }

    /// Stop spawning and drop every path. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.scheduler.stop();
        self.interaction.hover.release(&mut self.registry);
        self.interaction.tooltip.hide();
        self.registry.clear();
        self.disposed = true;
        debug!("globe disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn config(&self) -> &GlobeConfig {
        &self.config
    }

    pub fn field(&self) -> &DotField {
        &self.field
    }

    pub fn registry(&self) -> &PathRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &PathScheduler {
        &self.scheduler
    }

    /// Spawn from the route pool right away, outside the timer
    pub fn spawn_now(&mut self) -> Option<PathId> {
        if self.disposed {
            return None;
        }
        self.scheduler.spawn_next(&mut self.registry)
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    /// Zoom by moving the camera along its axis
    pub fn set_camera_distance(&mut self, distance: f32) {
        let near = self.config.radius as f32 + self.camera.near;
        self.camera.position.z = distance.clamp(near, self.camera.far * 0.5);
    }

    /// Rotation of the globe group about Y, radians
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn group_transform(&self) -> Mat4 {
        Mat4::from_rotation_y(self.rotation)
    }

    pub fn pointer(&self) -> &PointerState {
        &self.interaction.pointer
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.interaction.tooltip
    }

    pub fn hovered(&self) -> Option<PathId> {
        self.interaction.hover.current()
    }

    pub fn last_hit(&self) -> Option<Hit> {
        self.last_hit
    }

    pub fn viewport(&self) -> (u16, u16) {
        self.viewport
    }
}

/// The configured mask, or the continent outline raster when none is set
pub fn load_mask(config: &GlobeConfig) -> Result<VisibilityMask> {
    let mask = match &config.mask {
        Some(source) => {
            info!(source = %source, "loading visibility mask");
            MaskLoader::spawn(source.clone()).wait()?
        }
        None => {
            debug!("no mask configured, using continent outlines");
            outline_mask(OUTLINE_MASK_SIZE.0, OUTLINE_MASK_SIZE.1)
        }
    };
    Ok(mask.with_threshold(config.alpha_threshold))
}

impl Drop for Globe {
    fn drop(&mut self) {
        self.dispose();
    }
}
