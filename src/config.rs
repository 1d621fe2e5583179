use crate::colors::Palette;
use crate::field::FieldParams;
use crate::mask::DEFAULT_ALPHA_THRESHOLD;
use std::path::PathBuf;
use std::time::Duration;

/// Bounds on the seconds spent per frame
const MIN_FRAME_TIME: f32 = 0.005;
const MAX_FRAME_TIME: f32 = 1.0;
const DEFAULT_FRAME_TIME: f32 = 0.03;

/// Configuration for the globe and its animation
#[derive(Clone, Debug)]
pub struct GlobeConfig {
    pub radius: f64,
    pub rows: u32,
    pub dot_density: f64,
    pub alpha_threshold: u8,
    pub max_paths: usize,
    pub spawn_interval: Duration,
    pub route_count: usize,
    pub idle_rotation_deg: f32,   // Per frame while nothing is hovered
    pub initial_rotation_deg: f32, // 255 puts Africa in front
    pub camera_distance: f32,
    pub frame_time: f32,
    pub seed: Option<u64>,
    pub mask: Option<String>,       // Path or URL; None uses built-in outlines
    pub cities: Option<PathBuf>,    // JSON dataset; None uses built-in cities
    pub palette: Palette,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            rows: 200,
            dot_density: 50.0,
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
            max_paths: 12,
            spawn_interval: Duration::from_millis(200),
            route_count: 150,
            idle_rotation_deg: 0.1,
            initial_rotation_deg: 255.0,
            camera_distance: 8.0,
            frame_time: DEFAULT_FRAME_TIME,
            seed: None,
            mask: None,
            cities: None,
            palette: Palette::default(),
        }
    }
}

impl GlobeConfig {
    pub fn field_params(&self) -> FieldParams {
        FieldParams {
            rows: self.rows,
            density: self.dot_density,
            radius: self.radius,
        }
    }

    /// Frame time as a duration, clamped to 5ms..=1s
    pub fn frame_duration(&self) -> Duration {
        let secs = if self.frame_time.is_nan() {
            DEFAULT_FRAME_TIME
        } else {
            self.frame_time.clamp(MIN_FRAME_TIME, MAX_FRAME_TIME)
        };
        Duration::from_secs_f32(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_frame_time(frame_time: f32) -> Duration {
        GlobeConfig { frame_time, ..GlobeConfig::default() }.frame_duration()
    }

    #[test]
    fn frame_duration_is_bounded() {
        assert_eq!(with_frame_time(0.03), Duration::from_secs_f32(0.03));
        assert_eq!(with_frame_time(0.0), Duration::from_secs_f32(MIN_FRAME_TIME));
        assert_eq!(with_frame_time(-4.0), Duration::from_secs_f32(MIN_FRAME_TIME));
        assert_eq!(with_frame_time(1e30), Duration::from_secs(1));
        assert_eq!(with_frame_time(f32::INFINITY), Duration::from_secs(1));
        assert_eq!(with_frame_time(f32::NAN), Duration::from_secs_f32(DEFAULT_FRAME_TIME));
    }
}
