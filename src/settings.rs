use crate::colors::Palette;
use crate::config::GlobeConfig;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub globe: GlobeSettings,
}

/// `[globe]` table; every key is optional and overrides the built-in default
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GlobeSettings {
    pub rows: Option<u32>,
    pub dot_density: Option<f64>,
    pub alpha_threshold: Option<u8>,
    pub max_paths: Option<usize>,
    pub spawn_interval_ms: Option<u64>,
    pub route_count: Option<usize>,
    pub idle_rotation_deg: Option<f32>,
    pub initial_rotation_deg: Option<f32>,
    pub camera_distance: Option<f32>,
    pub frame_time: Option<f32>,
    pub seed: Option<u64>,
    pub mask: Option<String>,    // Path or http(s) URL of an equirectangular PNG
    pub cities: Option<PathBuf>, // JSON array of {city, country, lat, long}
    pub colors: Option<Palette>,
}

impl GlobeSettings {
    pub fn apply(&self, config: &mut GlobeConfig) {
        if let Some(v) = self.rows {
            config.rows = v;
        }
        if let Some(v) = self.dot_density {
            config.dot_density = v;
        }
        if let Some(v) = self.alpha_threshold {
            config.alpha_threshold = v;
        }
        if let Some(v) = self.max_paths {
            config.max_paths = v;
        }
        if let Some(ms) = self.spawn_interval_ms {
            config.spawn_interval = Duration::from_millis(ms);
        }
        if let Some(v) = self.route_count {
            config.route_count = v;
        }
        if let Some(v) = self.idle_rotation_deg {
            config.idle_rotation_deg = v;
        }
        if let Some(v) = self.initial_rotation_deg {
            config.initial_rotation_deg = v;
        }
        if let Some(v) = self.camera_distance {
            config.camera_distance = v;
        }
        if let Some(v) = self.frame_time {
            config.frame_time = v;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.mask.is_some() {
            config.mask = self.mask.clone();
        }
        if self.cities.is_some() {
            config.cities = self.cities.clone();
        }
        if let Some(palette) = self.colors {
            config.palette = palette;
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dotglobe")
            .join("config.toml")
    }
}
