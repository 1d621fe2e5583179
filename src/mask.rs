//! Land/ocean mask sampled from an equirectangular world map
//!
//! Only the alpha channel of the image is kept. Pixel (x, y) maps linearly to
//! (longitude, latitude) with the top-left corner at (-180, 90).

use crate::error::{GlobeError, Result};
use std::io::Read;
use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Alpha above which a pixel counts as land
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 90;

/// Maximum size for a downloaded mask (10MB)
const MAX_MASK_SIZE: u64 = 10 * 1024 * 1024;

pub struct VisibilityMask {
    width: usize,
    height: usize,
    alpha: Vec<u8>,
    threshold: u8,
}

impl VisibilityMask {
    /// Build a mask from a row-major alpha buffer.
    ///
    /// Panics if `alpha.len() != width * height` or either side is zero.
    pub fn from_alpha(width: usize, height: usize, alpha: Vec<u8>) -> Self {
        assert!(width > 0 && height > 0, "mask must not be empty");
        assert_eq!(alpha.len(), width * height, "alpha buffer size mismatch");
        Self {
            width,
            height,
            alpha,
            threshold: DEFAULT_ALPHA_THRESHOLD,
        }
    }

    /// Mask that reports every point as visible
    pub fn opaque(width: usize, height: usize) -> Self {
        Self::from_alpha(width, height, vec![u8::MAX; width * height])
    }

    /// Decode a mask from a file path, `file://` URL or `http(s)://` URL
    pub fn load(source: &str) -> Result<Self> {
        let bytes = read_source(source)?;
        let image = image::load_from_memory(&bytes).map_err(|e| GlobeError::asset(source, e))?;
        let rgba = image.to_rgba8();
        let (width, height) = (rgba.width() as usize, rgba.height() as usize);
        if width == 0 || height == 0 {
            return Err(GlobeError::asset(source, "image has no pixels"));
        }

        let alpha = rgba.pixels().map(|p| p.0[3]).collect();
        Ok(Self::from_alpha(width, height, alpha))
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// True when the pixel under (lat, long) is land
    pub fn is_visible(&self, lat: f64, long: f64) -> bool {
        let (x, y) = self.pixel_for(lat, long);
        self.alpha[x + y * self.width] > self.threshold
    }

    /// Fraction of pixels that count as land
    pub fn coverage(&self) -> f64 {
        let land = self.alpha.iter().filter(|&&a| a > self.threshold).count();
        land as f64 / self.alpha.len() as f64
    }

    fn pixel_for(&self, lat: f64, long: f64) -> (usize, usize) {
        let x = ((long + 180.0) / 360.0 * self.width as f64).floor();
        let y = ((90.0 - lat) / 180.0 * self.height as f64).floor();
        // `as usize` saturates negatives to 0; the upper edge needs clamping
        let x = (x as usize).min(self.width - 1);
        let y = (y as usize).min(self.height - 1);
        (x, y)
    }
}

/// Background decode of a mask; the globe waits on it before plotting dots
pub struct MaskLoader {
    source: String,
    handle: JoinHandle<Result<VisibilityMask>>,
}

impl MaskLoader {
    pub fn spawn(source: impl Into<String>) -> Self {
        let source = source.into();
        let thread_source = source.clone();
        let handle = thread::spawn(move || VisibilityMask::load(&thread_source));
        Self { source, handle }
    }

    /// Block until the mask is decoded
    pub fn wait(self) -> Result<VisibilityMask> {
        self.handle
            .join()
            .map_err(|_| GlobeError::asset(self.source, "mask loader thread panicked"))?
    }
}

fn read_source(source: &str) -> Result<Vec<u8>> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let response = ureq::get(source)
            .timeout(Duration::from_secs(10))
            .call()
            .map_err(|e| GlobeError::asset(source, e))?;

        if let Some(len) = response
            .header("Content-Length")
            .and_then(|s| s.parse::<u64>().ok())
        {
            if len > MAX_MASK_SIZE {
                return Err(GlobeError::asset(source, format!("{len} bytes exceeds size limit")));
            }
        }

        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_MASK_SIZE)
            .read_to_end(&mut bytes)
            .map_err(|e| GlobeError::asset(source, e))?;
        Ok(bytes)
    } else {
        let path = source.strip_prefix("file://").unwrap_or(source);
        std::fs::read(Path::new(path)).map_err(|e| GlobeError::asset(source, e))
    }
}
