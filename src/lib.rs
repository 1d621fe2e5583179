//! Rotating dotted globe with animated arcs between cities, drawn in the
//! terminal with braille characters.

pub mod app;
pub mod braille;
pub mod camera;
pub mod cities;
pub mod colors;
pub mod config;
pub mod continents;
pub mod curve;
pub mod error;
pub mod field;
pub mod geo;
pub mod globe;
pub mod help;
pub mod interaction;
pub mod logging;
pub mod mask;
pub mod path;
pub mod render;
pub mod scheduler;
pub mod settings;
pub mod terminal;

pub use error::{GlobeError, Result};
pub use globe::Globe;
pub use render::Renderer;
