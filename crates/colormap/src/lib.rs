//! # CropSense Colormap
//!
//! Color mapping and figure rendering for CropSense. A multi-stop
//! interpolation engine drives the red-yellow-green vegetation ramp and a
//! grayscale ramp; [`raster_to_rgba`] converts a `Raster<T>` into an RGBA
//! pixel buffer and [`render_figure`] composes the full PNG visualization
//! with a colorbar and title.
//!
//! ## Usage
//!
//! ```ignore
//! use cropsense_colormap::{ColormapParams, ColorScheme, render_figure};
//!
//! let params = ColormapParams::byte_scaled(ColorScheme::RedYellowGreen);
//! let figure = render_figure(&raster, &params, "NDVI 4.5, -74.1")?;
//! ```

mod figure;
mod glyphs;
mod render;
mod scheme;

pub use figure::{render_figure, FigureError, VisualizationArtifact};
pub use render::{raster_to_rgba, ColormapParams};
pub use scheme::{evaluate, ColorScheme, ColorStop, Rgb};
