//! Glyph fingerprinting for font engine regression testing.
//!
//! For every glyph of a face, the engine loads and rasterizes the glyph and
//! the result is reduced to a shape complexity, a horizontal and vertical
//! acutance and an MD5 of the bitmap. Diffing reports from two engine or
//! font versions reveals what changed.

pub mod acutance;
pub mod digest;
pub mod engine;
mod error;
pub mod options;
mod pen;
pub mod raster;
pub mod report;
pub mod shape;
mod walker;

pub use acutance::Acutance;
pub use digest::ContentDigest;
pub use engine::{Bitmap, Engine, FontFace, LoadFlags, RenderMode};
pub use error::{EngineError, Error, OutlineError, RasterError};
pub use options::{GlyphRange, LintOptions};
pub use raster::{OwnedRaster, RasterBuffer};
pub use report::{FaceSummary, GlyphOutcome, GlyphRecord, GlyphReport, GlyphReportDriver};
pub use shape::{BoundingBox, GlyphFormat, Outline, Point, Shape};
pub use walker::Session;
