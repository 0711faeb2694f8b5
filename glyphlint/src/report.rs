//! Per glyph fingerprints.

use std::{fmt, io::Write, ops::RangeInclusive};

use crate::{
    acutance::Acutance,
    digest::ContentDigest,
    engine::{Bitmap, FontFace},
    error::{EngineError, Error},
    options::LintOptions,
    shape::{GlyphFormat, Shape},
};

/// Fingerprint of a glyph that made it through rasterization.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphRecord {
    pub shape: Shape,
    pub width: usize,
    pub rows: usize,
    pub acutance: Acutance,
    pub digest: ContentDigest,
}

/// What happened to one glyph.
#[derive(Clone, Debug, PartialEq)]
pub enum GlyphOutcome {
    LoadFailed(EngineError),
    RenderFailed { shape: Shape, error: EngineError },
    /// Bitmap normalization failed. Not counted as a failure.
    ConvertFailed { shape: Shape, error: EngineError },
    Analyzed(GlyphRecord),
}

impl GlyphOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::LoadFailed(_) | Self::RenderFailed { .. })
    }
}

/// One line of the report.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphReport {
    pub index: u32,
    pub outcome: GlyphOutcome,
}

impl fmt::Display for GlyphReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:5} ", self.index)?;
        match &self.outcome {
            GlyphOutcome::LoadFailed(error) => write!(f, "loading {error}"),
            GlyphOutcome::RenderFailed { shape, error } => write!(f, "{shape}rendering {error}"),
            GlyphOutcome::ConvertFailed { shape, error } => write!(f, "{shape}converting {error}"),
            GlyphOutcome::Analyzed(record) => write!(
                f,
                "{}{:3}x{:<4} {}{}",
                record.shape, record.width, record.rows, record.acutance, record.digest
            ),
        }
    }
}

/// Failure tally for one face.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FaceSummary {
    pub fails: u32,
}

impl fmt::Display for FaceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fails {
            0 => f.write_str("  OK."),
            1 => f.write_str("  1 fail."),
            n => write!(f, "  {n} fails."),
        }
    }
}

/// Loads, renders and fingerprints glyphs of a face.
pub struct GlyphReportDriver<'a> {
    options: &'a LintOptions,
}

impl<'a> GlyphReportDriver<'a> {
    pub fn new(options: &'a LintOptions) -> Self {
        Self { options }
    }

    /// Checks a single glyph.
    ///
    /// Returns `None` in quiet mode once the glyph has loaded, since nothing
    /// past loading is examined then.
    pub fn check<F: FontFace>(&self, face: &mut F, index: u32) -> Option<GlyphReport> {
        let outcome = self.outcome(face, index)?;
        Some(GlyphReport { index, outcome })
    }

    fn outcome<F: FontFace>(&self, face: &mut F, index: u32) -> Option<GlyphOutcome> {
        if let Err(error) = face.load_glyph(index, self.options.load_flags) {
            return Some(GlyphOutcome::LoadFailed(error));
        }
        if self.options.quiet {
            return None;
        }
        let shape = examine(face, index);
        if let Err(error) = face.render_glyph(self.options.render_mode) {
            // bitmap glyphs may refuse to render but are still usable
            if face.glyph_format() != GlyphFormat::BITMAP {
                return Some(GlyphOutcome::RenderFailed { shape, error });
            }
        }
        let bitmap = match face.convert_bitmap() {
            Ok(bitmap) => bitmap,
            Err(error) => return Some(GlyphOutcome::ConvertFailed { shape, error }),
        };
        let raster = match bitmap.raster() {
            Ok(raster) => raster,
            Err(e) => {
                log::warn!("glyph {index}: {e}");
                return Some(GlyphOutcome::ConvertFailed {
                    shape,
                    error: EngineError::from(e),
                });
            }
        };
        Some(GlyphOutcome::Analyzed(GlyphRecord {
            shape,
            width: raster.width(),
            rows: raster.rows(),
            acutance: Acutance::analyze(&raster),
            digest: ContentDigest::compute(&raster),
        }))
    }

    /// Checks every glyph in `range`, writing a line per glyph to `out`.
    pub fn run<F: FontFace, W: Write + ?Sized>(
        &self,
        face: &mut F,
        range: RangeInclusive<u32>,
        out: &mut W,
    ) -> Result<FaceSummary, Error> {
        log::debug!("checking glyphs {range:?}");
        let mut summary = FaceSummary::default();
        for index in range {
            let Some(report) = self.check(face, index) else {
                continue;
            };
            if report.outcome.is_failure() {
                summary.fails += 1;
            }
            if !self.options.quiet {
                writeln!(out, "{report}")?;
            }
        }
        Ok(summary)
    }
}

fn examine<F: FontFace>(face: &F, index: u32) -> Shape {
    let format = face.glyph_format();
    if format != GlyphFormat::OUTLINE {
        return Shape::Image(format);
    }
    match face.outline() {
        Ok(outline) => Shape::examine(format, &outline),
        Err(e) => {
            log::warn!("glyph {index}: {e}");
            Shape::Void
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::codes;

    fn record() -> GlyphRecord {
        GlyphRecord {
            shape: Shape::Complexity(1.0),
            width: 12,
            rows: 7,
            acutance: Acutance {
                x: Some(2.0),
                y: None,
            },
            digest: ContentDigest::of_bytes(b""),
        }
    }

    #[test]
    fn analyzed_line() {
        let report = GlyphReport {
            index: 42,
            outcome: GlyphOutcome::Analyzed(record()),
        };
        assert_eq!(
            report.to_string(),
            "   42  1.00  12x7    2.0000   void D41D8CD98F00B204E9800998ECF8427E"
        );
    }

    #[test]
    fn failure_lines() {
        let error = EngineError::from_code(codes::INVALID_GLYPH_INDEX);
        let load = GlyphReport {
            index: 3,
            outcome: GlyphOutcome::LoadFailed(error.clone()),
        };
        assert_eq!(
            load.to_string(),
            "    3 loading error = 0x0010, invalid glyph index"
        );
        let render = GlyphReport {
            index: 3,
            outcome: GlyphOutcome::RenderFailed {
                shape: Shape::Void,
                error: error.clone(),
            },
        };
        assert_eq!(
            render.to_string(),
            "    3  void rendering error = 0x0010, invalid glyph index"
        );
        let convert = GlyphOutcome::ConvertFailed {
            shape: Shape::Image(GlyphFormat::BITMAP),
            error,
        };
        assert!(!convert.is_failure());
        assert_eq!(
            GlyphReport {
                index: 12345,
                outcome: convert
            }
            .to_string(),
            "12345  bits converting error = 0x0010, invalid glyph index"
        );
    }

    #[test]
    fn summary() {
        assert_eq!(FaceSummary { fails: 0 }.to_string(), "  OK.");
        assert_eq!(FaceSummary { fails: 1 }.to_string(), "  1 fail.");
        assert_eq!(FaceSummary { fails: 17 }.to_string(), "  17 fails.");
    }
}
