//! Walks font files, their faces and glyphs, writing the report.

use std::{io::Write, path::Path};

use crate::{
    engine::{Engine, FontFace},
    error::Error,
    options::LintOptions,
    report::GlyphReportDriver,
};

const COLUMN_HEADER: &str = " GID  shape imgsize  Xacut  Yacut  MD5 hashsum";

/// A lint run: an engine, the settings and the stream the report goes to.
pub struct Session<'a, E, W> {
    engine: &'a E,
    options: &'a LintOptions,
    out: W,
}

impl<'a, E: Engine, W: Write> Session<'a, E, W> {
    pub fn new(engine: &'a E, options: &'a LintOptions, out: W) -> Self {
        Self {
            engine,
            options,
            out,
        }
    }

    /// Lints every face of every file in `paths`.
    ///
    /// Engine failures are written to the report and never end the run;
    /// only failing to write the report does.
    pub fn run<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<(), Error> {
        for path in paths {
            self.lint_file(path.as_ref())?;
        }
        self.out.flush()?;
        Ok(())
    }

    /// Lints every face of a single font file or collection.
    pub fn lint_file(&mut self, path: &Path) -> Result<(), Error> {
        writeln!(self.out, "{}:", path.display())?;
        let engine = self.engine;
        let mut face_index = 0;
        loop {
            let mut face = match engine.open_face(path, face_index) {
                Ok(face) => face,
                Err(error) => {
                    log::warn!("{}: face {face_index}: {error}", path.display());
                    writeln!(self.out, "  opening {error}")?;
                    return Ok(());
                }
            };
            log::debug!("{}: face {face_index}", path.display());
            self.lint_face(&mut face)?;
            face_index += 1;
            if face_index >= face.face_count() {
                face_index = 0;
            }
            drop(face);
            if face_index == 0 {
                return Ok(());
            }
        }
    }

    fn lint_face<F: FontFace>(&mut self, face: &mut F) -> Result<(), Error> {
        let family = face.family_name();
        let style = face.style_name();
        let family = family.as_deref().unwrap_or("(null)");
        let style = style.as_deref().unwrap_or("(null)");
        if self.options.quiet {
            // the summary completes this line
            write!(self.out, "  {family} {style}:")?;
        } else {
            writeln!(self.out, "  {family} {style}")?;
        }
        if let Err(error) = face.set_char_size(self.options.ppem) {
            writeln!(self.out, "  sizing {error}")?;
            return Ok(());
        }
        let Some(range) = self.options.range.clamp(face.glyph_count()) else {
            log::debug!("{family} {style} has no glyphs");
            return Ok(());
        };
        if !self.options.quiet {
            writeln!(self.out)?;
            writeln!(self.out, "{COLUMN_HEADER}")?;
            writeln!(self.out, "{}", "-".repeat(67))?;
        }
        let summary = GlyphReportDriver::new(self.options).run(face, range, &mut self.out)?;
        writeln!(self.out, "{summary}")?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
