//! End to end reports over a synthetic engine.

use std::{collections::HashMap, path::Path};

use glyphlint::{
    engine::codes, Engine, EngineError, FontFace, GlyphFormat, GlyphRange, LintOptions, LoadFlags,
    Outline, OutlineError, OwnedRaster, Point, RenderMode, Session,
};
use pretty_assertions::assert_eq;

const HEADER: &str = "
 GID  shape imgsize  Xacut  Yacut  MD5 hashsum
-------------------------------------------------------------------
";

/// Digest of the 2x2 raster `[0, 255, 0, 255]`.
const STRIPES_MD5: &str = "1359083BE9F487FF8BF36C4BEEC20292";

#[derive(Clone)]
struct GlyphSpec {
    load_error: Option<i32>,
    format: GlyphFormat,
    outline: Outline,
    /// `None` makes rendering fail.
    bitmap: Option<OwnedRaster>,
    convert_error: bool,
}

impl GlyphSpec {
    fn square() -> Self {
        let points = [(0, 0), (0, 64), (64, 64), (64, 0)]
            .into_iter()
            .map(|(x, y)| Point::new(x, y))
            .collect();
        Self {
            load_error: None,
            format: GlyphFormat::OUTLINE,
            outline: Outline::new(points, vec![3]).unwrap(),
            bitmap: Some(OwnedRaster::packed(vec![0, 255, 0, 255], 2, 2)),
            convert_error: false,
        }
    }

    fn missing() -> Self {
        Self {
            load_error: Some(codes::INVALID_GLYPH_INDEX),
            ..Self::square()
        }
    }
}

#[derive(Clone)]
struct FaceSpec {
    family: Option<&'static str>,
    style: &'static str,
    size_error: bool,
    glyphs: Vec<GlyphSpec>,
}

impl FaceSpec {
    fn new(style: &'static str, glyphs: Vec<GlyphSpec>) -> Self {
        Self {
            family: Some("Fake"),
            style,
            size_error: false,
            glyphs,
        }
    }
}

#[derive(Default)]
struct FakeEngine {
    files: HashMap<&'static str, Vec<FaceSpec>>,
}

impl FakeEngine {
    fn with_file(mut self, path: &'static str, faces: Vec<FaceSpec>) -> Self {
        self.files.insert(path, faces);
        self
    }
}

impl Engine for FakeEngine {
    type Face<'a>
        = FakeFace<'a>
    where
        Self: 'a;

    fn open_face<'a>(&'a self, path: &Path, index: usize) -> Result<FakeFace<'a>, EngineError> {
        let faces = path
            .to_str()
            .and_then(|path| self.files.get(path))
            .ok_or_else(|| EngineError::from_code(codes::CANNOT_OPEN_RESOURCE))?;
        let spec = faces
            .get(index)
            .ok_or_else(|| EngineError::from_code(codes::INVALID_ARGUMENT))?;
        Ok(FakeFace {
            spec,
            face_count: faces.len(),
            current: None,
            rendered: false,
        })
    }
}

struct FakeFace<'a> {
    spec: &'a FaceSpec,
    face_count: usize,
    current: Option<&'a GlyphSpec>,
    rendered: bool,
}

impl FontFace for FakeFace<'_> {
    type Bitmap<'b>
        = &'b OwnedRaster
    where
        Self: 'b;

    fn family_name(&self) -> Option<String> {
        self.spec.family.map(String::from)
    }

    fn style_name(&self) -> Option<String> {
        Some(self.spec.style.to_string())
    }

    fn face_count(&self) -> usize {
        self.face_count
    }

    fn glyph_count(&self) -> u32 {
        self.spec.glyphs.len() as u32
    }

    fn set_char_size(&mut self, _ppem: u32) -> Result<(), EngineError> {
        if self.spec.size_error {
            return Err(EngineError::from_code(codes::INVALID_PIXEL_SIZE));
        }
        Ok(())
    }

    fn load_glyph(&mut self, index: u32, _flags: LoadFlags) -> Result<(), EngineError> {
        self.current = None;
        self.rendered = false;
        let spec = self.spec;
        let glyph = &spec.glyphs[index as usize];
        if let Some(code) = glyph.load_error {
            return Err(EngineError::from_code(code));
        }
        self.current = Some(glyph);
        Ok(())
    }

    fn glyph_format(&self) -> GlyphFormat {
        match self.current {
            Some(_) if self.rendered => GlyphFormat::BITMAP,
            Some(glyph) => glyph.format,
            None => GlyphFormat::NONE,
        }
    }

    fn outline(&self) -> Result<Outline, OutlineError> {
        Ok(self
            .current
            .map(|glyph| glyph.outline.clone())
            .unwrap_or_default())
    }

    fn render_glyph(&mut self, _mode: RenderMode) -> Result<(), EngineError> {
        let glyph = self
            .current
            .ok_or_else(|| EngineError::from_code(codes::INVALID_ARGUMENT))?;
        if glyph.format == GlyphFormat::BITMAP {
            // nothing to render, but the slot already holds a bitmap
            return Err(EngineError::from_code(codes::INVALID_GLYPH_FORMAT));
        }
        if glyph.bitmap.is_none() {
            return Err(EngineError::from_code(codes::CANNOT_RENDER_GLYPH));
        }
        self.rendered = true;
        Ok(())
    }

    fn convert_bitmap(&self) -> Result<&OwnedRaster, EngineError> {
        self.current
            .filter(|glyph| !glyph.convert_error)
            .and_then(|glyph| glyph.bitmap.as_ref())
            .ok_or_else(|| EngineError::from_code(codes::INVALID_ARGUMENT))
    }
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn report(engine: &FakeEngine, options: &LintOptions, paths: &[&str]) -> String {
    init_logger();
    let mut session = Session::new(engine, options, Vec::new());
    session.run(paths).unwrap();
    String::from_utf8(session.into_inner()).unwrap()
}

#[test]
fn load_failure_is_counted() {
    let engine = FakeEngine::default().with_file(
        "a.ttf",
        vec![FaceSpec::new(
            "Regular",
            vec![GlyphSpec::square(), GlyphSpec::missing()],
        )],
    );
    let expected = format!(
        "a.ttf:
  Fake Regular
{HEADER}    0  1.00   2x2    2.0000 2.0000 {STRIPES_MD5}
    1 loading error = 0x0010, invalid glyph index
  1 fail.
"
    );
    assert_eq!(report(&engine, &LintOptions::new(16), &["a.ttf"]), expected);
}

#[test]
fn quiet_reports_one_line_per_face() {
    let engine = FakeEngine::default().with_file(
        "a.ttf",
        vec![FaceSpec::new(
            "Regular",
            vec![
                GlyphSpec::square(),
                GlyphSpec::missing(),
                GlyphSpec::missing(),
            ],
        )],
    );
    let options = LintOptions {
        quiet: true,
        ..LintOptions::new(16)
    };
    assert_eq!(
        report(&engine, &options, &["a.ttf"]),
        "a.ttf:\n  Fake Regular:  2 fails.\n"
    );
}

#[test]
fn range_is_clamped_to_face() {
    let engine = FakeEngine::default().with_file(
        "a.ttf",
        vec![FaceSpec::new(
            "Regular",
            vec![GlyphSpec::missing(), GlyphSpec::square()],
        )],
    );
    let options = LintOptions {
        range: GlyphRange {
            first: 1,
            last: 400,
        },
        ..LintOptions::new(16)
    };
    let expected = format!(
        "a.ttf:
  Fake Regular
{HEADER}    1  1.00   2x2    2.0000 2.0000 {STRIPES_MD5}
  OK.
"
    );
    assert_eq!(report(&engine, &options, &["a.ttf"]), expected);
}

#[test]
fn range_past_last_glyph_checks_nothing() {
    let engine = FakeEngine::default()
        .with_file("a.ttf", vec![FaceSpec::new("Regular", vec![GlyphSpec::missing()])]);
    let options = LintOptions {
        range: GlyphRange::single(5),
        quiet: true,
        ..LintOptions::new(16)
    };
    assert_eq!(
        report(&engine, &options, &["a.ttf"]),
        "a.ttf:\n  Fake Regular:  OK.\n"
    );
}

#[test]
fn unopenable_file_is_skipped() {
    let engine = FakeEngine::default().with_file(
        "b.ttf",
        vec![FaceSpec::new("Bold", vec![GlyphSpec::square()])],
    );
    let options = LintOptions {
        quiet: true,
        ..LintOptions::new(16)
    };
    assert_eq!(
        report(&engine, &options, &["missing.ttf", "b.ttf"]),
        "missing.ttf:
  opening error = 0x0001, cannot open resource
b.ttf:
  Fake Bold:  OK.
"
    );
}

#[test]
fn every_face_of_a_collection() {
    let regular = FaceSpec::new("Regular", vec![GlyphSpec::square()]);
    let bold = FaceSpec::new("Bold", vec![GlyphSpec::missing()]);
    let engine = FakeEngine::default()
        .with_file("c.ttc", vec![regular, bold])
        .with_file("a.ttf", vec![FaceSpec::new("Italic", vec![GlyphSpec::square()])]);
    let options = LintOptions {
        quiet: true,
        ..LintOptions::new(16)
    };
    assert_eq!(
        report(&engine, &options, &["c.ttc", "a.ttf"]),
        "c.ttc:
  Fake Regular:  OK.
  Fake Bold:  1 fail.
a.ttf:
  Fake Italic:  OK.
"
    );
}

#[test]
fn render_failures_count_but_conversion_failures_do_not() {
    let unrenderable = GlyphSpec {
        bitmap: None,
        ..GlyphSpec::square()
    };
    let unconvertible = GlyphSpec {
        convert_error: true,
        ..GlyphSpec::square()
    };
    let engine = FakeEngine::default().with_file(
        "a.ttf",
        vec![FaceSpec::new("Regular", vec![unrenderable, unconvertible])],
    );
    let expected = format!(
        "a.ttf:
  Fake Regular
{HEADER}    0  1.00 rendering error = 0x0013, cannot render this glyph format
    1  1.00 converting error = 0x0006, invalid argument
  1 fail.
"
    );
    assert_eq!(report(&engine, &LintOptions::new(16), &["a.ttf"]), expected);
}

#[test]
fn bitmap_glyphs_are_analyzed_despite_render_error() {
    // two bytes of padding per row that end up in the digest only
    let strike = GlyphSpec {
        format: GlyphFormat::BITMAP,
        bitmap: Some(OwnedRaster {
            data: vec![0, 255, 0, 0, 255, 0],
            width: 2,
            rows: 2,
            pitch: 3,
        }),
        ..GlyphSpec::square()
    };
    let engine = FakeEngine::default()
        .with_file("a.ttf", vec![FaceSpec::new("Regular", vec![strike])]);
    let expected = format!(
        "a.ttf:
  Fake Regular
{HEADER}    0  bits   2x2    2.0000 2.0000 EF87F6543C1AF2AAB81AE9B3C5B489FA
  OK.
"
    );
    assert_eq!(report(&engine, &LintOptions::new(16), &["a.ttf"]), expected);
}

#[test]
fn sizing_failure_skips_glyphs_and_summary() {
    let face = FaceSpec {
        size_error: true,
        family: None,
        ..FaceSpec::new("Regular", vec![GlyphSpec::square()])
    };
    let engine = FakeEngine::default().with_file("a.ttf", vec![face]);
    assert_eq!(
        report(&engine, &LintOptions::new(16), &["a.ttf"]),
        "a.ttf:
  (null) Regular
  sizing error = 0x0017, invalid pixel size
"
    );
}

#[test]
fn empty_face_has_no_summary() {
    let engine = FakeEngine::default().with_file("a.ttf", vec![FaceSpec::new("Regular", vec![])]);
    assert_eq!(
        report(&engine, &LintOptions::new(16), &["a.ttf"]),
        "a.ttf:\n  Fake Regular\n"
    );
}
