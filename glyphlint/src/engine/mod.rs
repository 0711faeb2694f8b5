//! Interface to the font engines that load and rasterize glyphs.

use std::{borrow::Borrow, fs::File, num::ParseIntError, path::Path, sync::Arc};

use crate::{
    error::{EngineError, OutlineError, RasterError},
    raster::{OwnedRaster, RasterBuffer},
    shape::{GlyphFormat, Outline},
};

mod freetype;
mod skrifa;

pub use self::freetype::{FreeTypeEngine, FreeTypeFace};
pub use self::skrifa::{SkrifaEngine, SkrifaFace};

/// A font engine: the entry point for opening faces.
pub trait Engine {
    type Face<'a>: FontFace
    where
        Self: 'a;

    /// Opens face `index` of the font file at `path`.
    fn open_face<'a>(&'a self, path: &Path, index: usize) -> Result<Self::Face<'a>, EngineError>;
}

/// An open face with a single glyph slot.
///
/// Loading a glyph replaces the slot contents; rendering converts the
/// slot's outline into a bitmap in place.
pub trait FontFace {
    /// An 8-bit bitmap with positive pitch, released on drop.
    type Bitmap<'a>: Bitmap
    where
        Self: 'a;

    fn family_name(&self) -> Option<String>;

    fn style_name(&self) -> Option<String>;

    /// Number of faces in the file this face was opened from.
    fn face_count(&self) -> usize;

    fn glyph_count(&self) -> u32;

    /// Sets a uniform size of `ppem` points at 72 dpi.
    fn set_char_size(&mut self, ppem: u32) -> Result<(), EngineError>;

    fn load_glyph(&mut self, index: u32, flags: LoadFlags) -> Result<(), EngineError>;

    /// Image format of the glyph currently in the slot.
    fn glyph_format(&self) -> GlyphFormat;

    /// Outline of the glyph in the slot. Only meaningful when
    /// [`glyph_format`](Self::glyph_format) is [`GlyphFormat::OUTLINE`].
    fn outline(&self) -> Result<Outline, OutlineError>;

    fn render_glyph(&mut self, mode: RenderMode) -> Result<(), EngineError>;

    /// Converts the slot's bitmap to 8 bits per pixel with positive pitch.
    fn convert_bitmap(&self) -> Result<Self::Bitmap<'_>, EngineError>;
}

/// Access to the samples of a converted bitmap.
pub trait Bitmap {
    fn raster(&self) -> Result<RasterBuffer<'_>, RasterError>;
}

impl Bitmap for OwnedRaster {
    fn raster(&self) -> Result<RasterBuffer<'_>, RasterError> {
        self.as_buffer()
    }
}

impl<T: Bitmap + ?Sized> Bitmap for &T {
    fn raster(&self) -> Result<RasterBuffer<'_>, RasterError> {
        (**self).raster()
    }
}

/// Glyph load flags, bit compatible with FreeType's `FT_LOAD_XXX`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadFlags(i32);

impl LoadFlags {
    pub const DEFAULT: Self = Self(0);
    pub const NO_SCALE: Self = Self(1 << 0);
    pub const NO_HINTING: Self = Self(1 << 1);
    pub const NO_BITMAP: Self = Self(1 << 3);

    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> i32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Parses a hexadecimal value with an optional `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, ParseIntError> {
        let s = s.trim();
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        u32::from_str_radix(digits, 16).map(|bits| Self(bits as i32))
    }
}

impl std::ops::BitOr for LoadFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// How to rasterize an outline.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// 8-bit anti-aliased.
    #[default]
    Normal,
    /// Anti-aliased with light hinting.
    Light,
    /// 1-bit monochrome.
    Mono,
    /// Horizontal subpixel rendering.
    Lcd,
    /// Vertical subpixel rendering.
    LcdV,
}

impl RenderMode {
    /// Maps FreeType's `FT_RENDER_MODE_XXX` values; unknown values select
    /// [`RenderMode::Normal`].
    pub fn from_index(index: i32) -> Self {
        match index {
            1 => Self::Light,
            2 => Self::Mono,
            3 => Self::Lcd,
            4 => Self::LcdV,
            _ => Self::Normal,
        }
    }
}

/// FreeType error codes. Engines other than FreeType report their failures
/// with these too, so reports stay comparable.
pub mod codes {
    pub const CANNOT_OPEN_RESOURCE: i32 = 0x01;
    pub const UNKNOWN_FILE_FORMAT: i32 = 0x02;
    pub const INVALID_FILE_FORMAT: i32 = 0x03;
    pub const INVALID_ARGUMENT: i32 = 0x06;
    pub const UNIMPLEMENTED_FEATURE: i32 = 0x07;
    pub const INVALID_TABLE: i32 = 0x08;
    pub const INVALID_GLYPH_INDEX: i32 = 0x10;
    pub const INVALID_GLYPH_FORMAT: i32 = 0x12;
    pub const CANNOT_RENDER_GLYPH: i32 = 0x13;
    pub const INVALID_OUTLINE: i32 = 0x14;
    pub const INVALID_PIXEL_SIZE: i32 = 0x17;
}

/// FreeType's message for an error code, as listed in `fterrdef.h`.
pub fn describe(code: i32) -> &'static str {
    MESSAGES
        .binary_search_by_key(&code, |&(code, _)| code)
        .map(|ix| MESSAGES[ix].1)
        .unwrap_or("unknown error")
}

/// Sorted by code.
#[rustfmt::skip]
static MESSAGES: &[(i32, &str)] = &[
    (0x00, "no error"),
    (0x01, "cannot open resource"),
    (0x02, "unknown file format"),
    (0x03, "broken file"),
    (0x04, "invalid FreeType version"),
    (0x05, "module version is too low"),
    (0x06, "invalid argument"),
    (0x07, "unimplemented feature"),
    (0x08, "broken table"),
    (0x09, "broken offset within table"),
    (0x0A, "array allocation size too large"),
    (0x0B, "missing module"),
    (0x0C, "missing property"),
    (0x10, "invalid glyph index"),
    (0x11, "invalid character code"),
    (0x12, "unsupported glyph image format"),
    (0x13, "cannot render this glyph format"),
    (0x14, "invalid outline"),
    (0x15, "invalid composite glyph"),
    (0x16, "too many hints"),
    (0x17, "invalid pixel size"),
    (0x18, "invalid SVG document"),
    (0x20, "invalid object handle"),
    (0x21, "invalid library handle"),
    (0x22, "invalid module handle"),
    (0x23, "invalid face handle"),
    (0x24, "invalid size handle"),
    (0x25, "invalid glyph slot handle"),
    (0x26, "invalid charmap handle"),
    (0x27, "invalid cache manager handle"),
    (0x28, "invalid stream handle"),
    (0x30, "too many modules"),
    (0x31, "too many extensions"),
    (0x40, "out of memory"),
    (0x41, "unlisted object"),
    (0x51, "cannot open stream"),
    (0x52, "invalid stream seek"),
    (0x53, "invalid stream skip"),
    (0x54, "invalid stream read"),
    (0x55, "invalid stream operation"),
    (0x56, "invalid frame operation"),
    (0x57, "nested frame access"),
    (0x58, "invalid frame read"),
    (0x60, "raster uninitialized"),
    (0x61, "raster corrupted"),
    (0x62, "raster overflow"),
    (0x63, "negative height while rastering"),
    (0x70, "too many registered caches"),
    (0x80, "invalid opcode"),
    (0x81, "too few arguments"),
    (0x82, "stack overflow"),
    (0x83, "code overflow"),
    (0x84, "bad argument"),
    (0x85, "division by zero"),
    (0x86, "invalid reference"),
    (0x87, "found debug opcode"),
    (0x88, "found ENDF opcode in execution stream"),
    (0x89, "nested DEFS"),
    (0x8A, "invalid code range"),
    (0x8B, "execution context too long"),
    (0x8C, "too many function definitions"),
    (0x8D, "too many instruction definitions"),
    (0x8E, "SFNT font table missing"),
    (0x8F, "horizontal header (hhea) table missing"),
    (0x90, "locations (loca) table missing"),
    (0x91, "name table missing"),
    (0x92, "character map (cmap) table missing"),
    (0x93, "horizontal metrics (hmtx) table missing"),
    (0x94, "PostScript (post) table missing"),
    (0x95, "invalid horizontal metrics"),
    (0x96, "invalid character map (cmap) format"),
    (0x97, "invalid ppem value"),
    (0x98, "invalid vertical metrics"),
    (0x99, "could not find context"),
    (0x9A, "invalid PostScript (post) table format"),
    (0x9B, "invalid PostScript (post) table"),
    (0x9C, "found FDEF or IDEF opcode in glyf bytecode"),
    (0x9D, "missing bitmap in strike"),
    (0x9E, "SVG hooks have not been set"),
    (0xA0, "opcode syntax error"),
    (0xA1, "argument stack underflow"),
    (0xA2, "ignore"),
    (0xA3, "no Unicode glyph name found"),
    (0xA4, "glyph too big for hinting"),
    (0xB0, "`STARTFONT' field missing"),
    (0xB1, "`FONT' field missing"),
    (0xB2, "`SIZE' field missing"),
    (0xB3, "`FONTBOUNDINGBOX' field missing"),
    (0xB4, "`CHARS' field missing"),
    (0xB5, "`STARTCHAR' field missing"),
    (0xB6, "`ENCODING' field missing"),
    (0xB7, "`BBX' field missing"),
    (0xB8, "`BBX' too big"),
    (0xB9, "Font header corrupted or missing fields"),
    (0xBA, "Font glyphs corrupted or missing fields"),
];

impl EngineError {
    pub fn from_code(code: i32) -> Self {
        Self::new(code, describe(code))
    }
}

impl From<RasterError> for EngineError {
    fn from(error: RasterError) -> Self {
        Self::new(codes::INVALID_ARGUMENT, error.to_string())
    }
}

/// Memory mapped font file, shared between the faces opened from it.
#[derive(Clone)]
pub struct SharedFontData(Arc<memmap2::Mmap>);

impl SharedFontData {
    pub fn open(path: &Path) -> Result<Self, EngineError> {
        let map = File::open(path).and_then(|file| {
            // SAFETY: the mapping is read only; a font file being modified
            // while we lint it is not supported.
            unsafe { memmap2::Mmap::map(&file) }
        });
        match map {
            Ok(map) => Ok(Self(Arc::new(map))),
            Err(e) => {
                log::warn!("failed to map {}: {e}", path.display());
                Err(EngineError::from_code(codes::CANNOT_OPEN_RESOURCE))
            }
        }
    }
}

impl Borrow<[u8]> for SharedFontData {
    fn borrow(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl AsRef<[u8]> for SharedFontData {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}
