//! Settings for a lint run.

use std::{convert::Infallible, str::FromStr};

use crate::engine::{LoadFlags, RenderMode};

/// Settings shared by every face and glyph of a run.
#[derive(Clone, Debug)]
pub struct LintOptions {
    /// Nominal size in points at 72 dpi, i.e. pixels per em.
    pub ppem: u32,
    pub load_flags: LoadFlags,
    pub render_mode: RenderMode,
    pub range: GlyphRange,
    /// Only report load failures and the per-face tally.
    pub quiet: bool,
}

impl LintOptions {
    pub fn new(ppem: u32) -> Self {
        Self {
            ppem,
            load_flags: LoadFlags::DEFAULT,
            render_mode: RenderMode::Normal,
            range: GlyphRange::ALL,
            quiet: false,
        }
    }
}

/// An inclusive range of glyph indices requested by the user.
///
/// The range is clamped to the glyphs a face actually has when the face is
/// processed, so the upper bound may be arbitrarily large.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GlyphRange {
    pub first: u32,
    pub last: u32,
}

impl GlyphRange {
    pub const ALL: Self = Self {
        first: 0,
        last: u32::MAX,
    };

    pub fn single(index: u32) -> Self {
        Self {
            first: index,
            last: index,
        }
    }

    /// Restricts the range to the indices of a face with `glyph_count`
    /// glyphs.
    ///
    /// Returns `None` when the face has no glyphs. The result may still be
    /// empty if `first` lies past the last glyph.
    pub fn clamp(self, glyph_count: u32) -> Option<std::ops::RangeInclusive<u32>> {
        let last_glyph = glyph_count.checked_sub(1)?;
        Some(self.first..=self.last.min(last_glyph))
    }
}

impl Default for GlyphRange {
    fn default() -> Self {
        Self::ALL
    }
}

/// Parses `N`, or two numbers separated by any run of `-`, `,` or `:`.
///
/// A second number smaller than the first selects everything from the first
/// to the end. Input that does not start with a number selects all glyphs.
impl FromStr for GlyphRange {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim_start();
        let (first, rest) = split_number(s);
        let Some(first) = first else {
            log::warn!("ignoring glyph range '{s}'");
            return Ok(Self::ALL);
        };
        let separated = rest.trim_start_matches(['-', ',', ':']);
        let last = if separated.len() < rest.len() {
            split_number(separated.trim_start()).0
        } else {
            None
        };
        Ok(match last {
            Some(last) if last >= first => Self { first, last },
            Some(_) => Self {
                first,
                last: u32::MAX,
            },
            None => Self::single(first),
        })
    }
}

/// Splits a leading decimal number off `s`.
fn split_number(s: &str) -> (Option<u32>, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    (s[..end].parse().ok(), &s[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> GlyphRange {
        s.parse().unwrap()
    }

    #[test]
    fn parse_ranges() {
        assert_eq!(parse("12"), GlyphRange::single(12));
        assert_eq!(parse("3-9"), GlyphRange { first: 3, last: 9 });
        assert_eq!(parse("3,9"), GlyphRange { first: 3, last: 9 });
        assert_eq!(parse("3:9"), GlyphRange { first: 3, last: 9 });
        assert_eq!(parse("3-:9"), GlyphRange { first: 3, last: 9 });
    }

    #[test]
    fn inverted_range_runs_to_end() {
        assert_eq!(
            parse("9-3"),
            GlyphRange {
                first: 9,
                last: u32::MAX
            }
        );
    }

    #[test]
    fn malformed_range_selects_all() {
        assert_eq!(parse("abc"), GlyphRange::ALL);
        assert_eq!(parse(""), GlyphRange::ALL);
        // a missing second number leaves a single glyph
        assert_eq!(parse("7-"), GlyphRange::single(7));
        assert_eq!(parse("7 9"), GlyphRange::single(7));
    }

    #[test]
    fn clamp_to_face() {
        assert_eq!(GlyphRange::ALL.clamp(10), Some(0..=9));
        assert_eq!(
            GlyphRange {
                first: 4,
                last: 400
            }
            .clamp(10),
            Some(4..=9)
        );
        assert_eq!(GlyphRange::single(2).clamp(10), Some(2..=2));
        assert_eq!(GlyphRange::ALL.clamp(0), None);
        assert!(GlyphRange::single(20).clamp(10).unwrap().is_empty());
    }
}
