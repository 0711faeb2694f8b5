//! Outline geometry and the shape complexity estimate.

use std::fmt;

use crate::error::OutlineError;

/// A point in an outline, in 26.6 fixed point (or font units when the
/// glyph was loaded unscaled).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    fn taxicab_distance(self, other: Point) -> i64 {
        (other.x - self.x).abs() + (other.y - self.y).abs()
    }
}

/// Control box of an outline.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BoundingBox {
    pub x_min: i64,
    pub x_max: i64,
    pub y_min: i64,
    pub y_max: i64,
}

impl BoundingBox {
    pub fn width(&self) -> i64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> i64 {
        self.y_max - self.y_min
    }
}

/// A glyph outline: a point array partitioned into closed contours.
///
/// Each contour is identified by the index of its last point. The first
/// contour starts at point zero and every following contour starts right
/// after the previous one ends.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Outline {
    points: Vec<Point>,
    contour_ends: Vec<usize>,
}

impl Outline {
    pub fn new(points: Vec<Point>, contour_ends: Vec<usize>) -> Result<Self, OutlineError> {
        for pair in contour_ends.windows(2) {
            if pair[1] <= pair[0] {
                return Err(OutlineError::UnorderedContour {
                    previous: pair[0],
                    end: pair[1],
                });
            }
        }
        let last = contour_ends.last().copied();
        let covered = last.map(|end| end + 1).unwrap_or(0);
        if covered != points.len() {
            return Err(OutlineError::PartialCover {
                last,
                points: points.len(),
            });
        }
        Ok(Self {
            points,
            contour_ends,
        })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn contour_ends(&self) -> &[usize] {
        &self.contour_ends
    }

    /// Returns an iterator over the points of each contour.
    pub fn contours(&self) -> impl Iterator<Item = &[Point]> + '_ {
        let mut start = 0;
        self.contour_ends.iter().map(move |&end| {
            let contour = &self.points[start..=end];
            start = end + 1;
            contour
        })
    }

    /// Computes the control box, which covers every point including
    /// off-curve ones.
    pub fn control_box(&self) -> BoundingBox {
        let Some(first) = self.points.first() else {
            return BoundingBox::default();
        };
        let init = BoundingBox {
            x_min: first.x,
            x_max: first.x,
            y_min: first.y,
            y_max: first.y,
        };
        self.points.iter().fold(init, |bbox, p| BoundingBox {
            x_min: bbox.x_min.min(p.x),
            x_max: bbox.x_max.max(p.x),
            y_min: bbox.y_min.min(p.y),
            y_max: bbox.y_max.max(p.y),
        })
    }

    /// Total taxicab length of all contours, each walked as a closed loop.
    pub fn taxicab_perimeter(&self) -> i64 {
        self.contours()
            .map(|contour| {
                // the walk starts from the last point so the closing edge is
                // counted first
                let mut u = contour[contour.len() - 1];
                contour
                    .iter()
                    .map(|&v| {
                        let step = u.taxicab_distance(v);
                        u = v;
                        step
                    })
                    .sum::<i64>()
            })
            .sum()
    }
}

/// A four byte glyph image format tag, such as `outl` or `bits`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GlyphFormat(pub u32);

impl GlyphFormat {
    pub const NONE: Self = Self(0);
    pub const COMPOSITE: Self = Self::from_tag(*b"comp");
    pub const BITMAP: Self = Self::from_tag(*b"bits");
    pub const OUTLINE: Self = Self::from_tag(*b"outl");
    pub const PLOTTER: Self = Self::from_tag(*b"plot");
    pub const SVG: Self = Self::from_tag(*b"SVG ");

    pub const fn from_tag(tag: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(tag))
    }

    pub const fn to_tag(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for GlyphFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.to_tag() {
            write!(f, "{}", byte as char)?;
        }
        Ok(())
    }
}

/// Result of examining a loaded glyph's shape.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shape {
    /// The glyph is not an outline; carries its format tag.
    Image(GlyphFormat),
    /// The outline has no extent.
    Void,
    /// Ratio of the taxicab perimeter to the control box half-perimeter.
    Complexity(f64),
}

impl Shape {
    /// Examines a glyph with the given format and outline.
    ///
    /// A rectangle traced once has a complexity of exactly 1.0; anything
    /// more convoluted scores higher.
    pub fn examine(format: GlyphFormat, outline: &Outline) -> Self {
        if format != GlyphFormat::OUTLINE {
            return Shape::Image(format);
        }
        let taxi = outline.taxicab_perimeter();
        if taxi == 0 {
            return Shape::Void;
        }
        let cbox = outline.control_box();
        let extent = cbox.width() + cbox.height();
        if extent == 0 {
            return Shape::Void;
        }
        Shape::Complexity(0.5 * taxi as f64 / extent as f64)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Image(format) => write!(f, " {format} "),
            Shape::Void => f.write_str(" void "),
            Shape::Complexity(ratio) => write!(f, "{ratio:5.2} "),
        }
    }
}
