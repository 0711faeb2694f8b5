use skrifa::outline::OutlinePen;
use zeno::{Command, Vector};

use crate::{
    error::OutlineError,
    shape::{Outline, Point},
};

/// Pen that records a drawn glyph as a FreeType style point outline and as
/// a path for rasterization.
///
/// FreeType outlines differ from a stream of pen commands in two ways that
/// matter for the shape estimate:
///
/// 1. Contours are implicitly closed, so the start point is never repeated
///    at the end. A segment ending on the start point just before a close is
///    dropped here.
///
/// 2. A move that is immediately followed by another move does not start a
///    contour, so unused moves are dropped.
///
/// Points are stored in 26.6 fixed point when `is_scaled` is set and in font
/// units otherwise. The path is in pixels with y pointing down.
pub struct OutlineRecorder {
    is_scaled: bool,
    pending_move: Option<(f32, f32)>,
    points: Vec<Point>,
    contour_ends: Vec<usize>,
    contour_start: usize,
    path: Vec<Command>,
}

impl OutlineRecorder {
    pub fn new(is_scaled: bool) -> Self {
        Self {
            is_scaled,
            pending_move: None,
            points: vec![],
            contour_ends: vec![],
            contour_start: 0,
            path: vec![],
        }
    }

    /// Returns the recorded outline and rasterization path.
    pub fn finish(mut self) -> Result<(Outline, Vec<Command>), OutlineError> {
        self.end_contour();
        let outline = Outline::new(self.points, self.contour_ends)?;
        Ok((outline, self.path))
    }

    fn flush_pending_move(&mut self) {
        if let Some((x, y)) = self.pending_move.take() {
            self.end_contour();
            self.push_point(x, y);
            self.path.push(Command::MoveTo(Vector::new(x, -y)));
        }
    }

    fn push_point(&mut self, x: f32, y: f32) {
        let scale = if self.is_scaled { 64.0 } else { 1.0 };
        self.points.push(Point::new(
            (x * scale).round() as i64,
            (y * scale).round() as i64,
        ));
    }

    fn end_contour(&mut self) {
        let len = self.points.len();
        if len == self.contour_start {
            return;
        }
        if len - self.contour_start > 1
            && self.points[len - 1] == self.points[self.contour_start]
        {
            self.points.pop();
        }
        self.contour_ends.push(self.points.len() - 1);
        self.contour_start = self.points.len();
    }
}

impl OutlinePen for OutlineRecorder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.pending_move = Some((x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.flush_pending_move();
        self.push_point(x, y);
        self.path.push(Command::LineTo(Vector::new(x, -y)));
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.flush_pending_move();
        self.push_point(cx0, cy0);
        self.push_point(x, y);
        self.path.push(Command::QuadTo(Vector::new(cx0, -cy0), Vector::new(x, -y)));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.flush_pending_move();
        self.push_point(cx0, cy0);
        self.push_point(cx1, cy1);
        self.push_point(x, y);
        self.path.push(Command::CurveTo(
            Vector::new(cx0, -cy0),
            Vector::new(cx1, -cy1),
            Vector::new(x, -y),
        ));
    }

    fn close(&mut self) {
        if self.pending_move.is_none() && self.points.len() > self.contour_start {
            self.end_contour();
            self.path.push(Command::Close);
        }
    }
}
