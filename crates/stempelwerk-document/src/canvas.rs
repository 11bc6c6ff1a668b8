// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page canvas — an engine-neutral list of drawing operations.
//
// The applier paints into a `PageCanvas`; the PDF engine later turns the ops
// into content-stream operators. Graphics state is only ever pushed through
// `PageCanvas::save_state`, whose guard pops it again when dropped, so a
// transform can never outlive the stamp that set it.

use std::ops::{Deref, DerefMut};

use crate::engine::ImageHandle;

/// 2D affine transform in PDF `cm` order: `x' = a·x + c·y + e`,
/// `y' = b·x + d·y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Matrix {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Clockwise rotation by `degrees` (as seen on the page, y pointing up)
    /// about `(cx, cy)`.
    pub fn rotation_about(cx: f64, cy: f64, degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            a: cos,
            b: -sin,
            c: sin,
            d: cos,
            e: cx - cx * cos - cy * sin,
            f: cy + cx * sin - cy * cos,
        }
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    pub fn as_array(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }
}

/// Axis-aligned rectangle in user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub llx: f64,
    pub lly: f64,
    pub urx: f64,
    pub ury: f64,
}

impl Rect {
    pub fn from_origin(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            llx: x,
            lly: y,
            urx: x + width,
            ury: y + height,
        }
    }

    /// Bounding box of this rectangle after `matrix` is applied.
    pub fn transformed(&self, matrix: &Matrix) -> Self {
        let corners = [
            matrix.apply(self.llx, self.lly),
            matrix.apply(self.urx, self.lly),
            matrix.apply(self.urx, self.ury),
            matrix.apply(self.llx, self.ury),
        ];
        let mut out = Self {
            llx: f64::INFINITY,
            lly: f64::INFINITY,
            urx: f64::NEG_INFINITY,
            ury: f64::NEG_INFINITY,
        };
        for (x, y) in corners {
            out.llx = out.llx.min(x);
            out.lly = out.lly.min(y);
            out.urx = out.urx.max(x);
            out.ury = out.ury.max(y);
        }
        out
    }

    /// Grow each side so the rectangle is at least `min` wide and tall.
    pub fn at_least(self, min: f64) -> Self {
        let grow_x = ((min - self.width()) / 2.0).max(0.0);
        let grow_y = ((min - self.height()) / 2.0).max(0.0);
        Self {
            llx: self.llx - grow_x,
            lly: self.lly - grow_y,
            urx: self.urx + grow_x,
            ury: self.ury + grow_y,
        }
    }

    pub fn width(&self) -> f64 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f64 {
        self.ury - self.lly
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.llx, self.lly, self.urx, self.ury]
    }
}

/// One drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    SaveState,
    RestoreState,
    Transform(Matrix),
    /// Paint an embedded image into the rectangle.
    Image { handle: ImageHandle, rect: Rect },
    /// Show a single line of text with its baseline origin at `(x, y)`.
    Text {
        font: &'static str,
        size: f64,
        rgb: (f32, f32, f32),
        x: f64,
        y: f64,
        text: String,
    },
}

/// Drawing operations destined for one page (or one appearance stream).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageCanvas {
    ops: Vec<DrawOp>,
    depth: usize,
}

impl PageCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of graphics states currently pushed.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Push the graphics state; it is popped when the guard drops.
    pub fn save_state(&mut self) -> SavedState<'_> {
        self.ops.push(DrawOp::SaveState);
        self.depth += 1;
        SavedState { canvas: self }
    }

    /// Concatenate `matrix` onto the current transform. Only reachable from
    /// inside a [`SavedState`] scope.
    fn transform(&mut self, matrix: Matrix) {
        self.ops.push(DrawOp::Transform(matrix));
    }

    pub fn draw_image(&mut self, handle: ImageHandle, rect: Rect) {
        self.ops.push(DrawOp::Image { handle, rect });
    }

    /// Draw an image rotated clockwise about its own center. A zero angle
    /// emits no transform.
    pub fn draw_rotated_image(&mut self, handle: ImageHandle, rect: Rect, degrees: f64) {
        let cx = (rect.llx + rect.urx) / 2.0;
        let cy = (rect.lly + rect.ury) / 2.0;
        let mut scope = self.save_state();
        scope.rotate_about(cx, cy, degrees);
        scope.draw_image(handle, rect);
    }

    pub fn draw_text(
        &mut self,
        font: &'static str,
        size: f64,
        rgb: (f32, f32, f32),
        origin: (f64, f64),
        text: &str,
    ) {
        self.ops.push(DrawOp::Text {
            font,
            size,
            rgb,
            x: origin.0,
            y: origin.1,
            text: text.to_owned(),
        });
    }
}

/// Scope guard returned by [`PageCanvas::save_state`].
pub struct SavedState<'a> {
    canvas: &'a mut PageCanvas,
}

impl SavedState<'_> {
    pub fn transform(&mut self, matrix: Matrix) {
        self.canvas.transform(matrix);
    }

    pub fn rotate_about(&mut self, cx: f64, cy: f64, degrees: f64) {
        if degrees != 0.0 {
            self.transform(Matrix::rotation_about(cx, cy, degrees));
        }
    }
}

impl Deref for SavedState<'_> {
    type Target = PageCanvas;

    fn deref(&self) -> &PageCanvas {
        self.canvas
    }
}

impl DerefMut for SavedState<'_> {
    fn deref_mut(&mut self) -> &mut PageCanvas {
        self.canvas
    }
}

impl Drop for SavedState<'_> {
    fn drop(&mut self) {
        self.canvas.ops.push(DrawOp::RestoreState);
        self.canvas.depth -= 1;
    }
}
