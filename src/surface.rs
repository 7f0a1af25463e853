//! The drawing surface games render into.
//!
//! Games draw on a fixed 640x480 logical canvas. `TerminalSurface` maps that
//! canvas onto a ratatui buffer, one terminal cell per logical region.

use ratatui::buffer::Buffer;
use ratatui::layout;
use ratatui::style::{Color, Modifier, Style};

use crate::geometry::{Point, Rect};

pub const WIDTH: f32 = 640.0;
pub const HEIGHT: f32 = 480.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

pub trait Surface {
    fn clear(&mut self, color: Color);
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn fill_circle(&mut self, center: Point, radius: f32, color: Color);
    fn stroke_circle(&mut self, center: Point, radius: f32, color: Color);
    fn text(&mut self, text: &str, at: Point, align: Align, color: Color);
    /// Darken everything drawn so far.
    fn dim(&mut self);
}

/// Where the logical canvas sits on the terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    area: layout::Rect,
}

impl Viewport {
    pub fn new(area: layout::Rect) -> Self {
        Self { area }
    }

    pub fn area(&self) -> layout::Rect {
        self.area
    }

    fn cell_w(&self) -> f32 {
        WIDTH / self.area.width as f32
    }

    fn cell_h(&self) -> f32 {
        HEIGHT / self.area.height as f32
    }

    /// Logical point at the centre of a terminal cell, if the cell is inside.
    pub fn to_logical(&self, column: u16, row: u16) -> Option<Point> {
        let a = self.area;
        if a.width == 0 || a.height == 0 {
            return None;
        }
        if column < a.x || column >= a.x + a.width || row < a.y || row >= a.y + a.height {
            return None;
        }
        Some(self.cell_center(column - a.x, row - a.y))
    }

    /// Like `to_logical`, but a cell outside the area snaps to the nearest edge.
    pub fn to_logical_clamped(&self, column: u16, row: u16) -> Option<Point> {
        let a = self.area;
        if a.width == 0 || a.height == 0 {
            return None;
        }
        let column = column.clamp(a.x, a.x + a.width - 1);
        let row = row.clamp(a.y, a.y + a.height - 1);
        self.to_logical(column, row)
    }

    fn cell_center(&self, col: u16, row: u16) -> Point {
        Point::new(
            (col as f32 + 0.5) * self.cell_w(),
            (row as f32 + 0.5) * self.cell_h(),
        )
    }

    /// Terminal cell covering a logical point.
    pub fn cell_at(&self, p: Point) -> Option<(u16, u16)> {
        let a = self.area;
        if a.width == 0 || a.height == 0 || p.x < 0.0 || p.y < 0.0 || p.x >= WIDTH || p.y >= HEIGHT {
            return None;
        }
        let col = ((p.x / self.cell_w()) as u16).min(a.width - 1);
        let row = ((p.y / self.cell_h()) as u16).min(a.height - 1);
        Some((a.x + col, a.y + row))
    }

    /// Cells overlapping a logical box, with their logical centres.
    fn cells_in(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<(u16, u16, Point)> {
        let a = self.area;
        if a.width == 0 || a.height == 0 {
            return Vec::new();
        }
        let c0 = (x0 / self.cell_w()).floor().max(0.0) as u16;
        let c1 = ((x1 / self.cell_w()).ceil().max(0.0) as u16).min(a.width);
        let r0 = (y0 / self.cell_h()).floor().max(0.0) as u16;
        let r1 = ((y1 / self.cell_h()).ceil().max(0.0) as u16).min(a.height);
        let mut cells = Vec::new();
        for row in r0..r1 {
            for col in c0..c1 {
                cells.push((a.x + col, a.y + row, self.cell_center(col, row)));
            }
        }
        cells
    }
}

pub struct TerminalSurface<'a> {
    buf: &'a mut Buffer,
    viewport: Viewport,
}

impl<'a> TerminalSurface<'a> {
    pub fn new(buf: &'a mut Buffer, viewport: Viewport) -> Self {
        Self { buf, viewport }
    }

    fn paint(&mut self, col: u16, row: u16, color: Color) {
        if let Some(cell) = self.buf.cell_mut((col, row)) {
            cell.set_char(' ').set_bg(color);
        }
    }

    fn paint_fallback(&mut self, at: Point, color: Color) {
        if let Some((col, row)) = self.viewport.cell_at(at) {
            self.paint(col, row, color);
        }
    }
}

fn darken(color: Color) -> Color {
    match color {
        Color::Rgb(r, g, b) => Color::Rgb(
            (r as u16 * 3 / 10) as u8,
            (g as u16 * 3 / 10) as u8,
            (b as u16 * 3 / 10) as u8,
        ),
        Color::Reset => Color::Black,
        other => other,
    }
}

impl Surface for TerminalSurface<'_> {
    fn clear(&mut self, color: Color) {
        let area = self.viewport.area().intersection(self.buf.area);
        for row in area.top()..area.bottom() {
            for col in area.left()..area.right() {
                if let Some(cell) = self.buf.cell_mut((col, row)) {
                    cell.reset();
                    cell.set_bg(color);
                }
            }
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let mut painted = false;
        for (col, row, center) in self.viewport.cells_in(rect.x, rect.y, rect.right(), rect.bottom()) {
            if rect.contains(center) {
                self.paint(col, row, color);
                painted = true;
            }
        }
        if !painted && rect.w > 0.0 && rect.h > 0.0 {
            self.paint_fallback(rect.center(), color);
        }
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        let mut painted = false;
        let cells = self.viewport.cells_in(
            center.x - radius,
            center.y - radius,
            center.x + radius,
            center.y + radius,
        );
        for (col, row, c) in cells {
            if c.distance(center) <= radius {
                self.paint(col, row, color);
                painted = true;
            }
        }
        if !painted {
            self.paint_fallback(center, color);
        }
    }

    fn stroke_circle(&mut self, center: Point, radius: f32, color: Color) {
        let band = self.viewport.cell_w().max(self.viewport.cell_h());
        let mut painted = false;
        let cells = self.viewport.cells_in(
            center.x - radius,
            center.y - radius,
            center.x + radius,
            center.y + radius,
        );
        for (col, row, c) in cells {
            let d = c.distance(center);
            if d <= radius && d >= radius - band {
                self.paint(col, row, color);
                painted = true;
            }
        }
        if !painted {
            self.paint_fallback(center, color);
        }
    }

    fn text(&mut self, text: &str, at: Point, align: Align, color: Color) {
        let Some((col, row)) = self.viewport.cell_at(at) else { return };
        let area = self.viewport.area();
        let len = text.chars().count() as u16;
        let start = match align {
            Align::Left => col,
            Align::Center => col.saturating_sub(len / 2).max(area.x),
        };
        let max_width = area.right().saturating_sub(start) as usize;
        self.buf.set_stringn(
            start,
            row,
            text,
            max_width,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        );
    }

    fn dim(&mut self) {
        let area = self.viewport.area().intersection(self.buf.area);
        for row in area.top()..area.bottom() {
            for col in area.left()..area.right() {
                if let Some(cell) = self.buf.cell_mut((col, row)) {
                    cell.bg = darken(cell.bg);
                    cell.fg = darken(cell.fg);
                    cell.modifier.insert(Modifier::DIM);
                }
            }
        }
    }
}
