//! Depth-tested braille canvas
//!
//! Every terminal cell holds a 2x4 grid of braille dots, so the canvas has
//! twice the columns and four times the rows of the terminal. Each dot keeps
//! the colour of the nearest thing plotted on it.

use crate::colors::Rgb;
use crate::terminal::Terminal;

/// (row, column) offset inside a cell for each braille bit, in bit order
const DOT_POSITIONS: [(usize, usize); 8] = [
    (0, 0), (1, 0), (2, 0),
    (0, 1), (1, 1), (2, 1),
    (3, 0), (3, 1),
];
const DOT_BITS: [u8; 8] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80];

#[derive(Clone, Copy, Debug, PartialEq)]
struct Dot {
    color: Rgb,
    depth: f32,
}

pub struct BrailleCanvas {
    columns: usize,
    rows: usize,
    dots: Vec<Option<Dot>>,
    backgrounds: Vec<Option<Rgb>>,
}

impl BrailleCanvas {
    /// Canvas covering `columns` x `rows` terminal cells
    pub fn new(columns: u16, rows: u16) -> Self {
        let columns = columns as usize;
        let rows = rows as usize;
        Self {
            columns,
            rows,
            dots: vec![None; columns * 2 * rows * 4],
            backgrounds: vec![None; columns * rows],
        }
    }

    pub fn resize(&mut self, columns: u16, rows: u16) {
        if (columns as usize, rows as usize) != (self.columns, self.rows) {
            *self = Self::new(columns, rows);
        }
    }

    pub fn clear(&mut self) {
        self.dots.fill(None);
        self.backgrounds.fill(None);
    }

    /// Size in braille dots
    pub fn dot_size(&self) -> (usize, usize) {
        (self.columns * 2, self.rows * 4)
    }

    /// Size in terminal cells
    pub fn cell_size(&self) -> (usize, usize) {
        (self.columns, self.rows)
    }

    /// NDC (x, y in [-1, 1], y up) to dot coordinates
    pub fn ndc_to_dot(&self, x: f32, y: f32) -> (i32, i32) {
        let (w, h) = self.dot_size();
        let dx = ((x + 1.0) * 0.5 * w as f32).floor() as i32;
        let dy = ((1.0 - y) * 0.5 * h as f32).floor() as i32;
        (dx, dy)
    }

    /// Set a dot unless something nearer is already there
    pub fn plot(&mut self, x: i32, y: i32, depth: f32, color: Rgb) {
        let (w, h) = self.dot_size();
        if x < 0 || y < 0 || x as usize >= w || y as usize >= h {
            return;
        }
        let slot = &mut self.dots[y as usize * w + x as usize];
        if (*slot).map_or(true, |dot| depth < dot.depth) {
            *slot = Some(Dot { color, depth });
        }
    }

    pub fn is_set(&self, x: i32, y: i32) -> bool {
        let (w, h) = self.dot_size();
        x >= 0 && y >= 0 && (x as usize) < w && (y as usize) < h
            && self.dots[y as usize * w + x as usize].is_some()
    }

    /// Straight line between two dots, depth interpolated
    pub fn line(&mut self, from: (i32, i32, f32), to: (i32, i32, f32), color: Rgb) {
        let (x0, y0, z0) = from;
        let (x1, y1, z1) = to;
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).max(1);
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = x0 as f32 + (x1 - x0) as f32 * t;
            let y = y0 as f32 + (y1 - y0) as f32 * t;
            self.plot(x.round() as i32, y.round() as i32, z0 + (z1 - z0) * t, color);
        }
    }

    /// Filled disc of dots, `radius` in dots
    pub fn disc(&mut self, x: i32, y: i32, radius: i32, depth: f32, color: Rgb) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.plot(x + dx, y + dy, depth, color);
                }
            }
        }
    }

    /// Background colour for a whole cell
    pub fn fill_cell(&mut self, column: usize, row: usize, color: Rgb) {
        if column < self.columns && row < self.rows {
            self.backgrounds[row * self.columns + column] = Some(color);
        }
    }

    /// Braille glyph and colour for one cell, `None` when the cell is empty
    pub fn cell(&self, column: usize, row: usize) -> Option<(char, Rgb)> {
        let (w, _) = self.dot_size();
        let (bx, by) = (column * 2, row * 4);

        let mut bits: u8 = 0;
        let mut nearest: Option<Dot> = None;
        for (i, &(dy, dx)) in DOT_POSITIONS.iter().enumerate() {
            if let Some(dot) = self.dots[(by + dy) * w + bx + dx] {
                bits |= DOT_BITS[i];
                if nearest.map_or(true, |n| dot.depth < n.depth) {
                    nearest = Some(dot);
                }
            }
        }

        let dot = nearest?;
        let ch = char::from_u32(0x2800 + bits as u32)?;
        Some((ch, dot.color))
    }

    /// Copy the canvas into the terminal back buffer
    pub fn blit(&self, term: &mut Terminal) {
        for row in 0..self.rows {
            for column in 0..self.columns {
                let bg = self.backgrounds[row * self.columns + column].map(Rgb::to_color);
                let (ch, fg) = match self.cell(column, row) {
                    Some((ch, color)) => (ch, Some(color.to_color())),
                    None => (' ', None),
                };
                term.set_cell(column as i32, row as i32, ch, fg, bg, false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb(255, 0, 0);
    const BLUE: Rgb = Rgb(0, 0, 255);

    #[test]
    fn single_dots_map_to_braille_bits() {
        let mut canvas = BrailleCanvas::new(2, 1);
        canvas.plot(0, 0, 1.0, RED);
        assert_eq!(canvas.cell(0, 0), Some(('\u{2801}', RED)));

        canvas.plot(1, 3, 1.0, RED);
        assert_eq!(canvas.cell(0, 0), Some(('\u{2881}', RED)));
        assert_eq!(canvas.cell(1, 0), None);
    }

    #[test]
    fn full_cell_is_all_bits() {
        let mut canvas = BrailleCanvas::new(1, 1);
        for y in 0..4 {
            for x in 0..2 {
                canvas.plot(x, y, 1.0, RED);
            }
        }
        assert_eq!(canvas.cell(0, 0), Some(('\u{28ff}', RED)));
    }

    #[test]
    fn nearest_dot_wins() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.plot(0, 0, 5.0, RED);
        canvas.plot(0, 0, 2.0, BLUE);
        canvas.plot(0, 0, 9.0, RED);
        assert_eq!(canvas.cell(0, 0).map(|c| c.1), Some(BLUE));
    }

    #[test]
    fn out_of_bounds_is_ignored() {
        let mut canvas = BrailleCanvas::new(2, 2);
        canvas.plot(-1, 0, 1.0, RED);
        canvas.plot(4, 0, 1.0, RED);
        canvas.plot(0, 8, 1.0, RED);
        assert!((0..2).all(|r| (0..2).all(|c| canvas.cell(c, r).is_none())));
    }

    #[test]
    fn ndc_corners() {
        let canvas = BrailleCanvas::new(10, 5);
        assert_eq!(canvas.ndc_to_dot(-1.0, 1.0), (0, 0));
        assert_eq!(canvas.ndc_to_dot(0.0, 0.0), (10, 10));
        assert_eq!(canvas.ndc_to_dot(0.999, -0.999), (19, 19));
    }

    #[test]
    fn line_connects_endpoints() {
        let mut canvas = BrailleCanvas::new(5, 2);
        canvas.line((0, 0, 1.0), (9, 7, 1.0), RED);
        assert!(canvas.is_set(0, 0));
        assert!(canvas.is_set(9, 7));
        assert!(canvas.is_set(4, 3) || canvas.is_set(5, 4));
    }

    #[test]
    fn resize_and_clear() {
        let mut canvas = BrailleCanvas::new(2, 2);
        canvas.disc(2, 4, 1, 1.0, RED);
        canvas.fill_cell(0, 0, BLUE);
        canvas.clear();
        assert!(canvas.cell(1, 1).is_none());

        canvas.resize(8, 3);
        assert_eq!(canvas.dot_size(), (16, 12));
        assert_eq!(canvas.cell_size(), (8, 3));
    }
}
