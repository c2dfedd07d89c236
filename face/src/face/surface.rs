//! Pixel Surface
//!
//! A small framebuffer over the terminal. Each terminal cell carries two
//! vertically stacked "pixels" via the upper-half-block glyph, which is
//! what lets 800x600-space geometry survive on an 80x24 grid. All draw
//! primitives take virtual coordinates and scale on the way in, so the
//! same renderer serves any terminal size.

use ratatui::buffer::Buffer;
use ratatui::style::{Color, Style};

use otto_core::Rgb;

use super::transition::Point;
use super::{VIRTUAL_HEIGHT, VIRTUAL_WIDTH};

/// Background color of the face panel (near-black)
pub const BACKGROUND: Rgb = Rgb::new(26, 26, 26);

/// The framebuffer. Width is terminal columns, height is terminal rows
/// doubled.
pub struct PixelSurface {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
    scale_x: f32,
    scale_y: f32,
}

impl PixelSurface {
    /// Surface for a terminal area of `cols` x `rows` cells
    pub fn new(cols: u16, rows: u16) -> Self {
        let width = cols as usize;
        let height = rows as usize * 2;
        Self {
            width,
            height,
            pixels: vec![BACKGROUND; width * height],
            scale_x: width as f32 / VIRTUAL_WIDTH,
            scale_y: height as f32 / VIRTUAL_HEIGHT,
        }
    }

    /// Reset every pixel to the background
    pub fn clear(&mut self) {
        self.pixels.fill(BACKGROUND);
    }

    /// Device pixel dimensions
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn to_device(&self, p: Point) -> (f32, f32) {
        (p.x * self.scale_x, p.y * self.scale_y)
    }

    /// Set one device pixel; out-of-bounds writes are dropped
    fn set(&mut self, x: i32, y: i32, color: Rgb) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        self.pixels[y as usize * self.width + x as usize] = color;
    }

    /// Read one device pixel (background when out of bounds)
    pub fn get(&self, x: i32, y: i32) -> Rgb {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return BACKGROUND;
        }
        self.pixels[y as usize * self.width + x as usize]
    }

    // ------------------------------------------------------------------
    // Primitives (virtual coordinates in, device pixels out)
    // ------------------------------------------------------------------

    /// Fill a rounded rectangle centered geometry given by its top-left
    /// corner, size and corner radius
    pub fn fill_rounded_rect(&mut self, top_left: Point, w: f32, h: f32, radius: f32, color: Rgb) {
        let (x0, y0) = self.to_device(top_left);
        let (x1, y1) = self.to_device(Point::new(top_left.x + w, top_left.y + h));
        // Radius shrinks with the smaller scale axis
        let r = (radius * self.scale_x.min(self.scale_y)).min((x1 - x0) / 2.0);

        for py in y0.floor() as i32..=y1.ceil() as i32 {
            for px in x0.floor() as i32..=x1.ceil() as i32 {
                let fx = px as f32 + 0.5;
                let fy = py as f32 + 0.5;
                if fx < x0 || fx > x1 || fy < y0 || fy > y1 {
                    continue;
                }
                // Rounded-corner test: inside the corner square, require
                // the point to be within the corner circle
                let cx = fx.clamp(x0 + r, x1 - r);
                let cy = fy.clamp(y0 + r, y1 - r);
                let dx = fx - cx;
                let dy = fy - cy;
                if dx * dx + dy * dy <= r * r || r <= 0.0 {
                    self.set(px, py, color);
                }
            }
        }
    }

    /// Fill a vertical span in one device column (callers have already
    /// scaled); used by the curve-bounded eye silhouettes
    fn fill_device_span(&mut self, x: i32, y0: f32, y1: f32, color: Rgb) {
        let (top, bottom) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        for py in top.floor() as i32..=bottom.ceil() as i32 {
            let fy = py as f32 + 0.5;
            if fy >= top && fy <= bottom {
                self.set(x, py, color);
            }
        }
    }

    /// Fill the region between two curves sampled per column. `top` and
    /// `bottom` map a parameter t in [0,1] across the width to virtual
    /// y coordinates.
    pub fn fill_between_curves(
        &mut self,
        x: f32,
        w: f32,
        top: impl Fn(f32) -> f32,
        bottom: impl Fn(f32) -> f32,
        color: Rgb,
    ) {
        let (dx0, _) = self.to_device(Point::new(x, 0.0));
        let (dx1, _) = self.to_device(Point::new(x + w, 0.0));
        let columns = ((dx1 - dx0).ceil() as i32).max(1);

        for i in 0..=columns {
            let t = i as f32 / columns as f32;
            let ty = top(t) * self.scale_y;
            let by = bottom(t) * self.scale_y;
            self.fill_device_span((dx0 + i as f32) as i32, ty, by, color);
        }
    }

    /// Draw a line with the given virtual thickness
    pub fn draw_line(&mut self, from: Point, to: Point, thickness: f32, color: Rgb) {
        let (x0, y0) = self.to_device(from);
        let (x1, y1) = self.to_device(to);
        let steps = ((x1 - x0).abs().max((y1 - y0).abs()).ceil() as i32).max(1);
        let half = (thickness * self.scale_x.min(self.scale_y) / 2.0).max(0.5);

        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let cx = x0 + (x1 - x0) * t;
            let cy = y0 + (y1 - y0) * t;
            for py in (cy - half).floor() as i32..=(cy + half).ceil() as i32 {
                for px in (cx - half).floor() as i32..=(cx + half).ceil() as i32 {
                    let dx = px as f32 + 0.5 - cx;
                    let dy = py as f32 + 0.5 - cy;
                    if dx * dx + dy * dy <= half * half + 0.25 {
                        self.set(px, py, color);
                    }
                }
            }
        }
    }

    /// Fill a circle
    pub fn fill_circle(&mut self, center: Point, radius: f32, color: Rgb) {
        let (cx, cy) = self.to_device(center);
        let rx = radius * self.scale_x;
        let ry = radius * self.scale_y;
        for py in (cy - ry).floor() as i32..=(cy + ry).ceil() as i32 {
            for px in (cx - rx).floor() as i32..=(cx + rx).ceil() as i32 {
                let dx = (px as f32 + 0.5 - cx) / rx.max(0.5);
                let dy = (py as f32 + 0.5 - cy) / ry.max(0.5);
                if dx * dx + dy * dy <= 1.0 {
                    self.set(px, py, color);
                }
            }
        }
    }

    /// Fill an upward-pointing triangle (flames)
    pub fn fill_triangle(&mut self, apex: Point, base_half_width: f32, height: f32, color: Rgb) {
        let (ax, ay) = self.to_device(apex);
        let dh = height * self.scale_y;
        let dw = base_half_width * self.scale_x;
        let rows = (dh.ceil() as i32).max(1);
        for i in 0..=rows {
            let t = i as f32 / rows as f32;
            let half = dw * t;
            let py = (ay + dh * t) as i32;
            for px in (ax - half).floor() as i32..=(ax + half).ceil() as i32 {
                self.set(px, py, color);
            }
        }
    }

    /// Dark horizontal scanlines over everything, every `spacing` virtual
    /// pixels (the LED-panel look)
    pub fn draw_scanlines(&mut self, spacing: f32, color: Rgb) {
        let step = (spacing * self.scale_y).max(2.0);
        let mut fy = 0.0;
        while (fy as i32) < self.height as i32 {
            for px in 0..self.width as i32 {
                self.set(px, fy as i32, color);
            }
            fy += step;
        }
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    /// Blit the framebuffer into a ratatui buffer using half-block cells
    pub fn blit(&self, buf: &mut Buffer) {
        let area = buf.area;
        let rows = (self.height / 2).min(area.height as usize);
        let cols = self.width.min(area.width as usize);

        for row in 0..rows {
            for col in 0..cols {
                let top = self.pixels[(row * 2) * self.width + col];
                let bottom = self.pixels[(row * 2 + 1) * self.width + col];
                let style = Style::default()
                    .fg(Color::Rgb(top.r, top.g, top.b))
                    .bg(Color::Rgb(bottom.r, bottom.g, bottom.b));
                buf.set_string(area.x + col as u16, area.y + row as u16, "\u{2580}", style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ratatui::layout::Rect;

    #[test]
    fn test_pixel_roundtrip_and_clip() {
        let mut surface = PixelSurface::new(80, 24);
        surface.set(5, 5, Rgb::new(10, 20, 30));
        assert_eq!(surface.get(5, 5), Rgb::new(10, 20, 30));
        // Out of bounds reads background, writes are dropped
        surface.set(-1, 0, Rgb::new(1, 1, 1));
        surface.set(1000, 0, Rgb::new(1, 1, 1));
        assert_eq!(surface.get(-1, 0), BACKGROUND);
    }

    #[test]
    fn test_surface_doubles_vertical_resolution() {
        let surface = PixelSurface::new(80, 24);
        assert_eq!(surface.size(), (80, 48));
    }

    #[test]
    fn test_rect_fill_lands_where_scaled() {
        let mut surface = PixelSurface::new(80, 30);
        // A rect covering the whole virtual canvas paints every pixel
        surface.fill_rounded_rect(
            Point::new(0.0, 0.0),
            VIRTUAL_WIDTH,
            VIRTUAL_HEIGHT,
            0.0,
            Rgb::new(50, 50, 50),
        );
        assert_eq!(surface.get(0, 0), Rgb::new(50, 50, 50));
        assert_eq!(surface.get(79, 59), Rgb::new(50, 50, 50));
    }

    #[test]
    fn test_blit_writes_half_blocks() {
        let mut surface = PixelSurface::new(10, 5);
        surface.fill_rounded_rect(
            Point::new(0.0, 0.0),
            VIRTUAL_WIDTH,
            VIRTUAL_HEIGHT,
            0.0,
            Rgb::new(200, 0, 0),
        );

        let mut buf = Buffer::empty(Rect::new(0, 0, 10, 5));
        surface.blit(&mut buf);
        let cell = &buf[(0, 0)];
        assert_eq!(cell.symbol(), "\u{2580}");
    }

    #[test]
    fn test_circle_stays_roughly_inside_bounds() {
        let mut surface = PixelSurface::new(80, 30);
        surface.fill_circle(Point::new(400.0, 300.0), 50.0, Rgb::new(0, 255, 0));
        // Center painted
        assert_eq!(surface.get(40, 30), Rgb::new(0, 255, 0));
        // Far corner untouched
        assert_eq!(surface.get(0, 0), BACKGROUND);
    }
}
