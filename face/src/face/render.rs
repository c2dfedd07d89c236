//! Renderer
//!
//! Pure consumer of a resolved [`FrameSnapshot`]: paints scanlines, eyes
//! (in whichever silhouette the scheduler picked), brows, mouth, overlays
//! and caption. No timers, no randomness, no scheduling decisions - by
//! the time this code runs, the frame is already decided.

use ratatui::buffer::Buffer;
use ratatui::style::{Color, Modifier, Style};

use otto_core::Rgb;

use super::scheduler::{EyeVariant, FlyView, FrameSnapshot, SheepView};
use super::surface::{PixelSurface, BACKGROUND};
use super::transition::Point;
use super::{CENTER_X, CENTER_Y, EYE_HEIGHT, EYE_SPACING, EYE_WIDTH};

/// Scanline color (very dark gray)
const SCANLINE_COLOR: Rgb = Rgb::new(10, 10, 10);
/// Scanline spacing in virtual pixels
const SCANLINE_SPACING: f32 = 4.0;
/// Bloom outline layers around each eye
const BLOOM_LAYERS: u32 = 3;
/// Bloom inflate step per layer, virtual pixels
const BLOOM_SIZE: f32 = 4.0;
/// Bloom brightness at the innermost layer
const BLOOM_INTENSITY: f32 = 0.4;
/// Evil mode ignores the current color and burns orange-red
const EVIL_COLOR: Rgb = Rgb::new(255, 69, 0);
/// Mouth span in virtual pixels
const MOUTH_WIDTH: f32 = 100.0;
/// Brow span in virtual pixels
const BROW_WIDTH: f32 = 110.0;
/// How far brows shift toward the nose
const BROW_INWARD_SHIFT: f32 = 15.0;
/// Brow curve control point multiplier
const BROW_CURVE_INTENSITY: f32 = 2.0;

/// Owns the pixel surface and paints one frame at a time
pub struct Renderer {
    surface: PixelSurface,
    /// Set while drawing thinking eyes so the question mark is painted
    /// exactly once, after the pixel blit
    queue_question_mark: Option<f32>,
}

impl Renderer {
    /// Renderer for a terminal area of `cols` x `rows` cells
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            surface: PixelSurface::new(cols, rows),
            queue_question_mark: None,
        }
    }

    /// Rebuild the surface after a terminal resize
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.surface = PixelSurface::new(cols, rows);
    }

    /// Paint a frame into the buffer
    pub fn render(&mut self, snapshot: &FrameSnapshot, caption: Option<(&str, f32)>, buf: &mut Buffer) {
        self.surface.clear();
        self.surface.draw_scanlines(SCANLINE_SPACING, SCANLINE_COLOR);

        let left = Point::new(
            CENTER_X - EYE_SPACING / 2.0 - EYE_WIDTH / 2.0 + snapshot.look.x,
            CENTER_Y + snapshot.look.y,
        );
        let right = Point::new(
            CENTER_X + EYE_SPACING / 2.0 + EYE_WIDTH / 2.0 + snapshot.look.x,
            CENTER_Y + snapshot.look.y,
        );

        match snapshot.variant {
            EyeVariant::Baseline => {
                for center in [left, right] {
                    self.draw_baseline_eye(center, snapshot);
                }
            }
            EyeVariant::Laughing { bounce } => {
                for center in [left, right] {
                    self.draw_laughing_eye(center, bounce, snapshot.color);
                }
            }
            EyeVariant::Thinking { question_bounce } => {
                for center in [left, right] {
                    self.draw_thinking_eye(center, snapshot.color);
                }
                // The question mark is drawn once, after both eyes
                self.queue_question_mark = Some(question_bounce);
            }
            EyeVariant::Evil { bounce } => {
                for center in [left, right] {
                    self.draw_evil_eye(center, bounce);
                }
            }
        }

        self.draw_brows(left, right, snapshot);
        self.draw_mouth(snapshot);

        for flame in &snapshot.flames {
            self.draw_flame(flame.x, flame.y, flame.size, flame.life);
        }
        for sheep in &snapshot.sheep {
            self.draw_sheep(sheep);
        }
        if let Some(fly) = snapshot.fly {
            self.draw_fly(fly, snapshot.color, left, right);
        }

        self.surface.blit(buf);

        // Cell-space passes over the blitted pixels
        if let Some(question_bounce) = self.queue_question_mark.take() {
            Self::draw_question_mark(buf, question_bounce, snapshot.color);
        }
        if let Some((text, opacity)) = caption {
            Self::draw_caption(buf, text, opacity);
        }
    }

    // ------------------------------------------------------------------
    // Eyes
    // ------------------------------------------------------------------

    fn draw_baseline_eye(&mut self, center: Point, snapshot: &FrameSnapshot) {
        let height = (EYE_HEIGHT * snapshot.eye_height_scale).max(2.0);
        let radius = snapshot.shape.corner_radius().min(height / 2.0);
        let y = center.y + snapshot.eye_bounce;

        for layer in (1..=BLOOM_LAYERS).rev() {
            let inflate = BLOOM_SIZE * layer as f32;
            self.surface.fill_rounded_rect(
                Point::new(
                    center.x - (EYE_WIDTH + inflate) / 2.0,
                    y - (height + inflate) / 2.0,
                ),
                EYE_WIDTH + inflate,
                height + inflate,
                radius,
                bloom_color(snapshot.color, layer),
            );
        }

        self.surface.fill_rounded_rect(
            Point::new(center.x - EYE_WIDTH / 2.0, y - height / 2.0),
            EYE_WIDTH,
            height,
            radius,
            snapshot.color,
        );
    }

    fn draw_laughing_eye(&mut self, center: Point, bounce: f32, color: Rgb) {
        let x = center.x - EYE_WIDTH / 2.0;
        let y = center.y - EYE_HEIGHT / 2.0 + bounce;
        let thickness = 14.0;

        // Inverted V: peak in the middle, feet at the bottom corners
        let ridge = move |t: f32| y + EYE_HEIGHT * (2.0 * (t - 0.5).abs());

        for layer in (1..=BLOOM_LAYERS).rev() {
            let spread = thickness + BLOOM_SIZE * layer as f32;
            let color = bloom_color(color, layer);
            self.surface.fill_between_curves(
                x,
                EYE_WIDTH,
                move |t| ridge(t) - spread / 2.0,
                move |t| ridge(t) + spread / 2.0,
                color,
            );
        }

        self.surface.fill_between_curves(
            x,
            EYE_WIDTH,
            move |t| ridge(t) - thickness / 2.0,
            move |t| ridge(t) + thickness / 2.0,
            color,
        );
    }

    fn draw_thinking_eye(&mut self, center: Point, color: Rgb) {
        let x = center.x - EYE_WIDTH / 2.0;
        let y = center.y - EYE_HEIGHT / 2.0;

        for layer in (1..=BLOOM_LAYERS).rev() {
            let inflate = BLOOM_SIZE * layer as f32;
            let color = bloom_color(color, layer);
            // Vertical bar
            self.surface.fill_rounded_rect(
                Point::new(x + EYE_WIDTH / 3.0 - inflate / 2.0, y - inflate / 2.0),
                EYE_WIDTH / 3.0 + inflate,
                EYE_HEIGHT + inflate,
                10.0,
                color,
            );
            // Horizontal bar
            self.surface.fill_rounded_rect(
                Point::new(x - inflate / 2.0, y + EYE_HEIGHT / 3.0 - inflate / 2.0),
                EYE_WIDTH + inflate,
                EYE_HEIGHT / 3.0 + inflate,
                10.0,
                color,
            );
        }

        self.surface.fill_rounded_rect(
            Point::new(x + EYE_WIDTH / 3.0, y),
            EYE_WIDTH / 3.0,
            EYE_HEIGHT,
            10.0,
            color,
        );
        self.surface.fill_rounded_rect(
            Point::new(x, y + EYE_HEIGHT / 3.0),
            EYE_WIDTH,
            EYE_HEIGHT / 3.0,
            10.0,
            color,
        );
    }

    fn draw_evil_eye(&mut self, center: Point, bounce: f32) {
        let x = center.x - EYE_WIDTH / 2.0;
        let y = center.y - EYE_HEIGHT / 2.0 + bounce;

        // Sharp lens: both edges pinch to points at the sides
        let top = move |t: f32| y + EYE_HEIGHT * 0.3 * (t * std::f32::consts::PI).sin();
        let bottom = move |t: f32| y + EYE_HEIGHT * (1.0 - 0.3 * (t * std::f32::consts::PI).sin());

        for layer in (1..=BLOOM_LAYERS).rev() {
            let inflate = BLOOM_SIZE * layer as f32;
            let color = bloom_color(EVIL_COLOR, layer);
            self.surface.fill_between_curves(
                x - inflate / 2.0,
                EYE_WIDTH + inflate,
                move |t| top(t) - inflate / 2.0,
                move |t| bottom(t) + inflate / 2.0,
                color,
            );
        }

        self.surface
            .fill_between_curves(x, EYE_WIDTH, top, bottom, EVIL_COLOR);
    }

    // ------------------------------------------------------------------
    // Brows and mouth
    // ------------------------------------------------------------------

    fn draw_brows(&mut self, left: Point, right: Point, snapshot: &FrameSnapshot) {
        // Brows make no sense over the evil silhouette
        if matches!(snapshot.variant, EyeVariant::Evil { .. }) {
            return;
        }

        let brow_y = left.y - EYE_HEIGHT / 2.0 - 35.0;
        let angle = snapshot.brow_angle;
        let bounce = snapshot.brow_bounce;

        for (eye, is_left) in [(left, true), (right, false)] {
            let base_x = eye.x - EYE_WIDTH / 2.0 - 5.0;
            let x = base_x
                + if is_left {
                    BROW_INWARD_SHIFT
                } else {
                    -BROW_INWARD_SHIFT
                };

            // Control points lift the brow by the emotion angle; the outer
            // end curves harder than the inner one
            let (cp1_y, cp2_y) = if is_left {
                (
                    brow_y - angle * 0.8,
                    brow_y - angle * BROW_CURVE_INTENSITY,
                )
            } else {
                (
                    brow_y - angle * BROW_CURVE_INTENSITY,
                    brow_y - angle * 0.8,
                )
            };
            let p0 = Point::new(x, brow_y + bounce);
            let p1 = Point::new(x + BROW_WIDTH * 0.3, cp1_y + bounce);
            let p2 = Point::new(x + BROW_WIDTH * 0.7, cp2_y + bounce);
            let p3 = Point::new(x + BROW_WIDTH, brow_y + bounce);

            let mut prev = p0;
            let steps = 24;
            for i in 1..=steps {
                let t = i as f32 / steps as f32;
                let next = cubic_bezier(p0, p1, p2, p3, t);
                self.surface.draw_line(prev, next, 7.0, snapshot.color);
                prev = next;
            }

            // Thin highlight pass for depth
            let highlight = lighten(snapshot.color, 40);
            let mut prev = p0;
            for i in 1..=steps {
                let t = i as f32 / steps as f32;
                let next = cubic_bezier(p0, p1, p2, p3, t);
                self.surface.draw_line(prev, next, 2.0, highlight);
                prev = next;
            }
        }
    }

    fn draw_mouth(&mut self, snapshot: &FrameSnapshot) {
        if matches!(snapshot.variant, EyeVariant::Evil { .. }) {
            return;
        }

        let center_x = CENTER_X + snapshot.look.x;
        let center_y = CENTER_Y + snapshot.look.y + EYE_HEIGHT / 2.0 + 30.0;
        let x0 = center_x - MOUTH_WIDTH / 2.0;
        let curve_height = snapshot.mouth_curve * 20.0;
        let lower_height = snapshot.mouth_curve * 15.0;
        let open = snapshot.mouth_open;

        let upper = move |t: f32| {
            let curve = (t * std::f32::consts::PI).sin();
            center_y + curve_height * curve - open * curve
        };
        let lower = move |t: f32| {
            let curve = (t * std::f32::consts::PI).sin();
            center_y + lower_height * curve + open * curve
        };

        // Mouth interior when open enough to see it
        if open > 1.0 {
            self.surface
                .fill_between_curves(x0, MOUTH_WIDTH, upper, lower, Rgb::new(40, 40, 40));
        }

        let steps = 32;
        let mut prev_u = Point::new(x0, upper(0.0));
        let mut prev_l = Point::new(x0, lower(0.0));
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            let x = x0 + MOUTH_WIDTH * t;
            let next_u = Point::new(x, upper(t));
            let next_l = Point::new(x, lower(t));
            self.surface.draw_line(prev_u, next_u, 4.0, snapshot.color);
            self.surface.draw_line(prev_l, next_l, 4.0, snapshot.color);
            prev_u = next_u;
            prev_l = next_l;
        }
    }

    // ------------------------------------------------------------------
    // Overlays
    // ------------------------------------------------------------------

    fn draw_fly(&mut self, fly: FlyView, color: Rgb, left: Point, right: Point) {
        match fly {
            FlyView::Buzzing { pos, wing_phase } => {
                self.surface.fill_circle(pos, 8.0, Rgb::new(100, 100, 100));
                let wing_offset = wing_phase.sin() * 3.0;
                for dx in [-5.0, 5.0] {
                    self.surface.fill_circle(
                        Point::new(pos.x + dx, pos.y - 5.0 + wing_offset),
                        3.0,
                        Rgb::new(150, 150, 150),
                    );
                }
            }
            FlyView::Zapping { pos } => {
                // Lasers from both eye centers, layered for bloom
                for layer in 0..3u32 {
                    let beam = color.blend(BACKGROUND, (100 - layer * 30) as f32 / 255.0);
                    let width = 3.0 + layer as f32 * 2.0;
                    self.surface.draw_line(left, pos, width, beam);
                    self.surface.draw_line(right, pos, width, beam);
                }
                self.surface.fill_circle(pos, 8.0, Rgb::new(100, 100, 100));
            }
            FlyView::Corpse { pos } => {
                let red = Rgb::new(255, 0, 0);
                self.surface.draw_line(
                    Point::new(pos.x - 5.0, pos.y - 5.0),
                    Point::new(pos.x + 5.0, pos.y + 5.0),
                    2.0,
                    red,
                );
                self.surface.draw_line(
                    Point::new(pos.x - 5.0, pos.y + 5.0),
                    Point::new(pos.x + 5.0, pos.y - 5.0),
                    2.0,
                    red,
                );
            }
        }
    }

    fn draw_sheep(&mut self, sheep: &SheepView) {
        let white = Rgb::new(255, 255, 255);
        let gray = Rgb::new(200, 200, 200);
        let pos = Point::new(sheep.x, sheep.y);

        // Fluffy body: three overlapping circles
        self.surface.fill_circle(pos, 15.0, white);
        self.surface
            .fill_circle(Point::new(sheep.x - 10.0, sheep.y - 5.0), 12.0, white);
        self.surface
            .fill_circle(Point::new(sheep.x + 10.0, sheep.y - 5.0), 12.0, white);

        // Head leads in the direction of travel
        self.surface.fill_circle(
            Point::new(sheep.x + 20.0 * sheep.direction, sheep.y + 5.0),
            8.0,
            gray,
        );

        // Legs wiggle as a function of position, so they walk
        let leg_offset = (sheep.x * 0.1).sin() * 3.0;
        self.surface.draw_line(
            Point::new(sheep.x - 5.0, sheep.y + 15.0),
            Point::new(sheep.x - 5.0, sheep.y + 25.0 + leg_offset),
            2.0,
            gray,
        );
        self.surface.draw_line(
            Point::new(sheep.x + 5.0, sheep.y + 15.0),
            Point::new(sheep.x + 5.0, sheep.y + 25.0 - leg_offset),
            2.0,
            gray,
        );
    }

    fn draw_flame(&mut self, x: f32, y: f32, size: f32, life: f32) {
        let color = Rgb::new(255, (255.0 * life) as u8, 0).blend(BACKGROUND, life.clamp(0.0, 1.0));
        let size = size * life;
        self.surface
            .fill_triangle(Point::new(x, y), size, size * 2.0, color);
    }

    // ------------------------------------------------------------------
    // Cell-space text passes
    // ------------------------------------------------------------------

    fn draw_question_mark(buf: &mut Buffer, bounce: f32, color: Rgb) {
        let area = buf.area;
        if area.width < 3 || area.height < 3 {
            return;
        }
        // Virtual (CENTER_X, CENTER_Y - 120 + bounce) to cell coordinates
        let col = area.x + area.width / 2;
        let virtual_y = (CENTER_Y - 120.0 + bounce) / super::VIRTUAL_HEIGHT;
        let row = area.y + ((area.height as f32 * virtual_y).round() as u16).min(area.height - 1);

        let style = Style::default()
            .fg(Color::Rgb(color.r, color.g, color.b))
            .add_modifier(Modifier::BOLD);
        buf.set_string(col, row, "?", style);
    }

    fn draw_caption(buf: &mut Buffer, text: &str, opacity: f32) {
        let area = buf.area;
        if area.width < 12 || area.height < 4 {
            return;
        }

        let max_width = (area.width as usize).saturating_sub(8);
        let lines = textwrap::wrap(text, max_width);

        // Fade toward black instead of alpha blending
        let faded = Rgb::new(0, 255, 255).blend(Rgb::new(0, 0, 0), opacity);
        let style = Style::default()
            .fg(Color::Rgb(faded.r, faded.g, faded.b))
            .bg(Color::Black);

        let total = lines.len().min(3) as u16;
        let mut y = area.y + area.height.saturating_sub(total + 1);
        for line in lines.iter().take(3) {
            let x = area.x + (area.width.saturating_sub(line.len() as u16)) / 2;
            // Solid plate a cell wider than the text on both sides
            let plate = format!(" {line} ");
            buf.set_string(x.saturating_sub(1), y, &plate, style);
            y += 1;
        }
    }
}

/// Bloom layer color: the eye color washed toward the background
fn bloom_color(color: Rgb, layer: u32) -> Rgb {
    color.blend(BACKGROUND, BLOOM_INTENSITY / (layer as f32 + 1.0))
}

/// Lift every channel by `amount`, saturating
fn lighten(color: Rgb, amount: u8) -> Rgb {
    Rgb::new(
        color.r.saturating_add(amount),
        color.g.saturating_add(amount),
        color.b.saturating_add(amount),
    )
}

/// Standard cubic bezier
fn cubic_bezier(p0: Point, p1: Point, p2: Point, p3: Point, t: f32) -> Point {
    let u = 1.0 - t;
    Point::new(
        u * u * u * p0.x + 3.0 * u * u * t * p1.x + 3.0 * u * t * t * p2.x + t * t * t * p3.x,
        u * u * u * p0.y + 3.0 * u * u * t * p1.y + 3.0 * u * t * t * p2.y + t * t * t * p3.y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::Scheduler;
    use ratatui::layout::Rect;
    use std::time::Instant;

    #[test]
    fn test_render_paints_something() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new(start);
        let snapshot = scheduler.tick(start + std::time::Duration::from_millis(16));

        let mut renderer = Renderer::new(80, 24);
        let mut buf = Buffer::empty(Rect::new(0, 0, 80, 24));
        renderer.render(&snapshot, None, &mut buf);

        // At least one cell carries the half-block glyph
        let painted = (0..24u16)
            .flat_map(|y| (0..80u16).map(move |x| (x, y)))
            .any(|(x, y)| buf[(x, y)].symbol() == "\u{2580}");
        assert!(painted);
    }

    #[test]
    fn test_caption_lands_near_the_bottom() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new(start);
        let snapshot = scheduler.tick(start + std::time::Duration::from_millis(16));

        let mut renderer = Renderer::new(80, 24);
        let mut buf = Buffer::empty(Rect::new(0, 0, 80, 24));
        renderer.render(&snapshot, Some(("hello world", 1.0)), &mut buf);

        let bottom_rows: String = (20..24u16)
            .flat_map(|y| (0..80u16).map(move |x| (x, y)))
            .map(|(x, y)| buf[(x, y)].symbol().to_string())
            .collect();
        assert!(bottom_rows.contains('h'));
    }

    #[test]
    fn test_bezier_hits_endpoints() {
        let p0 = Point::new(0.0, 0.0);
        let p3 = Point::new(10.0, 0.0);
        let p1 = Point::new(3.0, -5.0);
        let p2 = Point::new(7.0, -5.0);
        assert_eq!(cubic_bezier(p0, p1, p2, p3, 0.0), p0);
        assert_eq!(cubic_bezier(p0, p1, p2, p3, 1.0), p3);
    }

    #[test]
    fn test_bloom_fades_with_layer_depth() {
        let color = Rgb::new(0, 191, 255);
        let inner = bloom_color(color, 1);
        let outer = bloom_color(color, 3);
        // Outer layers sit closer to the background
        assert!(outer.b < inner.b);
        assert!(inner.b < color.b);
    }
}
