use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle, Rectangle};
use embedded_graphics::text::Text;

use crate::detection::domain::expression::{Expression, ExpressionScores};
use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::overlay::domain::overlay_renderer::OverlayRenderer;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

const BOX_COLOR: Rgb888 = Rgb888::new(45, 212, 191);
const LANDMARK_COLOR: Rgb888 = Rgb888::new(255, 80, 80);
const BAR_COLOR: Rgb888 = Rgb888::new(94, 234, 212);
const TEXT_COLOR: Rgb888 = Rgb888::new(255, 255, 255);
const TEXT_BG_COLOR: Rgb888 = Rgb888::new(16, 24, 32);

const BOX_STROKE: u32 = 2;
const LANDMARK_DIAMETER: u32 = 3;
const BAR_MAX_WIDTH: f64 = 60.0;
const BAR_HEIGHT: u32 = 3;
const BAR_GAP: i32 = 2;
const LINE_HEIGHT: i32 = 12;

/// Software overlay: an RGBA surface rasterized with embedded-graphics
/// primitives. Alpha is binary (drawn or transparent) so compositing onto
/// the camera frame is a plain overwrite.
pub struct FrameOverlayRenderer {
    surface: Frame,
}

impl FrameOverlayRenderer {
    pub fn new() -> Self {
        Self {
            surface: Frame::new(Vec::new(), 0, 0, 4, 0),
        }
    }

    pub fn surface(&self) -> &Frame {
        &self.surface
    }

    /// Overwrites `frame` pixels wherever the overlay has been drawn.
    /// Sizes must match; mismatches composite nothing.
    pub fn composite_onto(&self, frame: &mut Frame) {
        if frame.width() != self.surface.width()
            || frame.height() != self.surface.height()
            || frame.channels() != 3
        {
            return;
        }
        let overlay = self.surface.data();
        let out = frame.data_mut();
        for i in 0..(overlay.len() / 4) {
            if overlay[i * 4 + 3] != 0 {
                out[i * 3] = overlay[i * 4];
                out[i * 3 + 1] = overlay[i * 4 + 1];
                out[i * 3 + 2] = overlay[i * 4 + 2];
            }
        }
    }

    fn target(&mut self) -> SurfaceTarget<'_> {
        SurfaceTarget {
            surface: &mut self.surface,
        }
    }
}

impl Default for FrameOverlayRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayRenderer for FrameOverlayRenderer {
    fn match_dimensions(&mut self, width: u32, height: u32) {
        if self.surface.width() != width || self.surface.height() != height {
            self.surface = Frame::new(
                vec![0u8; (width * height * 4) as usize],
                width,
                height,
                4,
                0,
            );
        }
    }

    fn clear(&mut self) {
        self.surface.data_mut().fill(0);
    }

    fn draw_box(&mut self, region: &Region) {
        let rect = Rectangle::new(
            Point::new(region.x, region.y),
            Size::new(region.width.max(0) as u32, region.height.max(0) as u32),
        );
        let _ = rect
            .into_styled(PrimitiveStyle::with_stroke(BOX_COLOR, BOX_STROKE))
            .draw(&mut self.target());
    }

    fn draw_landmarks(&mut self, landmarks: &FaceLandmarks) {
        let style = PrimitiveStyle::with_fill(LANDMARK_COLOR);
        for &(x, y) in landmarks.points() {
            let top_left = Point::new(
                x.round() as i32 - (LANDMARK_DIAMETER as i32) / 2,
                y.round() as i32 - (LANDMARK_DIAMETER as i32) / 2,
            );
            let _ = Circle::new(top_left, LANDMARK_DIAMETER)
                .into_styled(style)
                .draw(&mut self.target());
        }
    }

    fn draw_expression_bars(&mut self, region: &Region, scores: &ExpressionScores) {
        let bars = Expression::ALL.len() as i32;
        let stack_height = bars * (BAR_HEIGHT as i32 + BAR_GAP);
        let mut y = (region.y - stack_height).max(0);

        for &expression in &Expression::ALL {
            let width = (scores.score(expression).clamp(0.0, 1.0) * BAR_MAX_WIDTH) as u32;
            if width > 0 {
                let _ = Rectangle::new(Point::new(region.x, y), Size::new(width, BAR_HEIGHT))
                    .into_styled(PrimitiveStyle::with_fill(BAR_COLOR))
                    .draw(&mut self.target());
            }
            y += BAR_HEIGHT as i32 + BAR_GAP;
        }
    }

    fn draw_label(&mut self, region: &Region, lines: &[String]) {
        let style = MonoTextStyle::new(&FONT_6X10, TEXT_COLOR);
        let glyph_width = FONT_6X10.character_size.width as i32;
        let anchor_x = region.x;
        let mut baseline_y = region.y + region.height + LINE_HEIGHT;

        for line in lines {
            let bg_width = (line.chars().count() as i32 * glyph_width + 4).max(0) as u32;
            let _ = Rectangle::new(
                Point::new(anchor_x, baseline_y - LINE_HEIGHT + 2),
                Size::new(bg_width, LINE_HEIGHT as u32),
            )
            .into_styled(PrimitiveStyle::with_fill(TEXT_BG_COLOR))
            .draw(&mut self.target());

            let _ = Text::new(line, Point::new(anchor_x + 2, baseline_y), style)
                .draw(&mut self.target());
            baseline_y += LINE_HEIGHT;
        }
    }
}

/// Adapter exposing the RGBA surface as an embedded-graphics draw target.
/// Out-of-bounds pixels are discarded.
struct SurfaceTarget<'a> {
    surface: &'a mut Frame,
}

impl OriginDimensions for SurfaceTarget<'_> {
    fn size(&self) -> Size {
        Size::new(self.surface.width(), self.surface.height())
    }
}

impl DrawTarget for SurfaceTarget<'_> {
    type Color = Rgb888;
    type Error = std::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let width = self.surface.width() as i32;
        let height = self.surface.height() as i32;
        let data = self.surface.data_mut();

        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 || point.x >= width || point.y >= height {
                continue;
            }
            let i = ((point.y * width + point.x) * 4) as usize;
            data[i] = color.r();
            data[i + 1] = color.g();
            data[i + 2] = color.b();
            data[i + 3] = 255;
        }
        Ok(())
    }
}
