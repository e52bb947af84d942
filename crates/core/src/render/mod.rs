use std::path::Path;

use serde::{Deserialize, Serialize};
use tiny_skia::{BlendMode, Color, FillRule, Paint, PathBuilder, Pixmap, Transform};

use crate::{FireworksError, Result};

/// Halo radius added around the particle core; approximates a 10px
/// shadow-blur glow.
const GLOW_RADIUS: f32 = 10.0;
const GLOW_ALPHA: f32 = 0.25;

/// Categorical particle color. Stored as plain channels so palettes can
/// live in serialised configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn to_color(self, alpha: f32) -> Color {
        let alpha = (alpha.clamp(0.0, 1.0) * 255.0) as u8;
        Color::from_rgba8(self.r, self.g, self.b, alpha)
    }
}

/// Drawing surface sized to the viewport.
///
/// A zero-area viewport leaves the canvas without a backing pixmap; every
/// drawing call is then a no-op until the next resize, mirroring the
/// resource-absence policy for a not-yet-mounted surface.
#[derive(Debug)]
pub struct FrameCanvas {
    pixmap: Option<Pixmap>,
    width: u32,
    height: u32,
}

impl FrameCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixmap: Pixmap::new(width, height),
            width,
            height,
        }
    }

    /// Reactively matches the canvas to a new viewport size, dropping the
    /// previous frame's contents.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether a drawable surface currently exists.
    pub fn is_available(&self) -> bool {
        self.pixmap.is_some()
    }

    /// Clears the prior frame's rendering.
    pub fn clear(&mut self) {
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill(Color::TRANSPARENT);
        }
    }

    /// Draws one particle: an additive glow halo under a filled core
    /// circle, both tinted with the particle color and alpha.
    pub fn draw_particle(&mut self, x: f32, y: f32, radius: f32, color: Rgb, alpha: f32) {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        fill_circle(
            pixmap,
            x,
            y,
            radius + GLOW_RADIUS,
            color.to_color(alpha * GLOW_ALPHA),
            BlendMode::Plus,
        );
        fill_circle(pixmap, x, y, radius, color.to_color(alpha), BlendMode::SourceOver);
    }

    /// Reads back one premultiplied pixel, if the surface exists and the
    /// coordinates are in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<tiny_skia::PremultipliedColorU8> {
        self.pixmap.as_ref().and_then(|pixmap| pixmap.pixel(x, y))
    }

    /// Writes the current frame out as a PNG. Used by the CLI demo.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        let pixmap = self
            .pixmap
            .as_ref()
            .ok_or_else(|| FireworksError::Render("canvas has no drawable surface".into()))?;
        pixmap
            .save_png(path)
            .map_err(|err| FireworksError::Render(err.to_string()))
    }
}

fn fill_circle(
    pixmap: &mut Pixmap,
    x: f32,
    y: f32,
    radius: f32,
    color: Color,
    blend_mode: BlendMode,
) {
    let Some(path) = PathBuilder::from_circle(x, y, radius) else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint.blend_mode = blend_mode;
    pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
}
