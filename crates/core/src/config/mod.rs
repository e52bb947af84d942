use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{render::Rgb, FireworksError, Result};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub classifier: ClassifierConfig,
    pub stage: StageConfig,
    pub stencil: StencilConfig,
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| FireworksError::msg(err.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|err| FireworksError::msg(err.to_string()))
    }
}

/// Tuning knobs for the gesture classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Minimum horizontal movement of the palm reference point between two
    /// frames, in normalised frame widths, for a wave to register.
    pub wave_delta_threshold: f32,
    /// Rate limit between firework launches, in milliseconds.
    pub wave_cooldown_ms: u64,
    /// Width of the target surface used to mirror wave positions into
    /// screen space. Updated on window resize.
    pub viewport_width: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            wave_delta_threshold: 0.08,
            wave_cooldown_ms: 600,
            viewport_width: 1280.0,
        }
    }
}

impl ClassifierConfig {
    pub fn wave_cooldown(&self) -> Duration {
        Duration::from_millis(self.wave_cooldown_ms)
    }
}

/// Tuning knobs for the particle stage. All motion constants are per tick,
/// not per second; a variable tick rate changes apparent speed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    /// Vertical acceleration applied to ballistic particles each tick.
    pub gravity: f32,
    /// Fraction of the remaining distance a converging particle covers per
    /// tick.
    pub convergence_rate: f32,
    /// Per-tick decay factor for the vestigial velocity of converging
    /// particles.
    pub velocity_decay: f32,
    /// Half-range of the random spawn velocity, per axis.
    pub spawn_speed: f32,
    /// Lower bound of the particle life countdown, in ticks.
    pub min_life: i32,
    /// Random extra life added on top of `min_life`, in ticks.
    pub extra_life: i32,
    /// Scale applied to mask offsets when placing convergence targets.
    pub target_scale: f32,
    /// Radius of the rendered particle core, in pixels.
    pub particle_radius: f32,
    /// Grid stride used when sampling the text mask, in pixels.
    pub sample_stride: u32,
    /// Mask cells with alpha above this value become particles.
    pub alpha_threshold: u8,
    /// Colors a burst may draw from; one is picked per burst.
    pub palette: Vec<Rgb>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            gravity: 0.05,
            convergence_rate: 0.1,
            velocity_decay: 0.9,
            spawn_speed: 2.0,
            min_life: 100,
            extra_life: 50,
            target_scale: 1.5,
            particle_radius: 2.0,
            sample_stride: 6,
            alpha_threshold: 128,
            palette: vec![
                Rgb::new(0xff, 0x00, 0x55),
                Rgb::new(0x00, 0xff, 0x88),
                Rgb::new(0x00, 0x99, 0xff),
                Rgb::new(0xff, 0xaa, 0x00),
                Rgb::new(0xcc, 0x00, 0xff),
                Rgb::new(0xff, 0xff, 0xff),
            ],
        }
    }
}

/// Geometry of the off-screen buffer the burst text is rasterised into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StencilConfig {
    pub width: u32,
    pub height: u32,
    /// Font size used for the rasterised text, in pixels.
    pub font_px: f32,
}

impl Default for StencilConfig {
    fn default() -> Self {
        Self {
            width: 300,
            height: 100,
            font_px: 60.0,
        }
    }
}
