use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::StageConfig;
use crate::render::{FrameCanvas, Rgb};
use crate::text::TextStencil;

/// Life countdown divisor used to derive a particle's alpha.
const ALPHA_LIFE_SCALE: f32 = 100.0;

/// Screen-space point, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One rendered point of a burst.
///
/// A particle with a target is in the converging regime and eases toward
/// it; one without obeys velocity and gravity. Either way its life drops
/// by one per tick and it is pruned the tick life reaches zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub target: Option<(f32, f32)>,
    pub color: Rgb,
    pub life: i32,
}

impl Particle {
    /// Render alpha derived from the remaining life, clamped to `[0, 1]`.
    pub fn alpha(&self) -> f32 {
        (self.life as f32 / ALPHA_LIFE_SCALE).clamp(0.0, 1.0)
    }
}

/// Holds the live particle set and evolves it frame by frame.
///
/// The stage is a continuously running simulation; the only state beyond
/// the particle vector is the seeded random source. Population size is the
/// sole observable of interest: "has live particles" vs "empty".
pub struct ParticleStage {
    config: StageConfig,
    stencil: Box<dyn TextStencil>,
    particles: Vec<Particle>,
    rng: fastrand::Rng,
}

impl ParticleStage {
    pub fn new(config: StageConfig, stencil: Box<dyn TextStencil>) -> Self {
        Self {
            config,
            stencil,
            particles: Vec::new(),
            rng: fastrand::Rng::new(),
        }
    }

    /// Like [`ParticleStage::new`] but with a fixed random seed, so spawn
    /// velocities, lifetimes and burst colors are reproducible.
    pub fn with_seed(config: StageConfig, stencil: Box<dyn TextStencil>, seed: u64) -> Self {
        let mut stage = Self::new(config, stencil);
        stage.rng = fastrand::Rng::with_seed(seed);
        stage
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Inserts one particle into the live set.
    pub fn spawn_particle(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    /// Rasterises `text`, samples the mask and inserts one converging
    /// particle per lit cell. All particles of a burst start coincident at
    /// `origin` and share one randomly drawn palette color; an empty or
    /// all-transparent mask spawns nothing. Never blocks.
    pub fn spawn_text_burst(&mut self, origin: Point, text: &str) {
        let mask = self.stencil.stencil(text);
        let offsets = mask.sample_offsets(self.config.sample_stride, self.config.alpha_threshold);
        if offsets.is_empty() {
            debug!(text, "burst mask is empty, nothing to spawn");
            return;
        }

        let color = if self.config.palette.is_empty() {
            Rgb::WHITE
        } else {
            self.config.palette[self.rng.usize(..self.config.palette.len())]
        };

        for (dx, dy) in &offsets {
            let particle = Particle {
                x: origin.x,
                y: origin.y,
                vx: (self.rng.f32() - 0.5) * 2.0 * self.config.spawn_speed,
                vy: (self.rng.f32() - 0.5) * 2.0 * self.config.spawn_speed,
                target: Some((
                    origin.x + dx * self.config.target_scale,
                    origin.y + dy * self.config.target_scale,
                )),
                color,
                life: self.config.min_life + self.rng.i32(0..=self.config.extra_life),
            };
            self.spawn_particle(particle);
        }

        debug!(text, count = offsets.len(), "spawned text burst");
    }

    /// Advances one render tick: clears the canvas, steps physics and
    /// lifecycle, then draws the survivors.
    pub fn advance(&mut self, canvas: &mut FrameCanvas) {
        canvas.clear();
        self.step();
        for particle in &self.particles {
            canvas.draw_particle(
                particle.x,
                particle.y,
                self.config.particle_radius,
                particle.color,
                particle.alpha(),
            );
        }
    }

    /// Physics-and-lifecycle step without rendering, for headless paths.
    pub fn advance_physics(&mut self) {
        self.step();
    }

    fn step(&mut self) {
        // Reverse index order so removals never disturb the walk; the
        // element swapped in from the tail has already been stepped.
        for index in (0..self.particles.len()).rev() {
            let particle = &mut self.particles[index];
            match particle.target {
                Some((target_x, target_y)) => {
                    particle.x += (target_x - particle.x) * self.config.convergence_rate;
                    particle.y += (target_y - particle.y) * self.config.convergence_rate;
                    particle.vx *= self.config.velocity_decay;
                    particle.vy *= self.config.velocity_decay;
                }
                None => {
                    particle.x += particle.vx;
                    particle.y += particle.vy;
                    particle.vy += self.config.gravity;
                }
            }

            particle.life -= 1;
            if particle.life <= 0 {
                self.particles.swap_remove(index);
            }
        }
    }
}

impl std::fmt::Debug for ParticleStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleStage")
            .field("particles", &self.particles.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StencilConfig;
    use crate::text::{BlankStencil, TextMask, TextStencil};

    /// Stencil that lights a fixed block of cells, standing in for a real
    /// glyph rasteriser.
    struct BlockStencil;

    impl TextStencil for BlockStencil {
        fn stencil(&self, text: &str) -> TextMask {
            let mut mask = TextMask::new(300, 100);
            if text.is_empty() {
                return mask;
            }
            for x in 120..180 {
                for y in 40..60 {
                    mask.set(x, y, 255);
                }
            }
            mask
        }
    }

    fn build_stage() -> ParticleStage {
        ParticleStage::with_seed(StageConfig::default(), Box::new(BlockStencil), 7)
    }

    fn ballistic_particle() -> Particle {
        Particle {
            x: 10.0,
            y: 10.0,
            vx: 1.0,
            vy: -2.0,
            target: None,
            color: Rgb::WHITE,
            life: 30,
        }
    }

    #[test]
    fn burst_count_is_positive_and_repeatable() {
        let mut first = build_stage();
        first.spawn_text_burst(Point::new(100.0, 100.0), "ACCEPT");
        assert!(first.len() > 0);

        let mut second = build_stage();
        second.spawn_text_burst(Point::new(100.0, 100.0), "ACCEPT");
        assert_eq!(first.len(), second.len());
        assert_eq!(first.particles(), second.particles());
    }

    #[test]
    fn blank_stencil_spawns_nothing() {
        let mut stage = ParticleStage::with_seed(
            StageConfig::default(),
            Box::new(BlankStencil::new(StencilConfig::default())),
            7,
        );
        stage.spawn_text_burst(Point::new(100.0, 100.0), "ACCEPT");
        assert!(stage.is_empty());
    }

    #[test]
    fn empty_text_spawns_nothing() {
        let mut stage = build_stage();
        stage.spawn_text_burst(Point::new(100.0, 100.0), "");
        assert!(stage.is_empty());
    }

    #[test]
    fn burst_shares_one_color_and_starts_coincident() {
        let mut stage = build_stage();
        let origin = Point::new(100.0, 100.0);
        stage.spawn_text_burst(origin, "ACCEPT");

        let first = stage.particles()[0].clone();
        for particle in stage.particles() {
            assert_eq!(particle.color, first.color);
            assert_eq!((particle.x, particle.y), (origin.x, origin.y));
            assert!(particle.target.is_some());
            assert!((100..=150).contains(&particle.life));
            assert!(particle.vx.abs() <= 2.0 && particle.vy.abs() <= 2.0);
        }
    }

    #[test]
    fn life_decreases_by_one_per_tick() {
        let mut stage = build_stage();
        stage.spawn_text_burst(Point::new(100.0, 100.0), "ACCEPT");
        let before: Vec<i32> = stage.particles().iter().map(|p| p.life).collect();

        stage.advance_physics();
        let after: Vec<i32> = stage.particles().iter().map(|p| p.life).collect();
        assert_eq!(before.len(), after.len());
        for (b, a) in before.iter().zip(&after) {
            assert_eq!(b - 1, *a);
        }
    }

    #[test]
    fn expired_particles_are_pruned_the_same_tick() {
        let mut stage = build_stage();
        stage.spawn_particle(Particle {
            life: 1,
            ..ballistic_particle()
        });

        stage.advance_physics();
        assert!(stage.is_empty());
    }

    #[test]
    fn burst_is_extinct_after_max_life_ticks() {
        let mut stage = build_stage();
        stage.spawn_text_burst(Point::new(100.0, 100.0), "ACCEPT");
        assert!(!stage.is_empty());

        for _ in 0..150 {
            stage.advance_physics();
        }
        assert!(stage.is_empty());
    }

    #[test]
    fn converging_particles_approach_their_target() {
        let mut stage = build_stage();
        stage.spawn_particle(Particle {
            x: 0.0,
            y: 0.0,
            vx: 2.0,
            vy: 2.0,
            target: Some((100.0, 50.0)),
            color: Rgb::WHITE,
            life: 50,
        });

        let mut previous_distance = f32::MAX;
        for _ in 0..20 {
            stage.advance_physics();
            let particle = &stage.particles()[0];
            let (tx, ty) = particle.target.unwrap();
            let distance = ((tx - particle.x).powi(2) + (ty - particle.y).powi(2)).sqrt();
            assert!(distance < previous_distance);
            // Exponential approach never lands exactly on the target.
            assert!(distance > 0.0);
            previous_distance = distance;
        }
    }

    #[test]
    fn ballistic_particles_fall_under_gravity() {
        let mut stage = build_stage();
        stage.spawn_particle(ballistic_particle());

        stage.advance_physics();
        let particle = &stage.particles()[0];
        assert_eq!(particle.x, 11.0);
        assert_eq!(particle.y, 8.0);
        assert!((particle.vy - -1.95).abs() < 1e-6);
    }

    #[test]
    fn alpha_tracks_life_and_clamps() {
        let long_lived = Particle {
            life: 140,
            ..ballistic_particle()
        };
        assert_eq!(long_lived.alpha(), 1.0);

        let fading = Particle {
            life: 50,
            ..ballistic_particle()
        };
        assert_eq!(fading.alpha(), 0.5);
    }

    #[test]
    fn advance_renders_survivors() {
        let mut stage = build_stage();
        let mut canvas = FrameCanvas::new(200, 200);
        stage.spawn_text_burst(Point::new(100.0, 100.0), "ACCEPT");

        stage.advance(&mut canvas);
        let lit = (0..200).any(|x| {
            (0..200).any(|y| canvas.pixel(x, y).map(|p| p.alpha() > 0).unwrap_or(false))
        });
        assert!(lit);
    }
}
