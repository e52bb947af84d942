use std::time::Instant;

use tracing::debug;

use crate::config::AppConfig;
use crate::gesture::{Classification, GestureClassifier, GestureEvent, GestureState};
use crate::hand::HandFrame;
use crate::render::FrameCanvas;
use crate::stage::{ParticleStage, Point};
use crate::text::TextStencil;
use crate::wish::{resolve_wish, WishProvider};

/// Vertical launch position as a fraction of canvas height.
const LAUNCH_HEIGHT_FRACTION: f32 = 0.3;

/// Wires the classifier's events to the particle stage and the candle
/// latch, and owns the drawing surface.
///
/// Capture frames (~30/s) and render ticks (~60/s) arrive on independent
/// cadences; both mutate the session from one logical sequence of calls,
/// so no synchronisation is needed.
pub struct CelebrationSession {
    classifier: GestureClassifier,
    stage: ParticleStage,
    canvas: FrameCanvas,
    gesture: GestureState,
    candles_lit: bool,
    burst_text: String,
    wish: String,
}

impl CelebrationSession {
    pub fn new(
        config: AppConfig,
        stencil: Box<dyn TextStencil>,
        provider: &dyn WishProvider,
        name: &str,
        burst_text: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        let mut classifier = GestureClassifier::new(config.classifier.clone());
        classifier.set_viewport_width(width as f32);
        Self {
            classifier,
            stage: ParticleStage::new(config.stage.clone(), stencil),
            canvas: FrameCanvas::new(width, height),
            gesture: GestureState::None,
            candles_lit: false,
            burst_text: burst_text.into(),
            wish: resolve_wish(provider, name),
        }
    }

    /// Feeds one capture frame through the classifier and applies the
    /// resulting events: the first candle edge flips the one-way latch,
    /// each firework request spawns a burst at the mirrored position.
    pub fn ingest_frame(&mut self, frame: Option<&HandFrame>, now: Instant) -> Classification {
        let classification = self.classifier.classify(frame, now);
        self.gesture = classification.gesture;

        for event in &classification.events {
            match event {
                GestureEvent::CandlesLit => {
                    if !self.candles_lit {
                        debug!("candles lit");
                    }
                    // One-way latch: repeated edges are harmless no-ops.
                    self.candles_lit = true;
                }
                GestureEvent::FireworkRequested { x } => {
                    let origin =
                        Point::new(*x, self.canvas.height() as f32 * LAUNCH_HEIGHT_FRACTION);
                    self.stage.spawn_text_burst(origin, &self.burst_text);
                }
            }
        }

        classification
    }

    /// Advances the particle simulation one render tick.
    pub fn tick(&mut self) {
        self.stage.advance(&mut self.canvas);
    }

    /// Matches the drawing surface and the mirror width to a new viewport.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas.resize(width, height);
        self.classifier.set_viewport_width(width as f32);
    }

    /// Latest classified pose, for the status readout.
    pub fn gesture(&self) -> GestureState {
        self.gesture
    }

    pub fn candles_lit(&self) -> bool {
        self.candles_lit
    }

    pub fn wish(&self) -> &str {
        &self.wish
    }

    pub fn particle_count(&self) -> usize {
        self.stage.len()
    }

    pub fn canvas(&self) -> &FrameCanvas {
        &self.canvas
    }
}

impl std::fmt::Debug for CelebrationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CelebrationSession")
            .field("gesture", &self.gesture)
            .field("candles_lit", &self.candles_lit)
            .field("particles", &self.particle_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{TextMask, TextStencil};
    use crate::wish::CannedWish;

    struct DotStencil;

    impl TextStencil for DotStencil {
        fn stencil(&self, _text: &str) -> TextMask {
            let mut mask = TextMask::new(60, 60);
            mask.set(30, 30, 255);
            mask.set(36, 30, 255);
            mask.set(30, 36, 255);
            mask
        }
    }

    fn build_session() -> CelebrationSession {
        CelebrationSession::new(
            AppConfig::default(),
            Box::new(DotStencil),
            &CannedWish::default(),
            "Alex",
            "HOORAY",
            640,
            480,
        )
    }

    #[test]
    fn candle_latch_is_one_way() {
        let mut session = build_session();
        let now = Instant::now();
        assert!(!session.candles_lit());

        session.ingest_frame(Some(&HandFrame::synthetic_fist(0.5)), now);
        session.ingest_frame(Some(&HandFrame::synthetic_palm(0.5)), now);
        assert!(session.candles_lit());

        // Further frames, including hand loss, never unlight the candles.
        session.ingest_frame(None, now);
        session.ingest_frame(Some(&HandFrame::synthetic_fist(0.5)), now);
        assert!(session.candles_lit());
    }

    #[test]
    fn wave_spawns_a_burst() {
        let mut session = build_session();
        let now = Instant::now();

        session.ingest_frame(Some(&HandFrame::synthetic_palm(0.3)), now);
        session.ingest_frame(Some(&HandFrame::synthetic_palm(0.6)), now);
        assert!(session.particle_count() > 0);
    }

    #[test]
    fn ticks_drain_an_expired_burst() {
        let mut session = build_session();
        let now = Instant::now();

        session.ingest_frame(Some(&HandFrame::synthetic_palm(0.3)), now);
        session.ingest_frame(Some(&HandFrame::synthetic_palm(0.6)), now);

        for _ in 0..150 {
            session.tick();
        }
        assert_eq!(session.particle_count(), 0);
    }

    #[test]
    fn resize_propagates_to_canvas_and_mirror() {
        let mut session = build_session();
        session.resize(200, 100);
        assert_eq!(session.canvas().width(), 200);

        let now = Instant::now();
        session.ingest_frame(Some(&HandFrame::synthetic_palm(0.2)), now);
        let waved = session.ingest_frame(Some(&HandFrame::synthetic_palm(0.5)), now);
        assert_eq!(
            waved.events,
            vec![GestureEvent::FireworkRequested { x: 200.0 * 0.5 }]
        );
    }

    #[test]
    fn wish_is_resolved_at_construction() {
        let session = build_session();
        assert!(session.wish().contains("Alex"));
    }

    #[test]
    fn status_readout_follows_the_latest_frame() {
        let mut session = build_session();
        let now = Instant::now();

        session.ingest_frame(Some(&HandFrame::synthetic_palm(0.5)), now);
        assert_eq!(session.gesture(), GestureState::Palm);
        session.ingest_frame(None, now);
        assert_eq!(session.gesture(), GestureState::None);
    }
}
