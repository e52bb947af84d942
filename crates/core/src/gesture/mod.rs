use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ClassifierConfig;
use crate::hand::{HandFrame, FINGERTIPS, LOWER_JOINT_OFFSET, PALM_REFERENCE};

/// Discrete hand pose derived from a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GestureState {
    #[default]
    None,
    Fist,
    Palm,
}

/// Semantic events emitted by the classifier.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent {
    /// A fist opened into a palm; the consumer lights the candles.
    CandlesLit,
    /// A wave was detected. `x` is the mirrored screen-space launch
    /// position.
    FireworkRequested { x: f32 },
}

/// Outcome of classifying one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub gesture: GestureState,
    pub events: Vec<GestureEvent>,
}

/// Derives the static pose for a single frame.
///
/// Screen-space convention: larger y sits lower on screen, so a fingertip
/// below its lower joint means the finger is curled. A malformed frame, or
/// any mix of curled and extended fingers, reads as [`GestureState::None`].
pub fn pose_of(frame: &HandFrame) -> GestureState {
    if !frame.is_well_formed() {
        return GestureState::None;
    }

    let landmarks = frame.landmarks();
    let curled = FINGERTIPS
        .iter()
        .all(|&tip| landmarks[tip].y > landmarks[tip - LOWER_JOINT_OFFSET].y);
    let extended = FINGERTIPS
        .iter()
        .all(|&tip| landmarks[tip].y < landmarks[tip - LOWER_JOINT_OFFSET].y);

    match (curled, extended) {
        (true, false) => GestureState::Fist,
        (false, true) => GestureState::Palm,
        _ => GestureState::None,
    }
}

/// Turns a stream of noisy per-frame poses into edge-triggered events.
///
/// The classifier keeps just enough memory to detect transitions: the
/// previous pose, the previous palm x for the current palm run, and the
/// wave cooldown deadline. It is cheap to instantiate and multiple
/// instances never interfere.
#[derive(Debug)]
pub struct GestureClassifier {
    config: ClassifierConfig,
    viewport_width: f32,
    previous_gesture: GestureState,
    previous_palm_x: Option<f32>,
    wave_cooldown_until: Option<Instant>,
}

impl GestureClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        let viewport_width = config.viewport_width;
        Self {
            config,
            viewport_width,
            previous_gesture: GestureState::None,
            previous_palm_x: None,
            wave_cooldown_until: None,
        }
    }

    /// Updates the surface width used to mirror wave positions. Called on
    /// window resize.
    pub fn set_viewport_width(&mut self, width: f32) {
        self.viewport_width = width;
    }

    pub fn previous_gesture(&self) -> GestureState {
        self.previous_gesture
    }

    /// Horizontal palm position remembered for the current palm run, if any.
    pub fn previous_palm_x(&self) -> Option<f32> {
        self.previous_palm_x
    }

    /// Classifies one frame and emits any edge-triggered events.
    ///
    /// `frame` is `None` when the capture collaborator saw no hand this
    /// tick. A present-but-malformed frame is skipped the same way and
    /// reads as [`GestureState::None`]. The candle event re-fires on every
    /// qualifying edge; suppressing repeats is consumer policy.
    pub fn classify(&mut self, frame: Option<&HandFrame>, now: Instant) -> Classification {
        let frame = frame.filter(|frame| {
            let well_formed = frame.is_well_formed();
            if !well_formed {
                debug!(
                    landmarks = frame.landmarks().len(),
                    "skipping malformed hand frame"
                );
            }
            well_formed
        });

        let gesture = frame.map(pose_of).unwrap_or_default();
        let mut events = Vec::new();

        if self.previous_gesture == GestureState::Fist && gesture == GestureState::Palm {
            debug!("fist opened into palm");
            events.push(GestureEvent::CandlesLit);
        }

        if gesture == GestureState::Palm {
            // A palm pose implies a well-formed frame, so the reference
            // landmark is present.
            if let Some(reference) = frame.and_then(|frame| frame.landmark(PALM_REFERENCE)) {
                if let Some(previous_x) = self.previous_palm_x {
                    let delta = (reference.x - previous_x).abs();
                    if delta > self.config.wave_delta_threshold && self.cooldown_elapsed(now) {
                        let x = self.viewport_width * (1.0 - reference.x);
                        debug!(delta = f64::from(delta), x = f64::from(x), "wave detected");
                        events.push(GestureEvent::FireworkRequested { x });
                        self.wave_cooldown_until = Some(now + self.config.wave_cooldown());
                    }
                }
                self.previous_palm_x = Some(reference.x);
            }
        } else {
            // Leaving the palm run discards the motion estimate; a fresh
            // run needs two frames before a wave can register.
            self.previous_palm_x = None;
        }

        self.previous_gesture = gesture;
        Classification { gesture, events }
    }

    fn cooldown_elapsed(&self, now: Instant) -> bool {
        self.wave_cooldown_until
            .map(|until| now > until)
            .unwrap_or(true)
    }
}
