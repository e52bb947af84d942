//! Core library for the Gesture Fireworks application.
//!
//! The crate hosts the two algorithmic leaves of the celebratory display —
//! the gesture classification state machine and the particle stage — plus
//! the surrounding plumbing: hand-frame data model, text stencilling,
//! drawing surface, frame scheduling, the wish-service boundary and the
//! session layer that wires classifier events into the stage. The two
//! leaves have no dependency on each other and can be driven fully in
//! isolation.

pub mod config;
pub mod error;
pub mod gesture;
pub mod hand;
pub mod render;
pub mod session;
pub mod stage;
pub mod text;
pub mod timeline;
pub mod wish;

pub use config::{AppConfig, ClassifierConfig, StageConfig, StencilConfig};
pub use error::{FireworksError, Result};
pub use gesture::{Classification, GestureClassifier, GestureEvent, GestureState};
pub use hand::{HandFrame, Landmark};
pub use render::{FrameCanvas, Rgb};
pub use session::CelebrationSession;
pub use stage::{Particle, ParticleStage, Point};
pub use text::{BlankStencil, FontStencil, TextMask, TextStencil};
pub use timeline::{FrameClock, RenderLoop, StopHandle};
pub use wish::{resolve_wish, CannedWish, WishProvider, FALLBACK_WISH};
