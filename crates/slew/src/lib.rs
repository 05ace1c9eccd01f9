//! slew — a frame-driven tween engine.
//!
//! Interpolates between two values over a duration, shaped by an easing
//! curve and an optional loop policy, firing lifecycle hooks along the way.
//! The host owns the frame clock and the scene bindings: it calls
//! [`TweenRegistry::tick`] once per frame and translates tween values into
//! object mutations through update callbacks. Single-threaded and
//! cooperative; nothing here suspends or spawns.

pub mod easing;
pub mod error;
pub mod looping;
pub mod registry;
pub mod tween;
pub mod value;

// Re-export key types at crate root for convenience
pub use easing::Easing;
pub use error::TweenError;
pub use looping::{Direction, LoopMode};
pub use registry::TweenRegistry;
pub use tween::Tween;
pub use value::{lerp, TweenValue, Value, ValueKind};
