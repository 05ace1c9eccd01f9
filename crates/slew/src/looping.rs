// looping.rs
//
// Loop policy: how a finished cycle shapes the next one. Two of the modes
// reverse direction, and they mirror progress at different points in the
// pipeline — Yoyo mirrors the eased result, Rewind mirrors the raw progress
// before easing, which produces a different return-trip curve for any
// asymmetric easing.

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::value::Value;

/// What happens when a tween reaches the end of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoopMode {
    /// Run once, then complete.
    #[default]
    None,
    /// Restart from the beginning, same direction.
    Restart,
    /// Reverse by mirroring the eased progress (`1 - eased`).
    Yoyo,
    /// Reverse by mirroring the raw progress before easing (`ease(1 - raw)`).
    Rewind,
}

/// Traversal direction of the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn is_backward(self) -> bool {
        self == Direction::Backward
    }
}

impl LoopMode {
    /// Whether this mode plays alternate cycles backwards.
    pub fn is_direction_reversing(self) -> bool {
        matches!(self, LoopMode::Yoyo | LoopMode::Rewind)
    }

    /// Direction of the cycle with the given completed-cycle count.
    /// Always forward unless the mode reverses and the count is odd.
    pub fn direction(self, cycle_count: u32) -> Direction {
        if self.is_direction_reversing() && cycle_count % 2 == 1 {
            Direction::Backward
        } else {
            Direction::Forward
        }
    }

    /// Shape raw progress into eased progress for the given direction.
    pub fn eased_progress(self, direction: Direction, raw: f32, easing: Easing) -> f32 {
        match self {
            LoopMode::Rewind if direction.is_backward() => easing.apply(1.0 - raw),
            LoopMode::Yoyo if direction.is_backward() => 1.0 - easing.apply(raw),
            _ => easing.apply(raw),
        }
    }

    /// Endpoints for the next cycle. None of the v1 modes swap or shift the
    /// endpoints (reversal happens in progress space, not value space);
    /// relative tweens recapture their live start separately.
    pub fn cycle_endpoints(self, from: Value, to: Value) -> (Value, Value) {
        match self {
            LoopMode::None | LoopMode::Restart | LoopMode::Yoyo | LoopMode::Rewind => (from, to),
        }
    }
}
