// error.rs

use crate::value::ValueKind;
use thiserror::Error;

/// Construction-time failures. Usage errors after construction are reported
/// through `log` and degrade the offending hook instead of failing the tween.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TweenError {
    /// A tween clock needs a positive duration to normalize against.
    #[error("tween duration must be positive, got {0}")]
    NonPositiveDuration(f32),
    /// Both endpoints must hold the same value kind.
    #[error("tween endpoints have mismatched kinds: from={from:?}, to={to:?}")]
    MismatchedKinds { from: ValueKind, to: ValueKind },
}
