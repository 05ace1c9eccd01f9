// value.rs
//
// Tagged value types the engine can interpolate, plus the arithmetic the
// state machine needs (add, subtract, unclamped lerp). Kind dispatch is
// resolved once at tween construction — the per-tick path only ever sees
// matched variants.

use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// The closed set of interpolatable kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    Scalar,
    Vec2,
    Vec3,
    /// RGBA color packed as four floats.
    Color,
}

/// A value of one of the supported kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Scalar(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Color(Vec4),
}

impl Value {
    pub fn kind(self) -> ValueKind {
        match self {
            Value::Scalar(_) => ValueKind::Scalar,
            Value::Vec2(_) => ValueKind::Vec2,
            Value::Vec3(_) => ValueKind::Vec3,
            Value::Color(_) => ValueKind::Color,
        }
    }

    /// Component-wise `a + b`. Kinds must match; mismatches are a programming
    /// error (construction validates endpoints before any arithmetic runs).
    pub fn add(self, other: Value) -> Value {
        match (self, other) {
            (Value::Scalar(a), Value::Scalar(b)) => Value::Scalar(a + b),
            (Value::Vec2(a), Value::Vec2(b)) => Value::Vec2(a + b),
            (Value::Vec3(a), Value::Vec3(b)) => Value::Vec3(a + b),
            (Value::Color(a), Value::Color(b)) => Value::Color(a + b),
            (a, b) => unreachable!("value kind mismatch: {:?} + {:?}", a.kind(), b.kind()),
        }
    }

    /// Component-wise `a - b`. Same kind rules as [`Value::add`].
    pub fn sub(self, other: Value) -> Value {
        match (self, other) {
            (Value::Scalar(a), Value::Scalar(b)) => Value::Scalar(a - b),
            (Value::Vec2(a), Value::Vec2(b)) => Value::Vec2(a - b),
            (Value::Vec3(a), Value::Vec3(b)) => Value::Vec3(a - b),
            (Value::Color(a), Value::Color(b)) => Value::Color(a - b),
            (a, b) => unreachable!("value kind mismatch: {:?} - {:?}", a.kind(), b.kind()),
        }
    }

    /// Linear interpolation that does NOT clamp `t`. Back/Elastic/Bounce
    /// easing legitimately pushes `t` outside [0, 1] and the result must
    /// extrapolate past the endpoints.
    pub fn lerp_unclamped(from: Value, to: Value, t: f32) -> Value {
        match (from, to) {
            (Value::Scalar(a), Value::Scalar(b)) => Value::Scalar(lerp(a, b, t)),
            (Value::Vec2(a), Value::Vec2(b)) => Value::Vec2(a + (b - a) * t),
            (Value::Vec3(a), Value::Vec3(b)) => Value::Vec3(a + (b - a) * t),
            (Value::Color(a), Value::Color(b)) => Value::Color(a + (b - a) * t),
            (a, b) => unreachable!("value kind mismatch: lerp {:?} -> {:?}", a.kind(), b.kind()),
        }
    }
}

/// Linearly interpolate between two scalars (unclamped).
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Statically-typed view of the supported kinds.
///
/// Lets callers construct tweens and register update callbacks against the
/// concrete type instead of [`Value`]; the engine still stores the tagged
/// form. Adding a kind means touching this module only, never the state
/// machine.
pub trait TweenValue: Copy + Add<Output = Self> + Sub<Output = Self> + 'static {
    const KIND: ValueKind;

    fn into_value(self) -> Value;
    /// Returns `None` if the tagged value holds a different kind.
    fn from_value(value: Value) -> Option<Self>;
}

impl TweenValue for f32 {
    const KIND: ValueKind = ValueKind::Scalar;

    fn into_value(self) -> Value {
        Value::Scalar(self)
    }
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Scalar(v) => Some(v),
            _ => None,
        }
    }
}

impl TweenValue for Vec2 {
    const KIND: ValueKind = ValueKind::Vec2;

    fn into_value(self) -> Value {
        Value::Vec2(self)
    }
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Vec2(v) => Some(v),
            _ => None,
        }
    }
}

impl TweenValue for Vec3 {
    const KIND: ValueKind = ValueKind::Vec3;

    fn into_value(self) -> Value {
        Value::Vec3(self)
    }
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Vec3(v) => Some(v),
            _ => None,
        }
    }
}

impl TweenValue for Vec4 {
    const KIND: ValueKind = ValueKind::Color;

    fn into_value(self) -> Value {
        Value::Color(self)
    }
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Color(v) => Some(v),
            _ => None,
        }
    }
}
