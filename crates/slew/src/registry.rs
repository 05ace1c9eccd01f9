// registry.rs
//
// Ordered collection of live tweens plus the per-frame driver. An explicit,
// host-owned object: the host's composition root creates one, calls
// `tick(dt)` once per frame from its frame clock, and calls `clear()` at its
// own scene-transition boundary. No global state.
//
// Usage:
//   let mut tweens = TweenRegistry::new();
//   tweens.tween(0.0_f32, 1.0, 0.5, Easing::QuadOut, |v| alpha = v)?;
//   tweens.tick(dt);  // once per frame

use std::cell::Cell;
use std::rc::Rc;

use crate::easing::Easing;
use crate::error::TweenError;
use crate::tween::Tween;
use crate::value::TweenValue;

/// Holds and advances all live tweens, in registration order.
#[derive(Default)]
pub struct TweenRegistry {
    tweens: Vec<Tween>,
}

impl TweenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tween built elsewhere.
    pub fn add(&mut self, tween: Tween) {
        self.tweens.push(tween);
    }

    /// Remove a tween by handle identity. Returns whether it was present.
    pub fn remove(&mut self, tween: &Tween) -> bool {
        if let Some(idx) = self.tweens.iter().position(|t| t == tween) {
            self.tweens.remove(idx);
            true
        } else {
            false
        }
    }

    /// Remove every tween carrying the given tag. Returns how many went.
    pub fn remove_by_tag(&mut self, tag: &str) -> usize {
        let before = self.tweens.len();
        self.tweens.retain(|t| t.tag().as_deref() != Some(tag));
        before - self.tweens.len()
    }

    /// Drop all tweens. Hosts call this at scene transitions.
    pub fn clear(&mut self) {
        self.tweens.clear();
    }

    /// Number of live tweens.
    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    /// Advance every tween once by `dt`, in registration order, evicting the
    /// completed ones after their final run so terminal values and hooks are
    /// observed exactly once. Returns the number evicted.
    ///
    /// The index walk only advances when nothing was removed, so mid-scan
    /// eviction can neither skip nor double-visit an entry.
    pub fn tick(&mut self, dt: f32) -> usize {
        let mut evicted = 0;
        let mut i = 0;
        while i < self.tweens.len() {
            self.tweens[i].run(dt);
            if self.tweens[i].is_complete() {
                self.tweens.remove(i);
                evicted += 1;
            } else {
                i += 1;
            }
        }
        evicted
    }

    // -- Factory helpers --

    /// Create and register a tween between two values, with a typed update
    /// callback.
    pub fn tween<T: TweenValue>(
        &mut self,
        from: T,
        to: T,
        duration: f32,
        easing: Easing,
        on_update: impl FnMut(T) + 'static,
    ) -> Result<Tween, TweenError> {
        let tween = Tween::new(from, to, duration, easing)?.on_update(on_update);
        self.add(tween.clone());
        Ok(tween)
    }

    /// Create and register a relative (additive) tween: the start value is
    /// read live from `current` at creation, the end is `start + increment`,
    /// and `apply` receives `(value, previous_value)` each tick so the host
    /// can apply the delta on top of whatever else moved the target.
    ///
    /// On every loop-cycle start (except under direction-reversing modes,
    /// which must return to the original endpoints) the start value is
    /// recaptured, so consecutive cycles compose additively with external
    /// changes.
    pub fn tween_by<T: TweenValue>(
        &mut self,
        current: impl Fn() -> T + 'static,
        increment: T,
        duration: f32,
        easing: Easing,
        mut apply: impl FnMut(T, T) + 'static,
    ) -> Result<Tween, TweenError> {
        let start = current();
        let prev = Rc::new(Cell::new(start));

        let tween = Tween::new(start, start + increment, duration, easing)?;
        let p = prev.clone();
        let tween = tween.on_update(move |value: T| {
            apply(value, p.get());
            p.set(value);
        });
        tween.set_recapture(move || {
            let now = current();
            prev.set(now);
            (now.into_value(), (now + increment).into_value())
        });

        self.add(tween.clone());
        Ok(tween)
    }

    /// Run `f` once after `seconds`.
    pub fn after(&mut self, seconds: f32, f: impl FnMut() + 'static) -> Result<Tween, TweenError> {
        let tween = Tween::new(0.0_f32, seconds, seconds, Easing::Linear)?.on_complete(f);
        self.add(tween.clone());
        Ok(tween)
    }

    /// Run `f` every tick for `seconds`.
    pub fn do_for(
        &mut self,
        seconds: f32,
        mut f: impl FnMut() + 'static,
    ) -> Result<Tween, TweenError> {
        let tween =
            Tween::new(0.0_f32, seconds, seconds, Easing::Linear)?.on_update(move |_: f32| f());
        self.add(tween.clone());
        Ok(tween)
    }

    /// Run `f` once as soon as `condition` holds (or at `timeout` seconds,
    /// whichever comes first).
    pub fn do_when(
        &mut self,
        condition: impl Fn() -> bool + 'static,
        f: impl FnMut() + 'static,
        timeout: f32,
    ) -> Result<Tween, TweenError> {
        let tween = Tween::new(0.0_f32, 1.0, timeout, Easing::Linear)?
            .stop_if(condition, true)
            .on_complete(f);
        self.add(tween.clone());
        Ok(tween)
    }

    /// Run `f` every tick until `condition` holds (or `timeout` seconds
    /// pass).
    pub fn do_until(
        &mut self,
        condition: impl Fn() -> bool + 'static,
        mut f: impl FnMut() + 'static,
        timeout: f32,
    ) -> Result<Tween, TweenError> {
        let tween = Tween::new(0.0_f32, 1.0, timeout, Easing::Linear)?
            .on_update(move |_: f32| f())
            .stop_if(condition, false);
        self.add(tween.clone());
        Ok(tween)
    }
}
