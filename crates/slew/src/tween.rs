// tween.rs
//
// The per-instance tween state machine: a signed clock normalized against a
// duration, shaped by an easing curve and a loop policy, firing lifecycle
// hooks as it goes. One external driver advances it once per frame via
// `run(dt)`; it never initiates work itself.
//
// Usage:
//   let t = Tween::new(0.0_f32, 10.0, 0.5, Easing::QuadOut)?
//       .on_update(|v: f32| println!("{v}"))
//       .set_loop(LoopMode::Yoyo, 2);
//   registry.add(t);

use std::cell::RefCell;
use std::rc::Rc;

use crate::easing::Easing;
use crate::error::TweenError;
use crate::looping::{Direction, LoopMode};
use crate::value::{TweenValue, Value, ValueKind};

type Hook = Box<dyn FnMut()>;
type UpdateHook = Box<dyn FnMut(Value)>;
type Predicate = Box<dyn Fn() -> bool>;
type Recapture = Box<dyn FnMut() -> (Value, Value)>;

/// Internal state. Lives behind the [`Tween`] handle's `RefCell`.
pub(crate) struct TweenInstance {
    from: Value,
    to: Value,
    current: Value,
    kind: ValueKind,
    duration: f32,
    /// Signed seconds; negative while a delay is pending.
    elapsed: f32,
    easing: Easing,
    loop_mode: LoopMode,
    /// Cycles still allowed after the current one; -1 = infinite.
    cycles_remaining: i32,
    /// Completed cycles, including the final one.
    cycle_count: u32,
    playback_speed: f32,
    delay: f32,
    paused: bool,
    /// Whether the start hook has fired for the current activation.
    started: bool,
    /// Terminal latch: set on the stop-condition path and on natural finish,
    /// so hooks never double-fire if `run` is called past completion.
    completed: bool,
    invoke_complete_on_stop: bool,
    removal_requested: bool,
    tag: Option<String>,
    /// "Target gone" predicates; any returning true ends the tween silently.
    liveness: Vec<Predicate>,
    stop_conditions: Vec<Predicate>,
    /// Relative tweens re-read their live start value here each activation
    /// (skipped for direction-reversing loop modes).
    recapture: Option<Recapture>,
    on_start: Vec<Hook>,
    on_update: Vec<UpdateHook>,
    on_complete: Vec<Hook>,
}

impl TweenInstance {
    fn run(&mut self, dt: f32) {
        if self.completed || self.target_gone() {
            return;
        }
        // The stop check runs even while paused, matching the original engine.
        if self.stop_condition_met() || self.paused {
            return;
        }

        self.elapsed += dt * self.playback_speed;
        if self.elapsed < 0.0 {
            return; // still delayed: no start hook, no update
        }

        if !self.started {
            self.started = true;
            self.fire_start();
        }

        let eased = if self.elapsed >= self.duration {
            self.finish_cycle()
        } else {
            self.loop_mode
                .eased_progress(self.direction(), self.raw_progress(), self.easing)
        };

        self.current = Value::lerp_unclamped(self.from, self.to, eased);
        let value = self.current;
        for hook in &mut self.on_update {
            hook(value);
        }
    }

    /// Cycle (or tween) finished this tick. Fires the complete hooks, lets
    /// the loop policy set up the next cycle if one remains, and returns the
    /// eased progress forced to the exact seam boundary so endpoint values
    /// carry no accumulated float drift.
    fn finish_cycle(&mut self) -> f32 {
        self.started = false;
        for hook in &mut self.on_complete {
            hook();
        }

        let continues =
            self.loop_mode != LoopMode::None && (self.cycles_remaining == -1 || self.cycles_remaining > 0);

        if continues {
            let (from, to) = self.loop_mode.cycle_endpoints(self.from, self.to);
            self.from = from;
            self.to = to;
            self.elapsed -= self.duration;
            self.elapsed -= self.delay; // delay re-applies every cycle
            self.cycle_count += 1;
            if self.cycles_remaining > 0 {
                self.cycles_remaining -= 1;
            }
            // New cycle starts at raw 0 under the post-flip direction, so a
            // reversing mode lands exactly on the far endpoint.
            self.loop_mode.eased_progress(self.direction(), 0.0, self.easing)
        } else {
            let eased = self.loop_mode.eased_progress(self.direction(), 1.0, self.easing);
            self.cycle_count += 1;
            self.completed = true;
            eased
        }
    }

    fn fire_start(&mut self) {
        // Relative tweens track a moving start value, except under reversing
        // modes which must return to the original endpoints.
        if !self.loop_mode.is_direction_reversing() {
            if let Some(recapture) = &mut self.recapture {
                let (from, to) = recapture();
                self.from = from;
                self.to = to;
            }
        }
        for hook in &mut self.on_start {
            hook();
        }
    }

    fn stop_condition_met(&mut self) -> bool {
        let met = self.stop_conditions.iter().any(|cond| cond());
        if met && self.invoke_complete_on_stop && !self.completed {
            self.completed = true;
            self.started = false;
            for hook in &mut self.on_complete {
                hook();
            }
        }
        met
    }

    fn target_gone(&self) -> bool {
        self.liveness.iter().any(|gone| gone())
    }

    fn active(&self) -> bool {
        self.elapsed < self.duration
    }

    fn raw_progress(&self) -> f32 {
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    fn direction(&self) -> Direction {
        self.loop_mode.direction(self.cycle_count)
    }

    fn is_complete(&self) -> bool {
        self.removal_requested
            || self.completed
            || !self.active()
            || self.target_gone()
            || self.stop_conditions.iter().any(|cond| cond())
    }
}

/// Handle to a tween. Cloning is cheap (shared state); fluent configuration
/// methods consume and return the handle so calls chain.
///
/// The engine is single-threaded and cooperative: hooks run synchronously
/// inside [`Tween::run`], while the instance is borrowed. A hook must not
/// call methods on the handle of the tween that invoked it; handles of
/// *other* tweens are fine (that is how playback-speed ramps work).
#[derive(Clone)]
pub struct Tween {
    inner: Rc<RefCell<TweenInstance>>,
}

impl std::fmt::Debug for Tween {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tween").finish_non_exhaustive()
    }
}

impl PartialEq for Tween {
    /// Handle identity, not value equality.
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Tween {
    /// Create a tween between two values of the same kind.
    ///
    /// Fails fast on a non-positive duration. Kind dispatch is resolved here,
    /// once; the per-tick path never inspects types again.
    pub fn new<T: TweenValue>(
        from: T,
        to: T,
        duration: f32,
        easing: Easing,
    ) -> Result<Tween, TweenError> {
        Self::from_values(from.into_value(), to.into_value(), duration, easing)
    }

    /// Create a tween from tagged values, e.g. when endpoints come from data.
    /// Also rejects endpoints of differing kinds.
    pub fn from_values(
        from: Value,
        to: Value,
        duration: f32,
        easing: Easing,
    ) -> Result<Tween, TweenError> {
        if duration <= 0.0 {
            return Err(TweenError::NonPositiveDuration(duration));
        }
        if from.kind() != to.kind() {
            return Err(TweenError::MismatchedKinds {
                from: from.kind(),
                to: to.kind(),
            });
        }
        Ok(Tween {
            inner: Rc::new(RefCell::new(TweenInstance {
                from,
                to,
                current: from,
                kind: from.kind(),
                duration,
                elapsed: 0.0,
                easing,
                loop_mode: LoopMode::None,
                cycles_remaining: 0,
                cycle_count: 0,
                playback_speed: 1.0,
                delay: 0.0,
                paused: false,
                started: false,
                completed: false,
                invoke_complete_on_stop: false,
                removal_requested: false,
                tag: None,
                liveness: Vec::new(),
                stop_conditions: Vec::new(),
                recapture: None,
                on_start: Vec::new(),
                on_update: Vec::new(),
                on_complete: Vec::new(),
            })),
        })
    }

    /// Advance the clock by `dt` seconds (scaled by playback speed) and fire
    /// whatever hooks the tick reaches. Called once per frame by the
    /// registry; safe to call directly when driving a tween by hand.
    pub fn run(&self, dt: f32) {
        self.inner.borrow_mut().run(dt);
    }

    /// True once the tween has nothing left to do: clock expired with no
    /// cycles remaining, target gone, stop condition held, or removal
    /// requested. The registry polls this after each `run` and evicts.
    pub fn is_complete(&self) -> bool {
        self.inner.borrow().is_complete()
    }

    // -- Fluent configuration --

    /// Hook fired when the tween (re)starts, once per activation: after any
    /// delay expires, and again at every loop-cycle start.
    pub fn on_start(self, f: impl FnMut() + 'static) -> Self {
        self.inner.borrow_mut().on_start.push(Box::new(f));
        self
    }

    /// Typed per-tick value hook. The type is checked against the tween's
    /// value kind once, here: on a mismatch the error is logged and the hook
    /// is never registered (a permanent no-op), matching the engine's
    /// non-fatal usage-error policy.
    pub fn on_update<T: TweenValue>(self, mut f: impl FnMut(T) + 'static) -> Self {
        let kind = self.inner.borrow().kind;
        if T::KIND != kind {
            log::error!(
                "on_update callback expects {:?} but tween interpolates {:?}; callback will not run",
                T::KIND,
                kind
            );
            return self;
        }
        self.inner.borrow_mut().on_update.push(Box::new(move |v| {
            if let Some(v) = T::from_value(v) {
                f(v);
            }
        }));
        self
    }

    /// Untyped per-tick value hook.
    pub fn on_update_value(self, f: impl FnMut(Value) + 'static) -> Self {
        self.inner.borrow_mut().on_update.push(Box::new(f));
        self
    }

    /// Hook fired at every cycle completion (including the final one), and
    /// by a stop condition registered with `invoke_complete = true`.
    pub fn on_complete(self, f: impl FnMut() + 'static) -> Self {
        self.inner.borrow_mut().on_complete.push(Box::new(f));
        self
    }

    /// Set the loop mode and total cycle count. `cycles` counts the first
    /// play-through; -1 loops forever; 0 requests immediate removal from the
    /// registry.
    pub fn set_loop(self, mode: LoopMode, cycles: i32) -> Self {
        {
            let mut t = self.inner.borrow_mut();
            if cycles == 0 {
                t.removal_requested = true;
            }
            t.loop_mode = mode;
            t.cycles_remaining = if cycles < 0 { -1 } else { cycles - 1 };
        }
        self
    }

    /// Delay before the tween starts. The delay re-applies at every loop
    /// cycle; `apply_now` additionally pushes the current clock back so the
    /// first cycle waits too.
    pub fn set_delay(self, seconds: f32, apply_now: bool) -> Self {
        {
            let mut t = self.inner.borrow_mut();
            t.delay = seconds;
            if apply_now {
                t.elapsed -= seconds;
            }
        }
        self
    }

    /// Register a target-liveness predicate. When it reports the target
    /// gone, the tween silently becomes complete: no further hooks of any
    /// kind.
    pub fn stop_if_target_gone(self, gone: impl Fn() -> bool + 'static) -> Self {
        self.inner.borrow_mut().liveness.push(Box::new(gone));
        self
    }

    /// Register a stop condition. When it first holds, the tween completes;
    /// with `invoke_complete` the complete hooks fire exactly once (latched,
    /// so later ticks never refire them).
    pub fn stop_if(self, condition: impl Fn() -> bool + 'static, invoke_complete: bool) -> Self {
        {
            let mut t = self.inner.borrow_mut();
            t.invoke_complete_on_stop = invoke_complete;
            t.stop_conditions.push(Box::new(condition));
        }
        self
    }

    /// Pause: the clock stops accumulating entirely.
    pub fn pause(self) -> Self {
        self.inner.borrow_mut().paused = true;
        self
    }

    /// Resume a paused tween.
    pub fn play(self) -> Self {
        self.inner.borrow_mut().paused = false;
        self
    }

    /// Flip the paused state.
    pub fn toggle(self) -> Self {
        {
            let mut t = self.inner.borrow_mut();
            t.paused = !t.paused;
        }
        self
    }

    /// Time multiplier applied to every `dt`. Negative values run the clock
    /// backwards.
    pub fn set_playback_speed(self, speed: f32) -> Self {
        self.inner.borrow_mut().playback_speed = speed;
        self
    }

    /// Tag for bulk removal through the registry.
    pub fn with_tag(self, tag: impl Into<String>) -> Self {
        self.inner.borrow_mut().tag = Some(tag.into());
        self
    }

    /// Ramp the playback speed from its current value to `target` over
    /// `smooth_time` seconds, driven by a nested tween registered alongside
    /// this one. While this tween is paused the ramp keeps running but its
    /// writes are suppressed, so pausing never corrupts a mid-flight ramp.
    pub fn tween_playback_speed(
        self,
        registry: &mut crate::registry::TweenRegistry,
        target: f32,
        smooth_time: f32,
        easing: Easing,
    ) -> Self {
        let start = self.inner.borrow().playback_speed;
        self.tween_playback_speed_from(registry, start, target, smooth_time, easing)
    }

    /// Ramp the playback speed from an explicit starting value.
    pub fn tween_playback_speed_from(
        self,
        registry: &mut crate::registry::TweenRegistry,
        start: f32,
        target: f32,
        smooth_time: f32,
        easing: Easing,
    ) -> Self {
        if smooth_time <= 0.0 {
            return self.set_playback_speed(target);
        }
        let parent = Rc::downgrade(&self.inner);
        let parent_gone = parent.clone();
        // Duration is positive here, endpoints are scalars: cannot fail.
        if let Ok(ramp) = Tween::new(start, target, smooth_time, easing) {
            let ramp = ramp
                .on_update(move |speed: f32| {
                    if let Some(parent) = parent.upgrade() {
                        let mut parent = parent.borrow_mut();
                        if !parent.paused {
                            parent.playback_speed = speed;
                        }
                    }
                })
                .stop_if_target_gone(move || parent_gone.upgrade().is_none());
            registry.add(ramp);
        }
        self
    }

    pub(crate) fn set_recapture(&self, f: impl FnMut() -> (Value, Value) + 'static) {
        self.inner.borrow_mut().recapture = Some(Box::new(f));
    }

    // -- Read surface --

    /// The most recently interpolated value (the start value before the
    /// first update).
    pub fn value(&self) -> Value {
        self.inner.borrow().current
    }

    /// The current value, converted to its concrete type. `None` when `T`
    /// is not this tween's kind.
    pub fn value_as<T: TweenValue>(&self) -> Option<T> {
        T::from_value(self.value())
    }

    pub fn from(&self) -> Value {
        self.inner.borrow().from
    }

    pub fn to(&self) -> Value {
        self.inner.borrow().to
    }

    pub fn kind(&self) -> ValueKind {
        self.inner.borrow().kind
    }

    /// Signed elapsed seconds; negative while a delay is pending.
    pub fn elapsed(&self) -> f32 {
        self.inner.borrow().elapsed
    }

    pub fn duration(&self) -> f32 {
        self.inner.borrow().duration
    }

    pub fn delay(&self) -> f32 {
        self.inner.borrow().delay
    }

    /// Normalized raw progress, clamped to [0, 1].
    pub fn progress(&self) -> f32 {
        self.inner.borrow().raw_progress()
    }

    /// Progress after easing and loop-direction shaping. Can leave [0, 1]
    /// for overshooting curves.
    pub fn eased_progress(&self) -> f32 {
        let t = self.inner.borrow();
        t.loop_mode.eased_progress(t.direction(), t.raw_progress(), t.easing)
    }

    /// Whether the clock is still short of the duration.
    pub fn is_active(&self) -> bool {
        self.inner.borrow().active()
    }

    pub fn easing(&self) -> Easing {
        self.inner.borrow().easing
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.inner.borrow().loop_mode
    }

    /// Cycles still allowed after the current one; -1 means infinite.
    pub fn cycles_remaining(&self) -> i32 {
        self.inner.borrow().cycles_remaining
    }

    /// Completed cycles, counting the final one.
    pub fn cycle_count(&self) -> u32 {
        self.inner.borrow().cycle_count
    }

    pub fn direction(&self) -> Direction {
        self.inner.borrow().direction()
    }

    pub fn is_paused(&self) -> bool {
        self.inner.borrow().paused
    }

    pub fn playback_speed(&self) -> f32 {
        self.inner.borrow().playback_speed
    }

    pub fn tag(&self) -> Option<String> {
        self.inner.borrow().tag.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn linear_two_tick_drive() {
        let t = Tween::new(0.0_f32, 10.0, 2.0, Easing::Linear).unwrap();

        t.run(1.0);
        assert_eq!(t.value_as::<f32>(), Some(5.0));
        assert!(!t.is_complete());

        t.run(1.0);
        assert_eq!(t.value_as::<f32>(), Some(10.0));
        assert!(t.is_complete());
    }

    #[test]
    fn construction_rejects_bad_input() {
        assert_eq!(
            Tween::new(0.0_f32, 1.0, 0.0, Easing::Linear).unwrap_err(),
            TweenError::NonPositiveDuration(0.0)
        );
        assert_eq!(
            Tween::new(0.0_f32, 1.0, -1.0, Easing::Linear).unwrap_err(),
            TweenError::NonPositiveDuration(-1.0)
        );
        assert_eq!(
            Tween::from_values(Value::Scalar(0.0), Value::Vec3(glam::Vec3::ONE), 1.0, Easing::Linear)
                .unwrap_err(),
            TweenError::MismatchedKinds {
                from: ValueKind::Scalar,
                to: ValueKind::Vec3,
            }
        );
    }

    #[test]
    fn delay_gates_start_and_update_hooks() {
        let started = Rc::new(Cell::new(0_u32));
        let updated = Rc::new(Cell::new(0_u32));
        let s = started.clone();
        let u = updated.clone();

        let t = Tween::new(0.0_f32, 1.0, 1.0, Easing::Linear)
            .unwrap()
            .set_delay(1.0, true)
            .on_start(move || s.set(s.get() + 1))
            .on_update(move |_: f32| u.set(u.get() + 1));

        // dt chosen off the zero boundary: elapsed goes -0.6, -0.2, +0.2.
        t.run(0.4);
        t.run(0.4);
        assert_eq!(started.get(), 0);
        assert_eq!(updated.get(), 0);

        t.run(0.4);
        assert_eq!(started.get(), 1);
        assert_eq!(updated.get(), 1);
    }

    #[test]
    fn yoyo_two_cycles() {
        let t = Tween::new(0.0_f32, 10.0, 1.0, Easing::Linear)
            .unwrap()
            .set_loop(LoopMode::Yoyo, 2);

        // End of forward cycle: seam shows the far endpoint, direction flips,
        // endpoints untouched.
        t.run(1.0);
        assert_eq!(t.value_as::<f32>(), Some(10.0));
        assert_eq!(t.direction(), Direction::Backward);
        assert_eq!(t.from(), Value::Scalar(0.0));
        assert_eq!(t.to(), Value::Scalar(10.0));
        assert!(!t.is_complete());
        assert_eq!(t.cycle_count(), 1);

        // Backward half-cycle traverses 10 -> 0.
        t.run(0.5);
        assert_eq!(t.value_as::<f32>(), Some(5.0));

        t.run(0.5);
        assert_eq!(t.value_as::<f32>(), Some(0.0));
        assert!(t.is_complete());
        assert_eq!(t.cycle_count(), 2);
    }

    #[test]
    fn restart_loop_reapplies_delay() {
        let t = Tween::new(0.0_f32, 1.0, 1.0, Easing::Linear)
            .unwrap()
            .set_delay(0.5, false)
            .set_loop(LoopMode::Restart, -1);

        t.run(1.0); // finishes cycle 0; clock resets to -delay
        assert_eq!(t.cycle_count(), 1);
        assert!((t.elapsed() + 0.5).abs() < 1e-6);

        t.run(0.25); // still inside the re-applied delay
        assert!(t.elapsed() < 0.0);
        assert_eq!(t.progress(), 0.0);
    }

    #[test]
    fn rewind_differs_from_yoyo_on_asymmetric_ease() {
        let make = |mode| {
            let t = Tween::new(0.0_f32, 1.0, 1.0, Easing::BackIn)
                .unwrap()
                .set_loop(mode, -1);
            t.run(1.0); // flip to backward
            t.run(0.3); // 30% into the return trip
            t.value_as::<f32>().unwrap()
        };
        let yoyo = make(LoopMode::Yoyo);
        let rewind = make(LoopMode::Rewind);

        assert!((yoyo - (1.0 - Easing::BackIn.apply(0.3))).abs() < 1e-5);
        assert!((rewind - Easing::BackIn.apply(0.7)).abs() < 1e-5);
        assert!((yoyo - rewind).abs() > 0.05);
    }

    #[test]
    fn stop_condition_fires_complete_exactly_once() {
        let completions = Rc::new(Cell::new(0_u32));
        let c = completions.clone();
        let stop = Rc::new(Cell::new(false));
        let s = stop.clone();

        let t = Tween::new(0.0_f32, 1.0, 10.0, Easing::Linear)
            .unwrap()
            .stop_if(move || s.get(), true)
            .on_complete(move || c.set(c.get() + 1));

        t.run(0.1);
        assert_eq!(completions.get(), 0);
        assert!(!t.is_complete());

        stop.set(true);
        t.run(0.1);
        assert_eq!(completions.get(), 1);
        assert!(t.is_complete());

        // Extra ticks past completion must not refire.
        t.run(0.1);
        t.run(0.1);
        assert_eq!(completions.get(), 1);
    }

    #[test]
    fn target_gone_ends_silently() {
        let updates = Rc::new(Cell::new(0_u32));
        let u = updates.clone();
        let alive = Rc::new(Cell::new(true));
        let a = alive.clone();

        let t = Tween::new(0.0_f32, 1.0, 1.0, Easing::Linear)
            .unwrap()
            .stop_if_target_gone(move || !a.get())
            .on_update(move |_: f32| u.set(u.get() + 1));

        t.run(0.25);
        assert_eq!(updates.get(), 1);

        alive.set(false);
        t.run(0.25);
        assert_eq!(updates.get(), 1, "no hooks after the target is gone");
        assert!(t.is_complete());
    }

    #[test]
    fn pause_stops_the_clock_and_stop_check_still_runs() {
        let t = Tween::new(0.0_f32, 1.0, 1.0, Easing::Linear).unwrap().pause();
        t.run(0.5);
        assert_eq!(t.elapsed(), 0.0);

        let t = t.play();
        t.run(0.5);
        assert!((t.elapsed() - 0.5).abs() < 1e-6);

        let t = t.toggle();
        assert!(t.is_paused());
    }

    #[test]
    fn playback_speed_scales_time() {
        let t = Tween::new(0.0_f32, 10.0, 2.0, Easing::Linear)
            .unwrap()
            .set_playback_speed(2.0);
        t.run(0.5);
        assert_eq!(t.value_as::<f32>(), Some(5.0));
    }

    #[test]
    fn mismatched_update_callback_is_a_no_op() {
        let calls = Rc::new(Cell::new(0_u32));
        let c = calls.clone();
        // Vec2 callback on a scalar tween: logged and dropped.
        let t = Tween::new(0.0_f32, 1.0, 1.0, Easing::Linear)
            .unwrap()
            .on_update(move |_: glam::Vec2| c.set(c.get() + 1));
        t.run(0.5);
        t.run(0.5);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn set_loop_zero_cycles_requests_removal() {
        let t = Tween::new(0.0_f32, 1.0, 1.0, Easing::Linear)
            .unwrap()
            .set_loop(LoopMode::Restart, 0);
        assert!(t.is_complete());
    }

    #[test]
    fn elapsed_is_monotonic_while_running() {
        let t = Tween::new(0.0_f32, 1.0, 5.0, Easing::BounceOut).unwrap();
        let mut last = t.elapsed();
        for _ in 0..10 {
            t.run(0.3);
            assert!(t.elapsed() > last);
            last = t.elapsed();
        }
    }

    #[test]
    fn eased_progress_stays_in_sync_with_value() {
        let t = Tween::new(0.0_f32, 100.0, 1.0, Easing::ElasticOut).unwrap();
        t.run(0.37);
        let expected = 100.0 * t.eased_progress();
        assert!((t.value_as::<f32>().unwrap() - expected).abs() < 1e-3);
    }
}
