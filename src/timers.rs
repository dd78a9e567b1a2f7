//! Single-threaded timer queue with schedule-once and cancel.
//!
//! The queue keeps its own monotonic clock. Nothing fires on its own: the
//! owner drives it with [`advance`] or [`run_until`], and every due callback
//! runs with exclusive access to the owning context.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

use tracing::trace;

pub type TimerCallback<C> = Box<dyn FnOnce(&mut C)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

pub struct TimerQueue<C> {
    now: Duration,
    next_id: u64,
    // (deadline, id); ids grow monotonically so equal deadlines keep registration order
    entries: BTreeMap<(Duration, TimerId), TimerCallback<C>>,
    deadlines: HashMap<TimerId, Duration>,
}

impl<C> fmt::Debug for TimerQueue<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("now", &self.now)
            .field("pending", &self.entries.len())
            .finish()
    }
}

impl<C> Default for TimerQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> TimerQueue<C> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            entries: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    /// Current reading of the queue's clock.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, delay: Duration, callback: impl FnOnce(&mut C) + 'static) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let deadline = self.now + delay;
        self.entries.insert((deadline, id), Box::new(callback));
        self.deadlines.insert(id, deadline);
        trace!(?id, ?deadline, "timer scheduled");
        id
    }

    /// Returns `true` if the timer was still pending. A cancelled timer never runs.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id) {
            Some(deadline) => self.entries.remove(&(deadline, id)).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.keys().next().map(|(deadline, _)| *deadline)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Takes the earliest callback due at or before `until` and moves the
    /// clock to its deadline.
    fn pop_due(&mut self, until: Duration) -> Option<TimerCallback<C>> {
        let (&(deadline, id), _) = self.entries.first_key_value()?;
        if deadline > until {
            return None;
        }
        let callback = self.entries.remove(&(deadline, id))?;
        self.deadlines.remove(&id);
        if deadline > self.now {
            self.now = deadline;
        }
        Some(callback)
    }
}

/// A context that owns the timer queue its callbacks run against.
pub trait Scheduler: Sized {
    fn timers(&mut self) -> &mut TimerQueue<Self>;
}

/// Moves the clock forward by `by`, firing everything that falls due.
/// Returns the number of callbacks run.
pub fn advance<C: Scheduler>(ctx: &mut C, by: Duration) -> usize {
    let target = ctx.timers().now() + by;
    run_until(ctx, target)
}

/// Fires every callback due at or before `target` in deadline order, then
/// leaves the clock at `target` (it never goes backwards).
pub fn run_until<C: Scheduler>(ctx: &mut C, target: Duration) -> usize {
    let mut fired = 0;
    while let Some(callback) = ctx.timers().pop_due(target) {
        callback(ctx);
        fired += 1;
    }
    let timers = ctx.timers();
    if target > timers.now {
        timers.now = target;
    }
    fired
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Ctx {
        timers: TimerQueue<Ctx>,
        log: Vec<(&'static str, Duration)>,
    }

    impl Scheduler for Ctx {
        fn timers(&mut self) -> &mut TimerQueue<Self> {
            &mut self.timers
        }
    }

    fn record(name: &'static str) -> impl FnOnce(&mut Ctx) + 'static {
        move |ctx: &mut Ctx| {
            let now = ctx.timers.now();
            ctx.log.push((name, now));
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn fires_in_deadline_then_registration_order() {
        let mut ctx = Ctx::default();
        ctx.timers.schedule(ms(20), record("late"));
        ctx.timers.schedule(ms(10), record("first"));
        ctx.timers.schedule(ms(10), record("second"));

        assert_eq!(advance(&mut ctx, ms(25)), 3);
        assert_eq!(
            ctx.log,
            vec![("first", ms(10)), ("second", ms(10)), ("late", ms(20))]
        );
        assert_eq!(ctx.timers.now(), ms(25));
    }

    #[test]
    fn cancelled_timer_never_runs() {
        let mut ctx = Ctx::default();
        let id = ctx.timers.schedule(ms(5), record("cancelled"));
        assert!(ctx.timers.is_pending(id));
        assert!(ctx.timers.cancel(id));
        assert!(!ctx.timers.cancel(id));
        advance(&mut ctx, ms(100));
        assert!(ctx.log.is_empty());
        assert!(ctx.timers.is_empty());
    }

    #[test]
    fn zero_delay_waits_for_the_next_drive() {
        let mut ctx = Ctx::default();
        let id = ctx.timers.schedule(Duration::ZERO, record("tick"));
        assert!(ctx.log.is_empty());
        assert!(ctx.timers.is_pending(id));
        advance(&mut ctx, Duration::ZERO);
        assert_eq!(ctx.log, vec![("tick", Duration::ZERO)]);
        assert!(!ctx.timers.is_pending(id));
    }

    #[test]
    fn callbacks_can_schedule_follow_ups_within_the_same_drive() {
        let mut ctx = Ctx::default();
        ctx.timers.schedule(ms(10), |ctx: &mut Ctx| {
            ctx.timers.schedule(ms(5), record("follow-up"));
        });
        advance(&mut ctx, ms(14));
        assert!(ctx.log.is_empty());
        advance(&mut ctx, ms(1));
        assert_eq!(ctx.log, vec![("follow-up", ms(15))]);
    }

    #[test]
    fn clock_never_runs_backwards() {
        let mut ctx = Ctx::default();
        run_until(&mut ctx, ms(50));
        run_until(&mut ctx, ms(20));
        assert_eq!(ctx.timers.now(), ms(50));
        assert_eq!(ctx.timers.next_deadline(), None);
    }
}
