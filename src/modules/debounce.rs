//! Collapse bursts of calls into one.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tracing::trace;

use crate::timers::{Scheduler, TimerId};

/// Wrapper returned by [`debounce`]. Owns at most one pending timer.
pub struct Debounced<C, A> {
    func: Rc<dyn Fn(&mut C, A)>,
    wait: Duration,
    immediate: bool,
    pending: Option<TimerId>,
}

impl<C, A> fmt::Debug for Debounced<C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debounced")
            .field("wait", &self.wait)
            .field("immediate", &self.immediate)
            .field("pending", &self.pending)
            .finish()
    }
}

/// Trailing mode calls `func` once, `wait` after the last call of a burst,
/// with that call's arguments. Leading mode (`immediate`) calls it right away
/// on the first call of a burst and swallows the rest until `wait` passes
/// without calls.
pub fn debounce<C, A>(func: impl Fn(&mut C, A) + 'static, wait: Duration, immediate: bool) -> Debounced<C, A>
where
    C: Scheduler + 'static,
    A: 'static,
{
    Debounced {
        func: Rc::new(func),
        wait,
        immediate,
        pending: None,
    }
}

impl<C, A> Debounced<C, A>
where
    C: Scheduler + 'static,
    A: 'static,
{
    pub fn call(&mut self, ctx: &mut C, args: A) {
        let window_open = self.is_pending(ctx);
        if let Some(id) = self.pending.take() {
            ctx.timers().cancel(id);
        }

        if self.immediate {
            // the timer only closes the window, leading mode has no trailing call
            self.pending = Some(ctx.timers().schedule(self.wait, |_: &mut C| {}));
            if !window_open {
                trace!("debounce leading call");
                (self.func)(ctx, args);
            }
        } else {
            let func = Rc::clone(&self.func);
            self.pending = Some(ctx.timers().schedule(self.wait, move |ctx: &mut C| {
                trace!("debounce trailing call");
                func(ctx, args)
            }));
        }
    }

    /// Whether a timer of this wrapper is still waiting to fire.
    pub fn is_pending(&self, ctx: &mut C) -> bool {
        self.pending.is_some_and(|id| ctx.timers().is_pending(id))
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;
    use crate::timers::{advance, TimerQueue};
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Ctx {
        timers: TimerQueue<Ctx>,
        calls: Vec<(u32, Duration)>,
    }

    impl Scheduler for Ctx {
        fn timers(&mut self) -> &mut TimerQueue<Self> {
            &mut self.timers
        }
    }

    fn recorder(ctx: &mut Ctx, arg: u32) {
        let now = ctx.timers.now();
        ctx.calls.push((arg, now));
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn burst_collapses_to_one_trailing_call_with_last_args() {
        let mut ctx = Ctx::default();
        let mut wrapped = debounce(recorder, ms(100), false);
        for arg in 1..=5 {
            wrapped.call(&mut ctx, arg);
            advance(&mut ctx, ms(10));
        }
        // fifth call happened at t=40
        advance(&mut ctx, ms(89));
        assert!(ctx.calls.is_empty());
        advance(&mut ctx, ms(1));
        assert_eq!(ctx.calls, vec![(5, ms(140))]);
        advance(&mut ctx, ms(1000));
        assert_eq!(ctx.calls.len(), 1);
    }

    #[test]
    fn leading_mode_fires_immediately_and_suppresses_the_window() {
        let mut ctx = Ctx::default();
        let mut wrapped = debounce(recorder, ms(100), true);
        wrapped.call(&mut ctx, 1);
        assert_eq!(ctx.calls, vec![(1, ms(0))]);

        advance(&mut ctx, ms(10));
        wrapped.call(&mut ctx, 2);
        advance(&mut ctx, ms(500));
        assert_eq!(ctx.calls, vec![(1, ms(0))]);
        assert!(!wrapped.is_pending(&mut ctx));
    }

    #[test]
    fn leading_mode_reopens_after_a_quiet_window() {
        let mut ctx = Ctx::default();
        let mut wrapped = debounce(recorder, ms(100), true);
        wrapped.call(&mut ctx, 1);
        advance(&mut ctx, ms(60));
        // extends the window to t=160
        wrapped.call(&mut ctx, 2);
        advance(&mut ctx, ms(60));
        wrapped.call(&mut ctx, 3);
        advance(&mut ctx, ms(100));
        wrapped.call(&mut ctx, 4);
        assert_eq!(ctx.calls, vec![(1, ms(0)), (4, ms(220))]);
    }

    #[test]
    fn zero_wait_still_defers() {
        let mut ctx = Ctx::default();
        let mut wrapped = debounce(recorder, Duration::ZERO, false);
        wrapped.call(&mut ctx, 7);
        assert!(ctx.calls.is_empty());
        assert!(wrapped.is_pending(&mut ctx));
        advance(&mut ctx, Duration::ZERO);
        assert_eq!(ctx.calls, vec![(7, ms(0))]);
    }

    #[test]
    fn separate_wrappers_do_not_share_state() {
        let mut ctx = Ctx::default();
        let mut a = debounce(recorder, ms(50), false);
        let mut b = debounce(recorder, ms(50), false);
        a.call(&mut ctx, 1);
        b.call(&mut ctx, 2);
        advance(&mut ctx, ms(50));
        assert_eq!(ctx.calls, vec![(1, ms(50)), (2, ms(50))]);
    }

    #[test]
    #[should_panic(expected = "boom")]
    fn panics_in_the_wrapped_function_reach_the_driver() {
        let mut page = Page::default();
        let mut wrapped = debounce(|_: &mut Page, _: ()| panic!("boom"), ms(5), false);
        wrapped.call(&mut page, ());
        page.advance(ms(5));
    }
}
