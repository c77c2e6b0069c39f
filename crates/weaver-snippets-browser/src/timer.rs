//! `setTimeout`-backed scheduler.

use std::time::Duration;

use weaver_snippets_core::Scheduler;

/// Runs deferred tasks on the browser event loop.
///
/// Timeouts are fire-and-forget: nothing cancels a pending evaluation.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimeoutScheduler;

impl Scheduler for TimeoutScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        gloo_timers::callback::Timeout::new(millis, task).forget();
    }
}
