//! Trigger policy: when to evaluate, and after how long.
//!
//! An edit event or a word-ending key moves a surface from `Idle` to
//! `PendingEvaluation`; once the settling delay elapses the evaluation runs
//! against whatever the surface contains *then*. Overlapping events are not
//! coalesced or cancelled: each schedules its own evaluation, and since an
//! evaluation with nothing to match doesn't mutate anything, the extras
//! are harmless.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use smol_str::SmolStr;

use crate::config::ExpanderConfig;
use crate::surface::Evaluation;

/// An event that may warrant an evaluation.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum TriggerEvent<'a> {
    /// The surface content changed (`input`).
    ContentChanged,
    /// A key was released (`keyup`), with its `KeyboardEvent.key` name.
    KeyUp(&'a str),
}

/// Which events trigger, and the settling delay for each.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriggerPolicy {
    pub input_delay: Duration,
    pub boundary_key_delay: Duration,
    pub boundary_keys: Vec<SmolStr>,
}

impl Default for TriggerPolicy {
    fn default() -> Self {
        Self::from_config(&ExpanderConfig::default())
    }
}

impl TriggerPolicy {
    pub fn from_config(config: &ExpanderConfig) -> Self {
        Self {
            input_delay: config.input_delay(),
            boundary_key_delay: config.boundary_key_delay(),
            boundary_keys: config.boundary_keys.clone(),
        }
    }

    /// Settling delay for `event`, or None if it shouldn't trigger.
    pub fn settling_delay(&self, event: TriggerEvent<'_>) -> Option<Duration> {
        match event {
            TriggerEvent::ContentChanged => Some(self.input_delay),
            TriggerEvent::KeyUp(key) if self.boundary_keys.iter().any(|k| k == key) => {
                Some(self.boundary_key_delay)
            }
            TriggerEvent::KeyUp(_) => None,
        }
    }
}

/// Defers a task without blocking. The browser implementation wraps
/// `setTimeout`; `ManualScheduler` drives virtual time for tests.
pub trait Scheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>);
}

impl<S: Scheduler + ?Sized> Scheduler for Rc<S> {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        (**self).schedule(delay, task)
    }
}

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum TriggerState {
    Idle,
    /// One or more evaluations are waiting out their settling delay.
    PendingEvaluation { pending: usize },
}

/// Per-surface trigger: applies the policy and tracks pending evaluations.
pub struct Trigger<S> {
    policy: Rc<TriggerPolicy>,
    scheduler: S,
    pending: Rc<Cell<usize>>,
}

impl<S: Clone> Clone for Trigger<S> {
    fn clone(&self) -> Self {
        Self {
            policy: self.policy.clone(),
            scheduler: self.scheduler.clone(),
            pending: self.pending.clone(),
        }
    }
}

impl<S: Scheduler> Trigger<S> {
    pub fn new(policy: Rc<TriggerPolicy>, scheduler: S) -> Self {
        Self {
            policy,
            scheduler,
            pending: Rc::new(Cell::new(0)),
        }
    }

    pub fn state(&self) -> TriggerState {
        match self.pending.get() {
            0 => TriggerState::Idle,
            pending => TriggerState::PendingEvaluation { pending },
        }
    }

    /// Schedule `evaluate` if the policy says `event` triggers.
    ///
    /// `evaluate` must read the surface when it runs, not capture its
    /// content now. Returns the delay used, or None if nothing was scheduled.
    pub fn handle<F>(&self, event: TriggerEvent<'_>, evaluate: F) -> Option<Duration>
    where
        F: FnOnce() -> Evaluation + 'static,
    {
        let delay = self.policy.settling_delay(event)?;
        tracing::trace!(?event, ?delay, "scheduling snippet evaluation");

        self.pending.set(self.pending.get() + 1);
        let pending = self.pending.clone();
        self.scheduler.schedule(
            delay,
            Box::new(move || {
                let outcome = evaluate();
                pending.set(pending.get().saturating_sub(1));
                tracing::trace!(?outcome, "snippet evaluation finished");
            }),
        );
        Some(delay)
    }
}

struct ScheduledTask {
    due: Duration,
    seq: u64,
    task: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct ManualQueue {
    now: Duration,
    next_seq: u64,
    tasks: Vec<ScheduledTask>,
}

/// A virtual-time scheduler. Tasks run only when `advance` moves the clock
/// past their due time, in due order (ties in scheduling order).
#[derive(Clone, Default)]
pub struct ManualScheduler {
    queue: Rc<RefCell<ManualQueue>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.queue.borrow().now
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().tasks.len()
    }

    /// Move the clock forward, running every task that falls due. Tasks
    /// scheduled while advancing run too if they fall due in the window.
    pub fn advance(&self, by: Duration) {
        let target = self.queue.borrow().now + by;
        loop {
            let next = {
                let mut queue = self.queue.borrow_mut();
                let idx = queue
                    .tasks
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| (t.due, t.seq))
                    .map(|(idx, _)| idx);
                idx.map(|idx| {
                    let task = queue.tasks.remove(idx);
                    queue.now = task.due;
                    task
                })
            };
            // The borrow is released before running, so tasks may schedule more.
            match next {
                Some(task) => (task.task)(),
                None => break,
            }
        }
        self.queue.borrow_mut().now = target;
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let mut queue = self.queue.borrow_mut();
        let due = queue.now + delay;
        let seq = queue.next_seq;
        queue.next_seq += 1;
        queue.tasks.push(ScheduledTask { due, seq, task });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::DictionaryMirror;
    use crate::flat::FlatBuffer;
    use crate::surface::{FlatSurface, evaluate};
    use crate::types::Snippet;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn setup() -> (
        Trigger<ManualScheduler>,
        ManualScheduler,
        Rc<RefCell<FlatSurface<FlatBuffer>>>,
        DictionaryMirror,
    ) {
        let scheduler = ManualScheduler::new();
        let trigger = Trigger::new(Rc::new(TriggerPolicy::default()), scheduler.clone());
        let surface = Rc::new(RefCell::new(FlatSurface(FlatBuffer::new(""))));
        let mirror = DictionaryMirror::new();
        mirror.replace(vec![Snippet::new(";br", "Best regards")]);
        (trigger, scheduler, surface, mirror)
    }

    fn evaluator(
        surface: &Rc<RefCell<FlatSurface<FlatBuffer>>>,
        mirror: &DictionaryMirror,
    ) -> impl FnOnce() -> Evaluation + 'static {
        let surface = surface.clone();
        let mirror = mirror.clone();
        move || evaluate(&mut *surface.borrow_mut(), &mirror.snapshot())
    }

    #[test]
    fn test_policy_delays() {
        let policy = TriggerPolicy::default();
        assert_eq!(policy.settling_delay(TriggerEvent::ContentChanged), Some(ms(10)));
        assert_eq!(policy.settling_delay(TriggerEvent::KeyUp(" ")), Some(ms(50)));
        assert_eq!(policy.settling_delay(TriggerEvent::KeyUp("Enter")), Some(ms(50)));
        assert_eq!(policy.settling_delay(TriggerEvent::KeyUp("Tab")), Some(ms(50)));
        assert_eq!(policy.settling_delay(TriggerEvent::KeyUp("a")), None);
    }

    #[test]
    fn test_idle_to_pending_to_idle() {
        let (trigger, scheduler, surface, mirror) = setup();
        surface.borrow_mut().0.type_text("hi ;br");

        assert_eq!(trigger.state(), TriggerState::Idle);
        trigger.handle(TriggerEvent::ContentChanged, evaluator(&surface, &mirror));
        assert_eq!(trigger.state(), TriggerState::PendingEvaluation { pending: 1 });

        scheduler.advance(ms(9));
        assert_eq!(surface.borrow().0.as_str(), "hi ;br");

        scheduler.advance(ms(1));
        assert_eq!(trigger.state(), TriggerState::Idle);
        assert_eq!(surface.borrow().0.as_str(), "hi Best regards");
    }

    #[test]
    fn test_non_boundary_key_does_not_schedule() {
        let (trigger, scheduler, surface, mirror) = setup();
        assert_eq!(trigger.handle(TriggerEvent::KeyUp("x"), evaluator(&surface, &mirror)), None);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(trigger.state(), TriggerState::Idle);
    }

    #[test]
    fn test_evaluation_reads_state_at_fire_time() {
        let (trigger, scheduler, surface, mirror) = setup();
        surface.borrow_mut().0.type_text(";b");
        trigger.handle(TriggerEvent::ContentChanged, evaluator(&surface, &mirror));

        // The token is completed during the settling delay.
        surface.borrow_mut().0.type_text("r");
        scheduler.advance(ms(10));
        assert_eq!(surface.borrow().0.as_str(), "Best regards");
    }

    #[test]
    fn test_overlapping_evaluations_are_idempotent() {
        let (trigger, scheduler, surface, mirror) = setup();
        surface.borrow_mut().0.type_text("ok ;br ");

        trigger.handle(TriggerEvent::ContentChanged, evaluator(&surface, &mirror));
        trigger.handle(TriggerEvent::KeyUp(" "), evaluator(&surface, &mirror));
        assert_eq!(trigger.state(), TriggerState::PendingEvaluation { pending: 2 });

        scheduler.advance(ms(10));
        assert_eq!(surface.borrow().0.as_str(), "ok Best regards ");
        assert_eq!(surface.borrow().0.notifications().len(), 2);

        // The second evaluation finds nothing left to replace.
        scheduler.advance(ms(40));
        assert_eq!(surface.borrow().0.as_str(), "ok Best regards ");
        assert_eq!(surface.borrow().0.notifications().len(), 2);
        assert_eq!(trigger.state(), TriggerState::Idle);
    }

    #[test]
    fn test_dictionary_update_between_evaluations() {
        let (trigger, scheduler, surface, mirror) = setup();
        surface.borrow_mut().0.type_text(";sig");
        trigger.handle(TriggerEvent::ContentChanged, evaluator(&surface, &mirror));

        mirror.replace(vec![Snippet::new(";sig", "-- J")]);
        scheduler.advance(ms(10));
        assert_eq!(surface.borrow().0.as_str(), "-- J");
    }

    #[test]
    fn test_manual_scheduler_orders_by_due_time() {
        let scheduler = ManualScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (delay, name) in [(50, "late"), (10, "early"), (10, "early-2")] {
            let log = log.clone();
            scheduler.schedule(ms(delay), Box::new(move || log.borrow_mut().push(name)));
        }
        scheduler.advance(ms(100));
        assert_eq!(*log.borrow(), vec!["early", "early-2", "late"]);
        assert_eq!(scheduler.now(), ms(100));
    }
}
