//! Throttling of mutation handling on pages that mutate non-stop.
//!
//! Nothing here owns a timer. The host passes the current time in, schedules
//! a wakeup at `next_deadline()`, and calls `poll()` then.

use std::time::{Duration, Instant};

pub const MINIMUM_PAUSE: Duration = Duration::from_millis(500);
pub const MAXIMUM_PAUSE: Duration = Duration::from_secs(60);
pub const PAUSE_MULTIPLIER: f64 = 1.5;
/// How often the pause shrinks, by `MINIMUM_PAUSE` each time, once a burst
/// is over.
pub const DECAY_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The guarded task ran.
    Ran,
    /// The scheduled task will run at this point.
    Scheduled(Instant),
    /// A scheduled task was already pending, this call was folded into it.
    Coalesced,
}

/// Runs a task at most once per `pause`, deferring to a (single) scheduled
/// task in between. The pause grows while calls keep coming too fast, and
/// decays once they stop.
#[derive(Debug)]
pub struct PauseHandler<T> {
    pause: Duration,
    last_event: Option<Instant>,
    scheduled: Option<(Instant, T)>,
    next_decay: Option<Instant>,
}

impl<T> Default for PauseHandler<T> {
    fn default() -> Self {
        Self {
            pause: MINIMUM_PAUSE,
            last_event: None,
            scheduled: None,
            next_decay: None,
        }
    }
}

impl<T> PauseHandler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pause(&self) -> Duration {
        self.pause
    }

    /// Whether a burst was seen recently, so results may lag behind the page.
    pub fn is_paused(&self) -> bool {
        self.pause > MINIMUM_PAUSE
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled.is_some()
    }

    /// Runs `guarded` if enough time passed since the last run. Otherwise
    /// makes sure `task` runs once the (increased) pause is over.
    pub fn run<F>(&mut self, now: Instant, guarded: F, task: T) -> RunOutcome
    where
        F: FnOnce(),
    {
        let elapsed = self.last_event.map(|last| now.saturating_duration_since(last));
        if elapsed.map_or(true, |elapsed| elapsed > self.pause) {
            guarded();
            self.last_event = Some(now);
            return RunOutcome::Ran;
        }

        if self.scheduled.is_some() {
            return RunOutcome::Coalesced;
        }

        self.next_decay = None;
        self.increase_pause();
        let due = now + self.pause;
        trace!("Pausing for {:?}", self.pause);
        self.scheduled = Some((due, task));
        RunOutcome::Scheduled(due)
    }

    fn increase_pause(&mut self) {
        self.pause = self.pause.mul_f64(PAUSE_MULTIPLIER).min(MAXIMUM_PAUSE);
    }

    fn decrease_pause(&mut self) {
        self.pause = self
            .pause
            .checked_sub(MINIMUM_PAUSE)
            .map_or(MINIMUM_PAUSE, |pause| pause.max(MINIMUM_PAUSE));
    }

    /// When `poll` should be called next, if at all.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.scheduled.as_ref().map(|s| s.0), self.next_decay) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Returns the scheduled task if it's due, and lets the pause decay.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let is_due = self.scheduled.as_ref().map_or(false, |&(due, _)| due <= now);
        let fired = if is_due { self.scheduled.take() } else { None };
        let fired = fired.map(|(due, task)| {
            self.last_event = Some(due);
            self.next_decay = Some(due + DECAY_INTERVAL);
            task
        });
        self.decay(now);
        fired
    }

    fn decay(&mut self, now: Instant) {
        while let Some(at) = self.next_decay {
            if at > now {
                break;
            }
            self.decrease_pause();
            self.next_decay = if self.is_paused() {
                Some(at + DECAY_INTERVAL)
            } else {
                None
            };
        }
    }

    /// Forgets all history and drops any scheduled task.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
