//! Time bookkeeping for playback: the step arithmetic of the playback clock
//! and a deterministic, single-threaded timer queue.
//!
//! The [`Scheduler`] never sleeps. Its owner feeds it elapsed wall-clock time
//! and dispatches the timers that fell due, one at a time and in due order,
//! so every callback runs to completion before the next one starts.

use std::time::Duration;

use crate::config::PlaybackConfig;

/// Step arithmetic of the playback tick.
///
/// A full pass over any series takes `standardized_seconds` of wall-clock
/// time at speed 1.0, whatever the native duration of the data.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    tick_period: Duration,
    standardized_seconds: f64,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::from_config(&PlaybackConfig::default())
    }
}

impl PlaybackClock {
    pub fn from_config(config: &PlaybackConfig) -> Self {
        Self {
            tick_period: config.tick_period(),
            standardized_seconds: config.standardized_seconds,
        }
    }

    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }

    pub fn ticks_per_second(&self) -> f64 {
        1.0 / self.tick_period.as_secs_f64()
    }

    /// Data-time advanced per tick at speed 1.0.
    pub fn base_step(&self, max_time: f64) -> f64 {
        let ticks = self.ticks_per_second() * self.standardized_seconds;
        if !max_time.is_finite() || max_time <= 0.0 || ticks <= 0.0 || !ticks.is_finite() {
            return 0.0;
        }
        max_time / ticks
    }

    pub fn step(&self, max_time: f64, speed: f64) -> f64 {
        if !speed.is_finite() || speed <= 0.0 {
            return 0.0;
        }
        self.base_step(max_time) * speed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct TimerEntry<K> {
    id: TimerId,
    kind: K,
    due: Duration,
    period: Option<Duration>,
}

/// Timer queue keyed by a caller-defined timer kind.
#[derive(Debug)]
pub struct Scheduler<K> {
    now: Duration,
    next_id: u64,
    timers: Vec<TimerEntry<K>>,
}

impl<K> Default for Scheduler<K> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            timers: Vec::new(),
        }
    }
}

impl<K: Copy> Scheduler<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduler time, i.e. the sum of everything passed to [`Self::advance_to`].
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule_once(&mut self, kind: K, delay: Duration) -> TimerId {
        self.insert(kind, delay, None)
    }

    pub fn schedule_repeating(&mut self, kind: K, period: Duration) -> TimerId {
        let period = period.max(Duration::from_millis(1));
        self.insert(kind, period, Some(period))
    }

    /// Removes a registration. Returns `false` when nothing was live under
    /// `id`, which is not an error.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != id);
        before != self.timers.len()
    }

    pub fn is_live(&self, id: TimerId) -> bool {
        self.timers.iter().any(|timer| timer.id == id)
    }

    pub fn live_count(&self) -> usize {
        self.timers.len()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }

    /// Pops the earliest timer due at or before `until`, moving the clock to
    /// its due time. Repeating timers are re-armed one period later.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, K)> {
        let position = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due <= until)
            .min_by_key(|(_, timer)| (timer.due, timer.id))
            .map(|(position, _)| position)?;

        let timer = &self.timers[position];
        self.now = self.now.max(timer.due);
        let fired = (timer.id, timer.kind);
        let period = timer.period;

        match period {
            Some(period) => self.timers[position].due += period,
            None => {
                self.timers.remove(position);
            }
        }
        Some(fired)
    }

    /// Moves the clock forward without firing anything.
    pub fn advance_to(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    fn insert(&mut self, kind: K, delay: Duration, period: Option<Duration>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(TimerEntry {
            id,
            kind,
            due: self.now + delay,
            period,
        });
        id
    }
}

/// Holder for at most one live timer registration.
///
/// Starting a slot that is still running is refused, so a slot can never
/// leak a second overlapping timer.
#[derive(Debug, Default, Clone)]
pub struct TaskSlot {
    id: Option<TimerId>,
}

impl TaskSlot {
    pub fn is_running<K: Copy>(&self, scheduler: &Scheduler<K>) -> bool {
        self.id.is_some_and(|id| scheduler.is_live(id))
    }

    pub fn holds(&self, id: TimerId) -> bool {
        self.id == Some(id)
    }

    pub fn start_repeating<K: Copy>(
        &mut self,
        scheduler: &mut Scheduler<K>,
        kind: K,
        period: Duration,
    ) -> bool {
        if self.is_running(scheduler) {
            return false;
        }
        self.id = Some(scheduler.schedule_repeating(kind, period));
        true
    }

    pub fn start_once<K: Copy>(
        &mut self,
        scheduler: &mut Scheduler<K>,
        kind: K,
        delay: Duration,
    ) -> bool {
        if self.is_running(scheduler) {
            return false;
        }
        self.id = Some(scheduler.schedule_once(kind, delay));
        true
    }

    /// Cancels the held registration, if any. Safe to call repeatedly.
    pub fn cancel<K: Copy>(&mut self, scheduler: &mut Scheduler<K>) -> bool {
        match self.id.take() {
            Some(id) => scheduler.cancel(id),
            None => false,
        }
    }
}
