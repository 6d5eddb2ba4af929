use crate::timeline::TaskSlot;

/// Mutable playback state of the single active series.
///
/// `current_time` is only ever written through [`PlaybackSession::set_time`],
/// which keeps it inside `[0, max_time]`.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    current_time: f64,
    pub is_playing: bool,
    playback_speed: f64,
    /// Play state captured when a scrub gesture starts.
    pub was_playing_before_drag: bool,
    /// Periodic playback tick; live exactly while `is_playing`.
    pub tick: TaskSlot,
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self::with_speed(1.0)
    }
}

impl PlaybackSession {
    pub fn with_speed(speed: f64) -> Self {
        let mut session = Self {
            current_time: 0.0,
            is_playing: false,
            playback_speed: 1.0,
            was_playing_before_drag: false,
            tick: TaskSlot::default(),
        };
        session.set_speed(speed);
        session
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Stores `time` clamped to `[0, max_time]`. NaN lands on zero.
    pub fn set_time(&mut self, time: f64, max_time: f64) -> f64 {
        let max_time = if max_time.is_finite() {
            max_time.max(0.0)
        } else {
            0.0
        };
        self.current_time = if time.is_nan() {
            0.0
        } else {
            time.clamp(0.0, max_time)
        };
        self.current_time
    }

    pub fn playback_speed(&self) -> f64 {
        self.playback_speed
    }

    /// Negative speeds clamp to zero; non-finite speeds are ignored.
    pub fn set_speed(&mut self, speed: f64) -> bool {
        if !speed.is_finite() {
            return false;
        }
        self.playback_speed = speed.max(0.0);
        true
    }

    /// Returns to the start, paused. Timers must be cancelled by the owner of
    /// the scheduler before calling this.
    pub fn reset(&mut self) {
        self.current_time = 0.0;
        self.is_playing = false;
        self.was_playing_before_drag = false;
        self.tick = TaskSlot::default();
    }
}
