use super::{EngineTimer, PlaybackEngine};
use crate::skip::{HoldPhase, SkipDirection};

impl PlaybackEngine {
    /// Jumps by `percent` of the total duration, clamped to the series.
    pub fn skip_by_percentage(&mut self, percent: f64) -> f64 {
        let time = self.skip_target(percent);
        self.seek(time)
    }

    fn skip_target(&self, percent: f64) -> f64 {
        if !percent.is_finite() {
            return self.current_time();
        }
        self.current_time() + self.max_time() * (percent / 100.0)
    }

    /// Press on a skip button: one immediate skip, then a hold timer that
    /// turns the press into an accelerating repeat.
    pub fn skip_pointer_down(&mut self, direction: SkipDirection) {
        if !self.skip.gesture(direction).is_idle() {
            self.skip_pointer_up(direction);
        }

        let was_playing = self.session.is_playing;
        let now = self.scheduler.now();
        self.skip.gesture_mut(direction).press(was_playing, now);
        self.skip_by_percentage(self.ramp.press_percent(direction));

        let delay = self.skip_config.hold_delay();
        self.skip
            .gesture_mut(direction)
            .arm
            .start_once(&mut self.scheduler, EngineTimer::HoldArm(direction), delay);
    }

    pub fn skip_pointer_up(&mut self, direction: SkipDirection) {
        let gesture = self.skip.gesture_mut(direction);
        let phase = gesture.phase;
        let was_playing = gesture.was_playing;

        gesture.arm.cancel(&mut self.scheduler);
        gesture.repeat.cancel(&mut self.scheduler);
        gesture.release();

        if phase == HoldPhase::Repeating {
            tracing::debug!(?direction, time = self.current_time(), "skip hold released");
            if was_playing && !self.session.is_playing {
                self.toggle();
            }
        }
    }

    /// Leaving the button ends the gesture exactly like a release.
    pub fn skip_pointer_leave(&mut self, direction: SkipDirection) {
        self.skip_pointer_up(direction);
    }

    pub(super) fn on_hold_armed(&mut self, direction: SkipDirection) {
        let gesture = self.skip.gesture_mut(direction);
        if gesture.phase != HoldPhase::Armed {
            return;
        }
        gesture.phase = HoldPhase::Repeating;
        let was_playing = gesture.was_playing;

        if was_playing {
            self.pause();
        }

        let period = self.skip_config.repeat_period();
        self.skip
            .gesture_mut(direction)
            .repeat
            .start_repeating(&mut self.scheduler, EngineTimer::HoldRepeat(direction), period);
        tracing::debug!(?direction, "skip hold repeating");
    }

    pub(super) fn on_hold_repeat(&mut self, direction: SkipDirection) {
        let hold_delay = self.skip_config.hold_delay();
        let now = self.scheduler.now();
        let gesture = self.skip.gesture_mut(direction);
        if gesture.phase != HoldPhase::Repeating {
            gesture.repeat.cancel(&mut self.scheduler);
            return;
        }

        let held = now.saturating_sub(gesture.pressed_at).saturating_sub(hold_delay);
        let speed = self.ramp.speed_after(held);
        gesture.skip_speed = speed;

        // Visual refresh only, audio stays silent while holding.
        let time = self.skip_target(self.ramp.repeat_percent(direction, speed));
        self.set_current_time(time);
    }
}
