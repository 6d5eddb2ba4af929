use std::time::Duration;

use crate::{config::SkipConfig, timeline::TaskSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipDirection {
    Back,
    Forward,
}

impl SkipDirection {
    pub fn sign(self) -> f64 {
        match self {
            Self::Back => -1.0,
            Self::Forward => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoldPhase {
    #[default]
    Idle,
    /// Pressed, waiting for the hold delay.
    Armed,
    /// Held past the delay; repeating accelerated skips.
    Repeating,
}

/// Press-and-hold state of one skip button.
#[derive(Debug, Clone)]
pub struct HoldGesture {
    pub phase: HoldPhase,
    pub was_playing: bool,
    pub pressed_at: Duration,
    pub skip_speed: f64,
    pub arm: TaskSlot,
    pub repeat: TaskSlot,
}

impl Default for HoldGesture {
    fn default() -> Self {
        Self {
            phase: HoldPhase::Idle,
            was_playing: false,
            pressed_at: Duration::ZERO,
            skip_speed: 1.0,
            arm: TaskSlot::default(),
            repeat: TaskSlot::default(),
        }
    }
}

impl HoldGesture {
    pub fn is_idle(&self) -> bool {
        self.phase == HoldPhase::Idle
    }

    pub fn press(&mut self, was_playing: bool, now: Duration) {
        self.phase = HoldPhase::Armed;
        self.was_playing = was_playing;
        self.pressed_at = now;
        self.skip_speed = 1.0;
    }

    pub fn release(&mut self) {
        self.phase = HoldPhase::Idle;
        self.skip_speed = 1.0;
    }
}

/// Accelerating skip multiplier.
#[derive(Debug, Clone)]
pub struct SkipRamp {
    pub step_percent: f64,
    pub hold_step_percent: f64,
    pub acceleration: f64,
    pub max_speed: f64,
}

impl SkipRamp {
    pub fn from_config(config: &SkipConfig) -> Self {
        Self {
            step_percent: config.step_percent,
            hold_step_percent: config.hold_step_percent,
            acceleration: config.acceleration.max(0.0),
            max_speed: config.max_speed.max(1.0),
        }
    }

    /// Multiplier after holding for `held`, starting at 1 and capped.
    pub fn speed_after(&self, held: Duration) -> f64 {
        (1.0 + held.as_secs_f64() * self.acceleration).min(self.max_speed)
    }

    /// Signed percentage jumped by one repeat at `speed`.
    pub fn repeat_percent(&self, direction: SkipDirection, speed: f64) -> f64 {
        direction.sign() * self.hold_step_percent * speed
    }

    pub fn press_percent(&self, direction: SkipDirection) -> f64 {
        direction.sign() * self.step_percent
    }
}

/// Both skip buttons.
#[derive(Debug, Clone, Default)]
pub struct SkipController {
    pub back: HoldGesture,
    pub forward: HoldGesture,
}

impl SkipController {
    pub fn gesture(&self, direction: SkipDirection) -> &HoldGesture {
        match direction {
            SkipDirection::Back => &self.back,
            SkipDirection::Forward => &self.forward,
        }
    }

    pub fn gesture_mut(&mut self, direction: SkipDirection) -> &mut HoldGesture {
        match direction {
            SkipDirection::Back => &mut self.back,
            SkipDirection::Forward => &mut self.forward,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_accelerates_up_to_cap() {
        let ramp = SkipRamp::from_config(&SkipConfig::default());

        assert_eq!(ramp.speed_after(Duration::ZERO), 1.0);
        assert_eq!(ramp.speed_after(Duration::from_millis(500)), 3.0);
        assert_eq!(ramp.speed_after(Duration::from_secs(60)), 10.0);
    }

    #[test]
    fn percentages_follow_direction() {
        let ramp = SkipRamp::from_config(&SkipConfig::default());

        assert_eq!(ramp.press_percent(SkipDirection::Back), -5.0);
        assert_eq!(ramp.repeat_percent(SkipDirection::Forward, 2.0), 1.0);
    }

    #[test]
    fn release_resets_speed() {
        let mut gesture = HoldGesture::default();
        gesture.press(true, Duration::from_millis(10));
        gesture.phase = HoldPhase::Repeating;
        gesture.skip_speed = 7.0;

        gesture.release();

        assert!(gesture.is_idle());
        assert_eq!(gesture.skip_speed, 1.0);
    }
}
