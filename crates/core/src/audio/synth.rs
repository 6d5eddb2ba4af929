use std::f64::consts::TAU;

use super::AudioBackend;
use crate::{CognifyError, Result};

const DEFAULT_FREQUENCY: f64 = 440.0;

/// Software sine oscillator.
///
/// Frequency changes glide exponentially towards their target, the way a
/// Web Audio `setTargetAtTime` ramp does, which keeps retuning click-free.
#[derive(Debug, Clone)]
pub struct SineVoice {
    sample_rate: u32,
    running: bool,
    phase: f64,
    frequency: f64,
    target_frequency: f64,
    time_constant: f64,
    gain: f64,
}

impl SineVoice {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            running: false,
            phase: 0.0,
            frequency: DEFAULT_FREQUENCY,
            target_frequency: DEFAULT_FREQUENCY,
            time_constant: 0.0,
            gain: 1.0,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn target_frequency(&self) -> f64 {
        self.target_frequency
    }

    /// Fills `out` with the next block. A stopped voice renders silence.
    pub fn render(&mut self, out: &mut [f32]) {
        if !self.running {
            out.fill(0.0);
            return;
        }

        let dt = 1.0 / self.sample_rate as f64;
        let coefficient = if self.time_constant > 0.0 {
            1.0 - (-dt / self.time_constant).exp()
        } else {
            1.0
        };

        for sample in out.iter_mut() {
            self.frequency += (self.target_frequency - self.frequency) * coefficient;
            self.phase = (self.phase + TAU * self.frequency * dt) % TAU;
            *sample = (self.phase.sin() * self.gain) as f32;
        }
    }
}

impl AudioBackend for SineVoice {
    fn start(&mut self) -> Result<()> {
        if self.sample_rate < 2 {
            return Err(CognifyError::AudioUnavailable(format!(
                "sample rate {} Hz cannot carry a tone",
                self.sample_rate
            )));
        }
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.running = false;
        self.phase = 0.0;
    }

    fn set_frequency(&mut self, hz: f64, time_constant: f64) {
        if !hz.is_finite() || hz <= 0.0 {
            return;
        }
        self.target_frequency = hz;
        self.time_constant = time_constant.max(0.0);
    }

    fn set_gain(&mut self, gain: f64) {
        if gain.is_finite() {
            self.gain = gain.clamp(0.0, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_voice_is_silent() {
        let mut voice = SineVoice::new(8_000);
        let mut block = vec![1.0_f32; 64];
        voice.render(&mut block);
        assert!(block.iter().all(|sample| *sample == 0.0));
    }

    #[test]
    fn frequency_glides_towards_target() {
        let mut voice = SineVoice::new(1_000);
        voice.start().unwrap();
        voice.set_frequency(1_440.0, 0.1);
        assert_eq!(voice.target_frequency(), 1_440.0);
        assert_eq!(voice.frequency(), 440.0);

        let mut block = vec![0.0_f32; 100];
        voice.render(&mut block);
        // One time constant covers ~63% of the distance.
        let covered = (voice.frequency() - 440.0) / 1_000.0;
        assert!((covered - 0.632).abs() < 0.01, "covered {covered}");

        let mut long = vec![0.0_f32; 2_000];
        voice.render(&mut long);
        assert!((voice.frequency() - 1_440.0).abs() < 0.1);
    }

    #[test]
    fn gain_scales_output() {
        let mut voice = SineVoice::new(8_000);
        voice.start().unwrap();
        voice.set_gain(0.25);

        let mut block = vec![0.0_f32; 256];
        voice.render(&mut block);
        let peak = block.iter().fold(0.0_f32, |peak, s| peak.max(s.abs()));
        assert!(peak <= 0.25 + f32::EPSILON);
        assert!(peak > 0.2);
    }

    #[test]
    fn degenerate_sample_rate_fails_to_start() {
        let mut voice = SineVoice::new(1);
        assert!(voice.start().is_err());
        assert!(!voice.is_running());
    }
}
