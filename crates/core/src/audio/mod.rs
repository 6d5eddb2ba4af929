use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
    config::SonificationConfig,
    mapping::{FrequencyMapping, ValueRange},
    Result,
};

mod synth;

pub use synth::SineVoice;

/// The external audio subsystem as seen by the playback engine.
///
/// The engine never builds or tears down an audio graph itself; it only
/// starts, stops and retunes whatever backend it was handed.
pub trait AudioBackend {
    /// Starts the oscillator. Fails when the platform has no audio.
    fn start(&mut self) -> Result<()>;
    fn stop(&mut self);
    /// Glides towards `hz` with the given time constant, in seconds.
    fn set_frequency(&mut self, hz: f64, time_constant: f64);
    fn set_gain(&mut self, gain: f64);
}

impl<T: AudioBackend> AudioBackend for Rc<RefCell<T>> {
    fn start(&mut self) -> Result<()> {
        self.borrow_mut().start()
    }

    fn stop(&mut self) {
        self.borrow_mut().stop()
    }

    fn set_frequency(&mut self, hz: f64, time_constant: f64) {
        self.borrow_mut().set_frequency(hz, time_constant)
    }

    fn set_gain(&mut self, gain: f64) {
        self.borrow_mut().set_gain(gain)
    }
}

/// Bridge between the current data value and the oscillator pitch.
///
/// Every call is a no-op while no oscillator is running, so audio failures
/// never reach visual playback.
pub struct Sonifier {
    backend: Option<Box<dyn AudioBackend>>,
    mapping: FrequencyMapping,
    time_constant: f64,
    volume: f64,
    active: bool,
    last_frequency: Option<f64>,
}

impl Sonifier {
    pub fn new(config: &SonificationConfig) -> Self {
        Self {
            backend: None,
            mapping: FrequencyMapping::from_config(config),
            time_constant: config.time_constant,
            volume: config.volume.clamp(0.0, 1.0),
            active: false,
            last_frequency: None,
        }
    }

    pub fn with_backend(mut self, backend: Box<dyn AudioBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn set_backend(&mut self, backend: Option<Box<dyn AudioBackend>>) {
        self.stop();
        self.backend = backend;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn last_frequency(&self) -> Option<f64> {
        self.last_frequency
    }

    pub fn start(&mut self) {
        if self.active {
            return;
        }
        let Some(backend) = self.backend.as_mut() else {
            tracing::debug!("no audio backend, playing silently");
            return;
        };

        match backend.start() {
            Ok(()) => {
                backend.set_gain(self.volume);
                self.active = true;
            }
            Err(err) => tracing::warn!(%err, "sonification unavailable, continuing without audio"),
        }
    }

    pub fn stop(&mut self) {
        if !self.active {
            return;
        }
        if let Some(backend) = self.backend.as_mut() {
            backend.stop();
        }
        self.active = false;
    }

    /// Retunes the oscillator for `value`. Returns the applied frequency.
    pub fn update(&mut self, value: Option<f64>, range: Option<ValueRange>) -> Option<f64> {
        if !self.active {
            return None;
        }
        let hz = self.mapping.frequency_for(value?, range?)?;
        let backend = self.backend.as_mut()?;
        backend.set_frequency(hz, self.time_constant);
        self.last_frequency = Some(hz);
        Some(hz)
    }

    pub fn set_volume(&mut self, volume: f64) {
        if !volume.is_finite() {
            return;
        }
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(backend) = self.backend.as_mut() {
            backend.set_gain(self.volume);
        }
    }
}

impl fmt::Debug for Sonifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sonifier")
            .field("has_backend", &self.backend.is_some())
            .field("mapping", &self.mapping)
            .field("active", &self.active)
            .field("last_frequency", &self.last_frequency)
            .finish()
    }
}
