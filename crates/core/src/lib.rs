//! Core library for Cognify, a data sonification and visualisation tool.
//!
//! The heart of the crate is the [`PlaybackEngine`]: it owns the single
//! current-time cursor of the active series, advances it on a fixed tick and
//! fans every change out to the timeline display, the registered renderers
//! and, when asked, the oscillator of the audio subsystem. Everything around
//! it (dataset ingestion, value mapping, spectrum analysis, a software voice)
//! lives in its own module.

pub mod analysis;
pub mod audio;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod render;
pub mod seek;
pub mod session;
pub mod skip;
pub mod timeline;

pub use analysis::SpectrumAnalyser;
pub use audio::{AudioBackend, SineVoice, Sonifier};
pub use config::{AppConfig, PlaybackConfig, SkipConfig, SonificationConfig};
pub use dataset::{metric_value, DataPoint, Dataset, MetricValue, SeriesWindow};
pub use engine::{EngineTimer, PlaybackEngine};
pub use error::{CognifyError, Result};
pub use mapping::{FrequencyMapping, ValueRange};
pub use render::{RenderFrame, RenderGraph, Renderer};
pub use seek::{format_time, DragState, TimelineView};
pub use session::PlaybackSession;
pub use skip::{HoldPhase, SkipDirection};
pub use timeline::{PlaybackClock, Scheduler, TaskSlot, TimerId};
