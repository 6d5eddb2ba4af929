//! Seek bar: mapping between the current time and a 0–100 % track position,
//! the drag gesture state, and the text shown next to the bar.

use serde::Serialize;

/// Drag gesture on the timeline handle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        /// Time under the pointer, committed on release.
        pending_time: Option<f64>,
    },
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }
}

/// Pointer x-offset on a track of `track_width`, as a percentage in [0, 100].
pub fn percent_of_track(x: f64, track_width: f64) -> f64 {
    if !x.is_finite() || !track_width.is_finite() || track_width <= 0.0 {
        return 0.0;
    }
    (x / track_width).clamp(0.0, 1.0) * 100.0
}

/// Handle position for `time`, in [0, 100]. Zero for an empty series.
pub fn percent_of_time(time: f64, max_time: f64) -> f64 {
    if !max_time.is_finite() || max_time <= 0.0 || !time.is_finite() {
        return 0.0;
    }
    (time / max_time * 100.0).clamp(0.0, 100.0)
}

pub fn time_at_percent(percent: f64, max_time: f64) -> f64 {
    if !percent.is_finite() || !max_time.is_finite() || max_time <= 0.0 {
        return 0.0;
    }
    percent.clamp(0.0, 100.0) / 100.0 * max_time
}

/// Formats seconds as `m:ss`, or `h:mm:ss` past the hour.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() {
        seconds.max(0.0).floor() as u64
    } else {
        0
    };
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

/// Everything the playback controls display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineView {
    pub playing: bool,
    pub current_label: String,
    pub total_label: String,
    pub progress_percent: f64,
    pub handle_percent: f64,
}

impl Default for TimelineView {
    fn default() -> Self {
        Self {
            playing: false,
            current_label: format_time(0.0),
            total_label: format_time(0.0),
            progress_percent: 0.0,
            handle_percent: 0.0,
        }
    }
}

impl TimelineView {
    /// Moves handle, progress bar and time label to `time`.
    pub fn show_time(&mut self, time: f64, max_time: f64) {
        let percent = percent_of_time(time, max_time);
        self.show_percent(percent, time);
        self.total_label = format_time(max_time);
    }

    /// Moves handle and progress bar to `percent` while labelling `time`.
    pub fn show_percent(&mut self, percent: f64, time: f64) {
        self.handle_percent = percent;
        self.progress_percent = percent;
        self.current_label = format_time(time);
    }
}
