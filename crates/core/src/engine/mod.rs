//! The playback engine: owner of the session, the timer queue and every
//! consumer of the current time.
//!
//! All time changes funnel through [`PlaybackEngine::set_current_time`],
//! which clamps the time, refreshes the timeline display and notifies every
//! registered renderer once. Audio is retuned separately by the callers that
//! want it, so scrubbing can move visuals without chirping on every frame.

use std::time::Duration;

use crate::{
    audio::{AudioBackend, Sonifier},
    config::{AppConfig, SkipConfig},
    dataset::{metric_value, SeriesWindow},
    mapping::ValueRange,
    render::{RenderFrame, RenderGraph, Renderer},
    seek::{percent_of_time, DragState, TimelineView},
    session::PlaybackSession,
    skip::{HoldPhase, SkipController, SkipDirection, SkipRamp},
    timeline::{PlaybackClock, Scheduler, TimerId},
};

mod scrub;
mod skip;

/// Every timer the engine registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineTimer {
    PlaybackTick,
    HoldArm(SkipDirection),
    HoldRepeat(SkipDirection),
}

#[derive(Debug)]
pub struct PlaybackEngine {
    clock: PlaybackClock,
    ramp: SkipRamp,
    skip_config: SkipConfig,
    scheduler: Scheduler<EngineTimer>,
    session: PlaybackSession,
    window: SeriesWindow,
    value_range: Option<ValueRange>,
    drag: DragState,
    skip: SkipController,
    view: TimelineView,
    renderers: RenderGraph,
    sonifier: Sonifier,
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

impl PlaybackEngine {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            clock: PlaybackClock::from_config(&config.playback),
            ramp: SkipRamp::from_config(&config.skip),
            skip_config: config.skip.clone(),
            scheduler: Scheduler::new(),
            session: PlaybackSession::with_speed(config.playback.default_speed),
            window: SeriesWindow::empty(),
            value_range: None,
            drag: DragState::Idle,
            skip: SkipController::default(),
            view: TimelineView::default(),
            renderers: RenderGraph::new(),
            sonifier: Sonifier::new(&config.sonification),
        }
    }

    pub fn with_window(mut self, window: SeriesWindow) -> Self {
        self.load_window(window);
        self
    }

    pub fn set_audio_backend(&mut self, backend: Option<Box<dyn AudioBackend>>) {
        self.sonifier.set_backend(backend);
        if self.session.is_playing {
            self.sonifier.start();
            self.update_sonification();
        }
    }

    pub fn register_renderer(&mut self, renderer: Box<dyn Renderer>) {
        self.renderers.register(renderer);
    }

    /// Replaces the active series. Cancels every timer and rewinds to zero,
    /// paused.
    pub fn load_window(&mut self, window: SeriesWindow) {
        self.teardown();
        self.session.reset();
        self.value_range = window.value_range();
        self.window = window;
        self.view = TimelineView::default();
        tracing::info!(
            metric = self.window.metric(),
            points = self.window.len(),
            max_time = self.window.max_time(),
            "loaded series"
        );
        self.set_current_time(0.0);
    }

    /// Cancels every live timer and ends all gestures. Leaves the current
    /// time where it is.
    pub fn teardown(&mut self) {
        self.stop();
        for direction in [SkipDirection::Back, SkipDirection::Forward] {
            let gesture = self.skip.gesture_mut(direction);
            gesture.arm.cancel(&mut self.scheduler);
            gesture.repeat.cancel(&mut self.scheduler);
            gesture.release();
        }
        self.drag = DragState::Idle;
        self.session.was_playing_before_drag = false;
        self.scheduler.clear();
    }

    pub fn max_time(&self) -> f64 {
        self.window.max_time()
    }

    pub fn current_time(&self) -> f64 {
        self.session.current_time()
    }

    pub fn is_playing(&self) -> bool {
        self.session.is_playing
    }

    pub fn playback_speed(&self) -> f64 {
        self.session.playback_speed()
    }

    pub fn view(&self) -> &TimelineView {
        &self.view
    }

    pub fn sonifier(&self) -> &Sonifier {
        &self.sonifier
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn hold_phase(&self, direction: SkipDirection) -> HoldPhase {
        self.skip.gesture(direction).phase
    }

    pub fn skip_speed(&self, direction: SkipDirection) -> f64 {
        self.skip.gesture(direction).skip_speed
    }

    /// Timers currently registered with the scheduler.
    pub fn live_timers(&self) -> usize {
        self.scheduler.live_count()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.window.index_at(self.current_time())
    }

    /// Value of the active metric at the point nearest the current time.
    pub fn current_value(&self) -> Option<f64> {
        self.window.value_at(self.current_time())
    }

    pub fn frame(&self) -> RenderFrame {
        self.frame_at(self.current_time())
    }

    fn frame_at(&self, time: f64) -> RenderFrame {
        let max_time = self.max_time();
        let index = self.window.index_at(time);
        let value = index
            .and_then(|index| self.window.point_at(index))
            .and_then(|point| metric_value(point, self.window.metric()));

        RenderFrame {
            time,
            max_time,
            percent: percent_of_time(time, max_time),
            index,
            value,
            normalized: value
                .zip(self.value_range)
                .and_then(|(value, range)| range.normalize(value)),
            nominal_step: self.window.nominal_step(),
        }
    }

    /// Moves the cursor and fans the new time out to the timeline display and
    /// every renderer. Does not touch audio.
    pub fn set_current_time(&mut self, time: f64) -> f64 {
        let time = self.move_cursor(time);
        self.render_current();
        time
    }

    /// [`Self::set_current_time`] with the oscillator retuned before the
    /// renderers run, so anything sampling the voice sees the new pitch.
    pub fn seek(&mut self, time: f64) -> f64 {
        let time = self.move_cursor(time);
        self.update_sonification();
        self.render_current();
        time
    }

    fn move_cursor(&mut self, time: f64) -> f64 {
        let max_time = self.max_time();
        let time = self.session.set_time(time, max_time);
        self.view.show_time(time, max_time);
        time
    }

    fn render_current(&mut self) {
        let frame = self.frame();
        self.renderers.notify(&frame);
    }

    /// Retunes the oscillator to the current value. Returns the applied
    /// frequency, or `None` when nothing was sent to the audio backend.
    pub fn update_sonification(&mut self) -> Option<f64> {
        let value = self.current_value();
        self.sonifier.update(value, self.value_range)
    }

    pub fn set_speed(&mut self, speed: f64) {
        if self.session.set_speed(speed) {
            tracing::debug!(speed = self.session.playback_speed(), "playback speed changed");
        }
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.sonifier.set_volume(volume);
    }

    /// Data-time advanced by the next tick at the current speed.
    pub fn step_size(&self) -> f64 {
        self.clock.step(self.max_time(), self.session.playback_speed())
    }

    /// Starts playback when paused, pauses it when playing.
    pub fn toggle(&mut self) {
        if self.session.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Starts playback. Does nothing while already playing, so the single
    /// playback tick is never registered twice.
    pub fn play(&mut self) {
        if self.session.is_playing {
            return;
        }
        if self.drag.is_dragging() {
            // Deferred to the end of the scrub.
            self.session.was_playing_before_drag = true;
            tracing::debug!("play requested during a scrub, resuming on release");
            return;
        }

        if self.current_time() >= self.max_time() {
            self.set_current_time(0.0);
        }
        if self.max_time() <= 0.0 {
            tracing::debug!("nothing to play, series is empty");
            self.stop();
            return;
        }

        self.session.is_playing = true;
        self.view.playing = true;
        self.sonifier.start();
        self.update_sonification();
        let period = self.clock.tick_period();
        self.session
            .tick
            .start_repeating(&mut self.scheduler, EngineTimer::PlaybackTick, period);
        tracing::debug!(time = self.current_time(), "playback started");
    }

    pub fn pause(&mut self) {
        if self.session.is_playing {
            self.stop();
            tracing::debug!(time = self.current_time(), "playback paused");
        }
    }

    /// Cancels the tick and silences audio. Safe to call when stopped.
    pub fn stop(&mut self) {
        self.session.tick.cancel(&mut self.scheduler);
        self.session.is_playing = false;
        self.view.playing = false;
        self.sonifier.stop();
    }

    /// Feeds `elapsed` wall-clock time to the timer queue and runs every
    /// callback that falls due, in order.
    pub fn advance(&mut self, elapsed: Duration) {
        let until = self.scheduler.now() + elapsed;
        while let Some((id, timer)) = self.scheduler.pop_due(until) {
            self.dispatch(id, timer);
        }
        self.scheduler.advance_to(until);
    }

    fn dispatch(&mut self, id: TimerId, timer: EngineTimer) {
        let owned = match timer {
            EngineTimer::PlaybackTick => self.session.tick.holds(id),
            EngineTimer::HoldArm(direction) => self.skip.gesture(direction).arm.holds(id),
            EngineTimer::HoldRepeat(direction) => self.skip.gesture(direction).repeat.holds(id),
        };
        if !owned {
            // Registrations are only made through slots, so an orphan here is
            // a bug at the call site that registered it.
            tracing::error!(?timer, "dropping timer without an owner");
            self.scheduler.cancel(id);
            return;
        }

        match timer {
            EngineTimer::PlaybackTick => self.on_playback_tick(),
            EngineTimer::HoldArm(direction) => self.on_hold_armed(direction),
            EngineTimer::HoldRepeat(direction) => self.on_hold_repeat(direction),
        }
    }

    fn on_playback_tick(&mut self) {
        if !self.session.is_playing {
            self.session.tick.cancel(&mut self.scheduler);
            return;
        }

        let max_time = self.max_time();
        let next = self.current_time() + self.step_size();
        if next >= max_time {
            self.set_current_time(max_time);
            self.stop();
            tracing::debug!(max_time, "reached end of series");
            return;
        }

        self.seek(next);
    }
}
