use super::PlaybackEngine;
use crate::seek::{percent_of_track, time_at_percent, DragState};

impl PlaybackEngine {
    /// Grabs the timeline handle. Playback pauses for the duration of the
    /// drag and the play state is remembered for the release.
    pub fn timeline_pointer_down(&mut self) {
        if self.drag.is_dragging() {
            return;
        }

        self.session.was_playing_before_drag = self.session.is_playing;
        if self.session.is_playing {
            self.stop();
        }
        self.drag = DragState::Dragging { pending_time: None };
        tracing::debug!(
            resume = self.session.was_playing_before_drag,
            "timeline drag started"
        );
    }

    /// Moves the handle under the pointer. Only the display and the scrub
    /// path of the renderers follow; the session time is committed on release.
    pub fn timeline_pointer_move(&mut self, x: f64, track_width: f64) {
        if !self.drag.is_dragging() {
            return;
        }

        let percent = percent_of_track(x, track_width);
        let time = time_at_percent(percent, self.max_time());
        self.drag = DragState::Dragging {
            pending_time: Some(time),
        };
        self.view.show_percent(percent, time);

        let frame = self.frame_at(time);
        self.renderers.notify_scrub(&frame);
    }

    pub fn timeline_pointer_up(&mut self) {
        let DragState::Dragging { pending_time } = self.drag else {
            return;
        };
        self.drag = DragState::Idle;

        let target = pending_time.unwrap_or_else(|| self.current_time());
        self.seek(target);

        let resume = std::mem::take(&mut self.session.was_playing_before_drag);
        if resume && !self.session.is_playing {
            self.toggle();
        }
        tracing::debug!(time = self.current_time(), resume, "timeline drag finished");
    }

    /// Click on the track outside the handle: jump straight there without
    /// changing the play state.
    pub fn timeline_click(&mut self, x: f64, track_width: f64) {
        if self.drag.is_dragging() {
            return;
        }
        let percent = percent_of_track(x, track_width);
        self.seek(time_at_percent(percent, self.max_time()));
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc, time::Duration};

    use super::super::test_support::*;
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn drag_pauses_and_resumes_playback() {
        let mut engine = PlaybackEngine::default().with_window(ramp_window());
        engine.play();
        engine.advance(ms(100));

        engine.timeline_pointer_down();
        assert!(!engine.is_playing());
        assert_eq!(engine.live_timers(), 0);

        engine.timeline_pointer_move(300.0, 400.0);
        engine.advance(ms(200));
        assert!(!engine.is_playing());

        engine.timeline_pointer_up();
        assert!(engine.is_playing());
        assert_eq!(engine.current_time(), 750.0);

        engine.advance(ms(50));
        assert!((engine.current_time() - 752.5).abs() < 1e-9);
    }

    #[test]
    fn drag_from_pause_stays_paused() {
        let mut engine = PlaybackEngine::default().with_window(ramp_window());

        engine.timeline_pointer_down();
        engine.timeline_pointer_move(100.0, 400.0);
        engine.timeline_pointer_up();

        assert!(!engine.is_playing());
        assert_eq!(engine.current_time(), 250.0);
        assert_eq!(engine.live_timers(), 0);
    }

    #[test]
    fn moves_only_scrub_renderers_until_release() {
        let log = Rc::new(RefCell::new(FrameLog::default()));
        let mut engine = PlaybackEngine::default().with_window(ramp_window());
        engine.register_renderer(Box::new(LoggingRenderer(log.clone())));
        engine.set_current_time(100.0);

        engine.timeline_pointer_down();
        engine.timeline_pointer_move(40.0, 400.0);
        engine.timeline_pointer_move(80.0, 400.0);

        assert_eq!(log.borrow().scrubs, vec![100.0, 200.0]);
        assert_eq!(log.borrow().renders, vec![100.0]);
        assert_eq!(engine.current_time(), 100.0);
        assert_eq!(engine.view().handle_percent, 20.0);
        assert_eq!(engine.view().current_label, "3:20");

        engine.timeline_pointer_up();
        assert_eq!(log.borrow().renders, vec![100.0, 200.0]);
        assert_eq!(engine.current_time(), 200.0);
    }

    #[test]
    fn pointer_outside_track_clamps() {
        let mut engine = PlaybackEngine::default().with_window(ramp_window());

        engine.timeline_pointer_down();
        engine.timeline_pointer_move(-50.0, 400.0);
        engine.timeline_pointer_up();
        assert_eq!(engine.current_time(), 0.0);

        engine.timeline_pointer_down();
        engine.timeline_pointer_move(9_000.0, 400.0);
        engine.timeline_pointer_up();
        assert_eq!(engine.current_time(), 1000.0);
        assert_eq!(engine.view().handle_percent, 100.0);
    }

    #[test]
    fn release_without_move_keeps_time() {
        let mut engine = PlaybackEngine::default().with_window(ramp_window());
        engine.set_current_time(420.0);

        engine.timeline_pointer_down();
        engine.timeline_pointer_up();

        assert_eq!(engine.current_time(), 420.0);
    }

    #[test]
    fn stray_release_and_moves_are_ignored() {
        let mut engine = PlaybackEngine::default().with_window(ramp_window());
        engine.set_current_time(10.0);

        engine.timeline_pointer_move(200.0, 400.0);
        engine.timeline_pointer_up();

        assert_eq!(engine.current_time(), 10.0);
        assert_eq!(engine.drag_state(), DragState::Idle);
    }

    #[test]
    fn click_seeks_without_touching_play_state() {
        let mut engine = PlaybackEngine::default().with_window(ramp_window());
        engine.play();

        engine.timeline_click(100.0, 400.0);
        assert_eq!(engine.current_time(), 250.0);
        assert!(engine.is_playing());
        assert_eq!(engine.live_timers(), 1);

        engine.pause();
        engine.timeline_click(200.0, 400.0);
        assert_eq!(engine.current_time(), 500.0);
        assert!(!engine.is_playing());
    }

    #[test]
    fn play_mid_drag_waits_for_release() {
        let mut engine = PlaybackEngine::default().with_window(ramp_window());
        engine.timeline_pointer_down();

        engine.play();

        assert!(!engine.is_playing());
        assert_eq!(engine.live_timers(), 0);

        engine.timeline_pointer_move(30.0, 100.0);
        engine.timeline_pointer_up();
        assert!(engine.is_playing());
        assert_eq!(engine.current_time(), 300.0);
        assert_eq!(engine.live_timers(), 1);
    }
}
