use std::time::Duration;

use cognify_core::{
    AppConfig, DataPoint, Dataset, MetricValue, PlaybackEngine, SeriesWindow, SkipDirection,
};

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn series(timestamps: impl IntoIterator<Item = f64>) -> SeriesWindow {
    let points = timestamps
        .into_iter()
        .map(|t| {
            DataPoint::new(t, "p01")
                .with_value("heart_rate", MetricValue::Number(60.0 + t / 100.0))
        })
        .collect();
    SeriesWindow::new("heart_rate", points)
}

fn engine(max_time: f64) -> PlaybackEngine {
    PlaybackEngine::default().with_window(series([0.0, max_time]))
}

#[test]
fn set_current_time_always_lands_in_range() {
    let mut engine = engine(100.0);
    for target in [-1e9, -0.5, 0.0, 42.0, 100.0, 100.5, 1e12, f64::NAN, f64::NEG_INFINITY] {
        let stored = engine.set_current_time(target);
        assert!((0.0..=100.0).contains(&stored), "{target} stored as {stored}");
        assert_eq!(stored, engine.current_time());
    }
}

#[test]
fn stop_is_idempotent() {
    let mut engine = engine(100.0);
    engine.play();

    engine.stop();
    engine.stop();

    assert!(!engine.is_playing());
    assert_eq!(engine.live_timers(), 0);
}

#[test]
fn starting_twice_registers_one_tick() {
    let mut engine = engine(1000.0);
    engine.play();
    engine.play();

    engine.advance(ms(50));

    assert!((engine.current_time() - 2.5).abs() < 1e-9);
    assert_eq!(engine.live_timers(), 1);
}

#[test]
fn end_of_data_stops_without_overshooting() {
    let mut engine = engine(100.0);
    engine.set_speed(8.0);
    engine.set_current_time(99.0);
    engine.play();

    engine.advance(ms(50));

    assert!(!engine.is_playing());
    assert_eq!(engine.current_time(), 100.0);
    assert_eq!(engine.live_timers(), 0);
}

#[test]
fn drag_round_trip_restores_play_state() {
    let mut engine = engine(1000.0);
    engine.play();
    engine.timeline_pointer_down();
    engine.timeline_pointer_move(50.0, 100.0);
    engine.timeline_pointer_up();

    assert!(engine.is_playing());
    engine.advance(ms(50));
    assert!((engine.current_time() - 502.5).abs() < 1e-9);

    engine.pause();
    engine.timeline_pointer_down();
    engine.timeline_pointer_move(10.0, 100.0);
    engine.timeline_pointer_up();
    assert!(!engine.is_playing());
    assert_eq!(engine.current_time(), 100.0);
}

#[test]
fn percentage_skip() {
    let mut engine = engine(200.0);
    engine.set_current_time(50.0);
    assert_eq!(engine.skip_by_percentage(10.0), 70.0);

    engine.set_current_time(50.0);
    assert_eq!(engine.skip_by_percentage(-100.0), 0.0);
}

#[test]
fn empty_series_is_safe() {
    let mut engine = PlaybackEngine::default().with_window(SeriesWindow::empty());

    engine.toggle();
    engine.advance(ms(500));
    engine.skip_by_percentage(25.0);
    engine.set_current_time(500.0);
    engine.skip_pointer_down(SkipDirection::Forward);
    engine.advance(ms(1_000));
    engine.skip_pointer_up(SkipDirection::Forward);
    engine.timeline_click(30.0, 100.0);

    assert_eq!(engine.current_time(), 0.0);
    assert!(!engine.is_playing());
    assert_eq!(engine.view().handle_percent, 0.0);
    assert_eq!(engine.live_timers(), 0);
}

#[test]
fn doubling_speed_doubles_step() {
    let mut engine = engine(1000.0);
    let single = engine.step_size();
    engine.set_speed(2.0);

    assert!((engine.step_size() - 2.0 * single).abs() < 1e-12);
}

#[test]
fn twenty_ticks_cover_one_standardized_second() {
    let timestamps = (0..=100).map(|i| i as f64 * 10.0);
    let mut engine = PlaybackEngine::default().with_window(series(timestamps));
    assert_eq!(engine.max_time(), 1000.0);

    engine.play();
    for _ in 0..20 {
        engine.advance(ms(50));
    }

    assert!((engine.current_time() - 50.0).abs() < 1e-9);
}

#[test]
fn full_pass_takes_the_standardized_duration() {
    let mut engine = engine(3_600.0);
    engine.play();

    engine.advance(Duration::from_millis(19_950));
    assert!(engine.is_playing());

    engine.advance(ms(50));
    assert!(!engine.is_playing());
    assert_eq!(engine.current_time(), 3_600.0);
}

#[test]
fn custom_tick_period_keeps_standardized_duration() {
    let json = r#"{ "playback": { "tick_ms": 100, "standardized_seconds": 10 } }"#;
    let config = AppConfig::from_json_str(json).unwrap();
    let mut engine = PlaybackEngine::new(&config).with_window(series([0.0, 500.0]));
    engine.play();

    engine.advance(Duration::from_secs(1));

    assert!((engine.current_time() - 50.0).abs() < 1e-9);
}

#[test]
fn csv_to_playback() {
    let csv = "participant,time,heart_rate\np01,0,60\np01,5,70\np02,0,90\np01,10,80\np01,5,75\n";
    let dataset = Dataset::from_csv_reader(csv.as_bytes()).unwrap();
    let window = dataset.window("p01", "heart_rate").unwrap();
    assert_eq!(window.len(), 3);

    let mut engine = PlaybackEngine::default().with_window(window);
    engine.set_current_time(5.0);

    assert_eq!(engine.current_value(), Some(75.0));
    assert_eq!(engine.max_time(), 10.0);
}
