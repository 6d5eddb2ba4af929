use std::{
    cell::RefCell,
    io::Write,
    path::{Path, PathBuf},
    rc::Rc,
    time::Instant,
};

use clap::{Parser, Subcommand};
use cognify_core::{metric_value, AppConfig, CognifyError, Dataset, PlaybackEngine, SineVoice};
use tracing_subscriber::EnvFilter;

mod render;

use render::{BarWaveform, ChartCursor, Pulse, SharedStatus};

const CHART_WIDTH: usize = 40;
const WAVEFORM_BARS: usize = 16;
const WAVEFORM_BLOCK: usize = 1024;

fn main() -> cognify_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { input } => run_inspect(&input),
        Commands::Play(args) => run_play(args),
    }
}

fn run_inspect(input: &Path) -> cognify_core::Result<()> {
    let dataset = Dataset::from_csv_path(input)?;
    tracing::info!(?input, rows = dataset.rows().len(), "loaded dataset");

    println!("metrics: {}", dataset.metrics().join(", "));
    for subject in dataset.subjects() {
        println!("{subject}: {} rows", dataset.row_count(&subject));
    }
    Ok(())
}

fn run_play(args: PlayArgs) -> cognify_core::Result<()> {
    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let dataset = Dataset::from_csv_path(&args.input)?;

    let subject = match args.subject {
        Some(subject) => subject,
        None => dataset
            .subjects()
            .into_iter()
            .next()
            .ok_or(CognifyError::InvalidInput("dataset has no subjects"))?,
    };
    let metric = match args.metric {
        Some(metric) => metric,
        None => first_numeric_metric(&dataset, &subject)
            .ok_or_else(|| {
                CognifyError::msg(format!("subject `{subject}` has no numeric metric"))
            })?,
    };

    let mut window = dataset.window(&subject, &metric)?;
    if args.rebase {
        window = window.rebased();
    }
    tracing::info!(%subject, %metric, points = window.len(), "starting playback");

    let status = SharedStatus::default();
    let voice = Rc::new(RefCell::new(SineVoice::new(config.sonification.sample_rate)));

    let mut engine = PlaybackEngine::new(&config);
    engine.register_renderer(Box::new(ChartCursor::new(status.clone(), CHART_WIDTH)));
    engine.register_renderer(Box::new(BarWaveform::new(
        status.clone(),
        voice.clone(),
        WAVEFORM_BLOCK,
        WAVEFORM_BARS,
    )));
    engine.register_renderer(Box::new(Pulse::new(status.clone())));
    if !args.mute {
        engine.set_audio_backend(Some(Box::new(voice)));
    }
    engine.load_window(window);

    if let Some(speed) = args.speed {
        engine.set_speed(speed);
    }
    if let Some(volume) = args.volume {
        engine.set_volume(volume);
    }
    if let Some(percent) = args.from {
        engine.timeline_click(percent, 100.0);
    }

    engine.play();
    let tick = config.playback.tick_period();
    let mut last = Instant::now();
    let mut stdout = std::io::stdout();

    while engine.is_playing() {
        std::thread::sleep(tick);
        let now = Instant::now();
        engine.advance(now - last);
        last = now;

        let view = engine.view();
        let line = status.borrow();
        write!(
            stdout,
            "\r{} / {} {} {} {}",
            view.current_label, view.total_label, line.chart, line.bars, line.pulse
        )?;
        stdout.flush()?;
    }
    writeln!(stdout)?;

    tracing::info!(time = engine.current_time(), "playback finished");
    engine.teardown();
    Ok(())
}

fn first_numeric_metric(dataset: &Dataset, subject: &str) -> Option<String> {
    dataset
        .metrics()
        .iter()
        .find(|metric| {
            dataset
                .rows()
                .iter()
                .filter(|row| row.subject == subject)
                .any(|row| metric_value(row, metric).is_some())
        })
        .cloned()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Listen to time-series data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the subjects and metrics of a CSV dataset.
    Inspect {
        /// Path to the CSV file.
        input: PathBuf,
    },
    /// Play one subject and metric of a CSV dataset in the terminal.
    Play(PlayArgs),
}

#[derive(clap::Args, Debug)]
struct PlayArgs {
    /// Path to the CSV file.
    input: PathBuf,
    /// Subject to play. Defaults to the first subject.
    #[arg(short, long)]
    subject: Option<String>,
    /// Metric to play. Defaults to the first numeric metric.
    #[arg(short, long)]
    metric: Option<String>,
    /// Playback speed multiplier.
    #[arg(long)]
    speed: Option<f64>,
    /// Oscillator volume between 0 and 1.
    #[arg(long)]
    volume: Option<f64>,
    /// Start position as a percentage of the series.
    #[arg(long)]
    from: Option<f64>,
    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Shift timestamps so the series starts at zero.
    #[arg(long)]
    rebase: bool,
    /// Play without sonification.
    #[arg(long)]
    mute: bool,
}
