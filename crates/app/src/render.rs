//! Terminal renderers. Each one owns a segment of the shared status line that
//! the playback loop prints after every step.

use std::{cell::RefCell, rc::Rc};

use cognify_core::{RenderFrame, Renderer, SineVoice, SpectrumAnalyser};

const BAR_GLYPHS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const PULSE_GLYPHS: [char; 5] = ['·', '∘', 'o', 'O', '◉'];

#[derive(Debug, Default)]
pub struct StatusLine {
    pub chart: String,
    pub bars: String,
    pub pulse: String,
}

pub type SharedStatus = Rc<RefCell<StatusLine>>;

/// Line-chart cursor: a marker sliding over a fixed-width track.
pub struct ChartCursor {
    status: SharedStatus,
    width: usize,
}

impl ChartCursor {
    pub fn new(status: SharedStatus, width: usize) -> Self {
        Self {
            status,
            width: width.max(2),
        }
    }

    fn draw(&self, frame: &RenderFrame) {
        let position = ((frame.percent / 100.0) * (self.width - 1) as f64).round() as usize;
        let track: String = (0..self.width)
            .map(|cell| if cell == position { '┃' } else { '─' })
            .collect();
        let value = frame
            .value
            .map(|value| format!("{value:>9.2}"))
            .unwrap_or_else(|| format!("{:>9}", "-"));
        self.status.borrow_mut().chart = format!("{track} {value}");
    }
}

impl Renderer for ChartCursor {
    fn name(&self) -> &str {
        "chart-cursor"
    }

    fn render(&mut self, frame: &RenderFrame) {
        self.draw(frame);
    }

    fn scrub(&mut self, frame: &RenderFrame) {
        self.draw(frame);
    }
}

/// Bar waveform fed by the spectrum of the oscillator output.
pub struct BarWaveform {
    status: SharedStatus,
    voice: Rc<RefCell<SineVoice>>,
    analyser: SpectrumAnalyser,
    block: Vec<f32>,
    bars: usize,
}

impl BarWaveform {
    pub fn new(
        status: SharedStatus,
        voice: Rc<RefCell<SineVoice>>,
        block_size: usize,
        bars: usize,
    ) -> Self {
        let sample_rate = voice.borrow().sample_rate();
        Self {
            status,
            voice,
            analyser: SpectrumAnalyser::new(sample_rate),
            block: vec![0.0; block_size.max(2)],
            bars,
        }
    }
}

impl Renderer for BarWaveform {
    fn name(&self) -> &str {
        "bar-waveform"
    }

    fn render(&mut self, _frame: &RenderFrame) {
        self.voice.borrow_mut().render(&mut self.block);
        if let Err(err) = self.analyser.analyse(&self.block) {
            tracing::warn!(%err, "skipping waveform frame");
            return;
        }

        let bars: String = self
            .analyser
            .bars(self.bars)
            .into_iter()
            .map(|level| {
                let slot = (level * (BAR_GLYPHS.len() - 1) as f32).round() as usize;
                BAR_GLYPHS[slot.min(BAR_GLYPHS.len() - 1)]
            })
            .collect();
        let dominant = self
            .analyser
            .dominant_frequency()
            .map(|hz| format!("{hz:>6.0} Hz"))
            .unwrap_or_else(|| format!("{:>9}", "silent"));
        self.status.borrow_mut().bars = format!("{bars} {dominant}");
    }
}

/// Circular pulse whose size follows the normalised value.
pub struct Pulse {
    status: SharedStatus,
}

impl Pulse {
    pub fn new(status: SharedStatus) -> Self {
        Self { status }
    }
}

impl Renderer for Pulse {
    fn name(&self) -> &str {
        "pulse"
    }

    fn render(&mut self, frame: &RenderFrame) {
        let glyph = match frame.normalized {
            Some(level) => {
                let slot = (level * (PULSE_GLYPHS.len() - 1) as f64).round() as usize;
                PULSE_GLYPHS[slot.min(PULSE_GLYPHS.len() - 1)]
            }
            None => ' ',
        };
        self.status.borrow_mut().pulse = glyph.to_string();
    }
}
