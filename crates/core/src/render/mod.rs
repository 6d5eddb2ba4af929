use std::fmt;

/// Immutable snapshot handed to every renderer after the current time moved.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub time: f64,
    pub max_time: f64,
    /// Position of `time` inside the series, in [0, 100].
    pub percent: f64,
    /// Index of the data point nearest to `time`.
    pub index: Option<usize>,
    pub value: Option<f64>,
    /// Value normalised against the metric range, in [0, 1].
    pub normalized: Option<f64>,
    pub nominal_step: f64,
}

/// A visual consumer of the playback cursor (chart cursor, bar waveform,
/// circular pulse, ...).
pub trait Renderer {
    fn name(&self) -> &str;

    /// Full redraw after the current time changed.
    fn render(&mut self, frame: &RenderFrame);

    /// Lightweight update while a scrub gesture is in progress.
    fn scrub(&mut self, _frame: &RenderFrame) {}
}

/// Registration list of renderers, notified in registration order.
#[derive(Default)]
pub struct RenderGraph {
    renderers: Vec<Box<dyn Renderer>>,
}

impl RenderGraph {
    pub fn new() -> Self {
        Self {
            renderers: Vec::new(),
        }
    }

    pub fn register(&mut self, renderer: Box<dyn Renderer>) {
        tracing::debug!(renderer = renderer.name(), "registered renderer");
        self.renderers.push(renderer);
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.renderers.iter().map(|renderer| renderer.name()).collect()
    }

    pub fn notify(&mut self, frame: &RenderFrame) {
        for renderer in &mut self.renderers {
            renderer.render(frame);
        }
    }

    pub fn notify_scrub(&mut self, frame: &RenderFrame) {
        for renderer in &mut self.renderers {
            renderer.scrub(frame);
        }
    }
}

impl fmt::Debug for RenderGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderGraph")
            .field("renderers", &self.names())
            .finish()
    }
}
