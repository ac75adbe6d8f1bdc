//! The `Diagnostics` context: level gate, emitter, flow tracer and call-graph
//! recorder behind one value.

pub mod emitter;
pub mod recorder;
pub mod tracer;

use crate::config::CallflowConfig;
use crate::domain::frame::FrameFilter;
use crate::domain::level::{LevelGate, LogCategory};
use crate::infrastructure::{BacktraceFrameSource, ColorMode, Palette, StdoutSink, SystemClock};
use crate::ports::{Clock, FrameSource, LogSink};
use emitter::{Emitter, SourceSite};
use recorder::{Recorder, SamplingMode, TraceReport};
use std::fmt;
use std::sync::Arc;
use tracer::FlowGuard;

/// Everything a log or trace call needs. Independent instances share no
/// state, so tests and concurrent sessions can each own one.
#[derive(Debug)]
pub struct Diagnostics {
    gate: LevelGate,
    emitter: Emitter,
    recorder: Recorder,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    /// Stdout, local clock, real stack walking, all categories enabled.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> DiagnosticsBuilder {
        DiagnosticsBuilder::default()
    }

    pub fn from_config(config: &CallflowConfig) -> Self {
        Self::builder().config(config).build()
    }

    pub fn gate(&self) -> &LevelGate {
        &self.gate
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    /// See [`LevelGate::configure`].
    pub fn configure<I, S>(&self, categories: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.gate.configure(categories);
    }

    pub fn is_enabled(&self, category: LogCategory) -> bool {
        self.gate.is_enabled(category)
    }

    /// Emit one line under `category` if it is enabled, attributed to the
    /// caller's file and line.
    #[track_caller]
    pub fn log(&self, category: LogCategory, message: fmt::Arguments<'_>) {
        if self.gate.is_enabled(category) {
            self.emitter.emit(category, &SourceSite::caller(), message);
        }
    }

    #[track_caller]
    pub fn info(&self, message: fmt::Arguments<'_>) {
        self.log(LogCategory::Info, message);
    }

    #[track_caller]
    pub fn error(&self, message: fmt::Arguments<'_>) {
        self.log(LogCategory::Error, message);
    }

    #[track_caller]
    pub fn warn(&self, message: fmt::Arguments<'_>) {
        self.log(LogCategory::Warn, message);
    }

    #[track_caller]
    pub fn res(&self, message: fmt::Arguments<'_>) {
        self.log(LogCategory::Res, message);
    }

    /// Log entry into `function` and return a guard that logs its exit.
    ///
    /// This is also an observation point for an active trace session.
    #[track_caller]
    pub fn trace(&self, function: &str, params: &[&dyn fmt::Debug]) -> FlowGuard<'_> {
        self.recorder.observe();
        if !self.gate.is_enabled(LogCategory::FlowChecker) {
            return FlowGuard::inert();
        }
        FlowGuard::enter(&self.emitter, function, SourceSite::caller(), params)
    }

    /// Mark an observation point without logging.
    pub fn observe(&self) {
        self.recorder.observe();
    }

    /// Trace `invocation` and return the rendered flow tree rooted at the
    /// caller. Panics inside `invocation` are swallowed.
    #[inline(never)]
    pub fn run_traced<F: FnOnce()>(&self, invocation: F) -> String {
        self.recorder.run_traced(invocation)
    }

    /// Like [`Diagnostics::run_traced`], also returning the swallowed failure.
    #[inline(never)]
    pub fn run_traced_report<F: FnOnce()>(&self, invocation: F) -> TraceReport {
        self.recorder.run_traced_report(invocation)
    }
}

pub struct DiagnosticsBuilder {
    sink: Arc<dyn LogSink>,
    clock: Arc<dyn Clock>,
    frames: Arc<dyn FrameSource>,
    filter: FrameFilter,
    color: ColorMode,
    sampling: SamplingMode,
    max_depth: Option<usize>,
    levels: Vec<String>,
}

impl Default for DiagnosticsBuilder {
    fn default() -> Self {
        Self {
            sink: Arc::new(StdoutSink),
            clock: Arc::new(SystemClock),
            frames: Arc::new(BacktraceFrameSource),
            filter: FrameFilter::default(),
            color: ColorMode::Auto,
            sampling: SamplingMode::default(),
            max_depth: None,
            levels: Vec::new(),
        }
    }
}

impl DiagnosticsBuilder {
    pub fn sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn frames(mut self, frames: Arc<dyn FrameSource>) -> Self {
        self.frames = frames;
        self
    }

    pub fn filter(mut self, filter: FrameFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn color(mut self, color: ColorMode) -> Self {
        self.color = color;
        self
    }

    pub fn sampling(mut self, sampling: SamplingMode) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn levels<I, S>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.levels = levels.into_iter().map(Into::into).collect();
        self
    }

    pub fn config(self, config: &CallflowConfig) -> Self {
        self.levels(config.levels.iter().cloned())
            .color(config.color)
            .sampling(config.sampling)
            .max_depth(config.max_depth)
    }

    pub fn build(self) -> Diagnostics {
        let palette = Palette::new(self.color.resolve(self.sink.is_terminal()));
        let gate = LevelGate::new();
        gate.configure(&self.levels);
        Diagnostics {
            gate,
            emitter: Emitter::new(self.sink, self.clock, palette),
            recorder: Recorder::new(self.frames, self.filter, self.sampling, self.max_depth),
        }
    }
}
