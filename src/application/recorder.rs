//! Runtime call-graph capture.
//!
//! `run_traced` designates one invocation as the root of a trace session,
//! clears the graph, runs the invocation with panics caught, and renders
//! the flow tree from the function that started the session.
//!
//! Edges come from stack snapshots. Every snapshot is filtered, trimmed at
//! the root frame, and each adjacent `(deeper, shallower)` pair becomes a
//! `shallower -> deeper` edge. When snapshots are taken is set by
//! [`SamplingMode`].

use crate::domain::callgraph::CallGraph;
use crate::domain::flowgraph::FlowTree;
use crate::domain::frame::FrameFilter;
use crate::error::TracedFailure;
use crate::ports::FrameSource;
use serde::Deserialize;
use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Once, PoisonError};

/// Identifier used when the session root cannot be resolved.
pub const UNKNOWN_ROOT: &str = "unknown";

/// When the recorder samples the stack during a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SamplingMode {
    /// One sample after the invocation returns. Only the call chain alive
    /// at that point is seen, so calls that already returned are missed.
    UnwindOnly,
    /// Sample at every observation point (flow-guard entry, explicit
    /// `observe`) as well as after the invocation returns.
    #[default]
    EntryAndUnwind,
}

/// Result of one traced invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceReport {
    pub root: String,
    /// Rendered flow tree, one `- <id>` line per node.
    pub tree: String,
    /// Set when the invocation panicked or could not be traced.
    pub failure: Option<TracedFailure>,
}

#[derive(Debug, Default)]
struct RecorderState {
    graph: CallGraph,
    root: Option<String>,
}

pub struct Recorder {
    frames: Arc<dyn FrameSource>,
    filter: FrameFilter,
    sampling: SamplingMode,
    max_depth: Option<usize>,
    active: AtomicBool,
    state: Mutex<RecorderState>,
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("sampling", &self.sampling)
            .field("max_depth", &self.max_depth)
            .field("active", &self.active.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

thread_local! {
    static QUIET_DEPTH: Cell<usize> = const { Cell::new(0) };
}

static QUIET_HOOK: Once = Once::new();

/// Mutes panic-hook output on the current thread while alive.
///
/// The first use wraps the installed hook once; the wrapper forwards to it
/// unless the panicking thread holds a `QuietPanics`. A hook installed
/// later by the host replaces the wrapper and un-mutes everything.
struct QuietPanics;

impl QuietPanics {
    fn enter() -> Self {
        QUIET_HOOK.call_once(|| {
            let previous = panic::take_hook();
            panic::set_hook(Box::new(move |info| {
                if !panic_output_muted() {
                    previous(info);
                }
            }));
        });
        QUIET_DEPTH.with(|depth| depth.set(depth.get() + 1));
        QuietPanics
    }
}

impl Drop for QuietPanics {
    fn drop(&mut self) {
        let _ = QUIET_DEPTH.try_with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Whether panic-hook output is muted on the current thread, which is the
/// case while an invocation runs under [`Recorder::run_traced`].
pub fn panic_output_muted() -> bool {
    QUIET_DEPTH
        .try_with(Cell::get)
        .is_ok_and(|depth| depth > 0)
}

/// Run `invocation`, catching a panic without printing it.
fn run_quietly<F: FnOnce()>(invocation: F) -> Result<(), String> {
    let _quiet = QuietPanics::enter();
    panic::catch_unwind(AssertUnwindSafe(invocation))
        .map_err(|payload| panic_message(payload.as_ref()))
}

/// Clears the session flag however the session ends.
struct ActiveSession<'a>(&'a AtomicBool);

impl Drop for ActiveSession<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Recorder {
    pub fn new(
        frames: Arc<dyn FrameSource>,
        filter: FrameFilter,
        sampling: SamplingMode,
        max_depth: Option<usize>,
    ) -> Self {
        Self {
            frames,
            filter,
            sampling,
            max_depth,
            active: AtomicBool::new(false),
            state: Mutex::new(RecorderState::default()),
        }
    }

    pub fn sampling(&self) -> SamplingMode {
        self.sampling
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Run `invocation` as a traced session and return the flow tree.
    ///
    /// A panic inside `invocation` is swallowed and the panic hook stays
    /// silent for it on this thread; use [`Recorder::run_traced_report`] to
    /// see it. Panics on other threads are reported as usual.
    #[inline(never)]
    pub fn run_traced<F: FnOnce()>(&self, invocation: F) -> String {
        self.run_traced_report(invocation).tree
    }

    /// Like [`Recorder::run_traced`], also returning the suppressed failure.
    #[inline(never)]
    pub fn run_traced_report<F: FnOnce()>(&self, invocation: F) -> TraceReport {
        let root = self.resolve_root();

        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!(root = %root, "trace session already active; running untraced");
            let panicked = run_quietly(invocation).err();
            if let Some(message) = &panicked {
                tracing::warn!(root = %root, %message, "untraced invocation panicked; failure suppressed");
            }
            let tree = FlowTree::from_callgraph(&CallGraph::default(), &root, self.max_depth).to_text();
            return TraceReport {
                root,
                tree,
                failure: Some(TracedFailure::SessionBusy { panicked }),
            };
        }
        let _session = ActiveSession(&self.active);

        {
            let mut state = self.lock();
            state.graph.clear();
            state.root = Some(root.clone());
        }
        tracing::debug!(root = %root, sampling = ?self.sampling, "trace session started");

        let outcome = run_quietly(invocation);
        self.sample();

        let failure = outcome
            .err()
            .map(|message| TracedFailure::Panicked { message });
        if let Some(failure) = &failure {
            tracing::warn!(root = %root, %failure, "traced invocation failed; failure suppressed");
        }

        let tree = self.render(&root);
        tracing::debug!(root = %root, lines = tree.lines().count(), "trace session finished");
        TraceReport {
            root,
            tree,
            failure,
        }
    }

    /// Sample the stack if a session is active and sampling at observation
    /// points is on.
    pub fn observe(&self) {
        if self.sampling == SamplingMode::EntryAndUnwind && self.is_active() {
            self.sample();
        }
    }

    /// Render the current graph from `root`.
    pub fn render(&self, root: &str) -> String {
        self.flow_tree(root).to_text()
    }

    pub fn flow_tree(&self, root: &str) -> FlowTree {
        let state = self.lock();
        FlowTree::from_callgraph(&state.graph, root, self.max_depth)
    }

    pub fn graph_snapshot(&self) -> CallGraph {
        self.lock().graph.clone()
    }

    /// Root of the most recent session.
    pub fn root(&self) -> Option<String> {
        self.lock().root.clone()
    }

    fn resolve_root(&self) -> String {
        self.filter
            .apply(self.frames.capture(), None)
            .and_then(|frames| frames.into_iter().next())
            .map(|frame| frame.function)
            .unwrap_or_else(|| UNKNOWN_ROOT.to_string())
    }

    fn sample(&self) {
        let frames = self.frames.capture();
        let mut state = self.lock();
        let Some(snapshot) = self.filter.apply(frames, state.root.as_deref()) else {
            tracing::trace!(root = ?state.root, "snapshot does not reach the session root; skipped");
            return;
        };
        state.graph.record_snapshot(&snapshot);
    }

    fn lock(&self) -> MutexGuard<'_, RecorderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
