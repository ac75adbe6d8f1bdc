// Frame sources: the real stack via `backtrace`, and a manually driven
// shadow stack for programs built without symbols and for tests.

use crate::domain::frame::Frame;
use crate::ports::FrameSource;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Walks and symbolizes the calling thread's stack.
///
/// Identifiers are demangled paths without the trailing hash. Inlined
/// frames are reported as separate activations. Accuracy depends on debug
/// info being present; optimized builds may fold small functions away.
#[derive(Debug, Default, Clone, Copy)]
pub struct BacktraceFrameSource;

impl FrameSource for BacktraceFrameSource {
    #[inline(never)]
    fn capture(&self) -> Vec<Frame> {
        let mut frames = Vec::new();
        backtrace::trace(|raw| {
            backtrace::resolve_frame(raw, |symbol| {
                let Some(name) = symbol.name() else {
                    return;
                };
                frames.push(Frame {
                    function: format!("{name:#}"),
                    file: symbol.filename().map(|p| p.display().to_string()),
                    line: symbol.lineno(),
                });
            });
            true
        });
        tracing::trace!(depth = frames.len(), "captured stack");
        frames
    }
}

/// A shared, explicitly maintained call stack.
///
/// Instrumented code calls [`ManualFrameSource::enter`] on function entry and
/// keeps the guard alive for the duration of the call. Clones share the same
/// stack.
#[derive(Debug, Default, Clone)]
pub struct ManualFrameSource {
    stack: Arc<Mutex<Vec<Frame>>>,
}

impl ManualFrameSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `function`; it is popped when the returned guard drops.
    #[must_use = "the frame is popped as soon as the guard is dropped"]
    pub fn enter(&self, function: impl Into<String>) -> ManualFrameGuard {
        let mut stack = self.lock();
        let depth = stack.len();
        stack.push(Frame::new(function));
        ManualFrameGuard {
            stack: Arc::clone(&self.stack),
            depth,
        }
    }

    pub fn depth(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Frame>> {
        self.stack.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FrameSource for ManualFrameSource {
    fn capture(&self) -> Vec<Frame> {
        self.lock().iter().rev().cloned().collect()
    }
}

/// Pops a [`ManualFrameSource`] frame on drop, including during unwinding.
#[derive(Debug)]
pub struct ManualFrameGuard {
    stack: Arc<Mutex<Vec<Frame>>>,
    depth: usize,
}

impl Drop for ManualFrameGuard {
    fn drop(&mut self) {
        self.stack
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .truncate(self.depth);
    }
}
