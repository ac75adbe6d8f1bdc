// Infrastructure implementations for Callflow.

pub mod frames;
pub mod output;
pub mod palette;

pub use frames::{BacktraceFrameSource, ManualFrameGuard, ManualFrameSource};
pub use output::{FixedClock, MemorySink, StdoutSink, SystemClock};
pub use palette::{ColorMode, Palette, Segment};
