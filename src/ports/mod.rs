use crate::domain::frame::Frame;

pub mod flowchart_exporter;

/// Produces the current call chain, innermost frame first.
pub trait FrameSource: Send + Sync {
    fn capture(&self) -> Vec<Frame>;
}

/// Line-oriented output for emitted log lines.
pub trait LogSink: Send + Sync {
    fn write_line(&self, line: &str);

    /// Whether decoration escapes will be rendered by a terminal.
    fn is_terminal(&self) -> bool {
        false
    }
}

/// Wall-clock source, formatted as `HH:MM:SS` (24h, local time).
pub trait Clock: Send + Sync {
    fn now_hms(&self) -> String;
}
