//! Decorated line emission.
//!
//! One line per call: `Time: HH:MM:SS File: <base> Line:<n> <TAG>: <message>`,
//! each segment painted by role.

use crate::domain::level::LogCategory;
use crate::infrastructure::{Palette, Segment};
use crate::ports::{Clock, LogSink};
use std::fmt::{self, Write as _};
use std::panic::Location;
use std::path::Path;
use std::sync::Arc;

/// Where a log call was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSite {
    /// Base name of the source file
    pub file: String,
    pub line: u32,
}

impl SourceSite {
    /// The site of the nearest caller not marked `#[track_caller]`.
    #[track_caller]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }

    pub fn from_location(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }

    pub fn new(file: &str, line: u32) -> Self {
        let base = Path::new(file)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(file);
        Self {
            file: base.to_string(),
            line,
        }
    }
}

pub struct Emitter {
    sink: Arc<dyn LogSink>,
    clock: Arc<dyn Clock>,
    palette: Palette,
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("palette", &self.palette)
            .finish_non_exhaustive()
    }
}

impl Emitter {
    pub fn new(sink: Arc<dyn LogSink>, clock: Arc<dyn Clock>, palette: Palette) -> Self {
        Self {
            sink,
            clock,
            palette,
        }
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    /// Format and write one line. Never fails: a `Display` impl that errors
    /// leaves an inline marker in the message.
    pub fn emit(&self, category: LogCategory, site: &SourceSite, message: fmt::Arguments<'_>) {
        let line = self.format_line(category, site, message);
        self.sink.write_line(&line);
    }

    pub fn format_line(
        &self,
        category: LogCategory,
        site: &SourceSite,
        message: fmt::Arguments<'_>,
    ) -> String {
        let mut body = String::new();
        if body.write_fmt(message).is_err() {
            body.push_str("<formatting error>");
        }

        let segments = [
            self.palette
                .paint(Segment::Time, &format!("Time: {}", self.clock.now_hms())),
            self.palette
                .paint(Segment::File, &format!("File: {}", site.file)),
            self.palette
                .paint(Segment::Line, &format!("Line:{}", site.line)),
            self.palette.paint(
                Segment::Category(category),
                &format!("{}: {}", category.tag(), body),
            ),
        ];
        segments.join(" ")
    }
}
