//! Terminal decoration for emitted lines.

use crate::domain::level::LogCategory;
use anstyle::{AnsiColor, Color, Reset, Style};
use serde::Deserialize;

/// When to emit ANSI escapes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Decorate only when the sink is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn resolve(self, is_terminal: bool) -> bool {
        match self {
            ColorMode::Auto => is_terminal,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Role of one segment of an emitted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Time,
    File,
    Line,
    Category(LogCategory),
}

/// Styles keyed by segment role.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

const fn ansi(color: AnsiColor) -> Option<Color> {
    Some(Color::Ansi(color))
}

const TIME_STYLE: Style = Style::new()
    .fg_color(ansi(AnsiColor::Magenta))
    .bg_color(ansi(AnsiColor::BrightBlue))
    .bold();
const FILE_STYLE: Style = Style::new()
    .fg_color(ansi(AnsiColor::BrightWhite))
    .bg_color(ansi(AnsiColor::BrightRed));
const LINE_STYLE: Style = Style::new()
    .fg_color(ansi(AnsiColor::BrightCyan))
    .bg_color(ansi(AnsiColor::BrightYellow))
    .bold();

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn style(&self, segment: Segment) -> Style {
        match segment {
            Segment::Time => TIME_STYLE,
            Segment::File => FILE_STYLE,
            Segment::Line => LINE_STYLE,
            Segment::Category(category) => Self::category_style(category),
        }
    }

    fn category_style(category: LogCategory) -> Style {
        match category {
            LogCategory::Info => AnsiColor::Blue.on_default().bold(),
            LogCategory::Error => AnsiColor::Red.on_default().bold(),
            LogCategory::Warn => AnsiColor::Yellow.on_default().bold(),
            LogCategory::Res => AnsiColor::Green.on_default().bold(),
            LogCategory::FlowChecker => AnsiColor::Green.on(AnsiColor::BrightWhite).bold(),
            LogCategory::All => Style::new(),
        }
    }

    /// Wrap `text` in the segment's style, or return it untouched when
    /// decoration is off.
    pub fn paint(&self, segment: Segment, text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }
        let style = self.style(segment);
        format!("{}{}{}", style.render(), text, Reset.render())
    }
}
