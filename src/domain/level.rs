//! Log categories and the enable/disable gate.
//!
//! The gate starts in all-enabled mode. `configure` switches it to an
//! explicit set of categories; an `ALL` token collapses it back.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// A class of diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    Info,
    Error,
    Warn,
    Res,
    FlowChecker,
    /// Meta-category: no filtering.
    All,
}

impl LogCategory {
    /// The five concrete categories, in bit order.
    pub const ALL_CATEGORIES: [LogCategory; 5] = [
        LogCategory::Info,
        LogCategory::Error,
        LogCategory::Warn,
        LogCategory::Res,
        LogCategory::FlowChecker,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            LogCategory::Info => "INFO",
            LogCategory::Error => "ERROR",
            LogCategory::Warn => "WARN",
            LogCategory::Res => "RES",
            LogCategory::FlowChecker => "FLOW_CHECKER",
            LogCategory::All => "ALL",
        }
    }

    fn bit(self) -> u8 {
        match self {
            LogCategory::Info => 1 << 0,
            LogCategory::Error => 1 << 1,
            LogCategory::Warn => 1 << 2,
            LogCategory::Res => 1 << 3,
            LogCategory::FlowChecker => 1 << 4,
            LogCategory::All => 0,
        }
    }
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Returned when a token names no known category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown log category `{}`", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for LogCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INFO" => Ok(LogCategory::Info),
            "ERROR" => Ok(LogCategory::Error),
            "WARN" => Ok(LogCategory::Warn),
            "RES" => Ok(LogCategory::Res),
            "FLOW_CHECKER" => Ok(LogCategory::FlowChecker),
            "ALL" => Ok(LogCategory::All),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

/// Point-in-time view of the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelState {
    pub all_enabled: bool,
    pub enabled: Vec<LogCategory>,
}

/// Enable state for log categories.
///
/// Loads and stores are individually atomic, but a `configure` call is not:
/// a concurrent `is_enabled` may observe a half-applied configuration.
/// Categories are advisory, so this race is accepted.
#[derive(Debug)]
pub struct LevelGate {
    all_enabled: AtomicBool,
    mask: AtomicU8,
}

impl Default for LevelGate {
    fn default() -> Self {
        Self {
            all_enabled: AtomicBool::new(true),
            mask: AtomicU8::new(0),
        }
    }
}

impl LevelGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a list of category tokens.
    ///
    /// An empty list is a no-op. Otherwise tokens are processed in order,
    /// case-insensitively; unknown tokens are ignored. `ALL` restores
    /// all-enabled mode, and a concrete category after it leaves that mode
    /// again (last write wins).
    pub fn configure<I, S>(&self, categories: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tokens = categories.into_iter().peekable();
        if tokens.peek().is_none() {
            return;
        }

        let mut all_enabled = false;
        let mut mask = 0u8;
        for token in tokens {
            match token.as_ref().parse::<LogCategory>() {
                Ok(LogCategory::All) => {
                    all_enabled = true;
                    mask = 0;
                }
                Ok(category) => {
                    all_enabled = false;
                    mask |= category.bit();
                }
                Err(unknown) => {
                    tracing::debug!(token = %unknown.0, "ignoring unknown log category");
                }
            }
        }

        self.all_enabled.store(all_enabled, Ordering::Relaxed);
        self.mask.store(mask, Ordering::Relaxed);
    }

    /// True iff all-enabled mode is active or `category` was enabled.
    ///
    /// `LogCategory::All` asks only about all-enabled mode.
    pub fn is_enabled(&self, category: LogCategory) -> bool {
        if self.all_enabled.load(Ordering::Relaxed) {
            return true;
        }
        let bit = category.bit();
        bit != 0 && self.mask.load(Ordering::Relaxed) & bit != 0
    }

    pub fn snapshot(&self) -> LevelState {
        let all_enabled = self.all_enabled.load(Ordering::Relaxed);
        let mask = self.mask.load(Ordering::Relaxed);
        let enabled = LogCategory::ALL_CATEGORIES
            .into_iter()
            .filter(|c| all_enabled || mask & c.bit() != 0)
            .collect();
        LevelState {
            all_enabled,
            enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_all_enabled() {
        let gate = LevelGate::new();
        for category in LogCategory::ALL_CATEGORIES {
            assert!(gate.is_enabled(category));
        }
        assert!(gate.is_enabled(LogCategory::All));
    }

    #[test]
    fn test_empty_configure_is_noop() {
        let gate = LevelGate::new();
        let before = gate.snapshot();
        gate.configure(Vec::<String>::new());
        assert_eq!(gate.snapshot(), before);

        gate.configure(["warn"]);
        let before = gate.snapshot();
        gate.configure(Vec::<&str>::new());
        assert_eq!(gate.snapshot(), before);
    }

    #[test]
    fn test_explicit_set_overrides() {
        let gate = LevelGate::new();
        gate.configure(["INFO", "ERROR"]);
        assert!(gate.is_enabled(LogCategory::Info));
        assert!(gate.is_enabled(LogCategory::Error));
        assert!(!gate.is_enabled(LogCategory::Warn));
        assert!(!gate.is_enabled(LogCategory::Res));
        assert!(!gate.is_enabled(LogCategory::FlowChecker));
        assert!(!gate.is_enabled(LogCategory::All));
    }

    #[test]
    fn test_all_last_restores_default() {
        let gate = LevelGate::new();
        gate.configure(["INFO", "ALL"]);
        assert_eq!(gate.snapshot(), LevelGate::new().snapshot());
    }

    #[test]
    fn test_category_after_all_wins() {
        let gate = LevelGate::new();
        gate.configure(["ALL", "res"]);
        assert!(!gate.is_enabled(LogCategory::All));
        assert!(gate.is_enabled(LogCategory::Res));
        assert!(!gate.is_enabled(LogCategory::Info));
    }

    #[test]
    fn test_tokens_are_case_insensitive_and_unknown_ignored() {
        let gate = LevelGate::new();
        gate.configure(["Flow_Checker", "verbose", "wArN"]);
        let state = gate.snapshot();
        assert!(!state.all_enabled);
        assert_eq!(
            state.enabled,
            vec![LogCategory::Warn, LogCategory::FlowChecker]
        );
    }

    #[test]
    fn test_only_unknown_tokens_disable_everything() {
        let gate = LevelGate::new();
        gate.configure(["bogus"]);
        for category in LogCategory::ALL_CATEGORIES {
            assert!(!gate.is_enabled(category));
        }
    }

    #[test]
    fn test_category_parse_and_display() {
        assert_eq!("flow_checker".parse::<LogCategory>(), Ok(LogCategory::FlowChecker));
        assert_eq!(LogCategory::Res.to_string(), "RES");
        assert!("nope".parse::<LogCategory>().is_err());
    }
}
