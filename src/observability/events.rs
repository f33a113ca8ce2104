//! Lifecycle events outside the per-query scope

use std::fmt;

use super::logger::Severity;

/// Named events with a fixed severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Configuration file parsed and validated
    ConfigLoaded,
    /// Rows fetched from the provider and cached
    TableLoaded,
    /// Provider could not supply a table
    TableLoadFailed,
    /// Table cache emptied
    CacheCleared,
    /// Interactive shell started
    ShellStart,
    /// Interactive shell reached end of input
    ShellStop,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::TableLoaded => "TABLE_LOADED",
            Event::TableLoadFailed => "TABLE_LOAD_FAILED",
            Event::CacheCleared => "CACHE_CLEARED",
            Event::ShellStart => "SHELL_START",
            Event::ShellStop => "SHELL_STOP",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::TableLoadFailed => Severity::Warn,
            Event::TableLoaded => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::TableLoaded,
            Event::TableLoadFailed,
            Event::CacheCleared,
            Event::ShellStart,
            Event::ShellStop,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_event_severity() {
        assert_eq!(Event::TableLoadFailed.severity(), Severity::Warn);
        assert_eq!(Event::CacheCleared.severity(), Severity::Info);
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::CacheCleared), "CACHE_CLEARED");
    }
}
