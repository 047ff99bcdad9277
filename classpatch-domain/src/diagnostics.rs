//! Diagnostics port for merge decisions, plus the recording adapter the pipeline uses.

use classpatch_types::report::{Diagnostic, Level};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagnosticCounts {
    pub errors: u64,
    pub warnings: u64,
}

impl DiagnosticCounts {
    fn record(&mut self, level: Level) {
        match level {
            Level::Error => self.errors += 1,
            Level::Warn => self.warnings += 1,
            Level::Debug | Level::Info => {}
        }
    }
}

/// Level-gated sink for merge diagnostics.
///
/// Errors and warnings are counted even when their emission is gated off.
pub trait Diagnostics {
    fn is_enabled(&self, level: Level) -> bool;

    fn log(&mut self, level: Level, prefix: Option<&str>, message: &str);

    fn counts(&self) -> DiagnosticCounts;
}

fn emit(level: Level, prefix: Option<&str>, message: &str) {
    let prefix = prefix.unwrap_or("-");
    match level {
        Level::Debug => debug!(prefix, "{}", message),
        Level::Info => info!(prefix, "{}", message),
        Level::Warn => warn!(prefix, "{}", message),
        Level::Error => error!(prefix, "{}", message),
    }
}

/// Keeps every emitted diagnostic in memory, optionally echoing it to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct MemoryDiagnostics {
    min_level: Level,
    echo: bool,
    entries: Vec<Diagnostic>,
    counts: DiagnosticCounts,
}

impl MemoryDiagnostics {
    pub fn new(min_level: Level) -> Self {
        Self {
            min_level,
            ..Self::default()
        }
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn count(&self, level: Level) -> usize {
        self.entries.iter().filter(|d| d.level == level).count()
    }

    pub fn messages(&self, level: Level) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|d| d.level == level)
            .map(|d| d.message.as_str())
            .collect()
    }

    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl Diagnostics for MemoryDiagnostics {
    fn is_enabled(&self, level: Level) -> bool {
        level >= self.min_level
    }

    fn log(&mut self, level: Level, prefix: Option<&str>, message: &str) {
        self.counts.record(level);
        if !self.is_enabled(level) {
            return;
        }
        if self.echo {
            emit(level, prefix, message);
        }
        self.entries.push(Diagnostic {
            level,
            prefix: prefix.map(str::to_string),
            message: message.to_string(),
        });
    }

    fn counts(&self) -> DiagnosticCounts {
        self.counts
    }
}
