//! Diagnostic hook for condition chains.
//!
//! Every chain carries a [`Diagnostics`] handle: a [`DiagnosticSink`] plus
//! rendering options. Operations that change state, fire an action, or raise
//! an error hand the sink a [`DiagnosticRecord`]. The default sink forwards to
//! `tracing` and is asked first whether the record's level is enabled, so with
//! no subscriber installed no record is built and no value is rendered.
//!
//! Sinks never influence chain semantics. A panicking sink (or a panicking
//! `Debug` impl while rendering the value) is contained and the chain call
//! proceeds as if nothing had been recorded.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use tracing::Level;

/// Default character budget for rendered values.
pub const DEFAULT_MAX_VALUE_CHARS: usize = 120;

/// Smallest accepted character budget for rendered values.
pub const MIN_MAX_VALUE_CHARS: usize = 8;

/// What happened on the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainEvent {
    ContextSet,
    ConditionMet,
    ErrorRaised,
    OrElse,
    Then,
    DefaultUsed,
    Mapped,
    Terminated,
}

impl ChainEvent {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ContextSet => "context_set",
            Self::ConditionMet => "condition_met",
            Self::ErrorRaised => "error_raised",
            Self::OrElse => "or_else",
            Self::Then => "then",
            Self::DefaultUsed => "default_used",
            Self::Mapped => "mapped",
            Self::Terminated => "terminated",
        }
    }

    #[must_use]
    pub const fn level(self) -> DiagnosticLevel {
        match self {
            Self::ErrorRaised => DiagnosticLevel::Error,
            _ => DiagnosticLevel::Debug,
        }
    }

    const fn describe(self) -> &'static str {
        match self {
            Self::ContextSet => "chain context set",
            Self::ConditionMet => "chain condition met",
            Self::ErrorRaised => "chain validation failed",
            Self::OrElse => "chain or_else fired",
            Self::Then => "chain then fired",
            Self::DefaultUsed => "chain default value used",
            Self::Mapped => "chain value mapped",
            Self::Terminated => "chain terminated",
        }
    }
}

impl fmt::Display for ChainEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a record: normal flow is `Debug`, the error path is `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticLevel {
    Debug,
    Error,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Debug => "DEBUG",
            Self::Error => "ERROR",
        })
    }
}

/// Where and why a validation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureSite {
    /// Rendered error (`Display` form).
    pub message: String,
    /// Name of the raising thread, or its id when unnamed.
    pub thread: String,
    /// Source location of the chain call that raised (`file:line:column`).
    pub caller: String,
}

/// One structured diagnostic event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    pub event: ChainEvent,
    pub level: DiagnosticLevel,
    pub value: String,
    /// Rendered result of a `map`, only set for [`ChainEvent::Mapped`].
    pub mapped_to: Option<String>,
    pub context: Option<String>,
    /// Only set for [`ChainEvent::ErrorRaised`].
    pub failure: Option<FailureSite>,
}

impl DiagnosticRecord {
    #[must_use]
    pub fn new(event: ChainEvent, value: String, context: Option<&str>) -> Self {
        Self {
            event,
            level: event.level(),
            value,
            mapped_to: None,
            context: context.map(str::to_owned),
            failure: None,
        }
    }

    #[must_use]
    pub fn with_mapped_to(mut self, mapped_to: String) -> Self {
        self.mapped_to = Some(mapped_to);
        self
    }

    #[must_use]
    pub fn with_failure(mut self, failure: FailureSite) -> Self {
        self.failure = Some(failure);
        self
    }
}

impl fmt::Display for DiagnosticRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} value={}", self.level, self.event, self.value)?;
        if let Some(mapped_to) = &self.mapped_to {
            write!(f, " -> {mapped_to}")?;
        }
        if let Some(context) = &self.context {
            write!(f, " context={context}")?;
        }
        if let Some(failure) = &self.failure {
            write!(
                f,
                " thread={} caller={} error={}",
                failure.thread, failure.caller, failure.message
            )?;
        }
        Ok(())
    }
}

/// Receiver for chain diagnostics.
pub trait DiagnosticSink: Send + Sync {
    /// Whether records at `level` would be kept. When false the record is
    /// never built, so the value is not rendered.
    fn enabled(&self, _level: DiagnosticLevel) -> bool {
        true
    }

    fn record(&self, record: &DiagnosticRecord);
}

/// Forwards records to `tracing` on target `fluent_chain`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn enabled(&self, level: DiagnosticLevel) -> bool {
        match level {
            DiagnosticLevel::Debug => tracing::enabled!(target: "fluent_chain", Level::DEBUG),
            DiagnosticLevel::Error => tracing::enabled!(target: "fluent_chain", Level::ERROR),
        }
    }

    fn record(&self, record: &DiagnosticRecord) {
        let message = record.event.describe();
        match &record.failure {
            Some(failure) => tracing::error!(
                target: "fluent_chain",
                event = record.event.as_str(),
                value = %record.value,
                context = record.context.as_deref(),
                thread = %failure.thread,
                caller = %failure.caller,
                error = %failure.message,
                "{message}"
            ),
            None => tracing::debug!(
                target: "fluent_chain",
                event = record.event.as_str(),
                value = %record.value,
                mapped_to = record.mapped_to.as_deref(),
                context = record.context.as_deref(),
                "{message}"
            ),
        }
    }
}

/// Discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn enabled(&self, _level: DiagnosticLevel) -> bool {
        false
    }

    fn record(&self, _record: &DiagnosticRecord) {}
}

/// Rendering knobs for diagnostic records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticsOptions {
    /// When false, nothing is rendered and the sink is never called.
    pub enabled: bool,
    /// Character budget for rendered values, clamped to [`MIN_MAX_VALUE_CHARS`].
    pub max_value_chars: usize,
}

impl DiagnosticsOptions {
    #[must_use]
    pub fn new(enabled: bool, max_value_chars: usize) -> Self {
        Self {
            enabled,
            max_value_chars: max_value_chars.max(MIN_MAX_VALUE_CHARS),
        }
    }
}

impl Default for DiagnosticsOptions {
    fn default() -> Self {
        Self::new(true, DEFAULT_MAX_VALUE_CHARS)
    }
}

/// The diagnostic collaborator carried by every chain.
///
/// Cheap to clone; the sink is shared.
#[derive(Clone)]
pub struct Diagnostics {
    sink: Arc<dyn DiagnosticSink>,
    options: DiagnosticsOptions,
}

impl Diagnostics {
    #[must_use]
    pub fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            sink,
            options: DiagnosticsOptions::default(),
        }
    }

    /// Diagnostics that never render or record anything.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            sink: Arc::new(NoopSink),
            options: DiagnosticsOptions::new(false, DEFAULT_MAX_VALUE_CHARS),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: DiagnosticsOptions) -> Self {
        self.options = DiagnosticsOptions::new(options.enabled, options.max_value_chars);
        self
    }

    #[must_use]
    pub fn options(&self) -> DiagnosticsOptions {
        self.options
    }

    /// Build a record and hand it to the sink, containing any panic.
    ///
    /// `build` only runs when diagnostics are enabled and the sink wants
    /// records at `level`.
    pub(crate) fn emit(
        &self,
        level: DiagnosticLevel,
        build: impl FnOnce(&DiagnosticsOptions) -> DiagnosticRecord,
    ) {
        if !self.options.enabled {
            return;
        }
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            if self.sink.enabled(level) {
                let record = build(&self.options);
                self.sink.record(&record);
            }
        }));
        if outcome.is_err() {
            tracing::warn!(target: "fluent_chain", "diagnostic sink panicked; record dropped");
        }
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Name of the current thread, falling back to its id.
pub(crate) fn current_thread_label() -> String {
    let thread = thread::current();
    match thread.name() {
        Some(name) => name.to_owned(),
        None => format!("{:?}", thread.id()),
    }
}
