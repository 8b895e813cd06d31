//! Diagnostic hook tests

use std::fmt;
use std::sync::Arc;
use std::thread;

use fluent_chain::{
    ChainEvent, ConditionChain, DiagnosticLevel, Diagnostics, DiagnosticsOptions, NoopSink,
};

use crate::common::{PanickingSink, RecordingSink, recorded};

#[test]
fn flow_records_snapshot() {
    let (chain, sink) = recorded("123");
    let _ = chain
        .with_context("parse")
        .map(|s| s.parse::<i64>().unwrap_or_default())
        .with_debug_values()
        .when(|n| *n > 100, |_| {})
        .then(|_| {})
        .end();

    insta::assert_snapshot!(sink.rendered(), @r#"
    DEBUG context_set value="123" context=parse
    DEBUG mapped value="123" -> <i64> context=parse
    DEBUG condition_met value=123 context=parse
    DEBUG then value=123 context=parse
    DEBUG terminated value=123 context=parse
    "#);
}

#[test]
fn default_and_or_else_records() {
    let (chain, sink) = recorded(String::from("seed"));
    let absent = ConditionChain::<String>::absent()
        .with_debug_values()
        .with_diagnostics(chain.diagnostics().clone());

    let _ = absent.or_else_get(|| "fallback".to_string()).or_else(|_| {});

    insta::assert_snapshot!(sink.rendered(), @r#"
    DEBUG default_used value="fallback"
    DEBUG or_else value="fallback"
    "#);
}

#[test]
fn error_record_carries_thread_and_caller() {
    let (chain, sink) = recorded(0_u32);
    let chain = chain.with_context("age");
    let err = chain.positive_number("must be positive").unwrap_err();
    assert_eq!(err.to_string(), "must be positive");

    let records = sink.records();
    let last = records.last().unwrap();
    assert_eq!(last.event, ChainEvent::ErrorRaised);
    assert_eq!(last.level, DiagnosticLevel::Error);
    assert_eq!(last.value, "0");
    assert_eq!(last.context.as_deref(), Some("age"));

    let failure = last.failure.as_ref().unwrap();
    assert_eq!(failure.message, "must be positive");
    assert!(failure.caller.contains("diagnostics.rs:"), "{}", failure.caller);
    let expected_thread = thread::current()
        .name()
        .map(str::to_owned)
        .unwrap_or_default();
    if !expected_thread.is_empty() {
        assert_eq!(failure.thread, expected_thread);
    }
}

#[test]
fn custom_error_types_are_recorded_by_display() {
    #[derive(Debug)]
    struct TooLong(usize);

    impl fmt::Display for TooLong {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "too long: {} chars", self.0)
        }
    }

    let (chain, sink) = recorded("abcdef");
    let err = chain
        .when_err(|s| s.len() > 3, || TooLong(6))
        .unwrap_err();
    assert_eq!(err.0, 6);

    let failure = sink.records().pop().unwrap().failure.unwrap();
    assert_eq!(failure.message, "too long: 6 chars");
}

#[test]
fn long_values_are_truncated() {
    let sink = Arc::new(RecordingSink::default());
    let diagnostics = Diagnostics::new(sink.clone()).with_options(DiagnosticsOptions::new(true, 10));
    let _ = ConditionChain::of("a".repeat(50))
        .with_debug_values()
        .with_diagnostics(diagnostics)
        .then(|_| {});

    let records = sink.records();
    let value = &records[0].value;
    assert_eq!(value.chars().count(), 10);
    assert!(value.ends_with('…'));
}

#[test]
fn disabled_diagnostics_record_nothing() {
    let sink = Arc::new(RecordingSink::default());
    let diagnostics =
        Diagnostics::new(sink.clone()).with_options(DiagnosticsOptions::new(false, 120));
    let result = ConditionChain::of(-5)
        .with_diagnostics(diagnostics)
        .with_context("off")
        .then(|_| {})
        .positive_number("negative");

    assert!(result.is_err());
    assert!(sink.records().is_empty());
}

#[test]
fn panicking_sink_does_not_change_semantics() {
    let diagnostics = Diagnostics::new(Arc::new(PanickingSink));
    let mut fired = false;
    let chain = ConditionChain::of(3)
        .with_diagnostics(diagnostics)
        .with_context("boom")
        .then(|_| fired = true);

    assert!(fired);
    assert_eq!(chain.context(), Some("boom"));
    assert_eq!(chain.map(|n| n * 2).get(), Some(&6));
    let err = chain.check(|n| *n == 3, "three").unwrap_err();
    assert_eq!(err.message(), "three");
}

#[test]
fn noop_sink_keeps_chain_working() {
    let chain = ConditionChain::of("x").with_diagnostics(Diagnostics::new(Arc::new(NoopSink)));
    assert!(chain.not_empty_string("empty").is_ok());
    assert_eq!(chain.end().get(), Some(&"x"));
}

#[test]
fn diagnostics_survive_map() {
    let (chain, sink) = recorded(2);
    let _ = chain.map(|n| n * 10).then(|_| {});
    assert_eq!(sink.events(), vec![ChainEvent::Mapped, ChainEvent::Then]);
}

#[test]
fn values_without_debug_render_as_type_name() {
    struct Token {
        secret: String,
    }

    let sink = Arc::new(RecordingSink::default());
    let chain = ConditionChain::of(Token {
        secret: "hunter2".into(),
    })
    .with_diagnostics(Diagnostics::new(sink.clone()))
    .with_context("login");

    let result = chain.check(|t| t.secret.len() < 8, "secret too short");
    assert!(result.is_err());

    let records = sink.records();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.value.ends_with("Token>")));
    assert!(records.iter().all(|r| !r.value.contains("hunter2")));
}

#[test]
fn custom_renderer_replaces_type_name() {
    fn masked(value: &String, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}***", value.chars().next().unwrap_or('?'))
    }

    let sink = Arc::new(RecordingSink::default());
    let _ = ConditionChain::of(String::from("password"))
        .with_renderer(masked)
        .with_diagnostics(Diagnostics::new(sink.clone()))
        .then(|_| {});

    insta::assert_snapshot!(sink.rendered(), @"DEBUG then value=p***");
}
