//! Chain invariants checked over a spread of inputs

use std::cell::Cell;
use std::sync::Arc;
use std::thread;

use fluent_chain::ConditionChain;

const SAMPLES: [i64; 7] = [i64::MIN, -100, -1, 0, 1, 42, i64::MAX];

#[test]
fn get_returns_wrapped_value() {
    for v in SAMPLES {
        let chain = ConditionChain::of(v);
        assert_eq!(chain.get(), Some(&v));
        assert_eq!(chain.get(), chain.get());
    }
    for s in ["", "a", "ünïcode", "  "] {
        assert_eq!(ConditionChain::of(s).get(), Some(&s));
    }
}

#[test]
fn fresh_chain_is_live() {
    for v in SAMPLES {
        let fired = Cell::new(false);
        let _ = ConditionChain::of(v).then(|_| fired.set(true));
        assert!(fired.get(), "then did not fire for {v}");
    }
}

#[test]
fn option_callbacks_fire_on_any_live_chain() {
    let inputs = SAMPLES.into_iter().map(Some).chain([None]);
    for v in inputs {
        let fired = Cell::new(0);
        let chain = ConditionChain::of_option(v)
            .then_option(|seen| {
                assert_eq!(seen, v.as_ref());
                fired.set(fired.get() + 1);
            })
            .or_else_option(|_| fired.set(fired.get() + 1));
        assert_eq!(fired.get(), 2, "value {v:?}");

        let mapped = chain.map_option(|seen| Some(seen.is_some()));
        assert_eq!(mapped.get(), Some(&v.is_some()));
    }
}

#[test]
fn end_is_monotonic() {
    for v in SAMPLES {
        let fired = Cell::new(0);
        let ended = ConditionChain::of(v).end();
        let derived = ended
            .with_context("after-end")
            .when(|_| true, |_| fired.set(fired.get() + 1))
            .or_else(|_| fired.set(fired.get() + 1))
            .then(|_| fired.set(fired.get() + 1))
            .or_else_get(|| 0);

        assert_eq!(fired.get(), 0);
        assert!(derived.is_short_circuited());
        assert!(derived.check(|_| true, "never").is_ok());
        assert!(derived.map(|n| n + 1).is_short_circuited());
        assert_eq!(derived.get(), Some(&v));
    }
}

#[test]
fn map_after_end_never_calls_mapper() {
    for v in SAMPLES {
        let called = Cell::new(false);
        let mapped = ConditionChain::of(v).end().map(|n| {
            called.set(true);
            n.to_string()
        });
        assert!(!called.get());
        assert_eq!(mapped.get(), None);
        assert!(mapped.is_short_circuited());
    }
}

#[test]
fn not_null_passes_any_present_value() {
    for v in SAMPLES {
        let chain = ConditionChain::of(v).not_null("absent").unwrap();
        assert_eq!(chain.get(), Some(&v));
    }
    assert!(ConditionChain::<i64>::absent().not_null("absent").is_err());
}

#[test]
fn not_empty_string_triggers_only_on_empty() {
    for s in ["a", " ", "\n", "0"] {
        assert!(ConditionChain::of(s).not_empty_string("empty").is_ok());
    }
    assert!(ConditionChain::of("").not_empty_string("empty").is_err());
    assert!(ConditionChain::of(String::new()).not_empty_string("empty").is_err());
    assert!(ConditionChain::of(Arc::<str>::from("")).not_empty_string("empty").is_err());
}

#[test]
fn positive_number_triggers_on_non_positive() {
    for v in SAMPLES {
        let result = ConditionChain::of(v).positive_number("not positive");
        assert_eq!(result.is_err(), v <= 0, "value {v}");
    }
    assert!(ConditionChain::of(0.0_f64).positive_number("x").is_err());
    assert!(ConditionChain::of(-0.0_f64).positive_number("x").is_err());
    assert!(ConditionChain::of(f64::MIN_POSITIVE).positive_number("x").is_ok());
}

#[test]
fn or_else_get_supplier_runs_iff_live_and_absent() {
    let cases: [(Option<i64>, bool, bool); 4] = [
        (None, false, true),
        (None, true, false),
        (Some(1), false, false),
        (Some(1), true, false),
    ];
    for (value, ended, expect_call) in cases {
        let called = Cell::new(false);
        let mut chain = ConditionChain::of_option(value);
        if ended {
            chain = chain.end();
        }
        let _ = chain.or_else_get(|| {
            called.set(true);
            7
        });
        assert_eq!(called.get(), expect_call, "value={value:?} ended={ended}");
    }
}

#[test]
fn derived_chains_never_alter_receiver() {
    let base = ConditionChain::of(5).with_context("base");
    let _ = base.end();
    let _ = base.with_context("other");
    let _ = base.map(|n| n * 2);
    let _ = base.or_else_get(|| 0);

    assert!(!base.is_short_circuited());
    assert_eq!(base.context(), Some("base"));
    assert_eq!(base.get(), Some(&5));
}

#[test]
fn independent_chains_across_threads() {
    let handles: Vec<_> = SAMPLES
        .into_iter()
        .map(|v| {
            thread::spawn(move || {
                ConditionChain::of(v)
                    .with_context(format!("worker-{v}"))
                    .positive_number("not positive")
                    .map(|chain| chain.map(|n| n / 2).cloned())
            })
        })
        .collect();

    for (v, handle) in SAMPLES.into_iter().zip(handles) {
        let outcome = handle.join().unwrap();
        if v > 0 {
            assert_eq!(outcome.unwrap(), Some(v / 2));
        } else {
            assert!(outcome.is_err());
        }
    }
}

#[test]
fn shared_value_is_structurally_shared() {
    let chain = ConditionChain::of(vec![1, 2, 3]);
    let derived = chain.with_context("ctx").end();
    let a = chain.shared().unwrap();
    let b = derived.shared().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}
