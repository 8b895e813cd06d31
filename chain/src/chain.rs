//! The immutable condition chain.

use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use crate::diagnostics::{
    ChainEvent, DiagnosticRecord, Diagnostics, DiagnosticsOptions, FailureSite,
    current_thread_label,
};
use crate::error::ChainError;
use crate::value::{Numeric, RenderFn, render_debug, render_type_name, render_value};

/// A value plus the short-circuit and context state of a fluent expression.
///
/// Every operation borrows the chain and returns a new one; the receiver is
/// never altered. The value and context are shared between derived chains
/// through `Arc`s and are never mutated after construction, so independent
/// chains can be used from different threads without locking.
///
/// # Short-circuit
///
/// Once a chain is short-circuited (via [`end`](Self::end)) every later
/// conditional, action, or validation on chains derived from it is a no-op.
/// `map` turns into an absent, still short-circuited chain. [`get`](Self::get)
/// keeps returning the last value.
///
/// # Absent values
///
/// A chain may hold no value (see [`absent`](Self::absent)). Callbacks that
/// take `&T` only run on a present value: predicates never match an absent
/// one. The `_option` variants ([`then_option`](Self::then_option),
/// [`or_else_option`](Self::or_else_option), [`map_option`](Self::map_option))
/// take `Option<&T>` and run whenever the chain is live, value or not.
/// [`not_null`](Self::not_null), [`or_else_get`](Self::or_else_get) and
/// [`when_absent`](Self::when_absent) test for absence directly.
///
/// # Rendering
///
/// Diagnostic records show the value through the chain's [`RenderFn`]. A new
/// chain shows only the value's type name; [`with_debug_values`](Self::with_debug_values)
/// or [`with_renderer`](Self::with_renderer) switch to the value itself. A
/// chain produced by `map` starts again from the type name. Nothing is
/// rendered unless the sink keeps records at that level.
///
/// # Errors
///
/// [`when_err`](Self::when_err) is the only failing operation: it returns the
/// caller-built error immediately, so `?` aborts the rest of the expression.
/// The sugar validators all go through it.
///
/// ```
/// use fluent_chain::{ChainError, ConditionChain};
///
/// fn register(age: i32) -> Result<i32, ChainError> {
///     let age = ConditionChain::of(age)
///         .with_context("register")
///         .positive_number("age must be positive")?
///         .check(|age| *age > 150, "age is not plausible")?;
///     Ok(*age.get().unwrap_or(&0))
/// }
///
/// assert_eq!(register(30), Ok(30));
/// assert_eq!(register(0).unwrap_err().to_string(), "age must be positive");
/// ```
pub struct ConditionChain<T> {
    value: Option<Arc<T>>,
    short_circuited: bool,
    context: Option<Arc<str>>,
    diagnostics: Diagnostics,
    render: RenderFn<T>,
}

impl<T> ConditionChain<T> {
    /// Wrap a present value.
    #[must_use]
    pub fn of(value: T) -> Self {
        Self::of_option(Some(value))
    }

    /// Wrap a value that may be absent.
    #[must_use]
    pub fn of_option(value: Option<T>) -> Self {
        Self {
            value: value.map(Arc::new),
            short_circuited: false,
            context: None,
            diagnostics: Diagnostics::default(),
            render: render_type_name::<T>,
        }
    }

    /// A chain holding no value.
    #[must_use]
    pub fn absent() -> Self {
        Self::of_option(None)
    }

    /// Same value and state, reporting to `diagnostics` from here on.
    #[must_use]
    pub fn with_diagnostics(&self, diagnostics: Diagnostics) -> Self {
        Self {
            diagnostics,
            ..self.clone()
        }
    }

    /// Same value and state, rendering the value with `render` in records.
    #[must_use]
    pub fn with_renderer(&self, render: RenderFn<T>) -> Self {
        Self {
            render,
            ..self.clone()
        }
    }

    /// The wrapped value, whether or not the chain is short-circuited.
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.value.as_deref()
    }

    /// Shared handle to the wrapped value.
    #[must_use]
    pub fn shared(&self) -> Option<Arc<T>> {
        self.value.clone()
    }

    #[must_use]
    pub fn cloned(&self) -> Option<T>
    where
        T: Clone,
    {
        self.get().cloned()
    }

    #[must_use]
    pub fn is_absent(&self) -> bool {
        self.value.is_none()
    }

    #[must_use]
    pub fn is_short_circuited(&self) -> bool {
        self.short_circuited
    }

    #[must_use]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Attach a free-form label carried into every diagnostic record.
    #[must_use]
    pub fn with_context(&self, label: impl Into<Arc<str>>) -> Self {
        let next = Self {
            context: Some(label.into()),
            ..self.clone()
        };
        next.emit(ChainEvent::ContextSet);
        next
    }

    /// Run `action` when the chain is live and `predicate` holds.
    ///
    /// The wrapped value is left untouched. Both callbacks are required:
    ///
    /// ```compile_fail
    /// use fluent_chain::ConditionChain;
    ///
    /// let _ = ConditionChain::of(1).when(|n| *n > 0);
    /// ```
    #[must_use]
    pub fn when<P, A>(&self, predicate: P, action: A) -> Self
    where
        P: FnOnce(&T) -> bool,
        A: FnOnce(&T),
    {
        if let Some(value) = self.live_value()
            && predicate(value)
        {
            self.emit(ChainEvent::ConditionMet);
            action(value);
        }
        self.clone()
    }

    /// Fail with `error_factory()` when the chain is live and `predicate` holds.
    ///
    /// The error is returned as-is; nothing is caught or wrapped.
    #[track_caller]
    pub fn when_err<E, P, F>(&self, predicate: P, error_factory: F) -> Result<Self, E>
    where
        E: fmt::Display,
        P: FnOnce(&T) -> bool,
        F: FnOnce() -> E,
    {
        self.fail_if(|value| value.is_some_and(predicate), error_factory)
    }

    /// Run `action` when the chain is live and holds no value.
    #[must_use]
    pub fn when_absent<A>(&self, action: A) -> Self
    where
        A: FnOnce(),
    {
        if !self.short_circuited && self.is_absent() {
            self.emit(ChainEvent::ConditionMet);
            action();
        }
        self.clone()
    }

    /// Fail with `error_factory()` when the chain is live and holds no value.
    #[track_caller]
    pub fn when_absent_err<E, F>(&self, error_factory: F) -> Result<Self, E>
    where
        E: fmt::Display,
        F: FnOnce() -> E,
    {
        self.fail_if(|value| value.is_none(), error_factory)
    }

    /// Run `action` whenever the chain is live and holds a value.
    ///
    /// There is no memory of earlier `when` outcomes: this fires whether or
    /// not a previous predicate matched.
    #[must_use]
    pub fn or_else<A>(&self, action: A) -> Self
    where
        A: FnOnce(&T),
    {
        self.fire(ChainEvent::OrElse, action)
    }

    /// Run `action` whenever the chain is live, passing the value if any.
    #[must_use]
    pub fn or_else_option<A>(&self, action: A) -> Self
    where
        A: FnOnce(Option<&T>),
    {
        self.fire_option(ChainEvent::OrElse, action)
    }

    /// Same behavior as [`or_else`](Self::or_else).
    #[must_use]
    pub fn then<A>(&self, action: A) -> Self
    where
        A: FnOnce(&T),
    {
        self.fire(ChainEvent::Then, action)
    }

    /// Same behavior as [`or_else_option`](Self::or_else_option).
    #[must_use]
    pub fn then_option<A>(&self, action: A) -> Self
    where
        A: FnOnce(Option<&T>),
    {
        self.fire_option(ChainEvent::Then, action)
    }

    /// Fail with `message` when the chain is live and holds no value.
    #[track_caller]
    pub fn not_null(&self, message: impl Into<String>) -> Result<Self, ChainError> {
        self.when_absent_err(|| ChainError::invalid_argument(message))
    }

    /// Fail with `message` when the chain is live and `predicate` holds.
    #[track_caller]
    pub fn check<P>(&self, predicate: P, message: impl Into<String>) -> Result<Self, ChainError>
    where
        P: FnOnce(&T) -> bool,
    {
        self.when_err(predicate, || ChainError::invalid_argument(message))
    }

    /// Replace an absent value with `default_supplier()`.
    ///
    /// The supplier only runs when the chain is live and absent.
    #[must_use]
    pub fn or_else_get<S>(&self, default_supplier: S) -> Self
    where
        S: FnOnce() -> T,
    {
        if self.short_circuited || !self.is_absent() {
            return self.clone();
        }
        let next = Self {
            value: Some(Arc::new(default_supplier())),
            ..self.clone()
        };
        next.emit(ChainEvent::DefaultUsed);
        next
    }

    /// Transform the value into a chain of another type.
    ///
    /// An absent value maps to an absent, live chain without calling
    /// `mapper`. On a short-circuited chain the mapper is skipped and the
    /// result is an absent, short-circuited chain.
    #[must_use]
    pub fn map<R, M>(&self, mapper: M) -> ConditionChain<R>
    where
        M: FnOnce(&T) -> R,
    {
        if self.short_circuited {
            return self.derive(None, true);
        }
        let Some(value) = self.get() else {
            return self.derive(None, false);
        };
        let next = self.derive(Some(Arc::new(mapper(value))), false);
        self.emit_mapped(&next);
        next
    }

    /// Like [`map`](Self::map), but `mapper` sees the value as an `Option`
    /// and runs on a live chain even when the value is absent.
    #[must_use]
    pub fn map_option<R, M>(&self, mapper: M) -> ConditionChain<R>
    where
        M: FnOnce(Option<&T>) -> Option<R>,
    {
        if self.short_circuited {
            return self.derive(None, true);
        }
        let next = self.derive(mapper(self.get()).map(Arc::new), false);
        self.emit_mapped(&next);
        next
    }

    /// Fallible [`map`](Self::map): a mapper error is returned like a
    /// `when_err` failure.
    #[track_caller]
    pub fn try_map<R, E, M>(&self, mapper: M) -> Result<ConditionChain<R>, E>
    where
        E: fmt::Display,
        M: FnOnce(&T) -> Result<R, E>,
    {
        let caller = Location::caller();
        if self.short_circuited {
            return Ok(self.derive(None, true));
        }
        let Some(value) = self.get() else {
            return Ok(self.derive(None, false));
        };
        match mapper(value) {
            Ok(mapped) => {
                let next = self.derive(Some(Arc::new(mapped)), false);
                self.emit_mapped(&next);
                Ok(next)
            }
            Err(error) => {
                self.emit_failure(&error, caller);
                Err(error)
            }
        }
    }

    /// Short-circuit the chain: later conditionals and actions are skipped.
    #[must_use]
    pub fn end(&self) -> Self {
        let next = Self {
            short_circuited: true,
            ..self.clone()
        };
        next.emit(ChainEvent::Terminated);
        next
    }

    /// The value, if the chain is still live.
    fn live_value(&self) -> Option<&T> {
        if self.short_circuited {
            None
        } else {
            self.get()
        }
    }

    fn derive<R>(&self, value: Option<Arc<R>>, short_circuited: bool) -> ConditionChain<R> {
        ConditionChain {
            value,
            short_circuited,
            context: self.context.clone(),
            diagnostics: self.diagnostics.clone(),
            render: render_type_name::<R>,
        }
    }

    fn fire<A>(&self, event: ChainEvent, action: A) -> Self
    where
        A: FnOnce(&T),
    {
        if let Some(value) = self.live_value() {
            self.emit(event);
            action(value);
        }
        self.clone()
    }

    fn fire_option<A>(&self, event: ChainEvent, action: A) -> Self
    where
        A: FnOnce(Option<&T>),
    {
        if !self.short_circuited {
            self.emit(event);
            action(self.get());
        }
        self.clone()
    }

    #[track_caller]
    fn fail_if<E, P, F>(&self, matched: P, error_factory: F) -> Result<Self, E>
    where
        E: fmt::Display,
        P: FnOnce(Option<&T>) -> bool,
        F: FnOnce() -> E,
    {
        let caller = Location::caller();
        if self.short_circuited || !matched(self.get()) {
            return Ok(self.clone());
        }
        let error = error_factory();
        self.emit_failure(&error, caller);
        Err(error)
    }

    fn rendered(&self, options: &DiagnosticsOptions) -> String {
        render_value(self.get(), self.render, options.max_value_chars)
    }

    fn emit(&self, event: ChainEvent) {
        self.diagnostics.emit(event.level(), |options| {
            DiagnosticRecord::new(event, self.rendered(options), self.context())
        });
    }

    fn emit_mapped<R>(&self, next: &ConditionChain<R>) {
        self.diagnostics.emit(ChainEvent::Mapped.level(), |options| {
            DiagnosticRecord::new(ChainEvent::Mapped, self.rendered(options), self.context())
                .with_mapped_to(next.rendered(options))
        });
    }

    fn emit_failure<E: fmt::Display>(&self, error: &E, caller: &Location<'_>) {
        self.diagnostics.emit(ChainEvent::ErrorRaised.level(), |options| {
            DiagnosticRecord::new(ChainEvent::ErrorRaised, self.rendered(options), self.context())
                .with_failure(FailureSite {
                    message: error.to_string(),
                    thread: current_thread_label(),
                    caller: caller.to_string(),
                })
        });
    }
}

impl<T: fmt::Debug> ConditionChain<T> {
    /// Show the value's `Debug` form in diagnostic records.
    #[must_use]
    pub fn with_debug_values(&self) -> Self {
        self.with_renderer(render_debug::<T>)
    }
}

impl<T: AsRef<str>> ConditionChain<T> {
    /// Fail with `message` when the value is the empty string.
    ///
    /// Only available on string-valued chains; see
    /// [`not_empty_string_dyn`](Self::not_empty_string_dyn) for untyped values.
    ///
    /// ```compile_fail
    /// use fluent_chain::ConditionChain;
    ///
    /// let _ = ConditionChain::of(42).not_empty_string("numbers are not strings");
    /// ```
    #[track_caller]
    pub fn not_empty_string(&self, message: impl Into<String>) -> Result<Self, ChainError> {
        self.check(|value| value.as_ref().is_empty(), message)
    }
}

impl<T: Numeric> ConditionChain<T> {
    /// Fail with `message` when the value is zero or negative.
    ///
    /// Only available on numeric chains; see
    /// [`positive_number_dyn`](Self::positive_number_dyn) for untyped values.
    ///
    /// ```compile_fail
    /// use fluent_chain::ConditionChain;
    ///
    /// let _ = ConditionChain::of("12").positive_number("strings are not numbers");
    /// ```
    #[track_caller]
    pub fn positive_number(&self, message: impl Into<String>) -> Result<Self, ChainError> {
        self.check(|value| value.as_f64() <= 0.0, message)
    }
}

impl<T> Clone for ConditionChain<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            short_circuited: self.short_circuited,
            context: self.context.clone(),
            diagnostics: self.diagnostics.clone(),
            render: self.render,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ConditionChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionChain")
            .field("value", &self.get())
            .field("short_circuited", &self.short_circuited)
            .field("context", &self.context())
            .finish_non_exhaustive()
    }
}
