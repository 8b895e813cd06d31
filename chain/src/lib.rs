//! Immutable condition chains for inline validation and branching.
//!
//! Wrap a value with [`ConditionChain::of`], run predicate-gated actions,
//! validations and transformations over it, and read it back with
//! [`ConditionChain::get`]. Validations return `Result`, so the first failure
//! aborts the expression at the `?`. [`ConditionChain::end`] short-circuits the
//! rest of the chain.
//!
//! ```
//! use fluent_chain::ConditionChain;
//!
//! # fn main() -> Result<(), fluent_chain::ChainError> {
//! let mut log = Vec::new();
//! let chain = ConditionChain::of("123")
//!     .with_context("parse")
//!     .not_empty_string("input must not be empty")?
//!     .map(|s| s.parse::<i64>().unwrap_or_default());
//! let _ = chain
//!     .when(|n| *n > 100, |_| log.push("big".to_string()))
//!     .then(|n| log.push(format!("final: {n}")));
//!
//! assert_eq!(log, ["big", "final: 123"]);
//! # Ok(())
//! # }
//! ```
//!
//! No IO, no async. Diagnostics go through an injectable [`DiagnosticSink`]
//! that defaults to `tracing`. Any value type can be chained; records show
//! the value's `Debug` form once [`ConditionChain::with_debug_values`] is
//! called, and only its type name otherwise.

mod chain;
pub mod diagnostics;
mod dynamic;
mod error;
pub mod value;

pub use chain::ConditionChain;
pub use diagnostics::{
    ChainEvent, DiagnosticLevel, DiagnosticRecord, DiagnosticSink, Diagnostics,
    DiagnosticsOptions, FailureSite, NoopSink, TracingSink,
};
pub use error::ChainError;
pub use value::{Numeric, RenderFn};
