//! Runtime capability checks for untyped chains.
//!
//! The typed validators (`not_empty_string`, `positive_number`) only exist on
//! chains whose value type is statically a string or a number. These `_dyn`
//! variants inspect the value at runtime instead, for chains over `Any`-ish
//! payloads such as `Box<dyn Any + Send + Sync>`. Values of unknown types never
//! trigger.

use std::any::Any;
use std::sync::Arc;

use crate::chain::ConditionChain;
use crate::error::ChainError;
use crate::value::Numeric;

impl<T: Any> ConditionChain<T> {
    /// Fail with `message` when the value is, at runtime, an empty string.
    #[track_caller]
    pub fn not_empty_string_dyn(&self, message: impl Into<String>) -> Result<Self, ChainError> {
        self.check(|value| as_str(value).is_some_and(str::is_empty), message)
    }

    /// Fail with `message` when the value is, at runtime, a number `<= 0`.
    #[track_caller]
    pub fn positive_number_dyn(&self, message: impl Into<String>) -> Result<Self, ChainError> {
        self.check(|value| as_number(value).is_some_and(|n| n <= 0.0), message)
    }
}

/// Look through the common type-erased boxes.
fn unbox(value: &dyn Any) -> &dyn Any {
    if let Some(inner) = value.downcast_ref::<Box<dyn Any + Send + Sync>>() {
        return unbox(&**inner);
    }
    if let Some(inner) = value.downcast_ref::<Box<dyn Any + Send>>() {
        return unbox(&**inner);
    }
    if let Some(inner) = value.downcast_ref::<Box<dyn Any>>() {
        return unbox(&**inner);
    }
    value
}

fn as_str(value: &dyn Any) -> Option<&str> {
    let value = unbox(value);
    value
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| value.downcast_ref::<&'static str>().copied())
        .or_else(|| value.downcast_ref::<Box<str>>().map(|s| &**s))
        .or_else(|| value.downcast_ref::<Arc<str>>().map(|s| &**s))
}

fn as_number(value: &dyn Any) -> Option<f64> {
    let value = unbox(value);
    macro_rules! try_numeric {
        ($($ty:ty),+) => {
            $(
                if let Some(n) = value.downcast_ref::<$ty>() {
                    return Some(n.as_f64());
                }
            )+
        };
    }
    try_numeric!(
        i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
    );
    None
}
