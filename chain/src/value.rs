//! Value capabilities used by the typed validators, plus diagnostic rendering.

use std::any;
use std::fmt;

/// Placeholder rendered for a chain whose value is absent.
pub const ABSENT: &str = "<absent>";

/// Suffix appended to rendered values that were cut short.
const TRUNCATION_SUFFIX: &str = "…";

/// Values that can be compared against zero by `positive_number`.
///
/// Comparison happens in `f64`, so very wide integers lose precision and
/// `NaN` is never considered non-positive.
pub trait Numeric {
    fn as_f64(&self) -> f64;
}

macro_rules! impl_numeric {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Numeric for $ty {
                fn as_f64(&self) -> f64 {
                    *self as f64
                }
            }
        )+
    };
}

impl_numeric!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);

impl<N: Numeric + ?Sized> Numeric for &N {
    fn as_f64(&self) -> f64 {
        (**self).as_f64()
    }
}

/// Writes a chain value into a diagnostic record.
pub type RenderFn<T> = fn(&T, &mut fmt::Formatter<'_>) -> fmt::Result;

/// Render with the value's `Debug` form.
pub fn render_debug<T: fmt::Debug>(value: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Debug::fmt(value, f)
}

/// Render only the value's type name, as `<name>`.
pub fn render_type_name<T>(_value: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "<{}>", any::type_name::<T>())
}

/// Render a chain value for a diagnostic record.
///
/// The output is cut to at most `max_chars` characters (suffix included).
/// Rendering stops as soon as the budget is exceeded, so a huge value is
/// never formatted in full. Counts `char`s, so multi-byte text is never split.
#[must_use]
pub fn render_value<T>(value: Option<&T>, render: RenderFn<T>, max_chars: usize) -> String {
    let Some(value) = value else {
        return ABSENT.to_string();
    };
    let mut out = Budgeted::new(max_chars);
    // Err is either the budget running out or a failing renderer; keep what was written.
    let _ = fmt::write(&mut out, format_args!("{}", Rendered { value, render }));
    out.finish()
}

struct Rendered<'a, T> {
    value: &'a T,
    render: RenderFn<T>,
}

impl<T> fmt::Display for Rendered<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self.render)(self.value, f)
    }
}

/// Buffer that refuses input past `limit` characters.
struct Budgeted {
    out: String,
    chars: usize,
    limit: usize,
    overflowed: bool,
}

impl Budgeted {
    fn new(limit: usize) -> Self {
        Self {
            out: String::new(),
            chars: 0,
            limit,
            overflowed: false,
        }
    }

    fn finish(self) -> String {
        if !self.overflowed {
            return self.out;
        }
        let keep = self.limit.saturating_sub(TRUNCATION_SUFFIX.chars().count());
        let mut head: String = self.out.chars().take(keep).collect();
        head.push_str(TRUNCATION_SUFFIX);
        head
    }
}

impl fmt::Write for Budgeted {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for ch in s.chars() {
            if self.chars == self.limit {
                self.overflowed = true;
                return Err(fmt::Error);
            }
            self.out.push(ch);
            self.chars += 1;
        }
        Ok(())
    }
}
