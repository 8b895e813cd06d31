//! Named chain scenarios runnable from the command line.

use std::cell::RefCell;
use std::fmt;

use anyhow::{Result, bail};
use fluent_chain::{ConditionChain, Diagnostics};

/// A scenario picked from argv.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scenario {
    /// `when` + unconditional `or_else` on a string.
    Match(String),
    /// `not_null` on an optional input.
    NotNull(Option<String>),
    /// `positive_number` on an integer.
    Positive(i64),
    /// Parse, branch on size, then report.
    Parse(String),
    /// `or_else_get` on an optional input.
    Default(Option<String>),
}

impl Scenario {
    pub const USAGE: &'static str = "usage: fluent <match TEXT | not-null [TEXT] | positive INT | parse TEXT | default [TEXT]>";

    pub fn from_args(args: &[String]) -> Result<Self> {
        let (name, rest) = match args.split_first() {
            Some((name, rest)) => (name.as_str(), rest),
            None => bail!("{}", Self::USAGE),
        };
        let value = rest.first().cloned();

        let scenario = match name {
            "match" => Scenario::Match(required(value, name)?),
            "not-null" => Scenario::NotNull(value),
            "positive" => {
                let raw = required(value, name)?;
                match raw.trim().parse::<i64>() {
                    Ok(n) => Scenario::Positive(n),
                    Err(err) => bail!("positive expects an integer, got {raw:?}: {err}"),
                }
            }
            "parse" => Scenario::Parse(required(value, name)?),
            "default" => Scenario::Default(value),
            other => bail!("unknown scenario {other:?}\n{}", Self::USAGE),
        };
        Ok(scenario)
    }

    /// Run the scenario and return the lines its actions produced.
    pub fn run(&self, settings: &ChainSettings) -> Result<Vec<String>> {
        let lines = RefCell::new(Vec::new());
        let say = |line: String| lines.borrow_mut().push(line);

        match self {
            Scenario::Match(text) => {
                let _ = settings
                    .chain(text.clone())
                    .when(|s| s == "Hello", |_| say("matched".to_string()))
                    .or_else(|_| say("no match".to_string()));
            }
            Scenario::NotNull(value) => {
                let chain = settings
                    .chain_option(value.clone())
                    .not_null("must not be null")?;
                let _ = chain.then(|s| say(format!("value: {s}")));
            }
            Scenario::Positive(n) => {
                let chain = settings.chain(*n).positive_number("must be positive")?;
                let _ = chain.then(|n| say(format!("value: {n}")));
            }
            Scenario::Parse(text) => {
                let _ = settings
                    .chain(text.clone())
                    .try_map(|s| s.trim().parse::<i64>())?
                    .with_debug_values()
                    .when(|i| *i > 100, |_| say("big".to_string()))
                    .then(|i| say(format!("final: {i}")));
            }
            Scenario::Default(value) => {
                let chain = settings
                    .chain_option(value.clone())
                    .or_else_get(|| "default".to_string());
                if let Some(resolved) = chain.get() {
                    say(resolved.clone());
                }
            }
        }

        Ok(lines.into_inner())
    }
}

fn required(value: Option<String>, scenario: &str) -> Result<String> {
    match value {
        Some(value) => Ok(value),
        None => bail!("{scenario} needs a value\n{}", Scenario::USAGE),
    }
}

/// How demo chains are built: diagnostics plus an optional context label.
///
/// Demo values are shown in records with their `Debug` form.
#[derive(Debug, Clone, Default)]
pub struct ChainSettings {
    pub diagnostics: Diagnostics,
    pub context: Option<String>,
}

impl ChainSettings {
    pub fn chain<T: fmt::Debug>(&self, value: T) -> ConditionChain<T> {
        self.chain_option(Some(value))
    }

    pub fn chain_option<T: fmt::Debug>(&self, value: Option<T>) -> ConditionChain<T> {
        let chain = ConditionChain::of_option(value)
            .with_debug_values()
            .with_diagnostics(self.diagnostics.clone());
        match &self.context {
            Some(context) => chain.with_context(context.as_str()),
            None => chain,
        }
    }
}
