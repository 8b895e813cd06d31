//! Fluent CLI - runs named condition-chain scenarios.
//!
//! ```text
//! main() -> init_tracing() -> FluentConfig -> Scenario::from_args() -> run()
//! ```
//!
//! Action output goes to stdout, diagnostics to stderr through `tracing`.
//! A failed validation ends the process with the validator's message.

mod scenarios;

use std::env;
use std::io::{self, Write};

use anyhow::{Context, Result};
use fluent_config::FluentConfig;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::scenarios::{ChainSettings, Scenario};

fn init_tracing(configured_filter: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured_filter.unwrap_or("info")))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let ansi = env::var_os("NO_COLOR").is_none();
    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(ansi).with_writer(io::stderr))
        .with(env_filter)
        .init();
}

fn load_config() -> Result<FluentConfig> {
    let config = FluentConfig::load()
        .with_context(|| {
            let path = FluentConfig::path()
                .map_or_else(|| "<no home dir>".to_string(), |p| p.display().to_string());
            format!("loading config from {path}")
        })?
        .unwrap_or_default();
    Ok(config.apply_env_overrides())
}

fn main() -> Result<()> {
    let config = load_config();
    init_tracing(
        config
            .as_ref()
            .ok()
            .and_then(FluentConfig::log_filter),
    );
    let config = config?;

    let args: Vec<String> = env::args().skip(1).collect();
    let scenario = Scenario::from_args(&args)?;
    tracing::debug!(?scenario, "Running scenario");

    let settings = ChainSettings {
        diagnostics: config.diagnostics(),
        context: config.default_context().map(str::to_owned),
    };
    let lines = scenario.run(&settings)?;

    let mut out = io::stdout().lock();
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}
