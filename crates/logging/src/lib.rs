#![warn(missing_docs)]

//! Shared logging helpers and CLI argument definitions for the appmenu workspace.
//!
//! Binaries flatten [`LogArgs`] into their clap parser, turn it into a filter
//! directive with [`LogArgs::spec`], and install a subscriber with [`init`].

use std::{env, io};

use clap::Args;
use tracing_subscriber::{EnvFilter, fmt, prelude::*, registry};

/// Logging controls for CLI apps.
#[derive(Debug, Clone, Default, Args)]
pub struct LogArgs {
    /// Set global log level to trace (our crates only)
    #[arg(long, conflicts_with_all = ["debug", "log_level", "log_filter"])]
    pub trace: bool,

    /// Set global log level to debug (our crates only)
    #[arg(long, conflicts_with_all = ["trace", "log_level", "log_filter"])]
    pub debug: bool,

    /// Set a single global log level for our crates (error|warn|info|debug|trace)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Set an explicit tracing filter directive (overrides other flags)
    /// e.g. "appmenu=trace,action_group=debug"
    #[arg(long)]
    pub log_filter: Option<String>,
}

impl LogArgs {
    /// Filter spec for these flags, falling back to `RUST_LOG`.
    pub fn spec(&self) -> String {
        compute_spec(
            self.trace,
            self.debug,
            self.log_level.as_deref(),
            self.log_filter.as_deref(),
        )
    }
}

/// List of crate targets that constitute "our" logs.
pub fn our_crates() -> &'static [&'static str] {
    &[
        // Core crates
        "appmenu",
        "appmenu_bus",
        "appmenu_variant",
        "action_group",
        "appmenu_config",
        // Tools
        "appmenu_probe",
        "logging",
    ]
}

/// Build a filter directive string that sets the same `level` for all of our crates.
pub fn level_spec_for(level: &str) -> String {
    let lvl = level.to_ascii_lowercase();
    our_crates()
        .iter()
        .map(|t| format!("{}={}", t, lvl))
        .collect::<Vec<_>>()
        .join(",")
}

/// Compute the final filter spec string with precedence:
/// - `log_filter`
/// - `trace`/`debug`/`log_level` (crate-scoped)
/// - `RUST_LOG` env
/// - default to crate-scoped `info`
pub fn compute_spec(
    trace: bool,
    debug: bool,
    log_level: Option<&str>,
    log_filter: Option<&str>,
) -> String {
    spec_with_env(trace, debug, log_level, log_filter, env::var("RUST_LOG").ok())
}

/// [`compute_spec`] with the `RUST_LOG` value supplied by the caller.
fn spec_with_env(
    trace: bool,
    debug: bool,
    log_level: Option<&str>,
    log_filter: Option<&str>,
    rust_log: Option<String>,
) -> String {
    if let Some(spec) = log_filter {
        return spec.to_string();
    }
    if trace {
        return level_spec_for("trace");
    }
    if debug {
        return level_spec_for("debug");
    }
    if let Some(lvl) = log_level {
        return level_spec_for(lvl);
    }
    match rust_log {
        Some(spec) if !spec.trim().is_empty() => spec,
        _ => level_spec_for("info"),
    }
}

/// Create an `EnvFilter` from a spec string.
pub fn env_filter_from_spec(spec: &str) -> EnvFilter {
    EnvFilter::new(spec)
}

/// Install a compact stderr subscriber filtered by `spec`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init(spec: &str) {
    registry()
        .with(env_filter_from_spec(spec))
        .with(fmt::layer().with_writer(io::stderr).without_time())
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_spec_covers_every_crate() {
        let spec = level_spec_for("DEBUG");
        for krate in our_crates() {
            assert!(spec.contains(&format!("{krate}=debug")), "{spec}");
        }
        assert_eq!(spec.split(',').count(), our_crates().len());
    }

    #[test]
    fn explicit_filter_wins() {
        let spec = spec_with_env(true, false, Some("warn"), Some("appmenu=trace"), None);
        assert_eq!(spec, "appmenu=trace");
    }

    #[test]
    fn flags_beat_environment() {
        let env = Some("off".to_string());
        assert_eq!(
            spec_with_env(false, true, None, None, env.clone()),
            level_spec_for("debug")
        );
        assert_eq!(
            spec_with_env(false, false, Some("warn"), None, env),
            level_spec_for("warn")
        );
    }

    #[test]
    fn environment_then_default() {
        assert_eq!(
            spec_with_env(false, false, None, None, Some("action_group=trace".into())),
            "action_group=trace"
        );
        assert_eq!(
            spec_with_env(false, false, None, None, Some("  ".into())),
            level_spec_for("info")
        );
        assert_eq!(
            spec_with_env(false, false, None, None, None),
            level_spec_for("info")
        );
    }

    #[test]
    fn args_delegate_to_spec() {
        let args = LogArgs {
            log_level: Some("error".into()),
            ..LogArgs::default()
        };
        assert_eq!(args.spec(), level_spec_for("error"));
    }
}
