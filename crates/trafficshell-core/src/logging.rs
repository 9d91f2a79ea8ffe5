//! Logger configuration for controller drivers.
//!
//! A [`ShellLogger`] is built per driver and passed explicitly to handlers;
//! nothing here mutates global logger state except [`init`], which installs
//! the process subscriber once.

use crate::output::ReservationOutputLayer;
use tracing::{Level, Span};
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logger scoped to one controller resource.
#[derive(Debug, Clone)]
pub struct ShellLogger {
    span: Span,
    level: Level,
    log_group: String,
    resource: String,
}

impl ShellLogger {
    /// Create a logger for a resource within a log group.
    pub fn for_resource(
        log_group: impl Into<String>,
        resource_name: impl Into<String>,
        level: Level,
    ) -> Self {
        let log_group = log_group.into();
        let resource = resource_name.into();
        let span = tracing::info_span!("tg_controller", log_group = %log_group, resource = %resource);
        Self {
            span,
            level,
            log_group,
            resource,
        }
    }

    /// Span that driver and handler work runs in.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Level the logger is set to.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Log group name.
    pub fn log_group(&self) -> &str {
        &self.log_group
    }

    /// Resource the logger is scoped to.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Filter that applies this logger's level to the library and to the
    /// given third-party packages, leaving everything else at `warn`.
    pub fn env_filter(&self, packages: &[&str]) -> EnvFilter {
        env_filter(self.level, packages)
    }
}

/// Build a filter with `trafficshell_core` and every package in `packages`
/// at `level`, everything else at `warn`.
pub fn env_filter(level: Level, packages: &[&str]) -> EnvFilter {
    let level_name = level.as_str().to_ascii_lowercase();
    let mut filter = EnvFilter::default().add_directive(LevelFilter::WARN.into());
    for target in std::iter::once("trafficshell_core").chain(packages.iter().copied()) {
        match format!("{target}={level_name}").parse::<Directive>() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => tracing::warn!(package = %target, error = %e, "Ignoring invalid log target"),
        }
    }
    filter
}

/// Install the process-wide subscriber: stderr formatting plus, optionally,
/// forwarding to a reservation's output.
pub fn init(filter: EnvFilter, output: Option<ReservationOutputLayer>) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(output)
        .try_init()
}
