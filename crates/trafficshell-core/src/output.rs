//! Forward log events to a reservation's output window.

use crate::context::{resolve_session, ShellContext};
use crate::error::Result;
use std::fmt::{self, Write as _};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::field::{Field, Visit};
use tracing::{Event, Instrument, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;
use trafficshell_api::{ApiConnector, AutomationApi};

/// Target and span name of the forwarder; its own events are never forwarded.
const FORWARDER_TARGET: &str = "trafficshell_core::output";

/// Layer that writes every event to the reservation output.
///
/// Events are queued in order on an unbounded channel and written by a
/// background task, so emitting an event never blocks on the platform.
#[derive(Debug, Clone)]
pub struct ReservationOutputLayer {
    tx: mpsc::UnboundedSender<String>,
}

impl ReservationOutputLayer {
    /// Create the layer and spawn its forwarder task.
    ///
    /// The task ends once every clone of the layer has been dropped.
    pub fn spawn(
        api: Arc<dyn AutomationApi>,
        reservation_id: impl Into<String>,
    ) -> (Self, JoinHandle<()>) {
        let reservation_id = reservation_id.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let span = tracing::info_span!(target: FORWARDER_TARGET, "reservation_output", reservation_id = %reservation_id);
        let handle = tokio::spawn(forward(api, reservation_id, rx).instrument(span));
        (Self { tx }, handle)
    }

    /// Create the layer for the reservation and session of a context.
    pub async fn for_context(
        context: &ShellContext,
        connector: &dyn ApiConnector,
    ) -> Result<(Self, JoinHandle<()>)> {
        let reservation_id = context.reservation_id()?;
        let session = resolve_session(context, connector).await?;
        Ok(Self::spawn(session, reservation_id))
    }
}

async fn forward(
    api: Arc<dyn AutomationApi>,
    reservation_id: String,
    mut rx: mpsc::UnboundedReceiver<String>,
) {
    while let Some(entry) = rx.recv().await {
        if let Err(e) = api
            .write_message_to_reservation_output(&reservation_id, &entry)
            .await
        {
            tracing::warn!(target: FORWARDER_TARGET, error = %e, "Failed to write reservation output");
        }
    }
    tracing::trace!(target: FORWARDER_TARGET, "Reservation output forwarder stopped");
}

impl<S> Layer<S> for ReservationOutputLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        if event.metadata().target() == FORWARDER_TARGET {
            return;
        }
        // Anything the session logs while writing would loop back here
        if let Some(scope) = ctx.event_scope(event) {
            if scope
                .from_root()
                .any(|span| span.metadata().target() == FORWARDER_TARGET)
            {
                return;
            }
        }

        let mut visitor = EntryVisitor::default();
        event.record(&mut visitor);
        let _ = self.tx.send(visitor.finish());
    }
}

/// Renders an event as `message key=value ...`.
#[derive(Default)]
struct EntryVisitor {
    message: String,
    fields: String,
}

impl EntryVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields
        } else {
            format!("{} {}", self.message, self.fields)
        }
    }

    fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{name}={value}");
    }
}

impl Visit for EntryVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.push_field(field.name(), format_args!("{value}"));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.push_field(field.name(), format_args!("{value:?}"));
        }
    }
}
