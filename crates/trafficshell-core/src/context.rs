//! Session and reservation identity resolution.
//!
//! The platform hands out several unrelated shapes for "the current
//! reservation". [`ShellContext`] enumerates them and each accessor maps a
//! shape to its data deterministically.

use crate::error::{CoreError, Result};
use std::fmt;
use std::sync::Arc;
use trafficshell_api::{
    ApiConnector, AutomationApi, CreateReservationResponse, OrchestrationContext,
    ReservationDescription, ResourceCommandContext, SessionParams,
};

/// An open reservation with an attached automation session.
#[derive(Clone)]
pub struct SandboxHandle {
    /// Reservation ID.
    pub id: String,
    /// Session already opened by the orchestration runtime.
    pub automation_api: Arc<dyn AutomationApi>,
}

impl SandboxHandle {
    /// Create a new sandbox handle.
    pub fn new(id: impl Into<String>, automation_api: Arc<dyn AutomationApi>) -> Self {
        Self {
            id: id.into(),
            automation_api,
        }
    }
}

impl fmt::Debug for SandboxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SandboxHandle")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Any of the context shapes the platform supplies.
#[derive(Debug, Clone)]
pub enum ShellContext {
    /// Resource or service command execution context.
    Command(ResourceCommandContext),
    /// Orchestration sandbox with an open session.
    Sandbox(SandboxHandle),
    /// Orchestration script context.
    Orchestration(OrchestrationContext),
    /// Reply to a reservation creation request.
    Reservation(CreateReservationResponse),
}

impl ShellContext {
    /// Short name of the context shape, used in errors and logs.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Command(_) => "command",
            Self::Sandbox(_) => "sandbox",
            Self::Orchestration(_) => "orchestration",
            Self::Reservation(_) => "reservation",
        }
    }

    /// The command context, if this is one.
    pub fn as_command(&self) -> Option<&ResourceCommandContext> {
        match self {
            Self::Command(ctx) => Some(ctx),
            _ => None,
        }
    }

    /// The command context or a resolution error naming `what` was wanted.
    pub fn require_command(&self, what: &'static str) -> Result<&ResourceCommandContext> {
        self.as_command().ok_or(CoreError::Resolution {
            what,
            shape: self.shape(),
        })
    }

    /// Reservation ID carried by the context.
    ///
    /// An empty ID is treated as absent.
    pub fn reservation_id(&self) -> Result<String> {
        let id = match self {
            Self::Sandbox(sandbox) => &sandbox.id,
            Self::Command(ctx) => &ctx.reservation.reservation_id,
            Self::Orchestration(ctx) => &ctx.reservation.id,
            Self::Reservation(resp) => &resp.reservation.id,
        };
        if id.is_empty() {
            return Err(CoreError::Resolution {
                what: "reservation ID",
                shape: self.shape(),
            });
        }
        Ok(id.clone())
    }
}

impl From<ResourceCommandContext> for ShellContext {
    fn from(ctx: ResourceCommandContext) -> Self {
        Self::Command(ctx)
    }
}

impl From<SandboxHandle> for ShellContext {
    fn from(sandbox: SandboxHandle) -> Self {
        Self::Sandbox(sandbox)
    }
}

impl From<OrchestrationContext> for ShellContext {
    fn from(ctx: OrchestrationContext) -> Self {
        Self::Orchestration(ctx)
    }
}

impl From<CreateReservationResponse> for ShellContext {
    fn from(resp: CreateReservationResponse) -> Self {
        Self::Reservation(resp)
    }
}

/// Get an automation session for any context shape.
///
/// - sandbox: the session it already holds
/// - command: a session built by the connector from the command context
/// - orchestration: a session opened from the raw connectivity fields
/// - reservation reply: carries no connectivity, fails with [`CoreError::Resolution`]
pub async fn resolve_session(
    context: &ShellContext,
    connector: &dyn ApiConnector,
) -> Result<Arc<dyn AutomationApi>> {
    match context {
        ShellContext::Sandbox(sandbox) => Ok(Arc::clone(&sandbox.automation_api)),
        ShellContext::Command(ctx) => {
            tracing::trace!(server = %ctx.connectivity.server_address, "Opening session for command context");
            Ok(connector.session_for_command(ctx).await?)
        }
        ShellContext::Orchestration(ctx) => {
            tracing::trace!(server = %ctx.connectivity.server_address, "Opening session from connectivity");
            let params = SessionParams::new(
                &ctx.connectivity.server_address,
                &ctx.connectivity.admin_auth_token,
                &ctx.reservation.domain,
            );
            Ok(connector.open_session(&params).await?)
        }
        ShellContext::Reservation(_) => Err(CoreError::Resolution {
            what: "session",
            shape: context.shape(),
        }),
    }
}

/// Get the live reservation description, bypassing the platform cache.
pub async fn get_reservation_description(
    context: &ShellContext,
    connector: &dyn ApiConnector,
) -> Result<ReservationDescription> {
    let reservation_id = context.reservation_id()?;
    let session = resolve_session(context, connector).await?;
    tracing::debug!(reservation_id = %reservation_id, "Fetching reservation description");
    Ok(session.get_reservation_details(&reservation_id, true).await?)
}
