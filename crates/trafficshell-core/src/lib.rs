//! # trafficshell-core
//!
//! Reservation helpers and the traffic-generator controller lifecycle for
//! lab-orchestration shells.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   host platform                          │
//! └──────────────────────────────────────────────────────────┘
//!                           │ driver commands
//!                           ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                  trafficshell-core                       │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌────────────────────┐     ┌─────────────────────────┐  │
//! │  │ TgControllerDriver │────▶│ TgControllerHandler     │  │
//! │  │  - initialize()    │     │ (IxNetwork, STC, ...)   │  │
//! │  │  - keep_alive()    │     └─────────────────────────┘  │
//! │  │  - start_traffic() │                 │                │
//! │  └────────────────────┘                 ▼                │
//! │  ┌────────────────────┐     ┌─────────────────────────┐  │
//! │  │ ShellContext       │────▶│ polling / attributes /  │  │
//! │  │  - reservation_id  │     │ reservation queries     │  │
//! │  │  - resolve_session │     └─────────────────────────┘  │
//! │  └────────────────────┘                 │                │
//! └─────────────────────────────────────────┼────────────────┘
//!                                           ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │        trafficshell-api: AutomationApi / ApiConnector    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use trafficshell_core::{wait_for_services, PollOptions, ShellContext};
//!
//! # async fn example(ctx: ShellContext, connector: &dyn trafficshell_api::ApiConnector)
//! #     -> trafficshell_core::Result<()> {
//! let session = trafficshell_core::resolve_session(&ctx, connector).await?;
//! let reservation_id = ctx.reservation_id()?;
//!
//! // Block until the controller service shows up in the reservation
//! wait_for_services(session.as_ref(), &reservation_id, "IxNetwork Controller", PollOptions::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Context Resolution**: Session and reservation ID from any context shape
//! - **Namespaced Attributes**: Plain, model- and family-qualified attribute names
//! - **Polling**: Wait for resources, services, connectors and attribute values
//! - **Controller Lifecycle**: Driver shell with cancellable keep-alive
//! - **Reservation Output**: Forward log events to the reservation output window

mod attributes;
mod config;
mod context;
mod controller;
mod error;
mod logging;
mod output;
mod polling;
mod reservation;
pub mod tg;

pub use attributes::{
    add_resource_to_db, attribute_candidates, context_attribute, find_attribute,
    get_family_attribute, set_family_attribute,
};
pub use config::{
    ConfigError, PollOptions, ShellConfig, ShellConfigBuilder, DEFAULT_LOG_GROUP,
    DEFAULT_PORT_MODEL,
};
pub use context::{get_reservation_description, resolve_session, SandboxHandle, ShellContext};
pub use controller::{
    ConnectionDetails, ControllerHandlerBase, ControllerState, TgControllerDriver,
    TgControllerHandler,
};
pub use error::{CoreError, Result};
pub use logging::{env_filter, init as init_logging, ShellLogger};
pub use output::ReservationOutputLayer;
pub use polling::{
    wait_for_attribute, wait_for_connectors, wait_for_resources, wait_for_services, Names,
};
pub use reservation::{get_location, get_resources_from_reservation, get_services_from_reservation};
pub use tokio_util::sync::CancellationToken;
