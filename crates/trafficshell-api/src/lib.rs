//! # trafficshell-api
//!
//! Data model and session traits for the lab-orchestration automation API.
//!
//! The transport is supplied by the embedding shell: implement
//! [`AutomationApi`], [`ReservationAttachments`] and [`ApiConnector`] on top
//! of the platform's client and hand the connector to `trafficshell-core`.
//!
//! ## Features
//!
//! - **Reservation model**: Resources, services, connectors and attributes
//! - **Host contexts**: Command and orchestration contexts, deserializable from JSON
//! - **Session traits**: Async seams for the remote session and attachment client

mod error;
mod model;
mod session;

pub use error::{ApiError, Result};
pub use model::{
    Attribute, CommandTarget, Connectivity, Connector, CreateReservationResponse, Inventory,
    InventoryAttribute, InventoryResource, OrchestrationContext, OrchestrationReservation,
    ReservationContextDetails, ReservationDescription, ReservationSummary, ReservedResource,
    ResourceCommandContext, ResourceContextDetails, ResourceDetails, ResourceSummary,
    ServiceInstance,
};
pub use session::{
    ApiConnector, AutomationApi, ReservationAttachments, SessionParams, DEFAULT_API_PORT,
};
