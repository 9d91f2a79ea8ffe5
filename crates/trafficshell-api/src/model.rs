//! Data model of the automation API replies and host-supplied contexts.
//!
//! Field names follow the platform's PascalCase wire naming for API replies
//! and snake_case for the driver contexts handed over by the host.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A named attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Attribute {
    /// Attribute name, possibly model- or family-qualified.
    pub name: String,
    /// Attribute value as stored by the platform.
    pub value: String,
}

impl Attribute {
    /// Create a new attribute.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A resource reserved in a reservation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ReservedResource {
    /// Resource name (full path for sub-resources).
    pub name: String,
    /// Full address, e.g. `192.168.1.1/M1/P2`.
    pub full_address: String,
    /// Resource model.
    pub resource_model_name: String,
    /// Resource family.
    pub resource_family_name: String,
}

/// A service instance in a reservation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServiceInstance {
    /// Service model name.
    pub service_name: String,
    /// Alias of the service in this reservation.
    pub alias: String,
    /// Current attribute values.
    pub attributes: Vec<Attribute>,
}

/// A connector (link) between two reservation entities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Connector {
    /// Source endpoint.
    pub source: String,
    /// Target endpoint.
    pub target: String,
    /// Connector alias.
    pub alias: String,
    /// Link direction (`Uni` or `Bi`).
    pub direction: String,
}

/// Live description of a reservation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ReservationDescription {
    /// Reservation ID.
    pub id: String,
    /// Reservation name.
    pub name: String,
    /// Domain the reservation belongs to.
    pub domain_name: String,
    /// Reservation owner.
    pub owner: String,
    /// Reserved resources.
    pub resources: Vec<ReservedResource>,
    /// Service instances.
    pub services: Vec<ServiceInstance>,
    /// Connectors between resources and services.
    pub connectors: Vec<Connector>,
}

/// Details of a single resource from the resource catalogue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ResourceDetails {
    /// Resource name.
    pub name: String,
    /// Resource address.
    pub address: String,
    /// Resource model.
    pub resource_model_name: String,
    /// Resource family.
    pub resource_family_name: String,
    /// Attributes in the order the platform returns them.
    pub resource_attributes: Vec<Attribute>,
}

/// Summary row returned by a resource search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ResourceSummary {
    /// Resource name.
    pub name: String,
    /// Full path of the resource.
    pub full_name: String,
    /// Resource model.
    pub resource_model_name: String,
}

/// Target type of an enqueued command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandTarget {
    /// Command defined on a resource.
    Resource,
    /// Command defined on a service.
    Service,
}

impl std::fmt::Display for CommandTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resource => write!(f, "Resource"),
            Self::Service => write!(f, "Service"),
        }
    }
}

/// Reply to a reservation creation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CreateReservationResponse {
    /// The created reservation.
    pub reservation: ReservationSummary,
}

/// Reservation block of a [`CreateReservationResponse`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ReservationSummary {
    /// Reservation ID.
    pub id: String,
    /// Reservation name.
    pub name: String,
    /// Reservation owner.
    pub owner: String,
    /// Domain the reservation belongs to.
    pub domain_name: String,
}

// ============================================================================
// Host-supplied driver contexts
// ============================================================================

/// Connectivity block of a driver context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Connectivity {
    /// Automation API server address.
    pub server_address: String,
    /// Admin token for opening sessions.
    pub admin_auth_token: String,
    /// Automation API port.
    pub cloudshell_api_port: String,
    /// REST API port (file attachments).
    pub quali_api_port: String,
}

/// Reservation block of a resource command context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservationContextDetails {
    /// Reservation ID.
    pub reservation_id: String,
    /// Domain of the reservation.
    pub domain: String,
    /// Blueprint the reservation was created from.
    pub environment_name: String,
    /// Reservation owner.
    pub owner_user: String,
}

/// Resource block of a resource command context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceContextDetails {
    /// Resource name.
    pub name: String,
    /// Resource address.
    pub address: String,
    /// Resource model.
    pub model: String,
    /// Resource family.
    pub family: String,
    /// Attribute values keyed by stored (possibly qualified) name.
    pub attributes: HashMap<String, String>,
}

/// Context passed by the host when it executes a resource or service command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceCommandContext {
    /// Server connectivity.
    pub connectivity: Connectivity,
    /// Reservation the command runs in.
    pub reservation: ReservationContextDetails,
    /// Resource the command runs on.
    pub resource: ResourceContextDetails,
}

/// Reservation block of an orchestration context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestrationReservation {
    /// Reservation ID.
    pub id: String,
    /// Domain of the reservation.
    pub domain: String,
    /// Blueprint the reservation was created from.
    pub environment_name: String,
}

/// Context passed to orchestration scripts (setup, teardown and the like).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestrationContext {
    /// Server connectivity.
    pub connectivity: Connectivity,
    /// Reservation the script runs in.
    pub reservation: OrchestrationReservation,
}

// ============================================================================
// Inventory (autoload) results
// ============================================================================

/// A sub-resource discovered during inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryResource {
    /// Model of the sub-resource.
    pub model: String,
    /// Sub-resource name.
    pub name: String,
    /// Address relative to the parent resource.
    pub relative_address: String,
    /// Stable identifier used to match existing resources.
    pub unique_identifier: String,
}

/// An attribute value discovered during inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryAttribute {
    /// Address of the sub-resource the attribute belongs to.
    pub relative_address: String,
    /// Attribute name.
    pub attribute_name: String,
    /// Attribute value.
    pub attribute_value: String,
}

/// Result of a controller or chassis inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    /// Discovered sub-resources.
    pub resources: Vec<InventoryResource>,
    /// Discovered attribute values.
    pub attributes: Vec<InventoryAttribute>,
}
