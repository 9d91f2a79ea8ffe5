//! Session traits for the automation API.
//!
//! The platform's remote session, its REST attachment client and the way
//! both are opened from connectivity data are modelled as traits so that the
//! helpers in `trafficshell-core` stay independent of the transport.

use crate::error::Result;
use crate::model::{
    CommandTarget, ReservationDescription, ResourceCommandContext, ResourceDetails,
    ResourceSummary,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Default port of the automation API.
pub const DEFAULT_API_PORT: &str = "8029";

/// Remote automation API session.
///
/// Every call is a round trip to the platform; implementations must not
/// cache reservation state.
#[async_trait]
pub trait AutomationApi: Send + Sync {
    /// Fetch the live description of a reservation.
    async fn get_reservation_details(
        &self,
        reservation_id: &str,
        disable_cache: bool,
    ) -> Result<ReservationDescription>;

    /// Fetch catalogue details of a resource.
    async fn get_resource_details(&self, resource_full_path: &str) -> Result<ResourceDetails>;

    /// Set the value of a (fully qualified) resource attribute.
    async fn set_attribute_value(
        &self,
        resource_full_path: &str,
        attribute_name: &str,
        attribute_value: &str,
    ) -> Result<()>;

    /// Decrypt a password attribute value.
    async fn decrypt_password(&self, encrypted: &str) -> Result<String>;

    /// Queue a command for asynchronous execution by the platform.
    async fn enqueue_command(
        &self,
        reservation_id: &str,
        target_name: &str,
        target_type: CommandTarget,
        command_name: &str,
    ) -> Result<()>;

    /// Append a message to the reservation output window.
    async fn write_message_to_reservation_output(
        &self,
        reservation_id: &str,
        message: &str,
    ) -> Result<()>;

    /// Find resources by full name.
    async fn find_resources(&self, resource_full_name: &str) -> Result<Vec<ResourceSummary>>;

    /// Create a new resource in the resource catalogue.
    async fn create_resource(
        &self,
        resource_model: &str,
        resource_name: &str,
        resource_address: &str,
    ) -> Result<()>;

    /// Add resources to a domain.
    async fn add_resources_to_domain(&self, domain: &str, resource_names: &[String]) -> Result<()>;
}

/// REST client for reservation file attachments.
#[async_trait]
pub trait ReservationAttachments: Send + Sync {
    /// Authenticate against the REST API.
    async fn login(&self) -> Result<()>;

    /// Attach a new file to a reservation.
    async fn attach_new_file(
        &self,
        reservation_id: &str,
        file_data: &[u8],
        file_name: &str,
    ) -> Result<()>;

    /// List the names of files attached to a reservation.
    async fn get_attached_files(&self, reservation_id: &str) -> Result<Vec<String>>;

    /// Download an attached file.
    async fn get_attached_file(&self, reservation_id: &str, file_name: &str) -> Result<Vec<u8>>;
}

/// Parameters for opening a session from raw connectivity data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParams {
    /// Server address.
    pub host: String,
    /// Admin token.
    pub token_id: String,
    /// Domain to log into.
    pub domain: String,
    /// API port (`None` uses [`DEFAULT_API_PORT`]).
    pub port: Option<String>,
}

impl SessionParams {
    /// Create session parameters with the default API port.
    pub fn new(
        host: impl Into<String>,
        token_id: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            token_id: token_id.into(),
            domain: domain.into(),
            port: None,
        }
    }

    /// Session parameters carried by a resource command context, including
    /// its API port.
    pub fn from_command(context: &ResourceCommandContext) -> Self {
        let port = Some(context.connectivity.cloudshell_api_port.clone()).filter(|p| !p.is_empty());
        Self {
            host: context.connectivity.server_address.clone(),
            token_id: context.connectivity.admin_auth_token.clone(),
            domain: context.reservation.domain.clone(),
            port,
        }
    }

    /// The port to connect to.
    pub fn port(&self) -> &str {
        self.port.as_deref().unwrap_or(DEFAULT_API_PORT)
    }
}

/// Opens automation sessions and attachment clients.
#[async_trait]
pub trait ApiConnector: Send + Sync {
    /// Open a session from raw connectivity fields.
    async fn open_session(&self, params: &SessionParams) -> Result<Arc<dyn AutomationApi>>;

    /// Open a session for the command context the host handed over.
    async fn session_for_command(
        &self,
        context: &ResourceCommandContext,
    ) -> Result<Arc<dyn AutomationApi>> {
        self.open_session(&SessionParams::from_command(context)).await
    }

    /// Open the REST attachment client for a server.
    async fn open_attachments(
        &self,
        server_address: &str,
        admin_token: &str,
    ) -> Result<Arc<dyn ReservationAttachments>>;
}
