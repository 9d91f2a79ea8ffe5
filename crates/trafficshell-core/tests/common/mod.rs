//! In-memory automation API used by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use trafficshell_api::{
    ApiConnector, ApiError, Attribute, AutomationApi, CommandTarget, Connectivity, Connector,
    ReservationAttachments, ReservationContextDetails, ReservationDescription,
    ReservedResource, ResourceCommandContext, ResourceContextDetails, ResourceDetails,
    ResourceSummary, ServiceInstance, SessionParams,
};

pub const DECRYPTED_PASSWORD: &str = "decrypted-secret";

/// Recorded calls and canned replies.
#[derive(Debug, Default)]
pub struct FakeState {
    /// Replies to `get_reservation_details`, in order; the last one repeats.
    pub descriptions: VecDeque<ReservationDescription>,
    pub detail_calls: usize,
    pub disable_cache_flags: Vec<bool>,
    pub resources: HashMap<String, ResourceDetails>,
    pub set_calls: Vec<(String, String, String)>,
    pub messages: Vec<(String, String)>,
    pub enqueued: Vec<(String, String, CommandTarget, String)>,
    pub decrypt_calls: usize,
    pub existing: Vec<String>,
    pub created: Vec<(String, String, String)>,
    pub domain_adds: Vec<(String, Vec<String>)>,
}

#[derive(Debug, Default)]
pub struct FakeApi {
    pub state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_descriptions(descriptions: Vec<ReservationDescription>) -> Arc<Self> {
        let api = Self::default();
        api.state.lock().unwrap().descriptions = descriptions.into();
        Arc::new(api)
    }

    pub fn add_resource(&self, details: ResourceDetails) {
        self.state
            .lock()
            .unwrap()
            .resources
            .insert(details.name.clone(), details);
    }

    pub fn detail_calls(&self) -> usize {
        self.state.lock().unwrap().detail_calls
    }

    pub fn messages(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .messages
            .iter()
            .map(|(_, m)| m.clone())
            .collect()
    }
}

#[async_trait]
impl AutomationApi for FakeApi {
    async fn get_reservation_details(
        &self,
        reservation_id: &str,
        disable_cache: bool,
    ) -> trafficshell_api::Result<ReservationDescription> {
        let mut state = self.state.lock().unwrap();
        state.detail_calls += 1;
        state.disable_cache_flags.push(disable_cache);
        let description = if state.descriptions.len() > 1 {
            state.descriptions.pop_front()
        } else {
            state.descriptions.front().cloned()
        };
        description.ok_or_else(|| ApiError::not_found("reservation", reservation_id))
    }

    async fn get_resource_details(
        &self,
        resource_full_path: &str,
    ) -> trafficshell_api::Result<ResourceDetails> {
        self.state
            .lock()
            .unwrap()
            .resources
            .get(resource_full_path)
            .cloned()
            .ok_or_else(|| ApiError::not_found("resource", resource_full_path))
    }

    async fn set_attribute_value(
        &self,
        resource_full_path: &str,
        attribute_name: &str,
        attribute_value: &str,
    ) -> trafficshell_api::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.set_calls.push((
            resource_full_path.to_string(),
            attribute_name.to_string(),
            attribute_value.to_string(),
        ));
        let details = state
            .resources
            .get_mut(resource_full_path)
            .ok_or_else(|| ApiError::not_found("resource", resource_full_path))?;
        let attribute = details
            .resource_attributes
            .iter_mut()
            .find(|a| a.name == attribute_name)
            .ok_or_else(|| ApiError::not_found("attribute", attribute_name))?;
        attribute.value = attribute_value.to_string();
        Ok(())
    }

    async fn decrypt_password(&self, encrypted: &str) -> trafficshell_api::Result<String> {
        self.state.lock().unwrap().decrypt_calls += 1;
        if encrypted.is_empty() {
            return Err(ApiError::Remote {
                code: 100,
                message: "nothing to decrypt".into(),
            });
        }
        Ok(DECRYPTED_PASSWORD.to_string())
    }

    async fn enqueue_command(
        &self,
        reservation_id: &str,
        target_name: &str,
        target_type: CommandTarget,
        command_name: &str,
    ) -> trafficshell_api::Result<()> {
        self.state.lock().unwrap().enqueued.push((
            reservation_id.to_string(),
            target_name.to_string(),
            target_type,
            command_name.to_string(),
        ));
        Ok(())
    }

    async fn write_message_to_reservation_output(
        &self,
        reservation_id: &str,
        message: &str,
    ) -> trafficshell_api::Result<()> {
        self.state
            .lock()
            .unwrap()
            .messages
            .push((reservation_id.to_string(), message.to_string()));
        Ok(())
    }

    async fn find_resources(
        &self,
        resource_full_name: &str,
    ) -> trafficshell_api::Result<Vec<ResourceSummary>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .existing
            .iter()
            .filter(|name| name.as_str() == resource_full_name)
            .map(|name| ResourceSummary {
                name: name.clone(),
                full_name: name.clone(),
                ..Default::default()
            })
            .collect())
    }

    async fn create_resource(
        &self,
        resource_model: &str,
        resource_name: &str,
        resource_address: &str,
    ) -> trafficshell_api::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.created.push((
            resource_model.to_string(),
            resource_name.to_string(),
            resource_address.to_string(),
        ));
        state.resources.insert(
            resource_name.to_string(),
            ResourceDetails {
                name: resource_name.to_string(),
                address: resource_address.to_string(),
                resource_model_name: resource_model.to_string(),
                resource_family_name: "CS_Generic".to_string(),
                resource_attributes: vec![
                    Attribute::new(format!("{resource_model}.User"), ""),
                    Attribute::new(format!("{resource_model}.Password"), ""),
                ],
            },
        );
        Ok(())
    }

    async fn add_resources_to_domain(
        &self,
        domain: &str,
        resource_names: &[String],
    ) -> trafficshell_api::Result<()> {
        self.state
            .lock()
            .unwrap()
            .domain_adds
            .push((domain.to_string(), resource_names.to_vec()));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeAttachments {
    pub logged_in: AtomicBool,
    pub files: Mutex<BTreeMap<(String, String), Vec<u8>>>,
}

#[async_trait]
impl ReservationAttachments for FakeAttachments {
    async fn login(&self) -> trafficshell_api::Result<()> {
        self.logged_in.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn attach_new_file(
        &self,
        reservation_id: &str,
        file_data: &[u8],
        file_name: &str,
    ) -> trafficshell_api::Result<()> {
        if !self.logged_in.load(Ordering::SeqCst) {
            return Err(ApiError::Login("not logged in".into()));
        }
        self.files.lock().unwrap().insert(
            (reservation_id.to_string(), file_name.to_string()),
            file_data.to_vec(),
        );
        Ok(())
    }

    async fn get_attached_files(&self, reservation_id: &str) -> trafficshell_api::Result<Vec<String>> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .keys()
            .filter(|(id, _)| id == reservation_id)
            .map(|(_, name)| name.clone())
            .collect())
    }

    async fn get_attached_file(
        &self,
        reservation_id: &str,
        file_name: &str,
    ) -> trafficshell_api::Result<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(&(reservation_id.to_string(), file_name.to_string()))
            .cloned()
            .ok_or_else(|| ApiError::not_found("file", file_name))
    }
}

/// Connector handing out the same fake session for every request.
#[derive(Debug, Default)]
pub struct FakeConnector {
    pub api: Arc<FakeApi>,
    pub attachments: Arc<FakeAttachments>,
    pub opened: Mutex<Vec<SessionParams>>,
    pub command_sessions: AtomicUsize,
}

impl FakeConnector {
    pub fn new(api: Arc<FakeApi>) -> Self {
        Self {
            api,
            ..Default::default()
        }
    }

    pub fn opened(&self) -> Vec<SessionParams> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApiConnector for FakeConnector {
    async fn open_session(
        &self,
        params: &SessionParams,
    ) -> trafficshell_api::Result<Arc<dyn AutomationApi>> {
        if params.host.is_empty() {
            return Err(ApiError::Connection("no server address".into()));
        }
        self.opened.lock().unwrap().push(params.clone());
        Ok(self.api.clone() as Arc<dyn AutomationApi>)
    }

    async fn session_for_command(
        &self,
        context: &ResourceCommandContext,
    ) -> trafficshell_api::Result<Arc<dyn AutomationApi>> {
        self.command_sessions.fetch_add(1, Ordering::SeqCst);
        self.open_session(&SessionParams::from_command(context)).await
    }

    async fn open_attachments(
        &self,
        server_address: &str,
        _admin_token: &str,
    ) -> trafficshell_api::Result<Arc<dyn ReservationAttachments>> {
        if server_address.is_empty() {
            return Err(ApiError::Connection("no server address".into()));
        }
        Ok(self.attachments.clone() as Arc<dyn ReservationAttachments>)
    }
}

// ============================================================================
// Builders
// ============================================================================

pub fn new_reservation_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn command_context(reservation_id: &str, domain: &str) -> ResourceCommandContext {
    ResourceCommandContext {
        connectivity: Connectivity {
            server_address: "192.168.65.10".into(),
            admin_auth_token: "admin-token".into(),
            cloudshell_api_port: "8029".into(),
            quali_api_port: "9000".into(),
        },
        reservation: ReservationContextDetails {
            reservation_id: reservation_id.into(),
            domain: domain.into(),
            environment_name: "traffic test".into(),
            owner_user: "admin".into(),
        },
        resource: ResourceContextDetails {
            name: "IxNetwork Controller".into(),
            address: "192.168.65.20".into(),
            model: "IxNetwork Controller Shell 2G".into(),
            family: "CS_TrafficGeneratorController".into(),
            attributes: HashMap::from([
                (
                    "IxNetwork Controller Shell 2G.User".to_string(),
                    "admin".to_string(),
                ),
                (
                    "IxNetwork Controller Shell 2G.Password".to_string(),
                    "encrypted==".to_string(),
                ),
            ]),
        },
    }
}

pub fn resource(name: &str, model: &str) -> ReservedResource {
    ReservedResource {
        name: name.into(),
        full_address: format!("10.0.0.1/{name}"),
        resource_model_name: model.into(),
        resource_family_name: "CS_TrafficGeneratorPort".into(),
    }
}

pub fn service(alias: &str, attributes: &[(&str, &str)]) -> ServiceInstance {
    ServiceInstance {
        service_name: format!("{alias} service"),
        alias: alias.into(),
        attributes: attributes
            .iter()
            .map(|(n, v)| Attribute::new(*n, *v))
            .collect(),
    }
}

pub fn connector(alias: &str) -> Connector {
    Connector {
        source: "a".into(),
        target: "b".into(),
        alias: alias.into(),
        direction: "Bi".into(),
    }
}

pub fn description_with_resources(names: &[&str]) -> ReservationDescription {
    ReservationDescription {
        resources: names
            .iter()
            .map(|n| resource(n, "Generic Traffic Generator Port"))
            .collect(),
        ..Default::default()
    }
}
