//! Queries over the live reservation description.

use crate::context::{get_reservation_description, ShellContext};
use crate::error::Result;
use regex::Regex;
use std::sync::OnceLock;
use trafficshell_api::{ApiConnector, ReservedResource, ServiceInstance};

/// Get all resources whose model name is one of `resource_models`.
pub async fn get_resources_from_reservation(
    context: &ShellContext,
    connector: &dyn ApiConnector,
    resource_models: &[&str],
) -> Result<Vec<ReservedResource>> {
    let description = get_reservation_description(context, connector).await?;
    Ok(description
        .resources
        .into_iter()
        .filter(|r| resource_models.contains(&r.resource_model_name.as_str()))
        .collect())
}

/// Get all services whose service name is one of `service_names`.
pub async fn get_services_from_reservation(
    context: &ShellContext,
    connector: &dyn ApiConnector,
    service_names: &[&str],
) -> Result<Vec<ServiceInstance>> {
    let description = get_reservation_description(context, connector).await?;
    Ok(description
        .services
        .into_iter()
        .filter(|s| service_names.contains(&s.service_name.as_str()))
        .collect())
}

fn location_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"M|PG[0-9]+/|P").expect("valid location regex"))
}

/// Port location in `ip/module/port` form, extracted from the port's full
/// address (`192.168.1.1/M1/P2` becomes `192.168.1.1/1/2`).
pub fn get_location(port_resource: &ReservedResource) -> String {
    location_pattern()
        .replace_all(&port_resource.full_address, "")
        .into_owned()
}
