//! Namespaced resource attributes.
//!
//! Second-generation shells store attributes as `<Model>.<Name>` or
//! `<Family>.<Name>`, first-generation shells as plain `<Name>`. The helpers
//! here accept the plain name and find whichever form the resource uses.

use crate::context::{resolve_session, ShellContext};
use crate::error::{CoreError, Result};
use trafficshell_api::{
    ApiConnector, Attribute, AutomationApi, ResourceContextDetails, ResourceDetails,
};

/// Domain that every resource belongs to.
const GLOBAL_DOMAIN: &str = "Global";

/// The three names an attribute may be stored under: plain, model-qualified
/// and family-qualified.
pub fn attribute_candidates(model: &str, family: &str, attribute: &str) -> [String; 3] {
    [
        attribute.to_string(),
        format!("{model}.{attribute}"),
        format!("{family}.{attribute}"),
    ]
}

/// First attribute of the resource (in the resource's order) stored under
/// any of the candidate names.
pub fn find_attribute<'a>(details: &'a ResourceDetails, attribute: &str) -> Option<&'a Attribute> {
    let candidates = attribute_candidates(
        &details.resource_model_name,
        &details.resource_family_name,
        attribute,
    );
    details
        .resource_attributes
        .iter()
        .find(|attr| candidates.contains(&attr.name))
}

/// Look up a namespaced attribute on the resource block of a command context.
pub fn context_attribute<'a>(resource: &'a ResourceContextDetails, attribute: &str) -> Option<&'a str> {
    attribute_candidates(&resource.model, &resource.family, attribute)
        .iter()
        .find_map(|name| resource.attributes.get(name))
        .map(String::as_str)
}

async fn resource_attribute(
    session: &dyn AutomationApi,
    resource_name: &str,
    attribute: &str,
) -> Result<Attribute> {
    let details = session.get_resource_details(resource_name).await?;
    find_attribute(&details, attribute)
        .cloned()
        .ok_or_else(|| CoreError::AttributeNotFound {
            resource: resource_name.to_string(),
            attribute: attribute.to_string(),
        })
}

async fn set_attribute(
    session: &dyn AutomationApi,
    resource_name: &str,
    attribute: &str,
    value: &str,
) -> Result<()> {
    let found = resource_attribute(session, resource_name, attribute).await?;
    tracing::debug!(resource = %resource_name, attribute = %found.name, "Setting attribute");
    session
        .set_attribute_value(resource_name, &found.name, value)
        .await?;
    Ok(())
}

/// Get the value of a resource attribute under whichever namespace it lives.
///
/// `attribute` is matched as given, then prefixed with the resource's model
/// and family. Passing the stored qualified name therefore works too, but a
/// name qualified with a different prefix (the family form of a
/// model-qualified attribute, say) does not resolve.
pub async fn get_family_attribute(
    context: &ShellContext,
    connector: &dyn ApiConnector,
    resource_name: &str,
    attribute: &str,
) -> Result<String> {
    let session = resolve_session(context, connector).await?;
    let found = resource_attribute(session.as_ref(), resource_name, attribute).await?;
    tracing::trace!(resource = %resource_name, attribute = %found.name, "Resolved attribute");
    Ok(found.value)
}

/// Set the value of a resource attribute under whichever namespace it lives.
///
/// Name resolution is the same as for [`get_family_attribute`]; the value is
/// written under the name the resource actually stores.
pub async fn set_family_attribute(
    context: &ShellContext,
    connector: &dyn ApiConnector,
    resource_name: &str,
    attribute: &str,
    value: &str,
) -> Result<()> {
    let session = resolve_session(context, connector).await?;
    set_attribute(session.as_ref(), resource_name, attribute, value).await
}

/// Add a resource to the resource catalogue unless one with the same full
/// name already exists.
///
/// Outside the `Global` domain the new resource is also added to the
/// reservation's domain. Each `(attribute, value)` pair is then set the way
/// [`set_family_attribute`] sets it, on the same session.
pub async fn add_resource_to_db(
    context: &ShellContext,
    connector: &dyn ApiConnector,
    resource_model: &str,
    resource_full_name: &str,
    resource_address: &str,
    attributes: &[(&str, &str)],
) -> Result<()> {
    let command = context.require_command("reservation domain")?;
    let session = resolve_session(context, connector).await?;

    let existing = session.find_resources(resource_full_name).await?;
    if !existing.is_empty() {
        tracing::debug!(resource = %resource_full_name, "Resource already exists");
        return Ok(());
    }

    tracing::info!(
        resource = %resource_full_name,
        model = %resource_model,
        address = %resource_address,
        "Creating resource"
    );
    session
        .create_resource(resource_model, resource_full_name, resource_address)
        .await?;

    let domain = &command.reservation.domain;
    if domain != GLOBAL_DOMAIN {
        session
            .add_resources_to_domain(domain, &[resource_full_name.to_string()])
            .await?;
    }

    for (attribute, value) in attributes {
        set_attribute(session.as_ref(), resource_full_name, attribute, value).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn details() -> ResourceDetails {
        ResourceDetails {
            name: "ixn".into(),
            resource_model_name: "IxNetwork Controller Shell 2G".into(),
            resource_family_name: "CS_TrafficGeneratorController".into(),
            resource_attributes: vec![
                Attribute::new("Other", "x"),
                Attribute::new("CS_TrafficGeneratorController.User", "admin"),
                Attribute::new("IxNetwork Controller Shell 2G.Address", "10.0.0.9"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_candidates() {
        let [plain, model, family] = attribute_candidates("M", "F", "User");
        assert_eq!(plain, "User");
        assert_eq!(model, "M.User");
        assert_eq!(family, "F.User");
    }

    #[test]
    fn test_find_attribute_family_and_model() {
        let details = details();
        assert_eq!(find_attribute(&details, "User").unwrap().value, "admin");
        assert_eq!(find_attribute(&details, "Address").unwrap().value, "10.0.0.9");
        assert_eq!(find_attribute(&details, "Other").unwrap().value, "x");
        assert!(find_attribute(&details, "Password").is_none());
    }

    #[test]
    fn test_context_attribute() {
        let resource = ResourceContextDetails {
            model: "STC Controller Shell 2G".into(),
            family: "CS_TrafficGeneratorController".into(),
            attributes: HashMap::from([(
                "STC Controller Shell 2G.Password".to_string(),
                "enc".to_string(),
            )]),
            ..Default::default()
        };
        assert_eq!(context_attribute(&resource, "Password"), Some("enc"));
        assert_eq!(context_attribute(&resource, "User"), None);
    }
}
