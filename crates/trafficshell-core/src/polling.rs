//! Wait for entities and attribute values to show up in a reservation.
//!
//! Every attempt is a live round trip to the platform. A poll makes
//! `timeout + 1` attempts and sleeps a constant interval between them.

use crate::config::PollOptions;
use crate::error::{CoreError, Result};
use tokio::time::Instant;
use trafficshell_api::{AutomationApi, ReservationDescription};

/// One or more entity names.
///
/// A single name converts to a one-element list so callers can pass either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Names(Vec<String>);

impl Names {
    /// Number of requested names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no names were requested.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `name` is one of the requested names.
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    /// The requested names.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for Names {
    fn from(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl From<String> for Names {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl From<Vec<String>> for Names {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl From<Vec<&str>> for Names {
    fn from(names: Vec<&str>) -> Self {
        Self(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Names {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(|n| n.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Names {
    fn from(names: [&str; N]) -> Self {
        Self(names.iter().map(|n| n.to_string()).collect())
    }
}

/// Kinds of reservation entities that can be waited for.
#[derive(Debug, Clone, Copy)]
enum EntityKind {
    Resources,
    Services,
    Connectors,
}

impl EntityKind {
    fn label(self) -> &'static str {
        match self {
            Self::Resources => "Resources",
            Self::Services => "Services",
            Self::Connectors => "Connectors",
        }
    }

    /// Number of entities in the description whose name (resources) or
    /// alias (services, connectors) is requested.
    fn count_matches(self, description: &ReservationDescription, names: &Names) -> usize {
        match self {
            Self::Resources => description
                .resources
                .iter()
                .filter(|r| names.contains(&r.name))
                .count(),
            Self::Services => description
                .services
                .iter()
                .filter(|s| names.contains(&s.alias))
                .count(),
            Self::Connectors => description
                .connectors
                .iter()
                .filter(|c| names.contains(&c.alias))
                .count(),
        }
    }
}

async fn wait_for_entities(
    api: &dyn AutomationApi,
    reservation_id: &str,
    kind: EntityKind,
    names: Names,
    options: PollOptions,
) -> Result<()> {
    let start = Instant::now();
    tracing::debug!(
        reservation_id = %reservation_id,
        kind = kind.label(),
        names = ?names.as_slice(),
        timeout = options.timeout,
        "Waiting for entities"
    );

    for attempt in 0..=options.timeout {
        let description = api.get_reservation_details(reservation_id, false).await?;
        let matched = kind.count_matches(&description, &names);
        if matched == names.len() {
            tracing::debug!(
                reservation_id = %reservation_id,
                kind = kind.label(),
                attempts = attempt + 1,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Entities present"
            );
            return Ok(());
        }
        tracing::trace!(
            attempt = attempt + 1,
            matched,
            expected = names.len(),
            "Entities not yet present"
        );
        if attempt < options.timeout {
            tokio::time::sleep(options.interval).await;
        }
    }

    tracing::warn!(
        reservation_id = %reservation_id,
        kind = kind.label(),
        names = ?names.as_slice(),
        "Timed out waiting for entities"
    );
    Err(CoreError::Timeout {
        kind: kind.label(),
        names: names.0,
        timeout: options.timeout,
    })
}

/// Wait until all named resources show in the reservation.
pub async fn wait_for_resources(
    api: &dyn AutomationApi,
    reservation_id: &str,
    resources_names: impl Into<Names>,
    options: PollOptions,
) -> Result<()> {
    wait_for_entities(
        api,
        reservation_id,
        EntityKind::Resources,
        resources_names.into(),
        options,
    )
    .await
}

/// Wait until all aliased services show in the reservation.
pub async fn wait_for_services(
    api: &dyn AutomationApi,
    reservation_id: &str,
    aliases: impl Into<Names>,
    options: PollOptions,
) -> Result<()> {
    wait_for_entities(
        api,
        reservation_id,
        EntityKind::Services,
        aliases.into(),
        options,
    )
    .await
}

/// Wait until all aliased connectors show in the reservation.
pub async fn wait_for_connectors(
    api: &dyn AutomationApi,
    reservation_id: &str,
    aliases: impl Into<Names>,
    options: PollOptions,
) -> Result<()> {
    wait_for_entities(
        api,
        reservation_id,
        EntityKind::Connectors,
        aliases.into(),
        options,
    )
    .await
}

/// Wait until a service attribute that was set is updated on the reservation.
///
/// Unlike the entity waits this returns `Ok(())` when the value never
/// matches; the timeout is only logged. The service and its attribute must
/// exist on every attempt, otherwise [`CoreError::MissingEntity`] is returned.
pub async fn wait_for_attribute(
    api: &dyn AutomationApi,
    reservation_id: &str,
    alias: &str,
    attribute_name: &str,
    attribute_value: &str,
    options: PollOptions,
) -> Result<()> {
    for attempt in 0..=options.timeout {
        let description = api.get_reservation_details(reservation_id, false).await?;
        let service = description
            .services
            .iter()
            .find(|s| s.alias == alias)
            .ok_or_else(|| CoreError::MissingEntity {
                kind: "service",
                name: alias.to_string(),
            })?;
        let current = service
            .attributes
            .iter()
            .find(|a| a.name == attribute_name)
            .ok_or_else(|| CoreError::MissingEntity {
                kind: "attribute",
                name: format!("{alias}.{attribute_name}"),
            })?;
        if current.value == attribute_value {
            tracing::debug!(alias = %alias, attribute = %attribute_name, attempts = attempt + 1, "Attribute updated");
            return Ok(());
        }
        if attempt < options.timeout {
            tokio::time::sleep(options.interval).await;
        }
    }

    tracing::warn!(
        reservation_id = %reservation_id,
        alias = %alias,
        attribute = %attribute_name,
        expected = %attribute_value,
        timeout = options.timeout,
        "Attribute not updated in time"
    );
    Ok(())
}
