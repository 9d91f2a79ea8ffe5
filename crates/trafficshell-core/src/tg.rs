//! Traffic-generator shell helpers: model names, port discovery, keep-alive
//! scheduling and statistics attachments.

use crate::context::{resolve_session, ShellContext};
use crate::error::{CoreError, Result};
use chrono::{DateTime, Local, TimeZone};
use trafficshell_api::{
    ApiConnector, AutomationApi, CommandTarget, ReservedResource, ResourceCommandContext,
    SessionParams,
};

pub const TGN_CHASSIS_FAMILY: &str = "CS_TrafficGeneratorChassis";
pub const TGN_CONTROLLER_FAMILY: &str = "CS_TrafficGeneratorController";
pub const TGN_PORT_FAMILY: &str = "CS_TrafficGeneratorPort";

pub const BREAKINGPOINT_CHASSIS_MODEL: &str = "BreakingPoint Chassis Shell 2G";
pub const BREAKINGPOINT_CONTROLLER_MODEL: &str = "BreakingPoint Controller Shell 2G";
pub const BYTEBLOWER_CHASSIS_MODEL: &str = "ByteBlower Chassis Shell 2G";
pub const BYTEBLOWER_CONTROLLER_MODEL: &str = "ByteBlower Controller Shell 2G";
pub const IXIA_CHASSIS_MODEL: &str = "Ixia Chassis Shell 2G";
pub const IXLOAD_CONTROLLER_MODEL: &str = "IxLoad Controller Shell 2G";
pub const IXNETWORK_CONTROLLER_MODEL: &str = "IxNetwork Controller Shell 2G";
pub const PERFECT_STORM_CHASSIS_MODEL: &str = "PerfectStorm Chassis Shell 2G";
pub const STC_CHASSIS_MODEL: &str = "STC Chassis Shell 2G";
pub const STC_CONTROLLER_MODEL: &str = "STC Controller Shell 2G";
pub const XENA_CHASSIS_MODEL: &str = "Xena Chassis Shell 2G";
pub const XENA_CONTROLLER_MODEL: &str = "Xena Controller Shell 2G";

/// Name of the command the platform runs to keep a controller service alive.
pub const KEEP_ALIVE_COMMAND: &str = "keep_alive";

/// Whether a `blocking` command parameter means true.
pub fn is_blocking(blocking: &str) -> bool {
    blocking.eq_ignore_ascii_case("true")
}

/// All resources of the given port model in the reservation.
pub async fn get_reservation_ports(
    api: &dyn AutomationApi,
    reservation_id: &str,
    model_name: &str,
) -> Result<Vec<ReservedResource>> {
    let description = api.get_reservation_details(reservation_id, false).await?;
    Ok(description
        .resources
        .into_iter()
        .filter(|r| r.resource_model_name == model_name)
        .collect())
}

/// Ask the platform to run `keep_alive` on the context's resource.
///
/// The command is only queued; the platform schedules it.
pub async fn enqueue_keep_alive(
    command: &ResourceCommandContext,
    connector: &dyn ApiConnector,
) -> Result<()> {
    let reservation_id = command.reservation.reservation_id.clone();
    if reservation_id.is_empty() {
        return Err(CoreError::Resolution {
            what: "reservation ID",
            shape: "command",
        });
    }
    let params = SessionParams::new(
        &command.connectivity.server_address,
        &command.connectivity.admin_auth_token,
        &command.reservation.domain,
    );
    let session = connector.open_session(&params).await?;
    tracing::debug!(
        reservation_id = %reservation_id,
        resource = %command.resource.name,
        "Enqueuing keep alive"
    );
    session
        .enqueue_command(
            &reservation_id,
            &command.resource.name,
            CommandTarget::Service,
            KEEP_ALIVE_COMMAND,
        )
        .await?;
    Ok(())
}

/// File name for an attached statistics view:
/// `<view name>_<ctime>.<suffix>` with spaces replaced by underscores.
pub fn stats_file_name<Tz>(view_name: &str, timestamp: &DateTime<Tz>, suffix: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let ctime = timestamp.format("%a %b %e %H:%M:%S %Y").to_string();
    format!(
        "{}_{}.{}",
        view_name.replace(' ', "_"),
        ctime.replace(' ', "_"),
        suffix
    )
}

/// Attach a statistics view to the reservation and announce it in the
/// reservation output. Returns the attached file name.
pub async fn attach_stats_csv(
    context: &ShellContext,
    connector: &dyn ApiConnector,
    view_name: &str,
    output: &str,
    suffix: &str,
) -> Result<String> {
    let command = context.require_command("connectivity")?;
    let reservation_id = context.reservation_id()?;

    let attachments = connector
        .open_attachments(
            &command.connectivity.server_address,
            &command.connectivity.admin_auth_token,
        )
        .await?;
    attachments.login().await?;

    let file_name = stats_file_name(view_name, &Local::now(), suffix);
    tracing::info!(reservation_id = %reservation_id, file = %file_name, "Attaching statistics");
    attachments
        .attach_new_file(&reservation_id, output.as_bytes(), &file_name)
        .await?;

    let session = resolve_session(context, connector).await?;
    session
        .write_message_to_reservation_output(
            &reservation_id,
            &format!("Statistics view saved in attached file - {file_name}"),
        )
        .await?;
    Ok(file_name)
}
