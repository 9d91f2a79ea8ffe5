//! Session and reservation ID resolution across context shapes.

mod common;

use common::{command_context, new_reservation_id, FakeApi, FakeConnector};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use trafficshell_api::{
    AutomationApi, Connectivity, CreateReservationResponse, OrchestrationContext,
    OrchestrationReservation, ReservationDescription, ReservationSummary,
};
use trafficshell_core::{get_reservation_description, resolve_session, SandboxHandle, ShellContext};

fn orchestration_context(reservation_id: &str) -> OrchestrationContext {
    OrchestrationContext {
        connectivity: Connectivity {
            server_address: "192.168.65.10".into(),
            admin_auth_token: "orch-token".into(),
            ..Default::default()
        },
        reservation: OrchestrationReservation {
            id: reservation_id.into(),
            domain: "Lab".into(),
            ..Default::default()
        },
    }
}

#[tokio::test]
async fn test_sandbox_uses_its_own_session() {
    let connector = FakeConnector::new(FakeApi::new());
    let own_dyn: Arc<dyn AutomationApi> = FakeApi::new();
    let ctx = ShellContext::from(SandboxHandle::new("sb-1", own_dyn.clone()));

    let session = resolve_session(&ctx, &connector).await.expect("sandbox session");
    assert!(Arc::ptr_eq(&session, &own_dyn));
    assert!(connector.opened().is_empty());
    assert_eq!(ctx.reservation_id().unwrap(), "sb-1");
}

#[tokio::test]
async fn test_command_context_uses_context_aware_factory() {
    let connector = FakeConnector::new(FakeApi::new());
    let reservation_id = new_reservation_id();
    let ctx = ShellContext::from(command_context(&reservation_id, "Global"));

    resolve_session(&ctx, &connector).await.expect("command session");
    assert_eq!(connector.command_sessions.load(Ordering::SeqCst), 1);
    let opened = connector.opened();
    assert_eq!(opened.len(), 1);
    assert_eq!(opened[0].host, "192.168.65.10");
    assert_eq!(opened[0].token_id, "admin-token");
    assert_eq!(opened[0].domain, "Global");
    assert_eq!(ctx.reservation_id().unwrap(), reservation_id);
}

#[tokio::test]
async fn test_orchestration_context_uses_connectivity_fields() {
    let connector = FakeConnector::new(FakeApi::new());
    let ctx = ShellContext::from(orchestration_context("orch-1"));

    resolve_session(&ctx, &connector).await.expect("orchestration session");
    assert_eq!(connector.command_sessions.load(Ordering::SeqCst), 0);
    let opened = connector.opened();
    assert_eq!(opened[0].token_id, "orch-token");
    assert_eq!(opened[0].domain, "Lab");
    assert_eq!(opened[0].port, None);
    assert_eq!(ctx.reservation_id().unwrap(), "orch-1");
}

#[tokio::test]
async fn test_reservation_reply_has_id_but_no_session() {
    let connector = FakeConnector::new(FakeApi::new());
    let ctx = ShellContext::from(CreateReservationResponse {
        reservation: ReservationSummary {
            id: "new-res".into(),
            name: "testing 1 2 3".into(),
            ..Default::default()
        },
    });

    assert_eq!(ctx.reservation_id().unwrap(), "new-res");
    let err = resolve_session(&ctx, &connector).await.err().expect("no session");
    assert!(err.is_resolution());
}

#[tokio::test]
async fn test_missing_id_is_an_error_for_every_shape() {
    let api: Arc<dyn AutomationApi> = FakeApi::new();
    let shapes = [
        ShellContext::from(command_context("", "Global")),
        ShellContext::from(SandboxHandle::new("", api)),
        ShellContext::from(orchestration_context("")),
        ShellContext::from(CreateReservationResponse::default()),
    ];
    for ctx in shapes {
        let err = ctx.reservation_id().unwrap_err();
        assert!(err.is_resolution(), "{} context: {err}", ctx.shape());
    }
}

#[tokio::test]
async fn test_session_failure_is_propagated() {
    let connector = FakeConnector::new(FakeApi::new());
    let mut ctx = orchestration_context("orch-2");
    ctx.connectivity.server_address.clear();

    let err = resolve_session(&ShellContext::from(ctx), &connector)
        .await
        .err()
        .expect("connection error");
    assert!(matches!(err, trafficshell_core::CoreError::Api(_)));
}

#[tokio::test]
async fn test_reservation_description_bypasses_cache() {
    let api = FakeApi::with_descriptions(vec![ReservationDescription {
        id: "res-9".into(),
        ..Default::default()
    }]);
    let connector = FakeConnector::new(api.clone());
    let ctx = ShellContext::from(command_context("res-9", "Global"));

    let description = get_reservation_description(&ctx, &connector).await.unwrap();
    assert_eq!(description.id, "res-9");
    assert_eq!(api.state.lock().unwrap().disable_cache_flags, vec![true]);
}
