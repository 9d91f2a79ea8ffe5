//! Traffic-generator controller driver lifecycle.
//!
//! [`TgControllerDriver`] is the command surface the host platform calls.
//! It tracks the controller lifecycle and forwards each command to a
//! [`TgControllerHandler`], the capability set every concrete traffic
//! generator (IxNetwork, STC, Xena, ...) supplies.
//!
//! ```text
//! Uninitialized ──initialize──▶ Initialized ──start_traffic──▶ TrafficRunning
//!                                    │                          ▲      │
//!                                    │              start_traffic   stop_traffic
//!                                    │                          │      ▼
//!                                    │                         TrafficStopped
//!                                    └──────── cleanup ───────────────▶ CleanedUp
//! ```

use crate::attributes::context_attribute;
use crate::config::ShellConfig;
use crate::error::{CoreError, Result};
use crate::logging::ShellLogger;
use crate::polling::{self, Names};
use crate::tg::{enqueue_keep_alive, get_reservation_ports};
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, OnceLock};
use tokio::sync::{Mutex, OnceCell};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span};
use trafficshell_api::{ApiConnector, Inventory, ReservedResource, ResourceCommandContext};

// ============================================================================
// Handler
// ============================================================================

/// Capabilities a traffic-generator controller must provide.
///
/// Handlers are shared between concurrently running commands, so every
/// method takes `&self`; state set during `initialize` is write-once
/// (see [`ControllerHandlerBase`]).
#[async_trait]
pub trait TgControllerHandler: Send + Sync {
    /// Bind the handler to its service and logger.
    async fn initialize(&self, context: &ResourceCommandContext, logger: ShellLogger) -> Result<()>;

    /// Release controller resources.
    async fn cleanup(&self) -> Result<()> {
        Ok(())
    }

    /// Load a traffic configuration file.
    async fn load_config(
        &self,
        context: &ResourceCommandContext,
        config_file_location: &str,
    ) -> Result<()>;

    /// Send ARP from all ports.
    async fn send_arp(&self) -> Result<()>;

    /// Start all configured protocols.
    async fn start_protocols(&self) -> Result<()>;

    /// Stop all configured protocols.
    async fn stop_protocols(&self) -> Result<()>;

    /// Start traffic; `blocking` is the raw host parameter (see [`crate::tg::is_blocking`]).
    async fn start_traffic(&self, context: &ResourceCommandContext, blocking: &str) -> Result<()>;

    /// Stop traffic on all ports.
    async fn stop_traffic(&self) -> Result<()>;

    /// Read a statistics view, rendered as requested by `output_type`.
    async fn get_statistics(
        &self,
        context: &ResourceCommandContext,
        view_name: &str,
        output_type: &str,
    ) -> Result<serde_json::Value>;

    /// Discover the controller's sub-resources.
    async fn load_inventory(&self, context: &ResourceCommandContext) -> Result<Inventory>;
}

/// Controller address and credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDetails {
    pub address: String,
    pub user: String,
    /// Decrypted password.
    pub password: String,
}

impl fmt::Debug for ConnectionDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDetails")
            .field("address", &self.address)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug)]
struct HandlerBinding {
    service: ResourceCommandContext,
    logger: ShellLogger,
}

/// State shared by all controller handlers.
///
/// Embed it in a concrete handler and forward `initialize` to
/// [`ControllerHandlerBase::initialize`].
#[derive(Debug, Default)]
pub struct ControllerHandlerBase {
    binding: OnceLock<HandlerBinding>,
    connection: OnceCell<ConnectionDetails>,
}

impl ControllerHandlerBase {
    /// Create an unbound handler base.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the service context and logger. Binding twice is an error.
    pub fn initialize(&self, service: &ResourceCommandContext, logger: ShellLogger) -> Result<()> {
        self.binding
            .set(HandlerBinding {
                service: service.clone(),
                logger,
            })
            .map_err(|_| CoreError::InvalidState {
                expected: "unbound handler".into(),
                actual: "bound handler".into(),
            })
    }

    /// The bound service context.
    pub fn service(&self) -> Option<&ResourceCommandContext> {
        self.binding.get().map(|b| &b.service)
    }

    /// The bound logger.
    pub fn logger(&self) -> Option<&ShellLogger> {
        self.binding.get().map(|b| &b.logger)
    }

    /// Connection details, if already read.
    pub fn connection(&self) -> Option<&ConnectionDetails> {
        self.connection.get()
    }

    /// Read address, user and password of the controller resource.
    ///
    /// The password is decrypted through the platform on the first call
    /// only; later calls return the cached details.
    pub async fn get_connection_details(
        &self,
        context: &ResourceCommandContext,
        connector: &dyn ApiConnector,
    ) -> Result<&ConnectionDetails> {
        let span = self.logger().map(|l| l.span().clone()).unwrap_or_else(Span::none);
        self.connection
            .get_or_try_init(|| read_connection_details(context, connector).instrument(span))
            .await
    }
}

async fn read_connection_details(
    context: &ResourceCommandContext,
    connector: &dyn ApiConnector,
) -> Result<ConnectionDetails> {
    let resource = &context.resource;
    let missing = |attribute: &str| CoreError::AttributeNotFound {
        resource: resource.name.clone(),
        attribute: attribute.to_string(),
    };

    let address = resource.address.clone();
    tracing::debug!("Address - {address}");
    let user = context_attribute(resource, "User")
        .ok_or_else(|| missing("User"))?
        .to_string();
    tracing::debug!("User - {user}");
    let encrypted = context_attribute(resource, "Password").ok_or_else(|| missing("Password"))?;
    tracing::debug!("Encrypted password - {encrypted}");

    let session = connector.session_for_command(context).await?;
    let password = session.decrypt_password(encrypted).await?;
    tracing::debug!("Password decrypted");

    Ok(ConnectionDetails {
        address,
        user,
        password,
    })
}

// ============================================================================
// Driver
// ============================================================================

/// Lifecycle state of a controller driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// `initialize` has not run yet.
    Uninitialized,
    /// Handler is bound, traffic has not been started.
    Initialized,
    /// Traffic is running.
    TrafficRunning,
    /// Traffic was stopped.
    TrafficStopped,
    /// Controller was cleaned up; no further commands are accepted.
    CleanedUp,
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "Uninitialized"),
            Self::Initialized => write!(f, "Initialized"),
            Self::TrafficRunning => write!(f, "TrafficRunning"),
            Self::TrafficStopped => write!(f, "TrafficStopped"),
            Self::CleanedUp => write!(f, "CleanedUp"),
        }
    }
}

/// Base driver for traffic-generator controllers.
pub struct TgControllerDriver<H> {
    handler: H,
    connector: Arc<dyn ApiConnector>,
    config: ShellConfig,
    state: Mutex<ControllerState>,
    logger: OnceLock<ShellLogger>,
}

impl<H: TgControllerHandler> TgControllerDriver<H> {
    /// Create a driver around a handler.
    ///
    /// The configuration is validated here, so a zero keep-alive or poll
    /// interval is rejected before any command runs.
    pub fn new(
        handler: H,
        connector: Arc<dyn ApiConnector>,
        config: ShellConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            handler,
            connector,
            config,
            state: Mutex::new(ControllerState::Uninitialized),
            logger: OnceLock::new(),
        })
    }

    /// The driver's configuration.
    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// The wrapped handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// The driver's logger, once initialized.
    pub fn logger(&self) -> Option<&ShellLogger> {
        self.logger.get()
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> ControllerState {
        *self.state.lock().await
    }

    fn span(&self) -> Span {
        self.logger
            .get()
            .map(|l| l.span().clone())
            .unwrap_or_else(Span::none)
    }

    /// Run handler work inside the driver's logger span.
    async fn in_span<F, T>(&self, fut: F) -> T
    where
        F: Future<Output = T>,
    {
        fut.instrument(self.span()).await
    }

    /// Ensure the driver is initialized and not cleaned up.
    async fn ensure_active(&self) -> Result<ControllerState> {
        let state = *self.state.lock().await;
        match state {
            ControllerState::Uninitialized | ControllerState::CleanedUp => {
                Err(CoreError::InvalidState {
                    expected: "Initialized".into(),
                    actual: state.to_string(),
                })
            }
            _ => Ok(state),
        }
    }

    /// Create the resource-scoped logger and bind the handler.
    pub async fn initialize(&self, context: &ResourceCommandContext) -> Result<()> {
        let mut state = self.state.lock().await;
        if *state != ControllerState::Uninitialized {
            return Err(CoreError::InvalidState {
                expected: ControllerState::Uninitialized.to_string(),
                actual: state.to_string(),
            });
        }

        let logger = ShellLogger::for_resource(
            &self.config.log_group,
            &context.resource.name,
            self.config.log_level,
        );
        let span = logger.span().clone();

        async {
            tracing::info!(resource = %context.resource.name, "Initializing controller");
            self.handler.initialize(context, logger.clone()).await
        }
        .instrument(span)
        .await?;

        // Only reachable once: the state lock is held and still Uninitialized
        self.logger
            .set(logger)
            .map_err(|_| CoreError::InvalidState {
                expected: "unset logger".into(),
                actual: "logger already set".into(),
            })?;
        *state = ControllerState::Initialized;
        Ok(())
    }

    /// Clean up the handler. Runs the handler's cleanup at most once; later
    /// calls are no-ops.
    pub async fn cleanup(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        match *state {
            ControllerState::CleanedUp => {
                tracing::debug!("Controller already cleaned up");
                return Ok(());
            }
            ControllerState::Uninitialized => {
                return Err(CoreError::InvalidState {
                    expected: "Initialized".into(),
                    actual: state.to_string(),
                });
            }
            _ => {}
        }

        let result = self
            .in_span(async {
                tracing::info!("Cleaning up controller");
                self.handler.cleanup().await
            })
            .await;
        *state = ControllerState::CleanedUp;
        result
    }

    /// Wait until `cancellation` fires, then clean up.
    ///
    /// The token is checked every keep-alive interval and as soon as it is
    /// cancelled.
    pub async fn keep_alive(
        &self,
        _context: &ResourceCommandContext,
        cancellation: CancellationToken,
    ) -> Result<()> {
        self.ensure_active().await?;

        let mut ticker = tokio::time::interval(self.config.keep_alive_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.in_span(async {
            tracing::debug!(
                interval_ms = self.config.keep_alive_interval.as_millis() as u64,
                "Keep alive started"
            );
            loop {
                tokio::select! {
                    biased;

                    _ = cancellation.cancelled() => {
                        tracing::info!("Keep alive cancelled");
                        break;
                    }

                    _ = ticker.tick() => {
                        tracing::trace!("Keep alive tick");
                    }
                }
            }
        })
        .await;

        self.cleanup().await
    }

    /// Run [`keep_alive`](Self::keep_alive) as a background task so other
    /// commands stay callable while it waits.
    pub fn spawn_keep_alive(
        self: &Arc<Self>,
        context: ResourceCommandContext,
        cancellation: CancellationToken,
    ) -> JoinHandle<Result<()>>
    where
        H: 'static,
    {
        let driver = Arc::clone(self);
        tokio::spawn(async move { driver.keep_alive(&context, cancellation).await })
    }

    /// Schedule a keep-alive on the platform, then load the configuration.
    pub async fn load_config(
        &self,
        context: &ResourceCommandContext,
        config_file_location: &str,
    ) -> Result<()> {
        self.ensure_active().await?;
        self.in_span(async {
            enqueue_keep_alive(context, self.connector.as_ref()).await?;
            tracing::info!(config = %config_file_location, "Loading configuration");
            self.handler.load_config(context, config_file_location).await
        })
        .await
    }

    /// Send ARP from all controller ports.
    pub async fn send_arp(&self, _context: &ResourceCommandContext) -> Result<()> {
        self.ensure_active().await?;
        self.in_span(self.handler.send_arp()).await
    }

    /// Start all configured protocols.
    pub async fn start_protocols(&self, _context: &ResourceCommandContext) -> Result<()> {
        self.ensure_active().await?;
        self.in_span(self.handler.start_protocols()).await
    }

    /// Stop all configured protocols.
    pub async fn stop_protocols(&self, _context: &ResourceCommandContext) -> Result<()> {
        self.ensure_active().await?;
        self.in_span(self.handler.stop_protocols()).await
    }

    /// Start traffic and report the mode it was started in.
    pub async fn start_traffic(
        &self,
        context: &ResourceCommandContext,
        blocking: &str,
    ) -> Result<String> {
        self.ensure_active().await?;
        self.in_span(self.handler.start_traffic(context, blocking)).await?;
        self.transition(ControllerState::TrafficRunning).await;
        Ok(format!("traffic started in {blocking} mode"))
    }

    /// Stop traffic.
    pub async fn stop_traffic(&self, _context: &ResourceCommandContext) -> Result<()> {
        self.ensure_active().await?;
        self.in_span(self.handler.stop_traffic()).await?;
        self.transition(ControllerState::TrafficStopped).await;
        Ok(())
    }

    /// Read a statistics view from the handler.
    pub async fn get_statistics(
        &self,
        context: &ResourceCommandContext,
        view_name: &str,
        output_type: &str,
    ) -> Result<serde_json::Value> {
        self.ensure_active().await?;
        self.in_span(self.handler.get_statistics(context, view_name, output_type)).await
    }

    /// Discover the controller's sub-resources through the handler.
    pub async fn get_inventory(&self, context: &ResourceCommandContext) -> Result<Inventory> {
        self.ensure_active().await?;
        self.in_span(self.handler.load_inventory(context)).await
    }

    /// Ports of the configured port model in the context's reservation.
    pub async fn reservation_ports(
        &self,
        context: &ResourceCommandContext,
    ) -> Result<Vec<ReservedResource>> {
        let reservation_id = command_reservation_id(context)?;
        let session = self.connector.session_for_command(context).await?;
        get_reservation_ports(session.as_ref(), reservation_id, &self.config.port_model).await
    }

    /// Wait for resources to show in the context's reservation using the
    /// configured poll options.
    pub async fn wait_for_resources(
        &self,
        context: &ResourceCommandContext,
        resources_names: impl Into<Names>,
    ) -> Result<()> {
        let reservation_id = command_reservation_id(context)?;
        let session = self.connector.session_for_command(context).await?;
        self.in_span(polling::wait_for_resources(
            session.as_ref(),
            reservation_id,
            resources_names,
            self.config.poll,
        ))
        .await
    }

    /// Move between traffic states unless cleanup won the race.
    async fn transition(&self, next: ControllerState) {
        let mut state = self.state.lock().await;
        let current = *state;
        if current != ControllerState::CleanedUp {
            tracing::trace!(from = %current, to = %next, "Controller state change");
            *state = next;
        }
    }
}

fn command_reservation_id(context: &ResourceCommandContext) -> Result<&str> {
    let reservation_id = context.reservation.reservation_id.as_str();
    if reservation_id.is_empty() {
        return Err(CoreError::Resolution {
            what: "reservation ID",
            shape: "command",
        });
    }
    Ok(reservation_id)
}
