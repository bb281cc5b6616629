//! Request/response dispatch handler.
//!
//! This module provides the request handler that routes incoming requests
//! to the store, the statistics aggregator and the enrichment gateway,
//! and produces responses.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use timeblock_core::{GeoPoint, aggregate, list_events};
use timeblock_protocol::{ErrorCode, EventDetail, Request, Response};
use timeblock_providers::EnrichmentGateway;

use crate::chart::render_chart;
use crate::error::{ServerError, ServerResult};
use crate::signals::ShutdownHandle;
use crate::socket::Connection;
use crate::store::EventStore;

/// Server state shared across all connections.
#[derive(Debug)]
pub struct ServerState {
    /// The event collection.
    store: EventStore,
    /// Whether shutdown has been requested.
    shutdown_requested: bool,
    /// Handle used to stop the accept loop on a shutdown request.
    shutdown_handle: Option<ShutdownHandle>,
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerState {
    /// Creates a new server state.
    pub fn new() -> Self {
        Self {
            store: EventStore::new(),
            shutdown_requested: false,
            shutdown_handle: None,
        }
    }

    /// The event store.
    pub fn store(&self) -> &EventStore {
        &self.store
    }

    /// Mutable access to the event store.
    pub fn store_mut(&mut self) -> &mut EventStore {
        &mut self.store
    }

    /// Requests a shutdown.
    pub fn request_shutdown(&mut self) {
        self.shutdown_requested = true;
        if let Some(handle) = &self.shutdown_handle {
            handle.trigger();
        }
    }

    /// Returns true if shutdown has been requested.
    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }

    /// Wires in the handle that stops the accept loop.
    pub fn set_shutdown_handle(&mut self, handle: ShutdownHandle) {
        self.shutdown_handle = Some(handle);
    }
}

/// Shared server state wrapped in an Arc<RwLock>.
pub type SharedState = Arc<RwLock<ServerState>>;

/// Creates a new shared state.
pub fn new_shared_state() -> SharedState {
    Arc::new(RwLock::new(ServerState::new()))
}

/// Request handler that processes incoming requests and produces responses.
pub struct RequestHandler {
    state: SharedState,
    gateway: Arc<EnrichmentGateway>,
    forecast_point: GeoPoint,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(state: SharedState, gateway: Arc<EnrichmentGateway>, forecast_point: GeoPoint) -> Self {
        Self {
            state,
            gateway,
            forecast_point,
        }
    }

    /// Handles a single request and returns the response.
    #[tracing::instrument(skip(self), fields(request_type, duration_ms))]
    pub async fn handle(&self, request: &Request) -> Response {
        use tracing::Span;

        let start = std::time::Instant::now();
        let request_type = format!("{:?}", request);
        Span::current().record("request_type", &request_type);

        let response = match request {
            Request::Ping => {
                debug!("Handling Ping request");
                Response::Pong
            }
            Request::CreateEvent { event } => {
                debug!("Handling CreateEvent request");
                let outcome = match event.to_draft() {
                    Ok(draft) => {
                        let mut state = self.state.write().await;
                        state.store_mut().insert(draft)
                    }
                    Err(error) => Err(error),
                };
                match outcome {
                    Ok(stored) => {
                        info!(id = stored.id, name = %stored.name, "Event created");
                        Response::created((&stored).into())
                    }
                    Err(error) => Response::from_error(error.into()),
                }
            }
            Request::GetEvent { id } => {
                debug!(id = *id, "Handling GetEvent request");
                let event = {
                    let state = self.state.read().await;
                    state.store().get(*id).cloned()
                };
                match event {
                    Ok(event) => {
                        // Enrichment runs outside the state lock; both
                        // lookups degrade to None on failure.
                        let metadata = self
                            .gateway
                            .fetch_metadata(event.date.as_naive(), self.forecast_point)
                            .await;
                        Response::detail(EventDetail::new(&event, metadata))
                    }
                    Err(error) => Response::from_error(error.into()),
                }
            }
            Request::UpdateEvent { id, patch } => {
                debug!(id = *id, "Handling UpdateEvent request");
                let outcome = match patch.to_patch() {
                    Ok(patch) => {
                        let mut state = self.state.write().await;
                        state.store_mut().update(*id, &patch)
                    }
                    Err(error) => Err(error),
                };
                match outcome {
                    Ok(stored) => {
                        info!(id = stored.id, "Event updated");
                        Response::updated((&stored).into())
                    }
                    Err(error) => Response::from_error(error.into()),
                }
            }
            Request::DeleteEvent { id } => {
                debug!(id = *id, "Handling DeleteEvent request");
                let mut state = self.state.write().await;
                match state.store_mut().delete(*id) {
                    Ok(()) => {
                        info!(id = *id, "Event deleted");
                        Response::deleted(*id)
                    }
                    Err(error) => Response::from_error(error.into()),
                }
            }
            Request::ListEvents { query } => {
                debug!(?query, "Handling ListEvents request");
                let state = self.state.read().await;
                match list_events(state.store().events(), query) {
                    Ok(page) => {
                        debug!(
                            total = page.metadata.total_events,
                            page = page.metadata.page,
                            "Returning event page"
                        );
                        Response::page(page)
                    }
                    Err(error) => Response::from_error(error.into()),
                }
            }
            Request::Statistics { format } => {
                debug!(format = %format, "Handling Statistics request");
                let state = self.state.read().await;
                let statistics = aggregate(state.store().events(), Utc::now().date_naive());
                match format.as_str() {
                    "json" => Response::statistics(statistics),
                    "image" => Response::StatisticsImage {
                        svg: render_chart(&statistics),
                    },
                    other => Response::error(
                        ErrorCode::InvalidFormat,
                        format!("unsupported statistics format: {other}"),
                    ),
                }
            }
            Request::Shutdown => {
                info!("Handling Shutdown request");
                let mut state = self.state.write().await;
                state.request_shutdown();
                Response::Ok
            }
        };

        let duration = start.elapsed();
        if tracing::enabled!(tracing::Level::DEBUG) {
            Span::current().record("duration_ms", duration.as_millis());
            debug!(
                request_type = %request_type,
                duration_ms = duration.as_millis(),
                "Request handled"
            );
        }

        response
    }

    /// Handles a connection, processing all requests until the connection closes.
    pub async fn handle_connection(&self, mut conn: Connection) -> ServerResult<()> {
        loop {
            match conn.read_request().await {
                Ok(Some(envelope)) => {
                    // Requests racing an in-flight shutdown are refused
                    // rather than silently dropped.
                    if self.state.read().await.shutdown_requested() {
                        let refusal = Response::error(
                            ErrorCode::ShuttingDown,
                            ErrorCode::ShuttingDown.description(),
                        );
                        conn.respond(&envelope.request_id, refusal).await?;
                        return Err(ServerError::Shutdown);
                    }

                    let response = self.handle(&envelope.payload).await;
                    conn.respond(&envelope.request_id, response).await?;

                    if self.state.read().await.shutdown_requested() {
                        return Err(ServerError::Shutdown);
                    }
                }
                Ok(None) => {
                    debug!("Client disconnected");
                    return Ok(());
                }
                Err(e) => {
                    warn!(error = %e, "Error reading request");
                    return Err(e);
                }
            }
        }
    }
}

/// Creates a connection handler function for use with SocketServer::run.
///
/// This returns a closure that can be passed to `SocketServer::run` or
/// `SocketServer::run_until_shutdown`.
pub fn make_connection_handler(
    state: SharedState,
    gateway: Arc<EnrichmentGateway>,
    forecast_point: GeoPoint,
) -> impl Fn(Connection) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>
+ Send
+ Sync
+ 'static {
    move |conn| {
        let handler = RequestHandler::new(state.clone(), gateway.clone(), forecast_point);
        Box::pin(async move {
            if let Err(e) = handler.handle_connection(conn).await
                && !matches!(e, ServerError::Shutdown)
            {
                warn!(error = %e, "Connection handler error");
            }
        })
    }
}
