//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum Router with the single students handler
//! - Wire up middleware (request ID, tracing, CORS headers, bearer gate)
//! - Bind server to listener and stop on the shutdown signal
//! - Resolve each request's route and dispatch it to the controller
//! - Convert failures and panics escaping the controller into 500 envelopes

use axum::{
    body::Body,
    extract::{Request, State},
    http::header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::api::StudentController;
use crate::config::AppConfig;
use crate::http::auth::{bearer_token, require_bearer};
use crate::http::response::{
    allow_headers_value, allow_origin_value, internal_error, method_not_allowed, panic_response,
    preflight, RequestError,
};
use crate::http::routes::{Route, StudentAction};
use crate::observability::metrics;
use crate::store::{connector_from_config, StoreConnector, StoreError};

/// Header carrying the per-request correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub connector: Arc<dyn StoreConnector>,
    /// Path segment naming the collection root.
    pub base_name: Arc<str>,
    pub max_body_size: usize,
    pub require_bearer: bool,
}

/// HTTP server for the students API.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a server whose store is selected by configuration.
    pub fn new(config: AppConfig) -> Result<Self, StoreError> {
        let connector = connector_from_config(&config.store)?;
        Ok(Self::with_connector(config, connector))
    }

    /// Create a server over an explicit store connector.
    pub fn with_connector(config: AppConfig, connector: Arc<dyn StoreConnector>) -> Self {
        let state = AppState {
            connector,
            base_name: Arc::from(config.api.base_path.trim_matches('/')),
            max_body_size: config.api.max_body_size,
            require_bearer: config.auth.require_bearer,
        };

        let router = Self::build_router(state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", any(students_handler))
            .route("/{*path}", any(students_handler))
            .layer(middleware::from_fn_with_state(state.clone(), require_bearer))
            .with_state(state)
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_ORIGIN,
                allow_origin_value(),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_HEADERS,
                allow_headers_value(),
            ))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                let request_id = request
                    .headers()
                    .get(X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id,
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// A clone of the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            base_path = %self.config.api.base_path,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Single entry point for every method and path.
async fn students_handler(State(state): State<AppState>, request: Request) -> Response {
    let start = Instant::now();
    let route = Route::resolve(request.method(), request.uri().path(), &state.base_name);
    let label = route.label();

    tracing::debug!(method = %request.method(), route = label, "Dispatching request");

    let response = match route {
        Route::Preflight => preflight(),
        Route::MethodNotAllowed => {
            tracing::warn!(method = %request.method(), "Method not allowed");
            method_not_allowed()
        }
        Route::Student(action) => match serve_student(&state, action, request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Unhandled request failure");
                internal_error(&e)
            }
        },
    };

    metrics::record_request(label, response.status().as_u16(), start);
    response
}

/// Open a store handle for this request and run the controller action.
async fn serve_student(
    state: &AppState,
    action: StudentAction,
    request: Request,
) -> Result<Response, RequestError> {
    let store = state.connector.connect(bearer_token(request.headers()))?;
    let controller = StudentController::new(store);
    let body = request.into_body();

    let response = match action {
        StudentAction::List => controller.list().await.into_response(),
        StudentAction::Get(id) => controller.get(Some(&id)).await.into_response(),
        StudentAction::Create => {
            let raw = read_json(body, state.max_body_size).await?;
            controller.create(&raw).await.into_response()
        }
        StudentAction::Update(id) => {
            let raw = read_json(body, state.max_body_size).await?;
            controller.update(id.as_deref(), &raw).await.into_response()
        }
        StudentAction::Delete(id) => controller.delete(id.as_deref()).await.into_response(),
    };
    Ok(response)
}

async fn read_json(body: Body, limit: usize) -> Result<Value, RequestError> {
    let bytes = axum::body::to_bytes(body, limit).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
