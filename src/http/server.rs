//! HTTP server setup and the gateway pipeline handler.
//!
//! # Responsibilities
//! - Build the Axum router and middleware stack
//! - Hold shared gateway state (engines, limiters, identity resolver)
//! - Enforce the inspection pipeline on every request
//! - Apply configuration updates without a restart

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, Method, Request},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::audit::{AuditEvent, AuditSink, TracingAuditSink};
use crate::auth::{
    bearer_token, headers, IdentityResolver, PermissionTable, StaticTokenResolver,
    NAMESPACE_HEADER,
};
use crate::config::GatewayConfig;
use crate::error::Rejection;
use crate::http::forward;
use crate::injection::{structured, InjectionEngine, StructuralLimits, StructuredViolation};
use crate::observability::metrics;
use crate::protect::{ConnectionLimiter, QueueAdmission, RateLimiter};
use crate::secrets::SecretRegistry;

/// Upper bound on total request handling time, independent of the body
/// read timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ArcSwap<GatewayConfig>>,
    pub engine: Arc<InjectionEngine>,
    pub secrets: Arc<SecretRegistry>,
    pub resolver: Arc<dyn IdentityResolver>,
    pub limiter: Arc<ArcSwap<RateLimiter>>,
    pub connections: Arc<ConnectionLimiter>,
    pub queue: Arc<QueueAdmission>,
    pub audit: Arc<dyn AuditSink>,
    pub client: Client<HttpConnector, Body>,
}

impl AppState {
    /// Record a rejection in metrics and the audit trail, then render it.
    fn reject(
        &self,
        method: &Method,
        client: SocketAddr,
        principal: Option<&str>,
        start: Instant,
        rejection: Rejection,
    ) -> Response {
        let category = rejection.status_category;
        metrics::record_request(method.as_str(), category.status_code().as_u16(), start);
        metrics::record_rejection(category.as_str(), &rejection.error_code);
        self.audit.record(&AuditEvent::Rejection {
            category: category.as_str().to_string(),
            error_code: rejection.error_code.clone(),
            client: client.ip().to_string(),
            principal: principal.map(str::to_string),
        });
        tracing::warn!(
            category = category.as_str(),
            error_code = %rejection.error_code,
            client = %client.ip(),
            principal = principal.unwrap_or("-"),
            "Request rejected"
        );
        rejection.into_response()
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a server with an identity resolver backed by the config's
    /// token table and the default audit sink.
    pub fn from_config(config: GatewayConfig) -> Self {
        let resolver = Arc::new(StaticTokenResolver::new(&config.auth.tokens));
        Self::new(config, resolver, Arc::new(TracingAuditSink))
    }

    /// Create a new server with explicit collaborators.
    pub fn new(
        config: GatewayConfig,
        resolver: Arc<dyn IdentityResolver>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let limiter = RateLimiter::new(
            config.rate_limit.limit,
            Duration::from_secs(config.rate_limit.window_secs),
        );
        let connections = Arc::new(ConnectionLimiter::new(config.listener.max_connections));
        let queue = QueueAdmission::new(config.limits.max_queue_pending);

        let state = AppState {
            config: Arc::new(ArcSwap::from_pointee(config)),
            engine: Arc::new(InjectionEngine::new()),
            secrets: Arc::new(SecretRegistry::new()),
            resolver,
            limiter: Arc::new(ArcSwap::from_pointee(limiter)),
            connections,
            queue,
            audit,
            client,
        };

        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
    }

    /// Apply configuration updates produced by the file watcher.
    ///
    /// Rate limits and per-request ceilings (body size, structural limits,
    /// timeouts) take effect on the next request. Connection and queue
    /// capacities, the token table, the bind address, and the upstream are
    /// fixed at startup.
    pub fn spawn_reload(&self, mut updates: mpsc::UnboundedReceiver<GatewayConfig>) {
        let state = self.state.clone();
        tokio::spawn(async move {
            while let Some(config) = updates.recv().await {
                state.limiter.store(Arc::new(RateLimiter::new(
                    config.rate_limit.limit,
                    Duration::from_secs(config.rate_limit.window_secs),
                )));
                state.config.store(Arc::new(config));
                tracing::info!("Configuration updated");
            }
        });
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Gateway listening");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Gateway stopped");
        Ok(())
    }

    /// Shared state, for wiring collaborators before `run`.
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Gateway pipeline handler.
///
/// Checks run cheapest-first and the first failure ends the request. The
/// upstream is contacted only after every check passes.
async fn gateway_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let config = state.config.load_full();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = request.uri().query().unwrap_or("").to_string();

    // Header hygiene and verb check.
    if let Err(r) = headers::validate_headers(request.headers()) {
        return state.reject(&method, addr, None, start, r);
    }
    if let Err(r) = headers::check_verb(&method) {
        return state.reject(&method, addr, None, start, r);
    }

    // Declared size guard, before any body bytes are read.
    let declared_len = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<usize>().ok());
    if let Some(len) = declared_len {
        if len > config.limits.max_body_bytes {
            let r = Rejection::payload_too_large("Request body exceeds the configured limit");
            return state.reject(&method, addr, None, start, r);
        }
    }

    // Authentication.
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token);
    let identity = match token {
        Some(t) => match state.resolver.resolve(t) {
            Some(id) => id,
            None => {
                let r = Rejection::unauthorized("unknown_credentials", "Credential not recognized");
                return state.reject(&method, addr, None, start, r);
            }
        },
        None => {
            let r = Rejection::unauthorized("missing_credentials", "Bearer credential required");
            return state.reject(&method, addr, None, start, r);
        }
    };
    let principal = identity.principal.clone();

    // Authorization and namespace isolation.
    if let Err(r) = PermissionTable::authorize(&identity, &method, &path) {
        return state.reject(&method, addr, Some(&principal), start, r);
    }
    let declared_ns = request
        .headers()
        .get(NAMESPACE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    if let Err(r) = PermissionTable::check_namespace(&identity, declared_ns.as_deref()) {
        return state.reject(&method, addr, Some(&principal), start, r);
    }

    // Rate limiting, keyed on the authenticated principal.
    if config.rate_limit.enabled {
        let decision = state.limiter.load().check(&principal);
        if !decision.allowed {
            metrics::record_rate_limited();
            let r = Rejection::rate_limited(decision.limit, decision.remaining);
            return state.reject(&method, addr, Some(&principal), start, r);
        }
    }

    // Admission: connection ceiling, then queue depth. Permits are held
    // until the response is produced.
    let Some(_conn_permit) = state.connections.try_acquire() else {
        let r = Rejection::service_unavailable("connections_exhausted", "Connection limit reached");
        return state.reject(&method, addr, Some(&principal), start, r);
    };
    let Some(_queue_permit) = state.queue.try_admit() else {
        let r = Rejection::service_unavailable("queue_full", "Admission queue is full");
        return state.reject(&method, addr, Some(&principal), start, r);
    };

    // Bounded body read under a deadline.
    let (mut parts, body) = request.into_parts();
    let read = tokio::time::timeout(
        Duration::from_secs(config.limits.body_read_timeout_secs),
        axum::body::to_bytes(body, config.limits.max_body_bytes),
    )
    .await;
    let body_bytes = match read {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(_)) => {
            let r = Rejection::payload_too_large("Request body exceeds the configured limit");
            return state.reject(&method, addr, Some(&principal), start, r);
        }
        Err(_) => {
            let r = Rejection::timeout("Request body was not received in time");
            return state.reject(&method, addr, Some(&principal), start, r);
        }
    };

    // Injection scan of path and query.
    if let Some(m) = state.engine.first_match(&path) {
        let r = Rejection::bad_request(m.category.as_str(), "Injection signature in request path");
        return state.reject(&method, addr, Some(&principal), start, r);
    }
    if !query.is_empty() {
        if let Some(m) = state.engine.first_match(&query) {
            let r =
                Rejection::bad_request(m.category.as_str(), "Injection signature in query string");
            return state.reject(&method, addr, Some(&principal), start, r);
        }
    }

    // Structural guards and body inspection.
    if !body_bytes.is_empty() {
        let limits = StructuralLimits {
            max_bytes: config.limits.max_body_bytes,
            max_depth: config.limits.max_nesting_depth,
            max_array_elements: config.limits.max_array_elements,
        };
        if let Err(v) = structured::precheck(&body_bytes, &limits) {
            let r = structural_rejection(&v);
            return state.reject(&method, addr, Some(&principal), start, r);
        }

        let is_json = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|c| c.contains("json"))
            .unwrap_or(false);
        if is_json {
            match serde_json::from_slice::<Value>(&body_bytes) {
                Ok(value) => {
                    if let Err(v) = structured::validate_value(&state.engine, &value) {
                        let r = structural_rejection(&v);
                        return state.reject(&method, addr, Some(&principal), start, r);
                    }
                }
                Err(_) => {
                    let r = Rejection::bad_request("malformed_json", "Body is not valid JSON");
                    return state.reject(&method, addr, Some(&principal), start, r);
                }
            }
        } else {
            let text = String::from_utf8_lossy(&body_bytes);
            if let Some(m) = state.engine.first_match(&text) {
                let r =
                    Rejection::bad_request(m.category.as_str(), "Injection signature in body");
                return state.reject(&method, addr, Some(&principal), start, r);
            }
        }
    }

    // Clean request. Drop method-override headers and forward.
    headers::strip_override_headers(&mut parts.headers);
    let response = forward::forward(&state, &config, parts, body_bytes).await;

    metrics::record_request(method.as_str(), response.status().as_u16(), start);
    response
}

fn structural_rejection(violation: &StructuredViolation) -> Rejection {
    match violation {
        StructuredViolation::TooLarge { .. } => {
            Rejection::payload_too_large("Request body exceeds the configured limit")
        }
        other => Rejection::bad_request(other.code(), "Request structure rejected"),
    }
}
