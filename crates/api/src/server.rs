use anyhow::Context;
use axum::{
    async_trait,
    extract::{FromRequest, Path, State},
    http::{header, Method, StatusCode, Uri},
    routing::{get, post},
    Form, Json, Router,
};
use modgate_core::{
    codec, BanList, ModerationError, ModerationRequest, ModerationService, ModerationStore,
    ModeratorRegistry, MuteList, OperationResponse, SharedClock, StatusReport, SystemClock,
    UserId, DEFAULT_MODERATORS, DEFAULT_PORT, DEFAULT_SWEEP_INTERVAL_SECS,
};
use serde::{Deserialize, Serialize};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};

use crate::sweeper::PeriodicMuteSweeper;

#[derive(Clone)]
struct AppState {
    service: ModerationService,
}

/// Runtime configuration for the moderation API server.
#[derive(Debug, Clone)]
pub struct ApiRuntimeConfig {
    port: u16,
    moderators: Vec<UserId>,
    sweep_interval: Duration,
}

impl ApiRuntimeConfig {
    /// Build runtime configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let port = match parse_env_u64("PORT")? {
            Some(raw) => u16::try_from(raw).context("Invalid PORT (expected 0-65535)")?,
            None => DEFAULT_PORT,
        };

        let sweep_secs =
            parse_env_u64("MODGATE_SWEEP_INTERVAL_SECS")?.unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS);
        anyhow::ensure!(
            sweep_secs > 0,
            "MODGATE_SWEEP_INTERVAL_SECS must be greater than zero"
        );

        Ok(Self {
            port,
            moderators: load_moderators_from_env()?,
            sweep_interval: Duration::from_secs(sweep_secs),
        })
    }

    /// Build deterministic test configuration with the default moderator.
    pub fn for_test() -> Self {
        Self {
            port: 0,
            moderators: DEFAULT_MODERATORS.to_vec(),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }

    /// Replace the moderator set.
    pub fn with_moderators(mut self, moderators: impl IntoIterator<Item = UserId>) -> Self {
        self.moderators = moderators.into_iter().collect();
        self
    }

    /// Listen port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Configured moderator identities.
    pub fn moderators(&self) -> &[UserId] {
        &self.moderators
    }

    /// Period of the expired-mute sweep.
    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }
}

fn parse_env_u64(name: &str) -> anyhow::Result<Option<u64>> {
    let Ok(raw) = std::env::var(name) else {
        return Ok(None);
    };
    let raw = raw.trim();
    anyhow::ensure!(!raw.is_empty(), "{} is set but empty", name);
    let v: u64 = raw
        .parse()
        .with_context(|| format!("Invalid {} (expected u64)", name))?;
    Ok(Some(v))
}

fn load_moderators_from_env() -> anyhow::Result<Vec<UserId>> {
    let Ok(raw) = std::env::var("MODGATE_MODERATORS") else {
        return Ok(DEFAULT_MODERATORS.to_vec());
    };

    let mut moderators = Vec::new();
    for part in raw.split(',') {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        let id: UserId = trimmed
            .parse()
            .with_context(|| format!("Invalid MODGATE_MODERATORS entry: {}", trimmed))?;
        moderators.push(id);
    }

    anyhow::ensure!(
        !moderators.is_empty(),
        "MODGATE_MODERATORS is set but lists no moderator ids"
    );
    Ok(moderators)
}

/// Build the moderation service (registry + empty store) for `config`.
pub fn build_service(config: &ApiRuntimeConfig, clock: SharedClock) -> ModerationService {
    ModerationService::new(
        ModeratorRegistry::new(config.moderators.iter().copied()),
        ModerationStore::new(clock),
    )
}

/// Build the HTTP router over an existing service.
pub fn app_for_service(service: ModerationService) -> Router {
    router_for_state(AppState { service })
}

/// Build an in-process API router from explicit runtime config.
pub fn build_app(config: &ApiRuntimeConfig) -> Router {
    build_app_with_clock(config, Arc::new(SystemClock))
}

/// Build an in-process API router reading time from `clock`.
pub fn build_app_with_clock(config: &ApiRuntimeConfig, clock: SharedClock) -> Router {
    app_for_service(build_service(config, clock))
}

fn router_for_state(state: AppState) -> Router {
    Router::new()
        .route("/", get(describe).fallback(route_not_found))
        .route("/ping", get(ping).fallback(route_not_found))
        .route("/api/moderation/ban", post(post_ban).fallback(route_not_found))
        .route("/api/moderation/unban", post(post_unban).fallback(route_not_found))
        .route("/api/moderation/mute", post(post_mute).fallback(route_not_found))
        .route("/api/moderation/unmute", post(post_unmute).fallback(route_not_found))
        .route("/api/moderation/banlist", get(get_banlist).fallback(route_not_found))
        .route("/api/moderation/mutelist", get(get_mutelist).fallback(route_not_found))
        .route(
            "/api/moderation/status/:user_id",
            get(get_status).fallback(route_not_found),
        )
        .fallback(route_not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the API server with explicit runtime configuration.
pub async fn run_with_config(config: ApiRuntimeConfig) -> anyhow::Result<()> {
    let service = build_service(&config, Arc::new(SystemClock));

    let sweeper = PeriodicMuteSweeper::new(service.store().clone(), config.sweep_interval);
    let sweeper_handle = tokio::spawn(async move { sweeper.run().await });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    log_startup(&addr, service.registry(), config.sweep_interval);

    let app = app_for_service(service);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper_handle.abort();
    info!("Moderation server shutdown complete");
    Ok(())
}

/// Run the API server using environment-driven configuration.
pub async fn run_from_env() -> anyhow::Result<()> {
    run_with_config(ApiRuntimeConfig::from_env()?).await
}

fn log_startup(addr: &SocketAddr, registry: &ModeratorRegistry, sweep_interval: Duration) {
    info!("Moderation server listening on {}", addr);
    info!("  Moderators: {:?}", registry.ids());
    info!("  Mute sweep interval: {:?}", sweep_interval);
    for (name, route) in ENDPOINTS {
        info!("  {:<9} {}", name, route);
    }
    info!("  {:<9} GET /ping", "ping");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", err);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {}", err);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

const ENDPOINTS: [(&str, &str); 7] = [
    ("ban", "POST /api/moderation/ban"),
    ("unban", "POST /api/moderation/unban"),
    ("mute", "POST /api/moderation/mute"),
    ("unmute", "POST /api/moderation/unmute"),
    ("banlist", "GET /api/moderation/banlist"),
    ("mutelist", "GET /api/moderation/mutelist"),
    ("status", "GET /api/moderation/status/:userId"),
];

const ERROR_CODE_INTERNAL_ERROR: &str = "internal_error";

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn internal_error<E: std::fmt::Display>(err: E) -> ApiError {
    error!("Failed to encode response: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: ErrorInfo {
                code: ERROR_CODE_INTERNAL_ERROR,
                message: format!("Internal error: {}", err),
            },
        }),
    )
}

/// Encode `data` inside the standard envelope.
fn respond<T: Serialize>(data: &T) -> Result<String, ApiError> {
    codec::encode_envelope(data).map_err(internal_error)
}

#[derive(Serialize)]
struct RouteNotFound {
    error: &'static str,
    path: String,
    method: String,
}

async fn route_not_found(method: Method, uri: Uri) -> (StatusCode, Json<RouteNotFound>) {
    debug!(%method, path = uri.path(), "no route matched");
    (
        StatusCode::NOT_FOUND,
        Json(RouteNotFound {
            error: "Endpoint not found",
            path: uri.path().to_string(),
            method: method.to_string(),
        }),
    )
}

#[derive(Serialize)]
struct ServiceDescriptor {
    status: &'static str,
    message: &'static str,
    endpoints: serde_json::Map<String, serde_json::Value>,
}

async fn describe() -> Json<ServiceDescriptor> {
    let endpoints = ENDPOINTS
        .iter()
        .map(|(name, route)| (name.to_string(), serde_json::Value::from(*route)))
        .collect();

    Json(ServiceDescriptor {
        status: "online",
        message: "Moderation Server",
        endpoints,
    })
}

#[derive(Serialize)]
struct PingResponse {
    pong: bool,
    timestamp: i64,
}

async fn ping(State(state): State<AppState>) -> Json<PingResponse> {
    Json(PingResponse {
        pong: true,
        timestamp: state.service.store().now(),
    })
}

/// Body of a mutating request: `{"data": "<base64 JSON>"}`.
#[derive(Debug, Deserialize)]
struct EncodedBody {
    #[serde(default)]
    data: Option<String>,
}

/// Decoded moderation payload, or `None` when anything about the body is
/// unusable (wrong content type, missing `data`, bad base64, bad JSON,
/// missing ids).
struct EncodedPayload(Option<ModerationRequest>);

#[async_trait]
impl<S> FromRequest<S> for EncodedPayload
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: axum::extract::Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        let body = if is_form {
            Form::<EncodedBody>::from_request(req, state)
                .await
                .ok()
                .map(|Form(body)| body)
        } else {
            Json::<EncodedBody>::from_request(req, state)
                .await
                .ok()
                .map(|Json(body)| body)
        };

        let payload = body
            .and_then(|body| body.data)
            .and_then(|blob| codec::decode_as::<ModerationRequest>(&blob));
        Ok(Self(payload))
    }
}

#[derive(Debug, Clone, Copy)]
enum Mutation {
    Ban,
    Unban,
    Mute,
    Unmute,
}

impl Mutation {
    fn name(self) -> &'static str {
        match self {
            Mutation::Ban => "ban",
            Mutation::Unban => "unban",
            Mutation::Mute => "mute",
            Mutation::Unmute => "unmute",
        }
    }

    async fn apply(
        self,
        service: &ModerationService,
        req: &ModerationRequest,
    ) -> Result<UserId, ModerationError> {
        match self {
            Mutation::Ban => service.ban(req).await,
            Mutation::Unban => service.unban(req).await,
            Mutation::Mute => service.mute(req).await,
            Mutation::Unmute => service.unmute(req).await,
        }
    }
}

async fn mutate(
    state: &AppState,
    mutation: Mutation,
    payload: Option<ModerationRequest>,
) -> Result<String, ApiError> {
    debug!(operation = mutation.name(), "moderation request received");

    // Decode failures are reported before authorization is attempted.
    let outcome = match payload {
        Some(req) => mutation.apply(&state.service, &req).await,
        None => {
            warn!(operation = mutation.name(), "failed to decode moderation payload");
            Err(ModerationError::InvalidData)
        }
    };

    respond(&OperationResponse::from(outcome))
}

async fn post_ban(
    State(state): State<AppState>,
    EncodedPayload(payload): EncodedPayload,
) -> Result<String, ApiError> {
    mutate(&state, Mutation::Ban, payload).await
}

async fn post_unban(
    State(state): State<AppState>,
    EncodedPayload(payload): EncodedPayload,
) -> Result<String, ApiError> {
    mutate(&state, Mutation::Unban, payload).await
}

async fn post_mute(
    State(state): State<AppState>,
    EncodedPayload(payload): EncodedPayload,
) -> Result<String, ApiError> {
    mutate(&state, Mutation::Mute, payload).await
}

async fn post_unmute(
    State(state): State<AppState>,
    EncodedPayload(payload): EncodedPayload,
) -> Result<String, ApiError> {
    mutate(&state, Mutation::Unmute, payload).await
}

async fn get_banlist(State(state): State<AppState>) -> Result<String, ApiError> {
    let bans = state.service.list_bans().await;
    respond(&BanList { bans })
}

async fn get_mutelist(State(state): State<AppState>) -> Result<String, ApiError> {
    let mutes = state.service.list_mutes().await;
    respond(&MuteList { mutes })
}

async fn get_status(
    State(state): State<AppState>,
    Path(raw_user_id): Path<String>,
) -> Result<String, ApiError> {
    let Some(user_id) = leading_user_id(&raw_user_id) else {
        warn!(user_id = %raw_user_id, "status requested for non-numeric user id");
        return respond(&StatusReport::unknown_user());
    };

    let report = state.service.status(user_id).await;
    respond(&report)
}

/// Integer prefix of a path id: leading whitespace, an optional sign, then
/// decimal digits up to the first other character. `"12abc"` is 12.
fn leading_user_id(raw: &str) -> Option<UserId> {
    let trimmed = raw.trim_start();
    let sign_len = usize::from(trimmed.starts_with(['+', '-']));
    let digits_len = trimmed[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return None;
    }
    trimmed[..sign_len + digits_len].parse().ok()
}
