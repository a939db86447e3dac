//! HTTP front end of the registration service.

use crate::config::{Mode, RegistrationConfig};
use crate::error::{RegistrationError, Result, ServerFault};
use crate::ids::{IdGenerator, UuidGenerator};
use crate::registry::{user_location, Registry};
use crate::storage::create_storage;
use crate::user::{RegistrationRequest, User};
use axum::{
    body::Bytes,
    extract::{Path, Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

/// Hardening headers added to every response that does not set them itself.
pub const SECURITY_HEADERS: [(&str, &str); 12] = [
    (
        "content-security-policy",
        "default-src 'self';base-uri 'self';font-src 'self' https: data:;\
         form-action 'self';frame-ancestors 'self';img-src 'self' data:;\
         object-src 'none';script-src 'self';script-src-attr 'none';\
         style-src 'self' https: 'unsafe-inline';upgrade-insecure-requests",
    ),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=15552000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

/// State shared by every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    registry: Registry,
    mode: Mode,
    allowed_origins: Arc<[String]>,
}

impl AppState {
    pub fn new(registry: Registry, config: &RegistrationConfig) -> Self {
        Self {
            registry,
            mode: config.mode,
            allowed_origins: config.allowed_origins.clone().into(),
        }
    }

    fn origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.is_empty()
            || self
                .allowed_origins
                .iter()
                .any(|allowed| allowed == origin.trim_end_matches('/'))
    }
}

/// The running registration server.
pub struct RegistrationServer {
    addr: SocketAddr,
    _handle: tokio::task::JoinHandle<()>,
}

impl RegistrationServer {
    /// Creates and starts a server that assigns random UUIDs to new users.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use club_registry::{RegistrationConfig, RegistrationServer};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let server = RegistrationServer::new(RegistrationConfig::memory()).await?;
    /// println!("Listening on {}", server.url());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(config: RegistrationConfig) -> Result<Self> {
        Self::with_id_generator(config, Arc::new(UuidGenerator)).await
    }

    /// Creates and starts a server that draws user ids from `ids`.
    pub async fn with_id_generator(
        config: RegistrationConfig,
        ids: Arc<dyn IdGenerator>,
    ) -> Result<Self> {
        let store = create_storage(&config.storage).await?;
        let state = AppState::new(Registry::new(store, ids), &config);
        let app = build_router(state);

        let listener = TcpListener::bind(config.bind_addr()).await?;
        let addr = listener.local_addr()?;

        info!(mode = ?config.mode, "Registration service listening on {}", addr);

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!("Server stopped: {}", e);
            }
        });

        Ok(Self {
            addr,
            _handle: handle,
        })
    }

    /// Returns the socket address the server is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the base URL of the server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

/// Builds the service's router around `state`.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.allowed_origins);

    let router = Router::new()
        .route("/", get(index).post(index_post))
        .route("/register", post(register))
        .route("/user", get(list_users))
        .route("/user/{userId}", delete(delete_user))
        .route("/users/{userId}", get(get_user))
        .layer(
            tower::ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    render_server_errors,
                ))
                .layer(middleware::from_fn_with_state(state.clone(), enforce_origin))
                .layer(cors),
        )
        .with_state(state);

    SECURITY_HEADERS
        .iter()
        .fold(router, |router, &(name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            ))
        })
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([header::LOCATION]);
    if allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring unusable allowed origin: {:?}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

async fn enforce_origin(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(origin) = request.headers().get(header::ORIGIN) {
        let origin = origin.to_str().unwrap_or_default();
        if !state.origin_allowed(origin) {
            warn!(origin, "Rejected cross-origin request");
            return RegistrationError::OriginNotAllowed(origin.to_string()).into_response();
        }
    }
    next.run(request).await
}

/// Gives 500 responses a JSON body whose detail depends on the mode.
async fn render_server_errors(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    let Some(fault) = response.extensions().get::<ServerFault>().cloned() else {
        return response;
    };

    if state.mode.is_production() {
        error!("Request failed: {}", fault.message());
    } else {
        error!(fault = ?fault, "Request failed: {}", fault.message());
    }
    (response.status(), Json(fault.body(state.mode))).into_response()
}

async fn index(body: Bytes) -> &'static str {
    debug!(body = %String::from_utf8_lossy(&body), "GET /");
    "A GET Request"
}

async fn index_post(body: Bytes) -> &'static str {
    debug!(body = %String::from_utf8_lossy(&body), "POST /");
    "POST request received."
}

async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> std::result::Result<impl IntoResponse, RegistrationError> {
    let request = parse_registration(&headers, &body)?;
    let user = state.registry.register(&request).await?;
    let location = user_location(&user.id);

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(user)))
}

async fn list_users(
    State(state): State<AppState>,
) -> std::result::Result<Json<Vec<User>>, RegistrationError> {
    Ok(Json(state.registry.list().await?))
}

async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> std::result::Result<Json<User>, RegistrationError> {
    Ok(Json(state.registry.find(&user_id).await?))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> std::result::Result<StatusCode, RegistrationError> {
    state.registry.delete(&user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reads a registration body. Anything not sent as JSON counts as an
/// empty payload and fails on the first presence check.
fn parse_registration(headers: &HeaderMap, body: &[u8]) -> Result<RegistrationRequest> {
    if body.is_empty() || !has_json_content_type(headers) {
        return Ok(RegistrationRequest::default());
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| RegistrationError::MalformedPayload(e.to_string()))?;
    match value {
        Value::Object(_) => serde_json::from_value(value)
            .map_err(|e| RegistrationError::MalformedPayload(e.to_string())),
        Value::Array(_) => Ok(RegistrationRequest::default()),
        other => Err(RegistrationError::MalformedPayload(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}
