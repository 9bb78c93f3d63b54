use std::{
    collections::HashMap,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Dashboard login credentials used by the login handler.
#[derive(Debug, Clone)]
pub struct AuthState {
    users: Arc<HashMap<String, String>>,
    pub enabled: bool,
}

impl AuthState {
    /// Builds the credential table from `SERPLENS_USERS`
    /// (comma-separated `user:secret` pairs).
    ///
    /// In development, empty/missing credentials disable the login check
    /// for local iteration. In non-development envs, empty/missing
    /// credentials fail startup.
    ///
    /// # Errors
    ///
    /// Fails when credentials are absent outside development, or when an
    /// entry is not a `user:secret` pair.
    pub fn from_env(is_development: bool) -> anyhow::Result<Self> {
        let raw = std::env::var("SERPLENS_USERS").unwrap_or_default();
        Self::from_raw(&raw, is_development)
    }

    pub(crate) fn from_raw(raw: &str, is_development: bool) -> anyhow::Result<Self> {
        let mut users = HashMap::new();
        for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let Some((username, secret)) = entry.split_once(':') else {
                anyhow::bail!("SERPLENS_USERS entries must be user:secret pairs");
            };
            if username.trim().is_empty() || secret.is_empty() {
                anyhow::bail!("SERPLENS_USERS entries must be user:secret pairs");
            }
            users.insert(username.trim().to_string(), secret.to_string());
        }

        if users.is_empty() {
            if is_development {
                tracing::warn!(
                    "SERPLENS_USERS not set; login check disabled in development environment"
                );
                return Ok(Self {
                    users: Arc::new(HashMap::new()),
                    enabled: false,
                });
            }

            anyhow::bail!(
                "SERPLENS_USERS is required outside development; provide comma-separated user:secret pairs"
            );
        }

        Ok(Self {
            users: Arc::new(users),
            enabled: true,
        })
    }

    /// Constant-time credential check. Unknown usernames still run the
    /// comparison against an empty secret so timing does not reveal
    /// which usernames exist.
    #[must_use]
    pub fn verify(&self, username: &str, password: &str) -> bool {
        if !self.enabled {
            return true;
        }
        let stored = self.users.get(username);
        let expected = stored.map_or("", String::as_str);
        let secret_matches: bool = expected.as_bytes().ct_eq(password.as_bytes()).into();
        secret_matches && stored.is_some()
    }
}

#[derive(Debug, Clone)]
struct RateLimitWindow {
    started_at: Instant,
    count: usize,
}

/// Expired windows are swept once the map reaches this many clients.
const RATE_LIMIT_SWEEP_THRESHOLD: usize = 1024;

/// Fixed-window limiter shielding the provider quota, keyed by client
/// address so one busy client cannot exhaust everyone's budget.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    windows: Arc<Mutex<HashMap<IpAddr, RateLimitWindow>>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

/// Client key for rate limiting: the connected peer address when the
/// listener provides one, else a shared fallback bucket.
fn client_key(req: &Request) -> IpAddr {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED), |info| info.0.ip())
}

#[derive(Debug, Serialize)]
struct MiddlewareErrorBody {
    error: MiddlewareError,
}

#[derive(Debug, Serialize)]
struct MiddlewareError {
    code: &'static str,
    message: &'static str,
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is
/// used. Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware enforcing a fixed request-per-window limit per client.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let key = client_key(&req);
    let mut windows = rate_limit.windows.lock().await;

    if windows.len() >= RATE_LIMIT_SWEEP_THRESHOLD {
        let max_age = rate_limit.window;
        windows.retain(|_, w| w.started_at.elapsed() < max_age);
    }

    let window = windows.entry(key).or_insert_with(|| RateLimitWindow {
        started_at: Instant::now(),
        count: 0,
    });

    if window.started_at.elapsed() >= rate_limit.window {
        window.started_at = Instant::now();
        window.count = 0;
    }

    if window.count >= rate_limit.max_requests {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(MiddlewareErrorBody {
                error: MiddlewareError {
                    code: "rate_limited",
                    message: "Engine is busy. Try again soon.",
                },
            }),
        )
            .into_response();
    }

    window.count += 1;
    drop(windows);

    next.run(req).await
}
