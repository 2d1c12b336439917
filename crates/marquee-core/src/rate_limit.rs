//! Fixed-window request rate limiting.
//!
//! A [`RateLimiter`] counts hits per `(policy, client)` key. Counters live in
//! process memory by default, or in Redis when several replicas must share them.
//! Attach a policy to a router with:
//!
//! ```ignore
//! router.route_layer(axum::middleware::from_fn_with_state(
//!     limiter.policy(RateLimitPolicy::LOGIN),
//!     enforce_rate_limit,
//! ))
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use deadpool_redis::Pool;
use deadpool_redis::redis::AsyncCommands;

use crate::error::AppError;

/// A named request budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub name: &'static str,
    pub max_requests: u64,
    pub window: Duration,
}

impl RateLimitPolicy {
    /// Every API route: 100 requests per 10 minutes.
    pub const GENERAL: Self = Self {
        name: "general",
        max_requests: 100,
        window: Duration::from_secs(10 * 60),
    };
    /// Login attempts: 5 per 15 minutes.
    pub const LOGIN: Self = Self {
        name: "login",
        max_requests: 5,
        window: Duration::from_secs(15 * 60),
    };
    /// Account creation: 10 per hour.
    pub const REGISTRATION: Self = Self {
        name: "registration",
        max_requests: 10,
        window: Duration::from_secs(60 * 60),
    };
    /// Password reset and verification mail: 3 per hour.
    pub const SENSITIVE: Self = Self {
        name: "sensitive",
        max_requests: 3,
        window: Duration::from_secs(60 * 60),
    };
}

/// Outcome of recording one hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Limited { retry_after_secs: u64 },
}

/// Once this many keys are tracked, expired windows are swept out.
const SWEEP_AFTER_KEYS: usize = 1024;
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct Window {
    started: Instant,
    length: Duration,
    count: u64,
}

impl Window {
    fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.started) >= self.length
    }
}

#[derive(Default)]
struct MemoryWindows {
    windows: HashMap<String, Window>,
    last_sweep: Option<Instant>,
}

impl MemoryWindows {
    fn sweep(&mut self, now: Instant) {
        if self.windows.len() < SWEEP_AFTER_KEYS
            || self
                .last_sweep
                .is_some_and(|at| now.duration_since(at) < SWEEP_INTERVAL)
        {
            return;
        }
        let before = self.windows.len();
        self.windows.retain(|_, window| !window.expired(now));
        self.last_sweep = Some(now);
        tracing::debug!(
            evicted = before - self.windows.len(),
            remaining = self.windows.len(),
            "swept expired rate limit windows"
        );
    }
}

#[derive(Clone)]
enum Backend {
    Memory(Arc<Mutex<MemoryWindows>>),
    Redis(Pool),
}

#[derive(Clone)]
pub struct RateLimiter {
    backend: Backend,
}

impl RateLimiter {
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::default()),
        }
    }

    pub fn redis(pool: Pool) -> Self {
        Self {
            backend: Backend::Redis(pool),
        }
    }

    /// Bind this limiter to a policy, yielding middleware state.
    pub fn policy(&self, policy: RateLimitPolicy) -> PolicyLimiter {
        PolicyLimiter {
            limiter: self.clone(),
            policy,
        }
    }

    /// Record one hit for `client` under `policy`.
    pub async fn hit(&self, policy: RateLimitPolicy, client: &str) -> Result<Decision, AppError> {
        let key = format!("rate_limit:{}:{}", policy.name, client);
        match &self.backend {
            Backend::Memory(windows) => Ok(hit_memory(windows, &key, policy, Instant::now())),
            Backend::Redis(pool) => hit_redis(pool, &key, policy).await,
        }
    }
}

fn hit_memory(
    store: &Mutex<MemoryWindows>,
    key: &str,
    policy: RateLimitPolicy,
    now: Instant,
) -> Decision {
    let mut store = store
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    store.sweep(now);
    let window = store.windows.entry(key.to_owned()).or_insert(Window {
        started: now,
        length: policy.window,
        count: 0,
    });
    if window.expired(now) {
        window.started = now;
        window.count = 0;
    }
    window.count += 1;
    if window.count > policy.max_requests {
        let elapsed = now.duration_since(window.started);
        let retry_after_secs = policy.window.saturating_sub(elapsed).as_secs().max(1);
        return Decision::Limited { retry_after_secs };
    }
    Decision::Allowed
}

async fn hit_redis(pool: &Pool, key: &str, policy: RateLimitPolicy) -> Result<Decision, AppError> {
    let mut conn = pool
        .get()
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    let count: u64 = conn
        .incr(key, 1)
        .await
        .map_err(|e: deadpool_redis::redis::RedisError| AppError::Internal(e.into()))?;
    if count == 1 {
        let _: bool = conn
            .expire(key, policy.window.as_secs() as i64)
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| AppError::Internal(e.into()))?;
    }
    if count > policy.max_requests {
        let ttl: i64 = conn
            .ttl(key)
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| AppError::Internal(e.into()))?;
        return Ok(Decision::Limited {
            retry_after_secs: ttl.max(1) as u64,
        });
    }
    Ok(Decision::Allowed)
}

/// Middleware state: a limiter bound to one policy.
#[derive(Clone)]
pub struct PolicyLimiter {
    limiter: RateLimiter,
    policy: RateLimitPolicy,
}

/// Identify the caller by the first `x-forwarded-for` hop, then the peer address.
fn client_key(req: &Request) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return forwarded.to_owned();
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

pub async fn enforce_rate_limit(
    State(state): State<PolicyLimiter>,
    req: Request,
    next: Next,
) -> Response {
    let client = client_key(&req);
    match state.limiter.hit(state.policy, &client).await {
        Ok(Decision::Allowed) => next.run(req).await,
        Ok(Decision::Limited { retry_after_secs }) => {
            tracing::warn!(policy = state.policy.name, client = %client, "rate limit exceeded");
            AppError::TooManyRequests { retry_after_secs }.into_response()
        }
        // Counter store unavailable: let the request through rather than lock everyone out.
        Err(e) => {
            tracing::warn!(policy = state.policy.name, error = %e, "rate limiter unavailable");
            next.run(req).await
        }
    }
}
