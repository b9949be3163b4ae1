//! Per-client request throttling.
//!
//! The policy is an explicit value constructed at startup and passed into
//! router construction — no process-global mutable state. Counters live
//! behind the [`CounterStore`] trait so a multi-node deployment can point
//! them at a shared external store; [`MemoryCounters`] covers the
//! single-node case and tests.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex},
  time::{Duration, Instant},
};

use axum::{
  extract::{Request, State},
  http::{HeaderValue, StatusCode, header},
  middleware::Next,
  response::{IntoResponse, Response},
};

use crate::auth::USER_ID_HEADER;

// ─── Policy ──────────────────────────────────────────────────────────────────

/// A fixed-window throttle: at most `max_requests` per `window` per client
/// key.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
  pub max_requests: u32,
  pub window:       Duration,
}

impl RateLimitPolicy {
  pub fn per_minute(max_requests: u32) -> Self {
    Self { max_requests, window: Duration::from_secs(60) }
  }
}

// ─── Counter storage ─────────────────────────────────────────────────────────

/// Result of counting one request against a window.
#[derive(Debug, Clone, Copy)]
pub struct WindowHit {
  /// Requests seen in the current window, this one included.
  pub count:    u32,
  /// Time until the window resets.
  pub resets_in: Duration,
}

/// Where the per-key window counters live. The middleware itself is
/// stateless; deployments that run more than one node implement this over
/// a shared store so every node sees the same counts.
pub trait CounterStore: Send + Sync {
  fn hit(&self, key: &str, window: Duration) -> WindowHit;
}

/// In-process counter map for single-node deployments and tests.
#[derive(Default)]
pub struct MemoryCounters {
  windows: Mutex<HashMap<String, (Instant, u32)>>,
}

impl CounterStore for MemoryCounters {
  fn hit(&self, key: &str, window: Duration) -> WindowHit {
    let now = Instant::now();
    let mut map = self.windows.lock().expect("counter lock poisoned");

    // Drop expired windows once the map grows past a nominal bound.
    if map.len() > 4096 {
      map.retain(|_, (start, _)| now < *start + window);
    }

    let (start, count) = *map
      .entry(key.to_owned())
      .and_modify(|(start, count)| {
        if now >= *start + window {
          *start = now;
          *count = 1;
        } else {
          *count += 1;
        }
      })
      .or_insert((now, 1));

    WindowHit {
      count,
      resets_in: (start + window).saturating_duration_since(now),
    }
  }
}

// ─── Middleware ──────────────────────────────────────────────────────────────

/// Policy plus counter backend, threaded into the middleware as state.
pub struct RateLimiter {
  policy:   RateLimitPolicy,
  counters: Box<dyn CounterStore>,
}

impl RateLimiter {
  pub fn new(policy: RateLimitPolicy, counters: impl CounterStore + 'static) -> Self {
    Self { policy, counters: Box::new(counters) }
  }
}

/// One bucket per caller identity and path. Unauthenticated requests share
/// a bucket per path.
fn client_key(req: &Request) -> String {
  let identity = req
    .headers()
    .get(USER_ID_HEADER)
    .and_then(|v| v.to_str().ok())
    .unwrap_or("anonymous");
  format!("{identity}:{}", req.uri().path())
}

pub async fn rate_limit(
  State(limiter): State<Arc<RateLimiter>>,
  req: Request,
  next: Next,
) -> Response {
  let policy = limiter.policy;
  let hit = limiter.counters.hit(&client_key(&req), policy.window);

  if hit.count > policy.max_requests {
    let retry_after = hit.resets_in.as_secs().max(1);
    let mut res =
      (StatusCode::TOO_MANY_REQUESTS, "too many requests").into_response();
    let headers = res.headers_mut();
    headers.insert(header::RETRY_AFTER, header_num(retry_after));
    headers.insert("x-ratelimit-limit", header_num(policy.max_requests as u64));
    headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
    return res;
  }

  let remaining = policy.max_requests.saturating_sub(hit.count);
  let mut res = next.run(req).await;
  let headers = res.headers_mut();
  headers.insert("x-ratelimit-limit", header_num(policy.max_requests as u64));
  headers.insert("x-ratelimit-remaining", header_num(remaining as u64));
  res
}

fn header_num(n: u64) -> HeaderValue {
  HeaderValue::from_str(&n.to_string())
    .unwrap_or_else(|_| HeaderValue::from_static("0"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn counts_within_window() {
    let counters = MemoryCounters::default();
    let window = Duration::from_secs(60);

    assert_eq!(counters.hit("k", window).count, 1);
    assert_eq!(counters.hit("k", window).count, 2);
    assert_eq!(counters.hit("k", window).count, 3);
  }

  #[test]
  fn keys_are_independent() {
    let counters = MemoryCounters::default();
    let window = Duration::from_secs(60);

    counters.hit("a", window);
    counters.hit("a", window);
    assert_eq!(counters.hit("b", window).count, 1);
  }

  #[test]
  fn expired_window_resets() {
    let counters = MemoryCounters::default();
    let window = Duration::from_millis(1);

    counters.hit("k", window);
    std::thread::sleep(Duration::from_millis(5));
    assert_eq!(counters.hit("k", window).count, 1);
  }
}
