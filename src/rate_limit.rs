use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use governor::clock::{Clock, DefaultClock};
use governor::middleware::StateInformationMiddleware;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};

use crate::error::{ClassifiedError, ErrorKind};

const RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATELIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");
const RETRY_AFTER: HeaderName = HeaderName::from_static("retry-after");

type KeyedLimiter =
  RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock, StateInformationMiddleware>;

/// Per-client request budget for the chat route, refilled over one minute.
pub struct ChatRateLimit {
  limiter: KeyedLimiter,
  clock: DefaultClock,
  limit: NonZeroU32,
}

impl ChatRateLimit {
  pub fn per_minute(limit: NonZeroU32) -> Self {
    let clock = DefaultClock::default();
    let limiter = RateLimiter::dashmap_with_clock(Quota::per_minute(limit), &clock)
      .with_middleware::<StateInformationMiddleware>();
    Self {
      limiter,
      clock,
      limit,
    }
  }

  fn annotate(&self, headers: &mut HeaderMap, remaining: u32, reset: Option<u64>) {
    headers.insert(RATELIMIT_LIMIT, HeaderValue::from(self.limit.get()));
    headers.insert(RATELIMIT_REMAINING, HeaderValue::from(remaining));
    if let Some(secs) = reset {
      headers.insert(RATELIMIT_RESET, HeaderValue::from(secs));
      headers.insert(RETRY_AFTER, HeaderValue::from(secs));
    }
  }
}

fn whole_seconds(wait: Duration) -> u64 {
  wait.as_secs() + u64::from(wait.subsec_nanos() > 0)
}

/// Clients are keyed by peer address; without connect info they share one bucket.
pub async fn limit_chat(
  State(limit): State<Arc<ChatRateLimit>>,
  req: Request,
  next: Next,
) -> Response {
  let client = req
    .extensions()
    .get::<ConnectInfo<SocketAddr>>()
    .map(|ConnectInfo(addr)| addr.ip())
    .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

  match limit.limiter.check_key(&client) {
    Ok(snapshot) => {
      let mut resp = next.run(req).await;
      limit.annotate(resp.headers_mut(), snapshot.remaining_burst_capacity(), None);
      resp
    }
    Err(not_until) => {
      let wait = whole_seconds(not_until.wait_time_from(limit.clock.now()));
      tracing::info!("Chat rate limit reached for {client}, retry in {wait}s");
      let mut resp = ClassifiedError::new(
        ErrorKind::RateLimit,
        429,
        "Too many chat requests, please try again later.",
      )
      .into_response();
      limit.annotate(resp.headers_mut(), 0, Some(wait));
      resp
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn wait_rounds_up_to_whole_seconds() {
    assert_eq!(whole_seconds(Duration::from_millis(2001)), 3);
    assert_eq!(whole_seconds(Duration::from_secs(2)), 2);
    assert_eq!(whole_seconds(Duration::ZERO), 0);
  }

  #[test]
  fn budget_is_per_client() {
    let limit = ChatRateLimit::per_minute(NonZeroU32::new(2).unwrap());
    let a = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
    let b = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

    assert!(limit.limiter.check_key(&a).is_ok());
    assert!(limit.limiter.check_key(&a).is_ok());
    assert!(limit.limiter.check_key(&a).is_err());
    assert!(limit.limiter.check_key(&b).is_ok());
  }
}
