//! Remaining-lifetime response header.
//!
//! Each route table carries its own clock, reset when the table is built.
//! The time-to-live is the catalog poll interval: content can only change
//! at the next poll, so `max-age` counts down to the earliest moment a
//! new generation could exist.

use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

/// Per-build clock for the `Cache-Control: max-age` header.
#[derive(Clone, Copy, Debug)]
pub struct UptimeClock {
    started: Instant,
    time_to_live: Duration,
}

impl UptimeClock {
    pub fn new(time_to_live: Duration) -> Self {
        Self::starting_at(Instant::now(), time_to_live)
    }

    pub fn starting_at(started: Instant, time_to_live: Duration) -> Self {
        Self {
            started,
            time_to_live,
        }
    }

    /// Lifetime left; saturates at zero, never negative.
    pub fn remaining(&self) -> Duration {
        self.time_to_live.saturating_sub(self.started.elapsed())
    }

    fn max_age_value(&self) -> HeaderValue {
        let value = format!("max-age={}", self.remaining().as_secs());
        // Digits and ascii only, always a valid header value.
        HeaderValue::from_str(&value).expect("max-age header value")
    }
}

/// Middleware: stamp every response with the freshly computed max-age.
/// Sits outside the response cache so hits never replay a stale value.
pub(crate) async fn set_cache_control(
    State(clock): State<UptimeClock>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, clock.max_age_value());
    response
}
