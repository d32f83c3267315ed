//! Shared types for the HTTP API layer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::core_state::CoreState;

/// Triage submissions allowed per client per window.
pub const TRIAGE_RATE_LIMIT: usize = 50;
/// 15 minutes.
pub const TRIAGE_RATE_WINDOW: Duration = Duration::from_secs(15 * 60);

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
/// Wraps `CoreState` plus the rate limiter.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
    pub rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self::with_limiter(core, RateLimiter::new())
    }

    pub fn with_limiter(core: Arc<CoreState>, limiter: RateLimiter) -> Self {
        Self {
            core,
            rate_limiter: Arc::new(Mutex::new(limiter)),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Rate limiter: per-client sliding window
// ═══════════════════════════════════════════════════════════

/// Per-client sliding-window rate limiter.
pub struct RateLimiter {
    windows: HashMap<String, Vec<Instant>>,
    limit: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_limits(TRIAGE_RATE_LIMIT, TRIAGE_RATE_WINDOW)
    }

    pub fn with_limits(limit: usize, window: Duration) -> Self {
        Self {
            windows: HashMap::new(),
            limit,
            window,
        }
    }

    /// Record a request for `key`. Returns `Err(retry_after_secs)` once the
    /// window is full.
    pub fn check(&mut self, key: &str) -> Result<(), u64> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&mut self, key: &str, now: Instant) -> Result<(), u64> {
        // Drop idle clients so the map does not grow without bound
        if self.windows.len() > 10_000 {
            let window = self.window;
            self.windows.retain(|_, entries| {
                entries
                    .last()
                    .is_some_and(|ts| now.duration_since(*ts) < window)
            });
        }

        let entries = self.windows.entry(key.to_string()).or_default();
        entries.retain(|ts| now.duration_since(*ts) < self.window);

        if entries.len() >= self.limit {
            // The oldest entry leaves the window first
            let oldest = entries.first().copied().unwrap_or(now);
            let remaining = self.window.saturating_sub(now.duration_since(oldest));
            return Err(remaining.as_secs().max(1));
        }

        entries.push(now);
        Ok(())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limiter_allows_under_limit() {
        let mut limiter = RateLimiter::new();
        for _ in 0..TRIAGE_RATE_LIMIT {
            assert!(limiter.check("10.0.0.1").is_ok());
        }
    }

    #[test]
    fn rate_limiter_rejects_request_over_limit() {
        let mut limiter = RateLimiter::new();
        for _ in 0..TRIAGE_RATE_LIMIT {
            limiter.check("10.0.0.1").unwrap();
        }
        let retry_after = limiter.check("10.0.0.1").unwrap_err();
        assert!(retry_after > 0 && retry_after <= TRIAGE_RATE_WINDOW.as_secs());
    }

    #[test]
    fn rate_limiter_isolates_clients() {
        let mut limiter = RateLimiter::with_limits(1, Duration::from_secs(60));
        assert!(limiter.check("client-1").is_ok());
        assert!(limiter.check("client-2").is_ok());
        assert!(limiter.check("client-1").is_err());
    }

    #[test]
    fn rate_limiter_window_slides() {
        let mut limiter = RateLimiter::with_limits(2, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.check_at("c", start).is_ok());
        assert!(limiter.check_at("c", start + Duration::from_secs(30)).is_ok());
        assert_eq!(limiter.check_at("c", start + Duration::from_secs(40)), Err(20));
        // First entry has aged out
        assert!(limiter.check_at("c", start + Duration::from_secs(61)).is_ok());
    }

    #[test]
    fn rejected_requests_do_not_extend_window() {
        let mut limiter = RateLimiter::with_limits(1, Duration::from_secs(10));
        let start = Instant::now();
        limiter.check_at("c", start).unwrap();
        assert!(limiter.check_at("c", start + Duration::from_secs(5)).is_err());
        assert!(limiter.check_at("c", start + Duration::from_secs(10)).is_ok());
    }
}
