//! Login attempt limiting
//!
//! Fixed window per key. Keys combine the actor class, client address and
//! email so one noisy client cannot lock out everybody behind the same
//! proxy.

use dashmap::DashMap;
use http::HeaderMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started: Instant,
}

#[derive(Debug, Clone)]
pub struct LoginLimiter {
    windows: Arc<DashMap<String, Window>>,
    max_attempts: u32,
    window: Duration,
}

impl LoginLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
            max_attempts,
            window,
        }
    }

    /// Count an attempt; `false` once the window is exhausted
    pub fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut entry = self.windows.entry(key.to_owned()).or_insert(Window {
            count: 0,
            started: now,
        });
        if now.duration_since(entry.started) >= self.window {
            entry.count = 0;
            entry.started = now;
        }
        entry.count += 1;
        entry.count <= self.max_attempts
    }

    /// Forget a key after a successful login
    pub fn reset(&self, key: &str) {
        self.windows.remove(key);
    }

    /// Drop windows that have run out
    pub fn cleanup(&self) -> usize {
        let before = self.windows.len();
        let now = Instant::now();
        self.windows
            .retain(|_, w| now.duration_since(w.started) < self.window);
        before - self.windows.len()
    }
}

/// Client address: first `X-Forwarded-For` entry, else "unknown"
pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .unwrap_or("unknown")
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_after_max_attempts() {
        let limiter = LoginLimiter::new(2, Duration::from_secs(60));
        assert!(limiter.check("a"));
        assert!(limiter.check("a"));
        assert!(!limiter.check("a"));
        assert!(limiter.check("b"));

        limiter.reset("a");
        assert!(limiter.check("a"));
    }

    #[test]
    fn window_expiry() {
        let limiter = LoginLimiter::new(1, Duration::ZERO);
        assert!(limiter.check("a"));
        assert!(limiter.check("a"));
        assert_eq!(limiter.cleanup(), 1);
    }

    #[test]
    fn forwarded_address() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers), "unknown");
        headers.insert("x-forwarded-for", "10.0.0.1, 172.16.0.1".parse().unwrap());
        assert_eq!(client_ip(&headers), "10.0.0.1");
    }
}
