use std::time::{Duration, Instant};

use dashmap::DashMap;

const MAX_FAILURES: u32 = 5;
const WINDOW_SECS: u64 = 15 * 60;

/// Normalized like the username lookup: trimmed and case-insensitive.
fn key(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Per-username login brute force limiter.
#[derive(Default)]
pub struct LoginRateLimiter {
    /// username -> (failed_count, window_start)
    entries: DashMap<String, (u32, Instant)>,
}

impl LoginRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if login attempt is allowed. 5 failures per 15 minutes.
    /// Does NOT increment the counter; call `record_failure()` on bad credentials.
    /// Returns the seconds left in the window when blocked.
    pub fn check(&self, username: &str) -> Result<(), u64> {
        let window = Duration::from_secs(WINDOW_SECS);
        let now = Instant::now();

        let Some(entry) = self.entries.get(&key(username)) else {
            return Ok(());
        };

        let (count, start) = entry.value();

        if now.duration_since(*start) > window {
            return Ok(());
        }

        if *count >= MAX_FAILURES {
            let elapsed = now.duration_since(*start).as_secs();
            return Err(WINDOW_SECS.saturating_sub(elapsed));
        }

        Ok(())
    }

    pub fn record_failure(&self, username: &str) {
        let window = Duration::from_secs(WINDOW_SECS);
        let now = Instant::now();

        let mut entry = self.entries.entry(key(username)).or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > window {
            *count = 1;
            *start = now;
        } else {
            *count += 1;
        }
    }

    /// Forget failures after a successful login.
    pub fn reset(&self, username: &str) {
        self.entries.remove(&key(username));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_after_five_failures() {
        let limiter = LoginRateLimiter::new();
        for _ in 0..4 {
            limiter.record_failure("alice");
        }
        assert!(limiter.check("alice").is_ok());

        limiter.record_failure("Alice");
        assert!(limiter.check("ALICE").is_err());
        assert!(limiter.check("bob").is_ok());
    }

    #[test]
    fn padded_username_shares_the_window() {
        let limiter = LoginRateLimiter::new();
        for _ in 0..5 {
            limiter.record_failure("dave");
        }
        assert!(limiter.check("dave ").is_err());
        assert!(limiter.check("  Dave\t").is_err());

        limiter.reset(" dave");
        assert!(limiter.check("dave").is_ok());
    }

    #[test]
    fn reset_clears_failures() {
        let limiter = LoginRateLimiter::new();
        for _ in 0..5 {
            limiter.record_failure("carol");
        }
        limiter.reset("carol");
        assert!(limiter.check("carol").is_ok());
    }
}
