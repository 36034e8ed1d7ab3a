use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;

/// Tokens are refreshed this long before the server-side expiry.
pub const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Lock-free cache for the application access token.
///
/// Concurrent callers may race to refresh an expired token; the last
/// stored token wins and both remain valid.
#[derive(Debug, Default)]
pub struct TokenCache {
    current: ArcSwapOption<CachedToken>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached token if it is not due for refresh at `now`.
    pub fn valid_at(&self, now: Instant) -> Option<String> {
        self.current
            .load_full()
            .filter(|t| now < t.refresh_at)
            .map(|t| t.value.clone())
    }

    pub fn get(&self) -> Option<String> {
        self.valid_at(Instant::now())
    }

    /// Cache a token issued at `now` that the server says lives `expires_in`.
    ///
    /// A lifetime past the clock's range is not cached at all.
    pub fn store_at(&self, value: String, expires_in: Duration, now: Instant) {
        let lifetime = expires_in.saturating_sub(REFRESH_MARGIN);
        let token = now
            .checked_add(lifetime)
            .map(|refresh_at| Arc::new(CachedToken { value, refresh_at }));
        self.current.store(token);
    }

    pub fn store(&self, value: String, expires_in: Duration) {
        self.store_at(value, expires_in, Instant::now());
    }

    /// Drop the cached token, e.g. after the directory refused it.
    pub fn invalidate(&self) {
        self.current.store(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_served_until_refresh_margin() {
        let cache = TokenCache::new();
        let now = Instant::now();
        cache.store_at("t1".into(), Duration::from_secs(3600), now);

        assert_eq!(cache.valid_at(now).as_deref(), Some("t1"));
        assert_eq!(
            cache.valid_at(now + Duration::from_secs(3539)).as_deref(),
            Some("t1")
        );
        assert_eq!(cache.valid_at(now + Duration::from_secs(3540)), None);
    }

    #[test]
    fn short_lived_token_is_never_served() {
        let cache = TokenCache::new();
        let now = Instant::now();
        cache.store_at("t1".into(), Duration::from_secs(30), now);
        assert_eq!(cache.valid_at(now), None);
    }

    #[test]
    fn unrepresentable_lifetime_is_not_cached() {
        let cache = TokenCache::new();
        let now = Instant::now();
        cache.store_at("t1".into(), Duration::from_secs(3600), now);
        cache.store_at("t2".into(), Duration::MAX, now);
        assert_eq!(cache.valid_at(now), None);
    }

    #[test]
    fn invalidate_clears_token() {
        let cache = TokenCache::new();
        cache.store("t1".into(), Duration::from_secs(3600));
        assert!(cache.get().is_some());
        cache.invalidate();
        assert!(cache.get().is_none());
    }
}
