//! Response caching profiles attached to controller actions.
//!
//! A profile only describes what intermediate caches may do with a response. Turning it
//! into headers is left to the host, [`ResponseCache::cache_control`] and
//! [`ResponseCache::pragma`] give the values to send.

/// Where a response may be cached.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheLocation {
    /// Any cache, shared or private.
    #[default]
    Any,
    /// Only the client's private cache.
    Client,
    /// Nowhere.
    None,
}

/// Caching profile of an action's response.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResponseCache {
    /// Max age in seconds.
    pub duration: u32,
    /// Where the response may be stored.
    pub location: CacheLocation,
    /// Forbid storing the response at all.
    pub no_store: bool,
}

impl ResponseCache {
    /// Create new `ResponseCache` allowing any cache to keep the response for `duration` seconds.
    #[inline]
    #[must_use]
    pub fn new(duration: u32) -> Self {
        Self {
            duration,
            location: CacheLocation::Any,
            no_store: false,
        }
    }

    /// Profile that keeps every cache away from the response.
    #[inline]
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            duration: 0,
            location: CacheLocation::None,
            no_store: true,
        }
    }

    /// Set where the response may be cached.
    #[inline]
    #[must_use]
    pub fn location(mut self, location: CacheLocation) -> Self {
        self.location = location;
        self
    }

    /// Set whether the response must not be stored.
    #[inline]
    #[must_use]
    pub fn no_store(mut self, no_store: bool) -> Self {
        self.no_store = no_store;
        self
    }

    /// Value of the `cache-control` header for this profile.
    #[must_use]
    pub fn cache_control(&self) -> String {
        if self.no_store {
            if self.location == CacheLocation::None {
                "no-store,no-cache".to_owned()
            } else {
                "no-store".to_owned()
            }
        } else {
            let directive = match self.location {
                CacheLocation::Any => "public",
                CacheLocation::Client => "private",
                CacheLocation::None => "no-cache",
            };
            format!("{directive},max-age={}", self.duration)
        }
    }

    /// Value of the legacy `pragma` header, when one is needed.
    #[inline]
    #[must_use]
    pub fn pragma(&self) -> Option<&'static str> {
        (self.location == CacheLocation::None).then_some("no-cache")
    }
}
