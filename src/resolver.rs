//! Name resolution for senders and participants.
//!
//! Some archives list people by numeric profile id (`1234@facebook.com`)
//! instead of by name. A [`NameResolver`] turns those raw identifiers into
//! display names while the archive is parsed.

use std::collections::HashMap;

/// Maps a raw identifier from the archive to a display name.
///
/// Implementations must be idempotent from the parser's point of view and
/// should return the input unchanged when they cannot resolve it.
pub trait NameResolver: Send + Sync {
    /// Resolves `raw` to a display name.
    fn resolve(&self, raw: &str) -> String;
}

/// Returns every identifier unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl NameResolver for IdentityResolver {
    fn resolve(&self, raw: &str) -> String {
        raw.to_string()
    }
}

/// Resolves numeric profile ids from a prepared table.
///
/// # Example
///
/// ```
/// use fbchat_history::resolver::{NameResolver, ProfileResolver};
///
/// let resolver = ProfileResolver::new().with_profile(1234, "Billy Joel");
///
/// assert_eq!(resolver.resolve("1234@facebook.com"), "Billy Joel");
/// assert_eq!(resolver.resolve("1234"), "Billy Joel");
/// assert_eq!(resolver.resolve("Jack Stevenson"), "Jack Stevenson");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProfileResolver {
    profiles: HashMap<u64, String>,
}

impl ProfileResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a profile id → name entry.
    #[must_use]
    pub fn with_profile(mut self, id: u64, name: impl Into<String>) -> Self {
        self.profiles.insert(id, name.into());
        self
    }

    /// Number of known profiles.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Returns `true` if no profile is known.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    fn parse_id(raw: &str) -> Option<u64> {
        let raw = raw.trim();
        raw.strip_suffix("@facebook.com")
            .unwrap_or(raw)
            .parse()
            .ok()
    }
}

impl FromIterator<(u64, String)> for ProfileResolver {
    fn from_iter<T: IntoIterator<Item = (u64, String)>>(iter: T) -> Self {
        Self {
            profiles: iter.into_iter().collect(),
        }
    }
}

impl NameResolver for ProfileResolver {
    fn resolve(&self, raw: &str) -> String {
        Self::parse_id(raw)
            .and_then(|id| self.profiles.get(&id))
            .cloned()
            .unwrap_or_else(|| raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_resolver() {
        assert_eq!(IdentityResolver.resolve("100001@facebook.com"), "100001@facebook.com");
    }

    #[test]
    fn test_profile_resolver_miss_returns_input() {
        let resolver = ProfileResolver::new().with_profile(1, "One");
        assert_eq!(resolver.resolve("2@facebook.com"), "2@facebook.com");
        assert_eq!(resolver.resolve("not-an-id"), "not-an-id");
    }

    #[test]
    fn test_profile_resolver_from_iter() {
        let resolver: ProfileResolver = vec![(7, "Seven".to_string())].into_iter().collect();
        assert_eq!(resolver.len(), 1);
        assert_eq!(resolver.resolve("7@facebook.com"), "Seven");
    }
}
