//! Short-lived cache of parsed suggestions, keyed by prompt signature.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::parse::TaskProposal;

struct CacheEntry {
    proposals: Vec<TaskProposal>,
    expires_at: Instant,
}

/// Fixed-TTL map from prompt signature to proposals. Expired entries are
/// dropped when read and swept on every insert.
pub struct SuggestionCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl SuggestionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cache key for a request: model and prompt identify the output.
    pub fn signature(model: &str, prompt: &str) -> String {
        format!("{model}\u{1f}{prompt}")
    }

    pub fn get(&self, key: &str) -> Option<Vec<TaskProposal>> {
        self.get_at(key, Instant::now())
    }

    pub(crate) fn get_at(&self, key: &str, now: Instant) -> Option<Vec<TaskProposal>> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.proposals.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: String, proposals: Vec<TaskProposal>) {
        self.insert_at(key, proposals, Instant::now());
    }

    pub(crate) fn insert_at(&self, key: String, proposals: Vec<TaskProposal>, now: Instant) {
        if self.ttl.is_zero() {
            return;
        }
        let Some(expires_at) = now.checked_add(self.ttl) else {
            tracing::warn!(ttl_secs = self.ttl.as_secs(), "cache ttl out of range, not caching");
            return;
        };
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|_, entry| entry.expires_at > now);
            entries.insert(
                key,
                CacheEntry {
                    proposals,
                    expires_at,
                },
            );
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::{Category, Frequency};
    use crate::suggest::parse::fallback_proposals;

    fn proposals() -> Vec<TaskProposal> {
        fallback_proposals(Category::Health, Frequency::Daily)
    }

    #[test]
    fn hit_before_expiry() {
        let cache = SuggestionCache::new(Duration::from_secs(60));
        let now = Instant::now();
        cache.insert_at("k".into(), proposals(), now);
        assert_eq!(cache.get_at("k", now + Duration::from_secs(59)), Some(proposals()));
    }

    #[test]
    fn expired_entries_are_dropped_on_read() {
        let cache = SuggestionCache::new(Duration::from_secs(60));
        let now = Instant::now();
        cache.insert_at("k".into(), proposals(), now);
        assert_eq!(cache.get_at("k", now + Duration::from_secs(60)), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn insert_sweeps_expired_entries() {
        let cache = SuggestionCache::new(Duration::from_secs(60));
        let now = Instant::now();
        cache.insert_at("old-1".into(), proposals(), now);
        cache.insert_at("old-2".into(), proposals(), now);
        assert_eq!(cache.len(), 2);

        cache.insert_at("new".into(), proposals(), now + Duration::from_secs(61));
        assert_eq!(cache.len(), 1);
        assert!(cache.get_at("new", now + Duration::from_secs(62)).is_some());
    }

    #[test]
    fn unrepresentable_ttl_skips_caching() {
        let cache = SuggestionCache::new(Duration::MAX);
        cache.insert("k".into(), proposals());
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_ttl_disables_caching() {
        let cache = SuggestionCache::new(Duration::ZERO);
        cache.insert("k".into(), proposals());
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn signature_separates_models() {
        assert_ne!(
            SuggestionCache::signature("a", "prompt"),
            SuggestionCache::signature("b", "prompt")
        );
    }
}
