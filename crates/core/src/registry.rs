//! Static registry of moderator identities.

use std::collections::HashSet;

use crate::constants::DEFAULT_MODERATORS;
use crate::types::UserId;

/// Fixed set of identities allowed to ban, unban, mute and unmute.
///
/// Populated once at startup. There is no mutation API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeratorRegistry {
    ids: HashSet<UserId>,
}

impl ModeratorRegistry {
    /// Build a registry from the given identities.
    pub fn new<I: IntoIterator<Item = UserId>>(ids: I) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// Whether `id` may perform moderation actions.
    pub fn is_moderator(&self, id: UserId) -> bool {
        self.ids.contains(&id)
    }

    /// Registered identities in ascending order.
    pub fn ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.ids.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of registered moderators.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no moderator is registered.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Default for ModeratorRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MODERATORS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry() {
        let registry = ModeratorRegistry::default();
        assert!(registry.is_moderator(22358445));
        assert!(!registry.is_moderator(0));
        assert!(!registry.is_moderator(-22358445));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_ids_sorted_and_deduplicated() {
        let registry = ModeratorRegistry::new([30, 10, 20, 10]);
        assert_eq!(registry.ids(), vec![10, 20, 30]);
    }

    #[test]
    fn test_empty_registry_rejects_everyone() {
        let registry = ModeratorRegistry::new([]);
        assert!(registry.is_empty());
        assert!(!registry.is_moderator(22358445));
    }
}
