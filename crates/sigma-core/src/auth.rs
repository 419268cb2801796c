//! Sender allow-list.

use crate::config::TelegramConfig;
use std::collections::HashSet;
use tracing::warn;

/// Static set of senders permitted to use the assistant.
///
/// Built once at startup and shared read-only. An empty policy denies
/// everyone.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    allowed_sender_ids: HashSet<i64>,
}

impl AccessPolicy {
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            allowed_sender_ids: ids.into_iter().collect(),
        }
    }

    /// Build from the Telegram channel config, warning when nobody is allowed.
    pub fn from_config(config: &TelegramConfig) -> Self {
        let policy = Self::new(config.allowed_users.iter().copied());
        if policy.is_empty() {
            warn!("allow-list is empty: every sender will be denied");
        }
        policy
    }

    /// Whether `sender_id` may use the assistant.
    pub fn authorize(&self, sender_id: i64) -> bool {
        self.allowed_sender_ids.contains(&sender_id)
    }

    pub fn is_empty(&self) -> bool {
        self.allowed_sender_ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.allowed_sender_ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_listed_sender() {
        let policy = AccessPolicy::new([100, 200]);
        assert!(policy.authorize(100));
        assert!(policy.authorize(200));
        assert!(!policy.authorize(300));
    }

    #[test]
    fn test_empty_policy_fails_closed() {
        let policy = AccessPolicy::default();
        assert!(policy.is_empty());
        for id in [0, 1, -1, i64::MAX] {
            assert!(!policy.authorize(id));
        }
    }

    #[test]
    fn test_from_config_dedups() {
        let cfg = TelegramConfig {
            allowed_users: vec![5, 5, 6],
            ..Default::default()
        };
        let policy = AccessPolicy::from_config(&cfg);
        assert_eq!(policy.len(), 2);
    }
}
