//! Admin notification feed: user, seller and order notifications are fetched
//! concurrently and merged newest first. A failing feed is logged and skipped.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::workflows::sellers::domain::timestamp;
use crate::workflows::sellers::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationFeed {
    Users,
    Sellers,
    Orders,
}

impl NotificationFeed {
    pub const ALL: [NotificationFeed; 3] = [
        NotificationFeed::Users,
        NotificationFeed::Sellers,
        NotificationFeed::Orders,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            NotificationFeed::Users => "users",
            NotificationFeed::Sellers => "sellers",
            NotificationFeed::Orders => "orders",
        }
    }
}

impl fmt::Display for NotificationFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "kind")]
    pub feed: NotificationFeed,
    pub message: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait NotificationSource: Send + Sync {
    async fn notifications(&self, feed: NotificationFeed) -> Result<Vec<Notification>, StoreError>;
}

/// Fetch every feed concurrently and merge once all have resolved.
pub async fn collect_notifications<S>(source: &S, limit: Option<usize>) -> Vec<Notification>
where
    S: NotificationSource + ?Sized,
{
    let (users, sellers, orders) = tokio::join!(
        source.notifications(NotificationFeed::Users),
        source.notifications(NotificationFeed::Sellers),
        source.notifications(NotificationFeed::Orders),
    );

    let mut merged = Vec::new();
    for (feed, result) in NotificationFeed::ALL.into_iter().zip([users, sellers, orders]) {
        match result {
            Ok(items) => merged.extend(items),
            Err(err) => warn!(%feed, error = %err, "notification feed unavailable; skipping"),
        }
    }

    merged.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    if let Some(limit) = limit {
        merged.truncate(limit);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    struct StaticFeeds {
        base: DateTime<Utc>,
        failing: Option<NotificationFeed>,
    }

    impl StaticFeeds {
        fn item(&self, feed: NotificationFeed, id: &str, minutes: i64) -> Notification {
            Notification {
                id: id.to_string(),
                feed,
                message: format!("{feed} event {id}"),
                created_at: self.base + Duration::minutes(minutes),
            }
        }
    }

    #[async_trait]
    impl NotificationSource for StaticFeeds {
        async fn notifications(
            &self,
            feed: NotificationFeed,
        ) -> Result<Vec<Notification>, StoreError> {
            if self.failing == Some(feed) {
                return Err(StoreError::Unavailable("connection refused".to_string()));
            }
            Ok(match feed {
                NotificationFeed::Users => vec![self.item(feed, "u1", 5)],
                NotificationFeed::Sellers => {
                    vec![self.item(feed, "s1", 1), self.item(feed, "s2", 30)]
                }
                NotificationFeed::Orders => vec![self.item(feed, "o1", 12)],
            })
        }
    }

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn merges_feeds_newest_first() {
        let source = StaticFeeds {
            base: base(),
            failing: None,
        };
        let merged = collect_notifications(&source, None).await;
        let ids: Vec<&str> = merged.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["s2", "o1", "u1", "s1"]);
    }

    #[tokio::test]
    async fn failing_feed_is_skipped_and_limit_applies() {
        let source = StaticFeeds {
            base: base(),
            failing: Some(NotificationFeed::Orders),
        };
        let merged = collect_notifications(&source, Some(2)).await;
        let ids: Vec<&str> = merged.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["s2", "u1"]);
    }
}
