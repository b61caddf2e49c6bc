//! Explicit admin session passed to every privileged approval operation.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub admin_id: String,
    pub display_name: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn issue(
        admin_id: impl Into<String>,
        display_name: impl Into<String>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            admin_id: admin_id.into(),
            display_name: display_name.into(),
            issued_at: now,
            expires_at: now
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Issue a session whose TTL is given in minutes.
    pub fn issue_for_minutes(
        admin_id: impl Into<String>,
        display_name: impl Into<String>,
        now: DateTime<Utc>,
        ttl_minutes: i64,
    ) -> Self {
        let ttl = Duration::try_minutes(ttl_minutes).unwrap_or_else(Duration::max_value);
        Self::issue(admin_id, display_name, now, ttl)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn authorize(&self, now: DateTime<Utc>) -> Result<(), SessionError> {
        if self.is_expired(now) {
            return Err(SessionError::Expired {
                admin_id: self.admin_id.clone(),
                expired_at: self.expires_at,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session for admin '{admin_id}' expired at {expired_at}")]
    Expired {
        admin_id: String,
        expired_at: DateTime<Utc>,
    },
}
