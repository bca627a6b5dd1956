//! Server-side session tokens.
//!
//! The client persists one opaque token; everything that matters about it
//! lives here. Tokens are random UUIDs mapped to the user id with an explicit
//! expiry, validated against the caller's clock on every resolution - the
//! client-stored cookie's own expiry is not trusted.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use resale_core::UserId;

#[derive(Debug, Clone)]
struct Session {
    user_id: UserId,
    expires_at: DateTime<Utc>,
}

/// Issues and resolves opaque session tokens.
#[derive(Debug)]
pub struct SessionManager {
    sessions: Mutex<HashMap<Uuid, Session>>,
    ttl: chrono::Duration,
}

impl SessionManager {
    /// Create a manager whose tokens live for `ttl` from issuance.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
        }
    }

    /// Issue a fresh token for a logged-in user.
    #[must_use]
    pub fn issue(&self, user_id: UserId, now: DateTime<Utc>) -> Uuid {
        let token = Uuid::new_v4();
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.insert(
                token,
                Session {
                    user_id,
                    expires_at: now + self.ttl,
                },
            );
        }
        token
    }

    /// Resolve a token to its user, expiring it when past its lifetime.
    #[must_use]
    pub fn resolve(&self, token: Uuid, now: DateTime<Utc>) -> Option<UserId> {
        let mut sessions = self.sessions.lock().ok()?;
        match sessions.get(&token) {
            Some(session) if session.expires_at > now => Some(session.user_id.clone()),
            Some(_) => {
                sessions.remove(&token);
                None
            }
            None => None,
        }
    }

    /// Invalidate one token (logout).
    pub fn revoke(&self, token: Uuid) {
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.remove(&token);
        }
    }

    /// Drop every expired session; returns how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        self.sessions.lock().map_or(0, |mut sessions| {
            let before = sessions.len();
            sessions.retain(|_, session| session.expires_at > now);
            before - sessions.len()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn user(id: &str) -> UserId {
        UserId::parse(id).unwrap()
    }

    #[test]
    fn issue_and_resolve() {
        let manager = SessionManager::new(Duration::from_secs(3600));
        let now = Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap();

        let token = manager.issue(user("alice"), now);
        assert_eq!(manager.resolve(token, now).unwrap().as_str(), "alice");

        // Tokens are opaque and unguessable; a different UUID resolves to nothing.
        assert!(manager.resolve(Uuid::new_v4(), now).is_none());
    }

    #[test]
    fn expiry_is_checked_against_the_injected_clock() {
        let manager = SessionManager::new(Duration::from_secs(3600));
        let now = Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap();
        let token = manager.issue(user("alice"), now);

        let just_before = now + chrono::Duration::seconds(3599);
        assert!(manager.resolve(token, just_before).is_some());

        let too_late = now + chrono::Duration::seconds(3601);
        assert!(manager.resolve(token, too_late).is_none());
        // Expired tokens stay dead even if the clock runs backwards afterwards.
        assert!(manager.resolve(token, now).is_none());
    }

    #[test]
    fn revoke_and_purge() {
        let manager = SessionManager::new(Duration::from_secs(60));
        let now = Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap();

        let kept = manager.issue(user("alice"), now + chrono::Duration::seconds(120));
        let dropped = manager.issue(user("bob"), now);
        let revoked = manager.issue(user("carol"), now);

        manager.revoke(revoked);
        assert!(manager.resolve(revoked, now).is_none());

        let purged = manager.purge_expired(now + chrono::Duration::seconds(90));
        assert_eq!(purged, 1);
        assert!(manager.resolve(dropped, now).is_none());
        assert!(manager.resolve(kept, now + chrono::Duration::seconds(150)).is_some());
    }
}
