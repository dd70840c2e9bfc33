// src/infra/identity.rs — Anonymous visitor identity
//
// The visitor id namespaces every session in the history service. It is kept
// in `~/.support-chat/state/visitor.json` with cookie-like attributes and is
// regenerated only when the record is missing, unreadable or expired.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use super::prefs::{read_json, write_json_atomic};

/// Lifetime of a stored visitor id, in days.
pub const IDENTITY_EXPIRY_DAYS: i64 = 365;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorIdentity {
    pub id: String,
    pub expires_at: DateTime<Utc>,
    pub same_site: String,
    pub secure: bool,
}

impl VisitorIdentity {
    fn generate(secure: bool, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            expires_at: now + Duration::days(IDENTITY_EXPIRY_DAYS),
            same_site: "strict".into(),
            secure,
        }
    }

    fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.id.trim().is_empty() && self.expires_at > now
    }
}

/// What the rest of the client sees. Everything that talks to the history
/// service waits until `is_loaded` is true.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityState {
    pub user_id: String,
    pub is_loaded: bool,
}

impl IdentityState {
    pub fn is_ready(&self) -> bool {
        self.is_loaded && !self.user_id.is_empty()
    }
}

pub struct IdentityResolver {
    path: PathBuf,
}

impl IdentityResolver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the stored visitor id, creating one if needed.
    ///
    /// A failed write is not retried: the visitor simply gets a new id on the
    /// next run.
    pub fn resolve(&self, secure: bool) -> IdentityState {
        self.resolve_at(secure, Utc::now())
    }

    pub fn resolve_at(&self, secure: bool, now: DateTime<Utc>) -> IdentityState {
        let existing = read_json::<VisitorIdentity>(&self.path).filter(|v| v.is_valid(now));

        let identity = match existing {
            Some(identity) => identity,
            None => {
                let identity = VisitorIdentity::generate(secure, now);
                if let Err(e) = write_json_atomic(&self.path, &identity) {
                    tracing::warn!(
                        "Could not persist visitor id to {}: {e}",
                        self.path.display()
                    );
                } else {
                    tracing::debug!("Created visitor id {}", identity.id);
                }
                identity
            }
        };

        IdentityState {
            user_id: identity.id,
            is_loaded: true,
        }
    }

    /// Forget the stored id so the next `resolve` creates a new one.
    pub fn clear(&self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// The stored record, if any (for display).
    pub fn stored(&self) -> Option<VisitorIdentity> {
        read_json(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_not_ready() {
        let state = IdentityState::default();
        assert!(!state.is_loaded);
        assert!(!state.is_ready());
    }

    #[test]
    fn test_generated_identity_attributes() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = IdentityResolver::new(dir.path().join("visitor.json"));
        let now = Utc::now();
        let state = resolver.resolve_at(true, now);
        assert!(state.is_ready());
        assert!(Uuid::parse_str(&state.user_id).is_ok());

        let stored = resolver.stored().unwrap();
        assert_eq!(stored.id, state.user_id);
        assert_eq!(stored.same_site, "strict");
        assert!(stored.secure);
        assert_eq!(stored.expires_at, now + Duration::days(365));
    }

    #[test]
    fn test_expired_identity_regenerated() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = IdentityResolver::new(dir.path().join("visitor.json"));
        let start = Utc::now();
        let first = resolver.resolve_at(false, start);
        let later = resolver.resolve_at(false, start + Duration::days(364));
        assert_eq!(first.user_id, later.user_id);
        let expired = resolver.resolve_at(false, start + Duration::days(366));
        assert_ne!(first.user_id, expired.user_id);
    }

    #[test]
    fn test_unwritable_location_still_loads() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();
        let resolver = IdentityResolver::new(blocker.join("visitor.json"));
        let a = resolver.resolve(false);
        let b = resolver.resolve(false);
        assert!(a.is_ready());
        assert_ne!(a.user_id, b.user_id);
    }
}
