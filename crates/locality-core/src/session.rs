// crates/locality-core/src/session.rs
//! Typed session context with change notification.
//!
//! The store is built once at start-up and handed to whoever needs the
//! signed-in user (the HTTP backend reads its bearer token from it).
//! Components that display user data subscribe and are notified on every
//! change instead of re-reading ambient storage.
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    User,
    Admin,
    Shipper,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    #[serde(rename = "emailId")]
    pub email: Option<String>,
    pub phone_number: Option<String>,
    // The backend spells this field "profilePictute".
    #[serde(rename = "profilePictute", alias = "profilePicture")]
    pub profile_picture: Option<String>,
}

/// Body of a successful login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    /// Lifetime in seconds.
    pub expires_in: Option<u64>,
    pub roles: Vec<Role>,
    #[serde(flatten)]
    pub user: UserProfile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Absolute expiry, milliseconds since the Unix epoch.
    pub expires_at: Option<u64>,
    pub roles: Vec<Role>,
    pub user: UserProfile,
}

impl Session {
    pub fn from_login(resp: LoginResponse, now_ms: u64) -> Self {
        Self {
            access_token: resp.access_token.unwrap_or_default(),
            refresh_token: resp.refresh_token.unwrap_or_default(),
            token_type: resp
                .token_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Bearer".to_owned()),
            expires_at: resp
                .expires_in
                .filter(|s| *s > 0)
                .map(|s| now_ms.saturating_add(s.saturating_mul(1000))),
            roles: resp.roles,
            user: resp.user,
        }
    }

    /// The role that picks the dashboard: Admin, then Shipper, then User.
    pub fn primary_role(&self) -> Option<Role> {
        [Role::Admin, Role::Shipper, Role::User]
            .into_iter()
            .find(|r| self.roles.contains(r))
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.expires_at.is_some_and(|at| now_ms >= at)
    }

    /// `Authorization` header value, `None` without a token.
    pub fn authorization(&self) -> Option<String> {
        (!self.access_token.is_empty())
            .then(|| format!("{} {}", self.token_type, self.access_token))
    }
}

pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Shared, observable session. Cloning shares the same store.
#[derive(Debug, Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Option<Session>>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }

    pub fn sign_in(&self, session: Session) {
        self.tx.send_replace(Some(session));
    }

    pub fn sign_out(&self) {
        self.tx.send_if_modified(|s| s.take().is_some());
    }

    /// Edits the current session; subscribers are notified only when signed in.
    pub fn update(&self, f: impl FnOnce(&mut Session)) {
        self.tx.send_if_modified(|s| match s {
            Some(session) => {
                f(session);
                true
            }
            None => false,
        });
    }

    /// Profile edits (name, phone, picture) after a successful save.
    pub fn update_user(&self, f: impl FnOnce(&mut UserProfile)) {
        self.update(|s| f(&mut s.user));
    }

    pub(crate) fn authorization(&self) -> Option<String> {
        self.tx.borrow().as_ref().and_then(Session::authorization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login() -> LoginResponse {
        serde_json::from_str(
            r#"{
                "accessToken": "abc",
                "refreshToken": "r",
                "expiresIn": 60,
                "roles": ["User", "Shipper", "Auditor"],
                "userId": "u1",
                "userName": "dana",
                "emailId": "dana@example.com",
                "profilePictute": "https://img/1.png"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn login_maps_to_typed_session() {
        let s = Session::from_login(login(), 1_000);
        assert_eq!(s.token_type, "Bearer");
        assert_eq!(s.expires_at, Some(61_000));
        assert_eq!(s.roles, vec![Role::User, Role::Shipper, Role::Other]);
        assert_eq!(s.primary_role(), Some(Role::Shipper));
        assert_eq!(s.user.profile_picture.as_deref(), Some("https://img/1.png"));
        assert_eq!(s.authorization().as_deref(), Some("Bearer abc"));
        assert!(!s.is_expired(60_999));
        assert!(s.is_expired(61_000));
    }

    #[tokio::test]
    async fn subscribers_see_profile_updates() {
        let store = SessionStore::new();
        let mut rx = store.subscribe();

        store.update_user(|u| u.user_name = Some("ignored".into()));
        assert!(!rx.has_changed().unwrap());

        store.sign_in(Session::from_login(login(), 0));
        rx.changed().await.unwrap();

        store.update_user(|u| u.user_name = Some("Dana K".into()));
        rx.changed().await.unwrap();
        let name = rx.borrow().as_ref().and_then(|s| s.user.user_name.clone());
        assert_eq!(name.as_deref(), Some("Dana K"));

        store.sign_out();
        rx.changed().await.unwrap();
        assert!(!store.is_signed_in());
    }
}
