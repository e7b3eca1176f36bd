//! The cosmetic session gate.
//!
//! A signed-in user is nothing more than a small JSON record kept under one
//! key in local storage. Any non-empty credentials are accepted, no password
//! is ever stored, and nothing in the crate derives permissions from the
//! recorded role. The gate only decides whether a protected view is shown
//! or the user is sent to the login view.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::notification::{Notification, DEFAULT_DISMISS_AFTER};
use crate::shell::View;
use crate::storage::KeyValueStore;

/// Storage key holding the signed-in user.
pub const DEFAULT_STORAGE_KEY: &str = "user";

/// Recorded user type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Administrator.
    Admin,
    /// Regular user.
    #[default]
    User,
}

impl Role {
    /// Role inferred from an email address at login.
    #[must_use]
    pub fn infer_from_email(email: &str) -> Self {
        if email.contains("admin") {
            Self::Admin
        } else {
            Self::User
        }
    }

    /// Lowercase name of the role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(Error::InvalidChoice {
                field: "userType",
                value: s.to_string(),
                allowed: "admin, user".to_string(),
            }),
        }
    }
}

/// The persisted user entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub email: String,
    #[serde(rename = "type")]
    pub role: Role,
    pub name: String,
}

impl UserRecord {
    /// Name shown in the dashboard greeting.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

/// Input of the sign-up form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub user_type: Role,
}

/// Result of checking the gate before showing a protected view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Show the view to this user.
    Allow(UserRecord),
    /// Show this view instead.
    Redirect(View),
}

/// Session state on top of a key-value store.
#[derive(Debug)]
pub struct SessionGate<S> {
    storage: S,
    key: String,
    dismiss_after: Duration,
}

impl<S: KeyValueStore> SessionGate<S> {
    /// Create a gate storing the user under the default key.
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    /// Create a gate storing the user under `key`.
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            dismiss_after: DEFAULT_DISMISS_AFTER,
        }
    }

    /// Set how long the returned notifications stay visible.
    #[must_use]
    pub fn with_dismiss_after(mut self, dismiss_after: Duration) -> Self {
        self.dismiss_after = dismiss_after;
        self
    }

    /// The underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Sign in with any non-empty credentials.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredentials`] if either field is empty, or a
    /// storage error if the user cannot be written.
    pub fn login(&mut self, email: &str, password: &str) -> Result<(UserRecord, Notification)> {
        if email.is_empty() || password.is_empty() {
            return Err(Error::missing_credentials("Please fill in all fields"));
        }

        let user = UserRecord {
            email: email.to_string(),
            role: Role::infer_from_email(email),
            name: email.split('@').next().unwrap_or_default().to_string(),
        };
        self.store_user(&user)?;
        info!(email = %user.email, role = %user.role, "logged in");

        Ok((user, self.notify("Success", "Login successful!")))
    }

    /// Create an account and sign in as it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredentials`] if a field is empty,
    /// [`Error::PasswordMismatch`] if the confirmation differs, or a storage
    /// error if the user cannot be written.
    pub fn signup(&mut self, request: SignupRequest) -> Result<(UserRecord, Notification)> {
        let SignupRequest {
            name,
            email,
            password,
            confirm_password,
            user_type,
        } = request;

        if name.is_empty() || email.is_empty() || password.is_empty() || confirm_password.is_empty()
        {
            return Err(Error::missing_credentials("Please fill in all fields"));
        }
        if password != confirm_password {
            return Err(Error::PasswordMismatch);
        }

        let user = UserRecord {
            email,
            role: user_type,
            name,
        };
        self.store_user(&user)?;
        info!(email = %user.email, role = %user.role, "account created");

        Ok((user, self.notify("Success", "Account created successfully!")))
    }

    /// Acknowledge a password reset request. Nothing is sent or stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredentials`] if the email is empty.
    pub fn forgot_password(&self, email: &str) -> Result<Notification> {
        if email.is_empty() {
            return Err(Error::missing_credentials(
                "Please enter your email address",
            ));
        }
        debug!(email, "password reset requested");
        Ok(self.notify(
            "Password reset sent",
            "Check your email for password reset instructions",
        ))
    }

    /// Forget the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the entry cannot be removed.
    pub fn logout(&mut self) -> Result<Notification> {
        let removed = self.storage.remove(&self.key)?;
        info!(removed, "logged out");
        Ok(self.notify("Logged out", "You have been successfully logged out"))
    }

    /// The signed-in user, if any.
    ///
    /// An entry that does not parse reads as signed out.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the entry cannot be read.
    pub fn current_user(&self) -> Result<Option<UserRecord>> {
        let Some(raw) = self.storage.get(&self.key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(err) => {
                warn!(key = %self.key, error = %err, "ignoring unreadable user entry");
                Ok(None)
            }
        }
    }

    /// Decide whether a protected view may be shown.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the entry cannot be read.
    pub fn check(&self) -> Result<GateDecision> {
        Ok(match self.current_user()? {
            Some(user) => GateDecision::Allow(user),
            None => GateDecision::Redirect(View::Login),
        })
    }

    fn store_user(&mut self, user: &UserRecord) -> Result<()> {
        let json = serde_json::to_string(user)?;
        self.storage.set(&self.key, &json)
    }

    fn notify(&self, title: &str, description: &str) -> Notification {
        Notification::success(title, description).with_dismiss_after(self.dismiss_after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{LocalStorage, MemoryStorage};

    fn gate() -> SessionGate<MemoryStorage> {
        SessionGate::new(MemoryStorage::new())
    }

    fn signup_request() -> SignupRequest {
        SignupRequest {
            name: "Jane Doe".to_string(),
            email: "jane@company.com".to_string(),
            password: "secret".to_string(),
            confirm_password: "secret".to_string(),
            user_type: Role::User,
        }
    }

    #[test]
    fn test_login_infers_role_and_name() {
        let mut gate = gate();
        let (user, note) = gate.login("admin@company.com", "pw").unwrap();

        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.name, "admin");
        assert_eq!(note.title, "Success");
        assert_eq!(note.description, "Login successful!");
        assert_eq!(gate.current_user().unwrap(), Some(user));
    }

    #[test]
    fn test_login_regular_user() {
        let mut gate = gate();
        let (user, _) = gate.login("john.smith@company.com", "pw").unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(user.name, "john.smith");
    }

    #[test]
    fn test_login_requires_both_fields() {
        let mut gate = gate();
        let err = gate.login("", "pw").unwrap_err();
        assert!(matches!(err, Error::MissingCredentials { .. }));
        assert_eq!(err.to_string(), "Please fill in all fields");
        assert!(gate.login("a@b.c", "").is_err());
        assert_eq!(gate.current_user().unwrap(), None);
    }

    #[test]
    fn test_stored_value_has_no_password() {
        let mut gate = gate();
        gate.login("admin@company.com", "hunter2").unwrap();

        let raw = gate.storage().get(DEFAULT_STORAGE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["type"], "admin");
        assert_eq!(value["email"], "admin@company.com");
        assert_eq!(value["name"], "admin");
        assert!(!raw.contains("hunter2"));
    }

    #[test]
    fn test_signup_success() {
        let mut gate = gate();
        let request = SignupRequest {
            user_type: Role::Admin,
            ..signup_request()
        };
        let (user, note) = gate.signup(request).unwrap();

        assert_eq!(user.name, "Jane Doe");
        assert_eq!(user.role, Role::Admin);
        assert_eq!(note.description, "Account created successfully!");
        assert!(gate.current_user().unwrap().is_some());
    }

    #[test]
    fn test_signup_password_mismatch() {
        let mut gate = gate();
        let request = SignupRequest {
            confirm_password: "other".to_string(),
            ..signup_request()
        };
        let err = gate.signup(request).unwrap_err();

        assert!(matches!(err, Error::PasswordMismatch));
        assert_eq!(err.to_string(), "Passwords do not match");
        assert_eq!(gate.current_user().unwrap(), None);
    }

    #[test]
    fn test_signup_missing_field() {
        let mut gate = gate();
        let request = SignupRequest {
            name: String::new(),
            ..signup_request()
        };
        assert!(matches!(
            gate.signup(request),
            Err(Error::MissingCredentials { .. })
        ));
    }

    #[test]
    fn test_forgot_password() {
        let gate = gate();
        let note = gate.forgot_password("jane@company.com").unwrap();
        assert_eq!(note.title, "Password reset sent");

        let err = gate.forgot_password("").unwrap_err();
        assert_eq!(err.to_string(), "Please enter your email address");
        assert!(gate.storage().is_empty());
    }

    #[test]
    fn test_logout_removes_entry() {
        let mut gate = gate();
        gate.login("a@b.c", "pw").unwrap();

        let note = gate.logout().unwrap();
        assert_eq!(note.title, "Logged out");
        assert_eq!(gate.current_user().unwrap(), None);
        assert!(gate.storage().is_empty());

        // Logging out twice is harmless.
        assert!(gate.logout().is_ok());
    }

    #[test]
    fn test_garbage_entry_reads_as_signed_out() {
        let mut storage = MemoryStorage::new();
        storage.set(DEFAULT_STORAGE_KEY, "{not json").unwrap();
        let gate = SessionGate::new(storage);

        assert_eq!(gate.current_user().unwrap(), None);
        assert_eq!(gate.check().unwrap(), GateDecision::Redirect(View::Login));
    }

    #[test]
    fn test_check_allows_signed_in_user() {
        let mut gate = gate();
        let (user, _) = gate.login("a@b.c", "pw").unwrap();
        assert_eq!(gate.check().unwrap(), GateDecision::Allow(user));
    }

    #[test]
    fn test_custom_key_and_dismiss() {
        let mut gate = SessionGate::with_key(MemoryStorage::new(), "session")
            .with_dismiss_after(Duration::from_secs(2));
        let (_, note) = gate.login("a@b.c", "pw").unwrap();

        assert_eq!(note.dismiss_after, Duration::from_secs(2));
        assert!(gate.storage().get("session").unwrap().is_some());
        assert!(gate.storage().get(DEFAULT_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_gate_over_local_storage() {
        let mut gate = SessionGate::new(LocalStorage::open_in_memory().unwrap());
        gate.login("admin@company.com", "pw").unwrap();
        assert_eq!(
            gate.current_user().unwrap().map(|u| u.role),
            Some(Role::Admin)
        );
    }

    #[test]
    fn test_role_parse_and_display() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::User.to_string(), "user");
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let user = UserRecord {
            email: "a@b.c".to_string(),
            role: Role::User,
            name: String::new(),
        };
        assert_eq!(user.display_name(), "a@b.c");
    }
}
