use std::fmt;
use std::sync::Arc;

use progress_db::Database;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    /// `None` when the deployment never configured credentials; every
    /// request is then refused.
    pub credentials: Option<Credentials>,
}

/// The one username/password pair allowed to call the API.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Both blank values are treated as "not configured".
    pub fn from_parts(username: Option<String>, password: Option<String>) -> Option<Self> {
        match (username, password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Some(Self::new(u, p)),
            _ => None,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_parts_are_unconfigured() {
        assert!(Credentials::from_parts(None, Some("pw".into())).is_none());
        assert!(Credentials::from_parts(Some("admin".into()), Some(String::new())).is_none());
        assert!(Credentials::from_parts(Some("admin".into()), Some("pw".into())).is_some());
    }

    #[test]
    fn matches_exact_pair_only() {
        let creds = Credentials::new("admin", "pw");
        assert!(creds.matches("admin", "pw"));
        assert!(!creds.matches("admin", "PW"));
        assert!(!creds.matches("root", "pw"));
    }

    #[test]
    fn debug_hides_password() {
        let out = format!("{:?}", Credentials::new("admin", "hunter2"));
        assert!(out.contains("admin"));
        assert!(!out.contains("hunter2"));
    }
}
