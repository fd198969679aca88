//! The credential pair supplied by the caller.

/// A student account: identifier plus portal password.
///
/// Created once per client and never mutated. The password is held in memory
/// only; nothing in this crate persists it.
#[derive(Clone)]
pub struct Account {
    pub username: String,
    pub password: String,
}

impl Account {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_password() {
        let account = Account::new("230701", "hunter2");
        let rendered = format!("{account:?}");
        assert!(rendered.contains("230701"));
        assert!(!rendered.contains("hunter2"));
    }
}
