// src/session.rs
use crate::config::{AdminConfig, Argon2Params};
use crate::crypto;
use crate::error::CryptoResult;
use log;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoginOutcome {
    pub success: bool,
    pub requires_password_change: bool,
}

/// Authentication state for the single admin account.
///
/// The current secret is kept only as an Argon2 PHC string. Nothing here is
/// persisted: a new store always starts from the configured credentials with
/// `is_first_login == true`.
pub struct SessionStore {
    admin: AdminConfig,
    argon2_params: Argon2Params,
    password_hash: String,
    is_authenticated: bool,
    admin_name: String,
    username: String,
    is_first_login: bool,
}

impl SessionStore {
    pub fn new(admin: AdminConfig, argon2_params: Argon2Params) -> CryptoResult<Self> {
        let password_hash = crypto::hash_password(&admin.initial_password, &argon2_params)?;
        Ok(SessionStore {
            admin,
            argon2_params,
            password_hash,
            is_authenticated: false,
            admin_name: String::new(),
            username: String::new(),
            is_first_login: true,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn admin_name(&self) -> &str {
        &self.admin_name
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn is_first_login(&self) -> bool {
        self.is_first_login
    }

    pub fn login(&mut self, username: &str, password: &str) -> LoginOutcome {
        log::info!("Login attempt: {}", username);
        if username != self.admin.username || !self.password_matches(password) {
            log::warn!("Login failed for {}", username);
            return LoginOutcome::default();
        }

        self.is_authenticated = true;
        self.admin_name = self.admin.display_name.clone();
        self.username = username.to_string();
        log::info!("Login successful (first login: {})", self.is_first_login);
        LoginOutcome {
            success: true,
            requires_password_change: self.is_first_login,
        }
    }

    /// Replaces the stored secret if `current_password` is right.
    /// Length and confirmation rules belong to the caller; see `forms`.
    pub fn change_password(&mut self, current_password: &str, new_password: &str) -> bool {
        if !self.password_matches(current_password) {
            log::warn!("Password change rejected: current password is incorrect");
            return false;
        }

        match crypto::hash_password(new_password, &self.argon2_params) {
            Ok(hash) => {
                self.password_hash = hash;
                self.is_first_login = false;
                log::info!("Password changed for {}", self.admin.username);
                true
            }
            Err(e) => {
                log::error!("Password change failed while hashing: {}", e);
                false
            }
        }
    }

    pub fn logout(&mut self) {
        log::info!("Logging out");
        self.is_authenticated = false;
        self.admin_name.clear();
        self.username.clear();
    }

    /// Checks a candidate against the current secret without changing state.
    pub fn verify_current_password(&self, candidate: &str) -> bool {
        self.password_matches(candidate)
    }

    #[cfg(test)]
    pub(crate) fn set_argon2_params(&mut self, argon2_params: Argon2Params) {
        self.argon2_params = argon2_params;
    }

    fn password_matches(&self, candidate: &str) -> bool {
        crypto::verify_password(&self.password_hash, candidate).unwrap_or_else(|e| {
            log::error!("Password verification error: {}", e);
            false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_session() -> SessionStore {
        let params = Argon2Params { m_cost: 1024, t_cost: 1, p_cost: 1 };
        SessionStore::new(AdminConfig::default(), params).expect("Session setup failed")
    }

    #[test]
    fn test_fresh_session_is_logged_out() {
        let session = fresh_session();
        assert!(!session.is_authenticated());
        assert!(session.is_first_login());
        assert_eq!(session.admin_name(), "");
        assert_eq!(session.username(), "");
    }

    #[test]
    fn test_first_login_requires_password_change() {
        let mut session = fresh_session();
        let outcome = session.login("admin", "admin123");
        assert_eq!(outcome, LoginOutcome { success: true, requires_password_change: true });
        assert!(session.is_authenticated());
        assert_eq!(session.admin_name(), "Admin User");
        assert_eq!(session.username(), "admin");
    }

    #[test]
    fn test_bad_credentials_leave_state_untouched() {
        let mut session = fresh_session();
        assert_eq!(session.login("admin", "wrong"), LoginOutcome::default());
        assert_eq!(session.login("root", "admin123"), LoginOutcome::default());
        assert!(!session.is_authenticated());
        assert_eq!(session.username(), "");
        assert!(session.is_first_login());
    }

    #[test]
    fn test_wrong_current_password_keeps_old_secret() {
        let mut session = fresh_session();
        assert!(!session.change_password("nope", "newpass1"));
        assert!(session.is_first_login());
        assert!(session.login("admin", "admin123").success);
        assert!(!session.login("admin", "newpass1").success);
    }

    #[test]
    fn test_password_change_scenario() {
        let mut session = fresh_session();
        assert_eq!(
            session.login("admin", "admin123"),
            LoginOutcome { success: true, requires_password_change: true }
        );
        assert!(session.change_password("admin123", "newpass1"));
        assert!(!session.is_first_login());

        session.logout();
        assert!(!session.login("admin", "admin123").success);
        assert_eq!(
            session.login("admin", "newpass1"),
            LoginOutcome { success: true, requires_password_change: false }
        );
    }

    #[test]
    fn test_first_login_flag_never_reverts() {
        let mut session = fresh_session();
        assert!(session.change_password("admin123", "second1"));
        assert!(session.change_password("second1", "third11"));
        assert!(!session.is_first_login());
        assert!(!session.change_password("wrong", "fourth1"));
        assert!(!session.is_first_login());
        session.logout();
        assert!(!session.is_first_login());
    }

    #[test]
    fn test_hashing_failure_keeps_old_secret_and_flag() {
        let mut session = fresh_session();
        session.set_argon2_params(Argon2Params { m_cost: 1024, t_cost: 0, p_cost: 1 });
        assert!(!session.change_password("admin123", "newpass1"));
        assert!(session.is_first_login());
        assert!(session.verify_current_password("admin123"));
        assert!(!session.verify_current_password("newpass1"));
    }

    #[test]
    fn test_logout_is_idempotent() {
        let mut session = fresh_session();
        session.login("admin", "admin123");
        session.logout();
        session.logout();
        assert!(!session.is_authenticated());
        assert_eq!(session.admin_name(), "");
        assert_eq!(session.username(), "");
    }
}
