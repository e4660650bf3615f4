// src/app.rs
use crate::config::Config;
use crate::directory::ClientDirectory;
use crate::error::CryptoResult;
use crate::seed;
use crate::session::SessionStore;
use chrono::Utc;
use log;

/// Owns both stores for the lifetime of one run. Screens and commands get
/// borrows of this; nothing else holds session or client state.
pub struct AppState {
    pub session: SessionStore,
    pub directory: ClientDirectory,
}

impl AppState {
    pub fn from_config(config: &Config) -> CryptoResult<Self> {
        let session = SessionStore::new(config.admin.clone(), config.argon2_params.clone())?;
        let clients = if config.seed_demo_clients {
            seed::demo_clients(Utc::now())
        } else {
            Vec::new()
        };
        log::info!("Starting with {} clients in the directory", clients.len());
        Ok(AppState {
            session,
            directory: ClientDirectory::new(clients),
        })
    }

    /// Authenticated and past the mandatory first-login password change.
    pub fn is_ready(&self) -> bool {
        self.session.is_authenticated() && !self.session.is_first_login()
    }
}
