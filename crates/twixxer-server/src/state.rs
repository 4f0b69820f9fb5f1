use twixxer_core::{AccountService, FeedService, LogMailer, SessionSigner};
use twixxer_db::{ChirpRepository, Database, ProfileRepository};

use crate::config::ServerConfig;

pub type Accounts = AccountService<ProfileRepository, LogMailer>;
pub type Feed = FeedService<ProfileRepository, ChirpRepository>;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub accounts: Accounts,
    pub feed: Feed,
    pub signer: SessionSigner,
    /// Mark session cookies `Secure`.
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(db: &Database, config: &ServerConfig) -> Self {
        let accounts = AccountService::new(db.profile_repo(), LogMailer, config.base_url.clone());
        let feed = FeedService::new(db.profile_repo(), db.chirp_repo());
        Self {
            accounts,
            feed,
            signer: SessionSigner::new(config.session_secret.as_bytes()),
            secure_cookies: config.production,
        }
    }
}
