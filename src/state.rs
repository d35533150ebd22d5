use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{media::FileStorage, notify::Notifier};

#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub storage: FileStorage,
    pub notifier: Notifier,
    pub auth: Arc<AuthSettings>,
}

/// Settings the auth flows need at request time.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    /// Base used to build verification and reset links.
    pub public_base_url: String,
}
