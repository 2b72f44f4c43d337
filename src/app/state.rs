use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::PasswordCost;
use crate::generation::Generator;
use crate::store::Store;

/// Shared handler state. Every collaborator is injected by the entry point.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub generator: Generator,
    pub images_dir: PathBuf,
    pub session_ttl: chrono::Duration,
    pub password_cost: PasswordCost,
}
