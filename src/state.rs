use std::sync::Arc;

use sqlx::PgPool;

use crate::identity::JwtIdentityProvider;
use crate::session::SessionResolver;
use crate::tasks::TaskService;

/// Process-wide handles, built once in `main` and cloned into each request.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub tokens: Arc<JwtIdentityProvider>,
    pub tasks: Arc<TaskService>,
    pub sessions: Arc<dyn SessionResolver>,
    pub token_ttl_hours: i64,
}
