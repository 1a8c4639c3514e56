use std::sync::Arc;

use axum::{Extension, Json};
use serde_json::{json, Value as JsonValue};

use crate::session::SessionStore;

/// GET /
pub async fn hello() -> &'static str {
    "Hello World!"
}

/// GET /stats
pub async fn stats(Extension(store): Extension<Arc<SessionStore>>) -> Json<JsonValue> {
    Json(json!({
        "activeSessions": {
            "total": store.count().await,
        }
    }))
}
