//! Serves `/users` from two versioned implementations.
//!
//! ```text
//! cargo run -p apiver --example versioned_users
//! curl localhost:3000/users
//! curl 'localhost:3000/users?api-version=2.0'
//! curl -H 'api-version: 2.0' localhost:3000/users
//! ```

use std::sync::Arc;

use apiver::prelude::*;
use axum::extract::{Request, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

type Handler = fn() -> Value;

fn users_v1() -> Value {
    json!(["alice", "bob"])
}

fn users_v2() -> Value {
    json!({ "items": ["alice", "bob"], "total": 2 })
}

async fn list_users(
    State(catalog): State<Arc<ControllerCatalog<StaticDescriptor<Handler>>>>,
    request: Request,
) -> Result<Json<Value>, VersioningError> {
    let (parts, _body) = request.into_parts();
    let group = catalog
        .get("users")
        .ok_or_else(|| VersioningError::InvalidArgument("users controller is not registered".into()))?;
    let handler = group.create_controller(&parts)?;
    Ok(Json(handler()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let options = Arc::new(VersioningOptions::load("application.yaml")?);
    let catalog = ControllerCatalog::build(
        vec![
            StaticDescriptor::new("users", |_| Ok(users_v1 as Handler)).with_versions([ApiVersion::new(1, 0)]),
            StaticDescriptor::new("users", |_| Ok(users_v2 as Handler)).with_versions([ApiVersion::new(2, 0)]),
        ],
        Some(options),
    )?;

    let app = Router::new()
        .route("/users", get(list_users))
        .with_state(Arc::new(catalog));

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    axum::serve(listener, app).await?;
    Ok(())
}
