use std::{sync::Arc, time::Duration};

use axum::{
    Json,
    Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    coordinator::{Coordinator, Fetch, Source},
    entity::{Entity, EntityState, SensorDescriptor},
    prelude::*,
};

struct AppState<F> {
    coordinator: Arc<Coordinator<F>>,
    entities: Vec<Entity>,
}

/// Entity states for the host platform.
pub fn router<F: Fetch + 'static>(coordinator: Arc<Coordinator<F>>) -> Router {
    let source: Arc<dyn Source> = coordinator.clone();
    let state = AppState { entities: Entity::all(&source), coordinator };
    Router::new()
        .route("/entities", get(list_entities::<F>))
        .route("/entities/{key}", get(get_entity::<F>))
        .route("/refresh", post(refresh::<F>))
        .with_state(Arc::new(state))
        .layer((TraceLayer::new_for_http(), TimeoutLayer::new(Duration::from_secs(30))))
}

#[derive(Serialize)]
struct EntityResponse {
    unique_id: String,

    #[serde(flatten)]
    descriptor: &'static SensorDescriptor,

    #[serde(flatten)]
    state: EntityState,
}

impl From<&Entity> for EntityResponse {
    fn from(entity: &Entity) -> Self {
        Self {
            unique_id: entity.descriptor().unique_id(),
            descriptor: entity.descriptor(),
            state: entity.state(),
        }
    }
}

async fn list_entities<F: Fetch>(State(state): State<Arc<AppState<F>>>) -> Json<Vec<EntityResponse>> {
    Json(state.entities.iter().map(EntityResponse::from).collect())
}

async fn get_entity<F: Fetch>(
    State(state): State<Arc<AppState<F>>>,
    Path(key): Path<String>,
) -> Result<Json<EntityResponse>, StatusCode> {
    state
        .entities
        .iter()
        .find(|entity| entity.descriptor().key == key)
        .map(|entity| Json(EntityResponse::from(entity)))
        .ok_or(StatusCode::NOT_FOUND)
}

#[instrument(skip_all)]
async fn refresh<F: Fetch>(State(state): State<Arc<AppState<F>>>) -> (StatusCode, String) {
    match state.coordinator.refresh().await {
        Ok(_) => (StatusCode::OK, state.coordinator.current_status().to_string()),
        Err(error) => {
            error!("on-demand refresh failed: {error}");
            (StatusCode::SERVICE_UNAVAILABLE, error.to_string())
        }
    }
}
