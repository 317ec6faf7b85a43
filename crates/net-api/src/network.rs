//! HTTP routes for the network service

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use edge_shared_types::{Interface, NetworkSettings};

use crate::context::AppContext;
use crate::error::ServiceError;

type ApiResult<T> = std::result::Result<Json<T>, ServiceError>;

pub struct NetworkAPI;

impl NetworkAPI {
    pub fn router() -> Router<Arc<AppContext>> {
        Router::new()
            .route("/interfaces", get(get_all_interfaces).post(apply_settings))
            .route("/interfaces/mac/{mac}", get(get_interface_with_mac))
            .route("/interfaces/label/{label}", get(get_interface_with_label))
            .route("/labels", get(get_labels).put(set_labels))
            .route("/health", get(health_check))
    }
}

async fn get_all_interfaces(State(context): State<Arc<AppContext>>) -> ApiResult<NetworkSettings> {
    context.service.get_all_interfaces().await.map(Json)
}

async fn get_interface_with_mac(
    State(context): State<Arc<AppContext>>,
    Path(mac): Path<String>,
) -> ApiResult<Interface> {
    context.service.get_interface_with_mac(&mac).await.map(Json)
}

async fn get_interface_with_label(
    State(context): State<Arc<AppContext>>,
    Path(label): Path<String>,
) -> ApiResult<Interface> {
    context.service.get_interface_with_label(&label).await.map(Json)
}

async fn apply_settings(
    State(context): State<Arc<AppContext>>,
    body: std::result::Result<Json<NetworkSettings>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(settings) = body.map_err(|e| ServiceError::invalid_argument(e.body_text()))?;
    context.service.apply_settings(&settings).await?;
    Ok(Json(json!({})))
}

async fn get_labels(State(context): State<Arc<AppContext>>) -> ApiResult<BTreeMap<String, String>> {
    context.service.get_labels().await.map(Json)
}

async fn set_labels(
    State(context): State<Arc<AppContext>>,
    body: std::result::Result<Json<BTreeMap<String, String>>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(labels) = body.map_err(|e| ServiceError::invalid_argument(e.body_text()))?;
    context.service.set_labels(&labels).await?;
    Ok(Json(json!({})))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
