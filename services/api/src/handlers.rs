use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::resources::ResourceSpec;
use crate::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "fleet-api"
    }))
}

pub async fn list_documents(
    State(state): State<AppState>,
    Extension(resource): Extension<&'static ResourceSpec>,
) -> Result<Json<Value>, ApiError> {
    let documents = state.store.stream_all(resource.collection).await?;
    Ok(Json(Value::Array(documents)))
}

pub async fn get_document(
    State(state): State<AppState>,
    Extension(resource): Extension<&'static ResourceSpec>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    match state.store.get(resource.collection, &id).await? {
        Some(document) => Ok(Json(document)),
        None => Err(ApiError::NotFound(resource.not_found.to_string())),
    }
}

pub async fn create_document(
    State(state): State<AppState>,
    Extension(resource): Extension<&'static ResourceSpec>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let id = extract_id(&body)
        .ok_or_else(|| ApiError::BadRequest("ID is required".to_string()))?;

    state.store.set(resource.collection, &id, body).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("{} {} added successfully", resource.added_label, id)
        })),
    ))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Extension(resource): Extension<&'static ResourceSpec>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    // No existence check: delete reports success either way.
    state.store.delete(resource.collection, &id).await?;

    Ok(Json(json!({
        "message": format!("{} {} deleted successfully", resource.deleted_label, id)
    })))
}

/// The document key is whatever the body carries as `id`, coerced to a
/// string. Absent, empty, or non-scalar ids are unusable.
fn extract_id(body: &Value) -> Option<String> {
    match body.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_id_is_coerced_to_string() {
        assert_eq!(extract_id(&json!({ "id": 7 })), Some("7".to_string()));
    }

    #[test]
    fn string_id_is_used_as_is() {
        assert_eq!(
            extract_id(&json!({ "id": "FI-123", "model": "Panda" })),
            Some("FI-123".to_string())
        );
    }

    #[test]
    fn missing_id_is_rejected() {
        assert_eq!(extract_id(&json!({ "model": "Panda" })), None);
    }

    #[test]
    fn empty_id_is_rejected() {
        assert_eq!(extract_id(&json!({ "id": "" })), None);
    }

    #[test]
    fn non_scalar_ids_are_rejected() {
        assert_eq!(extract_id(&json!({ "id": null })), None);
        assert_eq!(extract_id(&json!({ "id": true })), None);
        assert_eq!(extract_id(&json!({ "id": [7] })), None);
        assert_eq!(extract_id(&json!({ "id": { "n": 7 } })), None);
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert_eq!(extract_id(&json!([1, 2, 3])), None);
        assert_eq!(extract_id(&json!("id")), None);
    }
}
