//! Notebook HTTP API - JSON endpoints over the note repository.

pub mod config;
mod error;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use notebook_core::{parse_human_date, CreateNote, Note, NoteImage, NoteQuery, NoteService};
use notebook_surreal::SurrealNoteRepository;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use error::{HttpError, HttpResult};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    service: Arc<NoteService<SurrealNoteRepository>>,
}

impl AppState {
    pub fn new(repo: SurrealNoteRepository) -> Self {
        Self {
            service: Arc::new(NoteService::new(repo)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    contains: Option<String>,
    updated_from: Option<String>,
    max_header_size: Option<i64>,
    user_id: Option<i64>,
    limit: Option<i64>,
}

impl ListParams {
    fn is_empty(&self) -> bool {
        self.contains.is_none()
            && self.updated_from.is_none()
            && self.max_header_size.is_none()
            && self.user_id.is_none()
            && self.limit.is_none()
    }
}

#[derive(Deserialize)]
struct CreateNoteRequest {
    body: String,
    #[serde(default)]
    header_image: Option<NoteImage>,
    user_id: i64,
}

#[derive(Deserialize)]
struct UpdateBodyRequest {
    body: String,
}

#[derive(Deserialize)]
struct InitParams {
    #[serde(default = "default_sample_user")]
    user_id: i64,
}

fn default_sample_user() -> i64 {
    1
}

#[derive(Serialize)]
struct OkResponse {
    ok: bool,
}

#[derive(Serialize)]
struct DeletedResponse {
    deleted: u64,
}

#[derive(Serialize)]
struct InitResponse {
    index: String,
    seeded: usize,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/notes",
            get(list_notes).post(create_note).delete(remove_all_notes),
        )
        .route(
            "/api/notes/{id}",
            get(get_note).put(update_note_body).delete(remove_note),
        )
        .route("/api/notes/{id}/document", put(update_note_document))
        .route("/api/system/init", post(init_system))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_notes(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> HttpResult<Json<Vec<Note>>> {
    if params.is_empty() {
        return Ok(Json(state.service.get_all_notes().await?));
    }

    let updated_from = match params.updated_from {
        Some(ref s) => Some(parse_human_date(s).ok_or_else(|| {
            HttpError::new(StatusCode::BAD_REQUEST, format!("invalid date: {}", s))
        })?),
        None => None,
    };

    let query = NoteQuery {
        body_contains: params.contains,
        updated_from,
        max_header_size: params.max_header_size,
        user_id: params.user_id,
        limit: params.limit,
    };
    Ok(Json(state.service.find_notes(query).await?))
}

async fn get_note(State(state): State<AppState>, Path(id): Path<String>) -> HttpResult<Json<Note>> {
    match state.service.get_note(&id).await? {
        Some(note) => Ok(Json(note)),
        None => Err(HttpError::not_found(&id)),
    }
}

async fn create_note(
    State(state): State<AppState>,
    Json(request): Json<CreateNoteRequest>,
) -> HttpResult<(StatusCode, Json<Note>)> {
    let note = state
        .service
        .add_note(CreateNote {
            body: request.body,
            header_image: request.header_image,
            user_id: request.user_id,
        })
        .await?;
    tracing::info!(id = %note.id, user_id = note.user_id, "note created");
    Ok((StatusCode::CREATED, Json(note)))
}

async fn update_note_body(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateBodyRequest>,
) -> HttpResult<Json<OkResponse>> {
    if state.service.update_note_body(&id, request.body).await? {
        Ok(Json(OkResponse { ok: true }))
    } else {
        Err(HttpError::not_found(&id))
    }
}

async fn update_note_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateBodyRequest>,
) -> HttpResult<Json<OkResponse>> {
    if state.service.update_note_document(&id, request.body).await? {
        Ok(Json(OkResponse { ok: true }))
    } else {
        Err(HttpError::not_found(&id))
    }
}

async fn remove_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HttpResult<Json<OkResponse>> {
    if state.service.remove_note(&id).await? {
        Ok(Json(OkResponse { ok: true }))
    } else {
        Err(HttpError::not_found(&id))
    }
}

async fn remove_all_notes(State(state): State<AppState>) -> HttpResult<Json<DeletedResponse>> {
    let deleted = state.service.remove_all_notes().await?;
    Ok(Json(DeletedResponse { deleted }))
}

async fn init_system(
    State(state): State<AppState>,
    Query(params): Query<InitParams>,
) -> HttpResult<Json<InitResponse>> {
    let (notes, index) = state.service.seed_sample_notes(params.user_id).await?;
    tracing::info!(seeded = notes.len(), %index, "system initialised");
    Ok(Json(InitResponse {
        index,
        seeded: notes.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, Response};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn app() -> Router {
        let repo = SurrealNoteRepository::open_in_memory().await.unwrap();
        build_router(AppState::new(repo))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response<Body>) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create(app: &Router, body: Value) -> Value {
        let response = send(app, Method::POST, "/api/notes", Some(body)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await
    }

    #[tokio::test]
    async fn test_health() {
        let app = app().await;
        let response = send(&app, Method::GET, "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_create_and_get_note() {
        let app = app().await;

        let created = create(
            &app,
            json!({
                "body": "First note",
                "user_id": 4,
                "header_image": {
                    "image_size": 20,
                    "url": "http://localhost/a.png",
                    "thumbnail_url": "http://localhost/a_small.png"
                }
            }),
        )
        .await;
        let id = created["id"].as_str().unwrap().to_string();

        let response = send(&app, Method::GET, &format!("/api/notes/{}", id), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let fetched = json_body(response).await;
        assert_eq!(fetched, created);
        assert_eq!(fetched["header_image"]["image_size"], 20);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_body() {
        let app = app().await;
        let response = send(
            &app,
            Method::POST,
            "/api/notes",
            Some(json!({ "body": "  ", "user_id": 1 })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Bad Request");
    }

    #[tokio::test]
    async fn test_missing_note_is_404() {
        let app = app().await;

        let response = send(&app, Method::GET, "/api/notes/nope", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(
            &app,
            Method::PUT,
            "/api/notes/nope",
            Some(json!({ "body": "x" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(
            &app,
            Method::PUT,
            "/api/notes/nope/document",
            Some(json!({ "body": "x" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&app, Method::DELETE, "/api/notes/nope", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_body_and_document() {
        let app = app().await;
        let created = create(&app, json!({ "body": "Draft", "user_id": 1 })).await;
        let id = created["id"].as_str().unwrap().to_string();

        let response = send(
            &app,
            Method::PUT,
            &format!("/api/notes/{}", id),
            Some(json!({ "body": "Edited" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(
            &app,
            Method::PUT,
            &format!("/api/notes/{}/document", id),
            Some(json!({ "body": "Rewritten" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let fetched = json_body(send(&app, Method::GET, &format!("/api/notes/{}", id), None).await).await;
        assert_eq!(fetched["body"], "Rewritten");
        assert_eq!(fetched["created_on"], created["created_on"]);
    }

    #[tokio::test]
    async fn test_list_with_filters() {
        let app = app().await;
        create(&app, json!({ "body": "Groceries", "user_id": 1 })).await;
        create(&app, json!({ "body": "Groceries again", "user_id": 2 })).await;
        create(&app, json!({ "body": "Work", "user_id": 2 })).await;

        let all = json_body(send(&app, Method::GET, "/api/notes", None).await).await;
        assert_eq!(all.as_array().unwrap().len(), 3);

        let filtered = json_body(
            send(&app, Method::GET, "/api/notes?contains=grocer&user_id=2", None).await,
        )
        .await;
        let filtered = filtered.as_array().unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0]["body"], "Groceries again");

        let response = send(&app, Method::GET, "/api/notes?updated_from=someday", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_with_limit() {
        let app = app().await;
        for body in ["One", "Two", "Three"] {
            create(&app, json!({ "body": body, "user_id": 1 })).await;
        }

        let limited = json_body(send(&app, Method::GET, "/api/notes?limit=2", None).await).await;
        assert_eq!(limited.as_array().unwrap().len(), 2);

        let unlimited = json_body(send(&app, Method::GET, "/api/notes?limit=0", None).await).await;
        assert_eq!(unlimited.as_array().unwrap().len(), 3);

        let response = send(&app, Method::GET, "/api/notes?limit=-1", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_with_max_header_size() {
        let app = app().await;
        for (body, size) in [("Small", 10), ("Large", 20)] {
            create(
                &app,
                json!({
                    "body": body,
                    "user_id": 1,
                    "header_image": {
                        "image_size": size,
                        "url": "http://localhost/a.png",
                        "thumbnail_url": "http://localhost/a_small.png"
                    }
                }),
            )
            .await;
        }
        create(&app, json!({ "body": "No image", "user_id": 1 })).await;

        let found = json_body(
            send(&app, Method::GET, "/api/notes?max_header_size=15", None).await,
        )
        .await;
        let found = found.as_array().unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["body"], "Small");

        let response = send(&app, Method::GET, "/api/notes?max_header_size=big", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_remove_note_and_remove_all() {
        let app = app().await;
        let created = create(&app, json!({ "body": "Temp", "user_id": 1 })).await;
        create(&app, json!({ "body": "Other", "user_id": 1 })).await;
        let id = created["id"].as_str().unwrap().to_string();

        let response = send(&app, Method::DELETE, &format!("/api/notes/{}", id), None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, Method::DELETE, "/api/notes", None).await;
        assert_eq!(json_body(response).await, json!({ "deleted": 1 }));
    }

    #[tokio::test]
    async fn test_init_system_seeds_samples() {
        let app = app().await;
        create(&app, json!({ "body": "Replaced", "user_id": 9 })).await;

        let response = send(&app, Method::POST, "/api/system/init?user_id=5", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["seeded"], 4);
        assert_eq!(body["index"], "note_user_created");

        let all = json_body(send(&app, Method::GET, "/api/notes", None).await).await;
        let all = all.as_array().unwrap();
        assert_eq!(all.len(), 4);
        assert!(all.iter().all(|n| n["user_id"] == 5));
    }
}
