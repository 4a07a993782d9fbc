use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use betweenlines_shared::{AudioAttachment, Letter, LetterDraft};
use betweenlines_store::LetterService;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::error::ServerError;

/// Room for the text fields and multipart framing on top of the audio.
const FORM_OVERHEAD: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub letters: LetterService,
    pub config: Arc<ServerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/letters", post(create_letter))
        .route("/api/letters/:id", get(get_letter))
        .route("/api/letters/:id/opened", post(mark_opened))
        .route("/audio/:key", get(audio_download))
        .layer(DefaultBodyLimit::max(
            state.config.max_audio_size + FORM_OVERHEAD,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct CreateLetterResponse {
    id: String,
    url: String,
}

#[derive(Serialize)]
struct OpenedResponse {
    opened: bool,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Accepts the compose form as `multipart/form-data`. The optional audio clip
/// travels in the `audio` file field.
async fn create_letter(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ServerError> {
    let mut draft = LetterDraft::default();
    let mut audio = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Multipart error", e))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "audio" {
            let file_name = field.file_name().unwrap_or("").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| multipart_error("Failed to read field", e))?;

            // browsers send an empty part when no file was picked
            if file_name.is_empty() && data.is_empty() {
                continue;
            }

            audio = Some(AudioAttachment::new(file_name, data));
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| multipart_error("Failed to read field", e))?;

        match name.as_str() {
            "title" => draft.title = Some(value),
            "body" => draft.body = Some(value),
            "recipientName" => draft.recipient_name = Some(value),
            "envelopeTheme" => draft.envelope_theme = Some(value),
            "letterTheme" => draft.letter_theme = Some(value),
            "musicUrl" => draft.music_url = Some(value),
            other => debug!(field = %other, "Ignoring unknown form field"),
        }
    }

    let id = state.letters.create(draft, audio).await?;
    let url = state.letters.shareable_url(&id);

    info!(id = %id, "Letter created via API");

    Ok((StatusCode::CREATED, Json(CreateLetterResponse { id, url })))
}

/// Bodies cut off by `DefaultBodyLimit` surface here as a multipart error.
fn multipart_error(context: &str, e: MultipartError) -> ServerError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge(format!("{}: {}", context, e.body_text()))
    } else {
        ServerError::BadRequest(format!("{}: {}", context, e.body_text()))
    }
}

async fn get_letter(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Letter>, ServerError> {
    state
        .letters
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ServerError::NotFound(format!("No letter with id {id}")))
}

async fn mark_opened(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OpenedResponse>, ServerError> {
    if state.letters.mark_opened(&id).await? {
        Ok(Json(OpenedResponse { opened: true }))
    } else {
        Err(ServerError::NotFound(format!("No letter with id {id}")))
    }
}

async fn audio_download(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let data = state
        .letters
        .audio(&key)
        .await?
        .ok_or_else(|| ServerError::NotFound("No such audio".to_string()))?;

    Ok(([(header::CONTENT_TYPE, audio_content_type(&key))], data))
}

fn audio_content_type(key: &str) -> &'static str {
    let ext = key.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("m4a") | Some("mp4") => "audio/mp4",
        Some("wav") => "audio/wav",
        Some("ogg") | Some("oga") => "audio/ogg",
        Some("webm") => "audio/webm",
        Some("aac") => "audio/aac",
        Some("flac") => "audio/flac",
        _ => "application/octet-stream",
    }
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use axum::response::Response;
    use betweenlines_store::{MemoryBlobStore, MemoryLetterStore};
    use tower::ServiceExt;

    use super::*;

    const ORIGIN: &str = "https://letters.example";
    const BOUNDARY: &str = "letterboundary";

    fn test_app() -> Router {
        let config = ServerConfig {
            public_origin: ORIGIN.into(),
            max_audio_size: 64,
            ..ServerConfig::default()
        };
        let letters = LetterService::new(
            Arc::new(MemoryLetterStore::new()),
            Arc::new(MemoryBlobStore::new(ORIGIN, config.max_audio_size)),
            ORIGIN,
        );
        build_router(AppState {
            letters,
            config: Arc::new(config),
        })
    }

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, &'a [u8]),
    }

    fn multipart_request(parts: &[Part<'_>]) -> Request<Body> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                Part::File(name, file_name, data) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                             Content-Type: audio/mpeg\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/letters")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app().oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_create_and_get_letter() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(multipart_request(&[
                Part::Text("title", "Hi"),
                Part::Text("body", "Hello there"),
                Part::Text("recipientName", "Sam"),
            ]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let created = json_body(response).await;
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["url"], format!("{ORIGIN}/l/{id}"));

        let response = app
            .oneshot(get_request(&format!("/api/letters/{id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let letter = json_body(response).await;
        assert_eq!(letter["id"], id.as_str());
        assert_eq!(letter["title"], "Hi");
        assert_eq!(letter["body"], "Hello there");
        assert_eq!(letter["recipientName"], "Sam");
        assert_eq!(letter["envelopeTheme"], "envelope-red");
        assert_eq!(letter["letterTheme"], "letter-sticky");
        assert!(letter["musicUrl"].is_null());
        assert!(letter["audioUrl"].is_null());
        assert_eq!(letter["opened"], false);
        assert!(letter["createdAt"].is_string());
    }

    #[tokio::test]
    async fn test_audio_round_trip() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(multipart_request(&[
                Part::Text("body", "Listen"),
                Part::File("audio", "hello.mp3", b"ID3-fake-mp3"),
            ]))
            .await
            .unwrap();
        let id = json_body(response).await["id"].as_str().unwrap().to_string();

        let letter = json_body(
            app.clone()
                .oneshot(get_request(&format!("/api/letters/{id}")))
                .await
                .unwrap(),
        )
        .await;
        let audio_url = letter["audioUrl"].as_str().unwrap();
        let path = audio_url.strip_prefix(ORIGIN).unwrap();

        let response = app.oneshot(get_request(path)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ID3-fake-mp3");
    }

    #[tokio::test]
    async fn test_empty_file_part_is_ignored() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(multipart_request(&[
                Part::Text("body", "No audio"),
                Part::File("audio", "", b""),
            ]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_missing_body_is_bad_request() {
        let response = test_app()
            .oneshot(multipart_request(&[Part::Text("title", "Only a title")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_oversized_audio_is_rejected() {
        let response = test_app()
            .oneshot(multipart_request(&[
                Part::Text("body", "Too loud"),
                Part::File("audio", "big.mp3", &[7u8; 128]),
            ]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_body_over_request_limit_is_too_large() {
        let huge = vec![7u8; 2 * 1024 * 1024];
        let response = test_app()
            .oneshot(multipart_request(&[
                Part::Text("body", "Far too loud"),
                Part::File("audio", "huge.mp3", &huge),
            ]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_letter_is_not_found() {
        let response = test_app()
            .oneshot(get_request("/api/letters/nonexistent-id"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_mark_opened() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(multipart_request(&[Part::Text("body", "Open me")]))
            .await
            .unwrap();
        let id = json_body(response).await["id"].as_str().unwrap().to_string();

        let opened = Request::builder()
            .method("POST")
            .uri(format!("/api/letters/{id}/opened"))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(opened).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let letter = json_body(
            app.clone()
                .oneshot(get_request(&format!("/api/letters/{id}")))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(letter["opened"], true);

        let missing = Request::builder()
            .method("POST")
            .uri("/api/letters/missing/opened")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(missing).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_audio_is_not_found() {
        let response = test_app()
            .oneshot(get_request("/audio/1_missing.mp3"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_audio_content_type() {
        assert_eq!(audio_content_type("1_a.MP3"), "audio/mpeg");
        assert_eq!(audio_content_type("1_a.m4a"), "audio/mp4");
        assert_eq!(audio_content_type("1_noext"), "application/octet-stream");
    }
}
