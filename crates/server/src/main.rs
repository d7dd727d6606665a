use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Instant};

use anyhow::Context;
use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use shared::{
    domain::SceneCount,
    error::{ApiError, ErrorCode},
    protocol::{GenerateResponse, COUNT_FIELD, PROMPT_FIELD},
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod config;
mod illustrator;
mod story;

use config::{load_settings, prepare_static_dir};
use illustrator::{Illustrator, PlaceholderIllustrator};
use story::plan_scenes;

#[derive(Clone)]
struct AppState {
    static_dir: PathBuf,
    illustrator: Arc<dyn Illustrator>,
}

#[derive(Debug)]
struct GenerateForm {
    prompt: String,
    count: SceneCount,
}

type ApiRejection = (StatusCode, Json<ApiError>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let static_dir = prepare_static_dir(&settings.static_dir).map_err(|error| {
        error!(
            static_dir = %settings.static_dir.display(),
            %error,
            "failed to prepare image directory; verify permissions"
        );
        error
    })?;

    let state = AppState {
        static_dir,
        illustrator: Arc::new(PlaceholderIllustrator::default()),
    };
    let app = build_router(Arc::new(state), settings.max_form_bytes);

    let addr: SocketAddr = settings
        .server_bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.server_bind))?;
    info!(%addr, "story generation service listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, max_form_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/generate", post(generate))
        .route("/image/:filename", get(image))
        .layer(RequestBodyLimitLayer::new(max_form_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn validation(message: impl Into<String>) -> ApiRejection {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError::new(ErrorCode::Validation, message)),
    )
}

fn internal(message: impl Into<String>) -> ApiRejection {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::new(ErrorCode::Internal, message)),
    )
}

async fn healthz() -> &'static str {
    "ok"
}

async fn generate(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<GenerateResponse>, ApiRejection> {
    let form = read_generate_form(multipart).await?;
    let request_id = Uuid::new_v4();
    let started = Instant::now();

    let plans = plan_scenes(&form.prompt, form.count);
    let mut images = Vec::with_capacity(plans.len());
    let mut story = Vec::with_capacity(plans.len());
    for (index, plan) in plans.into_iter().enumerate() {
        let bytes = state
            .illustrator
            .illustrate(&plan.illustration_prompt)
            .await
            .map_err(|e| {
                error!(%request_id, scene = index + 1, error = %e, "illustration failed");
                internal(format!("failed to illustrate scene {}", index + 1))
            })?;

        let path = state
            .static_dir
            .join(format!("story_{request_id}_scene_{}.png", index + 1));
        tokio::fs::write(&path, bytes).await.map_err(|e| {
            error!(%request_id, path = %path.display(), error = %e, "failed to store image");
            internal("failed to store generated image")
        })?;

        images.push(path.display().to_string());
        story.push(plan.text);
    }

    info!(
        %request_id,
        scenes = images.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "generated story"
    );
    Ok(Json(GenerateResponse { images, story }))
}

async fn read_generate_form(mut multipart: Multipart) -> Result<GenerateForm, ApiRejection> {
    let mut prompt = None;
    let mut count = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| validation(format!("invalid form body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let value = field
            .text()
            .await
            .map_err(|e| validation(format!("invalid form field '{name}': {e}")))?;
        match name.as_str() {
            PROMPT_FIELD => prompt = Some(value),
            COUNT_FIELD => count = Some(value),
            _ => {}
        }
    }

    let prompt = prompt
        .map(|prompt| prompt.trim().to_string())
        .filter(|prompt| !prompt.is_empty())
        .ok_or_else(|| validation("prompt must not be empty"))?;

    let count = match count {
        None => SceneCount::default(),
        Some(raw) => {
            let value = raw
                .trim()
                .parse::<i64>()
                .map_err(|_| validation(format!("count must be an integer, got '{raw}'")))?;
            SceneCount::new(value).map_err(|e| validation(e.to_string()))?
        }
    };

    Ok(GenerateForm { prompt, count })
}

async fn image(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, ApiRejection> {
    if filename.is_empty()
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains("..")
    {
        return Err(validation("image name must be a plain file name"));
    }

    let path = state.static_dir.join(&filename);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err((
                StatusCode::NOT_FOUND,
                Json(ApiError::new(ErrorCode::NotFound, "image not found")),
            ));
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to read image");
            return Err(internal("failed to read image"));
        }
    };

    let mime = mime_guess::from_path(&filename).first_or_octet_stream();
    Ok(([(header::CONTENT_TYPE, mime.essence_str().to_string())], bytes).into_response())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
