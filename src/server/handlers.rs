//! Request handlers for the drawing page and the prediction endpoints.

use axum::{
    extract::{OriginalUri, State},
    http::{Method, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::digit::Prediction;
use crate::server::{error::ServerError, AppState};

/// The drawing page, compiled into the binary
pub const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Marker in the page replaced by the context root
const ROOT_MARKER: &str = "__CONTEXT_ROOT__";

/// The page with its API calls pointed at `context_root`
pub fn render_page(context_root: &str) -> String {
    INDEX_HTML.replace(ROOT_MARKER, context_root)
}

/// JSON body of a prediction
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    /// Predicted digit
    pub ans: usize,
    /// Softmax output, one probability per digit
    pub output: Vec<f32>,
}

impl From<Prediction> for PredictionResponse {
    fn from(p: Prediction) -> Self {
        Self {
            ans:    p.digit,
            output: p.probabilities,
        }
    }
}

/// Prediction for a random test image, with its true label
#[derive(Debug, Serialize)]
pub struct SampleResponse {
    #[serde(flatten)]
    pub prediction: PredictionResponse,
    pub label: u8,
    pub path: String,
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(state.page.to_string())
}

/// Body: a base64 PNG, optionally as a quoted `data:` URL.
pub async fn predict(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<PredictionResponse>, ServerError> {
    let pixels = state
        .preprocessor
        .pixels_from_data_url(&body)
        .map_err(ServerError::BadImage)?;

    let prediction = state.classify(pixels).await?;
    tracing::info!(
        "Predicted {} (p={:.3})",
        prediction.digit,
        prediction.confidence()
    );
    Ok(Json(prediction.into()))
}

pub async fn sample(State(state): State<AppState>) -> Result<Json<SampleResponse>, ServerError> {
    let store        = state.store.clone();
    let preprocessor = state.preprocessor.clone();

    let (sample, pixels) = tokio::task::spawn_blocking(move || {
        let sample = store.select_any(&mut rand::thread_rng())?;
        let pixels = preprocessor.pixels_from_path(&sample.path)?;
        anyhow::Ok((sample, pixels))
    })
    .await
    .map_err(anyhow::Error::from)??;

    let prediction = state.classify(pixels).await?;
    tracing::info!(
        "Sample '{}' labelled {} predicted {}",
        sample.path.display(),
        sample.label,
        prediction.digit
    );

    Ok(Json(SampleResponse {
        prediction: prediction.into(),
        label:      sample.label,
        path:       sample.path.display().to_string(),
    }))
}

/// Any GET for an `.html` path under the context root serves the page.
pub async fn fallback(
    State(state): State<AppState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
) -> Response {
    let path = uri.path();
    if method == Method::GET && path.ends_with(".html") && state.is_under_root(path) {
        return Html(state.page.to_string()).into_response();
    }
    (StatusCode::NOT_FOUND, "Not found").into_response()
}
