// ============================================================
// Layer 1 — HTTP Server (Presentation)
// ============================================================
// The browser-facing side of the application. Like the CLI it
// only routes and formats; all work is delegated to the
// classifier and the data layer.
//
// Routes, relative to the context root (default "/mnist"):
//
//   GET  /index.html   → drawing page (any other *.html too)
//   POST /predict      → classify a posted data URL
//   POST anything else → same as above, including the bare root
//   GET  /sample       → classify a random test image
//
// Inference is CPU/GPU bound, so it runs on tokio's blocking
// pool. The classifier sits behind a mutex because one model
// instance serves every request.

pub mod error;
pub mod handlers;

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use anyhow::{anyhow, Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;

use crate::data::{mnist::MnistStore, preprocessor::Preprocessor};
use crate::domain::digit::Prediction;
use crate::domain::traits::DigitClassifier;
use crate::server::error::ServerError;

/// Shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    classifier:       Arc<Mutex<Box<dyn DigitClassifier>>>,
    store:            Arc<MnistStore>,
    preprocessor:     Preprocessor,
    context_root:     String,
    /// Drawing page with the context root filled in
    page:             Arc<str>,
}

impl AppState {
    pub fn new(
        classifier:   Box<dyn DigitClassifier>,
        store:        MnistStore,
        context_root: &str,
    ) -> Self {
        let context_root = normalize_root(context_root);
        Self {
            classifier:   Arc::new(Mutex::new(classifier)),
            store:        Arc::new(store),
            preprocessor: Preprocessor::new(),
            page:         handlers::render_page(&context_root).into(),
            context_root,
        }
    }

    /// Run the classifier on a blocking worker thread
    pub async fn classify(&self, pixels: Vec<f32>) -> Result<Prediction, ServerError> {
        let classifier = Arc::clone(&self.classifier);

        tokio::task::spawn_blocking(move || {
            let classifier = classifier
                .lock()
                .map_err(|_| anyhow!("Classifier lock poisoned"))?;
            classifier.classify(&pixels)
        })
        .await
        .map_err(anyhow::Error::from)?
        .map_err(ServerError::Internal)
    }

    fn is_under_root(&self, path: &str) -> bool {
        self.context_root.is_empty()
            || path
                .strip_prefix(&self.context_root)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// "mnist", "/mnist/" and "/mnist" all become "/mnist"; "/" becomes "".
pub fn normalize_root(root: &str) -> String {
    let trimmed = root.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Routes are registered with the root already prefixed. Any other
/// POST under the root is a prediction; other methods fall through
/// to the page/404 fallback.
pub fn build_router(state: AppState) -> Router {
    let root = state.context_root.clone();
    let at   = |path: &str| format!("{root}{path}");

    let mut router = Router::new()
        .route(&at("/predict"), post(handlers::predict))
        .route(&at("/sample"), get(handlers::sample))
        .route(&at("/index.html"), get(handlers::index))
        .route(
            &at("/{*rest}"),
            post(handlers::predict).fallback(handlers::fallback),
        )
        .route(
            &at("/"),
            post(handlers::predict).fallback(handlers::fallback),
        );

    if !root.is_empty() {
        router = router.route(&root, post(handlers::predict).fallback(handlers::fallback));
    }

    router.fallback(handlers::fallback).with_state(state)
}

pub struct Server {
    host:  String,
    port:  u16,
    state: AppState,
}

impl Server {
    pub fn new(host: impl Into<String>, port: u16, state: AppState) -> Self {
        Self { host: host.into(), port, state }
    }

    /// Bind, serve until Ctrl-C, then drain in-flight requests.
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind((self.host.as_str(), self.port))
            .await
            .with_context(|| format!("Cannot bind {}:{}", self.host, self.port))?;
        let addr: SocketAddr = listener.local_addr()?;

        tracing::info!("Listening on {}", addr);
        println!(
            "Open http://localhost:{}{}/index.html and draw a digit",
            addr.port(),
            self.state.context_root
        );

        axum::serve(listener, build_router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server failed")?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fetcher::MNIST_URL;
    use crate::data::preprocessor::tests::digit_png;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use std::{fs, time::Duration};
    use tower::ServiceExt;

    /// Always answers with a fixed digit
    struct FixedClassifier(usize);

    impl DigitClassifier for FixedClassifier {
        fn classify(&self, pixels: &[f32]) -> anyhow::Result<Prediction> {
            assert_eq!(pixels.len(), 784);
            let mut probabilities = vec![0.0; 10];
            probabilities[self.0] = 1.0;
            Prediction::from_probabilities(probabilities)
        }
    }

    struct FailingClassifier;

    impl DigitClassifier for FailingClassifier {
        fn classify(&self, _pixels: &[f32]) -> anyhow::Result<Prediction> {
            Err(anyhow!("model exploded"))
        }
    }

    fn state_with(classifier: Box<dyn DigitClassifier>, data_dir: &std::path::Path) -> AppState {
        state_at("/mnist", classifier, data_dir)
    }

    fn state_at(
        root:       &str,
        classifier: Box<dyn DigitClassifier>,
        data_dir:   &std::path::Path,
    ) -> AppState {
        for digit in 0..10 {
            let dir = data_dir.join("mnist_png/testing").join(digit.to_string());
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("1.png"), digit_png(200)).unwrap();
        }
        let store = MnistStore::new(data_dir, MNIST_URL, Duration::from_secs(1));
        AppState::new(classifier, store, root)
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, String) {
        let resp   = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes  = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn post(uri: &str, body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::from(body))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn data_url() -> String {
        format!("\"data:image/png;base64,{}\"", STANDARD.encode(digit_png(255)))
    }

    #[test]
    fn test_normalize_root() {
        assert_eq!(normalize_root("mnist"), "/mnist");
        assert_eq!(normalize_root("/mnist/"), "/mnist");
        assert_eq!(normalize_root("/"), "");
        assert_eq!(normalize_root(""), "");
    }

    #[tokio::test]
    async fn test_index_page_is_served() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state_with(Box::new(FixedClassifier(0)), dir.path()));

        let (status, body) = send(app, get("/mnist/index.html")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<canvas"));
    }

    #[tokio::test]
    async fn test_any_html_under_root_serves_page() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state_with(Box::new(FixedClassifier(0)), dir.path()));

        let (status, body) = send(app.clone(), get("/mnist/draw/page.html")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<canvas"));

        let (status, _) = send(app, get("/elsewhere/page.html")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_predict_returns_json() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state_with(Box::new(FixedClassifier(3)), dir.path()));

        let (status, body) = send(app, post("/mnist/predict", data_url())).await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["ans"], 3);
        assert_eq!(json["output"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_bad_payload_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state_with(Box::new(FixedClassifier(3)), dir.path()));

        let (status, body) = send(app, post("/mnist/predict", "not an image".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.starts_with("Invalid image"));
    }

    #[tokio::test]
    async fn test_classifier_failure_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state_with(Box::new(FailingClassifier), dir.path()));

        let (status, body) = send(app, post("/mnist/predict", data_url())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("model exploded"));
    }

    #[tokio::test]
    async fn test_sample_reports_label_and_prediction() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state_with(Box::new(FixedClassifier(8)), dir.path()));

        let (status, body) = send(app, get("/mnist/sample")).await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["ans"], 8);
        let label = json["label"].as_u64().unwrap();
        assert!(label < 10);
        assert!(json["path"].as_str().unwrap().ends_with("1.png"));
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state_with(Box::new(FixedClassifier(0)), dir.path()));

        let (status, _) = send(app, get("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_page_calls_api_under_context_root() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state_with(Box::new(FixedClassifier(0)), dir.path()));

        let (_, body) = send(app, get("/mnist/draw/page.html")).await;
        assert!(body.contains("const ROOT = '/mnist';"));
        assert!(!body.contains("__CONTEXT_ROOT__"));
    }

    #[tokio::test]
    async fn test_any_post_under_root_predicts() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state_with(Box::new(FixedClassifier(4)), dir.path()));

        for uri in ["/mnist", "/mnist/", "/mnist/classify"] {
            let (status, body) = send(app.clone(), post(uri, data_url())).await;
            assert_eq!(status, StatusCode::OK, "POST {uri}");
            let json: serde_json::Value = serde_json::from_str(&body).unwrap();
            assert_eq!(json["ans"], 4, "POST {uri}");
        }

        let (status, _) = send(app, post("/other", data_url())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_empty_root_serves_from_slash() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state_at("", Box::new(FixedClassifier(6)), dir.path()));

        let (status, body) = send(app.clone(), post("/", data_url())).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["ans"], 6);

        let (status, body) = send(app.clone(), get("/index.html")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("const ROOT = '';"));

        let (status, _) = send(app, get("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
