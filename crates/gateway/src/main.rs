//! PartLookup API Gateway
//!
//! HTTP entry point for the parts catalog.
//! Handles:
//! - Catalog search and statistics
//! - Catalog administration (batch replace/append, image index)
//! - Rate limiting
//! - Observability (logging, metrics, request ids)

mod handlers;
mod middleware;
mod telemetry;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use partlookup_common::{config::AppConfig, CatalogStore, VERSION};
use partlookup_ingestion::{load_catalog, BatchIngestor};
use partlookup_search::{QueryEngine, SearchOptions};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub engine: QueryEngine,
    pub ingestor: BatchIngestor,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, store: Arc<CatalogStore>, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            engine: QueryEngine::new(Arc::clone(&store), SearchOptions::from(&config.search)),
            ingestor: BatchIngestor::new(store),
            config,
            metrics,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Arc::new(AppConfig::load()?);

    // Initialize tracing
    partlookup_common::telemetry::init_tracing(&config.observability);
    info!("Starting PartLookup API Gateway v{}", VERSION);

    // Initialize metrics
    let metrics = if config.observability.metrics_enabled {
        Some(telemetry::init_metrics()?)
    } else {
        None
    };

    // Catalog starts unloaded; searches return nothing until the load finishes
    let store = Arc::new(CatalogStore::new());
    {
        let store = Arc::clone(&store);
        let catalog = config.catalog.clone();
        tokio::spawn(async move {
            let report = load_catalog(&catalog, &store).await;
            if !report.failed.is_empty() {
                warn!(failed = ?report.failed, "Catalog loaded with unreadable sources");
            }
        });
    }

    let state = AppState::new(Arc::clone(&config), store, metrics);
    let app = create_router(state);

    // Start the server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let rate_limit = &state.config.rate_limit;
    let limiter = rate_limit.enabled.then(|| {
        middleware::rate_limit::create_rate_limiter(rate_limit.requests_per_second, rate_limit.burst)
    });

    // API routes
    let mut api_routes = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))

        // Search endpoints
        .route("/search", get(handlers::search::search_query).post(handlers::search::search))
        .route("/stats", get(handlers::stats::stats))

        // Catalog administration
        .route(
            "/admin/catalog/{origin}",
            put(handlers::admin::replace_catalog).post(handlers::admin::append_catalog),
        )
        .route("/admin/images", put(handlers::admin::replace_images))

        .route_layer(axum::middleware::from_fn(middleware::metrics::track_requests));

    if let Some(limiter) = limiter {
        api_routes = api_routes.route_layer(axum::middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit::rate_limit,
        ));
    }

    // Compose the app
    Router::new()
        .nest("/v1", api_routes)
        .route("/metrics", get(handlers::metrics::render))
        .layer(DefaultBodyLimit::max(state.config.server.max_body_bytes))
        .layer(TimeoutLayer::new(state.config.request_timeout()))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use partlookup_common::PartRecord;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn loaded_state() -> AppState {
        let store = Arc::new(CatalogStore::new());
        store.load(
            vec![
                PartRecord::structured("1001", "Filtro de aceite", "repuestos.json"),
                PartRecord::structured("CBL001", "Cable USB tipo A", "repuestos.json"),
            ],
            vec![PartRecord::document("1001", "Filtro aceite motor", "motor.pdf", Some("3".into()))],
            Default::default(),
        );
        let mut config = AppConfig::default();
        config.rate_limit.enabled = false;
        AppState::new(Arc::new(config), store, None)
    }

    async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(create_router(loaded_state()), Method::GET, "/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_ready_reflects_load_state() {
        let state = AppState::new(Arc::new(AppConfig::default()), Arc::new(CatalogStore::new()), None);
        let (status, body) = send(create_router(state), Method::GET, "/v1/ready", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "loading");

        let (_, body) = send(create_router(loaded_state()), Method::GET, "/v1/ready", None).await;
        assert_eq!(body["status"], "ready");
    }

    #[tokio::test]
    async fn test_search_post() {
        let (status, body) = send(
            create_router(loaded_state()),
            Method::POST,
            "/v1/search",
            Some(json!({"query": "1001"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["kind"], "code");
        assert_eq!(body["total_results"], 1);
        assert_eq!(body["results"][0]["source_type"], "document");
        assert_eq!(body["results"][0]["has_image"], true);
    }

    #[tokio::test]
    async fn test_search_get_with_filter() {
        let (status, body) = send(
            create_router(loaded_state()),
            Method::GET,
            "/v1/search?q=filtro&document=false",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_results"], 1);
        assert_eq!(body["results"][0]["source"], "Excel");
    }

    #[tokio::test]
    async fn test_search_forced_kind() {
        let (_, body) = send(
            create_router(loaded_state()),
            Method::POST,
            "/v1/search",
            Some(json!({"query": "cbl", "kind": "code"})),
        )
        .await;
        assert_eq!(body["results"][0]["code"], "CBL001");
    }

    #[tokio::test]
    async fn test_search_rejects_long_query() {
        let (status, body) = send(
            create_router(loaded_state()),
            Method::POST,
            "/v1/search",
            Some(json!({"query": "x".repeat(501)})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_stats() {
        let (status, body) = send(create_router(loaded_state()), Method::GET, "/v1/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["structured_count"], 2);
        assert_eq!(body["document_count"], 1);
        assert_eq!(body["total_count"], 3);
    }

    #[tokio::test]
    async fn test_admin_replace_then_search() {
        let state = loaded_state();
        let (status, body) = send(
            create_router(state.clone()),
            Method::PUT,
            "/v1/admin/catalog/structured",
            Some(json!({"csv": "Codigo,Descripcion\n2002,Bujia de encendido\n"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["accepted"], 1);

        let (_, body) = send(create_router(state), Method::GET, "/v1/search?q=bujia", None).await;
        assert_eq!(body["total_results"], 1);
        assert_eq!(body["results"][0]["code"], "2002");
    }

    #[tokio::test]
    async fn test_admin_empty_batch_leaves_catalog() {
        let state = loaded_state();
        let (status, body) = send(
            create_router(state.clone()),
            Method::PUT,
            "/v1/admin/catalog/structured",
            Some(json!({"records": [{"code": "  ", "description": "x"}]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "EMPTY_BATCH");

        let (_, body) = send(create_router(state), Method::GET, "/v1/stats", None).await;
        assert_eq!(body["structured_count"], 2);
    }

    #[tokio::test]
    async fn test_admin_unknown_origin() {
        let (status, body) = send(
            create_router(loaded_state()),
            Method::POST,
            "/v1/admin/catalog/catalogue",
            Some(json!({"records": []})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "UNKNOWN_ORIGIN");
    }

    #[tokio::test]
    async fn test_admin_images() {
        let state = loaded_state();
        let (status, body) = send(
            create_router(state.clone()),
            Method::PUT,
            "/v1/admin/images",
            Some(json!({"motor.pdf": {"total_images": 3, "images": [
                {"filename": "a.png", "path": "img/a.png"},
                {"filename": "b.png", "path": "img/b.png"},
                {"filename": "c.png", "path": "img/c.png"}
            ]}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["entries"], 3);

        let (_, body) = send(create_router(state), Method::GET, "/v1/search?q=1001&structured=false", None).await;
        assert_eq!(body["results"][0]["resolved_image_path"], "img/c.png");
    }

    #[tokio::test]
    async fn test_metrics_disabled() {
        let (status, _) = send(create_router(loaded_state()), Method::GET, "/metrics", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_rate_limit_applies() {
        let mut config = AppConfig::default();
        config.rate_limit.enabled = true;
        config.rate_limit.requests_per_second = 1;
        config.rate_limit.burst = 1;
        let state = AppState::new(Arc::new(config), Arc::new(CatalogStore::new()), None);
        let app = create_router(state);

        let (first, _) = send(app.clone(), Method::GET, "/v1/health", None).await;
        let (second, body) = send(app, Method::GET, "/v1/health", None).await;
        assert_eq!(first, StatusCode::OK);
        assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"]["code"], "RATE_LIMITED");
    }
}
