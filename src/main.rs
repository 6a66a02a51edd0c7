mod core;
mod features;
mod shared;

use crate::core::config::Config;
use crate::core::middleware;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::features::feedback::{
    routes as feedback_routes, FeedbackService, GithubIssueClient, IssueTracker,
};
use axum::extract::DefaultBodyLimit;
use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "System info: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );
    tracing::info!("Configuration loaded successfully");

    // Relay client exists only when both GH_TOKEN and GH_REPO are set
    let tracker = GithubIssueClient::from_config(&config.github)
        .map_err(|e| anyhow::anyhow!("Failed to initialize GitHub client: {}", e))?
        .map(|client| {
            tracing::info!("GitHub issue relay enabled: {}", client.issues_url());
            Arc::new(client) as Arc<dyn IssueTracker>
        });

    let feedback_service = Arc::new(FeedbackService::new(config.feedback.clone(), tracker));
    if !feedback_service.is_relay_enabled() {
        tracing::warn!("GH_TOKEN or GH_REPO not set, feedback will be accepted but not forwarded");
    }
    tracing::info!(
        "Feedback service initialized (policy: {:?})",
        feedback_service.policy()
    );

    let app = build_router(&config, feedback_service);

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;

    let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
    socket.set_tcp_keepalive(&keepalive)?;

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(config: &Config, feedback_service: Arc<FeedbackService>) -> Router {
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Simple health check endpoint
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let app = Router::new()
        .merge(swagger)
        .merge(feedback_routes(feedback_service))
        .merge(health_route)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(CatchPanicLayer::custom(middleware::handle_panic));

    middleware::with_preflight_cors(app, config.app.cors_allowed_origins.clone())
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{AppConfig, FeedbackPolicy, GithubConfig, SwaggerConfig};
    use crate::shared::test_helpers::{MockIssueTracker, MockReply};
    use axum::body::Bytes;
    use axum::http::{header, HeaderValue, Method, StatusCode};
    use axum_test::TestServer;
    use serde_json::json;

    fn test_config() -> Config {
        Config {
            app: AppConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_allowed_origins: vec!["*".to_string()],
                max_request_body_size: 1024,
            },
            github: GithubConfig {
                token: None,
                repo: None,
                api_base_url: "https://api.github.com".to_string(),
                user_agent: "feedback-relay-test".to_string(),
            },
            feedback: FeedbackPolicy::strict(),
            swagger: SwaggerConfig {
                username: None,
                password: None,
                title: "Feedback Relay API".to_string(),
                version: "0.1.0".to_string(),
                description: "test".to_string(),
            },
        }
    }

    fn server(reply: Option<MockReply>) -> TestServer {
        let config = test_config();
        let tracker = reply.map(|r| Arc::new(MockIssueTracker::new(r)) as Arc<dyn IssueTracker>);
        let service = Arc::new(FeedbackService::new(config.feedback.clone(), tracker));
        TestServer::new(build_router(&config, service)).unwrap()
    }

    fn valid_body() -> serde_json::Value {
        json!({ "overall": 3, "clarity": 3, "functionality": 3, "structure": 3 })
    }

    #[tokio::test]
    async fn test_health_check() {
        server(None).get("/health").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_request_id_is_set_on_responses() {
        let response = server(None).post("/api/feedback").json(&valid_body()).await;

        response.assert_status_ok();
        let request_id = response.header("x-request-id");
        assert!(uuid::Uuid::parse_str(request_id.to_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_panic_in_relay_becomes_server_error() {
        let response = server(Some(MockReply::Panic("tracker blew up")))
            .post("/api/feedback")
            .json(&valid_body())
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&json!({ "error": "server_error", "details": "tracker blew up" }));
    }

    #[tokio::test]
    async fn test_non_post_methods_are_rejected_through_full_stack() {
        let server = server(None);

        for method in [
            Method::OPTIONS,
            Method::GET,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ] {
            let response = server.method(method, "/api/feedback").await;

            response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
            response.assert_json(&json!({ "error": "Method not allowed" }));
        }
    }

    #[tokio::test]
    async fn test_cors_preflight_is_still_answered() {
        let response = server(None)
            .method(Method::OPTIONS, "/api/feedback")
            .add_header(
                header::ORIGIN,
                HeaderValue::from_static("https://example.com"),
            )
            .add_header(
                header::ACCESS_CONTROL_REQUEST_METHOD,
                HeaderValue::from_static("POST"),
            )
            .await;

        response.assert_status_ok();
        assert_eq!(response.header("access-control-allow-origin"), "*");
    }

    #[tokio::test]
    async fn test_out_of_range_rating_is_invalid_ratings() {
        let response = server(None)
            .post("/api/feedback")
            .bytes(Bytes::from_static(
                br#"{"overall":1e400,"clarity":3,"functionality":3,"structure":3}"#,
            ))
            .content_type("application/json")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "invalid_ratings" }));
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let mut body = valid_body();
        body["comment"] = json!("x".repeat(4096));

        let response = server(None).post("/api/feedback").json(&body).await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let response = server(None).get("/api-docs/openapi.json").await;

        response.assert_status_ok();
        let doc = response.json::<serde_json::Value>();
        assert!(doc["paths"]["/api/feedback"]["post"].is_object());
    }

    #[test]
    fn test_tokio_test_runtime_drives_service() {
        let service = FeedbackService::new(FeedbackPolicy::strict(), None);
        let dto = crate::features::feedback::dtos::FeedbackRequestDto::from_value(valid_body());
        tokio_test::assert_ok!(tokio_test::block_on(service.submit(dto)));
    }
}
