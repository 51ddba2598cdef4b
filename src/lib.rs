use std::io;
use std::path::Path;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::{Compress, Logger};
use actix_web::{web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod health;
pub mod logging;
pub mod report;
pub mod student;

use crate::config::{AppConfig, CorsConfig};
use crate::report::{PdfRenderer, ReportService};
use crate::student::StudentFetcher;

/// Seconds in-flight requests get to finish after SIGINT/SIGTERM.
const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::health::health_check,
        crate::report::handlers::generate_student_report,
    ),
    components(
        schemas(
            ErrorResponse,
            health::HealthResponse,
            report::handlers::ReportInfoResponse,
        )
    ),
    tags(
        (name = "Health", description = "Liveness endpoint."),
        (name = "Reports", description = "Student PDF report generation.")
    )
)]
pub struct ApiDoc;

/// Register every `/api/v1` route.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::config)
            .configure(report::handlers::config),
    );
}

fn build_cors(config: &CorsConfig) -> Cors {
    let mut cors = Cors::default().max_age(3600);

    if config.allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_any_origin();
    } else {
        for origin in &config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
        cors = cors.supports_credentials();
    }

    if config.allowed_methods.iter().any(|m| m == "*") {
        cors = cors.allow_any_method();
    } else {
        cors = cors.allowed_methods(config.allowed_methods.iter().map(String::as_str));
    }

    if config.allowed_headers.iter().any(|h| h == "*") {
        cors = cors.allow_any_header();
    } else {
        cors = cors.allowed_headers(config.allowed_headers.iter().map(String::as_str));
    }

    cors
}

fn log_endpoints(config: &AppConfig) {
    let base = format!("http://{}:{}", config.server.host, config.server.port);
    log::info!("Available endpoints:");
    log::info!("  Health Check:   GET {}/api/v1/health", base);
    log::info!("  Student Report: GET {}/api/v1/students/{{id}}/report", base);
    log::info!("  Download PDF:   GET {}/api/v1/students/{{id}}/report?download=true", base);
    log::info!("  Metrics:        GET {}/metrics", base);
    log::info!("  API docs:       GET {}/swagger-ui/", base);
    log::info!(
        "Student data is fetched from {}/students/{{id}}",
        config.upstream.base_url
    );
}

pub async fn run() -> io::Result<()> {
    let env_file_errors = config::load_env_files(Path::new("."));
    let config = AppConfig::from_env()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    logging::init(&config.logging);
    for e in &env_file_errors {
        log::warn!("{}", e);
    }

    log::info!(
        "Starting student report service (upstream: {}, output dir: {})",
        config.upstream.base_url,
        config.report.output_dir.display()
    );

    let fetcher = StudentFetcher::new(&config.upstream).map_err(|e| {
        log::error!("Failed to build upstream HTTP client: {}", e);
        io::Error::new(io::ErrorKind::Other, e)
    })?;
    let service = web::Data::new(ReportService::new(
        Arc::new(fetcher),
        PdfRenderer::new(&config.report),
    ));

    let prometheus = PrometheusMetricsBuilder::new("student_report_service")
        .endpoint("/metrics")
        .build()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    log_endpoints(&config);
    log::info!(
        "Starting server at http://{}:{}",
        config.server.host,
        config.server.port
    );

    let cors_config = config.cors.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .wrap(build_cors(&cors_config))
            .app_data(service.clone())
            .configure(routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .shutdown_timeout(SHUTDOWN_TIMEOUT_SECS)
    .bind(config.bind_address())?
    .run()
    .await
}
