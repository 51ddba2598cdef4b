#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use async_trait::async_trait;
use serde_json::json;

use student_report_service::config::{ReportConfig, UpstreamConfig};
use student_report_service::student::{FetchError, StudentRecord, StudentSource};

/// Record from the end-to-end scenario: no permanent address, guardian is the father.
pub fn john_doe() -> StudentRecord {
    StudentRecord {
        id: 1,
        name: "John Doe".to_string(),
        email: "john.doe@school.com".to_string(),
        system_access: true,
        phone: "+1234567890".to_string(),
        gender: "Male".to_string(),
        dob: "2005-01-15".to_string(),
        class: "10th Grade".to_string(),
        section: "A".to_string(),
        roll: Some(101),
        father_name: "John Sr".to_string(),
        father_phone: "+1234567891".to_string(),
        mother_name: "Jane Doe".to_string(),
        mother_phone: "+1234567892".to_string(),
        guardian_name: "John Sr".to_string(),
        guardian_phone: "+1234567891".to_string(),
        relation_of_guardian: "Father".to_string(),
        current_address: "123 Main St, City, State".to_string(),
        permanent_address: "123 Main St, City, State".to_string(),
        admission_date: "2023-01-15".to_string(),
        reporter_name: String::new(),
    }
}

/// Record whose guardian is not a parent.
pub fn with_uncle_guardian() -> StudentRecord {
    StudentRecord {
        id: 2,
        guardian_name: "Uncle Bob".to_string(),
        relation_of_guardian: "Uncle".to_string(),
        guardian_phone: "+1555123459".to_string(),
        ..john_doe()
    }
}

pub fn upstream_config(base_url: &str, timeout: Duration) -> UpstreamConfig {
    UpstreamConfig {
        base_url: base_url.to_string(),
        timeout,
        auth_token: "test-token".to_string(),
    }
}

pub fn report_config(output_dir: &Path) -> ReportConfig {
    ReportConfig {
        output_dir: output_dir.to_path_buf(),
        title: "Integration Test Report".to_string(),
    }
}

/// Base URL nothing is listening on.
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe port");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{}/api/v1", addr)
}

pub fn files_in(dir: &Path) -> Vec<String> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// All literal strings drawn with `Tj`, in page order.
pub fn drawn_text(pdf: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(pdf);
    text.lines()
        .filter_map(|line| line.strip_suffix(") Tj"))
        .filter_map(|line| line.strip_prefix('('))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub auth_token: Option<String>,
    pub internal_service: Option<String>,
}

#[derive(Clone)]
struct UpstreamState {
    responses: Arc<HashMap<u64, (u16, String)>>,
    delay: Duration,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

async fn student_route(
    req: HttpRequest,
    path: web::Path<u64>,
    state: web::Data<UpstreamState>,
) -> HttpResponse {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.requests.lock().unwrap().push(RecordedRequest {
        path: req.path().to_string(),
        auth_token: header("x-auth-token"),
        internal_service: header("internal-service"),
    });

    if !state.delay.is_zero() {
        actix_web::rt::time::sleep(state.delay).await;
    }

    match state.responses.get(&path.into_inner()) {
        Some((status, body)) => HttpResponse::build(StatusCode::from_u16(*status).unwrap())
            .content_type("application/json")
            .body(body.clone()),
        None => HttpResponse::NotFound().json(json!({ "error": "Student not found" })),
    }
}

/// In-process stand-in for the upstream student API.
pub struct MockUpstream {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: ServerHandle,
}

impl MockUpstream {
    pub async fn start(responses: HashMap<u64, (u16, String)>) -> Self {
        Self::start_with_delay(responses, Duration::ZERO).await
    }

    /// Serves each record as a bare 200 JSON body.
    pub async fn serving(records: &[StudentRecord]) -> Self {
        let responses = records
            .iter()
            .map(|r| (r.id, (200, serde_json::to_string(r).unwrap())))
            .collect();
        Self::start(responses).await
    }

    pub async fn start_with_delay(responses: HashMap<u64, (u16, String)>, delay: Duration) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = web::Data::new(UpstreamState {
            responses: Arc::new(responses),
            delay,
            requests: requests.clone(),
        });

        let server = HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .route("/api/v1/students/{id}", web::get().to(student_route))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind mock upstream");

        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        Self {
            base_url: format!("http://{}/api/v1", addr),
            requests,
            handle,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

/// In-memory [`StudentSource`] for handler tests.
pub struct MockStudentSource {
    records: HashMap<u64, StudentRecord>,
    failure: Option<Box<dyn Fn(u64) -> FetchError + Send + Sync>>,
    calls: AtomicUsize,
}

impl MockStudentSource {
    pub fn with_records(records: Vec<StudentRecord>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.id, r)).collect(),
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing<F>(make_error: F) -> Self
    where
        F: Fn(u64) -> FetchError + Send + Sync + 'static,
    {
        Self {
            records: HashMap::new(),
            failure: Some(Box::new(make_error)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StudentSource for MockStudentSource {
    async fn fetch(&self, id: u64) -> Result<StudentRecord, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(make_error) = &self.failure {
            return Err(make_error(id));
        }
        self.records
            .get(&id)
            .cloned()
            .ok_or(FetchError::NotFound(id))
    }
}
