use actix_files::NamedFile;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common::format_generated_at;
use super::{ErrorKind, ReportArtifact, ReportService};
use crate::ErrorResponse;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    /// `true` streams the PDF instead of returning metadata.
    #[serde(default)]
    pub download: Option<String>,
}

impl ReportQuery {
    pub fn wants_download(&self) -> bool {
        self.download
            .as_deref()
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportInfoResponse {
    pub success: bool,
    #[schema(example = "PDF report generated successfully")]
    pub message: String,
    #[schema(example = 1)]
    pub student_id: u64,
    #[schema(example = "student_1_report_20240115_093000.pdf")]
    pub file_name: String,
    pub file_size: u64,
    #[schema(example = "2024-01-15 09:30:00")]
    pub generated_at: String,
    #[schema(example = "/api/v1/students/1/report?download=true")]
    pub download_url: String,
}

impl ReportInfoResponse {
    fn from_artifact(student_id: u64, artifact: &ReportArtifact) -> Self {
        Self {
            success: true,
            message: "PDF report generated successfully".to_string(),
            student_id,
            file_name: artifact.file_name.clone(),
            file_size: artifact.size_bytes,
            generated_at: format_generated_at(&artifact.generated_at),
            download_url: format!("/api/v1/students/{}/report?download=true", student_id),
        }
    }
}

/// Accepts only positive decimal integers.
pub fn parse_student_id(raw: &str) -> Option<u64> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => None,
        Ok(id) => Some(id),
    }
}

/// Generate a student report - GET /api/v1/students/{id}/report
#[utoipa::path(
    get,
    path = "/api/v1/students/{id}/report",
    tag = "Reports",
    params(
        ("id" = u64, Path, description = "Student ID"),
        ReportQuery
    ),
    responses(
        (status = 200, description = "Report metadata, or the PDF itself when download=true", body = ReportInfoResponse),
        (status = 400, description = "Invalid student ID", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Report generation failed", body = ErrorResponse)
    )
)]
pub async fn generate_student_report(
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<ReportQuery>,
    service: web::Data<ReportService>,
) -> impl Responder {
    let Some(student_id) = parse_student_id(&path) else {
        return HttpResponse::BadRequest().json(ErrorResponse::bad_request("Invalid student ID format"));
    };

    log::info!("Processing PDF report request for student ID: {}", student_id);

    let artifact = match service.generate_report(student_id).await {
        Ok(artifact) => artifact,
        Err(e) => {
            log::error!("Failed to generate PDF report for student {}: {}", student_id, e);
            return match e.kind() {
                ErrorKind::NotFound => {
                    HttpResponse::NotFound().json(ErrorResponse::not_found("Student not found"))
                }
                ErrorKind::Upstream | ErrorKind::Transport | ErrorKind::Io => {
                    HttpResponse::InternalServerError()
                        .json(ErrorResponse::internal_error("Failed to generate PDF report"))
                }
            };
        }
    };

    if query.wants_download() {
        serve_download(&req, &artifact).await
    } else {
        log::info!("PDF report info returned for student {}", student_id);
        HttpResponse::Ok().json(ReportInfoResponse::from_artifact(student_id, &artifact))
    }
}

async fn serve_download(req: &HttpRequest, artifact: &ReportArtifact) -> HttpResponse {
    match NamedFile::open_async(&artifact.path).await {
        Ok(file) => {
            log::info!("PDF file served for download: {}", artifact.file_name);
            file.set_content_disposition(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(artifact.file_name.clone())],
            })
            .into_response(req)
        }
        Err(e) => {
            log::error!("Failed to open PDF file {}: {}", artifact.path.display(), e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to open PDF file"))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/students/{id}/report").route(web::get().to(generate_student_report)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_student_id() {
        assert_eq!(parse_student_id("42"), Some(42));
        assert_eq!(parse_student_id("0"), None);
        assert_eq!(parse_student_id("-3"), None);
        assert_eq!(parse_student_id("abc"), None);
        assert_eq!(parse_student_id("4.2"), None);
        assert_eq!(parse_student_id(""), None);
    }

    #[test]
    fn test_wants_download() {
        let query = |v: Option<&str>| ReportQuery {
            download: v.map(str::to_string),
        };
        assert!(query(Some("true")).wants_download());
        assert!(query(Some("TRUE")).wants_download());
        assert!(!query(Some("false")).wants_download());
        assert!(!query(Some("1")).wants_download());
        assert!(!query(None).wants_download());
    }
}
