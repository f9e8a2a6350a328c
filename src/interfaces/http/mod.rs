use std::sync::{Arc, Mutex};

use actix_cors::Cors;
use actix_web::{dev::Server, get, post, web, App, HttpResponse, HttpServer, Responder};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::application::use_cases::extractor::{DeviceExtractor, ExtractionRequest};
use crate::application::use_cases::report::render_report;
use crate::domain::device::{AnomalyReport, DeviceRow, ExtractionOutcome, OutputFile};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::Settings;
use crate::infrastructure::spreadsheet::file_extension;

/// Entries kept in the activity feed
const MAX_LOG_ENTRIES: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub struct HttpState {
    pub settings: Arc<Settings>,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    #[validate(length(min = 1, message = "Please upload the Excel file"))]
    pub file_name: String,
    pub content_base64: String,
    #[validate(length(min = 1, message = "Enter the model name"))]
    pub model_name: String,
    #[validate(length(min = 1, message = "Enter today's date (format: mmddyy)"))]
    pub today_date: String,
    #[serde(default)]
    #[validate(range(min = 1, message = "maxLines must be at least 1"))]
    pub max_lines: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub found: bool,
    pub message: String,
    pub rows: Vec<DeviceRow>,
    pub text: String,
}

impl From<&AnomalyReport> for ReportView {
    fn from(report: &AnomalyReport) -> Self {
        Self {
            found: !report.is_none_found(),
            message: report.message().to_string(),
            rows: report.rows.clone(),
            text: render_report(report),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileView {
    pub file_name: String,
    pub content: String,
    pub line_count: usize,
    pub mime_type: &'static str,
}

impl From<OutputFile> for FileView {
    fn from(file: OutputFile) -> Self {
        Self {
            file_name: file.file_name,
            content: file.content,
            line_count: file.line_count,
            mime_type: "text/plain",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    pub request_id: String,
    pub duplicates: ReportView,
    pub missing_values: ReportView,
    pub files: Vec<FileView>,
    pub file_count: usize,
    pub summary: String,
}

impl ExtractResponse {
    fn new(request_id: String, outcome: ExtractionOutcome) -> Self {
        let duplicates = ReportView::from(&outcome.duplicates);
        let missing_values = ReportView::from(&outcome.missing_values);
        let file_count = outcome.file_count();
        let summary = outcome.summary();
        Self {
            request_id,
            duplicates,
            missing_values,
            files: outcome.files.into_iter().map(FileView::from).collect(),
            file_count,
            summary,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[post("/extract")]
async fn extract(data: web::Data<HttpState>, req: web::Json<ExtractRequest>) -> impl Responder {
    let request_id = Uuid::new_v4().to_string();
    let req = req.into_inner();

    add_log(
        &data.logs,
        "INFO",
        "Extractor",
        &format!(
            "Processing {} (model={} date={} request={})",
            req.file_name, req.model_name, req.today_date, request_id
        ),
    );
    info!(
        request_id = %request_id,
        file_name = %req.file_name,
        model_name = %req.model_name,
        "Extraction requested"
    );

    match run_extraction(&data.settings, req).await {
        Ok(outcome) => {
            add_log(&data.logs, "INFO", "Extractor", &outcome.summary());
            HttpResponse::Ok().json(ExtractResponse::new(request_id, outcome))
        }
        Err(e) => {
            let level = if e.is_user_facing() { "WARN" } else { "ERROR" };
            add_log(
                &data.logs,
                level,
                "Extractor",
                &format!("Extraction failed: {}", e),
            );
            if e.is_user_facing() {
                warn!(request_id = %request_id, error = %e, "Extraction rejected");
            } else {
                error!(request_id = %request_id, error = %e, "Extraction failed");
            }
            error_response(&e)
        }
    }
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    let logs = data.logs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    HttpResponse::Ok().json(&*logs)
}

/// Validate the upload, then run the extractor on the blocking pool
async fn run_extraction(settings: &Settings, req: ExtractRequest) -> Result<ExtractionOutcome> {
    req.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let extension = file_extension(&req.file_name).unwrap_or_default();
    if !settings.extraction.accepts_extension(&extension) {
        return Err(AppError::ValidationError(format!(
            "Unsupported file type '{}': expected one of {}",
            req.file_name,
            settings.extraction.accepted_extensions.join(", ")
        )));
    }

    let bytes = STANDARD
        .decode(req.content_base64.trim())
        .map_err(|e| AppError::ValidationError(format!("File content is not valid base64: {}", e)))?;
    if bytes.len() > settings.extraction.max_upload_bytes {
        return Err(AppError::ValidationError(format!(
            "File is too large ({} bytes, limit {})",
            bytes.len(),
            settings.extraction.max_upload_bytes
        )));
    }

    let extractor = DeviceExtractor::new(settings.extraction.extraction_config(req.max_lines));

    web::block(move || {
        let request = ExtractionRequest::from_upload(
            &req.file_name,
            &bytes,
            &req.model_name,
            &req.today_date,
        );
        extractor.execute(&request)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Extraction worker failed: {}", e)))?
}

pub fn error_response(err: &AppError) -> HttpResponse {
    let body = ErrorBody {
        error: err.kind(),
        message: err.to_string(),
    };
    match err {
        AppError::ValidationError(_) | AppError::ParseError(_) => {
            HttpResponse::BadRequest().json(body)
        }
        AppError::SchemaError(_) => HttpResponse::UnprocessableEntity().json(body),
        AppError::Internal(_) | AppError::IoError(_) => {
            HttpResponse::InternalServerError().json(body)
        }
    }
}

pub fn add_log_entry(
    logs: &Mutex<Vec<LogEntry>>,
    level: &str,
    source: &str,
    message: &str,
) -> LogEntry {
    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    let mut logs = logs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    logs.push(entry.clone());
    if logs.len() > MAX_LOG_ENTRIES {
        logs.remove(0);
    }
    entry
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    add_log_entry(logs, level, source, message);
}

/// Routes and extractors shared by the server and the tests
pub fn configure(settings: &Settings) -> impl FnOnce(&mut web::ServiceConfig) {
    // Base64 inflates the workbook by 4/3; leave room for the other fields.
    let json_limit = settings.extraction.max_upload_bytes / 3 * 4 + 64 * 1024;
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::JsonConfig::default().limit(json_limit)).service(
            web::scope("/api")
                .service(health)
                .service(extract)
                .service(get_logs),
        );
    }
}

pub fn start_server(settings: Arc<Settings>, logs: Arc<Mutex<Vec<LogEntry>>>) -> std::io::Result<Server> {
    let bind = settings.bind_address();
    let state = web::Data::new(HttpState { settings, logs });

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Allow all origins for local tool

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .configure(configure(&state.settings))
    })
    .bind(bind)?
    .run();

    Ok(server)
}
