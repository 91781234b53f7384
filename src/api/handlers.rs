//! API request handlers
//!
//! Upload endpoints take `multipart/form-data`; previews answer with JSON,
//! the others with the .xlsx workbook as an attachment.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::marks::MarkWarning;
use crate::core::{
    calculate_total_and_rank, get_top_performers, merge_with_master_data, out_of_range_marks,
    summary_statistics, BarChart, DEFAULT_TOP_N,
};
use crate::error::{ResultsError, ResultsResult};
use crate::excel::{
    export_results, export_top_performers, results_file_name, top_file_name, SheetImporter,
    DEFAULT_TITLE, XLSX_MIME,
};
use crate::types::{Category, PointValues, SummaryStats, Table, TieGroup};

use super::server::AppState;

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

/// A failed action: HTTP 400 with a single human-readable message
pub struct ApiError(ResultsError);

impl From<ResultsError> for ApiError {
    fn from(e: ResultsError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(error = %self.0, "request failed");
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::err(self.0.to_string())),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

//==============================================================================
// Info endpoints
//==============================================================================

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

impl EndpointInfo {
    fn new(path: &str, method: &str, description: &str) -> Self {
        Self {
            path: path.to_string(),
            method: method.to_string(),
            description: description.to_string(),
        }
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "Talent Results Server".to_string(),
        version: state.version.clone(),
        description: "Event results and competition analysis from Excel uploads".to_string(),
        endpoints: vec![
            EndpointInfo::new("/health", "GET", "Health check endpoint"),
            EndpointInfo::new("/version", "GET", "Get server version"),
            EndpointInfo::new(
                "/api/v1/results/preview",
                "POST",
                "Compute totals, ranks, points and ties as JSON",
            ),
            EndpointInfo::new(
                "/api/v1/results",
                "POST",
                "Download event results as Excel",
            ),
            EndpointInfo::new(
                "/api/v1/top/preview",
                "POST",
                "Top performers, chart and summary as JSON",
            ),
            EndpointInfo::new("/api/v1/top", "POST", "Download top performers as Excel"),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_message: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        uptime_message: "Server is running".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: vec![
            "results".to_string(),
            "ties".to_string(),
            "merge".to_string(),
            "top".to_string(),
            "export".to_string(),
        ],
    }))
}

//==============================================================================
// Form handling
//==============================================================================

/// An uploaded file part
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Text fields and file parts of a multipart form
#[derive(Default)]
pub struct FormData {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, Upload>,
}

impl FormData {
    pub async fn from_multipart(mut multipart: Multipart) -> ResultsResult<Self> {
        let mut form = FormData::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ResultsError::InvalidInput(format!("Malformed form data: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let file_name = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ResultsError::InvalidInput(format!("Malformed form data: {}", e)))?;
            match file_name {
                // Browsers send an empty part for an unused file input
                Some(_) if bytes.is_empty() => {}
                Some(file_name) => {
                    form.files.insert(
                        name,
                        Upload {
                            file_name,
                            bytes: bytes.to_vec(),
                        },
                    );
                }
                None => {
                    form.fields
                        .insert(name, String::from_utf8_lossy(&bytes).trim().to_string());
                }
            }
        }
        Ok(form)
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Parse an optional field, falling back to `default` when absent
    pub fn parse_field<T: std::str::FromStr>(&self, name: &str, default: T) -> ResultsResult<T> {
        match self.field(name) {
            Some(raw) => raw.parse().map_err(|_| {
                ResultsError::InvalidInput(format!("Invalid value for '{}': '{}'", name, raw))
            }),
            None => Ok(default),
        }
    }

    /// Import an uploaded workbook, if the part was sent. The upload is consumed.
    pub fn table(&mut self, name: &str) -> ResultsResult<Option<Table>> {
        self.files
            .remove(name)
            .map(|upload| SheetImporter::from_bytes(upload.file_name, upload.bytes).import())
            .transpose()
    }

    /// Import an uploaded workbook that must be present
    pub fn require_table(&mut self, name: &str) -> ResultsResult<Table> {
        self.table(name)?.ok_or_else(|| {
            ResultsError::InvalidInput(format!("Missing uploaded file '{}'", name))
        })
    }

    /// Podium points from the form, or `None` when disabled
    pub fn point_values(&self) -> ResultsResult<Option<PointValues>> {
        if !self.parse_field("points_enabled", true)? {
            return Ok(None);
        }
        let defaults = PointValues::default();
        Ok(Some(PointValues {
            first: self.parse_field("first_points", defaults.first)?,
            second: self.parse_field("second_points", defaults.second)?,
            third: self.parse_field("third_points", defaults.third)?,
        }))
    }
}

/// .xlsx attachment response
pub fn download(file_name: &str, bytes: Vec<u8>) -> Response {
    let safe_name: String = file_name
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if c == '"' || c == '\\' { '_' } else { c })
        .collect();
    (
        [
            (header::CONTENT_TYPE, XLSX_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", safe_name),
            ),
        ],
        bytes,
    )
        .into_response()
}

//==============================================================================
// Event results
//==============================================================================

/// Results preview response
#[derive(Serialize)]
pub struct ResultsResponse {
    pub table: Table,
    pub tie_groups: Vec<TieGroup>,
    pub points: Option<PointValues>,
    pub warnings: Vec<MarkWarning>,
    pub merged: bool,
}

fn compute_results(form: &mut FormData) -> ResultsResult<ResultsResponse> {
    let marks = form.require_table("marks")?;
    let points = form.point_values()?;
    let warnings = out_of_range_marks(&marks)?;
    let ranked = calculate_total_and_rank(&marks, points.as_ref())?;

    let (table, merged) = match form.table("master")? {
        Some(master) => (merge_with_master_data(&ranked.table, &master)?, true),
        None => (ranked.table, false),
    };

    Ok(ResultsResponse {
        table,
        tie_groups: ranked.tie_groups,
        points,
        warnings,
        merged,
    })
}

/// POST /api/v1/results/preview - Totals, ranks, points and ties as JSON
pub async fn results_preview(multipart: Multipart) -> ApiResult<Response> {
    let mut form = FormData::from_multipart(multipart).await?;
    let response = compute_results(&mut form)?;
    info!(
        rows = response.table.row_count(),
        ties = response.tie_groups.len(),
        "results preview"
    );
    Ok(Json(ApiResponse::ok(response)).into_response())
}

/// POST /api/v1/results - Event results workbook
pub async fn results_download(multipart: Multipart) -> ApiResult<Response> {
    let mut form = FormData::from_multipart(multipart).await?;
    let file_name = results_file_name(form.field("event_name").unwrap_or_default())?;
    let response = compute_results(&mut form)?;
    let bytes = export_results(&response.table)?;
    info!(file = %file_name, rows = response.table.row_count(), "results download");
    Ok(download(&file_name, bytes))
}

//==============================================================================
// Top performers
//==============================================================================

/// Top performers preview response
#[derive(Serialize)]
pub struct TopResponse {
    pub category: Category,
    pub top: Table,
    pub chart: BarChart,
    pub summary: SummaryStats,
    pub file_name: String,
}

fn compute_top(form: &mut FormData) -> ResultsResult<TopResponse> {
    let table = form.require_table("file")?;
    let category: Category = form.parse_field("category", Category::Student)?;
    let count: usize = form.parse_field("count", DEFAULT_TOP_N)?;
    let title = form.field("title").unwrap_or(DEFAULT_TITLE);

    let top = get_top_performers(&table, category, count)?;
    let chart = BarChart::from_top_performers(&top, category)?;
    let summary = summary_statistics(&table, category)?;

    Ok(TopResponse {
        category,
        top,
        chart,
        summary,
        file_name: top_file_name(title, category),
    })
}

/// POST /api/v1/top/preview - Top performers, chart and summary as JSON
pub async fn top_preview(multipart: Multipart) -> ApiResult<Response> {
    let mut form = FormData::from_multipart(multipart).await?;
    let response = compute_top(&mut form)?;
    info!(category = %response.category, rows = response.top.row_count(), "top preview");
    Ok(Json(ApiResponse::ok(response)).into_response())
}

/// POST /api/v1/top - Top performers workbook
pub async fn top_download(multipart: Multipart) -> ApiResult<Response> {
    let mut form = FormData::from_multipart(multipart).await?;
    let response = compute_top(&mut form)?;
    let bytes = export_top_performers(&response.top, &response.chart, &response.summary)?;
    info!(file = %response.file_name, "top download");
    Ok(download(&response.file_name, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(fields: &[(&str, &str)]) -> FormData {
        FormData {
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            files: HashMap::new(),
        }
    }

    // ==================== ApiResponse Tests ====================

    #[test]
    fn test_api_response_ok_creates_success_response() {
        let response: ApiResponse<String> = ApiResponse::ok("test data".to_string());

        assert!(response.success);
        assert_eq!(response.data, Some("test data".to_string()));
        assert!(response.error.is_none());
        // Verify UUID format (8-4-4-4-12)
        assert_eq!(response.request_id.len(), 36);
    }

    #[test]
    fn test_api_response_err_serializes_without_data() {
        let response: ApiResponse<()> = ApiResponse::err("error message");
        let json = serde_json::to_string(&response).unwrap();

        assert!(!json.contains("\"data\""));
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("\"error\":\"error message\""));
    }

    #[test]
    fn test_api_response_request_id_is_unique() {
        let response1: ApiResponse<i32> = ApiResponse::ok(1);
        let response2: ApiResponse<i32> = ApiResponse::ok(2);
        assert_ne!(response1.request_id, response2.request_id);
    }

    // ==================== Form Field Tests ====================

    #[test]
    fn test_point_values_default_when_fields_absent() {
        let points = form(&[]).point_values().unwrap();
        assert_eq!(points, Some(PointValues::default()));
    }

    #[test]
    fn test_point_values_from_fields() {
        let points = form(&[("first_points", "10"), ("second_points", "6"), ("third_points", "")])
            .point_values()
            .unwrap();
        assert_eq!(
            points,
            Some(PointValues {
                first: 10,
                second: 6,
                third: 1
            })
        );
    }

    #[test]
    fn test_point_values_disabled() {
        let points = form(&[("points_enabled", "false")]).point_values().unwrap();
        assert_eq!(points, None);
    }

    #[test]
    fn test_negative_points_rejected() {
        let err = form(&[("first_points", "-1")]).point_values().unwrap_err();
        assert!(err.to_string().contains("first_points"));
    }

    #[test]
    fn test_unknown_category_rejected() {
        let err = form(&[("category", "team")])
            .parse_field("category", Category::Student)
            .unwrap_err();
        assert!(matches!(err, ResultsError::InvalidInput(_)));
    }

    #[test]
    fn test_missing_upload() {
        let err = form(&[]).require_table("marks").unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: Missing uploaded file 'marks'");
    }

    #[test]
    fn test_upload_is_consumed_by_import() {
        let bytes =
            std::fs::read(concat!(env!("CARGO_MANIFEST_DIR"), "/test-data/marks.xls")).unwrap();
        let mut form = form(&[]);
        form.files.insert(
            "marks".to_string(),
            Upload {
                file_name: "marks".to_string(),
                bytes,
            },
        );

        let table = form.require_table("marks").unwrap();
        assert_eq!(table.name, "marks");
        assert_eq!(table.row_count(), 3);
        assert!(form.files.is_empty());
        assert!(form.table("marks").unwrap().is_none());
    }

    // ==================== Download Tests ====================

    #[test]
    fn test_download_headers() {
        let response = download("Solo \"Song\"_results.xlsx", vec![1, 2, 3]);
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], XLSX_MIME);
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Solo _Song__results.xlsx\""
        );
    }

    #[test]
    fn test_api_error_is_bad_request() {
        let response = ApiError::from(ResultsError::EmptyEventName).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
