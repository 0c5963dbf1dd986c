//! Job tracking endpoints over the `erhadata` table.

use super::error::{ApiError, ApiResult};
use super::JsonObject;
use super::web::{ApiResponse, AppState};
use crate::db::core::{DbError, DbTable};
use crate::impl_table;
use crate::patch::{
    AssembledStatement, Case, Choices, DefaultValue, FieldSchema, FieldSet, FieldSpec,
    PatchError, PatchRequest, Placeholder, SqlValue, assemble_insert, by_status, resolve_create,
    search,
};
use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use serde::Serialize;
use serde_json::Value;

pub const JOBS_TABLE: &str = "erhadata";
pub const JOB_KEY: &str = "jobNo";

pub static JOB_STATUSES: Choices = Choices::new(&["APPROVED", "PENDING"], Case::Upper);

static CREATE_FIELDS: [FieldSpec; 4] = [
    FieldSpec::text("jobNo").required(),
    FieldSpec::text("description").required(),
    FieldSpec::decimal("estimatedValue").default_value(DefaultValue::Real(0.0)),
    FieldSpec::choice("status", &JOB_STATUSES).default_value(DefaultValue::Text("PENDING")),
];
pub static JOB_CREATE: FieldSchema = FieldSchema::new(&CREATE_FIELDS);

// jobNo is the identity and cannot be patched
static UPDATE_FIELDS: [FieldSpec; 3] = [
    FieldSpec::text("description"),
    FieldSpec::decimal("estimatedValue"),
    FieldSpec::choice("status", &JOB_STATUSES),
];
pub static JOB_UPDATE: FieldSchema = FieldSchema::new(&UPDATE_FIELDS);

const STATS_SQL: &str = "SELECT
        COUNT(*) AS totalJobs,
        COALESCE(SUM(CASE WHEN status = 'APPROVED' THEN 1 ELSE 0 END), 0) AS approvedJobs,
        COALESCE(SUM(CASE WHEN status = 'PENDING' THEN 1 ELSE 0 END), 0) AS pendingJobs,
        COALESCE(SUM(estimatedValue), 0) AS totalValue,
        COALESCE(AVG(estimatedValue), 0) AS averageValue,
        COALESCE(MAX(estimatedValue), 0) AS maxValue,
        COALESCE(MIN(estimatedValue), 0) AS minValue
    FROM erhadata";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_no: String,
    pub description: String,
    pub estimated_value: f64,
    pub status: String,
}

impl_table!(Job, JOBS_TABLE, key = JOB_KEY, order = JOB_KEY, {
    job_no: "jobNo",
    description: "description",
    estimated_value: "estimatedValue",
    status: "status",
});

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStats {
    pub total_jobs: i64,
    pub approved_jobs: i64,
    pub pending_jobs: i64,
    pub total_value: f64,
    pub average_value: f64,
    pub max_value: f64,
    pub min_value: f64,
}

impl JobStats {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            total_jobs: row.get("totalJobs")?,
            approved_jobs: row.get("approvedJobs")?,
            pending_jobs: row.get("pendingJobs")?,
            total_value: row.get("totalValue")?,
            average_value: row.get("averageValue")?,
            max_value: row.get("maxValue")?,
            min_value: row.get("minValue")?,
        })
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/jobs", get(list_jobs).post(create_job))
        .route("/api/jobs/status/:status", get(jobs_by_status))
        .route("/api/jobs/search/:term", get(search_jobs))
        .route(
            "/api/jobs/:job_no",
            get(get_job).put(update_job).patch(update_job).delete(delete_job),
        )
        .route("/api/stats", get(job_stats))
}

async fn list_jobs(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<Vec<Job>>>> {
    let jobs = state.db.call(|c| DbTable::<Job>::select_all(c)).await?;
    Ok(Json(ApiResponse::success(jobs)))
}

async fn get_job(
    State(state): State<AppState>,
    Path(job_no): Path<String>,
) -> ApiResult<Json<ApiResponse<Job>>> {
    let job = state
        .db
        .call(move |c| DbTable::<Job>::select(c, &job_no))
        .await?
        .ok_or_else(|| ApiError::NotFound("Job not found".to_string()))?;
    Ok(Json(ApiResponse::success(job)))
}

async fn jobs_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<Job>>>> {
    let stmt = by_status(
        JOBS_TABLE,
        "status",
        &JOB_STATUSES,
        &status,
        JOB_KEY,
        Placeholder::Anonymous,
    )?;
    let jobs = state
        .db
        .call(move |c| DbTable::<Job>::select_many(c, &stmt))
        .await?;
    Ok(Json(ApiResponse::success(jobs)))
}

async fn search_jobs(
    State(state): State<AppState>,
    Path(term): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<Job>>>> {
    let stmt = search(
        JOBS_TABLE,
        &["description"],
        &term,
        JOB_KEY,
        Placeholder::Anonymous,
    )?;
    let jobs = state
        .db
        .call(move |c| DbTable::<Job>::select_many(c, &stmt))
        .await?;
    Ok(Json(ApiResponse::success(jobs)))
}

async fn create_job(
    State(state): State<AppState>,
    JsonObject(payload): JsonObject,
) -> ApiResult<impl IntoResponse> {
    let fields = resolve_create(&JOB_CREATE, &payload)?;
    let job_no = job_no_of(&fields)?;
    let stmt = assemble_insert(JOBS_TABLE, fields, Placeholder::Anonymous)?;

    let job = state
        .db
        .call(move |c| {
            DbTable::<Job>::execute(c, &stmt)?;
            DbTable::<Job>::select(c, &job_no)
        })
        .await
        .map_err(|e| ApiError::db_with_conflict(e, "Job number already exists"))?
        .ok_or_else(|| ApiError::Db(DbError::Unavailable("created job not found".into())))?;

    tracing::info!(job_no = %job.job_no, "Job created");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(job))))
}

async fn update_job(
    State(state): State<AppState>,
    Path(job_no): Path<String>,
    JsonObject(payload): JsonObject,
) -> ApiResult<Json<ApiResponse<Job>>> {
    let stmt = PatchRequest::new(&JOB_UPDATE, job_no.as_str(), &payload)?.assemble(
        JOBS_TABLE,
        JOB_KEY,
        Placeholder::Anonymous,
    )?;
    tracing::debug!(statement = stmt.text(), "Updating job");

    let job = state
        .db
        .call(move |c| match DbTable::<Job>::execute(c, &stmt)? {
            0 => Ok(None),
            _ => DbTable::<Job>::select(c, &job_no),
        })
        .await?
        .ok_or_else(|| ApiError::NotFound("Job not found".to_string()))?;
    Ok(Json(ApiResponse::success(job)))
}

async fn delete_job(
    State(state): State<AppState>,
    Path(job_no): Path<String>,
) -> ApiResult<Json<ApiResponse<Value>>> {
    let key = job_no.clone();
    let deleted = state
        .db
        .call(move |c| DbTable::<Job>::delete(c, &key))
        .await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("Job not found".to_string()));
    }

    tracing::info!(%job_no, "Job deleted");
    Ok(Json(ApiResponse::success(serde_json::json!({
        "message": "Job deleted successfully",
        "jobNo": job_no,
    }))))
}

async fn job_stats(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<JobStats>>> {
    let stmt = AssembledStatement::checked(STATS_SQL.to_string(), Vec::new(), Placeholder::Anonymous)?;
    let stats = state
        .db
        .call(move |c| c.query_one(&stmt, JobStats::from_row))
        .await?
        .ok_or_else(|| ApiError::Db(DbError::Unavailable("stats query returned no row".into())))?;
    Ok(Json(ApiResponse::success(stats)))
}

fn job_no_of(fields: &FieldSet) -> Result<String, PatchError> {
    match fields.get(JOB_KEY) {
        Some(SqlValue::Text(job_no)) => Ok(job_no.clone()),
        _ => Err(PatchError::MissingField(JOB_KEY)),
    }
}
