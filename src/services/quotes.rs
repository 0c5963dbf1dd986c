//! Quote management endpoints over the `quotes` table.

use super::error::{ApiError, ApiResult};
use super::JsonObject;
use super::web::{ApiResponse, AppState};
use crate::db::core::{DbError, DbTable};
use crate::impl_table;
use crate::patch::{
    AssembledStatement, Case, Choices, DefaultValue, FieldSchema, FieldSpec, PatchRequest,
    Placeholder, assemble_insert, by_status, resolve_create, search,
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
use std::collections::BTreeMap;
use uuid::Uuid;

pub const QUOTES_TABLE: &str = "quotes";
pub const QUOTE_KEY: &str = "id";
const QUOTE_ORDER: &str = "created_at DESC, quote_number";

pub static QUOTE_STATUSES: Choices = Choices::new(
    &[
        "draft",
        "pending_review",
        "pending_approval",
        "approved",
        "sent",
        "accepted",
        "rejected",
        "expired",
    ],
    Case::Lower,
);

pub static QUOTE_PRIORITIES: Choices =
    Choices::new(&["low", "medium", "high", "urgent"], Case::Lower);

// `required` only applies on create; updates accept any subset
static FIELDS: [FieldSpec; 12] = [
    FieldSpec::text("quote_number").required(),
    FieldSpec::text("title").required(),
    FieldSpec::text("description"),
    FieldSpec::choice("status", &QUOTE_STATUSES).default_value(DefaultValue::Text("draft")),
    FieldSpec::choice("priority", &QUOTE_PRIORITIES).default_value(DefaultValue::Text("medium")),
    FieldSpec::decimal("subtotal").default_value(DefaultValue::Real(0.0)),
    FieldSpec::decimal("tax_amount").default_value(DefaultValue::Real(0.0)),
    FieldSpec::decimal("total_amount").required(),
    FieldSpec::text("currency").default_value(DefaultValue::Text("ZAR")),
    FieldSpec::text("valid_until"),
    FieldSpec::integer("delivery_days"),
    FieldSpec::json("metadata"),
];
pub static QUOTE_FIELDS: FieldSchema = FieldSchema::new(&FIELDS);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub id: String,
    pub quote_number: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
    pub currency: String,
    pub valid_until: Option<String>,
    pub delivery_days: Option<i64>,
    pub metadata: Option<Value>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl_table!(Quote, QUOTES_TABLE, key = QUOTE_KEY, order = QUOTE_ORDER, {
    id: "id",
    quote_number: "quote_number",
    title: "title",
    description: "description",
    status: "status",
    priority: "priority",
    subtotal: "subtotal",
    tax_amount: "tax_amount",
    total_amount: "total_amount",
    currency: "currency",
    valid_until: "valid_until",
    delivery_days: "delivery_days",
    metadata: "metadata",
    created_at: "created_at",
    updated_at: "updated_at",
});

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteStats {
    pub total_quotes: i64,
    pub total_value: f64,
    pub average_value: f64,
    pub by_status: BTreeMap<&'static str, i64>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/quotes", get(list_quotes).post(create_quote))
        .route("/api/quotes/stats", get(quote_stats))
        .route("/api/quotes/status/:status", get(quotes_by_status))
        .route("/api/quotes/search/:term", get(search_quotes))
        .route(
            "/api/quotes/:id",
            get(get_quote)
                .put(update_quote)
                .patch(update_quote)
                .delete(delete_quote),
        )
}

async fn list_quotes(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<Vec<Quote>>>> {
    let quotes = state.db.call(|c| DbTable::<Quote>::select_all(c)).await?;
    Ok(Json(ApiResponse::success(quotes)))
}

async fn get_quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Quote>>> {
    let quote = state
        .db
        .call(move |c| DbTable::<Quote>::select(c, &id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Quote not found".to_string()))?;
    Ok(Json(ApiResponse::success(quote)))
}

async fn quotes_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<Quote>>>> {
    let stmt = by_status(
        QUOTES_TABLE,
        "status",
        &QUOTE_STATUSES,
        &status,
        QUOTE_ORDER,
        Placeholder::Numbered,
    )?;
    let quotes = state
        .db
        .call(move |c| DbTable::<Quote>::select_many(c, &stmt))
        .await?;
    Ok(Json(ApiResponse::success(quotes)))
}

async fn search_quotes(
    State(state): State<AppState>,
    Path(term): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<Quote>>>> {
    let stmt = search(
        QUOTES_TABLE,
        &["quote_number", "title", "description"],
        &term,
        QUOTE_ORDER,
        Placeholder::Numbered,
    )?;
    let quotes = state
        .db
        .call(move |c| DbTable::<Quote>::select_many(c, &stmt))
        .await?;
    Ok(Json(ApiResponse::success(quotes)))
}

async fn create_quote(
    State(state): State<AppState>,
    JsonObject(payload): JsonObject,
) -> ApiResult<impl IntoResponse> {
    let mut fields = resolve_create(&QUOTE_FIELDS, &payload)?;

    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().timestamp();
    fields.push_managed("id", id.clone());
    fields.push_managed("created_at", now);
    fields.push_managed("updated_at", now);
    let stmt = assemble_insert(QUOTES_TABLE, fields, Placeholder::Numbered)?;

    let quote = state
        .db
        .call(move |c| {
            DbTable::<Quote>::execute(c, &stmt)?;
            DbTable::<Quote>::select(c, &id)
        })
        .await
        .map_err(|e| ApiError::db_with_conflict(e, "Quote number already exists"))?
        .ok_or_else(|| ApiError::Db(DbError::Unavailable("created quote not found".into())))?;

    tracing::info!(id = %quote.id, quote_number = %quote.quote_number, "Quote created");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(quote))))
}

async fn update_quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonObject(payload): JsonObject,
) -> ApiResult<Json<ApiResponse<Quote>>> {
    let stmt = PatchRequest::new(&QUOTE_FIELDS, id.as_str(), &payload)?
        .touch("updated_at", chrono::Utc::now().timestamp())
        .assemble(QUOTES_TABLE, QUOTE_KEY, Placeholder::Numbered)?;

    let quote = state
        .db
        .call(move |c| match DbTable::<Quote>::execute(c, &stmt)? {
            0 => Ok(None),
            _ => DbTable::<Quote>::select(c, &id),
        })
        .await
        .map_err(|e| ApiError::db_with_conflict(e, "Quote number already exists"))?
        .ok_or_else(|| ApiError::NotFound("Quote not found".to_string()))?;
    Ok(Json(ApiResponse::success(quote)))
}

async fn delete_quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Value>>> {
    let key = id.clone();
    let deleted = state
        .db
        .call(move |c| DbTable::<Quote>::delete(c, &key))
        .await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("Quote not found".to_string()));
    }

    tracing::info!(%id, "Quote deleted");
    Ok(Json(ApiResponse::success(serde_json::json!({
        "message": "Quote deleted successfully",
        "id": id,
    }))))
}

async fn quote_stats(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<QuoteStats>>> {
    let totals_stmt = AssembledStatement::checked(
        "SELECT COUNT(*), COALESCE(SUM(total_amount), 0), COALESCE(AVG(total_amount), 0) FROM quotes"
            .to_string(),
        Vec::new(),
        Placeholder::Numbered,
    )?;
    let grouped_stmt = AssembledStatement::checked(
        "SELECT status, COUNT(*) FROM quotes GROUP BY status".to_string(),
        Vec::new(),
        Placeholder::Numbered,
    )?;

    let (totals, counts) = state
        .db
        .call(move |c| {
            let totals = c.query_one(&totals_stmt, |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?, row.get::<_, f64>(2)?))
            })?;
            let counts = c.query_many(&grouped_stmt, |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?;
            Ok((totals, counts))
        })
        .await?;

    let (total_quotes, total_value, average_value) = totals.unwrap_or((0, 0.0, 0.0));
    let mut by_status: BTreeMap<&'static str, i64> =
        QUOTE_STATUSES.values().iter().map(|s| (*s, 0)).collect();
    for (status, count) in counts {
        match QUOTE_STATUSES.normalize(&status) {
            Some(known) => *by_status.entry(known).or_default() += count,
            None => tracing::warn!(%status, count, "Quotes with unrecognised status"),
        }
    }

    Ok(Json(ApiResponse::success(QuoteStats {
        total_quotes,
        total_value,
        average_value,
        by_status,
    })))
}
