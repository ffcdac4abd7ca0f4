use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use xref_engine::{
    ConfirmRequest, ItemDraft, PrepareAction, SyncReport, ITEM_ADDED_EVENT, ITEM_EDITED_EVENT,
};
use xref_types::{Address, OperationKind, OperationStatus, RecordId, SubjectId, TxId};

use crate::error::ServerResult;
use crate::router::AppState;

#[derive(Deserialize)]
pub struct PrepareItemBody {
    pub initiator: Address,
    pub item: ItemDraft,
}

#[derive(Deserialize)]
pub struct PrepareRateBody {
    pub initiator: Address,
    pub rating: u8,
}

#[derive(Deserialize)]
pub struct PrepareLikeBody {
    pub initiator: Address,
}

#[derive(Deserialize)]
pub struct PrepareCommentBody {
    pub initiator: Address,
    pub text: String,
}

#[derive(Deserialize)]
pub struct ConfirmBody {
    pub private_tx_id: TxId,
    pub subject_id: SubjectId,
    pub initiator: Address,
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn prepare_add(
    State(state): State<AppState>,
    Json(body): Json<PrepareItemBody>,
) -> ServerResult<Json<Value>> {
    let prepared = state
        .engine
        .prepare(&body.initiator, PrepareAction::Add { item: body.item })
        .await?;
    Ok(prepared_response(prepared))
}

pub async fn prepare_edit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<PrepareItemBody>,
) -> ServerResult<Json<Value>> {
    let subject = SubjectId::parse(&id)?;
    let prepared = state
        .engine
        .prepare(
            &body.initiator,
            PrepareAction::Edit {
                subject,
                item: body.item,
            },
        )
        .await?;
    Ok(prepared_response(prepared))
}

pub async fn prepare_rate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<PrepareRateBody>,
) -> ServerResult<Json<Value>> {
    let subject = SubjectId::parse(&id)?;
    let prepared = state
        .engine
        .prepare(
            &body.initiator,
            PrepareAction::Rate {
                subject,
                rating: body.rating,
            },
        )
        .await?;
    Ok(prepared_response(prepared))
}

pub async fn prepare_like(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<PrepareLikeBody>,
) -> ServerResult<Json<Value>> {
    let subject = SubjectId::parse(&id)?;
    let prepared = state
        .engine
        .prepare(&body.initiator, PrepareAction::Like { subject })
        .await?;
    Ok(prepared_response(prepared))
}

pub async fn prepare_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<PrepareCommentBody>,
) -> ServerResult<Json<Value>> {
    let subject = SubjectId::parse(&id)?;
    let prepared = state
        .engine
        .prepare(
            &body.initiator,
            PrepareAction::Comment {
                subject,
                text: body.text,
            },
        )
        .await?;
    Ok(prepared_response(prepared))
}

pub async fn confirm_add(
    State(state): State<AppState>,
    Json(body): Json<ConfirmBody>,
) -> (StatusCode, Json<Value>) {
    confirm(state, body, OperationKind::Add, ITEM_ADDED_EVENT).await
}

pub async fn confirm_edit(
    State(state): State<AppState>,
    Json(body): Json<ConfirmBody>,
) -> (StatusCode, Json<Value>) {
    confirm(state, body, OperationKind::Edit, ITEM_EDITED_EVENT).await
}

async fn confirm(
    state: AppState,
    body: ConfirmBody,
    kind: OperationKind,
    expected_event: &str,
) -> (StatusCode, Json<Value>) {
    let report = state
        .engine
        .confirm_and_sync(ConfirmRequest {
            kind,
            private_tx_id: body.private_tx_id,
            subject_id: body.subject_id,
            initiator: body.initiator,
            expected_event: expected_event.to_string(),
        })
        .await;
    report_response(report)
}

pub async fn item_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> ServerResult<Json<Value>> {
    let subject = SubjectId::parse(&id)?;
    let report = state
        .registry
        .subject_history(&subject, query.page.unwrap_or(1), query.limit.unwrap_or(10))
        .await?;
    Ok(Json(json!({
        "success": true,
        "records": report.records,
        "pagination": report.pagination,
    })))
}

pub async fn list_records(State(state): State<AppState>) -> ServerResult<Json<Value>> {
    let records = state.registry.all_records().await?;
    Ok(Json(json!({ "success": true, "records": records })))
}

pub async fn record_count(State(state): State<AppState>) -> ServerResult<Json<Value>> {
    let count = state.registry.count_records().await?;
    Ok(Json(json!({ "success": true, "count": count })))
}

pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ServerResult<Json<Value>> {
    let record = state.registry.get_record(RecordId(id)).await?;
    Ok(Json(json!({ "success": true, "record": record })))
}

fn prepared_response(prepared: xref_engine::PreparedCall) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "transaction payload prepared; sign and submit it client-side",
        "prepared": prepared,
    }))
}

/// One response shape per terminal engine state.
pub(crate) fn report_response(report: SyncReport) -> (StatusCode, Json<Value>) {
    match &report {
        SyncReport::Synced { .. } => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "operation confirmed on the private ledger and synced to the public record",
                "report": report,
            })),
        ),
        SyncReport::Partial { warning, .. } => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "operation confirmed; the public record is not fully synced",
                "warning": warning,
                "report": report,
            })),
        ),
        SyncReport::Failed {
            status, message, ..
        } => {
            let code = if *status == OperationStatus::VerificationFailed {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (
                code,
                Json(json!({
                    "success": false,
                    "message": message,
                    "report": report,
                })),
            )
        }
    }
}
