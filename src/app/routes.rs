//! Route registration for the form, the dashboard and the JSON endpoints.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use crate::app::pages;
use crate::core::{ApiResponse, LeadService, LeadSubmission};

pub type AppState = Arc<LeadService>;

/// Build the complete router.
pub fn build_router(service: AppState) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/dashboard", get(dashboard_page))
        .route("/submit_lead", post(submit_lead))
        .route("/delete_lead/{id}", delete(delete_lead))
        .route("/api/leads", get(list_leads))
        .route("/health", get(health))
        .with_state(service)
}

async fn index_page() -> impl IntoResponse {
    Html(pages::index_html())
}

async fn dashboard_page(State(service): State<AppState>) -> Response {
    match service.list_leads().await {
        Ok(leads) => Html(pages::dashboard_html(&leads)).into_response(),
        Err(e) => {
            tracing::error!("❌ Dashboard error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!(
                    "<h1>Dashboard unavailable</h1><p>{}</p>",
                    pages::escape_html(&e.to_string())
                )),
            )
                .into_response()
        }
    }
}

/// Handle POST /submit_lead. Always answers 200 with `{success, message}`.
async fn submit_lead(
    State(service): State<AppState>,
    payload: Result<Json<LeadSubmission>, JsonRejection>,
) -> Json<ApiResponse> {
    let submission = match payload {
        Ok(Json(submission)) => submission,
        Err(rejection) => {
            tracing::warn!("Submit lead with unreadable body: {}", rejection);
            return Json(ApiResponse::failed(rejection.body_text()));
        }
    };

    Json(service.submit_lead(submission).await)
}

async fn delete_lead(State(service): State<AppState>, Path(id): Path<i64>) -> Json<ApiResponse> {
    Json(service.delete_lead(id).await)
}

async fn list_leads(State(service): State<AppState>) -> Response {
    match service.list_leads().await {
        Ok(leads) => Json(leads).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::from(&e)),
        )
            .into_response(),
    }
}

async fn health(State(service): State<AppState>) -> Response {
    match service.lead_count().await {
        Ok(count) => Json(serde_json::json!({
            "status": "ok",
            "leads": count,
        }))
        .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "status": "error",
                "message": e.to_string(),
            })),
        )
            .into_response(),
    }
}
