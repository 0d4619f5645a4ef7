use crate::analytics::{aggregate, filter};
use crate::domain::models::{DateRange, FeedbackRecord};
use crate::services::{export, insight::INSIGHT_FALLBACK};
use crate::state::SharedState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: aggregate::DashboardStats,
    pub pending_range: DateRange,
    pub applied_range: DateRange,
}

#[derive(Serialize)]
pub struct InsightResponse {
    pub insight: String,
    pub fallback: bool,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/stats", get(stats))
        .route("/records", get(records))
        .route("/filter/pending", post(set_pending))
        .route("/filter/apply", post(apply_filter))
        .route("/filter/clear", post(clear_filter))
        .route("/export/xml", get(export_xml))
        .route("/report", get(report))
        .route("/report/text", get(report_text))
        .route("/insight", post(generate_insight))
        .with_state(state)
}

/// The filtered view is recomputed from the latest store contents and the
/// currently applied range on every read.
async fn applied_view(state: &SharedState) -> (Vec<FeedbackRecord>, DateRange) {
    let applied = state.filter.lock().await.applied;
    let all = state.feedback.load_all().await;
    (filter::filtered_view(&all, &applied), applied)
}

async fn stats(State(state): State<SharedState>) -> Json<StatsResponse> {
    let (view, applied) = applied_view(&state).await;
    let pending = state.filter.lock().await.pending;
    Json(StatsResponse {
        stats: aggregate::dashboard_stats(&view),
        pending_range: pending,
        applied_range: applied,
    })
}

async fn records(State(state): State<SharedState>) -> Json<Vec<FeedbackRecord>> {
    let (view, _) = applied_view(&state).await;
    Json(view)
}

/// Editing the bounds never refilters; only an explicit apply does.
async fn set_pending(
    State(state): State<SharedState>,
    Json(range): Json<DateRange>,
) -> StatusCode {
    state.filter.lock().await.set_pending(range);
    StatusCode::NO_CONTENT
}

async fn apply_filter(State(state): State<SharedState>) -> Json<DateRange> {
    let mut filter = state.filter.lock().await;
    filter.apply();
    Json(filter.applied)
}

async fn clear_filter(State(state): State<SharedState>) -> Json<DateRange> {
    let mut filter = state.filter.lock().await;
    filter.clear();
    Json(filter.applied)
}

async fn export_xml(State(state): State<SharedState>) -> impl IntoResponse {
    let (view, _) = applied_view(&state).await;
    let xml = export::export_xml(&view);
    let filename = format!(
        "attachment; filename=\"relatorio_feedbacks_{}.xml\"",
        chrono::Utc::now().timestamp_millis()
    );
    (
        [
            (header::CONTENT_TYPE, "application/xml".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        xml,
    )
}

async fn report(State(state): State<SharedState>) -> Json<export::PeriodReport> {
    let (view, applied) = applied_view(&state).await;
    Json(export::period_report(&view, &applied))
}

async fn report_text(State(state): State<SharedState>) -> impl IntoResponse {
    let (view, applied) = applied_view(&state).await;
    let text = export::render_report_text(&export::period_report(&view, &applied));
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text)
}

/// Insight failures degrade to a fallback message, never to an error status.
async fn generate_insight(State(state): State<SharedState>) -> Json<InsightResponse> {
    let (view, applied) = applied_view(&state).await;
    match state.insight.generate(&view, &applied).await {
        Ok(text) => Json(InsightResponse {
            insight: text,
            fallback: false,
        }),
        Err(e) => {
            tracing::warn!("insight generation failed: {e}");
            Json(InsightResponse {
                insight: INSIGHT_FALLBACK.to_string(),
                fallback: true,
            })
        }
    }
}
