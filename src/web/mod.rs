// 🌐 Web surface - dashboard page, form posts, JSON API

mod templates;

pub use templates::{DashboardView, Notice};

use crate::app::{CloudKind, Services};
use crate::display::ImpactCard;
use crate::error::StoreError;
use crate::form::{ImpactForm, QuoteForm};
use crate::records::QuoteEntry;
use crate::register::ProjectRow;
use crate::wordcloud::WordFrequencies;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub type AppState = Arc<Services>;

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

fn store_failure_message(err: &StoreError) -> String {
    match err {
        StoreError::Conflict { .. } => {
            "someone else submitted at the same moment, please submit again".to_string()
        }
        other => other.to_string(),
    }
}

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/impacts", get(api_impacts))
        .route("/quotes", get(api_quotes))
        .route("/clouds/:kind", get(api_cloud))
        .route("/register", get(api_register));

    Router::new()
        .route("/", get(dashboard))
        .route("/impacts", post(submit_impact))
        .route("/quotes", post(submit_quote))
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ============================================================================
// PAGE HANDLERS
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct DashboardQuery {
    submitted: Option<String>,
}

/// Read everything the page shows; each section degrades independently.
async fn gather(services: &Services) -> DashboardView {
    let cards = services.display.impact_cards().await.map_err(|e| {
        warn!(error = %e, "Failed to load impact entries");
        e.to_string()
    });

    let quotes = services.display.quotes().await.map_err(|e| {
        warn!(error = %e, "Failed to load quotes");
        e.to_string()
    });

    let mut clouds = Vec::new();
    for kind in [CloudKind::Impacts, CloudKind::Quotes, CloudKind::Entities] {
        let cloud = services.cloud(kind).await.map_err(|e| {
            warn!(cloud = ?kind, error = %e, "Failed to build word cloud");
            e.to_string()
        });
        clouds.push((kind, cloud));
    }

    let register = services.register().await;
    if let Err(e) = &register {
        warn!(error = %e, "Project register unavailable");
    }

    DashboardView {
        cards,
        quotes,
        clouds,
        register,
    }
}

async fn render(
    services: &Services,
    status: StatusCode,
    impact_form: &ImpactForm,
    quote_form: &QuoteForm,
    notice: Option<Notice>,
) -> Response {
    let view = gather(services).await;
    let html = templates::render_dashboard(&view, impact_form, quote_form, notice.as_ref());
    (status, Html(html)).into_response()
}

/// GET / - Dashboard with both forms
async fn dashboard(State(state): State<AppState>, Query(query): Query<DashboardQuery>) -> Response {
    let notice = match query.submitted.as_deref() {
        Some("impact") => Some(Notice::Submitted("impact story")),
        Some("quote") => Some(Notice::Submitted("quote")),
        _ => None,
    };

    render(
        &state,
        StatusCode::OK,
        &ImpactForm::blank(),
        &QuoteForm::default(),
        notice,
    )
    .await
}

/// POST /impacts - Submit an impact story
async fn submit_impact(State(state): State<AppState>, Form(form): Form<ImpactForm>) -> Response {
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(errors) => {
            return render(
                &state,
                StatusCode::UNPROCESSABLE_ENTITY,
                &form,
                &QuoteForm::default(),
                Some(Notice::invalid(&errors)),
            )
            .await
        }
    };

    match state.pipeline.submit_impact(draft).await {
        Ok(entry) => {
            info!(id = entry.id, area = %entry.area, "Impact entry saved");
            Redirect::to("/?submitted=impact").into_response()
        }
        Err(e) => {
            warn!(error = %e, "Impact submission failed");
            render(
                &state,
                StatusCode::BAD_GATEWAY,
                &form,
                &QuoteForm::default(),
                Some(Notice::StoreFailed(store_failure_message(&e))),
            )
            .await
        }
    }
}

/// POST /quotes - Submit a quote
async fn submit_quote(State(state): State<AppState>, Form(form): Form<QuoteForm>) -> Response {
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(errors) => {
            return render(
                &state,
                StatusCode::UNPROCESSABLE_ENTITY,
                &ImpactForm::blank(),
                &form,
                Some(Notice::invalid(&errors)),
            )
            .await
        }
    };

    match state.pipeline.submit_quote(draft).await {
        Ok(quote) => {
            info!(id = quote.id, "Quote saved");
            Redirect::to("/?submitted=quote").into_response()
        }
        Err(e) => {
            warn!(error = %e, "Quote submission failed");
            render(
                &state,
                StatusCode::BAD_GATEWAY,
                &ImpactForm::blank(),
                &form,
                Some(Notice::StoreFailed(store_failure_message(&e))),
            )
            .await
        }
    }
}

// ============================================================================
// API HANDLERS
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/impacts - Impact cards, newest first
async fn api_impacts(State(state): State<AppState>) -> Response {
    match state.display.impact_cards().await {
        Ok(cards) => (StatusCode::OK, Json(ApiResponse::ok(cards))).into_response(),
        Err(e) => {
            warn!(error = %e, "Error getting impact entries");
            (
                StatusCode::BAD_GATEWAY,
                Json(ApiResponse::<Vec<ImpactCard>>::err(e.to_string())),
            )
                .into_response()
        }
    }
}

/// GET /api/quotes - Quotes, newest first
async fn api_quotes(State(state): State<AppState>) -> Response {
    match state.display.quotes().await {
        Ok(quotes) => (StatusCode::OK, Json(ApiResponse::ok(quotes))).into_response(),
        Err(e) => {
            warn!(error = %e, "Error getting quotes");
            (
                StatusCode::BAD_GATEWAY,
                Json(ApiResponse::<Vec<QuoteEntry>>::err(e.to_string())),
            )
                .into_response()
        }
    }
}

/// GET /api/clouds/:kind - Word frequencies for impacts, quotes or entities
async fn api_cloud(State(state): State<AppState>, Path(kind): Path<String>) -> Response {
    let Some(kind) = CloudKind::parse(&kind) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<WordFrequencies>::err(format!(
                "unknown word cloud: {}",
                kind
            ))),
        )
            .into_response();
    };

    match state.cloud(kind).await {
        Ok(freq) => (StatusCode::OK, Json(ApiResponse::ok(freq))).into_response(),
        Err(e) => {
            warn!(cloud = ?kind, error = %e, "Error building word cloud");
            (
                StatusCode::BAD_GATEWAY,
                Json(ApiResponse::<WordFrequencies>::err(e.to_string())),
            )
                .into_response()
        }
    }
}

/// GET /api/register - Projects with impact to report
async fn api_register(State(state): State<AppState>) -> Response {
    match state.register().await {
        Ok(register) => {
            let rows: Vec<ProjectRow> = register.impact_projects().into_iter().cloned().collect();
            (StatusCode::OK, Json(ApiResponse::ok(rows))).into_response()
        }
        Err(e) => {
            warn!(error = %e, "Error loading project register");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::<Vec<ProjectRow>>::err(e.to_string())),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::GazetteerClassifier;
    use crate::records::Collection;
    use crate::register::RegisterSource;
    use crate::store::{RecordStore, Row, SqliteStore};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use std::path::PathBuf;
    use tower::ServiceExt;

    /// Reads work, writes always fail
    struct ReadOnlyStore(SqliteStore);

    #[async_trait]
    impl RecordStore for ReadOnlyStore {
        async fn select_all(&self, collection: Collection) -> Result<Vec<Row>, StoreError> {
            self.0.select_all(collection).await
        }

        async fn insert(&self, _collection: Collection, _row: Row) -> Result<(), StoreError> {
            Err(StoreError::Network("connection reset".to_string()))
        }
    }

    fn app_with(store: Arc<dyn RecordStore>, register: Option<RegisterSource>) -> Router {
        let services = Services::new(
            store,
            Arc::new(GazetteerClassifier::with_defaults()),
            register,
            50,
        );
        router(Arc::new(services))
    }

    fn app() -> Router {
        app_with(Arc::new(SqliteStore::open_in_memory().unwrap()), None)
    }

    fn form_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_string(resp: Response) -> String {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let resp = app().oneshot(get_req("/api/health")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_string(resp).await, r#"{"success":true,"data":"OK"}"#);
    }

    #[tokio::test]
    async fn test_submit_then_list() {
        let app = app();

        let resp = app
            .clone()
            .oneshot(form_post(
                "/impacts",
                "name=Alex&area=HSMA&month=Jan&year=2024&blurb=Launched+a+pilot&link=https%3A%2F%2Fexample.org",
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[header::LOCATION], "/?submitted=impact");

        let resp = app.oneshot(get_req("/api/impacts")).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(json["data"][0]["id"], 0);
        assert_eq!(json["data"][0]["style"], "info");
        assert_eq!(json["data"][0]["link"], "https://example.org");
    }

    #[tokio::test]
    async fn test_invalid_form_keeps_draft() {
        let resp = app()
            .oneshot(form_post(
                "/impacts",
                "name=Alex&area=HSMA&month=Jan&year=1999&blurb=My+draft+story",
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_string(resp).await;
        assert!(html.contains("My draft story"));
        assert!(html.contains("year must be a year between 2010 and 2099"));
    }

    #[tokio::test]
    async fn test_store_failure_keeps_draft() {
        let store = Arc::new(ReadOnlyStore(SqliteStore::open_in_memory().unwrap()));
        let resp = app_with(store, None)
            .oneshot(form_post("/quotes", "name=Jo&org=NHS&quote=Worth+keeping"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let html = body_string(resp).await;
        assert!(html.contains("could not be saved"));
        assert!(html.contains("Worth keeping"));
    }

    #[tokio::test]
    async fn test_dashboard_survives_register_failure() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let register = RegisterSource::File(PathBuf::from("/nonexistent/register.csv"));
        let resp = app_with(store, Some(register))
            .oneshot(get_req("/?submitted=quote"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_string(resp).await;
        assert!(html.contains("Project register unavailable"));
        assert!(html.contains("Your quote has been saved"));
        assert!(html.contains("No impact stories yet"));
    }

    #[tokio::test]
    async fn test_unknown_cloud() {
        let resp = app().oneshot(get_req("/api/clouds/colours")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_register_api_unconfigured() {
        let resp = app().oneshot(get_req("/api/register")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
