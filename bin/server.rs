// Multi Calculator - Web Server
// JSON API over every calculator plus history, analytics, advisor, sharing and reports

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use anyhow::Context;
use chrono::{Datelike, Local};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, MutexGuard};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use multi_calc::advisor::{self, BmiAdviceRequest, GpaAdviceRequest, LoanAdviceRequest};
use multi_calc::analytics::{self, ChartKind};
use multi_calc::history::{self, entries_to_csv, entries_to_json};
use multi_calc::{
    calculator_report, run_calculator, AppConfig, CalcError, CalculatorKind, ErrorBody, Sharer, Validator,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
    config: Arc<AppConfig>,
    sharer: Sharer,
}

impl AppState {
    fn db(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::Internal(anyhow::anyhow!("database lock poisoned")))
    }

    /// `X-User-Id` header, or the configured local user
    fn user_id(&self, headers: &HeaderMap) -> String {
        headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.config.default_user.clone())
    }
}

// ============================================================================
// Errors
// ============================================================================

enum ApiError {
    /// Rejected input: 400
    Calc(CalcError),
    NotFound(String),
    Internal(anyhow::Error),
}

impl From<CalcError> for ApiError {
    fn from(err: CalcError) -> Self {
        ApiError::Calc(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Calc(err) => (StatusCode::BAD_REQUEST, ErrorBody::from(&err)),
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    success: false,
                    message: format!("{} not found", what),
                    kind: "not_found".to_string(),
                },
            ),
            ApiError::Internal(err) => {
                error!(error = %format!("{:#}", err), "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        success: false,
                        message: "Internal server error".to_string(),
                        kind: "internal".to_string(),
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Success bodies carry `success: true` next to the result fields
fn success(mut value: Value) -> Json<Value> {
    if let Value::Object(map) = &mut value {
        map.insert("success".to_string(), Value::Bool(true));
    }
    Json(value)
}

// ============================================================================
// Calculators & listings
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(json!({"success": true, "status": "OK", "version": multi_calc::VERSION}))
}

fn calculate(kind: CalculatorKind, payload: Value) -> ApiResult<Json<Value>> {
    Ok(success(run_calculator(kind, &payload)?))
}

async fn list_calculators() -> impl IntoResponse {
    Json(json!({"success": true, "calculators": multi_calc::calculator_listing()}))
}

async fn unit_listing(Path(category): Path<String>) -> ApiResult<Json<Value>> {
    Ok(Json(multi_calc::unit_listing(&category)?))
}

/// POST /api/report/:calculator - plain-text report of the detailed result
async fn report(
    State(state): State<AppState>,
    Path(calculator): Path<String>,
    Json(payload): Json<Value>,
) -> ApiResult<Response> {
    let kind = CalculatorKind::parse(&calculator).map_err(|_| ApiError::NotFound(format!("Calculator '{}'", calculator)))?;
    let report = calculator_report(kind, &payload, Local::now().naive_local(), state.config.report_page_lines)?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], report.render()).into_response())
}

// ============================================================================
// Advisor
// ============================================================================

async fn bmi_recommendations(Json(body): Json<BmiAdviceRequest>) -> ApiResult<Json<Value>> {
    Ok(success(json!(advisor::bmi_recommendations(&body)?)))
}

async fn loan_recommendations(Json(body): Json<LoanAdviceRequest>) -> ApiResult<Json<Value>> {
    Ok(success(json!(advisor::loan_recommendations(&body)?)))
}

async fn gpa_recommendations(Json(body): Json<GpaAdviceRequest>) -> ApiResult<Json<Value>> {
    Ok(success(json!(advisor::gpa_recommendations(&body)?)))
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    calculator_type: String,
}

async fn chat(Json(body): Json<ChatRequest>) -> impl IntoResponse {
    Json(json!({"success": true, "response": advisor::chat(&body.message, &body.calculator_type)}))
}

/// Shared body for explain and share endpoints
#[derive(Deserialize)]
struct ResultPayload {
    calculator_type: String,
    #[serde(default, alias = "results")]
    result: Value,
    #[serde(default)]
    inputs: Value,
}

async fn explain(Json(body): Json<ResultPayload>) -> impl IntoResponse {
    let explanation = advisor::smart_explanation(&body.calculator_type, &body.result, &body.inputs);
    success(json!(explanation))
}

// ============================================================================
// History
// ============================================================================

#[derive(Deserialize)]
struct SaveRequest {
    calculator_type: String,
    #[serde(default)]
    inputs: Value,
    #[serde(default)]
    results: Value,
}

async fn save_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SaveRequest>,
) -> ApiResult<Json<Value>> {
    let kind = CalculatorKind::parse(&body.calculator_type)?;
    let user = state.user_id(&headers);
    let conn = state.db()?;
    let entry = history::save_calculation(&conn, &user, kind.name(), body.inputs, body.results)?;
    Ok(Json(json!({
        "success": true,
        "message": "Calculation saved successfully",
        "entry": entry,
    })))
}

#[derive(Deserialize)]
struct HistoryQuery {
    calculator_type: Option<String>,
    limit: Option<usize>,
}

async fn get_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Value>> {
    let user = state.user_id(&headers);
    let conn = state.db()?;
    let entries = history::get_user_history(&conn, &user, query.calculator_type.as_deref(), query.limit)?;
    Ok(Json(json!({"success": true, "total": entries.len(), "history": entries})))
}

#[derive(Deserialize)]
struct MonthQuery {
    year: Option<i32>,
    month: Option<u32>,
}

async fn monthly_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MonthQuery>,
) -> ApiResult<Json<Value>> {
    let today = Local::now().date_naive();
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| today.month());
    Validator::new("monthly_summary")
        .range("month", month as f64, 1.0, 12.0)
        .finish()?;

    let user = state.user_id(&headers);
    let conn = state.db()?;
    let summary = history::get_monthly_summary(&conn, &user, year, month)?;
    Ok(success(json!(summary)))
}

async fn get_history_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(entry_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let user = state.user_id(&headers);
    let conn = state.db()?;
    match history::get_entry(&conn, &user, &entry_id)? {
        Some(entry) => Ok(Json(json!({"success": true, "entry": entry}))),
        None => Err(ApiError::NotFound(format!("History entry '{}'", entry_id))),
    }
}

async fn delete_history_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(entry_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let user = state.user_id(&headers);
    let conn = state.db()?;
    if !history::delete_entry(&conn, &user, &entry_id)? {
        return Err(ApiError::NotFound(format!("History entry '{}'", entry_id)));
    }
    Ok(Json(json!({"success": true, "message": "Entry deleted"})))
}

#[derive(Deserialize)]
struct TypeQuery {
    calculator_type: Option<String>,
}

impl TypeQuery {
    fn required(&self) -> ApiResult<&str> {
        self.calculator_type.as_deref().ok_or_else(|| {
            ApiError::Calc(CalcError::Validation(multi_calc::ValidationError::new(
                "calculator_type",
                "is required",
                "analytics",
            )))
        })
    }
}

async fn clear_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<TypeQuery>,
) -> ApiResult<Json<Value>> {
    let user = state.user_id(&headers);
    let conn = state.db()?;
    let removed = history::clear_history(&conn, &user, query.calculator_type.as_deref())?;
    Ok(Json(json!({"success": true, "removed": removed})))
}

async fn export_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(format): Path<String>,
) -> ApiResult<Response> {
    let user = state.user_id(&headers);
    let conn = state.db()?;
    let entries = history::get_user_history(&conn, &user, None, None)?;
    let (content_type, body) = match format.as_str() {
        "csv" => ("text/csv; charset=utf-8", entries_to_csv(&entries)?),
        "json" => ("application/json", entries_to_json(&entries)?),
        other => return Err(CalcError::unsupported("format", other).into()),
    };
    Ok(([(header::CONTENT_TYPE, content_type)], body).into_response())
}

// ============================================================================
// Analytics
// ============================================================================

async fn analytics_trends(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<TypeQuery>,
) -> ApiResult<Json<Value>> {
    let calculator_type = query.required()?;
    let user = state.user_id(&headers);
    let conn = state.db()?;
    let data = history::get_analytics_data(&conn, &user, calculator_type)?;
    Ok(success(json!(data)))
}

async fn analytics_chart(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(chart): Path<String>,
) -> ApiResult<Json<Value>> {
    let kind = ChartKind::parse(&chart)?;
    let user = state.user_id(&headers);
    let conn = state.db()?;
    let entries = history::get_user_history(&conn, &user, Some(kind.calculator_type()), None)?;
    Ok(Json(json!(kind.build(&entries))))
}

#[derive(Deserialize)]
struct LoanVizRequest {
    amount: f64,
    rate: f64,
    duration: f64,
}

async fn loan_visualization(Json(body): Json<LoanVizRequest>) -> ApiResult<Json<Value>> {
    let viz = analytics::loan_visualization(body.amount, body.rate, body.duration)?;
    Ok(Json(json!({"success": true, "visualization": viz})))
}

async fn analytics_insights(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<TypeQuery>,
) -> ApiResult<Json<Value>> {
    let calculator_type = query.required()?;
    let user = state.user_id(&headers);
    let conn = state.db()?;
    let entries = history::get_user_history(&conn, &user, Some(calculator_type), None)?;

    let current = entries.first().map(|e| e.results.clone()).unwrap_or_else(|| json!({}));
    let comparison = match entries.get(1) {
        Some(previous) => analytics::comparison_chart(calculator_type, &current, &previous.results),
        None => None,
    };
    Ok(Json(json!({
        "success": true,
        "insights": analytics::insights(calculator_type, &entries, &current),
        "recommendations": analytics::trend_recommendations(calculator_type, &entries),
        "comparison": comparison,
    })))
}

async fn analytics_usage(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Json<Value>> {
    let user = state.user_id(&headers);
    let conn = state.db()?;
    let entries = history::get_user_history(&conn, &user, None, None)?;
    Ok(Json(json!({
        "success": true,
        "usage_stats": analytics::usage_stats(&entries),
        "activity_heatmap": analytics::activity_heatmap(&entries),
    })))
}

// ============================================================================
// Sharing
// ============================================================================

async fn share_links(State(state): State<AppState>, Json(body): Json<ResultPayload>) -> impl IntoResponse {
    let links = state.sharer.links(&body.calculator_type, &body.result, &body.inputs);
    success(json!(links))
}

async fn share_card(State(state): State<AppState>, Json(body): Json<ResultPayload>) -> impl IntoResponse {
    let card = state.sharer.card(&body.calculator_type, &body.result, &body.inputs);
    success(json!(card))
}

async fn share_copy_text(State(state): State<AppState>, Json(body): Json<ResultPayload>) -> impl IntoResponse {
    let text = state.sharer.copy_text(&body.calculator_type, &body.result, &body.inputs);
    Json(json!({"success": true, "text": text}))
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Endpoint".to_string())
}

// ============================================================================
// Main Server
// ============================================================================

fn init_tracing(config: &AppConfig) {
    let level = &config.log_level;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("multi_calc={0},calc_server={0},tower_http={0}", level))
    });
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_router(state: AppState) -> Router {
    let mut api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/calculators", get(list_calculators))
        // Listings
        .route("/calorie-burn/activities", get(|| async { Json(multi_calc::activity_listing()) }))
        .route("/currency-converter/currencies", get(|| async { Json(multi_calc::currency_listing()) }))
        .route("/unit-converter/categories", get(|| async { Json(multi_calc::unit_category_listing()) }))
        .route("/unit-converter/units/:category", get(unit_listing))
        .route("/sleep/tips", get(|| async { Json(multi_calc::sleep_tips_listing()) }))
        // Advisor
        .route("/ai/bmi-recommendations", post(bmi_recommendations))
        .route("/ai/loan-recommendations", post(loan_recommendations))
        .route("/ai/gpa-recommendations", post(gpa_recommendations))
        .route("/ai/chat", post(chat))
        .route("/ai/explain", post(explain))
        // History
        .route("/history/save", post(save_history))
        .route("/history/get", get(get_history))
        .route("/history/monthly-summary", get(monthly_summary))
        .route("/history/entry/:id", get(get_history_entry))
        .route("/history/delete/:id", delete(delete_history_entry))
        .route("/history/clear", delete(clear_history))
        .route("/history/export/:format", get(export_history))
        // Analytics
        .route("/analytics/trends", get(analytics_trends))
        .route("/analytics/chart/:type", get(analytics_chart))
        .route("/analytics/loan-visualization", post(loan_visualization))
        .route("/analytics/insights", get(analytics_insights))
        .route("/analytics/usage-stats", get(analytics_usage))
        // Sharing & reports
        .route("/share/links", post(share_links))
        .route("/share/card-data", post(share_card))
        .route("/share/copy-text", post(share_copy_text))
        .route("/report/:calculator", post(report));

    // POST /api/<route> for every calculator
    for kind in CalculatorKind::ALL {
        api_routes = api_routes.route(
            &format!("/{}", kind.route()),
            post(move |Json(payload): Json<Value>| async move { calculate(kind, payload) }),
        );
    }

    Router::new()
        .nest("/api", api_routes.with_state(state))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config);

    println!("🌐 Multi Calculator - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let conn = history::open_database(std::path::Path::new(&config.database_path))?;
    info!(path = %config.database_path, "history database ready");

    let addr = config.bind_address.clone();
    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
        sharer: Sharer::new(&config.share_base_url),
        config: Arc::new(config),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/health", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
