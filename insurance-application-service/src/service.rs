use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Request, State},
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{Json, Response},
    routing::{get, patch, post, put},
};
use chrono::Utc;
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, error, info};
use uuid::Uuid;
use wizard_flow::summary::{self, SummaryDocument};
use wizard_flow::{
    BuildingPatch, ContactPatch, Deliverer, FieldError, FlowError, InMemorySessionStorage,
    SessionStorage, SubmissionDispatcher, TravelDates, TravelerPatch, WizardSession, steps,
    validate,
};

use crate::models::{
    AddBuildingResponse, AddTravelerResponse, ApplicationView, LegalStatusRequest,
    SelectProductRequest, StepInfo, SubmitResponse,
};

type ApiResult<T> = Result<Json<T>, ApiError>;
type ApiError = (StatusCode, Json<Value>);

fn not_found_error(message: &str, session_id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": message, "sessionId": session_id })),
    )
}

fn index_not_found(entity: &str, index: usize) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("No {} at index {}", entity, index) })),
    )
}

fn conflict_error(message: &str) -> ApiError {
    (StatusCode::CONFLICT, Json(json!({ "error": message })))
}

fn validation_error(errors: &[FieldError]) -> ApiError {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "error": "Validation failed", "errors": errors })),
    )
}

fn bad_gateway_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({ "error": message, "details": details })),
    )
}

fn internal_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message, "details": details })),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub session_storage: Arc<dyn SessionStorage>,
    pub dispatcher: Arc<SubmissionDispatcher>,
}

/// Wires the in-memory session store and the dispatcher around the given
/// delivery backend.
pub fn create_app_state(deliverer: Arc<dyn Deliverer>) -> AppState {
    let session_storage: Arc<dyn SessionStorage> = Arc::new(InMemorySessionStorage::new());
    let dispatcher = Arc::new(SubmissionDispatcher::new(session_storage.clone(), deliverer));
    AppState {
        session_storage,
        dispatcher,
    }
}

pub fn create_app(app_state: AppState) -> Router {
    build_router(app_state)
}

fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/applications", post(create_application))
        .route("/applications/{session_id}", get(get_application))
        .route("/applications/{session_id}/product", post(select_product))
        .route("/applications/{session_id}/advance", post(advance_step))
        .route("/applications/{session_id}/retreat", post(retreat_step))
        .route("/applications/{session_id}/reset", post(reset_application))
        .route(
            "/applications/{session_id}/legal-status",
            put(set_legal_status),
        )
        .route("/applications/{session_id}/buildings", post(add_building))
        .route(
            "/applications/{session_id}/buildings/{index}",
            patch(update_building).delete(remove_building),
        )
        .route(
            "/applications/{session_id}/buildings/{index}/select",
            post(select_building),
        )
        .route("/applications/{session_id}/travelers", post(add_traveler))
        .route(
            "/applications/{session_id}/travelers/{index}",
            patch(update_traveler).delete(remove_traveler),
        )
        .route(
            "/applications/{session_id}/travelers/{index}/select",
            post(select_traveler),
        )
        .route(
            "/applications/{session_id}/travel-dates",
            put(set_travel_dates),
        )
        .route("/applications/{session_id}/contact", patch(update_contact))
        .route("/applications/{session_id}/summary", get(get_summary))
        .route("/applications/{session_id}/submit", post(submit_application))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(correlation_id_middleware))
        .with_state(app_state)
}

/// Tags every request with a correlation id and a tracing span so log lines
/// from one request can be grouped together.
async fn correlation_id_middleware(mut request: Request, next: Next) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        request.headers_mut().insert("x-correlation-id", value);
    }
    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    next.run(request).instrument(span).await
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Insurance Application Service",
        "version": "1.0.0",
        "description": "Multi-step wizard for property and travel insurance applications",
        "endpoints": {
            "create_application": "POST /applications",
            "get_application": "GET /applications/{session_id}",
            "select_product": "POST /applications/{session_id}/product",
            "advance": "POST /applications/{session_id}/advance",
            "retreat": "POST /applications/{session_id}/retreat",
            "reset": "POST /applications/{session_id}/reset",
            "set_legal_status": "PUT /applications/{session_id}/legal-status",
            "add_building": "POST /applications/{session_id}/buildings",
            "update_building": "PATCH /applications/{session_id}/buildings/{index}",
            "remove_building": "DELETE /applications/{session_id}/buildings/{index}",
            "select_building": "POST /applications/{session_id}/buildings/{index}/select",
            "add_traveler": "POST /applications/{session_id}/travelers",
            "update_traveler": "PATCH /applications/{session_id}/travelers/{index}",
            "remove_traveler": "DELETE /applications/{session_id}/travelers/{index}",
            "select_traveler": "POST /applications/{session_id}/travelers/{index}/select",
            "set_travel_dates": "PUT /applications/{session_id}/travel-dates",
            "update_contact": "PATCH /applications/{session_id}/contact",
            "summary": "GET /applications/{session_id}/summary",
            "submit": "POST /applications/{session_id}/submit",
            "health": "GET /health"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "insurance-application-service",
        "timestamp": Utc::now().to_rfc3339()
    }))
}

async fn load_session(app_state: &AppState, session_id: &str) -> Result<WizardSession, ApiError> {
    match app_state.session_storage.get(session_id).await {
        Ok(Some(session)) => Ok(session),
        Ok(None) => Err(not_found_error("Application session not found", session_id)),
        Err(e) => {
            error!("Failed to load session {}: {}", session_id, e);
            Err(internal_error("Failed to load session", &e.to_string()))
        }
    }
}

async fn save_session(app_state: &AppState, session: WizardSession) -> Result<(), ApiError> {
    let session_id = session.id.clone();
    if let Err(e) = app_state.session_storage.save(session).await {
        error!("Failed to save session {}: {}", session_id, e);
        return Err(internal_error("Failed to save session", &e.to_string()));
    }
    Ok(())
}

/// Edits and navigation are refused once the application is submitted or
/// while a submission is in flight. Reset does not go through this gate.
fn ensure_editable(app_state: &AppState, session: &WizardSession) -> Result<(), ApiError> {
    if session.wizard.is_submitted() {
        return Err(conflict_error("Application already submitted"));
    }
    if app_state.dispatcher.is_in_flight(&session.id) {
        return Err(conflict_error(
            "A submission is in flight for this session; only reset is allowed",
        ));
    }
    Ok(())
}

fn application_view(app_state: &AppState, session: &WizardSession) -> ApplicationView {
    let wizard = &session.wizard;
    let step = wizard.current_step().and_then(|step| {
        let product = wizard.state().product?;
        Some(StepInfo {
            step,
            title: step.title(),
            number: wizard.state().step,
            total: steps::step_count(product),
        })
    });
    ApplicationView {
        session_id: session.id.clone(),
        step,
        active_building: wizard.active_building(),
        active_traveler: wizard.active_traveler(),
        step_errors: validate::step_report(wizard.state(), Utc::now().date_naive()),
        in_flight: app_state.dispatcher.is_in_flight(&session.id),
        state: wizard.state().clone(),
    }
}

async fn save_and_view(
    app_state: &AppState,
    session: WizardSession,
) -> ApiResult<ApplicationView> {
    let view = application_view(app_state, &session);
    save_session(app_state, session).await?;
    Ok(Json(view))
}

async fn create_application(State(app_state): State<AppState>) -> ApiResult<ApplicationView> {
    let session = WizardSession::new();
    info!("Created application session {}", session.id);
    save_and_view(&app_state, session).await
}

async fn get_application(
    State(app_state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<ApplicationView> {
    let session = load_session(&app_state, &session_id).await?;
    Ok(Json(application_view(&app_state, &session)))
}

async fn select_product(
    State(app_state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<SelectProductRequest>,
) -> ApiResult<ApplicationView> {
    let mut session = load_session(&app_state, &session_id).await?;
    ensure_editable(&app_state, &session)?;
    info!(
        "Session {} selected product {:?}",
        session_id, request.product
    );
    session.wizard.select_product(request.product);
    save_and_view(&app_state, session).await
}

async fn advance_step(
    State(app_state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<ApplicationView> {
    let mut session = load_session(&app_state, &session_id).await?;
    ensure_editable(&app_state, &session)?;
    let report = validate::step_report(session.wizard.state(), Utc::now().date_naive());
    if !report.is_empty() {
        info!(
            "Session {} blocked from advancing with {} field error(s)",
            session_id,
            report.len()
        );
        return Err(validation_error(&report));
    }
    session.wizard.advance();
    save_and_view(&app_state, session).await
}

async fn retreat_step(
    State(app_state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<ApplicationView> {
    let mut session = load_session(&app_state, &session_id).await?;
    ensure_editable(&app_state, &session)?;
    session.wizard.retreat();
    save_and_view(&app_state, session).await
}

async fn reset_application(
    State(app_state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<ApplicationView> {
    let mut session = load_session(&app_state, &session_id).await?;
    info!("Resetting session {}", session_id);
    session.wizard.reset();
    save_and_view(&app_state, session).await
}

async fn set_legal_status(
    State(app_state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<LegalStatusRequest>,
) -> ApiResult<ApplicationView> {
    let mut session = load_session(&app_state, &session_id).await?;
    ensure_editable(&app_state, &session)?;
    session.wizard.set_legal_status(request.legal_status);
    save_and_view(&app_state, session).await
}

async fn add_building(
    State(app_state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<AddBuildingResponse> {
    let mut session = load_session(&app_state, &session_id).await?;
    ensure_editable(&app_state, &session)?;
    let Some(index) = session.wizard.add_building() else {
        return Err(conflict_error("Application already submitted"));
    };
    let building = session.wizard.state().buildings[index].clone();
    info!("Session {} added building at index {}", session_id, index);
    save_session(&app_state, session).await?;
    Ok(Json(AddBuildingResponse { index, building }))
}

async fn update_building(
    State(app_state): State<AppState>,
    Path((session_id, index)): Path<(String, usize)>,
    Json(patch): Json<BuildingPatch>,
) -> ApiResult<ApplicationView> {
    let mut session = load_session(&app_state, &session_id).await?;
    ensure_editable(&app_state, &session)?;
    if index >= session.wizard.state().buildings.len() {
        return Err(index_not_found("building", index));
    }
    session.wizard.update_building(index, patch);
    save_and_view(&app_state, session).await
}

async fn remove_building(
    State(app_state): State<AppState>,
    Path((session_id, index)): Path<(String, usize)>,
) -> ApiResult<ApplicationView> {
    let mut session = load_session(&app_state, &session_id).await?;
    ensure_editable(&app_state, &session)?;
    if index >= session.wizard.state().buildings.len() {
        return Err(index_not_found("building", index));
    }
    session.wizard.remove_building(index);
    save_and_view(&app_state, session).await
}

async fn select_building(
    State(app_state): State<AppState>,
    Path((session_id, index)): Path<(String, usize)>,
) -> ApiResult<ApplicationView> {
    let mut session = load_session(&app_state, &session_id).await?;
    ensure_editable(&app_state, &session)?;
    if index >= session.wizard.state().buildings.len() {
        return Err(index_not_found("building", index));
    }
    session.wizard.select_building(index);
    save_and_view(&app_state, session).await
}

async fn add_traveler(
    State(app_state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<AddTravelerResponse> {
    let mut session = load_session(&app_state, &session_id).await?;
    ensure_editable(&app_state, &session)?;
    let Some(index) = session.wizard.add_traveler() else {
        return Err(conflict_error("Application already submitted"));
    };
    let traveler = session.wizard.state().travel.travelers[index].clone();
    info!("Session {} added traveler at index {}", session_id, index);
    save_session(&app_state, session).await?;
    Ok(Json(AddTravelerResponse { index, traveler }))
}

async fn update_traveler(
    State(app_state): State<AppState>,
    Path((session_id, index)): Path<(String, usize)>,
    Json(patch): Json<TravelerPatch>,
) -> ApiResult<ApplicationView> {
    let mut session = load_session(&app_state, &session_id).await?;
    ensure_editable(&app_state, &session)?;
    if index >= session.wizard.state().travel.travelers.len() {
        return Err(index_not_found("traveler", index));
    }
    session.wizard.update_traveler(index, patch);
    save_and_view(&app_state, session).await
}

async fn remove_traveler(
    State(app_state): State<AppState>,
    Path((session_id, index)): Path<(String, usize)>,
) -> ApiResult<ApplicationView> {
    let mut session = load_session(&app_state, &session_id).await?;
    ensure_editable(&app_state, &session)?;
    if index >= session.wizard.state().travel.travelers.len() {
        return Err(index_not_found("traveler", index));
    }
    session.wizard.remove_traveler(index);
    save_and_view(&app_state, session).await
}

async fn select_traveler(
    State(app_state): State<AppState>,
    Path((session_id, index)): Path<(String, usize)>,
) -> ApiResult<ApplicationView> {
    let mut session = load_session(&app_state, &session_id).await?;
    ensure_editable(&app_state, &session)?;
    if index >= session.wizard.state().travel.travelers.len() {
        return Err(index_not_found("traveler", index));
    }
    session.wizard.select_traveler(index);
    save_and_view(&app_state, session).await
}

async fn set_travel_dates(
    State(app_state): State<AppState>,
    Path(session_id): Path<String>,
    Json(dates): Json<TravelDates>,
) -> ApiResult<ApplicationView> {
    let mut session = load_session(&app_state, &session_id).await?;
    ensure_editable(&app_state, &session)?;
    session.wizard.set_travel_dates(dates);
    save_and_view(&app_state, session).await
}

async fn update_contact(
    State(app_state): State<AppState>,
    Path(session_id): Path<String>,
    Json(patch): Json<ContactPatch>,
) -> ApiResult<ApplicationView> {
    let mut session = load_session(&app_state, &session_id).await?;
    ensure_editable(&app_state, &session)?;
    session.wizard.update_contact(patch);
    save_and_view(&app_state, session).await
}

async fn get_summary(
    State(app_state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<SummaryDocument> {
    let session = load_session(&app_state, &session_id).await?;
    Ok(Json(summary::render(session.wizard.state())))
}

async fn submit_application(
    State(app_state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<SubmitResponse> {
    info!("Submitting application for session {}", session_id);
    let today = Utc::now().date_naive();
    match app_state.dispatcher.submit(&session_id, today).await {
        Ok(()) => {
            let reference = format!("APP-{:08X}", rand::random::<u32>());
            info!("Session {} submitted as {}", session_id, reference);
            Ok(Json(SubmitResponse {
                session_id,
                reference,
                submitted_at: Utc::now(),
                message: "Application submitted successfully".to_string(),
            }))
        }
        Err(FlowError::SessionNotFound(id)) => {
            Err(not_found_error("Application session not found", &id))
        }
        Err(FlowError::AlreadySubmitted) => Err(conflict_error("Application already submitted")),
        Err(FlowError::SubmitInFlight) => Err(conflict_error(
            "A submission is already in flight for this session",
        )),
        Err(FlowError::Superseded) => Err(conflict_error(
            "Session was reset while the submission was in flight",
        )),
        Err(FlowError::Invalid(errors)) => Err(validation_error(&errors)),
        Err(FlowError::Delivery(e)) => {
            error!("Delivery failed for session {}: {}", session_id, e);
            Err(bad_gateway_error(
                "Submission could not be delivered",
                &e.to_string(),
            ))
        }
        Err(FlowError::Storage(e)) => {
            error!(
                "Storage failure during submit for session {}: {}",
                session_id, e
            );
            Err(internal_error("Failed to submit application", &e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, header::CONTENT_TYPE};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::Notify;
    use tower::ServiceExt;
    use wizard_flow::{ApplicationState, DeliveryError};

    struct RecordingDeliverer {
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    impl RecordingDeliverer {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl Deliverer for RecordingDeliverer {
        async fn send(&self, _application: &ApplicationState) -> Result<(), DeliveryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(DeliveryError::Transport("connection refused".to_string()));
            }
            Ok(())
        }
    }

    struct GatedDeliverer {
        started: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl Deliverer for GatedDeliverer {
        async fn send(&self, _application: &ApplicationState) -> Result<(), DeliveryError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(())
        }
    }

    fn test_app() -> (Router, Arc<RecordingDeliverer>) {
        let deliverer = Arc::new(RecordingDeliverer::new());
        let app = create_app(create_app_state(deliverer.clone()));
        (app, deliverer)
    }

    async fn read_json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        }
    }

    async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, read_json_body(response).await)
    }

    async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, read_json_body(response).await)
    }

    async fn create_session(app: &Router) -> String {
        let (status, body) = send(app, "POST", "/applications").await;
        assert_eq!(status, StatusCode::OK);
        body["sessionId"].as_str().unwrap().to_string()
    }

    /// Drives a session to a state where submission would pass validation:
    /// property product, one valid apartment, full contact details.
    async fn seed_valid_property(app: &Router) -> String {
        let session_id = create_session(app).await;
        let (status, _) = send_json(
            app,
            "POST",
            &format!("/applications/{session_id}/product"),
            json!({ "product": "Property" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        send(app, "POST", &format!("/applications/{session_id}/advance")).await;
        send(app, "POST", &format!("/applications/{session_id}/buildings")).await;
        let (status, _) = send_json(
            app,
            "PATCH",
            &format!("/applications/{session_id}/buildings/0"),
            json!({
                "objectType": "Apartment",
                "propertyArea": 54.5,
                "currentFloor": 2,
                "totalFloors": 5
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send_json(
            app,
            "PATCH",
            &format!("/applications/{session_id}/contact"),
            json!({
                "name": "Anna Liepa",
                "email": "anna@example.com",
                "phone": "+37120000000",
                "consent": true
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        session_id
    }

    #[tokio::test]
    async fn create_returns_a_fresh_session() {
        let (app, _) = test_app();
        let (status, body) = send(&app, "POST", "/applications").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["sessionId"].as_str().is_some());
        assert!(body["step"].is_null());
        assert!(body["activeBuilding"].is_null());
        assert_eq!(body["state"]["step"], 1);
        assert_eq!(body["state"]["submitted"], false);
    }

    #[tokio::test]
    async fn product_selection_starts_the_sequence() {
        let (app, _) = test_app();
        let session_id = create_session(&app).await;
        let (status, body) = send_json(
            &app,
            "POST",
            &format!("/applications/{session_id}/product"),
            json!({ "product": "Property" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["step"]["step"], "Intro");
        assert_eq!(body["step"]["number"], 1);
        assert_eq!(body["step"]["total"], 4);
        assert_eq!(body["stepErrors"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn advance_is_blocked_until_the_step_validates() {
        let (app, _) = test_app();
        let session_id = create_session(&app).await;
        send_json(
            &app,
            "POST",
            &format!("/applications/{session_id}/product"),
            json!({ "product": "Property" }),
        )
        .await;
        // Intro has no requirements.
        let (status, body) =
            send(&app, "POST", &format!("/applications/{session_id}/advance")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["step"]["step"], "PropertyDetails");

        // No buildings yet, so the property step refuses to advance.
        let (status, body) =
            send(&app, "POST", &format!("/applications/{session_id}/advance")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"][0]["path"], "buildings");

        send(&app, "POST", &format!("/applications/{session_id}/buildings")).await;
        let (status, body) =
            send(&app, "POST", &format!("/applications/{session_id}/advance")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let paths: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["path"].as_str().unwrap())
            .collect();
        assert!(paths.contains(&"buildings[0].propertyArea"));
    }

    #[tokio::test]
    async fn property_application_round_trip() {
        let (app, deliverer) = test_app();
        let session_id = seed_valid_property(&app).await;

        let (status, body) =
            send(&app, "POST", &format!("/applications/{session_id}/advance")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["step"]["step"], "Contact");
        let (status, body) =
            send(&app, "POST", &format!("/applications/{session_id}/advance")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["step"]["step"], "Summary");

        let (status, body) =
            send(&app, "GET", &format!("/applications/{session_id}/summary")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "New insurance application");

        let (status, body) =
            send(&app, "POST", &format!("/applications/{session_id}/submit")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["reference"].as_str().unwrap().starts_with("APP-"));
        assert_eq!(deliverer.calls.load(Ordering::SeqCst), 1);

        let (status, body) = send(&app, "GET", &format!("/applications/{session_id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"]["submitted"], true);

        // Terminal state: edits and navigation are refused.
        let (status, _) = send_json(
            &app,
            "PATCH",
            &format!("/applications/{session_id}/contact"),
            json!({ "phone": "+37129999999" }),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        let (status, _) = send(&app, "POST", &format!("/applications/{session_id}/advance")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        let (status, _) = send(&app, "POST", &format!("/applications/{session_id}/submit")).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn building_index_out_of_range_is_404() {
        let (app, _) = test_app();
        let session_id = create_session(&app).await;
        send_json(
            &app,
            "POST",
            &format!("/applications/{session_id}/product"),
            json!({ "product": "Property" }),
        )
        .await;
        send(&app, "POST", &format!("/applications/{session_id}/buildings")).await;
        let (status, body) = send_json(
            &app,
            "PATCH",
            &format!("/applications/{session_id}/buildings/5"),
            json!({ "propertyArea": 10.0 }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "No building at index 5");
        let (status, _) = send(
            &app,
            "DELETE",
            &format!("/applications/{session_id}/buildings/5"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_session_is_404() {
        let (app, _) = test_app();
        let (status, _) = send(&app, "GET", "/applications/no-such-session").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "POST", "/applications/no-such-session/submit").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn travel_dates_cannot_be_inverted() {
        let (app, _) = test_app();
        let session_id = create_session(&app).await;
        send_json(
            &app,
            "POST",
            &format!("/applications/{session_id}/product"),
            json!({ "product": "Travel" }),
        )
        .await;

        // Travel opens on the travelers step; an empty list blocks it.
        let (status, body) =
            send(&app, "POST", &format!("/applications/{session_id}/advance")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"][0]["path"], "travelers");

        send(&app, "POST", &format!("/applications/{session_id}/travelers")).await;
        send_json(
            &app,
            "PATCH",
            &format!("/applications/{session_id}/travelers/0"),
            json!({
                "firstName": "Ilze",
                "lastName": "Ozola",
                "birthDate": "1990-05-04",
                "policyType": "Standard"
            }),
        )
        .await;
        send_json(
            &app,
            "PUT",
            &format!("/applications/{session_id}/travel-dates"),
            json!({ "dateFrom": "2026-07-10", "dateTo": "2026-07-01" }),
        )
        .await;

        let (status, body) =
            send(&app, "POST", &format!("/applications/{session_id}/advance")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let paths: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["path"].as_str().unwrap())
            .collect();
        assert!(paths.contains(&"dateTo"));

        send_json(
            &app,
            "PUT",
            &format!("/applications/{session_id}/travel-dates"),
            json!({ "dateFrom": "2026-07-01", "dateTo": "2026-07-10" }),
        )
        .await;
        let (status, body) =
            send(&app, "POST", &format!("/applications/{session_id}/advance")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["step"]["step"], "Contact");
    }

    #[tokio::test]
    async fn delivery_failure_is_reported_and_retryable() {
        let (app, deliverer) = test_app();
        let session_id = seed_valid_property(&app).await;

        deliverer.fail.store(true, Ordering::SeqCst);
        let (status, body) =
            send(&app, "POST", &format!("/applications/{session_id}/submit")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Submission could not be delivered");

        let (_, body) = send(&app, "GET", &format!("/applications/{session_id}")).await;
        assert_eq!(body["state"]["submitted"], false);

        deliverer.fail.store(false, Ordering::SeqCst);
        let (status, _) = send(&app, "POST", &format!("/applications/{session_id}/submit")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deliverer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn edits_are_refused_while_a_submit_is_in_flight() {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let deliverer = Arc::new(GatedDeliverer {
            started: started.clone(),
            release: release.clone(),
        });
        let app = create_app(create_app_state(deliverer));
        let session_id = seed_valid_property(&app).await;

        let submit = {
            let app = app.clone();
            let uri = format!("/applications/{session_id}/submit");
            tokio::spawn(async move { send(&app, "POST", &uri).await })
        };
        started.notified().await;

        let (status, body) = send_json(
            &app,
            "PATCH",
            &format!("/applications/{session_id}/contact"),
            json!({ "name": "Eva Berzina" }),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body["error"],
            "A submission is in flight for this session; only reset is allowed"
        );
        let (status, _) = send(&app, "POST", &format!("/applications/{session_id}/advance")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        let (_, body) = send(&app, "GET", &format!("/applications/{session_id}")).await;
        assert_eq!(body["inFlight"], true);

        release.notify_one();
        let (status, _) = submit.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        let (_, body) = send(&app, "GET", &format!("/applications/{session_id}")).await;
        assert_eq!(body["state"]["submitted"], true);
    }

    #[tokio::test]
    async fn reset_clears_a_submitted_session() {
        let (app, _) = test_app();
        let session_id = seed_valid_property(&app).await;
        let (status, _) = send(&app, "POST", &format!("/applications/{session_id}/submit")).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, "POST", &format!("/applications/{session_id}/reset")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["state"]["product"].is_null());
        assert_eq!(body["state"]["submitted"], false);
        assert!(body["step"].is_null());

        let (status, _) = send_json(
            &app,
            "POST",
            &format!("/applications/{session_id}/product"),
            json!({ "product": "Travel" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn removing_the_displayed_building_selects_the_new_last() {
        let (app, _) = test_app();
        let session_id = create_session(&app).await;
        send_json(
            &app,
            "POST",
            &format!("/applications/{session_id}/product"),
            json!({ "product": "Property" }),
        )
        .await;
        for _ in 0..3 {
            send(&app, "POST", &format!("/applications/{session_id}/buildings")).await;
        }
        let (status, body) = send(
            &app,
            "POST",
            &format!("/applications/{session_id}/buildings/0/select"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["activeBuilding"], 0);

        let (status, body) = send(
            &app,
            "DELETE",
            &format!("/applications/{session_id}/buildings/0"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["activeBuilding"], 1);
        assert_eq!(body["state"]["buildings"].as_array().unwrap().len(), 2);
    }
}
