//! HTTP routes.

use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use whodunit_domain::{
    ChatMessage, ChatMessageId, InteractiveObject, Npc, NpcId, ObjectId, Playthrough,
    PlaythroughId, Room, RoomId, ScenarioId, UserId,
};

use crate::app::App;
use crate::entities::{BudgetError, WorldError};
use crate::infrastructure::ports::RepoError;
use crate::use_cases::budget::GetBudgetError;
use crate::use_cases::dialogue::{DialogueError, DialogueTurn};
use crate::use_cases::highlight::HighlightError;
use crate::use_cases::investigation::{
    ActiveInvestigation, InvestigationCompleted, InvestigationError, InvestigationStarted,
};
use crate::use_cases::session::{PlaythroughConclusion, PlaythroughSummary, SessionError};
use crate::use_cases::world::ScenarioSummary;

/// Header carrying the caller id issued by the upstream identity layer.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        // Session
        .route("/api/playthroughs", post(create_playthrough))
        .route("/api/playthroughs/active", get(resume_active))
        .route("/api/playthroughs/{id}/conclude", post(conclude_playthrough))
        .route("/api/playthroughs/{id}/budget", get(get_budget))
        // World
        .route("/api/scenarios", get(list_scenarios))
        .route("/api/scenarios/{id}/rooms", get(list_rooms))
        .route("/api/rooms/{id}/objects", get(list_objects))
        .route("/api/rooms/{id}/npcs", get(list_npcs))
        .route("/api/objects/{id}/traverse", post(traverse_door))
        // Dialogue
        .route(
            "/api/playthroughs/{id}/messages",
            get(get_history).post(send_message),
        )
        .route(
            "/api/playthroughs/{id}/messages/highlighted",
            get(get_highlighted),
        )
        .route("/api/messages/{id}/highlight", put(set_highlight))
        // Investigation
        .route(
            "/api/playthroughs/{id}/investigation",
            get(investigation_status),
        )
        .route(
            "/api/playthroughs/{id}/investigations/{object_id}/start",
            post(start_investigation),
        )
        .route(
            "/api/playthroughs/{id}/investigations/{object_id}/complete",
            post(complete_investigation),
        )
}

async fn health() -> &'static str {
    "OK"
}

/// Authenticated caller, read from the `x-user-id` header.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub UserId);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;
        let user_id = raw
            .trim()
            .parse::<UserId>()
            .map_err(|_| ApiError::BadRequest(format!("Invalid {} header", USER_ID_HEADER)))?;
        Ok(Self(user_id))
    }
}

// =============================================================================
// Session
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePlaythroughRequest {
    scenario_id: ScenarioId,
}

async fn create_playthrough(
    State(app): State<Arc<App>>,
    Caller(user_id): Caller,
    Json(request): Json<CreatePlaythroughRequest>,
) -> Result<(StatusCode, Json<Playthrough>), ApiError> {
    let playthrough = app
        .use_cases
        .session
        .create
        .execute(user_id, request.scenario_id)
        .await?;
    Ok((StatusCode::CREATED, Json(playthrough)))
}

async fn resume_active(
    State(app): State<Arc<App>>,
    Caller(user_id): Caller,
) -> Result<Json<PlaythroughSummary>, ApiError> {
    let summary = app.use_cases.session.resume.execute(user_id).await?;
    Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
struct ConcludeRequest {
    accusation: String,
}

async fn conclude_playthrough(
    State(app): State<Arc<App>>,
    Caller(user_id): Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<ConcludeRequest>,
) -> Result<Json<PlaythroughConclusion>, ApiError> {
    let conclusion = app
        .use_cases
        .session
        .conclude
        .execute(user_id, PlaythroughId::from_uuid(id), &request.accusation)
        .await?;
    Ok(Json(conclusion))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BudgetResponse {
    remaining_questions: u32,
}

async fn get_budget(
    State(app): State<Arc<App>>,
    Caller(user_id): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<BudgetResponse>, ApiError> {
    let remaining_questions = app
        .use_cases
        .budget
        .execute(user_id, PlaythroughId::from_uuid(id))
        .await?;
    Ok(Json(BudgetResponse {
        remaining_questions,
    }))
}

// =============================================================================
// World
// =============================================================================

async fn list_scenarios(
    State(app): State<Arc<App>>,
) -> Result<Json<Vec<ScenarioSummary>>, ApiError> {
    let scenarios = app.use_cases.world.explore.list_scenarios().await?;
    Ok(Json(scenarios))
}

async fn list_rooms(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Room>>, ApiError> {
    let rooms = app
        .use_cases
        .world
        .explore
        .list_rooms(ScenarioId::from_uuid(id))
        .await?;
    Ok(Json(rooms))
}

async fn list_objects(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<InteractiveObject>>, ApiError> {
    let objects = app
        .use_cases
        .world
        .explore
        .list_objects(RoomId::from_uuid(id))
        .await?;
    Ok(Json(objects))
}

async fn list_npcs(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Npc>>, ApiError> {
    let npcs = app
        .use_cases
        .world
        .explore
        .list_npcs(RoomId::from_uuid(id))
        .await?;
    Ok(Json(npcs))
}

async fn traverse_door(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Room>, ApiError> {
    let room = app
        .use_cases
        .world
        .explore
        .traverse_door(ObjectId::from_uuid(id))
        .await?;
    Ok(Json(room))
}

// =============================================================================
// Dialogue
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageRequest {
    #[serde(default)]
    npc_id: Option<NpcId>,
    text: String,
}

async fn send_message(
    State(app): State<Arc<App>>,
    Caller(user_id): Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<DialogueTurn>, ApiError> {
    let turn = app
        .use_cases
        .dialogue
        .send
        .execute(
            user_id,
            PlaythroughId::from_uuid(id),
            request.npc_id,
            &request.text,
        )
        .await?;
    Ok(Json(turn))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryQuery {
    npc_id: Option<NpcId>,
}

async fn get_history(
    State(app): State<Arc<App>>,
    Caller(user_id): Caller,
    Path(id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let messages = app
        .use_cases
        .dialogue
        .history
        .execute(user_id, PlaythroughId::from_uuid(id), query.npc_id)
        .await?;
    Ok(Json(messages))
}

async fn get_highlighted(
    State(app): State<Arc<App>>,
    Caller(user_id): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let messages = app
        .use_cases
        .dialogue
        .highlighted
        .execute(user_id, PlaythroughId::from_uuid(id))
        .await?;
    Ok(Json(messages))
}

#[derive(Debug, Deserialize)]
struct HighlightRequest {
    highlighted: bool,
}

async fn set_highlight(
    State(app): State<Arc<App>>,
    Caller(user_id): Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<HighlightRequest>,
) -> Result<Json<ChatMessage>, ApiError> {
    let message = app
        .use_cases
        .highlight
        .execute(user_id, ChatMessageId::from_uuid(id), request.highlighted)
        .await?;
    Ok(Json(message))
}

// =============================================================================
// Investigation
// =============================================================================

async fn start_investigation(
    State(app): State<Arc<App>>,
    Caller(user_id): Caller,
    Path((id, object_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<InvestigationStarted>, ApiError> {
    let started = app
        .use_cases
        .investigation
        .start
        .execute(
            user_id,
            PlaythroughId::from_uuid(id),
            ObjectId::from_uuid(object_id),
        )
        .await?;
    Ok(Json(started))
}

async fn complete_investigation(
    State(app): State<Arc<App>>,
    Caller(user_id): Caller,
    Path((id, object_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<InvestigationCompleted>, ApiError> {
    let completed = app
        .use_cases
        .investigation
        .complete
        .execute(
            user_id,
            PlaythroughId::from_uuid(id),
            ObjectId::from_uuid(object_id),
        )
        .await?;
    Ok(Json(completed))
}

async fn investigation_status(
    State(app): State<Arc<App>>,
    Caller(user_id): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Option<ActiveInvestigation>>, ApiError> {
    let active = app
        .use_cases
        .investigation
        .status
        .execute(user_id, PlaythroughId::from_uuid(id))
        .await?;
    Ok(Json(active))
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    Forbidden,
    NotFound(String),
    BadRequest(String),
    Conflict {
        message: String,
        active_object_id: Option<ObjectId>,
    },
    Locked(String),
    BudgetExhausted,
    Unavailable(String),
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Locked(_) => StatusCode::LOCKED,
            ApiError::BudgetExhausted => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Unauthorized => {
                json!({ "error": format!("Missing {} header", USER_ID_HEADER) })
            }
            ApiError::Forbidden => json!({ "error": "Forbidden" }),
            ApiError::BudgetExhausted => json!({ "error": "Question budget exhausted" }),
            ApiError::Conflict {
                message,
                active_object_id,
            } => json!({ "error": message, "activeObjectId": active_object_id }),
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Locked(msg)
            | ApiError::Unavailable(msg) => json!({ "error": msg }),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                json!({ "error": "Internal error" })
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        if e.is_not_found() {
            ApiError::NotFound(e.to_string())
        } else {
            ApiError::Internal(e.to_string())
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::ScenarioNotFound(_)
            | SessionError::PlaythroughNotFound(_)
            | SessionError::NoActiveSession => ApiError::NotFound(e.to_string()),
            SessionError::Forbidden => ApiError::Forbidden,
            SessionError::Concluded(_) => ApiError::Conflict {
                message: e.to_string(),
                active_object_id: None,
            },
            SessionError::EmptyAccusation => ApiError::BadRequest(e.to_string()),
            SessionError::Repo(e) => e.into(),
        }
    }
}

impl From<WorldError> for ApiError {
    fn from(e: WorldError) -> Self {
        match e {
            WorldError::Locked { ref key_name } => ApiError::Locked(match key_name {
                Some(key) => format!("Door is locked (requires {})", key),
                None => e.to_string(),
            }),
            WorldError::NotADoor(_) => ApiError::BadRequest(e.to_string()),
            WorldError::Repo(e) => e.into(),
            other if other.is_not_found() => ApiError::NotFound(other.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<BudgetError> for ApiError {
    fn from(e: BudgetError) -> Self {
        match e {
            BudgetError::Exhausted => ApiError::BudgetExhausted,
            BudgetError::PlaythroughNotFound(_) => ApiError::NotFound(e.to_string()),
            BudgetError::Concluded(_) => ApiError::Conflict {
                message: e.to_string(),
                active_object_id: None,
            },
            BudgetError::Repo(e) => e.into(),
        }
    }
}

impl From<GetBudgetError> for ApiError {
    fn from(e: GetBudgetError) -> Self {
        match e {
            GetBudgetError::Session(e) => e.into(),
            GetBudgetError::Budget(e) => e.into(),
        }
    }
}

impl From<InvestigationError> for ApiError {
    fn from(e: InvestigationError) -> Self {
        match e {
            InvestigationError::Session(e) => e.into(),
            InvestigationError::World(e) => e.into(),
            InvestigationError::Conflict { active_object_id } => ApiError::Conflict {
                message: e.to_string(),
                active_object_id: Some(active_object_id),
            },
            InvestigationError::NotInProgress(_) => ApiError::Conflict {
                message: e.to_string(),
                active_object_id: None,
            },
            InvestigationError::Repo(e) => e.into(),
        }
    }
}

impl From<DialogueError> for ApiError {
    fn from(e: DialogueError) -> Self {
        match e {
            DialogueError::Session(e) => e.into(),
            DialogueError::World(e) => e.into(),
            DialogueError::Budget(e) => e.into(),
            DialogueError::EmptyMessage => ApiError::BadRequest(e.to_string()),
            DialogueError::GenerationUnavailable(_) => ApiError::Unavailable(e.to_string()),
            DialogueError::Repo(e) => e.into(),
        }
    }
}

impl From<HighlightError> for ApiError {
    fn from(e: HighlightError) -> Self {
        match e {
            HighlightError::NotFound(_) => ApiError::NotFound(e.to_string()),
            HighlightError::Repo(e) => e.into(),
        }
    }
}
