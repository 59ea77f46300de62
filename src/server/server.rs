use anyhow::Result;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::{debug, error};

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{response, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};

use super::metrics;
use super::session::Session;
use super::{log_requests, state::*, RequestsLoggingLevel, ServerConfig};
use crate::matcher::{EnqueueError, MatchJob, MatcherHandle, TaskId, TaskState};
use crate::store::FullStore;
use crate::user::{AuthTokenValue, RegisterError, UserManager};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub email: Option<String>,
    pub session_token: Option<String>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug)]
struct RegisterBody {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Debug)]
struct LoginBody {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
struct LoginSuccessResponse {
    token: String,
}

#[derive(Deserialize, Debug)]
struct VacancySearchParams {
    pub text: String,
}

#[derive(Serialize)]
struct VacancySearchSummary {
    pub found_on_board: usize,
    pub saved_new: usize,
}

#[derive(Serialize)]
struct VacancyInfo {
    pub id: usize,
    pub board_id: String,
    pub name: String,
    pub has_description: bool,
}

#[derive(Serialize)]
struct FillDescriptionResponse {
    pub status: &'static str,
    pub description: String,
}

#[derive(Deserialize, Debug)]
struct ResumeCreateBody {
    pub content: String,
}

#[derive(Serialize)]
struct ResumeCreatedResponse {
    pub id: usize,
}

#[derive(Deserialize, Debug)]
struct MatchRequestBody {
    pub resume_id: usize,
    pub vacancy_id: usize,
}

#[derive(Serialize)]
struct MatchAcceptedResponse {
    pub task_id: String,
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Serialize)]
struct TaskStatusResponse {
    pub task_id: String,
    #[serde(flatten)]
    pub state: TaskState,
}

async fn home(session: Option<Session>, State(state): State<ServerState>) -> impl IntoResponse {
    let email = session
        .as_ref()
        .and_then(|s| state.user_manager.get_user_email(s.user_id).ok().flatten());
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        email,
        session_token: session.map(|s| s.token),
    };
    Json(stats)
}

async fn register(
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<RegisterBody>,
) -> Response {
    match user_manager.register(&body.email, &body.password) {
        Ok(user_id) => {
            debug!("Registered user {} with id {}", body.email, user_id);
            StatusCode::CREATED.into_response()
        }
        Err(err @ RegisterError::EmailTaken) => {
            (StatusCode::CONFLICT, err.to_string()).into_response()
        }
        Err(err @ (RegisterError::InvalidEmail | RegisterError::PasswordTooShort)) => {
            (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()).into_response()
        }
        Err(RegisterError::Store(err)) => {
            error!("Failed to register user: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn login(
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<LoginBody>,
) -> Response {
    match user_manager.login(&body.email, &body.password) {
        Ok(Some(auth_token)) => {
            metrics::record_login_attempt(true);
            let response_body = LoginSuccessResponse {
                token: auth_token.value.0.clone(),
            };
            let response_body = serde_json::to_string(&response_body).unwrap();

            let cookie_value = HeaderValue::from_str(&format!(
                "session_token={}; Path=/; HttpOnly",
                auth_token.value.0
            ))
            .unwrap();
            response::Builder::new()
                .status(StatusCode::CREATED)
                .header(axum::http::header::SET_COOKIE, cookie_value)
                .body(Body::from(response_body))
                .unwrap()
        }
        Ok(None) => {
            metrics::record_login_attempt(false);
            StatusCode::UNAUTHORIZED.into_response()
        }
        Err(err) => {
            error!("Error during login: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn logout(State(user_manager): State<GuardedUserManager>, session: Session) -> Response {
    match user_manager.delete_auth_token(session.user_id, &AuthTokenValue(session.token)) {
        Ok(()) => {
            let cookie_value = Cookie::build(Cookie::new("session_token", ""))
                .path("/")
                .expires(time::OffsetDateTime::now_utc() - time::Duration::days(1)) // Expire it in the past
                .same_site(SameSite::Lax)
                .build();

            response::Builder::new()
                .status(StatusCode::OK)
                .header(axum::http::header::SET_COOKIE, cookie_value.to_string())
                .body(Body::empty())
                .unwrap()
        }
        Err(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}

async fn search_vacancies(
    _session: Session,
    State(board): State<GuardedJobBoard>,
    State(store): State<GuardedStore>,
    Query(params): Query<VacancySearchParams>,
) -> Response {
    let found = match board.search(&params.text).await {
        Ok(found) => found,
        Err(err) => {
            error!("Job board search failed: {}", err);
            metrics::record_board_search(false);
            return (StatusCode::BAD_GATEWAY, "Job board is unreachable").into_response();
        }
    };
    metrics::record_board_search(true);

    let mut saved_new = 0;
    for listing in &found {
        let url = listing.alternate_url.as_deref().unwrap_or_default();
        match store.insert_vacancy_if_new(&listing.id, &listing.name, url) {
            Ok(true) => saved_new += 1,
            Ok(false) => {}
            Err(err) => {
                error!("Failed to save vacancy {}: {}", listing.id, err);
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        }
    }

    Json(VacancySearchSummary {
        found_on_board: found.len(),
        saved_new,
    })
    .into_response()
}

async fn get_vacancy(
    _session: Session,
    State(store): State<GuardedStore>,
    Path(id): Path<usize>,
) -> Response {
    match store.get_vacancy(id) {
        Ok(Some(vacancy)) => Json(VacancyInfo {
            id: vacancy.id,
            board_id: vacancy.board_id.clone(),
            name: vacancy.name.clone(),
            has_description: vacancy.has_description(),
        })
        .into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Vacancy not found").into_response(),
        Err(err) => {
            error!("Failed to load vacancy {}: {}", id, err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn fill_vacancy_description(
    _session: Session,
    State(board): State<GuardedJobBoard>,
    State(store): State<GuardedStore>,
    Path(board_id): Path<String>,
) -> Response {
    let vacancy = match store.get_vacancy_by_board_id(&board_id) {
        Ok(Some(vacancy)) => vacancy,
        Ok(None) => return (StatusCode::NOT_FOUND, "Vacancy not found").into_response(),
        Err(err) => {
            error!("Failed to load vacancy {}: {}", board_id, err);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if let Some(description) = vacancy.description.filter(|d| !d.is_empty()) {
        return Json(FillDescriptionResponse {
            status: "cached",
            description,
        })
        .into_response();
    }

    let full_text = match board.vacancy_full_text(&board_id).await {
        Ok(Some(text)) => text,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                "Could not fetch the vacancy from the job board",
            )
                .into_response()
        }
        Err(err) => {
            error!("Job board fetch for {} failed: {}", board_id, err);
            return (StatusCode::BAD_GATEWAY, "Job board is unreachable").into_response();
        }
    };

    if let Err(err) = store.set_vacancy_description(&board_id, &full_text) {
        error!("Failed to store description for {}: {}", board_id, err);
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    Json(FillDescriptionResponse {
        status: "updated",
        description: full_text,
    })
    .into_response()
}

async fn post_resume(
    session: Session,
    State(store): State<GuardedStore>,
    Json(body): Json<ResumeCreateBody>,
) -> Response {
    match store.create_resume(session.user_id, &body.content) {
        Ok(id) => (StatusCode::CREATED, Json(ResumeCreatedResponse { id })).into_response(),
        Err(err) => {
            error!(
                "Failed to save resume for user {}: {}",
                session.user_id, err
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn get_all_resumes(_session: Session, State(store): State<GuardedStore>) -> Response {
    match store.get_all_resumes() {
        Ok(resumes) => Json(resumes).into_response(),
        Err(err) => {
            error!("Failed to list resumes: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn post_match(
    _session: Session,
    State(store): State<GuardedStore>,
    State(matcher): State<MatcherHandle>,
    Json(body): Json<MatchRequestBody>,
) -> Response {
    let resume = match store.get_resume(body.resume_id) {
        Ok(Some(resume)) => resume,
        Ok(None) => return (StatusCode::NOT_FOUND, "Resume not found").into_response(),
        Err(err) => {
            error!("Failed to load resume {}: {}", body.resume_id, err);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let vacancy = match store.get_vacancy(body.vacancy_id) {
        Ok(Some(vacancy)) => vacancy,
        Ok(None) => return (StatusCode::NOT_FOUND, "Vacancy not found").into_response(),
        Err(err) => {
            error!("Failed to load vacancy {}: {}", body.vacancy_id, err);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let vacancy_text = match vacancy.description.filter(|d| !d.is_empty()) {
        Some(text) => text,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                "This vacancy has an empty description, fill it first",
            )
                .into_response()
        }
    };

    match matcher
        .enqueue(MatchJob {
            resume_text: resume.content,
            vacancy_text,
        })
        .await
    {
        Ok(task_id) => {
            metrics::MATCH_TASKS_ENQUEUED_TOTAL.inc();
            (
                StatusCode::ACCEPTED,
                Json(MatchAcceptedResponse {
                    task_id: task_id.to_string(),
                    status: "processing",
                    message: "The task was sent to the workers, poll for the result later.",
                }),
            )
                .into_response()
        }
        Err(err @ EnqueueError::QueueFull) | Err(err @ EnqueueError::WorkersStopped) => {
            error!("Failed to enqueue match task: {}", err);
            (StatusCode::SERVICE_UNAVAILABLE, err.to_string()).into_response()
        }
    }
}

async fn get_task_status(
    _session: Session,
    State(matcher): State<MatcherHandle>,
    Path(task_id): Path<String>,
) -> Response {
    let state = matcher.status(&TaskId(task_id.clone())).await;
    Json(TaskStatusResponse { task_id, state }).into_response()
}

pub fn make_app(
    config: ServerConfig,
    store: Arc<dyn FullStore>,
    job_board: GuardedJobBoard,
    matcher: MatcherHandle,
) -> Result<Router> {
    let user_manager = Arc::new(UserManager::new(store.clone()));
    let state = ServerState {
        config,
        start_time: Instant::now(),
        store,
        user_manager,
        job_board,
        matcher,
    };

    let auth_routes: Router = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .with_state(state.clone());

    let vacancy_routes: Router = Router::new()
        .route("/", get(search_vacancies))
        .route("/{id}", get(get_vacancy))
        .route("/{board_id}/fill", post(fill_vacancy_description))
        .with_state(state.clone());

    let resume_routes: Router = Router::new()
        .route("/", post(post_resume))
        .route("/", get(get_all_resumes))
        .with_state(state.clone());

    let match_routes: Router = Router::new()
        .route("/match", post(post_match))
        .route("/tasks/{task_id}", get(get_task_status))
        .with_state(state.clone());

    let home_router: Router = Router::new()
        .route("/", get(home))
        .route("/metrics", get(metrics::metrics_handler))
        .with_state(state.clone());

    let app: Router = home_router
        .nest("/v1/auth", auth_routes)
        .nest("/v1/vacancies", vacancy_routes)
        .nest("/v1/resumes", resume_routes)
        .nest("/v1", match_routes)
        .layer(middleware::from_fn_with_state(state, log_requests));

    Ok(app)
}

#[allow(clippy::too_many_arguments)]
pub async fn run_server(
    store: Arc<dyn FullStore>,
    job_board: GuardedJobBoard,
    matcher: MatcherHandle,
    requests_logging_level: RequestsLoggingLevel,
    port: u16,
    token_retention_days: u64,
) -> Result<()> {
    let config = ServerConfig {
        port,
        requests_logging_level,
        token_retention_days,
    };
    let app = make_app(config, store, job_board, matcher)?;

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    Ok(axum::serve(listener, app).await?)
}
