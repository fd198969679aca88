//! Academic-affairs (jwqywx) service session.
//!
//! This is the second login stage: the service issues a bearer token plus an
//! internal subject id on login, and every later call attaches the token as
//! an `Authorization` header. Token and subject id live behind a single
//! reader-writer lock so endpoint calls (and the background training-plan
//! prefetch) read concurrently while login, logout, and 401 invalidation
//! stay exclusive; the token is published under the write lock before
//! `login` returns, so no request can observe a half-initialized session.

mod plan;
mod types;

pub use plan::{
    aggregate as aggregate_training_plan, PlanCourse, PlanCourseKind, RawPlanItem, TrainingPlan,
};
pub use types::{
    CourseGrade, ExamArrangement, FieldValue, LoginUser, Message, ScheduleRow, StudentPoint, Term,
};

use crate::client::CczuClient;
use crate::config::JwqywxConfig;
use crate::error::CczuError;
use crate::schedule::RawScheduleCell;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, ORIGIN, REFERER};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

const LOGIN_PATH: &str = "login";
const GRADES_PATH: &str = "cj_xh";
const CREDITS_PATH: &str = "cj_xh_xfjd";
const TERMS_PATH: &str = "xqall";
const SCHEDULE_PATH: &str = "kb_xq_xh";
const EXAMS_PATH: &str = "ks_xs_kslb";
const PLAN_PATH: &str = "pyfa_xh";

/// Bearer token and subject id issued at login.
#[derive(Debug, Clone)]
struct AuthState {
    bearer: String,
    user_id: String,
}

/// An authenticated session against the academic-affairs service.
///
/// Cloning is cheap and every clone shares the same token state, so a clone
/// can be handed to a background task while the original keeps serving
/// foreground calls.
#[derive(Clone)]
pub struct JwqywxSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    client: Arc<CczuClient>,
    config: JwqywxConfig,
    base_headers: HeaderMap,
    auth: RwLock<Option<AuthState>>,
    plan_prefetch: Mutex<Option<JoinHandle<Result<TrainingPlan, CczuError>>>>,
}

impl JwqywxSession {
    /// Creates a session with the default (production) configuration.
    pub fn new(client: Arc<CczuClient>) -> Self {
        Self::with_config(client, JwqywxConfig::default())
    }

    /// Creates a session with custom configuration.
    pub fn with_config(client: Arc<CczuClient>, config: JwqywxConfig) -> Self {
        let mut base_headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&config.referer) {
            base_headers.insert(REFERER, value);
        }
        if let Ok(value) = HeaderValue::from_str(&config.origin) {
            base_headers.insert(ORIGIN, value);
        }

        Self {
            inner: Arc::new(SessionInner {
                client,
                config,
                base_headers,
                auth: RwLock::new(None),
                plan_prefetch: Mutex::new(None),
            }),
        }
    }

    /// Logs in with the client's credential pair.
    ///
    /// The request deliberately carries no `Authorization` header; the
    /// service rejects stale tokens on the login endpoint itself. A wrong
    /// password is not reported by status: the service answers 200 with an
    /// empty subject id, which surfaces here as
    /// [`CczuError::InvalidCredentials`].
    ///
    /// On success a best-effort training-plan prefetch is dispatched in the
    /// background (see [`take_plan_prefetch`](Self::take_plan_prefetch)).
    pub async fn login(&self) -> Result<Message<LoginUser>, CczuError> {
        let url = self.endpoint(LOGIN_PATH)?;
        info!(url = %url, "logging in to the academic-affairs service");

        let account = self.inner.client.account();
        let body = serde_json::json!({
            "userid": account.username,
            "userpwd": account.password,
        });
        let response = self
            .inner
            .client
            .post_json(url, self.inner.base_headers.clone(), &body)
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(CczuError::LoginFailed {
                reason: format!("login returned status {status}"),
            });
        }

        let message: Message<LoginUser> = serde_json::from_str(&response.text().await?)?;
        let state = validate_login(&message)?;
        info!(user_id = %state.user_id, "academic-affairs login succeeded");

        {
            let mut guard = self.inner.auth.write().await;
            *guard = Some(state);
        }
        self.spawn_plan_prefetch();

        Ok(message)
    }

    /// Clears the token and cancels a still-running prefetch. Subsequent
    /// operations fail with [`CczuError::NotLoggedIn`] until the next login.
    pub async fn logout(&self) {
        if let Ok(mut guard) = self.inner.plan_prefetch.lock() {
            if let Some(handle) = guard.take() {
                handle.abort();
            }
        }
        let mut auth = self.inner.auth.write().await;
        *auth = None;
        info!("logged out of the academic-affairs service");
    }

    /// The subject id issued at login, if a session is established.
    pub async fn user_id(&self) -> Option<String> {
        let guard = self.inner.auth.read().await;
        guard.as_ref().map(|state| state.user_id.clone())
    }

    pub async fn is_logged_in(&self) -> bool {
        self.inner.auth.read().await.is_some()
    }

    /// Grades for every term on record.
    pub async fn grades(&self) -> Result<Message<CourseGrade>, CczuError> {
        let user_id = self.current_user_id().await?;
        self.authed_post(GRADES_PATH, &serde_json::json!({ "xh": user_id }))
            .await
    }

    /// Grade-point average and ranking data.
    pub async fn credits_and_rank(&self) -> Result<Message<StudentPoint>, CczuError> {
        let user_id = self.current_user_id().await?;
        self.authed_post(CREDITS_PATH, &serde_json::json!({ "xh": user_id }))
            .await
    }

    /// All term codes known to the service, newest first. Does not require
    /// a login.
    pub async fn terms(&self) -> Result<Message<Term>, CczuError> {
        let url = self.endpoint(TERMS_PATH)?;
        let response = self.inner.client.get(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CczuError::InvalidResponse {
                message: format!("{TERMS_PATH} returned status {status}"),
            });
        }
        Ok(serde_json::from_str(&response.text().await?)?)
    }

    /// The newest term code, or [`CczuError::MissingData`] when the service
    /// lists none.
    pub async fn current_term(&self) -> Result<String, CczuError> {
        let terms = self.terms().await?;
        terms
            .message
            .first()
            .map(|entry| entry.term.clone())
            .ok_or_else(|| CczuError::MissingData {
                description: "no term found".to_string(),
            })
    }

    /// The raw timetable matrix for `term`: one row per time slot, one cell
    /// per day of week. Feed it to
    /// [`schedule::parse_week_matrix`](crate::schedule::parse_week_matrix)
    /// for structured entries.
    pub async fn class_schedule(
        &self,
        term: &str,
    ) -> Result<Vec<Vec<RawScheduleCell>>, CczuError> {
        let user_id = self.current_user_id().await?;
        let body = serde_json::json!({
            "xh": self.inner.client.account().username,
            "xq": term,
            "yhid": user_id,
        });
        let message: Message<ScheduleRow> = self.authed_post(SCHEDULE_PATH, &body).await?;
        debug!(rows = message.message.len(), term, "decoded schedule rows");
        Ok(message.message.iter().map(ScheduleRow::to_cells).collect())
    }

    /// The timetable matrix for the newest term.
    pub async fn current_class_schedule(&self) -> Result<Vec<Vec<RawScheduleCell>>, CczuError> {
        let term = self.current_term().await?;
        self.class_schedule(&term).await
    }

    /// Every exam listed for the student, scheduled or not.
    pub async fn exam_arrangements(&self) -> Result<Vec<ExamArrangement>, CczuError> {
        // the endpoint scopes results by the token; the body stays empty
        let message: Message<ExamArrangement> =
            self.authed_post(EXAMS_PATH, &serde_json::json!({})).await?;
        Ok(message.message)
    }

    /// Exams for the newest term only.
    pub async fn current_exam_arrangements(&self) -> Result<Vec<ExamArrangement>, CczuError> {
        let term = self.current_term().await?;
        let exams = self.exam_arrangements().await?;
        Ok(exams.into_iter().filter(|exam| exam.term == term).collect())
    }

    /// Fetches and aggregates the training plan for the logged-in student.
    pub async fn training_plan(&self) -> Result<TrainingPlan, CczuError> {
        let user_id = self.current_user_id().await?;
        let message: Message<RawPlanItem> = self
            .authed_post(PLAN_PATH, &serde_json::json!({ "xh": user_id }))
            .await?;
        Ok(plan::aggregate(&message.message))
    }

    /// Claims the background training-plan prefetch started by the last
    /// login, if one is still outstanding.
    ///
    /// By default the prefetch is fire-and-forget and its errors are
    /// swallowed; claiming the handle lets a caller await the result or
    /// abort the task instead.
    pub fn take_plan_prefetch(&self) -> Option<JoinHandle<Result<TrainingPlan, CczuError>>> {
        self.inner
            .plan_prefetch
            .lock()
            .ok()
            .and_then(|mut guard| guard.take())
    }

    fn spawn_plan_prefetch(&self) {
        let session = self.clone();
        let handle = tokio::spawn(async move {
            match session.training_plan().await {
                Ok(plan) => {
                    debug!(credits = plan.total_credits, "training plan prefetched");
                    Ok(plan)
                }
                Err(error) => {
                    debug!(%error, "training plan prefetch failed");
                    Err(error)
                }
            }
        });
        if let Ok(mut guard) = self.inner.plan_prefetch.lock() {
            if let Some(previous) = guard.replace(handle) {
                previous.abort();
            }
        }
    }

    /// POSTs a JSON body with the bearer token attached and decodes the
    /// envelope. A 401-class status clears the session and reports
    /// [`CczuError::NotLoggedIn`].
    async fn authed_post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<Message<T>, CczuError> {
        let headers = self.auth_headers().await?;
        let url = self.endpoint(path)?;
        let response = self.inner.client.post_json(url, headers, body).await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(%status, path, "token rejected, clearing session");
            *self.inner.auth.write().await = None;
            return Err(CczuError::NotLoggedIn);
        }
        if !status.is_success() {
            return Err(CczuError::InvalidResponse {
                message: format!("{path} returned status {status}"),
            });
        }

        Ok(serde_json::from_str(&response.text().await?)?)
    }

    async fn auth_headers(&self) -> Result<HeaderMap, CczuError> {
        let guard = self.inner.auth.read().await;
        let state = guard.as_ref().ok_or(CczuError::NotLoggedIn)?;
        let mut headers = self.inner.base_headers.clone();
        let value =
            HeaderValue::from_str(&state.bearer).map_err(|_| CczuError::InvalidResponse {
                message: "bearer token is not a valid header value".to_string(),
            })?;
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }

    async fn current_user_id(&self) -> Result<String, CczuError> {
        let guard = self.inner.auth.read().await;
        guard
            .as_ref()
            .map(|state| state.user_id.clone())
            .ok_or(CczuError::NotLoggedIn)
    }

    fn endpoint(&self, path: &str) -> Result<Url, CczuError> {
        Ok(Url::parse(&format!("{}/{path}", self.inner.config.api_base))?)
    }
}

/// Checks a login envelope and extracts the auth state.
///
/// Failure order matters: a missing token or empty payload is a service
/// failure, while a present payload with an empty subject id is the
/// bad-password signal.
fn validate_login(message: &Message<LoginUser>) -> Result<AuthState, CczuError> {
    let token = message
        .token
        .as_deref()
        .ok_or_else(|| CczuError::LoginFailed {
            reason: "login response carried no token".to_string(),
        })?;
    let user = message
        .message
        .first()
        .ok_or_else(|| CczuError::LoginFailed {
            reason: "login response carried no user data".to_string(),
        })?;
    if user.user_id.is_empty() {
        return Err(CczuError::InvalidCredentials);
    }
    Ok(AuthState {
        bearer: format!("Bearer {token}"),
        user_id: user.user_id.clone(),
    })
}
