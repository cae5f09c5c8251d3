#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use classroll_core::roles::Role;
use classroll_db::models::student::{CreateStudent, StudentProfile};
use classroll_db::repositories::StudentRepo;
use classroll_face::{FaceError, FaceMatcher, FaceVerdict};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use classroll_api::auth::jwt::{mint_token, JwtConfig};
use classroll_api::config::{AttendanceConfig, ServerConfig};
use classroll_api::router::build_app_router;
use classroll_api::state::AppState;

pub const ADMIN_USER_ID: i64 = 1;

// ---------------------------------------------------------------------------
// Face-match stub
// ---------------------------------------------------------------------------

/// What the scripted face matcher answers.
#[derive(Debug, Clone, Copy)]
pub enum FaceScript {
    Match(f64),
    Mismatch(f64),
    /// Every call fails as if the service were unreachable.
    Down,
    /// Matches, but only after sleeping this long.
    Slow(std::time::Duration),
}

/// In-memory [`FaceMatcher`] that answers from a fixed script and counts calls.
pub struct ScriptedFaceMatcher {
    script: FaceScript,
    pub calls: AtomicUsize,
}

impl ScriptedFaceMatcher {
    pub fn new(script: FaceScript) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl FaceMatcher for ScriptedFaceMatcher {
    async fn verify(
        &self,
        _student_code: &str,
        _image_base64: &str,
    ) -> Result<FaceVerdict, FaceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script {
            FaceScript::Match(score) => Ok(FaceVerdict {
                matched: true,
                score,
            }),
            FaceScript::Mismatch(score) => Ok(FaceVerdict {
                matched: false,
                score,
            }),
            FaceScript::Down => Err(FaceError::Api {
                status: 502,
                body: "bad gateway".into(),
            }),
            FaceScript::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok(FaceVerdict {
                    matched: true,
                    score: 0.95,
                })
            }
        }
    }

    async fn register(&self, _student_code: &str, _image_base64: &str) -> Result<(), FaceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script {
            FaceScript::Down => Err(FaceError::Api {
                status: 503,
                body: "unavailable".into(),
            }),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            issuer: None,
            minted_ttl_mins: 15,
        },
        attendance: AttendanceConfig::default(),
    }
}

/// Build the full application router with a face matcher that always matches.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, Arc::new(ScriptedFaceMatcher::new(FaceScript::Match(0.95))))
}

/// Build the full application router around the given face matcher.
///
/// Uses the same middleware stack as production via `build_app_router`.
pub fn build_test_app_with(pool: PgPool, face_matcher: Arc<ScriptedFaceMatcher>) -> Router {
    build_test_app_with_config(pool, test_config(), face_matcher)
}

/// Like [`build_test_app_with`], with a caller-tuned config.
pub fn build_test_app_with_config(
    pool: PgPool,
    config: ServerConfig,
    face_matcher: Arc<ScriptedFaceMatcher>,
) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        face_matcher,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Identity and fixtures
// ---------------------------------------------------------------------------

pub fn token(user_id: i64, role: Role) -> String {
    mint_token(user_id, role, &test_config().jwt).expect("token should encode")
}

pub fn admin_token() -> String {
    token(ADMIN_USER_ID, Role::Admin)
}

pub fn student_token(user_id: i64) -> String {
    token(user_id, Role::Student)
}

/// Insert a student profile owned by `user_id`.
pub async fn seed_student(pool: &PgPool, user_id: i64, class_id: Option<i64>) -> StudentProfile {
    StudentRepo::create(
        pool,
        &CreateStudent {
            user_id,
            student_code: format!("HV{user_id:04}"),
            full_name: format!("Học viên {user_id}"),
            phone: None,
            avatar_url: None,
            training_class_id: class_id,
        },
    )
    .await
    .expect("student insert should succeed")
}

/// A calendar date `days` away from today (UTC).
pub fn date_from_today(days: i64) -> NaiveDate {
    (Utc::now() + Duration::days(days)).date_naive()
}

pub fn hhmm(h: u32, m: u32) -> String {
    NaiveTime::from_hms_opt(h, m, 0)
        .expect("valid time")
        .format("%H:%M")
        .to_string()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    app.oneshot(
        Request::get(uri)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send_json_auth(app, "POST", uri, body, token).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send_json_auth(app, "PUT", uri, body, token).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    app.oneshot(
        Request::delete(uri)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn send_json_auth(
    app: Router,
    method: &str,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {token}"))
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status and the stable error code of an error response.
pub async fn assert_error(response: Response<Body>, status: StatusCode, code: &str) -> serde_json::Value {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert_eq!(json["code"], code, "unexpected error body: {json}");
    json
}

/// Create a session through the admin API and return its id.
pub async fn create_session(
    pool: &PgPool,
    date: NaiveDate,
    start: (u32, u32),
    end: (u32, u32),
    class_id: Option<i64>,
) -> i64 {
    let app = build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/admin/sessions",
        serde_json::json!({
            "date": date,
            "name": format!("Ca {}:{:02}", start.0, start.1),
            "start_time": hhmm(start.0, start.1),
            "end_time": hhmm(end.0, end.1),
            "training_class_id": class_id,
        }),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
