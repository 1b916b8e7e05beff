/// Common test utilities for integration tests
///
/// Shared infrastructure for the end-to-end tests:
/// - Database setup with migrations and seeded roles
/// - A test user holding the FREE role, with a known password
/// - Bearer-token generation
/// - Request helpers
///
/// Requires `DATABASE_URL` and `JWT_SECRET` in the environment; the
/// tests that use this module are `#[ignore]`d by default.

use axum::body::Body;
use axum::http::{Request, Response};
use sqlx::PgPool;
use std::sync::Arc;
use tickstack_api::app::{build_router, AppState};
use tickstack_api::config::Config;
use tickstack_shared::auth::jwt::{create_token, Claims};
use tickstack_shared::auth::password::hash_password;
use tickstack_shared::email::TracingEmailSender;
use tickstack_shared::models::role::{Role, FREE_ROLE};
use tickstack_shared::models::user::{CreateUser, User};
use tower::ServiceExt;
use uuid::Uuid;

/// Password the test user is created with
pub const TEST_PASSWORD: &str = "Test1pass!";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a new test context with a fresh test user
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Path relative to the crate's Cargo.toml
        sqlx::migrate!("../migrations").run(&db).await?;

        Role::seed_defaults(&db).await?;

        let user = User::create(
            &db,
            CreateUser {
                email: format!("test-{}@example.com", Uuid::new_v4()),
                password_hash: hash_password(TEST_PASSWORD)?,
            },
        )
        .await?;

        Role::add_user(&db, user.id, FREE_ROLE).await?;

        let claims = Claims::new(&user.email, user.id, &config.jwt);
        let jwt_token = create_token(&claims, &config.jwt)?;

        let state = AppState::new(db.clone(), config.clone(), Arc::new(TracingEmailSender));
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            jwt_token,
        })
    }

    /// Returns the authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Sends a JSON POST without authentication
    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Sends a JSON request with the test user's bearer token
    pub async fn request_authed(
        &self,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", self.auth_header())
            .header("content-type", "application/json");

        let request = match body {
            Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Removes the test user (cascades to lists, sharings, codes)
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        User::delete(&self.db, self.user.id).await?;
        Ok(())
    }
}

/// Reads a response body as JSON
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
