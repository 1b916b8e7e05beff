/// Application state and router builder
///
/// # Router layout
///
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// └── /api/
///     ├── /account/                  # Account API
///     │   ├── POST /register             (public)
///     │   ├── POST /login                (public)
///     │   ├── POST /confirm-email        (public)
///     │   ├── POST /forgot-password      (public)
///     │   ├── POST /reset-password       (public)
///     │   ├── GET  /users                (bearer token)
///     │   ├── GET  /user-info            (bearer token)
///     │   ├── POST /update-profile       (bearer token)
///     │   └── POST /change-password      (bearer token)
///     ├── /lists/                    # To-do lists (bearer token)
///     │   ├── POST / GET /
///     │   ├── GET / DELETE /:id
///     │   ├── POST / DELETE /:id/share
///     │   └── POST / GET / PUT /:id/items
///     └── /items/                    # To-do items (bearer token)
///         ├── GET / PUT / DELETE /:id
///         └── POST /:id/toggle
/// ```
///
/// The bearer-token layer validates the JWT, resolves identity from the
/// named claims, and stores an `AuthContext` in the request extensions.

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tickstack_shared::auth::{jwt, middleware::AuthContext};
use tickstack_shared::email::EmailSender;
use tickstack_shared::repo::{PgTodoItemRepo, TodoItemRepo};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned per request via Axum's `State` extractor; everything inside is
/// cheaply cloneable.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Outbound email delivery
    pub email: Arc<dyn EmailSender>,

    /// To-do item storage
    pub items: Arc<dyn TodoItemRepo>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, email: Arc<dyn EmailSender>) -> Self {
        let items: Arc<dyn TodoItemRepo> = Arc::new(PgTodoItemRepo::new(db.clone()));

        Self {
            db,
            config: Arc::new(config),
            email,
            items,
        }
    }

    /// Bearer-token configuration
    pub fn token_config(&self) -> &jwt::TokenConfig {
        &self.config.jwt
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Account routes reachable without a token
    let account_public = Router::new()
        .route("/register", post(routes::account::register))
        .route("/login", post(routes::account::login))
        .route("/confirm-email", post(routes::account::confirm_email))
        .route("/forgot-password", post(routes::account::forgot_password))
        .route("/reset-password", post(routes::account::reset_password));

    // Account routes that require a bearer token
    let account_protected = Router::new()
        .route("/users", get(routes::account::users))
        .route("/user-info", get(routes::account::user_info))
        .route("/update-profile", post(routes::account::update_profile))
        .route("/change-password", post(routes::account::change_password))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // To-do list routes (all require a bearer token)
    let list_routes = Router::new()
        .route("/", post(routes::lists::create_list).get(routes::lists::list_lists))
        .route(
            "/:id",
            get(routes::lists::get_list).delete(routes::lists::delete_list),
        )
        .route(
            "/:id/share",
            post(routes::lists::share_list).delete(routes::lists::unshare_list),
        )
        .route(
            "/:id/items",
            post(routes::items::create_item)
                .get(routes::items::list_items)
                .put(routes::items::update_list_items),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // To-do item routes (all require a bearer token)
    let item_routes = Router::new()
        .route(
            "/:id",
            get(routes::items::get_item)
                .put(routes::items::update_item)
                .delete(routes::items::delete_item),
        )
        .route("/:id/toggle", post(routes::items::toggle_item))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let api_routes = Router::new()
        .nest("/account", account_public.merge(account_protected))
        .nest("/lists", list_routes)
        .nest("/items", item_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Bearer-token authentication middleware layer
///
/// Validates the JWT from the Authorization header and injects an
/// `AuthContext` (built from the named `uid`/`sub` claims) into the
/// request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        crate::error::ApiError::BadRequest("Expected Bearer token".to_string())
    })?;

    let claims = jwt::validate_token(token, state.token_config())?;

    let auth_context = AuthContext::from_claims(&claims);
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
