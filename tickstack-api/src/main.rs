//! # TickStack API Server
//!
//! JSON backend for the TickStack to-do application: account management
//! (registration, login with lockout, email confirmation, password reset,
//! profiles) and to-do lists/items with sharing and FREE/PRO tiers.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p tickstack-api
//! ```

use std::sync::Arc;

use tickstack_api::{
    app::{build_router, AppState},
    config::{Config, EmailDriver},
};
use tickstack_shared::{
    db::{migrations, pool},
    email::{EmailSender, SmtpEmailSender, TracingEmailSender},
    models::role::Role,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tickstack_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TickStack API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&db).await?;

    // Idempotent: FREE/PRO exist before the first registration can ask
    // for them.
    Role::seed_defaults(&db).await?;

    let email: Arc<dyn EmailSender> = match config.email.driver {
        EmailDriver::Smtp => Arc::new(SmtpEmailSender::new(
            &config.email.smtp_host,
            config.email.smtp_port,
            &config.email.smtp_username,
            &config.email.smtp_password,
            config.email.from_address.clone(),
            config.email.smtp_insecure,
        )?),
        EmailDriver::Log => Arc::new(TracingEmailSender),
    };

    let bind_address = config.bind_address();
    let state = AppState::new(db.clone(), config, email);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool::close_pool(db).await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install ctrl-c handler");
    tracing::info!("Shutdown signal received");
}
