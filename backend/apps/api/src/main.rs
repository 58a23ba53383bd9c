//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use anyhow::{Context, bail};
use axum::{
    Router, http,
    http::{Method, header},
    routing::get,
};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use users::{
    PgUsersRepository, RouteGuards, UsersConfig,
    domain::{IdentityProvider, MailTransport, SessionRepository},
    infra::{GoogleIdentityProvider, HttpMailTransport, LogMailTransport, OAuthSettings},
    users_router,
};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,users=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url =
        env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Startup cleanup: remove expired sessions
    // Errors here should not prevent server startup
    let repo = PgUsersRepository::new(pool.clone());
    match repo.cleanup_expired().await {
        Ok(sessions) => {
            tracing::info!(sessions_deleted = sessions, "Session cleanup completed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Session cleanup failed, continuing anyway");
        }
    }

    let config = users_config()?;
    let mailer = mail_transport()?;
    let identity = identity_provider()?;
    if identity.is_none() {
        tracing::info!("OAUTH_CLIENT_ID not set, provider sign-in disabled");
    }

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/users", users_router(repo, config, mailer, identity))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:31113".to_string())
        .parse()
        .context("BIND_ADDR must be a socket address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Session, cookie and guard settings from the environment
fn users_config() -> anyhow::Result<UsersConfig> {
    let mut config = if cfg!(debug_assertions) {
        UsersConfig::development()
    } else {
        UsersConfig::default()
    };

    match env::var("SESSION_SECRET") {
        Ok(secret_b64) => {
            let bytes = platform::crypto::from_base64(&secret_b64)
                .context("SESSION_SECRET must be base64")?;
            config.session_secret = bytes
                .try_into()
                .map_err(|_| anyhow::anyhow!("SESSION_SECRET must decode to 32 bytes"))?;
        }
        Err(_) if cfg!(debug_assertions) => {
            tracing::warn!("SESSION_SECRET not set, using a random secret");
        }
        Err(_) => bail!("SESSION_SECRET must be set in production"),
    }

    if let Ok(pepper) = env::var("PASSWORD_PEPPER") {
        config.password_pepper = Some(pepper.into_bytes());
    }
    if let Ok(from) = env::var("MAIL_FROM") {
        config.mail_from = from;
    }

    config.guards = RouteGuards {
        send_message: flag("GUARD_MESSAGES"),
        delete_account: flag("GUARD_DELETE"),
        update_account: flag("GUARD_UPDATE"),
    };

    Ok(config)
}

fn flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// HTTP mail API when configured, otherwise mail is only logged
fn mail_transport() -> anyhow::Result<Arc<dyn MailTransport>> {
    match (env::var("MAIL_API_URL"), env::var("MAIL_API_KEY")) {
        (Ok(url), Ok(key)) => Ok(Arc::new(HttpMailTransport::new(url, key)?)),
        _ => {
            tracing::warn!("MAIL_API_URL or MAIL_API_KEY not set, mail will only be logged");
            Ok(Arc::new(LogMailTransport))
        }
    }
}

fn identity_provider() -> anyhow::Result<Option<Arc<dyn IdentityProvider>>> {
    let (Ok(client_id), Ok(client_secret), Ok(redirect_url)) = (
        env::var("OAUTH_CLIENT_ID"),
        env::var("OAUTH_CLIENT_SECRET"),
        env::var("OAUTH_REDIRECT_URL"),
    ) else {
        return Ok(None);
    };

    let settings = OAuthSettings::google(client_id, client_secret, redirect_url);
    Ok(Some(Arc::new(GoogleIdentityProvider::new(settings)?)))
}
