use axum::{
    BoxError, Router, serve,
    error_handling::HandleErrorLayer,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Json, Response},
    routing::{get, post}
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePoolOptions;
use std::{
    fs,
    io,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::Duration
};
use tokio::net::TcpListener;
use tower::{
    ServiceBuilder,
    buffer::BufferLayer,
    limit::RateLimitLayer
};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer
};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt
};

mod app;
mod auth_provider;
mod config;
mod core;
mod db;
mod errors;
mod extractors;
mod handlers;
mod http_auth;
mod jwt;
mod maker;
#[cfg(test)]
mod memory;
mod middleware;
mod model;
mod ownership;
mod payload;
mod prod_core;
mod sealed;
mod sqlite;

use crate::{
    app::AppState,
    config::{Config, ConfigError},
    core::CoreArc,
    errors::AppError,
    http_auth::HttpAuthProvider,
    maker::{KeyError, TokenError, new_maker},
    middleware::require_auth,
    prod_core::ProdCore,
    sqlite::SqlxDatabaseClient
};

impl From<&AppError> for StatusCode {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::MissingAuthorization => StatusCode::UNAUTHORIZED,
            AppError::InvalidAuthorizationFormat => StatusCode::UNAUTHORIZED,
            AppError::UnsupportedAuthorizationType => StatusCode::UNAUTHORIZED,
            AppError::TokenError(TokenError::InvalidToken) => StatusCode::UNAUTHORIZED,
            AppError::TokenError(TokenError::TokenExpired) => StatusCode::UNAUTHORIZED,
            AppError::TokenError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotOwner { .. } => StatusCode::UNAUTHORIZED,
            AppError::AccountNotFound(_) => StatusCode::NOT_FOUND,
            AppError::CurrencyMismatch { .. } => StatusCode::BAD_REQUEST,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RequestError(..) => StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[derive(Debug, Deserialize, PartialEq, Serialize)]
struct HttpError {
    error: String
}

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        HttpError { error: format!("{}", err) }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = StatusCode::from(&self);
        let body = Json(HttpError::from(self));
        (code, body).into_response()
    }
}

fn routes(api: &str, state: AppState) -> Router {
    let protected: Router<AppState> = Router::new()
        .route(
            &format!("{api}/accounts"),
            get(handlers::accounts_get)
            .post(handlers::accounts_post)
        )
        .route(
            &format!("{api}/accounts/{{id}}"),
            get(handlers::accounts_id_get)
        )
        .route(
            &format!("{api}/transfers"),
            post(handlers::transfers_post)
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route(
            &format!("{api}/users/login"),
            post(handlers::login_post)
        )
        .merge(protected)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::very_permissive())
        )
}

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("{0}")]
    AddrParseError(#[from] std::net::AddrParseError),
    #[error("{0}")]
    TomlParseError(#[from] toml::de::Error),
    #[error("{0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("{0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
    #[error("{0}")]
    IOError(#[from] io::Error),
    #[error("{0}")]
    ConfigError(#[from] ConfigError),
    #[error("{0}")]
    KeyError(#[from] KeyError),
    #[error("{0}")]
    ClientError(#[from] reqwest::Error),
    #[error("{0}")]
    LogFilterError(#[from] tracing_subscriber::filter::ParseError)
}

fn init_logging(
    config: &Config
) -> Result<Option<WorkerGuard>, StartupError>
{
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)?
    };

    let (writer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(
                dir,
                "simplebank.log"
            );
            let (nb, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(nb), Some(guard))
        },
        None => (BoxMakeWriter::new(io::stdout), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_ansi(config.log_dir.is_none())
                .with_writer(writer)
        )
        .init();

    std::panic::set_hook(Box::new(tracing_panic::panic_hook));

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config: Config = toml::from_str(&fs::read_to_string("config.toml")?)?;

    // must outlive the server or buffered log lines are lost
    let _guard = init_logging(&config)?;

    let access_token_duration = config.access_token_duration()?;

    let maker = new_maker(
        config.token_backend,
        config.token_symmetric_key.as_bytes()
    )?;

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&format!("sqlite://{}?mode=rwc", &config.db_path))
        .await?;

    sqlx::migrate!("./migrations").run(&db_pool).await?;

    let core = ProdCore {
        db: SqlxDatabaseClient(db_pool),
        auth: HttpAuthProvider::new(&config.auth_url)?,
        maker: maker.clone(),
        access_token_duration,
        now: Utc::now
    };

    let state = AppState {
        core: Arc::new(core) as CoreArc,
        maker
    };

    let app = routes(&config.api_base_path, state)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(|err: BoxError| async move {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Unhandled error: {}", err)
                    )
                }))
                .layer(BufferLayer::new(1024))
                .layer(RateLimitLayer::new(5, Duration::from_secs(1)))
        );

    let ip: IpAddr = config.listen_ip.parse()?;
    let addr = SocketAddr::from((ip, config.listen_port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    serve(listener, app).await?;

    Ok(())
}
