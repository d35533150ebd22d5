use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderName, Request, Response},
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use std::{net::SocketAddr, sync::Arc, time::Duration};

use siopao_storefront::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    media::{CloudinaryClient, FileStorage},
    notify::{LogTransport, Notifier},
    routes::app_router,
    seed,
    state::{AppState, AuthSettings},
};

/// Product images are uploaded through the API.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
const MAX_IN_FLIGHT: usize = 100;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,siopao_storefront=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let state = build_state(&config).await?;

    let request_id_header = HeaderName::from_static("x-request-id");
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id
            )
        })
        .on_response(|response: &Response<_>, latency: Duration, _span: &tracing::Span| {
            tracing::info!(
                status = %response.status(),
                ms = %latency.as_millis(),
                "request finished"
            );
        });

    let app = app_router()
        .layer(trace_layer)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(ConcurrencyLimitLayer::new(MAX_IN_FLIGHT))
        .with_state(state);

    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));
    tracing::info!("listening on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}

/// Migrates and seeds the database, then wires storage and mail.
/// A seeding failure aborts startup.
async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    seed::run(&orm, &config.admin).await?;

    let media_host = CloudinaryClient::new(&config.cloudinary)?;
    let storage = FileStorage::new(Arc::new(media_host), config.cloudinary.folder.clone());
    let (notifier, _mail_worker) = Notifier::spawn(Arc::new(LogTransport));

    Ok(AppState {
        orm,
        storage,
        notifier,
        auth: Arc::new(AuthSettings {
            jwt_secret: config.jwt_secret.clone(),
            public_base_url: config.public_base_url.clone(),
        }),
    })
}
