use std::{
    io,
    sync::{Arc, OnceLock},
    time,
};

use application::{api, seed_fleet, Args, Config, Service};
use axum::{body::Body, extract::MatchedPath};
use axum_client_ip::InsecureClientIp;
use service::infra::Memory;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

/// Levels written to `stderr` rather than `stdout`.
const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

/// Level configured by the loaded [`Config`].
static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stdout)
                .with_filter(filter_fn(|meta| is_enabled(meta, false))),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stderr)
                .with_filter(filter_fn(|meta| is_enabled(meta, true))),
        )
        .init();

    _ = start().await;
}

/// Decides whether the event described by `meta` goes to the `stderr` or
/// `stdout` layer.
fn is_enabled(meta: &log::Metadata<'_>, stderr: bool) -> bool {
    if meta.is_span() {
        return true;
    }
    let max = LOG_LEVEL.get().copied().unwrap_or(log::Level::INFO);
    STDERR_LEVELS.contains(meta.level()) == stderr && max >= *meta.level()
}

async fn start() -> Result<(), ()> {
    let Args { config } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let Config {
        server,
        pricing,
        fleet,
        log,
    } = Config::new(&config).map_err(|e| {
        log::error!("failed to load `Config` from `{config}`: {e}");
    })?;

    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let service_config = pricing.try_into().map_err(|e| {
        log::error!("failed to load pricing `Config`: {e}");
    })?;

    let database = Memory::new();
    let cars = seed_fleet(&database, fleet).await.map_err(|e| {
        log::error!("failed to seed the fleet: {e}");
    })?;
    log::info!("fleet of {cars} cars is loaded");

    let app = application::router(
        Service::new(service_config, database),
        Arc::new(api::schema()),
        &server.cors,
    )
    .map_err(|e| log::error!("invalid CORS `Config`: {e}"))?
    .layer(
        TraceLayer::new_for_http()
            .make_span_with(request_span)
            .on_response(
                |r: &http::Response<_>,
                 dur: time::Duration,
                 span: &log::Span| {
                    span.record(
                        "http.status_code",
                        log::field::display(r.status().as_u16()),
                    );

                    let duration = format!("{}ms", dur.as_millis());
                    if r.status().is_client_error()
                        || r.status().is_server_error()
                    {
                        log::error!(duration = %duration);
                    } else {
                        log::info!(duration = %duration);
                    }
                },
            ),
    );

    let addr = format!("{}:{}", server.host, server.port);
    let listener = TcpListener::bind(addr.as_str()).await.map_err(|e| {
        log::error!("failed to listen on `{addr}`: {e}");
    })?;
    log::info!("listening on `{addr}`");

    axum::serve(listener, app)
        .await
        .map_err(|e| log::error!("webserver failed: {e}"))
}

/// Creates the [`log::Span`] of the provided HTTP request.
fn request_span(r: &http::Request<Body>) -> log::Span {
    let client_ip = InsecureClientIp::from(r.headers(), r.extensions())
        .map(|ip| ip.0.to_string())
        .ok();
    let route = r.extensions().get::<MatchedPath>().map(MatchedPath::as_str);
    let user_agent = r
        .headers()
        .get(http::header::USER_AGENT)
        .and_then(|h| h.to_str().ok());

    log::info_span!(
        "HTTP request",
        http.client_ip = client_ip,
        http.flavor = ?r.version(),
        http.host = r.uri().host(),
        http.method = r.method().as_str(),
        http.route = route,
        http.scheme = r.uri().scheme().map(http::uri::Scheme::as_str),
        http.target = r
            .uri()
            .path_and_query()
            .map(http::uri::PathAndQuery::as_str),
        http.user_agent = user_agent,
        http.status_code = log::field::Empty,
    )
}
