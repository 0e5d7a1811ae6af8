use std::{
    env::{self},
    fs::OpenOptions,
    net::SocketAddr,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use depensier_rs::{AppState, EmailConfig, PaginationConfig, build_router, graceful_shutdown};

/// The REST API server for depensier_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical timezone name to interpret "today" with, e.g.
    /// "Pacific/Auckland".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// The external URL of the server, used in password reset links.
    /// Defaults to http://localhost:{port}.
    #[arg(long)]
    server_url: Option<String>,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let secret = env::var("SECRET").expect("The environment variable 'SECRET' must be set");

    let email_config = EmailConfig::from_env();
    if email_config.is_none() {
        tracing::warn!(
            "SMTP settings are not configured, password reset emails will not be sent."
        );
    }

    let server_url = args
        .server_url
        .unwrap_or_else(|| format!("http://localhost:{}", args.port));

    let conn = Connection::open(&args.db_path).unwrap();
    let app_config = AppState::new(
        conn,
        &secret,
        &args.timezone,
        &server_url,
        email_config,
        PaginationConfig::default(),
    )
    .expect("Could not initialize the database");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(app_config));

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .unwrap();
}

/// Log to stdout at the level set by `RUST_LOG` (or INFO when unset), and to
/// `debug.log` at DEBUG.
fn setup_logging() {
    let stdout_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(stdout_filter);

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(Arc::new(log_file))
        .with_filter(filter::LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let make_span = |request: &Request| {
        let matched_path = request
            .extensions()
            .get::<MatchedPath>()
            .map(MatchedPath::as_str);

        tracing::debug_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            matched_path
        )
    };

    // TraceLayer logs 5xx responses on its own, which would duplicate the
    // handlers' error logging.
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(make_span)
        .on_failure(());

    router.layer(tracing_layer)
}
