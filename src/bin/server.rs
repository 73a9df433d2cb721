use std::{
    env,
    fs::OpenOptions,
    net::SocketAddr,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::{Handle, tls_rustls::RustlsConfig};
use clap::Parser;
use rusqlite::Connection;
use time::Duration;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use tally_rs::{
    AppState, build_router,
    config::{AuthConfig, CorruptionPolicy, StoreBackend},
    graceful_shutdown,
    stores::{TransactionStore, UserStore, open_json_stores, open_sqlite_stores},
};

/// One year.
const MAX_TOKEN_HOURS: i64 = 24 * 366;

/// The REST API server for tally_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Where users and transactions are kept.
    #[arg(long, value_enum, default_value_t = StoreBackend::Sqlite)]
    store: StoreBackend,

    /// File path to the application SQLite database.
    #[arg(long, default_value = "tally.db")]
    db_path: PathBuf,

    /// Directory holding the JSON store files.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// What the JSON store does with a file it cannot parse.
    #[arg(long, value_enum, default_value_t = CorruptionPolicy::Fail)]
    on_corruption: CorruptionPolicy,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 1163)]
    port: u16,

    /// Directory with an SSL certificate `cert.pem` and key `key.pem`.
    /// Serves plain HTTP when omitted.
    #[arg(long)]
    cert_path: Option<PathBuf>,

    /// How many hours a session token stays valid.
    #[arg(long, default_value_t = 24, value_parser = clap::value_parser!(i64).range(1..=MAX_TOKEN_HOURS))]
    token_hours: i64,

    /// File the debug log is appended to.
    #[arg(long, default_value = "debug.log")]
    log_path: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(error) = setup_logging(&args.log_path) {
        eprintln!("Could not open log file {}: {error}", args.log_path.display());
        return ExitCode::FAILURE;
    }

    let Ok(secret) = env::var("JWT_SECRET") else {
        tracing::error!("The environment variable 'JWT_SECRET' must be set");
        return ExitCode::FAILURE;
    };

    let auth_config =
        AuthConfig::new(&secret).with_token_duration(Duration::hours(args.token_hours));

    let result = match args.store {
        StoreBackend::Sqlite => {
            let stores = Connection::open(&args.db_path)
                .map_err(tally_rs::Error::from)
                .and_then(open_sqlite_stores);
            match stores {
                Ok((users, transactions)) => {
                    serve(&args, AppState::new(auth_config, users, transactions)).await
                }
                Err(error) => Err(format!(
                    "Could not open database {}: {error}",
                    args.db_path.display()
                )),
            }
        }
        StoreBackend::Json => match open_json_stores(&args.data_dir, args.on_corruption) {
            Ok((users, transactions)) => {
                serve(&args, AppState::new(auth_config, users, transactions)).await
            }
            Err(error) => Err(format!(
                "Could not open data directory {}: {error}",
                args.data_dir.display()
            )),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            tracing::error!("{message}");
            ExitCode::FAILURE
        }
    }
}

async fn serve<U, T>(args: &Args, state: AppState<U, T>) -> Result<(), String>
where
    U: UserStore + Clone + Send + Sync + 'static,
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    state
        .auth
        .prepare()
        .map_err(|error| format!("Could not prepare password checks: {error}"))?;

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state));

    match &args.cert_path {
        Some(cert_path) => {
            let tls_config = RustlsConfig::from_pem_file(
                cert_path.join("cert.pem"),
                cert_path.join("key.pem"),
            )
            .await
            .map_err(|error| format!("Could not open TLS certificates: {error}"))?;

            tracing::info!("HTTPS server listening on {}", addr);
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(router.into_make_service())
                .await
        }
        None => {
            tracing::info!("HTTP server listening on {}", addr);
            axum_server::bind(addr)
                .handle(handle)
                .serve(router.into_make_service())
                .await
        }
    }
    .map_err(|error| format!("Server error: {error}"))
}

fn setup_logging(log_path: &Path) -> std::io::Result<()> {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();

    Ok(())
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they are converted into responses.
        .on_failure(());

    router.layer(tracing_layer)
}
