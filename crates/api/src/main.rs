use std::net::SocketAddr;
use std::sync::Arc;

use classroll_face::HttpFaceMatcher;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use classroll_api::config::ServerConfig;
use classroll_api::router::build_app_router;
use classroll_api::state::AppState;

const DEFAULT_LOG_FILTER: &str = "classroll_api=debug,classroll_db=info,tower_http=info";

/// `RUST_LOG` picks the filter; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    let attendance = &config.attendance;
    tracing::info!(
        addr = %format!("{}:{}", config.host, config.port),
        utc_offset_minutes = attendance.clock.offset_minutes(),
        geofence_radius_m = attendance.geofence_radius_m,
        cap_scope = ?attendance.cap_scope,
        face_service = %attendance.face_service_url,
        face_timeout_secs = attendance.face_timeout_secs,
        "Attendance service configured"
    );

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = classroll_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    classroll_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    classroll_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready, migrations applied");

    // The oracle is not probed at startup: check-ins fail with
    // ORACLE_UNAVAILABLE while it is down, the rest of the API keeps working.
    let face_matcher =
        HttpFaceMatcher::new(attendance.face_service_url.as_str(), attendance.face_timeout())
            .expect("Failed to build face-match HTTP client");

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        face_matcher: Arc::new(face_matcher),
    };
    let app = build_app_router(state, &config);

    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be an IP address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Shut down cleanly");
}

/// Resolves on SIGINT, or on SIGTERM where available.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        () = ctrl_c => "SIGINT",
        () = terminate => "SIGTERM",
    };
    tracing::info!(signal, "Draining in-flight requests");
}
