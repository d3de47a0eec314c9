use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stockroom::infrastructure::AppState;
use stockroom::services::ledger_service::BorrowAtomicity;
use stockroom::{api, config, db, seed, server};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockroom=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    // Check for --profile CLI argument
    let args: Vec<String> = std::env::args().collect();
    if let Some(pos) = args.iter().position(|arg| arg == "--profile") {
        if let Some(val) = args.get(pos + 1) {
            unsafe {
                std::env::set_var("PROFILE", val);
            }
        }
    }

    let config = config::Config::from_env();

    // Initialize database
    let db = db::init_db(&config.database_url)
        .await
        .expect("Failed to initialize database");

    // Check for seed flag
    if std::env::var("SEED_DEMO").is_ok() {
        tracing::info!("Seeding demo data...");
        if let Err(e) = seed::seed_demo_data(&db).await {
            tracing::error!("Failed to seed data: {}", e);
        } else {
            tracing::info!("Demo data seeded successfully.");
        }
    }

    let atomicity = if config.legacy_per_line_borrow {
        tracing::warn!(
            "Legacy per-line borrow commits enabled; a batch failure leaves earlier lines applied"
        );
        BorrowAtomicity::PerLine
    } else {
        BorrowAtomicity::AllOrNothing
    };

    // Build API router
    let state = AppState::with_atomicity(db, atomicity);
    let api_router = api::api_router(state);

    // Swagger UI
    use stockroom::api_docs::ApiDoc;
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    let mut cors_allowed_origins = Vec::new();
    for origin in &config.cors_allowed_origins {
        match origin.parse::<axum::http::HeaderValue>() {
            Ok(v) => cors_allowed_origins.push(v),
            Err(e) => tracing::error!("Failed to parse CORS origin '{}': {}", origin, e),
        }
    }

    let app = Router::new()
        .merge(SwaggerUi::new("/api/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_router)
        .nest_service("/", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        // CORS
        .layer(
            CorsLayer::new()
                .allow_origin(cors_allowed_origins)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Find available port
    let port = server::find_available_port(config.port).expect("Failed to find available port");

    if port != config.port {
        tracing::warn!(
            "Preferred port {} was not available, using port {} instead",
            config.port,
            port
        );
    }

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Stockroom server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
