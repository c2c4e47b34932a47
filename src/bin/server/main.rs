use actix_web::http::header;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use env_logger::Env;
use reviewqeem::app_config::{AppConfig, StoreConfig};
use reviewqeem::db::{connect, init_schema};
use reviewqeem::middleware::{AdminGate, TokenGate};
use reviewqeem::store::{CommentStore, DatabaseStore, MemoryStore};
use std::sync::Arc;
use std::time::Duration;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_lib_mods();

    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize rate limits from configuration
    reviewqeem::rate_limit::init_rate_limits(&config.rate_limit);

    let store = open_store(&config.store).await;
    let policy = config.moderation.policy();

    let gate: Arc<dyn AdminGate> = Arc::new(TokenGate::new(&config.admin.api_token));

    // Spawn rate limiter cleanup task
    actix_web::rt::spawn(async {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(300)); // Every 5 minutes
        loop {
            interval.tick().await;
            reviewqeem::rate_limit::cleanup_old_entries_public();
            log::debug!("Rate limiter cleanup completed");
        }
    });

    log::info!("Listening on {}", config.server.bind_address);

    HttpServer::new(move || {
        // Order of middleware IS IMPORTANT and is in REVERSE EXECUTION ORDER.
        App::new()
            .app_data(Data::new(store.clone()))
            .app_data(Data::new(policy.clone()))
            .app_data(Data::new(gate.clone()))
            // Security headers - applied to all responses
            .wrap(
                DefaultHeaders::new()
                    .add((header::X_FRAME_OPTIONS, "DENY"))
                    .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
                    .add(("Referrer-Policy", "strict-origin-when-cross-origin")),
            )
            .wrap(Logger::new("%a \"%r\" %s %T"))
            .configure(reviewqeem::web::configure)
    })
    .bind(config.server.bind_address.as_str())?
    .run()
    .await
}

/// Initialize third party crates we rely on but don't have control over.
fn init_lib_mods() {
    // A missing .env is fine; everything can come from the environment.
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}

async fn open_store(config: &StoreConfig) -> Arc<dyn CommentStore> {
    match config.backend.as_str() {
        "database" => {
            let db = connect(&config.database_url)
                .await
                .expect("Failed to connect to the comment database.");
            init_schema(&db)
                .await
                .expect("Failed to create the comment schema.");
            log::info!("Using database comment store");
            Arc::new(DatabaseStore::new(db))
        }
        "memory" => {
            log::warn!("Using in-memory comment store. Comments are lost on restart.");
            Arc::new(MemoryStore::new())
        }
        other => panic!("Unknown store backend {:?}; expected \"memory\" or \"database\".", other),
    }
}
