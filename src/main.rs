use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use timetable_backend::api::router;
use timetable_backend::config::AppConfig;
use timetable_backend::db;
use timetable_backend::generator::{HttpGenerator, NoopGenerator, TimetableGenerator};
use timetable_backend::services::{GenerationScheduler, TimetableStore};
use timetable_backend::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "timetable_backend=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;

    let pool = db::connect(&config.database_url, config.max_connections).await?;
    let store = TimetableStore::new(pool);

    let generator: Arc<dyn TimetableGenerator> = match config.generator.clone() {
        Some(generator_config) => {
            info!("Using timetable generator at {}", generator_config.url);
            Arc::new(HttpGenerator::new(generator_config)?)
        }
        None => {
            info!("GENERATOR_URL not set, generation will add nothing");
            Arc::new(NoopGenerator)
        }
    };

    let state = AppState::new(store, generator);

    if let Some(interval) = config.auto_generate_interval_secs {
        let scheduler = GenerationScheduler::new(state.generation(), interval);
        tokio::spawn(scheduler.start());
    }

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
