use std::env;
use std::sync::Arc;

use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vitrine_client::{
    CmsClient, Config, FileStorage, KeyValueStorage, LocalProgressStore, NavDecision, RouteGuard,
    SessionStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitrine_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    info!("Starting Vitrine catalog client v{}", env!("CARGO_PKG_VERSION"));
    info!("Content service: {}", config.api_url);

    // Wire the stores over the per-user data directory
    let storage: Arc<dyn KeyValueStorage> = Arc::new(FileStorage::open_default());
    let session = SessionStore::open(storage.clone());
    let progress = LocalProgressStore::new(storage);
    progress.subscribe(|id| debug!("Progress saved for item {}", id));

    let client = CmsClient::new(&config, session.clone())?;

    // Optional credential login for the user-scoped rails
    if let (Ok(identifier), Ok(password)) =
        (env::var("VITRINE_IDENTIFIER"), env::var("VITRINE_PASSWORD"))
    {
        let login = client.login(&identifier, &password).await?;
        session.set_token(&login.jwt);
        info!("Authenticated as {}", login.user.username);
    }

    let featured = client.fetch_featured_titles().await?;
    info!("Featured titles: {}", featured.len());

    let titles = progress.apply_to(&client.fetch_titles().await?);
    info!("Catalog titles: {}", titles.len());
    for title in &titles {
        info!(
            "  [{}] {}{}",
            title.kind,
            title.name,
            title.year.map(|year| format!(" ({})", year)).unwrap_or_default()
        );
    }

    let guard = RouteGuard::new(session.clone());
    match guard.check("/continue") {
        NavDecision::Allow => {
            let entries = client.fetch_continue_watching(12).await?;
            info!("Continue watching: {}", entries.len());
            for entry in &entries {
                info!("  {} ({}%)", entry.title_name, entry.progress_percent);
            }

            let favorites = client.fetch_favorites().await?;
            info!("Favorites: {}", favorites.len());
        }
        NavDecision::Redirect { to } => {
            warn!("Skipping user rails, login required (redirect would go to {})", to);
        }
    }

    Ok(())
}
