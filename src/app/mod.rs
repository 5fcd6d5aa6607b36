pub mod router;
pub mod server;
pub mod state;
pub mod tracing;

use crate::config;
use crate::error::FrontendError;

/// Application entry point. Initializes tracing, configuration, and starts the server.
pub async fn run() -> Result<(), FrontendError> {
    // Variables already set in the environment take precedence over .env
    let dotenv = dotenvy::dotenv();

    // Handle healthcheck subcommand (for Docker healthcheck in distroless image)
    if std::env::args().nth(1).as_deref() == Some("healthcheck") {
        let result = match config::http_port() {
            Ok(port) => crate::healthcheck_with_port(port)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        match result {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("Healthcheck failed: {e}");
                std::process::exit(1)
            }
        }
    }

    tracing::init_tracing();
    if let Ok(path) = dotenv {
        ::tracing::info!(path = %path.display(), "Loaded .env file");
    }

    let settings = config::get_configuration()?;
    ::tracing::info!(
        classifier_id = %settings.classifier.classifier_id,
        upload_dir = %settings.upload.dir.display(),
        max_rows = settings.upload.max_rows,
        "Loaded settings"
    );

    tokio::fs::create_dir_all(&settings.upload.dir)
        .await
        .map_err(|e| {
            FrontendError::Config(format!(
                "Failed to create upload directory {}: {e}",
                settings.upload.dir.display()
            ))
        })?;

    let app_state = state::AppState::from_settings(&settings)?;
    let app = router::router(app_state);

    server::serve(app, settings.http_port).await
}
