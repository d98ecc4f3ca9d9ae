use std::sync::Arc;

use hlmc_wizard::app::load_questionnaire;
use hlmc_wizard::channels::CliChannel;
use hlmc_wizard::config::WizardConfig;
use hlmc_wizard::routes::wizard_routes;
use hlmc_wizard::sessions::{self, SessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = WizardConfig::from_env();

    // ── Artifacts ───────────────────────────────────────────────────────
    let questionnaire = match load_questionnaire(&config.artifacts) {
        Ok(q) => Arc::new(q),
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!(
                "  Expected {} and {} in {}",
                config.artifacts.model_file,
                config.artifacts.features_file,
                config.artifacts.dir.display()
            );
            std::process::exit(1);
        }
    };

    eprintln!("🧬 Willingness to HLMC v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Artifacts: {}", config.artifacts.dir.display());
    eprintln!("   Questions: {}", questionnaire.len());
    eprintln!("   API: http://0.0.0.0:{}/api/sessions", config.port);

    // ── Sessions + HTTP ─────────────────────────────────────────────────
    let store = SessionStore::new(Arc::clone(&questionnaire), config.session_idle_timeout);
    let _expiry_handle = sessions::spawn_expiry_task(Arc::clone(&store), config.sweep_interval);

    let app = wizard_routes(Arc::clone(&store));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "Questionnaire API started");
    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "HTTP server stopped");
        }
    });

    // ── Terminal ────────────────────────────────────────────────────────
    if config.cli_enabled {
        eprintln!("   Terminal: enabled (type 'help' for commands)\n");
        let cli = CliChannel::new(Arc::clone(&questionnaire));
        let outcome = cli.run().await?;
        if let Some(p) = outcome.last_probability {
            tracing::info!(probability = p, "Terminal session finished");
        }
        if outcome.quit {
            server.abort();
        } else {
            tracing::info!("Terminal input closed, API keeps serving");
            server.await?;
        }
    } else {
        eprintln!("   Terminal: disabled\n");
        server.await?;
    }

    Ok(())
}
