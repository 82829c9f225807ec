use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use appointy_server::config::{generate_config_template, Config};
use appointy_server::{db, routes, state};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load config with layered precedence: defaults < TOML < env < CLI
    let config = Config::load()?;

    // Handle --generate-config: print template and exit
    if config.generate_config {
        print!("{}", generate_config_template());
        return Ok(());
    }

    // Initialize tracing/logging
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("appointy_server=info"))
    };
    if config.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter()).init();
    } else {
        tracing_subscriber::fmt().pretty().with_env_filter(filter()).init();
    }

    tracing::info!("Appointy server v{} starting", env!("CARGO_PKG_VERSION"));

    // Open the document database; failure here is fatal
    let db = db::init_db(
        &config.data_dir,
        &config.database_file,
        config.cursor_batch_size,
    )?;

    let app_state = state::AppState {
        db,
        posts_page_size: config.posts_page_size,
    };

    let app = routes::build_router(app_state);

    // Bind and serve
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
