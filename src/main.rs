use clap::Parser;
use lead_crm::utils::{logger, validation::Validate};
use lead_crm::{build_router, build_service, CliArgs, CrmConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 載入配置：有檔案用檔案，否則只讀環境變數
    let mut config = match &args.config {
        Some(path) => match CrmConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        },
        None => CrmConfig::from_env(),
    };
    args.apply_overrides(&mut config);

    logger::init_logger(
        config.logging.format,
        args.verbose,
        config.logging.level.as_deref(),
    );

    tracing::info!("🚀 Starting lead-crm");
    if args.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let service = build_service(&config)?;
    service.initialize()?;

    if args.init_db {
        tracing::info!("✅ Database initialized at {}", config.database.path);
        return Ok(());
    }

    tracing::info!("📊 SQLite: {}", config.database.path);
    tracing::info!(
        "📄 Google Sheets mirror: {}",
        if config.sheets.enabled { "enabled" } else { "disabled" }
    );
    tracing::info!(
        "📱 WhatsApp notifications: {}",
        if config.whatsapp.enabled { "enabled" } else { "disabled" }
    );

    let app = build_router(Arc::new(service));

    let listener = tokio::net::TcpListener::bind(&config.server.listen).await?;
    tracing::info!("🌐 Listening on http://{}", config.server.listen);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
