use anyhow::Result;
use clap::Parser;
use shoal::{
    create_router, AppState, BuildCoordinator, DocumentStore, EngineMetrics, EnvConfig,
    IndexBuilder, InvertedIndex, QueryService, Tokenizer, TokenizerConfig,
};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shoald")]
#[command(about = "Shoal full-text search server", long_about = None)]
struct Args {
    /// Bind host
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Bind port
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Dataset directory to index
    #[arg(long)]
    dataset: Option<String>,

    /// Default build thread count
    #[arg(long)]
    threads: Option<usize>,

    /// Directory served as the web UI
    #[arg(long)]
    web_root: Option<String>,

    /// Enable the periodic incremental scheduler
    #[arg(long)]
    scheduler: bool,

    /// Scheduler interval in seconds
    #[arg(long)]
    sched_s: Option<u64>,

    /// KEY=VALUE config file; environment variables override its values
    #[arg(long, default_value = "config.env")]
    config: String,

    /// Log level (trace/debug/info/warn/error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log file path; stderr when unset
    #[arg(long)]
    log_file: Option<String>,
}

fn init_logging(level: &str, log_file: &str) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    if log_file.is_empty() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return None;
    }

    let path = Path::new(log_file);
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let name = path.file_name().map(|n| n.to_os_string()).unwrap_or_else(|| "shoald.log".into());

    let appender = tracing_appender::rolling::never(dir, name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut cfg = EnvConfig::new();
    cfg.load_file(&args.config);

    // CLI flag > environment > config file > default.
    let dataset = args
        .dataset
        .clone()
        .unwrap_or_else(|| cfg.get_string("DATASET_PATH", ""));
    let threads = args
        .threads
        .unwrap_or_else(|| cfg.get_int("BUILD_THREADS", num_cpus::get() as i64).max(1) as usize);
    let web_root = args
        .web_root
        .clone()
        .unwrap_or_else(|| cfg.get_string("WEB_ROOT", "web"));
    let sched_interval = args
        .sched_s
        .unwrap_or_else(|| cfg.get_int("SCHED_INTERVAL_S", 30).max(1) as u64);
    let sched_enabled = args.scheduler || cfg.get_bool("SCHED_ENABLED", false);
    let log_level = args
        .log_level
        .clone()
        .unwrap_or_else(|| cfg.get_string("LOG_LEVEL", "info"));
    let log_file = args
        .log_file
        .clone()
        .unwrap_or_else(|| cfg.get_string("LOG_FILE", ""));

    let _log_guard = init_logging(&log_level, &log_file);

    info!("Starting shoald v{}", shoal::VERSION);
    info!("  Dataset: {}", if dataset.is_empty() { "(unset)" } else { dataset.as_str() });
    info!("  Build threads: {}", threads);
    info!("  Web root: {}", web_root);
    info!("  Scheduler: enabled={} interval_s={}", sched_enabled, sched_interval);

    let tokenizer_config = TokenizerConfig::default();
    let index = Arc::new(InvertedIndex::default());
    let store = Arc::new(DocumentStore::new());
    let metrics = EngineMetrics::new()?;

    let builder = IndexBuilder::new(
        Arc::clone(&index),
        Arc::clone(&store),
        Tokenizer::new(tokenizer_config.clone()),
    );
    let coordinator = Arc::new(BuildCoordinator::new(
        builder,
        metrics.clone(),
        dataset,
        threads,
    ));
    coordinator.set_scheduler_enabled(sched_enabled);
    coordinator.set_scheduler_interval_s(sched_interval);
    BuildCoordinator::spawn_scheduler(&coordinator);

    let state = AppState {
        index: Arc::clone(&index),
        query: QueryService::new(index, store, Tokenizer::new(tokenizer_config)),
        coordinator: Arc::clone(&coordinator),
        metrics,
    };
    let app = create_router(state, web_root);

    let listener = tokio::net::TcpListener::bind((args.host.as_str(), args.port)).await?;
    info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down; waiting for scheduler and any in-flight build");
    coordinator.shutdown();

    Ok(())
}
