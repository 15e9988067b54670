use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::Notify;

use siteserve::config::{AppState, Config, Overrides};
use siteserve::error::StartupError;
use siteserve::{logger, pages, server};

/// Development server for static sites
#[derive(Debug, Parser)]
#[command(name = "siteserve", version, about)]
struct Cli {
    /// Project directory (or directory of projects with --multihost)
    root: Option<String>,

    /// Server configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Serve every subdirectory of ROOT as its own project
    #[arg(short, long)]
    multihost: bool,

    /// Listen address
    #[arg(long)]
    host: Option<String>,

    /// Listen port
    #[arg(short, long)]
    port: Option<u16>,
}

fn main() -> Result<(), StartupError> {
    let cli = Cli::parse();
    let overrides = Overrides {
        root: cli.root,
        multihost: cli.multihost,
        host: cli.host,
        port: cli.port,
    };
    let cfg = Config::load_from(&cli.config, &overrides)?;

    logger::init(&cfg)?;
    pages::init()?;

    if !Path::new(&cfg.site.root).is_dir() {
        return Err(StartupError::SiteRoot(cfg.site.root.clone().into()));
    }

    // Build the runtime by hand so `server.workers` can set the thread count
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), StartupError> {
    let addr = cfg.get_socket_addr().map_err(StartupError::Address)?;
    let listener = server::create_reusable_listener(addr)?;

    let state = Arc::new(AppState::new(&cfg));
    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown))?;

    logger::log_server_start(&addr, &cfg);

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(listener, state, shutdown))
        .await?;
    Ok(())
}
