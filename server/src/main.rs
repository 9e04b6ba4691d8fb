use anyhow::Context;
use clap::Parser;
use config::{ConfigOverrides, ServerConfig};
use generator::GeneratorConfig;
use log::{info, warn};
use service::ScanService;
use std::net::IpAddr;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;

mod api;
mod config;
mod generator;
mod service;

#[derive(Parser)]
#[command(author, version, about = "HTTP collector for WiFi/BLE sensor scan reports")]
struct Args {
    /// Load server settings from YAML; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    bind: Option<IpAddr>,
    #[arg(long)]
    port: Option<u16>,
    /// Directory served at `/` (expects an index.html)
    #[arg(long)]
    static_dir: Option<PathBuf>,
    #[arg(long, allow_hyphen_values = true)]
    origin_lat: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    origin_lng: Option<f64>,
    #[arg(long)]
    origin_name: Option<String>,
    /// Ingest this many synthetic scans before serving
    #[arg(long, default_value_t = 0)]
    demo: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let base = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    let config = base.apply(ConfigOverrides {
        bind: args.bind,
        port: args.port,
        static_dir: args.static_dir,
        origin_lat: args.origin_lat,
        origin_lng: args.origin_lng,
        origin_name: args.origin_name,
    });

    let service = ScanService::new(config.to_store_config());

    if args.demo > 0 {
        let generator = GeneratorConfig {
            description: Some("startup demo".into()),
            ..Default::default()
        };
        for _ in 0..args.demo {
            service
                .simulate(&generator)
                .context("seeding demo scans")?;
        }
        info!("Seeded {} synthetic scans", args.demo);
    }

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating HTTP runtime")?;
    runtime.block_on(serve(config, service))
}

async fn serve(config: ServerConfig, service: ScanService) -> anyhow::Result<()> {
    let routes = api::routes(service, config.static_dir.clone());
    let (addr, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(config.socket_addr(), shutdown_signal())
        .with_context(|| format!("binding {}", config.socket_addr()))?;

    info!("=================================");
    info!("Scan collector started");
    info!("Listening on http://{}", addr);
    info!(
        "Origin: {} ({:.6}, {:.6})",
        config.origin.name, config.origin.lat, config.origin.lng
    );
    info!("=================================");

    server.await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal as unix_signal, SignalKind};
        match unix_signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = signal::ctrl_c() => info!("SIGINT received, shutting down..."),
                    _ = terminate.recv() => info!("SIGTERM received, shutting down..."),
                }
                return;
            }
            Err(err) => warn!("SIGTERM handler unavailable: {}", err),
        }
    }

    if let Err(err) = signal::ctrl_c().await {
        warn!("awaiting Ctrl+C failed: {}", err);
        return;
    }
    info!("SIGINT received, shutting down...");
}
