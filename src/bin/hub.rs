use std::sync::Arc;

use clap::Parser;
use tollwatch::{
    Device, DeviceStatus,
    actors::{monitor::MonitorHandle, weather::WeatherHandle},
    api::{ApiConfig, ApiState, spawn_api_server},
    config::{Config, read_config_file},
    publisher::push_channel,
    stores::{AlertStore, DeviceStore, MemoryAlertStore, MemoryDeviceStore},
};
use tracing::{debug, info, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file
    #[arg(short)]
    file: Option<String>,
}

fn init() {
    let filter = filter::Targets::new().with_targets(vec![
        ("tollwatch", LevelFilter::TRACE),
        ("tollwatch_hub", LevelFilter::TRACE),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();
    let args = Args::parse();
    trace!("started with args: {args:?}");

    let config = match &args.file {
        Some(path) => read_config_file(path)?,
        None => Config::default(),
    };

    let devices = seed_device_store(&config).await;
    let alerts: Arc<dyn AlertStore> = Arc::new(MemoryAlertStore::new());

    let (push_tx, _push_rx) = push_channel();

    let monitor = MonitorHandle::spawn(
        config.monitor.clone(),
        devices.clone(),
        alerts.clone(),
        push_tx.clone(),
    );
    let weather = WeatherHandle::spawn(config.weather.clone(), push_tx.clone());

    let api_config = ApiConfig {
        bind_addr: config.api.bind,
        enable_cors: config.api.enable_cors,
    };
    let state = ApiState::new(monitor.clone(), devices, alerts, push_tx);
    let addr = spawn_api_server(api_config, state).await?;
    info!("hub ready on {addr}");

    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    weather.shutdown().await;
    monitor.shutdown().await;

    Ok(())
}

async fn seed_device_store(config: &Config) -> Arc<dyn DeviceStore> {
    let store = MemoryDeviceStore::new();

    if let Some(seeds) = &config.devices {
        debug!("registering {} devices from config", seeds.len());
        for seed in seeds {
            store
                .insert_device(Device {
                    id: seed.id.clone(),
                    location: seed.location.clone(),
                    last_transaction: None,
                    status: DeviceStatus::Down,
                    sub_status: None,
                })
                .await;
        }
    }

    Arc::new(store)
}
