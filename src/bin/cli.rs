//! Tracker CLI
//!
//! Local entry point: run the HTTP server or perform lookups from the shell.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracker::{
    error::{AppError, Result},
    models::{Config, Session, ShipmentRecord, TrackingRequest, UserLocality},
    services::{Coordinates, ReminderEvent, ReminderScheduler, TrackingService, locality},
    storage::{HistoryStore, LocalHistoryStore},
    utils::http,
};

/// Tracker - Parcel Tracking Lookup
#[derive(Parser, Debug)]
#[command(
    name = "tracker",
    version,
    about = "Parcel tracking lookup with carrier detection"
)]
struct Cli {
    /// Path to storage directory containing config and history files
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API server
    #[cfg(feature = "server")]
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides config and PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Look up a tracking number
    Track {
        tracking_number: String,

        /// Carrier code (jd, sf, yto); detected when omitted
        #[arg(long)]
        courier: Option<String>,

        /// Enable the arrival reminder for this address
        #[arg(long)]
        email: Option<String>,

        /// City used for the arrival reminder
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        city: Option<String>,

        /// Latitude for reverse geocoding
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude for reverse geocoding
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Do not wait for a scheduled reminder to be delivered
        #[arg(long)]
        no_wait: bool,
    },

    /// Detect the carrier of a tracking number
    Detect { tracking_number: String },

    /// List supported carriers
    Couriers,

    /// Show lookup history
    History {
        /// Delete the stored history
        #[arg(long)]
        clear: bool,
    },

    /// Validate configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_record(record: &ShipmentRecord, locality: &UserLocality) {
    println!("单号: {}", record.tracking_number);
    println!("快递公司: {}", record.carrier_name);
    println!("状态: {} [{}]", record.status_label, record.status.badge());
    println!();
    for event in &record.timeline {
        let marker = if event.mentions(locality) { "*" } else { " " };
        println!(
            "{} {}  {}  {}",
            marker,
            event.timestamp.format("%Y-%m-%d %H:%M"),
            event.location,
            event.status_text
        );
    }
    println!();
    let info = &record.package_info;
    println!("收件人: {} {}", info.recipient_name, info.recipient_phone);
    println!("地址: {}", info.recipient_address);
    println!("重量: {}", info.weight);
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path).with_env_overrides();
    log::debug!("Loaded configuration from {}", cli.storage_dir.display());

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    let store = Arc::new(LocalHistoryStore::new(&cli.storage_dir, &config.history));

    match cli.command {
        #[cfg(feature = "server")]
        Command::Serve { host, port } => {
            let mut config = config;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let service = Arc::new(TrackingService::new(&config, store)?);
            tracker::server::serve(&config, service).await?;
        }

        Command::Track {
            tracking_number,
            courier,
            email,
            city,
            lat,
            lon,
            no_wait,
        } => {
            let (scheduler, mut events) =
                ReminderScheduler::new(Duration::from_secs(config.reminder.delay_secs));
            let service = TrackingService::new(&config, store)?.with_reminders(scheduler);

            let locality = match (city, lat, lon) {
                (Some(city), _, _) => UserLocality::new(city),
                (None, Some(latitude), Some(longitude)) => {
                    let client = http::create_async_client(&config.locality)?;
                    let coords = Coordinates {
                        latitude,
                        longitude,
                    };
                    locality::resolve(&client, &config, Some(coords)).await
                }
                _ => UserLocality::new(config.reminder.default_city.clone()),
            };
            let mut session = Session::new(locality);

            if let Some(email) = email {
                service.enable_reminder(&mut session, &email)?;
            }

            let record = match courier {
                Some(code) => {
                    service
                        .track(&TrackingRequest::with_carrier(&tracking_number, code))
                        .await
                }
                None => service.search(&session, &tracking_number).await,
            }
            .inspect_err(|e| log::error!("{}", e.user_message()))?;

            print_record(&record, &session.locality);

            if let Ok(event) = events.try_recv() {
                let notice = event.notice();
                log::info!(
                    "Arrival reminder scheduled for {} ({})",
                    notice.contact_address,
                    notice.locality_name
                );
                if !no_wait {
                    if let Some(ReminderEvent::Delivered { notice, .. }) = events.recv().await {
                        println!();
                        println!("To: {}", notice.contact_address);
                        println!("Subject: {}", notice.subject());
                        println!("{}", notice.body());
                    }
                }
            }
        }

        Command::Detect { tracking_number } => {
            let service = TrackingService::new(&config, store)?;
            match service.validate(&tracking_number)? {
                Some(found) => println!("{} ({})", found.name, found.code),
                None => {
                    log::warn!("{}", AppError::UnrecognizedCarrier(tracking_number.clone()));
                    println!("{}", AppError::UnrecognizedCarrier(tracking_number).user_message());
                }
            }
        }

        Command::Couriers => {
            let service = TrackingService::new(&config, store)?;
            for carrier in service.couriers() {
                println!("{:<4} {}", carrier.code.as_str(), carrier.name);
            }
        }

        Command::History { clear } => {
            if clear {
                store.clear().await?;
                log::info!("History cleared: {}", store.path().display());
                return Ok(());
            }

            let history = store.load().await?;
            if history.is_empty() {
                log::info!("No lookups recorded yet.");
            }
            for entry in history {
                println!(
                    "{}  {:<20} {}",
                    entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    entry.tracking_number,
                    entry.carrier_name
                );
            }
        }

        Command::Validate => {
            log::info!(
                "✓ Config OK ({} carriers, history capacity {})",
                config.carriers.len(),
                config.history.capacity
            );
        }
    }

    Ok(())
}
