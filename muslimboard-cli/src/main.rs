//! Muslimboard CLI
//!
//! Runs the API server, or performs a one-off schedule lookup against the
//! upstream provider.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use muslimboard_api::{ApiConfig, ApiServer};
use muslimboard_core::{CoordinateQuery, ScheduleFetcher};
use muslimboard_upstream::{AladhanClient, UpstreamConfig};

/// Muslimboard - prayer schedules with a cache-aside API
#[derive(Parser)]
#[command(name = "muslimboard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value = "8080")]
        port: u16,
        /// Bind address
        #[arg(short, long, env = "BIND_ADDRESS", default_value = "0.0.0.0")]
        bind: String,
    },

    /// Fetch a monthly schedule for a coordinate straight from upstream
    Schedule {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        latitude: String,
        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        longitude: String,
        /// Month (1-12)
        #[arg(long)]
        month: String,
        /// Year
        #[arg(long)]
        year: String,
        /// Calculation method code
        #[arg(long, default_value = "1")]
        method: String,
        /// Provider base URL
        #[arg(long, env = "UPSTREAM_BASE_URL")]
        upstream: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "muslimboard=debug,info"
    } else {
        "muslimboard=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve { port, bind } => cmd_serve(port, &bind).await,
        Commands::Schedule {
            latitude,
            longitude,
            month,
            year,
            method,
            upstream,
        } => {
            let query = CoordinateQuery {
                method,
                month,
                year,
                latitude,
                longitude,
            };
            cmd_schedule(query, upstream).await
        }
    }
}

/// Run the API server
async fn cmd_serve(port: u16, bind: &str) -> Result<()> {
    println!("{}", "🚀 Starting Muslimboard API server...".cyan().bold());
    println!("   {} http://{}:{}", "Listening on:".green(), bind, port);
    println!("   {} http://{}:{}/health", "Health check:".dimmed(), bind, port);
    println!("\n   Press Ctrl+C to stop.\n");

    let config = ApiConfig::from_env();
    let server = ApiServer::new(config)
        .await
        .context("Failed to initialize API server")?;

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .context("Invalid bind address")?;
    server.run(addr).await?;

    Ok(())
}

/// Fetch a schedule by coordinate
async fn cmd_schedule(query: CoordinateQuery, upstream: Option<String>) -> Result<()> {
    println!(
        "{} {}, {}",
        "🕌 Fetching schedule for:".cyan().bold(),
        query.latitude,
        query.longitude
    );

    if query.is_degenerate() {
        anyhow::bail!("coordinate (0, 0) is not a valid location");
    }

    let config = match upstream {
        Some(url) => UpstreamConfig::with_base_url(url),
        None => UpstreamConfig::default(),
    };
    let client = AladhanClient::with_config(config).context("Failed to create upstream client")?;

    let result = client
        .by_coordinate(&query)
        .await
        .context("Failed to fetch schedule")?;

    if result.is_empty() {
        println!("\n{}", "⚠️  Provider returned no schedule for this month.".yellow());
        return Ok(());
    }

    println!("\n{}", "✅ Schedule:".green().bold());
    for day in &result.schedules {
        println!(
            "   {}  {} {}  {} {}  {} {}  {} {}  {} {}",
            day.date.yellow(),
            "Subuh".dimmed(),
            day.fajr,
            "Dzuhur".dimmed(),
            day.dhuhr,
            "Ashar".dimmed(),
            day.asr,
            "Maghrib".dimmed(),
            day.maghrib,
            "Isya".dimmed(),
            day.isha
        );
    }

    println!("\n{}", "📋 Result (JSON):".yellow().bold());
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
