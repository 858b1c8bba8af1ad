//! Reckon CLI
//!
//! Command-line server and demo client for vessel-state replication.
//!
//! # Commands
//!
//! - `serve` - Bind a UDP port and route updates between peers
//! - `track` - Run a demo client feeding synthetic vessel motion
//! - `send-debug` - Fire a one-off Debug message at a server
//! - `version` - Show version information

mod commands;

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Vessel-state replication over UDP.
#[derive(Parser)]
#[command(name = "reckon")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bind a UDP port and route vessel updates until terminated
    Serve {
        /// Address to bind
        #[arg(short, long, default_value = "0.0.0.0:6754")]
        bind: SocketAddr,

        /// Seconds of silence before a peer is considered gone
        #[arg(long, default_value = "30")]
        idle_timeout_secs: u64,
    },

    /// Run a demo client that replicates synthetic vessel motion
    Track {
        /// Server to connect to
        #[arg(short, long, default_value = "127.0.0.1:6754")]
        server: SocketAddr,

        /// Number of synthetic vessels to fly
        #[arg(long, default_value = "2")]
        vessels: usize,

        /// Ticks to run before exiting (0 = forever)
        #[arg(long, default_value = "0")]
        ticks: u64,

        /// Milliseconds between ticks
        #[arg(long, default_value = "100")]
        interval_ms: u64,
    },

    /// Send one Debug message and exit
    SendDebug {
        /// Server to connect to
        #[arg(short, long, default_value = "127.0.0.1:6754")]
        server: SocketAddr,

        /// Text to send
        #[arg(short, long)]
        message: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Serve {
            bind,
            idle_timeout_secs,
        } => {
            commands::serve::run(bind, idle_timeout_secs)?;
        }
        Commands::Track {
            server,
            vessels,
            ticks,
            interval_ms,
        } => {
            commands::track::run(server, vessels, ticks, interval_ms)?;
        }
        Commands::SendDebug { server, message } => {
            commands::send_debug::run(server, &message)?;
        }
        Commands::Version => {
            println!("reckon v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
