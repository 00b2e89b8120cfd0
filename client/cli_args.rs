use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::pb::{Point, Rectangle};

#[derive(Parser, Debug)]
#[command(
    name = "routeguide-cli",
    about = "A command line client for the routeguide server",
    long_about = "routeguide-cli connects to a routeguide server and runs one of its calls:\nfeature lookup, rectangle listing, route recording, route chat or echo conversations."
)]
pub struct CliArgs {
    /// Server address (host:port)
    #[arg(long = "server-addr", default_value = "localhost:10000")]
    pub server_addr: String,

    /// Connect with TLS
    #[arg(long)]
    pub tls: bool,

    /// PEM file with the CA root certificate (TLS only)
    #[arg(long = "ca-file")]
    pub ca_file: Option<PathBuf>,

    /// Server name used to verify the TLS certificate
    #[arg(long = "server-host-override")]
    pub server_host_override: Option<String>,

    /// Per-call timeout in seconds
    #[arg(long, default_value = "10")]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Look up the feature at a point (coordinates in degrees × 1e7)
    Feature {
        #[arg(long, allow_negative_numbers = true)]
        latitude: i32,
        #[arg(long, allow_negative_numbers = true)]
        longitude: i32,
    },

    /// List features inside a rectangle
    List {
        #[arg(long, allow_negative_numbers = true, default_value = "400000000")]
        lo_latitude: i32,
        #[arg(long, allow_negative_numbers = true, default_value = "-750000000")]
        lo_longitude: i32,
        #[arg(long, allow_negative_numbers = true, default_value = "420000000")]
        hi_latitude: i32,
        #[arg(long, allow_negative_numbers = true, default_value = "-730000000")]
        hi_longitude: i32,
    },

    /// Send a random route and print its summary
    Record {
        /// Number of random points (defaults to 2..=101)
        #[arg(long)]
        points: Option<usize>,

        /// Random seed for a reproducible route
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run the route chat demo script
    Chat,

    /// Ask N questions on the echo service
    Echo {
        #[arg(short = 'n', long, default_value = "5")]
        count: usize,
    },
}

impl CliArgs {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.server_addr.trim().is_empty() {
            return Err("Server address must not be empty".to_string());
        }

        if self.tls && self.ca_file.is_none() {
            return Err("--tls requires --ca-file".to_string());
        }

        if !self.tls && (self.ca_file.is_some() || self.server_host_override.is_some()) {
            return Err("--ca-file and --server-host-override only apply with --tls".to_string());
        }

        Ok(())
    }
}

impl CliCommand {
    /// `list` 子命令对应的矩形
    pub fn rectangle(&self) -> Option<Rectangle> {
        match *self {
            CliCommand::List {
                lo_latitude,
                lo_longitude,
                hi_latitude,
                hi_longitude,
            } => Some(Rectangle::new(
                Point::new(lo_latitude, lo_longitude),
                Point::new(hi_latitude, hi_longitude),
            )),
            _ => None,
        }
    }
}
