use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::models::Metric;
use crate::services::aggregate_service::EmptyPoolPolicy;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Token list endpoint (overrides TOKENS_URL)
    #[arg(long, global = true)]
    pub tokens_url: Option<String>,

    /// Pool list endpoint (overrides POOLS_URL)
    #[arg(long, global = true)]
    pub pools_url: Option<String>,

    /// Tokens no pool references: null, zero or skip
    #[arg(long, global = true, default_value = "null")]
    pub empty_pools: EmptyPoolPolicy,

    /// Also sum each token's 24h pool volume
    #[arg(long, global = true)]
    pub with_volume: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch once and write a bubble chart
    Chart {
        /// market_cap, volume_24h, price or circulating_supply
        #[arg(short, long, default_value = "market_cap")]
        metric: Metric,
        /// Output file, .svg or .png
        #[arg(short, long, default_value = "bubbles.svg")]
        output: PathBuf,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
    },
    /// Fetch once and print a table sorted by a metric
    Table {
        #[arg(short, long, default_value = "market_cap")]
        metric: Metric,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Fetch once and print the derived records as JSON
    Json {
        #[arg(long)]
        pretty: bool,
    },
    /// Refresh on an interval and keep re-rendering the same chart
    Watch {
        #[arg(short, long, default_value = "market_cap")]
        metric: Metric,
        #[arg(short, long, default_value = "bubbles.svg")]
        output: PathBuf,
        /// Seconds between refreshes
        #[arg(short, long, default_value_t = 60)]
        interval: u64,
        /// Switch to the next metric on every refresh
        #[arg(long)]
        rotate: bool,
        /// Stop after this many successful renders
        #[arg(long)]
        count: Option<u64>,
    },
}
