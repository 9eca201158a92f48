use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "claimdrop")]
#[command(about = "Chunked batch orchestration for airdrop claim funding, eligibility and cleanup")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fund claims from a JSON file, one ledger-safe chunk at a time
    Submit {
        /// JSON file: [{"address": "...", "amount": 123}, ...]
        claims_file: String,

        /// Foreign network of the addresses (ethereum, solana)
        #[arg(short, long)]
        network: Option<String>,

        /// Fee in basis points, overriding the configured rate
        #[arg(long)]
        fee_bps: Option<u16>,
    },

    /// Resolve eligibility and claim status for foreign addresses
    Resolve {
        /// Addresses to resolve; omit when using --links
        addrs: Vec<String>,

        /// JSON file of ownership links: [{"id", "network_address", "owner"}, ...]
        #[arg(short, long)]
        links: Option<String>,

        /// Foreign network of the addresses (ethereum, solana)
        #[arg(short, long)]
        network: Option<String>,

        /// Claims JSON file used to seed the simulated registry
        #[arg(short, long)]
        seed: Option<String>,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Delete stale claim records in cursor-bounded pages
    Cleanup {
        /// JSON file of stale record addresses used to seed the simulated registry
        #[arg(short, long)]
        seed: Option<String>,

        /// Page size override
        #[arg(short, long)]
        page_size: Option<usize>,
    },

    /// Show the effective configuration
    Init,
}
