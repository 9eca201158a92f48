mod cli;

use claimdrop_bot::address::Network;
use claimdrop_bot::claims::batch::ProgressEvent;
use claimdrop_bot::claims::cleanup::PaginatedCleaner;
use claimdrop_bot::claims::eligibility::EligibilityResolver;
use claimdrop_bot::claims::fee::FeeConfig;
use claimdrop_bot::claims::submit::SubmissionEngine;
use claimdrop_bot::claims::{ClaimRecord, LinkRecord};
use claimdrop_bot::config::{self, Config};
use claimdrop_bot::error::{ClaimError, Result};
use claimdrop_bot::ledger::InMemoryLedger;
use claimdrop_bot::utils;
use clap::Parser;
use cli::{Cli, Commands};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("claimdrop=debug,info")
        .init();

    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Submit { claims_file, network, fee_bps } => {
            submit(&config, &claims_file, network, fee_bps).await
        }

        Commands::Resolve { addrs, links, network, seed, format } => {
            resolve(&config, addrs, links, network, seed, &format).await
        }

        Commands::Cleanup { seed, page_size } => cleanup(&config, seed, page_size).await,

        Commands::Init => init(&config),
    };

    if let Err(e) = result {
        error!("{}", format!("Error: {}", e).red());
        std::process::exit(1);
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path, e))?;
    Ok(serde_json::from_str(&raw)?)
}

fn network_for(config: &Config, flag: Option<String>) -> Result<Network> {
    flag.unwrap_or_else(|| config.airdrop.network.clone()).parse()
}

fn chunk_bar(label: &str) -> ProgressBar {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:30}] {pos}/{len}")
            .expect("static template")
            .progress_chars("=> "),
    );
    bar.set_message(label.to_string());
    bar
}

async fn submit(
    config: &Config,
    claims_file: &str,
    network: Option<String>,
    fee_bps: Option<u16>,
) -> Result<()> {
    let records: Vec<ClaimRecord> = read_json(claims_file)?;
    let network = network_for(config, network)?;
    let fee_config = FeeConfig::new(fee_bps.unwrap_or(config.airdrop.fee_bps))?;

    println!(
        "{}",
        format!("Submitting {} claims against the simulated registry...", records.len()).cyan()
    );

    let addrs: Vec<String> = records.iter().map(|r| r.address.clone()).collect();
    let amounts: Vec<u64> = records.iter().map(|r| r.amount).collect();

    let ledger = InMemoryLedger::new();
    let engine = SubmissionEngine::new(
        &ledger,
        config.ledger.registry_id.clone(),
        config.airdrop.sender.clone(),
        config.claim_chunk_size(),
    );

    let bar = chunk_bar("chunks");
    let outcome = engine
        .submit_claims(network, &addrs, &amounts, fee_config, |event| {
            if let ProgressEvent::Chunk { current, total } = event {
                bar.set_length(total as u64);
                bar.set_position(current as u64);
            }
        })
        .await;
    bar.finish_and_clear();

    match outcome {
        Ok(outcome) => {
            println!("\n{}", "=== Submission Summary ===".cyan().bold());
            println!("Chunks committed: {}", outcome.chunks.to_string().green());
            println!("Claim total:      {}", utils::format_amount(outcome.claim_total));
            println!("Fee:              {}", utils::format_amount(outcome.fee));
            for (i, receipt) in outcome.receipts.iter().enumerate() {
                println!("  chunk {:>3}: {}", i, receipt.digest);
            }
            Ok(())
        }
        Err(ClaimError::ChunkSubmissionFailed { chunk_index, prior_successes, source }) => {
            // committed chunks stay committed; tell the caller where to resume
            let resume_at = prior_successes * config.claim_chunk_size();
            println!(
                "{}",
                format!(
                    "Chunk {} failed; {} chunks are already committed. Resume by resubmitting claims from index {}; a full restart would re-fund committed claims.",
                    chunk_index, prior_successes, resume_at
                )
                .yellow()
            );
            Err(ClaimError::ChunkSubmissionFailed { chunk_index, prior_successes, source })
        }
        Err(e) => Err(e),
    }
}

async fn resolve(
    config: &Config,
    addrs: Vec<String>,
    links_file: Option<String>,
    network: Option<String>,
    seed: Option<String>,
    format: &str,
) -> Result<()> {
    let network = network_for(config, network)?;

    let ledger = InMemoryLedger::new();
    if let Some(path) = seed {
        let seeded: Vec<ClaimRecord> = read_json(&path)?;
        info!("seeding simulated registry with {} claims", seeded.len());
        for record in seeded {
            ledger.seed_claim(&record.address, record.amount, false).await;
        }
    }

    let resolver = EligibilityResolver::new(
        &ledger,
        config.ledger.registry_id.clone(),
        config.ledger.coin_type.clone(),
        network,
        config.airdrop.read_batch_size,
    );

    let bar = chunk_bar("read batches");
    let on_progress = |event: ProgressEvent| {
        if let ProgressEvent::ReadBatch { current, total } = event {
            bar.set_length(total as u64);
            bar.set_position(current as u64);
        }
    };

    if let Some(path) = links_file {
        let links: Vec<LinkRecord> = read_json(&path)?;
        let eligible = resolver.resolve_links(&links, on_progress).await;
        bar.finish_and_clear();
        let eligible = eligible?;

        if format == "json" {
            println!("{}", serde_json::to_string_pretty(&eligible)?);
            return Ok(());
        }
        println!("\n{}", "=== Eligible Links ===".cyan().bold());
        for entry in &eligible {
            let state = if entry.status.claimed { "claimed".yellow() } else { "unclaimed".green() };
            println!(
                "  {:<12} {:<16} {:>16}  {}",
                entry.link.id,
                utils::format_address(&entry.link.network_address),
                utils::format_amount(entry.status.amount),
                state
            );
        }
        println!("Eligible: {} of {}", eligible.len(), links.len());
    } else {
        let statuses = resolver.resolve_statuses(&addrs, on_progress).await;
        bar.finish_and_clear();
        let statuses = statuses?;

        if format == "json" {
            println!("{}", serde_json::to_string_pretty(&statuses)?);
            return Ok(());
        }
        println!("\n{}", "=== Claim Status ===".cyan().bold());
        for (addr, status) in addrs.iter().zip(&statuses) {
            let state = if !status.eligible {
                "not eligible".red()
            } else if status.claimed {
                "claimed".yellow()
            } else {
                "unclaimed".green()
            };
            println!(
                "  {:<16} {:>16}  {}",
                utils::format_address(addr),
                utils::format_amount(status.amount),
                state
            );
        }
    }

    Ok(())
}

async fn cleanup(config: &Config, seed: Option<String>, page_size: Option<usize>) -> Result<()> {
    let ledger = InMemoryLedger::new();
    if let Some(path) = seed {
        let stale: Vec<String> = read_json(&path)?;
        info!("seeding simulated registry with {} stale records", stale.len());
        ledger.seed_stale(stale).await;
    }

    let page_size = page_size
        .map(|p| p.min(config::delete_chunk_bound()))
        .unwrap_or_else(|| config.cleanup_page_size());

    let mut cleaner = PaginatedCleaner::new(&ledger, config.ledger.registry_id.clone(), page_size);
    let summary = cleaner
        .run(|event| {
            if let ProgressEvent::Page { number, cleaned } = event {
                println!("  page {:>3}: {} records deleted so far", number, cleaned);
            }
        })
        .await?;

    println!("\n{}", "=== Cleanup Summary ===".cyan().bold());
    println!("Pages:   {}", summary.pages);
    println!("Cleaned: {}", summary.cleaned_count.to_string().green());
    println!("Remaining pages: {}", if summary.has_next_page { "yes" } else { "no" });
    Ok(())
}

fn init(config: &Config) -> Result<()> {
    println!("{}", "Claimdrop orchestration engine".green());
    println!("\n{}", "Configuration:".cyan());
    println!("  Registry:         {}", config.ledger.registry_id);
    println!("  Coin type:        {}", config.ledger.coin_type);
    println!("  Sender:           {}", config.airdrop.sender);
    println!("  Network:          {}", config.airdrop.network);
    println!("  Fee:              {} bps", config.airdrop.fee_bps);
    println!("  Claim chunk size: {}", config.claim_chunk_size());
    println!("  Read batch size:  {}", config.airdrop.read_batch_size);
    println!("  Cleanup pages:    {}", config.cleanup_page_size());
    Ok(())
}
