// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::monitor::{
    baseline_key, BaselineStore, ChangeChecker, CycleReport, FileBaselineStore, HttpFetcher,
    MonitorConfig, MonitorService, MonitoredTarget,
};

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Page URL to check
    #[arg(long, env = "MONITOR_URL")]
    pub url: String,

    /// Content selector: #id, .class or a tag name
    #[arg(long, env = "MONITOR_SELECTOR")]
    pub selector: Option<String>,

    /// Directory holding baseline records
    #[arg(long, env = "MONITOR_DATA_DIR", default_value = "./data/baselines")]
    pub data_dir: PathBuf,

    /// Fetch timeout in seconds
    #[arg(long, env = "MONITOR_FETCH_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Comma-separated notification recipients
    #[arg(long, env = "MONITOR_RECIPIENTS", value_delimiter = ',')]
    pub recipients: Vec<String>,

    /// Webhook endpoint for notifications
    #[arg(long, env = "MONITOR_WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    /// Send notifications for this check
    #[arg(long)]
    pub notify: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for baseline commands
#[derive(Args, Debug)]
pub struct BaselineArgs {
    /// Page URL
    #[arg(long, env = "MONITOR_URL")]
    pub url: String,

    /// Directory holding baseline records
    #[arg(long, env = "MONITOR_DATA_DIR", default_value = "./data/baselines")]
    pub data_dir: PathBuf,
}

/// Arguments for the key command
#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Page URL
    pub url: String,
}

impl CheckArgs {
    fn to_config(&self) -> Result<MonitorConfig> {
        let mut target = MonitoredTarget::new(self.url.clone());
        target.content_selector = self.selector.clone().filter(|s| !s.is_empty());

        let mut config = MonitorConfig::new(target);
        config.data_dir = self.data_dir.clone();
        config.fetch_timeout_secs = self.timeout_secs;
        config.recipients = self
            .recipients
            .iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        config.webhook_url = self.webhook_url.clone().filter(|s| !s.is_empty());
        config.validate()?;
        Ok(config)
    }
}

/// Run a single check
pub async fn check(args: CheckArgs) -> Result<()> {
    dotenv::dotenv().ok();
    let config = args.to_config()?;

    if args.notify {
        let service = MonitorService::from_config(config)?;
        return match service.run_cycle(&CancellationToken::new()).await {
            CycleReport::Completed(outcome) => print_outcome(&outcome, args.json),
            CycleReport::Failed(message) => Err(anyhow!("Check failed: {}", message)),
            other => Err(anyhow!("Check did not complete: {:?}", other)),
        };
    }

    let fetcher = Arc::new(HttpFetcher::new(config.fetch_timeout(), &config.user_agent)?);
    let store = Arc::new(FileBaselineStore::new(config.data_dir.clone()));
    let checker = ChangeChecker::new(fetcher, store);

    let outcome = checker.check(&config.target).await?;
    print_outcome(&outcome, args.json)
}

fn print_outcome(outcome: &crate::monitor::ComparisonOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    } else if outcome.has_new_text {
        println!("🆕 New content:\n{}", outcome.new_text);
    } else if outcome.new_text.is_empty() {
        println!("✅ No new content");
    } else {
        println!("ℹ️  {}", outcome.new_text);
    }
    Ok(())
}

/// Print the stored baseline for a URL
pub async fn show_baseline(args: BaselineArgs) -> Result<()> {
    let store = FileBaselineStore::new(args.data_dir);
    match store.get(&args.url).await {
        Some(snapshot) => {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            Ok(())
        }
        None => Err(anyhow!("No baseline stored for {}", args.url)),
    }
}

/// Delete the stored baseline for a URL
pub async fn reset_baseline(args: BaselineArgs) -> Result<()> {
    let store = FileBaselineStore::new(args.data_dir);
    if store.remove(&args.url).await? {
        info!("Removed baseline for {}", args.url);
        println!("🗑️  Baseline removed for {}", args.url);
    } else {
        println!("No baseline stored for {}", args.url);
    }
    Ok(())
}

/// Print the baseline key for a URL
pub fn print_key(args: KeyArgs) {
    println!("{}", baseline_key(&args.url));
}
