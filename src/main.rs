// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use fabstir_page_monitor::{
    monitor::{MonitorConfig, MonitorService},
    version,
};
use std::{env, sync::Arc};
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("🚀 Starting Fabstir Page Monitor...\n");
    println!("📦 BUILD VERSION: {}", version::VERSION);
    println!("📅 Build Date: {}", version::BUILD_DATE);
    println!();

    let config = MonitorConfig::from_env()?;

    println!("🌐 Target: {}", config.target.url);
    if let Some(selector) = &config.target.content_selector {
        println!("🎯 Selector: {}", selector);
    }
    println!("⏱️  Interval: {}s", config.check_interval_secs);
    println!("💾 Baselines: {}", config.data_dir.display());
    println!("📬 Recipients: {}", config.recipients.join(", "));
    println!("\nPress Ctrl+C to shutdown...\n");

    let service = Arc::new(MonitorService::from_config(config)?);
    let cancel_token = CancellationToken::new();
    let monitor_handle = tokio::spawn(service.run(cancel_token.clone()));

    // Wait for shutdown signal
    signal::ctrl_c().await?;

    println!("\n⏹️  Shutting down...");
    cancel_token.cancel();
    monitor_handle.await?;

    println!("👋 Goodbye!");
    Ok(())
}
