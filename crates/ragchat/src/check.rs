// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ragchat check` command implementation.
//!
//! Probes every model server and reports store sizes.

use colored::Colorize;
use ragchat_core::{DocumentStore, HealthStatus, ImageIndex, RagError};

use crate::app::App;

/// Print a health report. Returns `false` when any adapter is unhealthy.
pub async fn run_check(app: &App) -> Result<bool, RagError> {
    let mut healthy = true;

    for report in app.agent.health().await {
        let (symbol, detail) = match &report.status {
            HealthStatus::Healthy => ("✓".green().to_string(), String::new()),
            HealthStatus::Degraded(msg) => ("!".yellow().to_string(), format!(": {msg}")),
            HealthStatus::Unhealthy(msg) => {
                healthy = false;
                ("✗".red().to_string(), format!(": {msg}"))
            }
        };
        println!(
            "  {symbol} {:<20} {}{}",
            report.adapter_type.to_string(),
            report.name,
            detail.dimmed()
        );
    }

    println!(
        "  {} {} documents, {} images",
        "·".dimmed(),
        app.documents.count().await?,
        app.images.count().await?
    );
    Ok(healthy)
}
