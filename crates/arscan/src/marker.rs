// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `arscan scan`, `fetch`, `cache` and `marker` command implementations.

use std::process::ExitCode;

use arscan_core::{ArscanError, MarkerId, MarkerRecord};
use arscan_marker::{ScanOutcome, ScanSession};
use colored::Colorize;
use tracing::debug;

use crate::context::AppContext;

fn print_record(record: &MarkerRecord) -> Result<(), ArscanError> {
    let json = serde_json::to_string_pretty(record)
        .map_err(|e| ArscanError::Internal(format!("failed to render record: {e}")))?;
    println!("{json}");
    Ok(())
}

/// Run `arscan scan <TEXT>`: parse, invalidate, fetch.
pub async fn run_scan(ctx: &AppContext, text: &str) -> Result<ExitCode, ArscanError> {
    let session = ScanSession::new(ctx.fetcher.clone());
    match session.handle_scan(text).await {
        ScanOutcome::Ready(record) => {
            eprintln!(
                "{} marker loaded (pattern: {})",
                "✓".green(),
                record.pattern_or_image_url()
            );
            print_record(&record)?;
            Ok(ExitCode::SUCCESS)
        }
        ScanOutcome::InvalidCode => {
            eprintln!("{} {}", "✗".red(), arscan_marker::session::INVALID_CODE_MESSAGE.red());
            Ok(ExitCode::FAILURE)
        }
        ScanOutcome::Failed(message) => {
            eprintln!("{} {}", "✗".red(), message.red());
            Ok(ExitCode::FAILURE)
        }
        ScanOutcome::Ignored | ScanOutcome::Abandoned => Ok(ExitCode::FAILURE),
    }
}

/// Run `arscan fetch <ID> [--fresh]`.
pub async fn run_fetch(ctx: &AppContext, marker_id: &MarkerId, fresh: bool) -> Result<(), ArscanError> {
    if fresh {
        debug!(marker_id = %marker_id, "dropping cached copy before fetch");
        ctx.fetcher.cache().remove(marker_id).await?;
    }
    let record = ctx.fetcher.fetch(marker_id).await?;
    print_record(&record)
}

/// Run `arscan cache clear [ID]`.
pub async fn run_cache_clear(ctx: &AppContext, marker_id: Option<&MarkerId>) -> Result<(), ArscanError> {
    match marker_id {
        Some(id) => {
            ctx.fetcher.cache().remove(id).await?;
            println!("{} removed cached marker {id}", "✓".green());
        }
        None => {
            let removed = ctx.fetcher.cache().clear_all().await?;
            println!("{} removed {removed} cached marker(s)", "✓".green());
        }
    }
    Ok(())
}

/// Run `arscan cache info [--json]`.
pub async fn run_cache_info(ctx: &AppContext, json: bool) -> Result<(), ArscanError> {
    let info = ctx.fetcher.cache().info().await?;
    if json {
        let rendered = serde_json::to_string_pretty(&info)
            .map_err(|e| ArscanError::Internal(format!("failed to render cache info: {e}")))?;
        println!("{rendered}");
        return Ok(());
    }

    println!("{}", "Marker cache".bold());
    println!("  Entries: {}", info.keys.len());
    println!("  Size:    {} bytes", info.size_bytes);
    for key in &info.keys {
        println!("    {key}");
    }
    Ok(())
}

/// Run `arscan marker upload <ID> ...`.
pub async fn run_upload(
    ctx: &AppContext,
    marker_id: &MarkerId,
    record: MarkerRecord,
) -> Result<(), ArscanError> {
    // Refuse to publish a record the fetch path would later reject.
    let value = serde_json::to_value(&record)
        .map_err(|e| ArscanError::Internal(format!("failed to encode record: {e}")))?;
    MarkerRecord::decode(&value).map_err(|reason| ArscanError::InvalidPayload {
        source_name: "command line".into(),
        reason,
    })?;

    ctx.api.upload_marker(marker_id, &record).await?;
    println!("{} uploaded marker {marker_id}", "✓".green());
    Ok(())
}

/// Run `arscan marker delete <ID>`; the cached copy goes too.
pub async fn run_delete(ctx: &AppContext, marker_id: &MarkerId) -> Result<(), ArscanError> {
    ctx.api.delete_marker(marker_id).await?;
    ctx.fetcher.cache().remove(marker_id).await?;
    println!("{} deleted marker {marker_id}", "✓".green());
    Ok(())
}
