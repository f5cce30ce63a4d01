// src/commands/mirror.rs
//! Mirror command

use super::{build_client, load_config};
use crate::cli::MirrorArgs;
use aamporter::{MirrorOptions, MunkiImporter, PackageImporter, UpdateStatus, run_mirror};
use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Download, and optionally import, current updates for every configured product
pub fn cmd_mirror(config_path: &Path, args: &MirrorArgs) -> Result<()> {
    let config = load_config(config_path)?;

    // Preflight before any network traffic
    let importer = if args.munkiimport {
        Some(MunkiImporter::from_config(&config, args.force_import)?)
    } else {
        None
    };

    let client = build_client(&config, !args.no_progress)?;
    let options = MirrorOptions {
        include_revoked: args.include_revoked,
        include_all_licensing: args.include_all_licensing,
        dry_run: args.dry_run,
        feed_file: args.feed_file.clone(),
    };

    info!("Starting mirror run with {} products", config.products.len());
    let report = run_mirror(
        &config,
        &options,
        &client,
        importer.as_ref().map(|i| i as &dyn PackageImporter),
    )?;

    for record in report.records.iter().filter(|r| r.status != UpdateStatus::NotLatest) {
        println!(
            "  {} {} [{}]: {}",
            record.product, record.version, record.channel, record.status
        );
    }

    let processed = report.processed().count();
    let failed = report.failures().count();
    println!();
    println!("Updates processed: {}", processed);
    if options.dry_run {
        println!("  Would download: {}", report.count(&UpdateStatus::Planned));
    } else {
        println!(
            "  Downloaded: {}",
            report.count(&UpdateStatus::Downloaded) + report.count(&UpdateStatus::Redownloaded)
        );
        println!("  Already cached: {}", report.count(&UpdateStatus::Cached));
    }
    if importer.is_some() {
        println!("  Imported: {}", report.count(&UpdateStatus::Imported));
        println!("  Already in repo: {}", report.count(&UpdateStatus::AlreadyImported));
    }
    println!("Revoked: {}", report.count(&UpdateStatus::Revoked));
    println!(
        "Excluded by licensing: {}",
        report.count(&UpdateStatus::LicensingExcluded)
    );

    if failed > 0 {
        anyhow::bail!("{} update(s) failed", failed);
    }
    Ok(())
}
