// src/commands/feed.rs
//! Feed inspection command

use super::{build_client, load_config};
use aamporter::mirror::{MirrorOptions, load_feed};
use anyhow::Result;
use std::path::Path;

/// Print how the feed resolves for one or every configured channel
pub fn cmd_feed(
    config_path: &Path,
    channel: Option<&str>,
    feed_file: Option<&Path>,
    all: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let client = build_client(&config, false)?;
    let options = MirrorOptions {
        feed_file: feed_file.map(Path::to_path_buf),
        ..Default::default()
    };
    let resolver = load_feed(&config, &options, &client)?;

    let channels: Vec<&str> = match channel {
        Some(c) => vec![c],
        None => config.all_channels(),
    };

    for channel in channels {
        println!("{}:", channel);
        let Some(updates) = resolver.updates_for_channel(channel) else {
            println!("  (no updates)");
            continue;
        };

        let mut seen: Vec<(&str, &str)> = Vec::new();
        for entry in &updates {
            let key = (entry.product(), entry.version());
            if !seen.contains(&key) {
                seen.push(key);
            }
        }

        if all {
            for (product, version) in &seen {
                let mark = if resolver.is_eligible(channel, product, version, false) {
                    "[x]"
                } else if resolver.is_revoked(channel, product, version) {
                    "[r]"
                } else {
                    "[ ]"
                };
                println!("  {} {} {}", mark, product, version);
            }
            continue;
        }

        let mut products: Vec<&str> = Vec::new();
        for (product, _) in &seen {
            if !products.contains(product) {
                products.push(*product);
            }
        }
        for product in products {
            match resolver.highest_resolved_version(channel, product, false) {
                Some(version) => println!("  {} {}", product, version),
                None => println!("  {} (revoked)", product),
            }
        }
    }

    Ok(())
}
