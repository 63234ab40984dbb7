//! Standalone MDF signal dump tool
//!
//! Decodes an MDF3 file and displays every signal series with its message
//! metadata, plus a decoding summary.
//!
//! Usage:
//!   dump_signals <file.mdf> [--signal <name>] [--limit <samples>]
//!
//! Example:
//!   dump_signals measurement.mdf --signal EngineSpeed --limit 20

use anyhow::Context;
use mdf_decoder::{process_file, DecodeConfig, MdfFile, CHANNEL_TYPE_TIME};
use std::env;
use std::path::PathBuf;

struct DumpStats {
    groups: usize,
    channels: usize,
    total_samples: usize,
    failed_channels: usize,
}

impl DumpStats {
    fn print_summary(&self) {
        println!("\n=== DECODING SUMMARY ===");
        println!("Channel groups processed: {}", self.groups);
        println!("Signal series delivered: {}", self.channels);
        println!("Total samples decoded: {}", self.total_samples);
        println!("Channels failed: {}", self.failed_channels);
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <file.mdf> [--signal <name>] [--limit <samples>]", args[0]);
        std::process::exit(1);
    }

    let path = PathBuf::from(&args[1]);
    let mut config = DecodeConfig::new();
    let mut limit = 10usize;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--signal" => {
                let name = args.get(i + 1).context("--signal needs a name")?;
                config = config.with_signal_filter(vec![name.clone()]);
                i += 2;
            }
            "--limit" => {
                let count = args.get(i + 1).context("--limit needs a count")?;
                limit = count.parse().context("--limit must be a number")?;
                i += 2;
            }
            other => anyhow::bail!("unknown option: {}", other),
        }
    }

    let file = MdfFile::open(&path).with_context(|| format!("opening {:?}", path))?;
    println!(
        "Opened {:?}: format version {}, {} bytes",
        path,
        file.version(),
        file.len()
    );

    let mut channels = 0usize;
    let mut total_samples = 0usize;
    let outcome = process_file(&file, &config, |_, series| {
        channels += 1;
        total_samples += series.record_count as usize;

        let kind = if series.channel_type == CHANNEL_TYPE_TIME {
            "time"
        } else {
            "data"
        };
        println!(
            "\n[{}] {} (message {}, CAN ID 0x{:X}, channel {}) - {} records{}",
            kind,
            series.signal_name,
            series.message_name,
            series.can_id,
            series.can_channel,
            series.record_count,
            if series.unit.is_empty() {
                String::new()
            } else {
                format!(", unit {}", series.unit)
            }
        );

        for (t, v) in series.time().iter().zip(series.values()).take(limit) {
            println!("  {:>12.6}  {}", t, v);
        }
        if series.record_count as usize > limit {
            println!("  ... {} more", series.record_count as usize - limit);
        }
    })?;

    for failure in &outcome.errors {
        eprintln!("Channel '{}' failed: {}", failure.signal_name, failure.error);
    }

    let stats = DumpStats {
        groups: outcome.groups_processed,
        channels,
        total_samples,
        failed_channels: outcome.errors.len(),
    };
    stats.print_summary();

    if file.is_corrupt() {
        eprintln!("\nWarning: file image had out-of-range links, output may be incomplete");
    }

    Ok(())
}
