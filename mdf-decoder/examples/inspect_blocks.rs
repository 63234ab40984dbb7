//! MDF block graph inspector
//!
//! Walks the block graph of an MDF3 file and prints its structure without
//! decoding any records. Useful for checking what a file contains before a
//! full decode.
//!
//! Usage:
//!   inspect_blocks <file.mdf>

use anyhow::Context;
use mdf_decoder::MdfFile;
use std::env;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <file.mdf>", args[0]);
        std::process::exit(1);
    }

    let path = PathBuf::from(&args[1]);
    let file = MdfFile::open(&path).with_context(|| format!("opening {:?}", path))?;

    let id = file.id_block();
    println!("File: {:?} ({} bytes)", path, file.len());
    println!("  format:     {}", id.format_identifier());
    println!("  program:    {}", id.program_identifier());
    println!("  version:    {}", id.version_number());
    println!(
        "  byte order: {}",
        if file.default_big_endian() { "big-endian" } else { "little-endian" }
    );

    let hd = file.header_block().context("header block unresolved")?;
    if !hd.author().is_empty() {
        println!("  author:     {}", hd.author());
    }
    if !hd.project().is_empty() {
        println!("  project:    {}", hd.project());
    }
    println!("  recorded:   {} {}", hd.date(), hd.time());

    for (idg, dg) in file.data_groups().enumerate() {
        println!(
            "\nData group {} ({} channel group(s), {} record-ID byte(s))",
            idg,
            dg.number_of_channel_groups(),
            dg.number_of_record_ids()
        );

        for cg in dg.channel_groups(&file) {
            println!(
                "  Channel group: {} records x {} bytes",
                cg.number_of_records(),
                cg.record_size()
            );

            for cn in cg.channels(&file) {
                let info = cn.message_info(&file);
                let unit = file
                    .conversion(cn.conversion_link())
                    .map(|cc| cc.unit())
                    .unwrap_or_default();
                println!(
                    "    [{}] {} @bit {} ({} bits, type {}){}{}",
                    if cn.channel_type() == 1 { "t" } else { "d" },
                    cn.long_name(&file),
                    cn.first_bit(),
                    cn.number_of_bits(),
                    cn.signal_data_type(),
                    if unit.is_empty() { String::new() } else { format!(" [{}]", unit) },
                    if info.message_name == "(undef)" {
                        String::new()
                    } else {
                        format!(" <- {} (0x{:X})", info.message_name, info.can_id)
                    }
                );
            }
        }
    }

    if file.is_corrupt() {
        eprintln!("\nWarning: file image had out-of-range links");
    }

    Ok(())
}
