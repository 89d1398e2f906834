use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use stitchprep_core::io::inputs::read_tile_records;

#[derive(Args)]
pub struct InfoArgs {
    /// Tile-metadata JSON file
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let records = read_tile_records(&args.file)
        .with_context(|| format!("Failed to read tile metadata {}", args.file.display()))?;

    let mut per_channel: BTreeMap<i64, usize> = BTreeMap::new();
    for record in &records {
        *per_channel.entry(record.channel_wavelength.0).or_default() += 1;
    }

    println!("File:        {}", args.file.display());
    println!("Tiles:       {}", records.len());
    println!("Channels:    {}", per_channel.len());
    for (channel, count) in &per_channel {
        println!("  {:>6} nm  {} tile(s)", channel, count);
    }

    if let Some(first) = records.first() {
        println!("First tile:  {}", first.file);
        if let Some(res) = first.pixel_resolution {
            println!("Voxel size:  {} {} {}", res[0], res[1], res[2]);
        }
    }

    Ok(())
}
