use anyhow::Result;
use clap::Args;
use stitchprep_core::consts::DEFAULT_TARGET_RESOLUTION;
use stitchprep_core::params::max_shift_for;
use stitchprep_core::resolution::{estimate_downsample, VoxelResolution};

use super::parse_triplet;

#[derive(Args)]
pub struct EstimateArgs {
    /// Base voxel resolution as X,Y,Z
    #[arg(long, value_parser = parse_triplet)]
    pub voxel: [f64; 3],

    /// Target registration resolution as X,Y,Z
    #[arg(long, value_parser = parse_triplet)]
    pub target: Option<[f64; 3]>,
}

pub fn run(args: &EstimateArgs) -> Result<()> {
    let voxel = VoxelResolution::try_from(args.voxel)?;
    let target = VoxelResolution::try_from(args.target.unwrap_or(DEFAULT_TARGET_RESOLUTION))?;
    let level = estimate_downsample(voxel, target)?;

    println!("Voxel:       {}", voxel);
    println!("Target:      {}", target);
    println!("Downsample:  {}", level);
    println!("Max shift:   {} px per axis", max_shift_for(level));

    Ok(())
}
