use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use stitchprep_core::io::inputs::{
    ACQUISITION, DATA_DESCRIPTION, PROCESSED_DATA_DESCRIPTION, PROCESSING_MANIFEST,
    RADIAL_CORRECTION_PARAMETERS, TILE_METADATA,
};
use stitchprep_core::pipeline::config::StitchConfig;

pub const DATASET: &str = "HCR_767022_2025-01-15_12-00-00";
pub const BUCKET: &str = "aind-open-data";
pub const PROCESSED_ASSET: &str = "HCR_767022_processed_2025-01-16";

/// One tile-metadata object laid out on a 1000 µm grid.
pub fn tile_json(index: usize, channel: Value, file: &str) -> Value {
    json!({
        "file": file,
        "channel_wavelength": channel,
        "position": [(index % 5) as f64 * 1000.0, (index / 5) as f64 * 1000.0, 0.0],
        "size": [2048, 2048, 512],
        "acquisition_order": index,
    })
}

/// Ten tiles split across channels 488 and 561, interleaved. Channel 561 is
/// written as a string to exercise wavelength coercion.
pub fn two_channel_tiles() -> Value {
    let tiles: Vec<Value> = (0..10)
        .map(|i| {
            let tile = i / 2;
            if i % 2 == 0 {
                tile_json(tile, json!(488), &format!("Tile_X_{tile:04}_ch_488.zarr"))
            } else {
                tile_json(tile, json!("561"), &format!("Tile_X_{tile:04}_ch_561.ome.zarr"))
            }
        })
        .collect();
    Value::Array(tiles)
}

pub fn write_json(path: &Path, value: &Value) {
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// Populate a capsule data folder with every required document.
pub fn write_capsule(data: &Path, tiles: &Value, channel: Value) {
    fs::create_dir_all(data).unwrap();
    write_json(
        &data.join(PROCESSING_MANIFEST),
        &json!({ "pipeline_processing": { "stitching": { "channel": channel } } }),
    );
    write_json(&data.join(TILE_METADATA), tiles);
    write_json(&data.join(DATA_DESCRIPTION), &json!({ "name": DATASET }));
    write_json(
        &data.join(ACQUISITION),
        &json!({
            "tiles": [{
                "coordinate_transformations": [
                    { "type": "translation", "translation": [0.0, 0.0, 0.0] },
                    { "type": "scale", "scale": ["0.19", "0.19", "0.85"] }
                ]
            }]
        }),
    );
    write_json(
        &data.join(PROCESSED_DATA_DESCRIPTION),
        &json!({ "name": PROCESSED_ASSET }),
    );
    write_json(
        &data.join(RADIAL_CORRECTION_PARAMETERS),
        &json!({ "bucket_name": BUCKET }),
    );
}

/// Config pointing at `root/data` and `root/results`, with a fixed worker
/// count so results do not depend on the host.
pub fn config_for(root: &Path) -> StitchConfig {
    let mut config = StitchConfig::default();
    config.data_folder = root.join("data");
    config.results_folder = root.join("results");
    config.registration.parallel = Some(8);
    config
}

pub fn results_dir(root: &Path) -> PathBuf {
    root.join("results")
}
