//! Tile metadata ingestion and channel selection.

mod filter;
mod record;

pub use filter::{select_channel, ChannelTileSet};
pub use record::{
    normalize_tile_file, parse_tile_records, ChannelWavelength, ResolutionKey, TileRecord,
};
