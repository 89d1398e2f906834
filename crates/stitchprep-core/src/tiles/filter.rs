use serde::Serialize;
use tracing::debug;

use crate::error::{Result, StitchError};

use super::record::{ChannelWavelength, TileRecord};

/// Tiles of one imaging channel, in their original relative order.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChannelTileSet {
    #[serde(skip)]
    channel: ChannelWavelength,
    tiles: Vec<TileRecord>,
}

impl ChannelTileSet {
    pub fn channel(&self) -> ChannelWavelength {
        self.channel
    }

    pub fn tiles(&self) -> &[TileRecord] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn into_tiles(self) -> Vec<TileRecord> {
        self.tiles
    }
}

/// Keep the records whose wavelength equals `channel`.
///
/// An empty selection is an error: a registration run over zero tiles
/// cannot produce anything meaningful.
pub fn select_channel<I>(records: I, channel: ChannelWavelength) -> Result<ChannelTileSet>
where
    I: IntoIterator<Item = TileRecord>,
{
    let mut total = 0usize;
    let tiles: Vec<TileRecord> = records
        .into_iter()
        .inspect(|_| total += 1)
        .filter(|t| t.channel_wavelength == channel)
        .collect();

    debug!(channel = channel.0, total, selected = tiles.len(), "Channel selection");

    if tiles.is_empty() {
        return Err(StitchError::EmptyChannelSelection(channel.0));
    }
    Ok(ChannelTileSet { channel, tiles })
}
