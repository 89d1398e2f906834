use tracing::debug;

use crate::consts::{MICRON_UNIT, RAW_UNIT};
use crate::error::Result;
use crate::resolution::VoxelResolution;
use crate::tiles::{ChannelTileSet, ChannelWavelength, TileRecord};

use super::storage::{resolve_storage_root, PathMode};
use super::xml::{self, XmlElement};

const SPIM_DATA_VERSION: &str = "0.2";
const IMAGE_LOADER_FORMAT: &str = "bdv.multimg.zarr";
const IMAGE_LOADER_VERSION: &str = "1.0";
const NOMINAL_GRID_TRANSFORM: &str = "Translation to Nominal Grid";

/// Knobs that shape the descriptor without changing which tiles it lists.
#[derive(Clone, Debug)]
pub struct DescriptorOptions {
    pub path_mode: PathMode,
    pub use_micron_units: bool,
    /// Calibration for tiles whose metadata carries no voxel size.
    pub voxel_resolution: VoxelResolution,
}

impl DescriptorOptions {
    pub fn new(voxel_resolution: VoxelResolution) -> Self {
        Self {
            path_mode: PathMode::default(),
            use_micron_units: true,
            voxel_resolution,
        }
    }
}

/// A `SpimData` document ready to be written.
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetDescriptor {
    root: XmlElement,
    storage_root: String,
    tile_count: usize,
}

impl DatasetDescriptor {
    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Storage locator embedded in the image loader.
    pub fn storage_root(&self) -> &str {
        &self.storage_root
    }

    pub fn tile_count(&self) -> usize {
        self.tile_count
    }

    pub fn to_xml_bytes(&self) -> Result<Vec<u8>> {
        xml::to_bytes(&self.root)
    }
}

/// Build the descriptor for one channel's tiles.
///
/// Tiles are listed sorted by file name; setup ids follow that order.
pub fn build_descriptor(
    tiles: &ChannelTileSet,
    storage_root: &str,
    options: &DescriptorOptions,
) -> Result<DatasetDescriptor> {
    let storage_root = resolve_storage_root(storage_root)?;

    let mut sorted: Vec<&TileRecord> = tiles.tiles().iter().collect();
    sorted.sort_by(|a, b| a.file.cmp(&b.file));

    let sequence = XmlElement::new("SequenceDescription")
        .with_child(image_loader(&sorted, &storage_root, options.path_mode))
        .with_child(view_setups(&sorted, options))
        .with_child(
            XmlElement::new("Timepoints")
                .with_attr("type", "pattern")
                .with_child(XmlElement::leaf("integerpattern", 0)),
        )
        .with_child(XmlElement::new("MissingViews"));

    let root = XmlElement::new("SpimData")
        .with_attr("version", SPIM_DATA_VERSION)
        .with_child(
            XmlElement::new("BasePath")
                .with_attr("type", "relative")
                .with_text("."),
        )
        .with_child(sequence)
        .with_child(view_registrations(&sorted));

    debug!(
        tiles = sorted.len(),
        storage_root = %storage_root,
        path_mode = %options.path_mode,
        "Built dataset descriptor"
    );

    Ok(DatasetDescriptor {
        root,
        storage_root,
        tile_count: sorted.len(),
    })
}

fn image_loader(tiles: &[&TileRecord], storage_root: &str, path_mode: PathMode) -> XmlElement {
    let zgroups = tiles.iter().enumerate().map(|(setup, tile)| {
        XmlElement::new("zgroup")
            .with_attr("setup", setup)
            .with_attr("timepoint", 0)
            .with_child(XmlElement::leaf("path", &tile.file))
    });

    XmlElement::new("ImageLoader")
        .with_attr("format", IMAGE_LOADER_FORMAT)
        .with_attr("version", IMAGE_LOADER_VERSION)
        .with_child(
            XmlElement::new("zarr")
                .with_attr("type", path_mode)
                .with_text(storage_root),
        )
        .with_child(XmlElement::new("zgroups").with_children(zgroups))
}

fn view_setups(tiles: &[&TileRecord], options: &DescriptorOptions) -> XmlElement {
    let unit = if options.use_micron_units {
        MICRON_UNIT
    } else {
        RAW_UNIT
    };

    let setups = tiles.iter().enumerate().map(|(id, tile)| {
        let voxel = tile
            .pixel_resolution
            .unwrap_or_else(|| options.voxel_resolution.to_array());
        XmlElement::new("ViewSetup")
            .with_child(XmlElement::leaf("id", id))
            .with_child(XmlElement::leaf("name", &tile.file))
            .with_child(XmlElement::leaf(
                "size",
                format!("{} {} {}", tile.size[0], tile.size[1], tile.size[2]),
            ))
            .with_child(
                XmlElement::new("voxelSize")
                    .with_child(XmlElement::leaf("unit", unit))
                    .with_child(XmlElement::leaf("size", join_floats(&voxel))),
            )
            .with_child(
                XmlElement::new("attributes")
                    .with_child(XmlElement::leaf("illumination", 0))
                    .with_child(XmlElement::leaf("channel", tile.channel_wavelength))
                    .with_child(XmlElement::leaf("tile", id))
                    .with_child(XmlElement::leaf("angle", 0)),
            )
    });

    let mut channels: Vec<ChannelWavelength> = Vec::new();
    for tile in tiles {
        if !channels.contains(&tile.channel_wavelength) {
            channels.push(tile.channel_wavelength);
        }
    }

    XmlElement::new("ViewSetups")
        .with_children(setups)
        .with_child(single_attribute("illumination", "Illumination"))
        .with_child(
            XmlElement::new("Attributes")
                .with_attr("name", "channel")
                .with_children(channels.iter().map(|c| id_name("Channel", c, c))),
        )
        .with_child(
            XmlElement::new("Attributes")
                .with_attr("name", "tile")
                .with_children(
                    tiles
                        .iter()
                        .enumerate()
                        .map(|(id, tile)| id_name("Tile", id, &tile.file)),
                ),
        )
        .with_child(single_attribute("angle", "Angle"))
}

fn view_registrations(tiles: &[&TileRecord]) -> XmlElement {
    let registrations = tiles.iter().enumerate().map(|(setup, tile)| {
        let [tx, ty, tz] = tile.position;
        let affine = format!(
            "1.0 0.0 0.0 {} 0.0 1.0 0.0 {} 0.0 0.0 1.0 {}",
            fmt_float(tx),
            fmt_float(ty),
            fmt_float(tz)
        );
        XmlElement::new("ViewRegistration")
            .with_attr("timepoint", 0)
            .with_attr("setup", setup)
            .with_child(
                XmlElement::new("ViewTransform")
                    .with_attr("type", "affine")
                    .with_child(XmlElement::leaf("Name", NOMINAL_GRID_TRANSFORM))
                    .with_child(XmlElement::leaf("affine", affine)),
            )
    });

    XmlElement::new("ViewRegistrations").with_children(registrations)
}

/// `Attributes` block with a single `id 0 / name 0` entry.
fn single_attribute(name: &str, entry: &str) -> XmlElement {
    XmlElement::new("Attributes")
        .with_attr("name", name)
        .with_child(id_name(entry, 0, 0))
}

fn id_name(entry: &str, id: impl std::fmt::Display, name: impl std::fmt::Display) -> XmlElement {
    XmlElement::new(entry)
        .with_child(XmlElement::leaf("id", id))
        .with_child(XmlElement::leaf("name", name))
}

/// Floats always carry a fractional part (`100.0`, not `100`).
fn fmt_float(v: f64) -> String {
    format!("{v:?}")
}

fn join_floats(values: &[f64; 3]) -> String {
    values.iter().map(|v| fmt_float(*v)).collect::<Vec<_>>().join(" ")
}
