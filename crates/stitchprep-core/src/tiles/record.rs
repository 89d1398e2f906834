use std::fmt;

use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::consts::CANONICAL_TILE_SUFFIX;
use crate::error::{Result, StitchError};

/// Emission wavelength identifying an imaging channel.
///
/// Upstream metadata writes it either as a JSON number or as a numeric
/// string. Both are coerced to an integer here and serialized back as one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ChannelWavelength(pub i64);

impl ChannelWavelength {
    /// Coerce a loosely typed JSON value (number or numeric string).
    pub fn from_value(value: &Value) -> Result<Self> {
        Self::deserialize(value)
            .map_err(|e| StitchError::MalformedInput(format!("channel wavelength: {e}")))
    }
}

impl fmt::Display for ChannelWavelength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChannelWavelength {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl std::str::FromStr for ChannelWavelength {
    type Err = StitchError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| StitchError::MalformedInput(format!("channel wavelength {s:?}")))
    }
}

struct WavelengthVisitor;

impl<'de> Visitor<'de> for WavelengthVisitor {
    type Value = ChannelWavelength;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer wavelength or a string holding one")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
        Ok(ChannelWavelength(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
        i64::try_from(v)
            .map(ChannelWavelength)
            .map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Self::Value, E> {
        if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
            Ok(ChannelWavelength(v as i64))
        } else {
            Err(E::invalid_value(Unexpected::Float(v), &self))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
        v.trim()
            .parse::<i64>()
            .map(ChannelWavelength)
            .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
    }
}

impl<'de> Deserialize<'de> for ChannelWavelength {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(WavelengthVisitor)
    }
}

/// Key under which a tile's voxel size appeared in the source document.
///
/// Upstream writers disagree on the spelling, so the record remembers which
/// one it was read from and writes the same one back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResolutionKey {
    #[default]
    SnakeCase,
    CamelCase,
}

impl ResolutionKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ResolutionKey::SnakeCase => "pixel_resolution",
            ResolutionKey::CamelCase => "pixelResolution",
        }
    }
}

/// One physical tile of the acquisition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TileDocument", into = "TileDocument")]
pub struct TileRecord {
    /// Storage key of the tile's pixel data, relative to the storage root.
    pub file: String,
    pub channel_wavelength: ChannelWavelength,
    /// Stage translation (X, Y, Z).
    pub position: [f64; 3],
    /// Extent in voxels (X, Y, Z).
    pub size: [u64; 3],
    /// Per-tile voxel size (X, Y, Z), when the acquisition recorded one.
    pub pixel_resolution: Option<[f64; 3]>,
    pub resolution_key: ResolutionKey,
    /// Keys this crate does not interpret, carried through untouched.
    pub extra: Map<String, Value>,
}

/// On-disk shape of a tile object. `position` and `size` are required.
#[derive(Serialize, Deserialize)]
struct TileDocument {
    file: String,
    channel_wavelength: ChannelWavelength,
    position: [f64; 3],
    size: [u64; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pixel_resolution: Option<[f64; 3]>,
    #[serde(
        default,
        rename = "pixelResolution",
        skip_serializing_if = "Option::is_none"
    )]
    camel_pixel_resolution: Option<[f64; 3]>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<TileDocument> for TileRecord {
    type Error = StitchError;

    fn try_from(doc: TileDocument) -> Result<Self> {
        let (pixel_resolution, resolution_key) =
            match (doc.pixel_resolution, doc.camel_pixel_resolution) {
                (Some(_), Some(_)) => {
                    return Err(StitchError::MalformedInput(
                        "both `pixel_resolution` and `pixelResolution` are set".into(),
                    ))
                }
                (None, Some(res)) => (Some(res), ResolutionKey::CamelCase),
                (res, None) => (res, ResolutionKey::SnakeCase),
            };
        Ok(Self {
            file: doc.file,
            channel_wavelength: doc.channel_wavelength,
            position: doc.position,
            size: doc.size,
            pixel_resolution,
            resolution_key,
            extra: doc.extra,
        })
    }
}

impl From<TileRecord> for TileDocument {
    fn from(record: TileRecord) -> Self {
        let (pixel_resolution, camel_pixel_resolution) = match record.resolution_key {
            ResolutionKey::SnakeCase => (record.pixel_resolution, None),
            ResolutionKey::CamelCase => (None, record.pixel_resolution),
        };
        Self {
            file: record.file,
            channel_wavelength: record.channel_wavelength,
            position: record.position,
            size: record.size,
            pixel_resolution,
            camel_pixel_resolution,
            extra: record.extra,
        }
    }
}

impl TileRecord {
    pub fn new(
        file: impl Into<String>,
        channel_wavelength: impl Into<ChannelWavelength>,
        position: [f64; 3],
        size: [u64; 3],
    ) -> Self {
        Self {
            file: file.into(),
            channel_wavelength: channel_wavelength.into(),
            position,
            size,
            pixel_resolution: None,
            resolution_key: ResolutionKey::default(),
            extra: Map::new(),
        }
    }

    /// Copy of this record with its `file` normalized to the canonical suffix.
    pub fn normalized(mut self) -> Result<Self> {
        self.file = normalize_tile_file(&self.file)?;
        Ok(self)
    }
}

/// Reduce a tile file reference to `<stem>.ome.zarr`.
///
/// Only the final path component is kept. Every trailing copy of the
/// canonical suffix is removed before exactly one is re-appended; when the
/// name carries some other extension, that extension (and a dangling `.ome`)
/// is dropped instead.
pub fn normalize_tile_file(file: &str) -> Result<String> {
    let trimmed = file.trim().trim_end_matches(['/', '\\']);
    let name = trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed);

    let mut stem = name;
    let mut had_suffix = false;
    while let Some(rest) = stem.strip_suffix(CANONICAL_TILE_SUFFIX) {
        stem = rest;
        had_suffix = true;
    }
    if !had_suffix {
        if let Some(dot) = stem.rfind('.').filter(|&i| i > 0) {
            stem = &stem[..dot];
        }
        stem = stem.strip_suffix(".ome").unwrap_or(stem);
    }

    if stem.is_empty() {
        return Err(StitchError::MalformedInput(format!(
            "tile file {file:?} has no name"
        )));
    }
    Ok(format!("{stem}{CANONICAL_TILE_SUFFIX}"))
}

/// Parse a JSON array of tile objects, coercing and normalizing each one.
pub fn parse_tile_records(document: Value) -> Result<Vec<TileRecord>> {
    let Value::Array(items) = document else {
        return Err(StitchError::MalformedInput(
            "tile metadata must be a JSON array".into(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let record: TileRecord = serde_json::from_value(item)
                .map_err(|e| StitchError::MalformedInput(format!("tile {index}: {e}")))?;
            record.normalized()
        })
        .collect()
}
